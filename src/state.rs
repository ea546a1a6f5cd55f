use std::sync::Arc;

use crate::core::config::{AppConfig, AppPaths};
use crate::llm::{LlmProvider, OllamaProvider};
use crate::session::DocumentSession;

/// Global application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: AppConfig,
    pub provider: Arc<dyn LlmProvider>,
    pub session: Arc<DocumentSession>,
}

impl AppState {
    pub fn initialize() -> Arc<Self> {
        let paths = Arc::new(AppPaths::new());
        let config = AppConfig::load(&paths.config_path);

        let provider: Arc<dyn LlmProvider> = Arc::new(OllamaProvider::new(
            config.ollama_url.clone(),
            config.chat_timeout_secs,
            config.embedding_timeout_secs,
        ));
        let session = Arc::new(DocumentSession::new(provider.clone(), &config));

        Arc::new(Self {
            paths,
            config,
            provider,
            session,
        })
    }
}
