use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::provider::LlmProvider;
use super::types::ChatRequest;
use crate::core::errors::ApiError;

/// Provider backed by a local Ollama instance.
///
/// Generation goes through `POST /api/chat`; embeddings through
/// `POST /api/embeddings`, which takes one prompt per request.
#[derive(Clone)]
pub struct OllamaProvider {
    base_url: String,
    client: Client,
    chat_timeout: Duration,
    embed_timeout: Duration,
}

impl OllamaProvider {
    pub fn new(base_url: String, chat_timeout_secs: u64, embed_timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            chat_timeout: Duration::from_secs(chat_timeout_secs),
            embed_timeout: Duration::from_secs(embed_timeout_secs),
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        let url = format!("{}/api/tags", self.base_url);
        let res = self.client.get(&url).send().await;
        match res {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, ApiError> {
        let url = format!("{}/api/chat", self.base_url);

        let mut body = json!({
            "model": model_id,
            "messages": request.messages,
            "stream": false,
        });

        let mut options = serde_json::Map::new();
        if let Some(t) = request.temperature {
            options.insert("temperature".to_string(), json!(t));
        }
        if let Some(n) = request.max_tokens {
            options.insert("num_predict".to_string(), json!(n));
        }
        if let Some(s) = request.stop {
            options.insert("stop".to_string(), json!(s));
        }
        if !options.is_empty() {
            if let Some(obj) = body.as_object_mut() {
                obj.insert("options".to_string(), Value::Object(options));
            }
        }

        let res = self
            .client
            .post(&url)
            .timeout(self.chat_timeout)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::internal)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Internal(format!("Ollama chat error: {}", text)));
        }

        let payload: Value = res.json().await.map_err(ApiError::internal)?;
        parse_chat_response(&payload)
    }

    async fn embed_one(&self, input: &str, model_id: &str) -> Result<Vec<f32>, ApiError> {
        let url = format!("{}/api/embeddings", self.base_url);

        let body = json!({
            "model": model_id,
            "prompt": input,
        });

        let res = self
            .client
            .post(&url)
            .timeout(self.embed_timeout)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::internal)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Internal(format!(
                "Ollama embedding error: {}",
                text
            )));
        }

        let payload: Value = res.json().await.map_err(ApiError::internal)?;
        parse_embedding_response(&payload)
    }
}

fn parse_chat_response(payload: &Value) -> Result<String, ApiError> {
    payload["message"]["content"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| ApiError::Internal("Ollama chat response missing message content".into()))
}

fn parse_embedding_response(payload: &Value) -> Result<Vec<f32>, ApiError> {
    let values = payload["embedding"].as_array().ok_or_else(|| {
        ApiError::Internal("Ollama embedding response missing embedding array".into())
    })?;

    Ok(values
        .iter()
        .map(|v| v.as_f64().unwrap_or(0.0) as f32)
        .collect())
}
