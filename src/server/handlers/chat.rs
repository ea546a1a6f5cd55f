use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// Answer a question about the loaded document. Always responds 200 with
/// an answer payload; failures inside the pipeline surface as answer text
/// plus a status kind, never as an HTTP error.
pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AskRequest>,
) -> impl IntoResponse {
    Json(state.session.ask(&request.question).await)
}
