use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::document;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub path: String,
}

/// Ingest a document from a path on disk, replacing the current one.
pub async fn ingest_document(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IngestRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let document = document::load(Path::new(&request.path))?;
    let report = state.session.ingest(document).await?;

    Ok(Json(json!({
        "message": "Document uploaded successfully! I'm waiting for your questions.",
        "document_id": report.document_id,
        "source": report.source,
        "chunks": report.chunks,
        "pages": report.pages,
    })))
}
