//! Route handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, Path, State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::error::ApiError;
use crate::context::AppContext;
use crate::documents::{Document, DocumentId, run_blocking};

pub type AppState = Arc<AppContext>;

/// Multipart field carrying the uploaded file.
const FILE_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub document_id: DocumentId,
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestedQuestions {
    pub questions: Vec<String>,
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the PDF Q&A API!" }))
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn upload(
    State(ctx): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let client_filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::BadRequest("Uploaded file has no filename".to_string()))?;
        crate::log_event!("http", "upload", "{client_filename}");

        let mut writer = ctx.ingestor.begin(&client_filename).await?;
        loop {
            let chunk = match field.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    writer.abort().await;
                    return Err(e.into());
                }
            };
            if let Err(e) = writer.write_chunk(&chunk).await {
                writer.abort().await;
                return Err(e.into());
            }
        }

        let staged = writer.finish().await?;
        let id = ctx.ingestor.complete(staged).await?;
        crate::log_event!("http", "uploaded", "{client_filename} as document {id}");

        return Ok(Json(json!({
            "message": "File uploaded successfully",
            "document_id": id,
        })));
    }

    Err(ApiError::BadRequest(format!(
        "Missing multipart field '{FILE_FIELD}'"
    )))
}

pub async fn list_documents(State(ctx): State<AppState>) -> Result<Json<Vec<Document>>, ApiError> {
    Ok(Json(run_blocking(&ctx.store, |store| store.list()).await?))
}

pub async fn get_document(
    State(ctx): State<AppState>,
    Path(id): Path<DocumentId>,
) -> Result<Json<Document>, ApiError> {
    run_blocking(&ctx.store, move |store| store.get(id))
        .await?
        .map(Json)
        .ok_or_else(ApiError::document_not_found)
}

pub async fn delete_document(
    State(ctx): State<AppState>,
    Path(id): Path<DocumentId>,
) -> Result<Json<Value>, ApiError> {
    run_blocking(&ctx.store, move |store| store.delete(id)).await?;
    crate::log_event!("http", "deleted", "document {id}");
    Ok(Json(json!({
        "message": "Document deleted successfully",
        "id": id,
    })))
}

pub async fn ask(
    State(ctx): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    if request.question.trim().is_empty() {
        return Err(ApiError::BadRequest("Question must not be empty".to_string()));
    }

    crate::debug_event!("http", "ask", "document {}", request.document_id);
    let answer = ctx
        .answering
        .answer(request.document_id, &request.question)
        .await?;
    Ok(Json(AskResponse { answer }))
}

pub async fn suggested_questions(
    State(ctx): State<AppState>,
    Path(id): Path<DocumentId>,
) -> Result<Json<SuggestedQuestions>, ApiError> {
    let questions = ctx.answering.suggest(id).await?;
    Ok(Json(SuggestedQuestions { questions }))
}
