//! File upload, download, versioning, and deletion handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use bytes::Bytes;
use uuid::Uuid;

use filevault_core::error::AppError;
use filevault_entity::file::MetadataPatch;
use filevault_service::file::UploadRequest;

use crate::error::ApiError;
use crate::state::AppState;

/// Fields collected from a multipart upload or update request.
#[derive(Debug, Default)]
struct MultipartForm {
    data: Option<Bytes>,
    original_name: Option<String>,
    content_type: Option<String>,
    display_name: Option<String>,
    description: Option<String>,
    tags: Option<Vec<String>>,
}

/// Drains a multipart stream into its known fields. Unknown parts are ignored.
async fn read_multipart(mut multipart: Multipart) -> Result<MultipartForm, AppError> {
    let mut form = MultipartForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                form.original_name = field.file_name().map(String::from);
                form.content_type = field.content_type().map(String::from);
                form.data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::validation(format!("Read error: {e}")))?,
                );
            }
            "display_name" => {
                form.display_name = Some(read_text(field).await?);
            }
            "description" => {
                form.description = Some(read_text(field).await?);
            }
            "tags" => {
                form.tags = Some(parse_tags(&read_text(field).await?));
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::validation(format!("Read error: {e}")))
}

/// Splits a comma-separated tag string, dropping empty entries.
fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// GET /api/files
pub async fn list_files(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let files = state.query_service.list_current().await?;
    Ok(Json(serde_json::json!({ "success": true, "data": files })))
}

/// POST /api/files — multipart upload creating a new version chain
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let form = read_multipart(multipart).await?;

    let data = form
        .data
        .ok_or_else(|| AppError::validation("file part is required"))?;
    let original_name = form
        .original_name
        .ok_or_else(|| AppError::validation("file part must carry a filename"))?;

    let file = state
        .file_service
        .create(UploadRequest {
            data,
            content_type: form.content_type,
            original_name,
            display_name: form.display_name,
            description: form.description,
            tags: form.tags,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": file })),
    ))
}

/// GET /api/files/{id}
pub async fn get_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let file = state.query_service.get_active(id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": file })))
}

/// GET /api/files/{id}/download
pub async fn download_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let result = state.download_service.get_content(id).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, result.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", result.filename),
        )
        .header(header::CONTENT_LENGTH, result.data.len())
        .body(Body::from(result.data))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

/// PUT /api/files/{id} — multipart; with a file part this creates a new
/// version, without one it edits metadata in place.
pub async fn update_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let form = read_multipart(multipart).await?;

    let file = match form.data {
        Some(data) => {
            state
                .file_service
                .update_content(
                    id,
                    UploadRequest {
                        data,
                        content_type: form.content_type,
                        original_name: form
                            .original_name
                            .ok_or_else(|| AppError::validation("file part must carry a filename"))?,
                        display_name: form.display_name,
                        description: form.description,
                        tags: form.tags,
                    },
                )
                .await?
        }
        None => {
            state
                .file_service
                .update_metadata(
                    id,
                    MetadataPatch {
                        display_name: form.display_name,
                        description: form.description,
                        tags: form.tags,
                    },
                )
                .await?
        }
    };

    Ok(Json(serde_json::json!({ "success": true, "data": file })))
}

/// GET /api/files/{id}/versions
pub async fn list_versions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let versions = state.query_service.list_versions(id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": versions }),
    ))
}

/// DELETE /api/files/{id}
pub async fn delete_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.file_service.soft_delete(id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "message": "File deleted" } }),
    ))
}
