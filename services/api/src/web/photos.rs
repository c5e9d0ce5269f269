//! services/api/src/web/photos.rs
//!
//! Photo upload, caption editing, deletion and like toggling.

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    Extension, Json,
};
use photo_sharing_core::ports::BlobStore;
use photo_sharing_core::{ImageUpload, Session, SessionManager, ValidationError};
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

use crate::error::{ApiError, ErrorBody};
use crate::web::dto::{DescriptionRequest, MessageResponse, PhotoResponse};
use crate::web::state::AppState;

/// Name of the multipart field that carries the image.
pub const PHOTO_FIELD: &str = "photo";

/// Maps a path segment to an id. A segment that is not a UUID cannot name
/// anything, so it becomes the nil id, which is never issued; the core then
/// reports `NotFound` after its own session check.
pub(crate) fn resource_id(raw: &str) -> Uuid {
    Uuid::parse_str(raw).unwrap_or(Uuid::nil())
}

/// Reads the `photo` part of a multipart body. Other parts are skipped.
async fn read_photo_field(
    multipart: &mut Multipart,
    max_bytes: usize,
) -> Result<ImageUpload, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        return Ok(ImageUpload::try_new(data.to_vec(), &content_type, max_bytes)?);
    }
    Err(ValidationError::EmptyUpload.into())
}

/// POST /photos/new - Upload a new photo
///
/// Accepts a multipart/form-data request with the image in the `photo` part.
#[utoipa::path(
    post,
    path = "/photos/new",
    request_body(content_type = "multipart/form-data", description = "The image to upload, in the `photo` part."),
    responses(
        (status = 200, description = "Photo uploaded", body = PhotoResponse),
        (status = 400, description = "Missing file, unsupported type or file too large", body = ErrorBody),
        (status = 401, description = "Not logged in", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn upload_photo_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    mut multipart: Multipart,
) -> Result<Json<PhotoResponse>, ApiError> {
    // Nothing is written to the blob store for an anonymous caller.
    SessionManager::current_identity(&session)?;

    let upload = read_photo_field(&mut multipart, state.config.max_upload_bytes).await?;
    let file_ref = state
        .blobs
        .store(upload.bytes(), upload.mime_type())
        .await
        .map_err(|e| {
            error!("Failed to store uploaded photo: {:?}", e);
            ApiError::from(e)
        })?;

    match state.engine.upload_photo(&session, &file_ref).await {
        Ok(photo) => Ok(Json(PhotoResponse::new(photo, state.blobs.as_ref()))),
        Err(e) => {
            if let Err(cleanup) = state.blobs.delete(&file_ref).await {
                warn!(file_name = %file_ref, "Failed to remove file of rejected upload: {:?}", cleanup);
            }
            Err(e.into())
        }
    }
}

/// PUT /photos/{id} - Edit a photo's description
#[utoipa::path(
    put,
    path = "/photos/{id}",
    request_body = DescriptionRequest,
    params(("id" = Uuid, Path, description = "The photo id.")),
    responses(
        (status = 200, description = "Description updated", body = PhotoResponse),
        (status = 401, description = "Not logged in", body = ErrorBody),
        (status = 403, description = "Caller does not own the photo", body = ErrorBody),
        (status = 404, description = "Photo not found", body = ErrorBody)
    )
)]
pub async fn edit_photo_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    body: Result<Json<DescriptionRequest>, JsonRejection>,
) -> Result<Json<PhotoResponse>, ApiError> {
    let Json(req) = body?;
    let photo = state
        .engine
        .edit_photo_description(&session, resource_id(&id), &req.description)
        .await?;
    Ok(Json(PhotoResponse::new(photo, state.blobs.as_ref())))
}

/// DELETE /photos/{id} - Delete a photo and its file
#[utoipa::path(
    delete,
    path = "/photos/{id}",
    params(("id" = Uuid, Path, description = "The photo id.")),
    responses(
        (status = 200, description = "Photo deleted", body = MessageResponse),
        (status = 401, description = "Not logged in", body = ErrorBody),
        (status = 403, description = "Caller does not own the photo", body = ErrorBody),
        (status = 404, description = "Photo not found", body = ErrorBody)
    )
)]
pub async fn delete_photo_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.engine.delete_photo(&session, resource_id(&id)).await?;
    Ok(Json(MessageResponse::new("Photo deleted")))
}

/// POST /photos/{id}/like - Like or unlike a photo
///
/// Returns the ids of every user who likes the photo afterwards.
#[utoipa::path(
    post,
    path = "/photos/{id}/like",
    params(("id" = Uuid, Path, description = "The photo id.")),
    responses(
        (status = 200, description = "Like toggled", body = Vec<Uuid>),
        (status = 401, description = "Not logged in", body = ErrorBody),
        (status = 404, description = "Photo not found", body = ErrorBody)
    )
)]
pub async fn toggle_like_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Uuid>>, ApiError> {
    let likes = state.engine.toggle_like(&session, resource_id(&id)).await?;
    Ok(Json(likes.into_iter().collect()))
}
