//! services/api/src/web/comments.rs
//!
//! Comment endpoints. Comments live inside their photo, so every route is
//! addressed by the photo id first.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use photo_sharing_core::Session;
use std::sync::Arc;

use crate::error::{ApiError, ErrorBody};
use crate::web::dto::{CommentRequest, CommentResponse, HydratedCommentResponse, MessageResponse};
use crate::web::photos::resource_id;
use crate::web::state::AppState;

/// POST /commentsOfPhoto/{photo_id} - Add a comment to a photo
#[utoipa::path(
    post,
    path = "/commentsOfPhoto/{photo_id}",
    request_body = CommentRequest,
    params(("photo_id" = Uuid, Path, description = "The photo to comment on.")),
    responses(
        (status = 200, description = "Comment added", body = HydratedCommentResponse),
        (status = 400, description = "Comment is empty", body = ErrorBody),
        (status = 401, description = "Not logged in", body = ErrorBody),
        (status = 404, description = "Photo not found", body = ErrorBody)
    )
)]
pub async fn add_comment_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(photo_id): Path<String>,
    body: Result<Json<CommentRequest>, JsonRejection>,
) -> Result<Json<HydratedCommentResponse>, ApiError> {
    let Json(req) = body?;
    let comment = state
        .engine
        .add_comment(&session, resource_id(&photo_id), &req.comment)
        .await?;
    Ok(Json(comment.into()))
}

/// PUT /commentsOfPhoto/{photo_id}/{comment_id} - Edit one's own comment
#[utoipa::path(
    put,
    path = "/commentsOfPhoto/{photo_id}/{comment_id}",
    request_body = CommentRequest,
    params(
        ("photo_id" = Uuid, Path, description = "The photo holding the comment."),
        ("comment_id" = Uuid, Path, description = "The comment to edit.")
    ),
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 400, description = "Comment is empty", body = ErrorBody),
        (status = 401, description = "Not logged in", body = ErrorBody),
        (status = 403, description = "Caller did not write the comment", body = ErrorBody),
        (status = 404, description = "Photo or comment not found", body = ErrorBody)
    )
)]
pub async fn edit_comment_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path((photo_id, comment_id)): Path<(String, String)>,
    body: Result<Json<CommentRequest>, JsonRejection>,
) -> Result<Json<CommentResponse>, ApiError> {
    let Json(req) = body?;
    let comment = state
        .engine
        .edit_comment(
            &session,
            resource_id(&photo_id),
            resource_id(&comment_id),
            &req.comment,
        )
        .await?;
    Ok(Json(comment.into()))
}

/// DELETE /commentsOfPhoto/{photo_id}/{comment_id} - Delete a comment
///
/// Allowed for the comment's author and for the owner of the photo.
#[utoipa::path(
    delete,
    path = "/commentsOfPhoto/{photo_id}/{comment_id}",
    params(
        ("photo_id" = Uuid, Path, description = "The photo holding the comment."),
        ("comment_id" = Uuid, Path, description = "The comment to delete.")
    ),
    responses(
        (status = 200, description = "Comment deleted", body = MessageResponse),
        (status = 401, description = "Not logged in", body = ErrorBody),
        (status = 403, description = "Caller is neither the author nor the photo owner", body = ErrorBody),
        (status = 404, description = "Photo or comment not found", body = ErrorBody)
    )
)]
pub async fn delete_comment_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path((photo_id, comment_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .engine
        .delete_comment(&session, resource_id(&photo_id), resource_id(&comment_id))
        .await?;
    Ok(Json(MessageResponse::new("Comment deleted successfully")))
}
