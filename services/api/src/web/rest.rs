//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the read-only REST endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::{ApiError, ErrorBody};
use crate::web::dto::{
    CommentRequest, CommentResponse, DescriptionRequest, HydratedCommentResponse,
    HydratedPhotoResponse, IdentityResponse, LoginRequest, MessageResponse, PhotoRefResponse,
    PhotoResponse, RegisterRequest, ServiceInfoResponse, UserCommentResponse,
    UserProfileResponse, UserStatsResponse, UserSummaryResponse,
};
use crate::web::photos::resource_id;
use crate::web::state::AppState;
use crate::web::{auth, comments, photos};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use photo_sharing_core::Session;
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::OpenApi;
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::check_handler,
        feed_handler,
        list_users_handler,
        user_profile_handler,
        photos_of_user_handler,
        user_stats_handler,
        comments_of_user_handler,
        photos::upload_photo_handler,
        photos::edit_photo_handler,
        photos::delete_photo_handler,
        photos::toggle_like_handler,
        comments::add_comment_handler,
        comments::edit_comment_handler,
        comments::delete_comment_handler,
        service_info_handler,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            CommentRequest,
            DescriptionRequest,
            IdentityResponse,
            UserSummaryResponse,
            UserProfileResponse,
            CommentResponse,
            PhotoResponse,
            HydratedCommentResponse,
            HydratedPhotoResponse,
            UserStatsResponse,
            PhotoRefResponse,
            UserCommentResponse,
            MessageResponse,
            ServiceInfoResponse,
            ErrorBody,
        )
    ),
    tags(
        (name = "Photo Sharing API", description = "Users, photos, comments and likes.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// GET /posts - Every photo, newest first
#[utoipa::path(
    get,
    path = "/posts",
    responses(
        (status = 200, description = "The feed", body = Vec<HydratedPhotoResponse>),
        (status = 401, description = "Not logged in", body = ErrorBody)
    )
)]
pub async fn feed_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<HydratedPhotoResponse>>, ApiError> {
    let photos = state.feed.feed(&session).await?;
    Ok(Json(photos.into_iter().map(HydratedPhotoResponse::from).collect()))
}

/// GET /user/list - Display names of every user
#[utoipa::path(
    get,
    path = "/user/list",
    responses(
        (status = 200, description = "All users", body = Vec<UserSummaryResponse>),
        (status = 401, description = "Not logged in", body = ErrorBody)
    )
)]
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<UserSummaryResponse>>, ApiError> {
    let users = state.feed.list_users(&session).await?;
    Ok(Json(users.into_iter().map(UserSummaryResponse::from).collect()))
}

/// GET /user/{id} - A user's profile
#[utoipa::path(
    get,
    path = "/user/{id}",
    params(("id" = Uuid, Path, description = "The user id.")),
    responses(
        (status = 200, description = "The profile", body = UserProfileResponse),
        (status = 401, description = "Not logged in", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
pub async fn user_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Json<UserProfileResponse>, ApiError> {
    let profile = state.feed.user_profile(&session, resource_id(&id)).await?;
    Ok(Json(profile.into()))
}

/// GET /photosOfUser/{id} - A user's photos in upload order
#[utoipa::path(
    get,
    path = "/photosOfUser/{id}",
    params(("id" = Uuid, Path, description = "The user id.")),
    responses(
        (status = 200, description = "The user's photos", body = Vec<HydratedPhotoResponse>),
        (status = 401, description = "Not logged in", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
pub async fn photos_of_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Json<Vec<HydratedPhotoResponse>>, ApiError> {
    let photos = state.feed.photos_of_user(&session, resource_id(&id)).await?;
    Ok(Json(photos.into_iter().map(HydratedPhotoResponse::from).collect()))
}

/// GET /users/stats - Photo and comment counts, keyed by user id
#[utoipa::path(
    get,
    path = "/users/stats",
    responses(
        (status = 200, description = "Counts for every user", body = BTreeMap<String, UserStatsResponse>),
        (status = 401, description = "Not logged in", body = ErrorBody)
    )
)]
pub async fn user_stats_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<BTreeMap<Uuid, UserStatsResponse>>, ApiError> {
    let stats = state.feed.user_stats(&session).await?;
    Ok(Json(
        stats
            .into_iter()
            .map(|(id, counts)| (id, UserStatsResponse::from(counts)))
            .collect(),
    ))
}

/// GET /commentsOfUser/{id} - Every comment a user wrote
#[utoipa::path(
    get,
    path = "/commentsOfUser/{id}",
    params(("id" = Uuid, Path, description = "The user id.")),
    responses(
        (status = 200, description = "The user's comments with their photos", body = Vec<UserCommentResponse>),
        (status = 401, description = "Not logged in", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
pub async fn comments_of_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Json<Vec<UserCommentResponse>>, ApiError> {
    let comments = state.feed.comments_of_user(&session, resource_id(&id)).await?;
    Ok(Json(
        comments
            .into_iter()
            .map(|entry| UserCommentResponse::new(entry, state.blobs.as_ref()))
            .collect(),
    ))
}

/// GET /test/info - Service name and version
#[utoipa::path(
    get,
    path = "/test/info",
    responses((status = 200, description = "Service info", body = ServiceInfoResponse))
)]
pub async fn service_info_handler() -> Json<ServiceInfoResponse> {
    Json(ServiceInfoResponse {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "Photo sharing API".to_string(),
    })
}
