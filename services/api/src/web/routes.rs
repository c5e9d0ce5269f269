//! services/api/src/web/routes.rs
//!
//! Builds the full application router.

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::web::{
    auth::{check_handler, login_handler, logout_handler, register_handler},
    comments::{add_comment_handler, delete_comment_handler, edit_comment_handler},
    middleware::resolve_session,
    photos::{delete_photo_handler, edit_photo_handler, toggle_like_handler, upload_photo_handler},
    rest::{
        comments_of_user_handler, feed_handler, list_users_handler, photos_of_user_handler,
        service_info_handler, user_profile_handler, user_stats_handler, ApiDoc,
    },
    state::AppState,
};

/// Room for multipart boundaries and headers on top of the image itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Creates the router: API routes behind the session middleware, the image
/// directory served as static files and the Swagger UI.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    let config = app_state.config.clone();

    let api_router = Router::new()
        // --- Accounts & sessions ---
        .route("/user", post(register_handler))
        .route("/admin/login", post(login_handler))
        .route("/admin/logout", post(logout_handler))
        .route("/admin/check", get(check_handler))
        // --- Read side ---
        .route("/posts", get(feed_handler))
        .route("/user/list", get(list_users_handler))
        .route("/user/{id}", get(user_profile_handler))
        .route("/photosOfUser/{id}", get(photos_of_user_handler))
        .route("/users/stats", get(user_stats_handler))
        .route("/commentsOfUser/{id}", get(comments_of_user_handler))
        // --- Photos ---
        .route("/photos/new", post(upload_photo_handler))
        .route(
            "/photos/{id}",
            put(edit_photo_handler).delete(delete_photo_handler),
        )
        .route("/photos/{id}/like", post(toggle_like_handler))
        // --- Comments ---
        .route("/commentsOfPhoto/{photo_id}", post(add_comment_handler))
        .route(
            "/commentsOfPhoto/{photo_id}/{comment_id}",
            put(edit_comment_handler).delete(delete_comment_handler),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            resolve_session,
        ))
        .route("/test/info", get(service_info_handler))
        .layer(DefaultBodyLimit::max(
            config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES,
        ))
        .with_state(app_state);

    // Merge the API router with the static images and the Swagger UI router
    // for a complete application.
    Router::new()
        .merge(api_router)
        .nest_service(&config.images_url_prefix, ServeDir::new(&config.images_dir))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
}
