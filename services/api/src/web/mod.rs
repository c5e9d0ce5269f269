pub mod auth;
pub mod comments;
pub mod dto;
pub mod middleware;
pub mod photos;
pub mod rest;
pub mod routes;
pub mod state;

// Re-export the router builder so the binary and the HTTP tests share one
// definition of the application.
pub use routes::build_router;
pub use state::AppState;
