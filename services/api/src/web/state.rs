//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use chrono::Duration;
use photo_sharing_core::ports::{
    BlobStore, Clock, CredentialStore, PasswordHasher, PhotoStore, SessionStore,
};
use photo_sharing_core::{FeedHydrator, FeedService, MutationEngine, SessionManager};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub engine: Arc<MutationEngine>,
    pub sessions: Arc<SessionManager>,
    pub feed: Arc<FeedService>,
    pub blobs: Arc<dyn BlobStore>,
}

impl AppState {
    /// Wires the core services around one store that backs users, sessions
    /// and photos alike.
    pub fn assemble<S>(
        config: Arc<Config>,
        store: Arc<S>,
        blobs: Arc<dyn BlobStore>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self
    where
        S: CredentialStore + SessionStore + PhotoStore + 'static,
    {
        let credentials: Arc<dyn CredentialStore> = store.clone();
        let auth_sessions: Arc<dyn SessionStore> = store.clone();
        let photos: Arc<dyn PhotoStore> = store;

        let engine = MutationEngine::new(
            credentials.clone(),
            photos.clone(),
            blobs.clone(),
            hasher.clone(),
            clock.clone(),
        );
        let sessions = SessionManager::new(credentials.clone(), auth_sessions, hasher, clock)
            .with_ttl(Duration::hours(config.session_ttl_hours));
        let hydrator = FeedHydrator::new(credentials.clone(), blobs.clone());
        let feed = FeedService::new(credentials, photos, hydrator);

        Self {
            config,
            engine: Arc::new(engine),
            sessions: Arc::new(sessions),
            feed: Arc::new(feed),
            blobs,
        }
    }
}
