//! crates/photo_sharing_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or file storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use crate::domain::{
    AuthSession, Comment, CommentId, NewUser, Photo, PhotoId, User, UserCredentials, UserId,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, filesystem).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Storage Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_login(&self, login_name: &str) -> PortResult<Option<UserCredentials>>;

    async fn exists_by_login(&self, login_name: &str) -> PortResult<bool>;

    async fn find_by_id(&self, user_id: UserId) -> PortResult<Option<User>>;

    /// Inserts the user. Must fail with `PortError::Conflict` when the login
    /// name is already present, whatever the caller checked beforehand.
    async fn create(&self, user: NewUser) -> PortResult<User>;

    async fn list_users(&self) -> PortResult<Vec<User>>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn find_auth_session(&self, session_id: &str) -> PortResult<Option<AuthSession>>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}

/// Persistence for photo aggregates.
///
/// Every mutation is scoped to one photo id and applied atomically by the
/// store; none of them is a read-modify-write of the whole aggregate.
/// Each fails with `PortError::NotFound` when the photo (or the addressed
/// comment) does not exist at the moment it is applied.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    async fn insert_photo(&self, photo: Photo) -> PortResult<()>;

    async fn get_photo(&self, photo_id: PhotoId) -> PortResult<Option<Photo>>;

    /// All photos in insertion order.
    async fn list_photos(&self) -> PortResult<Vec<Photo>>;

    async fn list_photos_by_owner(&self, owner_id: UserId) -> PortResult<Vec<Photo>>;

    async fn delete_photo(&self, photo_id: PhotoId) -> PortResult<()>;

    async fn replace_description(&self, photo_id: PhotoId, description: &str) -> PortResult<Photo>;

    async fn append_comment(&self, photo_id: PhotoId, comment: Comment) -> PortResult<()>;

    async fn replace_comment_text(
        &self,
        photo_id: PhotoId,
        comment_id: CommentId,
        text: &str,
    ) -> PortResult<Comment>;

    async fn remove_comment(&self, photo_id: PhotoId, comment_id: CommentId) -> PortResult<()>;

    /// Flips the membership of `user_id` in the like set and returns the result.
    async fn toggle_like(&self, photo_id: PhotoId, user_id: UserId) -> PortResult<BTreeSet<UserId>>;
}

//=========================================================================================
// Collaborator Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persists the bytes and returns the generated file reference.
    async fn store(&self, bytes: &[u8], mime_type: &str) -> PortResult<String>;

    async fn delete(&self, file_ref: &str) -> PortResult<()>;

    fn url_for(&self, file_ref: &str) -> String;
}

/// One-way salted password hashing.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> PortResult<String>;

    fn verify(&self, plain: &str, hash: &str) -> PortResult<bool>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
