//! crates/photo_sharing_core/src/memory.rs
//!
//! In-memory implementations of the storage ports. Used by the test suites
//! and by the api service when no database is configured.
//!
//! Each primitive takes the relevant write lock exactly once, so it is
//! atomic with respect to every other primitive on the same store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    AuthSession, Comment, CommentId, NewUser, Photo, PhotoId, User, UserCredentials, UserId,
};
use crate::input::extension_for;
use crate::ports::{
    BlobStore, CredentialStore, PhotoStore, PortError, PortResult, SessionStore,
};

fn photo_not_found(photo_id: PhotoId) -> PortError {
    PortError::NotFound(format!("Photo {} not found", photo_id))
}

fn comment_not_found(comment_id: CommentId) -> PortError {
    PortError::NotFound(format!("Comment {} not found", comment_id))
}

//=========================================================================================
// Users, sessions and photos
//=========================================================================================

/// Holds users, auth sessions and photo aggregates.
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<Vec<UserCredentials>>,
    sessions: RwLock<HashMap<String, AuthSession>>,
    photos: RwLock<Vec<Photo>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn photo_count(&self) -> usize {
        self.photos.read().await.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl CredentialStore for InMemoryStore {
    async fn find_by_login(&self, login_name: &str) -> PortResult<Option<UserCredentials>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|c| c.user.login_name == login_name).cloned())
    }

    async fn exists_by_login(&self, login_name: &str) -> PortResult<bool> {
        let users = self.users.read().await;
        Ok(users.iter().any(|c| c.user.login_name == login_name))
    }

    async fn find_by_id(&self, user_id: UserId) -> PortResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|c| c.user.id == user_id).map(|c| c.user.clone()))
    }

    async fn create(&self, user: NewUser) -> PortResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|c| c.user.login_name == user.login_name) {
            return Err(PortError::Conflict(format!(
                "Login name {} already exists",
                user.login_name
            )));
        }
        let created = user.to_user();
        users.push(UserCredentials {
            user: created.clone(),
            hashed_password: user.hashed_password,
        });
        Ok(created)
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.iter().map(|c| c.user.clone()).collect())
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(
            session_id.to_string(),
            AuthSession {
                id: session_id.to_string(),
                user_id,
                expires_at,
            },
        );
        Ok(())
    }

    async fn find_auth_session(&self, session_id: &str) -> PortResult<Option<AuthSession>> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }
}

#[async_trait]
impl PhotoStore for InMemoryStore {
    async fn insert_photo(&self, photo: Photo) -> PortResult<()> {
        let mut photos = self.photos.write().await;
        if photos.iter().any(|p| p.id == photo.id) {
            return Err(PortError::Conflict(format!("Photo {} already exists", photo.id)));
        }
        photos.push(photo);
        Ok(())
    }

    async fn get_photo(&self, photo_id: PhotoId) -> PortResult<Option<Photo>> {
        let photos = self.photos.read().await;
        Ok(photos.iter().find(|p| p.id == photo_id).cloned())
    }

    async fn list_photos(&self) -> PortResult<Vec<Photo>> {
        Ok(self.photos.read().await.clone())
    }

    async fn list_photos_by_owner(&self, owner_id: UserId) -> PortResult<Vec<Photo>> {
        let photos = self.photos.read().await;
        Ok(photos.iter().filter(|p| p.owner_id == owner_id).cloned().collect())
    }

    async fn delete_photo(&self, photo_id: PhotoId) -> PortResult<()> {
        let mut photos = self.photos.write().await;
        let index = photos
            .iter()
            .position(|p| p.id == photo_id)
            .ok_or_else(|| photo_not_found(photo_id))?;
        photos.remove(index);
        Ok(())
    }

    async fn replace_description(&self, photo_id: PhotoId, description: &str) -> PortResult<Photo> {
        let mut photos = self.photos.write().await;
        let photo = photos
            .iter_mut()
            .find(|p| p.id == photo_id)
            .ok_or_else(|| photo_not_found(photo_id))?;
        photo.description = description.to_string();
        Ok(photo.clone())
    }

    async fn append_comment(&self, photo_id: PhotoId, comment: Comment) -> PortResult<()> {
        let mut photos = self.photos.write().await;
        let photo = photos
            .iter_mut()
            .find(|p| p.id == photo_id)
            .ok_or_else(|| photo_not_found(photo_id))?;
        photo.comments.push(comment);
        Ok(())
    }

    async fn replace_comment_text(
        &self,
        photo_id: PhotoId,
        comment_id: CommentId,
        text: &str,
    ) -> PortResult<Comment> {
        let mut photos = self.photos.write().await;
        let photo = photos
            .iter_mut()
            .find(|p| p.id == photo_id)
            .ok_or_else(|| photo_not_found(photo_id))?;
        let comment = photo
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| comment_not_found(comment_id))?;
        comment.text = text.to_string();
        Ok(comment.clone())
    }

    async fn remove_comment(&self, photo_id: PhotoId, comment_id: CommentId) -> PortResult<()> {
        let mut photos = self.photos.write().await;
        let photo = photos
            .iter_mut()
            .find(|p| p.id == photo_id)
            .ok_or_else(|| photo_not_found(photo_id))?;
        let index = photo
            .comments
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or_else(|| comment_not_found(comment_id))?;
        // `Vec::remove` shifts the tail, so the remaining comments keep their order.
        photo.comments.remove(index);
        Ok(())
    }

    async fn toggle_like(&self, photo_id: PhotoId, user_id: UserId) -> PortResult<BTreeSet<UserId>> {
        let mut photos = self.photos.write().await;
        let photo = photos
            .iter_mut()
            .find(|p| p.id == photo_id)
            .ok_or_else(|| photo_not_found(photo_id))?;
        if !photo.likes.remove(&user_id) {
            photo.likes.insert(user_id);
        }
        Ok(photo.likes.clone())
    }
}

//=========================================================================================
// Blobs
//=========================================================================================

/// Keeps uploaded files in memory, keyed by their generated name.
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    url_prefix: String,
}

impl InMemoryBlobStore {
    pub fn new(url_prefix: impl Into<String>) -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            url_prefix: url_prefix.into(),
        }
    }

    pub async fn contains(&self, file_ref: &str) -> bool {
        self.blobs.read().await.contains_key(file_ref)
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new("/images")
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn store(&self, bytes: &[u8], mime_type: &str) -> PortResult<String> {
        let extension = extension_for(mime_type)
            .ok_or_else(|| PortError::Unexpected(format!("Unsupported MIME type {}", mime_type)))?;
        let file_ref = format!("{}.{}", Uuid::new_v4(), extension);
        self.blobs.write().await.insert(file_ref.clone(), bytes.to_vec());
        Ok(file_ref)
    }

    async fn delete(&self, file_ref: &str) -> PortResult<()> {
        match self.blobs.write().await.remove(file_ref) {
            Some(_) => Ok(()),
            None => Err(PortError::NotFound(format!("File {} not found", file_ref))),
        }
    }

    fn url_for(&self, file_ref: &str) -> String {
        format!("{}/{}", self.url_prefix.trim_end_matches('/'), file_ref)
    }
}
