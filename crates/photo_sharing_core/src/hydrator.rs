//! crates/photo_sharing_core/src/hydrator.rs
//!
//! Joins photos with the users they reference, for display only.

use futures::future::try_join_all;
use std::sync::Arc;

use crate::domain::{HydratedComment, HydratedPhoto, Photo, UserId, UserSummary};
use crate::error::{EngineError, EngineResult};
use crate::ports::{BlobStore, CredentialStore};

/// Resolves owner and comment-author ids to display names.
///
/// A user id that no longer resolves becomes `UserSummary::placeholder()`.
/// Lookups for different photos and comments run concurrently.
pub struct FeedHydrator {
    users: Arc<dyn CredentialStore>,
    blobs: Arc<dyn BlobStore>,
}

impl FeedHydrator {
    pub fn new(users: Arc<dyn CredentialStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { users, blobs }
    }

    pub async fn hydrate(&self, photos: Vec<Photo>) -> EngineResult<Vec<HydratedPhoto>> {
        try_join_all(photos.into_iter().map(|photo| self.hydrate_photo(photo))).await
    }

    pub async fn hydrate_photo(&self, photo: Photo) -> EngineResult<HydratedPhoto> {
        let Photo {
            id,
            owner_id,
            file_name,
            description,
            created_at,
            comments,
            likes,
        } = photo;

        let comments = comments.into_iter().map(|comment| async move {
            let author = self.summary_of(comment.author_id).await?;
            Ok::<_, EngineError>(HydratedComment { comment, author })
        });
        let (owner, comments) = futures::try_join!(self.summary_of(owner_id), try_join_all(comments))?;

        Ok(HydratedPhoto {
            id,
            owner_id,
            owner,
            url: self.blobs.url_for(&file_name),
            file_name,
            description,
            created_at,
            comments,
            likes,
        })
    }

    pub async fn summary_of(&self, user_id: UserId) -> EngineResult<UserSummary> {
        Ok(self
            .users
            .find_by_id(user_id)
            .await?
            .map(|user| user.summary())
            .unwrap_or_else(UserSummary::placeholder))
    }
}
