//! crates/photo_sharing_core/src/feed.rs
//!
//! Read-only queries behind the feed, user and activity pages. All of them
//! require an authenticated session and none of them write.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::{
    HydratedPhoto, PhotoRef, Session, User, UserComment, UserId, UserProfile, UserStats,
    UserSummary,
};
use crate::error::{EngineError, EngineResult};
use crate::hydrator::FeedHydrator;
use crate::ports::{CredentialStore, PhotoStore};

pub struct FeedService {
    users: Arc<dyn CredentialStore>,
    photos: Arc<dyn PhotoStore>,
    hydrator: FeedHydrator,
}

fn require_session(session: &Session) -> EngineResult<()> {
    session.identity().map(|_| ()).ok_or(EngineError::Unauthorized)
}

impl FeedService {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        photos: Arc<dyn PhotoStore>,
        hydrator: FeedHydrator,
    ) -> Self {
        Self {
            users,
            photos,
            hydrator,
        }
    }

    async fn existing_user(&self, user_id: UserId) -> EngineResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("User not found".to_string()))
    }

    /// Every photo, newest first.
    pub async fn feed(&self, session: &Session) -> EngineResult<Vec<HydratedPhoto>> {
        require_session(session)?;
        let mut photos = self.photos.list_photos().await?;
        photos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.hydrator.hydrate(photos).await
    }

    pub async fn list_users(&self, session: &Session) -> EngineResult<Vec<UserSummary>> {
        require_session(session)?;
        let users = self.users.list_users().await?;
        Ok(users.iter().map(User::summary).collect())
    }

    pub async fn user_profile(&self, session: &Session, user_id: UserId) -> EngineResult<UserProfile> {
        require_session(session)?;
        Ok(self.existing_user(user_id).await?.profile())
    }

    /// The user's photos in upload order.
    pub async fn photos_of_user(
        &self,
        session: &Session,
        user_id: UserId,
    ) -> EngineResult<Vec<HydratedPhoto>> {
        require_session(session)?;
        self.existing_user(user_id).await?;
        let photos = self.photos.list_photos_by_owner(user_id).await?;
        self.hydrator.hydrate(photos).await
    }

    /// Photo and comment counts for every registered user. Photos and
    /// comments pointing at unknown users are not counted.
    pub async fn user_stats(&self, session: &Session) -> EngineResult<BTreeMap<UserId, UserStats>> {
        require_session(session)?;
        let (users, photos) = futures::try_join!(self.users.list_users(), self.photos.list_photos())?;

        let mut stats: BTreeMap<UserId, UserStats> =
            users.iter().map(|u| (u.id, UserStats::default())).collect();
        for photo in &photos {
            if let Some(entry) = stats.get_mut(&photo.owner_id) {
                entry.photo_count += 1;
            }
            for comment in &photo.comments {
                if let Some(entry) = stats.get_mut(&comment.author_id) {
                    entry.comment_count += 1;
                }
            }
        }
        Ok(stats)
    }

    /// Every comment the user wrote, with the photo it sits on.
    pub async fn comments_of_user(
        &self,
        session: &Session,
        user_id: UserId,
    ) -> EngineResult<Vec<UserComment>> {
        require_session(session)?;
        self.existing_user(user_id).await?;

        let photos = self.photos.list_photos().await?;
        let comments = photos
            .iter()
            .flat_map(|photo| {
                photo
                    .comments
                    .iter()
                    .filter(|c| c.author_id == user_id)
                    .map(move |c| UserComment {
                        comment: c.clone(),
                        photo: PhotoRef {
                            id: photo.id,
                            file_name: photo.file_name.clone(),
                            owner_id: photo.owner_id,
                        },
                    })
            })
            .collect();
        Ok(comments)
    }
}
