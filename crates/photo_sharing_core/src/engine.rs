//! crates/photo_sharing_core/src/engine.rs
//!
//! The mutation engine. Every write path runs here: it checks the session,
//! loads what the policy needs, asks the policy, then issues one atomic
//! store primitive. Nothing is written before the policy allows it.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{
    Comment, CommentId, HydratedComment, Identity, NewUser, Photo, PhotoId, Session, UserId,
    UserSummary,
};
use crate::error::{EngineError, EngineResult};
use crate::input::{CommentText, Registration};
use crate::policy::{decide, Action, Resource};
use crate::ports::{BlobStore, Clock, CredentialStore, PasswordHasher, PhotoStore};

pub struct MutationEngine {
    credentials: Arc<dyn CredentialStore>,
    photos: Arc<dyn PhotoStore>,
    blobs: Arc<dyn BlobStore>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

/// Authentication is checked once, before anything is loaded.
fn actor(session: &Session) -> EngineResult<&Identity> {
    session.identity().ok_or(EngineError::Unauthorized)
}

fn comment_of(photo: &Photo, comment_id: CommentId) -> EngineResult<&Comment> {
    photo
        .comment(comment_id)
        .ok_or_else(|| EngineError::NotFound("Comment not found".to_string()))
}

impl MutationEngine {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        photos: Arc<dyn PhotoStore>,
        blobs: Arc<dyn BlobStore>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            photos,
            blobs,
            hasher,
            clock,
        }
    }

    async fn load_photo(&self, photo_id: PhotoId) -> EngineResult<Photo> {
        self.photos
            .get_photo(photo_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("Photo not found".to_string()))
    }

    //=====================================================================================
    // Users
    //=====================================================================================

    /// Registers a new user and returns their public identity.
    ///
    /// The existence check is only an early exit; the credential store's own
    /// uniqueness constraint decides concurrent registrations.
    pub async fn register_user(&self, registration: Registration) -> EngineResult<Identity> {
        if self.credentials.exists_by_login(registration.login_name()).await? {
            return Err(EngineError::Conflict("Login name already exists".to_string()));
        }

        let hashed_password = self.hasher.hash(registration.password())?;
        let user = self
            .credentials
            .create(NewUser {
                id: Uuid::new_v4(),
                login_name: registration.login_name().to_string(),
                hashed_password,
                first_name: registration.first_name().to_string(),
                last_name: registration.last_name().to_string(),
                location: registration.location().to_string(),
                description: registration.description().to_string(),
                occupation: registration.occupation().to_string(),
            })
            .await?;

        info!(user_id = %user.id, login_name = %user.login_name, "User registered");
        Ok(user.identity())
    }

    //=====================================================================================
    // Photos
    //=====================================================================================

    /// Records a photo for a blob that has already been stored.
    pub async fn upload_photo(&self, session: &Session, file_ref: &str) -> EngineResult<Photo> {
        decide(session, Resource::Photo(None), Action::Create).into_result()?;
        let owner = actor(session)?;

        let photo = Photo::new(Uuid::new_v4(), owner.id, file_ref.to_string(), self.clock.now());
        self.photos.insert_photo(photo.clone()).await?;

        info!(photo_id = %photo.id, owner_id = %owner.id, "Photo uploaded");
        Ok(photo)
    }

    pub async fn edit_photo_description(
        &self,
        session: &Session,
        photo_id: PhotoId,
        description: &str,
    ) -> EngineResult<Photo> {
        let editor = actor(session)?;
        let photo = self.load_photo(photo_id).await?;
        decide(session, Resource::Photo(Some(&photo)), Action::Edit).into_result()?;

        let updated = self.photos.replace_description(photo_id, description).await?;
        info!(photo_id = %photo_id, user_id = %editor.id, "Photo description updated");
        Ok(updated)
    }

    /// Deletes the photo, then its file. A file that cannot be removed is
    /// logged and left behind.
    pub async fn delete_photo(&self, session: &Session, photo_id: PhotoId) -> EngineResult<()> {
        let deleter = actor(session)?;
        let photo = self.load_photo(photo_id).await?;
        decide(session, Resource::Photo(Some(&photo)), Action::Delete).into_result()?;

        self.photos.delete_photo(photo_id).await?;
        if let Err(e) = self.blobs.delete(&photo.file_name).await {
            warn!(
                photo_id = %photo_id,
                file_name = %photo.file_name,
                "Failed to delete photo file, leaving it orphaned: {:?}",
                e
            );
        }

        info!(photo_id = %photo_id, user_id = %deleter.id, "Photo deleted");
        Ok(())
    }

    //=====================================================================================
    // Comments
    //=====================================================================================

    /// Appends a comment by the caller. The text is stored trimmed.
    pub async fn add_comment(
        &self,
        session: &Session,
        photo_id: PhotoId,
        text: &str,
    ) -> EngineResult<HydratedComment> {
        let text = CommentText::parse(text)?;
        let author = actor(session)?;
        let photo = self.load_photo(photo_id).await?;
        decide(
            session,
            Resource::Comment {
                photo: &photo,
                comment: None,
            },
            Action::Create,
        )
        .into_result()?;

        let comment = Comment {
            id: Uuid::new_v4(),
            author_id: author.id,
            text: text.trimmed().to_string(),
            created_at: self.clock.now(),
        };
        self.photos.append_comment(photo_id, comment.clone()).await?;

        info!(photo_id = %photo_id, comment_id = %comment.id, user_id = %author.id, "Comment added");
        Ok(HydratedComment {
            comment,
            author: UserSummary::from(author),
        })
    }

    pub async fn edit_comment(
        &self,
        session: &Session,
        photo_id: PhotoId,
        comment_id: CommentId,
        text: &str,
    ) -> EngineResult<Comment> {
        let text = CommentText::parse(text)?;
        let editor = actor(session)?;
        let photo = self.load_photo(photo_id).await?;
        let comment = comment_of(&photo, comment_id)?;
        decide(
            session,
            Resource::Comment {
                photo: &photo,
                comment: Some(comment),
            },
            Action::Edit,
        )
        .into_result()?;

        let updated = self
            .photos
            .replace_comment_text(photo_id, comment_id, text.as_str())
            .await?;
        info!(photo_id = %photo_id, comment_id = %comment_id, user_id = %editor.id, "Comment updated");
        Ok(updated)
    }

    pub async fn delete_comment(
        &self,
        session: &Session,
        photo_id: PhotoId,
        comment_id: CommentId,
    ) -> EngineResult<()> {
        let deleter = actor(session)?;
        let photo = self.load_photo(photo_id).await?;
        let comment = comment_of(&photo, comment_id)?;
        decide(
            session,
            Resource::Comment {
                photo: &photo,
                comment: Some(comment),
            },
            Action::Delete,
        )
        .into_result()?;

        self.photos.remove_comment(photo_id, comment_id).await?;
        info!(photo_id = %photo_id, comment_id = %comment_id, user_id = %deleter.id, "Comment deleted");
        Ok(())
    }

    //=====================================================================================
    // Likes
    //=====================================================================================

    /// Likes the photo if the caller has not, unlikes it if they have.
    /// Returns the resulting like set.
    pub async fn toggle_like(
        &self,
        session: &Session,
        photo_id: PhotoId,
    ) -> EngineResult<BTreeSet<UserId>> {
        let liker = actor(session)?;
        let photo = self.load_photo(photo_id).await?;
        decide(session, Resource::Like(&photo), Action::Toggle).into_result()?;

        let likes = self.photos.toggle_like(photo_id, liker.id).await?;
        info!(
            photo_id = %photo_id,
            user_id = %liker.id,
            liked = likes.contains(&liker.id),
            "Like toggled"
        );
        Ok(likes)
    }
}
