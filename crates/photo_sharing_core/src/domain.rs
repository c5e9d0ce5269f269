//! crates/photo_sharing_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use uuid::Uuid;

pub type UserId = Uuid;
pub type PhotoId = Uuid;
pub type CommentId = Uuid;

/// A registered user as seen by the rest of the application.
/// Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub login_name: String,
    pub first_name: String,
    pub last_name: String,
    pub location: String,
    pub description: String,
    pub occupation: String,
}

impl User {
    /// The public identity returned from registration and login.
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            login_name: self.login_name.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: Some(self.id),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            location: self.location.clone(),
            description: self.description.clone(),
            occupation: self.occupation.clone(),
        }
    }
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub hashed_password: String,
}

/// A user record ready to be inserted by the credential store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub login_name: String,
    pub hashed_password: String,
    pub first_name: String,
    pub last_name: String,
    pub location: String,
    pub description: String,
    pub occupation: String,
}

impl NewUser {
    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            login_name: self.login_name.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            location: self.location.clone(),
            description: self.description.clone(),
            occupation: self.occupation.clone(),
        }
    }
}

/// The public identity of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub login_name: String,
    pub first_name: String,
    pub last_name: String,
}

/// The session capability handed to every core operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(Identity),
}

impl Session {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Authenticated(identity) => Some(identity),
            Session::Anonymous => None,
        }
    }
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

/// A comment embedded in its parent photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub author_id: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// The photo aggregate root.
///
/// `owner_id` and `file_name` are fixed at upload. `comments` keeps insertion
/// order; `likes` holds each user id at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub id: PhotoId,
    pub owner_id: UserId,
    pub file_name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub comments: Vec<Comment>,
    pub likes: BTreeSet<UserId>,
}

impl Photo {
    pub fn new(id: PhotoId, owner_id: UserId, file_name: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            owner_id,
            file_name,
            description: String::new(),
            created_at,
            comments: Vec::new(),
            likes: BTreeSet::new(),
        }
    }

    pub fn comment(&self, comment_id: CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }
}

/// Display name of a user, or the placeholder when the user no longer resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Option<UserId>,
    pub first_name: String,
    pub last_name: String,
}

impl UserSummary {
    /// The "Unknown User" stand-in for a dangling reference.
    pub fn placeholder() -> Self {
        Self {
            id: None,
            first_name: "Unknown".to_string(),
            last_name: "User".to_string(),
        }
    }
}

impl From<&Identity> for UserSummary {
    fn from(identity: &Identity) -> Self {
        Self {
            id: Some(identity.id),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
        }
    }
}

/// Everything a user shows on their profile page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub location: String,
    pub description: String,
    pub occupation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydratedComment {
    pub comment: Comment,
    pub author: UserSummary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydratedPhoto {
    pub id: PhotoId,
    pub owner_id: UserId,
    pub owner: UserSummary,
    pub file_name: String,
    pub url: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub comments: Vec<HydratedComment>,
    pub likes: BTreeSet<UserId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserStats {
    pub photo_count: usize,
    pub comment_count: usize,
}

/// Minimal reference to the photo a comment belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRef {
    pub id: PhotoId,
    pub file_name: String,
    pub owner_id: UserId,
}

/// A comment listed on its author's activity page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserComment {
    pub comment: Comment,
    pub photo: PhotoRef,
}
