//! services/api/src/web/dto.rs
//!
//! Request and response payloads of the REST API. The core types carry no
//! serialization concerns, so every JSON shape lives here.

use chrono::{DateTime, Utc};
use photo_sharing_core::domain::{
    Comment, HydratedComment, HydratedPhoto, Identity, Photo, UserComment, UserProfile,
    UserStats, UserSummary,
};
use photo_sharing_core::ports::BlobStore;
use photo_sharing_core::RegistrationForm;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Request Payloads
//=========================================================================================

/// Missing fields deserialize as empty and are rejected by the core's validation.
#[derive(Deserialize, ToSchema, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RegisterRequest {
    pub login_name: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub occupation: Option<String>,
}

impl From<RegisterRequest> for RegistrationForm {
    fn from(req: RegisterRequest) -> Self {
        RegistrationForm {
            login_name: req.login_name,
            password: req.password,
            confirm_password: req.confirm_password,
            first_name: req.first_name,
            last_name: req.last_name,
            location: req.location,
            description: req.description,
            occupation: req.occupation,
        }
    }
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(default, deny_unknown_fields)]
pub struct LoginRequest {
    pub login_name: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(default, deny_unknown_fields)]
pub struct CommentRequest {
    pub comment: String,
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(default, deny_unknown_fields)]
pub struct DescriptionRequest {
    pub description: String,
}

//=========================================================================================
// Response Payloads
//=========================================================================================

/// The public identity returned by registration, login and the session check.
#[derive(Serialize, ToSchema, Debug)]
pub struct IdentityResponse {
    pub id: Uuid,
    pub login_name: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<Identity> for IdentityResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            login_name: identity.login_name,
            first_name: identity.first_name,
            last_name: identity.last_name,
        }
    }
}

/// `id` is null for the "Unknown User" placeholder.
#[derive(Serialize, ToSchema, Debug)]
pub struct UserSummaryResponse {
    pub id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
}

impl From<UserSummary> for UserSummaryResponse {
    fn from(summary: UserSummary) -> Self {
        Self {
            id: summary.id,
            first_name: summary.first_name,
            last_name: summary.last_name,
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct UserProfileResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub location: String,
    pub description: String,
    pub occupation: String,
}

impl From<UserProfile> for UserProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            location: profile.location,
            description: profile.description,
            occupation: profile.occupation,
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct CommentResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            author_id: comment.author_id,
            text: comment.text,
            created_at: comment.created_at,
        }
    }
}

/// A photo as stored, returned by upload and description edits.
#[derive(Serialize, ToSchema, Debug)]
pub struct PhotoResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub file_name: String,
    pub url: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub comments: Vec<CommentResponse>,
    pub likes: Vec<Uuid>,
}

impl PhotoResponse {
    pub fn new(photo: Photo, blobs: &dyn BlobStore) -> Self {
        Self {
            id: photo.id,
            owner_id: photo.owner_id,
            url: blobs.url_for(&photo.file_name),
            file_name: photo.file_name,
            description: photo.description,
            created_at: photo.created_at,
            comments: photo.comments.into_iter().map(CommentResponse::from).collect(),
            likes: photo.likes.into_iter().collect(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct HydratedCommentResponse {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author: UserSummaryResponse,
}

impl From<HydratedComment> for HydratedCommentResponse {
    fn from(hydrated: HydratedComment) -> Self {
        Self {
            id: hydrated.comment.id,
            text: hydrated.comment.text,
            created_at: hydrated.comment.created_at,
            author: hydrated.author.into(),
        }
    }
}

/// A photo joined with its owner's and commenters' display names.
#[derive(Serialize, ToSchema, Debug)]
pub struct HydratedPhotoResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub owner: UserSummaryResponse,
    pub file_name: String,
    pub url: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub comments: Vec<HydratedCommentResponse>,
    pub likes: Vec<Uuid>,
}

impl From<HydratedPhoto> for HydratedPhotoResponse {
    fn from(photo: HydratedPhoto) -> Self {
        Self {
            id: photo.id,
            owner_id: photo.owner_id,
            owner: photo.owner.into(),
            file_name: photo.file_name,
            url: photo.url,
            description: photo.description,
            created_at: photo.created_at,
            comments: photo
                .comments
                .into_iter()
                .map(HydratedCommentResponse::from)
                .collect(),
            likes: photo.likes.into_iter().collect(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug, PartialEq, Eq)]
pub struct UserStatsResponse {
    pub photo_count: usize,
    pub comment_count: usize,
}

impl From<UserStats> for UserStatsResponse {
    fn from(stats: UserStats) -> Self {
        Self {
            photo_count: stats.photo_count,
            comment_count: stats.comment_count,
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct PhotoRefResponse {
    pub id: Uuid,
    pub file_name: String,
    pub url: String,
    pub owner_id: Uuid,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct UserCommentResponse {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub photo: PhotoRefResponse,
}

impl UserCommentResponse {
    pub fn new(entry: UserComment, blobs: &dyn BlobStore) -> Self {
        Self {
            id: entry.comment.id,
            text: entry.comment.text,
            created_at: entry.comment.created_at,
            photo: PhotoRefResponse {
                id: entry.photo.id,
                url: blobs.url_for(&entry.photo.file_name),
                file_name: entry.photo.file_name,
                owner_id: entry.photo.owner_id,
            },
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct ServiceInfoResponse {
    pub name: String,
    pub version: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use photo_sharing_core::memory::InMemoryBlobStore;

    #[test]
    fn register_request_rejects_unknown_fields() {
        let parsed = serde_json::from_str::<RegisterRequest>(r#"{"login_name":"a","admin":true}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let req: RegisterRequest = serde_json::from_str(r#"{"login_name":"ada"}"#).unwrap();
        let form = RegistrationForm::from(req);
        assert_eq!(form.login_name, "ada");
        assert!(form.password.is_empty());
        assert!(form.location.is_none());
    }

    #[test]
    fn placeholder_summary_serializes_null_id() {
        let json = serde_json::to_value(UserSummaryResponse::from(UserSummary::placeholder())).unwrap();
        assert!(json["id"].is_null());
        assert_eq!(json["first_name"], "Unknown");
        assert_eq!(json["last_name"], "User");
    }

    #[test]
    fn photo_response_carries_blob_url() {
        let blobs = InMemoryBlobStore::new("/images");
        let photo = Photo::new(Uuid::new_v4(), Uuid::new_v4(), "a.png".into(), Utc::now());
        let response = PhotoResponse::new(photo, &blobs);
        assert_eq!(response.url, "/images/a.png");
        assert!(response.likes.is_empty());
    }
}
