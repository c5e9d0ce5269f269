//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the storage ports from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! Comments and likes live in their own tables keyed by photo, so every
//! aggregate mutation is a single statement (or one short transaction)
//! rather than a rewrite of the whole photo.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use photo_sharing_core::domain::{
    AuthSession, Comment, CommentId, NewUser, Photo, PhotoId, User, UserCredentials, UserId,
};
use photo_sharing_core::ports::{
    CredentialStore, PhotoStore, PortError, PortResult, SessionStore,
};
use sqlx::{FromRow, PgPool};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the storage ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Loads comments and likes for the given photo rows and assembles aggregates
    /// in the order of `records`.
    async fn assemble(&self, records: Vec<PhotoRecord>) -> PortResult<Vec<Photo>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();

        let comments = sqlx::query_as::<_, CommentRecord>(
            "SELECT id, photo_id, author_id, text, created_at FROM photo_comments \
             WHERE photo_id = ANY($1) ORDER BY position ASC",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let likes = sqlx::query_as::<_, LikeRecord>(
            "SELECT photo_id, user_id FROM photo_likes WHERE photo_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let mut comments_by_photo: HashMap<Uuid, Vec<Comment>> = HashMap::new();
        for record in comments {
            comments_by_photo
                .entry(record.photo_id)
                .or_default()
                .push(record.to_domain());
        }
        let mut likes_by_photo: HashMap<Uuid, BTreeSet<UserId>> = HashMap::new();
        for record in likes {
            likes_by_photo
                .entry(record.photo_id)
                .or_default()
                .insert(record.user_id);
        }

        Ok(records
            .into_iter()
            .map(|record| {
                let comments = comments_by_photo.remove(&record.id).unwrap_or_default();
                let likes = likes_by_photo.remove(&record.id).unwrap_or_default();
                record.to_domain(comments, likes)
            })
            .collect())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn db_error_code(e: &sqlx::Error) -> Option<String> {
    e.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code.into_owned())
}

fn photo_not_found(photo_id: PhotoId) -> PortError {
    PortError::NotFound(format!("Photo {} not found", photo_id))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    login_name: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    location: String,
    description: String,
    occupation: String,
}
impl UserRecord {
    fn to_credentials(self) -> UserCredentials {
        UserCredentials {
            user: User {
                id: self.id,
                login_name: self.login_name,
                first_name: self.first_name,
                last_name: self.last_name,
                location: self.location,
                description: self.description,
                occupation: self.occupation,
            },
            hashed_password: self.password_hash,
        }
    }
}

const USER_COLUMNS: &str =
    "id, login_name, password_hash, first_name, last_name, location, description, occupation";

#[derive(FromRow)]
struct AuthSessionRecord {
    id: String,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}
impl AuthSessionRecord {
    fn to_domain(self) -> AuthSession {
        AuthSession {
            id: self.id,
            user_id: self.user_id,
            expires_at: self.expires_at,
        }
    }
}

#[derive(FromRow)]
struct PhotoRecord {
    id: Uuid,
    owner_id: Uuid,
    file_name: String,
    description: String,
    created_at: DateTime<Utc>,
}
impl PhotoRecord {
    fn to_domain(self, comments: Vec<Comment>, likes: BTreeSet<UserId>) -> Photo {
        Photo {
            id: self.id,
            owner_id: self.owner_id,
            file_name: self.file_name,
            description: self.description,
            created_at: self.created_at,
            comments,
            likes,
        }
    }
}

const PHOTO_COLUMNS: &str = "id, owner_id, file_name, description, created_at";

#[derive(FromRow)]
struct CommentRecord {
    id: Uuid,
    photo_id: Uuid,
    author_id: Uuid,
    text: String,
    created_at: DateTime<Utc>,
}
impl CommentRecord {
    fn to_domain(self) -> Comment {
        Comment {
            id: self.id,
            author_id: self.author_id,
            text: self.text,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct LikeRecord {
    photo_id: Uuid,
    user_id: Uuid,
}

//=========================================================================================
// `CredentialStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl CredentialStore for DbAdapter {
    async fn find_by_login(&self, login_name: &str) -> PortResult<Option<UserCredentials>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE login_name = $1",
            USER_COLUMNS
        ))
        .bind(login_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(UserRecord::to_credentials))
    }

    async fn exists_by_login(&self, login_name: &str) -> PortResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE login_name = $1)")
                .bind(login_name)
                .fetch_one(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(exists)
    }

    async fn find_by_id(&self, user_id: UserId) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(|r| r.to_credentials().user))
    }

    async fn create(&self, user: NewUser) -> PortResult<User> {
        sqlx::query(
            "INSERT INTO users \
             (id, login_name, password_hash, first_name, last_name, location, description, occupation) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(user.id)
        .bind(&user.login_name)
        .bind(&user.hashed_password)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.location)
        .bind(&user.description)
        .bind(&user.occupation)
        .execute(&self.pool)
        .await
        .map_err(|e| match db_error_code(&e).as_deref() {
            Some(UNIQUE_VIOLATION) => {
                PortError::Conflict(format!("Login name {} already exists", user.login_name))
            }
            _ => unexpected(e),
        })?;
        Ok(user.to_user())
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users ORDER BY created_at ASC, id ASC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_credentials().user).collect())
    }
}

//=========================================================================================
// `SessionStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl SessionStore for DbAdapter {
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn find_auth_session(&self, session_id: &str) -> PortResult<Option<AuthSession>> {
        let record = sqlx::query_as::<_, AuthSessionRecord>(
            "SELECT id, user_id, expires_at FROM auth_sessions WHERE id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(AuthSessionRecord::to_domain))
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}

//=========================================================================================
// `PhotoStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl PhotoStore for DbAdapter {
    async fn insert_photo(&self, photo: Photo) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO photos (id, owner_id, file_name, description, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(photo.id)
        .bind(photo.owner_id)
        .bind(&photo.file_name)
        .bind(&photo.description)
        .bind(photo.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match db_error_code(&e).as_deref() {
            Some(UNIQUE_VIOLATION) => PortError::Conflict(format!("Photo {} already exists", photo.id)),
            _ => unexpected(e),
        })?;
        Ok(())
    }

    async fn get_photo(&self, photo_id: PhotoId) -> PortResult<Option<Photo>> {
        let record = sqlx::query_as::<_, PhotoRecord>(&format!(
            "SELECT {} FROM photos WHERE id = $1",
            PHOTO_COLUMNS
        ))
        .bind(photo_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        match record {
            Some(record) => Ok(self.assemble(vec![record]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_photos(&self) -> PortResult<Vec<Photo>> {
        let records = sqlx::query_as::<_, PhotoRecord>(&format!(
            "SELECT {} FROM photos ORDER BY seq ASC",
            PHOTO_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        self.assemble(records).await
    }

    async fn list_photos_by_owner(&self, owner_id: UserId) -> PortResult<Vec<Photo>> {
        let records = sqlx::query_as::<_, PhotoRecord>(&format!(
            "SELECT {} FROM photos WHERE owner_id = $1 ORDER BY seq ASC",
            PHOTO_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        self.assemble(records).await
    }

    async fn delete_photo(&self, photo_id: PhotoId) -> PortResult<()> {
        // Comments and likes go with it through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM photos WHERE id = $1")
            .bind(photo_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(photo_not_found(photo_id));
        }
        Ok(())
    }

    async fn replace_description(&self, photo_id: PhotoId, description: &str) -> PortResult<Photo> {
        let result = sqlx::query("UPDATE photos SET description = $2 WHERE id = $1")
            .bind(photo_id)
            .bind(description)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(photo_not_found(photo_id));
        }
        self.get_photo(photo_id)
            .await?
            .ok_or_else(|| photo_not_found(photo_id))
    }

    async fn append_comment(&self, photo_id: PhotoId, comment: Comment) -> PortResult<()> {
        let result = sqlx::query(
            "INSERT INTO photo_comments (id, photo_id, author_id, text, created_at) \
             SELECT $1, $2, $3, $4, $5 WHERE EXISTS (SELECT 1 FROM photos WHERE id = $2)",
        )
        .bind(comment.id)
        .bind(photo_id)
        .bind(comment.author_id)
        .bind(&comment.text)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match db_error_code(&e).as_deref() {
            // The photo was deleted between the existence check and the insert.
            Some(FOREIGN_KEY_VIOLATION) => photo_not_found(photo_id),
            _ => unexpected(e),
        })?;
        if result.rows_affected() == 0 {
            return Err(photo_not_found(photo_id));
        }
        Ok(())
    }

    async fn replace_comment_text(
        &self,
        photo_id: PhotoId,
        comment_id: CommentId,
        text: &str,
    ) -> PortResult<Comment> {
        let record = sqlx::query_as::<_, CommentRecord>(
            "UPDATE photo_comments SET text = $3 WHERE photo_id = $1 AND id = $2 \
             RETURNING id, photo_id, author_id, text, created_at",
        )
        .bind(photo_id)
        .bind(comment_id)
        .bind(text)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record
            .map(CommentRecord::to_domain)
            .ok_or_else(|| PortError::NotFound(format!("Comment {} not found", comment_id)))
    }

    async fn remove_comment(&self, photo_id: PhotoId, comment_id: CommentId) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM photo_comments WHERE photo_id = $1 AND id = $2")
            .bind(photo_id)
            .bind(comment_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Comment {} not found", comment_id)));
        }
        Ok(())
    }

    async fn toggle_like(&self, photo_id: PhotoId, user_id: UserId) -> PortResult<BTreeSet<UserId>> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        // Locking the photo row serializes toggles on this photo, so two
        // toggles by one user can never both take the insert branch.
        let locked: Option<Uuid> = sqlx::query_scalar("SELECT id FROM photos WHERE id = $1 FOR UPDATE")
            .bind(photo_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(unexpected)?;
        if locked.is_none() {
            return Err(photo_not_found(photo_id));
        }

        let removed = sqlx::query("DELETE FROM photo_likes WHERE photo_id = $1 AND user_id = $2")
            .bind(photo_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        if removed.rows_affected() == 0 {
            sqlx::query(
                "INSERT INTO photo_likes (photo_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(photo_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        }

        let likes: Vec<Uuid> = sqlx::query_scalar("SELECT user_id FROM photo_likes WHERE photo_id = $1")
            .bind(photo_id)
            .fetch_all(&mut *tx)
            .await
            .map_err(unexpected)?;
        tx.commit().await.map_err(unexpected)?;

        Ok(likes.into_iter().collect())
    }
}
