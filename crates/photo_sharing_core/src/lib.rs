pub mod domain;
pub mod engine;
pub mod error;
pub mod feed;
pub mod hydrator;
pub mod input;
pub mod memory;
pub mod policy;
pub mod ports;
pub mod session;

pub use domain::{
    AuthSession, Comment, CommentId, HydratedComment, HydratedPhoto, Identity, NewUser, Photo,
    PhotoId, PhotoRef, Session, User, UserComment, UserCredentials, UserId, UserProfile,
    UserStats, UserSummary,
};
pub use engine::MutationEngine;
pub use error::{EngineError, EngineResult};
pub use feed::FeedService;
pub use hydrator::FeedHydrator;
pub use input::{CommentText, ImageUpload, LoginCredentials, Registration, RegistrationForm, ValidationError};
pub use ports::{
    BlobStore, Clock, CredentialStore, PasswordHasher, PhotoStore, PortError, PortResult,
    SessionStore, SystemClock,
};
pub use session::{LoginOutcome, SessionManager};
