pub mod blob;
pub mod db;
pub mod password;

pub use blob::FsBlobStore;
pub use db::DbAdapter;
pub use password::Argon2Hasher;
