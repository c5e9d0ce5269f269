//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use photo_sharing_core::input::DEFAULT_MAX_UPLOAD_BYTES;
use photo_sharing_core::session::{DEFAULT_SESSION_TTL_HOURS, MAX_SESSION_TTL_HOURS};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub log_level: Level,
    pub images_dir: PathBuf,
    pub images_url_prefix: String,
    pub session_ttl_hours: i64,
    pub max_upload_bytes: usize,
}

fn parse_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

fn check_session_ttl(hours: i64) -> Result<(), ConfigError> {
    if !(1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
        return Err(ConfigError::InvalidValue(
            "SESSION_TTL_HOURS".to_string(),
            format!("must be between 1 and {}", MAX_SESSION_TTL_HOURS),
        ));
    }
    Ok(())
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Blob Storage Settings ---
        let images_dir = std::env::var("IMAGES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./images"));
        let images_url_prefix = std::env::var("IMAGES_URL_PREFIX")
            .map(|prefix| prefix.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| "/images".to_string());
        if !images_url_prefix.starts_with('/') {
            return Err(ConfigError::InvalidValue(
                "IMAGES_URL_PREFIX".to_string(),
                "must start with '/' and name a path below the root".to_string(),
            ));
        }

        // --- Load Session and Upload Limits ---
        let session_ttl_hours = parse_var("SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS)?;
        check_session_ttl(session_ttl_hours)?;
        let max_upload_bytes = parse_var("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            images_dir,
            images_url_prefix,
            session_ttl_hours,
            max_upload_bytes,
        })
    }

    /// Settings for running against the in-memory store with blobs under `images_dir`.
    pub fn local(images_dir: PathBuf) -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8080)),
            database_url: None,
            log_level: Level::INFO,
            images_dir,
            images_url_prefix: "/images".to_string(),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}
