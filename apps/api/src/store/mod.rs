//! Durable flat-file storage: the credential index, per-user documents and
//! uploaded assets, all rooted under the configured data directory.
//!
//! Every store here is synchronous. Async callers go through
//! `AppState::blocking`, which runs the call on the blocking pool.

pub mod assets;
pub mod credentials;
pub mod documents;
mod fs;
pub mod password;

use thiserror::Error;

pub use assets::{AssetCategory, AssetStore};
pub use credentials::{CredentialStore, MIN_PASSWORD_LEN};
pub use documents::DocumentStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Username already exists")]
    AlreadyExists,

    #[error("Username not found")]
    NotFound,

    #[error("Incorrect password")]
    WrongPassword,

    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Invalid asset path: {0}")]
    InvalidAssetPath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
