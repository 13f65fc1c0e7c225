//! Error types for edge-store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("invalid value for field {field}: {value:?}")]
    InvalidFieldValue { field: &'static str, value: String },

    #[error("invalid store URL format, expected <scheme>://<address>")]
    InvalidUrlFormat,

    #[error(
        "unsupported store driver: {0} (supported: {schemes})",
        schemes = crate::store::supported_schemes().join(", ")
    )]
    UnsupportedDriver(String),

    #[error("failed to connect to store: {0}")]
    StoreConnectionFailed(#[source] sqlx::Error),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
