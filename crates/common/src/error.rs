//! Error types for VisaHub

use thiserror::Error;

/// Result type alias using VisaHub Error
pub type Result<T> = std::result::Result<T, Error>;

/// VisaHub error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("invalid document id: {0}")]
    InvalidId(#[from] mongodb::bson::oid::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] mongodb::bson::ser::Error),

    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },
}
