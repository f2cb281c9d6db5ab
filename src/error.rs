//! Error types for the loadmaster application.

use thiserror::Error;

/// Errors that can occur when parsing stored or user-supplied values.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unknown workout format: {0}")]
    UnknownFormat(String),

    #[error("unknown readiness level: {0}")]
    UnknownLevel(String),
}

/// Errors that can occur when reading or writing a profile file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("profile file not found: {0}")]
    FileNotFound(String),

    #[error("cannot read profile: {0}")]
    CannotRead(String),

    #[error("invalid profile JSON: {0}")]
    InvalidJson(String),

    #[error("cannot write profile: {0}")]
    CannotWrite(String),
}
