//! Error types for the fallible edges of the pipeline.
//!
//! The pipeline stages themselves never fail; problems in the source end up
//! as diagnostics. [`ZflError`] covers I/O, configuration and JSON export.

use std::io;

use thiserror::Error;

/// The main error type for ZFL operations.
#[derive(Debug, Error)]
pub enum ZflError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
