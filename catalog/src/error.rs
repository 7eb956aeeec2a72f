//! Error types for catalog operations.

use std::path::PathBuf;

use crate::filter::SchemaFault;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Catalog not initialized at {0}")]
    NotInitialized(PathBuf),

    #[error("Catalog already initialized at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed filter: {0}")]
    Schema(#[from] SchemaFault),
}

pub type Result<T> = std::result::Result<T, Error>;
