use std::path::PathBuf;

use thiserror::Error;

/// All possible errors in the project tracker
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Cannot open database at {}: {source}", path.display())]
    Connection {
        path: PathBuf,
        source: rusqlite::Error,
    },

    #[error("Schema creation failed: {0}")]
    Schema(#[source] rusqlite::Error),

    #[error("Constraint violated: {0}")]
    Constraint(#[source] rusqlite::Error),

    #[error("Statement failed: {0}")]
    Statement(#[source] rusqlite::Error),

    #[error("Task #{0} not found")]
    TaskNotFound(i64),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TrackerError>;
