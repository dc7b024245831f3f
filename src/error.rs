//! Error types for lina
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, no project context, bad config)
//! - 3: Task not found
//! - 4: Operation failed (storage, git, serialization)

use thiserror::Error;

/// Exit codes for the lina CLI
pub mod exit_codes {
    pub const USER_ERROR: i32 = 2;
    pub const NOT_FOUND: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for lina operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not in a git repository: use -g (general), -o (office), or -p <project>")]
    NotInProject,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown config key \"{0}\" (available keys: storage)")]
    UnknownConfigKey(String),

    // Not found (exit code 3)
    #[error("Task with ID \"{0}\" not found")]
    TaskNotFound(String),

    // Operation failures (exit code 4)
    #[error("Duplicate task id in collection: {0}")]
    DuplicateTaskId(String),

    #[error("Task file is unusable, refusing to overwrite it: {0}")]
    CorruptStorage(String),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArgument(_)
            | Error::NotInProject
            | Error::InvalidConfig(_)
            | Error::UnknownConfigKey(_) => exit_codes::USER_ERROR,

            Error::TaskNotFound(_) => exit_codes::NOT_FOUND,

            Error::DuplicateTaskId(_)
            | Error::CorruptStorage(_)
            | Error::Git(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details attached to JSON error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::TaskNotFound(id) => Some(serde_json::json!({ "id": id })),
            Error::DuplicateTaskId(id) => Some(serde_json::json!({ "id": id })),
            _ => None,
        }
    }
}

/// Result type alias for lina operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
