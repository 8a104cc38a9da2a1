use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for uplat.
#[derive(Error, Debug)]
pub enum UplatError {
    #[error("Input directory {path} unreadable: {source}")]
    InputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unreadable file {path}: {source}")]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl UplatError {
    /// Process exit code for a run that ends with this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            UplatError::InputDir { .. }
            | UplatError::ConfigError(_)
            | UplatError::UnreadableFile { .. } => 1,
        }
    }
}

/// Why a single log line was rejected. Never fatal to the run.
#[derive(Error, Debug)]
pub enum MalformedRecord {
    #[error("invalid JSON record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("invalid time_local {value:?}: {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("invalid upstream_response_time {value:?}")]
    ResponseTime { value: String },
}
