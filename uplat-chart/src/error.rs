use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Render error: {0}")]
    Render(String),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ChartError {
    /// Process exit code: nothing (or not everything) was written.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Collapse a plotters drawing error into [`ChartError::Render`].
pub(crate) fn render_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Render(e.to_string())
}
