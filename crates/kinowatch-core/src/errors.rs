use std::path::PathBuf;

/// Core error type for kinowatch.
///
/// Adapter crates map their specific errors into this type so callers can
/// handle failures consistently. Per-fetch failures use the separate
/// [`crate::fetch::FetchError`], which never escapes the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("seen-state write failed: {path}: {source}")]
    SeenWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
