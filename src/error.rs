use std::path::PathBuf;
use thiserror::Error;

/// Failure to load the streaming history export. Fatal: no meaningful
/// computation is possible without the data, and loads are all-or-nothing.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("data directory not found: {}", .0.display())]
    DirectoryMissing(PathBuf),

    #[error("no streaming history files found in {}", .0.display())]
    NoFiles(PathBuf),

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("streaming history is empty after loading {0} file(s)")]
    Empty(usize),
}

/// Too few sessions for clustering to be meaningful. Recovered internally by
/// falling back to a single-cluster result; never surfaced to callers of the
/// analytics entry points.
#[derive(Debug, Error)]
#[error("{available} session(s) available, {required} required for clustering")]
pub struct InsufficientDataError {
    pub available: usize,
    pub required: usize,
}
