//! Pattern engine error types.

use thiserror::Error;

/// Structural failures that stop a scan.
///
/// Problems with a single file or pattern are logged and skipped instead.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The root could not be read.
    #[error("Failed to access search root '{path}': {source}")]
    Root {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The root is not a directory.
    #[error("Search root '{path}' is not a directory")]
    NotADirectory { path: String },

    /// Walking the root directory itself failed.
    #[error("Failed to traverse '{path}': {source}")]
    Walk {
        path: String,
        #[source]
        source: walkdir::Error,
    },
}
