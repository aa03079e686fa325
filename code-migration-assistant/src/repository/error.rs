//! Repository materialization error types.

use crate::git::GitError;
use thiserror::Error;

/// Errors that can occur while turning a configured repository into a
/// working tree.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A local source path does not exist.
    #[error("Invalid 'local' repository source path '{path}': no such path")]
    NoSuchPath { path: String },

    /// A local source path could not be resolved.
    #[error("Failed to resolve local repository path '{path}': {source}")]
    ResolvePath {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A local source path is not a git working tree.
    #[error("'{path}' is not a git working tree")]
    NotAWorkingTree { path: String },

    /// The clone directory could not be created.
    #[error("Failed to prepare clone directory '{path}': {source}")]
    CloneDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Cloning a remote source failed.
    #[error("Failed to clone '{url}': {source}")]
    CloneFailed {
        url: String,
        #[source]
        source: GitError,
    },

    /// Inspecting the working tree failed.
    #[error(transparent)]
    Git(#[from] GitError),
}
