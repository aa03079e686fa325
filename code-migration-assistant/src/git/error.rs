//! Git error types.

use super::push::PushFlag;
use thiserror::Error;

/// Errors that can occur while driving the `git` binary.
#[derive(Debug, Error)]
pub enum GitError {
    /// The `git` process could not be started.
    #[error("Failed to execute git {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A git command exited unsuccessfully.
    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// A git command printed something other than what was asked for.
    #[error("git {command} returned unexpected output '{output}'")]
    UnexpectedOutput { command: String, output: String },

    /// A git command did not finish in time and was killed.
    #[error("git {command} timed out after {timeout_secs} seconds")]
    Timeout { command: String, timeout_secs: u64 },

    /// The remote is not configured.
    #[error("Error accessing remote '{remote}': No such remote")]
    NoSuchRemote { remote: String },

    /// The remote exists but has no url.
    #[error("'{remote}' is not a valid remote. Valid remotes have an url entry in the repository's configuration")]
    InvalidRemote { remote: String },

    /// The branch to create a new branch from is neither local nor on origin.
    #[error("'{base}' based on branch doesn't exist")]
    MissingBaseBranch { base: String },

    /// HEAD is not on a branch.
    #[error("HEAD is detached, there is no current branch")]
    DetachedHead,

    /// The remote reported no refs at all.
    #[error("Pushing changes to remote '{remote}' completely failed: {message}")]
    PushFailed { remote: String, message: String },

    /// The remote refused a ref.
    #[error("Push of '{reference}' was rejected ({flag}): {summary}")]
    PushRejected {
        reference: String,
        flag: PushFlag,
        summary: String,
    },
}
