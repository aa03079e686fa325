//! Local git operations.
//!
//! [`GitOperations`] is the seam the migration pipeline drives;
//! [`GitRepository`] implements it over the system `git` binary.

mod command;
mod error;
mod push;
mod repository;
mod status;

pub use error::GitError;
pub use push::{
    parse_porcelain, validate_pushed_refs, PushFlag, PushReport, PushRequest, PushedRef,
    ReconciliationMethod,
};
pub use repository::GitRepository;
pub use status::{FileStatus, StatusCounts};

use serde::Serialize;
use std::fmt;

/// A git author or committer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    /// Creates an identity.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Parameters of a commit.
#[derive(Debug, Clone)]
pub struct CommitRequest {
    pub title: String,
    pub description: Option<String>,
    /// Author override; the configured identity is used otherwise.
    pub author: Option<Identity>,
    /// Committer override; the configured identity is used otherwise.
    pub committer: Option<Identity>,
    /// Stage modifications to tracked files before committing.
    pub stage_tracked: bool,
}

impl CommitRequest {
    /// The full commit message: title, then a blank line and the description.
    #[must_use]
    pub fn message(&self) -> String {
        match self.description.as_deref().map(str::trim) {
            Some(description) if !description.is_empty() => {
                format!("{}\n\n{description}", self.title)
            }
            _ => self.title.clone(),
        }
    }
}

/// Operations on one local working tree.
#[allow(async_fn_in_trait)]
pub trait GitOperations {
    /// Sets the repository-local user name and email.
    async fn setup_identity(&self, identity: &Identity) -> Result<(), GitError>;

    /// Name of the checked out branch.
    async fn current_branch(&self) -> Result<String, GitError>;

    /// Checks out `branch`, creating it when it exists neither locally nor on
    /// origin. A new branch starts from `from_branch`, or from the current
    /// branch when none is given.
    async fn checkout_or_create_branch(
        &self,
        branch: &str,
        from_branch: Option<&str>,
    ) -> Result<(), GitError>;

    /// Records a commit.
    async fn commit(&self, request: &CommitRequest) -> Result<(), GitError>;

    /// Pushes the current branch, integrating the remote branch first when it
    /// already exists.
    async fn push(&self, request: &PushRequest) -> Result<PushReport, GitError>;

    /// Whether `branch` has an upstream configured.
    async fn has_tracking_branch(&self, branch: &str) -> Result<bool, GitError>;

    /// Whether `branch` (default: current) has commits its upstream lacks.
    /// A branch without an upstream never needs a push.
    async fn needs_push(&self, branch: Option<&str>) -> Result<bool, GitError>;

    /// Number of working tree entries in a status category.
    async fn file_count(&self, status: FileStatus) -> Result<usize, GitError>;
}
