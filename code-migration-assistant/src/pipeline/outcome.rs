//! Per-repository outcomes.

use crate::pull_requests::PrStatus;
use serde::Serialize;

/// Stage whose failure aborted a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    IdentitySetup,
    BranchCheck,
    SearchReplace,
    PullRequestQuery,
    Push,
    PullRequestCreate,
}

impl FailureKind {
    /// Process exit code reported when this failure decides the run status.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::IdentitySetup => 2,
            Self::BranchCheck => 3,
            Self::Push => 4,
            Self::PullRequestCreate => 5,
            Self::PullRequestQuery => 7,
            Self::SearchReplace => 10,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IdentitySetup => "identity setup",
            Self::BranchCheck => "branch check",
            Self::SearchReplace => "search and replace",
            Self::PullRequestQuery => "pull request query",
            Self::Push => "push",
            Self::PullRequestCreate => "pull request creation",
        }
    }
}

/// How a repository's pipeline ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RepositoryOutcome {
    /// Every enabled stage ran.
    Completed {
        /// Result of the pull request stage, when it ran.
        pull_request: Option<PrStatus>,
    },

    /// Nothing (more) to do for this repository.
    Skipped {
        /// Why the remaining stages were skipped.
        reason: String,
    },

    /// A gating stage failed.
    Aborted {
        failure: FailureKind,
        /// Error message.
        error: String,
    },
}

impl RepositoryOutcome {
    /// Returns the outcome as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed { .. } => "completed",
            Self::Skipped { .. } => "skipped",
            Self::Aborted { .. } => "aborted",
        }
    }

    /// The failure category of an aborted repository.
    #[must_use]
    pub fn failure(&self) -> Option<FailureKind> {
        match self {
            Self::Aborted { failure, .. } => Some(*failure),
            _ => None,
        }
    }

    pub(crate) fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    pub(crate) fn aborted(failure: FailureKind, error: impl ToString) -> Self {
        Self::Aborted {
            failure,
            error: error.to_string(),
        }
    }
}
