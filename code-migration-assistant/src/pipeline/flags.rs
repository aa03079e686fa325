//! Stage switches of one repository's pipeline.

use crate::config::Mode;
use serde::Serialize;

/// Which stages run for a repository.
///
/// Derived from the run mode and afterwards only ever narrowed: the
/// `without_*` methods turn a stage off and nothing turns one back on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PipelineFlags {
    setup_identity: bool,
    check_branch: bool,
    commit: bool,
    push: bool,
    create_pull_request: bool,
}

impl PipelineFlags {
    /// Initial flags for a run mode.
    #[must_use]
    pub fn for_mode(mode: Mode) -> Self {
        let full = mode == Mode::Prod;
        Self {
            setup_identity: full,
            check_branch: full,
            commit: full,
            push: full,
            create_pull_request: full,
        }
    }

    #[must_use]
    pub fn setup_identity(&self) -> bool {
        self.setup_identity
    }

    #[must_use]
    pub fn check_branch(&self) -> bool {
        self.check_branch
    }

    #[must_use]
    pub fn commit(&self) -> bool {
        self.commit
    }

    #[must_use]
    pub fn push(&self) -> bool {
        self.push
    }

    #[must_use]
    pub fn create_pull_request(&self) -> bool {
        self.create_pull_request
    }

    /// Search and replace is the only stage left.
    #[must_use]
    pub fn search_only(&self) -> bool {
        !(self.setup_identity
            || self.check_branch
            || self.commit
            || self.push
            || self.create_pull_request)
    }

    #[must_use]
    pub fn without_commit(self) -> Self {
        Self {
            commit: false,
            ..self
        }
    }

    #[must_use]
    pub fn without_push(self) -> Self {
        Self { push: false, ..self }
    }

    #[must_use]
    pub fn without_pull_request(self) -> Self {
        Self {
            create_pull_request: false,
            ..self
        }
    }
}
