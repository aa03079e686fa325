//! Everything the pipeline needs to know that is shared by all repositories.

use crate::config::{CommitMessage, Mode, TargetBranch, TargetsConfig};
use crate::git::{Identity, PushRequest, ReconciliationMethod};
use crate::patterns::PatternSet;
use crate::pull_requests::PullRequestConfig;
use crate::repository::ProviderKind;
use std::time::Duration;

/// Run-wide migration settings.
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    pub mode: Mode,
    pub target_branch: TargetBranch,
    pub patterns: PatternSet,
    pub excluded_paths: Vec<String>,
    pub include_hidden_dirs: bool,
    pub commit_message: CommitMessage,
    pub pull_request: Option<PullRequestConfig>,
    /// Identity configured in each repository and used for commits.
    pub identity: Identity,
    pub push: PushRequest,
}

impl MigrationPlan {
    /// Combines a targets document with runtime settings.
    pub fn new(
        targets: &TargetsConfig,
        identity: Identity,
        push_timeout: Duration,
        reconciliation: ReconciliationMethod,
        include_hidden_dirs: bool,
    ) -> Self {
        Self {
            mode: targets.mode,
            target_branch: targets.target_branch.clone(),
            patterns: targets.replacements.clone(),
            excluded_paths: targets.files_to_exclude.clone(),
            include_hidden_dirs,
            commit_message: targets.commit_message.clone(),
            pull_request: targets.pull_request.clone(),
            identity,
            push: PushRequest::to_origin(push_timeout, reconciliation),
        }
    }

    /// Fully qualified target ref of pull requests for `kind`, when
    /// configured.
    #[must_use]
    pub fn pull_request_target(&self, kind: ProviderKind) -> Option<String> {
        self.pull_request
            .as_ref()
            .and_then(|config| config.target_ref(kind))
    }
}
