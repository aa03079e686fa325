//! Run summary types.

use super::RunStatus;
use crate::config::Mode;
use crate::pipeline::{RepositoryOutcome, RepositoryReport};
use crate::pull_requests::PrStatus;
use crate::repository::LoadFailure;
use serde::Serialize;

/// A configured repository that never reached the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct NotLoaded {
    pub repository: String,
    pub error: String,
}

/// Summary of a complete run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Run mode, once the targets document is loaded.
    pub mode: Option<Mode>,

    /// Number of repositories in the targets document.
    pub repositories_configured: usize,

    /// Repositories that could not be materialized.
    pub not_loaded: Vec<NotLoaded>,

    /// Per-repository results in processing order.
    pub reports: Vec<RepositoryReport>,

    /// Number of repositories whose enabled stages all ran.
    pub completed: usize,

    /// Number of repositories with nothing (more) to do.
    pub skipped: usize,

    /// Number of repositories stopped by a failure.
    pub aborted: usize,

    /// Number of pull requests created.
    pub prs_created: usize,

    /// Number of pull requests that already existed.
    pub prs_existing: usize,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(mode: Mode, repositories_configured: usize) -> Self {
        Self {
            mode: Some(mode),
            repositories_configured,
            ..Default::default()
        }
    }

    /// Records repositories that failed to load.
    pub fn record_load_failures(&mut self, failures: &[LoadFailure]) {
        self.not_loaded.extend(failures.iter().map(|failure| NotLoaded {
            repository: failure.name.clone(),
            error: failure.error.to_string(),
        }));
    }

    /// Updates the summary with a repository's report.
    pub fn record_result(&mut self, report: RepositoryReport) {
        match &report.outcome {
            RepositoryOutcome::Completed { pull_request } => {
                self.completed += 1;
                match pull_request {
                    Some(PrStatus::Created { .. }) => self.prs_created += 1,
                    Some(PrStatus::AlreadyExists { .. }) => self.prs_existing += 1,
                    None => {}
                }
            }
            RepositoryOutcome::Skipped { .. } => self.skipped += 1,
            RepositoryOutcome::Aborted { .. } => self.aborted += 1,
        }
        self.reports.push(report);
    }

    /// Number of repositories that reached the pipeline.
    #[must_use]
    pub fn repositories_loaded(&self) -> usize {
        self.repositories_configured - self.not_loaded.len().min(self.repositories_configured)
    }

    /// Returns true if any repository failed to load or was aborted.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.aborted > 0 || !self.not_loaded.is_empty()
    }

    /// Status of the run.
    ///
    /// Decided by the last processed repository: its failure category when
    /// it was aborted, success otherwise. Earlier aborted repositories were
    /// skipped past and do not change the status.
    #[must_use]
    pub fn status(&self) -> RunStatus {
        self.reports
            .last()
            .and_then(|report| report.outcome.failure())
            .map_or(RunStatus::Success, RunStatus::Failed)
    }
}
