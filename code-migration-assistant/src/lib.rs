#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod config;
pub mod git;
pub mod patterns;
pub mod pipeline;
pub mod pull_requests;
pub mod rate_limit;
pub mod repository;
pub mod runner;
pub mod summary;
pub mod templates;

pub use config::{load_targets_config, ConfigError, Mode, TargetsConfig};
pub use git::{GitError, GitOperations, GitRepository, Identity, ReconciliationMethod};
pub use patterns::{scan_and_replace, MatchReport, PatternSet, ScanError, ScanOptions};
pub use pipeline::{
    FailureKind, MigrationPipeline, MigrationPlan, PipelineFlags, RepositoryOutcome,
    RepositoryReport,
};
pub use pull_requests::{
    Credentials, PrError, PrStatus, ProviderSettings, PullRequestClient, ScmClient,
};
pub use rate_limit::{
    check_core_rate_limit, ensure_core_rate_limit, required_wait, wait_if_needed, RateLimitInfo,
};
pub use repository::{
    materialize_all, RepositoryEntry, RepositoryError, RepositoryTarget, ScmProviderDescriptor,
};
pub use runner::{Runner, RunnerConfig, RunnerError};
pub use summary::{render_json, render_table, RunStatus, RunSummary};
pub use templates::{TemplateError, TemplateRenderer};
