//! Runner configuration.

use crate::git::{Identity, ReconciliationMethod};
use crate::pull_requests::{Credentials, ProviderSettings};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default path of the targets document.
pub const DEFAULT_CONFIG_PATH: &str = "./config.json";
/// Default directory remote repositories are cloned into.
pub const DEFAULT_CLONE_DIR: &str = "./remote-targets";
/// Default name used for commits.
pub const DEFAULT_ACTOR_NAME: &str = "Code Migration Assistant Agent";
/// Default email used for commits.
pub const DEFAULT_ACTOR_EMAIL: &str = "code_migration_assistant_agent@gmail.com";
/// Default user agent sent to provider APIs.
pub const DEFAULT_USER_AGENT: &str = "code-migration-assistant";
/// Default bound on a push and the pull preceding it.
pub const DEFAULT_PUSH_TIMEOUT: Duration = Duration::from_secs(180);

/// Configuration for running a migration.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Path to the targets document.
    config_path: PathBuf,
    /// Directory remote repositories are cloned into.
    clone_dir: PathBuf,
    /// Provider credentials.
    credentials: Credentials,
    /// Identity used as both author and committer.
    actor: Identity,
    user_agent: String,
    push_timeout: Duration,
    reconciliation: ReconciliationMethod,
    /// Whether hidden directories are searched.
    include_hidden_dirs: bool,
}

impl RunnerConfig {
    /// Creates a new configuration with defaults for everything but the
    /// targets document and credentials.
    pub fn new(config_path: PathBuf, credentials: Credentials) -> Self {
        Self {
            config_path,
            clone_dir: PathBuf::from(DEFAULT_CLONE_DIR),
            credentials,
            actor: Identity::new(DEFAULT_ACTOR_NAME, DEFAULT_ACTOR_EMAIL),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            push_timeout: DEFAULT_PUSH_TIMEOUT,
            reconciliation: ReconciliationMethod::default(),
            include_hidden_dirs: false,
        }
    }

    /// Sets the clone directory.
    pub fn with_clone_dir(mut self, clone_dir: PathBuf) -> Self {
        self.clone_dir = clone_dir;
        self
    }

    /// Sets the commit identity.
    pub fn with_actor(mut self, actor: Identity) -> Self {
        self.actor = actor;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_push_timeout(mut self, push_timeout: Duration) -> Self {
        self.push_timeout = push_timeout;
        self
    }

    pub fn with_reconciliation(mut self, reconciliation: ReconciliationMethod) -> Self {
        self.reconciliation = reconciliation;
        self
    }

    pub fn with_include_hidden_dirs(mut self, include_hidden_dirs: bool) -> Self {
        self.include_hidden_dirs = include_hidden_dirs;
        self
    }

    /// Returns the targets document path.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Returns the clone directory.
    pub fn clone_dir(&self) -> &Path {
        &self.clone_dir
    }

    /// Returns the commit identity.
    pub fn actor(&self) -> &Identity {
        &self.actor
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn push_timeout(&self) -> Duration {
        self.push_timeout
    }

    pub fn reconciliation(&self) -> ReconciliationMethod {
        self.reconciliation
    }

    pub fn include_hidden_dirs(&self) -> bool {
        self.include_hidden_dirs
    }

    /// Settings handed to provider clients.
    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            credentials: self.credentials.clone(),
            user_agent: self.user_agent.clone(),
        }
    }
}
