//! Orchestrates a migration run across every configured repository.

mod config;
mod error;

pub use config::{
    RunnerConfig, DEFAULT_ACTOR_EMAIL, DEFAULT_ACTOR_NAME, DEFAULT_CLONE_DIR, DEFAULT_CONFIG_PATH,
    DEFAULT_PUSH_TIMEOUT, DEFAULT_USER_AGENT,
};
pub use error::RunnerError;

use crate::config::load_targets_config;
use crate::git::GitRepository;
use crate::pipeline::{MigrationPipeline, MigrationPlan};
use crate::pull_requests::ScmClient;
use crate::repository::materialize_all;
use crate::summary::RunSummary;
use crate::templates::TemplateRenderer;
use tracing::{info, warn};

/// Runs the migration pipeline over a targets document.
pub struct Runner {
    config: RunnerConfig,
    renderer: TemplateRenderer,
}

impl Runner {
    /// Builds a runner from the provided configuration.
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            renderer: TemplateRenderer::new(),
        }
    }

    /// Executes the full run.
    ///
    /// Repositories are processed one at a time in document order. A
    /// repository that fails is recorded and the run moves on to the next.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] when the targets document cannot be loaded.
    pub async fn run(&self) -> Result<RunSummary, RunnerError> {
        let config_path = self.config.config_path();
        info!(path = %config_path.display(), "Loading targets configuration");
        let targets = load_targets_config(config_path)?;
        info!(
            mode = %targets.mode,
            repositories = targets.repositories.len(),
            patterns = targets.replacements.len(),
            "Loaded targets configuration"
        );

        let mut summary = RunSummary::new(targets.mode, targets.repositories.len());
        let (loaded, failures) =
            materialize_all(&targets.repositories, self.config.clone_dir()).await;
        summary.record_load_failures(&failures);

        if loaded.is_empty() {
            warn!("No target repositories loaded. Nothing to do");
            return Ok(summary);
        }
        if targets.replacements.is_empty() {
            warn!("No replacements configured. Nothing to do");
            return Ok(summary);
        }

        let plan = MigrationPlan::new(
            &targets,
            self.config.actor().clone(),
            self.config.push_timeout(),
            self.config.reconciliation(),
            self.config.include_hidden_dirs(),
        );
        let pipeline = MigrationPipeline::new(&plan, &self.renderer);
        let settings = self.config.provider_settings();

        for (index, target) in loaded.iter().enumerate() {
            info!(
                repo = %target.name,
                "[{}/{}] Processing repository",
                index + 1,
                loaded.len()
            );
            let git = GitRepository::new(&target.working_dir);
            let scm = ScmClient::for_provider(&target.provider, &settings);
            summary.record_result(pipeline.run(target, &git, &scm).await);
        }

        info!(
            loaded = summary.repositories_loaded(),
            completed = summary.completed,
            skipped = summary.skipped,
            aborted = summary.aborted,
            not_loaded = summary.not_loaded.len(),
            prs_created = summary.prs_created,
            prs_existing = summary.prs_existing,
            "Run finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, Mode};
    use crate::pull_requests::Credentials;
    use crate::summary::RunStatus;
    use std::fs;
    use tempfile::TempDir;

    fn runner_for(temp: &TempDir, document: &str) -> Runner {
        let path = temp.path().join("config.json");
        fs::write(&path, document).unwrap();
        Runner::new(
            RunnerConfig::new(path, Credentials::new()).with_clone_dir(temp.path().join("clones")),
        )
    }

    #[tokio::test]
    async fn missing_config_is_a_config_error() {
        let temp = TempDir::new().unwrap();
        let runner = Runner::new(RunnerConfig::new(
            temp.path().join("absent.json"),
            Credentials::new(),
        ));

        let error = runner.run().await.unwrap_err();
        assert!(matches!(
            error,
            RunnerError::Config(ConfigError::MissingFile { .. })
        ));
        assert_eq!(error.status(), RunStatus::ConfigError);
    }

    #[tokio::test]
    async fn invalid_mode_stops_the_run() {
        let temp = TempDir::new().unwrap();
        let runner = runner_for(
            &temp,
            r#"{
                "targetRepos": [],
                "targetBranch": { "name": "feat/migration" },
                "mode": "staging",
                "replacements": { "foo": "bar" }
            }"#,
        );

        let error = runner.run().await.unwrap_err();
        assert_eq!(error.status(), RunStatus::InvalidMode);
    }

    #[tokio::test]
    async fn unloadable_repositories_are_recorded_and_skipped() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("does-not-exist");
        let document = format!(
            r#"{{
                "targetRepos": [
                    {{ "name": "svc-a", "type": "local", "source": {source},
                       "scmProvider": {{ "type": "github", "domain": "github.com", "ownerOrOrg": "acme" }} }}
                ],
                "targetBranch": {{ "name": "feat/migration" }},
                "mode": "dev",
                "replacements": {{ "foo": "bar" }}
            }}"#,
            source = serde_json::to_string(&missing.display().to_string()).unwrap()
        );
        let runner = runner_for(&temp, &document);

        let summary = runner.run().await.unwrap();
        assert_eq!(summary.mode, Some(Mode::Dev));
        assert_eq!(summary.repositories_configured, 1);
        assert_eq!(summary.not_loaded.len(), 1);
        assert_eq!(summary.not_loaded[0].repository, "svc-a");
        assert_eq!(summary.repositories_loaded(), 0);
        assert!(summary.reports.is_empty());
        assert!(summary.has_failures());
        assert_eq!(summary.status(), RunStatus::Success);
    }
}
