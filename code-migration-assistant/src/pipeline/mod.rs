//! The per-repository migration pipeline.
//!
//! Stages run in a fixed order:
//!
//! 1. identity setup
//! 2. branch checkout or creation
//! 3. search and replace
//! 4. change evaluation (prod mode only), which can narrow the later stages
//!    or stop the repository when a previous run already did the work
//! 5. commit
//! 6. push
//! 7. pull request creation
//!
//! Each stage either hands the (possibly narrowed) [`PipelineFlags`] to the
//! next one or stops the repository with a [`RepositoryOutcome`].

mod flags;
mod outcome;
mod plan;

pub use flags::PipelineFlags;
pub use outcome::{FailureKind, RepositoryOutcome};
pub use plan::MigrationPlan;

use crate::config::Mode;
use crate::git::{CommitRequest, FileStatus, GitError, GitOperations};
use crate::patterns::{scan_and_replace, MatchReport, ScanOptions};
use crate::pull_requests::{normalize_branch_ref, short_branch_name, PrStatus, PullRequestClient};
use crate::repository::RepositoryTarget;
use crate::templates::{RenderContext, TemplateRenderer};
use serde::Serialize;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// What happened to one repository.
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryReport {
    pub repository: String,
    pub outcome: RepositoryOutcome,
    /// Absent when the repository stopped before search and replace.
    pub matches: Option<MatchReport>,
    /// Flags as they stood when the repository finished.
    pub flags: PipelineFlags,
}

/// Outcome of a single stage.
enum Step {
    Next(PipelineFlags),
    Stop(PipelineFlags, RepositoryOutcome),
}

macro_rules! next_stage {
    ($report:ident, $step:expr) => {
        match $step {
            Step::Next(flags) => flags,
            Step::Stop(flags, outcome) => {
                $report.flags = flags;
                $report.outcome = outcome;
                return $report;
            }
        }
    };
}

/// Runs the stages for one repository at a time.
pub struct MigrationPipeline<'a> {
    plan: &'a MigrationPlan,
    renderer: &'a TemplateRenderer,
}

impl<'a> MigrationPipeline<'a> {
    pub fn new(plan: &'a MigrationPlan, renderer: &'a TemplateRenderer) -> Self {
        Self { plan, renderer }
    }

    /// Migrates one repository.
    ///
    /// Never fails: every failure is folded into the report's outcome.
    pub async fn run<G, P>(&self, target: &RepositoryTarget, git: &G, scm: &P) -> RepositoryReport
    where
        G: GitOperations,
        P: PullRequestClient,
    {
        let span = info_span!("migrate", repo = %target.name);
        async {
            info!(path = %target.working_dir.display(), "Migrating repository");
            let report = self.drive(target, git, scm).await;
            match &report.outcome {
                RepositoryOutcome::Completed { .. } => info!("Repository migrated"),
                RepositoryOutcome::Skipped { reason } => {
                    info!(reason = %reason, "Repository skipped");
                }
                RepositoryOutcome::Aborted { failure, error } => {
                    error!(stage = failure.as_str(), error = %error, "Repository aborted");
                }
            }
            report
        }
        .instrument(span)
        .await
    }

    async fn drive<G, P>(&self, target: &RepositoryTarget, git: &G, scm: &P) -> RepositoryReport
    where
        G: GitOperations,
        P: PullRequestClient,
    {
        let flags = PipelineFlags::for_mode(self.plan.mode);
        let mut report = RepositoryReport {
            repository: target.name.clone(),
            outcome: RepositoryOutcome::Completed { pull_request: None },
            matches: None,
            flags,
        };
        debug!(?flags, "Initial pipeline flags");

        let flags = next_stage!(report, self.setup_identity(git, flags).await);
        let flags = next_stage!(report, self.check_branch(git, flags).await);

        let matches = match self.search_and_replace(target, flags) {
            Ok(matches) => matches,
            Err(outcome) => {
                report.outcome = outcome;
                return report;
            }
        };
        let total = matches.total();
        report.matches = Some(matches);

        let flags = if self.plan.mode == Mode::Dev {
            flags
        } else {
            let step = self.evaluate_changes(target, git, scm, total, flags).await;
            let flags = next_stage!(report, step);
            debug!(?flags, "Pipeline flags after change evaluation");
            flags
        };

        self.commit(target, git, flags).await;
        let flags = next_stage!(report, self.push(git, flags).await);

        report.flags = flags;
        report.outcome = self.create_pull_request(target, git, scm, flags).await;
        report
    }

    async fn setup_identity<G: GitOperations>(&self, git: &G, flags: PipelineFlags) -> Step {
        if !flags.setup_identity() {
            return Step::Next(flags);
        }
        info!(identity = %self.plan.identity, "Setting up git identity");
        match git.setup_identity(&self.plan.identity).await {
            Ok(()) => Step::Next(flags),
            Err(e) => Step::Stop(
                flags,
                RepositoryOutcome::aborted(FailureKind::IdentitySetup, e),
            ),
        }
    }

    async fn check_branch<G: GitOperations>(&self, git: &G, flags: PipelineFlags) -> Step {
        if !flags.check_branch() {
            return Step::Next(flags);
        }
        let branch = &self.plan.target_branch;
        info!(branch = %branch.name, from = ?branch.from, "Checking out target branch");
        match git
            .checkout_or_create_branch(&branch.name, branch.from.as_deref())
            .await
        {
            Ok(()) => Step::Next(flags),
            Err(e) => Step::Stop(
                flags,
                RepositoryOutcome::aborted(FailureKind::BranchCheck, e),
            ),
        }
    }

    /// A search-only run counts matches without writing files.
    fn search_and_replace(
        &self,
        target: &RepositoryTarget,
        flags: PipelineFlags,
    ) -> Result<MatchReport, RepositoryOutcome> {
        let options = ScanOptions {
            excluded_paths: &self.plan.excluded_paths,
            include_hidden_dirs: self.plan.include_hidden_dirs,
            dry_run: flags.search_only(),
        };
        info!(
            patterns = self.plan.patterns.len(),
            dry_run = options.dry_run,
            "Searching and replacing"
        );
        let matches = scan_and_replace(&target.working_dir, &self.plan.patterns, &options)
            .map_err(|e| RepositoryOutcome::aborted(FailureKind::SearchReplace, e))?;
        info!(
            total = matches.total(),
            changed_files = matches.changed_files().len(),
            "Search and replace finished"
        );
        Ok(matches)
    }

    /// Decides whether a run without new matches still has work left over
    /// from a previous run.
    async fn evaluate_changes<G, P>(
        &self,
        target: &RepositoryTarget,
        git: &G,
        scm: &P,
        total_matches: usize,
        flags: PipelineFlags,
    ) -> Step
    where
        G: GitOperations,
        P: PullRequestClient,
    {
        if total_matches > 0 {
            return Step::Next(flags);
        }

        info!("No matches. Checking for changes left by a previous run..");
        let pending = match pending_changes(git).await {
            Ok(pending) => pending,
            Err(e) => return Step::Stop(flags, unevaluated(e)),
        };
        if pending > 0 {
            info!(files = pending, "Modified or staged files detected, proceeding with commit");
            return Step::Next(flags);
        }

        info!("Working tree is clean, nothing to commit");
        let flags = flags.without_commit();

        let branch = match git.current_branch().await {
            Ok(branch) => branch,
            Err(e) => return Step::Stop(flags, unevaluated(e)),
        };
        match git.has_tracking_branch(&branch).await {
            Ok(true) => {}
            Ok(false) => {
                info!(branch = %branch, "Branch has no upstream");
                return Step::Stop(flags, RepositoryOutcome::skipped("no upstream branch"));
            }
            Err(e) => return Step::Stop(flags, unevaluated(e)),
        }

        match git.needs_push(Some(&branch)).await {
            Ok(true) => {
                info!("Upstream branch is outdated, push required");
                return Step::Next(flags);
            }
            Ok(false) => info!("Upstream branch is up-to-date"),
            Err(e) => return Step::Stop(flags, unevaluated(e)),
        }
        let flags = flags.without_push();

        let target_ref = match self.plan.pull_request_target(target.provider.kind()) {
            Some(target_ref) if flags.create_pull_request() => target_ref,
            _ => {
                return Step::Stop(
                    flags,
                    RepositoryOutcome::skipped("up-to-date and no pull request configured"),
                );
            }
        };

        let source_ref = normalize_branch_ref(&branch);
        match scm
            .find_open_requests(&target.folder_name(), &source_ref, &target_ref)
            .await
        {
            Err(e) => {
                error!(error = %e, "Failed to look up open pull requests");
                Step::Stop(flags, RepositoryOutcome::aborted(FailureKind::PullRequestQuery, e))
            }
            Ok(open) => match open.first() {
                Some(existing) => {
                    info!(pr_number = existing.number, "Open pull request exists. Skipping..");
                    Step::Stop(
                        flags.without_pull_request(),
                        RepositoryOutcome::skipped(format!(
                            "open pull request #{} already exists",
                            existing.number
                        )),
                    )
                }
                None => {
                    info!("No open pull request, proceeding with raising one");
                    Step::Next(flags)
                }
            },
        }
    }

    /// Commit failures are logged and do not stop the repository.
    async fn commit<G: GitOperations>(
        &self,
        target: &RepositoryTarget,
        git: &G,
        flags: PipelineFlags,
    ) {
        if !flags.commit() {
            return;
        }

        let target_branch = self.target_branch_name(target);
        let context = self.render_context(target, &target_branch);
        let message = &self.plan.commit_message;
        let rendered = self.renderer.render(&message.title, &context).and_then(|title| {
            let description = message
                .description
                .as_deref()
                .map(|d| self.renderer.render(d, &context))
                .transpose()?;
            Ok((title, description))
        });
        let (title, description) = match rendered {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!(error = %e, "Failed to render commit message, skipping commit");
                return;
            }
        };

        let request = CommitRequest {
            title,
            description,
            author: Some(self.plan.identity.clone()),
            committer: Some(self.plan.identity.clone()),
            stage_tracked: true,
        };
        info!(title = %request.title, "Committing changes");
        if let Err(e) = git.commit(&request).await {
            warn!(error = %e, "Commit failed, continuing");
        }
    }

    async fn push<G: GitOperations>(&self, git: &G, flags: PipelineFlags) -> Step {
        if !flags.push() {
            return Step::Next(flags);
        }
        match git.push(&self.plan.push).await {
            Ok(report) => {
                debug!(?report, "Push finished");
                Step::Next(flags)
            }
            Err(e) => Step::Stop(flags, RepositoryOutcome::aborted(FailureKind::Push, e)),
        }
    }

    async fn create_pull_request<G, P>(
        &self,
        target: &RepositoryTarget,
        git: &G,
        scm: &P,
        flags: PipelineFlags,
    ) -> RepositoryOutcome
    where
        G: GitOperations,
        P: PullRequestClient,
    {
        if !flags.create_pull_request() {
            return RepositoryOutcome::Completed { pull_request: None };
        }
        let Some(config) = &self.plan.pull_request else {
            info!("No pull request configured. Skipping..");
            return RepositoryOutcome::Completed { pull_request: None };
        };

        let branch = match git.current_branch().await {
            Ok(branch) => branch,
            Err(e) => return RepositoryOutcome::aborted(FailureKind::PullRequestCreate, e),
        };
        let target_branch = self.target_branch_name(target);
        let context = self.render_context(target, &target_branch);
        let kind = target.provider.kind();
        let payload = match config.payload(kind, &branch, self.renderer, &context) {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                info!(
                    provider = kind.display_name(),
                    "No pull request configured for provider. Skipping.."
                );
                return RepositoryOutcome::Completed { pull_request: None };
            }
            Err(e) => return RepositoryOutcome::aborted(FailureKind::PullRequestCreate, e),
        };

        info!(
            source = %payload.source_ref,
            target = %payload.target_ref,
            provider = kind.display_name(),
            "Creating pull request"
        );
        match scm.create_request(&target.folder_name(), &payload).await {
            Ok(status) => {
                if let PrStatus::AlreadyExists { number } = &status {
                    warn!(pr_number = ?number, "Pull request already exists");
                }
                RepositoryOutcome::Completed {
                    pull_request: Some(status),
                }
            }
            Err(e) => RepositoryOutcome::aborted(FailureKind::PullRequestCreate, e),
        }
    }

    fn target_branch_name(&self, target: &RepositoryTarget) -> String {
        self.plan
            .pull_request_target(target.provider.kind())
            .map(|target_ref| short_branch_name(&target_ref).to_string())
            .unwrap_or_default()
    }

    fn render_context<'c>(
        &'c self,
        target: &'c RepositoryTarget,
        target_branch: &'c str,
    ) -> RenderContext<'c> {
        RenderContext {
            repository: &target.name,
            branch: &self.plan.target_branch.name,
            target_branch,
            mode: self.plan.mode,
        }
    }
}

/// Files changed or staged but not committed: modified + untracked + staged.
async fn pending_changes<G: GitOperations>(git: &G) -> Result<usize, GitError> {
    let unstaged = git.file_count(FileStatus::Unstaged).await?;
    let staged = git.file_count(FileStatus::Staged).await?;
    Ok(unstaged + staged)
}

fn unevaluated(error: GitError) -> RepositoryOutcome {
    error!(error = %error, "Unable to evaluate repository state");
    RepositoryOutcome::skipped(format!("unable to evaluate repository state: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CommitMessage, TargetBranch};
    use crate::git::{Identity, PushReport, PushRequest, ReconciliationMethod};
    use crate::pull_requests::{
        GitHubPullRequest, OpenRequest, PrError, PullRequestConfig, PullRequestPayload,
    };
    use crate::repository::{RepositoryOrigin, ScmProviderDescriptor};
    use std::cell::RefCell;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeGit {
        calls: RefCell<Vec<&'static str>>,
        fail_identity: bool,
        fail_checkout: bool,
        fail_commit: bool,
        fail_push: bool,
        unstaged: usize,
        staged: usize,
        tracking: bool,
        ahead: bool,
    }

    fn git_failure(command: &str) -> GitError {
        GitError::CommandFailed {
            command: command.to_string(),
            stderr: "boom".to_string(),
        }
    }

    impl FakeGit {
        fn record(&self, call: &'static str) {
            self.calls.borrow_mut().push(call);
        }

        fn called(&self, call: &str) -> bool {
            self.calls.borrow().iter().any(|recorded| *recorded == call)
        }
    }

    impl GitOperations for FakeGit {
        async fn setup_identity(&self, _identity: &Identity) -> Result<(), GitError> {
            self.record("setup_identity");
            if self.fail_identity {
                return Err(git_failure("config user.name"));
            }
            Ok(())
        }

        async fn current_branch(&self) -> Result<String, GitError> {
            Ok("feat/migration".to_string())
        }

        async fn checkout_or_create_branch(
            &self,
            _branch: &str,
            _from_branch: Option<&str>,
        ) -> Result<(), GitError> {
            self.record("checkout");
            if self.fail_checkout {
                return Err(GitError::MissingBaseBranch {
                    base: "main".to_string(),
                });
            }
            Ok(())
        }

        async fn commit(&self, _request: &CommitRequest) -> Result<(), GitError> {
            self.record("commit");
            if self.fail_commit {
                return Err(git_failure("commit"));
            }
            Ok(())
        }

        async fn push(&self, _request: &PushRequest) -> Result<PushReport, GitError> {
            self.record("push");
            if self.fail_push {
                return Err(GitError::NoSuchRemote {
                    remote: "origin".to_string(),
                });
            }
            Ok(PushReport::Pushed { refs: Vec::new() })
        }

        async fn has_tracking_branch(&self, _branch: &str) -> Result<bool, GitError> {
            Ok(self.tracking)
        }

        async fn needs_push(&self, _branch: Option<&str>) -> Result<bool, GitError> {
            Ok(self.ahead)
        }

        async fn file_count(&self, status: FileStatus) -> Result<usize, GitError> {
            Ok(match status {
                FileStatus::Unstaged => self.unstaged,
                FileStatus::Staged => self.staged,
                FileStatus::Modified | FileStatus::Untracked => 0,
            })
        }
    }

    #[derive(Default)]
    struct FakeScm {
        open: Vec<OpenRequest>,
        fail_query: bool,
        fail_create: bool,
        queries: RefCell<usize>,
        created: RefCell<Option<PullRequestPayload>>,
    }

    impl PullRequestClient for FakeScm {
        async fn find_open_requests(
            &self,
            _repository: &str,
            _source_ref: &str,
            _target_ref: &str,
        ) -> Result<Vec<OpenRequest>, PrError> {
            *self.queries.borrow_mut() += 1;
            if self.fail_query {
                return Err(PrError::MissingCredential {
                    provider: "GitHub",
                    variable: "GITHUB_TOKEN",
                });
            }
            Ok(self.open.clone())
        }

        async fn create_request(
            &self,
            repository: &str,
            payload: &PullRequestPayload,
        ) -> Result<PrStatus, PrError> {
            if self.fail_create {
                return Err(PrError::RepositoryNotFound {
                    repository: repository.to_string(),
                    variable: "GITHUB_TOKEN",
                });
            }
            *self.created.borrow_mut() = Some(payload.clone());
            Ok(PrStatus::Created {
                number: 12,
                url: format!("https://github.com/acme/{repository}/pull/12"),
            })
        }
    }

    fn plan(mode: Mode) -> MigrationPlan {
        MigrationPlan {
            mode,
            target_branch: TargetBranch {
                name: "feat/migration".to_string(),
                from: None,
            },
            patterns: [("old-host".to_string(), "new-host".to_string())]
                .into_iter()
                .collect(),
            excluded_paths: Vec::new(),
            include_hidden_dirs: false,
            commit_message: CommitMessage::default(),
            pull_request: Some(PullRequestConfig {
                github: Some(GitHubPullRequest {
                    title: "Migrate {{repository}}".to_string(),
                    body: "Moves to {{target_branch}}".to_string(),
                    base: "main".to_string(),
                    maintainer_can_modify: None,
                }),
                azure_devops: None,
            }),
            identity: Identity::new("Bot", "bot@example.com"),
            push: PushRequest::to_origin(Duration::from_secs(5), ReconciliationMethod::Merge),
        }
    }

    fn target(dir: &TempDir, content: &str) -> RepositoryTarget {
        fs::write(dir.path().join("app.cfg"), content).unwrap();
        RepositoryTarget {
            name: "svc-a".to_string(),
            working_dir: dir.path().to_path_buf(),
            origin: RepositoryOrigin::Local,
            source: dir.path().display().to_string(),
            provider: ScmProviderDescriptor::GitHub {
                domain: "github.com".to_string(),
                owner_or_org: "acme".to_string(),
            },
        }
    }

    async fn run(
        plan: &MigrationPlan,
        target: &RepositoryTarget,
        git: &FakeGit,
        scm: &FakeScm,
    ) -> RepositoryReport {
        let renderer = TemplateRenderer::new();
        MigrationPipeline::new(plan, &renderer)
            .run(target, git, scm)
            .await
    }

    #[tokio::test]
    async fn prod_run_with_matches_raises_pull_request() {
        let dir = TempDir::new().unwrap();
        let target = target(&dir, "url = old-host");
        let (git, scm) = (FakeGit::default(), FakeScm::default());

        let report = run(&plan(Mode::Prod), &target, &git, &scm).await;

        assert_eq!(
            *git.calls.borrow(),
            vec!["setup_identity", "checkout", "commit", "push"]
        );
        assert!(matches!(
            report.outcome,
            RepositoryOutcome::Completed {
                pull_request: Some(PrStatus::Created { number: 12, .. })
            }
        ));
        assert_eq!(report.matches.unwrap().total(), 1);
        assert_eq!(*scm.queries.borrow(), 0);

        let payload = scm.created.borrow().clone().unwrap();
        assert_eq!(payload.title, "Migrate svc-a");
        assert_eq!(payload.description, "Moves to main");
        assert_eq!(payload.source_ref, "refs/heads/feat/migration");
        assert_eq!(payload.target_ref, "refs/heads/main");
        assert_eq!(
            fs::read_to_string(dir.path().join("app.cfg")).unwrap(),
            "url = new-host"
        );
    }

    #[tokio::test]
    async fn dev_run_only_scans() {
        let dir = TempDir::new().unwrap();
        let target = target(&dir, "old-host old-host");
        let (git, scm) = (FakeGit::default(), FakeScm::default());

        let report = run(&plan(Mode::Dev), &target, &git, &scm).await;

        assert!(git.calls.borrow().is_empty());
        assert!(scm.created.borrow().is_none());
        assert!(report.flags.search_only());
        assert_eq!(
            report.outcome,
            RepositoryOutcome::Completed { pull_request: None }
        );
        assert_eq!(report.matches.unwrap().total(), 2);
        assert_eq!(
            fs::read_to_string(dir.path().join("app.cfg")).unwrap(),
            "old-host old-host"
        );
    }

    #[tokio::test]
    async fn up_to_date_repository_with_open_request_is_skipped() {
        let dir = TempDir::new().unwrap();
        let target = target(&dir, "nothing to migrate");
        let git = FakeGit {
            tracking: true,
            ..FakeGit::default()
        };
        let scm = FakeScm {
            open: vec![OpenRequest {
                number: 4,
                url: None,
            }],
            ..FakeScm::default()
        };

        let report = run(&plan(Mode::Prod), &target, &git, &scm).await;

        assert!(matches!(report.outcome, RepositoryOutcome::Skipped { .. }));
        assert!(!report.flags.commit());
        assert!(!report.flags.push());
        assert!(!report.flags.create_pull_request());
        assert!(!git.called("commit"));
        assert!(!git.called("push"));
        assert!(scm.created.borrow().is_none());
        assert_eq!(*scm.queries.borrow(), 1);
    }

    #[tokio::test]
    async fn clean_repository_without_upstream_is_skipped() {
        let dir = TempDir::new().unwrap();
        let target = target(&dir, "nothing to migrate");
        let (git, scm) = (FakeGit::default(), FakeScm::default());

        let report = run(&plan(Mode::Prod), &target, &git, &scm).await;

        assert_eq!(
            report.outcome,
            RepositoryOutcome::Skipped {
                reason: "no upstream branch".to_string()
            }
        );
        assert_eq!(*scm.queries.borrow(), 0);
    }

    #[tokio::test]
    async fn unpushed_commits_are_pushed_without_committing() {
        let dir = TempDir::new().unwrap();
        let target = target(&dir, "nothing to migrate");
        let git = FakeGit {
            tracking: true,
            ahead: true,
            ..FakeGit::default()
        };
        let scm = FakeScm::default();

        let report = run(&plan(Mode::Prod), &target, &git, &scm).await;

        assert!(!git.called("commit"));
        assert!(git.called("push"));
        assert!(scm.created.borrow().is_some());
        assert!(matches!(
            report.outcome,
            RepositoryOutcome::Completed {
                pull_request: Some(_)
            }
        ));
    }

    #[tokio::test]
    async fn leftovers_from_previous_run_are_committed() {
        let dir = TempDir::new().unwrap();
        let target = target(&dir, "nothing to migrate");
        let git = FakeGit {
            unstaged: 2,
            ..FakeGit::default()
        };

        let report = run(&plan(Mode::Prod), &target, &git, &FakeScm::default()).await;

        assert!(git.called("commit"));
        assert!(git.called("push"));
        assert!(report.flags.commit());
    }

    #[tokio::test]
    async fn staged_leftovers_are_committed() {
        let dir = TempDir::new().unwrap();
        let target = target(&dir, "nothing to migrate");
        let git = FakeGit {
            staged: 1,
            ..FakeGit::default()
        };

        run(&plan(Mode::Prod), &target, &git, &FakeScm::default()).await;

        assert!(git.called("commit"));
    }

    #[tokio::test]
    async fn identity_failure_aborts_before_search() {
        let dir = TempDir::new().unwrap();
        let target = target(&dir, "old-host");
        let git = FakeGit {
            fail_identity: true,
            ..FakeGit::default()
        };

        let report = run(&plan(Mode::Prod), &target, &git, &FakeScm::default()).await;

        assert_eq!(report.outcome.failure(), Some(FailureKind::IdentitySetup));
        assert!(report.matches.is_none());
        assert_eq!(
            fs::read_to_string(dir.path().join("app.cfg")).unwrap(),
            "old-host"
        );
    }

    #[tokio::test]
    async fn branch_failure_aborts() {
        let dir = TempDir::new().unwrap();
        let target = target(&dir, "old-host");
        let git = FakeGit {
            fail_checkout: true,
            ..FakeGit::default()
        };

        let report = run(&plan(Mode::Prod), &target, &git, &FakeScm::default()).await;

        assert_eq!(report.outcome.failure(), Some(FailureKind::BranchCheck));
    }

    #[tokio::test]
    async fn search_root_failure_aborts() {
        let dir = TempDir::new().unwrap();
        let mut target = target(&dir, "old-host");
        target.working_dir = dir.path().join("missing");

        let (git, scm) = (FakeGit::default(), FakeScm::default());
        let report = run(&plan(Mode::Prod), &target, &git, &scm).await;

        assert_eq!(report.outcome.failure(), Some(FailureKind::SearchReplace));
    }

    #[tokio::test]
    async fn commit_failure_does_not_stop_the_repository() {
        let dir = TempDir::new().unwrap();
        let target = target(&dir, "old-host");
        let git = FakeGit {
            fail_commit: true,
            ..FakeGit::default()
        };
        let scm = FakeScm::default();

        let report = run(&plan(Mode::Prod), &target, &git, &scm).await;

        assert!(git.called("push"));
        assert!(scm.created.borrow().is_some());
        assert_eq!(report.outcome.failure(), None);
    }

    #[tokio::test]
    async fn push_failure_aborts_before_pull_request() {
        let dir = TempDir::new().unwrap();
        let target = target(&dir, "old-host");
        let git = FakeGit {
            fail_push: true,
            ..FakeGit::default()
        };
        let scm = FakeScm::default();

        let report = run(&plan(Mode::Prod), &target, &git, &scm).await;

        assert_eq!(report.outcome.failure(), Some(FailureKind::Push));
        assert!(scm.created.borrow().is_none());
    }

    #[tokio::test]
    async fn pull_request_query_failure_aborts() {
        let dir = TempDir::new().unwrap();
        let target = target(&dir, "nothing");
        let git = FakeGit {
            tracking: true,
            ..FakeGit::default()
        };
        let scm = FakeScm {
            fail_query: true,
            ..FakeScm::default()
        };

        let report = run(&plan(Mode::Prod), &target, &git, &scm).await;

        assert_eq!(report.outcome.failure(), Some(FailureKind::PullRequestQuery));
    }

    #[tokio::test]
    async fn pull_request_creation_failure_aborts() {
        let dir = TempDir::new().unwrap();
        let target = target(&dir, "old-host");
        let scm = FakeScm {
            fail_create: true,
            ..FakeScm::default()
        };

        let report = run(&plan(Mode::Prod), &target, &FakeGit::default(), &scm).await;

        assert_eq!(
            report.outcome.failure(),
            Some(FailureKind::PullRequestCreate)
        );
    }

    #[tokio::test]
    async fn missing_pull_request_config_completes_without_request() {
        let dir = TempDir::new().unwrap();
        let target = target(&dir, "old-host");
        let mut plan = plan(Mode::Prod);
        plan.pull_request = None;
        let scm = FakeScm::default();

        let report = run(&plan, &target, &FakeGit::default(), &scm).await;

        assert_eq!(
            report.outcome,
            RepositoryOutcome::Completed { pull_request: None }
        );
        assert!(scm.created.borrow().is_none());
    }
}
