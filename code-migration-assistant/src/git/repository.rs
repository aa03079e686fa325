//! [`GitOperations`] over the system `git` binary.

use super::command::{
    collect_output, command_failed, count_git, git_command, output_with_timeout, probe_git,
    run_command, run_git,
};
use super::push::{parse_porcelain, validate_pushed_refs};
use super::{
    CommitRequest, FileStatus, GitError, GitOperations, Identity, PushReport, PushRequest,
    ReconciliationMethod, StatusCounts,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// A local working tree.
#[derive(Debug, Clone)]
pub struct GitRepository {
    path: PathBuf,
}

impl GitRepository {
    /// Wraps an existing working tree.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Clones `source` into `destination`.
    ///
    /// # Errors
    ///
    /// Returns an error if `git clone` fails, including when `destination`
    /// already exists.
    pub async fn clone_from(source: &str, destination: &Path) -> Result<Self, GitError> {
        let parent = destination
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let folder = destination
            .file_name()
            .map_or_else(|| destination.to_string_lossy(), |name| name.to_string_lossy());
        run_git(parent, &["clone", source, &folder]).await?;
        Ok(Self::new(destination))
    }

    /// Whether the path is inside a git working tree.
    ///
    /// # Errors
    ///
    /// Returns an error if `git` cannot be started.
    pub async fn is_work_tree(&self) -> Result<bool, GitError> {
        probe_git(&self.path, &["rev-parse", "--is-inside-work-tree"]).await
    }

    async fn ref_exists(&self, full_ref: &str) -> Result<bool, GitError> {
        probe_git(&self.path, &["show-ref", "--verify", "--quiet", full_ref]).await
    }

    async fn upstream_of(&self, branch: &str) -> Result<Option<String>, GitError> {
        let reference = format!("{branch}@{{upstream}}");
        let args = ["rev-parse", "--abbrev-ref", "--symbolic-full-name", reference.as_str()];
        let output = collect_output(git_command(&self.path, &args), &args).await?;
        if !output.status.success() {
            return Ok(None);
        }
        let upstream = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!upstream.is_empty()).then_some(upstream))
    }

    async fn set_upstream(
        &self,
        branch: &str,
        remote: &str,
        remote_branch: &str,
    ) -> Result<(), GitError> {
        let upstream = format!("--set-upstream-to={remote}/{remote_branch}");
        run_git(&self.path, &["branch", &upstream, branch]).await?;
        debug!(branch, upstream = %format!("{remote}/{remote_branch}"), "Upstream set");
        Ok(())
    }

    async fn validate_remote(&self, remote: &str) -> Result<(), GitError> {
        let remotes = run_git(&self.path, &["remote"]).await?;
        if !remotes.lines().any(|name| name.trim() == remote) {
            return Err(GitError::NoSuchRemote {
                remote: remote.to_string(),
            });
        }

        let url_key = format!("remote.{remote}.url");
        if !probe_git(&self.path, &["config", "--get", &url_key]).await? {
            return Err(GitError::InvalidRemote {
                remote: remote.to_string(),
            });
        }
        Ok(())
    }

    async fn pull(
        &self,
        remote: &str,
        remote_branch: &str,
        method: ReconciliationMethod,
        timeout: Duration,
    ) -> Result<(), GitError> {
        info!(remote, remote_branch, method = method.pull_flag(), "Pulling remote changes");
        let args = ["pull", method.pull_flag(), "--no-edit", remote, remote_branch];
        let output = output_with_timeout(&self.path, &args, timeout).await?;
        if !output.status.success() {
            return Err(command_failed(&output, &args));
        }
        Ok(())
    }

    async fn status_counts(&self) -> Result<StatusCounts, GitError> {
        let args = ["status", "--porcelain"];
        let output = collect_output(git_command(&self.path, &args), &args).await?;
        if !output.status.success() {
            return Err(command_failed(&output, &args));
        }
        // Leading spaces carry meaning in porcelain output, so no trimming.
        Ok(StatusCounts::parse(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl GitOperations for GitRepository {
    async fn setup_identity(&self, identity: &Identity) -> Result<(), GitError> {
        run_git(&self.path, &["config", "user.name", &identity.name]).await?;
        run_git(&self.path, &["config", "user.email", &identity.email]).await?;
        debug!(identity = %identity, "Git identity configured");
        Ok(())
    }

    async fn current_branch(&self) -> Result<String, GitError> {
        let args = ["symbolic-ref", "--quiet", "--short", "HEAD"];
        let output = collect_output(git_command(&self.path, &args), &args).await?;
        if !output.status.success() {
            return Err(GitError::DetachedHead);
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn checkout_or_create_branch(
        &self,
        branch: &str,
        from_branch: Option<&str>,
    ) -> Result<(), GitError> {
        if self.ref_exists(&format!("refs/heads/{branch}")).await? {
            info!(branch, "Branch already exists. Switching..");
            run_git(&self.path, &["checkout", branch]).await?;
            return Ok(());
        }

        let remote_branch = format!("origin/{branch}");
        if self.ref_exists(&format!("refs/remotes/{remote_branch}")).await? {
            info!(branch, "Branch exists on origin. Checking out a tracking branch..");
            run_git(
                &self.path,
                &["checkout", "-b", branch, "--track", &remote_branch],
            )
            .await?;
            return Ok(());
        }

        let base = match from_branch {
            Some(base) => base.to_string(),
            None => self.current_branch().await?,
        };

        let start_point = if self.ref_exists(&format!("refs/heads/{base}")).await? {
            base
        } else if self.ref_exists(&format!("refs/remotes/origin/{base}")).await? {
            format!("origin/{base}")
        } else {
            return Err(GitError::MissingBaseBranch { base });
        };

        info!(branch, from = %start_point, "Creating branch");
        run_git(
            &self.path,
            &["checkout", "--no-track", "-b", branch, &start_point],
        )
        .await?;
        Ok(())
    }

    async fn commit(&self, request: &CommitRequest) -> Result<(), GitError> {
        if request.stage_tracked {
            run_git(&self.path, &["add", "-u"]).await?;
        }

        let message = request.message();
        let author = request.author.as_ref().map(Identity::to_string);
        let mut args = vec!["commit", "-m", message.as_str()];
        if let Some(author) = author.as_deref() {
            args.extend(["--author", author]);
        }

        let mut command = git_command(&self.path, &args);
        if let Some(committer) = &request.committer {
            command
                .env("GIT_COMMITTER_NAME", &committer.name)
                .env("GIT_COMMITTER_EMAIL", &committer.email);
        }

        run_command(command, &args).await?;
        debug!(title = %request.title, author = ?author, "Changes committed");
        Ok(())
    }

    async fn push(&self, request: &PushRequest) -> Result<PushReport, GitError> {
        let remote = request.remote.as_str();
        self.validate_remote(remote).await?;

        let branch = self.current_branch().await?;
        let remote_branch = request
            .remote_branch
            .clone()
            .unwrap_or_else(|| branch.clone());
        let mut has_upstream = self.has_tracking_branch(&branch).await?;

        let tracking_ref = format!("refs/remotes/{remote}/{remote_branch}");
        if self.ref_exists(&tracking_ref).await? {
            debug!(remote_branch = %remote_branch, "Remote branch exists");
            if !has_upstream {
                self.set_upstream(&branch, remote, &remote_branch).await?;
                has_upstream = true;
            }
            self.pull(remote, &remote_branch, request.reconciliation, request.timeout)
                .await?;

            if !self.needs_push(Some(&branch)).await? {
                info!("Already up-to-date. Skipping..");
                return Ok(PushReport::UpToDate);
            }
        }

        info!(remote, remote_branch = %remote_branch, "Pushing changes");
        let refspec = format!("refs/heads/{branch}:refs/heads/{remote_branch}");
        let args = ["push", "--porcelain", remote, refspec.as_str()];
        let output = output_with_timeout(&self.path, &args, request.timeout).await?;

        let refs = parse_porcelain(&String::from_utf8_lossy(&output.stdout));
        for pushed in &refs {
            debug!(
                local_ref = %pushed.local_ref,
                remote_ref = %pushed.remote_ref,
                flag = %pushed.flag,
                summary = %pushed.summary,
                "Pushed ref"
            );
        }
        validate_pushed_refs(&refs, remote, &String::from_utf8_lossy(&output.stderr))?;

        if !has_upstream {
            self.set_upstream(&branch, remote, &remote_branch).await?;
        }
        Ok(PushReport::Pushed { refs })
    }

    async fn has_tracking_branch(&self, branch: &str) -> Result<bool, GitError> {
        Ok(self.upstream_of(branch).await?.is_some())
    }

    async fn needs_push(&self, branch: Option<&str>) -> Result<bool, GitError> {
        let branch = match branch {
            Some(branch) => branch.to_string(),
            None => self.current_branch().await?,
        };

        if self.upstream_of(&branch).await?.is_none() {
            return Ok(false);
        }

        let range = format!("{branch}@{{upstream}}..{branch}");
        let ahead = count_git(&self.path, &["rev-list", "--count", &range, "--"]).await?;
        Ok(ahead > 0)
    }

    async fn file_count(&self, status: FileStatus) -> Result<usize, GitError> {
        Ok(self.status_counts().await?.count(status))
    }
}
