//! Thin wrappers around `git` child processes.

use super::GitError;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Builds a non-interactive `git` command running in `dir`.
pub(crate) fn git_command(dir: &Path, args: &[&str]) -> Command {
    let mut command = Command::new("git");
    command
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    command
}

/// Runs a prepared command and collects its output, whatever the exit status.
pub(crate) async fn collect_output(
    mut command: Command,
    args: &[&str],
) -> Result<Output, GitError> {
    command.output().await.map_err(|source| GitError::Spawn {
        command: args.join(" "),
        source,
    })
}

/// Runs a prepared command, failing on a non-zero exit. Returns trimmed stdout.
pub(crate) async fn run_command(command: Command, args: &[&str]) -> Result<String, GitError> {
    let output = collect_output(command, args).await?;
    into_stdout(output, args)
}

/// Runs `git <args>` in `dir`, failing on a non-zero exit. Returns trimmed stdout.
pub(crate) async fn run_git(dir: &Path, args: &[&str]) -> Result<String, GitError> {
    run_command(git_command(dir, args), args).await
}

/// Runs `git <args>` in `dir` and parses its stdout as a count.
pub(crate) async fn count_git(dir: &Path, args: &[&str]) -> Result<u64, GitError> {
    let stdout = run_git(dir, args).await?;
    parse_count(&stdout, args)
}

fn parse_count(stdout: &str, args: &[&str]) -> Result<u64, GitError> {
    stdout.parse().map_err(|_| GitError::UnexpectedOutput {
        command: args.join(" "),
        output: stdout.to_string(),
    })
}

/// Runs `git <args>` in `dir` and reports whether it exited successfully.
pub(crate) async fn probe_git(dir: &Path, args: &[&str]) -> Result<bool, GitError> {
    let output = collect_output(git_command(dir, args), args).await?;
    Ok(output.status.success())
}

/// Runs `git <args>` in `dir`, killing the child when `timeout` elapses.
///
/// The output is returned whatever the exit status.
pub(crate) async fn output_with_timeout(
    dir: &Path,
    args: &[&str],
    timeout: Duration,
) -> Result<Output, GitError> {
    let mut command = git_command(dir, args);
    command.kill_on_drop(true);

    let output = tokio::time::timeout(timeout, collect_output(command, args))
        .await
        .map_err(|_| GitError::Timeout {
            command: args.join(" "),
            timeout_secs: timeout.as_secs(),
        })??;
    Ok(output)
}

fn into_stdout(output: Output, args: &[&str]) -> Result<String, GitError> {
    if !output.status.success() {
        return Err(command_failed(&output, args));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

pub(crate) fn command_failed(output: &Output, args: &[&str]) -> GitError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    GitError::CommandFailed {
        command: args.join(" "),
        stderr: stderr.trim().to_string(),
    }
}
