//! Push settings and `git push --porcelain` result handling.

use super::GitError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How a diverged remote branch is integrated before pushing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReconciliationMethod {
    /// `git pull --no-rebase`
    #[default]
    Merge,
    /// `git pull --rebase`
    Rebase,
    /// `git pull --ff-only`
    FfOnly,
}

impl ReconciliationMethod {
    /// The `git pull` flag selecting this method.
    #[must_use]
    pub fn pull_flag(&self) -> &'static str {
        match self {
            Self::Merge => "--no-rebase",
            Self::Rebase => "--rebase",
            Self::FfOnly => "--ff-only",
        }
    }
}

impl FromStr for ReconciliationMethod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "merge" => Ok(Self::Merge),
            "rebase" => Ok(Self::Rebase),
            "ff-only" | "ff_only" | "fast-forward" => Ok(Self::FfOnly),
            other => Err(format!(
                "unknown reconciliation method '{other}', expected one of: merge, rebase, ff-only"
            )),
        }
    }
}

/// Parameters of a push.
#[derive(Debug, Clone)]
pub struct PushRequest {
    /// Remote name.
    pub remote: String,
    /// Remote branch name, defaults to the current branch's name.
    pub remote_branch: Option<String>,
    /// Bound on each network operation (pull, push).
    pub timeout: Duration,
    /// How to integrate a diverged upstream.
    pub reconciliation: ReconciliationMethod,
}

impl PushRequest {
    /// Push to `origin` under the current branch's name.
    #[must_use]
    pub fn to_origin(timeout: Duration, reconciliation: ReconciliationMethod) -> Self {
        Self {
            remote: "origin".to_string(),
            remote_branch: None,
            timeout,
            reconciliation,
        }
    }
}

/// Per-ref result flag as printed by `git push --porcelain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PushFlag {
    FastForward,
    ForcedUpdate,
    NewHead,
    NewTag,
    UpToDate,
    Deleted,
    Rejected,
    Unknown(char),
}

impl PushFlag {
    fn from_porcelain(flag: char, remote_ref: &str) -> Self {
        match flag {
            ' ' => Self::FastForward,
            '+' => Self::ForcedUpdate,
            '*' if remote_ref.starts_with("refs/tags/") => Self::NewTag,
            '*' => Self::NewHead,
            '=' => Self::UpToDate,
            '-' => Self::Deleted,
            '!' => Self::Rejected,
            other => Self::Unknown(other),
        }
    }

    /// Whether the remote ended up with the pushed state.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(
            self,
            Self::FastForward | Self::ForcedUpdate | Self::NewHead | Self::NewTag | Self::UpToDate
        )
    }
}

impl fmt::Display for PushFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FastForward => f.write_str("fast-forward"),
            Self::ForcedUpdate => f.write_str("forced update"),
            Self::NewHead => f.write_str("new branch"),
            Self::NewTag => f.write_str("new tag"),
            Self::UpToDate => f.write_str("up to date"),
            Self::Deleted => f.write_str("deleted"),
            Self::Rejected => f.write_str("rejected"),
            Self::Unknown(flag) => write!(f, "unknown flag '{flag}'"),
        }
    }
}

/// One ref line of a porcelain push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushedRef {
    pub flag: PushFlag,
    pub local_ref: String,
    pub remote_ref: String,
    pub summary: String,
}

/// What a push did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PushReport {
    /// The remote already had everything; nothing was sent.
    UpToDate,
    /// Refs were pushed.
    Pushed { refs: Vec<PushedRef> },
}

/// Parses the ref lines of `git push --porcelain` output.
///
/// Lines have the shape `<flag>\t<from>:<to>\t<summary>`; the `To <url>`
/// header and trailing `Done` are skipped.
#[must_use]
pub fn parse_porcelain(stdout: &str) -> Vec<PushedRef> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut fields = line.splitn(3, '\t');
            let flag_field = fields.next()?;
            let refs = fields.next()?;
            let summary = fields.next().unwrap_or_default();

            let mut flag_chars = flag_field.chars();
            let flag = flag_chars.next()?;
            if flag_chars.next().is_some() {
                return None;
            }

            let (local_ref, remote_ref) = refs.split_once(':')?;
            Some(PushedRef {
                flag: PushFlag::from_porcelain(flag, remote_ref),
                local_ref: local_ref.to_string(),
                remote_ref: remote_ref.to_string(),
                summary: summary.trim().to_string(),
            })
        })
        .collect()
}

/// Fails unless every pushed ref was accepted.
///
/// An empty list means the remote answered nothing and counts as a total
/// failure; `stderr` is attached to that error.
pub fn validate_pushed_refs(
    refs: &[PushedRef],
    remote: &str,
    stderr: &str,
) -> Result<(), GitError> {
    if refs.is_empty() {
        return Err(GitError::PushFailed {
            remote: remote.to_string(),
            message: stderr.trim().to_string(),
        });
    }

    match refs.iter().find(|r| !r.flag.is_accepted()) {
        Some(rejected) => Err(GitError::PushRejected {
            reference: rejected.remote_ref.clone(),
            flag: rejected.flag,
            summary: rejected.summary.clone(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_new_branch_push() {
        let stdout = "To /tmp/remote.git\n*\trefs/heads/feat:refs/heads/feat\t[new branch]\nDone\n";
        let refs = parse_porcelain(stdout);

        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].flag, PushFlag::NewHead);
        assert_eq!(refs[0].local_ref, "refs/heads/feat");
        assert_eq!(refs[0].remote_ref, "refs/heads/feat");
        assert_eq!(refs[0].summary, "[new branch]");
        assert!(validate_pushed_refs(&refs, "origin", "").is_ok());
    }

    #[test]
    fn parses_fast_forward_with_leading_space_flag() {
        let stdout = "To origin\n \trefs/heads/main:refs/heads/main\t1a2b3c..4d5e6f\nDone\n";
        let refs = parse_porcelain(stdout);

        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].flag, PushFlag::FastForward);
    }

    #[test]
    fn rejects_refused_ref() {
        let stdout = "To origin\n!\trefs/heads/main:refs/heads/main\t[rejected] (non-fast-forward)\nDone\n";
        let refs = parse_porcelain(stdout);
        let error = validate_pushed_refs(&refs, "origin", "").unwrap_err();

        match error {
            GitError::PushRejected {
                reference, flag, ..
            } => {
                assert_eq!(reference, "refs/heads/main");
                assert_eq!(flag, PushFlag::Rejected);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn deleted_and_unknown_flags_are_not_accepted() {
        assert!(!PushFlag::Deleted.is_accepted());
        assert!(!PushFlag::Unknown('?').is_accepted());
        assert!(PushFlag::UpToDate.is_accepted());
        assert!(PushFlag::ForcedUpdate.is_accepted());
    }

    #[test]
    fn empty_push_result_is_total_failure() {
        let error = validate_pushed_refs(&[], "origin", "fatal: unable to access\n").unwrap_err();
        assert!(matches!(error, GitError::PushFailed { .. }));
        assert!(error.to_string().contains("fatal: unable to access"));
    }

    #[test]
    fn parses_reconciliation_method() {
        assert_eq!(
            "rebase".parse::<ReconciliationMethod>(),
            Ok(ReconciliationMethod::Rebase)
        );
        assert_eq!(
            "ff-only".parse::<ReconciliationMethod>(),
            Ok(ReconciliationMethod::FfOnly)
        );
        assert!("squash".parse::<ReconciliationMethod>().is_err());
        assert_eq!(ReconciliationMethod::default().pull_flag(), "--no-rebase");
    }
}
