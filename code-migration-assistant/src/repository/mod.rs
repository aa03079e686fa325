//! Target repositories and their working trees.
//!
//! A [`RepositoryEntry`] is what the targets document declares; a
//! [`RepositoryTarget`] is the same repository once a local working tree is
//! available for it.

mod error;
mod provider;

pub use error::RepositoryError;
pub use provider::{ProviderKind, ScmProviderDescriptor};

use crate::git::{GitError, GitRepository};
use std::path::{Path, PathBuf};
use tracing::{error, info, info_span, warn, Instrument};

/// Where a repository's working tree comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryOrigin {
    /// An existing working tree on disk.
    Local,
    /// A remote cloned into the clone directory.
    Remote,
}

impl RepositoryOrigin {
    /// Parses the `type` of a repository entry.
    #[must_use]
    pub fn from_config_type(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "local" => Some(Self::Local),
            "remote" => Some(Self::Remote),
            _ => None,
        }
    }
}

/// A repository declared in the targets document.
#[derive(Debug, Clone)]
pub struct RepositoryEntry {
    /// Unique name of the repository.
    pub name: String,
    pub origin: RepositoryOrigin,
    /// Filesystem path (local) or clone url (remote).
    pub source: String,
    pub provider: ScmProviderDescriptor,
}

/// A repository with a working tree ready to be migrated.
#[derive(Debug, Clone)]
pub struct RepositoryTarget {
    pub name: String,
    pub working_dir: PathBuf,
    pub origin: RepositoryOrigin,
    pub source: String,
    pub provider: ScmProviderDescriptor,
}

impl RepositoryTarget {
    /// Name of the working tree directory.
    ///
    /// This is the repository name used for provider API calls and the first
    /// segment of exclusion paths.
    #[must_use]
    pub fn folder_name(&self) -> String {
        self.working_dir
            .file_name()
            .map_or_else(|| self.name.clone(), |name| name.to_string_lossy().into_owned())
    }
}

/// A repository that could not be materialized.
#[derive(Debug)]
pub struct LoadFailure {
    pub name: String,
    pub error: RepositoryError,
}

impl RepositoryEntry {
    /// Produces a working tree for this repository.
    ///
    /// Local sources must already be working trees and are resolved to an
    /// absolute path, so `.` names the current directory. Remote sources are
    /// cloned into `clone_dir/<name>`; an existing clone is reused.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is missing or not a working tree, or if
    /// cloning fails.
    pub async fn materialize(&self, clone_dir: &Path) -> Result<RepositoryTarget, RepositoryError> {
        let working_dir = match self.origin {
            RepositoryOrigin::Local => {
                let path = std::fs::canonicalize(&self.source).map_err(|source| {
                    if source.kind() == std::io::ErrorKind::NotFound {
                        RepositoryError::NoSuchPath {
                            path: self.source.clone(),
                        }
                    } else {
                        RepositoryError::ResolvePath {
                            path: self.source.clone(),
                            source,
                        }
                    }
                })?;
                if !GitRepository::new(&path).is_work_tree().await? {
                    return Err(RepositoryError::NotAWorkingTree {
                        path: self.source.clone(),
                    });
                }
                path
            }
            RepositoryOrigin::Remote => self.clone_into(clone_dir).await?,
        };

        Ok(RepositoryTarget {
            name: self.name.clone(),
            working_dir,
            origin: self.origin,
            source: self.source.clone(),
            provider: self.provider.clone(),
        })
    }

    async fn clone_into(&self, clone_dir: &Path) -> Result<PathBuf, RepositoryError> {
        std::fs::create_dir_all(clone_dir).map_err(|source| RepositoryError::CloneDirectory {
            path: clone_dir.display().to_string(),
            source,
        })?;

        let destination = clone_dir.join(&self.name);
        info!(url = %self.source, path = %destination.display(), "Cloning repository");
        match GitRepository::clone_from(&self.source, &destination).await {
            Ok(_) => Ok(destination),
            Err(GitError::CommandFailed { ref stderr, .. }) if stderr.contains("already exists") => {
                warn!(path = %destination.display(), "Repository already cloned, reusing it");
                Ok(destination)
            }
            Err(source) => Err(RepositoryError::CloneFailed {
                url: self.source.clone(),
                source,
            }),
        }
    }
}

/// Materializes every entry, collecting failures instead of stopping.
pub async fn materialize_all(
    entries: &[RepositoryEntry],
    clone_dir: &Path,
) -> (Vec<RepositoryTarget>, Vec<LoadFailure>) {
    let mut targets = Vec::with_capacity(entries.len());
    let mut failures = Vec::new();

    for entry in entries {
        let span = info_span!("load", repo = %entry.name);
        match entry.materialize(clone_dir).instrument(span).await {
            Ok(target) => targets.push(target),
            Err(e) => {
                error!(repo = %entry.name, error = %e, "Failed to load repository");
                failures.push(LoadFailure {
                    name: entry.name.clone(),
                    error: e,
                });
            }
        }
    }

    info!(
        loaded = targets.len(),
        configured = entries.len(),
        "Loaded target repositories"
    );
    (targets, failures)
}
