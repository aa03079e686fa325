//! Configuration loading for migration runs.
//!
//! A run is described by a JSON targets document listing the repositories,
//! the branch to work on, the pattern replacements and the commit and pull
//! request text. See [`TargetsConfig`] for the validated form.

mod error;
mod mode;
mod targets;

pub use error::ConfigError;
pub use mode::Mode;
pub use targets::{CommitMessage, TargetBranch, TargetsConfig, DEFAULT_COMMIT_TITLE};

use std::fs;
use std::path::Path;

/// Loads and validates the targets document at `path`.
///
/// # Errors
///
/// Returns an error if the file is missing or unreadable, is not valid
/// JSON, lacks a required key, or holds an invalid value.
pub fn load_targets_config(path: &Path) -> Result<TargetsConfig, ConfigError> {
    let display = path.display().to_string();
    if !path.exists() {
        return Err(ConfigError::MissingFile { path: display });
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: display.clone(),
        source,
    })?;

    TargetsConfig::from_json(&contents, &display)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = load_targets_config(&temp.path().join("config.json"));
        assert!(matches!(result, Err(ConfigError::MissingFile { .. })));
    }

    #[test]
    fn load_valid_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "targetRepos": [
                    { "name": "svc", "type": "local", "source": "/tmp/svc",
                      "scmProvider": { "type": "github", "domain": "github.com", "ownerOrOrg": "acme" } }
                ],
                "targetBranch": { "name": "feat" },
                "replacements": { "a": "b" }
            }"#,
        )
        .unwrap();

        let config = load_targets_config(&path).unwrap();
        assert_eq!(config.repositories.len(), 1);
        assert_eq!(config.repositories[0].name, "svc");
    }
}
