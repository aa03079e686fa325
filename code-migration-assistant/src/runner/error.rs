//! Runner error types.

use crate::config::ConfigError;
use crate::summary::RunStatus;

/// Errors that stop a run before any repository is processed.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The targets document could not be loaded or failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RunnerError {
    /// Run status this error maps to.
    pub fn status(&self) -> RunStatus {
        match self {
            Self::Config(ConfigError::InvalidMode { .. }) => RunStatus::InvalidMode,
            Self::Config(_) => RunStatus::ConfigError,
        }
    }
}
