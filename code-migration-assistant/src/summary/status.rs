//! Run status and process exit codes.

use crate::pipeline::FailureKind;

/// Final status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    /// The targets document could not be loaded.
    ConfigError,
    /// The targets document names an unknown mode.
    InvalidMode,
    /// The last processed repository was aborted.
    Failed(FailureKind),
}

impl RunStatus {
    /// Process exit code for this status.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Success => 0,
            Self::ConfigError => 1,
            Self::InvalidMode => 6,
            Self::Failed(kind) => kind.exit_code(),
        }
    }
}
