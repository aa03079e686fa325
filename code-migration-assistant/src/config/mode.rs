//! Run mode.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// How far the pipeline goes for each repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Search and replace only. Nothing is committed or pushed.
    Dev,
    /// Full pipeline: identity, branch, replace, commit, push, pull request.
    #[default]
    Prod,
}

impl Mode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Prod => "prod",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = super::ConfigError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "prod" => Ok(Self::Prod),
            _ => Err(super::ConfigError::InvalidMode {
                value: value.to_string(),
            }),
        }
    }
}
