//! Pull request status types.

use serde::Serialize;

/// Result of a pull request creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PrStatus {
    /// Request successfully created.
    Created {
        /// Provider request number.
        number: u64,
        /// Web URL of the request.
        url: String,
    },

    /// An open request for the same branches already existed.
    AlreadyExists {
        /// Number of the existing request, when it could be looked up.
        number: Option<u64>,
    },
}

impl PrStatus {
    /// Returns the status as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::AlreadyExists { .. } => "already_exists",
        }
    }

    /// Returns the request URL if created.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Created { url, .. } => Some(url),
            Self::AlreadyExists { .. } => None,
        }
    }
}
