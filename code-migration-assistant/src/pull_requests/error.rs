//! Pull request error types and provider failure diagnosis.

use crate::templates::TemplateError;
use thiserror::Error;

/// Errors that can occur while querying or creating pull requests.
#[derive(Debug, Error)]
pub enum PrError {
    /// No credential was provided for the provider.
    #[error("No {provider} credential configured. Please set the '{variable}' environment variable")]
    MissingCredential {
        provider: &'static str,
        variable: &'static str,
    },

    /// The credential was refused.
    #[error("Invalid {provider} credential. Please make sure '{variable}' is valid and not expired")]
    Unauthorized {
        provider: &'static str,
        variable: &'static str,
    },

    /// The organization requires SAML authorization of the token.
    #[error("Access to '{repository}' requires SAML SSO authorization of the token for its organization")]
    SamlEnforced { repository: String },

    /// The credential lacks permission.
    #[error("Insufficient access to '{repository}'. Please make sure '{variable}' has pull request permissions")]
    Forbidden {
        repository: String,
        variable: &'static str,
    },

    /// The repository is unknown to the provider.
    #[error("Repository '{repository}' not found. Please make sure it exists and '{variable}' can access it")]
    RepositoryNotFound {
        repository: String,
        variable: &'static str,
    },

    /// The Azure DevOps project is unknown.
    #[error("Project '{project}' does not exist or you do not have permission to access it")]
    ProjectNotFound { project: String },

    /// The base ref of the request does not exist.
    #[error("Invalid base '{base}'. Please make sure '{config_path}' names an existing branch")]
    InvalidBaseRef {
        base: String,
        config_path: &'static str,
    },

    /// An open request for the same branches exists.
    #[error("An active pull request for the source and target branch already exists in '{repository}'")]
    AlreadyExists { repository: String },

    /// A provider URL could not be built.
    #[error("Invalid provider url '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Rendering the request text failed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Any other GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHubError(#[source] octocrab::Error),

    /// Any other Azure DevOps API error.
    #[error("Azure DevOps API error ({status}): {message}")]
    AzureDevOps { status: u16, message: String },

    /// Transport failure talking to a provider.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Provider-independent classification of a failed API response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProviderFailure {
    Unauthorized,
    SamlEnforced,
    Forbidden,
    NotFound,
    ProjectNotFound,
    InvalidBase,
    Duplicate,
    Other,
}

/// Classifies a failed response from its status code and error text.
pub(crate) fn classify_failure(status: u16, text: &str) -> ProviderFailure {
    let lower = text.to_lowercase();

    if lower.contains("tf401179")
        || lower.contains("pull request already exists")
        || (lower.contains("active pull request") && lower.contains("already exists"))
    {
        return ProviderFailure::Duplicate;
    }
    if lower.contains("project does not exist") {
        return ProviderFailure::ProjectNotFound;
    }

    match status {
        401 => ProviderFailure::Unauthorized,
        403 if lower.contains("saml") => ProviderFailure::SamlEnforced,
        403 => ProviderFailure::Forbidden,
        404 => ProviderFailure::NotFound,
        422 if lower.contains("\"field\":\"base\"") => ProviderFailure::InvalidBase,
        _ if lower.contains("does not exist") => ProviderFailure::NotFound,
        _ => ProviderFailure::Other,
    }
}
