//! Pull request queries and creation on the supported providers.
//!
//! [`PullRequestClient`] is the seam the migration pipeline drives.
//! [`ScmClient`] picks the GitHub or Azure DevOps implementation from a
//! repository's provider descriptor.

mod azure_devops;
mod credentials;
mod error;
mod github;
mod refs;
mod request;
mod status;

pub use azure_devops::AzureDevOpsClient;
pub use credentials::{
    Credentials, AZURE_DEVOPS_PAT_VAR, GITHUB_ENTERPRISE_TOKEN_VAR, GITHUB_TOKEN_VAR,
};
pub use error::PrError;
pub use github::GitHubClient;
pub use refs::{normalize_branch_ref, same_branch, short_branch_name};
pub use request::{
    AzureDevOpsPullRequest, GitHubPullRequest, PullRequestConfig, PullRequestPayload,
};
pub use status::PrStatus;

use crate::repository::ScmProviderDescriptor;
use serde::Serialize;

/// An open pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenRequest {
    pub number: u64,
    pub url: Option<String>,
}

/// Pull request operations on one provider account or project.
#[allow(async_fn_in_trait)]
pub trait PullRequestClient {
    /// Open requests from `source_ref` into `target_ref` in `repository`.
    ///
    /// Only requests whose refs match exactly after normalization are
    /// returned.
    async fn find_open_requests(
        &self,
        repository: &str,
        source_ref: &str,
        target_ref: &str,
    ) -> Result<Vec<OpenRequest>, PrError>;

    /// Submits a pull request.
    ///
    /// A request rejected as a duplicate yields [`PrStatus::AlreadyExists`].
    async fn create_request(
        &self,
        repository: &str,
        payload: &PullRequestPayload,
    ) -> Result<PrStatus, PrError>;
}

/// Settings shared by every provider client.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub credentials: Credentials,
    pub user_agent: String,
}

/// Client for whichever provider hosts a repository.
#[derive(Debug, Clone)]
pub enum ScmClient {
    GitHub(GitHubClient),
    AzureDevOps(AzureDevOpsClient),
}

impl ScmClient {
    /// Builds the client matching `provider`.
    ///
    /// Credentials are checked lazily, on the first call that needs them.
    #[must_use]
    pub fn for_provider(provider: &ScmProviderDescriptor, settings: &ProviderSettings) -> Self {
        match provider {
            ScmProviderDescriptor::GitHub {
                domain,
                owner_or_org,
            } => Self::GitHub(GitHubClient::new(
                domain,
                owner_or_org,
                &settings.credentials,
                &settings.user_agent,
            )),
            ScmProviderDescriptor::AzureDevOps { base_url, project } => {
                Self::AzureDevOps(AzureDevOpsClient::new(
                    base_url,
                    project,
                    &settings.credentials,
                    &settings.user_agent,
                ))
            }
        }
    }
}

impl PullRequestClient for ScmClient {
    async fn find_open_requests(
        &self,
        repository: &str,
        source_ref: &str,
        target_ref: &str,
    ) -> Result<Vec<OpenRequest>, PrError> {
        match self {
            Self::GitHub(client) => {
                client
                    .find_open_requests(repository, source_ref, target_ref)
                    .await
            }
            Self::AzureDevOps(client) => {
                client
                    .find_open_requests(repository, source_ref, target_ref)
                    .await
            }
        }
    }

    async fn create_request(
        &self,
        repository: &str,
        payload: &PullRequestPayload,
    ) -> Result<PrStatus, PrError> {
        match self {
            Self::GitHub(client) => client.create_request(repository, payload).await,
            Self::AzureDevOps(client) => client.create_request(repository, payload).await,
        }
    }
}
