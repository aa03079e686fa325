//! Azure DevOps pull request client.

use super::credentials::AZURE_DEVOPS_PAT_VAR;
use super::error::{classify_failure, ProviderFailure};
use super::refs::same_branch;
use super::{Credentials, OpenRequest, PrError, PrStatus, PullRequestClient, PullRequestPayload};
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Instrument};
use url::Url;

const API_VERSION: &str = "7.0";
const PROVIDER: &str = "Azure DevOps";

/// Pull request operations on an Azure DevOps project.
#[derive(Debug, Clone)]
pub struct AzureDevOpsClient {
    base_url: Url,
    project: String,
    pat: Option<String>,
    user_agent: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct PullRequestList {
    value: Vec<PullRequestItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestItem {
    pull_request_id: u64,
    source_ref_name: String,
    target_ref_name: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryItem {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePullRequest<'a> {
    source_ref_name: &'a str,
    target_ref_name: &'a str,
    title: &'a str,
    description: &'a str,
}

fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

impl AzureDevOpsClient {
    /// Creates a client for `project` under the organization at `base_url`.
    pub fn new(base_url: &Url, project: &str, credentials: &Credentials, user_agent: &str) -> Self {
        Self {
            base_url: base_url.clone(),
            project: project.to_string(),
            pat: credentials.azure_devops_pat().map(str::to_string),
            user_agent: user_agent.to_string(),
            http: build_http_client(),
        }
    }

    /// `{base}/{project}/_apis/git/repositories/{segments..}?api-version=7.0`
    fn api_url(&self, segments: &[&str]) -> Result<Url, PrError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| PrError::InvalidUrl {
                url: self.base_url.to_string(),
                message: "url cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .push(&self.project)
            .extend(["_apis", "git", "repositories"])
            .extend(segments);
        url.query_pairs_mut().append_pair("api-version", API_VERSION);
        Ok(url)
    }

    /// Browser URL of a pull request.
    fn web_url(&self, repository: &str, number: u64) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend([self.project.as_str(), "_git", repository, "pullrequest"])
                .push(&number.to_string());
        }
        url.to_string()
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&CreatePullRequest<'_>>,
        repository: &str,
    ) -> Result<T, PrError> {
        let pat = self.pat.as_deref().ok_or(PrError::MissingCredential {
            provider: PROVIDER,
            variable: AZURE_DEVOPS_PAT_VAR,
        })?;

        let mut request = self
            .http
            .request(method, url)
            .basic_auth("", Some(pat))
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("application/json"));
        let text = response.text().await?;
        debug!(status = status.as_u16(), response = %text, "Azure DevOps response");

        if status.is_success() {
            // A sign-in page instead of JSON means the PAT was not accepted.
            if !is_json || status == StatusCode::NON_AUTHORITATIVE_INFORMATION {
                return Err(PrError::Unauthorized {
                    provider: PROVIDER,
                    variable: AZURE_DEVOPS_PAT_VAR,
                });
            }
            return serde_json::from_str(&text).map_err(|e| PrError::AzureDevOps {
                status: status.as_u16(),
                message: format!("unexpected response: {e}"),
            });
        }

        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or(text);
        Err(self.diagnose(status.as_u16(), message, repository))
    }

    fn diagnose(&self, status: u16, message: String, repository: &str) -> PrError {
        match classify_failure(status, &message) {
            ProviderFailure::Unauthorized => PrError::Unauthorized {
                provider: PROVIDER,
                variable: AZURE_DEVOPS_PAT_VAR,
            },
            ProviderFailure::SamlEnforced | ProviderFailure::Forbidden => PrError::Forbidden {
                repository: repository.to_string(),
                variable: AZURE_DEVOPS_PAT_VAR,
            },
            ProviderFailure::ProjectNotFound => PrError::ProjectNotFound {
                project: self.project.clone(),
            },
            ProviderFailure::NotFound => PrError::RepositoryNotFound {
                repository: repository.to_string(),
                variable: AZURE_DEVOPS_PAT_VAR,
            },
            ProviderFailure::InvalidBase => PrError::InvalidBaseRef {
                base: message,
                config_path: "pullRequest.azuredevops.targetRefName",
            },
            ProviderFailure::Duplicate => PrError::AlreadyExists {
                repository: repository.to_string(),
            },
            ProviderFailure::Other => PrError::AzureDevOps { status, message },
        }
    }
}

impl PullRequestClient for AzureDevOpsClient {
    async fn find_open_requests(
        &self,
        repository: &str,
        source_ref: &str,
        target_ref: &str,
    ) -> Result<Vec<OpenRequest>, PrError> {
        let span = info_span!(
            "azure_devops_find_pull_requests",
            project = %self.project,
            repo = %repository
        );
        async {
            let mut url = self.api_url(&[repository, "pullrequests"])?;
            url.query_pairs_mut()
                .append_pair("searchCriteria.sourceRefName", source_ref)
                .append_pair("searchCriteria.targetRefName", target_ref)
                .append_pair("searchCriteria.status", "active");

            let list: PullRequestList = self.send(Method::GET, url, None, repository).await?;
            let requests: Vec<OpenRequest> = list
                .value
                .into_iter()
                .filter(|pr| {
                    same_branch(&pr.source_ref_name, source_ref)
                        && same_branch(&pr.target_ref_name, target_ref)
                })
                .map(|pr| OpenRequest {
                    number: pr.pull_request_id,
                    url: Some(self.web_url(repository, pr.pull_request_id)),
                })
                .collect();

            debug!(count = requests.len(), "Active pull requests found");
            Ok(requests)
        }
        .instrument(span)
        .await
    }

    async fn create_request(
        &self,
        repository: &str,
        payload: &PullRequestPayload,
    ) -> Result<PrStatus, PrError> {
        let span = info_span!(
            "azure_devops_create_pull_request",
            project = %self.project,
            repo = %repository
        );
        async {
            let repository_url = self.api_url(&[repository])?;
            let repo: RepositoryItem = self
                .send(Method::GET, repository_url, None, repository)
                .await?;
            debug!(repository_id = %repo.id, "Resolved repository id");

            let body = CreatePullRequest {
                source_ref_name: &payload.source_ref,
                target_ref_name: &payload.target_ref,
                title: &payload.title,
                description: &payload.description,
            };
            let url = self.api_url(&[repo.id.as_str(), "pullrequests"])?;
            let result: Result<PullRequestItem, PrError> =
                self.send(Method::POST, url, Some(&body), repository).await;

            match result {
                Ok(pr) => {
                    let url = self.web_url(repository, pr.pull_request_id);
                    info!(pr_number = pr.pull_request_id, url = %url, "Pull request created");
                    Ok(PrStatus::Created {
                        number: pr.pull_request_id,
                        url,
                    })
                }
                Err(PrError::AlreadyExists { .. }) => {
                    let existing = self
                        .find_open_requests(repository, &payload.source_ref, &payload.target_ref)
                        .await
                        .unwrap_or_default();
                    let number = existing.first().map(|pr| pr.number);
                    warn!(pr_number = ?number, "Pull request already exists");
                    Ok(PrStatus::AlreadyExists { number })
                }
                Err(e) => Err(e),
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AzureDevOpsClient {
        AzureDevOpsClient::new(
            &Url::parse("https://dev.azure.com/acme/").unwrap(),
            "My Project",
            &Credentials::new(),
            "agent",
        )
    }

    #[test]
    fn builds_api_urls() {
        let url = client().api_url(&["svc-a", "pullrequests"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://dev.azure.com/acme/My%20Project/_apis/git/repositories/svc-a/pullrequests?api-version=7.0"
        );
    }

    #[test]
    fn builds_web_urls() {
        assert_eq!(
            client().web_url("svc-a", 42),
            "https://dev.azure.com/acme/My%20Project/_git/svc-a/pullrequest/42"
        );
    }

    #[test]
    fn diagnoses_duplicate_request() {
        let error = client().diagnose(
            409,
            "TF401179: An active pull request for the source and target branch already exists."
                .to_string(),
            "svc-a",
        );
        assert!(matches!(error, PrError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn missing_pat_fails_before_any_request() {
        let result = client()
            .find_open_requests("svc-a", "refs/heads/feat", "refs/heads/main")
            .await;
        let Err(PrError::MissingCredential { variable, .. }) = result else {
            panic!("expected a missing credential error");
        };
        assert_eq!(variable, "AZURE_DEVOPS_PAT");
    }
}
