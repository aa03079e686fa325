//! GitHub pull request client.

use super::error::{classify_failure, ProviderFailure};
use super::refs::{same_branch, short_branch_name};
use super::{Credentials, OpenRequest, PrError, PrStatus, PullRequestClient, PullRequestPayload};
use crate::rate_limit::ensure_core_rate_limit;
use octocrab::params::State;
use octocrab::Octocrab;
use tracing::{debug, info, info_span, warn, Instrument};

const PUBLIC_DOMAIN: &str = "github.com";
const PUBLIC_API: &str = "https://api.github.com";
const PROVIDER: &str = "GitHub";

/// Pull request operations on github.com or a GitHub Enterprise server.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    domain: String,
    owner: String,
    token: Option<String>,
    token_variable: &'static str,
    user_agent: String,
}

impl GitHubClient {
    /// Creates a client for repositories of `owner` on `domain`.
    pub fn new(domain: &str, owner: &str, credentials: &Credentials, user_agent: &str) -> Self {
        let (token, token_variable) = credentials.github_token_for(domain);
        Self {
            domain: domain.to_string(),
            owner: owner.to_string(),
            token: token.map(str::to_string),
            token_variable,
            user_agent: user_agent.to_string(),
        }
    }

    /// REST API root for the configured domain.
    #[must_use]
    pub fn api_base_url(&self) -> String {
        if self.domain.eq_ignore_ascii_case(PUBLIC_DOMAIN) {
            PUBLIC_API.to_string()
        } else {
            format!("https://{}/api/v3", self.domain)
        }
    }

    fn client(&self) -> Result<Octocrab, PrError> {
        let token = self.token.clone().ok_or(PrError::MissingCredential {
            provider: PROVIDER,
            variable: self.token_variable,
        })?;

        let base_url = self.api_base_url();
        Octocrab::builder()
            .base_uri(base_url.as_str())
            .map_err(|e| PrError::InvalidUrl {
                url: base_url.clone(),
                message: e.to_string(),
            })?
            .personal_token(token)
            .add_header(reqwest::header::USER_AGENT, self.user_agent.clone())
            .build()
            .map_err(PrError::GitHubError)
    }

    fn diagnose(&self, error: octocrab::Error, repository: &str, base: &str) -> PrError {
        let octocrab::Error::GitHub { source, .. } = &error else {
            return PrError::GitHubError(error);
        };

        let details = source
            .errors
            .as_ref()
            .and_then(|errors| serde_json::to_string(errors).ok())
            .unwrap_or_default();
        let text = format!("{} {details}", source.message);
        debug!(status = source.status_code.as_u16(), response = %text, "GitHub error response");

        let full_name = format!("{}/{repository}", self.owner);
        match classify_failure(source.status_code.as_u16(), &text) {
            ProviderFailure::Unauthorized => PrError::Unauthorized {
                provider: PROVIDER,
                variable: self.token_variable,
            },
            ProviderFailure::SamlEnforced => PrError::SamlEnforced {
                repository: full_name,
            },
            ProviderFailure::Forbidden => PrError::Forbidden {
                repository: full_name,
                variable: self.token_variable,
            },
            ProviderFailure::NotFound | ProviderFailure::ProjectNotFound => {
                PrError::RepositoryNotFound {
                    repository: full_name,
                    variable: self.token_variable,
                }
            }
            ProviderFailure::InvalidBase => PrError::InvalidBaseRef {
                base: base.to_string(),
                config_path: "pullRequest.github.base",
            },
            ProviderFailure::Duplicate => PrError::AlreadyExists {
                repository: full_name,
            },
            ProviderFailure::Other => PrError::GitHubError(error),
        }
    }
}

impl PullRequestClient for GitHubClient {
    async fn find_open_requests(
        &self,
        repository: &str,
        source_ref: &str,
        target_ref: &str,
    ) -> Result<Vec<OpenRequest>, PrError> {
        let span = info_span!(
            "github_find_pull_requests",
            owner = %self.owner,
            repo = %repository
        );
        async {
            let octocrab = self.client()?;
            ensure_core_rate_limit(&octocrab).await;

            let head = format!("{}:{}", self.owner, short_branch_name(source_ref));
            let page = octocrab
                .pulls(&self.owner, repository)
                .list()
                .state(State::Open)
                .base(short_branch_name(target_ref))
                .head(head)
                .per_page(100u8)
                .send()
                .await
                .map_err(|e| self.diagnose(e, repository, target_ref))?;

            let requests: Vec<OpenRequest> = page
                .items
                .into_iter()
                .filter(|pr| {
                    same_branch(&pr.head.ref_field, source_ref)
                        && same_branch(&pr.base.ref_field, target_ref)
                })
                .map(|pr| OpenRequest {
                    number: pr.number,
                    url: pr.html_url.map(|url| url.to_string()),
                })
                .collect();

            debug!(count = requests.len(), "Open pull requests found");
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
            "github_create_pull_request",
            owner = %self.owner,
            repo = %repository
        );
        async {
            let octocrab = self.client()?;
            ensure_core_rate_limit(&octocrab).await;

            let result = octocrab
                .pulls(&self.owner, repository)
                .create(&payload.title, &payload.source_ref, &payload.target_ref)
                .body(&payload.description)
                .maintainer_can_modify(payload.maintainer_can_modify)
                .send()
                .await;

            match result {
                Ok(pr) => {
                    let url = pr.html_url.as_ref().map_or_else(
                        || {
                            format!(
                                "https://{}/{}/{repository}/pull/{}",
                                self.domain, self.owner, pr.number
                            )
                        },
                        |url| url.to_string(),
                    );
                    info!(pr_number = pr.number, url = %url, "Pull request created");
                    Ok(PrStatus::Created {
                        number: pr.number,
                        url,
                    })
                }
                Err(e) => match self.diagnose(e, repository, &payload.target_ref) {
                    PrError::AlreadyExists { .. } => {
                        let existing = self
                            .find_open_requests(repository, &payload.source_ref, &payload.target_ref)
                            .await
                            .unwrap_or_default();
                        let number = existing.first().map(|pr| pr.number);
                        warn!(pr_number = ?number, "Pull request already exists");
                        Ok(PrStatus::AlreadyExists { number })
                    }
                    other => Err(other),
                },
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_domain_uses_api_host() {
        let client = GitHubClient::new("github.com", "acme", &Credentials::new(), "agent");
        assert_eq!(client.api_base_url(), "https://api.github.com");
    }

    #[test]
    fn enterprise_domain_uses_api_v3() {
        let client = GitHubClient::new("git.acme.corp", "acme", &Credentials::new(), "agent");
        assert_eq!(client.api_base_url(), "https://git.acme.corp/api/v3");
    }

    #[test]
    fn missing_token_names_variable() {
        let client = GitHubClient::new("git.acme.corp", "acme", &Credentials::new(), "agent");
        let Err(PrError::MissingCredential { variable, .. }) = client.client() else {
            panic!("expected a missing credential error");
        };
        assert_eq!(variable, "GITHUB_ENTERPRISE_TOKEN");
    }
}
