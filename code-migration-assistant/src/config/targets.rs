//! The targets document: repositories, branch, replacements and the text of
//! commits and pull requests.

use super::{ConfigError, Mode};
use crate::patterns::PatternSet;
use crate::pull_requests::{AzureDevOpsPullRequest, GitHubPullRequest, PullRequestConfig};
use crate::repository::{ProviderKind, RepositoryEntry, RepositoryOrigin, ScmProviderDescriptor};
use bstr::ByteSlice;
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashSet;
use url::Url;

/// Commit title used when the document sets none.
pub const DEFAULT_COMMIT_TITLE: &str = "feat: code migration";

/// Branch the migration is committed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetBranch {
    pub name: String,
    /// Branch a new target branch starts from; the current branch otherwise.
    pub from: Option<String>,
}

/// Commit message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    pub title: String,
    pub description: Option<String>,
}

impl Default for CommitMessage {
    fn default() -> Self {
        Self {
            title: DEFAULT_COMMIT_TITLE.to_string(),
            description: None,
        }
    }
}

/// A validated targets document.
#[derive(Debug, Clone)]
pub struct TargetsConfig {
    pub repositories: Vec<RepositoryEntry>,
    pub target_branch: TargetBranch,
    pub mode: Mode,
    /// Pattern to replacement, in application order.
    pub replacements: PatternSet,
    /// Paths of the form `<repository folder>/<relative path>`.
    pub files_to_exclude: Vec<String>,
    pub commit_message: CommitMessage,
    pub pull_request: Option<PullRequestConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTargetsConfig {
    target_repos: Option<Vec<RawRepository>>,
    target_branch: Option<RawTargetBranch>,
    mode: Option<String>,
    replacements: Option<IndexMap<String, String>>,
    #[serde(default)]
    files_to_exclude: Vec<String>,
    commit_message: Option<RawCommitMessage>,
    pull_request: Option<RawPullRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRepository {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    source: Option<String>,
    scm_provider: Option<RawScmProvider>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScmProvider {
    #[serde(rename = "type")]
    kind: Option<String>,
    domain: Option<String>,
    owner_or_org: Option<String>,
    base_url: Option<String>,
    project: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTargetBranch {
    name: Option<String>,
    from: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCommitMessage {
    title: Option<String>,
    #[serde(default)]
    description: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawPullRequest {
    github: Option<RawGitHubPullRequest>,
    azuredevops: Option<RawAzureDevOpsPullRequest>,
}

#[derive(Debug, Deserialize)]
struct RawGitHubPullRequest {
    title: Option<String>,
    #[serde(default)]
    body: Vec<String>,
    base: Option<String>,
    maintainer_can_modify: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAzureDevOpsPullRequest {
    title: Option<String>,
    #[serde(default)]
    description: Vec<String>,
    target_ref_name: Option<String>,
}

/// Turns raw values into errors that name the document and key path.
struct Validator<'a> {
    origin: &'a str,
}

impl Validator<'_> {
    fn require<T>(&self, value: Option<T>, key_path: &str) -> Result<T, ConfigError> {
        value.ok_or_else(|| self.missing(key_path))
    }

    fn require_text(
        &self,
        value: Option<String>,
        key_path: &str,
    ) -> Result<String, ConfigError> {
        match value {
            Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            _ => Err(self.missing(key_path)),
        }
    }

    fn missing(&self, key_path: &str) -> ConfigError {
        let key = key_path
            .rsplit('.')
            .next()
            .unwrap_or(key_path)
            .split('[')
            .next()
            .unwrap_or(key_path);
        ConfigError::MissingKey {
            path: self.origin.to_string(),
            key: key.to_string(),
            key_path: key_path.to_string(),
        }
    }

    fn invalid(&self, key_path: &str, message: impl Into<String>) -> ConfigError {
        ConfigError::ValidationError {
            path: self.origin.to_string(),
            key_path: key_path.to_string(),
            message: message.into(),
        }
    }

    fn branch_name(
        &self,
        value: Option<String>,
        key_path: &str,
    ) -> Result<String, ConfigError> {
        let name = self.require_text(value, key_path)?;
        gix_validate::reference::name_partial(name.as_bytes().as_bstr()).map_err(|e| {
            self.invalid(key_path, format!("'{name}' is not a valid branch name: {e}"))
        })?;
        Ok(name)
    }

    fn repository(
        &self,
        raw: RawRepository,
        index: usize,
    ) -> Result<RepositoryEntry, ConfigError> {
        let prefix = format!("targetRepos[{index}]");
        let name = self.require_text(raw.name, &format!("{prefix}.name"))?;

        let kind_path = format!("{prefix}.type");
        let kind = self.require_text(raw.kind, &kind_path)?;
        let origin = RepositoryOrigin::from_config_type(&kind).ok_or_else(|| {
            self.invalid(
                &kind_path,
                format!("unknown repository type '{kind}', expected 'local' or 'remote'"),
            )
        })?;

        let source = self.require_text(raw.source, &format!("{prefix}.source"))?;
        let provider_path = format!("{prefix}.scmProvider");
        let provider = self.require(raw.scm_provider, &provider_path)?;
        let provider = self.provider(provider, &provider_path)?;

        Ok(RepositoryEntry {
            name,
            origin,
            source,
            provider,
        })
    }

    fn provider(
        &self,
        raw: RawScmProvider,
        prefix: &str,
    ) -> Result<ScmProviderDescriptor, ConfigError> {
        let kind_path = format!("{prefix}.type");
        let kind = self.require_text(raw.kind, &kind_path)?;
        let kind = ProviderKind::from_config_type(&kind).ok_or_else(|| {
            self.invalid(
                &kind_path,
                format!("unsupported provider '{kind}', expected 'github' or 'azuredevops'"),
            )
        })?;

        match kind {
            ProviderKind::GitHub => Ok(ScmProviderDescriptor::GitHub {
                domain: self.require_text(raw.domain, &format!("{prefix}.domain"))?,
                owner_or_org: self
                    .require_text(raw.owner_or_org, &format!("{prefix}.ownerOrOrg"))?,
            }),
            ProviderKind::AzureDevOps => {
                let url_path = format!("{prefix}.baseUrl");
                let base_url = self.require_text(raw.base_url, &url_path)?;
                let base_url = Url::parse(&base_url).map_err(|e| {
                    self.invalid(&url_path, format!("'{base_url}' is not a valid url: {e}"))
                })?;
                if base_url.cannot_be_a_base() {
                    return Err(
                        self.invalid(&url_path, format!("'{base_url}' cannot be a base url"))
                    );
                }
                Ok(ScmProviderDescriptor::AzureDevOps {
                    base_url,
                    project: self.require_text(raw.project, &format!("{prefix}.project"))?,
                })
            }
        }
    }

    fn pull_request(
        &self,
        raw: RawPullRequest,
        used: &HashSet<ProviderKind>,
    ) -> Result<PullRequestConfig, ConfigError> {
        let github = match raw.github {
            Some(pr) => Some(GitHubPullRequest {
                title: self.require_text(pr.title, "pullRequest.github.title")?,
                body: pr.body.join("\n"),
                base: self.branch_name(pr.base, "pullRequest.github.base")?,
                maintainer_can_modify: pr.maintainer_can_modify,
            }),
            None if used.contains(&ProviderKind::GitHub) => {
                return Err(self.missing("pullRequest.github"));
            }
            None => None,
        };

        let azure_devops = match raw.azuredevops {
            Some(pr) => Some(AzureDevOpsPullRequest {
                title: self.require_text(pr.title, "pullRequest.azuredevops.title")?,
                description: pr.description.join("\n"),
                target_ref_name: self
                    .branch_name(pr.target_ref_name, "pullRequest.azuredevops.targetRefName")?,
            }),
            None if used.contains(&ProviderKind::AzureDevOps) => {
                return Err(self.missing("pullRequest.azuredevops"));
            }
            None => None,
        };

        Ok(PullRequestConfig {
            github,
            azure_devops,
        })
    }
}

impl TargetsConfig {
    /// Parses and validates a targets document.
    ///
    /// `origin` names the document in error messages.
    ///
    /// # Errors
    ///
    /// Returns an error naming the exact key path of the first missing or
    /// invalid value, or [`ConfigError::InvalidMode`] for an unknown mode.
    pub fn from_json(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        let raw: RawTargetsConfig =
            serde_json::from_str(contents).map_err(|source| ConfigError::JsonError {
                path: origin.to_string(),
                source,
            })?;
        let validator = Validator { origin };

        let raw_repos = validator.require(raw.target_repos, "targetRepos")?;
        let mut repositories = Vec::with_capacity(raw_repos.len());
        let mut names = HashSet::new();
        for (index, raw_repo) in raw_repos.into_iter().enumerate() {
            let repository = validator.repository(raw_repo, index)?;
            if !names.insert(repository.name.clone()) {
                return Err(validator.invalid(
                    &format!("targetRepos[{index}].name"),
                    format!("duplicate repository name '{}'", repository.name),
                ));
            }
            repositories.push(repository);
        }

        let raw_branch = validator.require(raw.target_branch, "targetBranch")?;
        let target_branch = TargetBranch {
            name: validator.branch_name(raw_branch.name, "targetBranch.name")?,
            from: match raw_branch.from {
                Some(from) => Some(validator.branch_name(Some(from), "targetBranch.from")?),
                None => None,
            },
        };

        let mode = match raw.mode.as_deref() {
            Some(mode) => mode.parse::<Mode>()?,
            None => Mode::default(),
        };

        let replacements = validator.require(raw.replacements, "replacements")?;

        let commit_message = match raw.commit_message {
            Some(message) => CommitMessage {
                title: message
                    .title
                    .filter(|title| !title.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_COMMIT_TITLE.to_string()),
                description: (!message.description.is_empty())
                    .then(|| message.description.join("\n")),
            },
            None => CommitMessage::default(),
        };

        let used: HashSet<ProviderKind> = repositories.iter().map(|r| r.provider.kind()).collect();
        let pull_request = match raw.pull_request {
            Some(pr) => Some(validator.pull_request(pr, &used)?),
            None => None,
        };

        Ok(Self {
            repositories,
            target_branch,
            mode,
            replacements,
            files_to_exclude: raw.files_to_exclude,
            commit_message,
            pull_request,
        })
    }
}
