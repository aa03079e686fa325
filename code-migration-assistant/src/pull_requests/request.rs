//! Configured pull request text and the payload built from it.

use super::refs::normalize_branch_ref;
use super::PrError;
use crate::repository::ProviderKind;
use crate::templates::{RenderContext, TemplateRenderer};
use serde::Serialize;

/// GitHub pull request settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubPullRequest {
    pub title: String,
    pub body: String,
    /// Branch the request merges into.
    pub base: String,
    pub maintainer_can_modify: Option<bool>,
}

/// Azure DevOps pull request settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureDevOpsPullRequest {
    pub title: String,
    pub description: String,
    /// Branch the request merges into.
    pub target_ref_name: String,
}

/// Per-provider pull request settings from the targets document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestConfig {
    pub github: Option<GitHubPullRequest>,
    pub azure_devops: Option<AzureDevOpsPullRequest>,
}

/// A pull request ready to be submitted, with refs fully qualified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestPayload {
    pub title: String,
    pub description: String,
    pub source_ref: String,
    pub target_ref: String,
    pub maintainer_can_modify: Option<bool>,
}

impl PullRequestConfig {
    /// Fully qualified target ref for `kind`.
    #[must_use]
    pub fn target_ref(&self, kind: ProviderKind) -> Option<String> {
        match kind {
            ProviderKind::GitHub => self.github.as_ref().map(|pr| normalize_branch_ref(&pr.base)),
            ProviderKind::AzureDevOps => self
                .azure_devops
                .as_ref()
                .map(|pr| normalize_branch_ref(&pr.target_ref_name)),
        }
    }

    /// Builds the payload for `kind`, rendering title and description.
    ///
    /// Returns `None` when there is no section for `kind`.
    ///
    /// # Errors
    ///
    /// Returns an error if the title or description fails to render.
    pub fn payload(
        &self,
        kind: ProviderKind,
        source_branch: &str,
        renderer: &TemplateRenderer,
        context: &RenderContext<'_>,
    ) -> Result<Option<PullRequestPayload>, PrError> {
        let (title, description, target, maintainer_can_modify) = match kind {
            ProviderKind::GitHub => match &self.github {
                Some(pr) => (&pr.title, &pr.body, &pr.base, pr.maintainer_can_modify),
                None => return Ok(None),
            },
            ProviderKind::AzureDevOps => match &self.azure_devops {
                Some(pr) => (&pr.title, &pr.description, &pr.target_ref_name, None),
                None => return Ok(None),
            },
        };

        Ok(Some(PullRequestPayload {
            title: renderer.render(title, context)?,
            description: renderer.render(description, context)?,
            source_ref: normalize_branch_ref(source_branch),
            target_ref: normalize_branch_ref(target),
            maintainer_can_modify,
        }))
    }
}
