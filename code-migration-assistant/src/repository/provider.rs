//! Source-control provider descriptors.

use url::Url;

/// Hosting service a repository's pull requests are raised on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// github.com or a GitHub Enterprise server.
    GitHub,
    /// Azure DevOps Services or Server.
    AzureDevOps,
}

impl ProviderKind {
    /// Parses a provider `type` value from the targets document.
    ///
    /// Matching ignores case and whitespace, so `"Azure DevOps"`,
    /// `"azure devops"` and `"azuredevops"` are the same provider.
    #[must_use]
    pub fn from_config_type(value: &str) -> Option<Self> {
        let normalized: String = value
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "github" => Some(Self::GitHub),
            "azuredevops" => Some(Self::AzureDevOps),
            _ => None,
        }
    }

    /// Key of this provider's section under `pullRequest`.
    #[must_use]
    pub fn config_key(&self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::AzureDevOps => "azuredevops",
        }
    }

    /// Human readable provider name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::GitHub => "GitHub",
            Self::AzureDevOps => "Azure DevOps",
        }
    }
}

/// Where and how a repository's pull requests are managed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScmProviderDescriptor {
    /// A GitHub hosted repository.
    GitHub {
        /// Host name, `github.com` or an enterprise domain.
        domain: String,
        /// Owning user or organization.
        owner_or_org: String,
    },
    /// An Azure DevOps hosted repository.
    AzureDevOps {
        /// Organization or collection URL.
        base_url: Url,
        /// Project containing the repository.
        project: String,
    },
}

impl ScmProviderDescriptor {
    /// Returns the provider kind.
    #[must_use]
    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::GitHub { .. } => ProviderKind::GitHub,
            Self::AzureDevOps { .. } => ProviderKind::AzureDevOps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_provider_type() {
        assert_eq!(
            ProviderKind::from_config_type("GitHub"),
            Some(ProviderKind::GitHub)
        );
        assert_eq!(
            ProviderKind::from_config_type(" Azure DevOps "),
            Some(ProviderKind::AzureDevOps)
        );
        assert_eq!(
            ProviderKind::from_config_type("azuredevops"),
            Some(ProviderKind::AzureDevOps)
        );
        assert_eq!(ProviderKind::from_config_type("gitlab"), None);
    }

    #[test]
    fn descriptor_reports_kind() {
        let descriptor = ScmProviderDescriptor::AzureDevOps {
            base_url: Url::parse("https://dev.azure.com/acme").unwrap(),
            project: "proj".to_string(),
        };
        assert_eq!(descriptor.kind(), ProviderKind::AzureDevOps);
        assert_eq!(descriptor.kind().config_key(), "azuredevops");
    }
}
