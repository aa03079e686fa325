//! Provider credentials.

use std::fmt;

/// Environment variable holding the github.com token.
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";
/// Environment variable holding the GitHub Enterprise token.
pub const GITHUB_ENTERPRISE_TOKEN_VAR: &str = "GITHUB_ENTERPRISE_TOKEN";
/// Environment variable holding the Azure DevOps personal access token.
pub const AZURE_DEVOPS_PAT_VAR: &str = "AZURE_DEVOPS_PAT";

const PUBLIC_GITHUB_DOMAIN: &str = "github.com";

/// Tokens for the supported providers. Any of them may be absent.
#[derive(Clone, Default)]
pub struct Credentials {
    github_token: Option<String>,
    github_enterprise_token: Option<String>,
    azure_devops_pat: Option<String>,
}

impl Credentials {
    /// Creates an empty credential set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every credential from its environment variable.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new()
            .with_github_token(std::env::var(GITHUB_TOKEN_VAR).ok())
            .with_github_enterprise_token(std::env::var(GITHUB_ENTERPRISE_TOKEN_VAR).ok())
            .with_azure_devops_pat(std::env::var(AZURE_DEVOPS_PAT_VAR).ok())
    }

    /// Sets the github.com token.
    #[must_use]
    pub fn with_github_token(mut self, token: Option<String>) -> Self {
        self.github_token = non_empty(token);
        self
    }

    /// Sets the GitHub Enterprise token.
    #[must_use]
    pub fn with_github_enterprise_token(mut self, token: Option<String>) -> Self {
        self.github_enterprise_token = non_empty(token);
        self
    }

    /// Sets the Azure DevOps PAT.
    #[must_use]
    pub fn with_azure_devops_pat(mut self, pat: Option<String>) -> Self {
        self.azure_devops_pat = non_empty(pat);
        self
    }

    /// Token for a GitHub domain and the variable it is read from.
    #[must_use]
    pub fn github_token_for(&self, domain: &str) -> (Option<&str>, &'static str) {
        if domain.eq_ignore_ascii_case(PUBLIC_GITHUB_DOMAIN) {
            (self.github_token.as_deref(), GITHUB_TOKEN_VAR)
        } else {
            (
                self.github_enterprise_token.as_deref(),
                GITHUB_ENTERPRISE_TOKEN_VAR,
            )
        }
    }

    /// The Azure DevOps PAT.
    #[must_use]
    pub fn azure_devops_pat(&self) -> Option<&str> {
        self.azure_devops_pat.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("github_token", &redact(&self.github_token))
            .field(
                "github_enterprise_token",
                &redact(&self.github_enterprise_token),
            )
            .field("azure_devops_pat", &redact(&self.azure_devops_pat))
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_token_by_domain() {
        let credentials = Credentials::new()
            .with_github_token(Some("public".to_string()))
            .with_github_enterprise_token(Some("enterprise".to_string()));

        assert_eq!(
            credentials.github_token_for("github.com"),
            (Some("public"), GITHUB_TOKEN_VAR)
        );
        assert_eq!(
            credentials.github_token_for("git.acme.corp"),
            (Some("enterprise"), GITHUB_ENTERPRISE_TOKEN_VAR)
        );
    }

    #[test]
    fn blank_tokens_are_absent() {
        let credentials = Credentials::new().with_azure_devops_pat(Some("  ".to_string()));
        assert_eq!(credentials.azure_devops_pat(), None);
    }

    #[test]
    fn from_env_reads_each_variable() {
        temp_env::with_vars(
            [
                (GITHUB_TOKEN_VAR, Some("public")),
                (GITHUB_ENTERPRISE_TOKEN_VAR, None),
                (AZURE_DEVOPS_PAT_VAR, Some("pat")),
            ],
            || {
                let credentials = Credentials::from_env();
                assert_eq!(credentials.github_token_for("github.com").0, Some("public"));
                assert_eq!(credentials.github_token_for("git.acme.corp").0, None);
                assert_eq!(credentials.azure_devops_pat(), Some("pat"));
            },
        );
    }

    #[test]
    fn from_env_without_variables_is_empty() {
        temp_env::with_vars_unset(
            [GITHUB_TOKEN_VAR, GITHUB_ENTERPRISE_TOKEN_VAR, AZURE_DEVOPS_PAT_VAR],
            || {
                let credentials = Credentials::from_env();
                assert_eq!(credentials.github_token_for("github.com").0, None);
                assert_eq!(credentials.azure_devops_pat(), None);
            },
        );
    }

    #[test]
    fn debug_redacts_secrets() {
        let credentials = Credentials::new().with_github_token(Some("ghp_secret".to_string()));
        let debug = format!("{credentials:?}");
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("<redacted>"));
    }
}
