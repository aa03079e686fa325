//! Template renderer.

use crate::config::Mode;
use handlebars::{handlebars_helper, no_escape, Handlebars};
use serde::Serialize;

/// Variables available to commit and pull request templates.
#[derive(Debug, Clone, Serialize)]
pub struct RenderContext<'a> {
    /// Repository name.
    pub repository: &'a str,
    /// Branch carrying the migration.
    pub branch: &'a str,
    /// Branch the pull request targets, when one is configured.
    pub target_branch: &'a str,
    pub mode: Mode,
}

// `{{#if (eq mode "dev")}}...{{/if}}`
handlebars_helper!(eq: |a: str, b: str| a == b);

/// Creates a Handlebars registry for plain-text templates.
///
/// Escaping is off since commit messages and markdown bodies are not HTML.
/// Strict mode turns references to unknown variables into errors.
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(no_escape);
    hbs.set_strict_mode(true);
    hbs.register_helper("eq", Box::new(eq));
    hbs
}

/// Template renderer for commit and pull request text.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Creates a new template renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlebars: create_handlebars_registry(),
        }
    }

    /// Renders `template` against the repository context.
    ///
    /// Text without Handlebars expressions renders unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is malformed or references an
    /// unknown variable.
    pub fn render(
        &self,
        template: &str,
        context: &RenderContext<'_>,
    ) -> Result<String, super::TemplateError> {
        if !template.contains("{{") {
            return Ok(template.to_string());
        }
        Ok(self.handlebars.render_template(template, context)?)
    }
}
