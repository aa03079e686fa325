//! Template rendering error types.

/// Failure to render configured commit or pull request text.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Malformed template or reference to an unknown variable.
    #[error("Template rendering error: {0}")]
    RenderError(#[from] handlebars::RenderError),
}
