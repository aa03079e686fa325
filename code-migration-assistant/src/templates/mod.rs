//! Commit and pull request text rendering using Handlebars.
//!
//! Configured titles and descriptions may reference the repository being
//! migrated, so one targets document can produce per-repository text.

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::{create_handlebars_registry, RenderContext, TemplateRenderer};
