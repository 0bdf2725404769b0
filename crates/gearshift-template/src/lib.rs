//! Template language for rendering generated artifacts.
//!
//! Syntax: `{{name}}` (dotted paths allowed), `{{#if name}}…{{else}}…{{/if}}`
//! and `{{#each name}}…{{/each}}` with `{{this}}` and `{{index}}` in the body.
//! Templates are tokenized once, parsed into a tree with an explicit stack,
//! then evaluated against `serde_json::Value` data.

pub mod builtin;
pub mod error;
pub mod parse;
pub mod registry;
pub mod render;
pub mod token;
pub mod validate;

pub use error::{Result, TemplateError};
pub use parse::{Node, Template};
pub use registry::TemplateRegistry;
pub use render::{is_truthy, TemplateLimits};
pub use validate::{validate_template, ValidationReport};

use serde_json::Value;

/// Render `template` against `data` with default limits.
pub fn populate(template: &str, data: &Value) -> Result<String> {
    populate_with_limits(template, data, &TemplateLimits::default())
}

/// Render `template` against `data` with explicit limits.
pub fn populate_with_limits(template: &str, data: &Value, limits: &TemplateLimits) -> Result<String> {
    Template::compile(template, limits)?.render_with_limits(data, limits)
}
