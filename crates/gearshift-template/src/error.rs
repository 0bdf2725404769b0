use gearshift_common_fs::FsError;
use thiserror::Error;

/// Template failures.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// No template registered under `name`.
    #[error("template source missing: {name}")]
    NotFound { name: String },

    /// `{{#if}}` or `{{#each}}` without its close tag.
    #[error("unterminated {{{{#{kind} {key}}}}} block")]
    UnterminatedBlock { kind: &'static str, key: String },

    /// Close tag with no matching open tag.
    #[error("unexpected {tag} without matching open tag")]
    UnexpectedClose { tag: String },

    /// Blocks nested deeper than the configured limit.
    #[error("template nesting exceeds depth limit of {limit}")]
    DepthExceeded { limit: usize },

    /// Rendered output grew past the configured limit.
    #[error("rendered output exceeds {limit} bytes")]
    OutputTooLarge { limit: usize },

    #[error("failed to load template: {0}")]
    Io(#[from] FsError),
}

pub type Result<T> = std::result::Result<T, TemplateError>;
