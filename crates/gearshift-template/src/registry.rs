//! Named template storage.

use crate::builtin;
use crate::error::{Result, TemplateError};
use crate::parse::Template;
use crate::render::TemplateLimits;
use gearshift_common_fs::{self as fs, path, FsError};
use gearshift_common_log::spans::render_span;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, instrument};

const TEMPLATE_EXTENSIONS: [&str; 3] = ["md", "hbs", "tmpl"];

/// Registry of compiled templates keyed by name.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, Template>,
    limits: TemplateLimits,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRegistry {
    /// Registry holding the built-in artifact templates.
    pub fn new() -> Self {
        Self::with_limits(TemplateLimits::default())
    }

    /// Built-ins compiled under `limits`.
    pub fn with_limits(limits: TemplateLimits) -> Self {
        let mut registry = Self::empty(limits);
        for (name, source) in builtin::all() {
            // fails only when max_depth is below the built-ins' own nesting
            if let Err(e) = registry.register(name, source) {
                tracing::warn!(template = name, error = %e, "built-in template rejected");
            }
        }
        registry
    }

    /// Registry with no templates.
    pub fn empty(limits: TemplateLimits) -> Self {
        Self {
            templates: BTreeMap::new(),
            limits,
        }
    }

    pub fn limits(&self) -> &TemplateLimits {
        &self.limits
    }

    /// Compile and store `source` under `name`, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, source: &str) -> Result<()> {
        let template = Template::compile(source, &self.limits)?;
        self.templates.insert(name.into(), template);
        Ok(())
    }

    /// Look up a template.
    pub fn get(&self, name: &str) -> Result<&Template> {
        self.templates
            .get(name)
            .ok_or_else(|| TemplateError::NotFound {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    /// Render the template registered as `name`.
    pub fn render(&self, name: &str, data: &Value) -> Result<String> {
        let _span = render_span(name).entered();
        let output = self.get(name)?.render_with_limits(data, &self.limits)?;
        debug!(bytes = output.len(), "template rendered");
        Ok(output)
    }

    /// Register every `*.md`, `*.hbs` and `*.tmpl` file in `dir` by file stem.
    ///
    /// Files override built-ins of the same name. Returns the number loaded.
    #[instrument(skip(self, dir), fields(dir = %dir.as_ref().display()))]
    pub async fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| FsError::from_io("read directory", dir, e))?;

        let mut loaded = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| FsError::from_io("read directory", dir, e))?
        {
            let file = entry.path();
            let wanted = fs::extension(&file)
                .is_some_and(|ext| TEMPLATE_EXTENSIONS.contains(&ext.as_str()));
            let Some(name) = path::stem(&file).filter(|_| wanted) else {
                continue;
            };

            let source =
                fs::nonblocking::read_to_string(&file, self.limits.max_output_bytes as u64).await?;
            self.register(name, &source)?;
            loaded += 1;
        }

        debug!(loaded, "templates loaded from directory");
        Ok(loaded)
    }
}
