//! Tree evaluation against scoped JSON data.

use crate::error::{Result, TemplateError};
use crate::parse::Node;
use gearshift_common_config::LimitsConfig;
use serde_json::Value;
use std::borrow::Cow;

/// Resource ceilings for compile and render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateLimits {
    /// Deepest allowed `#if`/`#each` nesting.
    pub max_depth: usize,
    /// Largest allowed rendered output, in bytes.
    pub max_output_bytes: usize,
}

impl Default for TemplateLimits {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_output_bytes: 10 * 1024 * 1024,
        }
    }
}

impl From<&LimitsConfig> for TemplateLimits {
    fn from(config: &LimitsConfig) -> Self {
        Self {
            max_depth: config.max_template_depth,
            max_output_bytes: config.max_template_output_bytes,
        }
    }
}

/// Falsy: missing, `null`, `false`, numeric zero, `""`.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Textual form of a resolved value.
pub(crate) fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

/// One level of lookup scope.
#[derive(Clone, Copy)]
enum Scope<'a> {
    Data(&'a Value),
    /// Loop iteration. Record fields come first, then `index` and `this`.
    Item { item: &'a Value, index: usize },
}

impl<'a> Scope<'a> {
    fn get(&self, key: &str) -> Option<Cow<'a, Value>> {
        match *self {
            Scope::Data(data) => data.get(key).map(Cow::Borrowed),
            Scope::Item { item, index } => {
                if let Some(field) = item.as_object().and_then(|fields| fields.get(key)) {
                    return Some(Cow::Borrowed(field));
                }
                match key {
                    "index" => Some(Cow::Owned(Value::from(index))),
                    "this" => Some(Cow::Borrowed(item)),
                    _ => None,
                }
            }
        }
    }
}

/// Walk `path` segments below `value`; numeric segments index arrays.
fn descend<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => current.get(segment),
    })
}

/// Scope chain lookup, innermost first.
pub(crate) struct Lookup<'a> {
    scopes: Vec<Scope<'a>>,
}

impl<'a> Lookup<'a> {
    pub(crate) fn new(data: &'a Value) -> Self {
        Self {
            scopes: vec![Scope::Data(data)],
        }
    }

    pub(crate) fn resolve(&self, name: &str) -> Option<Cow<'a, Value>> {
        for scope in self.scopes.iter().rev() {
            if let Some(found) = scope.get(name) {
                return Some(found);
            }
            if let Some((head, rest)) = name.split_once('.') {
                if let Some(found) = scope.get(head) {
                    return match found {
                        Cow::Borrowed(v) => descend(v, rest).map(Cow::Borrowed),
                        Cow::Owned(_) => None,
                    };
                }
            }
        }
        None
    }
}

/// Evaluates a node tree into an output buffer.
pub(crate) struct Renderer<'a> {
    lookup: Lookup<'a>,
    limits: TemplateLimits,
    out: String,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(data: &'a Value, limits: &TemplateLimits) -> Self {
        Self {
            lookup: Lookup::new(data),
            limits: *limits,
            out: String::new(),
        }
    }

    pub(crate) fn render(mut self, nodes: &[Node]) -> Result<String> {
        self.render_nodes(nodes)?;
        Ok(self.out)
    }

    fn emit(&mut self, text: &str) -> Result<()> {
        if self.out.len() + text.len() > self.limits.max_output_bytes {
            return Err(TemplateError::OutputTooLarge {
                limit: self.limits.max_output_bytes,
            });
        }
        self.out.push_str(text);
        Ok(())
    }

    fn render_nodes(&mut self, nodes: &[Node]) -> Result<()> {
        for node in nodes {
            match node {
                Node::Text(text) => self.emit(text)?,
                Node::Var { name, raw } => match self.lookup.resolve(name) {
                    Some(value) => {
                        let text = stringify(&value);
                        self.emit(&text)?;
                    }
                    None => self.emit(raw)?,
                },
                Node::If { key, then, otherwise } => {
                    let value = self.lookup.resolve(key);
                    if is_truthy(value.as_deref()) {
                        self.render_nodes(then)?;
                    } else {
                        self.render_nodes(otherwise)?;
                    }
                }
                Node::Each { key, body } => {
                    let items = match self.lookup.resolve(key) {
                        Some(Cow::Borrowed(Value::Array(items))) => items,
                        _ => continue,
                    };
                    for (index, item) in items.iter().enumerate() {
                        self.lookup.scopes.push(Scope::Item { item, index });
                        let rendered = self.render_nodes(body);
                        self.lookup.scopes.pop();
                        rendered?;
                    }
                }
            }
        }
        Ok(())
    }
}
