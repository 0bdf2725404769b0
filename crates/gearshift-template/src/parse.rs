//! Single-pass, stack-based construction of the template tree.

use crate::error::{Result, TemplateError};
use crate::render::{Renderer, TemplateLimits};
use crate::token::{tokenize, Token};
use serde_json::Value;

/// Template tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Var { name: String, raw: String },
    If { key: String, then: Vec<Node>, otherwise: Vec<Node> },
    Each { key: String, body: Vec<Node> },
}

/// An open block awaiting its close tag.
enum Frame {
    If {
        key: String,
        /// Set once `{{else}}` is seen.
        then: Option<Vec<Node>>,
        nodes: Vec<Node>,
    },
    Each {
        key: String,
        nodes: Vec<Node>,
    },
}

impl Frame {
    fn nodes_mut(&mut self) -> &mut Vec<Node> {
        match self {
            Frame::If { nodes, .. } | Frame::Each { nodes, .. } => nodes,
        }
    }
}

fn push_text(target: &mut Vec<Node>, text: &str) {
    if let Some(Node::Text(prev)) = target.last_mut() {
        prev.push_str(text);
    } else {
        target.push(Node::Text(text.to_string()));
    }
}

/// A compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Tokenize and parse `source`.
    pub fn compile(source: &str, limits: &TemplateLimits) -> Result<Self> {
        let mut root: Vec<Node> = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();

        for token in tokenize(source) {
            match token {
                Token::Text(text) => {
                    let target = stack.last_mut().map_or(&mut root, Frame::nodes_mut);
                    push_text(target, text);
                }
                Token::Var { name, raw } => {
                    let target = stack.last_mut().map_or(&mut root, Frame::nodes_mut);
                    target.push(Node::Var {
                        name: name.to_string(),
                        raw: raw.to_string(),
                    });
                }
                Token::IfOpen(key) | Token::EachOpen(key) => {
                    if stack.len() >= limits.max_depth {
                        return Err(TemplateError::DepthExceeded {
                            limit: limits.max_depth,
                        });
                    }
                    let key = key.to_string();
                    stack.push(if matches!(token, Token::IfOpen(_)) {
                        Frame::If {
                            key,
                            then: None,
                            nodes: Vec::new(),
                        }
                    } else {
                        Frame::Each {
                            key,
                            nodes: Vec::new(),
                        }
                    });
                }
                Token::Else(raw) => match stack.last_mut() {
                    Some(Frame::If { then, nodes, .. }) if then.is_none() => {
                        *then = Some(std::mem::take(nodes));
                    }
                    Some(frame) => push_text(frame.nodes_mut(), raw),
                    None => push_text(&mut root, raw),
                },
                Token::IfClose => {
                    let node = match stack.pop() {
                        Some(Frame::If { key, then, nodes }) => match then {
                            Some(then) => Node::If {
                                key,
                                then,
                                otherwise: nodes,
                            },
                            None => Node::If {
                                key,
                                then: nodes,
                                otherwise: Vec::new(),
                            },
                        },
                        _ => {
                            return Err(TemplateError::UnexpectedClose {
                                tag: "{{/if}}".to_string(),
                            })
                        }
                    };
                    stack.last_mut().map_or(&mut root, Frame::nodes_mut).push(node);
                }
                Token::EachClose => {
                    let node = match stack.pop() {
                        Some(Frame::Each { key, nodes }) => Node::Each { key, body: nodes },
                        _ => {
                            return Err(TemplateError::UnexpectedClose {
                                tag: "{{/each}}".to_string(),
                            })
                        }
                    };
                    stack.last_mut().map_or(&mut root, Frame::nodes_mut).push(node);
                }
            }
        }

        match stack.pop() {
            Some(Frame::If { key, .. }) => Err(TemplateError::UnterminatedBlock { kind: "if", key }),
            Some(Frame::Each { key, .. }) => {
                Err(TemplateError::UnterminatedBlock { kind: "each", key })
            }
            None => Ok(Self { nodes: root }),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Render with default limits.
    pub fn render(&self, data: &Value) -> Result<String> {
        self.render_with_limits(data, &TemplateLimits::default())
    }

    pub fn render_with_limits(&self, data: &Value, limits: &TemplateLimits) -> Result<String> {
        Renderer::new(data, limits).render(&self.nodes)
    }
}
