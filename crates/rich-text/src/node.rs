use serde_json::{Map, Value};
use thiserror::Error;

pub const TEXT_NODE: &str = "text";
pub const MENTION_NODE: &str = "mention";

const BLOCK_NODES: &[&str] = &[
    "paragraph",
    "heading",
    "blockquote",
    "codeBlock",
    "listItem",
    "taskItem",
];
const HARD_BREAK_NODE: &str = "hardBreak";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected an object node at {path}")]
    NotAnObject { path: String },
    #[error("node at {path} has no type")]
    MissingType { path: String },
    #[error("node at {path} has content that is not an array")]
    InvalidContent { path: String },
}

/// One node of an editor document.
///
/// Only `Mention` nodes reference members. Text that merely looks like
/// `@someone` stays a `Text` node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Mention {
        id: Option<String>,
        label: Option<String>,
    },
    Element {
        kind: String,
        children: Vec<Node>,
    },
}

pub trait Visitor {
    fn text(&mut self, _text: &str) {}
    fn mention(&mut self, _id: Option<&str>, _label: Option<&str>) {}
    fn enter(&mut self, _kind: &str) {}
    fn leave(&mut self, _kind: &str) {}
}

impl Node {
    pub fn walk<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            Node::Text(text) => visitor.text(text),
            Node::Mention { id, label } => visitor.mention(id.as_deref(), label.as_deref()),
            Node::Element { kind, children } => {
                visitor.enter(kind);
                for child in children {
                    child.walk(visitor);
                }
                visitor.leave(kind);
            }
        }
    }

    fn from_value(value: &Value, path: &str) -> Result<Self, ParseError> {
        let object = value.as_object().ok_or_else(|| ParseError::NotAnObject {
            path: path.to_string(),
        })?;
        let kind = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ParseError::MissingType {
                path: path.to_string(),
            })?;

        match kind {
            TEXT_NODE => Ok(Node::Text(
                object
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            )),
            MENTION_NODE => Ok(Self::mention_from_attrs(object)),
            _ => {
                let children = match object.get("content") {
                    None | Some(Value::Null) => Vec::new(),
                    Some(Value::Array(items)) => items
                        .iter()
                        .enumerate()
                        .map(|(index, item)| {
                            Node::from_value(item, &format!("{path}.content[{index}]"))
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                    Some(_) => {
                        return Err(ParseError::InvalidContent {
                            path: path.to_string(),
                        });
                    }
                };
                Ok(Node::Element {
                    kind: kind.to_string(),
                    children,
                })
            }
        }
    }

    fn mention_from_attrs(object: &Map<String, Value>) -> Self {
        let attrs = object.get("attrs").and_then(Value::as_object);
        let attr = |name: &str| {
            attrs
                .and_then(|attrs| attrs.get(name))
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        Node::Mention {
            id: attr("id"),
            label: attr("label"),
        }
    }
}

/// A parsed rich-text body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Node,
}

impl Document {
    pub fn parse(body: &str) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_str(body)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, ParseError> {
        Ok(Self {
            root: Node::from_value(value, "$")?,
        })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn walk<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        self.root.walk(visitor);
    }

    /// Renders the document as plain text, mentions as `@label`.
    pub fn plain_text(&self) -> String {
        let mut renderer = PlainText::default();
        self.walk(&mut renderer);
        renderer.finish()
    }
}

#[derive(Default)]
struct PlainText {
    out: String,
}

impl PlainText {
    fn finish(self) -> String {
        self.out.trim_end().to_string()
    }
}

impl Visitor for PlainText {
    fn text(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn mention(&mut self, id: Option<&str>, label: Option<&str>) {
        if let Some(shown) = label.or(id) {
            self.out.push('@');
            self.out.push_str(shown);
        }
    }

    fn enter(&mut self, kind: &str) {
        if kind == HARD_BREAK_NODE {
            self.out.push('\n');
        }
    }

    fn leave(&mut self, kind: &str) {
        if BLOCK_NODES.contains(&kind) {
            self.out.push('\n');
        }
    }
}
