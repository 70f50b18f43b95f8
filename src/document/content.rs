//! Content snapshots.

use serde::{Deserialize, Serialize};

use super::{DocumentError, Node, markdown, markup};

/// Document content in one of its two interchangeable forms.
///
/// The stored variant is the *original* form; [`ContentSnapshot::to_tree`]
/// always yields the structured form. As JSON, a string maps to `Markup` and
/// an object maps to `Tree`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentSnapshot {
    /// Serialized markup (HTML subset)
    Markup(String),
    /// Structured document tree
    Tree(Node),
}

impl Default for ContentSnapshot {
    fn default() -> Self {
        Self::Markup(String::new())
    }
}

impl ContentSnapshot {
    /// Content of an empty document.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Import Markdown as a tree snapshot.
    pub fn from_markdown(source: &str) -> Self {
        Self::Tree(markdown::parse(source))
    }

    /// Parse a JSON value: a string is markup, an object is a tree.
    ///
    /// # Errors
    /// Returns an error if the JSON is neither a string nor a node object.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// True only for empty markup. A tree always counts as content, even when
    /// it holds an empty document.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Markup(markup) => markup.is_empty(),
            Self::Tree(_) => false,
        }
    }

    pub const fn is_tree(&self) -> bool {
        matches!(self, Self::Tree(_))
    }

    pub fn as_markup(&self) -> Option<&str> {
        match self {
            Self::Markup(markup) => Some(markup),
            Self::Tree(_) => None,
        }
    }

    pub const fn as_tree(&self) -> Option<&Node> {
        match self {
            Self::Markup(_) => None,
            Self::Tree(node) => Some(node),
        }
    }

    /// The structured form, in canonical shape.
    ///
    /// # Errors
    /// Returns an error if markup is malformed or the tree is not a valid
    /// document.
    pub fn to_tree(&self) -> Result<Node, DocumentError> {
        match self {
            Self::Markup(source) => markup::parse(source),
            Self::Tree(node) => {
                node.validate()?;
                let mut node = node.clone();
                node.normalize();
                Ok(node)
            }
        }
    }

    /// The markup form: the original string, or the serialized tree.
    ///
    /// # Errors
    /// Returns an error if the tree is not a valid document.
    pub fn to_markup(&self) -> Result<String, DocumentError> {
        match self {
            Self::Markup(source) => Ok(source.clone()),
            Self::Tree(_) => Ok(markup::serialize(&self.to_tree()?)),
        }
    }

    /// Plain text of the content.
    ///
    /// # Errors
    /// Same as [`ContentSnapshot::to_tree`].
    pub fn plain_text(&self) -> Result<String, DocumentError> {
        Ok(self.to_tree()?.plain_text())
    }
}

impl From<&str> for ContentSnapshot {
    fn from(markup: &str) -> Self {
        Self::Markup(markup.to_string())
    }
}

impl From<String> for ContentSnapshot {
    fn from(markup: String) -> Self {
        Self::Markup(markup)
    }
}

impl From<Node> for ContentSnapshot {
    fn from(node: Node) -> Self {
        Self::Tree(node)
    }
}
