//! Document content model.
//!
//! This module handles:
//! - The document tree ([`Node`]) and its inline [`Mark`]s
//! - [`ContentSnapshot`], content held either as markup or as a tree
//! - Parsing and serializing the markup (HTML subset) form
//! - Importing Markdown with comrak

mod content;
pub mod markdown;
pub mod markup;
mod types;

pub use content::ContentSnapshot;
pub use types::{Attrs, Mark, Node, NodeType};

pub(crate) use types::normalize_inlines;

use thiserror::Error;

/// Errors raised while turning external content into a document tree.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid document tree: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed markup: {0}")]
    Markup(#[from] quick_xml::Error),

    #[error("unsupported content: {0}")]
    Unsupported(String),
}
