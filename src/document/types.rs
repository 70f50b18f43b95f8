//! Core document types.
//!
//! The tree follows the JSON content model used by web rich-text editors:
//! every node has a `type`, optional `attrs`, child `content`, and text
//! leaves carry `text` plus their `marks`.

use serde::{Deserialize, Serialize};

use super::DocumentError;

/// Kind of a document node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    Doc,
    Paragraph,
    Heading,
    Text,
    BulletList,
    OrderedList,
    ListItem,
    Blockquote,
    CodeBlock,
    HorizontalRule,
    HardBreak,
}

impl NodeType {
    /// Blocks that hold inline content directly.
    pub const fn is_textblock(self) -> bool {
        matches!(self, Self::Paragraph | Self::Heading | Self::CodeBlock)
    }

    pub const fn is_inline(self) -> bool {
        matches!(self, Self::Text | Self::HardBreak)
    }

    pub const fn is_list(self) -> bool {
        matches!(self, Self::BulletList | Self::OrderedList)
    }

    /// Nodes whose children are blocks.
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Doc | Self::ListItem | Self::Blockquote)
    }

    /// Nodes allowed as children of a container.
    pub const fn is_block(self) -> bool {
        self.is_textblock()
            || self.is_list()
            || matches!(self, Self::Blockquote | Self::HorizontalRule)
    }

    /// Name used in the JSON tree.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Doc => "doc",
            Self::Paragraph => "paragraph",
            Self::Heading => "heading",
            Self::Text => "text",
            Self::BulletList => "bulletList",
            Self::OrderedList => "orderedList",
            Self::ListItem => "listItem",
            Self::Blockquote => "blockquote",
            Self::CodeBlock => "codeBlock",
            Self::HorizontalRule => "horizontalRule",
            Self::HardBreak => "hardBreak",
        }
    }
}

/// Inline formatting attribute applied to a text range.
///
/// Variant order is the nesting order used when serializing markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mark {
    Bold,
    Italic,
    Strike,
    Underline,
    Code,
}

impl Mark {
    pub const ALL: [Self; 5] = [
        Self::Bold,
        Self::Italic,
        Self::Strike,
        Self::Underline,
        Self::Code,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Strike => "strike",
            Self::Underline => "underline",
            Self::Code => "code",
        }
    }
}

/// Node attributes. Only the attributes the built-in node types use are kept;
/// unknown keys in incoming JSON are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attrs {
    /// Heading level (1..=6)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    /// First number of an ordered list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    /// Code block language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Attrs {
    pub const fn is_empty(&self) -> bool {
        self.level.is_none() && self.start.is_none() && self.language.is_none()
    }
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: NodeType,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<Mark>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Node {
    /// Create a node with no attributes, content or text.
    pub fn new(kind: NodeType) -> Self {
        Self {
            kind,
            attrs: Attrs::default(),
            content: Vec::new(),
            marks: Vec::new(),
            text: None,
        }
    }

    fn with_content(kind: NodeType, content: Vec<Self>) -> Self {
        Self {
            content,
            ..Self::new(kind)
        }
    }

    pub fn doc(content: Vec<Self>) -> Self {
        Self::with_content(NodeType::Doc, content)
    }

    /// The empty document: a single empty paragraph.
    pub fn empty_doc() -> Self {
        Self::doc(vec![Self::paragraph(Vec::new())])
    }

    pub fn paragraph(content: Vec<Self>) -> Self {
        Self::with_content(NodeType::Paragraph, content)
    }

    pub fn heading(level: u8, content: Vec<Self>) -> Self {
        let mut node = Self::with_content(NodeType::Heading, content);
        node.attrs.level = Some(level);
        node
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(NodeType::Text)
        }
    }

    pub fn marked_text(text: impl Into<String>, marks: &[Mark]) -> Self {
        let mut node = Self::text(text);
        node.marks = marks.to_vec();
        node.marks.sort_unstable();
        node.marks.dedup();
        node
    }

    pub fn bullet_list(items: Vec<Self>) -> Self {
        Self::with_content(NodeType::BulletList, items)
    }

    pub fn ordered_list(items: Vec<Self>) -> Self {
        Self::with_content(NodeType::OrderedList, items)
    }

    pub fn list_item(content: Vec<Self>) -> Self {
        Self::with_content(NodeType::ListItem, content)
    }

    pub fn blockquote(content: Vec<Self>) -> Self {
        Self::with_content(NodeType::Blockquote, content)
    }

    pub fn code_block(language: Option<String>, code: &str) -> Self {
        let mut node = Self::new(NodeType::CodeBlock);
        node.attrs.language = language;
        if !code.is_empty() {
            node.content.push(Self::text(code));
        }
        node
    }

    pub fn horizontal_rule() -> Self {
        Self::new(NodeType::HorizontalRule)
    }

    pub fn hard_break() -> Self {
        Self::new(NodeType::HardBreak)
    }

    /// Heading level, defaulting to 1 for headings without one.
    pub fn level(&self) -> Option<u8> {
        (self.kind == NodeType::Heading).then(|| self.attrs.level.unwrap_or(1))
    }

    pub fn has_mark(&self, mark: Mark) -> bool {
        self.marks.contains(&mark)
    }

    /// Number of inline units in this node: characters for text, one for a
    /// hard break, and the sum of the children otherwise.
    pub fn inline_len(&self) -> usize {
        match self.kind {
            NodeType::Text => self.text.as_deref().map_or(0, |t| t.chars().count()),
            NodeType::HardBreak => 1,
            _ => self.content.iter().map(Self::inline_len).sum(),
        }
    }

    /// Get the node at a child-index path.
    pub fn node_at(&self, path: &[usize]) -> Option<&Self> {
        path.iter()
            .try_fold(self, |node, &index| node.content.get(index))
    }

    /// Get the node at a child-index path mutably.
    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut Self> {
        path.iter()
            .try_fold(self, |node, &index| node.content.get_mut(index))
    }

    /// Paths of every textblock in document order.
    pub fn textblock_paths(&self) -> Vec<Vec<usize>> {
        let mut paths = Vec::new();
        let mut prefix = Vec::new();
        collect_textblock_paths(self, &mut prefix, &mut paths);
        paths
    }

    /// Plain text of the node. Blocks are separated by a blank line and hard
    /// breaks become newlines.
    pub fn plain_text(&self) -> String {
        if self.kind.is_inline() {
            return inline_text(self);
        }
        if self.kind.is_textblock() {
            return self.content.iter().map(inline_text).collect();
        }
        self.textblock_paths()
            .iter()
            .filter_map(|path| self.node_at(path))
            .map(Self::plain_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Bring the tree into canonical form.
    ///
    /// Adjacent text nodes with equal marks are merged, empty text nodes are
    /// dropped, marks are sorted, empty lists disappear and empty containers
    /// regain an empty paragraph. A list item always opens with a textblock.
    pub fn normalize(&mut self) {
        if self.kind.is_textblock() {
            normalize_inlines(&mut self.content);
            return;
        }
        for child in &mut self.content {
            child.normalize();
        }
        if self.kind.is_container() {
            self.content
                .retain(|child| !(child.kind.is_list() && child.content.is_empty()));
            let opens_with_text = self.content.first().is_some_and(|c| c.kind.is_textblock());
            if self.content.is_empty() || (self.kind == NodeType::ListItem && !opens_with_text) {
                self.content.insert(0, Self::paragraph(Vec::new()));
            }
        }
    }

    /// Check that the tree is a well-formed document.
    ///
    /// # Errors
    /// Returns [`DocumentError::Unsupported`] describing the first violation.
    pub fn validate(&self) -> Result<(), DocumentError> {
        if self.kind != NodeType::Doc {
            return Err(DocumentError::Unsupported(format!(
                "root node must be doc, got {}",
                self.kind.name()
            )));
        }
        validate_children(self)
    }
}

fn collect_textblock_paths(node: &Node, prefix: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
    for (index, child) in node.content.iter().enumerate() {
        prefix.push(index);
        if child.kind.is_textblock() {
            out.push(prefix.clone());
        } else if !child.kind.is_inline() {
            collect_textblock_paths(child, prefix, out);
        }
        prefix.pop();
    }
}

fn inline_text(node: &Node) -> String {
    match node.kind {
        NodeType::HardBreak => "\n".to_string(),
        _ => node.text.clone().unwrap_or_default(),
    }
}

pub(crate) fn normalize_inlines(inlines: &mut Vec<Node>) {
    let mut merged: Vec<Node> = Vec::with_capacity(inlines.len());
    for mut node in inlines.drain(..) {
        if node.kind == NodeType::Text {
            if node.text.as_deref().is_none_or(str::is_empty) {
                continue;
            }
            node.marks.sort_unstable();
            node.marks.dedup();
            if let Some(last) = merged.last_mut()
                && last.kind == NodeType::Text
                && last.marks == node.marks
            {
                let tail = node.text.unwrap_or_default();
                last.text.get_or_insert_with(String::new).push_str(&tail);
                continue;
            }
        }
        merged.push(node);
    }
    *inlines = merged;
}

fn validate_children(node: &Node) -> Result<(), DocumentError> {
    for child in &node.content {
        let allowed = match node.kind {
            NodeType::Doc | NodeType::ListItem | NodeType::Blockquote => child.kind.is_block(),
            NodeType::BulletList | NodeType::OrderedList => child.kind == NodeType::ListItem,
            NodeType::Paragraph | NodeType::Heading => child.kind.is_inline(),
            NodeType::CodeBlock => child.kind == NodeType::Text && child.marks.is_empty(),
            NodeType::Text | NodeType::HardBreak | NodeType::HorizontalRule => false,
        };
        if !allowed {
            return Err(DocumentError::Unsupported(format!(
                "{} cannot contain {}",
                node.kind.name(),
                child.kind.name()
            )));
        }
        validate_node(child)?;
    }
    Ok(())
}

fn validate_node(node: &Node) -> Result<(), DocumentError> {
    match node.kind {
        NodeType::Text => {
            if node.text.as_deref().is_none_or(str::is_empty) {
                return Err(DocumentError::Unsupported(
                    "text nodes must not be empty".to_string(),
                ));
            }
        }
        NodeType::ListItem => {
            if let Some(first) = node.content.first()
                && !first.kind.is_textblock()
            {
                return Err(DocumentError::Unsupported(format!(
                    "listItem must start with a textblock, got {}",
                    first.kind.name()
                )));
            }
        }
        NodeType::Heading => {
            if let Some(level) = node.attrs.level
                && !(1..=6).contains(&level)
            {
                return Err(DocumentError::Unsupported(format!(
                    "heading level {level} out of range"
                )));
            }
        }
        _ => {}
    }
    validate_children(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_json_tree() {
        let json = r#"{
            "type": "doc",
            "content": [
                {"type": "heading", "attrs": {"level": 2}, "content": [{"type": "text", "text": "Title"}]},
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "bold", "marks": [{"type": "bold"}]},
                    {"type": "hardBreak"},
                    {"type": "text", "text": "plain"}
                ]}
            ]
        }"#;
        let doc: Node = serde_json::from_str(json).unwrap();
        assert_eq!(doc.kind, NodeType::Doc);
        assert_eq!(doc.content[0].level(), Some(2));
        assert!(doc.content[1].content[0].has_mark(Mark::Bold));
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_serialize_skips_empty_fields() {
        let doc = Node::doc(vec![Node::paragraph(vec![Node::marked_text(
            "x",
            &[Mark::Italic],
        )])]);
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(
            json,
            r#"{"type":"doc","content":[{"type":"paragraph","content":[{"type":"text","marks":[{"type":"italic"}],"text":"x"}]}]}"#
        );
    }

    #[test]
    fn test_unknown_node_type_fails_to_deserialize() {
        let json = r#"{"type":"doc","content":[{"type":"table"}]}"#;
        assert!(serde_json::from_str::<Node>(json).is_err());
    }

    #[test]
    fn test_validate_rejects_non_doc_root() {
        let err = Node::paragraph(Vec::new()).validate().unwrap_err();
        assert!(err.to_string().contains("root node must be doc"));
    }

    #[test]
    fn test_validate_rejects_inline_at_block_level() {
        let doc = Node::doc(vec![Node::text("loose")]);
        assert!(doc.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_heading_level() {
        let doc = Node::doc(vec![Node::heading(9, vec![Node::text("x")])]);
        assert!(doc.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_list_item_opening_with_list() {
        let doc = Node::doc(vec![Node::bullet_list(vec![Node::list_item(vec![
            Node::bullet_list(vec![Node::list_item(vec![Node::paragraph(vec![
                Node::text("a"),
            ])])]),
        ])])]);
        let err = doc.validate().unwrap_err();
        assert!(err.to_string().contains("listItem must start with a textblock"));
    }

    #[test]
    fn test_normalize_opens_list_item_with_paragraph() {
        let inner = Node::bullet_list(vec![Node::list_item(vec![Node::paragraph(vec![
            Node::text("a"),
        ])])]);
        let mut doc = Node::doc(vec![Node::bullet_list(vec![Node::list_item(vec![
            inner.clone(),
        ])])]);
        doc.normalize();
        assert_eq!(
            doc.content[0].content[0].content,
            vec![Node::paragraph(Vec::new()), inner]
        );
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_plain_text_separates_blocks() {
        let doc = Node::doc(vec![
            Node::heading(1, vec![Node::text("Hello")]),
            Node::bullet_list(vec![
                Node::list_item(vec![Node::paragraph(vec![Node::text("one")])]),
                Node::list_item(vec![Node::paragraph(vec![
                    Node::text("two"),
                    Node::hard_break(),
                    Node::text("lines"),
                ])]),
            ]),
        ]);
        assert_eq!(doc.plain_text(), "Hello\n\none\n\ntwo\nlines");
    }

    #[test]
    fn test_normalize_merges_equal_marks() {
        let mut doc = Node::doc(vec![Node::paragraph(vec![
            Node::marked_text("a", &[Mark::Bold]),
            Node::marked_text("b", &[Mark::Bold]),
            Node::text(""),
            Node::text("c"),
        ])]);
        doc.normalize();
        let para = &doc.content[0];
        assert_eq!(para.content.len(), 2);
        assert_eq!(para.content[0].text.as_deref(), Some("ab"));
    }

    #[test]
    fn test_normalize_fills_empty_containers() {
        let mut doc = Node::doc(vec![Node::bullet_list(Vec::new())]);
        doc.normalize();
        assert_eq!(doc, Node::empty_doc());
    }

    #[test]
    fn test_textblock_paths_follow_document_order() {
        let doc = Node::doc(vec![
            Node::paragraph(Vec::new()),
            Node::blockquote(vec![Node::paragraph(Vec::new()), Node::horizontal_rule()]),
            Node::ordered_list(vec![Node::list_item(vec![Node::paragraph(Vec::new())])]),
        ]);
        assert_eq!(
            doc.textblock_paths(),
            vec![vec![0], vec![1, 0], vec![2, 0, 0]]
        );
    }
}
