//! Markup (HTML subset) parsing and serialization.
//!
//! Recognized elements map onto document nodes and marks; any other element
//! is transparent and only contributes its children. The reader runs in a
//! lenient mode so void elements (`<hr>`, `<br>`) and unmatched end tags are
//! accepted the way browsers accept them.

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};

use super::{DocumentError, Mark, Node, NodeType, normalize_inlines};

/// Parse markup into a document tree.
///
/// An empty string yields the empty document.
///
/// # Example
///
/// ```
/// use fancy_editor::document::markup;
///
/// let doc = markup::parse("<h1>Hello</h1><p>World</p>").unwrap();
/// assert_eq!(doc.plain_text(), "Hello\n\nWorld");
/// ```
///
/// # Errors
/// Returns [`DocumentError::Markup`] if the reader cannot tokenize the input.
pub fn parse(source: &str) -> Result<Node, DocumentError> {
    let mut reader = Reader::from_str(source);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.expand_empty_elements = false;

    let mut builder = TreeBuilder::new();
    loop {
        match reader.read_event()? {
            Event::Start(tag) => builder.open(&tag),
            Event::Empty(tag) => {
                builder.open(&tag);
                builder.close(&tag_name(tag.name().as_ref()));
            }
            Event::End(tag) => builder.close(&tag_name(tag.name().as_ref())),
            Event::Text(text) => {
                let decoded = text.unescape_with(resolve_entity).map_or_else(
                    |_| String::from_utf8_lossy(&text[..]).into_owned(),
                    std::borrow::Cow::into_owned,
                );
                builder.text(&decoded);
            }
            Event::CData(data) => builder.text(&String::from_utf8_lossy(&data[..])),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(builder.finish())
}

/// Serialize a document tree to markup.
pub fn serialize(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

/// The XML entities first, then the HTML ones editors commonly emit.
fn resolve_entity(entity: &str) -> Option<&'static str> {
    resolve_predefined_entity(entity).or_else(|| resolve_html_entity(entity))
}

fn resolve_html_entity(entity: &str) -> Option<&'static str> {
    match entity {
        "nbsp" => Some("\u{a0}"),
        "mdash" => Some("\u{2014}"),
        "ndash" => Some("\u{2013}"),
        "hellip" => Some("\u{2026}"),
        "lsquo" => Some("\u{2018}"),
        "rsquo" => Some("\u{2019}"),
        "ldquo" => Some("\u{201c}"),
        "rdquo" => Some("\u{201d}"),
        "copy" => Some("\u{a9}"),
        _ => None,
    }
}

fn attribute(tag: &BytesStart<'_>, key: &str) -> Option<String> {
    tag.html_attributes()
        .flatten()
        .find(|attr| attr.key.as_ref().eq_ignore_ascii_case(key.as_bytes()))
        .and_then(|attr| attr.unescape_value().ok().map(std::borrow::Cow::into_owned))
}

/// An element that is still open while parsing.
#[derive(Debug)]
enum Open {
    Block {
        tag: String,
        node: Node,
    },
    Mark {
        tag: String,
        mark: Mark,
    },
    Transparent {
        tag: String,
    },
}

impl Open {
    fn tag(&self) -> &str {
        match self {
            Self::Block { tag, .. } | Self::Mark { tag, .. } | Self::Transparent { tag } => tag,
        }
    }
}

/// Builds a tree from a stream of open/close/text events.
///
/// The bottom of the stack is always the document itself. Implicit blocks
/// (paragraphs around stray text, list items around stray paragraphs) use an
/// empty tag so no end tag can close them directly.
struct TreeBuilder {
    stack: Vec<Open>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Open::Block {
                tag: String::new(),
                node: Node::doc(Vec::new()),
            }],
        }
    }

    fn nearest_block(&self) -> (usize, NodeType) {
        self.stack
            .iter()
            .enumerate()
            .rev()
            .find_map(|(index, open)| match open {
                Open::Block { node, .. } => Some((index, node.kind)),
                _ => None,
            })
            .unwrap_or((0, NodeType::Doc))
    }

    fn nearest_block_mut(&mut self) -> Option<&mut Node> {
        self.stack.iter_mut().rev().find_map(|open| match open {
            Open::Block { node, .. } => Some(node),
            _ => None,
        })
    }

    fn active_marks(&self) -> Vec<Mark> {
        self.stack
            .iter()
            .filter_map(|open| match open {
                Open::Mark { mark, .. } => Some(*mark),
                _ => None,
            })
            .collect()
    }

    fn open(&mut self, tag: &BytesStart<'_>) {
        let name = tag_name(tag.name().as_ref());
        match name.as_str() {
            "p" => self.open_block(name.clone(), Node::paragraph(Vec::new())),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse().unwrap_or(1);
                self.open_block(name.clone(), Node::heading(level, Vec::new()));
            }
            "ul" => self.open_block(name.clone(), Node::bullet_list(Vec::new())),
            "ol" => {
                let mut list = Node::ordered_list(Vec::new());
                list.attrs.start = attribute(tag, "start")
                    .and_then(|start| start.trim().parse().ok())
                    .filter(|&start| start != 1);
                self.open_block(name.clone(), list);
            }
            "li" => self.open_block(name.clone(), Node::list_item(Vec::new())),
            "blockquote" => self.open_block(name.clone(), Node::blockquote(Vec::new())),
            "pre" => self.open_block(name.clone(), Node::code_block(None, "")),
            "hr" => {
                self.prepare_block(NodeType::HorizontalRule);
                self.append(Node::horizontal_rule());
            }
            "br" => {
                if self.nearest_block().1 == NodeType::CodeBlock {
                    self.text("\n");
                } else {
                    self.ensure_textblock();
                    self.append(Node::hard_break());
                }
            }
            "strong" | "b" => self.open_mark(name.clone(), Mark::Bold),
            "em" | "i" => self.open_mark(name.clone(), Mark::Italic),
            "u" => self.open_mark(name.clone(), Mark::Underline),
            "s" | "strike" | "del" => self.open_mark(name.clone(), Mark::Strike),
            "code" if self.nearest_block().1 == NodeType::CodeBlock => {
                let language = attribute(tag, "class").and_then(|class| {
                    class
                        .split_whitespace()
                        .find_map(|c| c.strip_prefix("language-").map(ToOwned::to_owned))
                });
                if let Some(block) = self.nearest_block_mut()
                    && block.attrs.language.is_none()
                {
                    block.attrs.language = language;
                }
                self.stack.push(Open::Transparent { tag: name.clone() });
            }
            "code" => self.open_mark(name.clone(), Mark::Code),
            _ => self.stack.push(Open::Transparent { tag: name.clone() }),
        }
    }

    fn open_block(&mut self, tag: String, node: Node) {
        self.prepare_block(node.kind);
        self.stack.push(Open::Block { tag, node });
    }

    fn open_mark(&mut self, tag: String, mark: Mark) {
        self.stack.push(Open::Mark { tag, mark });
    }

    /// Close or open blocks until a block of `kind` may be placed on top.
    fn prepare_block(&mut self, kind: NodeType) {
        loop {
            let (index, parent) = self.nearest_block();
            if kind == NodeType::ListItem {
                if parent.is_list() {
                    return;
                }
                if parent.is_textblock() {
                    self.pop_to(index);
                    continue;
                }
                self.stack.push(Open::Block {
                    tag: String::new(),
                    node: Node::bullet_list(Vec::new()),
                });
                return;
            }
            if parent.is_textblock() {
                self.pop_to(index);
            } else if parent.is_list() {
                self.stack.push(Open::Block {
                    tag: String::new(),
                    node: Node::list_item(Vec::new()),
                });
                return;
            } else {
                return;
            }
        }
    }

    fn ensure_textblock(&mut self) {
        if self.nearest_block().1.is_textblock() {
            return;
        }
        self.prepare_block(NodeType::Paragraph);
        self.stack.push(Open::Block {
            tag: String::new(),
            node: Node::paragraph(Vec::new()),
        });
    }

    fn text(&mut self, raw: &str) {
        if self.nearest_block().1 == NodeType::CodeBlock {
            self.append(Node::text(raw));
            return;
        }
        let collapsed = collapse_whitespace(raw);
        if collapsed.is_empty() {
            return;
        }
        if !self.nearest_block().1.is_textblock() {
            if collapsed == " " {
                return;
            }
            self.ensure_textblock();
        }
        let marks = self.active_marks();
        self.append(Node::marked_text(collapsed, &marks));
    }

    fn append(&mut self, child: Node) {
        if let Some(block) = self.nearest_block_mut() {
            block.content.push(child);
        }
    }

    fn close(&mut self, name: &str) {
        if name.is_empty() {
            return;
        }
        let found = self
            .stack
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .find(|(_, open)| open.tag() == name)
            .map(|(index, _)| index);
        if let Some(index) = found {
            self.pop_to(index);
        }
    }

    /// Pop entries until the stack has `len` entries, finishing blocks.
    fn pop_to(&mut self, len: usize) {
        let len = len.max(1);
        while self.stack.len() > len {
            if let Some(Open::Block { node, .. }) = self.stack.pop() {
                let node = finish_block(node);
                if node.kind.is_list() && node.content.is_empty() {
                    continue;
                }
                self.append(node);
            }
        }
    }

    fn finish(mut self) -> Node {
        self.pop_to(1);
        let mut doc = match self.stack.pop() {
            Some(Open::Block { node, .. }) => node,
            _ => Node::doc(Vec::new()),
        };
        doc.normalize();
        doc
    }
}

fn collapse_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_space = false;
    for ch in raw.chars() {
        if ch.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

fn finish_block(mut node: Node) -> Node {
    if node.kind == NodeType::CodeBlock {
        normalize_inlines(&mut node.content);
    } else if node.kind.is_textblock() {
        trim_inline_whitespace(&mut node.content);
        normalize_inlines(&mut node.content);
    }
    node
}

/// Drop spaces at textblock edges, next to hard breaks, and doubled across
/// node boundaries.
fn trim_inline_whitespace(inlines: &mut [Node]) {
    let mut after_space = true;
    for node in inlines.iter_mut() {
        match node.kind {
            NodeType::HardBreak => after_space = true,
            _ => {
                if let Some(text) = node.text.as_mut() {
                    if after_space && text.starts_with(' ') {
                        text.remove(0);
                    }
                    if !text.is_empty() {
                        after_space = text.ends_with(' ');
                    }
                }
            }
        }
    }
    let mut before_break = true;
    for node in inlines.iter_mut().rev() {
        match node.kind {
            NodeType::HardBreak => before_break = true,
            _ => {
                if let Some(text) = node.text.as_mut() {
                    if before_break {
                        let trimmed = text.trim_end_matches(' ').len();
                        text.truncate(trimmed);
                    }
                    if !text.is_empty() {
                        before_break = false;
                    }
                }
            }
        }
    }
}

fn mark_tag(mark: Mark) -> &'static str {
    match mark {
        Mark::Bold => "strong",
        Mark::Italic => "em",
        Mark::Strike => "s",
        Mark::Underline => "u",
        Mark::Code => "code",
    }
}

fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

fn write_children(node: &Node, out: &mut String) {
    for child in &node.content {
        write_node(child, out);
    }
}

fn write_node(node: &Node, out: &mut String) {
    match node.kind {
        NodeType::Doc => write_children(node, out),
        NodeType::Paragraph => {
            out.push_str("<p>");
            write_inlines(&node.content, out);
            out.push_str("</p>");
        }
        NodeType::Heading => {
            let level = node.level().unwrap_or(1);
            out.push_str(&format!("<h{level}>"));
            write_inlines(&node.content, out);
            out.push_str(&format!("</h{level}>"));
        }
        NodeType::BulletList => {
            out.push_str("<ul>");
            write_children(node, out);
            out.push_str("</ul>");
        }
        NodeType::OrderedList => {
            match node.attrs.start {
                Some(start) if start != 1 => out.push_str(&format!("<ol start=\"{start}\">")),
                _ => out.push_str("<ol>"),
            }
            write_children(node, out);
            out.push_str("</ol>");
        }
        NodeType::ListItem => {
            out.push_str("<li>");
            write_children(node, out);
            out.push_str("</li>");
        }
        NodeType::Blockquote => {
            out.push_str("<blockquote>");
            write_children(node, out);
            out.push_str("</blockquote>");
        }
        NodeType::CodeBlock => {
            match &node.attrs.language {
                Some(language) => {
                    out.push_str("<pre><code class=\"language-");
                    escape_into(language, out);
                    out.push_str("\">");
                }
                None => out.push_str("<pre><code>"),
            }
            for child in &node.content {
                escape_into(child.text.as_deref().unwrap_or_default(), out);
            }
            out.push_str("</code></pre>");
        }
        NodeType::HorizontalRule => out.push_str("<hr>"),
        NodeType::HardBreak | NodeType::Text => write_inlines(std::slice::from_ref(node), out),
    }
}

/// Write inline nodes, keeping shared outer marks open across siblings.
fn write_inlines(inlines: &[Node], out: &mut String) {
    let mut open: Vec<Mark> = Vec::new();
    for node in inlines {
        let mut marks = node.marks.clone();
        marks.sort_unstable();
        marks.dedup();
        let keep = open
            .iter()
            .zip(&marks)
            .take_while(|(a, b)| a == b)
            .count();
        for mark in open.drain(keep..).rev() {
            out.push_str(&format!("</{}>", mark_tag(mark)));
        }
        for &mark in &marks[keep..] {
            out.push_str(&format!("<{}>", mark_tag(mark)));
            open.push(mark);
        }
        match node.kind {
            NodeType::HardBreak => out.push_str("<br>"),
            _ => escape_into(node.text.as_deref().unwrap_or_default(), out),
        }
    }
    for mark in open.into_iter().rev() {
        out.push_str(&format!("</{}>", mark_tag(mark)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(inlines: Vec<Node>) -> Node {
        Node::doc(vec![Node::paragraph(inlines)])
    }

    #[test]
    fn test_parse_empty_markup_is_empty_doc() {
        assert_eq!(parse("").unwrap(), Node::empty_doc());
    }

    #[test]
    fn test_parse_heading_and_paragraph() {
        let doc = parse("<h1>Hello, Editor!</h1><p>Body</p>").unwrap();
        assert_eq!(
            doc,
            Node::doc(vec![
                Node::heading(1, vec![Node::text("Hello, Editor!")]),
                Node::paragraph(vec![Node::text("Body")]),
            ])
        );
    }

    #[test]
    fn test_parse_nested_marks() {
        let doc = parse("<p><strong><em><s><u>styled</u></s></em></strong> plain</p>").unwrap();
        assert_eq!(
            doc,
            para(vec![
                Node::marked_text(
                    "styled",
                    &[Mark::Bold, Mark::Italic, Mark::Strike, Mark::Underline]
                ),
                Node::text(" plain"),
            ])
        );
    }

    #[test]
    fn test_parse_mark_aliases() {
        let doc = parse("<p><b>a</b><i>b</i><del>c</del><code>d</code></p>").unwrap();
        let marks: Vec<_> = doc.content[0]
            .content
            .iter()
            .map(|n| n.marks.clone())
            .collect();
        assert_eq!(
            marks,
            vec![
                vec![Mark::Bold],
                vec![Mark::Italic],
                vec![Mark::Strike],
                vec![Mark::Code]
            ]
        );
    }

    #[test]
    fn test_parse_lists_with_nesting() {
        let doc = parse(
            "<ul><li><p>one</p><ul><li><p>inner</p></li></ul></li></ul><ol start=\"3\"><li>three</li></ol>",
        )
        .unwrap();
        assert_eq!(doc.content[0].kind, NodeType::BulletList);
        let item = &doc.content[0].content[0];
        assert_eq!(item.content[1].kind, NodeType::BulletList);
        let ordered = &doc.content[1];
        assert_eq!(ordered.attrs.start, Some(3));
        assert_eq!(ordered.content[0].content[0].kind, NodeType::Paragraph);
    }

    #[test]
    fn test_parse_void_elements() {
        let doc = parse("<p>a<br>b</p><hr><p>c</p>").unwrap();
        assert_eq!(
            doc,
            Node::doc(vec![
                Node::paragraph(vec![Node::text("a"), Node::hard_break(), Node::text("b")]),
                Node::horizontal_rule(),
                Node::paragraph(vec![Node::text("c")]),
            ])
        );
    }

    #[test]
    fn test_parse_wraps_stray_text() {
        let doc = parse("just text").unwrap();
        assert_eq!(doc, para(vec![Node::text("just text")]));
    }

    #[test]
    fn test_parse_collapses_whitespace() {
        let doc = parse("<p>\n  lots   of\n space  </p>\n<p> </p>").unwrap();
        assert_eq!(doc.content[0].content, vec![Node::text("lots of space")]);
        assert!(doc.content[1].content.is_empty());
    }

    #[test]
    fn test_parse_entities() {
        let doc = parse("<p>a &amp; b&nbsp;c &quot;q&quot; &#169;</p>").unwrap();
        assert_eq!(doc.plain_text(), "a & b\u{a0}c \"q\" \u{a9}");
    }

    #[test]
    fn test_escaped_text_survives_repeated_round_trips() {
        let source = "<p>Tom &amp; Jerry &lt;3 &gt; &quot;x&quot; &apos;y&apos;</p>";
        let doc = parse(source).unwrap();
        assert_eq!(doc.plain_text(), "Tom & Jerry <3 > \"x\" 'y'");

        let once = serialize(&doc);
        assert_eq!(once, "<p>Tom &amp; Jerry &lt;3 &gt; &quot;x&quot; 'y'</p>");
        assert_eq!(serialize(&parse(&once).unwrap()), once);
    }

    #[test]
    fn test_parse_code_block_keeps_whitespace() {
        let doc = parse("<pre><code class=\"language-rust\">fn main() {\n    x  }</code></pre>")
            .unwrap();
        let block = &doc.content[0];
        assert_eq!(block.kind, NodeType::CodeBlock);
        assert_eq!(block.attrs.language.as_deref(), Some("rust"));
        assert_eq!(block.plain_text(), "fn main() {\n    x  }");
    }

    #[test]
    fn test_parse_unknown_elements_are_transparent() {
        let doc = parse("<div><span>inside</span></div>").unwrap();
        assert_eq!(doc, para(vec![Node::text("inside")]));
    }

    #[test]
    fn test_parse_blockquote_wraps_text() {
        let doc = parse("<blockquote>quoted</blockquote>").unwrap();
        assert_eq!(
            doc,
            Node::doc(vec![Node::blockquote(vec![Node::paragraph(vec![
                Node::text("quoted")
            ])])])
        );
    }

    #[test]
    fn test_parse_guide_fixture() {
        let html = include_str!("../../tests/fixtures/guide.html");
        let doc = parse(html).unwrap();
        assert!(doc.validate().is_ok());
        let text = doc.plain_text();
        assert!(text.starts_with("The Complete Guide to Modern Web Development"));
        assert!(text.contains("Flexbox for one-dimensional layouts"));
    }

    #[test]
    fn test_serialize_shares_outer_marks() {
        let doc = para(vec![
            Node::marked_text("a", &[Mark::Bold]),
            Node::marked_text("b", &[Mark::Bold, Mark::Italic]),
            Node::text("c"),
        ]);
        assert_eq!(serialize(&doc), "<p><strong>a<em>b</em></strong>c</p>");
    }

    #[test]
    fn test_serialize_escapes_text() {
        let doc = para(vec![Node::text("1 < 2 & \"x\"")]);
        assert_eq!(serialize(&doc), "<p>1 &lt; 2 &amp; &quot;x&quot;</p>");
    }

    #[test]
    fn test_serialize_blocks() {
        let mut ordered = Node::ordered_list(vec![Node::list_item(vec![Node::paragraph(vec![
            Node::text("x"),
        ])])]);
        ordered.attrs.start = Some(4);
        let doc = Node::doc(vec![
            ordered,
            Node::horizontal_rule(),
            Node::code_block(Some("js".to_string()), "a<b"),
        ]);
        assert_eq!(
            serialize(&doc),
            "<ol start=\"4\"><li><p>x</p></li></ol><hr><pre><code class=\"language-js\">a&lt;b</code></pre>"
        );
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        /// Words mixing markup-significant and non-ASCII characters.
        const WORD: &str = "[a-zA-Z0-9&<>\"'éß中😀]{1,6}";

        fn arb_marks() -> impl Strategy<Value = Vec<Mark>> {
            proptest::sample::subsequence(Mark::ALL.to_vec(), 0..=3)
        }

        fn arb_inline() -> impl Strategy<Value = Node> {
            prop_oneof![
                4 => (proptest::string::string_regex(&format!("{WORD}( {WORD})?")).unwrap(), arb_marks())
                    .prop_map(|(text, marks)| Node::marked_text(text, &marks)),
                1 => Just(Node::hard_break()),
            ]
        }

        fn arb_textblock() -> impl Strategy<Value = Node> {
            prop_oneof![
                prop::collection::vec(arb_inline(), 0..5).prop_map(Node::paragraph),
                (1u8..=6, prop::collection::vec(arb_inline(), 0..4))
                    .prop_map(|(level, inlines)| Node::heading(level, inlines)),
                "[a-z&<>\"']{1,10}".prop_map(|code| Node::code_block(None, &code)),
            ]
        }

        fn arb_block() -> impl Strategy<Value = Node> {
            arb_textblock().prop_recursive(3, 16, 3, |inner| {
                prop_oneof![
                    prop::collection::vec(
                        prop::collection::vec(inner.clone(), 1..3).prop_map(Node::list_item),
                        1..3
                    )
                    .prop_map(Node::bullet_list),
                    prop::collection::vec(
                        prop::collection::vec(inner.clone(), 1..3).prop_map(Node::list_item),
                        1..3
                    )
                    .prop_map(Node::ordered_list),
                    prop::collection::vec(inner, 1..3).prop_map(Node::blockquote),
                    Just(Node::horizontal_rule()),
                ]
            })
        }

        fn canonical(mut doc: Node) -> Node {
            doc.normalize();
            for path in doc.textblock_paths() {
                if let Some(block) = doc.node_at_mut(&path)
                    && block.kind != NodeType::CodeBlock
                {
                    trim_inline_whitespace(&mut block.content);
                    normalize_inlines(&mut block.content);
                }
            }
            doc
        }

        proptest! {
            #[test]
            fn serialize_then_parse_round_trips(
                blocks in prop::collection::vec(arb_block(), 1..5),
            ) {
                let doc = canonical(Node::doc(blocks));
                let reparsed = parse(&serialize(&doc)).unwrap();
                prop_assert_eq!(reparsed, doc);
            }

            #[test]
            fn parse_is_stable_under_reserialization(
                blocks in prop::collection::vec(arb_block(), 1..5),
            ) {
                let markup = serialize(&Node::doc(blocks));
                let once = parse(&markup).unwrap();
                let twice = parse(&serialize(&once)).unwrap();
                prop_assert_eq!(once, twice);
            }
        }
    }
}
