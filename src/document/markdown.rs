//! Markdown import with comrak.

use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{Arena, Options, parse_document};

use super::{Mark, Node, markup};

/// Parse Markdown into a document tree.
///
/// Raw HTML blocks are run through the markup parser and inline HTML is
/// dropped. Images keep their alt text and every table cell becomes a
/// paragraph of its own.
pub fn parse(source: &str) -> Node {
    let arena = Arena::new();
    let options = create_options();
    let root = parse_document(&arena, source, &options);

    let mut doc = Node::doc(convert_blocks(root));
    doc.normalize();
    doc
}

fn create_options() -> Options {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.table = true;
    options
}

fn convert_blocks<'a>(node: &'a AstNode<'a>) -> Vec<Node> {
    let mut blocks = Vec::new();
    for child in node.children() {
        match &child.data.borrow().value {
            NodeValue::Paragraph => {
                blocks.push(Node::paragraph(convert_inlines(child)));
            }
            NodeValue::Heading(heading) => {
                blocks.push(Node::heading(heading.level, convert_inlines(child)));
            }
            NodeValue::List(list) => {
                let items = child
                    .children()
                    .map(|item| Node::list_item(convert_blocks(item)))
                    .collect();
                let node = match list.list_type {
                    ListType::Bullet => Node::bullet_list(items),
                    ListType::Ordered => {
                        let mut ordered = Node::ordered_list(items);
                        ordered.attrs.start = u32::try_from(list.start)
                            .ok()
                            .filter(|&start| start != 1);
                        ordered
                    }
                };
                blocks.push(node);
            }
            NodeValue::BlockQuote => {
                blocks.push(Node::blockquote(convert_blocks(child)));
            }
            NodeValue::CodeBlock(code) => {
                let language = code
                    .info
                    .split_whitespace()
                    .next()
                    .map(ToOwned::to_owned);
                let literal = code.literal.strip_suffix('\n').unwrap_or(&code.literal);
                blocks.push(Node::code_block(language, literal));
            }
            NodeValue::ThematicBreak => blocks.push(Node::horizontal_rule()),
            NodeValue::TableCell => blocks.push(Node::paragraph(convert_inlines(child))),
            NodeValue::HtmlBlock(html) => {
                if let Ok(fragment) = markup::parse(&html.literal) {
                    blocks.extend(fragment.content);
                }
            }
            _ => blocks.extend(convert_blocks(child)),
        }
    }
    blocks
}

fn convert_inlines<'a>(node: &'a AstNode<'a>) -> Vec<Node> {
    let mut inlines = Vec::new();
    collect_inlines(node, &[], &mut inlines);
    inlines
}

fn collect_inlines<'a>(node: &'a AstNode<'a>, marks: &[Mark], out: &mut Vec<Node>) {
    for child in node.children() {
        match &child.data.borrow().value {
            NodeValue::Text(text) => out.push(Node::marked_text(text.as_str(), marks)),
            NodeValue::Code(code) => {
                out.push(Node::marked_text(
                    code.literal.as_str(),
                    &with_mark(marks, Mark::Code),
                ));
            }
            NodeValue::Emph => collect_inlines(child, &with_mark(marks, Mark::Italic), out),
            NodeValue::Strong => collect_inlines(child, &with_mark(marks, Mark::Bold), out),
            NodeValue::Strikethrough => {
                collect_inlines(child, &with_mark(marks, Mark::Strike), out);
            }
            NodeValue::SoftBreak => out.push(Node::marked_text(" ", marks)),
            NodeValue::LineBreak => out.push(Node::hard_break()),
            NodeValue::HtmlInline(_) => {}
            _ => collect_inlines(child, marks, out),
        }
    }
}

fn with_mark(marks: &[Mark], mark: Mark) -> Vec<Mark> {
    let mut next = marks.to_vec();
    next.push(mark);
    next
}
