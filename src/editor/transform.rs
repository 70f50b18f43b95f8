//! Document transformations behind the editor commands.
//!
//! Everything here works on a bare [`Node`] plus position ranges, so the
//! engine can decide about editability and notifications separately.

use std::collections::BTreeMap;

use super::selection::{TextblockSpan, spans, touched};
use crate::document::{Mark, Node, NodeType, normalize_inlines};

fn char_byte_index(text: &str, chars: usize) -> usize {
    text.char_indices().nth(chars).map_or(text.len(), |(i, _)| i)
}

/// Make sure an inline boundary exists at `offset`, splitting a text node if
/// needed. Returns the index of the first inline at or after `offset`.
pub(crate) fn split_inlines_at(inlines: &mut Vec<Node>, offset: usize) -> usize {
    let mut pos = 0;
    for index in 0..inlines.len() {
        if pos == offset {
            return index;
        }
        let len = inlines[index].inline_len();
        if offset < pos + len {
            let node = &mut inlines[index];
            let text = node.text.take().unwrap_or_default();
            let (head, tail) = text.split_at(char_byte_index(&text, offset - pos));
            let mut rest = node.clone();
            rest.text = Some(tail.to_string());
            node.text = Some(head.to_string());
            inlines.insert(index + 1, rest);
            return index + 1;
        }
        pos += len;
    }
    inlines.len()
}

/// Whether every text character in `[from, to)` outside code blocks carries
/// `mark`. A range without any such text is never marked.
pub(crate) fn range_has_mark(doc: &Node, from: usize, to: usize, mark: Mark) -> bool {
    let spans = spans(doc);
    let mut seen = false;
    for span in touched(&spans, from, to) {
        let Some(block) = doc.node_at(&span.path) else {
            continue;
        };
        if block.kind == NodeType::CodeBlock {
            continue;
        }
        let (a, b) = span.local(from, to);
        let mut pos = 0;
        for node in &block.content {
            let (start, end) = (pos, pos + node.inline_len());
            pos = end;
            if node.kind != NodeType::Text || end <= a || start >= b {
                continue;
            }
            if !node.has_mark(mark) {
                return false;
            }
            seen = true;
        }
    }
    seen
}

/// Marks of the text right before `pos`, or of the first inline when `pos`
/// starts its textblock.
pub(crate) fn marks_at(doc: &Node, pos: usize) -> Vec<Mark> {
    let spans = spans(doc);
    let Some(span) = spans.iter().find(|span| span.contains(pos)) else {
        return Vec::new();
    };
    let Some(block) = doc.node_at(&span.path) else {
        return Vec::new();
    };
    if block.kind == NodeType::CodeBlock {
        return Vec::new();
    }
    let offset = pos - span.start;
    let mut at = 0;
    for node in &block.content {
        let len = node.inline_len();
        if offset == 0 || (at < offset && offset <= at + len) {
            return if node.kind == NodeType::Text {
                node.marks.clone()
            } else {
                Vec::new()
            };
        }
        at += len;
    }
    Vec::new()
}

/// Add or remove `mark` on every text inline in `[from, to)`.
pub(crate) fn set_mark(doc: &mut Node, from: usize, to: usize, mark: Mark, add: bool) -> bool {
    let mut changed = false;
    for span in touched(&spans(doc), from, to) {
        let (a, b) = span.local(from, to);
        let Some(block) = doc.node_at_mut(&span.path) else {
            continue;
        };
        if a >= b || block.kind == NodeType::CodeBlock {
            continue;
        }
        let start = split_inlines_at(&mut block.content, a);
        let end = split_inlines_at(&mut block.content, b);
        for node in &mut block.content[start..end] {
            if node.kind != NodeType::Text || node.has_mark(mark) == add {
                continue;
            }
            if add {
                node.marks.push(mark);
            } else {
                node.marks.retain(|m| *m != mark);
            }
            changed = true;
        }
        normalize_inlines(&mut block.content);
    }
    changed
}

/// Path of the closest list enclosing `path`.
pub(crate) fn nearest_list(doc: &Node, path: &[usize]) -> Option<Vec<usize>> {
    (1..path.len())
        .rev()
        .map(|depth| &path[..depth])
        .find(|prefix| doc.node_at(prefix).is_some_and(|node| node.kind.is_list()))
        .map(<[usize]>::to_vec)
}

/// Toggle a list of `kind` over the textblocks touched by `[from, to]`.
///
/// Lifts the touched items out when they all sit in a `kind` list, converts
/// their lists when they all sit in lists of the other kind, and otherwise
/// wraps the touched sibling blocks in a new list.
pub(crate) fn toggle_list(doc: &mut Node, from: usize, to: usize, kind: NodeType) -> bool {
    let spans = spans(doc);
    let targets: Vec<Vec<usize>> = touched(&spans, from, to)
        .into_iter()
        .map(|span| span.path.clone())
        .collect();
    if targets.is_empty() || !kind.is_list() {
        return false;
    }

    let lists: Vec<Option<Vec<usize>>> = targets
        .iter()
        .map(|path| nearest_list(doc, path))
        .collect();
    let list_kind = |list: &Option<Vec<usize>>| {
        list.as_ref()
            .and_then(|path| doc.node_at(path))
            .map(|node| node.kind)
    };

    if lists.iter().all(|list| list_kind(list) == Some(kind)) {
        let mut groups: BTreeMap<Vec<usize>, (usize, usize)> = BTreeMap::new();
        for (path, list) in targets.iter().zip(lists) {
            let Some(list) = list else { continue };
            let item = path[list.len()];
            let range = groups.entry(list).or_insert((item, item));
            range.0 = range.0.min(item);
            range.1 = range.1.max(item);
        }
        // Later and deeper lists first so earlier paths stay valid.
        for (list, (lo, hi)) in groups.into_iter().rev() {
            lift_items(doc, &list, lo, hi);
        }
        return true;
    }

    if lists.iter().all(Option::is_some) {
        let mut changed = false;
        for list in lists.into_iter().flatten() {
            if let Some(node) = doc.node_at_mut(&list)
                && node.kind != kind
            {
                node.kind = kind;
                node.attrs.start = None;
                changed = true;
            }
        }
        return changed;
    }

    wrap_in_list(doc, &targets, kind)
}

fn lift_items(doc: &mut Node, list_path: &[usize], lo: usize, hi: usize) {
    let Some((&list_index, parent_path)) = list_path.split_last() else {
        return;
    };
    let Some(parent) = doc.node_at_mut(parent_path) else {
        return;
    };
    if list_index >= parent.content.len() {
        return;
    }
    if parent.content[list_index].content.is_empty() {
        return;
    }
    let mut shell = parent.content.remove(list_index);
    let mut before = std::mem::take(&mut shell.content);
    let hi = hi.min(before.len().saturating_sub(1));
    let after = before.split_off(hi + 1);
    let lifted = before.split_off(lo.min(hi));

    let mut replacement = Vec::new();
    if !before.is_empty() {
        replacement.push(Node {
            content: before,
            ..shell.clone()
        });
    }
    replacement.extend(lifted.into_iter().flat_map(|item| item.content));
    if !after.is_empty() {
        let mut tail = Node {
            content: after,
            ..shell
        };
        tail.attrs.start = None;
        replacement.push(tail);
    }
    parent.content.splice(list_index..list_index, replacement);
}

fn wrap_in_list(doc: &mut Node, targets: &[Vec<usize>], kind: NodeType) -> bool {
    let mut common = common_prefix(targets);
    while !common.is_empty()
        && !doc
            .node_at(&common)
            .is_some_and(|node| node.kind.is_container())
    {
        common.pop();
    }
    let depth = common.len();
    let Some(lo) = targets.iter().map(|path| path[depth]).min() else {
        return false;
    };
    let hi = targets.iter().map(|path| path[depth]).max().unwrap_or(lo);
    let Some(container) = doc.node_at_mut(&common) else {
        return false;
    };

    // Lists caught in the range donate their items instead of nesting.
    let items = container
        .content
        .drain(lo..=hi)
        .flat_map(|block| {
            if block.kind.is_list() {
                block.content
            } else {
                vec![Node::list_item(vec![block])]
            }
        })
        .collect();
    container.content.insert(
        lo,
        Node {
            content: items,
            ..Node::new(kind)
        },
    );

    if lo + 1 < container.content.len() && container.content[lo + 1].kind == kind {
        let next = container.content.remove(lo + 1);
        container.content[lo].content.extend(next.content);
    }
    if lo > 0 && container.content[lo - 1].kind == kind {
        let current = container.content.remove(lo);
        container.content[lo - 1].content.extend(current.content);
    }
    true
}

fn common_prefix(paths: &[Vec<usize>]) -> Vec<usize> {
    let Some((first, rest)) = paths.split_first() else {
        return Vec::new();
    };
    let len = rest.iter().fold(first.len(), |len, path| {
        first
            .iter()
            .zip(path)
            .take(len)
            .take_while(|(a, b)| a == b)
            .count()
    });
    first[..len].to_vec()
}

/// Turn the touched textblocks into `level` headings, or back into
/// paragraphs when they all already are. Code blocks are left alone.
pub(crate) fn toggle_heading(doc: &mut Node, from: usize, to: usize, level: u8) -> bool {
    if !(1..=6).contains(&level) {
        return false;
    }
    let targets: Vec<Vec<usize>> = touched(&spans(doc), from, to)
        .into_iter()
        .filter(|span| {
            doc.node_at(&span.path)
                .is_some_and(|node| node.kind != NodeType::CodeBlock)
        })
        .map(|span| span.path.clone())
        .collect();
    if targets.is_empty() {
        return false;
    }
    let unset = targets
        .iter()
        .all(|path| doc.node_at(path).and_then(Node::level) == Some(level));
    for path in &targets {
        if let Some(node) = doc.node_at_mut(path) {
            if unset {
                node.kind = NodeType::Paragraph;
                node.attrs.level = None;
            } else {
                node.kind = NodeType::Heading;
                node.attrs.level = Some(level);
            }
        }
    }
    true
}

/// Insert `text` at `pos`. Returns the position after the inserted text.
pub(crate) fn insert_text(doc: &mut Node, pos: usize, text: &str, marks: &[Mark]) -> Option<usize> {
    if text.is_empty() {
        return None;
    }
    let mut spans = spans(doc);
    if spans.is_empty() {
        doc.content.push(Node::paragraph(Vec::new()));
        spans = super::selection::spans(doc);
    }
    let span = spans
        .iter()
        .find(|span| span.contains(pos))
        .or_else(|| spans.last())?;
    let offset = pos.saturating_sub(span.start).min(span.len);
    let block = doc.node_at_mut(&span.path)?;
    let marks = if block.kind == NodeType::CodeBlock {
        &[][..]
    } else {
        marks
    };
    let index = split_inlines_at(&mut block.content, offset);
    block.content.insert(index, Node::marked_text(text, marks));
    normalize_inlines(&mut block.content);
    Some(span.start + offset + text.chars().count())
}

/// Delete `[from, to)`, joining the first and last touched textblocks.
pub(crate) fn delete_range(doc: &mut Node, from: usize, to: usize) -> bool {
    if from >= to {
        return false;
    }
    let spans = spans(doc);
    let hit: Vec<&TextblockSpan> = touched(&spans, from, to);
    let Some((first, rest)) = hit.split_first() else {
        return false;
    };
    let Some(last) = rest.last() else {
        let (a, b) = first.local(from, to);
        let Some(block) = doc.node_at_mut(&first.path) else {
            return false;
        };
        let start = split_inlines_at(&mut block.content, a);
        let end = split_inlines_at(&mut block.content, b);
        let removed = block.content.drain(start..end).count() > 0;
        normalize_inlines(&mut block.content);
        return removed;
    };

    let (_, b) = last.local(from, to);
    let tail = match doc.node_at_mut(&last.path) {
        Some(block) => {
            let start = split_inlines_at(&mut block.content, b);
            block.content.split_off(start)
        }
        None => Vec::new(),
    };
    if let Some(block) = doc.node_at_mut(&first.path) {
        let (a, _) = first.local(from, to);
        let cut = split_inlines_at(&mut block.content, a);
        block.content.truncate(cut);
        if block.kind == NodeType::CodeBlock {
            block.content.extend(tail.into_iter().map(into_code_text));
        } else {
            block.content.extend(tail);
        }
        normalize_inlines(&mut block.content);
    }

    let mut doomed: Vec<Vec<usize>> = rest.iter().map(|span| span.path.clone()).collect();
    doomed.sort_unstable();
    for path in doomed.iter().rev() {
        if let Some((&index, parent)) = path.split_last()
            && let Some(parent) = doc.node_at_mut(parent)
            && index < parent.content.len()
        {
            parent.content.remove(index);
        }
    }
    prune_empty(doc);
    doc.normalize();
    true
}

fn into_code_text(node: Node) -> Node {
    match node.kind {
        NodeType::HardBreak => Node::text("\n"),
        _ => Node::text(node.text.unwrap_or_default()),
    }
}

fn prune_empty(node: &mut Node) {
    for child in &mut node.content {
        if !child.kind.is_textblock() {
            prune_empty(child);
        }
    }
    node.content.retain(|child| {
        let hollow = child.kind.is_list()
            || matches!(child.kind, NodeType::ListItem | NodeType::Blockquote);
        !(hollow && child.content.is_empty())
    });
}

/// Move the top-level block at `from` so it ends up at index `to`.
pub(crate) fn move_block(doc: &mut Node, from: usize, to: usize) -> bool {
    let len = doc.content.len();
    if from >= len || to >= len || from == to {
        return false;
    }
    let block = doc.content.remove(from);
    doc.content.insert(to, block);
    true
}
