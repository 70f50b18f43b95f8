//! Selection and the inline position space.
//!
//! Positions count inline units (characters and hard breaks) across the
//! textblocks of a document in order. Every textblock boundary takes one
//! extra unit, so a position never sits in two textblocks at once.

use crate::document::Node;

/// A selection between two positions. `anchor` stays put while `head` moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    /// A collapsed selection.
    pub const fn cursor(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    pub const fn range(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub const fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    #[must_use]
    pub fn clamp(self, max: usize) -> Self {
        Self {
            anchor: self.anchor.min(max),
            head: self.head.min(max),
        }
    }
}

/// Where a textblock sits in the position space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TextblockSpan {
    /// Child-index path from the document root
    pub path: Vec<usize>,
    /// Position of the textblock's first inline unit
    pub start: usize,
    /// Inline length of the textblock
    pub len: usize,
}

impl TextblockSpan {
    pub const fn end(&self) -> usize {
        self.start + self.len
    }

    pub const fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos <= self.end()
    }

    /// Local range of `[from, to]` inside this textblock.
    pub fn local(&self, from: usize, to: usize) -> (usize, usize) {
        (
            from.saturating_sub(self.start).min(self.len),
            to.saturating_sub(self.start).min(self.len),
        )
    }
}

pub(crate) fn spans(doc: &Node) -> Vec<TextblockSpan> {
    let mut start = 0;
    doc.textblock_paths()
        .into_iter()
        .map(|path| {
            let len = doc.node_at(&path).map_or(0, Node::inline_len);
            let span = TextblockSpan { path, start, len };
            start += len + 1;
            span
        })
        .collect()
}

/// Largest valid position in the document.
pub(crate) fn max_position(doc: &Node) -> usize {
    spans(doc).last().map_or(0, TextblockSpan::end)
}

/// Textblocks touched by the range `[from, to]`.
pub(crate) fn touched(spans: &[TextblockSpan], from: usize, to: usize) -> Vec<&TextblockSpan> {
    spans
        .iter()
        .filter(|span| span.start <= to && from <= span.end())
        .collect()
}
