//! The editor: a document, a selection and the edit-notification channel.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use super::commands::{ChainedCommands, Command};
use super::events::{Listeners, Subscription};
use super::options::EditorOptions;
use super::selection::{self, Selection};
use super::transform;
use crate::document::{ContentSnapshot, DocumentError, Mark, Node, NodeType, markup};

/// Formatting that can be queried with [`Editor::is_active`] and toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Mark(Mark),
    Heading(u8),
    BulletList,
    OrderedList,
}

impl From<Mark> for Format {
    fn from(mark: Mark) -> Self {
        Self::Mark(mark)
    }
}

/// A rich-text editing engine instance.
#[derive(Debug)]
pub struct Editor {
    doc: Node,
    selection: Selection,
    /// Marks for the next inserted text, set by toggling on an empty selection
    stored_marks: Option<Vec<Mark>>,
    options: EditorOptions,
    focused: bool,
    listeners: Rc<RefCell<Listeners>>,
}

impl Editor {
    /// Create an editor seeded with `content`.
    ///
    /// # Errors
    /// Returns a [`DocumentError`] when the content does not parse or is not
    /// a valid document.
    pub fn new(options: EditorOptions, content: &ContentSnapshot) -> Result<Self, DocumentError> {
        let doc = content.to_tree()?;
        debug!(
            editable = options.editable,
            blocks = doc.content.len(),
            "editor created"
        );
        Ok(Self {
            doc,
            selection: Selection::default(),
            stored_marks: None,
            focused: options.autofocus,
            options,
            listeners: Rc::new(RefCell::new(Listeners::default())),
        })
    }

    pub const fn doc(&self) -> &Node {
        &self.doc
    }

    pub const fn selection(&self) -> Selection {
        self.selection
    }

    pub const fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub const fn is_editable(&self) -> bool {
        self.options.editable
    }

    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    /// True for a document holding a single empty paragraph.
    pub fn is_empty(&self) -> bool {
        matches!(
            self.doc.content.as_slice(),
            [only] if only.kind == NodeType::Paragraph && only.content.is_empty()
        )
    }

    /// Placeholder to show, if the document is empty and one is configured.
    pub fn placeholder(&self) -> Option<&str> {
        self.options
            .placeholder
            .as_deref()
            .filter(|_| self.is_empty())
    }

    pub fn get_json(&self) -> Node {
        self.doc.clone()
    }

    pub fn get_html(&self) -> String {
        markup::serialize(&self.doc)
    }

    pub fn get_text(&self) -> String {
        self.doc.plain_text()
    }

    /// Largest valid selection position.
    pub fn max_position(&self) -> usize {
        selection::max_position(&self.doc)
    }

    /// Index of the top-level block holding position `pos`.
    pub fn block_index_at(&self, pos: usize) -> Option<usize> {
        selection::spans(&self.doc)
            .into_iter()
            .find(|span| span.contains(pos))
            .and_then(|span| span.path.first().copied())
    }

    /// Whether `format` applies to the current selection.
    ///
    /// Marks on an empty selection report the stored marks if any, else the
    /// marks of the text before the cursor. Block formats need every touched
    /// textblock to match.
    pub fn is_active(&self, format: impl Into<Format>) -> bool {
        let (from, to) = (self.selection.from(), self.selection.to());
        match format.into() {
            Format::Mark(mark) if self.selection.is_empty() => match &self.stored_marks {
                Some(stored) => stored.contains(&mark),
                None => transform::marks_at(&self.doc, from).contains(&mark),
            },
            Format::Mark(mark) => transform::range_has_mark(&self.doc, from, to, mark),
            Format::Heading(level) => self.all_touched(from, to, |doc, path| {
                doc.node_at(path).and_then(Node::level) == Some(level)
            }),
            Format::BulletList => self.in_list(from, to, NodeType::BulletList),
            Format::OrderedList => self.in_list(from, to, NodeType::OrderedList),
        }
    }

    fn in_list(&self, from: usize, to: usize, kind: NodeType) -> bool {
        self.all_touched(from, to, |doc, path| {
            transform::nearest_list(doc, path)
                .and_then(|list| doc.node_at(&list))
                .is_some_and(|list| list.kind == kind)
        })
    }

    fn all_touched(&self, from: usize, to: usize, test: impl Fn(&Node, &[usize]) -> bool) -> bool {
        let spans = selection::spans(&self.doc);
        let touched = selection::touched(&spans, from, to);
        !touched.is_empty() && touched.iter().all(|span| test(&self.doc, &span.path))
    }

    /// Start a command chain.
    pub fn chain(&mut self) -> ChainedCommands<&mut Self> {
        ChainedCommands::new(self)
    }

    /// Register a listener called after every command batch that changed the
    /// document. Dropping the returned guard unsubscribes.
    pub fn subscribe(&self, listener: impl Fn(&Self) + 'static) -> Subscription {
        Listeners::add(&self.listeners, Rc::new(listener))
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub(crate) fn run_commands(&mut self, commands: Vec<Command>) -> bool {
        let mut succeeded = true;
        let mut changed = false;
        for command in commands {
            let (ok, doc_changed) = self.apply(command);
            succeeded &= ok;
            changed |= doc_changed;
        }
        if changed {
            self.selection = self.selection.clamp(self.max_position());
            self.emit_update();
        }
        succeeded
    }

    /// Apply one command, reporting success and whether the document changed.
    fn apply(&mut self, command: Command) -> (bool, bool) {
        if command.is_mutation() && !self.options.editable {
            trace!(?command, "rejected on non-editable editor");
            return (false, false);
        }
        let (from, to) = (self.selection.from(), self.selection.to());
        match command {
            Command::Focus => {
                self.focused = true;
                (true, false)
            }
            Command::Blur => {
                self.focused = false;
                (true, false)
            }
            Command::SetSelection(selection) => {
                self.selection = selection.clamp(self.max_position());
                self.stored_marks = None;
                (true, false)
            }
            Command::SelectAll => {
                self.selection = Selection::range(0, self.max_position());
                self.stored_marks = None;
                (true, false)
            }
            Command::ToggleMark(mark) if self.selection.is_empty() => {
                let mut marks = self
                    .stored_marks
                    .take()
                    .unwrap_or_else(|| transform::marks_at(&self.doc, from));
                if marks.contains(&mark) {
                    marks.retain(|m| *m != mark);
                } else {
                    marks.push(mark);
                }
                self.stored_marks = Some(marks);
                (true, false)
            }
            Command::ToggleMark(mark) => {
                let add = !transform::range_has_mark(&self.doc, from, to, mark);
                let changed = transform::set_mark(&mut self.doc, from, to, mark, add);
                (changed, changed)
            }
            Command::ToggleList(kind) => {
                let changed = transform::toggle_list(&mut self.doc, from, to, kind);
                (changed, changed)
            }
            Command::ToggleHeading(level) => {
                let changed = transform::toggle_heading(&mut self.doc, from, to, level);
                (changed, changed)
            }
            Command::InsertText(text) => {
                let mut deleted = false;
                if !self.selection.is_empty() {
                    deleted = transform::delete_range(&mut self.doc, from, to);
                }
                let marks = self
                    .stored_marks
                    .take()
                    .unwrap_or_else(|| transform::marks_at(&self.doc, from));
                match transform::insert_text(&mut self.doc, from, &text, &marks) {
                    Some(pos) => {
                        self.selection = Selection::cursor(pos);
                        (true, true)
                    }
                    None => {
                        self.selection = Selection::cursor(from);
                        (deleted, deleted)
                    }
                }
            }
            Command::DeleteSelection => {
                let changed = transform::delete_range(&mut self.doc, from, to);
                if changed {
                    self.selection = Selection::cursor(from);
                }
                (changed, changed)
            }
            Command::MoveBlock { from, to } => {
                let changed = transform::move_block(&mut self.doc, from, to);
                (changed, changed)
            }
            Command::SetContent(content) => match content.to_tree() {
                Ok(doc) => {
                    self.doc = doc;
                    self.selection = Selection::default();
                    self.stored_marks = None;
                    (true, true)
                }
                Err(err) => {
                    warn!(error = %err, "set_content rejected invalid content");
                    (false, false)
                }
            },
        }
    }

    fn emit_update(&self) {
        let listeners = self.listeners.borrow().snapshot();
        trace!(count = listeners.len(), "notifying listeners");
        for listener in listeners {
            listener(self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor(markup: &str) -> Editor {
        Editor::new(EditorOptions::default(), &ContentSnapshot::from(markup)).unwrap()
    }

    #[test]
    fn test_new_from_markup() {
        let editor = editor("<p>Hello, Editor!</p>");
        assert_eq!(editor.get_text(), "Hello, Editor!");
        assert_eq!(editor.get_html(), "<p>Hello, Editor!</p>");
        assert!(!editor.is_empty());
        assert!(editor.is_editable());
        assert!(!editor.is_focused());
    }

    #[test]
    fn test_new_empty_markup_shows_placeholder() {
        let editor = editor("");
        assert!(editor.is_empty());
        assert_eq!(editor.placeholder(), Some("Write something..."));
    }

    #[test]
    fn test_new_rejects_invalid_tree() {
        let bad = ContentSnapshot::Tree(Node::paragraph(Vec::new()));
        assert!(Editor::new(EditorOptions::default(), &bad).is_err());
    }

    #[test]
    fn test_autofocus_option() {
        let editor = Editor::new(
            EditorOptions::default().with_autofocus(true),
            &ContentSnapshot::empty(),
        )
        .unwrap();
        assert!(editor.is_focused());
    }

    #[test]
    fn test_toggle_bold_twice_restores_state() {
        let mut editor = editor("<p>plain text</p>");
        let before = editor.get_json();
        assert!(editor.chain().select_all().toggle_bold().run());
        assert!(editor.is_active(Mark::Bold));
        assert_eq!(editor.get_html(), "<p><strong>plain text</strong></p>");

        assert!(editor.chain().toggle_bold().run());
        assert!(!editor.is_active(Mark::Bold));
        assert_eq!(editor.get_json(), before);
    }

    #[test]
    fn test_partial_mark_range_adds_mark() {
        let mut editor = editor("<p><em>ab</em>cd</p>");
        editor.chain().select_all().toggle_italic().run();
        assert_eq!(editor.get_html(), "<p><em>abcd</em></p>");
    }

    #[test]
    fn test_stored_marks_apply_to_inserted_text() {
        let mut editor = editor("<p>ab</p>");
        editor
            .chain()
            .set_selection(2, 2)
            .toggle_underline()
            .run();
        assert!(editor.is_active(Mark::Underline));
        assert_eq!(editor.get_html(), "<p>ab</p>");

        editor.chain().insert_text("c").run();
        assert_eq!(editor.get_html(), "<p>ab<u>c</u></p>");
        assert_eq!(editor.selection(), Selection::cursor(3));
    }

    #[test]
    fn test_list_toggle_reports_active() {
        let mut editor = editor("<p>one</p><p>two</p>");
        editor.chain().select_all().toggle_bullet_list().run();
        assert!(editor.is_active(Format::BulletList));
        assert!(!editor.is_active(Format::OrderedList));

        editor.chain().toggle_ordered_list().run();
        assert!(editor.is_active(Format::OrderedList));
        assert_eq!(
            editor.get_html(),
            "<ol><li><p>one</p></li><li><p>two</p></li></ol>"
        );

        editor.chain().toggle_ordered_list().run();
        assert_eq!(editor.get_html(), "<p>one</p><p>two</p>");
    }

    #[test]
    fn test_heading_format() {
        let mut editor = editor("<p>Title</p>");
        editor.chain().toggle_heading(1).run();
        assert!(editor.is_active(Format::Heading(1)));
        assert_eq!(editor.get_html(), "<h1>Title</h1>");
    }

    #[test]
    fn test_read_only_rejects_mutations() {
        let mut editor = Editor::new(
            EditorOptions::read_only(),
            &ContentSnapshot::from("<p>fixed</p>"),
        )
        .unwrap();
        let before = editor.get_json();
        assert!(!editor.chain().select_all().toggle_bold().run());
        assert!(!editor.chain().insert_text("x").run());
        assert!(!editor.chain().move_block(0, 0).run());
        assert!(!editor.chain().set_content("<p>replaced</p>").run());
        assert_eq!(editor.get_json(), before);
        // Non-mutating commands still work.
        assert!(editor.chain().focus().select_all().run());
        assert!(editor.is_focused());
    }

    #[test]
    fn test_insert_replaces_selection() {
        let mut editor = editor("<p>hello world</p>");
        editor.chain().set_selection(6, 11).insert_text("there").run();
        assert_eq!(editor.get_text(), "hello there");
    }

    #[test]
    fn test_delete_selection_across_blocks() {
        let mut editor = editor("<p>abc</p><p>def</p>");
        assert!(editor.chain().set_selection(2, 5).delete_selection().run());
        assert_eq!(editor.get_html(), "<p>abef</p>");
        assert_eq!(editor.selection(), Selection::cursor(2));
        assert!(!editor.chain().delete_selection().run());
    }

    #[test]
    fn test_block_index_at() {
        let editor = editor("<p>a</p><ul><li><p>b</p></li></ul><p>c</p>");
        assert_eq!(editor.block_index_at(0), Some(0));
        assert_eq!(editor.block_index_at(2), Some(1));
        assert_eq!(editor.block_index_at(4), Some(2));
        assert_eq!(editor.block_index_at(99), None);
    }

    #[test]
    fn test_set_selection_is_clamped() {
        let mut editor = editor("<p>abc</p>");
        editor.chain().set_selection(1, 50).run();
        assert_eq!(editor.selection(), Selection::range(1, 3));
    }

    #[test]
    fn test_set_content_replaces_document() {
        let mut editor = editor("<p>old</p>");
        assert!(editor.chain().set_content("<h2>new</h2>").run());
        assert_eq!(editor.get_html(), "<h2>new</h2>");

        let invalid = ContentSnapshot::Tree(Node::text("loose"));
        assert!(!editor.chain().set_content(invalid).run());
        assert_eq!(editor.get_html(), "<h2>new</h2>");
    }

    #[test]
    fn test_chain_reports_failure_of_any_command() {
        let mut editor = editor("<p>abc</p>");
        assert!(!editor.chain().focus().move_block(0, 4).run());
        assert!(editor.is_focused());
    }
}
