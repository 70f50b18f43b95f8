//! Chained commands.
//!
//! Commands are collected on a [`ChainedCommands`] builder and applied in
//! order by [`ChainedCommands::run`]. Listeners hear about the batch once,
//! after the last command, and only when the document changed.

use std::ops::DerefMut;

use super::{Editor, Format, Selection};
use crate::document::{ContentSnapshot, Mark, NodeType};

/// A single editor command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Focus,
    Blur,
    SetSelection(Selection),
    SelectAll,
    ToggleMark(Mark),
    ToggleList(NodeType),
    ToggleHeading(u8),
    InsertText(String),
    DeleteSelection,
    MoveBlock { from: usize, to: usize },
    SetContent(ContentSnapshot),
}

impl Command {
    /// Commands that change the document and need an editable editor.
    pub const fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::ToggleMark(_)
                | Self::ToggleList(_)
                | Self::ToggleHeading(_)
                | Self::InsertText(_)
                | Self::DeleteSelection
                | Self::MoveBlock { .. }
                | Self::SetContent(_)
        )
    }
}

impl From<Format> for Command {
    fn from(format: Format) -> Self {
        match format {
            Format::Mark(mark) => Self::ToggleMark(mark),
            Format::Heading(level) => Self::ToggleHeading(level),
            Format::BulletList => Self::ToggleList(NodeType::BulletList),
            Format::OrderedList => Self::ToggleList(NodeType::OrderedList),
        }
    }
}

/// Builder returned by [`Editor::chain`].
///
/// Works over anything that derefs mutably to an editor, so a session can
/// hand out a chain over its `RefMut` guard.
#[must_use = "commands do nothing until run() is called"]
pub struct ChainedCommands<E: DerefMut<Target = Editor>> {
    target: E,
    commands: Vec<Command>,
}

impl<E: DerefMut<Target = Editor>> ChainedCommands<E> {
    pub(crate) const fn new(target: E) -> Self {
        Self {
            target,
            commands: Vec::new(),
        }
    }

    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    pub fn focus(self) -> Self {
        self.command(Command::Focus)
    }

    pub fn blur(self) -> Self {
        self.command(Command::Blur)
    }

    pub fn set_selection(self, anchor: usize, head: usize) -> Self {
        self.command(Command::SetSelection(Selection::range(anchor, head)))
    }

    pub fn select_all(self) -> Self {
        self.command(Command::SelectAll)
    }

    pub fn toggle_mark(self, mark: Mark) -> Self {
        self.command(Command::ToggleMark(mark))
    }

    pub fn toggle_bold(self) -> Self {
        self.toggle_mark(Mark::Bold)
    }

    pub fn toggle_italic(self) -> Self {
        self.toggle_mark(Mark::Italic)
    }

    pub fn toggle_underline(self) -> Self {
        self.toggle_mark(Mark::Underline)
    }

    pub fn toggle_strike(self) -> Self {
        self.toggle_mark(Mark::Strike)
    }

    pub fn toggle_code(self) -> Self {
        self.toggle_mark(Mark::Code)
    }

    pub fn toggle_bullet_list(self) -> Self {
        self.command(Command::ToggleList(NodeType::BulletList))
    }

    pub fn toggle_ordered_list(self) -> Self {
        self.command(Command::ToggleList(NodeType::OrderedList))
    }

    pub fn toggle_heading(self, level: u8) -> Self {
        self.command(Command::ToggleHeading(level))
    }

    /// Toggle any [`Format`].
    pub fn toggle(self, format: impl Into<Format>) -> Self {
        self.command(format.into().into())
    }

    pub fn insert_text(self, text: impl Into<String>) -> Self {
        self.command(Command::InsertText(text.into()))
    }

    pub fn delete_selection(self) -> Self {
        self.command(Command::DeleteSelection)
    }

    /// Move the top-level block at `from` to index `to`.
    pub fn move_block(self, from: usize, to: usize) -> Self {
        self.command(Command::MoveBlock { from, to })
    }

    pub fn set_content(self, content: impl Into<ContentSnapshot>) -> Self {
        self.command(Command::SetContent(content.into()))
    }

    /// Apply the queued commands. Returns true when every command succeeded.
    pub fn run(mut self) -> bool {
        let commands = std::mem::take(&mut self.commands);
        self.target.run_commands(commands)
    }
}
