//! Command buttons.
//!
//! Buttons hold no state of their own: every render asks the session whether
//! their format is active, and a click toggles it and gives focus back to the
//! editor.

use super::view::{ButtonVariant, ButtonView, Rendered, View, join_classes};
use super::{Scope, use_session};
use crate::document::Mark;
use crate::editor::Format;

const BUTTON_CLASS: &str = "cursor-pointer";

/// The formats a toggle button can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Toggle {
    Bold,
    Italic,
    Underline,
    Strike,
    Code,
    BulletList,
    OrderedList,
}

impl Toggle {
    pub const ALL: [Self; 7] = [
        Self::Bold,
        Self::Italic,
        Self::Underline,
        Self::Strike,
        Self::Code,
        Self::BulletList,
        Self::OrderedList,
    ];

    pub const fn format(self) -> Format {
        match self {
            Self::Bold => Format::Mark(Mark::Bold),
            Self::Italic => Format::Mark(Mark::Italic),
            Self::Underline => Format::Mark(Mark::Underline),
            Self::Strike => Format::Mark(Mark::Strike),
            Self::Code => Format::Mark(Mark::Code),
            Self::BulletList => Format::BulletList,
            Self::OrderedList => Format::OrderedList,
        }
    }

    /// Component name used in wiring errors.
    pub const fn component_name(self) -> &'static str {
        match self {
            Self::Bold => "Editor.ToggleBoldBtn",
            Self::Italic => "Editor.ToggleItalicBtn",
            Self::Underline => "Editor.ToggleUnderlineBtn",
            Self::Strike => "Editor.ToggleStrikeBtn",
            Self::Code => "Editor.ToggleCodeBtn",
            Self::BulletList => "Editor.ToggleBulletListBtn",
            Self::OrderedList => "Editor.ToggleOrderedListBtn",
        }
    }
}

/// A button toggling one [`Toggle`] on the session in scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleButton {
    toggle: Toggle,
    class: String,
}

impl ToggleButton {
    pub fn new(toggle: Toggle) -> Self {
        Self {
            toggle,
            class: String::new(),
        }
    }

    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    pub const fn toggle(&self) -> Toggle {
        self.toggle
    }

    /// Toggle the format on the session in `scope`, focusing the editor.
    /// Returns whether the command applied.
    ///
    /// # Panics
    /// Panics when no provider is in scope.
    pub fn click(&self, scope: &Scope<'_>) -> bool {
        let context = use_session(scope, self.toggle.component_name());
        let applied = context
            .session()
            .chain()
            .focus()
            .toggle(self.toggle.format())
            .run();
        tracing::trace!(toggle = ?self.toggle, applied, "toggle button clicked");
        applied
    }
}

impl View for ToggleButton {
    fn render(&mut self, scope: &Scope<'_>) -> Rendered {
        let context = use_session(scope, self.toggle.component_name());
        let variant = if context.session().is_active(self.toggle.format()) {
            ButtonVariant::Default
        } else {
            ButtonVariant::Outline
        };
        Rendered::Button(ButtonView {
            toggle: self.toggle,
            variant,
            class: join_classes([BUTTON_CLASS, self.class.as_str()]),
        })
    }
}
