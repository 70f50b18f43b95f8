//! Read-only mirror.
//!
//! A second editor, separate from the session, showing the latest edited
//! tree or, before any edit, the initial content. It is never editable.

use std::rc::Rc;

use tracing::{debug, warn};

use super::view::{Rendered, SurfaceView, View};
use super::{Scope, SurfaceVariant, use_session};
use crate::document::ContentSnapshot;
use crate::editor::{Editor, EditorOptions};

const COMPONENT: &str = "Editor.ReadOnly";

/// Message rendered when the mirror's editor cannot be built.
pub const INIT_FAILED: &str = "Editor failed to initiate";

#[derive(Debug, Default)]
pub struct ReadOnlyMirror {
    variant: SurfaceVariant,
    class: String,
    /// Snapshot the mirror editor was built from
    source: Option<Rc<ContentSnapshot>>,
    editor: Option<Editor>,
}

impl ReadOnlyMirror {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_variant(mut self, variant: SurfaceVariant) -> Self {
        self.variant = variant;
        self
    }

    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    /// The mirror's own editor, once built.
    pub const fn editor(&self) -> Option<&Editor> {
        self.editor.as_ref()
    }

    /// Focus the mirror. Returns false before the mirror is built.
    pub fn focus(&mut self) -> bool {
        self.editor
            .as_mut()
            .is_some_and(|editor| editor.chain().focus().run())
    }

    pub fn set_selection(&mut self, anchor: usize, head: usize) -> bool {
        self.editor
            .as_mut()
            .is_some_and(|editor| editor.chain().set_selection(anchor, head).run())
    }

    fn sync(&mut self, source: Rc<ContentSnapshot>) {
        if self
            .source
            .as_ref()
            .is_some_and(|built| Rc::ptr_eq(built, &source))
        {
            return;
        }
        self.editor = match Editor::new(EditorOptions::read_only(), &source) {
            Ok(editor) => {
                debug!("read-only mirror rebuilt");
                Some(editor)
            }
            Err(err) => {
                warn!(error = %err, "{INIT_FAILED}");
                None
            }
        };
        self.source = Some(source);
    }
}

impl View for ReadOnlyMirror {
    fn render(&mut self, scope: &Scope<'_>) -> Rendered {
        let context = use_session(scope, COMPONENT);
        let current = context.current_content();
        let source = if current.is_tree() {
            current
        } else {
            context.initial_content()
        };
        self.sync(source);

        let Some(editor) = &self.editor else {
            return Rendered::Error(INIT_FAILED.to_string());
        };
        Rendered::Surface(SurfaceView {
            html: editor.get_html(),
            editable: false,
            focused: editor.is_focused(),
            placeholder: None,
            drag_handle: false,
            class: self.variant.class_name(&self.class),
        })
    }
}
