//! Session provider.
//!
//! Owns the one live session of a component tree. The session is seeded from
//! the provider's initial content and rebuilt, never patched, whenever that
//! content is replaced by a snapshot with a different identity.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use super::context::{PendingContent, SessionContext, SessionHandle};
use super::view::{Rendered, View};
use super::Scope;
use crate::document::ContentSnapshot;
use crate::editor::{Editor, EditorOptions, Listener, Subscription};

/// Render passes allowed for content changes raised while rendering.
const MAX_RENDER_PASSES: usize = 4;

pub struct SessionProvider {
    options: EditorOptions,
    initial: Rc<ContentSnapshot>,
    current: Rc<RefCell<Rc<ContentSnapshot>>>,
    pending: PendingContent,
    /// Snapshot the current session (or failed attempt) was built from
    built_from: Option<Rc<ContentSnapshot>>,
    context: Option<SessionContext>,
    /// The provider's own listener, keeping `current` in sync
    tracker: Option<Subscription>,
    on_update: Option<Listener>,
    generation: u64,
}

impl fmt::Debug for SessionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionProvider")
            .field("options", &self.options)
            .field("initial", &self.initial)
            .field("generation", &self.generation)
            .field("has_session", &self.context.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for SessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProvider {
    /// A provider seeded with the empty document.
    pub fn new() -> Self {
        Self {
            options: EditorOptions::default(),
            initial: Rc::new(ContentSnapshot::empty()),
            current: Rc::new(RefCell::new(Rc::new(ContentSnapshot::empty()))),
            pending: Rc::new(RefCell::new(None)),
            built_from: None,
            context: None,
            tracker: None,
            on_update: None,
            generation: 0,
        }
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<ContentSnapshot>) -> Self {
        self.initial = Rc::new(content.into());
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: EditorOptions) -> Self {
        self.options = options;
        self
    }

    /// Call `listener` with the live editor after every edit.
    #[must_use]
    pub fn on_update(mut self, listener: impl Fn(&Editor) + 'static) -> Self {
        self.on_update = Some(Rc::new(listener));
        self
    }

    /// Number of sessions built so far.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub const fn context(&self) -> Option<&SessionContext> {
        self.context.as_ref()
    }

    pub fn session(&self) -> Option<&SessionHandle> {
        self.context.as_ref().map(SessionContext::session)
    }

    pub fn initial_content(&self) -> Rc<ContentSnapshot> {
        Rc::clone(&self.initial)
    }

    pub fn current_content(&self) -> Rc<ContentSnapshot> {
        Rc::clone(&self.current.borrow())
    }

    /// Replace the initial content from outside the tree. Takes effect on the
    /// next render or [`with_scope`](Self::with_scope).
    pub fn set_initial_content(&self, content: Rc<ContentSnapshot>) {
        *self.pending.borrow_mut() = Some(content);
    }

    /// Render `children` with the session in scope.
    ///
    /// Returns [`Rendered::Empty`] without rendering the children when the
    /// editor cannot be built from the initial content. Content replaced by a
    /// child during the render is applied and the children are rendered again.
    pub fn render(&mut self, children: &mut [&mut dyn View]) -> Rendered {
        let mut output = Rendered::Empty;
        for pass in 0..MAX_RENDER_PASSES {
            self.sync();
            let Some(context) = &self.context else {
                return Rendered::Empty;
            };
            let scope = Scope::with_session(context);
            output = Rendered::Fragment(
                children
                    .iter_mut()
                    .map(|child| child.render(&scope))
                    .collect(),
            );
            if self.pending.borrow().is_none() {
                return output;
            }
            trace!(pass, "initial content replaced during render");
        }
        warn!(
            passes = MAX_RENDER_PASSES,
            "initial content kept changing during render; giving up"
        );
        output
    }

    /// Run `f` with the provider's scope, e.g. to dispatch a click.
    pub fn with_scope<R>(&mut self, f: impl FnOnce(&Scope<'_>) -> R) -> R {
        self.sync();
        let scope = self
            .context
            .as_ref()
            .map_or_else(Scope::root, Scope::with_session);
        f(&scope)
    }

    /// Apply pending content and rebuild the session if the initial content
    /// changed identity.
    fn sync(&mut self) {
        let pending = self.pending.borrow_mut().take();
        if let Some(content) = pending {
            self.initial = content;
        }
        if self
            .built_from
            .as_ref()
            .is_some_and(|built| Rc::ptr_eq(built, &self.initial))
        {
            return;
        }
        self.rebuild();
    }

    fn rebuild(&mut self) {
        // Tear down first: the old listener goes, then the old editor.
        self.tracker = None;
        self.context = None;
        self.built_from = Some(Rc::clone(&self.initial));

        let editor = match Editor::new(self.options.clone(), &self.initial) {
            Ok(editor) => editor,
            Err(err) => {
                warn!(error = %err, "Editor failed to initiate");
                return;
            }
        };

        let current = Rc::clone(&self.current);
        let on_update = self.on_update.clone();
        self.tracker = Some(editor.subscribe(move |editor| {
            *current.borrow_mut() = Rc::new(ContentSnapshot::Tree(editor.get_json()));
            if let Some(listener) = &on_update {
                listener(editor);
            }
        }));

        self.generation += 1;
        debug!(generation = self.generation, "session built");
        self.context = Some(SessionContext::new(
            SessionHandle::new(editor, self.generation),
            Rc::clone(&self.initial),
            Rc::clone(&self.current),
            Rc::clone(&self.pending),
        ));
    }
}
