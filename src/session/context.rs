//! Session state shared with every component under a provider.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::document::{ContentSnapshot, Node};
use crate::editor::{ChainedCommands, Editor, Format, Subscription};

/// Handle to a live editor. Only a [`SessionProvider`](super::SessionProvider)
/// creates one, and the strong reference never leaves it; components get the
/// handle by reference while rendering.
pub struct SessionHandle {
    editor: Rc<RefCell<Editor>>,
    generation: u64,
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl SessionHandle {
    pub(crate) fn new(editor: Editor, generation: u64) -> Self {
        Self {
            editor: Rc::new(RefCell::new(editor)),
            generation,
        }
    }

    /// Which build of its provider this session is, starting at 1.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Borrow the editor for queries.
    ///
    /// # Panics
    /// Panics if called from inside an edit listener of this session.
    pub fn read(&self) -> Ref<'_, Editor> {
        self.editor.borrow()
    }

    /// Start a command chain against the session.
    ///
    /// # Panics
    /// Panics if the editor is already borrowed, e.g. from an edit listener.
    pub fn chain(&self) -> ChainedCommands<RefMut<'_, Editor>> {
        ChainedCommands::new(self.editor.borrow_mut())
    }

    pub fn is_active(&self, format: impl Into<Format>) -> bool {
        self.read().is_active(format)
    }

    pub fn subscribe(&self, listener: impl Fn(&Editor) + 'static) -> Subscription {
        self.read().subscribe(listener)
    }

    pub fn subscriber_count(&self) -> usize {
        self.read().subscriber_count()
    }

    pub fn get_json(&self) -> Node {
        self.read().get_json()
    }

    pub fn get_html(&self) -> String {
        self.read().get_html()
    }

    pub fn get_text(&self) -> String {
        self.read().get_text()
    }

    /// Observe teardown of this session without keeping it alive.
    pub fn watch(&self) -> SessionWatch {
        SessionWatch(Rc::downgrade(&self.editor))
    }
}

/// Non-owning view of a session that only reports whether it still exists.
#[derive(Debug, Clone)]
pub struct SessionWatch(Weak<RefCell<Editor>>);

impl SessionWatch {
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

/// Slot where `set_initial_content` parks a snapshot until the provider
/// applies it.
pub(crate) type PendingContent = Rc<RefCell<Option<Rc<ContentSnapshot>>>>;

/// The value a provider exposes to its children.
#[derive(Debug)]
pub struct SessionContext {
    session: SessionHandle,
    initial: Rc<ContentSnapshot>,
    current: Rc<RefCell<Rc<ContentSnapshot>>>,
    pending: PendingContent,
}

impl SessionContext {
    pub(crate) const fn new(
        session: SessionHandle,
        initial: Rc<ContentSnapshot>,
        current: Rc<RefCell<Rc<ContentSnapshot>>>,
        pending: PendingContent,
    ) -> Self {
        Self {
            session,
            initial,
            current,
            pending,
        }
    }

    pub const fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// The snapshot the current session was seeded from.
    pub fn initial_content(&self) -> Rc<ContentSnapshot> {
        Rc::clone(&self.initial)
    }

    /// The snapshot produced by the latest edit, `Markup("")` before any.
    pub fn current_content(&self) -> Rc<ContentSnapshot> {
        Rc::clone(&self.current.borrow())
    }

    /// Replace the initial content. The provider rebuilds the session from it
    /// before its render returns. Passing the snapshot that is already
    /// initial is a no-op.
    pub fn set_initial_content(&self, content: Rc<ContentSnapshot>) {
        if Rc::ptr_eq(&content, &self.initial) {
            self.pending.borrow_mut().take();
            return;
        }
        *self.pending.borrow_mut() = Some(content);
    }
}

/// Render-time context carrier.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scope<'a> {
    session: Option<&'a SessionContext>,
}

impl<'a> Scope<'a> {
    /// A scope with no provider above it.
    pub const fn root() -> Self {
        Self { session: None }
    }

    pub const fn with_session(context: &'a SessionContext) -> Self {
        Self {
            session: Some(context),
        }
    }

    pub const fn session(&self) -> Option<&'a SessionContext> {
        self.session
    }
}

/// Get the session context for `component`.
///
/// # Panics
/// Panics with `"<component> should be in Editor.Root"` when no provider is in
/// scope. Rendering a session component outside a provider is a wiring bug.
pub fn use_session<'a>(scope: &Scope<'a>, component: &str) -> &'a SessionContext {
    match scope.session {
        Some(context) => context,
        None => panic!("{component} should be in Editor.Root"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditorOptions;

    fn context(markup: &str) -> SessionContext {
        let initial = Rc::new(ContentSnapshot::from(markup));
        let editor = Editor::new(EditorOptions::default(), &initial).unwrap();
        SessionContext::new(
            SessionHandle::new(editor, 1),
            initial,
            Rc::new(RefCell::new(Rc::new(ContentSnapshot::empty()))),
            Rc::new(RefCell::new(None)),
        )
    }

    #[test]
    fn test_handle_queries() {
        let ctx = context("<h1>Hello, Editor!</h1>");
        let session = ctx.session();
        assert_eq!(session.generation(), 1);
        assert!(session.get_text().contains("Hello, Editor!"));
        assert!(session.is_active(Format::Heading(1)));
        assert_eq!(session.subscriber_count(), 0);
    }

    #[test]
    fn test_chain_through_handle() {
        let ctx = context("<p>x</p>");
        assert!(ctx.session().chain().select_all().toggle_strike().run());
        assert_eq!(ctx.session().get_html(), "<p><s>x</s></p>");
    }

    #[test]
    fn test_set_initial_content_ignores_same_identity() {
        let ctx = context("<p>x</p>");
        ctx.set_initial_content(ctx.initial_content());
        assert!(ctx.pending.borrow().is_none());

        let next = Rc::new(ContentSnapshot::from("<p>x</p>"));
        ctx.set_initial_content(Rc::clone(&next));
        assert!(ctx.pending.borrow().as_ref().is_some_and(|p| Rc::ptr_eq(p, &next)));
    }

    #[test]
    fn test_watch_does_not_keep_session_alive() {
        let ctx = context("<p>x</p>");
        let watch = ctx.session().watch();
        let copy = watch.clone();
        assert!(watch.is_alive());
        drop(ctx);
        assert!(!watch.is_alive());
        assert!(!copy.is_alive());
    }

    #[test]
    fn test_use_session_in_scope() {
        let ctx = context("<p>x</p>");
        let scope = Scope::with_session(&ctx);
        assert!(std::ptr::eq(use_session(&scope, "Editor.Box"), &ctx));
    }

    #[test]
    #[should_panic(expected = "Editor.Box should be in Editor.Root")]
    fn test_use_session_without_provider_panics() {
        use_session(&Scope::root(), "Editor.Box");
    }
}
