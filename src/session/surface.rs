//! Content surface.
//!
//! The editable view of the session. It seeds the session from its `content`
//! prop, forwards edit notifications to its callback, and can show a drag
//! handle for reordering top-level blocks.

use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use super::view::{Rendered, SurfaceView, View, join_classes};
use super::{Scope, SessionHandle, use_session};
use crate::document::ContentSnapshot;
use crate::editor::{Editor, Subscription};

const COMPONENT: &str = "Editor.Box";

/// Classes every styled surface carries.
pub const STYLED_BASE_CLASS: &str = "[&>.ProseMirror]:focus-visible:border-none [&>.ProseMirror]:focus-visible:shadow-none [&>.ProseMirror]:focus-visible:outline-none";

/// Typography for the styled surface.
pub const STYLED_PROSE_CLASS: &str = "[&_blockquote]:my-2.5 [&_blockquote]:border-muted-foreground [&_blockquote]:border-l-4 [&_blockquote]:px-5 [&_blockquote]:py-2.5 [&_code]:bg-muted [&_code]:px-1 [&_code]:font-mono [&_em]:italic [&_h1]:font-bold [&_h1]:text-6xl [&_h2]:font-semibold [&_h2]:text-4xl [&_h3]:font-semibold [&_h3]:text-3xl [&_h4]:font-semibold [&_h4]:text-2xl [&_h5]:font-semibold [&_h5]:text-xl [&_h6]:font-semibold [&_h6]:text-lg [&_hr]:border-muted-foreground [&_li>p]:inline [&_ol]:list-inside [&_ol]:list-decimal [&_s]:line-through [&_strong]:font-bold [&_u]:underline [&_ul]:list-inside [&_ul]:list-disc";

/// How a surface is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceVariant {
    /// Built-in typography plus the caller's class
    #[default]
    Styled,
    /// Only the caller's class
    Passthrough,
}

impl SurfaceVariant {
    pub fn class_name(self, extra: &str) -> String {
        match self {
            Self::Styled => join_classes([STYLED_BASE_CLASS, STYLED_PROSE_CLASS, extra]),
            Self::Passthrough => join_classes([extra]),
        }
    }
}

/// What the update callback receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdatePayload {
    /// The live editor
    #[default]
    Engine,
    /// A tree snapshot of the document
    Snapshot,
}

/// Argument of the update callback.
#[derive(Debug, Clone)]
pub enum ContentUpdate<'a> {
    Engine(&'a Editor),
    Snapshot(Rc<ContentSnapshot>),
}

impl ContentUpdate<'_> {
    /// The document as a snapshot, whichever form was delivered.
    pub fn to_snapshot(&self) -> ContentSnapshot {
        match self {
            Self::Engine(editor) => ContentSnapshot::Tree(editor.get_json()),
            Self::Snapshot(snapshot) => snapshot.as_ref().clone(),
        }
    }
}

pub type ContentCallback = Rc<dyn Fn(ContentUpdate<'_>)>;

/// The editable surface bound to the session in scope.
pub struct ContentSurface {
    content: Option<Rc<ContentSnapshot>>,
    /// Last snapshot handed to the session
    pushed: Option<Rc<ContentSnapshot>>,
    on_content_update: Option<ContentCallback>,
    payload: UpdatePayload,
    drag_handle: bool,
    variant: SurfaceVariant,
    class: String,
    /// Listener on the session, with the generation it belongs to
    subscription: Option<(u64, Subscription)>,
    callback_changed: bool,
}

impl fmt::Debug for ContentSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentSurface")
            .field("content", &self.content)
            .field("payload", &self.payload)
            .field("drag_handle", &self.drag_handle)
            .field("variant", &self.variant)
            .field("class", &self.class)
            .field("subscribed", &self.is_subscribed())
            .finish_non_exhaustive()
    }
}

impl Default for ContentSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentSurface {
    pub fn new() -> Self {
        Self {
            content: None,
            pushed: None,
            on_content_update: None,
            payload: UpdatePayload::default(),
            drag_handle: false,
            variant: SurfaceVariant::default(),
            class: String::new(),
            subscription: None,
            callback_changed: false,
        }
    }

    #[must_use]
    pub fn with_content(mut self, content: Rc<ContentSnapshot>) -> Self {
        self.content = Some(content);
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: UpdatePayload) -> Self {
        self.payload = payload;
        self
    }

    #[must_use]
    pub fn with_drag_handle(mut self, enabled: bool) -> Self {
        self.drag_handle = enabled;
        self
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

    #[must_use]
    pub fn on_content_update(mut self, callback: impl Fn(ContentUpdate<'_>) + 'static) -> Self {
        self.set_on_content_update(Some(Rc::new(callback)));
        self
    }

    /// Update the `content` prop. Takes effect on the next render.
    pub fn set_content(&mut self, content: Option<Rc<ContentSnapshot>>) {
        self.content = content;
    }

    /// Replace the update callback. The surface re-subscribes on next render.
    pub fn set_on_content_update(&mut self, callback: Option<ContentCallback>) {
        self.on_content_update = callback;
        self.callback_changed = true;
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(|(_, subscription)| subscription.is_active())
    }

    /// Drop the edit listener. A later render subscribes again.
    pub fn unmount(&mut self) {
        if self.subscription.take().is_some() {
            debug!("surface unsubscribed");
        }
    }

    /// Move the top-level block holding text position `pos` to `to_index`.
    /// Returns false when the drag handle is off or nothing moved.
    ///
    /// # Panics
    /// Panics when no provider is in scope.
    pub fn drag_block(&self, scope: &Scope<'_>, pos: usize, to_index: usize) -> bool {
        let context = use_session(scope, COMPONENT);
        if !self.drag_handle {
            return false;
        }
        let session = context.session();
        let Some(from) = session.read().block_index_at(pos) else {
            return false;
        };
        session.chain().move_block(from, to_index).run()
    }

    fn push_content(&mut self, scope: &Scope<'_>) {
        let context = use_session(scope, COMPONENT);
        let Some(content) = &self.content else {
            return;
        };
        if content.is_empty()
            || self
                .pushed
                .as_ref()
                .is_some_and(|pushed| Rc::ptr_eq(pushed, content))
        {
            return;
        }
        trace!("surface pushing content to session");
        context.set_initial_content(Rc::clone(content));
        self.pushed = Some(Rc::clone(content));
    }

    fn ensure_subscribed(&mut self, session: &SessionHandle) {
        let current = self
            .subscription
            .as_ref()
            .is_some_and(|(generation, _)| *generation == session.generation());
        if current && !self.callback_changed {
            return;
        }
        // Old listener goes before the new one is registered.
        self.subscription = None;
        let callback = self.on_content_update.clone();
        let payload = self.payload;
        let subscription = session.subscribe(move |editor| {
            let Some(callback) = &callback else {
                return;
            };
            match payload {
                UpdatePayload::Engine => callback(ContentUpdate::Engine(editor)),
                UpdatePayload::Snapshot => callback(ContentUpdate::Snapshot(Rc::new(
                    ContentSnapshot::Tree(editor.get_json()),
                ))),
            }
        });
        debug!(generation = session.generation(), "surface subscribed");
        self.subscription = Some((session.generation(), subscription));
        self.callback_changed = false;
    }
}

impl View for ContentSurface {
    fn render(&mut self, scope: &Scope<'_>) -> Rendered {
        let context = use_session(scope, COMPONENT);
        self.push_content(scope);
        let session = context.session();
        self.ensure_subscribed(session);

        let editor = session.read();
        Rendered::Surface(SurfaceView {
            html: editor.get_html(),
            editable: editor.is_editable(),
            focused: editor.is_focused(),
            placeholder: editor.placeholder().map(ToOwned::to_owned),
            drag_handle: self.drag_handle,
            class: self.variant.class_name(&self.class),
        })
    }
}
