//! Editing session and the components composed around it.
//!
//! A [`SessionProvider`] owns one live editor and hands its
//! [`SessionContext`] to child views through a [`Scope`]. Under it, a
//! [`ContentSurface`] edits the document, a [`ReadOnlyMirror`] previews it and
//! [`ToggleButton`]s toggle formatting. Rendering any of them without a
//! provider in scope panics.
//!
//! ```
//! use std::rc::Rc;
//! use fancy_editor::prelude::*;
//!
//! let mut provider = SessionProvider::new();
//! let mut surface = ContentSurface::new()
//!     .with_content(Rc::new(ContentSnapshot::from("<h1>Hello, Editor!</h1>")));
//! let mut bold = ToggleButton::new(Toggle::Bold);
//!
//! let out = provider.render(&mut [&mut surface, &mut bold]);
//! assert_eq!(out.surfaces()[0].html, "<h1>Hello, Editor!</h1>");
//! ```

mod buttons;
mod context;
mod mirror;
mod provider;
mod surface;
mod view;

pub use buttons::{Toggle, ToggleButton};
pub use context::{Scope, SessionContext, SessionHandle, SessionWatch, use_session};
pub use mirror::{INIT_FAILED, ReadOnlyMirror};
pub use provider::SessionProvider;
pub use surface::{
    ContentCallback, ContentSurface, ContentUpdate, STYLED_BASE_CLASS, STYLED_PROSE_CLASS,
    SurfaceVariant, UpdatePayload,
};
pub use view::{ButtonVariant, ButtonView, Rendered, SurfaceView, View};
