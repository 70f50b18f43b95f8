// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. editor::EditorOptions)
    clippy::module_name_repetitions
)]

//! # Fancy Editor
//!
//! A rich-text editing session with the components composed around it, plus
//! the site configuration store of the Fancy site.
//!
//! - One provider owns the live editor; surfaces, mirrors and buttons reach it
//!   through a render scope
//! - Content moves as markup or as a JSON document tree
//! - Every edit listener is an RAII guard, so nothing leaks on teardown
//!
//! ## Architecture
//!
//! Components render into a plain [`session::Rendered`] tree. A host drives
//! renders and clicks; the [`session::SessionProvider`] rebuilds the editor
//! whenever its initial content is replaced by a new snapshot.
//!
//! ## Modules
//!
//! - [`document`]: Document tree, content snapshots, markup and Markdown
//! - [`editor`]: Editing engine, commands and edit notifications
//! - [`session`]: Provider, surface, read-only mirror and toggle buttons
//! - [`config`]: Site configuration persistence
//! - [`form`]: Site configuration form

pub mod config;
pub mod document;
pub mod editor;
pub mod form;
pub mod session;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::document::{ContentSnapshot, Mark, Node, NodeType};
    pub use crate::editor::{Editor, EditorOptions, Format, Subscription};
    pub use crate::session::{
        ContentSurface, ContentUpdate, ReadOnlyMirror, Rendered, Scope, SessionProvider, Toggle,
        ToggleButton, View,
    };
}
