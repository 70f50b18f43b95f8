//! Rich-text editing engine.
//!
//! An [`Editor`] owns a document tree and a selection over the inline
//! position space. Changes go through chained [`Command`]s; listeners
//! registered with [`Editor::subscribe`] hear about every batch that changed
//! the document.

mod commands;
mod engine;
mod events;
mod options;
mod selection;
mod transform;

pub use commands::{ChainedCommands, Command};
pub use engine::{Editor, Format};
pub use events::{Listener, Subscription};
pub use options::{DEFAULT_PLACEHOLDER, EditorOptions};
pub use selection::Selection;
