//! Edit-notification channel.
//!
//! Listeners are registered against an editor and receive it by shared
//! reference after every command batch that changed the document. Each
//! registration returns a [`Subscription`] guard; dropping the guard removes
//! the listener, so every subscribe is paired with exactly one unsubscribe.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::Editor;

/// Callback invoked on every document change.
pub type Listener = Rc<dyn Fn(&Editor)>;

#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("next_id", &self.next_id)
            .field("count", &self.entries.len())
            .finish()
    }
}

impl Listeners {
    pub(crate) fn add(registry: &Rc<RefCell<Self>>, listener: Listener) -> Subscription {
        let mut inner = registry.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push((id, listener));
        tracing::trace!(id, count = inner.entries.len(), "listener subscribed");
        Subscription {
            registry: Rc::downgrade(registry),
            id,
        }
    }

    fn remove(&mut self, id: u64) {
        self.entries.retain(|(entry, _)| *entry != id);
        tracing::trace!(id, count = self.entries.len(), "listener unsubscribed");
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|(entry, _)| *entry == id)
    }

    /// Snapshot of the current listeners, so callbacks may subscribe or drop
    /// guards while being notified.
    pub(crate) fn snapshot(&self) -> Vec<Listener> {
        self.entries
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect()
    }
}

/// Guard for a registered listener. Dropping it unsubscribes.
///
/// The guard holds only a weak link to the editor's registry, so it never
/// keeps an editor alive; dropping it after the editor is gone is a no-op.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    registry: Weak<RefCell<Listeners>>,
    id: u64,
}

impl Subscription {
    /// Whether the listener is still registered with a live editor.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.borrow().contains(self.id))
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().remove(self.id);
        }
    }
}
