//! Per-tree change signal.
//!
//! Every node in one tracked tree holds a clone of the same [`RootHandle`];
//! the handle is a non-owning association (the `Rc` shares the signal, never
//! the nodes), so ownership of nodes stays a strict parent-to-child tree.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Shared handle to a tree's [`ChangeSignal`]. Two nodes belong to the same
/// tree exactly when their handles are `Rc::ptr_eq`.
pub type RootHandle = Rc<ChangeSignal>;

/// Change-notification terminal for one tracked tree.
///
/// Carries a monotone generation counter and a listener table. A consumer can
/// either snapshot [`generation`](Self::generation) and compare later, or
/// register a listener that fires on every delivered notification.
///
/// Listeners run synchronously inside the mutating call and must not mutate
/// the tree they observe.
pub struct ChangeSignal {
    generation: Cell<u64>,
    next_listener_id: Cell<u64>,
    listeners: RefCell<BTreeMap<u64, Box<dyn FnMut()>>>,
}

impl ChangeSignal {
    /// Creates a fresh signal for a new, self-rooted tree.
    pub fn new_root() -> RootHandle {
        Rc::new(ChangeSignal {
            generation: Cell::new(0),
            next_listener_id: Cell::new(1),
            listeners: RefCell::new(BTreeMap::new()),
        })
    }

    /// Delivers one change notification: bumps the generation and invokes
    /// every registered listener once.
    pub fn notify(&self) {
        self.generation.set(self.generation.get().saturating_add(1));
        for listener in self.listeners.borrow_mut().values_mut() {
            listener();
        }
    }

    /// Number of notifications delivered so far.
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    pub fn subscribe<F>(&self, listener: F) -> u64
    where
        F: FnMut() + 'static,
    {
        let id = self.next_listener_id.get();
        self.next_listener_id.set(id.saturating_add(1));
        self.listeners.borrow_mut().insert(id, Box::new(listener));
        id
    }

    pub fn unsubscribe(&self, listener_id: u64) -> bool {
        self.listeners.borrow_mut().remove(&listener_id).is_some()
    }

    /// `true` when both handles refer to the same tree's signal.
    pub fn same_root(a: &RootHandle, b: &RootHandle) -> bool {
        Rc::ptr_eq(a, b)
    }
}

impl std::fmt::Debug for ChangeSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeSignal")
            .field("generation", &self.generation.get())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_bumps_generation() {
        let signal = ChangeSignal::new_root();
        assert_eq!(signal.generation(), 0);
        signal.notify();
        signal.notify();
        assert_eq!(signal.generation(), 2);
    }

    #[test]
    fn listeners_fire_per_notification() {
        let signal = ChangeSignal::new_root();
        let count = Rc::new(Cell::new(0u32));
        let seen = Rc::clone(&count);
        let id = signal.subscribe(move || seen.set(seen.get() + 1));
        signal.notify();
        signal.notify();
        assert_eq!(count.get(), 2);
        assert!(signal.unsubscribe(id));
        signal.notify();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn unsubscribe_unknown_id() {
        let signal = ChangeSignal::new_root();
        assert!(!signal.unsubscribe(42));
    }

    #[test]
    fn same_root_is_identity() {
        let a = ChangeSignal::new_root();
        let b = ChangeSignal::new_root();
        assert!(ChangeSignal::same_root(&a, &Rc::clone(&a)));
        assert!(!ChangeSignal::same_root(&a, &b));
    }
}
