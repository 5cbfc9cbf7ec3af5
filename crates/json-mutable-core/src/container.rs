//! Shared contract of the tracked container kinds.

use crate::signal::RootHandle;

/// Minimal capability shared by [`TrackedMapping`](crate::TrackedMapping) and
/// [`TrackedSequence`](crate::TrackedSequence): any structural mutation
/// through the container's interface results in one change notification
/// delivered to the tree's root signal.
pub trait TrackedContainer {
    /// Handle to the signal of the tree this container belongs to.
    fn root(&self) -> &RootHandle;

    /// Reparents this container and, recursively, every descendant to a new
    /// root. Called when a detached subtree is inserted into an existing
    /// tree, so the subtree adopts the parent's root instead of staying
    /// self-rooted.
    fn set_root(&mut self, root: &RootHandle);

    /// Reports one change to the root. Pure bookkeeping, no validation.
    fn notify_changed(&self) {
        self.root().notify();
    }
}
