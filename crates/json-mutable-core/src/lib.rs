//! Change-tracking JSON containers.
//!
//! A tree of [`TrackedMapping`] and [`TrackedSequence`] nodes behaves like an
//! ordinary nested JSON structure, except that every mutation — at any depth —
//! reports to the tree's shared [`ChangeSignal`]. Plain `serde_json::Value`
//! mappings and sequences are recursively coerced into tracked nodes on
//! construction and on every insertion, so no untracked container ever
//! survives as a direct child of a tracked one.

pub mod container;
pub mod error;
pub mod mapping;
pub mod node;
pub mod sequence;
pub mod signal;

pub use container::TrackedContainer;
pub use error::TrackError;
pub use mapping::TrackedMapping;
pub use node::TrackedNode;
pub use sequence::TrackedSequence;
pub use signal::{ChangeSignal, RootHandle};

/// Returns the crate version at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
