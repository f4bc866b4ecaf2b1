//! Mirra Reactive - Observable collections for Mirra.
//!
//! This crate holds the composite collection a mirror keeps in sync and lets
//! the rest of an application watch it. Every mutation is described by a
//! change set (additions, removals, in-place replacements) and pushed to
//! subscribers.
//!
//! # Core Concepts
//!
//! - `ChangeSet`: Represents one mutation (added, removed, modified items)
//! - `ObservableCollection`: The single owner of the items; notifies subscribers
//! - `SubscriptionId`: Handle returned by `subscribe`, used to unsubscribe
//!
//! # Observation cycles
//!
//! Reads through `with()` and subscriber notifications open an observation
//! cycle. An `update()` issued inside a cycle does not run inline: it is
//! queued and runs once the cycle ends. `untracked()` reads without opening
//! a cycle.
//!
//! # Example
//!
//! ```
//! use mirra_reactive::{ChangeSet, ObservableCollection, UpdateStatus};
//!
//! let collection = ObservableCollection::new(vec![1, 2]);
//! let handle = collection.clone();
//!
//! collection.subscribe(move |changes| {
//!     // Mutating from inside a notification is deferred.
//!     if changes.added.contains(&3) {
//!         let status = handle.update(|items| {
//!             items.push(4);
//!             ChangeSet::initial(vec![4])
//!         });
//!         assert_eq!(status, UpdateStatus::Deferred);
//!     }
//! });
//!
//! collection.update(|items| {
//!     items.push(3);
//!     ChangeSet::initial(vec![3])
//! });
//!
//! assert_eq!(collection.snapshot(), vec![1, 2, 3, 4]);
//! ```

#![no_std]

extern crate alloc;

pub mod change_set;
pub mod observable;
mod subscription;

pub use change_set::ChangeSet;
pub use observable::{ObservableCollection, UpdateStatus};
pub use subscription::{ChangeCallback, SubscriptionId};
