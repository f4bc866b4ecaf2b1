//! Mirra Sync - Change records and reconciliation for Mirra.
//!
//! A mirror loads a joined result set once, then keeps it current from a
//! stream of per-row change notifications instead of reloading. This crate
//! turns those notifications into in-place edits of the held collection.
//!
//! # Core Concepts
//!
//! - `ChangeRecord`: A validated insert/update/delete for one source row
//! - `JoinSpec`: The primary and secondary source tables behind a composite,
//!   and which id a change to each of them is matched on
//! - `Composite`: An item of the mirrored collection (`CompositeRecord` for
//!   untyped use)
//! - `Reconciler`: Applies a change to a collection atomically and reports the
//!   exact `ChangeSet` it produced
//!
//! # Example
//!
//! ```
//! use mirra_core::{Cell, FieldNaming, Record};
//! use mirra_sync::{
//!     parse_change, ChangeRecord, CompositeRecord, JoinSpec, Outcome, Reconciler, SourceTable,
//! };
//!
//! let join = JoinSpec::new(
//!     SourceTable::new("runs").with_alias("id", "run_id"),
//!     SourceTable::new("competitors").with_alias("id", "competitor_id"),
//! )
//! .unwrap();
//! let reconciler = Reconciler::new(join, FieldNaming::CamelCase);
//!
//! let fields: Record = [("firstName", Cell::from("Ann"))].into_iter().collect();
//! let mut runs = vec![CompositeRecord::new(1, 10, fields)];
//!
//! let wire = ChangeRecord::update("competitors", 10)
//!     .with_field("first_name", "Anna")
//!     .to_value();
//! let change = parse_change(&wire).unwrap();
//!
//! let applied = reconciler.apply(&mut runs, &change).unwrap();
//! assert_eq!(applied.outcome, Outcome::Updated(1));
//! assert_eq!(runs[0].get("firstName"), Some(&Cell::from("Anna")));
//! ```

#![no_std]

extern crate alloc;

pub mod change;
pub mod composite;
pub mod error;
pub mod identity;
pub mod reconcile;

pub use change::{parse_change, ChangeOp, ChangeRecord};
pub use composite::{Composite, CompositeRecord, IdFields};
pub use error::{FieldError, ReconcileError};
pub use identity::{JoinSpec, MatchPredicate, Side, SourceTable};
pub use reconcile::{Applied, EngineState, Outcome, Reconciler};

// Re-export commonly used types from dependencies
pub use mirra_reactive::ChangeSet;
