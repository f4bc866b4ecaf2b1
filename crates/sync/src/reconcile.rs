//! The reconciliation engine.
//!
//! `Reconciler::apply` patches a collection of composites in place for one
//! change record:
//!
//! - `Delete` removes every composite whose matching identity equals the id
//! - `Update` overwrites the carried fields on every match, keeping positions
//! - `Insert` is left to the next full load and reported as deferred
//!
//! A change that matches nothing, or names a table outside the join, leaves
//! the collection untouched and is not an error.

use crate::change::{ChangeOp, ChangeRecord};
use crate::composite::Composite;
use crate::error::ReconcileError;
use crate::identity::{JoinSpec, MatchPredicate, Side};
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::Cell as StateCell;
use core::fmt;
use mirra_core::{Cell, FieldNaming};
use mirra_reactive::ChangeSet;

/// Engine state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Applying,
}

/// What `apply` did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// This many composites were replaced in place.
    Updated(usize),
    /// This many composites were removed.
    Removed(usize),
    /// The table is part of the join but no composite matched.
    Unmatched,
    /// The table is not part of the join.
    UntrackedTable,
    /// Inserts are not reconciled; a reload picks them up.
    InsertDeferred,
}

impl Outcome {
    /// Returns true if the collection was modified.
    #[inline]
    pub fn changed(&self) -> bool {
        matches!(self, Outcome::Updated(_) | Outcome::Removed(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Updated(n) => write!(f, "updated {}", n),
            Outcome::Removed(n) => write!(f, "removed {}", n),
            Outcome::Unmatched => f.write_str("unmatched"),
            Outcome::UntrackedTable => f.write_str("untracked table"),
            Outcome::InsertDeferred => f.write_str("insert deferred"),
        }
    }
}

/// Result of applying one change: the outcome and the exact observable
/// change (removed composites, replaced `(old, new)` pairs).
#[derive(Clone, Debug, PartialEq)]
pub struct Applied<C> {
    pub outcome: Outcome,
    pub changes: ChangeSet<C>,
}

impl<C> Applied<C> {
    fn unchanged(outcome: Outcome) -> Self {
        Self {
            outcome,
            changes: ChangeSet::new(),
        }
    }

    /// Returns the change set, dropping the outcome.
    pub fn into_changes(self) -> ChangeSet<C> {
        self.changes
    }
}

/// Applies change records to a collection of composites.
///
/// The reconciler holds no reference to the collection between calls.
#[derive(Debug)]
pub struct Reconciler {
    join: JoinSpec,
    naming: FieldNaming,
    state: StateCell<EngineState>,
}

impl Reconciler {
    /// Creates a reconciler for a join, mapping change field names through
    /// `naming`.
    pub fn new(join: JoinSpec, naming: FieldNaming) -> Self {
        Self {
            join,
            naming,
            state: StateCell::new(EngineState::Idle),
        }
    }

    /// Returns the join this reconciler matches against.
    #[inline]
    pub fn join(&self) -> &JoinSpec {
        &self.join
    }

    /// Returns the field naming convention.
    #[inline]
    pub fn naming(&self) -> FieldNaming {
        self.naming
    }

    /// Returns the current state.
    #[inline]
    pub fn state(&self) -> EngineState {
        self.state.get()
    }

    /// Applies one change to `collection`.
    ///
    /// Either the whole change is applied or, on error, nothing is: updates
    /// are staged on clones and committed only once every match accepted
    /// every field. Calling `apply` again before this call returns fails with
    /// [`ReconcileError::Reentrant`].
    pub fn apply<C: Composite>(
        &self,
        collection: &mut Vec<C>,
        change: &ChangeRecord,
    ) -> Result<Applied<C>, ReconcileError> {
        let _guard = ApplyGuard::enter(&self.state)?;

        let Some(predicate) = self.join.match_predicate(&change.table, change.id) else {
            tracing::trace!(table = %change.table, id = change.id, "change for untracked table");
            return Ok(Applied::unchanged(Outcome::UntrackedTable));
        };

        let applied = match change.op {
            ChangeOp::Insert => Applied::unchanged(Outcome::InsertDeferred),
            ChangeOp::Delete => remove_matching(collection, predicate),
            ChangeOp::Update => self.update_matching(collection, predicate, change)?,
        };

        match applied.outcome {
            Outcome::Unmatched => {
                tracing::trace!(table = %change.table, id = change.id, op = %change.op, "change matched nothing");
            }
            outcome => {
                tracing::debug!(table = %change.table, id = change.id, op = %change.op, %outcome, "change applied");
            }
        }
        Ok(applied)
    }

    fn update_matching<C: Composite>(
        &self,
        collection: &mut [C],
        predicate: MatchPredicate,
        change: &ChangeRecord,
    ) -> Result<Applied<C>, ReconcileError> {
        let fields = self.field_names(predicate.side, change);

        let mut staged = Vec::new();
        for (index, item) in collection.iter().enumerate() {
            if predicate.matches(item) {
                let mut next = item.clone();
                for (name, value) in &fields {
                    next.set_field(name, value)?;
                }
                staged.push((index, next));
            }
        }

        if staged.is_empty() {
            return Ok(Applied::unchanged(Outcome::Unmatched));
        }

        let mut changes = ChangeSet::new();
        let count = staged.len();
        for (index, next) in staged {
            let old = core::mem::replace(&mut collection[index], next.clone());
            changes.modify(old, next);
        }
        Ok(Applied {
            outcome: Outcome::Updated(count),
            changes,
        })
    }

    /// Maps the wire names of a change's fields to composite field names.
    fn field_names<'a>(&self, side: Side, change: &'a ChangeRecord) -> Vec<(String, &'a Cell)> {
        let source = self.join.source(side);
        change
            .fields
            .iter()
            .map(|(column, value)| (source.field_name(column, self.naming).into_owned(), value))
            .collect()
    }
}

fn remove_matching<C: Composite>(collection: &mut Vec<C>, predicate: MatchPredicate) -> Applied<C> {
    if !collection.iter().any(|item| predicate.matches(item)) {
        return Applied::unchanged(Outcome::Unmatched);
    }
    let (removed, kept): (Vec<C>, Vec<C>) = core::mem::take(collection)
        .into_iter()
        .partition(|item| predicate.matches(item));
    *collection = kept;

    let count = removed.len();
    let mut changes = ChangeSet::new();
    changes.removed = removed;
    Applied {
        outcome: Outcome::Removed(count),
        changes,
    }
}

/// Holds the reconciler in `Applying`; returns it to `Idle` when dropped,
/// including on an early error return.
struct ApplyGuard<'a> {
    state: &'a StateCell<EngineState>,
}

impl<'a> ApplyGuard<'a> {
    fn enter(state: &'a StateCell<EngineState>) -> Result<Self, ReconcileError> {
        if state.get() == EngineState::Applying {
            return Err(ReconcileError::Reentrant);
        }
        state.set(EngineState::Applying);
        Ok(Self { state })
    }
}

impl Drop for ApplyGuard<'_> {
    fn drop(&mut self) {
        self.state.set(EngineState::Idle);
    }
}
