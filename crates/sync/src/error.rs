//! Error types for reconciliation.

use alloc::string::String;
use mirra_core::ValueKind;
use thiserror::Error;

/// A composite refused a field value.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("field `{field}` expects {expected}, got {got}")]
pub struct FieldError {
    pub field: String,
    pub expected: ValueKind,
    pub got: ValueKind,
}

impl FieldError {
    /// Creates a field error.
    pub fn new(field: impl Into<String>, expected: ValueKind, got: ValueKind) -> Self {
        Self {
            field: field.into(),
            expected,
            got,
        }
    }
}

/// Failure to apply a change record.
///
/// An unmatched change is not an error; see
/// [`Outcome::Unmatched`](crate::Outcome::Unmatched).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// `apply` was called while another `apply` on the same reconciler was
    /// still running.
    #[error("reconciler is already applying a change")]
    Reentrant,
    /// A matched composite rejected a field; nothing was changed.
    #[error(transparent)]
    Field(#[from] FieldError),
    /// Both sides of a join name the same table.
    #[error("join uses table `{table}` on both sides")]
    AmbiguousJoin { table: String },
}
