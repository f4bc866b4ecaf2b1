//! Error types for the client layer.

use mirra_core::Error as ValidationError;
use mirra_sync::{FieldError, ReconcileError};
use thiserror::Error;

/// Failure reported by a transport.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TransportError {
    /// A remote call failed.
    #[error("call to `{path}` failed: {message}")]
    Call { path: String, message: String },
    /// A subscription could not be established.
    #[error("subscription to `{topic}` failed: {message}")]
    Subscribe { topic: String, message: String },
    /// The connection is gone.
    #[error("transport closed")]
    Closed,
}

/// Failure of a bulk load or a single-record call.
///
/// A failed load leaves any previously loaded collection untouched.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum LoadError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("invalid payload: {0}")]
    Validation(#[from] ValidationError),
    /// A row validated but could not be turned into a composite.
    #[error("row {row} cannot be built: {source}")]
    Build { row: usize, source: FieldError },
}

/// Failure to handle one change notification.
///
/// None of these end the subscription.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SignalError {
    /// The notification parameter is not a change record.
    #[error("malformed change record: {0}")]
    Protocol(#[from] ValidationError),
    /// The mirror was torn down.
    #[error("mirror is closed")]
    Closed,
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}
