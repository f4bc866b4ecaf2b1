//! Error types for Mirra.
//!
//! Validation failures (`Error`) are data errors: the payload is rejected and
//! processing continues. Lookup failures (`LookupError`) are programming
//! errors in the code reading a validated table.

use crate::types::ValueKind;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use thiserror::Error;

/// Result type alias for validation.
pub type Result<T> = core::result::Result<T, Error>;

/// One step of a path into a wire value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Location of a value inside a payload, rendered as `$.rows[3][1]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WirePath {
    segments: Vec<Segment>,
}

impl WirePath {
    /// The payload root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path extended with a map key.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.segments.push(Segment::Key(key.into()));
        next
    }

    /// Returns a new path extended with a list index.
    pub fn index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.segments.push(Segment::Index(index));
        next
    }

    /// Returns the path segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl fmt::Display for WirePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.segments {
            match segment {
                Segment::Key(k) => write!(f, ".{}", k)?,
                Segment::Index(i) => write!(f, "[{}]", i)?,
            }
        }
        Ok(())
    }
}

/// Broad category of a validation failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong variant or missing key.
    Shape,
    /// Correct shape, but a table invariant is violated.
    Invariant,
}

/// Validation failure for a table or change record payload.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    #[error("expected {expected} at {path}, got {got}")]
    UnexpectedKind {
        path: WirePath,
        expected: ValueKind,
        got: ValueKind,
    },
    #[error("missing key `{key}` at {path}")]
    MissingKey { path: WirePath, key: String },
    #[error("unknown change operation {op:?} at {path}")]
    UnknownOperation { path: WirePath, op: String },
    #[error("integer at {path} does not fit in i64")]
    IntegerOutOfRange { path: WirePath },
    #[error("non-scalar {got} value for field `{field}` at {path}")]
    NonScalarField {
        path: WirePath,
        field: String,
        got: ValueKind,
    },
    #[error("empty field name at $.fields[{field}].name")]
    EmptyFieldName { field: usize },
    #[error("duplicate field name `{name}` at $.fields[{second}], first defined at $.fields[{first}]")]
    DuplicateField {
        name: String,
        first: usize,
        second: usize,
    },
    #[error("non-scalar {got} cell at $.rows[{row}][{column}]")]
    NonScalarCell {
        row: usize,
        column: usize,
        got: ValueKind,
    },
    #[error("row {row} has {got} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        got: usize,
    },
}

impl Error {
    /// Creates an unexpected-kind error.
    pub fn unexpected_kind(path: WirePath, expected: ValueKind, got: ValueKind) -> Self {
        Error::UnexpectedKind {
            path,
            expected,
            got,
        }
    }

    /// Creates a missing-key error.
    pub fn missing_key(path: WirePath, key: impl Into<String>) -> Self {
        Error::MissingKey {
            path,
            key: key.into(),
        }
    }

    /// Returns whether this is a shape or an invariant failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnexpectedKind { .. }
            | Error::MissingKey { .. }
            | Error::UnknownOperation { .. }
            | Error::IntegerOutOfRange { .. }
            | Error::NonScalarField { .. } => ErrorKind::Shape,
            Error::EmptyFieldName { .. }
            | Error::DuplicateField { .. }
            | Error::NonScalarCell { .. }
            | Error::RowWidth { .. } => ErrorKind::Invariant,
        }
    }

    /// Returns the row index this error points at, if any.
    pub fn row(&self) -> Option<usize> {
        match self {
            Error::NonScalarCell { row, .. } | Error::RowWidth { row, .. } => Some(*row),
            Error::UnexpectedKind { path, .. } => match path.segments() {
                [Segment::Key(k), Segment::Index(row), ..] if k == "rows" => Some(*row),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Misuse of a table accessor: the caller asked for something the table
/// does not have.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("row index {row} out of range for table with {rows} rows")]
    RowOutOfRange { row: usize, rows: usize },
    #[error("column index {index} out of range for table with {len} fields")]
    OutOfRange { index: usize, len: usize },
    #[error("unknown field `{0}`")]
    UnknownField(String),
}
