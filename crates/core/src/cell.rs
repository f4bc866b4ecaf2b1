//! Table cell values.
//!
//! A `Cell` is the scalar subset of [`DynamicValue`] that may appear inside a
//! table row or a change record. The conversion from `DynamicValue` is the one
//! place where "is this scalar?" is decided.

use crate::types::ValueKind;
use crate::value::{Decimal, DynamicValue};
use alloc::string::{String, ToString};
use core::fmt;

/// A numeric cell, keeping the wire subkind it arrived as.
#[derive(Clone, Copy, Debug)]
pub enum Number {
    Int(i64),
    UInt(u64),
    Double(f64),
    Decimal(Decimal),
}

impl Number {
    /// Returns the number as `i64` when it is integral and in range.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Int(v) => Some(*v),
            Number::UInt(v) => i64::try_from(*v).ok(),
            Number::Double(v) => {
                if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v <= i64::MAX as f64 {
                    Some(*v as i64)
                } else {
                    None
                }
            }
            Number::Decimal(d) => {
                if d.scale() == 0 {
                    i64::try_from(d.mantissa()).ok()
                } else {
                    None
                }
            }
        }
    }

    /// Returns the closest `f64`.
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int(v) => *v as f64,
            Number::UInt(v) => *v as f64,
            Number::Double(v) => *v,
            Number::Decimal(d) => d.to_f64(),
        }
    }

    fn kind(&self) -> ValueKind {
        match self {
            Number::Int(_) => ValueKind::Int,
            Number::UInt(_) => ValueKind::UInt,
            Number::Double(_) => ValueKind::Double,
            Number::Decimal(_) => ValueKind::Decimal,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (Number::UInt(a), Number::UInt(b)) => a == b,
            (Number::Double(a), Number::Double(b)) => {
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (Number::Decimal(a), Number::Decimal(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{}", v),
            Number::UInt(v) => write!(f, "{}", v),
            Number::Double(v) => write!(f, "{}", v),
            Number::Decimal(d) => write!(f, "{}", d),
        }
    }
}

/// One scalar cell of a table row.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Null,
    Text(String),
    Number(Number),
    /// Milliseconds since the Unix epoch
    Timestamp(i64),
    Bool(bool),
}

impl Cell {
    /// Converts a wire value into a cell.
    ///
    /// Metadata wrappers are looked through. Returns `None` for blobs, lists
    /// and maps, which are never valid cells.
    pub fn from_value(value: &DynamicValue) -> Option<Cell> {
        match value.unwrap_metadata() {
            DynamicValue::Null => Some(Cell::Null),
            DynamicValue::Bool(b) => Some(Cell::Bool(*b)),
            DynamicValue::Int(v) => Some(Cell::Number(Number::Int(*v))),
            DynamicValue::UInt(v) => Some(Cell::Number(Number::UInt(*v))),
            DynamicValue::Double(v) => Some(Cell::Number(Number::Double(*v))),
            DynamicValue::Decimal(d) => Some(Cell::Number(Number::Decimal(*d))),
            DynamicValue::Text(s) => Some(Cell::Text(s.clone())),
            DynamicValue::DateTime(ts) => Some(Cell::Timestamp(*ts)),
            DynamicValue::Blob(_)
            | DynamicValue::List(_)
            | DynamicValue::NamedMap(_)
            | DynamicValue::IndexedMap(_)
            | DynamicValue::MetaMap(_)
            | DynamicValue::WithMetadata { .. } => None,
        }
    }

    /// Converts this cell back into its wire value.
    pub fn to_value(&self) -> DynamicValue {
        match self {
            Cell::Null => DynamicValue::Null,
            Cell::Text(s) => DynamicValue::Text(s.clone()),
            Cell::Number(Number::Int(v)) => DynamicValue::Int(*v),
            Cell::Number(Number::UInt(v)) => DynamicValue::UInt(*v),
            Cell::Number(Number::Double(v)) => DynamicValue::Double(*v),
            Cell::Number(Number::Decimal(d)) => DynamicValue::Decimal(*d),
            Cell::Timestamp(ts) => DynamicValue::DateTime(*ts),
            Cell::Bool(b) => DynamicValue::Bool(*b),
        }
    }

    /// Returns the wire kind this cell was built from.
    pub fn kind(&self) -> ValueKind {
        match self {
            Cell::Null => ValueKind::Null,
            Cell::Text(_) => ValueKind::Text,
            Cell::Number(n) => n.kind(),
            Cell::Timestamp(_) => ValueKind::DateTime,
            Cell::Bool(_) => ValueKind::Bool,
        }
    }

    /// Returns true if this cell is Null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Returns the text if this is a Text cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the number as `i64` when it is integral.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Returns the number as `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    /// Returns the timestamp if this is a Timestamp cell.
    pub fn as_timestamp(&self) -> Option<i64> {
        match self {
            Cell::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Returns the boolean if this is a Bool cell.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Cell::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("null"),
            Cell::Text(s) => write!(f, "{:?}", s),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Timestamp(ts) => write!(f, "@{}", ts),
            Cell::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<bool> for Cell {
    fn from(v: bool) -> Self {
        Cell::Bool(v)
    }
}

impl From<i32> for Cell {
    fn from(v: i32) -> Self {
        Cell::Number(Number::Int(v as i64))
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Number(Number::Int(v))
    }
}

impl From<u64> for Cell {
    fn from(v: u64) -> Self {
        Cell::Number(Number::UInt(v))
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(Number::Double(v))
    }
}

impl From<Decimal> for Cell {
    fn from(v: Decimal) -> Self {
        Cell::Number(Number::Decimal(v))
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl<T> From<Option<T>> for Cell
where
    T: Into<Cell>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Cell::Null,
        }
    }
}
