//! Value kind definitions for Mirra.
//!
//! This module defines the tags of every variant a wire value can take. Error
//! messages and shape checks refer to kinds rather than to whole values.

use core::fmt;

/// The variant tag of a [`DynamicValue`](crate::DynamicValue).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Absent value
    Null,
    /// Boolean (true/false)
    Bool,
    /// 64-bit signed integer
    Int,
    /// 64-bit unsigned integer
    UInt,
    /// 64-bit floating point number
    Double,
    /// Fixed-point decimal
    Decimal,
    /// Binary data
    Blob,
    /// UTF-8 string
    Text,
    /// Timestamp in milliseconds since the Unix epoch
    DateTime,
    /// Ordered list of values
    List,
    /// Map keyed by strings
    NamedMap,
    /// Map keyed by integers
    IndexedMap,
    /// Map keyed by strings or integers
    MetaMap,
    /// A value carrying an attached metadata map
    WithMetadata,
}

impl ValueKind {
    /// Returns the wire name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::UInt => "uint",
            ValueKind::Double => "double",
            ValueKind::Decimal => "decimal",
            ValueKind::Blob => "blob",
            ValueKind::Text => "text",
            ValueKind::DateTime => "datetime",
            ValueKind::List => "list",
            ValueKind::NamedMap => "map",
            ValueKind::IndexedMap => "imap",
            ValueKind::MetaMap => "metamap",
            ValueKind::WithMetadata => "meta",
        }
    }

    /// Returns whether a value of this kind may appear as a table cell.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            ValueKind::Null
                | ValueKind::Bool
                | ValueKind::Int
                | ValueKind::UInt
                | ValueKind::Double
                | ValueKind::Decimal
                | ValueKind::Text
                | ValueKind::DateTime
        )
    }

    /// Returns whether this kind is one of the numeric subkinds.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ValueKind::Int | ValueKind::UInt | ValueKind::Double | ValueKind::Decimal
        )
    }

    /// Returns whether this kind is one of the three map variants.
    pub fn is_map(&self) -> bool {
        matches!(
            self,
            ValueKind::NamedMap | ValueKind::IndexedMap | ValueKind::MetaMap
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
