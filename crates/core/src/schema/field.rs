//! Field descriptor for validated tables.

use alloc::string::String;

/// Describes one column of a validated table.
///
/// Names inside a table are non-empty and unique; the validator guarantees
/// both before a `FieldDescriptor` ends up inside a [`Table`](super::Table).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    name: String,
}

impl FieldDescriptor {
    /// Creates a field descriptor with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the field name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<&str> for FieldDescriptor {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
