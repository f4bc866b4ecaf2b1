//! Named-field view of a table row.

use crate::cell::Cell;
use crate::error::{Error, Result, WirePath};
use crate::shape;
use crate::value::DynamicValue;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// A mapping from field name to cell, in field order.
///
/// Records are materialized on demand from a table row (see
/// [`TableAccessor::record_at`](crate::TableAccessor::record_at)) or from a
/// record-shaped wire value; the accessor never stores them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, Cell)>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty record with room for `capacity` fields.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Proves that a wire value is a flat map of scalars and returns it.
    pub fn from_value(value: &DynamicValue) -> Result<Self> {
        Self::from_value_at(value, &WirePath::root())
    }

    /// Like [`Record::from_value`], reporting failures relative to `root`.
    ///
    /// Integer keys of a meta map are skipped.
    pub fn from_value_at(value: &DynamicValue, root: &WirePath) -> Result<Self> {
        let mut record = Record::new();
        for (name, raw) in shape::entries(value, root)? {
            let cell = Cell::from_value(raw).ok_or_else(|| Error::NonScalarField {
                path: root.key(name),
                field: name.to_string(),
                got: raw.unwrap_metadata().kind(),
            })?;
            record.insert(name, cell);
        }
        Ok(record)
    }

    /// Sets a field, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, cell: Cell) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = cell,
            None => self.entries.push((name, cell)),
        }
    }

    /// Returns the cell stored under `name`.
    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    /// Returns true if the record has a field named `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the number of fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the record has no fields.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(name, cell)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), c))
    }

    /// Iterates field names in field order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Renders the record as a named map.
    pub fn to_value(&self) -> DynamicValue {
        DynamicValue::NamedMap(
            self.entries
                .iter()
                .map(|(n, c)| (n.clone(), c.to_value()))
                .collect(),
        )
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Cell>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v.into());
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Cell);
    type IntoIter = alloc::vec::IntoIter<(String, Cell)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
