//! Indexed access to validated tables.
//!
//! `TableAccessor` wraps a [`Table`] together with a `name -> column` index
//! built once at construction. Lookups that miss are programming errors in
//! the calling code: the plain methods panic with the [`LookupError`]
//! message, the `try_` variants return it.

use crate::cell::Cell;
use crate::error::{LookupError, Result};
use crate::naming::FieldNaming;
use crate::record::Record;
use crate::schema::{validate_table, FieldDescriptor, Table};
use crate::value::DynamicValue;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use hashbrown::{HashMap, HashSet};

/// A column addressed by position or by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldRef<'a> {
    Index(usize),
    Name(&'a str),
}

impl From<usize> for FieldRef<'_> {
    fn from(index: usize) -> Self {
        FieldRef::Index(index)
    }
}

impl<'a> From<&'a str> for FieldRef<'a> {
    fn from(name: &'a str) -> Self {
        FieldRef::Name(name)
    }
}

/// Typed, indexed wrapper over a validated table.
#[derive(Clone, Debug)]
pub struct TableAccessor {
    table: Table,
    /// Wire and normalized field names -> column index
    columns: HashMap<String, usize>,
    /// Normalized field names, in column order
    names: Vec<String>,
    naming: FieldNaming,
}

impl TableAccessor {
    /// Wraps a validated table using verbatim field names.
    pub fn new(table: Table) -> Self {
        Self::with_naming(table, FieldNaming::Verbatim)
    }

    /// Wraps a validated table, presenting field names through `naming`.
    pub fn with_naming(table: Table, naming: FieldNaming) -> Self {
        let mut columns = HashMap::with_capacity(table.field_count());
        for (i, f) in table.fields().iter().enumerate() {
            columns.insert(f.name().to_string(), i);
        }
        let names = record_names(table.fields(), naming);
        for (i, name) in names.iter().enumerate() {
            // Wire names win over a colliding normalized name.
            columns.entry(name.clone()).or_insert(i);
        }
        Self {
            table,
            columns,
            names,
            naming,
        }
    }

    /// Validates a wire value and wraps the resulting table.
    pub fn from_value(value: &DynamicValue, naming: FieldNaming) -> Result<Self> {
        validate_table(value).map(|table| Self::with_naming(table, naming))
    }

    /// Returns the wrapped table.
    #[inline]
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Consumes the accessor and returns the table.
    pub fn into_table(self) -> Table {
        self.table
    }

    /// Returns the naming convention used for records.
    #[inline]
    pub fn naming(&self) -> FieldNaming {
        self.naming
    }

    /// Returns the number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    /// Returns the number of fields.
    #[inline]
    pub fn field_count(&self) -> usize {
        self.table.field_count()
    }

    /// Resolves a wire or normalized field name to its column index.
    #[inline]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    fn resolve(&self, field: FieldRef<'_>) -> core::result::Result<usize, LookupError> {
        match field {
            FieldRef::Index(index) if index < self.field_count() => Ok(index),
            FieldRef::Index(index) => Err(LookupError::OutOfRange {
                index,
                len: self.field_count(),
            }),
            FieldRef::Name(name) => self
                .column_index(name)
                .ok_or_else(|| LookupError::UnknownField(name.to_string())),
        }
    }

    /// Returns the descriptor of a field.
    pub fn try_field_at<'a>(
        &self,
        field: impl Into<FieldRef<'a>>,
    ) -> core::result::Result<&FieldDescriptor, LookupError> {
        let index = self.resolve(field.into())?;
        Ok(&self.table.fields()[index])
    }

    /// Returns the descriptor of a field.
    ///
    /// # Panics
    ///
    /// Panics if the field does not exist.
    pub fn field_at<'a>(&self, field: impl Into<FieldRef<'a>>) -> &FieldDescriptor {
        self.try_field_at(field).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Returns the cell at `(row, field)`.
    pub fn try_get<'a>(
        &self,
        row: usize,
        field: impl Into<FieldRef<'a>>,
    ) -> core::result::Result<&Cell, LookupError> {
        let column = self.resolve(field.into())?;
        let cells = self.table.row(row).ok_or(LookupError::RowOutOfRange {
            row,
            rows: self.row_count(),
        })?;
        Ok(&cells[column])
    }

    /// Returns the cell at `(row, field)`.
    ///
    /// # Panics
    ///
    /// Panics if the row or field does not exist.
    pub fn get<'a>(&self, row: usize, field: impl Into<FieldRef<'a>>) -> &Cell {
        self.try_get(row, field).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Materializes a row as a record keyed by normalized field names.
    pub fn try_record_at(&self, row: usize) -> core::result::Result<Record, LookupError> {
        let cells = self.table.row(row).ok_or(LookupError::RowOutOfRange {
            row,
            rows: self.row_count(),
        })?;
        let mut record = Record::with_capacity(cells.len());
        for (name, cell) in self.names.iter().zip(cells) {
            record.insert(name.clone(), cell.clone());
        }
        Ok(record)
    }

    /// Materializes a row as a record keyed by normalized field names.
    ///
    /// # Panics
    ///
    /// Panics if the row does not exist.
    pub fn record_at(&self, row: usize) -> Record {
        self.try_record_at(row).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Iterates every row as a record.
    pub fn records(&self) -> impl Iterator<Item = Record> + '_ {
        (0..self.row_count()).map(move |row| self.record_at(row))
    }
}

/// Record keys in column order.
///
/// A renamed column keeps its wire name when its normalized name is already
/// used by another column, so no two columns share a key.
fn record_names(fields: &[FieldDescriptor], naming: FieldNaming) -> Vec<String> {
    let kept: HashSet<&str> = fields
        .iter()
        .map(|f| f.name())
        .filter(|name| naming.rename(name) == *name)
        .collect();
    let mut renamed = HashSet::new();
    fields
        .iter()
        .map(|f| {
            let name = naming.rename(f.name());
            if name == f.name() {
                name.into_owned()
            } else if kept.contains(&*name) || !renamed.insert(name.clone()) {
                f.name().to_string()
            } else {
                name.into_owned()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn sample() -> TableAccessor {
        let table = Table::from_parts(
            vec!["id".into(), "name".into()],
            vec![
                vec![Cell::from(1i64), Cell::from("a")],
                vec![Cell::from(2i64), Cell::from("b")],
            ],
        )
        .unwrap();
        TableAccessor::new(table)
    }

    #[test]
    fn test_get_by_name_and_index() {
        let accessor = sample();
        assert_eq!(accessor.get(1, "name"), &Cell::from("b"));
        assert_eq!(accessor.get(0, 0usize), &Cell::from(1i64));
        assert_eq!(accessor.row_count(), 2);
        assert_eq!(accessor.field_count(), 2);
    }

    #[test]
    fn test_record_at() {
        let accessor = sample();
        let expected: Record = [("id", Cell::from(1i64)), ("name", Cell::from("a"))]
            .into_iter()
            .collect();
        assert_eq!(accessor.record_at(0), expected);
        assert_eq!(accessor.records().count(), 2);
    }

    #[test]
    fn test_field_at() {
        let accessor = sample();
        assert_eq!(accessor.field_at(1usize).name(), "name");
        assert_eq!(accessor.field_at("id").name(), "id");
    }

    #[test]
    fn test_lookup_errors() {
        let accessor = sample();
        assert_eq!(
            accessor.try_get(0, "age"),
            Err(LookupError::UnknownField("age".into()))
        );
        assert_eq!(
            accessor.try_get(0, 5usize),
            Err(LookupError::OutOfRange { index: 5, len: 2 })
        );
        assert_eq!(
            accessor.try_get(9, "id"),
            Err(LookupError::RowOutOfRange { row: 9, rows: 2 })
        );
        assert!(accessor.try_record_at(2).is_err());
    }

    #[test]
    #[should_panic(expected = "unknown field `age`")]
    fn test_get_unknown_field_panics() {
        sample().get(0, "age");
    }

    #[test]
    #[should_panic(expected = "row index 3 out of range")]
    fn test_record_at_out_of_range_panics() {
        sample().record_at(3);
    }

    #[test]
    fn test_camel_case_records() {
        let table = Table::from_parts(
            vec!["run_id".into(), "first_name".into()],
            vec![vec![Cell::from(7i64), Cell::from("Jane")]],
        )
        .unwrap();
        let accessor = TableAccessor::with_naming(table, FieldNaming::CamelCase);

        let record = accessor.record_at(0);
        assert_eq!(record.get("runId"), Some(&Cell::from(7i64)));
        assert_eq!(record.get("firstName"), Some(&Cell::from("Jane")));

        // Both spellings resolve to the same column.
        assert_eq!(accessor.column_index("first_name"), Some(1));
        assert_eq!(accessor.column_index("firstName"), Some(1));
    }

    #[test]
    fn test_colliding_normalized_names_keep_both_columns() {
        let table = Table::from_parts(
            vec!["first_name".into(), "firstName".into(), "last__name".into(), "last_name".into()],
            vec![vec![Cell::from("a"), Cell::from("b"), Cell::from("c"), Cell::from("d")]],
        )
        .unwrap();
        let accessor = TableAccessor::with_naming(table, FieldNaming::CamelCase);

        let record = accessor.record_at(0);
        assert_eq!(record.len(), 4);
        assert_eq!(record.get("firstName"), Some(&Cell::from("b")));
        assert_eq!(record.get("first_name"), Some(&Cell::from("a")));
        assert_eq!(record.get("lastName"), Some(&Cell::from("c")));
        assert_eq!(record.get("last_name"), Some(&Cell::from("d")));
        assert_eq!(accessor.column_index("firstName"), Some(1));
    }

    #[test]
    fn test_from_value_rejects_invalid() {
        let value = DynamicValue::named_map([("fields", DynamicValue::Null)]);
        assert!(TableAccessor::from_value(&value, FieldNaming::Verbatim).is_err());
    }
}
