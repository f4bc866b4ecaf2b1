//! Validated tables and the table validator.

use super::field::FieldDescriptor;
use crate::cell::Cell;
use crate::error::{Error, Result, WirePath};
use crate::shape;
use crate::value::DynamicValue;
use alloc::vec::Vec;
use hashbrown::HashMap;

/// One row of a table: cells in field order.
pub type Row = Vec<Cell>;

/// A rectangular result set.
///
/// A `Table` can only be obtained through [`validate_table`] or
/// [`Table::from_parts`], so every instance satisfies:
/// - every field name is non-empty and unique,
/// - every cell is a scalar,
/// - every row has exactly one cell per field.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    fields: Vec<FieldDescriptor>,
    rows: Vec<Row>,
}

impl Table {
    /// Builds a table from already-typed parts, checking the field name and
    /// row width invariants.
    pub fn from_parts(fields: Vec<FieldDescriptor>, rows: Vec<Row>) -> Result<Self> {
        check_names(&fields)?;
        check_widths(fields.len(), rows.iter().map(Vec::len))?;
        Ok(Self { fields, rows })
    }

    /// Returns the field descriptors.
    #[inline]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Returns the rows.
    #[inline]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the row at the given index.
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Returns the number of fields.
    #[inline]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Returns the number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Consumes the table and returns its parts.
    pub fn into_parts(self) -> (Vec<FieldDescriptor>, Vec<Row>) {
        (self.fields, self.rows)
    }

    /// Renders the table in its wire shape.
    pub fn to_value(&self) -> DynamicValue {
        let fields = self
            .fields
            .iter()
            .map(|f| DynamicValue::named_map([("name", f.name())]))
            .collect::<Vec<_>>();
        let rows = self
            .rows
            .iter()
            .map(|row| DynamicValue::List(row.iter().map(Cell::to_value).collect()))
            .collect::<Vec<_>>();
        DynamicValue::named_map([
            ("fields", DynamicValue::List(fields)),
            ("rows", DynamicValue::List(rows)),
        ])
    }
}

/// Proves that a wire value is a table and returns it typed.
///
/// Checks run in this order and stop at the first failure:
/// 1. top-level shape (`{fields: [{name: text}], rows: [[..]]}`),
/// 2. non-empty field names,
/// 3. unique field names,
/// 4. every cell is a scalar,
/// 5. every row has one cell per field.
pub fn validate_table(value: &DynamicValue) -> Result<Table> {
    let root = WirePath::root();
    let table = shape::map(value, &root)?;

    let fields_path = root.key("fields");
    let raw_fields = shape::list(shape::required(table, "fields", &root)?, &fields_path)?;
    let rows_path = root.key("rows");
    let raw_rows = shape::list(shape::required(table, "rows", &root)?, &rows_path)?;

    let mut fields = Vec::with_capacity(raw_fields.len());
    for (i, raw) in raw_fields.iter().enumerate() {
        let path = fields_path.index(i);
        let descriptor = shape::map(raw, &path)?;
        let name = shape::text(shape::required(descriptor, "name", &path)?, &path.key("name"))?;
        fields.push(FieldDescriptor::new(name));
    }

    let mut row_lists = Vec::with_capacity(raw_rows.len());
    for (i, raw) in raw_rows.iter().enumerate() {
        row_lists.push(shape::list(raw, &rows_path.index(i))?);
    }

    check_names(&fields)?;

    let mut rows = Vec::with_capacity(row_lists.len());
    for (r, raw_row) in row_lists.iter().enumerate() {
        let mut row = Vec::with_capacity(raw_row.len());
        for (c, raw_cell) in raw_row.iter().enumerate() {
            let cell = Cell::from_value(raw_cell).ok_or_else(|| Error::NonScalarCell {
                row: r,
                column: c,
                got: raw_cell.unwrap_metadata().kind(),
            })?;
            row.push(cell);
        }
        rows.push(row);
    }

    check_widths(fields.len(), rows.iter().map(Vec::len))?;

    Ok(Table { fields, rows })
}

fn check_names(fields: &[FieldDescriptor]) -> Result<()> {
    if let Some(field) = fields.iter().position(|f| f.name().is_empty()) {
        return Err(Error::EmptyFieldName { field });
    }

    let mut seen: HashMap<&str, usize> = HashMap::with_capacity(fields.len());
    for (i, f) in fields.iter().enumerate() {
        if let Some(&first) = seen.get(f.name()) {
            return Err(Error::DuplicateField {
                name: f.name().into(),
                first,
                second: i,
            });
        }
        seen.insert(f.name(), i);
    }
    Ok(())
}

fn check_widths(expected: usize, widths: impl Iterator<Item = usize>) -> Result<()> {
    for (row, got) in widths.enumerate() {
        if got != expected {
            return Err(Error::RowWidth { row, expected, got });
        }
    }
    Ok(())
}
