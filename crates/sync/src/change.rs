//! Change records.
//!
//! A change record is the server's notification that one row of a source
//! table was inserted, updated or deleted. The wire shape is
//!
//! ```text
//! {"table": "runs", "id": 17, "op": "Update",
//!  "record": {"start_time": 1700000000000, "si_id": null}, "issuer": "desk-2"}
//! ```
//!
//! A field absent from `record` is "not part of this change"; a field present
//! with `null` is "explicitly cleared".

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use core::fmt;
use mirra_core::{shape, Cell, DynamicValue, Error, Record, Result, WirePath};

/// Kind of row change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

impl ChangeOp {
    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeOp::Insert => "Insert",
            ChangeOp::Update => "Update",
            ChangeOp::Delete => "Delete",
        }
    }

    /// Parses a wire name. Matching is exact.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Insert" => Some(ChangeOp::Insert),
            "Update" => Some(ChangeOp::Update),
            "Delete" => Some(ChangeOp::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for ChangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated change notification for one row of a source table.
#[derive(Clone, Debug, PartialEq)]
pub struct ChangeRecord {
    /// Source table name
    pub table: String,
    /// Row id in the source table's id space
    pub id: i64,
    pub op: ChangeOp,
    /// Changed fields by wire name; `Cell::Null` clears a field
    pub fields: BTreeMap<String, Cell>,
    /// Who made the change; empty when the server did not say
    pub issuer: String,
}

impl ChangeRecord {
    /// Creates a change record without fields.
    pub fn new(table: impl Into<String>, id: i64, op: ChangeOp) -> Self {
        Self {
            table: table.into(),
            id,
            op,
            fields: BTreeMap::new(),
            issuer: String::new(),
        }
    }

    /// Creates an update change.
    pub fn update(table: impl Into<String>, id: i64) -> Self {
        Self::new(table, id, ChangeOp::Update)
    }

    /// Creates a delete change.
    pub fn delete(table: impl Into<String>, id: i64) -> Self {
        Self::new(table, id, ChangeOp::Delete)
    }

    /// Creates an insert change.
    pub fn insert(table: impl Into<String>, id: i64) -> Self {
        Self::new(table, id, ChangeOp::Insert)
    }

    /// Adds a changed field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Cell>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Returns the new value of a field, if this change carries it.
    #[inline]
    pub fn field(&self, name: &str) -> Option<&Cell> {
        self.fields.get(name)
    }

    /// Renders the wire shape.
    pub fn to_value(&self) -> DynamicValue {
        let record = DynamicValue::named_map(
            self.fields
                .iter()
                .map(|(name, cell)| (name.as_str(), cell.to_value())),
        );
        DynamicValue::named_map([
            ("table", DynamicValue::from(self.table.as_str())),
            ("id", DynamicValue::Int(self.id)),
            ("record", record),
            ("op", DynamicValue::from(self.op.as_str())),
            ("issuer", DynamicValue::from(self.issuer.as_str())),
        ])
    }
}

/// Validates a wire value as a change record.
///
/// The fields map is read from `record`, or from `fields` when `record` is
/// absent; a payload with neither is a change without fields. Field values
/// follow the same scalar rule as table cells.
pub fn parse_change(value: &DynamicValue) -> Result<ChangeRecord> {
    let root = WirePath::root();
    let map = shape::map(value, &root)?;

    let table = shape::text(shape::required(map, "table", &root)?, &root.key("table"))?;
    let id = shape::int(shape::required(map, "id", &root)?, &root.key("id"))?;

    let op_path = root.key("op");
    let op_name = shape::text(shape::required(map, "op", &root)?, &op_path)?;
    let op = ChangeOp::parse(op_name).ok_or_else(|| Error::UnknownOperation {
        path: op_path,
        op: op_name.to_string(),
    })?;

    let issuer = match shape::optional(map, "issuer") {
        Some(raw) => shape::text(raw, &root.key("issuer"))?.to_string(),
        None => String::new(),
    };

    let mut change = ChangeRecord::new(table, id, op).with_issuer(issuer);
    if op == ChangeOp::Delete {
        return Ok(change);
    }

    let fields = ["record", "fields"]
        .into_iter()
        .find_map(|key| shape::optional(map, key).map(|raw| (key, raw)));
    if let Some((key, raw)) = fields {
        let record = Record::from_value_at(raw, &root.key(key))?;
        change.fields = record.into_iter().collect();
    }
    Ok(change)
}
