//! Composite application records.
//!
//! A composite is one item of a mirrored collection, built from a row of each
//! source table in a join. Applications either define a typed composite and
//! implement [`Composite`] for it, or use the untyped [`CompositeRecord`].

use crate::error::FieldError;
use crate::identity::Side;
use alloc::rc::Rc;
use alloc::string::String;
use mirra_core::{Cell, Record, ValueKind};

/// An item the reconciler can match and patch.
pub trait Composite: Clone {
    /// Returns the row id this composite carries for the source table on
    /// `side`.
    fn identity(&self, side: Side) -> i64;

    /// Overwrites a field with a new value; `Cell::Null` clears it.
    ///
    /// Fields the composite does not hold are ignored. A value the field
    /// cannot hold is rejected with a [`FieldError`].
    fn set_field(&mut self, name: &str, value: &Cell) -> Result<(), FieldError>;
}

/// Names of the fields holding the two ids of a [`CompositeRecord`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdFields {
    pub primary: String,
    pub secondary: String,
}

impl IdFields {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }
}

/// An untyped composite: two ids and an ordered name -> cell map.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeRecord {
    primary_id: i64,
    secondary_id: i64,
    /// Shared by every record of a collection
    id_fields: Option<Rc<IdFields>>,
    fields: Record,
}

impl CompositeRecord {
    /// Creates a composite with explicit ids.
    ///
    /// The ids are not tied to any field, so no field update moves them.
    pub fn new(primary_id: i64, secondary_id: i64, fields: Record) -> Self {
        Self {
            primary_id,
            secondary_id,
            id_fields: None,
            fields,
        }
    }

    /// Builds a composite from a joined record, reading its ids from the
    /// fields named in `id_fields`.
    ///
    /// Updating one of those fields later moves the matching id with it.
    pub fn from_record(fields: Record, id_fields: Rc<IdFields>) -> Result<Self, FieldError> {
        let primary_id = read_id(&fields, &id_fields.primary)?;
        let secondary_id = read_id(&fields, &id_fields.secondary)?;
        Ok(Self {
            primary_id,
            secondary_id,
            id_fields: Some(id_fields),
            fields,
        })
    }

    /// Returns the primary id.
    #[inline]
    pub fn primary_id(&self) -> i64 {
        self.primary_id
    }

    /// Returns the secondary id.
    #[inline]
    pub fn secondary_id(&self) -> i64 {
        self.secondary_id
    }

    /// Returns a field.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.fields.get(name)
    }

    /// Returns all fields.
    #[inline]
    pub fn fields(&self) -> &Record {
        &self.fields
    }
}

fn read_id(fields: &Record, name: &str) -> Result<i64, FieldError> {
    match fields.get(name) {
        Some(cell) => read_id_cell(name, cell),
        None => Err(FieldError::new(name, ValueKind::Int, ValueKind::Null)),
    }
}

impl Composite for CompositeRecord {
    fn identity(&self, side: Side) -> i64 {
        match side {
            Side::Primary => self.primary_id,
            Side::Secondary => self.secondary_id,
        }
    }

    fn set_field(&mut self, name: &str, value: &Cell) -> Result<(), FieldError> {
        if !self.fields.contains(name) {
            return Ok(());
        }
        if let Some(ids) = &self.id_fields {
            if name == ids.primary {
                self.primary_id = read_id_cell(name, value)?;
            } else if name == ids.secondary {
                self.secondary_id = read_id_cell(name, value)?;
            }
        }
        self.fields.insert(name, value.clone());
        Ok(())
    }
}

fn read_id_cell(name: &str, value: &Cell) -> Result<i64, FieldError> {
    value
        .as_i64()
        .ok_or_else(|| FieldError::new(name, ValueKind::Int, value.kind()))
}
