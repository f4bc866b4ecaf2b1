//! Schema module for Mirra.
//!
//! This module contains the shape of a validated table: its field
//! descriptors, its rows, and the validator that proves a wire value has
//! that shape.

mod field;
mod table;

pub use field::FieldDescriptor;
pub use table::{validate_table, Row, Table};
