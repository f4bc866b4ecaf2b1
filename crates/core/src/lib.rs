//! Mirra Core - Wire values, table validation and table access for Mirra.
//!
//! This crate provides the foundational types every other Mirra crate builds on:
//!
//! - `DynamicValue`: The recursive, self-describing value produced by the wire
//!   deserializer (scalars, blobs, lists, three map variants, metadata wrappers)
//! - `Cell`: The scalar subset of `DynamicValue` allowed inside a table row
//! - `schema`: Validated tables (`Table`, `FieldDescriptor`) and `validate_table`
//! - `TableAccessor`: Indexed row/column lookup and `Record` materialization
//! - `Error` / `LookupError`: Validation failures and accessor misuse
//!
//! # Example
//!
//! ```rust
//! use mirra_core::{validate_table, Cell, DynamicValue, FieldNaming, TableAccessor};
//!
//! let wire = DynamicValue::named_map([
//!     ("fields", DynamicValue::list([
//!         DynamicValue::named_map([("name", "id")]),
//!         DynamicValue::named_map([("name", "first_name")]),
//!     ])),
//!     ("rows", DynamicValue::list([
//!         DynamicValue::list([DynamicValue::Int(1), DynamicValue::from("Jane")]),
//!     ])),
//! ]);
//!
//! let table = validate_table(&wire).unwrap();
//! let accessor = TableAccessor::with_naming(table, FieldNaming::CamelCase);
//!
//! assert_eq!(accessor.get(0, "first_name"), &Cell::from("Jane"));
//! assert_eq!(accessor.record_at(0).get("firstName"), Some(&Cell::from("Jane")));
//! ```

#![no_std]

extern crate alloc;

mod accessor;
mod cell;
mod error;
mod naming;
mod record;
pub mod schema;
pub mod shape;
mod types;
mod value;

pub use accessor::{FieldRef, TableAccessor};
pub use cell::{Cell, Number};
pub use error::{Error, ErrorKind, LookupError, Result, Segment, WirePath};
pub use naming::FieldNaming;
pub use record::Record;
pub use schema::{validate_table, FieldDescriptor, Row, Table};
pub use types::ValueKind;
pub use value::{Decimal, DynamicValue, IndexedMap, MetaKey, MetaMap, NamedMap};
