//! Shape assertions over wire values.
//!
//! Every payload validator in Mirra (tables here, change records in
//! `mirra-sync`) walks a `DynamicValue` with these helpers, so a given
//! mismatch is reported the same way wherever it is found.

use crate::error::{Error, Result, WirePath};
use crate::types::ValueKind;
use crate::value::{DynamicValue, MetaKey};
use alloc::vec::Vec;

/// Asserts that `value` is a string-keyed map and returns it unwrapped.
pub fn map<'a>(value: &'a DynamicValue, path: &WirePath) -> Result<&'a DynamicValue> {
    let inner = value.unwrap_metadata();
    match inner {
        DynamicValue::NamedMap(_) | DynamicValue::MetaMap(_) => Ok(inner),
        other => Err(Error::unexpected_kind(
            path.clone(),
            ValueKind::NamedMap,
            other.kind(),
        )),
    }
}

/// Asserts that `value` is a string-keyed map and returns its entries in
/// order. Integer keys of a meta map are skipped.
pub fn entries<'a>(value: &'a DynamicValue, path: &WirePath) -> Result<Vec<(&'a str, &'a DynamicValue)>> {
    match value.unwrap_metadata() {
        DynamicValue::NamedMap(m) => Ok(m.iter().map(|(k, v)| (k.as_str(), v)).collect()),
        DynamicValue::MetaMap(m) => Ok(m
            .iter()
            .filter_map(|(k, v)| match k {
                MetaKey::Name(name) => Some((name.as_str(), v)),
                _ => None,
            })
            .collect()),
        other => Err(Error::unexpected_kind(
            path.clone(),
            ValueKind::NamedMap,
            other.kind(),
        )),
    }
}

/// Returns the value under `key`, failing if it is absent.
///
/// `map` must already have passed [`map()`].
pub fn required<'a>(map: &'a DynamicValue, key: &str, path: &WirePath) -> Result<&'a DynamicValue> {
    map.get(key)
        .ok_or_else(|| Error::missing_key(path.clone(), key))
}

/// Returns the value under `key`, treating an explicit Null like absence.
pub fn optional<'a>(map: &'a DynamicValue, key: &str) -> Option<&'a DynamicValue> {
    map.get(key).filter(|v| !v.unwrap_metadata().is_null())
}

/// Asserts that `value` is a list and returns its items.
pub fn list<'a>(value: &'a DynamicValue, path: &WirePath) -> Result<&'a [DynamicValue]> {
    let inner = value.unwrap_metadata();
    inner
        .as_list()
        .ok_or_else(|| Error::unexpected_kind(path.clone(), ValueKind::List, inner.kind()))
}

/// Asserts that `value` is text and returns it.
pub fn text<'a>(value: &'a DynamicValue, path: &WirePath) -> Result<&'a str> {
    let inner = value.unwrap_metadata();
    inner
        .as_str()
        .ok_or_else(|| Error::unexpected_kind(path.clone(), ValueKind::Text, inner.kind()))
}

/// Asserts that `value` is an integer that fits in `i64`.
pub fn int(value: &DynamicValue, path: &WirePath) -> Result<i64> {
    match value.unwrap_metadata() {
        DynamicValue::Int(v) => Ok(*v),
        DynamicValue::UInt(v) => {
            i64::try_from(*v).map_err(|_| Error::IntegerOutOfRange { path: path.clone() })
        }
        other => Err(Error::unexpected_kind(path.clone(), ValueKind::Int, other.kind())),
    }
}
