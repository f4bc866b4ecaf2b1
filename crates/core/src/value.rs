//! Dynamic wire value definitions for Mirra.
//!
//! This module defines the `DynamicValue` enum, the recursive value type the
//! wire deserializer produces before any schema has been applied to it.

use crate::types::ValueKind;
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

/// A fixed-point decimal number: `mantissa * 10^-scale`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Decimal {
    mantissa: i128,
    scale: u32,
}

impl Decimal {
    /// Creates a decimal from its mantissa and scale.
    pub const fn new(mantissa: i128, scale: u32) -> Self {
        Self { mantissa, scale }
    }

    /// Returns the unscaled mantissa.
    #[inline]
    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    /// Returns the number of fractional digits.
    #[inline]
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Returns the closest `f64`.
    pub fn to_f64(&self) -> f64 {
        let mut divisor = 1.0f64;
        for _ in 0..self.scale {
            divisor *= 10.0;
        }
        self.mantissa as f64 / divisor
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let digits = self.mantissa.unsigned_abs().to_string();
        let scale = self.scale as usize;
        let sign = if self.mantissa < 0 { "-" } else { "" };
        if digits.len() > scale {
            let (int, frac) = digits.split_at(digits.len() - scale);
            write!(f, "{}{}.{}", sign, int, frac)
        } else {
            write!(f, "{}0.", sign)?;
            for _ in digits.len()..scale {
                f.write_str("0")?;
            }
            f.write_str(&digits)
        }
    }
}

/// Key of a meta map: either a name or an integer index.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetaKey {
    /// Integer key
    Index(i64),
    /// String key
    Name(String),
}

impl From<&str> for MetaKey {
    fn from(v: &str) -> Self {
        MetaKey::Name(v.to_string())
    }
}

impl From<String> for MetaKey {
    fn from(v: String) -> Self {
        MetaKey::Name(v)
    }
}

impl From<i64> for MetaKey {
    fn from(v: i64) -> Self {
        MetaKey::Index(v)
    }
}

/// Map keyed by strings.
pub type NamedMap = BTreeMap<String, DynamicValue>;
/// Map keyed by integers.
pub type IndexedMap = BTreeMap<i64, DynamicValue>;
/// Map keyed by strings or integers.
pub type MetaMap = BTreeMap<MetaKey, DynamicValue>;

/// A self-describing value as it arrives off the wire.
#[derive(Clone, Debug)]
pub enum DynamicValue {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit unsigned integer
    UInt(u64),
    /// 64-bit floating point
    Double(f64),
    /// Fixed-point decimal
    Decimal(Decimal),
    /// Binary data
    Blob(Vec<u8>),
    /// UTF-8 string
    Text(String),
    /// Timestamp in milliseconds since the Unix epoch
    DateTime(i64),
    /// Ordered list
    List(Vec<DynamicValue>),
    /// String-keyed map
    NamedMap(NamedMap),
    /// Integer-keyed map
    IndexedMap(IndexedMap),
    /// Mixed string/integer keyed map
    MetaMap(MetaMap),
    /// A value with an attached metadata map
    WithMetadata {
        meta: MetaMap,
        value: Box<DynamicValue>,
    },
}

impl DynamicValue {
    /// Returns the variant tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            DynamicValue::Null => ValueKind::Null,
            DynamicValue::Bool(_) => ValueKind::Bool,
            DynamicValue::Int(_) => ValueKind::Int,
            DynamicValue::UInt(_) => ValueKind::UInt,
            DynamicValue::Double(_) => ValueKind::Double,
            DynamicValue::Decimal(_) => ValueKind::Decimal,
            DynamicValue::Blob(_) => ValueKind::Blob,
            DynamicValue::Text(_) => ValueKind::Text,
            DynamicValue::DateTime(_) => ValueKind::DateTime,
            DynamicValue::List(_) => ValueKind::List,
            DynamicValue::NamedMap(_) => ValueKind::NamedMap,
            DynamicValue::IndexedMap(_) => ValueKind::IndexedMap,
            DynamicValue::MetaMap(_) => ValueKind::MetaMap,
            DynamicValue::WithMetadata { .. } => ValueKind::WithMetadata,
        }
    }

    /// Wraps a value with a metadata map.
    pub fn with_metadata(meta: MetaMap, value: DynamicValue) -> Self {
        DynamicValue::WithMetadata {
            meta,
            value: Box::new(value),
        }
    }

    /// Builds a named map from key/value pairs.
    pub fn named_map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<DynamicValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        DynamicValue::NamedMap(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Builds a list from values.
    pub fn list<V, I>(items: I) -> Self
    where
        V: Into<DynamicValue>,
        I: IntoIterator<Item = V>,
    {
        DynamicValue::List(items.into_iter().map(Into::into).collect())
    }

    /// Returns true if this value is Null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, DynamicValue::Null)
    }

    /// Looks through any number of metadata wrappers to the wrapped value.
    pub fn unwrap_metadata(&self) -> &DynamicValue {
        let mut current = self;
        while let DynamicValue::WithMetadata { value, .. } = current {
            current = value;
        }
        current
    }

    /// Returns the metadata map if this value is wrapped.
    pub fn metadata(&self) -> Option<&MetaMap> {
        match self {
            DynamicValue::WithMetadata { meta, .. } => Some(meta),
            _ => None,
        }
    }

    /// Returns the boolean if this is a Bool, None otherwise.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DynamicValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as `i64` if this is an Int, or a UInt that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DynamicValue::Int(v) => Some(*v),
            DynamicValue::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Returns the value as `u64` if this is a UInt, or a non-negative Int.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            DynamicValue::UInt(v) => Some(*v),
            DynamicValue::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Returns the value as `f64` if this is any numeric kind.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DynamicValue::Double(v) => Some(*v),
            DynamicValue::Int(v) => Some(*v as f64),
            DynamicValue::UInt(v) => Some(*v as f64),
            DynamicValue::Decimal(d) => Some(d.to_f64()),
            _ => None,
        }
    }

    /// Returns the decimal if this is a Decimal, None otherwise.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            DynamicValue::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is Text, None otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DynamicValue::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Returns the timestamp if this is a DateTime, None otherwise.
    pub fn as_datetime(&self) -> Option<i64> {
        match self {
            DynamicValue::DateTime(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a reference to the bytes if this is a Blob, None otherwise.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            DynamicValue::Blob(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Returns the items if this is a List, None otherwise.
    pub fn as_list(&self) -> Option<&[DynamicValue]> {
        match self {
            DynamicValue::List(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Returns the map if this is a NamedMap, None otherwise.
    pub fn as_named_map(&self) -> Option<&NamedMap> {
        match self {
            DynamicValue::NamedMap(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the map if this is an IndexedMap, None otherwise.
    pub fn as_indexed_map(&self) -> Option<&IndexedMap> {
        match self {
            DynamicValue::IndexedMap(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the map if this is a MetaMap, None otherwise.
    pub fn as_meta_map(&self) -> Option<&MetaMap> {
        match self {
            DynamicValue::MetaMap(m) => Some(m),
            _ => None,
        }
    }

    /// Looks up a string key in a NamedMap or MetaMap.
    ///
    /// Metadata wrappers around `self` are looked through.
    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        match self.unwrap_metadata() {
            DynamicValue::NamedMap(m) => m.get(key),
            DynamicValue::MetaMap(m) => m.get(&MetaKey::Name(key.to_string())),
            _ => None,
        }
    }
}

impl PartialEq for DynamicValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DynamicValue::Null, DynamicValue::Null) => true,
            (DynamicValue::Bool(a), DynamicValue::Bool(b)) => a == b,
            (DynamicValue::Int(a), DynamicValue::Int(b)) => a == b,
            (DynamicValue::UInt(a), DynamicValue::UInt(b)) => a == b,
            (DynamicValue::Double(a), DynamicValue::Double(b)) => {
                // Handle NaN comparison
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (DynamicValue::Decimal(a), DynamicValue::Decimal(b)) => a == b,
            (DynamicValue::Blob(a), DynamicValue::Blob(b)) => a == b,
            (DynamicValue::Text(a), DynamicValue::Text(b)) => a == b,
            (DynamicValue::DateTime(a), DynamicValue::DateTime(b)) => a == b,
            (DynamicValue::List(a), DynamicValue::List(b)) => a == b,
            (DynamicValue::NamedMap(a), DynamicValue::NamedMap(b)) => a == b,
            (DynamicValue::IndexedMap(a), DynamicValue::IndexedMap(b)) => a == b,
            (DynamicValue::MetaMap(a), DynamicValue::MetaMap(b)) => a == b,
            (
                DynamicValue::WithMetadata { meta: ma, value: va },
                DynamicValue::WithMetadata { meta: mb, value: vb },
            ) => ma == mb && va == vb,
            _ => false,
        }
    }
}

impl From<bool> for DynamicValue {
    fn from(v: bool) -> Self {
        DynamicValue::Bool(v)
    }
}

impl From<i32> for DynamicValue {
    fn from(v: i32) -> Self {
        DynamicValue::Int(v as i64)
    }
}

impl From<i64> for DynamicValue {
    fn from(v: i64) -> Self {
        DynamicValue::Int(v)
    }
}

impl From<u64> for DynamicValue {
    fn from(v: u64) -> Self {
        DynamicValue::UInt(v)
    }
}

impl From<f64> for DynamicValue {
    fn from(v: f64) -> Self {
        DynamicValue::Double(v)
    }
}

impl From<Decimal> for DynamicValue {
    fn from(v: Decimal) -> Self {
        DynamicValue::Decimal(v)
    }
}

impl From<String> for DynamicValue {
    fn from(v: String) -> Self {
        DynamicValue::Text(v)
    }
}

impl From<&str> for DynamicValue {
    fn from(v: &str) -> Self {
        DynamicValue::Text(v.to_string())
    }
}

impl From<Vec<u8>> for DynamicValue {
    fn from(v: Vec<u8>) -> Self {
        DynamicValue::Blob(v)
    }
}

impl From<Vec<DynamicValue>> for DynamicValue {
    fn from(v: Vec<DynamicValue>) -> Self {
        DynamicValue::List(v)
    }
}

impl From<NamedMap> for DynamicValue {
    fn from(v: NamedMap) -> Self {
        DynamicValue::NamedMap(v)
    }
}

impl<T> From<Option<T>> for DynamicValue
where
    T: Into<DynamicValue>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => DynamicValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_value_kind() {
        assert_eq!(DynamicValue::Int(42).kind(), ValueKind::Int);
        assert_eq!(DynamicValue::Null.kind(), ValueKind::Null);
        assert_eq!(DynamicValue::list([1i64, 2]).kind(), ValueKind::List);
        assert_eq!(
            DynamicValue::with_metadata(MetaMap::new(), DynamicValue::Null).kind(),
            ValueKind::WithMetadata
        );
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(DynamicValue::Bool(true).as_bool(), Some(true));
        assert_eq!(DynamicValue::Int(-3).as_i64(), Some(-3));
        assert_eq!(DynamicValue::UInt(7).as_i64(), Some(7));
        assert_eq!(DynamicValue::UInt(u64::MAX).as_i64(), None);
        assert_eq!(DynamicValue::Int(-1).as_u64(), None);
        assert_eq!(DynamicValue::Double(1.5).as_f64(), Some(1.5));
        assert_eq!(DynamicValue::Text("hi".into()).as_str(), Some("hi"));
        assert_eq!(DynamicValue::DateTime(1000).as_datetime(), Some(1000));
        assert_eq!(DynamicValue::Blob(vec![1, 2]).as_bytes(), Some(&[1u8, 2][..]));
        assert_eq!(DynamicValue::Text("1".into()).as_i64(), None);
    }

    #[test]
    fn test_unwrap_metadata_nested() {
        let mut meta = MetaMap::new();
        meta.insert(MetaKey::from("type"), DynamicValue::from("Table"));
        let inner = DynamicValue::from("payload");
        let wrapped = DynamicValue::with_metadata(
            meta.clone(),
            DynamicValue::with_metadata(meta, inner.clone()),
        );
        assert_eq!(wrapped.unwrap_metadata(), &inner);
        assert!(wrapped.metadata().is_some());
        assert!(inner.metadata().is_none());
    }

    #[test]
    fn test_get_through_metadata() {
        let map = DynamicValue::named_map([("id", 5i64)]);
        let wrapped = DynamicValue::with_metadata(MetaMap::new(), map);
        assert_eq!(wrapped.get("id"), Some(&DynamicValue::Int(5)));
        assert_eq!(wrapped.get("missing"), None);

        let mut meta_map = MetaMap::new();
        meta_map.insert(MetaKey::from("name"), DynamicValue::from("x"));
        meta_map.insert(MetaKey::from(3i64), DynamicValue::from("y"));
        let mm = DynamicValue::MetaMap(meta_map);
        assert_eq!(mm.get("name"), Some(&DynamicValue::from("x")));
    }

    #[test]
    fn test_value_equality() {
        assert_eq!(DynamicValue::Double(f64::NAN), DynamicValue::Double(f64::NAN));
        assert_ne!(DynamicValue::Int(1), DynamicValue::UInt(1));
        assert_eq!(
            DynamicValue::list(["a", "b"]),
            DynamicValue::List(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_decimal() {
        let d = Decimal::new(12345, 2);
        assert_eq!(d.to_string(), "123.45");
        assert_eq!(Decimal::new(-5, 3).to_string(), "-0.005");
        assert_eq!(Decimal::new(42, 0).to_string(), "42");
        assert!((d.to_f64() - 123.45).abs() < 1e-9);
        assert_eq!(DynamicValue::from(d).as_decimal(), Some(d));
    }

    #[test]
    fn test_value_from_impls() {
        let v: DynamicValue = Some(10i64).into();
        assert_eq!(v.as_i64(), Some(10));

        let v: DynamicValue = None::<i64>.into();
        assert!(v.is_null());

        let v: DynamicValue = vec![1u8, 2, 3].into();
        assert_eq!(v.kind(), ValueKind::Blob);
    }
}
