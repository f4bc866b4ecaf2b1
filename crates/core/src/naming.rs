//! Field name normalization.
//!
//! Wire column names are lower_snake_case; application records usually expect
//! lowerCamelCase. The conversion is a pure rename applied identically to bulk
//! loads and to change records, so both land on the same names.

use alloc::borrow::Cow;
use alloc::string::String;

/// How wire field names are presented to application records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FieldNaming {
    /// Names are used as sent.
    #[default]
    Verbatim,
    /// `first_name` becomes `firstName`.
    CamelCase,
}

impl FieldNaming {
    /// Applies this naming convention to a wire field name.
    pub fn rename<'a>(&self, name: &'a str) -> Cow<'a, str> {
        match self {
            FieldNaming::Verbatim => Cow::Borrowed(name),
            FieldNaming::CamelCase => {
                if !name.contains('_') {
                    return Cow::Borrowed(name);
                }
                Cow::Owned(snake_to_camel(name))
            }
        }
    }
}

fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut parts = name.split('_').filter(|p| !p.is_empty());
    if let Some(first) = parts.next() {
        out.push_str(first);
    }
    for part in parts {
        let mut chars = part.chars();
        if let Some(c) = chars.next() {
            out.extend(c.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
