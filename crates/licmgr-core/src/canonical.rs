//! # Canonical Encoding: Deterministic Signing Input
//!
//! This module defines `CanonicalBytes`, the sole construction path for
//! bytes that are signed or verified anywhere in the license manager: usage
//! reports (client → manager), license descriptors and summaries (manager →
//! hardware signer), and persisted summaries (offline verifier).
//!
//! ## Security Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only way to
//! construct it is through `CanonicalBytes::new()` / `from_value()` /
//! `parse()`, all of which run the single encoder below. Any function that
//! signs or verifies accepts `&CanonicalBytes`, so a "wrong serializer"
//! signing path cannot be written.
//!
//! ## Encoding Rules
//!
//! 1. **Objects**: keys sorted ascending by Unicode code point at every
//!    nesting level. Rust `str` ordering compares UTF-8 bytes, which is the
//!    same order as code points.
//! 2. **Separators**: `,` and `:` with no whitespace anywhere.
//! 3. **Arrays**: element order preserved.
//! 4. **Strings**: `"` and `\` backslash-escaped; `\b \f \n \r \t` short
//!    escapes; every other code point below U+0020 as `\u00xx` (lowercase
//!    hex); everything else, including `/`, DEL and non-ASCII, raw UTF-8.
//! 5. **Numbers**: integers in plain decimal. Non-integer numbers are
//!    **rejected**: their textual form differs between runtimes.
//!
//! Clients that sort keys, drop whitespace and emit non-ASCII as raw UTF-8
//! produce the same bytes for every float-free value.
//!
//! The encoder does not delegate to `serde_json::to_string`: the key order
//! of `serde_json::Map` depends on whether the `preserve_order` feature is
//! unified into the build, so keys are sorted here explicitly.

use serde::Serialize;
use serde_json::{Number, Value};

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by the canonical encoder.
///
/// # Invariants
///
/// - Valid UTF-8, valid JSON.
/// - Object keys sorted by code point, compact separators.
/// - No floats.
/// - `CanonicalBytes::parse(x.as_bytes()) == x` (idempotent).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonically encode any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::FloatRejected` if the value contains a
    /// non-integer number, `CanonicalizationError::SerializationFailed` if
    /// the value cannot be represented as JSON.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Self::from_value(&value)
    }

    /// Canonically encode an untyped JSON value tree.
    pub fn from_value(value: &Value) -> Result<Self, CanonicalizationError> {
        let mut out = String::new();
        write_value(&mut out, value)?;
        Ok(Self(out.into_bytes()))
    }

    /// Parse arbitrary JSON text and re-encode it canonically.
    ///
    /// Formatting, whitespace and key order of the input are irrelevant.
    pub fn parse(json: &[u8]) -> Result<Self, CanonicalizationError> {
        let value: Value = serde_json::from_slice(json)?;
        Self::from_value(&value)
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the underlying buffer.
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn write_value(out: &mut String, value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => write_number(out, n)?,
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_value(out, item)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

fn write_number(out: &mut String, n: &Number) -> Result<(), CanonicalizationError> {
    if let Some(i) = n.as_i64() {
        out.push_str(&i.to_string());
    } else if let Some(u) = n.as_u64() {
        out.push_str(&u.to_string());
    } else {
        return Err(CanonicalizationError::FloatRejected(n.to_string()));
    }
    Ok(())
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn json_value_no_floats() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            any::<u64>().prop_map(|n| serde_json::json!(n)),
            "\\PC{0,20}".prop_map(Value::String),
            "[\\x00-\\x1f\"\\\\/]{0,8}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
                prop::collection::btree_map("\\PC{0,10}", inner, 0..8).prop_map(|m| {
                    Value::Object(m.into_iter().collect())
                }),
            ]
        })
    }

    /// Rebuild every object with its entries inserted in reverse order.
    fn reversed(value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut entries: Vec<(String, Value)> =
                    map.iter().map(|(k, v)| (k.clone(), reversed(v))).collect();
                entries.reverse();
                Value::Object(entries.into_iter().collect())
            }
            Value::Array(items) => Value::Array(items.iter().map(reversed).collect()),
            other => other.clone(),
        }
    }

    proptest! {
        #[test]
        fn canonical_bytes_idempotent(value in json_value_no_floats()) {
            let once = CanonicalBytes::from_value(&value).unwrap();
            let twice = CanonicalBytes::parse(once.as_bytes()).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn canonical_bytes_ignore_insertion_order(value in json_value_no_floats()) {
            let a = CanonicalBytes::from_value(&value).unwrap();
            let b = CanonicalBytes::from_value(&reversed(&value)).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn canonical_bytes_ignore_pretty_printing(value in json_value_no_floats()) {
            let pretty = serde_json::to_vec_pretty(&value).unwrap();
            let a = CanonicalBytes::from_value(&value).unwrap();
            let b = CanonicalBytes::parse(&pretty).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn canonical_bytes_round_trip_value(value in json_value_no_floats()) {
            let cb = CanonicalBytes::from_value(&value).unwrap();
            let parsed: Value = serde_json::from_slice(cb.as_bytes()).unwrap();
            prop_assert_eq!(parsed, value);
        }

        #[test]
        fn canonical_bytes_have_no_whitespace_outside_strings(
            keys in prop::collection::btree_set("[a-z]{1,8}", 1..6)
        ) {
            let map: serde_json::Map<String, Value> = keys
                .iter()
                .enumerate()
                .map(|(i, k)| (k.clone(), serde_json::json!([i, {"k": i}])))
                .collect();
            let cb = CanonicalBytes::from_value(&Value::Object(map)).unwrap();
            prop_assert!(!cb.as_bytes().iter().any(|b| b.is_ascii_whitespace()));
        }

        #[test]
        fn float_always_rejected(f in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
            let data = serde_json::json!({"val": f});
            prop_assert!(CanonicalBytes::new(&data).is_err());
        }
    }
}
