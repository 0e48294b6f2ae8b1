//! `AttributeValue`: a typed store value.
//!
//! On the wire a value is an object with a single type key, `{"S": "hello"}`
//! or `{"N": "42"}`, which is serde's externally tagged enum layout. Binary
//! payloads travel as base64 strings.
//!
//! Query documents are plain JSON, so this module also converts between
//! `serde_json::Value` and attribute values.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A typed attribute value.
///
/// Numbers are kept as decimal strings so no precision is lost in transit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// String.
    S(String),
    /// Number, decimal string.
    N(String),
    /// Binary.
    B(#[serde(with = "base64_bytes")] bytes::Bytes),
    /// String set.
    #[serde(rename = "SS")]
    Ss(Vec<String>),
    /// Number set, decimal strings.
    #[serde(rename = "NS")]
    Ns(Vec<String>),
    /// Binary set.
    #[serde(rename = "BS", with = "base64_bytes_list")]
    Bs(Vec<bytes::Bytes>),
    /// Boolean.
    #[serde(rename = "BOOL")]
    Bool(bool),
    /// Null marker; always `true` when produced by this crate.
    #[serde(rename = "NULL")]
    Null(bool),
    /// Ordered list.
    L(Vec<AttributeValue>),
    /// Nested map.
    M(HashMap<String, AttributeValue>),
}

impl AttributeValue {
    /// An empty list, used as the default operand for `list_append`.
    #[must_use]
    pub fn empty_list() -> Self {
        Self::L(Vec::new())
    }

    /// Convert a JSON document value.
    ///
    /// Arrays become lists and objects become maps; sets are never inferred.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null(true),
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::N(n.to_string()),
            Value::String(s) => Self::S(s.clone()),
            Value::Array(items) => Self::L(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => Self::M(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert back into a JSON document value.
    ///
    /// Sets become arrays and binary data becomes a base64 string. Map keys
    /// are emitted in sorted order at every depth. Returns `None` if a number
    /// is malformed or would lose digits as a JSON number.
    #[must_use]
    pub fn to_json(&self) -> Option<Value> {
        let value = match self {
            Self::S(s) => Value::String(s.clone()),
            Self::N(n) => number_to_json(n)?,
            Self::B(b) => Value::String(base64_bytes::encode(b)),
            Self::Ss(v) => Value::Array(v.iter().cloned().map(Value::String).collect()),
            Self::Ns(v) => Value::Array(
                v.iter()
                    .map(|n| number_to_json(n))
                    .collect::<Option<_>>()?,
            ),
            Self::Bs(v) => Value::Array(
                v.iter()
                    .map(|b| Value::String(base64_bytes::encode(b)))
                    .collect(),
            ),
            Self::Bool(b) => Value::Bool(*b),
            Self::Null(_) => Value::Null,
            Self::L(items) => Value::Array(items.iter().map(Self::to_json).collect::<Option<_>>()?),
            Self::M(map) => {
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
                Value::Object(
                    entries
                        .into_iter()
                        .map(|(k, v)| v.to_json().map(|v| (k.clone(), v)))
                        .collect::<Option<_>>()?,
                )
            }
        };
        Some(value)
    }

    /// The wire type key ("S", "N", "BOOL", ...).
    #[must_use]
    pub fn type_descriptor(&self) -> &'static str {
        match self {
            Self::S(_) => "S",
            Self::N(_) => "N",
            Self::B(_) => "B",
            Self::Ss(_) => "SS",
            Self::Ns(_) => "NS",
            Self::Bs(_) => "BS",
            Self::Bool(_) => "BOOL",
            Self::Null(_) => "NULL",
            Self::L(_) => "L",
            Self::M(_) => "M",
        }
    }
}

impl From<&Value> for AttributeValue {
    fn from(value: &Value) -> Self {
        Self::from_json(value)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json() {
            Some(json) => write!(f, "{}({json})", self.type_descriptor()),
            None => write!(f, "{}(?)", self.type_descriptor()),
        }
    }
}

/// Parse a decimal string, preferring integers so `"5"` stays `5`.
///
/// Anything else goes through `f64`, which is only accepted when it denotes
/// the same decimal as the input.
fn number_to_json(n: &str) -> Option<Value> {
    if let Ok(i) = n.parse::<i64>() {
        return Some(Value::from(i));
    }
    if let Ok(u) = n.parse::<u64>() {
        return Some(Value::from(u));
    }
    let f = n.parse::<f64>().ok()?;
    let exact = normalize_decimal(n)? == normalize_decimal(&f.to_string())?;
    exact
        .then(|| serde_json::Number::from_f64(f))
        .flatten()
        .map(Value::Number)
}

/// Sign, significant digits and power of ten of a decimal literal, so
/// `"1.50"`, `"15e-1"` and `"1.5"` all normalize alike.
fn normalize_decimal(n: &str) -> Option<(bool, String, i64)> {
    let (negative, unsigned) = match n.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, n.strip_prefix('+').unwrap_or(n)),
    };
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((m, e)) => (m, e.parse::<i64>().ok()?),
        None => (unsigned, 0),
    };
    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int.is_empty() && frac.is_empty() {
        return None;
    }
    if !int.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }

    let all = format!("{int}{frac}");
    let significant = all.trim_start_matches('0');
    let digits = significant.trim_end_matches('0');
    if digits.is_empty() {
        return Some((false, String::new(), 0));
    }
    let trailing = i64::try_from(significant.len() - digits.len()).ok()?;
    let scale = i64::try_from(frac.len()).ok()?;
    Some((negative, digits.to_owned(), exponent - scale + trailing))
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub(super) fn encode(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    pub(super) fn decode<E: de::Error>(encoded: &str) -> Result<bytes::Bytes, E> {
        STANDARD
            .decode(encoded)
            .map(bytes::Bytes::from)
            .map_err(E::custom)
    }

    pub(super) fn serialize<S: Serializer>(
        bytes: &bytes::Bytes,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<bytes::Bytes, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        decode(&encoded)
    }
}

mod base64_bytes_list {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::base64_bytes::{decode, encode};

    pub(super) fn serialize<S: Serializer>(
        list: &[bytes::Bytes],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(list.iter().map(|b| encode(b)))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<bytes::Bytes>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|encoded| decode(encoded))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_should_convert_scalars_from_json() {
        assert_eq!(
            AttributeValue::from_json(&json!("a")),
            AttributeValue::S("a".to_owned())
        );
        assert_eq!(
            AttributeValue::from_json(&json!(-3)),
            AttributeValue::N("-3".to_owned())
        );
        assert_eq!(
            AttributeValue::from_json(&json!(1.5)),
            AttributeValue::N("1.5".to_owned())
        );
        assert_eq!(
            AttributeValue::from_json(&json!(null)),
            AttributeValue::Null(true)
        );
        assert_eq!(
            AttributeValue::from(&json!(false)),
            AttributeValue::Bool(false)
        );
    }

    #[test]
    fn test_should_convert_nested_document_from_json() {
        let val = AttributeValue::from_json(&json!({"tags": ["a", 1], "meta": {"x": true}}));
        let AttributeValue::M(map) = val else {
            panic!("expected map");
        };
        assert_eq!(
            map["tags"],
            AttributeValue::L(vec![
                AttributeValue::S("a".to_owned()),
                AttributeValue::N("1".to_owned()),
            ])
        );
        assert!(matches!(
            &map["meta"],
            AttributeValue::M(m) if m["x"] == AttributeValue::Bool(true)
        ));
    }

    #[test]
    fn test_should_convert_sets_and_binary_to_json() {
        let ss = AttributeValue::Ss(vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(ss.to_json(), Some(json!(["a", "b"])));

        let ns = AttributeValue::Ns(vec!["1".to_owned(), "2.5".to_owned()]);
        assert_eq!(ns.to_json(), Some(json!([1, 2.5])));

        let b = AttributeValue::B(bytes::Bytes::from_static(b"hi"));
        assert_eq!(b.to_json(), Some(json!("aGk=")));
    }

    #[test]
    fn test_should_reject_unparseable_number_in_to_json() {
        assert_eq!(AttributeValue::N("abc".to_owned()).to_json(), None);
        let list = AttributeValue::L(vec![AttributeValue::N("abc".to_owned())]);
        assert_eq!(list.to_json(), None);
    }

    #[test]
    fn test_should_reject_numbers_that_lose_digits_as_json() {
        let big = AttributeValue::N("12345678901234567890123".to_owned());
        assert_eq!(big.to_json(), None);
        let precise = AttributeValue::N("0.12345678901234567890123".to_owned());
        assert_eq!(precise.to_json(), None);
        let set = AttributeValue::Ns(vec!["1".to_owned(), "12345678901234567890123".to_owned()]);
        assert_eq!(set.to_json(), None);
    }

    #[test]
    fn test_should_keep_exact_non_integer_numbers() {
        assert_eq!(AttributeValue::N("1.5".to_owned()).to_json(), Some(json!(1.5)));
        assert_eq!(AttributeValue::N("1.50".to_owned()).to_json(), Some(json!(1.5)));
        assert_eq!(AttributeValue::N("-0.25".to_owned()).to_json(), Some(json!(-0.25)));
        assert_eq!(AttributeValue::N("1e3".to_owned()).to_json(), Some(json!(1000.0)));
        assert_eq!(
            AttributeValue::N("18446744073709551615".to_owned()).to_json(),
            Some(json!(u64::MAX))
        );
    }

    #[test]
    fn test_should_sort_nested_map_keys() {
        let val = AttributeValue::from_json(&json!({
            "outer": {"b": 1, "a": {"z": 1, "y": 2}, "c": 3}
        }));
        let json = serde_json::to_string(&val.to_json().unwrap()).unwrap();
        assert_eq!(json, r#"{"outer":{"a":{"y":2,"z":1},"b":1,"c":3}}"#);
    }

    #[test]
    fn test_should_serialize_with_type_keys() {
        let val = AttributeValue::L(vec![
            AttributeValue::S("a".to_owned()),
            AttributeValue::N("1".to_owned()),
            AttributeValue::Null(true),
            AttributeValue::Ss(vec!["x".to_owned()]),
        ]);
        let json = serde_json::to_string(&val).unwrap();
        assert_eq!(
            json,
            r#"{"L":[{"S":"a"},{"N":"1"},{"NULL":true},{"SS":["x"]}]}"#
        );
        assert_eq!(
            serde_json::to_string(&AttributeValue::empty_list()).unwrap(),
            r#"{"L":[]}"#
        );
    }

    #[test]
    fn test_should_encode_binary_as_base64() {
        let val = AttributeValue::Bs(vec![bytes::Bytes::from_static(b"hi")]);
        assert_eq!(serde_json::to_string(&val).unwrap(), r#"{"BS":["aGk="]}"#);

        let back: AttributeValue = serde_json::from_str(r#"{"B":"aGk="}"#).unwrap();
        assert_eq!(back, AttributeValue::B(bytes::Bytes::from_static(b"hi")));
    }

    #[test]
    fn test_should_deserialize_number_set() {
        let val: AttributeValue = serde_json::from_str(r#"{"NS":["1","2","3"]}"#).unwrap();
        assert!(matches!(val, AttributeValue::Ns(ref v) if v.len() == 3));
    }

    #[test]
    fn test_should_reject_unknown_type_key_and_bad_base64() {
        assert!(serde_json::from_str::<AttributeValue>(r#"{"X":"1"}"#).is_err());
        assert!(serde_json::from_str::<AttributeValue>(r#"{"B":"***"}"#).is_err());
    }

    #[test]
    fn test_should_display_with_type_descriptor() {
        assert_eq!(AttributeValue::N("5".to_owned()).to_string(), "N(5)");
        assert_eq!(AttributeValue::S("a".to_owned()).to_string(), r#"S("a")"#);
    }
}
