/*!
# JSON Values

Defines the JSON document tree produced by the [decoder](crate::decoder) and
consumed by the [encoder](crate::encoder).

Numbers keep their source lexeme, so a decoded document re-encodes without
losing precision. They are coerced to `i64` or `f64` only on request.
*/
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::{self, Display};

use crate::decoder::{self, DecodeError};
use crate::encoder;

/// A JSON number, stored as its lexeme.
#[derive(Debug, Clone)]
pub struct JsonNumber(String);

impl JsonNumber {
    /// The number exactly as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the lexeme has neither a fraction nor an exponent.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        !self.0.contains(['.', 'e', 'E'])
    }

    /// The value as an `i64`, if it is an integer within range.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    /// The value as an `f64`. Integers beyond 2^53 lose precision.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.0.parse().ok()
    }

    /// The exact decimal value as `(negative, digits, exponent)`, meaning
    /// `digits * 10^exponent`. `digits` has no leading or trailing zeros, and
    /// zero is `(false, "", 0)`. `None` if the lexeme is not a JSON number.
    fn normalized(&self) -> Option<(bool, String, i64)> {
        let (negative, rest) = match self.0.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, self.0.as_str()),
        };
        let (mantissa, exponent) = match rest.split_once(['e', 'E']) {
            Some((mantissa, exponent)) => {
                let exponent = exponent.strip_prefix('+').unwrap_or(exponent);
                (mantissa, exponent.parse::<i64>().ok()?)
            }
            None => (rest, 0),
        };
        let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if int.is_empty()
            || !int.chars().chain(frac.chars()).all(|c| c.is_ascii_digit())
        {
            return None;
        }

        let digits = format!("{int}{frac}");
        let digits = digits.trim_start_matches('0');
        let trimmed = digits.trim_end_matches('0');
        if trimmed.is_empty() {
            return Some((false, String::new(), 0));
        }
        let frac_len = i64::try_from(frac.len()).ok()?;
        let trailing = i64::try_from(digits.len() - trimmed.len()).ok()?;
        let exponent = exponent.checked_sub(frac_len)?.checked_add(trailing)?;
        Some((negative, trimmed.to_string(), exponent))
    }
}

/// Numbers are equal when they denote the same decimal value, however they
/// are written. Lexemes that are not JSON numbers compare as text.
impl PartialEq for JsonNumber {
    fn eq(&self, other: &Self) -> bool {
        match (self.normalized(), other.normalized()) {
            (Some(a), Some(b)) => a == b,
            _ => self.0 == other.0,
        }
    }
}

impl Eq for JsonNumber {}

impl From<String> for JsonNumber {
    fn from(lexeme: String) -> Self {
        Self(lexeme)
    }
}

impl From<&str> for JsonNumber {
    fn from(lexeme: &str) -> Self {
        Self(lexeme.to_string())
    }
}

impl Display for JsonNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Primary JSON AST definition
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum JSONValue {
    /// Represents a JSON object with string keys, sorted by key
    Object(BTreeMap<String, JSONValue>),
    /// Represents a JSON array containing values of any type
    Array(Vec<JSONValue>),
    /// Represents a JSON number value
    Number(JsonNumber),
    /// Represents a JSON string value
    JString(String),
    /// Represents a JSON Boolean value
    Boolean(bool),
    /// Represents a JSON null value
    Null,
}

impl JSONValue {
    /// Compute the depth of the JSON document.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Object(map) => {
                1 + map.values().map(Self::depth).max().unwrap_or(0)
            }
            Self::Array(arr) => {
                1 + arr.iter().map(Self::depth).max().unwrap_or(0)
            }
            Self::Number(_)
            | Self::JString(_)
            | Self::Boolean(_)
            | Self::Null => 1,
        }
    }

    /// Look up a member of an object, or an element of an array when `key`
    /// is an index.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Object(map) => map.get(key),
            Self::Array(arr) => {
                key.parse::<usize>().ok().and_then(|i| arr.get(i))
            }
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::JString(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(arr) => Some(arr),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_object(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// A short name for the type of this value, used in messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Object(_) => "object",
            Self::Array(_) => "array",
            Self::Number(_) => "number",
            Self::JString(_) => "string",
            Self::Boolean(_) => "boolean",
            Self::Null => "null",
        }
    }
}

/// Compact JSON, or indented JSON with the alternate flag (`{:#}`).
impl Display for JSONValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str(&encoder::encode_pretty(self))
        } else {
            f.write_str(&encoder::encode(self))
        }
    }
}

impl Serialize for JSONValue {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::JString(s) => serializer.serialize_str(s),
            Self::Number(n) => {
                if let Some(i) = n.as_i64() {
                    serializer.serialize_i64(i)
                } else if let Some(f) = n.as_f64() {
                    serializer.serialize_f64(f)
                } else {
                    serializer.serialize_str(n.as_str())
                }
            }
            Self::Array(arr) => serializer.collect_seq(arr),
            Self::Object(map) => serializer.collect_map(map),
        }
    }
}

impl From<serde_json::Value> for JSONValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Boolean(b),
            serde_json::Value::Number(number) => {
                Self::Number(number.to_string().into())
            }
            serde_json::Value::String(s) => Self::JString(s),
            serde_json::Value::Array(values) => {
                Self::Array(values.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Object(
                map.into_iter().map(|(k, v)| (k, Self::from(v))).collect(),
            ),
        }
    }
}

// `TryFrom` since the input may be malformed
impl TryFrom<&str> for JSONValue {
    type Error = DecodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        decoder::decode(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn number(lexeme: &str) -> JSONValue {
        JSONValue::Number(lexeme.into())
    }

    #[test]
    fn depth() {
        assert_eq!(JSONValue::Null.depth(), 1);
        let doc = JSONValue::Array(vec![
            number("1"),
            JSONValue::Object(BTreeMap::from([(
                "a".to_string(),
                JSONValue::Array(vec![]),
            )])),
        ]);
        assert_eq!(doc.depth(), 3);
    }

    #[test]
    fn numbers_compare_by_value() {
        assert_eq!(number("12e-3"), number("0.012"));
        assert_eq!(number("-0"), number("0"));
        assert_eq!(number("100"), number("1e2"));
        assert_ne!(number("1"), number("2"));
        assert_eq!(number("1.50E+1"), number("15"));
        assert_eq!(JsonNumber::from("42").as_str(), "42");
        assert_eq!(number("42").as_str(), None);
    }

    #[test]
    fn number_equality_is_exact() {
        // Distinct beyond f64 precision, so no third lexeme can equal both.
        let a = number("9007199254740993");
        let b = number("9007199254740992");
        let c = number("9007199254740992.0");
        assert_ne!(a, b);
        assert_eq!(b, c);
        assert_ne!(a, c);

        assert_ne!(number("0.1"), number("0.10000000000000001"));
        assert_eq!(number("0.0e5"), number("-0.000"));
        assert_ne!(number("-1"), number("1"));
        assert_eq!(JsonNumber::from("abc"), JsonNumber::from("abc"));
        assert_ne!(JsonNumber::from("abc"), JsonNumber::from("1"));
    }

    #[test]
    fn coercions() {
        assert_eq!(number("123456").as_i64(), Some(123_456));
        assert_eq!(number("3.14").as_i64(), None);
        assert_eq!(number("-12.3e-1").as_f64(), Some(-1.23));
        assert!(number("7").as_f64().is_some());
        assert!(number("7").to_string() == "7");

        assert_eq!(JSONValue::Boolean(true).as_bool(), Some(true));
        assert_eq!(JSONValue::JString("x".into()).as_str(), Some("x"));
        assert!(JSONValue::Null.is_null());
        assert_eq!(JSONValue::Null.as_str(), None);
        assert_eq!(JSONValue::Null.type_name(), "null");
    }

    #[test]
    fn get_members_and_elements() {
        let doc = JSONValue::Object(BTreeMap::from([(
            "list".to_string(),
            JSONValue::Array(vec![JSONValue::Boolean(false)]),
        )]));
        let list = doc.get("list").unwrap();
        assert_eq!(list.as_array().map(<[_]>::len), Some(1));
        assert_eq!(list.get("0"), Some(&JSONValue::Boolean(false)));
        assert_eq!(list.get("1"), None);
        assert_eq!(doc.get("missing"), None);
    }

    #[test]
    fn from_serde_json() {
        let serde_value: serde_json::Value =
            serde_json::from_str(r#"{"a": [1, 2.5, "x", null, true]}"#)
                .unwrap();
        let value = JSONValue::from(serde_value);
        let items = value.get("a").and_then(JSONValue::as_array).unwrap();
        assert_eq!(items[0].as_i64(), Some(1));
        assert_eq!(items[1].as_f64(), Some(2.5));
        assert_eq!(items[2].as_str(), Some("x"));
        assert!(items[3].is_null());
    }

    #[test]
    fn display_encodes() {
        let value = JSONValue::Array(vec![number("1"), JSONValue::Null]);
        assert_eq!(value.to_string(), "[1, null]");
        assert_eq!(format!("{value:#}"), "[\n  1,\n  null\n]");
    }

    #[test]
    fn serializes_through_serde() {
        let value =
            JSONValue::try_from(r#"{"b": [1, 2.5], "a": null}"#).unwrap();
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"a":null,"b":[1,2.5]}"#);
    }
}
