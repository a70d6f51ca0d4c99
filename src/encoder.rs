/*!
# Encoder

Serializes Rust values to JSON text through the [`ToJson`] trait.

Compact output separates items with `", "` and keys from values with `": "`.
Pretty output puts every item on its own line, indented by two spaces. Object
members are written sorted by key.

Strings are escaped down to printable ASCII, so every encoded document can be
read back by the [decoder](crate::decoder).

# Examples

```
use std::collections::BTreeMap;
use jsonp::encoder::encode;

let scores = BTreeMap::from([("alice", vec![1.5, 2.0]), ("bob", vec![])]);
assert_eq!(encode(&scores), r#"{"alice": [1.5, 2], "bob": []}"#);
assert_eq!(encode(&Some("é")), r#""\u00e9""#);
```
*/
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crate::value::JSONValue;

/// Conversion of a Rust value into a [`JSONValue`].
pub trait ToJson {
    fn to_json(&self) -> JSONValue;
}

/// Encode a value as compact JSON.
pub fn encode<T: ToJson + ?Sized>(value: &T) -> String {
    let mut out = String::new();
    write_value(&mut out, &value.to_json(), None);
    out
}

/// Encode a value as indented JSON.
pub fn encode_pretty<T: ToJson + ?Sized>(value: &T) -> String {
    let mut out = String::new();
    write_value(&mut out, &value.to_json(), Some(0));
    out
}

/// Write `value`, indenting nested lines past `indent` when pretty-printing.
fn write_value(out: &mut String, value: &JSONValue, indent: Option<usize>) {
    match value {
        JSONValue::Null => out.push_str("null"),
        JSONValue::Boolean(b) => {
            out.push_str(if *b { "true" } else { "false" });
        }
        JSONValue::Number(n) => out.push_str(n.as_str()),
        JSONValue::JString(s) => out.push_str(&quote(s)),
        JSONValue::Array(items) => {
            write_container(
                out,
                ('[', ']'),
                items,
                indent,
                |out, item, indent| write_value(out, item, indent),
            );
        }
        JSONValue::Object(members) => {
            write_container(
                out,
                ('{', '}'),
                members,
                indent,
                |out, (key, val), indent| {
                    out.push_str(&quote(key));
                    out.push_str(": ");
                    write_value(out, val, indent);
                },
            );
        }
    }
}

fn write_container<I, F>(
    out: &mut String,
    (open, close): (char, char),
    items: I,
    indent: Option<usize>,
    mut write_item: F,
) where
    I: IntoIterator,
    F: FnMut(&mut String, I::Item, Option<usize>),
{
    let inner = indent.map(|i| i + 2);
    let mut empty = true;
    out.push(open);
    for item in items {
        if !empty {
            out.push(',');
            if inner.is_none() {
                out.push(' ');
            }
        }
        empty = false;
        if let Some(width) = inner {
            newline(out, width);
        }
        write_item(out, item, inner);
    }
    if let (Some(width), false) = (indent, empty) {
        newline(out, width);
    }
    out.push(close);
}

fn newline(out: &mut String, width: usize) {
    out.push('\n');
    out.extend(std::iter::repeat_n(' ', width));
}

/// Quote a string as a JSON literal, escaping everything outside printable
/// ASCII.
#[must_use]
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{unit:04x}"));
                }
            }
        }
    }
    out.push('"');
    out
}

impl ToJson for JSONValue {
    fn to_json(&self) -> JSONValue {
        self.clone()
    }
}

impl ToJson for bool {
    fn to_json(&self) -> JSONValue {
        JSONValue::Boolean(*self)
    }
}

macro_rules! integer_to_json {
    ($($t:ty),*) => {
        $(
            impl ToJson for $t {
                fn to_json(&self) -> JSONValue {
                    JSONValue::Number(self.to_string().into())
                }
            }
        )*
    };
}

integer_to_json!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize
);

macro_rules! float_to_json {
    ($($t:ty),*) => {
        $(
            impl ToJson for $t {
                /// Non-finite values have no JSON form and become `null`.
                fn to_json(&self) -> JSONValue {
                    if self.is_finite() {
                        JSONValue::Number(self.to_string().into())
                    } else {
                        JSONValue::Null
                    }
                }
            }
        )*
    };
}

float_to_json!(f32, f64);

impl ToJson for str {
    fn to_json(&self) -> JSONValue {
        JSONValue::JString(self.to_string())
    }
}

impl ToJson for String {
    fn to_json(&self) -> JSONValue {
        JSONValue::JString(self.clone())
    }
}

impl ToJson for char {
    fn to_json(&self) -> JSONValue {
        JSONValue::JString(self.to_string())
    }
}

impl<T: ToJson> ToJson for Option<T> {
    fn to_json(&self) -> JSONValue {
        self.as_ref().map_or(JSONValue::Null, ToJson::to_json)
    }
}

impl<T: ToJson + ?Sized> ToJson for &T {
    fn to_json(&self) -> JSONValue {
        (**self).to_json()
    }
}

impl<T: ToJson> ToJson for [T] {
    fn to_json(&self) -> JSONValue {
        JSONValue::Array(self.iter().map(ToJson::to_json).collect())
    }
}

impl<T: ToJson> ToJson for Vec<T> {
    fn to_json(&self) -> JSONValue {
        self.as_slice().to_json()
    }
}

impl<K: AsRef<str>, V: ToJson> ToJson for BTreeMap<K, V> {
    fn to_json(&self) -> JSONValue {
        JSONValue::Object(
            self.iter()
                .map(|(k, v)| (k.as_ref().to_string(), v.to_json()))
                .collect(),
        )
    }
}

impl<K: AsRef<str>, V: ToJson, S: BuildHasher> ToJson for HashMap<K, V, S> {
    fn to_json(&self) -> JSONValue {
        JSONValue::Object(
            self.iter()
                .map(|(k, v)| (k.as_ref().to_string(), v.to_json()))
                .collect(),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::decoder::decode;

    #[test]
    fn scalars() {
        assert_eq!(encode(&true), "true");
        assert_eq!(encode(&-42_i32), "-42");
        assert_eq!(encode(&u64::MAX), "18446744073709551615");
        assert_eq!(encode(&2.5_f64), "2.5");
        assert_eq!(encode(&f64::NAN), "null");
        assert_eq!(encode(&f32::INFINITY), "null");
        assert_eq!(encode(&None::<i32>), "null");
        assert_eq!(encode("text"), "\"text\"");
        assert_eq!(encode(&'c'), "\"c\"");
    }

    #[test]
    fn containers_use_spaced_separators() {
        assert_eq!(encode(&vec![1, 2, 3]), "[1, 2, 3]");
        assert_eq!(encode(&Vec::<i32>::new()), "[]");
        assert_eq!(encode(&BTreeMap::<String, i32>::new()), "{}");

        let map = HashMap::from([("b", vec![true]), ("a", vec![])]);
        assert_eq!(encode(&map), r#"{"a": [], "b": [true]}"#);
    }

    #[test]
    fn pretty_printing() {
        let value = decode(r#"{"a": [1, {"b": null}], "c": {}, "d": []}"#).unwrap();
        let expected = r#"{
  "a": [
    1,
    {
      "b": null
    }
  ],
  "c": {},
  "d": []
}"#;
        assert_eq!(encode_pretty(&value), expected);
        assert_eq!(encode_pretty(&1), "1");
    }

    #[test]
    fn escapes_strings() {
        assert_eq!(quote("a\"b\\c"), r#""a\"b\\c""#);
        assert_eq!(quote("\n\r\t\u{8}\u{c}"), r#""\n\r\t\b\f""#);
        assert_eq!(quote("\u{1}"), r#""\u0001""#);
        assert_eq!(quote("é"), r#""\u00e9""#);
        assert_eq!(quote("😀"), r#""\ud83d\ude00""#);
        assert_eq!(quote("/"), r#""/""#);
    }

    #[test]
    fn encoded_documents_decode_back() {
        let documents = [
            r#"{"A": [12e-3, -123.456], "E": ""}"#,
            r#"[{"id": 1, "tags": ["x", "y"]}, {"id": 2, "tags": []}]"#,
            r#""tab\t \u00e9 \ud83d\ude00 \"q\"""#,
            "-0",
            "null",
        ];
        for document in documents {
            let value = decode(document).unwrap();
            assert_eq!(decode(&encode(&value)).unwrap(), value, "{document}");
            assert_eq!(decode(&encode_pretty(&value)).unwrap(), value, "{document}");
        }

        let value = JSONValue::JString("control \u{7f}\u{0} and 🎉".to_string());
        assert_eq!(decode(&encode(&value)).unwrap(), value);
    }

    #[test]
    fn compact_output_matches_source_spacing() {
        let input = r#"{"A": [12e-3, -123.456], "E": ""}"#;
        assert_eq!(encode(&decode(input).unwrap()), input);
    }
}
