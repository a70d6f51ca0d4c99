/*!
# Decoder

Builds a [`JSONValue`] tree from the token stream of the JSON
[lexer](crate::tokenizer::json_lexer).

Whitespace tokens are dropped, then the remaining tokens are parsed by
recursive descent with one token of lookahead:

```text
value   := object | array | string | number | true | false | null
object  := '{' (member (',' member)*)? '}'
member  := string ':' value
array   := '[' (value (',' value)*)? ']'
```

Duplicate object keys keep the last value. Objects and arrays may nest at
most [`MAX_DEPTH`] levels deep.

# Examples

```
use jsonp::decoder::decode;

let value = decode(r#"{"A": [12e-3, -123.456], "E": ""}"#).expect("valid JSON");
assert_eq!(value.get("E").and_then(|e| e.as_str()), Some(""));
let second = value.get("A").and_then(|a| a.get("1"));
assert_eq!(second.and_then(|n| n.as_f64()), Some(-123.456));
```
*/
use log::debug;
use std::collections::BTreeMap;
use std::{error::Error, fmt};

use crate::tokenizer::{LexError, Lexer, Token, TokenKind, json_lexer};
use crate::value::JSONValue;

/// Maximum number of nested objects and arrays in a document.
pub const MAX_DEPTH: usize = 128;

/// Represents errors that can occur while decoding a JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The input could not be tokenized
    Lex(LexError),
    /// A token appeared where the grammar does not allow it
    UnexpectedToken {
        /// Content of the offending token
        found: String,
        /// What the parser was looking for
        expected: &'static str,
        /// Byte offset of the offending token
        offset: usize,
    },
    /// The input ended inside a value
    UnexpectedEndOfInput {
        /// What the parser was looking for
        expected: &'static str,
    },
    /// A string contained an escape that does not denote a character, such
    /// as an unpaired surrogate
    InvalidEscape {
        /// The offending escape sequence
        sequence: String,
        /// Byte offset of the escape sequence
        offset: usize,
    },
    /// A complete value was followed by more tokens
    TrailingTokens {
        /// Byte offset of the first extra token
        offset: usize,
    },
    /// Containers nested deeper than [`MAX_DEPTH`]
    DepthLimitExceeded {
        /// Byte offset of the first container past the limit
        offset: usize,
    },
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Lex(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(err) => write!(f, "{err}"),
            Self::UnexpectedToken {
                found,
                expected,
                offset,
            } => write!(
                f,
                "Unexpected token {found:?} at byte {offset}: \
                 expected {expected}"
            ),
            Self::UnexpectedEndOfInput { expected } => {
                write!(f, "Unexpected end of input: expected {expected}")
            }
            Self::InvalidEscape { sequence, offset } => write!(
                f,
                "Invalid escape sequence {sequence:?} at byte {offset}"
            ),
            Self::TrailingTokens { offset } => {
                write!(f, "Unexpected trailing input at byte {offset}")
            }
            Self::DepthLimitExceeded { offset } => write!(
                f,
                "Nesting deeper than {MAX_DEPTH} levels at byte {offset}"
            ),
        }
    }
}

impl From<LexError> for DecodeError {
    fn from(err: LexError) -> Self {
        Self::Lex(err)
    }
}

/// A reusable JSON decoder.
///
/// Owns a compiled JSON lexer, so decoding many documents compiles the
/// patterns only once.
#[derive(Debug, Clone)]
pub struct Decoder {
    lexer: Lexer,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lexer: json_lexer(),
        }
    }

    /// Decode a complete JSON document.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if `text` is not exactly one JSON value,
    /// optionally surrounded by whitespace.
    pub fn decode(&mut self, text: &str) -> Result<JSONValue, DecodeError> {
        let tokens: Vec<Token> = self
            .lexer
            .stream(text.chars())
            .filter(|token| {
                !matches!(
                    token,
                    Ok(token) if token.kind() == Some(TokenKind::Space)
                )
            })
            .collect::<Result<_, _>>()?;
        debug!("Decoding {} significant tokens", tokens.len());

        let mut parser = Parser {
            tokens: &tokens,
            position: 0,
            depth: 0,
        };
        let value = parser.parse_value()?;
        parser.finish()?;
        Ok(value)
    }
}

/// Decode a complete JSON document with a fresh [`Decoder`].
///
/// # Errors
///
/// See [`Decoder::decode`].
pub fn decode(text: &str) -> Result<JSONValue, DecodeError> {
    Decoder::new().decode(text)
}

/// Recursive-descent parser over significant tokens.
struct Parser<'t> {
    tokens: &'t [Token],
    position: usize,
    /// Number of containers currently open
    depth: usize,
}

impl<'t> Parser<'t> {
    fn peek_kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.position).and_then(Token::kind)
    }

    fn next_token(
        &mut self,
        expected: &'static str,
    ) -> Result<&'t Token, DecodeError> {
        let token = self
            .tokens
            .get(self.position)
            .ok_or(DecodeError::UnexpectedEndOfInput { expected })?;
        self.position += 1;
        Ok(token)
    }

    fn expect(
        &mut self,
        kind: TokenKind,
        expected: &'static str,
    ) -> Result<&'t Token, DecodeError> {
        let token = self.next_token(expected)?;
        if token.kind() == Some(kind) {
            Ok(token)
        } else {
            Err(unexpected(token, expected))
        }
    }

    fn finish(&self) -> Result<(), DecodeError> {
        match self.tokens.get(self.position) {
            Some(token) => Err(DecodeError::TrailingTokens {
                offset: token.span.start,
            }),
            None => Ok(()),
        }
    }

    fn parse_value(&mut self) -> Result<JSONValue, DecodeError> {
        let token = self.next_token("a value")?;
        match token.kind() {
            Some(TokenKind::LCurly) => self.nested(token, Self::parse_object),
            Some(TokenKind::LSquare) => self.nested(token, Self::parse_array),
            Some(TokenKind::JString) => {
                Ok(JSONValue::JString(unescape(token)?))
            }
            Some(TokenKind::JNumber) => {
                Ok(JSONValue::Number(token.content.as_str().into()))
            }
            Some(TokenKind::True) => Ok(JSONValue::Boolean(true)),
            Some(TokenKind::False) => Ok(JSONValue::Boolean(false)),
            Some(TokenKind::Null) => Ok(JSONValue::Null),
            _ => Err(unexpected(token, "a value")),
        }
    }

    /// Run `parse` for the container opened by `open`, one level deeper.
    fn nested<F>(
        &mut self,
        open: &Token,
        parse: F,
    ) -> Result<JSONValue, DecodeError>
    where
        F: FnOnce(&mut Self) -> Result<JSONValue, DecodeError>,
    {
        if self.depth == MAX_DEPTH {
            return Err(DecodeError::DepthLimitExceeded {
                offset: open.span.start,
            });
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    /// Parse the rest of an object, after its `{`.
    fn parse_object(&mut self) -> Result<JSONValue, DecodeError> {
        let mut members = BTreeMap::new();
        if self.peek_kind() == Some(TokenKind::RCurly) {
            self.position += 1;
            return Ok(JSONValue::Object(members));
        }

        loop {
            let key = self.expect(TokenKind::JString, "a string key")?;
            let key = unescape(key)?;
            self.expect(TokenKind::Colon, "`:`")?;
            let value = self.parse_value()?;
            members.insert(key, value);

            let token = self.next_token("`,` or `}`")?;
            match token.kind() {
                Some(TokenKind::Comma) => {}
                Some(TokenKind::RCurly) => {
                    return Ok(JSONValue::Object(members));
                }
                _ => return Err(unexpected(token, "`,` or `}`")),
            }
        }
    }

    /// Parse the rest of an array, after its `[`.
    fn parse_array(&mut self) -> Result<JSONValue, DecodeError> {
        let mut items = Vec::new();
        if self.peek_kind() == Some(TokenKind::RSquare) {
            self.position += 1;
            return Ok(JSONValue::Array(items));
        }

        loop {
            items.push(self.parse_value()?);

            let token = self.next_token("`,` or `]`")?;
            match token.kind() {
                Some(TokenKind::Comma) => {}
                Some(TokenKind::RSquare) => return Ok(JSONValue::Array(items)),
                _ => return Err(unexpected(token, "`,` or `]`")),
            }
        }
    }
}

fn unexpected(token: &Token, expected: &'static str) -> DecodeError {
    DecodeError::UnexpectedToken {
        found: token.content.clone(),
        expected,
        offset: token.span.start,
    }
}

/// Strip the quotes of a string token and resolve its escape sequences.
fn unescape(token: &Token) -> Result<String, DecodeError> {
    let inner = token
        .content
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| unexpected(token, "a string"))?;
    // Byte offset of `inner` within the input
    let base = token.span.start + 1;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.char_indices();
    while let Some((i, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let invalid = |len: usize| DecodeError::InvalidEscape {
            sequence: inner[i..].chars().take(len).collect(),
            offset: base + i,
        };
        match chars.next().map(|(_, e)| e) {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => {
                let high = hex_unit(&inner[i + 2..]).ok_or_else(|| invalid(6))?;
                chars.nth(3);
                let code = if (0xD800..0xDC00).contains(&high) {
                    // A high surrogate must be followed by `\uDC00`-`\uDFFF`.
                    let low = inner
                        .get(i + 6..)
                        .and_then(|rest| rest.strip_prefix("\\u"))
                        .and_then(hex_unit)
                        .filter(|low| (0xDC00..0xE000).contains(low))
                        .ok_or_else(|| invalid(12))?;
                    chars.nth(5);
                    0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
                } else {
                    high
                };
                out.push(char::from_u32(code).ok_or_else(|| invalid(6))?);
            }
            _ => return Err(invalid(2)),
        }
    }
    Ok(out)
}

/// Parse four leading hex digits.
fn hex_unit(s: &str) -> Option<u32> {
    let digits = s.get(..4)?;
    if digits.chars().all(|c| c.is_ascii_hexdigit()) {
        u32::from_str_radix(digits, 16).ok()
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::value::JsonNumber;

    fn number(lexeme: &str) -> JSONValue {
        JSONValue::Number(JsonNumber::from(lexeme))
    }

    #[test]
    fn scalars() {
        assert_eq!(decode("123456").unwrap().as_i64(), Some(123_456));
        assert_eq!(decode("2.75").unwrap().as_f64(), Some(2.75));
        assert_eq!(decode("-12.3e-1").unwrap().as_f64(), Some(-1.23));
        assert_eq!(decode("true").unwrap(), JSONValue::Boolean(true));
        assert_eq!(decode("false").unwrap(), JSONValue::Boolean(false));
        assert_eq!(decode(" null\n").unwrap(), JSONValue::Null);
        assert_eq!(
            decode(r#""some string""#).unwrap(),
            JSONValue::JString("some string".to_string())
        );
    }

    #[test]
    fn numbers_keep_their_lexeme() {
        let JSONValue::Number(n) = decode("12e-3").unwrap() else {
            panic!("expected a number");
        };
        assert_eq!(n.as_str(), "12e-3");
    }

    #[test]
    fn empty_containers() {
        assert_eq!(decode("[]").unwrap(), JSONValue::Array(vec![]));
        assert_eq!(decode("{ }").unwrap(), JSONValue::Object(BTreeMap::new()));
    }

    #[test]
    fn nested_document() {
        let value = decode(r#"{"A": [12e-3, -123.456], "E": ""}"#).unwrap();
        let expected = JSONValue::Object(BTreeMap::from([
            (
                "A".to_string(),
                JSONValue::Array(vec![number("12e-3"), number("-123.456")]),
            ),
            ("E".to_string(), JSONValue::JString(String::new())),
        ]));
        assert_eq!(value, expected);
    }

    #[test]
    fn list_of_objects() {
        let value =
            decode(r#"[{"id": 1, "ok": true}, {"id": 2, "ok": false}]"#)
                .unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].get("id").and_then(JSONValue::as_i64), Some(2));
        assert_eq!(items[0].get("ok").and_then(JSONValue::as_bool), Some(true));
    }

    #[test]
    fn duplicate_keys_keep_last() {
        let value = decode(r#"{"a": 1, "a": 2}"#).unwrap();
        assert_eq!(value.get("a").and_then(JSONValue::as_i64), Some(2));
    }

    #[test]
    fn agrees_with_serde_json() {
        let input = r#"
            {
                "name": "John Doe",
                "age": 43,
                "scores": [1.5, -2, 3e2],
                "address": {"street": "10 Downing Street", "city": null},
                "tags": [],
                "escaped": "line\nbreak \"quoted\" \u00e9 \ud83d\ude00"
            }"#;
        let ours = decode(input).unwrap();
        let theirs: serde_json::Value = serde_json::from_str(input).unwrap();
        let theirs = JSONValue::from(theirs);
        assert_eq!(ours, theirs);
    }

    #[test]
    fn unescapes_strings() {
        let value = decode(r#""a\"b\\c\/d\b\f\n\r\t\u0041\u00e9""#).unwrap();
        assert_eq!(value.as_str(), Some("a\"b\\c/d\u{8}\u{c}\n\r\tAé"));

        let value = decode(r#""\ud83d\ude00""#).unwrap();
        assert_eq!(value.as_str(), Some("😀"));
    }

    #[test]
    fn unpaired_surrogate() {
        let err = decode(r#"["\ud83d!"]"#).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidEscape {
                sequence: r"\ud83d!".to_string(),
                offset: 2
            }
        );

        let err = decode(r#""\ude00""#).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidEscape { offset: 1, .. }));
    }

    #[test]
    fn lex_errors_are_wrapped() {
        let err = decode("[1, $]").unwrap_err();
        assert!(matches!(err, DecodeError::Lex(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn unexpected_tokens() {
        let err = decode("[1 2]").unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnexpectedToken {
                found: "2".to_string(),
                expected: "`,` or `]`",
                offset: 3
            }
        );

        let err = decode(r#"{1: 2}"#).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnexpectedToken {
                expected: "a string key",
                offset: 1,
                ..
            }
        ));

        assert!(matches!(
            decode("[1,]").unwrap_err(),
            DecodeError::UnexpectedToken { .. }
        ));
        assert!(matches!(
            decode(r#"{"a" 1}"#).unwrap_err(),
            DecodeError::UnexpectedToken { expected: "`:`", .. }
        ));
    }

    #[test]
    fn truncated_input() {
        assert_eq!(
            decode("").unwrap_err(),
            DecodeError::UnexpectedEndOfInput {
                expected: "a value"
            }
        );
        assert_eq!(
            decode(r#"{"a": [1"#).unwrap_err(),
            DecodeError::UnexpectedEndOfInput {
                expected: "`,` or `]`"
            }
        );
    }

    #[test]
    fn trailing_tokens() {
        assert_eq!(
            decode("1 2").unwrap_err(),
            DecodeError::TrailingTokens { offset: 2 }
        );
        assert_eq!(
            decode("{} ]").unwrap_err(),
            DecodeError::TrailingTokens { offset: 3 }
        );
    }

    #[test]
    fn decoder_is_reusable() {
        let mut decoder = Decoder::new();
        assert!(decoder.decode("[1, $]").is_err());
        assert_eq!(
            decoder.decode("[1]").unwrap(),
            JSONValue::Array(vec![number("1")])
        );
    }

    fn nested_arrays(levels: usize) -> String {
        format!("{}{}", "[".repeat(levels), "]".repeat(levels))
    }

    #[test]
    fn nesting_up_to_the_limit() {
        let value = decode(&nested_arrays(MAX_DEPTH)).unwrap();
        assert_eq!(value.depth(), MAX_DEPTH);

        let objects = format!(
            "{}1{}",
            r#"{"a": "#.repeat(MAX_DEPTH),
            "}".repeat(MAX_DEPTH)
        );
        assert_eq!(decode(&objects).unwrap().depth(), MAX_DEPTH + 1);
    }

    #[test]
    fn nesting_past_the_limit() {
        assert_eq!(
            decode(&nested_arrays(MAX_DEPTH + 1)).unwrap_err(),
            DecodeError::DepthLimitExceeded { offset: MAX_DEPTH }
        );
        // Deep enough to exhaust the stack without the limit.
        assert_eq!(
            decode(&nested_arrays(10_000)).unwrap_err(),
            DecodeError::DepthLimitExceeded { offset: MAX_DEPTH }
        );

        let mixed = format!("{}1", r#"[{"a": "#.repeat(MAX_DEPTH));
        assert!(matches!(
            decode(&mixed).unwrap_err(),
            DecodeError::DepthLimitExceeded { .. }
        ));
    }

    #[test]
    fn depth_is_restored_between_siblings() {
        let wide = format!(
            "[{}]",
            vec![nested_arrays(MAX_DEPTH - 1); 3].join(", ")
        );
        assert_eq!(decode(&wide).unwrap().depth(), MAX_DEPTH);
    }
}
