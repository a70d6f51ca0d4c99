/*!
# `jsonp` Library

JSON tokenizing, decoding and encoding built on Thompson-constructed
automata.

- [`regex`]: regular-expression terms over character classes
- [`automata`]: Thompson construction and NFA simulation
- [`tokenizer`]: the maximal-munch lexer and the JSON pattern set
- [`decoder`] and [`encoder`]: conversion between JSON text and [`JSONValue`]

# Examples

```
use jsonp::{decode, encode};

let value = decode(r#"{"A": [12e-3, -123.456], "E": ""}"#).expect("valid JSON");
assert_eq!(value.depth(), 3);
assert_eq!(encode(&value), r#"{"A": [12e-3, -123.456], "E": ""}"#);
```
*/

pub mod automata;
pub mod commands;
pub mod decoder;
pub mod encoder;
pub mod regex;
pub mod tokenizer;
pub mod utils;
pub mod value;

// Re-exports
pub use decoder::{DecodeError, Decoder, decode};
pub use encoder::{ToJson, encode, encode_pretty};
pub use tokenizer::tokenize;
pub use value::{JSONValue, JsonNumber};
