//! # Tokenizer/ Lexer
//!
//! Segments a JSON document into a token stream by simulating a multi-pattern
//! Thompson NFA over its characters.
pub mod lexer;
pub mod patterns;
pub mod token;

// Re-exports
pub use lexer::{LexError, Lexer, TokenStream};
pub use patterns::{json_lexer, json_patterns};
pub use token::{Token, TokenKind};

/// Tokenize a JSON document with the JSON pattern set, including whitespace
/// tokens.
///
/// # Errors
///
/// Returns a [`LexError`] if some part of the input matches no pattern.
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexError> {
    json_lexer().tokenize(text)
}
