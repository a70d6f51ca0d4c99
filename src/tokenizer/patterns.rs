//! # JSON Patterns
//!
//! The prioritized pattern set used to lex JSON documents, one grouped term
//! per [`TokenKind`].
use crate::regex::{CharClass, Term};
use crate::tokenizer::{Lexer, TokenKind};

/// `"` followed by unescaped printable ASCII or escape sequences, then `"`.
fn string() -> Term {
    let unescaped = CharClass::from_range(' '..='~', "[ -~]")
        .without("\"\\", "[^\"\\]");
    let hex = Term::char_range("0123456789abcdefABCDEF", "[0-9a-fA-F]");
    let escape = Term::alt([
        Term::char_range("\"\\/bfnrt", "[\"\\/bfnrt]"),
        Term::concat([Term::literal("u"), Term::repeat_exact(&hex, 4)]),
    ]);

    Term::concat([
        Term::literal("\""),
        Term::star(Term::alt([
            Term::class(unescaped),
            Term::concat([Term::literal("\\"), escape]),
        ])),
        Term::literal("\""),
    ])
}

/// `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`
fn number() -> Term {
    let integer = Term::alt([
        Term::literal("0"),
        Term::concat([
            Term::char_range("123456789", "[1-9]"),
            Term::star(Term::digits()),
        ]),
    ]);
    let fraction = Term::concat([Term::literal("."), Term::plus(Term::digits())]);
    let exponent = Term::concat([
        Term::char_range("eE", "[eE]"),
        Term::optional(Term::char_range("+-", "[+-]")),
        Term::plus(Term::digits()),
    ]);

    Term::concat([
        Term::optional(Term::literal("-")),
        integer,
        Term::optional(fraction),
        Term::optional(exponent),
    ])
}

/// The pattern matching tokens of the given kind.
#[must_use]
pub fn pattern(kind: TokenKind) -> Term {
    let term = match kind {
        TokenKind::JString => string(),
        TokenKind::JNumber => number(),
        TokenKind::Space => {
            Term::plus(Term::char_range(" \t\r\n", "[ \\t\\r\\n]"))
        }
        TokenKind::True
        | TokenKind::False
        | TokenKind::Null
        | TokenKind::Comma
        | TokenKind::Colon
        | TokenKind::LCurly
        | TokenKind::RCurly
        | TokenKind::LSquare
        | TokenKind::RSquare => Term::literal(kind.label()),
    };
    term.group(kind.label())
}

/// All JSON patterns, grouped and in priority order: literals, strings,
/// numbers, whitespace, then punctuation.
#[must_use]
pub fn json_patterns() -> Vec<Term> {
    TokenKind::ALL.into_iter().map(pattern).collect()
}

/// A lexer compiled from [`json_patterns`].
#[must_use]
pub fn json_lexer() -> Lexer {
    Lexer::new(json_patterns())
}
