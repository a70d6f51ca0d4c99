//! # Tokens
//!
//! Defines the labeled spans produced by the lexer and the typed view of the
//! labels used by the JSON pattern set.
use serde::Serialize;
use std::{fmt::Display, ops::Range};

use crate::regex::Label;

/// A run of input matched by one pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// The exact characters consumed, in order
    pub content: String,
    /// Label of the pattern that matched
    pub label: Label,
    /// Byte range of `content` within the input fed since the last reset
    pub span: Range<usize>,
}

impl Token {
    /// The typed kind of this token, if its label belongs to the JSON
    /// pattern set.
    #[must_use]
    pub fn kind(&self) -> Option<TokenKind> {
        TokenKind::from_label(&self.label)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({:?})", self.label, self.content)
    }
}

/// Represents the kind of a token from a JSON document.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
pub enum TokenKind {
    /* Delimiters */
    /// Opening curly brace
    LCurly,

    /// Closing curly brace
    RCurly,

    /// Opening square bracket
    LSquare,

    /// Closing square bracket
    RSquare,

    /// Colon character
    Colon,

    /// Comma character
    Comma,

    /* Values */
    /// Nil value
    Null,

    /// `true`
    True,

    /// `false`
    False,

    /// Quoted string, including the quotes
    JString,

    /// Numeric value
    JNumber,

    /* Skipped */
    /// Run of whitespace
    Space,
}

impl TokenKind {
    /// Every kind, in pattern priority order.
    pub const ALL: [Self; 12] = [
        Self::True,
        Self::False,
        Self::Null,
        Self::JString,
        Self::JNumber,
        Self::Space,
        Self::Comma,
        Self::Colon,
        Self::LCurly,
        Self::RCurly,
        Self::LSquare,
        Self::RSquare,
    ];

    /// The pattern label for this kind.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LCurly => "{",
            Self::RCurly => "}",
            Self::LSquare => "[",
            Self::RSquare => "]",
            Self::Colon => ":",
            Self::Comma => ",",
            Self::Null => "null",
            Self::True => "true",
            Self::False => "false",
            Self::JString => "string",
            Self::JNumber => "number",
            Self::Space => "space",
        }
    }

    /// Map a pattern label back onto its kind.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }

    /// Whether tokens of this kind start a scalar value.
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        matches!(
            self,
            Self::Null
                | Self::True
                | Self::False
                | Self::JString
                | Self::JNumber
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
