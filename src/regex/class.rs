//! # Character Classes
//!
//! Defines the set of characters a single transition can consume.
use std::{collections::BTreeSet, fmt::Display};

const DIGIT_FORM: &str = "0123456789";
const PUNCTUATION_FORM: &str = "!@#$%^&*()_+-= ";
const UPPER_LETTER_FORM: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER_LETTER_FORM: &str = "abcdefghijklmnopqrstuvwxyz";

/// A named set of accepted characters, e.g. `[0-9]`.
///
/// Two classes are equal when both their display names and accepted sets are
/// equal, so an automaton alphabet holds one entry per distinct class rather
/// than one per character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharClass {
    /// Display name of the class
    name: String,
    /// Characters consumed by the class
    accepted: BTreeSet<char>,
}

impl CharClass {
    /// Construct a class accepting every character of `chars`, displayed as
    /// `name`.
    pub fn new<N: Into<String>>(chars: &str, name: N) -> Self {
        Self {
            name: name.into(),
            accepted: chars.chars().collect(),
        }
    }

    /// Construct a class accepting exactly one character, displayed as that
    /// character.
    #[must_use]
    pub fn single(c: char) -> Self {
        Self {
            name: c.to_string(),
            accepted: BTreeSet::from([c]),
        }
    }

    /// Construct a class from an inclusive range of characters, e.g.
    /// `CharClass::from_range('a'..='f', "[a-f]")`.
    pub fn from_range<N: Into<String>>(
        range: std::ops::RangeInclusive<char>,
        name: N,
    ) -> Self {
        Self {
            name: name.into(),
            accepted: range.collect(),
        }
    }

    /// `[0-9]`
    #[must_use]
    pub fn digits() -> Self {
        Self::new(DIGIT_FORM, "[0-9]")
    }

    /// `[a-zA-Z]`
    #[must_use]
    pub fn letters() -> Self {
        Self::new(&[UPPER_LETTER_FORM, LOWER_LETTER_FORM].concat(), "[a-zA-Z]")
    }

    /// Digits, common punctuation, the space character and letters.
    #[must_use]
    pub fn any() -> Self {
        Self::new(
            &[
                DIGIT_FORM,
                PUNCTUATION_FORM,
                UPPER_LETTER_FORM,
                LOWER_LETTER_FORM,
            ]
            .concat(),
            ".",
        )
    }

    /// Returns a copy of this class with the given characters removed.
    #[must_use]
    pub fn without<N: Into<String>>(&self, chars: &str, name: N) -> Self {
        let mut accepted = self.accepted.clone();
        for c in chars.chars() {
            accepted.remove(&c);
        }
        Self {
            name: name.into(),
            accepted,
        }
    }

    /// Check whether the class accepts the given character.
    #[must_use]
    pub fn accepts(&self, c: char) -> bool {
        self.accepted.contains(&c)
    }

    /// The display name of the class.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of accepted characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    /// An empty class is legal but can never match.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    /// Iterate over the accepted characters in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.accepted.iter().copied()
    }
}

impl Display for CharClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_class() {
        let class = CharClass::single('x');
        assert!(class.accepts('x'));
        assert!(!class.accepts('y'));
        assert_eq!(class.to_string(), "x");
        assert_eq!(class.len(), 1);
    }

    #[test]
    fn predefined_classes() {
        let digits = CharClass::digits();
        assert!(('0'..='9').all(|c| digits.accepts(c)));
        assert!(!digits.accepts('a'));

        let letters = CharClass::letters();
        assert_eq!(letters.len(), 52);

        let any = CharClass::any();
        assert!(any.accepts(' '));
        assert!(any.accepts('$'));
        assert!(!any.accepts('"'));
    }

    #[test]
    fn range_and_without() {
        let printable = CharClass::from_range(' '..='~', "[ -~]");
        assert_eq!(printable.len(), 95);

        let unescaped = printable.without("\"\\", "[^\"\\]");
        assert_eq!(unescaped.len(), 93);
        assert!(!unescaped.accepts('"'));
        assert!(!unescaped.accepts('\\'));
        assert!(unescaped.accepts('{'));
    }

    #[test]
    fn empty_class_never_matches() {
        let empty = CharClass::new("", "[]");
        assert!(empty.is_empty());
        assert!(!empty.accepts('a'));
    }
}
