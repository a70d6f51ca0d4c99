/*!
# Term Algebra

Defines the expression tree describing a pattern and the helper constructors
used to assemble one.

# Examples

A term is built from constructors and grouped under a label so that its
automaton exit becomes a labeled final state:

```
use jsonp::regex::Term;

let number = Term::concat([
    Term::optional(Term::literal("-")),
    Term::plus(Term::digits()),
])
.group("number");

assert_eq!(number.to_string(), "(-|)[0-9][0-9]*");
assert_eq!(number.label().map(|l| &**l), Some("number"));
```

Bounded repetition rejects an inverted range:

```
use jsonp::regex::{Term, TermError};

let result = Term::repeat_range(Term::literal("a"), 3, 1);
assert_eq!(result, Err(TermError::InvalidRange { min: 3, max: 1 }));
```
*/
use std::{error::Error, fmt, rc::Rc};

use crate::regex::{CharClass, Label};

/// A pattern expression, plus the optional group label that marks it as an
/// independently matchable unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    kind: TermKind,
    group: Option<Label>,
}

/// The structural variants of a [`Term`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermKind {
    /// Matches the empty input
    Epsilon,
    /// Matches exactly one character of the class
    Char(Rc<CharClass>),
    /// Matches the left term followed by the right term
    Concat(Box<Term>, Box<Term>),
    /// Matches either the left or the right term
    Alt(Box<Term>, Box<Term>),
    /// Zero or more repetitions
    Star(Box<Term>),
    /// Between `min` and `max` (inclusive) repetitions, with `min < max`
    Repeat {
        /// The repeated term
        inner: Box<Term>,
        /// Minimum repetition count
        min: usize,
        /// Maximum repetition count
        max: usize,
    },
}

/// Represents errors raised while constructing a term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermError {
    /// A bounded repetition whose minimum exceeds its maximum.
    InvalidRange {
        /// Requested minimum
        min: usize,
        /// Requested maximum
        max: usize,
    },
}

impl Error for TermError {}

impl fmt::Display for TermError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRange { min, max } => {
                write!(f, "Invalid repetition range {{{min},{max}}}")
            }
        }
    }
}

impl Term {
    const fn from_kind(kind: TermKind) -> Self {
        Self { kind, group: None }
    }

    /// The structure of this term.
    #[must_use]
    pub const fn kind(&self) -> &TermKind {
        &self.kind
    }

    /// Whether this term was grouped.
    #[must_use]
    pub const fn is_grouped(&self) -> bool {
        self.group.is_some()
    }

    /// The group label, if this term was grouped.
    #[must_use]
    pub const fn label(&self) -> Option<&Label> {
        self.group.as_ref()
    }

    /// Mark this term as a matchable unit labeled `label`. Only the
    /// annotation changes; the structure is untouched.
    #[must_use]
    pub fn group<L: Into<Label>>(mut self, label: L) -> Self {
        self.group = Some(label.into());
        self
    }

    /// The empty-input term.
    #[must_use]
    pub const fn epsilon() -> Self {
        Self::from_kind(TermKind::Epsilon)
    }

    /// A single-character term over an existing class.
    #[must_use]
    pub fn class(class: CharClass) -> Self {
        Self::from_kind(TermKind::Char(Rc::new(class)))
    }

    /// A single-character term accepting any character of `chars`,
    /// displayed as `name`.
    pub fn char_range<N: Into<String>>(chars: &str, name: N) -> Self {
        Self::class(CharClass::new(chars, name))
    }

    /// `[0-9]`
    #[must_use]
    pub fn digits() -> Self {
        Self::class(CharClass::digits())
    }

    /// `[a-zA-Z]`
    #[must_use]
    pub fn letters() -> Self {
        Self::class(CharClass::letters())
    }

    /// Digits, common punctuation, the space character and letters.
    #[must_use]
    pub fn any() -> Self {
        Self::class(CharClass::any())
    }

    /// Concatenate terms in order, `t1 t2 t3 ...`.
    ///
    /// A single term is returned unchanged and an empty list yields
    /// [`Term::epsilon`].
    pub fn concat<I>(terms: I) -> Self
    where
        I: IntoIterator<Item = Self>,
        I::IntoIter: DoubleEndedIterator,
    {
        terms
            .into_iter()
            .rev()
            .reduce(|right, left| {
                Self::from_kind(TermKind::Concat(
                    Box::new(left),
                    Box::new(right),
                ))
            })
            .unwrap_or_else(Self::epsilon)
    }

    /// Alternate between terms, `t1 | t2 | t3 ...`.
    ///
    /// A single term is returned unchanged and an empty list yields an empty
    /// character class, which never matches.
    pub fn alt<I>(terms: I) -> Self
    where
        I: IntoIterator<Item = Self>,
        I::IntoIter: DoubleEndedIterator,
    {
        terms
            .into_iter()
            .rev()
            .reduce(|right, left| {
                Self::from_kind(TermKind::Alt(Box::new(left), Box::new(right)))
            })
            .unwrap_or_else(|| Self::char_range("", "[]"))
    }

    /// Kleene closure, zero or more repetitions.
    #[must_use]
    pub fn star(term: Self) -> Self {
        Self::from_kind(TermKind::Star(Box::new(term)))
    }

    /// One or more repetitions, `t t*`.
    #[must_use]
    pub fn plus(term: Self) -> Self {
        let repeated = Self::star(term.clone());
        Self::from_kind(TermKind::Concat(Box::new(term), Box::new(repeated)))
    }

    /// Zero or one occurrence, `t | ε`.
    #[must_use]
    pub fn optional(term: Self) -> Self {
        Self::from_kind(TermKind::Alt(
            Box::new(term),
            Box::new(Self::epsilon()),
        ))
    }

    /// Exactly `n` repetitions, as a plain concatenation of copies.
    #[must_use]
    pub fn repeat_exact(term: &Self, n: usize) -> Self {
        Self::concat(vec![term.clone(); n])
    }

    /// Between `min` and `max` repetitions, inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::InvalidRange`] if `min > max`.
    pub fn repeat_range(
        term: Self,
        min: usize,
        max: usize,
    ) -> Result<Self, TermError> {
        match min.cmp(&max) {
            std::cmp::Ordering::Equal => Ok(Self::repeat_exact(&term, min)),
            std::cmp::Ordering::Less => Ok(Self::from_kind(TermKind::Repeat {
                inner: Box::new(term),
                min,
                max,
            })),
            std::cmp::Ordering::Greater => {
                Err(TermError::InvalidRange { min, max })
            }
        }
    }

    /// Match the exact string `s`, one single-character class per char.
    #[must_use]
    pub fn literal(s: &str) -> Self {
        let chars: Vec<Self> =
            s.chars().map(|c| Self::class(CharClass::single(c))).collect();
        Self::concat(chars)
    }

    /// Precedence used by [`fmt::Display`] to decide on parentheses:
    /// alternation binds loosest, postfix operators tightest.
    const fn precedence(&self) -> u8 {
        match self.kind {
            TermKind::Alt(..) => 0,
            TermKind::Concat(..) => 1,
            TermKind::Epsilon
            | TermKind::Char(_)
            | TermKind::Star(_)
            | TermKind::Repeat { .. } => 2,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, min: u8) -> fmt::Result {
        if self.precedence() < min {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }

    /// Postfix operands need parentheses unless they are a single class.
    fn fmt_postfix_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TermKind::Char(_) => write!(f, "{self}"),
            _ => write!(f, "({self})"),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TermKind::Epsilon => Ok(()),
            TermKind::Char(class) => write!(f, "{class}"),
            TermKind::Concat(left, right) => {
                left.fmt_operand(f, 1)?;
                right.fmt_operand(f, 1)
            }
            TermKind::Alt(left, right) => write!(f, "{left}|{right}"),
            TermKind::Star(inner) => {
                inner.fmt_postfix_operand(f)?;
                write!(f, "*")
            }
            TermKind::Repeat { inner, min, max } => {
                inner.fmt_postfix_operand(f)?;
                write!(f, "{{{min},{max}}}")
            }
        }
    }
}
