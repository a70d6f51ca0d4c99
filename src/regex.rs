//! # Regex Terms
//!
//! A small regular-expression term algebra. Patterns are assembled
//! programmatically from constructors rather than parsed from a string:
//! - Single-character classes and literal strings
//! - Concatenation, alternation and the Kleene star
//! - Bounded `{n,m}` repetition
//! - Grouping, which marks a term as a labeled, matchable unit
//!
//! Terms are compiled into automata by [`crate::automata::ThompsonBuilder`].

pub mod class;
pub mod term;

use std::rc::Rc;

/// Label attached to a grouped term and carried by the final state it
/// produces, e.g. `"number"` or `"{"`.
pub type Label = Rc<str>;

// Re-exports
pub use class::CharClass;
pub use term::{Term, TermError, TermKind};
