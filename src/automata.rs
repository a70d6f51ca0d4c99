//! # Automata
//!
//! Nondeterministic finite automata compiled from [`crate::regex::Term`]s:
//! - [`ThompsonBuilder`] compiles a term tree via Thompson's construction,
//!   extended with bounded `{n,m}` repetition
//! - [`Automaton`] holds the compiled graph and the epsilon-closure and
//!   reachability algorithms used to simulate it state-set by state-set

pub mod builder;
pub mod nfa;

// Re-exports
pub use builder::ThompsonBuilder;
pub use nfa::{Automaton, Matcher, StateId, StateSet, Transition};
