/*!
# Automaton

Defines the nondeterministic finite automaton produced by Thompson's
construction, along with the graph algorithms needed to simulate it directly
on a set of live states:

- [`Automaton::reachable_epsilon`]: one epsilon step
- [`Automaton::reachable_on`]: one step on a concrete character
- [`Automaton::epsilon_closure`]: the breadth-first fixed point of epsilon
  steps

No determinization is performed; callers walk the state sets themselves, as
[`crate::tokenizer::Lexer`] does.

For reference:

- [Wikipedia: Thompson's construction](https://en.wikipedia.org/wiki/Thompson%27s_construction)
*/
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Display,
    rc::Rc,
};

use crate::regex::{CharClass, Label};

/// Identity of an automaton state. The wrapped creation index is unique per
/// [`crate::automata::ThompsonBuilder`] and doubles as the priority key when
/// several final states are reached at once: lower wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(usize);

impl StateId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The creation-order index of the state.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// A set of states, ordered by creation index.
pub type StateSet = BTreeSet<StateId>;

/// Condition for following a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Followed without consuming input
    Epsilon,
    /// Followed by consuming one character of the class
    Class(Rc<CharClass>),
}

impl Matcher {
    /// Check whether the matcher consumes the given character. Epsilon never
    /// accepts a concrete character.
    #[must_use]
    pub fn accepts(&self, c: char) -> bool {
        match self {
            Self::Epsilon => false,
            Self::Class(class) => class.accepts(c),
        }
    }

    /// Whether this is an epsilon matcher.
    #[must_use]
    pub const fn is_epsilon(&self) -> bool {
        matches!(self, Self::Epsilon)
    }
}

impl Display for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Epsilon => write!(f, "ε"),
            Self::Class(class) => write!(f, "{class}"),
        }
    }
}

/// A labeled edge of the automaton graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Source state
    pub from: StateId,
    /// Destination state
    pub to: StateId,
    /// Condition for following the edge
    pub matcher: Matcher,
}

/// A nondeterministic finite automaton with epsilon transitions.
///
/// Every automaton owns its states, alphabet and transitions outright;
/// combining automata moves the collections of the parts into the whole.
#[derive(Debug, Clone)]
pub struct Automaton {
    /// The designated entry state
    entry: StateId,

    /// All states of the automaton, including `entry`
    states: StateSet,

    /// Final states and the group label each one reports
    finals: BTreeMap<StateId, Label>,

    /// One entry per distinct character class used by a transition
    alphabet: BTreeSet<Rc<CharClass>>,

    /// Transitions in insertion order
    transitions: Vec<Transition>,
}

impl Display for Automaton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "NFA States: {}", self.states.len())?;
        writeln!(f, "Start State: {}", self.entry)?;
        writeln!(
            f,
            "Accepting States: {:?}",
            self.finals
                .iter()
                .map(|(state, label)| format!("{state} ({label})"))
                .collect::<Vec<_>>()
        )?;
        writeln!(f, "Alphabet ({} classes):", self.alphabet.len())?;
        for (i, class) in self.alphabet.iter().enumerate() {
            writeln!(f, "\t{i}: {class}")?;
        }
        writeln!(f, "Transitions:")?;
        for transition in &self.transitions {
            writeln!(
                f,
                "\t{} --{}--> {}",
                transition.from, transition.matcher, transition.to
            )?;
        }
        Ok(())
    }
}

impl Automaton {
    /// An automaton with a single state and no transitions.
    pub(crate) fn with_entry(entry: StateId) -> Self {
        Self {
            entry,
            states: StateSet::from([entry]),
            finals: BTreeMap::new(),
            alphabet: BTreeSet::new(),
            transitions: Vec::new(),
        }
    }

    /// Merge several automata under a shared `entry` state, with an epsilon
    /// edge from `entry` to the entry of every part. The parts are consumed.
    pub fn merge<I>(entry: StateId, parts: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut merged = Self::with_entry(entry);
        for part in parts {
            let part_entry = part.entry;
            merged.absorb(part);
            merged.add_transition(entry, part_entry, Matcher::Epsilon);
        }
        merged
    }

    /// Record an edge, registering both endpoints and the matcher's class.
    pub(crate) fn add_transition(
        &mut self,
        from: StateId,
        to: StateId,
        matcher: Matcher,
    ) {
        self.states.insert(from);
        self.states.insert(to);
        if let Matcher::Class(class) = &matcher {
            self.alphabet.insert(Rc::clone(class));
        }
        self.transitions.push(Transition { from, to, matcher });
    }

    /// Mark `state` as final, reporting `label`. Replaces any label set
    /// before.
    pub(crate) fn mark_final(&mut self, state: StateId, label: Label) {
        self.states.insert(state);
        self.finals.insert(state, label);
    }

    /// Move every state, final mark, class and transition of `other` into
    /// this automaton.
    pub(crate) fn absorb(&mut self, other: Self) {
        let Self {
            states,
            finals,
            alphabet,
            transitions,
            ..
        } = other;
        self.states.extend(states);
        self.finals.extend(finals);
        self.alphabet.extend(alphabet);
        self.transitions.extend(transitions);
    }

    /// The designated entry state.
    #[must_use]
    pub const fn entry(&self) -> StateId {
        self.entry
    }

    /// All states of the automaton.
    #[must_use]
    pub const fn states(&self) -> &StateSet {
        &self.states
    }

    /// Number of states.
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// The distinct character classes used by transitions.
    #[must_use]
    pub const fn alphabet(&self) -> &BTreeSet<Rc<CharClass>> {
        &self.alphabet
    }

    /// All transitions, in insertion order.
    #[must_use]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// All final states.
    #[must_use]
    pub fn final_states(&self) -> StateSet {
        self.finals.keys().copied().collect()
    }

    /// Whether `state` is final.
    #[must_use]
    pub fn is_final(&self, state: StateId) -> bool {
        self.finals.contains_key(&state)
    }

    /// The label reported by `state`, if it is final.
    #[must_use]
    pub fn label(&self, state: StateId) -> Option<&Label> {
        self.finals.get(&state)
    }

    /// The final state with the smallest creation index within `states`,
    /// i.e. the highest-priority match.
    #[must_use]
    pub fn best_final(&self, states: &StateSet) -> Option<StateId> {
        states.iter().copied().find(|state| self.is_final(*state))
    }

    /// States reachable by exactly one epsilon transition from any state in
    /// `states`.
    #[must_use]
    pub fn reachable_epsilon(&self, states: &StateSet) -> StateSet {
        self.step(states, Matcher::is_epsilon)
    }

    /// States reachable by exactly one transition consuming `c` from any
    /// state in `states`.
    #[must_use]
    pub fn reachable_on(&self, states: &StateSet, c: char) -> StateSet {
        self.step(states, |matcher| matcher.accepts(c))
    }

    /// States reachable by exactly one transition over the class `class`
    /// from any state in `states`.
    #[must_use]
    pub fn reachable_by(
        &self,
        states: &StateSet,
        class: &CharClass,
    ) -> StateSet {
        self.step(states, |matcher| {
            matches!(matcher, Matcher::Class(own) if **own == *class)
        })
    }

    fn step<F>(&self, states: &StateSet, follows: F) -> StateSet
    where
        F: Fn(&Matcher) -> bool,
    {
        self.transitions
            .iter()
            .filter(|t| states.contains(&t.from) && follows(&t.matcher))
            .map(|t| t.to)
            .collect()
    }

    /// The epsilon closure of `states`: every state reachable through zero
    /// or more epsilon transitions.
    ///
    /// Computed breadth-first, one layer of newly discovered states at a time,
    /// until a layer comes up empty. Each state joins at most one layer.
    #[must_use]
    pub fn epsilon_closure(&self, states: &StateSet) -> StateSet {
        let mut closure = states.clone();
        let mut layer = states.clone();
        while !layer.is_empty() {
            layer = self
                .reachable_epsilon(&layer)
                .into_iter()
                .filter(|state| !closure.contains(state))
                .collect();
            closure.extend(layer.iter().copied());
        }
        closure
    }

    /// Check whether the whole of `input` drives the automaton from its entry
    /// into a final state.
    #[must_use]
    pub fn accepts(&self, input: &str) -> bool {
        let mut current = self.epsilon_closure(&StateSet::from([self.entry]));
        for c in input.chars() {
            current = self.epsilon_closure(&self.reachable_on(&current, c));
            if current.is_empty() {
                return false;
            }
        }
        self.best_final(&current).is_some()
    }
}
