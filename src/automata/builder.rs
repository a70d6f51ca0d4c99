/*!
# Thompson Construction

Compiles a [`Term`] into an [`Automaton`] between two boundary states. Each
variant contributes a small fragment:

```text
ε        (enter) --ε--> (exit)
c        (enter) --c--> (exit)
l r      (enter) --l--> (mid_exit) --ε--> (mid_enter) --r--> (exit)
l | r    (enter) --ε--> (enter_l) --l--> (exit_l) --ε--> (exit)
         (enter) --ε--> (enter_r) --r--> (exit_r) --ε--> (exit)
t*       (enter) --ε--> (enter_t) --t--> (exit_t) --ε--> (exit)
         (enter) --ε--> (exit),  (exit_t) --ε--> (enter_t)
t{n,m}   q0 = enter --t--> q1 --t--> ... --t--> qm = exit
         q[i] --ε--> exit  for every n <= i < m
```

States are allocated depth-first, so terms compiled earlier receive lower
indices. The lexer relies on this ordering for rule priority.
*/
use crate::automata::nfa::{Automaton, Matcher, StateId};
use crate::regex::{Term, TermKind};

/// Compiles terms into automata, owning the counter that numbers states.
///
/// Every state allocated by one builder has a distinct index, so automata
/// produced by the same builder can be merged without collisions.
#[derive(Debug, Default)]
pub struct ThompsonBuilder {
    /// Index of the next state to allocate
    next_state: usize,
}

impl ThompsonBuilder {
    /// Construct a builder whose first state is `s0`.
    #[must_use]
    pub const fn new() -> Self {
        Self { next_state: 0 }
    }

    /// Allocate a fresh state.
    pub const fn fresh_state(&mut self) -> StateId {
        let state = StateId::new(self.next_state);
        self.next_state += 1;
        state
    }

    /// Number of states allocated so far.
    #[must_use]
    pub const fn allocated(&self) -> usize {
        self.next_state
    }

    /// Compile `term` between a freshly allocated entry and exit state.
    pub fn build(&mut self, term: &Term) -> Automaton {
        let entry = self.fresh_state();
        let exit = self.fresh_state();
        self.build_between(term, entry, exit)
    }

    /// Compile `term` into a fragment leading from `entry` to `exit`.
    ///
    /// If the term is grouped, `exit` becomes a final state carrying the
    /// term's label. When a grouped sub-term shares that exit, the label of
    /// the enclosing term is the one kept.
    pub fn build_between(
        &mut self,
        term: &Term,
        entry: StateId,
        exit: StateId,
    ) -> Automaton {
        let mut nfa = match term.kind() {
            TermKind::Epsilon => {
                let mut nfa = Automaton::with_entry(entry);
                nfa.add_transition(entry, exit, Matcher::Epsilon);
                nfa
            }
            TermKind::Char(class) => {
                let mut nfa = Automaton::with_entry(entry);
                nfa.add_transition(entry, exit, Matcher::Class(class.clone()));
                nfa
            }
            TermKind::Concat(left, right) => {
                self.build_concat(left, right, entry, exit)
            }
            TermKind::Alt(left, right) => {
                self.build_alt(left, right, entry, exit)
            }
            TermKind::Star(inner) => self.build_star(inner, entry, exit),
            TermKind::Repeat { inner, min, max } => {
                self.build_repeat(inner, *min, *max, entry, exit)
            }
        };

        if let Some(label) = term.label() {
            nfa.mark_final(exit, label.clone());
        }
        nfa
    }

    fn build_concat(
        &mut self,
        left: &Term,
        right: &Term,
        entry: StateId,
        exit: StateId,
    ) -> Automaton {
        let mid_exit = self.fresh_state();
        let mid_enter = self.fresh_state();
        let left = self.build_between(left, entry, mid_exit);
        let right = self.build_between(right, mid_enter, exit);

        let mut nfa = Automaton::with_entry(entry);
        nfa.absorb(left);
        nfa.absorb(right);
        nfa.add_transition(mid_exit, mid_enter, Matcher::Epsilon);
        nfa
    }

    fn build_alt(
        &mut self,
        left: &Term,
        right: &Term,
        entry: StateId,
        exit: StateId,
    ) -> Automaton {
        let enter_left = self.fresh_state();
        let exit_left = self.fresh_state();
        let enter_right = self.fresh_state();
        let exit_right = self.fresh_state();
        let left = self.build_between(left, enter_left, exit_left);
        let right = self.build_between(right, enter_right, exit_right);

        let mut nfa = Automaton::with_entry(entry);
        nfa.absorb(left);
        nfa.absorb(right);
        nfa.add_transition(entry, enter_left, Matcher::Epsilon);
        nfa.add_transition(entry, enter_right, Matcher::Epsilon);
        nfa.add_transition(exit_left, exit, Matcher::Epsilon);
        nfa.add_transition(exit_right, exit, Matcher::Epsilon);
        nfa
    }

    fn build_star(
        &mut self,
        inner: &Term,
        entry: StateId,
        exit: StateId,
    ) -> Automaton {
        let enter_inner = self.fresh_state();
        let exit_inner = self.fresh_state();
        let body = self.build_between(inner, enter_inner, exit_inner);

        let mut nfa = Automaton::with_entry(entry);
        nfa.absorb(body);
        nfa.add_transition(entry, enter_inner, Matcher::Epsilon);
        nfa.add_transition(entry, exit, Matcher::Epsilon);
        nfa.add_transition(exit_inner, enter_inner, Matcher::Epsilon);
        nfa.add_transition(exit_inner, exit, Matcher::Epsilon);
        nfa
    }

    /// Chain `max` copies of `inner` from `entry` to `exit`, then let the
    /// boundary after every count in `[min, max)` leave early.
    fn build_repeat(
        &mut self,
        inner: &Term,
        min: usize,
        max: usize,
        entry: StateId,
        exit: StateId,
    ) -> Automaton {
        let mut nfa = Automaton::with_entry(entry);
        let mut chain = Vec::with_capacity(max + 1);
        chain.push(entry);
        for count in 1..=max {
            let from = chain[count - 1];
            let to = if count == max { exit } else { self.fresh_state() };
            let copy = self.build_between(inner, from, to);
            nfa.absorb(copy);
            chain.push(to);
        }

        // q[min] through q[max - 1], inclusive
        for &boundary in &chain[min..max] {
            nfa.add_transition(boundary, exit, Matcher::Epsilon);
        }
        nfa
    }
}
