/*!
# Online Lexer

Segments a character stream into labeled tokens by simulating a merged,
multi-pattern [`Automaton`] one character at a time.

Patterns are given in priority order. Each is compiled with Thompson's
construction and hung under a synthetic entry state by an epsilon edge:

```text
         --ε--> pattern 1
(entry)  --ε--> pattern 2
         --ε--> ...
```

Matching is maximal munch: a token extends as long as the next character can
be consumed, and it is emitted as soon as it cannot. When several patterns
reach a final state on the same text, the final state with the smallest
creation index wins, which makes earlier patterns win ties.

# Examples

```
use jsonp::regex::Term;
use jsonp::tokenizer::Lexer;

let mut lexer = Lexer::new([
    Term::literal("true").group("true"),
    Term::plus(Term::letters()).group("word"),
    Term::plus(Term::char_range(" ", "[ ]")).group("space"),
]);

let labels: Vec<String> = lexer
    .tokenize("true truth")
    .expect("valid input")
    .into_iter()
    .map(|token| token.label.to_string())
    .collect();
assert_eq!(labels, ["true", "space", "word"]);
```
*/
use log::{debug, trace, warn};
use std::{error::Error, fmt, rc::Rc};

use crate::automata::{Automaton, StateId, StateSet, ThompsonBuilder};
use crate::regex::{Label, Term};
use crate::tokenizer::Token;

/// Represents errors that can occur while lexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// No pattern can account for the input: the frontier has no transition
    /// on the current character and no final state to close the pending
    /// match with.
    InvalidToken {
        /// The offending character, or `None` at end of input
        found: Option<char>,
        /// Characters consumed since the last emitted token
        pending: String,
        /// Byte offset of the offending character (or of the end of input)
        offset: usize,
    },
}

impl Error for LexError {}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidToken {
                found: Some(c),
                pending,
                offset,
            } => {
                write!(f, "Invalid token: unexpected {c:?} at byte {offset}")?;
                if !pending.is_empty() {
                    write!(f, " after {pending:?}")?;
                }
                Ok(())
            }
            Self::InvalidToken {
                found: None,
                pending,
                offset,
            } => write!(
                f,
                "Invalid token: {pending:?} is incomplete at end of input \
                 (byte {offset})"
            ),
        }
    }
}

/// A maximal-munch lexer over a set of prioritized patterns.
///
/// The compiled automaton is immutable and shared between clones, while the
/// frontier and buffer belong to each instance. After an error the lexer must
/// be [`reset`](Self::reset) before further use.
#[derive(Debug, Clone)]
pub struct Lexer {
    /// The merged automaton of all patterns
    automaton: Rc<Automaton>,
    /// Entry state every new match attempt starts from
    entry: StateId,
    /// Live states of the current match attempt, not yet epsilon-closed
    current: StateSet,
    /// Characters consumed since the last emitted token
    buffer: String,
    /// Byte offset at which `buffer` starts
    start: usize,
}

impl Lexer {
    /// Compile a lexer from grouped patterns, in priority order.
    ///
    /// Ungrouped patterns are accepted, but they have no final state and can
    /// never produce a token.
    pub fn new<I>(patterns: I) -> Self
    where
        I: IntoIterator<Item = Term>,
    {
        let patterns: Vec<Term> = patterns.into_iter().collect();
        for pattern in patterns.iter().filter(|p| !p.is_grouped()) {
            warn!(
                "Pattern `{pattern}` is not grouped and can never produce a \
                 token"
            );
        }

        let mut builder = ThompsonBuilder::new();
        let automaton = if let [single] = patterns.as_slice() {
            builder.build(single)
        } else {
            // Allocated first, so the entry has the lowest index.
            let entry = builder.fresh_state();
            let parts: Vec<Automaton> =
                patterns.iter().map(|p| builder.build(p)).collect();
            Automaton::merge(entry, parts)
        };

        debug!(
            "Compiled lexer for {} patterns: {} states, {} transitions, \
             {} classes",
            patterns.len(),
            automaton.num_states(),
            automaton.transitions().len(),
            automaton.alphabet().len()
        );

        Self::from_automaton(Rc::new(automaton))
    }

    /// Construct a lexer over an already compiled automaton, starting from
    /// its entry state.
    #[must_use]
    pub fn from_automaton(automaton: Rc<Automaton>) -> Self {
        let entry = automaton.entry();
        Self {
            automaton,
            entry,
            current: StateSet::from([entry]),
            buffer: String::new(),
            start: 0,
        }
    }

    /// The compiled automaton.
    #[must_use]
    pub const fn automaton(&self) -> &Rc<Automaton> {
        &self.automaton
    }

    /// Characters consumed since the last emitted token.
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Clear the buffer and restart matching from the entry state.
    pub fn reset(&mut self) {
        self.current = StateSet::from([self.entry]);
        self.buffer.clear();
        self.start = 0;
    }

    /// Feed one character.
    ///
    /// Returns `Ok(None)` while the pending match can still extend, or the
    /// token that `c` terminated. In the latter case `c` becomes the first
    /// character of the next match attempt.
    ///
    /// # Errors
    ///
    /// Returns [`LexError::InvalidToken`] if `c` cannot extend the pending
    /// match and no pattern has matched the pending text.
    pub fn feed(&mut self, c: char) -> Result<Option<Token>, LexError> {
        let closure = self.automaton.epsilon_closure(&self.current);
        let best = self.best_label(&closure);
        let next = self.automaton.reachable_on(&closure, c);

        if !next.is_empty() {
            self.current = self.automaton.epsilon_closure(&next);
            self.buffer.push(c);
            return Ok(None);
        }

        let Some(label) = best else {
            return Err(self.invalid(Some(c)));
        };
        let token = self.emit(label);

        // Re-seed from the entry, consuming `c` as the next token's first
        // character.
        let seed = self
            .automaton
            .epsilon_closure(&StateSet::from([self.entry]));
        self.current = self
            .automaton
            .epsilon_closure(&self.automaton.reachable_on(&seed, c));
        self.buffer.push(c);

        Ok(Some(token))
    }

    /// Flush the pending match at end of input.
    ///
    /// Afterwards the lexer restarts from its entry state, continuing the
    /// byte offsets of the input fed so far.
    ///
    /// # Errors
    ///
    /// Returns [`LexError::InvalidToken`] if no pattern has matched the
    /// pending text.
    pub fn flush(&mut self) -> Result<Token, LexError> {
        let closure = self.automaton.epsilon_closure(&self.current);
        let label = self
            .best_label(&closure)
            .ok_or_else(|| self.invalid(None))?;
        let token = self.emit(label);
        self.current = StateSet::from([self.entry]);
        Ok(token)
    }

    /// Reset, then tokenize the whole of `input`. Empty input yields no
    /// tokens.
    ///
    /// # Errors
    ///
    /// Returns the first [`LexError`] encountered.
    pub fn tokenize(&mut self, input: &str) -> Result<Vec<Token>, LexError> {
        self.stream(input.chars()).collect()
    }

    /// Reset, then lazily tokenize a stream of characters.
    pub fn stream<I>(&mut self, chars: I) -> TokenStream<'_, I::IntoIter>
    where
        I: IntoIterator<Item = char>,
    {
        self.reset();
        TokenStream {
            lexer: self,
            chars: chars.into_iter(),
            fed: false,
            finished: false,
        }
    }

    /// The label of the lowest-indexed final state in `closure`.
    fn best_label(&self, closure: &StateSet) -> Option<Label> {
        closure
            .iter()
            .find_map(|state| self.automaton.label(*state))
            .cloned()
    }

    /// Turn the buffer into a token and advance the offset past it.
    fn emit(&mut self, label: Label) -> Token {
        let content = std::mem::take(&mut self.buffer);
        let end = self.start + content.len();
        let token = Token {
            content,
            label,
            span: self.start..end,
        };
        self.start = end;
        trace!("Emitted {token} at {:?}", token.span);
        token
    }

    fn invalid(&self, found: Option<char>) -> LexError {
        LexError::InvalidToken {
            found,
            pending: self.buffer.clone(),
            offset: self.start + self.buffer.len(),
        }
    }
}

/// Iterator over the tokens of a character stream, see [`Lexer::stream`].
///
/// Yields at most one error, after which it is exhausted.
#[derive(Debug)]
pub struct TokenStream<'l, I> {
    lexer: &'l mut Lexer,
    chars: I,
    /// Whether any character was fed, so that empty input skips the flush
    fed: bool,
    finished: bool,
}

impl<I> Iterator for TokenStream<'_, I>
where
    I: Iterator<Item = char>,
{
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        for c in self.chars.by_ref() {
            self.fed = true;
            match self.lexer.feed(c) {
                Ok(None) => {}
                Ok(Some(token)) => return Some(Ok(token)),
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }

        self.finished = true;
        self.fed.then(|| self.lexer.flush())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::regex::CharClass;

    fn labels(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| &*t.label).collect()
    }

    fn contents(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.content.as_str()).collect()
    }

    #[test]
    fn single_pattern_literal() {
        let mut lexer = Lexer::new([Term::literal("abc").group("abc")]);
        assert_eq!(lexer.feed('a'), Ok(None));
        assert_eq!(lexer.feed('b'), Ok(None));
        assert_eq!(lexer.feed('c'), Ok(None));
        assert_eq!(lexer.pending(), "abc");

        let token = lexer.flush().unwrap();
        assert_eq!(token.content, "abc");
        assert_eq!(&*token.label, "abc");
        assert_eq!(token.span, 0..3);
    }

    #[test]
    fn earlier_pattern_wins_ties() {
        let patterns = [
            Term::literal("true").group("true"),
            Term::char_range("t", "t").group("t"),
        ];
        let mut lexer = Lexer::new(patterns.clone());
        for c in "true".chars() {
            assert_eq!(lexer.feed(c), Ok(None));
        }
        assert_eq!(&*lexer.flush().unwrap().label, "true");

        // A bare `t` still falls back to the single-character pattern.
        let mut lexer = Lexer::new(patterns);
        let tokens = lexer.tokenize("t").unwrap();
        assert_eq!(labels(&tokens), ["t"]);
    }

    #[test]
    fn simultaneous_finals_prefer_lowest_index() {
        let mut lexer = Lexer::new([
            Term::literal("if").group("keyword"),
            Term::plus(Term::letters()).group("identifier"),
        ]);
        let tokens = lexer.tokenize("if").unwrap();
        assert_eq!(labels(&tokens), ["keyword"]);

        let tokens = lexer.tokenize("iffy").unwrap();
        assert_eq!(labels(&tokens), ["identifier"]);
    }

    #[test]
    fn maximal_munch_splits_at_boundaries() {
        let mut lexer = Lexer::new([
            Term::plus(Term::letters()).group("word"),
            Term::plus(Term::digits()).group("int"),
            Term::plus(Term::char_range(" ", "[ ]")).group("space"),
        ]);
        let tokens = lexer.tokenize("abc 42  x9").unwrap();
        assert_eq!(contents(&tokens), ["abc", " ", "42", "  ", "x", "9"]);
        assert_eq!(
            labels(&tokens),
            ["word", "space", "int", "space", "word", "int"]
        );
        assert_eq!(tokens[2].span, 4..6);
    }

    #[test]
    fn no_backtracking_once_extended() {
        // `ab` starts extending the `abc` pattern, so `a` alone is never
        // reconsidered: the remaining `b` has no pattern of its own.
        let mut lexer = Lexer::new([
            Term::literal("a").group("a"),
            Term::literal("abc").group("abc"),
        ]);
        let err = lexer.tokenize("abd").unwrap_err();
        assert_eq!(
            err,
            LexError::InvalidToken {
                found: Some('d'),
                pending: "ab".to_string(),
                offset: 2
            }
        );
    }

    #[test]
    fn unmatched_character_is_an_error() {
        let mut lexer = Lexer::new([
            Term::literal("a").group("a"),
            Term::literal("b").group("b"),
        ]);
        let err = lexer.feed('$').unwrap_err();
        assert_eq!(
            err,
            LexError::InvalidToken {
                found: Some('$'),
                pending: String::new(),
                offset: 0
            }
        );
    }

    #[test]
    fn unmatched_character_after_token_surfaces_at_flush() {
        let mut lexer = Lexer::new([Term::literal("a").group("a")]);
        assert_eq!(lexer.feed('a'), Ok(None));

        let token = lexer.feed('$').unwrap().unwrap();
        assert_eq!(token.content, "a");

        let err = lexer.flush().unwrap_err();
        assert_eq!(
            err,
            LexError::InvalidToken {
                found: None,
                pending: "$".to_string(),
                offset: 2
            }
        );
        assert!(err.to_string().contains("end of input"));
    }

    #[test]
    fn incomplete_match_at_flush_is_an_error() {
        let mut lexer = Lexer::new([Term::literal("null").group("null")]);
        let err = lexer.tokenize("nul").unwrap_err();
        assert!(matches!(
            err,
            LexError::InvalidToken { found: None, ref pending, .. } if pending == "nul"
        ));
    }

    #[test]
    fn ungrouped_pattern_never_emits() {
        let mut lexer = Lexer::new([Term::literal("a")]);
        assert!(lexer.automaton().final_states().is_empty());
        assert!(lexer.tokenize("a").is_err());
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        let mut lexer = Lexer::new([Term::literal("a").group("a")]);
        assert_eq!(lexer.tokenize(""), Ok(Vec::new()));
    }

    #[test]
    fn reset_discards_pending_state() {
        let mut lexer = Lexer::new([
            Term::literal("ab").group("ab"),
            Term::literal("c").group("c"),
        ]);
        assert_eq!(lexer.feed('a'), Ok(None));
        lexer.reset();
        assert_eq!(lexer.pending(), "");
        assert_eq!(lexer.feed('c'), Ok(None));
        assert_eq!(lexer.flush().unwrap().span, 0..1);
    }

    #[test]
    fn clones_share_the_automaton() {
        let lexer = Lexer::new([Term::class(CharClass::digits()).group("digit")]);
        let mut first = lexer.clone();
        let mut second = lexer.clone();
        assert!(Rc::ptr_eq(first.automaton(), second.automaton()));

        assert_eq!(first.feed('1'), Ok(None));
        assert_eq!(second.tokenize("23").unwrap().len(), 2);
        assert_eq!(first.pending(), "1");
    }

    #[test]
    fn stream_matches_tokenize() {
        let mut lexer = Lexer::new([
            Term::plus(Term::digits()).group("int"),
            Term::literal(",").group(","),
        ]);
        let eager = lexer.tokenize("1,22,333").unwrap();
        let lazy: Vec<Token> = lexer
            .stream("1,22,333".chars())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(eager, lazy);
        assert_eq!(eager.len(), 5);
    }

    #[test]
    fn stream_stops_after_error() {
        let mut lexer = Lexer::new([Term::literal("a").group("a")]);
        let mut stream = lexer.stream("b".chars());
        assert!(matches!(stream.next(), Some(Err(_))));
        assert!(stream.next().is_none());
    }

    #[test]
    fn multibyte_spans_are_byte_offsets() {
        let mut lexer = Lexer::new([
            Term::char_range("é", "é").group("e"),
            Term::literal("x").group("x"),
        ]);
        let tokens = lexer.tokenize("éx").unwrap();
        assert_eq!(tokens[0].span, 0..2);
        assert_eq!(tokens[1].span, 2..3);
    }
}
