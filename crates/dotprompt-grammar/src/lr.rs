//! Canonical LR(1) automaton construction.

use std::collections::{BTreeMap, HashMap, VecDeque};

use dotprompt_tokenizer::LexMode;
use tracing::debug;

use crate::rules::Production;
use crate::{ParseAction, Symbol, SYMBOL_COUNT, TOKEN_COUNT};

/// Terminal sets fit in one word.
type TerminalSet = u32;

const _: () = assert!(TOKEN_COUNT <= TerminalSet::BITS as usize);

#[inline]
fn bit(terminal: Symbol) -> TerminalSet {
    1 << terminal.0
}

/// An error while building the parse tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// Two actions compete for the same state and lookahead.
    Conflict {
        state: usize,
        lookahead: Symbol,
        existing: ParseAction,
        incoming: ParseAction,
    },
    /// No lex mode recognizes every terminal valid in a state.
    NoLexMode { state: usize, terminals: Vec<Symbol> },
    /// A state id does not fit the table encoding.
    TooManyStates(usize),
}

impl std::fmt::Display for GrammarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarError::Conflict {
                state,
                lookahead,
                existing,
                incoming,
            } => write!(
                f,
                "conflict in state {state} on {lookahead:?} ({}): {existing:?} vs {incoming:?}",
                lookahead.name()
            ),
            GrammarError::NoLexMode { state, terminals } => {
                let names: Vec<_> = terminals.iter().map(|t| t.name()).collect();
                write!(f, "no lex mode covers state {state}: {}", names.join(", "))
            }
            GrammarError::TooManyStates(count) => write!(f, "{count} states exceed the table encoding"),
        }
    }
}

impl std::error::Error for GrammarError {}

/// One state of the automaton, before table compression.
#[derive(Debug, Clone, Default)]
pub(crate) struct State {
    pub actions: BTreeMap<Symbol, ParseAction>,
    pub gotos: BTreeMap<Symbol, usize>,
    pub lex_mode: LexMode,
}

/// The LR(1) automaton; state 0 is the start state.
#[derive(Debug, Clone)]
pub(crate) struct Automaton {
    pub states: Vec<State>,
}

/// An LR(1) item core `(production, dot)`. Production 0 is the augmented
/// start production; grammar production `i` is item production `i + 1`.
type Core = (u16, u8);

/// Item cores with their lookahead sets.
type ItemSet = BTreeMap<Core, TerminalSet>;

struct Builder<'g> {
    productions: &'g [Production],
    start: Symbol,
    by_lhs: Vec<Vec<u16>>,
    first: Vec<TerminalSet>,
    nullable: Vec<bool>,
}

impl<'g> Builder<'g> {
    fn new(productions: &'g [Production], start: Symbol) -> Self {
        let mut by_lhs = vec![Vec::new(); SYMBOL_COUNT];
        for (index, production) in productions.iter().enumerate() {
            by_lhs[production.lhs.index()].push(index as u16 + 1);
        }
        let mut builder = Self {
            productions,
            start,
            by_lhs,
            first: vec![0; SYMBOL_COUNT],
            nullable: vec![false; SYMBOL_COUNT],
        };
        builder.compute_first_sets();
        builder
    }

    fn rhs(&self, production: u16) -> &[Symbol] {
        match production {
            0 => std::slice::from_ref(&self.start),
            n => self.productions[n as usize - 1].rhs,
        }
    }

    fn compute_first_sets(&mut self) {
        loop {
            let mut changed = false;
            for production in self.productions {
                let lhs = production.lhs.index();
                let (first, nullable) = self.first_of_sequence(production.rhs);
                if self.first[lhs] | first != self.first[lhs] {
                    self.first[lhs] |= first;
                    changed = true;
                }
                if nullable && !self.nullable[lhs] {
                    self.nullable[lhs] = true;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }

    /// FIRST set of a sequence and whether it can derive the empty string.
    fn first_of_sequence(&self, symbols: &[Symbol]) -> (TerminalSet, bool) {
        let mut set = 0;
        for &symbol in symbols {
            if symbol.is_terminal() {
                return (set | bit(symbol), false);
            }
            set |= self.first[symbol.index()];
            if !self.nullable[symbol.index()] {
                return (set, false);
            }
        }
        (set, true)
    }

    fn closure(&self, kernel: ItemSet) -> ItemSet {
        let mut items = kernel;
        let mut work: VecDeque<Core> = items.keys().copied().collect();
        while let Some(core) = work.pop_front() {
            let (production, dot) = core;
            let rhs = self.rhs(production);
            let Some(&next) = rhs.get(dot as usize) else {
                continue;
            };
            if !next.is_nonterminal() {
                continue;
            }
            let (mut lookahead, nullable) = self.first_of_sequence(&rhs[dot as usize + 1..]);
            if nullable {
                lookahead |= items[&core];
            }
            for &candidate in &self.by_lhs[next.index()] {
                let entry = items.entry((candidate, 0)).or_insert(0);
                if *entry | lookahead != *entry {
                    *entry |= lookahead;
                    work.push_back((candidate, 0));
                }
            }
        }
        items
    }

    fn build(&self) -> Result<Automaton, GrammarError> {
        let start_kernel: ItemSet = [((0, 0), bit(Symbol::END))].into_iter().collect();
        let mut kernels: Vec<ItemSet> = vec![start_kernel.clone()];
        let mut index: HashMap<Vec<(Core, TerminalSet)>, usize> = HashMap::new();
        index.insert(start_kernel.into_iter().collect(), 0);
        let mut states: Vec<State> = Vec::new();

        let mut next = 0;
        while next < kernels.len() {
            let items = self.closure(kernels[next].clone());
            let mut state = State::default();

            let mut transitions: BTreeMap<Symbol, ItemSet> = BTreeMap::new();
            for (&(production, dot), &lookahead) in &items {
                let rhs = self.rhs(production);
                match rhs.get(dot as usize) {
                    Some(&symbol) => {
                        *transitions
                            .entry(symbol)
                            .or_default()
                            .entry((production, dot + 1))
                            .or_insert(0) |= lookahead;
                    }
                    None if production == 0 => {
                        insert_action(&mut state, next, Symbol::END, ParseAction::Accept)?;
                    }
                    None => {
                        let rule = &self.productions[production as usize - 1];
                        let reduce = ParseAction::Reduce {
                            symbol: rule.lhs,
                            child_count: rule.arity() as u8,
                            production_id: rule.production_id,
                        };
                        for terminal in terminals(lookahead) {
                            insert_action(&mut state, next, terminal, reduce)?;
                        }
                    }
                }
            }

            for (symbol, kernel) in transitions {
                let key: Vec<_> = kernel.iter().map(|(&c, &l)| (c, l)).collect();
                let target = match index.get(&key) {
                    Some(&target) => target,
                    None => {
                        let target = kernels.len();
                        kernels.push(kernel);
                        index.insert(key, target);
                        target
                    }
                };
                if symbol.is_terminal() {
                    let shift = ParseAction::Shift(target as u16);
                    insert_action(&mut state, next, symbol, shift)?;
                } else {
                    state.gotos.insert(symbol, target);
                }
            }

            state.lex_mode = lex_mode_for(next, &state)?;
            states.push(state);
            next += 1;
        }

        if states.len() > u16::MAX as usize {
            return Err(GrammarError::TooManyStates(states.len()));
        }
        debug!(states = states.len(), "built LR(1) automaton");
        Ok(Automaton { states })
    }
}

fn terminals(set: TerminalSet) -> impl Iterator<Item = Symbol> {
    (0..TOKEN_COUNT as u16)
        .map(Symbol)
        .filter(move |&t| set & bit(t) != 0)
}

fn insert_action(state: &mut State, id: usize, lookahead: Symbol, action: ParseAction) -> Result<(), GrammarError> {
    match state.actions.get(&lookahead) {
        Some(&existing) if existing != action => Err(GrammarError::Conflict {
            state: id,
            lookahead,
            existing,
            incoming: action,
        }),
        _ => {
            state.actions.insert(lookahead, action);
            Ok(())
        }
    }
}

/// The first mode, in priority order, that recognizes every terminal with an
/// action in `state`.
fn lex_mode_for(id: usize, state: &State) -> Result<LexMode, GrammarError> {
    LexMode::PRIORITY
        .into_iter()
        .find(|mode| {
            state
                .actions
                .keys()
                .all(|t| t.token_kind().is_some_and(|kind| mode.recognizes(kind)))
        })
        .ok_or_else(|| GrammarError::NoLexMode {
            state: id,
            terminals: state.actions.keys().copied().collect(),
        })
}

/// Build the canonical LR(1) automaton for `productions` rooted at `start`.
pub(crate) fn build_automaton(productions: &[Production], start: Symbol) -> Result<Automaton, GrammarError> {
    Builder::new(productions, start).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::PRODUCTIONS;

    fn automaton() -> Automaton {
        build_automaton(PRODUCTIONS, Symbol::DOCUMENT).expect("grammar should be LR(1)")
    }

    fn run(automaton: &Automaton, input: &[Symbol]) -> bool {
        let mut stack = vec![0usize];
        let mut input = input.iter().copied().chain([Symbol::END]);
        let mut lookahead = input.next();
        while let Some(token) = lookahead {
            let state = &automaton.states[*stack.last().unwrap()];
            match state.actions.get(&token) {
                Some(ParseAction::Shift(next)) => {
                    stack.push(*next as usize);
                    lookahead = input.next();
                }
                Some(ParseAction::Reduce {
                    symbol, child_count, ..
                }) => {
                    stack.truncate(stack.len() - *child_count as usize);
                    let top = &automaton.states[*stack.last().unwrap()];
                    stack.push(top.gotos[symbol]);
                }
                Some(ParseAction::Accept) => return true,
                None => return false,
            }
        }
        false
    }

    #[test]
    fn grammar_is_conflict_free() {
        dotprompt_testhelpers::setup();
        let automaton = automaton();
        assert!(automaton.states.len() > 50);
    }

    #[test]
    fn start_state_lexes_in_doc_start() {
        let automaton = automaton();
        assert_eq!(automaton.states[0].lex_mode, LexMode::DocStart);
    }

    #[test]
    fn accepts_token_sequences() {
        use Symbol as S;
        let automaton = automaton();
        assert!(run(&automaton, &[]));
        assert!(run(&automaton, &[S::HEADER_COMMENT, S::HEADER_COMMENT, S::TEXT]));
        assert!(run(
            &automaton,
            &[
                S::FRONTMATTER_DELIMITER,
                S::YAML_KEY,
                S::COLON,
                S::YAML_VALUE,
                S::NEWLINE,
                S::FRONTMATTER_DELIMITER,
                S::TEXT,
            ]
        ));
        assert!(run(
            &automaton,
            &[
                S::OPEN_BLOCK, S::PATH, S::PATH, S::CLOSE,
                S::TEXT,
                S::OPEN, S::ELSE, S::CLOSE,
                S::OPEN_END_BLOCK, S::PATH, S::CLOSE,
            ]
        ));
        assert!(run(&automaton, &[S::OPEN, S::PATH, S::PATH, S::EQ, S::NUMBER, S::CLOSE]));
    }

    #[test]
    fn rejects_else_outside_blocks() {
        use Symbol as S;
        let automaton = automaton();
        assert!(!run(&automaton, &[S::OPEN, S::ELSE, S::CLOSE]));
        assert!(!run(&automaton, &[S::TEXT, S::HEADER_COMMENT]));
        assert!(!run(&automaton, &[S::OPEN_BLOCK, S::PATH, S::CLOSE]));
    }
}
