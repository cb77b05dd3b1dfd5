//! Compact parse table encoding.
//!
//! States with many entries get a dense row over every symbol. The rest live
//! in the small-state table as groups of symbols sharing one value:
//!
//! ```text
//! [group_count, value, symbol_count, symbol..., value, symbol_count, symbol..., ...]
//! ```
//!
//! Terminal entries are indices into `parse_actions`, where index 0 is the
//! empty action list. Nonterminal entries are goto states; the start state
//! has no incoming edges, so 0 doubles as "no goto".

use std::collections::{BTreeMap, HashMap};

use dotprompt_tokenizer::LexMode;

use crate::lr::Automaton;
use crate::rules::ProductionId;
use crate::{GrammarError, Symbol, SYMBOL_COUNT};

/// A parse state id.
pub type StateId = u16;

/// States with more entries than this get a dense row.
pub const SMALL_STATE_THRESHOLD: usize = 12;

/// What the parser does for a state and lookahead terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseAction {
    /// Push the token and move to the state.
    Shift(StateId),
    /// Pop `child_count` entries and build a `symbol` node.
    Reduce {
        symbol: Symbol,
        child_count: u8,
        production_id: ProductionId,
    },
    /// The document is complete.
    Accept,
}

/// An entry of the shared action list: a header counting the actions that
/// follow it, or an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseActionEntry {
    Header { count: u8 },
    Action(ParseAction),
}

/// Compressed parse tables.
#[derive(Debug, Clone)]
pub struct ParseTable {
    pub state_count: usize,
    pub large_state_count: usize,
    /// `large_state_count` rows of `SYMBOL_COUNT` entries.
    pub parse_table: Vec<u16>,
    pub small_parse_table: Vec<u16>,
    /// Offset into `small_parse_table` for state `large_state_count + i`.
    pub small_parse_table_map: Vec<u32>,
    pub parse_actions: Vec<ParseActionEntry>,
    pub lex_modes: Vec<LexMode>,
}

impl ParseTable {
    /// Compress an automaton, renumbering states so dense ones come first.
    /// The start state stays state 0.
    pub(crate) fn compress(automaton: &Automaton) -> Result<Self, GrammarError> {
        let states = &automaton.states;
        let entry_count = |i: usize| states[i].actions.len() + states[i].gotos.len();

        let (large, small): (Vec<usize>, Vec<usize>) =
            (0..states.len()).partition(|&i| i == 0 || entry_count(i) > SMALL_STATE_THRESHOLD);
        let order: Vec<usize> = large.iter().chain(small.iter()).copied().collect();
        let mut renumber = vec![0u16; states.len()];
        for (new, &old) in order.iter().enumerate() {
            renumber[old] = u16::try_from(new).map_err(|_| GrammarError::TooManyStates(states.len()))?;
        }

        let mut table = ParseTable {
            state_count: states.len(),
            large_state_count: large.len(),
            parse_table: vec![0; large.len() * SYMBOL_COUNT],
            small_parse_table: Vec::new(),
            small_parse_table_map: Vec::with_capacity(small.len()),
            parse_actions: vec![ParseActionEntry::Header { count: 0 }],
            lex_modes: order.iter().map(|&old| states[old].lex_mode).collect(),
        };
        let mut action_index: HashMap<ParseAction, u16> = HashMap::new();

        for (new, &old) in order.iter().enumerate() {
            let state = &states[old];
            let mut entries: BTreeMap<Symbol, u16> = BTreeMap::new();
            for (&terminal, &action) in &state.actions {
                let action = match action {
                    ParseAction::Shift(target) => ParseAction::Shift(renumber[target as usize]),
                    other => other,
                };
                let index = *action_index.entry(action).or_insert_with(|| {
                    table.parse_actions.push(ParseActionEntry::Header { count: 1 });
                    table.parse_actions.push(ParseActionEntry::Action(action));
                    (table.parse_actions.len() - 2) as u16
                });
                entries.insert(terminal, index);
            }
            for (&nonterminal, &target) in &state.gotos {
                entries.insert(nonterminal, renumber[target]);
            }

            if new < table.large_state_count {
                let row = &mut table.parse_table[new * SYMBOL_COUNT..(new + 1) * SYMBOL_COUNT];
                for (symbol, value) in entries {
                    row[symbol.index()] = value;
                }
            } else {
                table.small_parse_table_map.push(table.small_parse_table.len() as u32);
                let mut groups: BTreeMap<u16, Vec<Symbol>> = BTreeMap::new();
                for (symbol, value) in entries {
                    groups.entry(value).or_default().push(symbol);
                }
                table.small_parse_table.push(groups.len() as u16);
                for (value, symbols) in groups {
                    table.small_parse_table.push(value);
                    table.small_parse_table.push(symbols.len() as u16);
                    table.small_parse_table.extend(symbols.iter().map(|s| s.0));
                }
            }
        }
        Ok(table)
    }

    /// Raw table value for a state and symbol, 0 when empty.
    pub fn entry(&self, state: StateId, symbol: Symbol) -> u16 {
        let state = state as usize;
        if symbol.index() >= SYMBOL_COUNT || state >= self.state_count {
            return 0;
        }
        if state < self.large_state_count {
            return self.parse_table[state * SYMBOL_COUNT + symbol.index()];
        }
        let mut i = self.small_parse_table_map[state - self.large_state_count] as usize;
        let group_count = self.small_parse_table[i];
        i += 1;
        for _ in 0..group_count {
            let value = self.small_parse_table[i];
            let symbol_count = self.small_parse_table[i + 1] as usize;
            i += 2;
            if self.small_parse_table[i..i + symbol_count].contains(&symbol.0) {
                return value;
            }
            i += symbol_count;
        }
        0
    }

    /// The action for a terminal lookahead, if any.
    pub fn action(&self, state: StateId, terminal: Symbol) -> Option<ParseAction> {
        if !terminal.is_terminal() {
            return None;
        }
        let index = self.entry(state, terminal) as usize;
        match self.parse_actions.get(index..index + 2)? {
            [ParseActionEntry::Header { count }, ParseActionEntry::Action(action)] if *count > 0 => Some(*action),
            _ => None,
        }
    }

    /// The goto state for a nonterminal, if any.
    pub fn next_state(&self, state: StateId, nonterminal: Symbol) -> Option<StateId> {
        if !nonterminal.is_nonterminal() {
            return None;
        }
        match self.entry(state, nonterminal) {
            0 => None,
            target => Some(target),
        }
    }

    /// The lex mode of a state.
    pub fn lex_mode(&self, state: StateId) -> LexMode {
        self.lex_modes.get(state as usize).copied().unwrap_or_default()
    }

    /// Terminals with an action in `state`.
    pub fn valid_terminals(&self, state: StateId) -> impl Iterator<Item = Symbol> + '_ {
        (0..crate::TOKEN_COUNT as u16)
            .map(Symbol)
            .filter(move |&t| self.action(state, t).is_some())
    }
}
