//! The shared language descriptor.

use dotprompt_tokenizer::LexMode;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::lr::build_automaton;
use crate::rules::{self, FieldMapEntry, Production, ProductionId, PRODUCTIONS};
use crate::symbol::FIELD_NAMES;
use crate::{
    FieldId, GrammarError, ParseAction, ParseActionEntry, ParseTable, StateId, Symbol, SymbolMetadata, ALIAS_COUNT,
    SYMBOL_COUNT, TOKEN_COUNT,
};

/// Version of the table layout.
pub const LANGUAGE_VERSION: u32 = 1;

/// Everything a parser or query engine needs to know about the grammar.
#[derive(Debug)]
pub struct Language {
    table: ParseTable,
    start_state: StateId,
}

static LANGUAGE: Lazy<Language> = Lazy::new(|| match Language::build() {
    Ok(language) => language,
    Err(err) => panic!("dotprompt grammar tables are inconsistent: {err}"),
});

/// The dotprompt language, built on first use and shared afterwards.
pub fn language() -> &'static Language {
    &LANGUAGE
}

impl Language {
    /// Build the tables from the grammar rules.
    pub fn build() -> Result<Self, GrammarError> {
        let automaton = build_automaton(PRODUCTIONS, Symbol::DOCUMENT)?;
        let table = ParseTable::compress(&automaton)?;
        debug!(
            states = table.state_count,
            large_states = table.large_state_count,
            actions = table.parse_actions.len(),
            "built dotprompt language"
        );
        Ok(Self { table, start_state: 0 })
    }

    pub fn version(&self) -> u32 {
        LANGUAGE_VERSION
    }

    /// Terminals and nonterminals; aliases are counted separately.
    pub fn symbol_count(&self) -> usize {
        SYMBOL_COUNT
    }

    pub fn alias_count(&self) -> usize {
        ALIAS_COUNT
    }

    pub fn token_count(&self) -> usize {
        TOKEN_COUNT
    }

    pub fn state_count(&self) -> usize {
        self.table.state_count
    }

    pub fn large_state_count(&self) -> usize {
        self.table.large_state_count
    }

    pub fn field_count(&self) -> usize {
        FieldId::COUNT
    }

    pub fn start_state(&self) -> StateId {
        self.start_state
    }

    pub fn field_name(&self, field: FieldId) -> Option<&'static str> {
        field.name()
    }

    pub fn field_id_for_name(&self, name: &str) -> Option<FieldId> {
        FieldId::for_name(name)
    }

    /// All field names, index 0 unused.
    pub fn field_names(&self) -> &'static [&'static str] {
        &FIELD_NAMES
    }

    pub fn symbol_name(&self, symbol: Symbol) -> &'static str {
        symbol.name()
    }

    pub fn symbol_metadata(&self, symbol: Symbol) -> SymbolMetadata {
        symbol.metadata()
    }

    /// Look up a visible symbol by name. `ERROR` resolves to [`Symbol::ERROR`].
    pub fn symbol_for_name(&self, name: &str, named: bool) -> Option<Symbol> {
        if name == "ERROR" {
            return named.then_some(Symbol::ERROR);
        }
        Symbol::all().find(|s| {
            let meta = s.metadata();
            meta.visible && meta.named == named && meta.name == name && meta.public == *s
        })
    }

    pub fn public_symbol(&self, symbol: Symbol) -> Symbol {
        symbol.public()
    }

    /// Alias for child `index` of a production id.
    pub fn alias_at(&self, production_id: ProductionId, index: usize) -> Option<Symbol> {
        rules::alias_at(production_id, index)
    }

    /// Fields bound to child `index` of a production id.
    pub fn fields_at(&self, production_id: ProductionId, index: usize) -> impl Iterator<Item = FieldId> {
        rules::field_map(production_id)
            .iter()
            .filter(move |entry| entry.child_index as usize == index)
            .map(|entry| entry.field)
    }

    pub fn field_map(&self, production_id: ProductionId) -> &'static [FieldMapEntry] {
        rules::field_map(production_id)
    }

    /// Aliases a hidden nonterminal may be projected as.
    pub fn non_terminal_aliases(&self, symbol: Symbol) -> &'static [Symbol] {
        rules::NON_TERMINAL_ALIAS_MAP
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, aliases)| *aliases)
            .unwrap_or(&[])
    }

    pub fn action(&self, state: StateId, terminal: Symbol) -> Option<ParseAction> {
        self.table.action(state, terminal)
    }

    pub fn next_state(&self, state: StateId, nonterminal: Symbol) -> Option<StateId> {
        self.table.next_state(state, nonterminal)
    }

    pub fn lex_mode(&self, state: StateId) -> LexMode {
        self.table.lex_mode(state)
    }

    pub fn valid_terminals(&self, state: StateId) -> impl Iterator<Item = Symbol> + '_ {
        self.table.valid_terminals(state)
    }

    /// A reduce action available in `state` for any lookahead.
    pub fn any_reduction(&self, state: StateId) -> Option<ParseAction> {
        self.valid_terminals(state)
            .filter_map(|t| self.action(state, t))
            .find(|action| matches!(action, ParseAction::Reduce { .. }))
    }

    pub fn productions(&self) -> &'static [Production] {
        PRODUCTIONS
    }

    pub fn parse_table(&self) -> &[u16] {
        &self.table.parse_table
    }

    pub fn small_parse_table(&self) -> &[u16] {
        &self.table.small_parse_table
    }

    pub fn small_parse_table_map(&self) -> &[u32] {
        &self.table.small_parse_table_map
    }

    pub fn parse_actions(&self) -> &[ParseActionEntry] {
        &self.table.parse_actions
    }

    pub fn lex_modes(&self) -> &[LexMode] {
        &self.table.lex_modes
    }
}
