//! Grammar tables for dotprompt templates.
//!
//! The grammar is written down once as a list of productions ([`rules`]).
//! On first use a canonical LR(1) automaton is built from it, packed into
//! dense and small-state tables, and each state is labeled with the lex mode
//! the lexer must use while the parser sits in it. The result is the shared,
//! read-only [`Language`] descriptor returned by [`language()`].

mod symbol;
pub use symbol::{FieldId, Symbol, SymbolMetadata, ALIAS_COUNT, SYMBOL_COUNT, TOKEN_COUNT};

pub mod rules;
pub use rules::{Production, ProductionId};

mod lr;
pub use lr::GrammarError;

mod table;
pub use table::{ParseAction, ParseActionEntry, ParseTable, StateId};

mod language;
pub use language::{language, Language, LANGUAGE_VERSION};

pub use dotprompt_tokenizer::LexMode;
