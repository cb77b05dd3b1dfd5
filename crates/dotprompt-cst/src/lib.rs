//! Lossless concrete syntax tree for dotprompt templates.
//!
//! Trees are built bottom-up by the parser out of shared, immutable
//! [`Subtree`]s. Hidden grammar helpers are spliced away at construction, so
//! the shape consumers see through [`Node`] does not depend on how the
//! grammar is factored. Every source byte belongs to exactly one leaf,
//! either as content or as the padding in front of it.

mod subtree;
pub use subtree::Subtree;

mod tree;
pub use tree::Tree;

mod node;
pub use node::{Children, Node, Walk};

mod cursor;
pub use cursor::TreeCursor;

mod edit;
pub use edit::{CleanRun, EditMap, InputEdit};

mod error;
pub use error::{ErrorCategory, SyntaxError, SyntaxErrorKind};

mod sexp;

pub mod lint;

pub use dotprompt_grammar::{FieldId, Symbol};
pub use dotprompt_tokenizer::Span;
