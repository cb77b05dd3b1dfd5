//! Incremental LR parser for dotprompt templates.
//!
//! A dotprompt source is an optional license header of `#` comments, optional
//! YAML frontmatter between `---` lines, and a Handlebars template body. The
//! parser drives a mode-switching lexer from its LR state and builds a
//! lossless [`Tree`]. Parsing never fails: invalid input is kept in ERROR
//! nodes and unfinished constructs get zero-width missing closers.
//!
//! # Example
//!
//! ```
//! let source = "---\nmodel: gemini\n---\nHello {{name}}!\n";
//! let tree = dotprompt_parse::parse(source);
//!
//! assert!(!tree.has_errors());
//! assert_eq!(tree.root().kind(), "document");
//!
//! // Every byte is in exactly one leaf.
//! let text: String = tree.leaves().map(|leaf| leaf.padded_span().slice(source)).collect();
//! assert_eq!(text, source);
//! ```
//!
//! # Incremental reparsing
//!
//! ```
//! use dotprompt_parse::{parse, parse_incremental, InputEdit};
//!
//! let old = "Hello {{name}}!";
//! let new = "Hello {{user.name}}!";
//! let tree = parse(old);
//!
//! let edit = InputEdit::between(old, new);
//! let reparsed = parse_incremental(new, &tree, &[edit]);
//! assert_eq!(reparsed, parse(new));
//! ```

mod options;
pub use options::ParseOptions;

mod parser;
pub use parser::Parser;

mod recovery;
mod reuse;
mod stack;

pub use dotprompt_cst::{
    ErrorCategory, InputEdit, Node, Span, Subtree, Symbol, SyntaxError, SyntaxErrorKind, Tree, TreeCursor,
    lint,
};

/// Parse a dotprompt source with default options.
pub fn parse(source: &str) -> Tree {
    parse_with_options(source, &ParseOptions::default())
}

/// Parse a dotprompt source with custom options.
pub fn parse_with_options(source: &str, options: &ParseOptions) -> Tree {
    Parser::new(options.clone()).parse(source, None)
}

/// Reparse after `edits` turned the source of `prior` into `source`.
///
/// Edits are applied in order, each against the text the previous one
/// produced. The result is structurally equal to `parse(source)`.
pub fn parse_incremental(source: &str, prior: &Tree, edits: &[InputEdit]) -> Tree {
    parse_incremental_with_options(source, prior, edits, &ParseOptions::default())
}

/// [`parse_incremental`] with custom options.
pub fn parse_incremental_with_options(
    source: &str,
    prior: &Tree,
    edits: &[InputEdit],
    options: &ParseOptions,
) -> Tree {
    Parser::new(options.clone()).parse(source, Some((prior, edits)))
}

#[cfg(test)]
mod tests;
