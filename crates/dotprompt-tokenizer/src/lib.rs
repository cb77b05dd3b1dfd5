//! A mode-driven tokenizer for dotprompt sources.
//!
//! The lexer never looks at parser state. Every call names the [`LexMode`]
//! to recognize tokens in, which the parser derives from its current state.

mod span;
pub use span::Span;

mod token;
pub use token::{Token, TokenKind};

mod mode;
pub use mode::LexMode;

mod lexer;
pub use lexer::Lexer;
