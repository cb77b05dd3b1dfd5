//! The table-driven parse loop.

use std::sync::Arc;

use dotprompt_cst::{InputEdit, Subtree, SyntaxErrorKind, Tree};
use dotprompt_grammar::{language, Language, ParseAction, ProductionId, StateId, Symbol};
use dotprompt_tokenizer::{LexMode, Lexer, Token, TokenKind};
use tracing::{debug, trace, warn};

use crate::recovery::Recovery;
use crate::reuse::ReuseIndex;
use crate::stack::Stack;
use crate::ParseOptions;

/// An LR parser for dotprompt sources.
///
/// Holds only options; every call to [`Parser::parse`] is independent.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: ParseOptions,
}

impl Parser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse `source`. With a prior tree and the edits that turned its
    /// source into `source`, unchanged subtrees of the prior tree are reused.
    pub fn parse(&self, source: &str, prior: Option<(&Tree, &[InputEdit])>) -> Tree {
        let reuse = match prior {
            Some((tree, edits)) if self.options.reuse_subtrees => Some(ReuseIndex::new(tree, edits)),
            _ => None,
        };
        debug!(bytes = source.len(), incremental = reuse.is_some(), "parse start");
        let run = Run::new(source, &self.options, reuse);
        let root = run.run();
        Tree::new(root, source)
    }
}

/// State of one parse.
pub(crate) struct Run<'a> {
    pub(crate) language: &'static Language,
    pub(crate) lexer: Lexer<'a>,
    pub(crate) options: &'a ParseOptions,
    pub(crate) stack: Stack,
    /// Everything before this offset is on the stack.
    pub(crate) position: u32,
    reuse: Option<ReuseIndex>,
    /// Lex mode for the token after a reused subtree.
    next_mode: Option<LexMode>,
    recovery_steps: usize,
    reused: usize,
}

impl<'a> Run<'a> {
    fn new(source: &'a str, options: &'a ParseOptions, reuse: Option<ReuseIndex>) -> Self {
        let language = language();
        Self {
            language,
            lexer: Lexer::new(source),
            options,
            stack: Stack::new(language.start_state()),
            position: 0,
            reuse,
            next_mode: None,
            recovery_steps: 0,
            reused: 0,
        }
    }

    fn run(mut self) -> Arc<Subtree> {
        let mut lookahead: Option<Token> = None;
        loop {
            let token = match lookahead.take() {
                Some(token) => token,
                None => {
                    if self.options.is_cancelled() {
                        debug!(position = self.position, "parse cancelled");
                        return self.abandon(SyntaxErrorKind::Cancelled);
                    }
                    match self.next_mode.take() {
                        Some(mode) => self.lexer.lex(self.position, mode),
                        None => self.lex(),
                    }
                }
            };

            if self.reuse_subtree(&token) {
                continue;
            }

            let state = self.stack.top_state();
            let token = self.demote(state, token);
            match self.language.action(state, Symbol::from(token.kind)) {
                Some(ParseAction::Shift(next)) => self.shift(next, &token),
                Some(ParseAction::Reduce {
                    symbol,
                    child_count,
                    production_id,
                }) => {
                    self.reduce(symbol, child_count, production_id, &token);
                    lookahead = Some(token);
                }
                Some(ParseAction::Accept) => return self.accept(),
                None => match self.recover(token) {
                    Recovery::Resume(token) => lookahead = Some(token),
                    Recovery::Abandoned(root) => return root,
                },
            }
        }
    }

    /// Lex the next token in the mode of the top state.
    pub(crate) fn lex(&self) -> Token {
        let mode = self.language.lex_mode(self.stack.top_state());
        self.lexer.lex(self.position, mode)
    }

    /// Retype `true` and `false` as paths where only a path fits.
    pub(crate) fn demote(&self, state: StateId, token: Token) -> Token {
        let keyword = matches!(token.kind, TokenKind::True | TokenKind::False);
        if keyword
            && self.language.action(state, Symbol::from(token.kind)).is_none()
            && self.language.action(state, Symbol::PATH).is_some()
        {
            trace!(kind = %token.kind, "demoting keyword to path");
            return Token {
                kind: TokenKind::Path,
                ..token
            };
        }
        token
    }

    /// Whether `state` has an action for `token`.
    pub(crate) fn accepts(&self, state: StateId, token: &Token) -> bool {
        self.language.action(state, Symbol::from(token.kind)).is_some()
    }

    fn shift(&mut self, next: StateId, token: &Token) {
        let state = self.stack.top_state();
        trace!(state, next, kind = %token.kind, span = %token.span, "shift");
        self.position = token.span.end;
        self.stack.push(next, Arc::new(Subtree::leaf(token, state)));
    }

    /// Reduce with `lookahead` as the token that called for it.
    pub(crate) fn reduce(&mut self, symbol: Symbol, child_count: u8, production_id: ProductionId, lookahead: &Token) {
        // The start symbol takes every stack entry, extras included.
        let take_all = symbol == Symbol::DOCUMENT;
        let (children, trailing) = self.stack.pop_children(child_count as usize, take_all);
        let state = self.stack.top_state();

        let mut node = Subtree::node(symbol, children, production_id, state, self.language);
        let end = self.position - trailing.iter().map(|t| t.total_len()).sum::<u32>();
        node.extend_lookahead(lookahead.scan_end().saturating_sub(end), lookahead.mode);
        if !trailing.is_empty() {
            // The token right after the node was skipped, not `lookahead`.
            node.forbid_reuse();
        }
        trace!(state, symbol = %symbol, child_count, "reduce");

        let next = self.language.next_state(state, symbol).unwrap_or_else(|| {
            warn!(state, symbol = %symbol, "no goto after reduce");
            state
        });
        self.stack.push(next, Arc::new(node));
        for extra in trailing {
            self.stack.push_extra(extra);
        }
    }

    fn accept(self) -> Arc<Subtree> {
        debug!(
            bytes = self.lexer.source().len(),
            reused = self.reused,
            recovery_steps = self.recovery_steps,
            "parse finished"
        );
        let mut subtrees = self.stack.into_subtrees();
        match subtrees.pop() {
            Some(root) if subtrees.is_empty() => root,
            last => {
                subtrees.extend(last);
                Arc::new(Subtree::error(subtrees, SyntaxErrorKind::UnexpectedEof))
            }
        }
    }

    /// Push a prior subtree in place of `token`, if one fits here. The next
    /// token is then lexed in the mode the subtree's own lookahead used.
    fn reuse_subtree(&mut self, token: &Token) -> bool {
        let Some(index) = &self.reuse else {
            return false;
        };
        if token.padded_start() != self.position {
            return false;
        }
        let state = self.stack.top_state();
        let Some(subtree) = index.find(self.position, state, token.mode) else {
            return false;
        };
        let Some(next) = self.language.next_state(state, subtree.symbol()) else {
            return false;
        };
        debug!(
            symbol = %subtree.symbol(),
            position = self.position,
            bytes = subtree.total_len(),
            "reusing subtree"
        );
        self.position += subtree.total_len();
        self.next_mode = Some(subtree.lookahead_mode());
        self.stack.push(next, subtree);
        self.reused += 1;
        true
    }

    /// Count one recovery action; false once the budget is spent.
    pub(crate) fn charge_recovery(&mut self) -> bool {
        self.recovery_steps += 1;
        self.recovery_steps <= self.options.max_recovery_steps
    }

    /// Give up: everything on the stack and the unparsed rest of the input
    /// go under an ERROR root.
    pub(crate) fn abandon(&mut self, kind: SyntaxErrorKind) -> Arc<Subtree> {
        let stack = std::mem::replace(&mut self.stack, Stack::new(self.language.start_state()));
        let mut children = stack.into_subtrees();
        let rest = self.lexer.source().len() as u32 - self.position;
        if rest > 0 || children.is_empty() {
            children.push(Arc::new(Subtree::error_leaf(rest, kind)));
        }
        self.position += rest;
        Arc::new(Subtree::error(children, kind))
    }
}
