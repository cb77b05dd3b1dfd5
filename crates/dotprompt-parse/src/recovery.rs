//! Error recovery.
//!
//! Recovery never fails. Unexpected tokens are skipped into ERROR extras
//! until parsing can go on, either because the stack accepts the next token
//! or because a synchronizing token like `}}` closed the construct it was
//! stuck in. A skipped `{{`-style opener is always skipped through to its
//! closer. At the end of input, unfinished constructs are completed with
//! zero-width missing nodes.

use std::sync::Arc;

use dotprompt_cst::{Subtree, SyntaxErrorKind};
use dotprompt_grammar::{ParseAction, StateId, Symbol};
use dotprompt_tokenizer::{LexMode, Token, TokenKind};
use tracing::{debug, trace};

use crate::parser::Run;

/// What the parse loop does after recovery.
pub(crate) enum Recovery {
    /// Continue with this lookahead.
    Resume(Token),
    /// Recovery gave up; this is the root.
    Abandoned(Arc<Subtree>),
}

/// Tokens the end-of-input recovery may invent, and the error each one
/// reports. The first one the stack can take wins.
const CLOSERS: [(Symbol, SyntaxErrorKind); 6] = [
    (Symbol::CLOSE, missing(Symbol::CLOSE)),
    (Symbol::CLOSE_LONG_COMMENT, missing(Symbol::CLOSE_LONG_COMMENT)),
    (Symbol::DOUBLE_QUOTE, missing(Symbol::DOUBLE_QUOTE)),
    (Symbol::SINGLE_QUOTE, missing(Symbol::SINGLE_QUOTE)),
    (Symbol::FRONTMATTER_DELIMITER, SyntaxErrorKind::UnclosedFrontmatter),
    (Symbol::NEWLINE, missing(Symbol::NEWLINE)),
];

const fn missing(expected: Symbol) -> SyntaxErrorKind {
    SyntaxErrorKind::MissingToken { expected }
}

impl Run<'_> {
    /// Recover from `token`, which the top state has no action for.
    pub(crate) fn recover(&mut self, token: Token) -> Recovery {
        let kind = SyntaxErrorKind::UnexpectedToken {
            found: Symbol::from(token.kind),
        };
        debug!(state = self.stack.top_state(), kind = %token.kind, span = %token.span, "recovering");

        let mut skipped: Vec<Arc<Subtree>> = Vec::new();
        let mut token = token;
        // Set once a skipped opener puts us inside a `{{ ... }}` form, which
        // is then skipped up to its closer.
        let mut inside: Option<LexMode> = None;
        loop {
            if self.options.is_cancelled() {
                return Recovery::Abandoned(self.abandon(SyntaxErrorKind::Cancelled));
            }
            if !self.charge_recovery() {
                debug!(position = self.position, "recovery budget exhausted");
                return Recovery::Abandoned(self.abandon(kind));
            }

            if token.kind == TokenKind::End {
                self.push_error(skipped, kind, Some(0));
                return self.recover_at_end(token);
            }

            let state = self.stack.top_state();
            let token_here = self.demote(state, token);
            if inside.is_none() && !skipped.is_empty() && self.accepts(state, &token_here) {
                self.push_error(skipped, kind, Some(0));
                return Recovery::Resume(token_here);
            }

            trace!(kind = %token.kind, span = %token.span, "skipping");
            skipped.push(Arc::new(Subtree::leaf(&token, state)));
            self.position = token.span.end;
            if inside.is_none() {
                inside = token.kind.opens();
            }

            if token.kind.is_synchronizing() {
                if let Some((depth, next)) = self.resynchronize(token.kind) {
                    let mut children = self.stack.truncate(depth);
                    let offending = children.len();
                    children.append(&mut skipped);
                    self.push_error(children, kind, Some(offending));
                    return Recovery::Resume(next);
                }
                inside = None;
            }
            token = match inside {
                Some(mode) => self.lexer.lex(self.position, mode),
                None => self.lex(),
            };
        }
    }

    /// The deepest stack position, nearest the top, where parsing can go on
    /// after the synchronizing `closer`, with the token to go on with.
    fn resynchronize(&self, closer: TokenKind) -> Option<(usize, Token)> {
        let modes = closer.resume_modes();
        (0..=self.stack.len()).rev().find_map(|depth| {
            let state = self.stack.state_at(depth);
            let mode = self.language.lex_mode(state);
            if !modes.contains(&mode) {
                return None;
            }
            let next = self.demote(state, self.lexer.lex(self.position, mode));
            self.accepts(state, &next).then_some((depth, next))
        })
    }

    /// Finish the document at the end of input: reduce what can be reduced,
    /// and where nothing can, invent the closer the innermost open construct
    /// is waiting for.
    fn recover_at_end(&mut self, end: Token) -> Recovery {
        loop {
            let top = self.stack.top_state();
            if self.language.action(top, Symbol::END).is_some() {
                return Recovery::Resume(end);
            }
            if !self.charge_recovery() {
                return Recovery::Abandoned(self.abandon(SyntaxErrorKind::UnexpectedEof));
            }

            if let Some(ParseAction::Reduce {
                symbol,
                child_count,
                production_id,
            }) = self.language.any_reduction(top)
            {
                self.reduce(symbol, child_count, production_id, &end);
                continue;
            }

            let Some((depth, fix)) = self.find_closer() else {
                debug!(position = self.position, "no way to finish the document");
                return Recovery::Abandoned(self.abandon(SyntaxErrorKind::UnexpectedEof));
            };
            let popped = self.stack.truncate(depth);
            self.push_error(popped, SyntaxErrorKind::UnexpectedEof, None);
            if let Some((kind, next)) = fix {
                debug!(expected = ?kind.expected(), position = self.position, "inserting missing node");
                self.stack.push(next, Arc::new(Subtree::missing(kind)));
            }
        }
    }

    /// Scan the stack from the top for a state that can take the end of
    /// input directly, or take a missing closer.
    fn find_closer(&self) -> Option<(usize, Option<(SyntaxErrorKind, StateId)>)> {
        let top = self.stack.len();
        (0..=top).rev().find_map(|depth| {
            let state = self.stack.state_at(depth);
            if depth < top && self.language.action(state, Symbol::END).is_some() {
                return Some((depth, None));
            }
            if let Some(next) = self.language.next_state(state, Symbol::CLOSE_BLOCK) {
                return Some((depth, Some((SyntaxErrorKind::UnclosedBlock, next))));
            }
            CLOSERS.iter().find_map(|&(symbol, kind)| match self.language.action(state, symbol) {
                Some(ParseAction::Shift(next)) => Some((depth, Some((kind, next)))),
                _ => None,
            })
        })
    }

    /// Push `children` as one ERROR extra, if there are any. Its diagnostic
    /// points at child `offending`, the token recovery started from.
    fn push_error(&mut self, children: Vec<Arc<Subtree>>, kind: SyntaxErrorKind, offending: Option<usize>) {
        if children.is_empty() {
            return;
        }
        let located = offending.and_then(|index| {
            let token = children.get(index)?;
            let before: u32 = children[..index].iter().map(|c| c.total_len()).sum();
            Some((before + token.padding(), token.size()))
        });
        let mut error = Subtree::error(children, kind);
        if let Some((offset, len)) = located {
            error = error.with_offending(offset, len);
        }
        let error = error.into_extra();
        self.stack.push_extra(Arc::new(error));
    }
}
