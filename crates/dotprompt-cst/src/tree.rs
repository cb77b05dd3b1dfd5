//! A parsed document.

use std::sync::Arc;

use dotprompt_grammar::Symbol;
use dotprompt_tokenizer::Span;

use crate::{InputEdit, Node, Subtree, SyntaxError, SyntaxErrorKind};

/// The result of a parse: the root subtree and a copy of the source it
/// was parsed from.
#[derive(Debug, Clone)]
pub struct Tree {
    root: Arc<Subtree>,
    source: String,
    pending_edits: Vec<InputEdit>,
}

impl Tree {
    pub fn new(root: Arc<Subtree>, source: impl Into<String>) -> Self {
        Self {
            root,
            source: source.into(),
            pending_edits: Vec::new(),
        }
    }

    /// The `document` node, or an ERROR node if the parse was cancelled.
    pub fn root(&self) -> Node<'_> {
        Node::new(self, &self.root, 0)
    }

    pub fn root_subtree(&self) -> &Arc<Subtree> {
        &self.root
    }

    /// The text this tree was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether any ERROR or missing node exists.
    pub fn has_errors(&self) -> bool {
        self.root.has_error()
    }

    /// ERROR and missing nodes, outermost first, in source order.
    pub fn error_nodes(&self) -> impl Iterator<Item = Node<'_>> + '_ {
        let mut stack = vec![self.root()];
        std::iter::from_fn(move || {
            while let Some(node) = stack.pop() {
                if !node.has_error() {
                    continue;
                }
                let start = stack.len();
                stack.extend(node.children());
                stack[start..].reverse();
                if node.error().is_some() {
                    return Some(node);
                }
            }
            None
        })
    }

    /// The errors of this tree, for diagnostics.
    pub fn errors(&self) -> Vec<SyntaxError> {
        let mut errors = Vec::new();
        let mut cursor = self.root().cursor();
        let mut visit = true;
        loop {
            let node = cursor.node();
            if visit && node.has_error() {
                if let Some(kind) = node.error() {
                    let mut error = SyntaxError::new(*kind, node.error_span());
                    if let Some(context) = opener_span(kind, cursor.ancestors().next()) {
                        error = error.with_context(context);
                    }
                    errors.push(error);
                }
                if cursor.goto_first_child() {
                    continue;
                }
            }
            if cursor.goto_next_sibling() {
                visit = true;
                continue;
            }
            if !cursor.goto_parent() {
                break;
            }
            visit = false;
        }
        errors
    }

    /// The tree as an s-expression over named nodes.
    pub fn to_sexp(&self) -> String {
        self.root().to_sexp()
    }

    /// Leaves in source order. Their padded spans tile the source.
    pub fn leaves(&self) -> impl Iterator<Item = Node<'_>> + '_ {
        self.root().leaves()
    }

    /// Smallest named node whose padded span contains `offset`.
    pub fn node_at(&self, offset: u32) -> Option<Node<'_>> {
        self.root().named_descendant_for_byte(offset)
    }

    /// Smallest node whose padded span contains `offset`.
    pub fn descendant_for_byte(&self, offset: u32) -> Option<Node<'_>> {
        self.root().descendant_for_byte(offset)
    }

    /// Smallest node covering `start..end`.
    pub fn descendant_for_range(&self, start: u32, end: u32) -> Option<Node<'_>> {
        self.root().descendant_for_range(start, end)
    }

    /// Record an edit made to the source since this tree was parsed.
    pub fn edit(&mut self, edit: &InputEdit) {
        self.pending_edits.push(*edit);
    }

    /// Edits recorded with [`Tree::edit`], in order.
    pub fn pending_edits(&self) -> &[InputEdit] {
        &self.pending_edits
    }
}

/// Where the construct a missing closer belongs to was opened.
fn opener_span(kind: &SyntaxErrorKind, parent: Option<Node<'_>>) -> Option<Span> {
    let parent = parent?;
    let opener = match kind {
        SyntaxErrorKind::UnclosedBlock if parent.symbol() == Symbol::HANDLEBARS_BLOCK => parent.child(0)?,
        SyntaxErrorKind::UnclosedFrontmatter if parent.symbol() == Symbol::FRONTMATTER => parent.child(0)?,
        _ => return None,
    };
    Some(opener.span())
}

/// Structural equality of the two trees and their sources.
impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && (Arc::ptr_eq(&self.root, &other.root) || self.root == other.root)
    }
}

impl Eq for Tree {}

#[cfg(test)]
mod tests {
    use super::*;
    use dotprompt_grammar::{language, rules};
    use dotprompt_testhelpers::setup;
    use dotprompt_tokenizer::{LexMode, Token, TokenKind};
    use insta::assert_snapshot;

    fn leaf(kind: TokenKind, start: u32, end: u32) -> Arc<Subtree> {
        padded_leaf(kind, start, end, 0)
    }

    fn padded_leaf(kind: TokenKind, start: u32, end: u32, padding: u32) -> Arc<Subtree> {
        let token = Token::new(kind, Span::new(start, end), padding, 1, LexMode::Body);
        Arc::new(Subtree::leaf(&token, 0))
    }

    fn node(symbol: Symbol, children: Vec<Arc<Subtree>>, production_id: u16) -> Arc<Subtree> {
        Arc::new(Subtree::node(symbol, children, production_id, 0, language()))
    }

    /// `{{#if x}}a` with a missing close_block.
    fn unclosed_block() -> Tree {
        let source = "{{#if x}}a";
        let argument = node(
            Symbol::ARGUMENT,
            vec![node(Symbol::VARIABLE_REFERENCE, vec![padded_leaf(TokenKind::Path, 6, 7, 1)], 0)],
            0,
        );
        let opener = node(
            Symbol::BLOCK_EXPRESSION,
            vec![
                leaf(TokenKind::OpenBlock, 0, 3),
                leaf(TokenKind::Path, 3, 5),
                node(Symbol::BLOCK_EXPRESSION_REPEAT1, vec![argument], 0),
                leaf(TokenKind::Close, 7, 9),
            ],
            rules::PRODUCTION_BLOCK_NAME,
        );
        let content = node(Symbol::CONTENT, vec![leaf(TokenKind::Text, 9, 10)], 0);
        let block = node(
            Symbol::HANDLEBARS_BLOCK,
            vec![
                opener,
                node(Symbol::HANDLEBARS_BLOCK_REPEAT1, vec![node(Symbol::BLOCK_CONTENT, vec![content], 0)], 0),
                Arc::new(Subtree::missing(SyntaxErrorKind::UnclosedBlock)),
            ],
            0,
        );
        let outer = node(Symbol::CONTENT, vec![block], 0);
        let body = node(Symbol::TEMPLATE_BODY, vec![node(Symbol::TEMPLATE_BODY_REPEAT1, vec![outer], 0)], 0);
        Tree::new(node(Symbol::DOCUMENT, vec![body], 0), source)
    }

    #[test]
    fn hand_built_tree_shape() {
        setup();
        let tree = unclosed_block();
        assert_snapshot!(
            tree.to_sexp(),
            @"(document (template_body (handlebars_block (block_expression name: (block_name) (argument (variable_reference (path)))) (text) (MISSING close_block))))"
        );
        let block = tree.root().child(0).unwrap().child(0).unwrap();
        assert_eq!(block.kind(), "handlebars_block");
        assert_eq!(block.child_count(), 3);
        assert_eq!(block.field("name"), None);
        let opener = block.child(0).unwrap();
        assert_eq!(opener.field("name").unwrap().text(), "if");
        assert_eq!(opener.field("name").unwrap().alias(), Some(Symbol::BLOCK_NAME));
    }

    #[test]
    fn errors_carry_the_opener() {
        let tree = unclosed_block();
        assert!(tree.has_errors());
        let nodes: Vec<_> = tree.error_nodes().collect();
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].is_missing());
        assert_eq!(nodes[0].span(), Span::new(10, 10));

        let errors = tree.errors();
        assert_eq!(
            errors,
            vec![SyntaxError::new(SyntaxErrorKind::UnclosedBlock, Span::new(10, 10)).with_context(Span::new(0, 9))]
        );
    }

    #[test]
    fn leaves_tile_the_source() {
        let tree = unclosed_block();
        let mut end = 0;
        let mut text = String::new();
        for leaf in tree.leaves() {
            assert_eq!(leaf.padded_span().start, end);
            end = leaf.padded_span().end;
            text.push_str(leaf.padded_span().slice(tree.source()));
        }
        assert_eq!(text, tree.source());
    }

    #[test]
    fn position_queries() {
        let tree = unclosed_block();
        assert_eq!(tree.node_at(4).unwrap().kind(), "block_name");
        assert_eq!(tree.node_at(6).unwrap().kind(), "path");
        assert_eq!(tree.descendant_for_byte(1).unwrap().kind(), "{{#");
        assert_eq!(tree.descendant_for_range(3, 7).unwrap().kind(), "block_expression");
        assert_eq!(tree.descendant_for_range(9, 10).unwrap().kind(), "text");
        assert_eq!(tree.node_at(10), None);
    }

    #[test]
    fn cursor_reports_fields() {
        let tree = unclosed_block();
        let mut cursor = tree.root().cursor();
        assert!(cursor.goto_first_child());
        assert!(cursor.goto_first_child());
        assert!(cursor.goto_first_child());
        assert_eq!(cursor.node().kind(), "block_expression");
        assert!(cursor.goto_first_child());
        assert!(cursor.goto_next_sibling());
        assert_eq!(cursor.field_name(), Some("name"));
        assert_eq!(cursor.depth(), 4);
        assert!(cursor.goto_parent());
        assert!(cursor.goto_next_sibling());
        assert_eq!(cursor.node().kind(), "text");
        assert!(cursor.goto_next_sibling());
        assert!(!cursor.goto_next_sibling());
        assert!(cursor.goto_parent());
        assert_eq!(cursor.node().kind(), "handlebars_block");
    }

    #[test]
    fn edits_are_recorded() {
        let mut tree = unclosed_block();
        let before = tree.clone();
        tree.edit(&InputEdit::new(9, 10, 12));
        assert_eq!(tree.pending_edits(), &[InputEdit::new(9, 10, 12)]);
        assert_eq!(tree, before);
    }
}
