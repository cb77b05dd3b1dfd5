//! Shared, immutable tree nodes.

use std::sync::Arc;

use dotprompt_grammar::{FieldId, Language, ProductionId, StateId, Symbol};
use dotprompt_tokenizer::{LexMode, Token};

use crate::SyntaxErrorKind;

/// A node of the syntax tree, shared between trees via `Arc`.
///
/// Sizes are relative: a subtree knows its padding and content length but
/// not where it starts, so an unchanged subtree can be reused verbatim at a
/// different offset after an edit.
#[derive(Debug, Clone)]
pub struct Subtree {
    symbol: Symbol,
    visible_symbol: Symbol,
    padding: u32,
    size: u32,
    children: Vec<Arc<Subtree>>,
    /// Padded start of each child, relative to this subtree's padded start.
    child_offsets: Vec<u32>,
    fields: Vec<(FieldId, u16)>,
    production_id: ProductionId,
    error: Option<SyntaxErrorKind>,
    /// Where the token that caused an ERROR node sits, as `(offset, len)`
    /// from the node's padded start.
    offending: Option<(u32, u32)>,
    has_error: bool,
    is_missing: bool,
    extra: bool,
    parse_state: StateId,
    lookahead_bytes: u32,
    lookahead_mode: LexMode,
}

/// Marks subtrees that must never be reused.
pub(crate) const NO_STATE: StateId = StateId::MAX;

impl Subtree {
    /// A leaf for a shifted token.
    pub fn leaf(token: &Token, parse_state: StateId) -> Self {
        let symbol = Symbol::from(token.kind);
        Self {
            symbol,
            visible_symbol: symbol.public(),
            padding: token.padding,
            size: token.span.len(),
            children: Vec::new(),
            child_offsets: Vec::new(),
            fields: Vec::new(),
            production_id: 0,
            error: None,
            offending: None,
            has_error: false,
            is_missing: false,
            extra: false,
            parse_state,
            lookahead_bytes: token.lookahead,
            lookahead_mode: token.mode,
        }
    }

    /// An interior node reduced by a production.
    ///
    /// Applies the production's alias sequence and field map to the
    /// non-extra children, in order, and splices hidden children into the
    /// new node.
    pub fn node(
        symbol: Symbol,
        children: Vec<Arc<Subtree>>,
        production_id: ProductionId,
        parse_state: StateId,
        language: &Language,
    ) -> Self {
        let mut spliced: Vec<Arc<Subtree>> = Vec::with_capacity(children.len());
        let mut fields = Vec::new();
        let mut structural_index = 0;

        for child in children {
            if child.extra {
                spliced.push(child);
                continue;
            }
            let visible = language
                .alias_at(production_id, structural_index)
                .unwrap_or_else(|| child.symbol.public());
            let child = with_visible_symbol(child, visible);
            let child_fields: Vec<FieldId> = language.fields_at(production_id, structural_index).collect();
            structural_index += 1;

            if visible.is_visible() || child.children.is_empty() {
                for field in child_fields {
                    fields.push((field, spliced.len() as u16));
                }
                spliced.push(child);
                continue;
            }

            let base = spliced.len() as u16;
            for field in &child_fields {
                for i in 0..child.children.len() as u16 {
                    fields.push((*field, base + i));
                }
            }
            fields.extend(child.fields.iter().map(|&(f, i)| (f, base + i)));
            match Arc::try_unwrap(child) {
                Ok(hidden) if spliced.is_empty() => spliced = hidden.children,
                Ok(hidden) => spliced.extend(hidden.children),
                Err(shared) => spliced.extend(shared.children.iter().cloned()),
            }
        }

        fields.sort_by_key(|&(_, index)| index);
        let mut node = Self::with_children(symbol, spliced);
        node.visible_symbol = symbol.public();
        node.fields = fields;
        node.production_id = production_id;
        node.parse_state = parse_state;
        node
    }

    /// An ERROR node wrapping skipped or abandoned subtrees.
    pub fn error(children: Vec<Arc<Subtree>>, kind: SyntaxErrorKind) -> Self {
        let mut spliced = Vec::with_capacity(children.len());
        for child in children {
            if child.visible_symbol.is_visible() || child.children.is_empty() {
                spliced.push(child);
            } else {
                spliced.extend(child.children.iter().cloned());
            }
        }
        let mut node = Self::with_children(Symbol::ERROR, spliced);
        node.error = Some(kind);
        node.has_error = true;
        node
    }

    /// A zero-width node standing in for a missing closer. It takes the
    /// symbol of whatever was expected.
    pub fn missing(kind: SyntaxErrorKind) -> Self {
        let symbol = kind.expected().unwrap_or(Symbol::ERROR);
        let mut node = Self::with_children(symbol, Vec::new());
        node.visible_symbol = symbol.public();
        node.error = Some(kind);
        node.has_error = true;
        node.is_missing = true;
        node
    }

    /// An ERROR leaf covering `size` unparsed bytes.
    pub fn error_leaf(size: u32, kind: SyntaxErrorKind) -> Self {
        let mut node = Self::with_children(Symbol::ERROR, Vec::new());
        node.size = size;
        node.error = Some(kind);
        node.has_error = true;
        node
    }

    fn with_children(symbol: Symbol, children: Vec<Arc<Subtree>>) -> Self {
        let mut child_offsets = Vec::with_capacity(children.len());
        let mut total = 0u32;
        let mut scan_end = 0u32;
        let mut has_error = false;
        for child in &children {
            child_offsets.push(total);
            total += child.total_len();
            scan_end = scan_end.max(total + child.lookahead_bytes);
            has_error |= child.has_error;
        }
        let padding = children.first().map_or(0, |c| c.padding);
        Self {
            symbol,
            visible_symbol: symbol,
            padding,
            size: total - padding,
            children,
            child_offsets,
            fields: Vec::new(),
            production_id: 0,
            error: None,
            offending: None,
            has_error,
            is_missing: false,
            extra: false,
            parse_state: NO_STATE,
            lookahead_bytes: scan_end - total,
            lookahead_mode: LexMode::default(),
        }
    }

    /// Record the token that was looked at to complete this subtree.
    ///
    /// `bytes` counts examined bytes past the subtree's end.
    pub fn extend_lookahead(&mut self, bytes: u32, mode: LexMode) {
        self.lookahead_bytes = self.lookahead_bytes.max(bytes);
        self.lookahead_mode = mode;
    }

    /// Point this ERROR node's diagnostic at `len` bytes starting `offset`
    /// bytes after its padded start, instead of at the whole node.
    pub fn with_offending(mut self, offset: u32, len: u32) -> Self {
        self.offending = Some((offset, len));
        self
    }

    /// Keep the parser from ever reusing this subtree.
    pub fn forbid_reuse(&mut self) {
        self.parse_state = NO_STATE;
    }

    /// Mark this subtree as an extra, outside its parent's production.
    pub fn into_extra(mut self) -> Self {
        self.extra = true;
        self
    }

    /// Intrinsic symbol.
    #[inline]
    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    /// Symbol consumers see: the alias if one applies.
    #[inline]
    pub fn visible_symbol(&self) -> Symbol {
        self.visible_symbol
    }

    #[inline]
    pub fn padding(&self) -> u32 {
        self.padding
    }

    /// Content length, padding excluded.
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Padding plus content.
    #[inline]
    pub fn total_len(&self) -> u32 {
        self.padding + self.size
    }

    #[inline]
    pub fn children(&self) -> &[Arc<Subtree>] {
        &self.children
    }

    #[inline]
    pub fn child_offsets(&self) -> &[u32] {
        &self.child_offsets
    }

    #[inline]
    pub fn fields(&self) -> &[(FieldId, u16)] {
        &self.fields
    }

    #[inline]
    pub fn production_id(&self) -> ProductionId {
        self.production_id
    }

    /// Why this node is an ERROR or missing node.
    #[inline]
    pub fn error_kind(&self) -> Option<&SyntaxErrorKind> {
        self.error.as_ref()
    }

    /// The offending token of an ERROR node, as `(offset, len)` from its
    /// padded start.
    #[inline]
    pub fn offending(&self) -> Option<(u32, u32)> {
        self.offending
    }

    /// Whether this subtree contains an ERROR node.
    #[inline]
    pub fn has_error(&self) -> bool {
        self.has_error
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        self.is_missing
    }

    #[inline]
    pub fn is_extra(&self) -> bool {
        self.extra
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether this subtree is an alias projection of its intrinsic symbol.
    #[inline]
    pub fn is_aliased(&self) -> bool {
        self.visible_symbol != self.symbol.public()
    }

    /// Parser state this subtree was pushed from.
    #[inline]
    pub fn parse_state(&self) -> StateId {
        self.parse_state
    }

    /// Bytes past the end that were examined while building this subtree.
    #[inline]
    pub fn lookahead_bytes(&self) -> u32 {
        self.lookahead_bytes
    }

    /// Mode the token after this subtree was lexed in. For a leaf, the mode
    /// the leaf itself was lexed in.
    #[inline]
    pub fn lookahead_mode(&self) -> LexMode {
        self.lookahead_mode
    }

    /// The leftmost leaf.
    pub fn first_leaf(&self) -> &Subtree {
        let mut subtree = self;
        while let Some(child) = subtree.children.first() {
            subtree = child;
        }
        subtree
    }

    /// Whether the parser may splice this subtree into a new tree unchanged.
    pub fn is_reusable(&self) -> bool {
        !self.has_error
            && !self.extra
            && !self.children.is_empty()
            && self.parse_state != NO_STATE
            && self.visible_symbol.is_visible()
    }

    /// Number of leaves below this subtree.
    pub fn leaf_count(&self) -> usize {
        if self.children.is_empty() {
            1
        } else {
            self.children.iter().map(|c| c.leaf_count()).sum()
        }
    }
}

/// Relabel a child for its position in a new parent.
pub(crate) fn with_visible_symbol(child: Arc<Subtree>, visible: Symbol) -> Arc<Subtree> {
    if child.visible_symbol == visible {
        return child;
    }
    let mut child = Arc::unwrap_or_clone(child);
    child.visible_symbol = visible;
    Arc::new(child)
}

/// Structural equality: symbols, sizes, children, fields and errors.
/// Reuse bookkeeping is ignored.
impl PartialEq for Subtree {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
            && self.visible_symbol == other.visible_symbol
            && self.padding == other.padding
            && self.size == other.size
            && self.fields == other.fields
            && self.error == other.error
            && self.offending == other.offending
            && self.is_missing == other.is_missing
            && self.extra == other.extra
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| Arc::ptr_eq(a, b) || a == b)
    }
}

impl Eq for Subtree {}

#[cfg(test)]
mod tests {
    use super::*;
    use dotprompt_grammar::{language, rules};
    use dotprompt_tokenizer::{Span, TokenKind};

    fn leaf(kind: TokenKind, start: u32, end: u32, padding: u32) -> Arc<Subtree> {
        let token = Token::new(kind, Span::new(start, end), padding, 0, LexMode::Expr);
        Arc::new(Subtree::leaf(&token, 0))
    }

    #[test]
    fn leaf_sizes() {
        let path = leaf(TokenKind::Path, 4, 7, 2);
        assert_eq!(path.padding(), 2);
        assert_eq!(path.size(), 3);
        assert_eq!(path.total_len(), 5);
        assert!(path.is_leaf());
        assert!(!path.is_reusable());
    }

    #[test]
    fn node_applies_alias_and_field() {
        let language = language();
        let close_block = Subtree::node(
            Symbol::CLOSE_BLOCK,
            vec![
                leaf(TokenKind::OpenEndBlock, 0, 3, 0),
                leaf(TokenKind::Path, 3, 5, 0),
                leaf(TokenKind::Close, 5, 7, 0),
            ],
            rules::PRODUCTION_BLOCK_NAME,
            3,
            language,
        );
        assert_eq!(close_block.size(), 7);
        assert_eq!(close_block.child_offsets(), &[0, 3, 5]);
        let name = &close_block.children()[1];
        assert_eq!(name.symbol(), Symbol::PATH);
        assert_eq!(name.visible_symbol(), Symbol::BLOCK_NAME);
        assert!(name.is_aliased());
        assert_eq!(close_block.fields(), &[(FieldId::NAME, 1)]);
        assert!(close_block.is_reusable());
    }

    #[test]
    fn hidden_children_are_spliced() {
        let language = language();
        let first = Arc::new(Subtree::node(
            Symbol::TEMPLATE_BODY_REPEAT1,
            vec![Arc::new(Subtree::node(
                Symbol::CONTENT,
                vec![leaf(TokenKind::Text, 0, 2, 0)],
                0,
                0,
                language,
            ))],
            0,
            0,
            language,
        ));
        assert_eq!(first.children().len(), 1);
        assert_eq!(first.children()[0].symbol(), Symbol::TEXT);

        let second = Arc::new(Subtree::node(
            Symbol::CONTENT,
            vec![leaf(TokenKind::Text, 2, 5, 0)],
            0,
            0,
            language,
        ));
        let repeat = Subtree::node(Symbol::TEMPLATE_BODY_REPEAT1, vec![first, second], 0, 0, language);
        let kinds: Vec<_> = repeat.children().iter().map(|c| c.symbol()).collect();
        assert_eq!(kinds, vec![Symbol::TEXT, Symbol::TEXT]);
        assert_eq!(repeat.child_offsets(), &[0, 2]);
        assert_eq!(repeat.size(), 5);
    }

    #[test]
    fn error_nodes_propagate() {
        let error = Arc::new(Subtree::error(vec![leaf(TokenKind::Text, 0, 3, 1)], SyntaxErrorKind::UnexpectedEof).into_extra());
        assert_eq!(error.padding(), 1);
        assert!(error.has_error());
        let parent = Subtree::error(vec![error, Arc::new(Subtree::missing(SyntaxErrorKind::UnclosedBlock))], SyntaxErrorKind::UnexpectedEof);
        assert!(parent.has_error());
        assert_eq!(parent.total_len(), 4);
        assert!(parent.children()[1].is_missing());
        assert!(!parent.is_reusable());
    }

    #[test]
    fn lookahead_accumulates() {
        let language = language();
        let token = Token::new(TokenKind::Path, Span::new(0, 3), 0, 2, LexMode::Expr);
        let mut node = Subtree::node(
            Symbol::VARIABLE_REFERENCE,
            vec![Arc::new(Subtree::leaf(&token, 0))],
            0,
            0,
            language,
        );
        assert_eq!(node.lookahead_bytes(), 2);
        node.extend_lookahead(1, LexMode::CloseExpr);
        assert_eq!(node.lookahead_bytes(), 2);
        assert_eq!(node.lookahead_mode(), LexMode::CloseExpr);
    }
}
