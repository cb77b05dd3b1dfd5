//! Borrowed node handles.

use std::sync::Arc;

use dotprompt_grammar::{FieldId, Symbol};
use dotprompt_tokenizer::Span;

use crate::{Subtree, SyntaxErrorKind, Tree, TreeCursor};

/// A node of a [`Tree`], with its absolute position.
#[derive(Clone, Copy)]
pub struct Node<'tree> {
    tree: &'tree Tree,
    subtree: &'tree Arc<Subtree>,
    /// Absolute offset where the node's padding starts.
    offset: u32,
}

impl<'tree> Node<'tree> {
    pub(crate) fn new(tree: &'tree Tree, subtree: &'tree Arc<Subtree>, offset: u32) -> Self {
        Self { tree, subtree, offset }
    }

    /// The tree this node belongs to.
    pub fn tree(&self) -> &'tree Tree {
        self.tree
    }

    /// The underlying shared subtree.
    pub fn subtree(&self) -> &'tree Arc<Subtree> {
        self.subtree
    }

    /// Intrinsic grammar symbol, regardless of aliasing.
    pub fn symbol(&self) -> Symbol {
        self.subtree.symbol()
    }

    /// Symbol shown to consumers.
    pub fn visible_symbol(&self) -> Symbol {
        self.subtree.visible_symbol()
    }

    /// The alias this node is shown as, if its position aliases it.
    pub fn alias(&self) -> Option<Symbol> {
        self.subtree.is_aliased().then(|| self.subtree.visible_symbol())
    }

    /// Name of the visible symbol.
    pub fn kind(&self) -> &'static str {
        self.visible_symbol().name()
    }

    /// Name of the intrinsic symbol.
    pub fn grammar_name(&self) -> &'static str {
        self.symbol().name()
    }

    pub fn is_named(&self) -> bool {
        self.visible_symbol().is_named()
    }

    pub fn is_error(&self) -> bool {
        self.symbol().is_error()
    }

    pub fn is_missing(&self) -> bool {
        self.subtree.is_missing()
    }

    pub fn is_extra(&self) -> bool {
        self.subtree.is_extra()
    }

    /// Whether this node or a descendant is an ERROR node.
    pub fn has_error(&self) -> bool {
        self.subtree.has_error()
    }

    /// Why this node is an ERROR or missing node.
    pub fn error(&self) -> Option<&'tree SyntaxErrorKind> {
        self.subtree.error_kind()
    }

    /// Where an error at this node should be reported: the offending token
    /// of an ERROR node that recorded one, the content span otherwise.
    pub fn error_span(&self) -> Span {
        match self.subtree.offending() {
            Some((offset, len)) => Span::new(self.offset + offset, self.offset + offset + len),
            None => self.span(),
        }
    }

    /// Content span, padding excluded.
    pub fn span(&self) -> Span {
        let start = self.offset + self.subtree.padding();
        Span::new(start, start + self.subtree.size())
    }

    /// Span including the padding in front of the content.
    pub fn padded_span(&self) -> Span {
        Span::new(self.offset, self.offset + self.subtree.total_len())
    }

    /// Source text of the content.
    pub fn text(&self) -> &'tree str {
        self.span().slice(self.tree.source())
    }

    pub fn child_count(&self) -> usize {
        self.subtree.children().len()
    }

    pub fn child(&self, index: usize) -> Option<Node<'tree>> {
        let child = self.subtree.children().get(index)?;
        let offset = self.offset + self.subtree.child_offsets()[index];
        Some(Node::new(self.tree, child, offset))
    }

    /// All children, hidden helpers already spliced away.
    pub fn children(&self) -> Children<'tree> {
        Children {
            parent: *self,
            index: 0,
        }
    }

    /// Children whose visible symbol is named, ERROR nodes included.
    pub fn named_children(&self) -> impl Iterator<Item = Node<'tree>> + use<'tree> {
        self.children().filter(|c| c.is_named())
    }

    pub fn named_child_count(&self) -> usize {
        self.named_children().count()
    }

    /// The child bound to `field_name`.
    pub fn field(&self, field_name: &str) -> Option<Node<'tree>> {
        self.child_by_field_id(FieldId::for_name(field_name)?)
    }

    pub fn child_by_field_id(&self, field: FieldId) -> Option<Node<'tree>> {
        let &(_, index) = self.subtree.fields().iter().find(|(f, _)| *f == field)?;
        self.child(index as usize)
    }

    /// Field name bound to child `index`, if any.
    pub fn field_name_for_child(&self, index: usize) -> Option<&'static str> {
        self.subtree
            .fields()
            .iter()
            .find(|&&(_, i)| i as usize == index)
            .and_then(|(field, _)| field.name())
    }

    /// Pre-order traversal yielding this node and every named descendant.
    pub fn walk(&self) -> Walk<'tree> {
        Walk { stack: vec![*self] }
    }

    /// A cursor rooted at this node.
    pub fn cursor(&self) -> TreeCursor<'tree> {
        TreeCursor::new(*self)
    }

    /// Index of the child whose padded span contains `offset`.
    fn child_index_for_byte(&self, offset: u32) -> Option<usize> {
        let relative = offset.checked_sub(self.offset)?;
        let offsets = self.subtree.child_offsets();
        let candidate = offsets.partition_point(|&start| start <= relative).checked_sub(1)?;
        // Zero-width children sit at the same offset as their successor.
        (0..=candidate).rev().find(|&i| {
            let child = &self.subtree.children()[i];
            relative < offsets[i] + child.total_len()
        })
    }

    /// Smallest descendant whose padded span contains `offset`.
    pub fn descendant_for_byte(&self, offset: u32) -> Option<Node<'tree>> {
        if !self.padded_span().contains(offset) {
            return None;
        }
        let mut node = *self;
        while let Some(index) = node.child_index_for_byte(offset) {
            node = node.child(index)?;
        }
        Some(node)
    }

    /// Smallest named descendant whose padded span contains `offset`.
    pub fn named_descendant_for_byte(&self, offset: u32) -> Option<Node<'tree>> {
        if !self.padded_span().contains(offset) {
            return None;
        }
        let mut node = *self;
        let mut named = self.is_named().then_some(*self);
        while let Some(index) = node.child_index_for_byte(offset) {
            node = node.child(index)?;
            if node.is_named() {
                named = Some(node);
            }
        }
        named
    }

    /// Smallest descendant whose content span covers `start..end`.
    pub fn descendant_for_range(&self, start: u32, end: u32) -> Option<Node<'tree>> {
        let covers = |n: &Node<'_>| {
            let span = n.span();
            span.start <= start && end <= span.end
        };
        if !covers(self) {
            return None;
        }
        let mut node = *self;
        'descend: loop {
            for child in node.children() {
                if covers(&child) {
                    node = child;
                    continue 'descend;
                }
            }
            return Some(node);
        }
    }

    /// Leaves below this node, in source order.
    pub fn leaves(&self) -> impl Iterator<Item = Node<'tree>> + use<'tree> {
        let mut stack = vec![*self];
        std::iter::from_fn(move || {
            while let Some(node) = stack.pop() {
                if node.child_count() == 0 {
                    return Some(node);
                }
                let children: Vec<_> = node.children().collect();
                stack.extend(children.into_iter().rev());
            }
            None
        })
    }

    /// The node as an s-expression over named nodes.
    pub fn to_sexp(&self) -> String {
        crate::sexp::to_sexp(*self)
    }
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind(), self.span())
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree)
            && Arc::ptr_eq(self.subtree, other.subtree)
            && self.offset == other.offset
    }
}

impl Eq for Node<'_> {}

/// Iterator over the children of a node.
#[derive(Clone)]
pub struct Children<'tree> {
    parent: Node<'tree>,
    index: usize,
}

impl<'tree> Iterator for Children<'tree> {
    type Item = Node<'tree>;

    fn next(&mut self) -> Option<Self::Item> {
        let child = self.parent.child(self.index)?;
        self.index += 1;
        Some(child)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.parent.child_count() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Children<'_> {}

/// Pre-order iterator over named nodes.
pub struct Walk<'tree> {
    stack: Vec<Node<'tree>>,
}

impl<'tree> Iterator for Walk<'tree> {
    type Item = Node<'tree>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            let start = self.stack.len();
            self.stack.extend(node.children());
            self.stack[start..].reverse();
            if node.is_named() {
                return Some(node);
            }
        }
        None
    }
}
