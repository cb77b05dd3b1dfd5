//! Finding subtrees of a prior tree that can be spliced in unchanged.

use std::collections::HashMap;
use std::sync::Arc;

use dotprompt_cst::{EditMap, InputEdit, Subtree, Tree};
use dotprompt_grammar::StateId;
use dotprompt_tokenizer::LexMode;

/// Reusable subtrees of a prior tree, keyed by their old padded start,
/// outermost first.
pub(crate) struct ReuseIndex {
    by_start: HashMap<u32, Vec<Arc<Subtree>>>,
    edits: EditMap,
}

impl ReuseIndex {
    pub(crate) fn new(prior: &Tree, edits: &[InputEdit]) -> Self {
        let mut by_start: HashMap<u32, Vec<Arc<Subtree>>> = HashMap::new();
        let mut stack = vec![(prior.root_subtree().clone(), 0u32)];
        while let Some((subtree, offset)) = stack.pop() {
            if subtree.is_reusable() {
                by_start.entry(offset).or_default().push(subtree.clone());
            }
            for (child, child_offset) in subtree.children().iter().zip(subtree.child_offsets()).rev() {
                if !child.is_leaf() {
                    stack.push((child.clone(), offset + child_offset));
                }
            }
        }
        Self {
            by_start,
            edits: EditMap::from_edits(edits),
        }
    }

    /// The outermost prior subtree that can stand at new offset `position`
    /// when the parser is in `state` and the token there is lexed in `mode`.
    ///
    /// Everything the subtree's parse examined must be unchanged, including
    /// the byte before it, which line-sensitive modes look at. Its first leaf
    /// must have been lexed in `mode`, so it is the token a fresh parse sees.
    pub(crate) fn find(&self, position: u32, state: StateId, mode: LexMode) -> Option<Arc<Subtree>> {
        let run = self.edits.map_to_old(position)?;
        if let Some(before) = position.checked_sub(1) {
            let run_before = self.edits.map_to_old(before)?;
            if run_before.old_start + 1 != run.old_start {
                return None;
            }
        }
        self.by_start
            .get(&run.old_start)?
            .iter()
            .find(|subtree| {
                subtree.parse_state() == state
                    && subtree.first_leaf().lookahead_mode() == mode
                    && run.covers(subtree.total_len() + subtree.lookahead_bytes())
            })
            .cloned()
    }
}
