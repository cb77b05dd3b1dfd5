//! The LR stack.

use std::sync::Arc;

use dotprompt_cst::Subtree;
use dotprompt_grammar::StateId;

#[derive(Debug, Clone)]
struct Entry {
    /// State after pushing `subtree`. Extras keep the state below them.
    state: StateId,
    subtree: Arc<Subtree>,
}

/// Parser states and the subtrees between them, over a fixed start state.
#[derive(Debug, Clone)]
pub(crate) struct Stack {
    base: StateId,
    entries: Vec<Entry>,
}

impl Stack {
    pub(crate) fn new(base: StateId) -> Self {
        Self {
            base,
            entries: Vec::new(),
        }
    }

    pub(crate) fn top_state(&self) -> StateId {
        self.entries.last().map_or(self.base, |e| e.state)
    }

    pub(crate) fn push(&mut self, state: StateId, subtree: Arc<Subtree>) {
        self.entries.push(Entry { state, subtree });
    }

    /// Push an extra without changing state.
    pub(crate) fn push_extra(&mut self, subtree: Arc<Subtree>) {
        let state = self.top_state();
        self.entries.push(Entry { state, subtree });
    }

    /// Pop the children of a reduction: `count` non-extra subtrees and the
    /// extras between them, in source order. Extras on top of the stack
    /// stay out of the new node; they are returned separately to be pushed
    /// back after it. With `take_all`, everything is popped.
    pub(crate) fn pop_children(&mut self, count: usize, take_all: bool) -> (Vec<Arc<Subtree>>, Vec<Arc<Subtree>>) {
        if take_all {
            let children = self.entries.drain(..).map(|e| e.subtree).collect();
            return (children, Vec::new());
        }

        let mut trailing = Vec::new();
        while self.entries.last().is_some_and(|e| e.subtree.is_extra()) {
            if let Some(entry) = self.entries.pop() {
                trailing.push(entry.subtree);
            }
        }
        trailing.reverse();

        let mut children = Vec::with_capacity(count);
        let mut found = 0;
        while found < count {
            let Some(entry) = self.entries.pop() else { break };
            if !entry.subtree.is_extra() {
                found += 1;
            }
            children.push(entry.subtree);
        }
        children.reverse();
        (children, trailing)
    }

    /// Number of entries above the start state.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// State below entry `depth`, counting the start state as depth 0.
    pub(crate) fn state_at(&self, depth: usize) -> StateId {
        match depth {
            0 => self.base,
            d => self.entries[d - 1].state,
        }
    }

    /// Pop every entry above `depth`, returning their subtrees in order.
    pub(crate) fn truncate(&mut self, depth: usize) -> Vec<Arc<Subtree>> {
        self.entries.drain(depth..).map(|e| e.subtree).collect()
    }

    /// Hand out every subtree, bottom first.
    pub(crate) fn into_subtrees(self) -> Vec<Arc<Subtree>> {
        self.entries.into_iter().map(|e| e.subtree).collect()
    }
}
