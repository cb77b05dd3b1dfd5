//! Stateful tree traversal with parent links.

use crate::Node;

/// A cursor that walks a tree while remembering the path from its root.
#[derive(Clone)]
pub struct TreeCursor<'tree> {
    /// Nodes from the root to the current node, with each node's index in
    /// its parent.
    stack: Vec<(Node<'tree>, usize)>,
}

impl<'tree> TreeCursor<'tree> {
    pub fn new(root: Node<'tree>) -> Self {
        Self {
            stack: vec![(root, 0)],
        }
    }

    /// The node under the cursor.
    pub fn node(&self) -> Node<'tree> {
        self.stack[self.stack.len() - 1].0
    }

    /// Depth below the cursor's root.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// Field name of the current node in its parent.
    pub fn field_name(&self) -> Option<&'static str> {
        let [.., (parent, _), (_, index)] = self.stack.as_slice() else {
            return None;
        };
        parent.field_name_for_child(*index)
    }

    pub fn goto_first_child(&mut self) -> bool {
        match self.node().child(0) {
            Some(child) => {
                self.stack.push((child, 0));
                true
            }
            None => false,
        }
    }

    pub fn goto_next_sibling(&mut self) -> bool {
        let [.., (parent, _), (_, index)] = self.stack.as_slice() else {
            return false;
        };
        let next = *index + 1;
        match parent.child(next) {
            Some(sibling) => {
                let last = self.stack.len() - 1;
                self.stack[last] = (sibling, next);
                true
            }
            None => false,
        }
    }

    pub fn goto_parent(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    /// Ancestors of the current node, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = Node<'tree>> + '_ {
        self.stack.iter().rev().skip(1).map(|(node, _)| *node)
    }
}
