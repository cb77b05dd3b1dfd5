//! Parser options.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Options for a parse.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Checked before every token; once set, the parse stops and returns
    /// what it has under an ERROR root (default: none)
    pub cancellation_flag: Option<Arc<AtomicBool>>,

    /// Reuse unchanged subtrees of a prior tree (default: true)
    pub reuse_subtrees: bool,

    /// Recovery actions allowed before the parser gives up and wraps the
    /// rest of the input in an ERROR root (default: 4096)
    pub max_recovery_steps: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            cancellation_flag: None,
            reuse_subtrees: true,
            max_recovery_steps: 4096,
        }
    }
}

impl ParseOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop parsing once `flag` is set.
    pub fn cancellation_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancellation_flag = Some(flag);
        self
    }

    /// Always reparse from scratch, even when given a prior tree.
    pub fn without_reuse(mut self) -> Self {
        self.reuse_subtrees = false;
        self
    }

    /// Set the recovery step limit.
    pub fn max_recovery_steps(mut self, steps: usize) -> Self {
        self.max_recovery_steps = steps;
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}
