//! Circular dependency detection infrastructure.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};

/// Each nested key costs roughly ten resolver frames; this stays well inside
/// a default 2 MiB thread stack.
pub(crate) const DEFAULT_MAX_DEPTH: usize = 64;

/// Keys currently being built by one container, outermost first.
///
/// Entering a key that is already on the stack is a cycle; entering past
/// `max_depth` is a runaway graph. Both are reported as errors before the
/// key is pushed, so the stack is left untouched.
#[derive(Debug)]
pub(crate) struct ResolutionStack {
    stack: RefCell<Vec<String>>,
    max_depth: usize,
}

impl ResolutionStack {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            stack: RefCell::new(Vec::new()),
            max_depth,
        }
    }

    /// Pushes `key`, returning a guard that pops it on drop.
    pub(crate) fn enter(&self, key: &str) -> DiResult<StackGuard<'_>> {
        let mut stack = self.stack.borrow_mut();

        // Circular detection before pushing the new key
        if stack.iter().any(|k| k == key) {
            let mut path = stack.clone();
            path.push(key.to_string());
            return Err(DiError::CyclicDependency(path));
        }

        if stack.len() >= self.max_depth {
            return Err(DiError::DepthExceeded(self.max_depth));
        }

        stack.push(key.to_string());
        Ok(StackGuard { owner: self })
    }

    pub(crate) fn depth(&self) -> usize {
        self.stack.borrow().len()
    }

    pub(crate) fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for ResolutionStack {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

/// Pops its key from the owning stack when dropped.
pub(crate) struct StackGuard<'a> {
    owner: &'a ResolutionStack,
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        self.owner.stack.borrow_mut().pop();
    }
}
