//! Re-entrant resolution tracking.

use std::cell::RefCell;

use smallvec::SmallVec;

use crate::error::{DiError, DiResult};

const MAX_DEPTH: usize = 1024;

/// Names currently being built, innermost last.
#[derive(Debug, Default)]
pub(crate) struct ResolutionStack {
    stack: SmallVec<[String; 8]>,
}

impl ResolutionStack {
    #[cfg(test)]
    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// Guard for one entry of the resolution stack; pops it on drop.
pub(crate) struct StackGuard<'a> {
    stack: &'a RefCell<ResolutionStack>,
}

impl<'a> StackGuard<'a> {
    /// Pushes `name`, failing with the full path when it is already being
    /// resolved further up the stack.
    pub(crate) fn enter(stack: &'a RefCell<ResolutionStack>, name: &str) -> DiResult<Self> {
        let mut tls = stack.borrow_mut();

        // Circular detection BEFORE pushing the new name
        if tls.stack.iter().any(|n| n == name) {
            let mut path: Vec<String> = tls.stack.iter().cloned().collect();
            path.push(name.to_string());
            return Err(DiError::Circular(path));
        }

        if tls.stack.len() >= MAX_DEPTH {
            return Err(DiError::Construction(format!(
                "maximum resolution depth {MAX_DEPTH} exceeded at {name}"
            )));
        }

        tls.stack.push(name.to_string());
        Ok(Self { stack })
    }
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        self.stack.borrow_mut().stack.pop();
    }
}
