//! Lexical scope tracking for template-declared names.
//!
//! The base set comes from the caller's `identifiersInScope`; frames are
//! pushed for block params and named-block parameter lists. Only the first
//! segment of a dotted path ever consults this table; later segments are
//! member accesses.

use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct ScopeTracker {
    base: HashSet<String>,
    frames: Vec<Vec<String>>,
}

impl ScopeTracker {
    pub fn new(identifiers_in_scope: &HashSet<String>) -> Self {
        ScopeTracker {
            base: identifiers_in_scope.clone(),
            frames: Vec::new(),
        }
    }

    pub fn enter(&mut self, names: &[String]) {
        self.frames.push(names.to_vec());
    }

    pub fn leave(&mut self) {
        self.frames.pop();
    }

    pub fn has(&self, name: &str) -> bool {
        self.base.contains(name) || self.frames.iter().any(|f| f.iter().any(|n| n == name))
    }
}
