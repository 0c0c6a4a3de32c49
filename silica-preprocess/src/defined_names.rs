//! Scoped table of introduced names.
//!
//! NNF conversion and term-ITE elimination replace subterms with fresh
//! constants; this table remembers which definitions already have a name so
//! repeat encounters reuse it. The table shares the assertion store's scope
//! stack: names introduced inside a scope disappear when it is popped.

use rustc_hash::FxHashMap;
use silica_core::ast::{TermId, TermManager};

/// Scoped map from a defined term to its introduced constant.
#[derive(Debug, Default)]
pub struct DefinedNames {
    names: FxHashMap<TermId, TermId>,
    trail: Vec<TermId>,
    scopes: Vec<usize>,
}

impl DefinedNames {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or introduce a name for `def`. The second component is true when
    /// the name is fresh and the caller must emit its defining formula.
    pub fn mk_name(&mut self, tm: &mut TermManager, def: TermId) -> (TermId, bool) {
        if let Some(&name) = self.names.get(&def) {
            return (name, false);
        }
        let sort = tm.sort_of(def);
        let sym = tm.fresh_symbol("k");
        let name = tm.mk_var_from(sym, sort);
        self.names.insert(def, name);
        self.trail.push(def);
        (name, true)
    }

    /// Number of names introduced so far in all scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no names have been introduced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Open a scope.
    pub fn push(&mut self) {
        self.scopes.push(self.trail.len());
    }

    /// Close `n` scopes, forgetting names introduced inside them.
    pub fn pop(&mut self, n: usize) {
        for _ in 0..n {
            let Some(mark) = self.scopes.pop() else {
                break;
            };
            while self.trail.len() > mark {
                if let Some(def) = self.trail.pop() {
                    self.names.remove(&def);
                }
            }
        }
    }

    /// Forget everything.
    pub fn reset(&mut self) {
        self.names.clear();
        self.trail.clear();
        self.scopes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_reused() {
        let mut tm = TermManager::new();
        let mut dn = DefinedNames::new();
        let x = tm.mk_var("x", tm.sorts.int_sort);
        let (n1, fresh1) = dn.mk_name(&mut tm, x);
        let (n2, fresh2) = dn.mk_name(&mut tm, x);
        assert!(fresh1);
        assert!(!fresh2);
        assert_eq!(n1, n2);
    }

    #[test]
    fn test_scope_pop_forgets() {
        let mut tm = TermManager::new();
        let mut dn = DefinedNames::new();
        let x = tm.mk_var("x", tm.sorts.int_sort);
        let y = tm.mk_var("y", tm.sorts.int_sort);
        dn.mk_name(&mut tm, x);
        dn.push();
        dn.mk_name(&mut tm, y);
        assert_eq!(dn.len(), 2);
        dn.pop(1);
        assert_eq!(dn.len(), 1);
        let (_, fresh) = dn.mk_name(&mut tm, y);
        assert!(fresh);
        let (_, fresh) = dn.mk_name(&mut tm, x);
        assert!(!fresh);
    }
}
