//! Eliminate non-Boolean if-then-else subterms.
//!
//! Each term-level ITE is replaced by an introduced constant `k`; the side
//! formula `(ite c (= k t) (= k e))` defines it. Side formulas ride the
//! rewrite-pass template's auxiliary channel into the pending suffix.

use rustc_hash::FxHashMap;
use silica_core::ast::{TermId, TermKind, TermManager};
use silica_core::proof::ProofId;

use crate::defined_names::DefinedNames;

/// Term-ITE eliminator. Borrows the shared defined-names table.
pub struct ElimTermIte<'a> {
    defined_names: &'a mut DefinedNames,
    aux: Vec<(TermId, Option<ProofId>)>,
    cache: FxHashMap<TermId, TermId>,
}

impl<'a> ElimTermIte<'a> {
    /// Create an eliminator over the shared defined-names table.
    pub fn new(defined_names: &'a mut DefinedNames) -> Self {
        Self {
            defined_names,
            aux: Vec::new(),
            cache: FxHashMap::default(),
        }
    }

    /// Transform `e`, returning the result and the defining side formulas
    /// for any names introduced.
    pub fn apply(
        &mut self,
        tm: &mut TermManager,
        e: TermId,
    ) -> (TermId, Vec<(TermId, Option<ProofId>)>) {
        let result = self.walk(tm, e);
        (result, std::mem::take(&mut self.aux))
    }

    fn walk(&mut self, tm: &mut TermManager, e: TermId) -> TermId {
        if let Some(&hit) = self.cache.get(&e) {
            return hit;
        }
        let children = tm.children(e);
        let new: Vec<TermId> = children.into_iter().map(|c| self.walk(tm, c)).collect();
        let rebuilt = tm.rebuild(e, &new);

        let is_term_ite = matches!(tm.get(rebuilt).map(|t| &t.kind), Some(TermKind::Ite(..)))
            && !tm
                .get(rebuilt)
                .and_then(|term| tm.sorts.get(term.sort))
                .is_some_and(|s| s.is_bool());

        let result = if is_term_ite {
            let Some(TermKind::Ite(c, t, els)) = tm.get(rebuilt).map(|t| t.kind.clone()) else {
                return rebuilt;
            };
            let (name, fresh) = self.defined_names.mk_name(tm, rebuilt);
            if fresh {
                let eq_t = tm.mk_eq(name, t);
                let eq_e = tm.mk_eq(name, els);
                let def = tm.mk_ite(c, eq_t, eq_e);
                let pr = tm.mk_def_intro(def);
                self.aux.push((def, pr));
            }
            name
        } else {
            rebuilt
        };
        self.cache.insert(e, result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn test_term_ite_is_named() {
        let mut tm = TermManager::new();
        let mut dn = DefinedNames::new();
        let mut elim = ElimTermIte::new(&mut dn);
        let c = tm.mk_var("c", tm.sorts.bool_sort);
        let x = tm.mk_var("x", tm.sorts.int_sort);
        let y = tm.mk_var("y", tm.sorts.int_sort);
        let zero = tm.mk_int(BigInt::from(0));
        let ite = tm.mk_ite(c, x, y);
        let gt = tm.mk_gt(ite, zero);

        let (result, aux) = elim.apply(&mut tm, gt);
        assert_ne!(result, gt);
        assert_eq!(aux.len(), 1);
        // result mentions the fresh name, not the ite
        let printed = tm.display_term(result);
        assert!(printed.contains("k!"));
        let def = tm.display_term(aux[0].0);
        assert!(def.starts_with("(ite "));
    }

    #[test]
    fn test_bool_ite_is_kept() {
        let mut tm = TermManager::new();
        let mut dn = DefinedNames::new();
        let mut elim = ElimTermIte::new(&mut dn);
        let c = tm.mk_var("c", tm.sorts.bool_sort);
        let p = tm.mk_var("p", tm.sorts.bool_sort);
        let q = tm.mk_var("q", tm.sorts.bool_sort);
        let ite = tm.mk_ite(c, p, q);
        let (result, aux) = elim.apply(&mut tm, ite);
        assert_eq!(result, ite);
        assert!(aux.is_empty());
    }

    #[test]
    fn test_repeated_ite_shares_one_name() {
        let mut tm = TermManager::new();
        let mut dn = DefinedNames::new();
        let mut elim = ElimTermIte::new(&mut dn);
        let c = tm.mk_var("c", tm.sorts.bool_sort);
        let x = tm.mk_var("x", tm.sorts.int_sort);
        let y = tm.mk_var("y", tm.sorts.int_sort);
        let ite = tm.mk_ite(c, x, y);
        let sum = tm.mk_add(vec![ite, ite]);
        let zero = tm.mk_int(BigInt::from(0));
        let gt = tm.mk_gt(sum, zero);
        let (_, aux) = elim.apply(&mut tm, gt);
        assert_eq!(aux.len(), 1);
    }
}
