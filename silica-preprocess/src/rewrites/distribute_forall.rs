//! Distribute universal quantifiers over conjunctions.
//!
//! `(forall xs (and p q))` becomes `(and (forall xs p) (forall xs q))`, and
//! the NNF-shaped `(not (exists xs (or p q)))` distributes dually. Smaller
//! quantified formulas give pattern inference and instantiation more
//! leverage.

use rustc_hash::FxHashMap;
use silica_core::ast::{TermId, TermKind, TermManager};

/// Forall-over-and distributor.
#[derive(Debug, Default)]
pub struct DistributeForall {
    cache: FxHashMap<TermId, TermId>,
}

impl DistributeForall {
    /// Create a functor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform `e`.
    pub fn apply(&mut self, tm: &mut TermManager, e: TermId) -> TermId {
        if let Some(&hit) = self.cache.get(&e) {
            return hit;
        }
        let children = tm.children(e);
        let new: Vec<TermId> = children.into_iter().map(|c| self.apply(tm, c)).collect();
        let rebuilt = tm.rebuild(e, &new);

        let result = match tm.get(rebuilt).map(|t| t.kind.clone()) {
            Some(TermKind::Forall { vars, body, .. }) => {
                if let Some(TermKind::And(conjuncts)) = tm.get(body).map(|t| t.kind.clone()) {
                    let distributed: Vec<TermId> = conjuncts
                        .into_iter()
                        .map(|conjunct| {
                            let q = tm.mk_forall(vars.clone(), Vec::new(), conjunct);
                            // nested conjunctions distribute further
                            self.apply(tm, q)
                        })
                        .collect();
                    tm.mk_and(distributed)
                } else {
                    rebuilt
                }
            }
            Some(TermKind::Not(inner)) => {
                if let Some(TermKind::Exists { vars, body, .. }) =
                    tm.get(inner).map(|t| t.kind.clone())
                {
                    if let Some(TermKind::Or(disjuncts)) = tm.get(body).map(|t| t.kind.clone()) {
                        let distributed: Vec<TermId> = disjuncts
                            .into_iter()
                            .map(|disjunct| {
                                let q = tm.mk_exists(vars.clone(), Vec::new(), disjunct);
                                let negated = tm.mk_not(q);
                                self.apply(tm, negated)
                            })
                            .collect();
                        tm.mk_and(distributed)
                    } else {
                        rebuilt
                    }
                } else {
                    rebuilt
                }
            }
            _ => rebuilt,
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
    fn test_forall_over_and() {
        let mut tm = TermManager::new();
        let mut functor = DistributeForall::new();
        let int = tm.sorts.int_sort;
        let x_sym = tm.intern("x");
        let x = tm.mk_var("x", int);
        let zero = tm.mk_int(BigInt::from(0));
        let ten = tm.mk_int(BigInt::from(10));
        let lower = tm.mk_ge(x, zero);
        let upper = tm.mk_le(x, ten);
        let conj = tm.mk_and(vec![lower, upper]);
        let q = tm.mk_forall(vec![(x_sym, int)], vec![], conj);

        let result = functor.apply(&mut tm, q);
        let q1 = tm.mk_forall(vec![(x_sym, int)], vec![], lower);
        let q2 = tm.mk_forall(vec![(x_sym, int)], vec![], upper);
        let expected = tm.mk_and(vec![q1, q2]);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_negated_exists_over_or() {
        let mut tm = TermManager::new();
        let mut functor = DistributeForall::new();
        let int = tm.sorts.int_sort;
        let x_sym = tm.intern("x");
        let x = tm.mk_var("x", int);
        let zero = tm.mk_int(BigInt::from(0));
        let lt = tm.mk_lt(x, zero);
        let gt = tm.mk_gt(x, zero);
        let disj = tm.mk_or(vec![lt, gt]);
        let ex = tm.mk_exists(vec![(x_sym, int)], vec![], disj);
        let neg = tm.mk_not(ex);

        let result = functor.apply(&mut tm, neg);
        let e1 = tm.mk_exists(vec![(x_sym, int)], vec![], lt);
        let e2 = tm.mk_exists(vec![(x_sym, int)], vec![], gt);
        let n1 = tm.mk_not(e1);
        let n2 = tm.mk_not(e2);
        let expected = tm.mk_and(vec![n1, n2]);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_disjunction_body_untouched() {
        let mut tm = TermManager::new();
        let mut functor = DistributeForall::new();
        let int = tm.sorts.int_sort;
        let x_sym = tm.intern("x");
        let x = tm.mk_var("x", int);
        let zero = tm.mk_int(BigInt::from(0));
        let lt = tm.mk_lt(x, zero);
        let gt = tm.mk_gt(x, zero);
        let disj = tm.mk_or(vec![lt, gt]);
        let q = tm.mk_forall(vec![(x_sym, int)], vec![], disj);
        assert_eq!(functor.apply(&mut tm, q), q);
    }
}
