//! Pull cheap if-then-else trees out of equalities with values.
//!
//! `(= (ite c t e) v)` with `v` a value becomes `(ite c (= t v) (= e v))`,
//! recursively through nested ITE branches. Cheap because the value side is
//! duplicated, never a compound term.

use rustc_hash::FxHashMap;
use silica_core::ast::{TermId, TermKind, TermManager};

/// Cheap ITE-tree puller.
#[derive(Debug, Default)]
pub struct PullCheapIteTree {
    cache: FxHashMap<TermId, TermId>,
}

impl PullCheapIteTree {
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
            Some(TermKind::Eq(lhs, rhs)) => {
                if Self::is_ite(tm, lhs) && tm.is_value(rhs) {
                    Self::pull(tm, lhs, rhs)
                } else if Self::is_ite(tm, rhs) && tm.is_value(lhs) {
                    Self::pull(tm, rhs, lhs)
                } else {
                    rebuilt
                }
            }
            _ => rebuilt,
        };
        self.cache.insert(e, result);
        result
    }

    fn is_ite(tm: &TermManager, t: TermId) -> bool {
        matches!(tm.get(t).map(|t| &t.kind), Some(TermKind::Ite(..)))
    }

    fn pull(tm: &mut TermManager, ite: TermId, value: TermId) -> TermId {
        let Some(TermKind::Ite(c, t, e)) = tm.get(ite).map(|t| t.kind.clone()) else {
            return tm.mk_eq(ite, value);
        };
        let then_eq = if Self::is_ite(tm, t) {
            Self::pull(tm, t, value)
        } else {
            tm.mk_eq(t, value)
        };
        let else_eq = if Self::is_ite(tm, e) {
            Self::pull(tm, e, value)
        } else {
            tm.mk_eq(e, value)
        };
        tm.mk_ite(c, then_eq, else_eq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn test_eq_of_ite_and_value() {
        let mut tm = TermManager::new();
        let mut functor = PullCheapIteTree::new();
        let c = tm.mk_var("c", tm.sorts.bool_sort);
        let x = tm.mk_var("x", tm.sorts.int_sort);
        let y = tm.mk_var("y", tm.sorts.int_sort);
        let three = tm.mk_int(BigInt::from(3));
        let ite = tm.mk_ite(c, x, y);
        let eq = tm.mk_eq(ite, three);

        let result = functor.apply(&mut tm, eq);
        let eq_x = tm.mk_eq(x, three);
        let eq_y = tm.mk_eq(y, three);
        let expected = tm.mk_ite(c, eq_x, eq_y);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_nested_ite_tree() {
        let mut tm = TermManager::new();
        let mut functor = PullCheapIteTree::new();
        let c1 = tm.mk_var("c1", tm.sorts.bool_sort);
        let c2 = tm.mk_var("c2", tm.sorts.bool_sort);
        let x = tm.mk_var("x", tm.sorts.int_sort);
        let y = tm.mk_var("y", tm.sorts.int_sort);
        let z = tm.mk_var("z", tm.sorts.int_sort);
        let three = tm.mk_int(BigInt::from(3));
        let inner = tm.mk_ite(c2, y, z);
        let outer = tm.mk_ite(c1, x, inner);
        let eq = tm.mk_eq(three, outer);

        let result = functor.apply(&mut tm, eq);
        let eq_x = tm.mk_eq(x, three);
        let eq_y = tm.mk_eq(y, three);
        let eq_z = tm.mk_eq(z, three);
        let inner_ite = tm.mk_ite(c2, eq_y, eq_z);
        let expected = tm.mk_ite(c1, eq_x, inner_ite);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_non_value_side_untouched() {
        let mut tm = TermManager::new();
        let mut functor = PullCheapIteTree::new();
        let c = tm.mk_var("c", tm.sorts.bool_sort);
        let x = tm.mk_var("x", tm.sorts.int_sort);
        let y = tm.mk_var("y", tm.sorts.int_sort);
        let z = tm.mk_var("z", tm.sorts.int_sort);
        let ite = tm.mk_ite(c, x, y);
        let eq = tm.mk_eq(ite, z);
        assert_eq!(functor.apply(&mut tm, eq), eq);
    }
}
