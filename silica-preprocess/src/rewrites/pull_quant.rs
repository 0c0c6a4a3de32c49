//! Merge directly nested quantifiers of the same kind.
//!
//! `(forall xs (forall ys body))` becomes `(forall xs++ys body)`, renaming
//! inner binders that clash with outer ones. Inner patterns are dropped:
//! they mention only the inner binders and would under-constrain the merged
//! block.

use rustc_hash::FxHashMap;
use silica_core::ast::{TermId, TermKind, TermManager};

/// Nested-quantifier merger.
#[derive(Debug, Default)]
pub struct PullNestedQuantifiers {
    cache: FxHashMap<TermId, TermId>,
}

impl PullNestedQuantifiers {
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
                if let Some(TermKind::Forall {
                    vars: inner_vars,
                    body: inner_body,
                    ..
                }) = tm.get(body).map(|t| t.kind.clone())
                {
                    Self::merge(tm, true, vars, inner_vars, inner_body)
                } else {
                    rebuilt
                }
            }
            Some(TermKind::Exists { vars, body, .. }) => {
                if let Some(TermKind::Exists {
                    vars: inner_vars,
                    body: inner_body,
                    ..
                }) = tm.get(body).map(|t| t.kind.clone())
                {
                    Self::merge(tm, false, vars, inner_vars, inner_body)
                } else {
                    rebuilt
                }
            }
            _ => rebuilt,
        };
        self.cache.insert(e, result);
        result
    }

    fn merge(
        tm: &mut TermManager,
        universal: bool,
        outer: Vec<(lasso::Spur, silica_core::sort::SortId)>,
        inner: Vec<(lasso::Spur, silica_core::sort::SortId)>,
        mut body: TermId,
    ) -> TermId {
        let outer_names: Vec<lasso::Spur> = outer.iter().map(|(name, _)| *name).collect();
        let mut merged = outer;
        let mut renames = FxHashMap::default();
        for (name, sort) in inner {
            if outer_names.contains(&name) {
                let base = tm.resolve(name).to_string();
                let fresh = tm.fresh_symbol(&base);
                let replacement = tm.mk_var_from(fresh, sort);
                renames.insert(name, replacement);
                merged.push((fresh, sort));
            } else {
                merged.push((name, sort));
            }
        }
        if !renames.is_empty() {
            body = tm.substitute_vars(body, &renames);
        }
        if universal {
            tm.mk_forall(merged, Vec::new(), body)
        } else {
            tm.mk_exists(merged, Vec::new(), body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn test_nested_foralls_merge() {
        let mut tm = TermManager::new();
        let mut functor = PullNestedQuantifiers::new();
        let int = tm.sorts.int_sort;
        let x_sym = tm.intern("x");
        let y_sym = tm.intern("y");
        let x = tm.mk_var("x", int);
        let y = tm.mk_var("y", int);
        let le = tm.mk_le(x, y);
        let inner = tm.mk_forall(vec![(y_sym, int)], vec![], le);
        let outer = tm.mk_forall(vec![(x_sym, int)], vec![], inner);

        let result = functor.apply(&mut tm, outer);
        let expected = tm.mk_forall(vec![(x_sym, int), (y_sym, int)], vec![], le);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_clashing_binder_renamed() {
        let mut tm = TermManager::new();
        let mut functor = PullNestedQuantifiers::new();
        let int = tm.sorts.int_sort;
        let x_sym = tm.intern("x");
        let x = tm.mk_var("x", int);
        let zero = tm.mk_int(BigInt::from(0));
        let gt = tm.mk_gt(x, zero);
        let inner = tm.mk_forall(vec![(x_sym, int)], vec![], gt);
        let outer = tm.mk_forall(vec![(x_sym, int)], vec![], inner);

        let result = functor.apply(&mut tm, outer);
        let Some(TermKind::Forall { vars, .. }) = tm.get(result).map(|t| t.kind.clone()) else {
            panic!("expected a quantifier");
        };
        assert_eq!(vars.len(), 2);
        assert_ne!(vars[0].0, vars[1].0);
    }

    #[test]
    fn test_mixed_kinds_not_merged() {
        let mut tm = TermManager::new();
        let mut functor = PullNestedQuantifiers::new();
        let int = tm.sorts.int_sort;
        let x_sym = tm.intern("x");
        let y_sym = tm.intern("y");
        let x = tm.mk_var("x", int);
        let y = tm.mk_var("y", int);
        let le = tm.mk_le(x, y);
        let inner = tm.mk_exists(vec![(y_sym, int)], vec![], le);
        let outer = tm.mk_forall(vec![(x_sym, int)], vec![], inner);
        assert_eq!(functor.apply(&mut tm, outer), outer);
    }
}
