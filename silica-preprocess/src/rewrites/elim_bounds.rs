//! Cheap Fourier-Motzkin elimination of bounded quantified variables.
//!
//! In a quantified clause `forall x. (not (<= lo x)) | (not (<= x hi)) | R`
//! where `x` occurs only in the two bound literals, validity for all `x` is
//! equivalent to `(not (<= lo hi)) | R`: the clause can only fail when the
//! bounds admit a witness. The variable and its bounds are resolved away;
//! strictness combines as usual.

use lasso::Spur;
use rustc_hash::FxHashMap;
use silica_core::ast::{TermId, TermKind, TermManager};

/// Bounded-variable eliminator.
#[derive(Debug, Default)]
pub struct ElimBounds {
    cache: FxHashMap<TermId, TermId>,
}

#[derive(Debug, Clone, Copy)]
struct Bound {
    /// Index of the literal in the clause.
    lit: usize,
    /// The other side of the comparison.
    other: TermId,
    strict: bool,
}

impl ElimBounds {
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
            Some(TermKind::Forall { vars, patterns, body }) => {
                Self::eliminate(tm, vars, patterns, body).unwrap_or(rebuilt)
            }
            _ => rebuilt,
        };
        self.cache.insert(e, result);
        result
    }

    fn eliminate(
        tm: &mut TermManager,
        vars: Vec<(Spur, silica_core::sort::SortId)>,
        patterns: Vec<TermId>,
        body: TermId,
    ) -> Option<TermId> {
        let mut lits: Vec<TermId> = match tm.get(body)?.kind.clone() {
            TermKind::Or(args) => args,
            _ => vec![body],
        };
        let mut remaining = Vec::with_capacity(vars.len());
        let mut changed = false;
        for (name, sort) in vars {
            match Self::resolve_var(tm, name, &lits) {
                Some((lower, upper)) => {
                    let combined = if lower.strict || upper.strict {
                        tm.mk_lt(lower.other, upper.other)
                    } else {
                        tm.mk_le(lower.other, upper.other)
                    };
                    let resolvent = tm.mk_not(combined);
                    let mut keep = Vec::with_capacity(lits.len() - 1);
                    for (i, &lit) in lits.iter().enumerate() {
                        if i != lower.lit && i != upper.lit {
                            keep.push(lit);
                        }
                    }
                    keep.push(resolvent);
                    lits = keep;
                    changed = true;
                }
                None => remaining.push((name, sort)),
            }
        }
        if !changed {
            return None;
        }
        let clause = tm.mk_or(lits);
        Some(tm.mk_forall(remaining, patterns, clause))
    }

    /// Find the unique lower and upper bound literals on `name`, provided
    /// the variable occurs nowhere else in the clause.
    fn resolve_var(tm: &TermManager, name: Spur, lits: &[TermId]) -> Option<(Bound, Bound)> {
        let mut lower: Option<Bound> = None;
        let mut upper: Option<Bound> = None;
        for (i, &lit) in lits.iter().enumerate() {
            if !tm.free_vars(lit).contains(&name) {
                continue;
            }
            let (is_lower, bound) = Self::as_bound(tm, name, i, lit)?;
            let slot = if is_lower { &mut lower } else { &mut upper };
            if slot.is_some() {
                return None;
            }
            *slot = Some(bound);
        }
        match (lower, upper) {
            (Some(lo), Some(hi)) => Some((lo, hi)),
            _ => None,
        }
    }

    /// Classify a literal as a negated bound on `name`. The literal must
    /// be `not (rel a b)` with `name` alone on one side and absent from
    /// the other.
    fn as_bound(tm: &TermManager, name: Spur, lit_idx: usize, lit: TermId) -> Option<(bool, Bound)> {
        let atom = tm.as_not(lit)?;
        // normalize Ge/Gt into the Le/Lt orientation
        let (lhs, rhs, strict) = match tm.get(atom)?.kind.clone() {
            TermKind::Le(a, b) => (a, b, false),
            TermKind::Lt(a, b) => (a, b, true),
            TermKind::Ge(a, b) => (b, a, false),
            TermKind::Gt(a, b) => (b, a, true),
            _ => return None,
        };
        let var = tm.get(lhs).map(|t| t.kind.clone());
        let is_lhs_var = matches!(var, Some(TermKind::Var(v)) if v == name);
        let rhs_var = tm.get(rhs).map(|t| t.kind.clone());
        let is_rhs_var = matches!(rhs_var, Some(TermKind::Var(v)) if v == name);
        if is_lhs_var && !tm.free_vars(rhs).contains(&name) {
            // not (x <= hi): x is upper-bounded
            Some((
                false,
                Bound {
                    lit: lit_idx,
                    other: rhs,
                    strict,
                },
            ))
        } else if is_rhs_var && !tm.free_vars(lhs).contains(&name) {
            // not (lo <= x): x is lower-bounded
            Some((
                true,
                Bound {
                    lit: lit_idx,
                    other: lhs,
                    strict,
                },
            ))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_var_resolved() {
        let mut tm = TermManager::new();
        let mut functor = ElimBounds::new();
        let int = tm.sorts.int_sort;
        let x_sym = tm.intern("x");
        let x = tm.mk_var("x", int);
        let lo = tm.mk_var("lo", int);
        let hi = tm.mk_var("hi", int);
        let r = tm.mk_var("r", tm.sorts.bool_sort);

        // forall x. -(lo <= x) | -(x <= hi) | r
        let le_lo = tm.mk_le(lo, x);
        let le_hi = tm.mk_le(x, hi);
        let n1 = tm.mk_not(le_lo);
        let n2 = tm.mk_not(le_hi);
        let clause = tm.mk_or(vec![n1, n2, r]);
        let q = tm.mk_forall(vec![(x_sym, int)], vec![], clause);

        let result = functor.apply(&mut tm, q);
        let le = tm.mk_le(lo, hi);
        let not_le = tm.mk_not(le);
        let expected = tm.mk_or(vec![r, not_le]);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_strictness_combines() {
        let mut tm = TermManager::new();
        let mut functor = ElimBounds::new();
        let int = tm.sorts.int_sort;
        let x_sym = tm.intern("x");
        let x = tm.mk_var("x", int);
        let lo = tm.mk_var("lo", int);
        let hi = tm.mk_var("hi", int);

        // forall x. -(lo < x) | -(x <= hi)
        let lt_lo = tm.mk_lt(lo, x);
        let le_hi = tm.mk_le(x, hi);
        let n1 = tm.mk_not(lt_lo);
        let n2 = tm.mk_not(le_hi);
        let clause = tm.mk_or(vec![n1, n2]);
        let q = tm.mk_forall(vec![(x_sym, int)], vec![], clause);

        let result = functor.apply(&mut tm, q);
        let lt = tm.mk_lt(lo, hi);
        let expected = tm.mk_not(lt);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_extra_occurrence_blocks_elimination() {
        let mut tm = TermManager::new();
        let mut functor = ElimBounds::new();
        let int = tm.sorts.int_sort;
        let x_sym = tm.intern("x");
        let x = tm.mk_var("x", int);
        let lo = tm.mk_var("lo", int);
        let hi = tm.mk_var("hi", int);
        let y = tm.mk_var("y", int);

        // x also occurs in an equality literal: keep the quantifier
        let le_lo = tm.mk_le(lo, x);
        let le_hi = tm.mk_le(x, hi);
        let n1 = tm.mk_not(le_lo);
        let n2 = tm.mk_not(le_hi);
        let eq = tm.mk_eq(x, y);
        let clause = tm.mk_or(vec![n1, n2, eq]);
        let q = tm.mk_forall(vec![(x_sym, int)], vec![], clause);
        assert_eq!(functor.apply(&mut tm, q), q);
    }
}
