//! Eliminate small bit-vector variables from quantifiers by enumeration.
//!
//! A quantified bit-vector variable of width `w` ranges over `2^w`
//! constants; for small widths the quantifier is ground-expanded into a
//! conjunction (universal) or disjunction (existential) of instances. The
//! expansion is capped so wide variables and large blocks are left for the
//! downstream solver.

use lasso::Spur;
use num_bigint::BigInt;
use rustc_hash::FxHashMap;
use silica_core::ast::{TermId, TermKind, TermManager};
use silica_core::sort::{SortId, SortKind};

/// Widest variable eligible for enumeration.
const MAX_WIDTH: u32 = 4;
/// Cap on instances produced per quantifier.
const MAX_INSTANCES: usize = 16;

/// Quantified bit-vector eliminator.
#[derive(Debug, Default)]
pub struct BvQuantifierElim {
    cache: FxHashMap<TermId, TermId>,
}

impl BvQuantifierElim {
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
                Self::expand(tm, true, vars, body).unwrap_or(rebuilt)
            }
            Some(TermKind::Exists { vars, body, .. }) => {
                Self::expand(tm, false, vars, body).unwrap_or(rebuilt)
            }
            _ => rebuilt,
        };
        self.cache.insert(e, result);
        result
    }

    fn expand(
        tm: &mut TermManager,
        universal: bool,
        vars: Vec<(Spur, SortId)>,
        body: TermId,
    ) -> Option<TermId> {
        let mut enumerable: Vec<(Spur, u32)> = Vec::new();
        let mut rest: Vec<(Spur, SortId)> = Vec::new();
        for (name, sort) in vars {
            match tm.sorts.get(sort).map(|s| s.kind.clone()) {
                Some(SortKind::BitVec(w)) if w <= MAX_WIDTH => enumerable.push((name, w)),
                _ => rest.push((name, sort)),
            }
        }
        if enumerable.is_empty() {
            return None;
        }
        let total: usize = enumerable
            .iter()
            .try_fold(1usize, |acc, &(_, w)| {
                acc.checked_mul(1usize.checked_shl(w)?)
            })
            .filter(|&total| total <= MAX_INSTANCES)?;

        let mut instances = Vec::with_capacity(total);
        let mut assignment = vec![0u64; enumerable.len()];
        loop {
            let mut subst = FxHashMap::default();
            for (&(name, w), &value) in enumerable.iter().zip(assignment.iter()) {
                let constant = tm.mk_bv(BigInt::from(value), w);
                subst.insert(name, constant);
            }
            let instantiated = tm.substitute_vars(body, &subst);
            let instance = if rest.is_empty() {
                instantiated
            } else if universal {
                tm.mk_forall(rest.clone(), Vec::new(), instantiated)
            } else {
                tm.mk_exists(rest.clone(), Vec::new(), instantiated)
            };
            instances.push(instance);

            // advance the mixed-radix counter
            let mut carry = true;
            for (slot, &(_, w)) in assignment.iter_mut().zip(enumerable.iter()) {
                if !carry {
                    break;
                }
                *slot += 1;
                if *slot == (1u64 << w) {
                    *slot = 0;
                } else {
                    carry = false;
                }
            }
            if carry {
                break;
            }
        }
        tracing::debug!(instances = instances.len(), "expanded quantified bit-vectors");
        Some(if universal {
            tm.mk_and(instances)
        } else {
            tm.mk_or(instances)
        })
    }
}
