//! Infer instantiation patterns for bare quantifiers.
//!
//! A quantifier with no patterns gets the smallest uninterpreted
//! application covering all its bound variables, when one exists. The
//! e-matching engine downstream refuses to instantiate pattern-less
//! quantifiers, so a missing pattern silently disables them.

use lasso::Spur;
use rustc_hash::{FxHashMap, FxHashSet};
use silica_core::ast::{TermId, TermKind, TermManager};

/// Pattern inferrer.
#[derive(Debug, Default)]
pub struct PatternInference {
    cache: FxHashMap<TermId, TermId>,
}

impl PatternInference {
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
            Some(TermKind::Forall { vars, patterns, body }) if patterns.is_empty() => {
                let names: FxHashSet<Spur> = vars.iter().map(|(name, _)| *name).collect();
                match Self::best_candidate(tm, body, &names) {
                    Some(pattern) => {
                        tracing::debug!(pattern = %tm.display_term(pattern), "inferred pattern");
                        tm.mk_forall(vars, vec![pattern], body)
                    }
                    None => rebuilt,
                }
            }
            _ => rebuilt,
        };
        self.cache.insert(e, result);
        result
    }

    /// Smallest application subterm whose free variables cover `names`.
    fn best_candidate(
        tm: &TermManager,
        body: TermId,
        names: &FxHashSet<Spur>,
    ) -> Option<TermId> {
        let mut best: Option<(usize, TermId)> = None;
        let mut visited = FxHashSet::default();
        Self::collect(tm, body, names, &mut best, &mut visited);
        best.map(|(_, t)| t)
    }

    fn collect(
        tm: &TermManager,
        t: TermId,
        names: &FxHashSet<Spur>,
        best: &mut Option<(usize, TermId)>,
        visited: &mut FxHashSet<TermId>,
    ) {
        if !visited.insert(t) {
            return;
        }
        if let Some(TermKind::Apply { .. }) = tm.get(t).map(|term| &term.kind) {
            let free = tm.free_vars(t);
            if names.iter().all(|name| free.contains(name)) {
                let size = tm.num_exprs(t);
                let better = best.map_or(true, |(best_size, _)| size < best_size);
                if better {
                    *best = Some((size, t));
                }
            }
        }
        for child in tm.children(t) {
            Self::collect(tm, child, names, best, visited);
        }
    }
}
