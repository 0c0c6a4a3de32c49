//! Lift if-then-else terms out of applications.
//!
//! `f(.. (ite c t e) ..)` becomes `(ite c f(.. t ..) f(.. e ..))`. The
//! conservative mode only lifts when both branches are values (no term
//! duplication beyond values); the non-ground variant lifts only under
//! binders, where the downstream instantiation machinery benefits most.

use rustc_hash::FxHashMap;
use silica_core::ast::{TermId, TermKind, TermManager};

/// ITE lifter over applications and theory operators.
#[derive(Debug)]
pub struct PushAppIte {
    conservative: bool,
    nonground_only: bool,
    cache: FxHashMap<(TermId, bool), TermId>,
}

impl PushAppIte {
    /// Create a lifter. `conservative` restricts lifting to value
    /// branches; `nonground_only` restricts it to terms under binders.
    #[must_use]
    pub fn new(conservative: bool, nonground_only: bool) -> Self {
        Self {
            conservative,
            nonground_only,
            cache: FxHashMap::default(),
        }
    }

    /// Transform `e`.
    pub fn apply(&mut self, tm: &mut TermManager, e: TermId) -> TermId {
        self.walk(tm, e, false, 0)
    }

    fn walk(&mut self, tm: &mut TermManager, e: TermId, under_binder: bool, depth: usize) -> TermId {
        if depth > 256 {
            return e;
        }
        if let Some(&hit) = self.cache.get(&(e, under_binder)) {
            return hit;
        }
        let is_binder = matches!(
            tm.get(e).map(|t| &t.kind),
            Some(TermKind::Forall { .. }) | Some(TermKind::Exists { .. })
        );
        let inner_flag = under_binder || is_binder;
        let children = tm.children(e);
        let new: Vec<TermId> = children
            .into_iter()
            .map(|c| self.walk(tm, c, inner_flag, depth + 1))
            .collect();
        let rebuilt = tm.rebuild(e, &new);

        let result = if self.nonground_only && !under_binder {
            rebuilt
        } else {
            self.lift(tm, rebuilt, under_binder, depth)
        };
        self.cache.insert((e, under_binder), result);
        result
    }

    fn lift(&mut self, tm: &mut TermManager, e: TermId, under_binder: bool, depth: usize) -> TermId {
        if !Self::liftable(tm, e) {
            return e;
        }
        let children: Vec<TermId> = tm.children(e).into_iter().collect();
        for (idx, &child) in children.iter().enumerate() {
            let Some(TermKind::Ite(c, t, els)) = tm.get(child).map(|t| t.kind.clone()) else {
                continue;
            };
            // Boolean ITEs stay: NNF owns those.
            if tm
                .get(child)
                .and_then(|term| tm.sorts.get(term.sort))
                .is_some_and(|s| s.is_bool())
            {
                continue;
            }
            if self.conservative && !(tm.is_value(t) && tm.is_value(els)) {
                continue;
            }
            let mut then_children = children.clone();
            then_children[idx] = t;
            let mut else_children = children.clone();
            else_children[idx] = els;
            let then_app = tm.rebuild(e, &then_children);
            let else_app = tm.rebuild(e, &else_children);
            // remaining ITE arguments are lifted from the copies
            let then_app = self.lift(tm, then_app, under_binder, depth + 1);
            let else_app = self.lift(tm, else_app, under_binder, depth + 1);
            return tm.mk_ite(c, then_app, else_app);
        }
        e
    }

    fn liftable(tm: &TermManager, e: TermId) -> bool {
        matches!(
            tm.get(e).map(|t| &t.kind),
            Some(
                TermKind::Apply { .. }
                    | TermKind::Add(_)
                    | TermKind::Sub(..)
                    | TermKind::Mul(_)
                    | TermKind::Neg(_)
                    | TermKind::Div(..)
                    | TermKind::Mod(..)
                    | TermKind::Le(..)
                    | TermKind::Lt(..)
                    | TermKind::Ge(..)
                    | TermKind::Gt(..)
                    | TermKind::Eq(..)
                    | TermKind::Select(..)
                    | TermKind::Store(..)
                    | TermKind::BvAdd(..)
                    | TermKind::BvMul(..)
                    | TermKind::BvAnd(..)
                    | TermKind::BvOr(..)
                    | TermKind::BvXor(..)
                    | TermKind::BvNot(_)
                    | TermKind::BvNeg(_)
            )
        )
    }
}
