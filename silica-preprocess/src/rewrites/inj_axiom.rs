//! Refine injectivity axioms.
//!
//! `(forall x y (=> (= (f x) (f y)) (= x y)))` says `f` is injective. The
//! axiom is replaced by the definition of an inverse: `(forall x (= (g (f
//! x)) x))` for a fresh `g`, which the congruence closure handles without
//! quadratic instantiation.

use lasso::Spur;
use silica_core::ast::{TermId, TermKind, TermManager};
use silica_core::sort::SortId;

/// Recognize and refine an injectivity axiom; `None` when `e` does not
/// match the pattern.
pub fn refine_inj_axiom(tm: &mut TermManager, e: TermId) -> Option<TermId> {
    let TermKind::Forall { vars, body, .. } = tm.get(e)?.kind.clone() else {
        return None;
    };
    if vars.len() != 2 {
        return None;
    }
    let (x_name, x_sort) = vars[0];
    let (y_name, y_sort) = vars[1];
    if x_sort != y_sort {
        return None;
    }
    let x = tm.mk_var_from(x_name, x_sort);
    let y = tm.mk_var_from(y_name, y_sort);

    let (premise, conclusion) = match tm.get(body)?.kind.clone() {
        TermKind::Implies(p, c) => (p, c),
        // the basic simplifier rewrites implications into clauses
        TermKind::Or(args) if args.len() == 2 => {
            let (a, b) = (args[0], args[1]);
            if let Some(p) = tm.as_not(a) {
                (p, b)
            } else if let Some(p) = tm.as_not(b) {
                (p, a)
            } else {
                return None;
            }
        }
        _ => return None,
    };

    // conclusion: x = y (either orientation)
    let (ca, cb) = tm.as_eq(conclusion)?;
    if !((ca == x && cb == y) || (ca == y && cb == x)) {
        return None;
    }

    // premise: f(x) = f(y) for the same unary f
    let (pa, pb) = tm.as_eq(premise)?;
    let fa = unary_apply(tm, pa)?;
    let fb = unary_apply(tm, pb)?;
    if fa.0 != fb.0 {
        return None;
    }
    let matches_vars = (fa.1 == x && fb.1 == y) || (fa.1 == y && fb.1 == x);
    if !matches_vars {
        return None;
    }

    let func = fa.0;
    tracing::debug!(func = tm.resolve(func), "refining injectivity axiom");
    let range = tm.sort_of(pa);
    let inv = tm.fresh_symbol("inj");
    let fx = apply_unary(tm, func, x, range);
    let gfx = apply_unary(tm, inv, fx, x_sort);
    let eq = tm.mk_eq(gfx, x);
    Some(tm.mk_forall(vec![(x_name, x_sort)], vec![fx], eq))
}

fn unary_apply(tm: &TermManager, t: TermId) -> Option<(Spur, TermId)> {
    match tm.get(t).map(|term| term.kind.clone()) {
        Some(TermKind::Apply { func, args }) if args.len() == 1 => Some((func, args[0])),
        _ => None,
    }
}

fn apply_unary(tm: &mut TermManager, func: Spur, arg: TermId, sort: SortId) -> TermId {
    tm.mk_apply_from(func, vec![arg], sort)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implication_form() {
        let mut tm = TermManager::new();
        let int = tm.sorts.int_sort;
        let x_sym = tm.intern("x");
        let y_sym = tm.intern("y");
        let x = tm.mk_var("x", int);
        let y = tm.mk_var("y", int);
        let fx = tm.mk_apply("f", vec![x], int);
        let fy = tm.mk_apply("f", vec![y], int);
        let premise = tm.mk_eq(fx, fy);
        let conclusion = tm.mk_eq(x, y);
        let body = tm.mk_implies(premise, conclusion);
        let axiom = tm.mk_forall(vec![(x_sym, int), (y_sym, int)], vec![], body);

        let refined = refine_inj_axiom(&mut tm, axiom).unwrap();
        let Some(TermKind::Forall { vars, patterns, body }) =
            tm.get(refined).map(|t| t.kind.clone())
        else {
            panic!("expected a quantifier");
        };
        assert_eq!(vars.len(), 1);
        assert_eq!(patterns.len(), 1);
        let printed = tm.display_term(body);
        assert!(printed.contains("inj!"));
    }

    #[test]
    fn test_clause_form() {
        let mut tm = TermManager::new();
        let int = tm.sorts.int_sort;
        let x_sym = tm.intern("x");
        let y_sym = tm.intern("y");
        let x = tm.mk_var("x", int);
        let y = tm.mk_var("y", int);
        let fx = tm.mk_apply("f", vec![x], int);
        let fy = tm.mk_apply("f", vec![y], int);
        let premise = tm.mk_eq(fx, fy);
        let not_premise = tm.mk_not(premise);
        let conclusion = tm.mk_eq(x, y);
        let body = tm.mk_or(vec![not_premise, conclusion]);
        let axiom = tm.mk_forall(vec![(x_sym, int), (y_sym, int)], vec![], body);
        assert!(refine_inj_axiom(&mut tm, axiom).is_some());
    }

    #[test]
    fn test_non_axiom_is_rejected() {
        let mut tm = TermManager::new();
        let int = tm.sorts.int_sort;
        let x_sym = tm.intern("x");
        let x = tm.mk_var("x", int);
        let fx = tm.mk_apply("f", vec![x], int);
        let eq = tm.mk_eq(fx, x);
        let q = tm.mk_forall(vec![(x_sym, int)], vec![], eq);
        assert!(refine_inj_axiom(&mut tm, q).is_none());
    }
}
