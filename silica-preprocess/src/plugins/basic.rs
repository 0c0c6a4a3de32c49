//! Boolean simplification rules.

use rustc_hash::FxHashSet;
use silica_core::ast::{TermId, TermKind, TermManager};

use crate::simplify::{SimplifierPlugin, SimplifyCtx};

/// Boolean connective rules: constant folding, flattening, unit laws, and
/// the `eliminate_and` policy rewriting conjunctions into negated
/// disjunctions.
pub struct BasicPlugin;

impl BasicPlugin {
    fn negate(tm: &mut TermManager, t: TermId) -> TermId {
        if let Some(arg) = tm.as_not(t) {
            return arg;
        }
        if tm.is_true(t) {
            return tm.mk_false();
        }
        if tm.is_false(t) {
            return tm.mk_true();
        }
        tm.mk_not(t)
    }

    fn reduce_and(tm: &mut TermManager, args: &[TermId], ctx: &SimplifyCtx) -> Option<TermId> {
        let mut flat = Vec::with_capacity(args.len());
        let mut changed = false;
        for &a in args {
            match tm.get(a).map(|t| t.kind.clone()) {
                Some(TermKind::And(inner)) => {
                    flat.extend(inner);
                    changed = true;
                }
                Some(TermKind::True) => changed = true,
                Some(TermKind::False) => return Some(tm.mk_false()),
                _ => flat.push(a),
            }
        }
        let mut seen = FxHashSet::default();
        let before = flat.len();
        flat.retain(|&t| seen.insert(t));
        changed |= flat.len() != before;
        for &t in &flat {
            if let Some(arg) = tm.as_not(t) {
                if seen.contains(&arg) {
                    return Some(tm.mk_false());
                }
            }
        }
        if ctx.eliminate_and {
            let negated: Vec<TermId> = flat.iter().map(|&t| Self::negate(tm, t)).collect();
            let or = tm.mk_or(negated);
            return Some(Self::negate(tm, or));
        }
        if changed || flat.len() < 2 {
            Some(tm.mk_and(flat))
        } else {
            None
        }
    }

    fn reduce_or(tm: &mut TermManager, args: &[TermId]) -> Option<TermId> {
        let mut flat = Vec::with_capacity(args.len());
        let mut changed = false;
        for &a in args {
            match tm.get(a).map(|t| t.kind.clone()) {
                Some(TermKind::Or(inner)) => {
                    flat.extend(inner);
                    changed = true;
                }
                Some(TermKind::False) => changed = true,
                Some(TermKind::True) => return Some(tm.mk_true()),
                _ => flat.push(a),
            }
        }
        let mut seen = FxHashSet::default();
        let before = flat.len();
        flat.retain(|&t| seen.insert(t));
        changed |= flat.len() != before;
        for &t in &flat {
            if let Some(arg) = tm.as_not(t) {
                if seen.contains(&arg) {
                    return Some(tm.mk_true());
                }
            }
        }
        if changed || flat.len() < 2 {
            Some(tm.mk_or(flat))
        } else {
            None
        }
    }
}

impl SimplifierPlugin for BasicPlugin {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn cheap(&self) -> bool {
        true
    }

    fn reduce(&self, tm: &mut TermManager, t: TermId, ctx: &SimplifyCtx) -> Option<TermId> {
        let kind = tm.get(t)?.kind.clone();
        match kind {
            TermKind::Not(a) => {
                if tm.is_true(a) {
                    Some(tm.mk_false())
                } else if tm.is_false(a) {
                    Some(tm.mk_true())
                } else {
                    tm.as_not(a)
                }
            }
            TermKind::And(args) => Self::reduce_and(tm, &args, ctx),
            TermKind::Or(args) => Self::reduce_or(tm, &args),
            TermKind::Implies(a, b) => {
                let not_a = Self::negate(tm, a);
                Some(tm.mk_or(vec![not_a, b]))
            }
            TermKind::Xor(a, b) => {
                if a == b {
                    Some(tm.mk_false())
                } else if tm.is_false(a) {
                    Some(b)
                } else if tm.is_false(b) {
                    Some(a)
                } else if tm.is_true(a) {
                    Some(Self::negate(tm, b))
                } else if tm.is_true(b) {
                    Some(Self::negate(tm, a))
                } else if tm.as_not(a) == Some(b) || tm.as_not(b) == Some(a) {
                    Some(tm.mk_true())
                } else {
                    None
                }
            }
            TermKind::Eq(a, b) => {
                if a == b {
                    return Some(tm.mk_true());
                }
                if tm.is_true(b) {
                    return Some(a);
                }
                if tm.is_false(b) {
                    return Some(Self::negate(tm, a));
                }
                if tm.is_true(a) {
                    return Some(b);
                }
                if tm.is_false(a) {
                    return Some(Self::negate(tm, b));
                }
                if tm.as_not(a) == Some(b) || tm.as_not(b) == Some(a) {
                    return Some(tm.mk_false());
                }
                if tm.is_value(a) && tm.is_value(b) {
                    // hash-consing makes distinct values distinct handles
                    return Some(tm.mk_false());
                }
                None
            }
            TermKind::Ite(c, then, els) => {
                if tm.is_true(c) {
                    Some(then)
                } else if tm.is_false(c) {
                    Some(els)
                } else if then == els {
                    Some(then)
                } else if let Some(inner) = tm.as_not(c) {
                    Some(tm.mk_ite(inner, els, then))
                } else if tm.is_true(then) && tm.is_false(els) {
                    Some(c)
                } else if tm.is_false(then) && tm.is_true(els) {
                    Some(Self::negate(tm, c))
                } else {
                    None
                }
            }
            TermKind::Distinct(args) => {
                let mut seen = FxHashSet::default();
                for &a in &args {
                    if !seen.insert(a) {
                        return Some(tm.mk_false());
                    }
                }
                if args.len() < 2 {
                    return Some(tm.mk_true());
                }
                if args.iter().all(|&a| tm.is_value(a)) {
                    return Some(tm.mk_true());
                }
                if args.len() == 2 {
                    let eq = tm.mk_eq(args[0], args[1]);
                    return Some(tm.mk_not(eq));
                }
                None
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simplify(tm: &mut TermManager, t: TermId) -> TermId {
        let ctx = SimplifyCtx {
            eliminate_and: false,
            presimp: false,
        };
        BasicPlugin.reduce(tm, t, &ctx).unwrap_or(t)
    }

    #[test]
    fn test_and_flattening_and_units() {
        let mut tm = TermManager::new();
        let p = tm.mk_var("p", tm.sorts.bool_sort);
        let q = tm.mk_var("q", tm.sorts.bool_sort);
        let t = tm.mk_true();
        let inner = tm.mk_and(vec![q, t]);
        let and = tm.mk_and(vec![p, inner, t]);
        let expected = tm.mk_and(vec![p, q]);
        assert_eq!(simplify(&mut tm, and), expected);
    }

    #[test]
    fn test_complementary_literals() {
        let mut tm = TermManager::new();
        let p = tm.mk_var("p", tm.sorts.bool_sort);
        let not_p = tm.mk_not(p);
        let and = tm.mk_and(vec![p, not_p]);
        let and_simplified = simplify(&mut tm, and);
        assert!(tm.is_false(and_simplified));
        let or = tm.mk_or(vec![p, not_p]);
        let or_simplified = simplify(&mut tm, or);
        assert!(tm.is_true(or_simplified));
    }

    #[test]
    fn test_eliminate_and_policy() {
        let mut tm = TermManager::new();
        let p = tm.mk_var("p", tm.sorts.bool_sort);
        let q = tm.mk_var("q", tm.sorts.bool_sort);
        let and = tm.mk_and(vec![p, q]);
        let ctx = SimplifyCtx {
            eliminate_and: true,
            presimp: false,
        };
        let reduced = BasicPlugin.reduce(&mut tm, and, &ctx).unwrap();
        let not_p = tm.mk_not(p);
        let not_q = tm.mk_not(q);
        let or = tm.mk_or(vec![not_p, not_q]);
        let expected = tm.mk_not(or);
        assert_eq!(reduced, expected);
    }

    #[test]
    fn test_ite_rules() {
        let mut tm = TermManager::new();
        let c = tm.mk_var("c", tm.sorts.bool_sort);
        let x = tm.mk_var("x", tm.sorts.int_sort);
        let y = tm.mk_var("y", tm.sorts.int_sort);
        let t = tm.mk_true();
        let ite = tm.mk_ite(t, x, y);
        assert_eq!(simplify(&mut tm, ite), x);
        let same = tm.mk_ite(c, x, x);
        assert_eq!(simplify(&mut tm, same), x);
        let tt = tm.mk_true();
        let ff = tm.mk_false();
        let as_cond = tm.mk_ite(c, tt, ff);
        assert_eq!(simplify(&mut tm, as_cond), c);
    }

    #[test]
    fn test_eq_bool_units() {
        let mut tm = TermManager::new();
        let p = tm.mk_var("p", tm.sorts.bool_sort);
        let t = tm.mk_true();
        let eq = tm.mk_eq(p, t);
        assert_eq!(simplify(&mut tm, eq), p);
    }

    #[test]
    fn test_implies_becomes_or() {
        let mut tm = TermManager::new();
        let p = tm.mk_var("p", tm.sorts.bool_sort);
        let q = tm.mk_var("q", tm.sorts.bool_sort);
        let imp = tm.mk_implies(p, q);
        let not_p = tm.mk_not(p);
        let expected = tm.mk_or(vec![not_p, q]);
        assert_eq!(simplify(&mut tm, imp), expected);
    }
}
