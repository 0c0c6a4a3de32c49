//! Arithmetic simplification rules.

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use silica_core::ast::{TermId, TermKind, TermManager};
use silica_core::sort::SortKind;
use std::cmp::Ordering;

use crate::simplify::{SimplifierPlugin, SimplifyCtx};

/// Integer or real numeral.
#[derive(Debug, Clone, PartialEq)]
enum Num {
    Int(BigInt),
    Real(BigRational),
}

impl Num {
    fn zero_like(&self) -> Num {
        match self {
            Num::Int(_) => Num::Int(BigInt::zero()),
            Num::Real(_) => Num::Real(BigRational::zero()),
        }
    }

    fn is_zero(&self) -> bool {
        match self {
            Num::Int(v) => v.is_zero(),
            Num::Real(v) => v.is_zero(),
        }
    }

    fn is_one(&self) -> bool {
        match self {
            Num::Int(v) => v.is_one(),
            Num::Real(v) => v.is_one(),
        }
    }

    fn add(self, other: Num) -> Option<Num> {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => Some(Num::Int(a + b)),
            (Num::Real(a), Num::Real(b)) => Some(Num::Real(a + b)),
            _ => None,
        }
    }

    fn mul(self, other: Num) -> Option<Num> {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => Some(Num::Int(a * b)),
            (Num::Real(a), Num::Real(b)) => Some(Num::Real(a * b)),
            _ => None,
        }
    }

    fn sub(self, other: Num) -> Option<Num> {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => Some(Num::Int(a - b)),
            (Num::Real(a), Num::Real(b)) => Some(Num::Real(a - b)),
            _ => None,
        }
    }

    fn neg(self) -> Num {
        match self {
            Num::Int(v) => Num::Int(-v),
            Num::Real(v) => Num::Real(-v),
        }
    }

    fn cmp(&self, other: &Num) -> Option<Ordering> {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => Some(a.cmp(b)),
            (Num::Real(a), Num::Real(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    fn build(self, tm: &mut TermManager) -> TermId {
        match self {
            Num::Int(v) => tm.mk_int(v),
            Num::Real(v) => tm.mk_real(v),
        }
    }
}

fn num(tm: &TermManager, t: TermId) -> Option<Num> {
    match tm.get(t).map(|t| &t.kind) {
        Some(TermKind::IntConst(v)) => Some(Num::Int(v.clone())),
        Some(TermKind::RealConst(v)) => Some(Num::Real(v.clone())),
        _ => None,
    }
}

fn zero_of_sort(tm: &mut TermManager, t: TermId) -> TermId {
    let is_real = matches!(
        tm.get(t)
            .and_then(|term| tm.sorts.get(term.sort))
            .map(|s| &s.kind),
        Some(SortKind::Real)
    );
    if is_real {
        tm.mk_real(BigRational::zero())
    } else {
        tm.mk_int(BigInt::zero())
    }
}

/// Constant folding, flattening, and unit laws over linear arithmetic.
pub struct ArithPlugin;

impl ArithPlugin {
    fn reduce_add(tm: &mut TermManager, args: &[TermId]) -> Option<TermId> {
        let mut rest = Vec::with_capacity(args.len());
        let mut acc: Option<Num> = None;
        let mut changed = false;
        for &a in args {
            match tm.get(a).map(|t| t.kind.clone()) {
                Some(TermKind::Add(inner)) => {
                    changed = true;
                    for i in inner {
                        match num(tm, i) {
                            Some(n) => {
                                acc = Some(match acc {
                                    Some(prev) => prev.add(n)?,
                                    None => n,
                                });
                            }
                            None => rest.push(i),
                        }
                    }
                }
                _ => match num(tm, a) {
                    Some(n) => {
                        if acc.is_some() {
                            changed = true;
                        }
                        acc = Some(match acc {
                            Some(prev) => prev.add(n)?,
                            None => n,
                        });
                    }
                    None => rest.push(a),
                },
            }
        }
        let drop_zero = acc.as_ref().is_some_and(Num::is_zero) && !rest.is_empty();
        if drop_zero {
            changed = true;
            acc = None;
        }
        let mut out = rest;
        if let Some(n) = acc {
            // numeral canonically last
            let numeral = n.build(tm);
            if out.is_empty() {
                return Some(numeral);
            }
            if args.last() != Some(&numeral) || out.len() + 1 != args.len() {
                changed = true;
            }
            out.push(numeral);
        }
        if !changed && out.as_slice() == args {
            return None;
        }
        Some(tm.mk_add(out))
    }

    fn reduce_mul(tm: &mut TermManager, args: &[TermId]) -> Option<TermId> {
        let mut rest = Vec::with_capacity(args.len());
        let mut acc: Option<Num> = None;
        let mut changed = false;
        for &a in args {
            match tm.get(a).map(|t| t.kind.clone()) {
                Some(TermKind::Mul(inner)) => {
                    changed = true;
                    for i in inner {
                        match num(tm, i) {
                            Some(n) => {
                                acc = Some(match acc {
                                    Some(prev) => prev.mul(n)?,
                                    None => n,
                                });
                            }
                            None => rest.push(i),
                        }
                    }
                }
                _ => match num(tm, a) {
                    Some(n) => {
                        if acc.is_some() {
                            changed = true;
                        }
                        acc = Some(match acc {
                            Some(prev) => prev.mul(n)?,
                            None => n,
                        });
                    }
                    None => rest.push(a),
                },
            }
        }
        if acc.as_ref().is_some_and(Num::is_zero) {
            if let Some(n) = acc.take() {
                return Some(n.build(tm));
            }
        }
        if acc.as_ref().is_some_and(Num::is_one) && !rest.is_empty() {
            changed = true;
            acc = None;
        }
        let mut out = Vec::with_capacity(rest.len() + 1);
        if let Some(n) = acc {
            // coefficient canonically first
            let numeral = n.build(tm);
            if rest.is_empty() {
                return Some(numeral);
            }
            if args.first() != Some(&numeral) || rest.len() + 1 != args.len() {
                changed = true;
            }
            out.push(numeral);
        }
        out.extend(rest);
        if !changed && out.as_slice() == args {
            return None;
        }
        Some(tm.mk_mul(out))
    }

    fn reduce_relation(
        tm: &mut TermManager,
        lhs: TermId,
        rhs: TermId,
        on_eq: bool,
        on_lt: bool,
        on_gt: bool,
    ) -> Option<TermId> {
        if lhs == rhs {
            return Some(tm.mk_bool(on_eq));
        }
        let (a, b) = (num(tm, lhs)?, num(tm, rhs)?);
        let result = match a.cmp(&b)? {
            Ordering::Less => on_lt,
            Ordering::Equal => on_eq,
            Ordering::Greater => on_gt,
        };
        Some(tm.mk_bool(result))
    }
}

impl SimplifierPlugin for ArithPlugin {
    fn name(&self) -> &'static str {
        "arith"
    }

    fn cheap(&self) -> bool {
        true
    }

    fn reduce(&self, tm: &mut TermManager, t: TermId, _ctx: &SimplifyCtx) -> Option<TermId> {
        let kind = tm.get(t)?.kind.clone();
        match kind {
            TermKind::Add(args) => Self::reduce_add(tm, &args),
            TermKind::Mul(args) => Self::reduce_mul(tm, &args),
            TermKind::Sub(a, b) => {
                if a == b {
                    return Some(zero_of_sort(tm, a));
                }
                if let Some(n) = num(tm, b) {
                    if n.is_zero() {
                        return Some(a);
                    }
                }
                let (x, y) = (num(tm, a)?, num(tm, b)?);
                Some(x.sub(y)?.build(tm))
            }
            TermKind::Neg(a) => {
                if let Some(inner) = match tm.get(a).map(|t| &t.kind) {
                    Some(&TermKind::Neg(inner)) => Some(inner),
                    _ => None,
                } {
                    return Some(inner);
                }
                Some(num(tm, a)?.neg().build(tm))
            }
            TermKind::Div(a, b) => {
                if let Some(n) = num(tm, b) {
                    if n.is_one() {
                        return Some(a);
                    }
                }
                match (num(tm, a)?, num(tm, b)?) {
                    (Num::Real(x), Num::Real(y)) if !y.is_zero() => {
                        Some(tm.mk_real(x / y))
                    }
                    (Num::Int(x), Num::Int(y)) if y.is_positive() => {
                        Some(tm.mk_int(x.div_floor(&y)))
                    }
                    _ => None,
                }
            }
            TermKind::Mod(a, b) => {
                if let Some(Num::Int(n)) = num(tm, b) {
                    if n.is_one() {
                        return Some(tm.mk_int(BigInt::zero()));
                    }
                    if let Some(Num::Int(x)) = num(tm, a) {
                        if n.is_positive() {
                            return Some(tm.mk_int(x.mod_floor(&n)));
                        }
                    }
                }
                None
            }
            TermKind::Le(a, b) => Self::reduce_relation(tm, a, b, true, true, false),
            TermKind::Lt(a, b) => Self::reduce_relation(tm, a, b, false, true, false),
            TermKind::Ge(a, b) => Self::reduce_relation(tm, a, b, true, false, true),
            TermKind::Gt(a, b) => Self::reduce_relation(tm, a, b, false, false, true),
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
        ArithPlugin.reduce(tm, t, &ctx).unwrap_or(t)
    }

    #[test]
    fn test_add_folding() {
        let mut tm = TermManager::new();
        let one = tm.mk_int(BigInt::from(1));
        let two = tm.mk_int(BigInt::from(2));
        let sum = tm.mk_add(vec![one, two]);
        let three = tm.mk_int(BigInt::from(3));
        assert_eq!(simplify(&mut tm, sum), three);
    }

    #[test]
    fn test_add_collects_numerals_last() {
        let mut tm = TermManager::new();
        let x = tm.mk_var("x", tm.sorts.int_sort);
        let one = tm.mk_int(BigInt::from(1));
        let two = tm.mk_int(BigInt::from(2));
        let sum = tm.mk_add(vec![one, x, two]);
        let three = tm.mk_int(BigInt::from(3));
        let expected = tm.mk_add(vec![x, three]);
        assert_eq!(simplify(&mut tm, sum), expected);
    }

    #[test]
    fn test_add_drops_zero() {
        let mut tm = TermManager::new();
        let x = tm.mk_var("x", tm.sorts.int_sort);
        let y = tm.mk_var("y", tm.sorts.int_sort);
        let zero = tm.mk_int(BigInt::zero());
        let sum = tm.mk_add(vec![x, zero, y]);
        let expected = tm.mk_add(vec![x, y]);
        assert_eq!(simplify(&mut tm, sum), expected);
    }

    #[test]
    fn test_mul_zero_annihilates() {
        let mut tm = TermManager::new();
        let x = tm.mk_var("x", tm.sorts.int_sort);
        let zero = tm.mk_int(BigInt::zero());
        let mul = tm.mk_mul(vec![x, zero]);
        assert_eq!(simplify(&mut tm, mul), zero);
    }

    #[test]
    fn test_sub_self_is_zero() {
        let mut tm = TermManager::new();
        let x = tm.mk_var("x", tm.sorts.int_sort);
        let sub = tm.mk_sub(x, x);
        let zero = tm.mk_int(BigInt::zero());
        assert_eq!(simplify(&mut tm, sub), zero);
    }

    #[test]
    fn test_relations_on_numerals() {
        let mut tm = TermManager::new();
        let three = tm.mk_int(BigInt::from(3));
        let zero = tm.mk_int(BigInt::zero());
        let gt = tm.mk_gt(three, zero);
        let gt_simplified = simplify(&mut tm, gt);
        assert!(tm.is_true(gt_simplified));
        let lt = tm.mk_lt(three, zero);
        let lt_simplified = simplify(&mut tm, lt);
        assert!(tm.is_false(lt_simplified));
        let x = tm.mk_var("x", tm.sorts.int_sort);
        let le = tm.mk_le(x, x);
        let le_simplified = simplify(&mut tm, le);
        assert!(tm.is_true(le_simplified));
    }

    #[test]
    fn test_euclidean_div_mod() {
        let mut tm = TermManager::new();
        let seven = tm.mk_int(BigInt::from(7));
        let two = tm.mk_int(BigInt::from(2));
        let div = tm.mk_div(seven, two);
        let three = tm.mk_int(BigInt::from(3));
        assert_eq!(simplify(&mut tm, div), three);
        let md = tm.mk_mod(seven, two);
        let one = tm.mk_int(BigInt::from(1));
        assert_eq!(simplify(&mut tm, md), one);
    }
}
