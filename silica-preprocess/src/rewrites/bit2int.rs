//! Simplify bit-vector/integer conversion chains.
//!
//! `bv2int` is pushed through additive and multiplicative bit-vector
//! structure so that integer reasoning applies: `(bv2int ((_ int2bv w) x))`
//! becomes `(mod x 2^w)`, and `bv2int` of a sum or product distributes
//! modulo `2^w`.

use num_bigint::BigInt;
use num_traits::One;
use rustc_hash::FxHashMap;
use silica_core::ast::{TermId, TermKind, TermManager};

/// Conversion-chain simplifier.
#[derive(Debug, Default)]
pub struct Bit2Int {
    cache: FxHashMap<TermId, TermId>,
}

impl Bit2Int {
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
            Some(TermKind::Bv2Int(arg)) => self.lower(tm, arg).unwrap_or(rebuilt),
            _ => rebuilt,
        };
        self.cache.insert(e, result);
        result
    }

    /// Lower `bv2int(arg)` to an integer term when the structure allows.
    fn lower(&mut self, tm: &mut TermManager, arg: TermId) -> Option<TermId> {
        let width = tm.bv_width(arg)?;
        match tm.get(arg)?.kind.clone() {
            TermKind::BitVecConst { value, .. } => Some(tm.mk_int(value)),
            TermKind::Int2Bv { arg: inner, .. } => Some(Self::wrap(tm, inner, width)),
            TermKind::BvAdd(a, b) => {
                let ia = self.lower_operand(tm, a);
                let ib = self.lower_operand(tm, b);
                let sum = tm.mk_add(vec![ia, ib]);
                Some(Self::wrap(tm, sum, width))
            }
            TermKind::BvMul(a, b) => {
                let ia = self.lower_operand(tm, a);
                let ib = self.lower_operand(tm, b);
                let product = tm.mk_mul(vec![ia, ib]);
                Some(Self::wrap(tm, product, width))
            }
            _ => None,
        }
    }

    fn lower_operand(&mut self, tm: &mut TermManager, arg: TermId) -> TermId {
        let converted = tm.mk_bv2int(arg);
        self.apply(tm, converted)
    }

    fn wrap(tm: &mut TermManager, t: TermId, width: u32) -> TermId {
        let modulus = tm.mk_int(BigInt::one() << width);
        tm.mk_mod(t, modulus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_becomes_mod() {
        let mut tm = TermManager::new();
        let mut functor = Bit2Int::new();
        let x = tm.mk_var("x", tm.sorts.int_sort);
        let as_bv = tm.mk_int2bv(8, x);
        let back = tm.mk_bv2int(as_bv);

        let result = functor.apply(&mut tm, back);
        let modulus = tm.mk_int(BigInt::from(256));
        let expected = tm.mk_mod(x, modulus);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_distributes_over_bvadd() {
        let mut tm = TermManager::new();
        let mut functor = Bit2Int::new();
        let bv8 = tm.sorts.bitvec(8);
        let a = tm.mk_var("a", bv8);
        let b = tm.mk_var("b", bv8);
        let add = tm.mk_bv_add(a, b);
        let conv = tm.mk_bv2int(add);

        let result = functor.apply(&mut tm, conv);
        let ia = tm.mk_bv2int(a);
        let ib = tm.mk_bv2int(b);
        let sum = tm.mk_add(vec![ia, ib]);
        let modulus = tm.mk_int(BigInt::from(256));
        let expected = tm.mk_mod(sum, modulus);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_opaque_operand_untouched() {
        let mut tm = TermManager::new();
        let mut functor = Bit2Int::new();
        let bv8 = tm.sorts.bitvec(8);
        let a = tm.mk_var("a", bv8);
        let conv = tm.mk_bv2int(a);
        assert_eq!(functor.apply(&mut tm, conv), conv);
    }
}
