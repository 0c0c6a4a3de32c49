//! Bit-vector simplification rules.
//!
//! All numeral arithmetic is carried out modulo `2^width`; numerals are
//! canonical in `[0, 2^width)` by construction.

use num_bigint::BigInt;
use num_traits::{One, ToPrimitive, Zero};
use silica_core::ast::{TermId, TermKind, TermManager};

use crate::simplify::{SimplifierPlugin, SimplifyCtx};

/// Constant folding and unit laws over fixed-width bit-vectors.
pub struct BvPlugin;

fn bv_val(tm: &TermManager, t: TermId) -> Option<(BigInt, u32)> {
    match tm.get(t).map(|t| &t.kind) {
        Some(TermKind::BitVecConst { value, width }) => Some((value.clone(), *width)),
        _ => None,
    }
}

fn is_bv_zero(tm: &TermManager, t: TermId) -> bool {
    bv_val(tm, t).is_some_and(|(v, _)| v.is_zero())
}

fn is_bv_one(tm: &TermManager, t: TermId) -> bool {
    bv_val(tm, t).is_some_and(|(v, _)| v.is_one())
}

fn is_bv_all_ones(tm: &TermManager, t: TermId) -> bool {
    bv_val(tm, t).is_some_and(|(v, w)| v == (BigInt::one() << w) - 1)
}

impl SimplifierPlugin for BvPlugin {
    fn name(&self) -> &'static str {
        "bv"
    }

    fn cheap(&self) -> bool {
        true
    }

    fn reduce(&self, tm: &mut TermManager, t: TermId, _ctx: &SimplifyCtx) -> Option<TermId> {
        let kind = tm.get(t)?.kind.clone();
        match kind {
            TermKind::BvAdd(a, b) => {
                if is_bv_zero(tm, a) {
                    return Some(b);
                }
                if is_bv_zero(tm, b) {
                    return Some(a);
                }
                let ((va, w), (vb, _)) = (bv_val(tm, a)?, bv_val(tm, b)?);
                Some(tm.mk_bv(va + vb, w))
            }
            TermKind::BvMul(a, b) => {
                if is_bv_zero(tm, a) {
                    return Some(a);
                }
                if is_bv_zero(tm, b) {
                    return Some(b);
                }
                if is_bv_one(tm, a) {
                    return Some(b);
                }
                if is_bv_one(tm, b) {
                    return Some(a);
                }
                let ((va, w), (vb, _)) = (bv_val(tm, a)?, bv_val(tm, b)?);
                Some(tm.mk_bv(va * vb, w))
            }
            TermKind::BvAnd(a, b) => {
                if a == b {
                    return Some(a);
                }
                if is_bv_zero(tm, a) {
                    return Some(a);
                }
                if is_bv_zero(tm, b) {
                    return Some(b);
                }
                if is_bv_all_ones(tm, a) {
                    return Some(b);
                }
                if is_bv_all_ones(tm, b) {
                    return Some(a);
                }
                let ((va, w), (vb, _)) = (bv_val(tm, a)?, bv_val(tm, b)?);
                Some(tm.mk_bv(va & vb, w))
            }
            TermKind::BvOr(a, b) => {
                if a == b {
                    return Some(a);
                }
                if is_bv_zero(tm, a) {
                    return Some(b);
                }
                if is_bv_zero(tm, b) {
                    return Some(a);
                }
                if is_bv_all_ones(tm, a) {
                    return Some(a);
                }
                if is_bv_all_ones(tm, b) {
                    return Some(b);
                }
                let ((va, w), (vb, _)) = (bv_val(tm, a)?, bv_val(tm, b)?);
                Some(tm.mk_bv(va | vb, w))
            }
            TermKind::BvXor(a, b) => {
                if a == b {
                    let w = tm.bv_width(a)?;
                    return Some(tm.mk_bv(BigInt::zero(), w));
                }
                if is_bv_zero(tm, a) {
                    return Some(b);
                }
                if is_bv_zero(tm, b) {
                    return Some(a);
                }
                let ((va, w), (vb, _)) = (bv_val(tm, a)?, bv_val(tm, b)?);
                Some(tm.mk_bv(va ^ vb, w))
            }
            TermKind::BvNot(a) => {
                if let Some(TermKind::BvNot(inner)) = tm.get(a).map(|t| t.kind.clone()) {
                    return Some(inner);
                }
                let (v, w) = bv_val(tm, a)?;
                Some(tm.mk_bv((BigInt::one() << w) - 1 - v, w))
            }
            TermKind::BvNeg(a) => {
                if let Some(TermKind::BvNeg(inner)) = tm.get(a).map(|t| t.kind.clone()) {
                    return Some(inner);
                }
                let (v, w) = bv_val(tm, a)?;
                Some(tm.mk_bv(-v, w))
            }
            TermKind::BvConcat(a, b) => {
                let ((va, wa), (vb, wb)) = (bv_val(tm, a)?, bv_val(tm, b)?);
                Some(tm.mk_bv((va << wb) | vb, wa + wb))
            }
            TermKind::BvExtract { hi, lo, arg } => {
                let (v, w) = bv_val(tm, arg)?;
                if hi >= w || lo > hi {
                    return None;
                }
                Some(tm.mk_bv(v >> lo, hi - lo + 1))
            }
            TermKind::BvShl(a, b) => {
                if is_bv_zero(tm, b) {
                    return Some(a);
                }
                let ((va, w), (vb, _)) = (bv_val(tm, a)?, bv_val(tm, b)?);
                match vb.to_u32() {
                    Some(shift) if shift < w => Some(tm.mk_bv(va << shift, w)),
                    _ => Some(tm.mk_bv(BigInt::zero(), w)),
                }
            }
            TermKind::BvLshr(a, b) => {
                if is_bv_zero(tm, b) {
                    return Some(a);
                }
                let ((va, w), (vb, _)) = (bv_val(tm, a)?, bv_val(tm, b)?);
                match vb.to_u32() {
                    Some(shift) if shift < w => Some(tm.mk_bv(va >> shift, w)),
                    _ => Some(tm.mk_bv(BigInt::zero(), w)),
                }
            }
            TermKind::BvUlt(a, b) => {
                if a == b {
                    return Some(tm.mk_false());
                }
                let ((va, _), (vb, _)) = (bv_val(tm, a)?, bv_val(tm, b)?);
                Some(tm.mk_bool(va < vb))
            }
            TermKind::BvUle(a, b) => {
                if a == b {
                    return Some(tm.mk_true());
                }
                let ((va, _), (vb, _)) = (bv_val(tm, a)?, bv_val(tm, b)?);
                Some(tm.mk_bool(va <= vb))
            }
            TermKind::Bv2Int(a) => {
                let (v, _) = bv_val(tm, a)?;
                Some(tm.mk_int(v))
            }
            TermKind::Int2Bv { width, arg } => {
                let TermKind::IntConst(v) = tm.get(arg)?.kind.clone() else {
                    return None;
                };
                Some(tm.mk_bv(v, width))
            }
            _ => None,
        }
    }
}
