//! Floating-point structural simplification rules.

use silica_core::ast::{TermId, TermKind, TermManager};

use crate::simplify::{SimplifierPlugin, SimplifyCtx};

/// Sign-structure identities over floating-point terms.
pub struct FpPlugin;

impl SimplifierPlugin for FpPlugin {
    fn name(&self) -> &'static str {
        "fp"
    }

    fn reduce(&self, tm: &mut TermManager, t: TermId, _ctx: &SimplifyCtx) -> Option<TermId> {
        let kind = tm.get(t)?.kind.clone();
        match kind {
            TermKind::FpNeg(a) => match tm.get(a)?.kind.clone() {
                TermKind::FpNeg(inner) => Some(inner),
                _ => None,
            },
            TermKind::FpAbs(a) => match tm.get(a)?.kind.clone() {
                TermKind::FpAbs(_) => Some(a),
                TermKind::FpNeg(inner) => Some(tm.mk_fp_abs(inner)),
                _ => None,
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_negation() {
        let mut tm = TermManager::new();
        let fp = tm.sorts.intern(silica_core::sort::SortKind::FloatingPoint(8, 24));
        let x = tm.mk_var("x", fp);
        let neg = tm.mk_fp_neg(x);
        let negneg = tm.mk_fp_neg(neg);
        let ctx = SimplifyCtx {
            eliminate_and: false,
            presimp: false,
        };
        assert_eq!(FpPlugin.reduce(&mut tm, negneg, &ctx), Some(x));
    }

    #[test]
    fn test_abs_of_neg() {
        let mut tm = TermManager::new();
        let fp = tm.sorts.intern(silica_core::sort::SortKind::FloatingPoint(8, 24));
        let x = tm.mk_var("x", fp);
        let neg = tm.mk_fp_neg(x);
        let abs = tm.mk_fp_abs(neg);
        let ctx = SimplifyCtx {
            eliminate_and: false,
            presimp: false,
        };
        let expected = tm.mk_fp_abs(x);
        assert_eq!(FpPlugin.reduce(&mut tm, abs, &ctx), Some(expected));
    }
}
