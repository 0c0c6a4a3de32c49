//! Negation normal form conversion.
//!
//! Negations are pushed down to literals; implications, exclusive-ors, and
//! Boolean equalities are expanded; quantifiers flip under negation.
//! Boolean if-then-else terms with non-literal branches are named away: a
//! fresh constant from the defined-names table replaces the term and its
//! defining formulas are emitted as side formulas.

use silica_core::ast::{TermId, TermKind, TermManager};
use silica_core::proof::ProofId;

use crate::defined_names::DefinedNames;

/// NNF engine. Borrows the shared defined-names table for the duration of
/// one pass.
pub struct Nnf<'a> {
    defined_names: &'a mut DefinedNames,
    side_formulas: Vec<(TermId, Option<ProofId>)>,
}

impl<'a> Nnf<'a> {
    /// Create an engine over the shared defined-names table.
    pub fn new(defined_names: &'a mut DefinedNames) -> Self {
        Self {
            defined_names,
            side_formulas: Vec::new(),
        }
    }

    /// Convert `e` to NNF. Returns the primary result plus any side
    /// formulas defining names introduced along the way.
    pub fn convert(
        &mut self,
        tm: &mut TermManager,
        e: TermId,
    ) -> (TermId, Vec<(TermId, Option<ProofId>)>) {
        let result = self.nnf(tm, e, true);
        (result, std::mem::take(&mut self.side_formulas))
    }

    fn is_bool(tm: &TermManager, t: TermId) -> bool {
        tm.get(t)
            .and_then(|term| tm.sorts.get(term.sort))
            .is_some_and(|s| s.is_bool())
    }

    fn is_literal(tm: &TermManager, t: TermId) -> bool {
        let inner = tm.as_not(t).unwrap_or(t);
        !matches!(
            tm.get(inner).map(|term| &term.kind),
            Some(
                TermKind::And(_)
                    | TermKind::Or(_)
                    | TermKind::Implies(..)
                    | TermKind::Xor(..)
                    | TermKind::Ite(..)
                    | TermKind::Forall { .. }
                    | TermKind::Exists { .. }
            )
        )
    }

    fn nnf(&mut self, tm: &mut TermManager, e: TermId, positive: bool) -> TermId {
        let Some(term) = tm.get(e).map(|t| t.kind.clone()) else {
            return e;
        };
        match term {
            TermKind::Not(a) => self.nnf(tm, a, !positive),
            TermKind::And(args) => {
                let converted: Vec<TermId> =
                    args.iter().map(|&a| self.nnf(tm, a, positive)).collect();
                if positive {
                    tm.mk_and(converted)
                } else {
                    tm.mk_or(converted)
                }
            }
            TermKind::Or(args) => {
                let converted: Vec<TermId> =
                    args.iter().map(|&a| self.nnf(tm, a, positive)).collect();
                if positive {
                    tm.mk_or(converted)
                } else {
                    tm.mk_and(converted)
                }
            }
            TermKind::Implies(a, b) => {
                if positive {
                    let na = self.nnf(tm, a, false);
                    let pb = self.nnf(tm, b, true);
                    tm.mk_or(vec![na, pb])
                } else {
                    let pa = self.nnf(tm, a, true);
                    let nb = self.nnf(tm, b, false);
                    tm.mk_and(vec![pa, nb])
                }
            }
            TermKind::Xor(a, b) => self.expand_biconditional(tm, a, b, !positive),
            TermKind::Eq(a, b) if Self::is_bool(tm, a) && !tm.is_value(a) && !tm.is_value(b) => {
                self.expand_biconditional(tm, a, b, positive)
            }
            TermKind::Ite(c, t, els) if Self::is_bool(tm, t) => {
                self.convert_bool_ite(tm, e, c, t, els, positive)
            }
            TermKind::Forall { vars, patterns, body } => {
                if positive {
                    let converted = self.nnf(tm, body, true);
                    tm.mk_forall(vars, patterns, converted)
                } else {
                    let converted = self.nnf(tm, body, false);
                    tm.mk_exists(vars, Vec::new(), converted)
                }
            }
            TermKind::Exists { vars, patterns, body } => {
                if positive {
                    let converted = self.nnf(tm, body, true);
                    tm.mk_exists(vars, patterns, converted)
                } else {
                    let converted = self.nnf(tm, body, false);
                    tm.mk_forall(vars, Vec::new(), converted)
                }
            }
            _ => {
                // atom
                if positive {
                    e
                } else {
                    tm.mk_not(e)
                }
            }
        }
    }

    /// `a <-> b` when `positive`, `a xor b` otherwise, as a conjunction of
    /// two NNF clauses.
    fn expand_biconditional(
        &mut self,
        tm: &mut TermManager,
        a: TermId,
        b: TermId,
        positive: bool,
    ) -> TermId {
        let pa = self.nnf(tm, a, true);
        let na = self.nnf(tm, a, false);
        let pb = self.nnf(tm, b, true);
        let nb = self.nnf(tm, b, false);
        if positive {
            // (-a | b) & (a | -b)
            let c1 = tm.mk_or(vec![na, pb]);
            let c2 = tm.mk_or(vec![pa, nb]);
            tm.mk_and(vec![c1, c2])
        } else {
            // (a | b) & (-a | -b)
            let c1 = tm.mk_or(vec![pa, pb]);
            let c2 = tm.mk_or(vec![na, nb]);
            tm.mk_and(vec![c1, c2])
        }
    }

    fn convert_bool_ite(
        &mut self,
        tm: &mut TermManager,
        ite: TermId,
        c: TermId,
        t: TermId,
        els: TermId,
        positive: bool,
    ) -> TermId {
        if Self::is_literal(tm, t) && Self::is_literal(tm, els) {
            // inline: (c -> t) & (-c -> e); under negation the branches
            // flip polarity while the guard structure stays
            let pc = self.nnf(tm, c, true);
            let nc = self.nnf(tm, c, false);
            let pt = self.nnf(tm, t, positive);
            let pe = self.nnf(tm, els, positive);
            let c1 = tm.mk_or(vec![nc, pt]);
            let c2 = tm.mk_or(vec![pc, pe]);
            tm.mk_and(vec![c1, c2])
        } else {
            let (name, fresh) = self.defined_names.mk_name(tm, ite);
            if fresh {
                // (-c | (name <-> t)) and (c | (name <-> e))
                let nc = self.nnf(tm, c, false);
                let pc = self.nnf(tm, c, true);
                let eq_t = tm.mk_eq(name, t);
                let eq_e = tm.mk_eq(name, els);
                let d1 = tm.mk_or(vec![nc, eq_t]);
                let d2 = tm.mk_or(vec![pc, eq_e]);
                for def in [d1, d2] {
                    let converted = self.nnf(tm, def, true);
                    let pr = tm.mk_def_intro(converted);
                    self.side_formulas.push((converted, pr));
                }
            }
            if positive {
                name
            } else {
                tm.mk_not(name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negation_pushed_to_literals() {
        let mut tm = TermManager::new();
        let mut dn = DefinedNames::new();
        let p = tm.mk_var("p", tm.sorts.bool_sort);
        let q = tm.mk_var("q", tm.sorts.bool_sort);
        let and = tm.mk_and(vec![p, q]);
        let neg = tm.mk_not(and);
        let mut nnf = Nnf::new(&mut dn);
        let (result, aux) = nnf.convert(&mut tm, neg);
        let not_p = tm.mk_not(p);
        let not_q = tm.mk_not(q);
        let expected = tm.mk_or(vec![not_p, not_q]);
        assert_eq!(result, expected);
        assert!(aux.is_empty());
    }

    #[test]
    fn test_implication_expansion() {
        let mut tm = TermManager::new();
        let mut dn = DefinedNames::new();
        let p = tm.mk_var("p", tm.sorts.bool_sort);
        let q = tm.mk_var("q", tm.sorts.bool_sort);
        let imp = tm.mk_implies(p, q);
        let mut nnf = Nnf::new(&mut dn);
        let (result, _) = nnf.convert(&mut tm, imp);
        let not_p = tm.mk_not(p);
        let expected = tm.mk_or(vec![not_p, q]);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_negated_forall_flips() {
        let mut tm = TermManager::new();
        let mut dn = DefinedNames::new();
        let int = tm.sorts.int_sort;
        let x_sym = tm.intern("x");
        let x = tm.mk_var("x", int);
        let zero = tm.mk_int(num_bigint::BigInt::from(0));
        let gt = tm.mk_gt(x, zero);
        let q = tm.mk_forall(vec![(x_sym, int)], vec![], gt);
        let neg = tm.mk_not(q);
        let mut nnf = Nnf::new(&mut dn);
        let (result, _) = nnf.convert(&mut tm, neg);
        let not_gt = tm.mk_not(gt);
        let expected = tm.mk_exists(vec![(x_sym, int)], vec![], not_gt);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_bool_ite_with_compound_branches_is_named() {
        let mut tm = TermManager::new();
        let mut dn = DefinedNames::new();
        let c = tm.mk_var("c", tm.sorts.bool_sort);
        let p = tm.mk_var("p", tm.sorts.bool_sort);
        let q = tm.mk_var("q", tm.sorts.bool_sort);
        let r = tm.mk_var("r", tm.sorts.bool_sort);
        let and_pq = tm.mk_and(vec![p, q]);
        let ite = tm.mk_ite(c, and_pq, r);
        let mut nnf = Nnf::new(&mut dn);
        let (result, aux) = nnf.convert(&mut tm, ite);
        // the ite is replaced by an introduced name with two definitions
        assert_eq!(aux.len(), 2);
        assert!(!dn.is_empty());
        assert!(matches!(
            tm.get(result).map(|t| &t.kind),
            Some(TermKind::Var(_))
        ));
    }
}
