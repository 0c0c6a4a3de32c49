//! Property-based tests for assertion store invariants.
//!
//! Covers scope discipline (pop restores the pre-push state), pipeline
//! idempotence, and inconsistency stickiness over randomly generated
//! assertion batches.

use num_bigint::BigInt;
use proptest::prelude::*;
use silica_core::ast::{TermId, TermManager};
use silica_core::config::PreprocessParams;
use silica_core::resource::CancelFlag;
use silica_preprocess::AssertedFormulas;

/// A recipe for one small assertion over a fixed variable pool.
#[derive(Debug, Clone, Copy)]
enum FormulaSpec {
    /// `v[i] = n`
    EqConst(u8, i8),
    /// `v[i] > n`
    GtConst(u8, i8),
    /// `v[i] = v[j]`
    EqVar(u8, u8),
    /// `v[i] > n or v[j] > m`
    OrGt(u8, i8, u8, i8),
}

fn formula_spec() -> impl Strategy<Value = FormulaSpec> {
    prop_oneof![
        (0u8..4, -5i8..5).prop_map(|(i, n)| FormulaSpec::EqConst(i, n)),
        (0u8..4, -5i8..5).prop_map(|(i, n)| FormulaSpec::GtConst(i, n)),
        (0u8..4, 0u8..4).prop_map(|(i, j)| FormulaSpec::EqVar(i, j)),
        (0u8..4, -5i8..5, 0u8..4, -5i8..5)
            .prop_map(|(i, n, j, m)| FormulaSpec::OrGt(i, n, j, m)),
    ]
}

fn build(tm: &mut TermManager, spec: FormulaSpec) -> TermId {
    let int = tm.sorts.int_sort;
    let var = |tm: &mut TermManager, i: u8| tm.mk_var(&format!("v{}", i % 4), int);
    match spec {
        FormulaSpec::EqConst(i, n) => {
            let v = var(tm, i);
            let c = tm.mk_int(BigInt::from(n));
            tm.mk_eq(v, c)
        }
        FormulaSpec::GtConst(i, n) => {
            let v = var(tm, i);
            let c = tm.mk_int(BigInt::from(n));
            tm.mk_gt(v, c)
        }
        FormulaSpec::EqVar(i, j) => {
            let a = var(tm, i);
            let b = var(tm, j);
            tm.mk_eq(a, b)
        }
        FormulaSpec::OrGt(i, n, j, m) => {
            let a = var(tm, i);
            let ca = tm.mk_int(BigInt::from(n));
            let b = var(tm, j);
            let cb = tm.mk_int(BigInt::from(m));
            let ga = tm.mk_gt(a, ca);
            let gb = tm.mk_gt(b, cb);
            tm.mk_or(vec![ga, gb])
        }
    }
}

fn fresh_store() -> AssertedFormulas {
    AssertedFormulas::new(PreprocessParams::default(), CancelFlag::new())
}

mod scope_properties {
    use super::*;

    proptest! {
        /// After pop_scope the store is identical to the state right
        /// before the matching push_scope.
        #[test]
        fn push_pop_restores_store(
            base in proptest::collection::vec(formula_spec(), 0..6),
            inner in proptest::collection::vec(formula_spec(), 1..6),
        ) {
            let mut tm = TermManager::new();
            let mut af = fresh_store();
            for spec in base {
                let f = build(&mut tm, spec);
                af.assert_expr(f, &mut tm);
            }
            af.reduce(&mut tm);
            af.commit(&mut tm);

            let formulas_before = af.get_assertions().to_vec();
            let qhead_before = af.qhead();
            let inconsistent_before = af.inconsistent();

            af.push_scope(&mut tm);
            for spec in inner {
                let f = build(&mut tm, spec);
                af.assert_expr(f, &mut tm);
            }
            af.reduce(&mut tm);
            af.commit(&mut tm);
            af.pop_scope(1, &tm).unwrap();

            prop_assert_eq!(af.get_assertions(), formulas_before.as_slice());
            prop_assert_eq!(af.qhead(), qhead_before);
            prop_assert_eq!(af.inconsistent(), inconsistent_before);
        }

        /// Nested scopes unwind level by level.
        #[test]
        fn nested_scopes_unwind(
            batches in proptest::collection::vec(
                proptest::collection::vec(formula_spec(), 0..4),
                1..4,
            ),
        ) {
            let mut tm = TermManager::new();
            let mut af = fresh_store();
            let mut snapshots = Vec::new();
            for batch in &batches {
                af.reduce(&mut tm);
                af.commit(&mut tm);
                snapshots.push((af.get_assertions().to_vec(), af.inconsistent()));
                af.push_scope(&mut tm);
                for &spec in batch {
                    let f = build(&mut tm, spec);
                    af.assert_expr(f, &mut tm);
                }
            }
            for (formulas, inconsistent) in snapshots.into_iter().rev() {
                af.pop_scope(1, &tm).unwrap();
                prop_assert_eq!(af.get_assertions(), formulas.as_slice());
                prop_assert_eq!(af.inconsistent(), inconsistent);
            }
        }
    }
}

mod pipeline_properties {
    use super::*;

    proptest! {
        /// A second reduce with no intervening assertions changes nothing.
        #[test]
        fn reduce_is_idempotent(
            specs in proptest::collection::vec(formula_spec(), 1..8),
        ) {
            let mut tm = TermManager::new();
            let mut af = fresh_store();
            for spec in specs {
                let f = build(&mut tm, spec);
                af.assert_expr(f, &mut tm);
            }
            af.reduce(&mut tm);
            let first = af.get_assertions().to_vec();
            let inconsistent_first = af.inconsistent();
            af.reduce(&mut tm);
            prop_assert_eq!(af.get_assertions(), first.as_slice());
            prop_assert_eq!(af.inconsistent(), inconsistent_first);
        }

        /// Once inconsistent, a store stays inconsistent under further
        /// asserts and reduces within the same scope.
        #[test]
        fn inconsistency_is_sticky(
            specs in proptest::collection::vec(formula_spec(), 0..6),
        ) {
            let mut tm = TermManager::new();
            let mut af = fresh_store();
            let f = tm.mk_false();
            af.assert_expr(f, &mut tm);
            prop_assert!(af.inconsistent());
            for spec in specs {
                let f = build(&mut tm, spec);
                af.assert_expr(f, &mut tm);
                prop_assert!(af.inconsistent());
            }
            af.reduce(&mut tm);
            prop_assert!(af.inconsistent());
        }

        /// The store never ends up with a committed head past its size,
        /// whatever the interleaving.
        #[test]
        fn qhead_stays_in_bounds(
            specs in proptest::collection::vec(formula_spec(), 1..8),
            commit_each in proptest::bool::ANY,
        ) {
            let mut tm = TermManager::new();
            let mut af = fresh_store();
            for spec in specs {
                let f = build(&mut tm, spec);
                af.assert_expr(f, &mut tm);
                af.reduce(&mut tm);
                if commit_each {
                    af.commit(&mut tm);
                }
                prop_assert!(af.qhead() <= af.num_formulas());
            }
        }
    }
}
