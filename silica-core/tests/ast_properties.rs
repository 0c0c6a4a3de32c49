//! Property-based tests for term manager invariants.

use num_bigint::BigInt;
use proptest::prelude::*;
use rustc_hash::FxHashMap;
use silica_core::ast::{TermId, TermManager};

/// A recipe for a small integer term over a fixed variable pool.
#[derive(Debug, Clone)]
enum TermSpec {
    Var(u8),
    Const(i64),
    Add(Box<TermSpec>, Box<TermSpec>),
    Sub(Box<TermSpec>, Box<TermSpec>),
    Neg(Box<TermSpec>),
}

fn term_spec() -> impl Strategy<Value = TermSpec> {
    let leaf = prop_oneof![
        (0u8..4).prop_map(TermSpec::Var),
        (-100i64..100).prop_map(TermSpec::Const),
    ];
    leaf.prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| TermSpec::Add(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| TermSpec::Sub(Box::new(a), Box::new(b))),
            inner.prop_map(|a| TermSpec::Neg(Box::new(a))),
        ]
    })
}

fn build(tm: &mut TermManager, spec: &TermSpec) -> TermId {
    let int = tm.sorts.int_sort;
    match spec {
        TermSpec::Var(i) => tm.mk_var(&format!("v{}", i % 4), int),
        TermSpec::Const(n) => tm.mk_int(BigInt::from(*n)),
        TermSpec::Add(a, b) => {
            let a = build(tm, a);
            let b = build(tm, b);
            tm.mk_add(vec![a, b])
        }
        TermSpec::Sub(a, b) => {
            let a = build(tm, a);
            let b = build(tm, b);
            tm.mk_sub(a, b)
        }
        TermSpec::Neg(a) => {
            let a = build(tm, a);
            tm.mk_neg(a)
        }
    }
}

proptest! {
    /// Building the same term twice yields the same handle.
    #[test]
    fn hash_consing_is_stable(spec in term_spec()) {
        let mut tm = TermManager::new();
        let a = build(&mut tm, &spec);
        let b = build(&mut tm, &spec);
        prop_assert_eq!(a, b);
    }

    /// Substituting a variable that does not occur is the identity.
    #[test]
    fn substituting_absent_var_is_identity(spec in term_spec()) {
        let mut tm = TermManager::new();
        let t = build(&mut tm, &spec);
        let absent = tm.intern("w");
        let zero = tm.mk_int(BigInt::from(0));
        let mut subst = FxHashMap::default();
        subst.insert(absent, zero);
        prop_assert_eq!(tm.substitute_vars(t, &subst), t);
    }

    /// After substituting every pool variable the result has no free vars.
    #[test]
    fn full_substitution_grounds_the_term(spec in term_spec()) {
        let mut tm = TermManager::new();
        let t = build(&mut tm, &spec);
        let zero = tm.mk_int(BigInt::from(0));
        let mut subst = FxHashMap::default();
        for i in 0..4 {
            let sym = tm.intern(&format!("v{i}"));
            subst.insert(sym, zero);
        }
        let grounded = tm.substitute_vars(t, &subst);
        prop_assert!(tm.free_vars(grounded).is_empty());
    }

    /// Rebuilding a term from its own children is the identity.
    #[test]
    fn rebuild_with_same_children_is_identity(spec in term_spec()) {
        let mut tm = TermManager::new();
        let t = build(&mut tm, &spec);
        let children: Vec<TermId> = tm.children(t).into_iter().collect();
        prop_assert_eq!(tm.rebuild(t, &children), t);
    }

    /// num_exprs counts at least one node and never more than the
    /// syntactic size of the recipe.
    #[test]
    fn num_exprs_is_bounded(spec in term_spec()) {
        let mut tm = TermManager::new();
        let t = build(&mut tm, &spec);
        let n = tm.num_exprs(t);
        prop_assert!(n >= 1);
        fn syntactic_size(spec: &TermSpec) -> usize {
            match spec {
                TermSpec::Var(_) | TermSpec::Const(_) => 1,
                TermSpec::Add(a, b) | TermSpec::Sub(a, b) => {
                    1 + syntactic_size(a) + syntactic_size(b)
                }
                TermSpec::Neg(a) => 1 + syntactic_size(a),
            }
        }
        prop_assert!(n <= syntactic_size(&spec));
    }
}
