//! Algebraic datatype simplification rules.

use silica_core::ast::{TermId, TermKind, TermManager};

use crate::simplify::{SimplifierPlugin, SimplifyCtx};

/// Tester and selector rules over constructor applications.
pub struct DatatypePlugin;

impl SimplifierPlugin for DatatypePlugin {
    fn name(&self) -> &'static str {
        "datatype"
    }

    fn reduce(&self, tm: &mut TermManager, t: TermId, _ctx: &SimplifyCtx) -> Option<TermId> {
        let kind = tm.get(t)?.kind.clone();
        match kind {
            TermKind::DtTester { ctor, arg } => {
                let TermKind::DtConstructor { name, .. } = tm.get(arg)?.kind.clone() else {
                    return None;
                };
                Some(tm.mk_bool(name == ctor))
            }
            TermKind::DtSelector { ctor, idx, arg } => {
                let TermKind::DtConstructor { name, args } = tm.get(arg)?.kind.clone() else {
                    return None;
                };
                if name == ctor {
                    args.get(idx as usize).copied()
                } else {
                    None
                }
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
        DatatypePlugin.reduce(tm, t, &ctx).unwrap_or(t)
    }

    #[test]
    fn test_tester_on_constructor() {
        let mut tm = TermManager::new();
        let list = tm.intern("List");
        let list_sort = tm.sorts.uninterpreted(list);
        let nil = tm.mk_dt_constructor("nil", vec![], list_sort);
        let is_nil = tm.mk_dt_tester("nil", nil);
        let is_nil_simplified = simplify(&mut tm, is_nil);
        assert!(tm.is_true(is_nil_simplified));
        let is_cons = tm.mk_dt_tester("cons", nil);
        let is_cons_simplified = simplify(&mut tm, is_cons);
        assert!(tm.is_false(is_cons_simplified));
    }

    #[test]
    fn test_selector_projects_field() {
        let mut tm = TermManager::new();
        let list = tm.intern("List");
        let list_sort = tm.sorts.uninterpreted(list);
        let head = tm.mk_var("h", tm.sorts.int_sort);
        let tail = tm.mk_var("t", list_sort);
        let cons = tm.mk_dt_constructor("cons", vec![head, tail], list_sort);
        let sel = tm.mk_dt_selector("cons", 0, cons, tm.sorts.int_sort);
        assert_eq!(simplify(&mut tm, sel), head);
    }
}
