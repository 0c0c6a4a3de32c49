//! Macro detection and expansion.
//!
//! A macro is a universally quantified definition `forall xs. f(xs) = body`
//! used as an oriented rewrite rule. The [`MacroManager`] records
//! definitions and the scoped set of *forbidden* heads: once a symbol is
//! applied by a committed formula it may no longer be chosen as a macro
//! head in the current scope, otherwise expansion would change the meaning
//! of formulas already handed to the solver.

use lasso::Spur;
use rustc_hash::{FxHashMap, FxHashSet};
use silica_core::ast::{TermId, TermKind, TermManager};
use silica_core::proof::ProofId;

/// Guard against pathological macro chains.
const MAX_EXPANSION_DEPTH: usize = 64;

/// An oriented rewrite rule `head(vars) -> body`.
#[derive(Debug, Clone)]
pub struct MacroDef {
    /// Formal parameters, in application order.
    pub vars: Vec<Spur>,
    /// Right-hand side over `vars`.
    pub body: TermId,
    /// Proof of the defining formula.
    pub proof: Option<ProofId>,
}

/// Scoped store of macro definitions and forbidden heads.
#[derive(Debug, Default)]
pub struct MacroManager {
    macros: FxHashMap<Spur, MacroDef>,
    macro_trail: Vec<Spur>,
    forbidden: FxHashSet<Spur>,
    forbidden_trail: Vec<Spur>,
    scopes: Vec<(usize, usize)>,
}

impl MacroManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any macro is recorded.
    #[must_use]
    pub fn has_macros(&self) -> bool {
        !self.macros.is_empty()
    }

    /// Whether `head` is defined as a macro.
    #[must_use]
    pub fn contains(&self, head: Spur) -> bool {
        self.macros.contains_key(&head)
    }

    /// Whether `head` may still become a macro in this scope.
    #[must_use]
    pub fn is_forbidden(&self, head: Spur) -> bool {
        self.forbidden.contains(&head)
    }

    /// Record a macro definition. The head becomes forbidden as well: a
    /// symbol cannot be redefined by a later pass in the same scope.
    pub fn insert(&mut self, head: Spur, def: MacroDef) {
        if self.macros.insert(head, def).is_none() {
            self.macro_trail.push(head);
        }
        self.mark_forbidden_symbol(head);
    }

    fn mark_forbidden_symbol(&mut self, head: Spur) {
        if self.forbidden.insert(head) {
            self.forbidden_trail.push(head);
        }
    }

    /// Forbid every function symbol applied in `formulas` from becoming a
    /// macro head. Called on commit with the newly committed slice.
    pub fn mark_forbidden(&mut self, tm: &TermManager, formulas: &[TermId]) {
        let mut heads = FxHashSet::default();
        for &f in formulas {
            tm.collect_apply_heads(f, &mut heads);
        }
        for head in heads {
            self.mark_forbidden_symbol(head);
        }
    }

    /// Expand all macro applications in `e` to a fixpoint.
    pub fn expand(&self, tm: &mut TermManager, e: TermId) -> TermId {
        if self.macros.is_empty() {
            return e;
        }
        let mut cache = FxHashMap::default();
        self.expand_rec(tm, e, 0, &mut cache)
    }

    fn expand_rec(
        &self,
        tm: &mut TermManager,
        e: TermId,
        depth: usize,
        cache: &mut FxHashMap<TermId, TermId>,
    ) -> TermId {
        if depth > MAX_EXPANSION_DEPTH {
            return e;
        }
        if let Some(&hit) = cache.get(&e) {
            return hit;
        }
        let children = tm.children(e);
        let new: Vec<TermId> = children
            .into_iter()
            .map(|c| self.expand_rec(tm, c, depth, cache))
            .collect();
        let rebuilt = tm.rebuild(e, &new);
        let result = match tm.get(rebuilt).map(|t| t.kind.clone()) {
            Some(TermKind::Apply { func, args }) => match self.macros.get(&func) {
                Some(def) if def.vars.len() == args.len() => {
                    let subst: FxHashMap<Spur, TermId> =
                        def.vars.iter().copied().zip(args.iter().copied()).collect();
                    let instantiated = tm.substitute_vars(def.body, &subst);
                    // the body may apply further macros
                    self.expand_rec(tm, instantiated, depth + 1, cache)
                }
                _ => rebuilt,
            },
            _ => rebuilt,
        };
        cache.insert(e, result);
        result
    }

    /// Open a scope.
    pub fn push_scope(&mut self) {
        self.scopes
            .push((self.macro_trail.len(), self.forbidden_trail.len()));
    }

    /// Close `n` scopes, forgetting macros and forbidden heads recorded
    /// inside them.
    pub fn pop_scope(&mut self, n: usize) {
        for _ in 0..n {
            let Some((macro_mark, forbidden_mark)) = self.scopes.pop() else {
                break;
            };
            while self.macro_trail.len() > macro_mark {
                if let Some(head) = self.macro_trail.pop() {
                    self.macros.remove(&head);
                }
            }
            while self.forbidden_trail.len() > forbidden_mark {
                if let Some(head) = self.forbidden_trail.pop() {
                    self.forbidden.remove(&head);
                }
            }
        }
    }

    /// Forget everything.
    pub fn reset(&mut self) {
        self.macros.clear();
        self.macro_trail.clear();
        self.forbidden.clear();
        self.forbidden_trail.clear();
        self.scopes.clear();
    }
}

/// Outcome of scanning one formula.
enum Scan {
    /// The formula defines a macro and was consumed.
    Definition,
    /// The formula stays, possibly with macros expanded.
    Residue(TermId),
}

/// Detects ground and quantified macro definitions in a formula slice.
#[derive(Debug, Default)]
pub struct MacroFinder;

impl MacroFinder {
    /// Create a finder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Scan `formulas`, record definitions in `mm`, and emit the residue
    /// with all known macros expanded. Runs to a fixpoint so definitions
    /// found late still apply to formulas scanned earlier.
    pub fn find(
        &mut self,
        tm: &mut TermManager,
        mm: &mut MacroManager,
        formulas: &[(TermId, Option<ProofId>)],
        out: &mut Vec<(TermId, Option<ProofId>)>,
    ) {
        let mut pending: Vec<(TermId, Option<ProofId>)> = formulas.to_vec();
        loop {
            let mut residue = Vec::with_capacity(pending.len());
            let mut found = false;
            for (e, pr) in pending {
                match Self::scan(tm, mm, e, pr) {
                    Scan::Definition => found = true,
                    Scan::Residue(r) => {
                        let new_pr = if r == e {
                            pr
                        } else {
                            let rw = tm.mk_rewrite(e, r);
                            tm.mk_modus_ponens(pr, rw)
                        };
                        residue.push((r, new_pr));
                    }
                }
            }
            pending = residue;
            if !found {
                break;
            }
        }
        out.extend(pending);
    }

    fn scan(
        tm: &mut TermManager,
        mm: &mut MacroManager,
        e: TermId,
        pr: Option<ProofId>,
    ) -> Scan {
        if let Some((head, vars, body)) = Self::as_macro_def(tm, mm, e) {
            tracing::debug!(head = tm.resolve(head), "macro definition found");
            mm.insert(
                head,
                MacroDef {
                    vars,
                    body,
                    proof: pr,
                },
            );
            return Scan::Definition;
        }
        Scan::Residue(mm.expand(tm, e))
    }

    /// Recognize `forall xs. f(xs) = body` with the bound variables applied
    /// in declaration order, and ground definitions `f() = body`.
    fn as_macro_def(
        tm: &TermManager,
        mm: &MacroManager,
        e: TermId,
    ) -> Option<(Spur, Vec<Spur>, TermId)> {
        match tm.get(e).map(|t| t.kind.clone()) {
            Some(TermKind::Forall { vars, body, .. }) => {
                let (lhs, rhs) = tm.as_eq(body)?;
                Self::orient(tm, mm, &vars, lhs, rhs)
                    .or_else(|| Self::orient(tm, mm, &vars, rhs, lhs))
            }
            Some(TermKind::Eq(lhs, rhs)) => {
                Self::orient(tm, mm, &[], lhs, rhs).or_else(|| Self::orient(tm, mm, &[], rhs, lhs))
            }
            _ => None,
        }
    }

    fn orient(
        tm: &TermManager,
        mm: &MacroManager,
        bound: &[(Spur, silica_core::sort::SortId)],
        lhs: TermId,
        rhs: TermId,
    ) -> Option<(Spur, Vec<Spur>, TermId)> {
        let TermKind::Apply { func, args } = tm.get(lhs)?.kind.clone() else {
            return None;
        };
        if mm.is_forbidden(func) || mm.contains(func) {
            return None;
        }
        // arguments must be exactly the bound variables, in order
        if args.len() != bound.len() {
            return None;
        }
        for (arg, (name, _)) in args.iter().zip(bound.iter()) {
            match tm.get(*arg).map(|t| &t.kind) {
                Some(TermKind::Var(v)) if v == name => {}
                _ => return None,
            }
        }
        // the head must not occur in the body; free constants may
        if tm.occurs_apply(func, rhs) {
            return None;
        }
        Some((func, bound.iter().map(|(name, _)| *name).collect(), rhs))
    }
}

/// Detects quasi-macro definitions: the bound variables applied in some
/// permuted order. Normalizing the permutation yields a proper macro.
#[derive(Debug, Default)]
pub struct QuasiMacros;

impl QuasiMacros {
    /// Create a detector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// One detection round. Returns true when a definition was consumed;
    /// the caller loops until no progress is made.
    pub fn find(
        &mut self,
        tm: &mut TermManager,
        mm: &mut MacroManager,
        formulas: &[(TermId, Option<ProofId>)],
        out: &mut Vec<(TermId, Option<ProofId>)>,
    ) -> bool {
        let mut found = false;
        for &(e, pr) in formulas {
            if let Some((head, vars, body)) = Self::as_quasi_macro(tm, mm, e) {
                tracing::debug!(head = tm.resolve(head), "quasi-macro definition found");
                mm.insert(
                    head,
                    MacroDef {
                        vars,
                        body,
                        proof: pr,
                    },
                );
                found = true;
                continue;
            }
            let r = mm.expand(tm, e);
            let new_pr = if r == e {
                pr
            } else {
                let rw = tm.mk_rewrite(e, r);
                tm.mk_modus_ponens(pr, rw)
            };
            out.push((r, new_pr));
        }
        found
    }

    /// Recognize `forall xs. f(perm(xs)) = body` where `perm` is a true
    /// permutation (each bound variable applied exactly once, not in
    /// declaration order).
    fn as_quasi_macro(
        tm: &TermManager,
        mm: &MacroManager,
        e: TermId,
    ) -> Option<(Spur, Vec<Spur>, TermId)> {
        let TermKind::Forall { vars, body, .. } = tm.get(e)?.kind.clone() else {
            return None;
        };
        let (lhs, rhs) = tm.as_eq(body)?;
        Self::orient_permuted(tm, mm, &vars, lhs, rhs)
            .or_else(|| Self::orient_permuted(tm, mm, &vars, rhs, lhs))
    }

    fn orient_permuted(
        tm: &TermManager,
        mm: &MacroManager,
        bound: &[(Spur, silica_core::sort::SortId)],
        lhs: TermId,
        rhs: TermId,
    ) -> Option<(Spur, Vec<Spur>, TermId)> {
        let TermKind::Apply { func, args } = tm.get(lhs)?.kind.clone() else {
            return None;
        };
        if mm.is_forbidden(func) || mm.contains(func) || args.len() != bound.len() {
            return None;
        }
        let names: FxHashSet<Spur> = bound.iter().map(|(name, _)| *name).collect();
        let mut applied = Vec::with_capacity(args.len());
        let mut seen = FxHashSet::default();
        for &arg in &args {
            let Some(&TermKind::Var(v)) = tm.get(arg).map(|t| &t.kind) else {
                return None;
            };
            if !names.contains(&v) || !seen.insert(v) {
                return None;
            }
            applied.push(v);
        }
        // the in-order case belongs to the plain macro finder
        let in_order = applied
            .iter()
            .zip(bound.iter())
            .all(|(a, (name, _))| a == name);
        if in_order {
            return None;
        }
        if tm.occurs_apply(func, rhs) {
            return None;
        }
        // normalize: formal parameters follow the application order
        Some((func, applied, rhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn test_find_quantified_macro() {
        let mut tm = TermManager::new();
        let mut mm = MacroManager::new();
        let mut finder = MacroFinder::new();
        let int = tm.sorts.int_sort;
        let x_sym = tm.intern("x");
        let x = tm.mk_var("x", int);
        let one = tm.mk_int(BigInt::from(1));

        // forall x. f(x) = x + 1
        let fx = tm.mk_apply("f", vec![x], int);
        let body = tm.mk_add(vec![x, one]);
        let eq = tm.mk_eq(fx, body);
        let def = tm.mk_forall(vec![(x_sym, int)], vec![], eq);

        // f(2) > 0
        let two = tm.mk_int(BigInt::from(2));
        let f2 = tm.mk_apply("f", vec![two], int);
        let zero = tm.mk_int(BigInt::from(0));
        let gt = tm.mk_gt(f2, zero);

        let mut out = Vec::new();
        finder.find(&mut tm, &mut mm, &[(def, None), (gt, None)], &mut out);

        let f_sym = tm.intern("f");
        assert!(mm.contains(f_sym));
        assert!(mm.is_forbidden(f_sym));
        assert_eq!(out.len(), 1);
        let sum = tm.mk_add(vec![two, one]);
        let expected = tm.mk_gt(sum, zero);
        assert_eq!(out[0].0, expected);
    }

    #[test]
    fn test_forbidden_head_is_not_redefined() {
        let mut tm = TermManager::new();
        let mut mm = MacroManager::new();
        let mut finder = MacroFinder::new();
        let int = tm.sorts.int_sort;
        let f_sym = tm.intern("f");

        // pretend f appeared in a committed formula
        let two = tm.mk_int(BigInt::from(2));
        let f2 = tm.mk_apply("f", vec![two], int);
        mm.mark_forbidden(&tm, &[f2]);

        let x_sym = tm.intern("x");
        let x = tm.mk_var("x", int);
        let fx = tm.mk_apply("f", vec![x], int);
        let eq = tm.mk_eq(fx, x);
        let def = tm.mk_forall(vec![(x_sym, int)], vec![], eq);

        let mut out = Vec::new();
        finder.find(&mut tm, &mut mm, &[(def, None)], &mut out);
        assert!(!mm.contains(f_sym));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_macro_scope_pop() {
        let mut tm = TermManager::new();
        let mut mm = MacroManager::new();
        let int = tm.sorts.int_sort;
        let f_sym = tm.intern("f");
        let x_sym = tm.intern("x");
        let x = tm.mk_var("x", int);

        mm.push_scope();
        mm.insert(
            f_sym,
            MacroDef {
                vars: vec![x_sym],
                body: x,
                proof: None,
            },
        );
        assert!(mm.has_macros());
        mm.pop_scope(1);
        assert!(!mm.has_macros());
        assert!(!mm.is_forbidden(f_sym));
    }

    #[test]
    fn test_quasi_macro_permutation() {
        let mut tm = TermManager::new();
        let mut mm = MacroManager::new();
        let mut quasi = QuasiMacros::new();
        let int = tm.sorts.int_sort;
        let x_sym = tm.intern("x");
        let y_sym = tm.intern("y");
        let x = tm.mk_var("x", int);
        let y = tm.mk_var("y", int);

        // forall x y. g(y, x) = x - y
        let gyx = tm.mk_apply("g", vec![y, x], int);
        let body = tm.mk_sub(x, y);
        let eq = tm.mk_eq(gyx, body);
        let def = tm.mk_forall(vec![(x_sym, int), (y_sym, int)], vec![], eq);

        let mut out = Vec::new();
        let found = quasi.find(&mut tm, &mut mm, &[(def, None)], &mut out);
        assert!(found);
        let g_sym = tm.intern("g");
        assert!(mm.contains(g_sym));

        // g(1, 2) expands with the normalized parameter order: y=1, x=2
        let one = tm.mk_int(BigInt::from(1));
        let two = tm.mk_int(BigInt::from(2));
        let g12 = tm.mk_apply("g", vec![one, two], int);
        let expanded = mm.expand(&mut tm, g12);
        let expected = tm.mk_sub(two, one);
        assert_eq!(expanded, expected);
    }
}
