//! The assertion store and preprocessing pipeline.
//!
//! [`AssertedFormulas`] holds the ordered assertion sequence with its
//! committed-head index `qhead`: formulas below the head have been handed
//! to the downstream solver, formulas above it are still pending
//! preprocessing. [`AssertedFormulas::reduce`] drives the pass cascade over
//! the pending suffix, checking cancellation and inconsistency after every
//! pass. Scopes bracket transactional episodes; popping one restores the
//! store and every scoped sub-component to its state at the push.

use rustc_hash::FxHashSet;
use silica_core::ast::{TermId, TermManager};
use silica_core::config::{LiftIteMode, PreprocessParams};
use silica_core::error::{Error, Result};
use silica_core::proof::ProofId;
use silica_core::resource::CancelFlag;
use std::fmt;

use crate::bv_sharing::MaxBvSharing;
use crate::defined_names::DefinedNames;
use crate::features::StaticFeatures;
use crate::macros::{MacroFinder, MacroManager, QuasiMacros};
use crate::nnf::Nnf;
use crate::rewrites::{
    refine_inj_axiom, Bit2Int, BvQuantifierElim, DistributeForall, ElimBounds, ElimTermIte,
    PatternInference, PullCheapIteTree, PullNestedQuantifiers, PushAppIte,
};
use crate::simplify::Simplifier;

#[derive(Debug, Clone, Copy)]
struct Scope {
    formulas_lim: usize,
    inconsistent_old: bool,
}

/// Pass-local accumulation buffer for the rebuilt pending suffix.
#[derive(Debug, Default)]
struct Assertions {
    exprs: Vec<TermId>,
    prs: Vec<Option<ProofId>>,
}

/// Assertion store with scope stack and the preprocessing pipeline.
#[derive(Debug)]
pub struct AssertedFormulas {
    params: PreprocessParams,
    cancel: CancelFlag,
    pre_simplifier: Simplifier,
    simplifier: Simplifier,
    defined_names: DefinedNames,
    static_features: StaticFeatures,
    formulas: Vec<TermId>,
    proofs: Vec<Option<ProofId>>,
    qhead: usize,
    macro_manager: MacroManager,
    macro_finder: MacroFinder,
    bv_sharing: MaxBvSharing,
    inconsistent: bool,
    scopes: Vec<Scope>,
}

impl AssertedFormulas {
    /// Create a store. `params` is normalized via
    /// [`PreprocessParams::setup`] before use.
    #[must_use]
    pub fn new(mut params: PreprocessParams, cancel: CancelFlag) -> Self {
        params.setup();
        Self {
            params,
            cancel,
            pre_simplifier: Simplifier::presimp(),
            simplifier: Simplifier::new(),
            defined_names: DefinedNames::new(),
            static_features: StaticFeatures::new(),
            formulas: Vec::new(),
            proofs: Vec::new(),
            qhead: 0,
            macro_manager: MacroManager::new(),
            macro_finder: MacroFinder::new(),
            bv_sharing: MaxBvSharing::new(),
            inconsistent: false,
            scopes: Vec::new(),
        }
    }

    /// One-shot bulk seeding of an empty store.
    pub fn init(
        &mut self,
        formulas: Vec<TermId>,
        proofs: Vec<Option<ProofId>>,
        tm: &TermManager,
    ) -> Result<()> {
        if !self.formulas.is_empty() || self.inconsistent || !self.scopes.is_empty() {
            return Err(Error::precondition("init on a non-empty store"));
        }
        if tm.proofs_enabled() {
            if proofs.len() != formulas.len() {
                return Err(Error::precondition(
                    "init requires one proof per formula when proofs are enabled",
                ));
            }
            self.proofs = proofs;
        }
        self.formulas = formulas;
        Ok(())
    }

    /// Whether the cancellation flag is raised.
    #[must_use]
    pub fn canceled(&self) -> bool {
        self.cancel.is_canceled()
    }

    /// Whether the literal false has been asserted or derived.
    #[must_use]
    pub fn inconsistent(&self) -> bool {
        self.inconsistent
    }

    /// The committed-head index.
    #[must_use]
    pub fn qhead(&self) -> usize {
        self.qhead
    }

    /// Snapshot of the assertion sequence.
    #[must_use]
    pub fn get_assertions(&self) -> &[TermId] {
        &self.formulas
    }

    /// Number of asserted formulas.
    #[must_use]
    pub fn num_formulas(&self) -> usize {
        self.formulas.len()
    }

    /// Size of the assertion sequence at the top of the scope stack, or 0
    /// when no scope is open. Callers distinguishing "top level, nothing
    /// asserted" need [`AssertedFormulas::num_formulas`] instead.
    #[must_use]
    pub fn get_formulas_last_level(&self) -> usize {
        self.scopes.last().map_or(0, |s| s.formulas_lim)
    }

    /// Sum of the formulas' subterm counts.
    #[must_use]
    pub fn get_total_size(&self, tm: &TermManager) -> usize {
        self.formulas.iter().map(|&f| tm.num_exprs(f)).sum()
    }

    /// Approximate bit-vector presence: whether the bit-vector plugin was
    /// ever dispatched.
    #[must_use]
    pub fn has_bv(&self) -> bool {
        self.simplifier.bv_invoked()
    }

    /// Whether the pending suffix mentions a quantifier.
    pub fn has_quantifiers(&self, tm: &mut TermManager) -> bool {
        self.formulas[self.qhead..]
            .iter()
            .any(|&f| tm.has_quantifiers(f))
    }

    /// Toggle conjunction elimination on the main simplifier.
    pub fn set_eliminate_and(&mut self, flag: bool) {
        self.simplifier.set_eliminate_and(flag);
    }

    fn flush_cache(&mut self) {
        self.simplifier.flush_cache();
        self.pre_simplifier.flush_cache();
    }

    fn proof_at(&self, i: usize) -> Option<ProofId> {
        self.proofs.get(i).copied().flatten()
    }

    /// Append to a pass buffer, recording inconsistency when the literal
    /// false shows up. Nothing is appended once inconsistent: the false
    /// already in the buffer stays last.
    fn push_assertion(
        &mut self,
        tm: &TermManager,
        e: TermId,
        pr: Option<ProofId>,
        out: &mut Assertions,
    ) {
        if self.inconsistent {
            debug_assert!(!out.exprs.is_empty());
            return;
        }
        if tm.is_false(e) {
            self.inconsistent = true;
        }
        out.exprs.push(e);
        out.prs.push(pr);
    }

    /// Replace the pending suffix with a pass buffer.
    fn swap_suffix(&mut self, tm: &TermManager, out: Assertions) {
        debug_assert!(!self.inconsistent || !out.exprs.is_empty());
        self.formulas.truncate(self.qhead);
        self.formulas.extend(out.exprs);
        if tm.proofs_enabled() {
            self.proofs.truncate(self.qhead);
            self.proofs.extend(out.prs);
        }
    }

    fn check_bool_sorted(&self, tm: &TermManager) -> bool {
        self.formulas.iter().all(|&f| {
            tm.get(f)
                .and_then(|term| tm.sorts.get(term.sort))
                .is_some_and(|s| s.is_bool())
        })
    }

    // ------------------------------------------------------------------
    // Assertion entry points
    // ------------------------------------------------------------------

    /// Assert a formula with a self-justifying proof.
    pub fn assert_expr(&mut self, e: TermId, tm: &mut TermManager) {
        if self.inconsistent {
            return;
        }
        let pr = tm.mk_asserted(e);
        self.assert_expr_with_proof(e, pr, tm);
    }

    /// Assert a formula with a caller-supplied proof. The formula is
    /// pre-simplified (when configured) and simplified on entry;
    /// conjunction elimination is forced off so ANDs survive until NNF.
    pub fn assert_expr_with_proof(
        &mut self,
        e: TermId,
        in_pr: Option<ProofId>,
        tm: &mut TermManager,
    ) {
        if self.inconsistent {
            return;
        }
        if !self.params.preprocess {
            self.append(tm, e, in_pr);
            return;
        }
        let (r1, pr1) = if self.params.pre_simplifier {
            self.pre_simplifier.simplify(tm, e)
        } else {
            (e, None)
        };
        self.set_eliminate_and(false); // conjunctions survive until NNF
        let (r2, pr2) = self.simplifier.simplify(tm, r1);
        let pr = if tm.proofs_enabled() {
            if e == r2 {
                in_pr
            } else {
                let trans = tm.mk_transitivity(pr1, pr2);
                tm.mk_modus_ponens(in_pr, trans)
            }
        } else {
            None
        };
        tracing::trace!(
            before = %tm.display_term(e),
            after = %tm.display_term(r2),
            "assert"
        );
        self.append(tm, r2, pr);
    }

    fn append(&mut self, tm: &TermManager, e: TermId, pr: Option<ProofId>) {
        if tm.is_false(e) {
            self.inconsistent = true;
        }
        self.formulas.push(e);
        if tm.proofs_enabled() {
            self.proofs.push(pr);
        }
    }

    /// When inconsistent, the proof of the recorded literal false.
    pub fn get_inconsistency_proof(&self, tm: &TermManager) -> Result<Option<ProofId>> {
        if !self.inconsistent {
            return Err(Error::precondition(
                "get_inconsistency_proof on a consistent store",
            ));
        }
        if !tm.proofs_enabled() {
            return Ok(None);
        }
        for (i, &f) in self.formulas.iter().enumerate() {
            if tm.is_false(f) {
                return Ok(self.proof_at(i));
            }
        }
        Err(Error::invariant(
            "inconsistent without a recorded literal false",
        ))
    }

    // ------------------------------------------------------------------
    // Scopes and commit
    // ------------------------------------------------------------------

    /// Open a scope. Commits the pending suffix first; the caller is
    /// expected to have fully preprocessed before nesting.
    pub fn push_scope(&mut self, tm: &mut TermManager) {
        debug_assert!(
            self.inconsistent || self.qhead == self.formulas.len() || self.canceled()
        );
        tracing::debug!(level = self.scopes.len() + 1, "push scope");
        self.scopes.push(Scope {
            formulas_lim: self.formulas.len(),
            inconsistent_old: self.inconsistent,
        });
        self.macro_manager.push_scope();
        self.defined_names.push();
        self.bv_sharing.push_scope();
        self.commit(tm);
    }

    /// Close `n` scopes, restoring the assertion sequence, the
    /// inconsistency flag, and every scoped sub-component. The committed
    /// head returns to the restored size.
    pub fn pop_scope(&mut self, n: usize, tm: &TermManager) -> Result<()> {
        if n > self.scopes.len() {
            return Err(Error::precondition("pop_scope deeper than the scope stack"));
        }
        tracing::debug!(levels = n, "pop scope");
        self.bv_sharing.pop_scope(n);
        self.macro_manager.pop_scope(n);
        let new_lvl = self.scopes.len() - n;
        let scope = self.scopes[new_lvl];
        self.inconsistent = scope.inconsistent_old;
        self.defined_names.pop(n);
        self.formulas.truncate(scope.formulas_lim);
        if tm.proofs_enabled() {
            self.proofs.truncate(scope.formulas_lim);
        }
        self.qhead = scope.formulas_lim;
        self.scopes.truncate(new_lvl);
        self.flush_cache();
        Ok(())
    }

    /// Clear everything.
    pub fn reset(&mut self) {
        self.defined_names.reset();
        self.qhead = 0;
        self.formulas.clear();
        self.proofs.clear();
        self.macro_manager.reset();
        self.bv_sharing.reset();
        self.static_features.reset();
        self.inconsistent = false;
        self.scopes.clear();
        self.flush_cache();
    }

    /// Commit the whole sequence: mark the new formulas' heads forbidden
    /// for macro detection and advance the committed head.
    pub fn commit(&mut self, tm: &mut TermManager) {
        self.do_commit(self.formulas.len(), tm);
    }

    /// Commit up to `new_qhead`.
    pub fn commit_to(&mut self, new_qhead: usize, tm: &mut TermManager) -> Result<()> {
        if new_qhead > self.formulas.len() {
            return Err(Error::precondition("commit past the end of the store"));
        }
        self.do_commit(new_qhead, tm);
        Ok(())
    }

    fn do_commit(&mut self, new_qhead: usize, tm: &mut TermManager) {
        if new_qhead >= self.qhead {
            self.macro_manager
                .mark_forbidden(tm, &self.formulas[self.qhead..new_qhead]);
        }
        self.qhead = new_qhead;
        if self.params.display_features {
            self.collect_static_features(tm);
        }
    }

    /// Collect and log static features of the committed formulas.
    pub fn collect_static_features(&mut self, tm: &TermManager) {
        if !self.params.display_features {
            return;
        }
        self.static_features.reset();
        for &f in &self.formulas[..self.qhead] {
            self.static_features.collect(tm, f);
        }
        tracing::info!("static features:\n{}", self.static_features);
    }

    // ------------------------------------------------------------------
    // The pipeline
    // ------------------------------------------------------------------

    /// Run the preprocessing cascade over the pending suffix.
    ///
    /// No-op when inconsistent, canceled, nothing pending, or
    /// preprocessing is disabled. Every pass is followed by an
    /// inconsistency and cancellation checkpoint; the final
    /// re-simplification re-normalizes associativity that sharing-oriented
    /// passes may have perturbed.
    pub fn reduce(&mut self, tm: &mut TermManager) {
        if self.inconsistent || self.canceled() {
            return;
        }
        if self.qhead == self.formulas.len() {
            return;
        }
        if !self.params.preprocess {
            return;
        }
        tracing::debug!(pending = self.formulas.len() - self.qhead, "reduce");
        debug_assert!(self.check_bool_sorted(tm));

        if self.macro_manager.has_macros() {
            self.expand_macros(tm);
            if self.inconsistent || self.canceled() {
                return;
            }
        }

        let p = self.params.clone();
        self.set_eliminate_and(false); // conjunctions survive until NNF

        if p.propagate_booleans {
            self.propagate_booleans(tm);
        }
        if self.inconsistent || self.canceled() {
            return;
        }
        if p.propagate_values {
            self.propagate_values(tm);
        }
        if self.inconsistent || self.canceled() {
            return;
        }
        if p.macro_finder && self.has_quantifiers(tm) {
            self.find_macros(tm);
        }
        if self.inconsistent || self.canceled() {
            return;
        }
        if p.nnf_cnf || (p.mbqi && self.has_quantifiers(tm)) {
            self.nnf_cnf(tm);
        }
        if self.inconsistent || self.canceled() {
            return;
        }
        if p.eliminate_and {
            self.eliminate_and(tm);
        }
        if self.inconsistent || self.canceled() {
            return;
        }
        if p.pull_cheap_ite_trees {
            self.pull_cheap_ite_trees(tm);
        }
        if self.inconsistent || self.canceled() {
            return;
        }
        if p.pull_nested_quantifiers && self.has_quantifiers(tm) {
            self.pull_nested_quantifiers(tm);
        }
        if self.inconsistent || self.canceled() {
            return;
        }
        if p.ng_lift_ite != LiftIteMode::None {
            self.ng_lift_ite(tm);
        }
        if self.inconsistent || self.canceled() {
            return;
        }
        if p.lift_ite != LiftIteMode::None {
            self.lift_ite(tm);
        }
        if self.inconsistent || self.canceled() {
            return;
        }
        if p.eliminate_term_ite && p.lift_ite != LiftIteMode::Full {
            self.eliminate_term_ite(tm);
        }
        if self.inconsistent || self.canceled() {
            return;
        }
        if p.refine_inj_axiom && self.has_quantifiers(tm) {
            self.refine_inj_axiom(tm);
        }
        if self.inconsistent || self.canceled() {
            return;
        }
        if p.distribute_forall && self.has_quantifiers(tm) {
            self.apply_distribute_forall(tm);
        }
        if self.inconsistent || self.canceled() {
            return;
        }
        if p.macro_finder && self.has_quantifiers(tm) {
            self.find_macros(tm);
        }
        if self.inconsistent || self.canceled() {
            return;
        }
        if p.quasi_macros && self.has_quantifiers(tm) {
            self.apply_quasi_macros(tm);
        }
        if self.inconsistent || self.canceled() {
            return;
        }
        if p.simplify_bit2int {
            self.apply_bit2int(tm);
        }
        if self.inconsistent || self.canceled() {
            return;
        }
        if p.eliminate_bounds && self.has_quantifiers(tm) {
            self.cheap_quant_fourier_motzkin(tm);
        }
        if self.inconsistent || self.canceled() {
            return;
        }
        if p.ematching && self.has_quantifiers(tm) {
            self.infer_patterns(tm);
        }
        if self.inconsistent || self.canceled() {
            return;
        }
        if p.max_bv_sharing && self.has_bv() {
            self.max_bv_sharing(tm);
        }
        if self.inconsistent || self.canceled() {
            return;
        }
        if p.bb_quantifiers {
            self.elim_bvs_from_quantifiers(tm);
        }
        if self.inconsistent || self.canceled() {
            return;
        }
        // arith and bv chains must end up list-associated; sharing-oriented
        // passes disturb this, so re-normalize last
        self.reduce_asserted_formulas(tm);

        debug_assert!(self.check_bool_sorted(tm));
        tracing::debug!("reduce done");
        self.flush_cache();
    }

    /// Re-simplify the pending suffix with the main simplifier.
    fn reduce_asserted_formulas(&mut self, tm: &mut TermManager) {
        if self.inconsistent {
            return;
        }
        let mut out = Assertions::default();
        for i in self.qhead..self.formulas.len() {
            if self.inconsistent {
                break;
            }
            let n = self.formulas[i];
            let pr = self.proof_at(i);
            let (new_n, new_pr) = self.simplifier.simplify(tm, n);
            if new_n == n {
                self.push_assertion(tm, n, pr, &mut out);
            } else {
                let mp = tm.mk_modus_ponens(pr, new_pr);
                self.push_assertion(tm, new_n, mp, &mut out);
            }
            if self.canceled() {
                return;
            }
        }
        self.swap_suffix(tm, out);
    }

    /// Flush the cache, then re-simplify. The common renormalization tail
    /// of most passes.
    fn reduce_and_solve(&mut self, tm: &mut TermManager) {
        self.flush_cache();
        self.reduce_asserted_formulas(tm);
    }

    /// The rewrite-pass template: run a transformer over the pending
    /// suffix, composing proofs via modus ponens, and swap the suffix.
    /// Returns whether anything changed.
    fn rewrite_pass<F>(&mut self, name: &str, tm: &mut TermManager, mut f: F) -> bool
    where
        F: FnMut(&mut TermManager, TermId) -> TermId,
    {
        tracing::debug!(pass = name, "running");
        let mut out = Assertions::default();
        let mut changed = false;
        for i in self.qhead..self.formulas.len() {
            let n = self.formulas[i];
            let pr = self.proof_at(i);
            let new_n = f(tm, n);
            if new_n == n {
                self.push_assertion(tm, n, pr, &mut out);
            } else {
                changed = true;
                let rw = tm.mk_rewrite(n, new_n);
                let mp = tm.mk_modus_ponens(pr, rw);
                self.push_assertion(tm, new_n, mp, &mut out);
            }
        }
        self.swap_suffix(tm, out);
        changed
    }

    /// In-place variant: patch formulas and proofs without rebuilding the
    /// suffix.
    fn rewrite_in_place<F>(&mut self, name: &str, tm: &mut TermManager, mut f: F)
    where
        F: FnMut(&mut TermManager, TermId) -> TermId,
    {
        tracing::debug!(pass = name, "running");
        for i in self.qhead..self.formulas.len() {
            let n = self.formulas[i];
            let new_n = f(tm, n);
            if new_n == n {
                continue;
            }
            self.formulas[i] = new_n;
            if tm.proofs_enabled() {
                let pr = self.proof_at(i);
                let rw = tm.mk_rewrite(n, new_n);
                let mp = tm.mk_modus_ponens(pr, rw);
                self.proofs[i] = mp;
            }
        }
    }

    // ------------------------------------------------------------------
    // Individual passes
    // ------------------------------------------------------------------

    /// Propagate `x = value` equalities through the pending suffix by
    /// seeding the simplifier cache with them.
    fn propagate_values(&mut self, tm: &mut TermManager) {
        tracing::debug!("constant propagation");
        self.flush_cache();
        let mut found = false;
        // Partition into C (kept equalities, cache-seeded) and R (the
        // rest). All indices are scanned so committed equalities feed
        // pending formulas, but only the pending suffix is rebuilt.
        let mut accepted = Assertions::default();
        let mut rest: Vec<(TermId, Option<ProofId>)> = Vec::new();
        for i in 0..self.formulas.len() {
            let mut n = self.formulas[i];
            let mut pr = self.proof_at(i);
            if let Some((mut lhs, mut rhs)) = tm.as_eq(n) {
                if tm.is_value(lhs) || tm.is_value(rhs) {
                    if tm.is_value(lhs) {
                        std::mem::swap(&mut lhs, &mut rhs);
                        n = tm.mk_eq(lhs, rhs);
                        pr = tm.mk_symmetry(pr);
                    }
                    if !tm.is_value(lhs) && !self.simplifier.is_cached(lhs) {
                        if i >= self.qhead {
                            accepted.exprs.push(n);
                            accepted.prs.push(pr);
                        }
                        tracing::trace!(
                            var = %tm.display_term(lhs),
                            value = %tm.display_term(rhs),
                            "propagating"
                        );
                        self.simplifier.cache_result(lhs, rhs, pr);
                        found = true;
                        continue;
                    }
                }
            }
            if i >= self.qhead {
                rest.push((n, pr));
            }
        }
        if found {
            for (n, pr) in rest {
                let (new_n, new_pr) = self.simplifier.simplify(tm, n);
                if new_n == n {
                    self.push_assertion(tm, n, pr, &mut accepted);
                } else {
                    let mp = tm.mk_modus_ponens(pr, new_pr);
                    self.push_assertion(tm, new_n, mp, &mut accepted);
                }
            }
            self.swap_suffix(tm, accepted);
            // The cache MUST be flushed: leaving the x -> value entries in
            // place would let later passes silently rewrite x away, and
            // models produced downstream would not mention it.
            self.flush_cache();
        }
    }

    /// Iterated truth-value propagation: alternate left-to-right and
    /// right-to-left sweeps, caching each formula's truth value for the
    /// remainder of the sweep.
    fn propagate_booleans(&mut self, tm: &mut TermManager) {
        let mut cont = true;
        let mut modified = false;
        self.flush_cache();
        while cont {
            tracing::debug!("boolean propagation sweep");
            cont = false;
            let sz = self.formulas.len();
            for i in self.qhead..sz {
                self.propagate_booleans_step(tm, i, &mut cont, &mut modified);
            }
            self.flush_cache();
            let mut i = sz;
            while i > self.qhead {
                i -= 1;
                self.propagate_booleans_step(tm, i, &mut cont, &mut modified);
            }
            self.flush_cache();
        }
        if modified {
            self.reduce_asserted_formulas(tm);
        }
    }

    fn propagate_booleans_step(
        &mut self,
        tm: &mut TermManager,
        i: usize,
        cont: &mut bool,
        modified: &mut bool,
    ) {
        let n = self.formulas[i];
        let pr = self.proof_at(i);
        let (new_n, step_pr) = self.simplifier.simplify(tm, n);
        let new_pr = tm.mk_modus_ponens(pr, step_pr);
        self.formulas[i] = new_n;
        if tm.proofs_enabled() {
            self.proofs[i] = new_pr;
        }
        if n != new_n {
            *cont = true;
            *modified = true;
        }
        if let Some(arg) = tm.as_not(new_n) {
            let f = tm.mk_false();
            let iff = tm.mk_iff_false(new_pr);
            self.simplifier.cache_result(arg, f, iff);
        } else {
            let t = tm.mk_true();
            let iff = tm.mk_iff_true(new_pr);
            self.simplifier.cache_result(new_n, t, iff);
        }
    }

    /// NNF/CNF conversion with naming of shared subformulas.
    fn nnf_cnf(&mut self, tm: &mut TermManager) {
        tracing::debug!("nnf conversion");
        let mut out = Assertions::default();
        for i in self.qhead..self.formulas.len() {
            let n = self.formulas[i];
            let pr = self.proof_at(i);
            let (r1, aux) = {
                let mut engine = Nnf::new(&mut self.defined_names);
                engine.convert(tm, n)
            };
            let pr1 = if r1 == n { None } else { tm.mk_rewrite(n, r1) };
            let pr = tm.mk_modus_ponens(pr, pr1);
            if self.canceled() {
                return;
            }
            let mut todo = aux;
            todo.push((r1, pr));
            for (f, fpr) in todo {
                let (s, spr) = self.simplifier.simplify(tm, f);
                if self.canceled() {
                    return;
                }
                if s == f {
                    self.push_assertion(tm, f, fpr, &mut out);
                } else {
                    let mp = tm.mk_modus_ponens(fpr, spr);
                    self.push_assertion(tm, s, mp, &mut out);
                }
            }
        }
        self.swap_suffix(tm, out);
    }

    /// Permit conjunction elimination and renormalize.
    fn eliminate_and(&mut self, tm: &mut TermManager) {
        tracing::debug!("eliminating conjunctions");
        self.set_eliminate_and(true);
        self.reduce_asserted_formulas(tm);
    }

    fn find_macros_core(&mut self, tm: &mut TermManager) {
        let pending: Vec<(TermId, Option<ProofId>)> = (self.qhead..self.formulas.len())
            .map(|i| (self.formulas[i], self.proof_at(i)))
            .collect();
        let mut results = Vec::new();
        let mut finder = std::mem::take(&mut self.macro_finder);
        finder.find(tm, &mut self.macro_manager, &pending, &mut results);
        self.macro_finder = finder;
        let mut out = Assertions::default();
        for (e, pr) in results {
            self.push_assertion(tm, e, pr, &mut out);
        }
        self.swap_suffix(tm, out);
        self.reduce_and_solve(tm);
    }

    /// Detect and expand macro definitions in the pending suffix.
    fn find_macros(&mut self, tm: &mut TermManager) {
        tracing::debug!("find macros");
        self.find_macros_core(tm);
    }

    /// Expand macros inherited from an enclosing scope.
    fn expand_macros(&mut self, tm: &mut TermManager) {
        tracing::debug!("expand macros");
        self.find_macros_core(tm);
    }

    /// Quasi-macro detection to a fixpoint.
    fn apply_quasi_macros(&mut self, tm: &mut TermManager) {
        tracing::debug!("quasi macros");
        loop {
            let pending: Vec<(TermId, Option<ProofId>)> = (self.qhead..self.formulas.len())
                .map(|i| (self.formulas[i], self.proof_at(i)))
                .collect();
            let mut results = Vec::new();
            let mut proc = QuasiMacros::new();
            let progress = proc.find(tm, &mut self.macro_manager, &pending, &mut results);
            if !progress {
                break;
            }
            let mut out = Assertions::default();
            for (e, pr) in results {
                self.push_assertion(tm, e, pr, &mut out);
            }
            self.swap_suffix(tm, out);
        }
        self.reduce_and_solve(tm);
    }

    fn pull_cheap_ite_trees(&mut self, tm: &mut TermManager) {
        let mut functor = PullCheapIteTree::new();
        self.rewrite_pass("pull-cheap-ite-trees", tm, |tm, e| functor.apply(tm, e));
    }

    fn pull_nested_quantifiers(&mut self, tm: &mut TermManager) {
        let mut functor = PullNestedQuantifiers::new();
        self.rewrite_pass("pull-nested-quantifiers", tm, |tm, e| functor.apply(tm, e));
    }

    fn lift_ite(&mut self, tm: &mut TermManager) {
        let conservative = self.params.lift_ite == LiftIteMode::Conservative;
        let mut functor = PushAppIte::new(conservative, false);
        self.rewrite_in_place("lift-ite", tm, |tm, e| functor.apply(tm, e));
        self.reduce_and_solve(tm);
    }

    fn ng_lift_ite(&mut self, tm: &mut TermManager) {
        let conservative = self.params.ng_lift_ite == LiftIteMode::Conservative;
        let mut functor = PushAppIte::new(conservative, true);
        self.rewrite_in_place("ng-lift-ite", tm, |tm, e| functor.apply(tm, e));
        self.reduce_and_solve(tm);
    }

    /// Name away non-Boolean if-then-else subterms; defining formulas join
    /// the pending suffix.
    fn eliminate_term_ite(&mut self, tm: &mut TermManager) {
        tracing::debug!("eliminating term if-then-else");
        let pending: Vec<(TermId, Option<ProofId>)> = (self.qhead..self.formulas.len())
            .map(|i| (self.formulas[i], self.proof_at(i)))
            .collect();
        let mut results = Vec::new();
        {
            let mut elim = ElimTermIte::new(&mut self.defined_names);
            for &(n, pr) in &pending {
                let (new_n, aux) = elim.apply(tm, n);
                results.push((n, pr, new_n, aux));
            }
        }
        let mut out = Assertions::default();
        for (n, pr, new_n, aux) in results {
            for (a, apr) in aux {
                self.push_assertion(tm, a, apr, &mut out);
            }
            if new_n == n {
                self.push_assertion(tm, n, pr, &mut out);
            } else {
                let rw = tm.mk_rewrite(n, new_n);
                let mp = tm.mk_modus_ponens(pr, rw);
                self.push_assertion(tm, new_n, mp, &mut out);
            }
        }
        self.swap_suffix(tm, out);
        self.reduce_and_solve(tm);
    }

    /// Replace injectivity axioms in place; only matching quantified
    /// formulas are touched.
    fn refine_inj_axiom(&mut self, tm: &mut TermManager) {
        tracing::debug!("refine injectivity");
        for i in self.qhead..self.formulas.len() {
            let n = self.formulas[i];
            if let Some(new_n) = refine_inj_axiom(tm, n) {
                self.formulas[i] = new_n;
                if tm.proofs_enabled() {
                    let pr = self.proof_at(i);
                    let rw = tm.mk_rewrite(n, new_n);
                    let mp = tm.mk_modus_ponens(pr, rw);
                    self.proofs[i] = mp;
                }
            }
        }
    }

    fn apply_distribute_forall(&mut self, tm: &mut TermManager) {
        let mut functor = DistributeForall::new();
        self.rewrite_pass("distribute-forall", tm, |tm, e| functor.apply(tm, e));
        self.reduce_and_solve(tm);
    }

    fn apply_bit2int(&mut self, tm: &mut TermManager) {
        let mut functor = Bit2Int::new();
        let changed = self.rewrite_pass("bit2int", tm, |tm, e| functor.apply(tm, e));
        if changed {
            self.reduce_and_solve(tm);
        }
    }

    fn cheap_quant_fourier_motzkin(&mut self, tm: &mut TermManager) {
        let mut functor = ElimBounds::new();
        let changed = self.rewrite_pass("cheap-fourier-motzkin", tm, |tm, e| functor.apply(tm, e));
        if changed {
            self.reduce_and_solve(tm);
        }
    }

    fn infer_patterns(&mut self, tm: &mut TermManager) {
        let mut functor = PatternInference::new();
        self.rewrite_pass("pattern-inference", tm, |tm, e| functor.apply(tm, e));
    }

    /// Re-associate bit-vector chains for sharing, then renormalize.
    fn max_bv_sharing(&mut self, tm: &mut TermManager) {
        let mut sharing = std::mem::take(&mut self.bv_sharing);
        self.rewrite_in_place("max-bv-sharing", tm, |tm, e| sharing.apply(tm, e));
        self.bv_sharing = sharing;
        self.reduce_asserted_formulas(tm);
    }

    fn elim_bvs_from_quantifiers(&mut self, tm: &mut TermManager) {
        let mut functor = BvQuantifierElim::new();
        let changed =
            self.rewrite_pass("elim-bvs-from-quantifiers", tm, |tm, e| functor.apply(tm, e));
        if changed {
            self.reduce_and_solve(tm);
        }
    }

    // ------------------------------------------------------------------
    // Display
    // ------------------------------------------------------------------

    /// Human-readable dump with the committed head marked.
    pub fn display<W: fmt::Write>(&self, tm: &TermManager, out: &mut W) -> fmt::Result {
        writeln!(out, "asserted formulas:")?;
        for (i, &f) in self.formulas.iter().enumerate() {
            if i == self.qhead {
                writeln!(out, "[HEAD] ==>")?;
            }
            writeln!(out, "{}", tm.display_term(f))?;
        }
        writeln!(out, "inconsistent: {}", self.inconsistent())
    }

    /// Low-level dump: each subterm definition printed once, then the
    /// formula handles. `visited` carries over between calls so repeated
    /// dumps stay terse.
    pub fn display_ll<W: fmt::Write>(
        &self,
        tm: &TermManager,
        out: &mut W,
        visited: &mut FxHashSet<TermId>,
    ) -> fmt::Result {
        if self.formulas.is_empty() {
            return Ok(());
        }
        for &f in &self.formulas {
            Self::display_ll_term(tm, f, out, visited)?;
        }
        writeln!(out, "asserted formulas:")?;
        for &f in &self.formulas {
            write!(out, "#{} ", f.raw())?;
        }
        writeln!(out)
    }

    fn display_ll_term<W: fmt::Write>(
        tm: &TermManager,
        t: TermId,
        out: &mut W,
        visited: &mut FxHashSet<TermId>,
    ) -> fmt::Result {
        if !visited.insert(t) {
            return Ok(());
        }
        for child in tm.children(t) {
            Self::display_ll_term(tm, child, out, visited)?;
        }
        writeln!(out, "#{} := {}", t.raw(), tm.display_term(t))
    }
}
