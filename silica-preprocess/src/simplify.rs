//! Simplifier core.
//!
//! Dispatches each term bottom-up through a fixed chain of theory plugins
//! and memoizes results. The memo cache doubles as an injectable rewrite
//! environment: the propagation passes seed it with `x -> value` entries via
//! [`Simplifier::cache_result`] and re-run the simplifier. Any pass that
//! seeds the cache must flush it afterwards, otherwise the seeded variables
//! are silently rewritten away in later, unrelated passes.

use rustc_hash::FxHashMap;
use silica_core::ast::{TermId, TermKind, TermManager};
use silica_core::proof::ProofId;

use crate::plugins::{
    ArithPlugin, ArrayPlugin, BasicPlugin, BvPlugin, DatatypePlugin, FpPlugin, SeqPlugin,
};

/// Recursion guard for pathological nesting.
const MAX_DEPTH: usize = 512;
/// Plugin chain re-runs per node until fixpoint.
const MAX_ROUNDS: usize = 4;

/// Per-call context handed to plugins.
#[derive(Debug, Clone, Copy)]
pub struct SimplifyCtx {
    /// Rewrite conjunctions into negated disjunctions.
    pub eliminate_and: bool,
    /// Light pre-simplification mode.
    pub presimp: bool,
}

/// A theory-specific rewriter.
///
/// Plugins must be idempotent on their fixed points, must only produce
/// terms equal to their input under the theory, and must leave kinds they
/// do not recognize alone (returning `None`).
pub trait SimplifierPlugin {
    /// Plugin name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Whether this plugin also runs in pre-simplification mode.
    fn cheap(&self) -> bool {
        false
    }

    /// Rewrite `t` once, or return `None` when no rule applies.
    fn reduce(&self, tm: &mut TermManager, t: TermId, ctx: &SimplifyCtx) -> Option<TermId>;
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    result: TermId,
    proof: Option<ProofId>,
}

/// Memoizing bottom-up rewriter over a chain of theory plugins.
pub struct Simplifier {
    plugins: Vec<Box<dyn SimplifierPlugin>>,
    cache: FxHashMap<TermId, CacheEntry>,
    eliminate_and: bool,
    presimp: bool,
    bv_invoked: bool,
}

impl std::fmt::Debug for Simplifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simplifier")
            .field("plugins", &self.plugins.len())
            .field("cache_size", &self.cache.len())
            .field("eliminate_and", &self.eliminate_and)
            .field("presimp", &self.presimp)
            .finish()
    }
}

impl Simplifier {
    /// Create the main simplifier with the full plugin chain.
    #[must_use]
    pub fn new() -> Self {
        Self::with_mode(false)
    }

    /// Create the light pre-simplifier applied on freshly asserted
    /// formulas: only the cheap plugins run, and quantifier bodies are not
    /// entered.
    #[must_use]
    pub fn presimp() -> Self {
        Self::with_mode(true)
    }

    fn with_mode(presimp: bool) -> Self {
        let mut s = Self {
            plugins: Vec::new(),
            cache: FxHashMap::default(),
            eliminate_and: false,
            presimp,
            bv_invoked: false,
        };
        s.register_plugin(Box::new(BasicPlugin));
        s.register_plugin(Box::new(ArithPlugin));
        s.register_plugin(Box::new(ArrayPlugin));
        s.register_plugin(Box::new(BvPlugin));
        s.register_plugin(Box::new(DatatypePlugin));
        s.register_plugin(Box::new(FpPlugin));
        s.register_plugin(Box::new(SeqPlugin));
        s
    }

    /// Append a plugin to the chain.
    pub fn register_plugin(&mut self, plugin: Box<dyn SimplifierPlugin>) {
        self.plugins.push(plugin);
    }

    /// Whether conjunctions are being rewritten away.
    #[must_use]
    pub fn eliminate_and(&self) -> bool {
        self.eliminate_and
    }

    /// Toggle conjunction elimination. Flushes the cache on change: cached
    /// results computed under the other policy are no longer valid.
    pub fn set_eliminate_and(&mut self, flag: bool) {
        if self.eliminate_and == flag {
            return;
        }
        tracing::trace!("eliminate_and -> {flag}, flushing cache");
        self.flush_cache();
        self.eliminate_and = flag;
    }

    /// Whether the bit-vector plugin has ever been dispatched.
    #[must_use]
    pub fn bv_invoked(&self) -> bool {
        self.bv_invoked
    }

    /// Drop all memoized results.
    pub fn flush_cache(&mut self) {
        self.cache.clear();
    }

    /// Probe the cache.
    #[must_use]
    pub fn is_cached(&self, e: TermId) -> bool {
        self.cache.contains_key(&e)
    }

    /// Inject an external rewrite `a -> b` justified by `proof`. Used by
    /// the propagation passes; the caller owns flushing it back out.
    pub fn cache_result(&mut self, a: TermId, b: TermId, proof: Option<ProofId>) {
        self.cache.insert(a, CacheEntry { result: b, proof });
    }

    /// Simplify `e`, returning the result and a proof of `e = result`
    /// when proofs are enabled and the term changed.
    pub fn simplify(&mut self, tm: &mut TermManager, e: TermId) -> (TermId, Option<ProofId>) {
        // A seeded cache entry carries its own justification; a memo hit
        // from an earlier recursion gets a fresh rewrite step, otherwise
        // the caller would compose a stale proof.
        if let Some(&entry) = self.cache.get(&e) {
            if entry.result == e || entry.proof.is_some() {
                return (entry.result, entry.proof);
            }
            let proof = tm.mk_rewrite(e, entry.result);
            if let Some(slot) = self.cache.get_mut(&e) {
                slot.proof = proof;
            }
            return (entry.result, proof);
        }
        let result = self.simplify_rec(tm, e, 0);
        if result == e {
            (e, None)
        } else {
            (result, tm.mk_rewrite(e, result))
        }
    }

    fn simplify_rec(&mut self, tm: &mut TermManager, e: TermId, depth: usize) -> TermId {
        if depth > MAX_DEPTH {
            return e;
        }
        if let Some(entry) = self.cache.get(&e) {
            return entry.result;
        }
        if is_bv_kind(tm, e) {
            self.bv_invoked = true;
        }

        let skip_children = self.presimp
            && matches!(
                tm.get(e).map(|t| &t.kind),
                Some(TermKind::Forall { .. }) | Some(TermKind::Exists { .. })
            );
        let rebuilt = if skip_children {
            e
        } else {
            let children = tm.children(e);
            let new: Vec<TermId> = children
                .into_iter()
                .map(|c| self.simplify_rec(tm, c, depth + 1))
                .collect();
            tm.rebuild(e, &new)
        };

        let mut cur = rebuilt;
        let ctx = SimplifyCtx {
            eliminate_and: self.eliminate_and,
            presimp: self.presimp,
        };
        for _ in 0..MAX_ROUNDS {
            let mut changed = false;
            for plugin in &self.plugins {
                if ctx.presimp && !plugin.cheap() {
                    continue;
                }
                if let Some(next) = plugin.reduce(tm, cur, &ctx) {
                    if next != cur {
                        cur = next;
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }

        self.cache.insert(
            e,
            CacheEntry {
                result: cur,
                proof: None,
            },
        );
        cur
    }
}

impl Default for Simplifier {
    fn default() -> Self {
        Self::new()
    }
}

fn is_bv_kind(tm: &TermManager, e: TermId) -> bool {
    matches!(
        tm.get(e).map(|t| &t.kind),
        Some(
            TermKind::BitVecConst { .. }
                | TermKind::BvAdd(..)
                | TermKind::BvMul(..)
                | TermKind::BvAnd(..)
                | TermKind::BvOr(..)
                | TermKind::BvXor(..)
                | TermKind::BvNot(_)
                | TermKind::BvNeg(_)
                | TermKind::BvConcat(..)
                | TermKind::BvExtract { .. }
                | TermKind::BvShl(..)
                | TermKind::BvLshr(..)
                | TermKind::BvUlt(..)
                | TermKind::BvUle(..)
                | TermKind::Bv2Int(_)
                | TermKind::Int2Bv { .. }
        )
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn test_constant_folding_bottom_up() {
        let mut tm = TermManager::new();
        let mut simp = Simplifier::new();
        let one = tm.mk_int(BigInt::from(1));
        let two = tm.mk_int(BigInt::from(2));
        let three = tm.mk_int(BigInt::from(3));
        let sum = tm.mk_add(vec![one, two]);
        let eq = tm.mk_eq(sum, three);
        let (result, _) = simp.simplify(&mut tm, eq);
        assert!(tm.is_true(result));
    }

    #[test]
    fn test_memoization() {
        let mut tm = TermManager::new();
        let mut simp = Simplifier::new();
        let one = tm.mk_int(BigInt::from(1));
        let two = tm.mk_int(BigInt::from(2));
        let sum = tm.mk_add(vec![one, two]);
        let (r1, _) = simp.simplify(&mut tm, sum);
        assert!(simp.is_cached(sum));
        let (r2, _) = simp.simplify(&mut tm, sum);
        assert_eq!(r1, r2);
        simp.flush_cache();
        assert!(!simp.is_cached(sum));
    }

    #[test]
    fn test_cache_result_acts_as_substitution() {
        let mut tm = TermManager::new();
        let mut simp = Simplifier::new();
        let x = tm.mk_var("x", tm.sorts.int_sort);
        let y = tm.mk_var("y", tm.sorts.int_sort);
        let three = tm.mk_int(BigInt::from(3));
        let sum = tm.mk_add(vec![x, y]);
        let zero = tm.mk_int(BigInt::from(0));
        let gt = tm.mk_gt(sum, zero);

        simp.cache_result(x, three, None);
        let (result, _) = simp.simplify(&mut tm, gt);
        // the numeral moves to its canonical last position
        let expected_sum = tm.mk_add(vec![y, three]);
        let expected = tm.mk_gt(expected_sum, zero);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_eliminate_and_flag_flushes_cache() {
        let mut tm = TermManager::new();
        let mut simp = Simplifier::new();
        let p = tm.mk_var("p", tm.sorts.bool_sort);
        let q = tm.mk_var("q", tm.sorts.bool_sort);
        let and_pq = tm.mk_and(vec![p, q]);

        let (kept, _) = simp.simplify(&mut tm, and_pq);
        assert_eq!(kept, and_pq);
        assert!(simp.is_cached(and_pq));

        simp.set_eliminate_and(true);
        assert!(!simp.is_cached(and_pq));
        let (eliminated, _) = simp.simplify(&mut tm, and_pq);
        let not_p = tm.mk_not(p);
        let not_q = tm.mk_not(q);
        let or = tm.mk_or(vec![not_p, not_q]);
        let expected = tm.mk_not(or);
        assert_eq!(eliminated, expected);
    }

    #[test]
    fn test_presimp_skips_quantifier_bodies() {
        let mut tm = TermManager::new();
        let mut pre = Simplifier::presimp();
        let int = tm.sorts.int_sort;
        let x_sym = tm.intern("x");
        let x = tm.mk_var("x", int);
        let one = tm.mk_int(BigInt::from(1));
        let two = tm.mk_int(BigInt::from(2));
        let sum = tm.mk_add(vec![one, two]);
        let body = tm.mk_gt(x, sum);
        let q = tm.mk_forall(vec![(x_sym, int)], vec![], body);
        let (result, _) = pre.simplify(&mut tm, q);
        // the body's (+ 1 2) is left alone in presimp mode
        assert_eq!(result, q);
    }

    #[test]
    fn test_has_bv_tracking() {
        let mut tm = TermManager::new();
        let mut simp = Simplifier::new();
        let x = tm.mk_var("x", tm.sorts.int_sort);
        let zero = tm.mk_int(BigInt::from(0));
        let gt = tm.mk_gt(x, zero);
        simp.simplify(&mut tm, gt);
        assert!(!simp.bv_invoked());

        let bv_sort = tm.sorts.bitvec(8);
        let a = tm.mk_var("a", bv_sort);
        let b = tm.mk_var("b", bv_sort);
        let add = tm.mk_bv_add(a, b);
        let c = tm.mk_var("c", bv_sort);
        let eq = tm.mk_eq(add, c);
        simp.simplify(&mut tm, eq);
        assert!(simp.bv_invoked());
    }

    #[test]
    fn test_rewrite_proof_conclusion() {
        let mut tm = TermManager::with_proofs(true);
        let mut simp = Simplifier::new();
        let one = tm.mk_int(BigInt::from(1));
        let two = tm.mk_int(BigInt::from(2));
        let sum = tm.mk_add(vec![one, two]);
        let (result, proof) = simp.simplify(&mut tm, sum);
        let three = tm.mk_int(BigInt::from(3));
        assert_eq!(result, three);
        let concl = tm.proof_conclusion(proof.unwrap()).unwrap();
        let expected = tm.mk_eq(sum, three);
        assert_eq!(concl, expected);
    }
}
