//! Bit-vector subterm sharing.
//!
//! Re-associates chains of associative-commutative bit-vector operators so
//! that equal operand multisets rebuild into equal trees: operands are
//! flattened, ordered by a stable key, and folded while preferring operand
//! pairs that were already built. The pair cache is scoped alongside the
//! assertion store.

use rustc_hash::{FxHashMap, FxHashSet};
use silica_core::ast::{TermId, TermKind, TermManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum BvOp {
    Add,
    Mul,
    And,
    Or,
    Xor,
}

impl BvOp {
    fn of(kind: &TermKind) -> Option<BvOp> {
        match kind {
            TermKind::BvAdd(..) => Some(BvOp::Add),
            TermKind::BvMul(..) => Some(BvOp::Mul),
            TermKind::BvAnd(..) => Some(BvOp::And),
            TermKind::BvOr(..) => Some(BvOp::Or),
            TermKind::BvXor(..) => Some(BvOp::Xor),
            _ => None,
        }
    }

    fn build(self, tm: &mut TermManager, a: TermId, b: TermId) -> TermId {
        match self {
            BvOp::Add => tm.mk_bv_add(a, b),
            BvOp::Mul => tm.mk_bv_mul(a, b),
            BvOp::And => tm.mk_bv_and(a, b),
            BvOp::Or => tm.mk_bv_or(a, b),
            BvOp::Xor => tm.mk_bv_xor(a, b),
        }
    }
}

/// Scoped, monotone analyzer maximizing sharing of bit-vector operator
/// chains.
#[derive(Debug, Default)]
pub struct MaxBvSharing {
    pairs: FxHashSet<(BvOp, TermId, TermId)>,
    trail: Vec<(BvOp, TermId, TermId)>,
    scopes: Vec<usize>,
}

impl MaxBvSharing {
    /// Create an analyzer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrite every AC bit-vector chain in `e` into its shared shape.
    pub fn apply(&mut self, tm: &mut TermManager, e: TermId) -> TermId {
        let mut cache = FxHashMap::default();
        self.apply_rec(tm, e, &mut cache)
    }

    fn apply_rec(
        &mut self,
        tm: &mut TermManager,
        e: TermId,
        cache: &mut FxHashMap<TermId, TermId>,
    ) -> TermId {
        if let Some(&hit) = cache.get(&e) {
            return hit;
        }
        let op = tm.get(e).and_then(|t| BvOp::of(&t.kind));
        let result = match op {
            Some(op) => {
                let mut operands = Vec::new();
                self.flatten(tm, op, e, &mut operands, cache);
                operands.sort_by_key(|t| t.raw());
                self.rebuild_chain(tm, op, operands)
            }
            None => {
                let children = tm.children(e);
                let new: Vec<TermId> = children
                    .into_iter()
                    .map(|c| self.apply_rec(tm, c, cache))
                    .collect();
                tm.rebuild(e, &new)
            }
        };
        cache.insert(e, result);
        result
    }

    fn flatten(
        &mut self,
        tm: &mut TermManager,
        op: BvOp,
        e: TermId,
        out: &mut Vec<TermId>,
        cache: &mut FxHashMap<TermId, TermId>,
    ) {
        let children = tm.children(e);
        for child in children {
            if tm.get(child).and_then(|t| BvOp::of(&t.kind)) == Some(op) {
                self.flatten(tm, op, child, out, cache);
            } else {
                out.push(self.apply_rec(tm, child, cache));
            }
        }
    }

    /// Fold sorted operands, combining an already-shared pair first when
    /// one exists.
    fn rebuild_chain(&mut self, tm: &mut TermManager, op: BvOp, mut operands: Vec<TermId>) -> TermId {
        while operands.len() > 1 {
            let mut pick = None;
            'outer: for i in 0..operands.len() {
                for j in (i + 1)..operands.len() {
                    if self.pairs.contains(&(op, operands[i], operands[j])) {
                        pick = Some((i, j));
                        break 'outer;
                    }
                }
            }
            let (i, j) = pick.unwrap_or((0, 1));
            let b = operands.remove(j);
            let a = operands.remove(i);
            let combined = op.build(tm, a, b);
            if self.pairs.insert((op, a, b)) {
                self.trail.push((op, a, b));
            }
            operands.insert(0, combined);
        }
        operands.pop().unwrap_or_else(|| tm.mk_true())
    }

    /// Open a scope.
    pub fn push_scope(&mut self) {
        self.scopes.push(self.trail.len());
    }

    /// Close `n` scopes, forgetting pairs recorded inside them.
    pub fn pop_scope(&mut self, n: usize) {
        for _ in 0..n {
            let Some(mark) = self.scopes.pop() else {
                break;
            };
            while self.trail.len() > mark {
                if let Some(pair) = self.trail.pop() {
                    self.pairs.remove(&pair);
                }
            }
        }
    }

    /// Forget everything.
    pub fn reset(&mut self) {
        self.pairs.clear();
        self.trail.clear();
        self.scopes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reassociation_is_canonical() {
        let mut tm = TermManager::new();
        let mut sharing = MaxBvSharing::new();
        let bv8 = tm.sorts.bitvec(8);
        let a = tm.mk_var("a", bv8);
        let b = tm.mk_var("b", bv8);
        let c = tm.mk_var("c", bv8);

        // (a + b) + c and a + (b + c) rebuild identically
        let ab = tm.mk_bv_add(a, b);
        let left = tm.mk_bv_add(ab, c);
        let bc = tm.mk_bv_add(b, c);
        let right = tm.mk_bv_add(a, bc);

        let left_shared = sharing.apply(&mut tm, left);
        let right_shared = sharing.apply(&mut tm, right);
        assert_eq!(left_shared, right_shared);
    }

    #[test]
    fn test_known_pairs_are_preferred() {
        let mut tm = TermManager::new();
        let mut sharing = MaxBvSharing::new();
        let bv8 = tm.sorts.bitvec(8);
        let a = tm.mk_var("a", bv8);
        let b = tm.mk_var("b", bv8);
        let c = tm.mk_var("c", bv8);

        // seed the pair (b, c), then a + b + c groups (b + c) first
        let bc = tm.mk_bv_add(b, c);
        sharing.apply(&mut tm, bc);

        let ab = tm.mk_bv_add(a, b);
        let abc = tm.mk_bv_add(ab, c);
        let shared = sharing.apply(&mut tm, abc);
        let expected = tm.mk_bv_add(bc, a);
        // operand order within the rebuilt pair follows handle order
        let alt = tm.mk_bv_add(a, bc);
        assert!(shared == expected || shared == alt);
    }

    #[test]
    fn test_scope_pop_forgets_pairs() {
        let mut tm = TermManager::new();
        let mut sharing = MaxBvSharing::new();
        let bv8 = tm.sorts.bitvec(8);
        let a = tm.mk_var("a", bv8);
        let b = tm.mk_var("b", bv8);
        sharing.push_scope();
        let ab = tm.mk_bv_add(a, b);
        sharing.apply(&mut tm, ab);
        assert!(!sharing.pairs.is_empty());
        sharing.pop_scope(1);
        assert!(sharing.pairs.is_empty());
    }
}
