//! Static formula features.
//!
//! Rough per-theory counts over the asserted formulas, dumped on commit
//! when `display_features` is set. Downstream strategy selection reads
//! these to pick a solver configuration.

use rustc_hash::FxHashSet;
use silica_core::ast::{TermId, TermKind, TermManager};
use std::fmt;

/// Accumulated formula statistics.
#[derive(Debug, Clone, Default)]
pub struct StaticFeatures {
    /// Formulas collected.
    pub num_formulas: usize,
    /// Distinct subterms seen.
    pub num_exprs: usize,
    /// Quantifier nodes.
    pub num_quantifiers: usize,
    /// Arithmetic operator nodes.
    pub num_arith: usize,
    /// Bit-vector operator nodes.
    pub num_bv: usize,
    /// Array operator nodes.
    pub num_arrays: usize,
    /// Uninterpreted applications.
    pub num_uf: usize,
    /// Deepest formula seen.
    pub max_depth: usize,
}

impl StaticFeatures {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything collected so far.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fold one formula into the accumulator.
    pub fn collect(&mut self, tm: &TermManager, e: TermId) {
        self.num_formulas += 1;
        let mut visited = FxHashSet::default();
        let depth = self.walk(tm, e, &mut visited);
        self.max_depth = self.max_depth.max(depth);
    }

    fn walk(&mut self, tm: &TermManager, e: TermId, visited: &mut FxHashSet<TermId>) -> usize {
        if !visited.insert(e) {
            return 0;
        }
        self.num_exprs += 1;
        match tm.get(e).map(|t| &t.kind) {
            Some(TermKind::Forall { .. }) | Some(TermKind::Exists { .. }) => {
                self.num_quantifiers += 1;
            }
            Some(
                TermKind::Add(_)
                | TermKind::Sub(..)
                | TermKind::Mul(_)
                | TermKind::Neg(_)
                | TermKind::Div(..)
                | TermKind::Mod(..)
                | TermKind::Le(..)
                | TermKind::Lt(..)
                | TermKind::Ge(..)
                | TermKind::Gt(..),
            ) => self.num_arith += 1,
            Some(
                TermKind::BvAdd(..)
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
                | TermKind::Int2Bv { .. },
            ) => self.num_bv += 1,
            Some(TermKind::Select(..) | TermKind::Store(..)) => self.num_arrays += 1,
            Some(TermKind::Apply { .. }) => self.num_uf += 1,
            _ => {}
        }
        let mut max_child = 0;
        for child in tm.children(e) {
            max_child = max_child.max(self.walk(tm, child, visited));
        }
        1 + max_child
    }
}

impl fmt::Display for StaticFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "num-formulas:    {}", self.num_formulas)?;
        writeln!(f, "num-exprs:       {}", self.num_exprs)?;
        writeln!(f, "num-quantifiers: {}", self.num_quantifiers)?;
        writeln!(f, "num-arith:       {}", self.num_arith)?;
        writeln!(f, "num-bv:          {}", self.num_bv)?;
        writeln!(f, "num-arrays:      {}", self.num_arrays)?;
        writeln!(f, "num-uf:          {}", self.num_uf)?;
        write!(f, "max-depth:       {}", self.max_depth)
    }
}
