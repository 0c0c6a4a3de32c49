//! Proof terms.
//!
//! Each rewriting step optionally produces a proof whose conclusion equates
//! the input and output formula; a pass composes them with the incoming
//! assertion proof via modus ponens. Proof nodes live in their own arena
//! inside the term manager and record their conclusion explicitly, so a
//! checker can validate a chain without re-deriving it.
//!
//! When proof production is disabled every constructor returns `None`; the
//! `Option<ProofId>` sentinel costs nothing downstream.

use smallvec::SmallVec;

use crate::ast::TermId;

/// Stable handle to a proof node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProofId(u32);

impl ProofId {
    /// Create a proof ID from a raw index.
    #[must_use]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw index.
    #[must_use]
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Inference rule of a proof node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofRule {
    /// Leaf: the formula was asserted by the caller.
    Asserted,
    /// `a = b` justified by the simplifier or a rewriting functor.
    Rewrite,
    /// From `phi` and `phi = psi`, conclude `psi`.
    ModusPonens,
    /// From `a = b` and `b = c`, conclude `a = c`.
    Transitivity,
    /// From `a = b`, conclude `b = a`.
    Symmetry,
    /// From `phi`, conclude `phi = true`.
    IffTrue,
    /// From `not phi`, conclude `phi = false`.
    IffFalse,
    /// Leaf: defining equation of an introduced name.
    DefIntro,
}

/// A proof node: rule, premises, and the concluded formula.
#[derive(Debug, Clone)]
pub struct ProofNode {
    /// The inference rule.
    pub rule: ProofRule,
    /// Premise proofs, in rule order.
    pub premises: SmallVec<[ProofId; 2]>,
    /// The formula this node concludes.
    pub conclusion: TermId,
}

/// Arena of proof nodes.
#[derive(Debug, Default)]
pub(crate) struct ProofArena {
    nodes: Vec<ProofNode>,
}

impl ProofArena {
    pub(crate) fn alloc(
        &mut self,
        rule: ProofRule,
        premises: SmallVec<[ProofId; 2]>,
        conclusion: TermId,
    ) -> ProofId {
        let id = ProofId(u32::try_from(self.nodes.len()).expect("proof arena overflow"));
        self.nodes.push(ProofNode {
            rule,
            premises,
            conclusion,
        });
        id
    }

    pub(crate) fn get(&self, id: ProofId) -> Option<&ProofNode> {
        self.nodes.get(id.0 as usize)
    }
}
