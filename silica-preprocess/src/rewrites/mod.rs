//! Rewriting functors used by the pipeline passes.
//!
//! Each functor is a total transformer `(tm, e) -> e'`; the assertion
//! store's rewrite-pass template supplies proof composition and the
//! swap-suffix bookkeeping around them.

mod bit2int;
mod bv_elim;
mod distribute_forall;
mod elim_bounds;
mod elim_term_ite;
mod inj_axiom;
mod pattern_inference;
mod pull_ite;
mod pull_quant;
mod push_app_ite;

pub use bit2int::Bit2Int;
pub use bv_elim::BvQuantifierElim;
pub use distribute_forall::DistributeForall;
pub use elim_bounds::ElimBounds;
pub use elim_term_ite::ElimTermIte;
pub use inj_axiom::refine_inj_axiom;
pub use pattern_inference::PatternInference;
pub use pull_ite::PullCheapIteTree;
pub use pull_quant::PullNestedQuantifiers;
pub use push_app_ite::PushAppIte;
