//! Silica Preprocess - Assertion Preprocessing Pipeline
//!
//! This crate ingests user-asserted formulas, simplifies and rewrites them
//! through a configurable cascade of passes, and hands the normalized
//! result to a downstream decision procedure:
//! - [`Simplifier`]: memoizing bottom-up rewriter over theory plugins
//! - [`AssertedFormulas`]: the assertion store, scope stack, and the
//!   `reduce()` pipeline orchestrator
//! - Macro detection/expansion, NNF conversion, ITE normalization,
//!   quantifier rewrites, and bit-vector sharing
//!
//! # Examples
//!
//! ```
//! use num_bigint::BigInt;
//! use silica_core::{CancelFlag, PreprocessParams, TermManager};
//! use silica_preprocess::AssertedFormulas;
//!
//! let mut tm = TermManager::new();
//! let mut af = AssertedFormulas::new(PreprocessParams::default(), CancelFlag::new());
//!
//! let x = tm.mk_var("x", tm.sorts.int_sort);
//! let three = tm.mk_int(BigInt::from(3));
//! let eq = tm.mk_eq(x, three);
//! af.assert_expr(eq, &mut tm);
//! af.reduce(&mut tm);
//! af.commit(&mut tm);
//!
//! assert!(!af.inconsistent());
//! assert_eq!(af.get_assertions().len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod asserted;
pub mod bv_sharing;
pub mod defined_names;
pub mod features;
pub mod macros;
pub mod nnf;
pub mod plugins;
pub mod rewrites;
pub mod simplify;

pub use asserted::AssertedFormulas;
pub use bv_sharing::MaxBvSharing;
pub use defined_names::DefinedNames;
pub use features::StaticFeatures;
pub use macros::{MacroDef, MacroFinder, MacroManager, QuasiMacros};
pub use nnf::Nnf;
pub use simplify::{Simplifier, SimplifierPlugin, SimplifyCtx};
