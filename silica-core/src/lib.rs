//! Silica Core - AST, Sorts, and Proof Terms for the Silica preprocessor
//!
//! This crate provides the foundational types for the Silica assertion
//! preprocessing library:
//! - Arena-allocated, hash-consed terms with stable [`TermId`] handles
//! - Sort system
//! - Proof terms witnessing rewriting steps
//! - Preprocessing configuration and cooperative cancellation
//!
//! # Examples
//!
//! ## Creating terms
//!
//! ```
//! use silica_core::ast::TermManager;
//! use num_bigint::BigInt;
//!
//! let mut tm = TermManager::new();
//!
//! // Boolean terms
//! let p = tm.mk_var("p", tm.sorts.bool_sort);
//! let q = tm.mk_var("q", tm.sorts.bool_sort);
//! let and_pq = tm.mk_and(vec![p, q]);
//!
//! // Integer terms
//! let x = tm.mk_var("x", tm.sorts.int_sort);
//! let five = tm.mk_int(BigInt::from(5));
//! let ge = tm.mk_ge(x, five);
//! assert_eq!(tm.display_term(ge), "(>= x 5)");
//! # let _ = and_pq;
//! ```
//!
//! ## Proof terms
//!
//! ```
//! use silica_core::ast::TermManager;
//!
//! let mut tm = TermManager::with_proofs(true);
//! let p = tm.mk_var("p", tm.sorts.bool_sort);
//! let q = tm.mk_var("q", tm.sorts.bool_sort);
//!
//! let asserted = tm.mk_asserted(p);
//! let rewrite = tm.mk_rewrite(p, q);
//! let composed = tm.mk_modus_ponens(asserted, rewrite).unwrap();
//! assert_eq!(tm.proof_conclusion(composed), Some(q));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod ast;
pub mod config;
pub mod error;
pub mod proof;
pub mod resource;
pub mod sort;

pub use ast::{Term, TermId, TermKind, TermManager};
pub use config::{LiftIteMode, PreprocessParams};
pub use error::{Error, Result};
pub use proof::{ProofId, ProofNode, ProofRule};
pub use resource::CancelFlag;
pub use sort::{Sort, SortId, SortKind, SortStore};
