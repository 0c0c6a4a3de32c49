//! Arena-allocated, hash-consed terms.
//!
//! A [`TermManager`] owns every term ever built; a [`TermId`] is a stable
//! handle and handle equality is term equality. Terms form a DAG; smart
//! constructors (`mk_*`) intern structurally, with rewriting left to the
//! simplifier. Proof terms share the manager (see [`crate::proof`]).

use lasso::{Rodeo, Spur};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Zero};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::fmt::Write as _;

use crate::error::{Error, Result};
use crate::proof::{ProofArena, ProofId, ProofNode, ProofRule};
use crate::sort::{SortId, SortKind, SortStore};

/// Stable handle to an interned term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(pub u32);

impl TermId {
    /// Create a term ID from a raw index.
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

/// The shape of a term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TermKind {
    /// Boolean true.
    True,
    /// Boolean false.
    False,
    /// Integer numeral.
    IntConst(BigInt),
    /// Real numeral.
    RealConst(BigRational),
    /// Bit-vector numeral; `value` is canonical in `[0, 2^width)`.
    BitVecConst {
        /// The numeral value.
        value: BigInt,
        /// Bit width.
        width: u32,
    },
    /// String literal.
    StringLit(String),
    /// Free constant.
    Var(Spur),
    /// Uninterpreted function application.
    Apply {
        /// Function symbol.
        func: Spur,
        /// Arguments.
        args: SmallVec<[TermId; 4]>,
    },
    /// Boolean negation.
    Not(TermId),
    /// N-ary conjunction.
    And(Vec<TermId>),
    /// N-ary disjunction.
    Or(Vec<TermId>),
    /// Implication.
    Implies(TermId, TermId),
    /// Exclusive or.
    Xor(TermId, TermId),
    /// If-then-else (Boolean or term-level).
    Ite(TermId, TermId, TermId),
    /// Equality (doubles as iff at the Boolean sort).
    Eq(TermId, TermId),
    /// Pairwise disequality.
    Distinct(Vec<TermId>),
    /// N-ary addition.
    Add(Vec<TermId>),
    /// Subtraction.
    Sub(TermId, TermId),
    /// N-ary multiplication.
    Mul(Vec<TermId>),
    /// Arithmetic negation.
    Neg(TermId),
    /// Division.
    Div(TermId, TermId),
    /// Euclidean modulus.
    Mod(TermId, TermId),
    /// Less-or-equal.
    Le(TermId, TermId),
    /// Strictly-less.
    Lt(TermId, TermId),
    /// Greater-or-equal.
    Ge(TermId, TermId),
    /// Strictly-greater.
    Gt(TermId, TermId),
    /// Bit-vector addition.
    BvAdd(TermId, TermId),
    /// Bit-vector multiplication.
    BvMul(TermId, TermId),
    /// Bitwise and.
    BvAnd(TermId, TermId),
    /// Bitwise or.
    BvOr(TermId, TermId),
    /// Bitwise xor.
    BvXor(TermId, TermId),
    /// Bitwise complement.
    BvNot(TermId),
    /// Two's-complement negation.
    BvNeg(TermId),
    /// Concatenation.
    BvConcat(TermId, TermId),
    /// Bit extraction.
    BvExtract {
        /// High bit (inclusive).
        hi: u32,
        /// Low bit (inclusive).
        lo: u32,
        /// Operand.
        arg: TermId,
    },
    /// Shift left.
    BvShl(TermId, TermId),
    /// Logical shift right.
    BvLshr(TermId, TermId),
    /// Unsigned less-than.
    BvUlt(TermId, TermId),
    /// Unsigned less-or-equal.
    BvUle(TermId, TermId),
    /// Bit-vector to unsigned integer.
    Bv2Int(TermId),
    /// Integer to bit-vector (modulo `2^width`).
    Int2Bv {
        /// Target width.
        width: u32,
        /// Operand.
        arg: TermId,
    },
    /// Array read.
    Select(TermId, TermId),
    /// Array write.
    Store(TermId, TermId, TermId),
    /// Datatype constructor application.
    DtConstructor {
        /// Constructor name.
        name: Spur,
        /// Field values.
        args: SmallVec<[TermId; 4]>,
    },
    /// Datatype constructor test.
    DtTester {
        /// Constructor name being tested for.
        ctor: Spur,
        /// Operand.
        arg: TermId,
    },
    /// Datatype field projection.
    DtSelector {
        /// Constructor name.
        ctor: Spur,
        /// Field index.
        idx: u32,
        /// Operand.
        arg: TermId,
    },
    /// Floating-point negation.
    FpNeg(TermId),
    /// Floating-point absolute value.
    FpAbs(TermId),
    /// Floating-point NaN test.
    FpIsNaN(TermId),
    /// String concatenation.
    StrConcat(TermId, TermId),
    /// String length.
    StrLen(TermId),
    /// Universal quantifier with named binders.
    Forall {
        /// Bound variables.
        vars: Vec<(Spur, SortId)>,
        /// Instantiation patterns.
        patterns: Vec<TermId>,
        /// Body.
        body: TermId,
    },
    /// Existential quantifier with named binders.
    Exists {
        /// Bound variables.
        vars: Vec<(Spur, SortId)>,
        /// Instantiation patterns.
        patterns: Vec<TermId>,
        /// Body.
        body: TermId,
    },
}

/// An interned term: shape plus sort.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Term {
    /// The shape of this term.
    pub kind: TermKind,
    /// The sort of this term.
    pub sort: SortId,
}

/// Arena of hash-consed terms plus sorts, symbols, and proofs.
#[derive(Debug)]
pub struct TermManager {
    terms: Vec<Term>,
    ids: FxHashMap<Term, TermId>,
    /// Sort store.
    pub sorts: SortStore,
    symbols: Rodeo,
    proofs: ProofArena,
    proofs_enabled: bool,
    quant_memo: FxHashMap<TermId, bool>,
    fresh_counter: u32,
    true_id: TermId,
    false_id: TermId,
}

impl TermManager {
    /// Create a manager with proof production disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::with_proofs(false)
    }

    /// Create a manager, optionally producing proof terms.
    #[must_use]
    pub fn with_proofs(proofs_enabled: bool) -> Self {
        let mut tm = Self {
            terms: Vec::new(),
            ids: FxHashMap::default(),
            sorts: SortStore::new(),
            symbols: Rodeo::default(),
            proofs: ProofArena::default(),
            proofs_enabled,
            quant_memo: FxHashMap::default(),
            fresh_counter: 0,
            true_id: TermId(0),
            false_id: TermId(0),
        };
        let bool_sort = tm.sorts.bool_sort;
        tm.true_id = tm.mk(TermKind::True, bool_sort);
        tm.false_id = tm.mk(TermKind::False, bool_sort);
        tm
    }

    /// Whether proof terms are produced.
    #[must_use]
    pub fn proofs_enabled(&self) -> bool {
        self.proofs_enabled
    }

    fn mk(&mut self, kind: TermKind, sort: SortId) -> TermId {
        let term = Term { kind, sort };
        if let Some(&id) = self.ids.get(&term) {
            return id;
        }
        let id = TermId(u32::try_from(self.terms.len()).expect("term arena overflow"));
        self.terms.push(term.clone());
        self.ids.insert(term, id);
        id
    }

    /// Look up a term by handle.
    #[must_use]
    pub fn get(&self, id: TermId) -> Option<&Term> {
        self.terms.get(id.0 as usize)
    }

    /// Sort of a term.
    #[must_use]
    pub fn sort_of(&self, id: TermId) -> SortId {
        self.get(id).map_or(self.sorts.bool_sort, |t| t.sort)
    }

    /// Intern a symbol.
    pub fn intern(&mut self, name: &str) -> Spur {
        self.symbols.get_or_intern(name)
    }

    /// Resolve a symbol back to its text.
    #[must_use]
    pub fn resolve(&self, sym: Spur) -> &str {
        self.symbols.resolve(&sym)
    }

    /// Generate a symbol guaranteed not to be in use.
    pub fn fresh_symbol(&mut self, prefix: &str) -> Spur {
        loop {
            let name = format!("{}!{}", prefix, self.fresh_counter);
            self.fresh_counter += 1;
            if self.symbols.get(&name).is_none() {
                return self.symbols.get_or_intern(&name);
            }
        }
    }

    // ------------------------------------------------------------------
    // Constructors
    // ------------------------------------------------------------------

    /// Boolean true.
    #[must_use]
    pub fn mk_true(&self) -> TermId {
        self.true_id
    }

    /// Boolean false.
    #[must_use]
    pub fn mk_false(&self) -> TermId {
        self.false_id
    }

    /// Boolean constant.
    #[must_use]
    pub fn mk_bool(&self, b: bool) -> TermId {
        if b {
            self.true_id
        } else {
            self.false_id
        }
    }

    /// Integer numeral.
    pub fn mk_int(&mut self, value: BigInt) -> TermId {
        let sort = self.sorts.int_sort;
        self.mk(TermKind::IntConst(value), sort)
    }

    /// Real numeral.
    pub fn mk_real(&mut self, value: BigRational) -> TermId {
        let sort = self.sorts.real_sort;
        self.mk(TermKind::RealConst(value), sort)
    }

    /// Bit-vector numeral, canonicalized modulo `2^width`.
    pub fn mk_bv(&mut self, value: BigInt, width: u32) -> TermId {
        let modulus = BigInt::one() << width;
        let value = value.mod_floor(&modulus);
        let sort = self.sorts.bitvec(width);
        self.mk(TermKind::BitVecConst { value, width }, sort)
    }

    /// String literal.
    pub fn mk_str(&mut self, value: &str) -> TermId {
        let sort = self.sorts.string_sort;
        self.mk(TermKind::StringLit(value.to_string()), sort)
    }

    /// Free constant with the given name and sort.
    pub fn mk_var(&mut self, name: &str, sort: SortId) -> TermId {
        let sym = self.symbols.get_or_intern(name);
        self.mk(TermKind::Var(sym), sort)
    }

    /// Free constant from an already-interned symbol.
    pub fn mk_var_from(&mut self, sym: Spur, sort: SortId) -> TermId {
        self.mk(TermKind::Var(sym), sort)
    }

    /// Uninterpreted function application.
    pub fn mk_apply(&mut self, func: &str, args: Vec<TermId>, sort: SortId) -> TermId {
        let sym = self.symbols.get_or_intern(func);
        self.mk_apply_from(sym, args, sort)
    }

    /// Uninterpreted function application from an interned symbol.
    pub fn mk_apply_from(&mut self, func: Spur, args: Vec<TermId>, sort: SortId) -> TermId {
        self.mk(
            TermKind::Apply {
                func,
                args: SmallVec::from_vec(args),
            },
            sort,
        )
    }

    /// Boolean negation.
    pub fn mk_not(&mut self, arg: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.mk(TermKind::Not(arg), sort)
    }

    /// Conjunction. Empty conjunctions are true, singletons unwrap.
    pub fn mk_and(&mut self, args: Vec<TermId>) -> TermId {
        match args.len() {
            0 => self.true_id,
            1 => args[0],
            _ => {
                let sort = self.sorts.bool_sort;
                self.mk(TermKind::And(args), sort)
            }
        }
    }

    /// Disjunction. Empty disjunctions are false, singletons unwrap.
    pub fn mk_or(&mut self, args: Vec<TermId>) -> TermId {
        match args.len() {
            0 => self.false_id,
            1 => args[0],
            _ => {
                let sort = self.sorts.bool_sort;
                self.mk(TermKind::Or(args), sort)
            }
        }
    }

    /// Implication.
    pub fn mk_implies(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.mk(TermKind::Implies(lhs, rhs), sort)
    }

    /// Exclusive or.
    pub fn mk_xor(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.mk(TermKind::Xor(lhs, rhs), sort)
    }

    /// If-then-else. The sort is the then-branch's sort.
    pub fn mk_ite(&mut self, cond: TermId, then: TermId, els: TermId) -> TermId {
        let sort = self.sort_of(then);
        self.mk(TermKind::Ite(cond, then, els), sort)
    }

    /// Equality.
    pub fn mk_eq(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.mk(TermKind::Eq(lhs, rhs), sort)
    }

    /// Pairwise disequality.
    pub fn mk_distinct(&mut self, args: Vec<TermId>) -> TermId {
        let sort = self.sorts.bool_sort;
        self.mk(TermKind::Distinct(args), sort)
    }

    /// Addition. Empty sums are integer zero, singletons unwrap.
    pub fn mk_add(&mut self, args: Vec<TermId>) -> TermId {
        match args.len() {
            0 => self.mk_int(BigInt::zero()),
            1 => args[0],
            _ => {
                let sort = self.sort_of(args[0]);
                self.mk(TermKind::Add(args), sort)
            }
        }
    }

    /// Subtraction.
    pub fn mk_sub(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        let sort = self.sort_of(lhs);
        self.mk(TermKind::Sub(lhs, rhs), sort)
    }

    /// Multiplication. Empty products are integer one, singletons unwrap.
    pub fn mk_mul(&mut self, args: Vec<TermId>) -> TermId {
        match args.len() {
            0 => self.mk_int(BigInt::one()),
            1 => args[0],
            _ => {
                let sort = self.sort_of(args[0]);
                self.mk(TermKind::Mul(args), sort)
            }
        }
    }

    /// Arithmetic negation.
    pub fn mk_neg(&mut self, arg: TermId) -> TermId {
        let sort = self.sort_of(arg);
        self.mk(TermKind::Neg(arg), sort)
    }

    /// Division.
    pub fn mk_div(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        let sort = self.sort_of(lhs);
        self.mk(TermKind::Div(lhs, rhs), sort)
    }

    /// Euclidean modulus.
    pub fn mk_mod(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        let sort = self.sorts.int_sort;
        self.mk(TermKind::Mod(lhs, rhs), sort)
    }

    /// Less-or-equal.
    pub fn mk_le(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.mk(TermKind::Le(lhs, rhs), sort)
    }

    /// Strictly-less.
    pub fn mk_lt(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.mk(TermKind::Lt(lhs, rhs), sort)
    }

    /// Greater-or-equal.
    pub fn mk_ge(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.mk(TermKind::Ge(lhs, rhs), sort)
    }

    /// Strictly-greater.
    pub fn mk_gt(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.mk(TermKind::Gt(lhs, rhs), sort)
    }

    /// Bit-vector addition.
    pub fn mk_bv_add(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        let sort = self.sort_of(lhs);
        self.mk(TermKind::BvAdd(lhs, rhs), sort)
    }

    /// Bit-vector multiplication.
    pub fn mk_bv_mul(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        let sort = self.sort_of(lhs);
        self.mk(TermKind::BvMul(lhs, rhs), sort)
    }

    /// Bitwise and.
    pub fn mk_bv_and(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        let sort = self.sort_of(lhs);
        self.mk(TermKind::BvAnd(lhs, rhs), sort)
    }

    /// Bitwise or.
    pub fn mk_bv_or(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        let sort = self.sort_of(lhs);
        self.mk(TermKind::BvOr(lhs, rhs), sort)
    }

    /// Bitwise xor.
    pub fn mk_bv_xor(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        let sort = self.sort_of(lhs);
        self.mk(TermKind::BvXor(lhs, rhs), sort)
    }

    /// Bitwise complement.
    pub fn mk_bv_not(&mut self, arg: TermId) -> TermId {
        let sort = self.sort_of(arg);
        self.mk(TermKind::BvNot(arg), sort)
    }

    /// Two's-complement negation.
    pub fn mk_bv_neg(&mut self, arg: TermId) -> TermId {
        let sort = self.sort_of(arg);
        self.mk(TermKind::BvNeg(arg), sort)
    }

    /// Concatenation.
    pub fn mk_bv_concat(&mut self, hi: TermId, lo: TermId) -> TermId {
        let w = self.bv_width(hi).unwrap_or(0) + self.bv_width(lo).unwrap_or(0);
        let sort = self.sorts.bitvec(w);
        self.mk(TermKind::BvConcat(hi, lo), sort)
    }

    /// Bit extraction of `[lo, hi]`.
    pub fn mk_bv_extract(&mut self, hi: u32, lo: u32, arg: TermId) -> TermId {
        let sort = self.sorts.bitvec(hi - lo + 1);
        self.mk(TermKind::BvExtract { hi, lo, arg }, sort)
    }

    /// Shift left.
    pub fn mk_bv_shl(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        let sort = self.sort_of(lhs);
        self.mk(TermKind::BvShl(lhs, rhs), sort)
    }

    /// Logical shift right.
    pub fn mk_bv_lshr(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        let sort = self.sort_of(lhs);
        self.mk(TermKind::BvLshr(lhs, rhs), sort)
    }

    /// Unsigned less-than.
    pub fn mk_bv_ult(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.mk(TermKind::BvUlt(lhs, rhs), sort)
    }

    /// Unsigned less-or-equal.
    pub fn mk_bv_ule(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.mk(TermKind::BvUle(lhs, rhs), sort)
    }

    /// Bit-vector to unsigned integer.
    pub fn mk_bv2int(&mut self, arg: TermId) -> TermId {
        let sort = self.sorts.int_sort;
        self.mk(TermKind::Bv2Int(arg), sort)
    }

    /// Integer to bit-vector.
    pub fn mk_int2bv(&mut self, width: u32, arg: TermId) -> TermId {
        let sort = self.sorts.bitvec(width);
        self.mk(TermKind::Int2Bv { width, arg }, sort)
    }

    /// Array read.
    pub fn mk_select(&mut self, array: TermId, index: TermId) -> TermId {
        let sort = match self.get(array).map(|t| t.sort).and_then(|s| {
            self.sorts.get(s).map(|s| s.kind.clone())
        }) {
            Some(SortKind::Array(_, element)) => element,
            _ => self.sorts.int_sort,
        };
        self.mk(TermKind::Select(array, index), sort)
    }

    /// Array write.
    pub fn mk_store(&mut self, array: TermId, index: TermId, value: TermId) -> TermId {
        let sort = self.sort_of(array);
        self.mk(TermKind::Store(array, index, value), sort)
    }

    /// Datatype constructor application.
    pub fn mk_dt_constructor(&mut self, name: &str, args: Vec<TermId>, sort: SortId) -> TermId {
        let sym = self.symbols.get_or_intern(name);
        self.mk(
            TermKind::DtConstructor {
                name: sym,
                args: SmallVec::from_vec(args),
            },
            sort,
        )
    }

    /// Datatype constructor test.
    pub fn mk_dt_tester(&mut self, ctor: &str, arg: TermId) -> TermId {
        let sym = self.symbols.get_or_intern(ctor);
        let sort = self.sorts.bool_sort;
        self.mk(TermKind::DtTester { ctor: sym, arg }, sort)
    }

    /// Datatype field projection.
    pub fn mk_dt_selector(&mut self, ctor: &str, idx: u32, arg: TermId, sort: SortId) -> TermId {
        let sym = self.symbols.get_or_intern(ctor);
        self.mk(TermKind::DtSelector { ctor: sym, idx, arg }, sort)
    }

    /// Floating-point negation.
    pub fn mk_fp_neg(&mut self, arg: TermId) -> TermId {
        let sort = self.sort_of(arg);
        self.mk(TermKind::FpNeg(arg), sort)
    }

    /// Floating-point absolute value.
    pub fn mk_fp_abs(&mut self, arg: TermId) -> TermId {
        let sort = self.sort_of(arg);
        self.mk(TermKind::FpAbs(arg), sort)
    }

    /// Floating-point NaN test.
    pub fn mk_fp_is_nan(&mut self, arg: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.mk(TermKind::FpIsNaN(arg), sort)
    }

    /// String concatenation.
    pub fn mk_str_concat(&mut self, lhs: TermId, rhs: TermId) -> TermId {
        let sort = self.sorts.string_sort;
        self.mk(TermKind::StrConcat(lhs, rhs), sort)
    }

    /// String length.
    pub fn mk_str_len(&mut self, arg: TermId) -> TermId {
        let sort = self.sorts.int_sort;
        self.mk(TermKind::StrLen(arg), sort)
    }

    /// Universal quantifier. An empty binder list unwraps to the body.
    pub fn mk_forall(
        &mut self,
        vars: Vec<(Spur, SortId)>,
        patterns: Vec<TermId>,
        body: TermId,
    ) -> TermId {
        if vars.is_empty() {
            return body;
        }
        let sort = self.sorts.bool_sort;
        self.mk(
            TermKind::Forall {
                vars,
                patterns,
                body,
            },
            sort,
        )
    }

    /// Existential quantifier. An empty binder list unwraps to the body.
    pub fn mk_exists(
        &mut self,
        vars: Vec<(Spur, SortId)>,
        patterns: Vec<TermId>,
        body: TermId,
    ) -> TermId {
        if vars.is_empty() {
            return body;
        }
        let sort = self.sorts.bool_sort;
        self.mk(
            TermKind::Exists {
                vars,
                patterns,
                body,
            },
            sort,
        )
    }

    // ------------------------------------------------------------------
    // Predicates and traversal
    // ------------------------------------------------------------------

    /// Whether `id` is the literal true.
    #[must_use]
    pub fn is_true(&self, id: TermId) -> bool {
        id == self.true_id
    }

    /// Whether `id` is the literal false.
    #[must_use]
    pub fn is_false(&self, id: TermId) -> bool {
        id == self.false_id
    }

    /// Whether `id` is a concrete value (a numeral, literal, or a
    /// constructor applied to values).
    #[must_use]
    pub fn is_value(&self, id: TermId) -> bool {
        let Some(term) = self.get(id) else {
            return false;
        };
        match &term.kind {
            TermKind::True
            | TermKind::False
            | TermKind::IntConst(_)
            | TermKind::RealConst(_)
            | TermKind::BitVecConst { .. }
            | TermKind::StringLit(_) => true,
            TermKind::DtConstructor { args, .. } => args.iter().all(|&a| self.is_value(a)),
            _ => false,
        }
    }

    /// If `id` is a negation, return its argument.
    #[must_use]
    pub fn as_not(&self, id: TermId) -> Option<TermId> {
        match self.get(id).map(|t| &t.kind) {
            Some(&TermKind::Not(arg)) => Some(arg),
            _ => None,
        }
    }

    /// If `id` is an equality, return both sides.
    #[must_use]
    pub fn as_eq(&self, id: TermId) -> Option<(TermId, TermId)> {
        match self.get(id).map(|t| &t.kind) {
            Some(&TermKind::Eq(lhs, rhs)) => Some((lhs, rhs)),
            _ => None,
        }
    }

    /// Bit width of a bit-vector-sorted term.
    #[must_use]
    pub fn bv_width(&self, id: TermId) -> Option<u32> {
        self.get(id)
            .and_then(|t| self.sorts.get(t.sort))
            .and_then(|s| s.bitvec_width())
    }

    /// Direct children of a term, patterns before quantifier bodies.
    #[must_use]
    pub fn children(&self, id: TermId) -> SmallVec<[TermId; 4]> {
        let Some(term) = self.get(id) else {
            return SmallVec::new();
        };
        match &term.kind {
            TermKind::True
            | TermKind::False
            | TermKind::IntConst(_)
            | TermKind::RealConst(_)
            | TermKind::BitVecConst { .. }
            | TermKind::StringLit(_)
            | TermKind::Var(_) => SmallVec::new(),
            TermKind::Not(a)
            | TermKind::Neg(a)
            | TermKind::BvNot(a)
            | TermKind::BvNeg(a)
            | TermKind::BvExtract { arg: a, .. }
            | TermKind::Bv2Int(a)
            | TermKind::Int2Bv { arg: a, .. }
            | TermKind::DtTester { arg: a, .. }
            | TermKind::DtSelector { arg: a, .. }
            | TermKind::FpNeg(a)
            | TermKind::FpAbs(a)
            | TermKind::FpIsNaN(a)
            | TermKind::StrLen(a) => SmallVec::from_slice(&[*a]),
            TermKind::Implies(a, b)
            | TermKind::Xor(a, b)
            | TermKind::Eq(a, b)
            | TermKind::Sub(a, b)
            | TermKind::Div(a, b)
            | TermKind::Mod(a, b)
            | TermKind::Le(a, b)
            | TermKind::Lt(a, b)
            | TermKind::Ge(a, b)
            | TermKind::Gt(a, b)
            | TermKind::BvAdd(a, b)
            | TermKind::BvMul(a, b)
            | TermKind::BvAnd(a, b)
            | TermKind::BvOr(a, b)
            | TermKind::BvXor(a, b)
            | TermKind::BvConcat(a, b)
            | TermKind::BvShl(a, b)
            | TermKind::BvLshr(a, b)
            | TermKind::BvUlt(a, b)
            | TermKind::BvUle(a, b)
            | TermKind::Select(a, b)
            | TermKind::StrConcat(a, b) => SmallVec::from_slice(&[*a, *b]),
            TermKind::Ite(a, b, c) | TermKind::Store(a, b, c) => {
                SmallVec::from_slice(&[*a, *b, *c])
            }
            TermKind::And(args)
            | TermKind::Or(args)
            | TermKind::Distinct(args)
            | TermKind::Add(args)
            | TermKind::Mul(args) => SmallVec::from_slice(args),
            TermKind::Apply { args, .. } | TermKind::DtConstructor { args, .. } => args.clone(),
            TermKind::Forall { patterns, body, .. } | TermKind::Exists { patterns, body, .. } => {
                let mut out: SmallVec<[TermId; 4]> = SmallVec::from_slice(patterns);
                out.push(*body);
                out
            }
        }
    }

    /// Rebuild a term with replaced children, in [`TermManager::children`]
    /// order. Returns the original handle when nothing changed.
    pub fn rebuild(&mut self, id: TermId, new_children: &[TermId]) -> TermId {
        let old = self.children(id);
        if old.as_slice() == new_children {
            return id;
        }
        let Some(term) = self.get(id).cloned() else {
            return id;
        };
        let c = new_children;
        match term.kind {
            TermKind::Not(_) => self.mk_not(c[0]),
            TermKind::Neg(_) => self.mk_neg(c[0]),
            TermKind::BvNot(_) => self.mk_bv_not(c[0]),
            TermKind::BvNeg(_) => self.mk_bv_neg(c[0]),
            TermKind::BvExtract { hi, lo, .. } => self.mk_bv_extract(hi, lo, c[0]),
            TermKind::Bv2Int(_) => self.mk_bv2int(c[0]),
            TermKind::Int2Bv { width, .. } => self.mk_int2bv(width, c[0]),
            TermKind::DtTester { ctor, .. } => {
                self.mk(TermKind::DtTester { ctor, arg: c[0] }, term.sort)
            }
            TermKind::DtSelector { ctor, idx, .. } => self.mk(
                TermKind::DtSelector {
                    ctor,
                    idx,
                    arg: c[0],
                },
                term.sort,
            ),
            TermKind::FpNeg(_) => self.mk_fp_neg(c[0]),
            TermKind::FpAbs(_) => self.mk_fp_abs(c[0]),
            TermKind::FpIsNaN(_) => self.mk_fp_is_nan(c[0]),
            TermKind::StrLen(_) => self.mk_str_len(c[0]),
            TermKind::Implies(..) => self.mk_implies(c[0], c[1]),
            TermKind::Xor(..) => self.mk_xor(c[0], c[1]),
            TermKind::Eq(..) => self.mk_eq(c[0], c[1]),
            TermKind::Sub(..) => self.mk_sub(c[0], c[1]),
            TermKind::Div(..) => self.mk_div(c[0], c[1]),
            TermKind::Mod(..) => self.mk_mod(c[0], c[1]),
            TermKind::Le(..) => self.mk_le(c[0], c[1]),
            TermKind::Lt(..) => self.mk_lt(c[0], c[1]),
            TermKind::Ge(..) => self.mk_ge(c[0], c[1]),
            TermKind::Gt(..) => self.mk_gt(c[0], c[1]),
            TermKind::BvAdd(..) => self.mk_bv_add(c[0], c[1]),
            TermKind::BvMul(..) => self.mk_bv_mul(c[0], c[1]),
            TermKind::BvAnd(..) => self.mk_bv_and(c[0], c[1]),
            TermKind::BvOr(..) => self.mk_bv_or(c[0], c[1]),
            TermKind::BvXor(..) => self.mk_bv_xor(c[0], c[1]),
            TermKind::BvConcat(..) => self.mk_bv_concat(c[0], c[1]),
            TermKind::BvShl(..) => self.mk_bv_shl(c[0], c[1]),
            TermKind::BvLshr(..) => self.mk_bv_lshr(c[0], c[1]),
            TermKind::BvUlt(..) => self.mk_bv_ult(c[0], c[1]),
            TermKind::BvUle(..) => self.mk_bv_ule(c[0], c[1]),
            TermKind::Select(..) => self.mk_select(c[0], c[1]),
            TermKind::StrConcat(..) => self.mk_str_concat(c[0], c[1]),
            TermKind::Ite(..) => self.mk_ite(c[0], c[1], c[2]),
            TermKind::Store(..) => self.mk_store(c[0], c[1], c[2]),
            TermKind::And(_) => self.mk_and(c.to_vec()),
            TermKind::Or(_) => self.mk_or(c.to_vec()),
            TermKind::Distinct(_) => self.mk_distinct(c.to_vec()),
            TermKind::Add(_) => self.mk_add(c.to_vec()),
            TermKind::Mul(_) => self.mk_mul(c.to_vec()),
            TermKind::Apply { func, .. } => self.mk_apply_from(func, c.to_vec(), term.sort),
            TermKind::DtConstructor { name, .. } => self.mk(
                TermKind::DtConstructor {
                    name,
                    args: SmallVec::from_slice(c),
                },
                term.sort,
            ),
            TermKind::Forall { vars, .. } => {
                let (patterns, body) = c.split_at(c.len() - 1);
                self.mk_forall(vars, patterns.to_vec(), body[0])
            }
            TermKind::Exists { vars, .. } => {
                let (patterns, body) = c.split_at(c.len() - 1);
                self.mk_exists(vars, patterns.to_vec(), body[0])
            }
            _ => id,
        }
    }

    /// Whether a term contains a quantifier. Memoized; terms are immutable
    /// so entries never go stale.
    pub fn has_quantifiers(&mut self, id: TermId) -> bool {
        if let Some(&cached) = self.quant_memo.get(&id) {
            return cached;
        }
        let result = match self.get(id).map(|t| &t.kind) {
            Some(TermKind::Forall { .. }) | Some(TermKind::Exists { .. }) => true,
            Some(_) => {
                let children = self.children(id);
                children.into_iter().any(|c| self.has_quantifiers(c))
            }
            None => false,
        };
        self.quant_memo.insert(id, result);
        result
    }

    /// Number of distinct subterms reachable from `id`.
    #[must_use]
    pub fn num_exprs(&self, id: TermId) -> usize {
        let mut visited = FxHashSet::default();
        self.num_exprs_rec(id, &mut visited);
        visited.len()
    }

    fn num_exprs_rec(&self, id: TermId, visited: &mut FxHashSet<TermId>) {
        if !visited.insert(id) {
            return;
        }
        for child in self.children(id) {
            self.num_exprs_rec(child, visited);
        }
    }

    /// Whether an application of `func` occurs anywhere in `id`.
    #[must_use]
    pub fn occurs_apply(&self, func: Spur, id: TermId) -> bool {
        let mut visited = FxHashSet::default();
        self.occurs_apply_rec(func, id, &mut visited)
    }

    fn occurs_apply_rec(&self, func: Spur, id: TermId, visited: &mut FxHashSet<TermId>) -> bool {
        if !visited.insert(id) {
            return false;
        }
        if let Some(TermKind::Apply { func: f, .. }) = self.get(id).map(|t| &t.kind) {
            if *f == func {
                return true;
            }
        }
        self.children(id)
            .into_iter()
            .any(|c| self.occurs_apply_rec(func, c, visited))
    }

    /// Collect every uninterpreted function symbol applied in `id`.
    pub fn collect_apply_heads(&self, id: TermId, out: &mut FxHashSet<Spur>) {
        let mut visited = FxHashSet::default();
        self.collect_apply_heads_rec(id, out, &mut visited);
    }

    fn collect_apply_heads_rec(
        &self,
        id: TermId,
        out: &mut FxHashSet<Spur>,
        visited: &mut FxHashSet<TermId>,
    ) {
        if !visited.insert(id) {
            return;
        }
        if let Some(TermKind::Apply { func, .. }) = self.get(id).map(|t| &t.kind) {
            out.insert(*func);
        }
        for child in self.children(id) {
            self.collect_apply_heads_rec(child, out, visited);
        }
    }

    /// Variables of `id` not bound by an enclosing quantifier within `id`.
    #[must_use]
    pub fn free_vars(&self, id: TermId) -> FxHashSet<Spur> {
        let mut out = FxHashSet::default();
        let mut bound = Vec::new();
        self.free_vars_rec(id, &mut bound, &mut out);
        out
    }

    fn free_vars_rec(&self, id: TermId, bound: &mut Vec<Spur>, out: &mut FxHashSet<Spur>) {
        let Some(term) = self.get(id) else {
            return;
        };
        match &term.kind {
            TermKind::Var(name) => {
                if !bound.contains(name) {
                    out.insert(*name);
                }
            }
            TermKind::Forall { vars, body, .. } | TermKind::Exists { vars, body, .. } => {
                let depth = bound.len();
                bound.extend(vars.iter().map(|(name, _)| *name));
                self.free_vars_rec(*body, bound, out);
                bound.truncate(depth);
            }
            _ => {
                for child in self.children(id) {
                    self.free_vars_rec(child, bound, out);
                }
            }
        }
    }

    /// Substitute free variables by name. Binders shadow: a substituted
    /// name rebound underneath is left alone.
    pub fn substitute_vars(&mut self, id: TermId, subst: &FxHashMap<Spur, TermId>) -> TermId {
        if subst.is_empty() {
            return id;
        }
        let mut cache = FxHashMap::default();
        self.substitute_vars_rec(id, subst, &mut cache)
    }

    fn substitute_vars_rec(
        &mut self,
        id: TermId,
        subst: &FxHashMap<Spur, TermId>,
        cache: &mut FxHashMap<TermId, TermId>,
    ) -> TermId {
        if let Some(&hit) = cache.get(&id) {
            return hit;
        }
        let Some(term) = self.get(id).cloned() else {
            return id;
        };
        let result = match &term.kind {
            TermKind::Var(name) => subst.get(name).copied().unwrap_or(id),
            TermKind::Forall { vars, .. } | TermKind::Exists { vars, .. } => {
                let shadowed: Vec<Spur> = vars
                    .iter()
                    .map(|(name, _)| *name)
                    .filter(|name| subst.contains_key(name))
                    .collect();
                if shadowed.is_empty() {
                    let children = self.children(id);
                    let new: Vec<TermId> = children
                        .into_iter()
                        .map(|c| self.substitute_vars_rec(c, subst, cache))
                        .collect();
                    self.rebuild(id, &new)
                } else {
                    let narrowed: FxHashMap<Spur, TermId> = subst
                        .iter()
                        .filter(|(name, _)| !shadowed.contains(name))
                        .map(|(&name, &t)| (name, t))
                        .collect();
                    if narrowed.is_empty() {
                        id
                    } else {
                        // A different substitution applies under this binder,
                        // so the outer cache does not.
                        let mut inner = FxHashMap::default();
                        let children = self.children(id);
                        let new: Vec<TermId> = children
                            .into_iter()
                            .map(|c| self.substitute_vars_rec(c, &narrowed, &mut inner))
                            .collect();
                        self.rebuild(id, &new)
                    }
                }
            }
            _ => {
                let children = self.children(id);
                let new: Vec<TermId> = children
                    .into_iter()
                    .map(|c| self.substitute_vars_rec(c, subst, cache))
                    .collect();
                self.rebuild(id, &new)
            }
        };
        cache.insert(id, result);
        result
    }

    // ------------------------------------------------------------------
    // Proof constructors
    // ------------------------------------------------------------------

    /// Leaf proof for a caller-asserted formula.
    pub fn mk_asserted(&mut self, e: TermId) -> Option<ProofId> {
        if !self.proofs_enabled {
            return None;
        }
        Some(self.proofs.alloc(ProofRule::Asserted, SmallVec::new(), e))
    }

    /// Leaf proof for the defining equation of an introduced name.
    pub fn mk_def_intro(&mut self, e: TermId) -> Option<ProofId> {
        if !self.proofs_enabled {
            return None;
        }
        Some(self.proofs.alloc(ProofRule::DefIntro, SmallVec::new(), e))
    }

    /// Rewrite proof concluding `from = to`.
    pub fn mk_rewrite(&mut self, from: TermId, to: TermId) -> Option<ProofId> {
        if !self.proofs_enabled {
            return None;
        }
        let conclusion = self.mk_eq(from, to);
        Some(
            self.proofs
                .alloc(ProofRule::Rewrite, SmallVec::new(), conclusion),
        )
    }

    /// Modus ponens: from `phi` and `phi = psi`, conclude `psi`. A missing
    /// equality premise passes the antecedent through unchanged.
    pub fn mk_modus_ponens(&mut self, p: Option<ProofId>, eq: Option<ProofId>) -> Option<ProofId> {
        if !self.proofs_enabled {
            return None;
        }
        let Some(eq) = eq else {
            return p;
        };
        let eq_conclusion = self.proof(eq)?.conclusion;
        let Some((lhs, rhs)) = self.as_eq(eq_conclusion) else {
            debug_assert!(false, "modus ponens over a non-equality");
            return Some(eq);
        };
        let mut premises = SmallVec::new();
        if let Some(p) = p {
            debug_assert_eq!(self.proof(p).map(|n| n.conclusion), Some(lhs));
            premises.push(p);
        }
        premises.push(eq);
        Some(self.proofs.alloc(ProofRule::ModusPonens, premises, rhs))
    }

    /// Transitivity of equality; either side may be absent.
    pub fn mk_transitivity(&mut self, p: Option<ProofId>, q: Option<ProofId>) -> Option<ProofId> {
        if !self.proofs_enabled {
            return None;
        }
        let (p, q) = match (p, q) {
            (Some(p), Some(q)) => (p, q),
            (one, None) => return one,
            (None, one) => return one,
        };
        let pc = self.proof(p)?.conclusion;
        let qc = self.proof(q)?.conclusion;
        let (Some((a, b1)), Some((b2, c))) = (self.as_eq(pc), self.as_eq(qc)) else {
            debug_assert!(false, "transitivity over a non-equality");
            return Some(q);
        };
        debug_assert_eq!(b1, b2);
        let conclusion = self.mk_eq(a, c);
        Some(self.proofs.alloc(
            ProofRule::Transitivity,
            SmallVec::from_slice(&[p, q]),
            conclusion,
        ))
    }

    /// Symmetry of equality.
    pub fn mk_symmetry(&mut self, p: Option<ProofId>) -> Option<ProofId> {
        if !self.proofs_enabled {
            return None;
        }
        let p = p?;
        let pc = self.proof(p)?.conclusion;
        let Some((a, b)) = self.as_eq(pc) else {
            debug_assert!(false, "symmetry over a non-equality");
            return Some(p);
        };
        let conclusion = self.mk_eq(b, a);
        Some(
            self.proofs
                .alloc(ProofRule::Symmetry, SmallVec::from_slice(&[p]), conclusion),
        )
    }

    /// From a proof of `phi`, conclude `phi = true`.
    pub fn mk_iff_true(&mut self, p: Option<ProofId>) -> Option<ProofId> {
        if !self.proofs_enabled {
            return None;
        }
        let p = p?;
        let phi = self.proof(p)?.conclusion;
        let t = self.mk_true();
        let conclusion = self.mk_eq(phi, t);
        Some(
            self.proofs
                .alloc(ProofRule::IffTrue, SmallVec::from_slice(&[p]), conclusion),
        )
    }

    /// From a proof of `not phi`, conclude `phi = false`.
    pub fn mk_iff_false(&mut self, p: Option<ProofId>) -> Option<ProofId> {
        if !self.proofs_enabled {
            return None;
        }
        let p = p?;
        let not_phi = self.proof(p)?.conclusion;
        let Some(phi) = self.as_not(not_phi) else {
            debug_assert!(false, "iff-false over a non-negation");
            return Some(p);
        };
        let f = self.mk_false();
        let conclusion = self.mk_eq(phi, f);
        Some(
            self.proofs
                .alloc(ProofRule::IffFalse, SmallVec::from_slice(&[p]), conclusion),
        )
    }

    /// Look up a proof node.
    #[must_use]
    pub fn proof(&self, id: ProofId) -> Option<&ProofNode> {
        self.proofs.get(id)
    }

    /// Conclusion of a proof node.
    #[must_use]
    pub fn proof_conclusion(&self, id: ProofId) -> Option<TermId> {
        self.proofs.get(id).map(|n| n.conclusion)
    }

    /// Validate a proof's structure: each node's conclusion must follow
    /// from its premises under its rule.
    pub fn check_proof(&self, id: ProofId) -> Result<()> {
        let Some(node) = self.proofs.get(id) else {
            return Err(Error::invariant("dangling proof id"));
        };
        for &premise in &node.premises {
            self.check_proof(premise)?;
        }
        let premise_concl = |i: usize| -> Result<TermId> {
            node.premises
                .get(i)
                .and_then(|&p| self.proof_conclusion(p))
                .ok_or_else(|| Error::invariant("missing proof premise"))
        };
        match node.rule {
            ProofRule::Asserted | ProofRule::DefIntro => Ok(()),
            ProofRule::Rewrite => {
                if self.as_eq(node.conclusion).is_some() {
                    Ok(())
                } else {
                    Err(Error::invariant("rewrite proof must conclude an equality"))
                }
            }
            ProofRule::ModusPonens => {
                let eq = premise_concl(node.premises.len() - 1)?;
                let (lhs, rhs) = self
                    .as_eq(eq)
                    .ok_or_else(|| Error::invariant("modus ponens needs an equality premise"))?;
                if node.premises.len() == 2 && premise_concl(0)? != lhs {
                    return Err(Error::invariant("modus ponens antecedent mismatch"));
                }
                if node.conclusion != rhs {
                    return Err(Error::invariant("modus ponens conclusion mismatch"));
                }
                Ok(())
            }
            ProofRule::Transitivity => {
                let (a, b1) = self
                    .as_eq(premise_concl(0)?)
                    .ok_or_else(|| Error::invariant("transitivity premise"))?;
                let (b2, c) = self
                    .as_eq(premise_concl(1)?)
                    .ok_or_else(|| Error::invariant("transitivity premise"))?;
                let (ca, cc) = self
                    .as_eq(node.conclusion)
                    .ok_or_else(|| Error::invariant("transitivity conclusion"))?;
                if b1 != b2 || ca != a || cc != c {
                    return Err(Error::invariant("transitivity link mismatch"));
                }
                Ok(())
            }
            ProofRule::Symmetry => {
                let (a, b) = self
                    .as_eq(premise_concl(0)?)
                    .ok_or_else(|| Error::invariant("symmetry premise"))?;
                let (ca, cb) = self
                    .as_eq(node.conclusion)
                    .ok_or_else(|| Error::invariant("symmetry conclusion"))?;
                if ca != b || cb != a {
                    return Err(Error::invariant("symmetry mismatch"));
                }
                Ok(())
            }
            ProofRule::IffTrue => {
                let phi = premise_concl(0)?;
                let (cphi, ct) = self
                    .as_eq(node.conclusion)
                    .ok_or_else(|| Error::invariant("iff-true conclusion"))?;
                if cphi != phi || !self.is_true(ct) {
                    return Err(Error::invariant("iff-true mismatch"));
                }
                Ok(())
            }
            ProofRule::IffFalse => {
                let not_phi = premise_concl(0)?;
                let phi = self
                    .as_not(not_phi)
                    .ok_or_else(|| Error::invariant("iff-false premise"))?;
                let (cphi, cf) = self
                    .as_eq(node.conclusion)
                    .ok_or_else(|| Error::invariant("iff-false conclusion"))?;
                if cphi != phi || !self.is_false(cf) {
                    return Err(Error::invariant("iff-false mismatch"));
                }
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------
    // Printing
    // ------------------------------------------------------------------

    /// Render a sort in SMT-LIB flavoured notation.
    #[must_use]
    pub fn display_sort(&self, sort: SortId) -> String {
        let Some(s) = self.sorts.get(sort) else {
            return "?".to_string();
        };
        match &s.kind {
            SortKind::Bool => "Bool".to_string(),
            SortKind::Int => "Int".to_string(),
            SortKind::Real => "Real".to_string(),
            SortKind::BitVec(w) => format!("(_ BitVec {w})"),
            SortKind::FloatingPoint(e, m) => format!("(_ FloatingPoint {e} {m})"),
            SortKind::String => "String".to_string(),
            SortKind::Array(i, e) => {
                format!("(Array {} {})", self.display_sort(*i), self.display_sort(*e))
            }
            SortKind::Uninterpreted(name) => self.resolve(*name).to_string(),
        }
    }

    /// Render a term in SMT-LIB flavoured notation.
    #[must_use]
    pub fn display_term(&self, id: TermId) -> String {
        let mut out = String::new();
        self.display_term_rec(id, &mut out);
        out
    }

    fn display_nary(&self, op: &str, args: &[TermId], out: &mut String) {
        out.push('(');
        out.push_str(op);
        for &arg in args {
            out.push(' ');
            self.display_term_rec(arg, out);
        }
        out.push(')');
    }

    fn display_term_rec(&self, id: TermId, out: &mut String) {
        let Some(term) = self.get(id) else {
            out.push('?');
            return;
        };
        match &term.kind {
            TermKind::True => out.push_str("true"),
            TermKind::False => out.push_str("false"),
            TermKind::IntConst(v) => {
                let _ = write!(out, "{v}");
            }
            TermKind::RealConst(v) => {
                let _ = write!(out, "{v}");
            }
            TermKind::BitVecConst { value, width } => {
                let _ = write!(out, "(_ bv{value} {width})");
            }
            TermKind::StringLit(s) => {
                let _ = write!(out, "\"{s}\"");
            }
            TermKind::Var(name) => out.push_str(self.resolve(*name)),
            TermKind::Apply { func, args } => {
                if args.is_empty() {
                    out.push_str(self.resolve(*func));
                } else {
                    self.display_nary(self.resolve(*func), args, out);
                }
            }
            TermKind::Not(a) => self.display_nary("not", &[*a], out),
            TermKind::And(args) => self.display_nary("and", args, out),
            TermKind::Or(args) => self.display_nary("or", args, out),
            TermKind::Implies(a, b) => self.display_nary("=>", &[*a, *b], out),
            TermKind::Xor(a, b) => self.display_nary("xor", &[*a, *b], out),
            TermKind::Ite(a, b, c) => self.display_nary("ite", &[*a, *b, *c], out),
            TermKind::Eq(a, b) => self.display_nary("=", &[*a, *b], out),
            TermKind::Distinct(args) => self.display_nary("distinct", args, out),
            TermKind::Add(args) => self.display_nary("+", args, out),
            TermKind::Sub(a, b) => self.display_nary("-", &[*a, *b], out),
            TermKind::Mul(args) => self.display_nary("*", args, out),
            TermKind::Neg(a) => self.display_nary("-", &[*a], out),
            TermKind::Div(a, b) => self.display_nary("div", &[*a, *b], out),
            TermKind::Mod(a, b) => self.display_nary("mod", &[*a, *b], out),
            TermKind::Le(a, b) => self.display_nary("<=", &[*a, *b], out),
            TermKind::Lt(a, b) => self.display_nary("<", &[*a, *b], out),
            TermKind::Ge(a, b) => self.display_nary(">=", &[*a, *b], out),
            TermKind::Gt(a, b) => self.display_nary(">", &[*a, *b], out),
            TermKind::BvAdd(a, b) => self.display_nary("bvadd", &[*a, *b], out),
            TermKind::BvMul(a, b) => self.display_nary("bvmul", &[*a, *b], out),
            TermKind::BvAnd(a, b) => self.display_nary("bvand", &[*a, *b], out),
            TermKind::BvOr(a, b) => self.display_nary("bvor", &[*a, *b], out),
            TermKind::BvXor(a, b) => self.display_nary("bvxor", &[*a, *b], out),
            TermKind::BvNot(a) => self.display_nary("bvnot", &[*a], out),
            TermKind::BvNeg(a) => self.display_nary("bvneg", &[*a], out),
            TermKind::BvConcat(a, b) => self.display_nary("concat", &[*a, *b], out),
            TermKind::BvExtract { hi, lo, arg } => {
                let _ = write!(out, "((_ extract {hi} {lo}) ");
                self.display_term_rec(*arg, out);
                out.push(')');
            }
            TermKind::BvShl(a, b) => self.display_nary("bvshl", &[*a, *b], out),
            TermKind::BvLshr(a, b) => self.display_nary("bvlshr", &[*a, *b], out),
            TermKind::BvUlt(a, b) => self.display_nary("bvult", &[*a, *b], out),
            TermKind::BvUle(a, b) => self.display_nary("bvule", &[*a, *b], out),
            TermKind::Bv2Int(a) => self.display_nary("bv2int", &[*a], out),
            TermKind::Int2Bv { width, arg } => {
                let _ = write!(out, "((_ int2bv {width}) ");
                self.display_term_rec(*arg, out);
                out.push(')');
            }
            TermKind::Select(a, b) => self.display_nary("select", &[*a, *b], out),
            TermKind::Store(a, b, c) => self.display_nary("store", &[*a, *b, *c], out),
            TermKind::DtConstructor { name, args } => {
                if args.is_empty() {
                    out.push_str(self.resolve(*name));
                } else {
                    self.display_nary(self.resolve(*name), args, out);
                }
            }
            TermKind::DtTester { ctor, arg } => {
                let op = format!("(_ is {})", self.resolve(*ctor));
                self.display_nary(&op, &[*arg], out);
            }
            TermKind::DtSelector { ctor, idx, arg } => {
                let op = format!("{}.{}", self.resolve(*ctor), idx);
                self.display_nary(&op, &[*arg], out);
            }
            TermKind::FpNeg(a) => self.display_nary("fp.neg", &[*a], out),
            TermKind::FpAbs(a) => self.display_nary("fp.abs", &[*a], out),
            TermKind::FpIsNaN(a) => self.display_nary("fp.isNaN", &[*a], out),
            TermKind::StrConcat(a, b) => self.display_nary("str.++", &[*a, *b], out),
            TermKind::StrLen(a) => self.display_nary("str.len", &[*a], out),
            TermKind::Forall { vars, body, .. } | TermKind::Exists { vars, body, .. } => {
                let quant = if matches!(term.kind, TermKind::Forall { .. }) {
                    "forall"
                } else {
                    "exists"
                };
                let _ = write!(out, "({quant} (");
                for (i, (name, sort)) in vars.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    let _ = write!(out, "({} {})", self.resolve(*name), self.display_sort(*sort));
                }
                out.push_str(") ");
                self.display_term_rec(*body, out);
                out.push(')');
            }
        }
    }
}

impl Default for TermManager {
    fn default() -> Self {
        Self::new()
    }
}
