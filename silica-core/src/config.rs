//! Preprocessing configuration.

/// How aggressively if-then-else terms are lifted out of applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LiftIteMode {
    /// Do not lift.
    None,
    /// Lift only when both branches are values.
    #[default]
    Conservative,
    /// Lift unconditionally.
    Full,
}

/// Parameters controlling the assertion preprocessing pipeline.
///
/// Call [`PreprocessParams::setup`] after mutating fields: some flags are
/// coupled and `setup` re-normalizes them.
#[derive(Debug, Clone)]
pub struct PreprocessParams {
    /// Master switch. When off, `assert` appends formulas untouched.
    pub preprocess: bool,
    /// Run the light pre-simplifier on each asserted formula.
    pub pre_simplifier: bool,
    /// Propagate truth values of asserted subformulas.
    pub propagate_booleans: bool,
    /// Propagate `x = value` equalities.
    pub propagate_values: bool,
    /// Detect and expand universally quantified macro definitions.
    pub macro_finder: bool,
    /// Detect quasi-macro definitions (permuted argument lists).
    pub quasi_macros: bool,
    /// Convert pending formulas to negation normal form.
    pub nnf_cnf: bool,
    /// Model-based quantifier instantiation downstream; forces NNF on when
    /// quantifiers are present.
    pub mbqi: bool,
    /// Rewrite conjunctions into negated disjunctions after NNF.
    pub eliminate_and: bool,
    /// Pull cheap if-then-else trees out of equalities with values.
    pub pull_cheap_ite_trees: bool,
    /// Merge directly nested quantifiers.
    pub pull_nested_quantifiers: bool,
    /// Lift if-then-else terms out of applications.
    pub lift_ite: LiftIteMode,
    /// Lift if-then-else terms out of applications under binders only.
    pub ng_lift_ite: LiftIteMode,
    /// Name non-Boolean if-then-else terms away.
    pub eliminate_term_ite: bool,
    /// Replace injectivity axioms with inverse-function definitions.
    pub refine_inj_axiom: bool,
    /// Distribute universal quantifiers over conjunctions.
    pub distribute_forall: bool,
    /// Simplify bit-vector/integer conversion chains.
    pub simplify_bit2int: bool,
    /// Cheap Fourier-Motzkin elimination of bounded quantified variables.
    pub eliminate_bounds: bool,
    /// E-matching based instantiation downstream; enables pattern inference.
    pub ematching: bool,
    /// Re-associate bit-vector operators to maximize subterm sharing.
    pub max_bv_sharing: bool,
    /// Eliminate small bit-vector variables from quantifiers by enumeration.
    pub bb_quantifiers: bool,
    /// Relevancy propagation level of the downstream solver.
    pub relevancy_lvl: u32,
    /// Generate relevancy lemmas; forced off when `relevancy_lvl` is 0.
    pub relevancy_lemma: bool,
    /// Dump static formula features on commit.
    pub display_features: bool,
}

impl Default for PreprocessParams {
    fn default() -> Self {
        Self {
            preprocess: true,
            pre_simplifier: true,
            propagate_booleans: true,
            propagate_values: true,
            macro_finder: true,
            quasi_macros: false,
            nnf_cnf: true,
            mbqi: false,
            eliminate_and: true,
            pull_cheap_ite_trees: true,
            pull_nested_quantifiers: false,
            lift_ite: LiftIteMode::None,
            ng_lift_ite: LiftIteMode::None,
            eliminate_term_ite: true,
            refine_inj_axiom: false,
            distribute_forall: false,
            simplify_bit2int: false,
            eliminate_bounds: false,
            ematching: true,
            max_bv_sharing: true,
            bb_quantifiers: false,
            relevancy_lvl: 2,
            relevancy_lemma: true,
            display_features: false,
        }
    }
}

impl PreprocessParams {
    /// Normalize coupled flags.
    ///
    /// Full ite-lifting subsumes the non-ground variant, and two
    /// conservative lifters would duplicate work, so `ng_lift_ite` yields in
    /// both cases. Relevancy lemmas require relevancy propagation.
    pub fn setup(&mut self) {
        match self.lift_ite {
            LiftIteMode::Full => self.ng_lift_ite = LiftIteMode::None,
            LiftIteMode::Conservative => {
                if self.ng_lift_ite == LiftIteMode::Conservative {
                    self.ng_lift_ite = LiftIteMode::None;
                }
            }
            LiftIteMode::None => {}
        }
        if self.relevancy_lvl == 0 {
            self.relevancy_lemma = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_lift_forces_ng_off() {
        let mut p = PreprocessParams {
            lift_ite: LiftIteMode::Full,
            ng_lift_ite: LiftIteMode::Conservative,
            ..Default::default()
        };
        p.setup();
        assert_eq!(p.ng_lift_ite, LiftIteMode::None);
    }

    #[test]
    fn test_two_conservative_lifters_collapse() {
        let mut p = PreprocessParams {
            lift_ite: LiftIteMode::Conservative,
            ng_lift_ite: LiftIteMode::Conservative,
            ..Default::default()
        };
        p.setup();
        assert_eq!(p.lift_ite, LiftIteMode::Conservative);
        assert_eq!(p.ng_lift_ite, LiftIteMode::None);
    }

    #[test]
    fn test_relevancy_coupling() {
        let mut p = PreprocessParams {
            relevancy_lvl: 0,
            relevancy_lemma: true,
            ..Default::default()
        };
        p.setup();
        assert!(!p.relevancy_lemma);
    }
}
