//! String and sequence simplification rules.

use num_bigint::BigInt;
use silica_core::ast::{TermId, TermKind, TermManager};

use crate::simplify::{SimplifierPlugin, SimplifyCtx};

/// Literal folding for string concatenation and length.
pub struct SeqPlugin;

fn str_lit(tm: &TermManager, t: TermId) -> Option<String> {
    match tm.get(t).map(|t| &t.kind) {
        Some(TermKind::StringLit(s)) => Some(s.clone()),
        _ => None,
    }
}

impl SimplifierPlugin for SeqPlugin {
    fn name(&self) -> &'static str {
        "seq"
    }

    fn reduce(&self, tm: &mut TermManager, t: TermId, _ctx: &SimplifyCtx) -> Option<TermId> {
        let kind = tm.get(t)?.kind.clone();
        match kind {
            TermKind::StrConcat(a, b) => {
                if let Some(sa) = str_lit(tm, a) {
                    if sa.is_empty() {
                        return Some(b);
                    }
                    if let Some(sb) = str_lit(tm, b) {
                        return Some(tm.mk_str(&format!("{sa}{sb}")));
                    }
                }
                if let Some(sb) = str_lit(tm, b) {
                    if sb.is_empty() {
                        return Some(a);
                    }
                }
                None
            }
            TermKind::StrLen(a) => {
                let s = str_lit(tm, a)?;
                Some(tm.mk_int(BigInt::from(s.chars().count())))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simplify(tm: &mut TermManager, t: TermId) -> TermId {
        let ctx = SimplifyCtx {
            eliminate_and: false,
            presimp: false,
        };
        SeqPlugin.reduce(tm, t, &ctx).unwrap_or(t)
    }

    #[test]
    fn test_concat_literals() {
        let mut tm = TermManager::new();
        let a = tm.mk_str("foo");
        let b = tm.mk_str("bar");
        let concat = tm.mk_str_concat(a, b);
        let expected = tm.mk_str("foobar");
        assert_eq!(simplify(&mut tm, concat), expected);
    }

    #[test]
    fn test_empty_unit() {
        let mut tm = TermManager::new();
        let x = tm.mk_var("s", tm.sorts.string_sort);
        let empty = tm.mk_str("");
        let concat = tm.mk_str_concat(x, empty);
        assert_eq!(simplify(&mut tm, concat), x);
    }

    #[test]
    fn test_length_of_literal() {
        let mut tm = TermManager::new();
        let s = tm.mk_str("hello");
        let len = tm.mk_str_len(s);
        let expected = tm.mk_int(BigInt::from(5));
        assert_eq!(simplify(&mut tm, len), expected);
    }
}
