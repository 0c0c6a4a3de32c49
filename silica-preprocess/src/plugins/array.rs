//! Array (select/store) simplification rules.

use silica_core::ast::{TermId, TermKind, TermManager};

use crate::simplify::{SimplifierPlugin, SimplifyCtx};

/// Read-over-write and redundant-write rules.
pub struct ArrayPlugin;

impl SimplifierPlugin for ArrayPlugin {
    fn name(&self) -> &'static str {
        "array"
    }

    fn reduce(&self, tm: &mut TermManager, t: TermId, _ctx: &SimplifyCtx) -> Option<TermId> {
        let kind = tm.get(t)?.kind.clone();
        match kind {
            TermKind::Select(array, index) => {
                let TermKind::Store(base, widx, value) = tm.get(array)?.kind.clone() else {
                    return None;
                };
                if index == widx {
                    return Some(value);
                }
                if tm.is_value(index) && tm.is_value(widx) {
                    // distinct value indices cannot alias
                    return Some(tm.mk_select(base, index));
                }
                None
            }
            TermKind::Store(array, index, value) => {
                let TermKind::Select(base, ridx) = tm.get(value)?.kind.clone() else {
                    return None;
                };
                if base == array && ridx == index {
                    return Some(array);
                }
                None
            }
            _ => None,
        }
    }
}
