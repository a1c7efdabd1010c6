//! Row-compatibility predicates shared across operators
//!
//! Two rows are "compatible" when they agree on the value of every variable
//! they share. The generic check treats unbound variables as agreeing with
//! anything, which makes two rows with completely disjoint variable domains
//! vacuously compatible - correct for join semantics, wrong for MINUS.
//! MINUS therefore uses its own predicate below.

use crate::literal::{self, CompareConfig};
use crate::row::Row;
use crate::var_registry::VarId;

/// Positions of the variables shared by two schemas, as
/// (left-slot, right-slot) index pairs
pub fn shared_variables(lhs_schema: &[VarId], rhs_schema: &[VarId]) -> Vec<(usize, usize)> {
    lhs_schema
        .iter()
        .enumerate()
        .filter_map(|(li, var)| {
            rhs_schema
                .iter()
                .position(|other| other == var)
                .map(|ri| (li, ri))
        })
        .collect()
}

/// Generic join compatibility: no shared variable is bound to two
/// different values
///
/// An unbound side never blocks compatibility. NOTE: when the two schemas
/// share no variables (or every shared variable is unbound on one side)
/// the answer is vacuously `true`. Join consumers rely on that; set
/// difference must not - use [`minus_compatible`] there instead.
pub fn rows_compatible(
    lhs: &Row,
    lhs_schema: &[VarId],
    rhs: &Row,
    rhs_schema: &[VarId],
    config: &CompareConfig,
) -> bool {
    for (li, ri) in shared_variables(lhs_schema, rhs_schema) {
        if let (Some(a), Some(b)) = (lhs.get(li), rhs.get(ri)) {
            if !literal::equals(a, b, config) {
                return false;
            }
        }
    }
    true
}

/// MINUS compatibility under SPARQL 1.1 rules
///
/// Compatible only if the rows share at least one variable that is bound on
/// both sides and every such doubly-bound shared variable holds equal
/// values. A shared variable unbound on either side is skipped, but if
/// every shared variable ends up skipped - or there are no shared
/// variables at all - the rows are incompatible, so disjoint-domain rows
/// never cancel each other.
pub fn minus_compatible(
    lhs: &Row,
    lhs_schema: &[VarId],
    rhs: &Row,
    rhs_schema: &[VarId],
    config: &CompareConfig,
) -> bool {
    let mut compared = 0usize;
    for (li, ri) in shared_variables(lhs_schema, rhs_schema) {
        if let (Some(a), Some(b)) = (lhs.get(li), rhs.get(ri)) {
            if !literal::equals(a, b, config) {
                return false;
            }
            compared += 1;
        }
    }
    compared > 0
}
