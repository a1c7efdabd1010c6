//! Solution rows flowing through the pipeline
//!
//! A `Row` is a fixed-width vector of literal slots (one per bound
//! variable, indexed by `VarId` offset) plus an optional vector of extra
//! slots used only for ORDER BY evaluation. Slot storage is shared behind
//! a single-threaded `Rc`: cloning a row is the old manual `usage++`, drop
//! is the `usage--`, and slot mutation is copy-on-write so only an
//! exclusive owner ever rewrites shared contents.

use crate::literal::Literal;
use crate::var_registry::{VarId, VarRegistry};
use std::fmt::Write as _;
use std::rc::Rc;

#[derive(Clone, Debug, Default)]
struct RowValues {
    bindings: Vec<Option<Literal>>,
    order: Vec<Option<Literal>>,
}

/// One solution (variable binding tuple)
///
/// The `offset` is per-handle bookkeeping: the position of this row in the
/// output sequence of whichever rowsource produced it, stamped by the
/// rowsource wrapper. It lives outside the shared slot storage so stamping
/// a produced row never mutates copies cached inside an operator.
#[derive(Clone, Debug)]
pub struct Row {
    values: Rc<RowValues>,
    offset: usize,
}

impl Row {
    /// Create a row with `size` unbound slots
    pub fn new(size: usize) -> Self {
        Self::with_order(size, 0)
    }

    /// Create a row with `size` unbound slots plus `order_size` extra
    /// slots for ORDER BY values
    pub fn with_order(size: usize, order_size: usize) -> Self {
        Row {
            values: Rc::new(RowValues {
                bindings: vec![None; size],
                order: vec![None; order_size],
            }),
            offset: 0,
        }
    }

    /// Create a row from explicit slot contents
    pub fn from_literals(bindings: Vec<Option<Literal>>) -> Self {
        Row {
            values: Rc::new(RowValues {
                bindings,
                order: Vec::new(),
            }),
            offset: 0,
        }
    }

    /// Number of binding slots (fixed at construction, grows only via `widen`)
    pub fn size(&self) -> usize {
        self.values.bindings.len()
    }

    /// Number of ORDER BY slots
    pub fn order_size(&self) -> usize {
        self.values.order.len()
    }

    /// Value of slot `i`, `None` when unbound or out of range
    pub fn get(&self, i: usize) -> Option<&Literal> {
        self.values.bindings.get(i).and_then(Option::as_ref)
    }

    /// ORDER BY value at slot `i`
    pub fn get_order(&self, i: usize) -> Option<&Literal> {
        self.values.order.get(i).and_then(Option::as_ref)
    }

    /// Rewrite slot `i` (copy-on-write when the storage is shared)
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range; the row width is fixed by the schema.
    pub fn set(&mut self, i: usize, value: Option<Literal>) {
        Rc::make_mut(&mut self.values).bindings[i] = value;
    }

    /// Rewrite ORDER BY slot `i` (copy-on-write when shared)
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    pub fn set_order(&mut self, i: usize, value: Option<Literal>) {
        Rc::make_mut(&mut self.values).order[i] = value;
    }

    /// Grow the row to `new_size` slots, preserving existing contents.
    /// A smaller `new_size` is a no-op: rows never shrink.
    pub fn widen(&mut self, new_size: usize) {
        if new_size > self.values.bindings.len() {
            Rc::make_mut(&mut self.values).bindings.resize(new_size, None);
        }
    }

    /// Independent copy of this row's slot storage
    pub fn deep_copy(&self) -> Row {
        Row {
            values: Rc::new((*self.values).clone()),
            offset: self.offset,
        }
    }

    /// Position of this row in its producing rowsource's output sequence
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Stamp the output position (called by the rowsource wrapper)
    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// Number of handles currently sharing this row's slot storage
    pub fn share_count(&self) -> usize {
        Rc::strong_count(&self.values)
    }

    /// Diagnostic rendering with variable names taken from the registry
    /// and the schema passed in by the caller (rows hold no back-reference
    /// to the rowsource that produced them)
    pub fn display_with(&self, registry: &VarRegistry, schema: &[VarId]) -> String {
        let mut out = String::from("[");
        for (i, slot) in self.values.bindings.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let name = schema.get(i).map_or("?", |&v| registry.name(v));
            match slot {
                Some(lit) => {
                    let _ = write!(out, "{name}={lit}");
                }
                None => {
                    let _ = write!(out, "{name}=NULL");
                }
            }
        }
        out.push(']');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::var_registry::VarKind;

    #[test]
    fn clone_shares_storage() {
        let row = Row::from_literals(vec![Some(Literal::integer(1)), None]);
        assert_eq!(row.share_count(), 1);

        let copy = row.clone();
        assert_eq!(row.share_count(), 2);
        assert_eq!(copy.share_count(), 2);

        drop(copy);
        assert_eq!(row.share_count(), 1);
    }

    #[test]
    fn deep_copy_is_independent() {
        let row = Row::from_literals(vec![Some(Literal::integer(1))]);
        let mut copy = row.deep_copy();
        assert_eq!(row.share_count(), 1);

        copy.set(0, Some(Literal::integer(2)));
        assert_eq!(row.get(0), Some(&Literal::integer(1)));
        assert_eq!(copy.get(0), Some(&Literal::integer(2)));
    }

    #[test]
    fn set_on_shared_row_copies_on_write() {
        let row = Row::from_literals(vec![Some(Literal::string("a"))]);
        let mut copy = row.clone();
        copy.set(0, Some(Literal::string("b")));

        // The rewrite detached the copy; the original is untouched
        assert_eq!(row.get(0), Some(&Literal::string("a")));
        assert_eq!(copy.get(0), Some(&Literal::string("b")));
        assert_eq!(row.share_count(), 1);
    }

    #[test]
    fn widen_preserves_and_never_shrinks() {
        let mut row = Row::from_literals(vec![Some(Literal::integer(7))]);
        row.widen(3);
        assert_eq!(row.size(), 3);
        assert_eq!(row.get(0), Some(&Literal::integer(7)));
        assert_eq!(row.get(1), None);

        row.widen(1);
        assert_eq!(row.size(), 3);
    }

    #[test]
    fn order_slots_are_separate_from_bindings() {
        let mut row = Row::with_order(1, 2);
        assert_eq!(row.size(), 1);
        assert_eq!(row.order_size(), 2);

        row.set_order(1, Some(Literal::integer(9)));
        assert_eq!(row.get_order(0), None);
        assert_eq!(row.get_order(1), Some(&Literal::integer(9)));
        assert_eq!(row.get(0), None);
    }

    #[test]
    fn set_order_on_shared_row_copies_on_write() {
        let mut row = Row::with_order(1, 1);
        row.set_order(0, Some(Literal::string("a")));
        let mut copy = row.clone();

        copy.set_order(0, Some(Literal::string("b")));
        assert_eq!(row.get_order(0), Some(&Literal::string("a")));
        assert_eq!(copy.get_order(0), Some(&Literal::string("b")));
        assert_eq!(row.share_count(), 1);
    }

    #[test]
    fn widen_and_deep_copy_keep_order_slots() {
        let mut row = Row::with_order(1, 1);
        row.set(0, Some(Literal::integer(1)));
        row.set_order(0, Some(Literal::integer(2)));

        row.widen(4);
        assert_eq!(row.size(), 4);
        assert_eq!(row.order_size(), 1);
        assert_eq!(row.get_order(0), Some(&Literal::integer(2)));

        let copy = row.deep_copy();
        assert_eq!(copy.order_size(), 1);
        assert_eq!(copy.get_order(0), Some(&Literal::integer(2)));
    }

    #[test]
    fn offset_is_per_handle() {
        let mut row = Row::new(1);
        let cached = row.clone();
        row.set_offset(5);
        assert_eq!(row.offset(), 5);
        assert_eq!(cached.offset(), 0);
        // Stamping did not detach the shared storage
        assert_eq!(row.share_count(), 2);
    }

    #[test]
    fn display_uses_registry_names() {
        let mut reg = VarRegistry::new();
        let a = reg.get_or_insert("a", VarKind::Normal);
        let b = reg.get_or_insert("b", VarKind::Normal);

        let row = Row::from_literals(vec![Some(Literal::string("x")), None]);
        assert_eq!(row.display_with(&reg, &[a, b]), "[a=\"x\", b=NULL]");
    }
}
