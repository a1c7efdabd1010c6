//! Ambient execution context shared by every rowsource
//!
//! Bundles the three pieces of shared state the operators consume: the
//! variable registry, the mutable binding environment, and the comparison
//! flags. The context is a cheap handle (`Clone` bumps two `Rc`s); the
//! engine is single-threaded by contract, so interior mutability is plain
//! `RefCell`, not a lock.

use crate::literal::CompareConfig;
use crate::var_registry::{BindingContext, VarRegistry};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

/// Shared per-query execution state
#[derive(Clone, Debug, Default)]
pub struct ExecutionContext {
    registry: Rc<RefCell<VarRegistry>>,
    bindings: Rc<RefCell<BindingContext>>,
    compare: CompareConfig,
}

impl ExecutionContext {
    /// Context with default comparison flags
    pub fn new() -> Self {
        Self::default()
    }

    /// Context with explicit comparison flags
    pub fn with_compare(compare: CompareConfig) -> Self {
        ExecutionContext {
            compare,
            ..Self::default()
        }
    }

    /// Shared variable registry (read)
    pub fn registry(&self) -> Ref<'_, VarRegistry> {
        self.registry.borrow()
    }

    /// Shared variable registry (write; interning only)
    pub fn registry_mut(&self) -> RefMut<'_, VarRegistry> {
        self.registry.borrow_mut()
    }

    /// Current binding environment (read)
    pub fn bindings(&self) -> Ref<'_, BindingContext> {
        self.bindings.borrow()
    }

    /// Current binding environment (write)
    pub fn bindings_mut(&self) -> RefMut<'_, BindingContext> {
        self.bindings.borrow_mut()
    }

    /// Comparison flags for equality/ordering
    pub fn compare(&self) -> CompareConfig {
        self.compare
    }

    /// Whether two handles refer to the same underlying query state
    pub fn same_query(&self, other: &ExecutionContext) -> bool {
        Rc::ptr_eq(&self.registry, &other.registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::var_registry::VarKind;

    #[test]
    fn clones_share_state() {
        let ctx = ExecutionContext::new();
        let other = ctx.clone();
        assert!(ctx.same_query(&other));

        let v = ctx.registry_mut().get_or_insert("x", VarKind::Normal);
        assert_eq!(other.registry().get("x", VarKind::Normal), Some(v));
    }

    #[test]
    fn independent_contexts_are_distinct() {
        let a = ExecutionContext::new();
        let b = ExecutionContext::new();
        assert!(!a.same_query(&b));
    }
}
