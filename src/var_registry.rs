//! Variable registry for query execution
//!
//! Maps variable names (e.g., "?s", "?name") to compact `VarId` offsets
//! used throughout the rowsource pipeline, and holds the explicit
//! binding environment (`BindingContext`) that replaces per-variable
//! "current value" slots.

use crate::literal::Literal;
use std::collections::HashMap;
use std::sync::Arc;

/// Compact variable identifier - offset into row columns
///
/// u16 supports up to 65K variables per query (sufficient for any realistic query).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub u16);

impl VarId {
    /// Get the underlying offset value
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind of variable
///
/// Anonymous variables are compiler-introduced (blank-node scoped helpers);
/// they intern separately from normal variables of the same name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum VarKind {
    #[default]
    Normal,
    Anonymous,
}

/// An interned variable: identity is the (name, kind) pair, offset is dense
/// and never reused while the registry lives.
#[derive(Clone, Debug)]
pub struct Variable {
    pub id: VarId,
    pub name: Arc<str>,
    pub kind: VarKind,
}

/// Registry mapping (name, kind) pairs to dense `VarId` offsets
///
/// Uses `Arc<str>` for cheap cloning and deduplication. One registry is
/// shared per query execution; operators hold non-owning handles and only
/// mutate it through `get_or_insert`.
#[derive(Debug, Default)]
pub struct VarRegistry {
    key_to_id: HashMap<(Arc<str>, VarKind), VarId>,
    vars: Vec<Variable>,
}

impl VarRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get existing VarId or intern a new variable
    ///
    /// Each (name, kind) pair maps to exactly one variable; repeated calls
    /// return the same offset.
    pub fn get_or_insert(&mut self, name: &str, kind: VarKind) -> VarId {
        if let Some(&id) = self.key_to_id.get(&(Arc::from(name), kind)) {
            return id;
        }

        // Guardrail: VarId is u16; exceeding this would silently wrap and
        // corrupt row offsets. Only reachable when interning a new name.
        assert!(
            self.vars.len() < u16::MAX as usize,
            "VarRegistry capacity exceeded ({}). VarId is u16; refusing to wrap.",
            self.vars.len()
        );

        let id = VarId(self.vars.len() as u16);
        let arc_name: Arc<str> = Arc::from(name);
        self.key_to_id.insert((arc_name.clone(), kind), id);
        self.vars.push(Variable {
            id,
            name: arc_name,
            kind,
        });
        id
    }

    /// Get the VarId for a (name, kind) pair, if interned
    pub fn get(&self, name: &str, kind: VarKind) -> Option<VarId> {
        self.key_to_id.get(&(Arc::from(name), kind)).copied()
    }

    /// Get the variable for a VarId
    pub fn variable(&self, id: VarId) -> Option<&Variable> {
        self.vars.get(id.index())
    }

    /// Get the name for a VarId, or "?" for an unknown offset
    pub fn name(&self, id: VarId) -> &str {
        self.variable(id).map_or("?", |v| v.name.as_ref())
    }

    /// Number of interned variables
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Explicit mutable binding environment
///
/// Holds the "current value" of each variable during evaluation. This is
/// the state the assignment source writes on success and expression
/// evaluation reads, kept off the shared `Variable` objects so overlapping
/// evaluations cannot stomp each other through a global slot.
#[derive(Debug, Default)]
pub struct BindingContext {
    slots: Vec<Option<Literal>>,
}

impl BindingContext {
    /// Create an empty binding environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a variable, if bound
    pub fn get(&self, id: VarId) -> Option<&Literal> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    /// Bind a variable to a value, growing the slot vector as needed
    pub fn set(&mut self, id: VarId, value: Literal) {
        if self.slots.len() <= id.index() {
            self.slots.resize(id.index() + 1, None);
        }
        self.slots[id.index()] = Some(value);
    }

    /// Remove the current value of a variable
    pub fn unset(&mut self, id: VarId) {
        if let Some(slot) = self.slots.get_mut(id.index()) {
            *slot = None;
        }
    }

    /// Clear every binding
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable() {
        let mut reg = VarRegistry::new();
        let a = reg.get_or_insert("a", VarKind::Normal);
        let b = reg.get_or_insert("b", VarKind::Normal);
        let a2 = reg.get_or_insert("a", VarKind::Normal);

        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn kinds_intern_separately() {
        let mut reg = VarRegistry::new();
        let normal = reg.get_or_insert("x", VarKind::Normal);
        let anon = reg.get_or_insert("x", VarKind::Anonymous);

        assert_ne!(normal, anon);
        assert_eq!(reg.get("x", VarKind::Normal), Some(normal));
        assert_eq!(reg.get("x", VarKind::Anonymous), Some(anon));
        assert_eq!(reg.name(normal), "x");
    }

    #[test]
    fn variable_lookup_returns_interned_record() {
        let mut reg = VarRegistry::new();
        let id = reg.get_or_insert("who", VarKind::Normal);
        let anon = reg.get_or_insert("who", VarKind::Anonymous);

        let var = reg.variable(id).unwrap();
        assert_eq!(var.id, id);
        assert_eq!(var.kind, VarKind::Normal);
        assert_eq!(var.name.as_ref(), "who");

        assert_eq!(reg.variable(anon).unwrap().kind, VarKind::Anonymous);
        assert!(reg.variable(VarId(99)).is_none());
    }

    #[test]
    fn binding_context_set_get_unset() {
        let mut reg = VarRegistry::new();
        let v = reg.get_or_insert("v", VarKind::Normal);

        let mut env = BindingContext::new();
        assert!(env.get(v).is_none());

        env.set(v, Literal::integer(7));
        assert_eq!(env.get(v), Some(&Literal::integer(7)));

        env.unset(v);
        assert!(env.get(v).is_none());
    }
}
