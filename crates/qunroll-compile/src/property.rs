//! `PropertySet` for pass communication.
//!
//! Passes share data through a [`PropertySet`]: the target basis as a typed
//! field, plus arbitrary results keyed by their Rust type.
//!
//! ```
//! use qunroll_compile::{BasisSet, PropertySet};
//!
//! #[derive(Debug, PartialEq)]
//! struct ExpandedGates(usize);
//!
//! let mut props = PropertySet::new().with_basis(BasisSet::ibm_qx());
//! props.insert(ExpandedGates(3));
//!
//! assert!(props.basis_gates.as_ref().unwrap().contains("u2"));
//! assert_eq!(props.get::<ExpandedGates>(), Some(&ExpandedGates(3)));
//! ```

use std::any::{Any, TypeId};
use std::fmt;

use rustc_hash::FxHashMap;

use crate::basis::BasisSet;

/// Properties shared between compilation passes.
#[derive(Default)]
pub struct PropertySet {
    /// Target basis gates.
    ///
    /// Read by the unroller when it was built without an explicit basis.
    pub basis_gates: Option<BasisSet>,

    /// Custom properties storage (type-erased).
    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PropertySet {
    /// Create a new empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target basis.
    #[must_use]
    pub fn with_basis(mut self, basis: BasisSet) -> Self {
        self.basis_gates = Some(basis);
        self
    }

    /// Insert a custom property, replacing any value of the same type.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a custom property.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.custom
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Get a mutable custom property.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.custom
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Remove a custom property.
    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.custom
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|v| *v)
    }
}

impl fmt::Debug for PropertySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySet")
            .field("basis_gates", &self.basis_gates)
            .field("custom", &self.custom.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Counter(u32);

    #[test]
    fn test_custom_properties() {
        let mut props = PropertySet::new();
        assert!(props.get::<Counter>().is_none());

        props.insert(Counter(1));
        props.get_mut::<Counter>().unwrap().0 += 1;
        assert_eq!(props.get::<Counter>(), Some(&Counter(2)));

        assert_eq!(props.remove::<Counter>(), Some(Counter(2)));
        assert!(props.get::<Counter>().is_none());
    }

    #[test]
    fn test_insert_replaces_same_type() {
        let mut props = PropertySet::new();
        props.insert(Counter(1));
        props.insert(Counter(5));
        assert_eq!(props.get::<Counter>(), Some(&Counter(5)));
    }
}
