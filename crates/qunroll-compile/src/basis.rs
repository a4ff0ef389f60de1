//! Target basis gate sets.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The set of gate names a target accepts.
///
/// Order is irrelevant and duplicates collapse. Directives (`measure`,
/// `reset`, `barrier`, `delay`) never need to be listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BasisSet {
    gates: BTreeSet<String>,
}

impl BasisSet {
    /// Create a basis from gate names.
    pub fn new(gates: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            gates: gates.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if a gate name is in the basis.
    #[inline]
    pub fn contains(&self, gate: &str) -> bool {
        self.gates.contains(gate)
    }

    /// Iterate over the gate names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.gates.iter().map(String::as_str)
    }

    /// Number of gate names.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Check if the basis is empty.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// The `u1`, `u2`, `u3`, `cx`, `id` basis of IBM QX devices.
    pub fn ibm_qx() -> Self {
        Self::new(["u1", "u2", "u3", "cx", "id"])
    }

    /// The minimal `u3` + `cx` basis every standard rule bottoms out in.
    pub fn u3_cx() -> Self {
        Self::new(["u3", "cx"])
    }

    /// Clifford+T: `h`, `t`, `tdg`, `cx`.
    pub fn clifford_t() -> Self {
        Self::new(["h", "t", "tdg", "cx"])
    }
}

impl<S: Into<String>> FromIterator<S> for BasisSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl fmt::Display for BasisSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, gate) in self.gates.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{gate}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_and_duplicates_ignored() {
        let a = BasisSet::new(["cx", "u3", "cx"]);
        let b = BasisSet::new(["u3", "cx"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert_eq!(a, BasisSet::u3_cx());
    }

    #[test]
    fn test_display_is_sorted() {
        assert_eq!(BasisSet::clifford_t().to_string(), "{cx, h, t, tdg}");
        assert!(BasisSet::default().is_empty());
    }

    #[test]
    fn test_yaml_is_a_plain_list() {
        let basis: BasisSet = serde_yaml_ng::from_str("[u2, cx]").unwrap();
        assert!(basis.contains("u2"));
        assert!(!basis.contains("h"));
    }
}
