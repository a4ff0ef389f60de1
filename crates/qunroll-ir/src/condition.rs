//! Classical conditions gating whether an operation executes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IrError, IrResult};
use crate::qubit::{ClassicalRegister, ClbitId};

/// What a condition compares against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionTarget {
    /// A whole classical register, read as a little-endian integer.
    Register(String),
    /// A single classical bit.
    Bit(ClbitId),
}

/// Classical condition for conditional operations.
///
/// The operation runs only if the target currently equals `value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassicalCondition {
    /// The register or bit being read.
    pub target: ConditionTarget,
    /// The value to compare against.
    pub value: u64,
}

impl ClassicalCondition {
    /// Condition on a register equalling `value`.
    pub fn register(name: impl Into<String>, value: u64) -> Self {
        Self {
            target: ConditionTarget::Register(name.into()),
            value,
        }
    }

    /// Condition on a single bit.
    pub fn bit(clbit: ClbitId, value: bool) -> Self {
        Self {
            target: ConditionTarget::Bit(clbit),
            value: u64::from(value),
        }
    }

    /// Resolve the classical bits this condition reads, least significant first.
    ///
    /// Fails if the register is unknown or `value` cannot be represented in
    /// the register's width.
    pub fn clbits(&self, registers: &[ClassicalRegister]) -> IrResult<Vec<ClbitId>> {
        match &self.target {
            ConditionTarget::Bit(clbit) => {
                if self.value > 1 {
                    return Err(IrError::InvalidCondition(format!(
                        "bit {clbit} compared against {}",
                        self.value
                    )));
                }
                Ok(vec![*clbit])
            }
            ConditionTarget::Register(name) => {
                let register = registers
                    .iter()
                    .find(|r| &r.name == name)
                    .ok_or_else(|| IrError::RegisterNotFound(name.clone()))?;
                if register.is_empty() {
                    return Err(IrError::InvalidCondition(format!(
                        "register '{name}' has no bits"
                    )));
                }
                let width = register.len();
                if width < 64 && self.value >> width != 0 {
                    return Err(IrError::InvalidCondition(format!(
                        "value {} does not fit in {width}-bit register '{name}'",
                        self.value
                    )));
                }
                Ok(register.bits.clone())
            }
        }
    }

    /// Evaluate the condition given the current value of each classical bit.
    pub fn is_satisfied(
        &self,
        registers: &[ClassicalRegister],
        bit_value: impl Fn(ClbitId) -> bool,
    ) -> IrResult<bool> {
        let bits = self.clbits(registers)?;
        Ok(bits.iter().enumerate().all(|(i, &clbit)| {
            let expected = i < 64 && (self.value >> i) & 1 == 1;
            bit_value(clbit) == expected
        }))
    }
}

impl fmt::Display for ClassicalCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            ConditionTarget::Register(name) => write!(f, "{name} == {}", self.value),
            ConditionTarget::Bit(clbit) => write!(f, "{clbit} == {}", self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cr() -> Vec<ClassicalRegister> {
        vec![ClassicalRegister::new("cr", [ClbitId(0), ClbitId(1)])]
    }

    #[test]
    fn test_register_value_is_little_endian() {
        let cond = ClassicalCondition::register("cr", 1);
        assert!(cond.is_satisfied(&cr(), |c| c == ClbitId(0)).unwrap());
        assert!(!cond.is_satisfied(&cr(), |c| c == ClbitId(1)).unwrap());
        assert!(!cond.is_satisfied(&cr(), |_| true).unwrap());
    }

    #[test]
    fn test_value_wider_than_register() {
        let cond = ClassicalCondition::register("cr", 4);
        assert!(matches!(cond.clbits(&cr()), Err(IrError::InvalidCondition(_))));
    }

    #[test]
    fn test_unknown_register() {
        let cond = ClassicalCondition::register("nope", 0);
        assert!(matches!(cond.clbits(&cr()), Err(IrError::RegisterNotFound(name)) if name == "nope"));
    }

    #[test]
    fn test_single_bit() {
        let cond = ClassicalCondition::bit(ClbitId(1), true);
        assert_eq!(cond.clbits(&[]).unwrap(), vec![ClbitId(1)]);
        assert!(cond.is_satisfied(&[], |_| true).unwrap());
        assert_eq!(cond.to_string(), "c1 == 1");
    }
}
