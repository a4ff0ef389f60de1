//! Parameter expressions for gate angles.
//!
//! Angles are either plain numbers or small expression trees over named
//! symbols. Decomposition rules build new angles from old ones with the
//! arithmetic operators and call [`ParameterExpression::simplify`], so a
//! numeric input always produces a numeric [`ParameterExpression::Constant`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::fmt;

/// Unary functions allowed inside an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamFunction {
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
    Sqrt,
}

impl ParamFunction {
    /// Look up a function by its source-text name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(Self::Sin),
            "cos" => Some(Self::Cos),
            "tan" => Some(Self::Tan),
            "exp" => Some(Self::Exp),
            "ln" => Some(Self::Ln),
            "sqrt" => Some(Self::Sqrt),
            _ => None,
        }
    }

    /// Source-text name of the function.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Exp => "exp",
            Self::Ln => "ln",
            Self::Sqrt => "sqrt",
        }
    }

    fn eval(self, x: f64) -> f64 {
        match self {
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Exp => x.exp(),
            Self::Ln => x.ln(),
            Self::Sqrt => x.sqrt(),
        }
    }
}

/// A symbolic or concrete parameter expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterExpression {
    /// A constant numeric value.
    Constant(f64),
    /// A symbolic parameter.
    Symbol(String),
    /// The constant π.
    Pi,
    /// Negation.
    Neg(Box<ParameterExpression>),
    /// Addition.
    Add(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Subtraction.
    Sub(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Multiplication.
    Mul(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Division.
    Div(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Function application, e.g. `cos(theta)`.
    Func(ParamFunction, Box<ParameterExpression>),
}

impl ParameterExpression {
    /// Create a constant parameter.
    pub fn constant(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }

    /// Create a symbolic parameter.
    pub fn symbol(name: impl Into<String>) -> Self {
        ParameterExpression::Symbol(name.into())
    }

    /// Create a π constant.
    pub fn pi() -> Self {
        ParameterExpression::Pi
    }

    /// Apply a unary function.
    pub fn func(function: ParamFunction, arg: ParameterExpression) -> Self {
        ParameterExpression::Func(function, Box::new(arg))
    }

    /// Check if this expression contains any symbols.
    pub fn is_symbolic(&self) -> bool {
        match self {
            ParameterExpression::Symbol(_) => true,
            ParameterExpression::Constant(_) | ParameterExpression::Pi => false,
            ParameterExpression::Neg(e) | ParameterExpression::Func(_, e) => e.is_symbolic(),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b) => a.is_symbolic() || b.is_symbolic(),
        }
    }

    /// Try to evaluate as a concrete f64 value.
    ///
    /// Returns `None` for symbolic expressions, division by zero, and
    /// functions evaluated outside their domain.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterExpression::Constant(v) => Some(*v),
            ParameterExpression::Symbol(_) => None,
            ParameterExpression::Pi => Some(PI),
            ParameterExpression::Neg(e) => e.as_f64().map(|v| -v),
            ParameterExpression::Add(a, b) => Some(a.as_f64()? + b.as_f64()?),
            ParameterExpression::Sub(a, b) => Some(a.as_f64()? - b.as_f64()?),
            ParameterExpression::Mul(a, b) => Some(a.as_f64()? * b.as_f64()?),
            ParameterExpression::Div(a, b) => {
                let divisor = b.as_f64()?;
                if divisor == 0.0 {
                    return None;
                }
                Some(a.as_f64()? / divisor)
            }
            ParameterExpression::Func(f, e) => Some(f.eval(e.as_f64()?)).filter(|v| v.is_finite()),
        }
    }

    /// Get all symbol names in this expression, sorted.
    pub fn symbols(&self) -> BTreeSet<String> {
        let mut set = BTreeSet::new();
        self.collect_symbols(&mut set);
        set
    }

    fn collect_symbols(&self, set: &mut BTreeSet<String>) {
        match self {
            ParameterExpression::Constant(_) | ParameterExpression::Pi => {}
            ParameterExpression::Symbol(name) => {
                set.insert(name.clone());
            }
            ParameterExpression::Neg(e) | ParameterExpression::Func(_, e) => {
                e.collect_symbols(set);
            }
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b) => {
                a.collect_symbols(set);
                b.collect_symbols(set);
            }
        }
    }

    /// Rebuild the tree bottom-up, replacing each leaf with `leaf(expr)`.
    fn map_leaves(&self, leaf: &impl Fn(&Self) -> Self) -> Self {
        let bin = |a: &Self, b: &Self| (Box::new(a.map_leaves(leaf)), Box::new(b.map_leaves(leaf)));
        match self {
            ParameterExpression::Constant(_)
            | ParameterExpression::Pi
            | ParameterExpression::Symbol(_) => leaf(self),
            ParameterExpression::Neg(e) => ParameterExpression::Neg(Box::new(e.map_leaves(leaf))),
            ParameterExpression::Func(f, e) => {
                ParameterExpression::Func(*f, Box::new(e.map_leaves(leaf)))
            }
            ParameterExpression::Add(a, b) => {
                let (a, b) = bin(a, b);
                ParameterExpression::Add(a, b)
            }
            ParameterExpression::Sub(a, b) => {
                let (a, b) = bin(a, b);
                ParameterExpression::Sub(a, b)
            }
            ParameterExpression::Mul(a, b) => {
                let (a, b) = bin(a, b);
                ParameterExpression::Mul(a, b)
            }
            ParameterExpression::Div(a, b) => {
                let (a, b) = bin(a, b);
                ParameterExpression::Div(a, b)
            }
        }
    }

    /// Bind a symbol to a value, returning a new expression.
    pub fn bind(&self, name: &str, value: f64) -> Self {
        self.map_leaves(&|leaf| match leaf {
            ParameterExpression::Symbol(n) if n == name => ParameterExpression::Constant(value),
            other => other.clone(),
        })
    }

    /// Fold every numeric subexpression into a single constant.
    pub fn simplify(&self) -> Self {
        if let Some(v) = self.as_f64() {
            return ParameterExpression::Constant(v);
        }
        let fold = |e: Self| match e.as_f64() {
            Some(v) => ParameterExpression::Constant(v),
            None => e,
        };
        match self {
            ParameterExpression::Neg(e) => fold(ParameterExpression::Neg(Box::new(e.simplify()))),
            ParameterExpression::Func(f, e) => {
                fold(ParameterExpression::Func(*f, Box::new(e.simplify())))
            }
            ParameterExpression::Add(a, b) => fold(a.simplify() + b.simplify()),
            ParameterExpression::Sub(a, b) => fold(a.simplify() - b.simplify()),
            ParameterExpression::Mul(a, b) => fold(a.simplify() * b.simplify()),
            ParameterExpression::Div(a, b) => fold(a.simplify() / b.simplify()),
            _ => self.clone(),
        }
    }
}

/// Renders in OpenQASM expression syntax, so output can be parsed back.
impl fmt::Display for ParameterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterExpression::Constant(v) => write!(f, "{v}"),
            ParameterExpression::Symbol(name) => write!(f, "{name}"),
            ParameterExpression::Pi => write!(f, "pi"),
            ParameterExpression::Neg(e) => write!(f, "-({e})"),
            ParameterExpression::Add(a, b) => write!(f, "({a} + {b})"),
            ParameterExpression::Sub(a, b) => write!(f, "({a} - {b})"),
            ParameterExpression::Mul(a, b) => write!(f, "({a} * {b})"),
            ParameterExpression::Div(a, b) => write!(f, "({a} / {b})"),
            ParameterExpression::Func(func, e) => write!(f, "{}({e})", func.name()),
        }
    }
}

impl From<f64> for ParameterExpression {
    fn from(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }
}

impl From<i32> for ParameterExpression {
    fn from(value: i32) -> Self {
        ParameterExpression::Constant(f64::from(value))
    }
}

impl std::ops::Add for ParameterExpression {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        ParameterExpression::Add(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Sub for ParameterExpression {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        ParameterExpression::Sub(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Mul for ParameterExpression {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        ParameterExpression::Mul(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Div for ParameterExpression {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        ParameterExpression::Div(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Neg for ParameterExpression {
    type Output = Self;

    fn neg(self) -> Self::Output {
        ParameterExpression::Neg(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pi_halves_fold_to_constant() {
        let half_pi = (ParameterExpression::pi() / 2.into()).simplify();
        assert_eq!(half_pi, ParameterExpression::Constant(PI / 2.0));
    }

    #[test]
    fn test_symbolic_stays_symbolic() {
        let theta = ParameterExpression::symbol("theta");
        let expr = (-(theta.clone()) / (ParameterExpression::constant(1.0) + 1.into())).simplify();
        assert!(expr.is_symbolic());
        assert_eq!(expr.as_f64(), None);
        assert_eq!(
            expr,
            ParameterExpression::Div(
                Box::new(ParameterExpression::Neg(Box::new(theta))),
                Box::new(ParameterExpression::Constant(2.0)),
            )
        );
    }

    #[test]
    fn test_bind_then_simplify() {
        let expr = ParameterExpression::symbol("a") * ParameterExpression::symbol("b");
        let bound = expr.bind("a", 3.0).bind("b", 0.5);
        assert_eq!(bound.simplify(), ParameterExpression::Constant(1.5));
        assert!(expr.symbols().contains("b"));
    }

    #[test]
    fn test_division_by_zero_is_not_numeric() {
        let expr = ParameterExpression::constant(1.0) / 0.into();
        assert_eq!(expr.as_f64(), None);
        assert!(matches!(expr.simplify(), ParameterExpression::Div(_, _)));
    }

    #[test]
    fn test_functions() {
        let expr = ParameterExpression::func(ParamFunction::Cos, ParameterExpression::pi());
        assert!((expr.as_f64().unwrap() + 1.0).abs() < 1e-12);
        let bad = ParameterExpression::func(ParamFunction::Ln, (-1).into());
        assert_eq!(bad.as_f64(), None);
        assert_eq!(ParamFunction::from_name("sqrt"), Some(ParamFunction::Sqrt));
    }

    #[test]
    fn test_display_is_qasm_syntax() {
        let expr = -(ParameterExpression::pi() / 4.into());
        assert_eq!(expr.to_string(), "-((pi / 4))");
        assert_eq!(ParameterExpression::constant(0.1).to_string(), "0.1");
    }
}
