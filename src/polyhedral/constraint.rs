//! Linear constraints over exact integer coefficients.
//!
//! A constraint is a row `[c_0, ..., c_{n-1}, k]` read as
//! `c_0 * v_0 + ... + c_{n-1} * v_{n-1} + k` and compared with zero:
//! - Inequality: expr >= 0
//! - Equality: expr = 0

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A linear constraint row. The last coefficient is the constant term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constraint {
    /// Coefficients followed by the constant
    pub coeffs: Vec<BigInt>,
    /// Kind of constraint
    pub kind: ConstraintKind,
}

/// Kind of constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// Greater than or equal: expr >= 0
    Inequality,
    /// Equal: expr = 0
    Equality,
}

impl Constraint {
    /// Create a new constraint.
    pub fn new(coeffs: Vec<BigInt>, kind: ConstraintKind) -> Self {
        Self { coeffs, kind }
    }

    /// Create a constraint from machine integers.
    pub fn from_i64(coeffs: &[i64], kind: ConstraintKind) -> Self {
        Self::new(coeffs.iter().map(|&c| BigInt::from(c)).collect(), kind)
    }

    /// Create an inequality constraint: expr >= 0
    pub fn ge_zero(coeffs: Vec<BigInt>) -> Self {
        Self::new(coeffs, ConstraintKind::Inequality)
    }

    /// Create an equality constraint: expr = 0
    pub fn eq_zero(coeffs: Vec<BigInt>) -> Self {
        Self::new(coeffs, ConstraintKind::Equality)
    }

    /// Check if this is an equality constraint.
    pub fn is_equality(&self) -> bool {
        matches!(self.kind, ConstraintKind::Equality)
    }

    /// Check if this is an inequality constraint.
    pub fn is_inequality(&self) -> bool {
        matches!(self.kind, ConstraintKind::Inequality)
    }

    /// Number of columns, constant included.
    pub fn width(&self) -> usize {
        self.coeffs.len()
    }

    /// The constant term.
    pub fn constant(&self) -> BigInt {
        self.coeffs.last().cloned().unwrap_or_else(BigInt::zero)
    }

    /// Value of the expression at a point (one value per non-constant column).
    pub fn evaluate(&self, values: &[BigRational]) -> BigRational {
        let n = self.width().saturating_sub(1);
        let linear = self.coeffs[..n]
            .iter()
            .zip(values)
            .fold(BigRational::zero(), |acc, (c, v)| {
                acc + BigRational::from_integer(c.clone()) * v
            });
        linear + BigRational::from_integer(self.constant())
    }

    /// Check if this constraint is satisfied by the given point.
    pub fn is_satisfied(&self, values: &[BigRational]) -> bool {
        let value = self.evaluate(values);
        match self.kind {
            ConstraintKind::Inequality => !value.is_negative(),
            ConstraintKind::Equality => value.is_zero(),
        }
    }

    /// Negate an inequality over the integers: `expr >= 0` becomes `-expr - 1 >= 0`.
    ///
    /// Equalities are returned unchanged; their negation is a disjunction.
    pub fn negate(&self) -> Self {
        match self.kind {
            ConstraintKind::Inequality => {
                let mut coeffs: Vec<BigInt> = self.coeffs.iter().map(|c| -c).collect();
                if let Some(k) = coeffs.last_mut() {
                    *k -= BigInt::one();
                }
                Self::ge_zero(coeffs)
            }
            ConstraintKind::Equality => self.clone(),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.width().saturating_sub(1);
        let mut first = true;
        for (i, c) in self.coeffs[..n].iter().enumerate() {
            if c.is_zero() {
                continue;
            }
            let prefix = match (first, c.is_negative()) {
                (true, false) => "",
                (true, true) => "-",
                (false, false) => " + ",
                (false, true) => " - ",
            };
            let magnitude = c.abs();
            if magnitude.is_one() {
                write!(f, "{}v{}", prefix, i)?;
            } else {
                write!(f, "{}{}*v{}", prefix, magnitude, i)?;
            }
            first = false;
        }
        let k = self.constant();
        if first {
            write!(f, "{}", k)?;
        } else if k.is_positive() {
            write!(f, " + {}", k)?;
        } else if k.is_negative() {
            write!(f, " - {}", -k)?;
        }
        match self.kind {
            ConstraintKind::Inequality => write!(f, " >= 0"),
            ConstraintKind::Equality => write!(f, " = 0"),
        }
    }
}
