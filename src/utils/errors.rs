//! Error types for the PIP solver.
//!
//! Errors are grouped by what went wrong: exact arithmetic, malformed
//! input, and exhausted resources. An empty feasible region is not an
//! error; it is reported as a `NoSolution` node of the resulting quast.

use thiserror::Error;
use std::fmt;

/// Top-level error type for the solver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipError {
    /// Exact arithmetic failed (division by zero, inexact division)
    #[error("Arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),

    /// The problem handed to the solver is malformed
    #[error("Infeasible input: {0}")]
    InfeasibleInput(#[from] InputError),

    /// An iteration cap or time limit was hit
    #[error("Resource exceeded: {0}")]
    ResourceExceeded(#[from] ResourceError),

    /// Broken tableau invariant
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error raised by the exact integer layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ArithmeticError {
    /// The error message
    pub message: String,
    /// The kind of arithmetic error
    pub kind: ArithmeticErrorKind,
}

impl fmt::Display for ArithmeticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Kinds of arithmetic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticErrorKind {
    /// Division or modulo by zero
    DivisionByZero,
    /// An exact division left a remainder
    InexactDivision,
}

impl ArithmeticError {
    pub(crate) fn division_by_zero(what: &str) -> Self {
        Self {
            message: format!("division by zero in {}", what),
            kind: ArithmeticErrorKind::DivisionByZero,
        }
    }
}

/// Error raised when the input matrices or parameter values are malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct InputError {
    /// The error message
    pub message: String,
    /// The kind of input error
    pub kind: InputErrorKind,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Kinds of input errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputErrorKind {
    /// A row does not have the width of the matrix
    RaggedRow,
    /// Domain and context disagree on the number of parameters
    ColumnMismatch,
    /// The big parameter index does not name a parameter
    BigParameterOutOfRange,
    /// Wrong number of parameter values given for evaluation
    ParameterCount,
}

impl InputError {
    pub(crate) fn new(kind: InputErrorKind, message: impl Into<String>) -> Self {
        Self { message: message.into(), kind }
    }
}

/// Error raised when the solver gives up on a pathological input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ResourceError {
    /// The error message
    pub message: String,
    /// The kind of resource that ran out
    pub kind: ResourceErrorKind,
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Kinds of exhausted resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceErrorKind {
    /// Too many engine iterations
    IterationLimit,
    /// Wall-clock limit reached
    TimeLimit,
}

/// Result type using PipError.
pub type PipResult<T> = Result<T, PipError>;
