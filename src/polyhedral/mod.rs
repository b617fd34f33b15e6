//! Input representation of polyhedral problems.
//!
//! This module provides the constraint systems handed to the solver:
//! - Constraint rows (inequalities and equalities)
//! - Constraint matrices for the domain and the parameter context

pub mod constraint;
pub mod matrix;

pub use constraint::{Constraint, ConstraintKind};
pub use matrix::ConstraintMatrix;
