//! # polypip - Parametric Integer Programming
//!
//! An exact solver for parametric integer programs, the combinatorial
//! kernel behind dependence analysis and scheduling in polyhedral
//! compilers. Given constraints over integer unknowns and parameters it
//! computes, as a function of the parameters, the lexicographic minimum
//! (or maximum) of the unknowns:
//! - Exact big-integer simplex tableau with lexicographic pivoting
//! - Parametric case splits on the sign of parameter expressions
//! - Gomory cuts, with new parameters for parametric cuts
//! - A quasi-affine selection tree (quast) as the result
//!
//! ## Architecture
//!
//! ```text
//! ConstraintMatrix → Tableau → Engine (pivot / branch / cut) → Quast → Materialize
//! ```
//!
//! ## Example
//!
//! ```rust
//! use num_rational::BigRational;
//! use polypip::prelude::*;
//!
//! // 0 <= x, 2x = N: x = N / 2 when N is even, no solution otherwise
//! let domain = ConstraintMatrix::from_vec(3, vec![
//!     (ConstraintKind::Equality, vec![2, -1, 0]),
//! ]).unwrap();
//! let context = ConstraintMatrix::inequalities(2, vec![vec![1, 0]]).unwrap();
//!
//! let quast = polypip::solve(&domain, &context, None, &PipOptions::default()).unwrap();
//! assert!(quast.evaluate_i64(&[5]).unwrap().is_none());
//! let x = quast.evaluate_i64(&[4]).unwrap().unwrap();
//! assert_eq!(x, vec![BigRational::from_integer(2.into())]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod pip;
pub mod polyhedral;
pub mod utils;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::pip::{
        AffineForm, NewParameter, PipOptions, Quast, QuastLeaf, QuastNode, Solver,
    };
    pub use crate::polyhedral::{Constraint, ConstraintKind, ConstraintMatrix};
    pub use crate::utils::errors::*;
}

use pip::{PipOptions, Quast};
use polyhedral::ConstraintMatrix;
use utils::errors::PipResult;

/// Main entry point: solve `domain` under `context`.
///
/// See [`pip::solve`].
pub fn solve(
    domain: &ConstraintMatrix,
    context: &ConstraintMatrix,
    big_param: Option<usize>,
    options: &PipOptions,
) -> PipResult<Quast> {
    pip::solve(domain, context, big_param, options)
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
