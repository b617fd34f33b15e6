//! Parametric integer programming.
//!
//! Given a domain `A x + B p + c >= 0` (some rows possibly equalities) and
//! a context `C p + d >= 0`, [`solve`] computes the lexicographic minimum
//! (or maximum) of the non-negative unknowns `x` as a function of the
//! parameters `p`, as a [`Quast`].
//!
//! The solve is organised as follows:
//! - [`tableau`]: exact simplex tableau and pivoting
//! - [`context`]: conditions on the parameters along a branch
//! - [`engine`]: the parametric dual simplex, branching and cut driving
//! - `cut`: Gomory cuts and new parameters
//! - [`quast`]: the result tree
//! - `materialize`: translation back to the caller's parameters

pub mod context;
pub(crate) mod cut;
pub mod engine;
pub(crate) mod materialize;
pub mod options;
pub mod quast;
pub mod tableau;

pub use engine::Solver;
pub use options::PipOptions;
pub use quast::{AffineForm, NewParameter, Quast, QuastLeaf, QuastNode};

use log::info;
use num_bigint::BigInt;
use num_traits::One;

use crate::pip::context::Context;
use crate::pip::engine::Mode;
use crate::pip::materialize::{materialize, ParameterLayout, Shift};
use crate::pip::tableau::{Row, RowStatus, Tableau};
use crate::polyhedral::{ConstraintKind, ConstraintMatrix};
use crate::utils::errors::{InputError, InputErrorKind, PipResult};

/// Solve a parametric problem with a fresh [`Solver`].
///
/// `domain` has the columns `[unknowns..., parameters..., constant]`,
/// `context` `[parameters..., constant]`; the number of parameters is
/// read from the context. `big_param` is the index, among the parameters,
/// of a parameter standing for an arbitrarily large value.
pub fn solve(
    domain: &ConstraintMatrix,
    context: &ConstraintMatrix,
    big_param: Option<usize>,
    options: &PipOptions,
) -> PipResult<Quast> {
    Solver::new(options.clone()).solve(domain, context, big_param)
}

impl Solver {
    /// Solve a parametric problem.
    ///
    /// The iteration count accumulates over successive solves; the time
    /// limit applies to each solve separately.
    pub fn solve(
        &mut self,
        domain: &ConstraintMatrix,
        context: &ConstraintMatrix,
        big_param: Option<usize>,
    ) -> PipResult<Quast> {
        self.restart_clock();
        let options = self.options().clone();
        let (nn, np) = dimensions(domain, context)?;
        if let Some(bg) = big_param {
            if bg >= np {
                return Err(InputError::new(
                    InputErrorKind::BigParameterOutOfRange,
                    format!("big parameter {} but only {} parameters", bg, np),
                )
                .into());
            }
        }

        let shift = if !options.shifts_unknowns() {
            Shift::None
        } else if options.maximize {
            Shift::Maximize
        } else {
            Shift::Unrestricted
        };
        let layout = ParameterLayout::new(np, big_param, shift, options.urs_params);
        let nparm = layout.internal_count();
        if options.verbosity > 0 {
            info!(
                "{} unknowns, {} parameters ({} internal), {} constraints, {} context rows",
                nn,
                np,
                nparm,
                domain.nrows(),
                context.nrows()
            );
        }

        let mut ctx = Context::new(nparm);
        for constraint in context.iter() {
            let (params, constant) = constraint.coeffs.split_at(np);
            let mut row = layout.to_internal(params);
            row.extend_from_slice(constant);
            if constraint.is_equality() {
                ctx.push(row.iter().map(|v| -v).collect())?;
            }
            ctx.push(row)?;
        }
        if options.integer {
            ctx.tighten()?;
        }
        if !ctx.is_empty() && !self.is_feasible(&ctx, None)? {
            if options.verbosity > 0 {
                info!("empty context");
            }
            return Ok(Quast::no_solution());
        }

        let mut tab = Tableau::new(nn, nparm);
        let mut origin = 0;
        for constraint in domain.iter() {
            let row = domain_row(&layout, nn, &constraint.coeffs);
            let negated: Vec<BigInt> = row.iter().map(|v| -v).collect();
            tab.push_row(Row::dense(row, BigInt::one(), RowStatus::Unknown).with_origin(origin))?;
            origin += 1;
            if constraint.is_equality() {
                tab.push_row(Row::dense(negated, BigInt::one(), RowStatus::Unknown).with_origin(origin))?;
                origin += 1;
            }
        }
        if options.integer {
            tab.tighten_rows()?;
        }

        let mode = Mode {
            integer: options.integer,
            dual: !options.integer && options.compute_dual,
            bigparm: layout.big.map(|bg| tab.param_col(bg)),
        };
        let raw = self.explore(tab, ctx, mode)?;

        let kinds: Vec<ConstraintKind> = domain.iter().map(|c| c.kind).collect();
        let quast = materialize(raw, &layout, &kinds)?;
        Ok(if options.simplify { quast.simplify() } else { quast })
    }
}

/// Number of unknowns and parameters.
fn dimensions(domain: &ConstraintMatrix, context: &ConstraintMatrix) -> PipResult<(usize, usize)> {
    let np = context.ncols().checked_sub(1).ok_or_else(|| {
        InputError::new(InputErrorKind::ColumnMismatch, "context matrix has no constant column")
    })?;
    let nn = domain.ncols().checked_sub(np + 1).ok_or_else(|| {
        InputError::new(
            InputErrorKind::ColumnMismatch,
            format!(
                "domain has {} columns, fewer than the {} parameters and constant of the context",
                domain.ncols(),
                np
            ),
        )
    })?;
    Ok((nn, np))
}

/// A domain row in tableau order `[unknowns..., constant, parameters...]`,
/// with the unknowns shifted by the big parameter when asked to.
fn domain_row(layout: &ParameterLayout, nn: usize, coeffs: &[BigInt]) -> Vec<BigInt> {
    let (unknowns, rest) = coeffs.split_at(nn);
    let (params, constant) = rest.split_at(rest.len() - 1);

    let mut row: Vec<BigInt> = match layout.shift {
        Shift::Maximize => unknowns.iter().map(|a| -a).collect(),
        _ => unknowns.to_vec(),
    };
    row.extend_from_slice(constant);

    let mut internal = layout.to_internal(params);
    if let Some(bg) = layout.big {
        let sum: BigInt = unknowns.iter().sum();
        match layout.shift {
            Shift::Maximize => internal[bg] += sum,
            Shift::Unrestricted => internal[bg] -= sum,
            Shift::None => {}
        }
    }
    row.extend(internal);
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::PipError;
    use std::time::Duration;

    fn ints(v: &[i64]) -> Vec<BigInt> {
        v.iter().map(|&x| BigInt::from(x)).collect()
    }

    #[test]
    fn test_dimensions() {
        let domain = ConstraintMatrix::new(4);
        let context = ConstraintMatrix::new(2);
        assert_eq!(dimensions(&domain, &context).unwrap(), (2, 1));
        assert!(dimensions(&ConstraintMatrix::new(1), &context).is_err());
        assert!(dimensions(&domain, &ConstraintMatrix::new(0)).is_err());
    }

    #[test]
    fn test_domain_row_shift() {
        // x + 2y - N + 3 >= 0, maximised with an introduced big parameter
        let layout = ParameterLayout::new(1, None, Shift::Maximize, false);
        let row = domain_row(&layout, 2, &ints(&[1, 2, -1, 3]));
        assert_eq!(row, ints(&[-1, -2, 3, -1, 3]));

        let layout = ParameterLayout::new(1, None, Shift::Unrestricted, false);
        let row = domain_row(&layout, 2, &ints(&[1, 2, -1, 3]));
        assert_eq!(row, ints(&[1, 2, 3, -1, -3]));
    }

    #[test]
    fn test_big_parameter_out_of_range() {
        let domain = ConstraintMatrix::inequalities(3, vec![vec![1, 0, 0]]).unwrap();
        let context = ConstraintMatrix::new(2);
        let err = solve(&domain, &context, Some(1), &PipOptions::default()).unwrap_err();
        match err {
            PipError::InfeasibleInput(e) => assert_eq!(e.kind, InputErrorKind::BigParameterOutOfRange),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_empty_context() {
        let domain = ConstraintMatrix::inequalities(3, vec![vec![1, 0, 0]]).unwrap();
        // N >= 1 and N <= 0
        let context = ConstraintMatrix::inequalities(2, vec![vec![1, -1], vec![-1, 0]]).unwrap();
        let q = solve(&domain, &context, None, &PipOptions::default()).unwrap();
        assert!(q.is_no_solution());
    }

    #[test]
    fn test_time_limit_counts_from_solve() {
        let domain = ConstraintMatrix::inequalities(3, vec![vec![1, 0, -2], vec![-1, 1, -1]]).unwrap();
        let context = ConstraintMatrix::new(1);
        let options = PipOptions::default().with_time_limit(Duration::from_millis(500));
        let mut solver = Solver::new(options);
        std::thread::sleep(Duration::from_millis(600));

        let q = solver.solve(&domain, &context, None).unwrap();
        assert_eq!(q.evaluate_i64(&[]).unwrap().unwrap().len(), 2);
    }

    #[test]
    fn test_solver_counts_iterations() {
        let domain = ConstraintMatrix::inequalities(2, vec![vec![1, -3]]).unwrap();
        let context = ConstraintMatrix::new(1);
        let mut solver = Solver::new(PipOptions::default());
        let q = solver.solve(&domain, &context, None).unwrap();
        assert_eq!(q.as_leaf().unwrap().values[0], AffineForm::from_i64(&[3], 1));
        assert!(solver.iterations() > 0);
    }
}
