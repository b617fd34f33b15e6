//! The parametric simplex engine.
//!
//! [`Solver::explore`] drives one tableau to the parametric lexicographic
//! minimum of its unknowns under a context. Rows are made non-negative by
//! pivoting; when the sign of a row depends on the parameters, the
//! parameter space is split: the then side is explored recursively, the
//! current invocation carries on with the else side. In integer mode,
//! fractional vertices are removed with cuts.

use log::{debug, info, trace};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::time::Instant;

use crate::pip::context::Context;
use crate::pip::cut::{self, CutOutcome};
use crate::pip::options::PipOptions;
use crate::pip::quast::{AffineForm, NewParameter, Quast};
use crate::pip::tableau::{RowStatus, Tableau};
use crate::utils::errors::{PipError, PipResult, ResourceError, ResourceErrorKind};
use crate::utils::integer::{exact_div, floor_div, vector_gcd};

/// Per-invocation settings of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Mode {
    /// Look for integer solutions
    pub integer: bool,
    /// Read dual values off rational leaves
    pub dual: bool,
    /// Tableau column of the big parameter
    pub bigparm: Option<usize>,
}

impl Mode {
    /// Integer emptiness test of a parameter-free system.
    fn feasibility() -> Self {
        Self { integer: true, dual: false, bigparm: None }
    }
}

/// What happened during one engine invocation, in order.
enum Step {
    Branch { condition: Vec<BigInt>, then_branch: Quast },
    NewParameter(NewParameter),
}

/// Solver state shared by a whole solve: the options and the counters the
/// resource limits are checked against.
#[derive(Debug)]
pub struct Solver {
    options: PipOptions,
    iterations: u64,
    /// Start of the current solve
    start: Instant,
}

impl Solver {
    /// A solver with fresh counters.
    pub fn new(options: PipOptions) -> Self {
        Self {
            options,
            iterations: 0,
            start: Instant::now(),
        }
    }

    /// Options of every solve run by this solver.
    pub fn options(&self) -> &PipOptions {
        &self.options
    }

    /// Engine iterations so far, nested feasibility tests included.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Count the time limit from now on.
    pub(crate) fn restart_clock(&mut self) {
        self.start = Instant::now();
    }

    fn tick(&mut self) -> PipResult<()> {
        self.iterations += 1;
        if let Some(limit) = self.options.max_iterations {
            if self.iterations > limit {
                return Err(ResourceError {
                    message: format!("iteration limit of {} reached", limit),
                    kind: ResourceErrorKind::IterationLimit,
                }
                .into());
            }
        }
        if let Some(limit) = self.options.time_limit {
            if self.start.elapsed() > limit {
                return Err(ResourceError {
                    message: format!("time limit of {:?} reached", limit),
                    kind: ResourceErrorKind::TimeLimit,
                }
                .into());
            }
        }
        Ok(())
    }

    /// Whether the context, extended with `extra >= 0`, has an integer point.
    pub(crate) fn is_feasible(&mut self, ctx: &Context, extra: Option<&[BigInt]>) -> PipResult<bool> {
        let tab = ctx.feasibility_tableau(extra)?;
        let result = self.explore(tab, Context::new(0), Mode::feasibility())?;
        Ok(!result.is_no_solution())
    }

    /// Solve `tab` under `ctx`. The result is expressed over the tableau's
    /// parameters, followed by any parameter introduced by cuts.
    pub(crate) fn explore(&mut self, mut tab: Tableau, mut ctx: Context, mode: Mode) -> PipResult<Quast> {
        let verbosity = self.options.verbosity;
        let mut steps = Vec::new();
        tab.sort_rows();

        let result = loop {
            self.tick()?;
            if verbosity > 2 {
                trace!("engine iteration {}\n{}", self.iterations, tab);
            }

            if let Some(i) = tab.find_status(RowStatus::Minus) {
                if !self.pivot(&mut tab, i)? {
                    break Quast::no_solution();
                }
                continue;
            }

            if let Some(i) = examine_coefficients(&mut tab, mode.bigparm) {
                if !self.pivot(&mut tab, i)? {
                    break Quast::no_solution();
                }
                continue;
            }

            self.compatibility_test(&mut tab, &ctx)?;
            if let Some(i) = tab.find_status(RowStatus::Minus) {
                if !self.pivot(&mut tab, i)? {
                    break Quast::no_solution();
                }
                continue;
            }

            let undetermined = tab
                .find_status(RowStatus::Critic)
                .or_else(|| tab.find_status(RowStatus::Unknown));
            if let Some(i) = undetermined {
                let condition = branch_condition(&tab, i, mode.integer)?;
                if verbosity > 0 {
                    debug!("branch on row {}: {:?} >= 0", i, condition);
                }

                let mut then_tab = tab.clone();
                then_tab.set_status(i, RowStatus::Plus);
                let then_ctx = ctx.with_row(condition.clone())?;
                let then_branch = self.explore(then_tab, then_ctx, mode)?;

                let mut negated: Vec<BigInt> = condition.iter().map(|c| -c).collect();
                if let Some(k) = negated.last_mut() {
                    *k -= BigInt::one();
                }
                ctx.push(negated)?;
                tab.set_status(i, RowStatus::Minus);
                steps.push(Step::Branch { condition, then_branch });
                continue;
            }

            if !mode.integer {
                break leaf(&tab, mode.dual)?;
            }
            match cut::integrate(&mut tab, &mut ctx, mode.bigparm, self.options.deepest_cut)? {
                CutOutcome::Integral => break leaf(&tab, false)?,
                CutOutcome::Infeasible => break Quast::no_solution(),
                CutOutcome::Added { row, new_param } => {
                    if verbosity > 0 {
                        info!("cut added as row {}", row);
                    }
                    if let Some(np) = new_param {
                        steps.push(Step::NewParameter(np));
                    }
                }
            }
        };

        Ok(steps.into_iter().rev().fold(result, |acc, step| match step {
            Step::Branch { condition, then_branch } => Quast::branch(condition, then_branch, acc),
            Step::NewParameter(np) => acc.with_new_param(np),
        }))
    }

    fn pivot(&self, tab: &mut Tableau, i: usize) -> PipResult<bool> {
        if self.options.verbosity > 1 {
            debug!("pivoting row {}", i);
        }
        tab.pivot(i)
    }

    /// Decide the sign of undetermined rows by asking the context whether
    /// the row can be non-negative and whether it can be negative.
    fn compatibility_test(&mut self, tab: &mut Tableau, ctx: &Context) -> PipResult<()> {
        if tab.nparm() == 0 {
            return Ok(());
        }
        for i in 0..tab.nrows() {
            let status = tab.row(i).status;
            if status != RowStatus::Critic && status != RowStatus::Unknown {
                continue;
            }
            let (critic, positive, negative) = {
                let row = tab.row(i);
                let critic = (0..tab.nvar()).all(|j| !row.value(j).is_positive());
                let params: Vec<BigInt> = (0..tab.nparm())
                    .map(|p| row.value(tab.param_col(p)).into_owned())
                    .collect();
                let constant = row.value(tab.const_col()).into_owned();

                let mut positive = params.clone();
                positive.push(if critic { constant.clone() } else { &constant - 1 });
                let mut negative: Vec<BigInt> = params.iter().map(|v| -v).collect();
                negative.push(-constant - 1);
                (critic, positive, negative)
            };

            let can_be_positive = self.is_feasible(ctx, Some(positive.as_slice()))?;
            let can_be_negative = self.is_feasible(ctx, Some(negative.as_slice()))?;
            if self.options.verbosity > 0 {
                debug!(
                    "row {}: positive case {}, negative case {}",
                    i,
                    if can_be_positive { "possible" } else { "impossible" },
                    if can_be_negative { "possible" } else { "impossible" }
                );
            }

            match (can_be_positive, can_be_negative) {
                (true, true) => {
                    let status = if critic { RowStatus::Critic } else { RowStatus::Unknown };
                    tab.set_status(i, status);
                }
                (false, true) => {
                    tab.set_status(i, RowStatus::Minus);
                    break;
                }
                (true, false) => tab.set_status(i, RowStatus::Plus),
                (false, false) => tab.set_status(i, RowStatus::Zero),
            }
        }
        Ok(())
    }
}

/// Settle row signs that can be read off the coefficients, parameters being
/// non-negative. Returns the first row found negative.
fn examine_coefficients(tab: &mut Tableau, bigparm: Option<usize>) -> Option<usize> {
    if let Some(bg) = bigparm {
        for i in 0..tab.nrows() {
            if tab.row(i).status != RowStatus::Unknown {
                continue;
            }
            match RowStatus::of_sign(&tab.value(i, bg)) {
                RowStatus::Minus => {
                    tab.set_status(i, RowStatus::Minus);
                    return Some(i);
                }
                RowStatus::Plus => tab.set_status(i, RowStatus::Plus),
                _ => {}
            }
        }
    }

    for i in 0..tab.nrows() {
        if tab.row(i).status != RowStatus::Unknown {
            continue;
        }
        let mut params = RowStatus::Zero;
        for p in 0..tab.nparm() {
            let sign = RowStatus::of_sign(&tab.value(i, tab.param_col(p)));
            if sign == RowStatus::Zero || sign == params {
                continue;
            }
            if params == RowStatus::Zero {
                params = sign;
            } else {
                params = RowStatus::Unknown;
                break;
            }
        }
        let constant = RowStatus::of_sign(&tab.value(i, tab.const_col()));
        let status = match params {
            RowStatus::Plus if constant == RowStatus::Minus => RowStatus::Unknown,
            RowStatus::Plus => RowStatus::Plus,
            RowStatus::Zero => constant,
            RowStatus::Minus if constant == RowStatus::Minus => RowStatus::Minus,
            _ => RowStatus::Unknown,
        };
        tab.set_status(i, status);
        if status == RowStatus::Minus {
            return Some(i);
        }
    }
    None
}

/// The parametric part of row `i` reduced by the gcd of its parameter
/// coefficients, as a context row `[params..., constant]`.
fn branch_condition(tab: &Tableau, i: usize, integer: bool) -> PipResult<Vec<BigInt>> {
    let row = tab.row(i);
    let params: Vec<BigInt> = (0..tab.nparm())
        .map(|p| row.value(tab.param_col(p)).into_owned())
        .collect();
    let constant = row.value(tab.const_col()).into_owned();

    let mut g = vector_gcd(&params);
    if !integer {
        g = g.gcd(&constant);
    }
    if g.is_zero() {
        return Err(PipError::Internal(format!("branch on row {} without parameters", i)));
    }
    let mut condition = params
        .iter()
        .map(|v| exact_div(v, &g))
        .collect::<PipResult<Vec<_>>>()?;
    condition.push(if integer {
        floor_div(&constant, &g)?
    } else {
        exact_div(&constant, &g)?
    });
    Ok(condition)
}

/// Read the unknowns off the tableau: `[params..., constant] / denom` per
/// unknown row.
fn leaf(tab: &Tableau, dual: bool) -> PipResult<Quast> {
    let values = (0..tab.nvar())
        .map(|i| {
            let row = tab.row(i);
            let mut coefficients: Vec<BigInt> = (0..tab.nparm())
                .map(|p| row.value(tab.param_col(p)).into_owned())
                .collect();
            coefficients.push(row.value(tab.const_col()).into_owned());
            AffineForm::new(coefficients, row.denom.clone()).normalized()
        })
        .collect();
    let dual = if dual { Some(dual_values(tab)) } else { None };
    Ok(Quast::leaf(values, dual))
}

/// One value per input inequality: the reduced cost of its slack when the
/// slack is non-basic, 0 otherwise.
fn dual_values(tab: &Tableau) -> Vec<BigRational> {
    let count = tab
        .rows()
        .iter()
        .filter_map(|r| r.origin)
        .max()
        .map_or(0, |m| m + 1);
    let mut values = vec![BigRational::zero(); count];
    if tab.nvar() == 0 {
        return values;
    }
    let objective = tab.row(0);
    for row in tab.rows() {
        if let (Some(origin), Some(column)) = (row.origin, row.unit_column()) {
            values[origin] = BigRational::new(
                objective.value(column).into_owned(),
                objective.denom.clone(),
            );
        }
    }
    values
}
