//! Gomory cuts.
//!
//! When every row of the tableau is non-negative but some unknown has a
//! fractional value, a cut is derived from the first such unknown row
//! `x = (sum a_j y_j + c + sum b_k p_k) / D`:
//!
//! ```text
//! sum (a_j mod D) y_j - ((-c) mod D) - sum ((-b_k) mod D) p_k >= 0
//! ```
//!
//! It holds at every integer point and is violated at the current vertex.
//! A cut with parametric terms needs a new parameter
//! `q = floor((-sum b'_k p_k - c') / D)` so that it stays affine.

use log::debug;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::pip::context::Context;
use crate::pip::quast::{AffineForm, NewParameter};
use crate::pip::tableau::{Row, RowStatus, Tableau};
use crate::utils::errors::{PipError, PipResult};
use crate::utils::integer::{bezout, exact_div, modulo};

/// What the cut search did to the tableau.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CutOutcome {
    /// Every unknown is integral
    Integral,
    /// A row proves there is no integer point
    Infeasible,
    /// A cut row was appended, with the parameter it introduced
    Added {
        row: usize,
        new_param: Option<NewParameter>,
    },
}

struct Cut {
    coefficients: Vec<BigInt>,
    denom: BigInt,
    has_var: bool,
    has_const: bool,
    has_parm: bool,
}

fn build_cut(row: &Row, nvar: usize, bigparm: Option<usize>) -> PipResult<Option<Cut>> {
    let Some(entries) = row.entries() else { return Ok(None) };
    let d = row.denom.clone();
    let mut coefficients = Vec::with_capacity(entries.len());

    let mut has_var = false;
    for a in &entries[..nvar] {
        let r = modulo(a, &d)?;
        has_var |= r.is_positive();
        coefficients.push(r);
    }

    let c = -modulo(&-&entries[nvar], &d)?;
    let has_const = !c.is_zero();
    coefficients.push(c);

    let mut has_parm = false;
    for (j, b) in entries.iter().enumerate().skip(nvar + 1) {
        // The big parameter is divisible by anything
        if Some(j) == bigparm {
            coefficients.push(BigInt::zero());
            continue;
        }
        let r = -modulo(&-b, &d)?;
        has_parm |= !r.is_zero();
        coefficients.push(r);
    }

    Ok(Some(Cut { coefficients, denom: d, has_var, has_const, has_parm }))
}

/// Look for an integral solution, or add one cut to the tableau.
///
/// Rows are scanned from the first unknown; the first one giving a
/// non-trivial cut is used.
pub(crate) fn integrate(
    tab: &mut Tableau,
    ctx: &mut Context,
    bigparm: Option<usize>,
    deepest: bool,
) -> PipResult<CutOutcome> {
    let nvar = tab.nvar();
    for i in 0..nvar {
        if tab.row(i).denom.is_one() {
            continue;
        }
        let Some(mut cut) = build_cut(tab.row(i), nvar, bigparm)? else { continue };

        match (cut.has_parm, cut.has_const, cut.has_var) {
            (false, false, _) => continue,
            (false, true, false) => {
                debug!("row {} has no integer point", i);
                return Ok(CutOutcome::Infeasible);
            }
            (false, true, true) => {
                if deepest {
                    let lambda = deepen(&mut cut.coefficients, nvar, &cut.denom)?;
                    debug!("bezout multiplier {}", lambda);
                }
                let row = tab.push_row(Row::dense(cut.coefficients, cut.denom, RowStatus::Minus))?;
                return Ok(CutOutcome::Added { row, new_param: None });
            }
            (true, _, false) => {
                return Err(PipError::Internal(format!(
                    "parametric cut without unknown terms on row {}",
                    i
                )));
            }
            (true, _, true) => {
                if ctx.nparm() != tab.nparm() {
                    return Err(PipError::Internal(format!(
                        "context has {} parameters, tableau {}",
                        ctx.nparm(),
                        tab.nparm()
                    )));
                }
                let found = find_parameter(ctx, &cut.coefficients[nvar + 1..], &cut.coefficients[nvar], &cut.denom);
                let (parm, new_param) = match found {
                    Some(p) => (p, None),
                    None => {
                        let np = define_parameter(
                            ctx,
                            &cut.coefficients[nvar + 1..],
                            &cut.coefficients[nvar],
                            &cut.denom,
                        )?;
                        tab.add_parameter();
                        cut.coefficients.push(BigInt::zero());
                        (np.rank, Some(np))
                    }
                };
                cut.coefficients[nvar + 1 + parm] += &cut.denom;
                let row = tab.push_row(Row::dense(cut.coefficients, cut.denom, RowStatus::Minus))?;
                return Ok(CutOutcome::Added { row, new_param });
            }
        }
    }
    Ok(CutOutcome::Integral)
}

/// Strengthen a constant cut with a Bezout multiplier. Returns the multiplier.
fn deepen(cut: &mut [BigInt], nvar: usize, d: &BigInt) -> PipResult<BigInt> {
    let t = -&cut[nvar];
    let delta = t.gcd(d);
    let tau = exact_div(&t, &delta)?;
    let dd = exact_div(d, &delta)?;
    let mut lambda = bezout(&(&dd - 1), &tau, &dd)?;
    while !lambda.gcd(d).is_one() {
        lambda += &dd;
    }
    for c in cut[..nvar].iter_mut() {
        *c = modulo(&(&lambda * &*c), d)?;
    }
    let t = modulo(&(&cut[nvar] * &lambda), d)?;
    cut[nvar] = -(d - t);
    Ok(lambda)
}

/// An existing parameter `p = floor((-params . p - constant) / d)`, found
/// through its two defining inequalities in the context.
fn find_parameter(ctx: &Context, params: &[BigInt], constant: &BigInt, d: &BigInt) -> Option<usize> {
    if !params.last()?.is_zero() {
        return None;
    }
    let upper = constant + d - 1;
    let lower = -constant;
    let negated: Vec<BigInt> = params.iter().map(|b| -b).collect();
    for p in (0..params.len()).rev() {
        if !params[p].is_zero() {
            break;
        }
        if has_definition(ctx, p, &params[..p], d, &upper)
            && has_definition(ctx, p, &negated[..p], &-d, &lower)
        {
            return Some(p);
        }
    }
    None
}

fn has_definition(ctx: &Context, p: usize, prefix: &[BigInt], coefficient: &BigInt, constant: &BigInt) -> bool {
    let n = ctx.nparm();
    ctx.rows().iter().any(|row| {
        &row[p] == coefficient
            && &row[n] == constant
            && row[p + 1..n].iter().all(Zero::is_zero)
            && &row[..p] == prefix
    })
}

/// Introduce `q = floor((-params . p - constant) / d)` and record
/// `0 <= -params . p - constant - d q <= d - 1` in the context.
fn define_parameter(
    ctx: &mut Context,
    params: &[BigInt],
    constant: &BigInt,
    d: &BigInt,
) -> PipResult<NewParameter> {
    let rank = ctx.nparm();
    let mut form: Vec<BigInt> = params.iter().map(|b| -b).collect();
    form.push(-constant);
    let param = NewParameter::new(rank, AffineForm::new(form, d.clone()));

    ctx.add_parameter();
    let mut lower: Vec<BigInt> = params.iter().map(|b| -b).collect();
    lower.push(-d);
    lower.push(-constant);
    let mut upper = params.to_vec();
    upper.push(d.clone());
    upper.push(constant - 1 + d);
    ctx.push(lower)?;
    ctx.push(upper)?;
    debug!("new parameter {} = floor({})", rank, param.form);
    Ok(param)
}
