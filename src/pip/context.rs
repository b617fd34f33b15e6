//! Parameter context: the inequalities known to hold on the current branch.
//!
//! Each row is `[p_0, ..., p_{n-1}, constant]` and means `row . (p, 1) >= 0`.
//! A context is owned by one engine invocation; branches clone it before
//! extending it, so a sibling never sees the other's conditions.

use num_bigint::BigInt;
use num_traits::{One, Zero};

use crate::pip::tableau::{Row, RowStatus, Tableau};
use crate::utils::errors::{PipError, PipResult};
use crate::utils::integer::{exact_div, floor_div, vector_gcd};

/// Inequalities over the parameters of one branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    rows: Vec<Vec<BigInt>>,
    nparm: usize,
}

impl Context {
    /// An empty context over `nparm` parameters.
    pub fn new(nparm: usize) -> Self {
        Self { rows: Vec::new(), nparm }
    }

    /// Number of parameters, new ones included.
    pub fn nparm(&self) -> usize {
        self.nparm
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// No condition is known.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The conditions, in insertion order.
    pub fn rows(&self) -> &[Vec<BigInt>] {
        &self.rows
    }

    /// Add the condition `row >= 0`.
    pub fn push(&mut self, row: Vec<BigInt>) -> PipResult<()> {
        if row.len() != self.nparm + 1 {
            return Err(PipError::Internal(format!(
                "context row of width {} for {} parameters",
                row.len(),
                self.nparm
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// A copy of this context extended with `row >= 0`.
    pub fn with_row(&self, row: Vec<BigInt>) -> PipResult<Self> {
        let mut ctx = self.clone();
        ctx.push(row)?;
        Ok(ctx)
    }

    /// Divide each row by the gcd of its parameter coefficients, flooring
    /// the constant. Parameters are integers, so the set is unchanged.
    pub fn tighten(&mut self) -> PipResult<()> {
        let cst = self.nparm;
        for row in self.rows.iter_mut() {
            let g = vector_gcd(&row[..cst]);
            if g.is_zero() || g.is_one() {
                continue;
            }
            for v in row[..cst].iter_mut() {
                *v = exact_div(v, &g)?;
            }
            row[cst] = floor_div(&row[cst], &g)?;
        }
        Ok(())
    }

    /// Insert a zero column for a new parameter, just before the constant.
    pub fn add_parameter(&mut self) {
        let at = self.nparm;
        for row in self.rows.iter_mut() {
            row.insert(at, BigInt::zero());
        }
        self.nparm += 1;
    }

    /// A tableau asking whether the context, optionally extended with
    /// `extra >= 0`, has an integer point. Parameters become the unknowns.
    pub fn feasibility_tableau(&self, extra: Option<&[BigInt]>) -> PipResult<Tableau> {
        let mut tab = Tableau::new(self.nparm, 0);
        let rows = self.rows.iter().map(|r| r.as_slice()).chain(extra);
        for row in rows {
            tab.push_row(Row::dense(row.to_vec(), BigInt::one(), RowStatus::Unknown))?;
        }
        Ok(tab)
    }
}
