//! Constraint matrices: the input format of the solver.
//!
//! A domain matrix has the column layout `[unknowns..., parameters..., constant]`,
//! a context matrix `[parameters..., constant]`. Every row has the same
//! width; this is checked when rows are added.

use num_bigint::BigInt;
use num_rational::BigRational;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::polyhedral::constraint::{Constraint, ConstraintKind};
use crate::utils::errors::{InputError, InputErrorKind, PipResult};

/// A system of constraints with a fixed number of columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintMatrix {
    rows: Vec<Constraint>,
    cols: usize,
}

impl ConstraintMatrix {
    /// Create an empty matrix whose rows will have `cols` columns (constant included).
    pub fn new(cols: usize) -> Self {
        Self { rows: Vec::new(), cols }
    }

    /// Create a matrix from tagged rows of machine integers.
    pub fn from_vec(cols: usize, rows: Vec<(ConstraintKind, Vec<i64>)>) -> PipResult<Self> {
        let mut matrix = Self::new(cols);
        for (kind, row) in rows {
            matrix.push(Constraint::from_i64(&row, kind))?;
        }
        Ok(matrix)
    }

    /// Create a matrix holding only inequalities.
    pub fn inequalities(cols: usize, rows: Vec<Vec<i64>>) -> PipResult<Self> {
        Self::from_vec(
            cols,
            rows.into_iter().map(|r| (ConstraintKind::Inequality, r)).collect(),
        )
    }

    /// Append a row, checking its width.
    pub fn push(&mut self, row: Constraint) -> PipResult<()> {
        if row.width() != self.cols {
            return Err(InputError::new(
                InputErrorKind::RaggedRow,
                format!(
                    "row {} has {} columns, expected {}",
                    self.rows.len(),
                    row.width(),
                    self.cols
                ),
            )
            .into());
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append an inequality `row >= 0`.
    pub fn push_inequality(&mut self, row: &[i64]) -> PipResult<()> {
        self.push(Constraint::from_i64(row, ConstraintKind::Inequality))
    }

    /// Append an equality `row = 0`.
    pub fn push_equality(&mut self, row: &[i64]) -> PipResult<()> {
        self.push(Constraint::from_i64(row, ConstraintKind::Equality))
    }

    /// Get the number of rows.
    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns, constant included.
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Check whether the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a row.
    pub fn row(&self, i: usize) -> Option<&Constraint> {
        self.rows.get(i)
    }

    /// Iterate over the rows.
    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.rows.iter()
    }

    /// Get an element.
    pub fn get(&self, row: usize, col: usize) -> Option<&BigInt> {
        self.rows.get(row)?.coeffs.get(col)
    }

    /// Number of inequalities once every equality is split into two.
    pub fn expanded_len(&self) -> usize {
        self.rows.iter().map(|r| if r.is_equality() { 2 } else { 1 }).sum()
    }

    /// Check every row at a point (one value per non-constant column).
    pub fn is_satisfied(&self, values: &[BigRational]) -> bool {
        self.rows.iter().all(|r| r.is_satisfied(values))
    }
}

impl fmt::Display for ConstraintMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[")?;
        for row in &self.rows {
            let tag = if row.is_equality() { "=" } else { ">=" };
            write!(f, "  {:>2} [", tag)?;
            for (j, val) in row.coeffs.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", val)?;
            }
            writeln!(f, "]")?;
        }
        write!(f, "]")
    }
}
