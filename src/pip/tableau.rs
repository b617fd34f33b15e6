//! Simplex tableau with exact integer rows.
//!
//! Column layout: `nvar` unknown columns, the constant column at index
//! `nvar`, then `nparm` parameter columns. The first `nvar` rows describe
//! the solved unknowns, the others are inequality slacks. A row is either
//! a unit row (the variable is non-basic and stands for one column) or a
//! dense row `entries / denom` with a positive denominator.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use log::{debug, trace};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::utils::errors::{PipError, PipResult};
use crate::utils::integer::{exact_div, floor_div, vector_gcd};

/// What is known about the sign of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowStatus {
    /// Non-basic variable, zero at the current vertex
    Unit,
    /// Non-negative for every parameter value of the context
    Plus,
    /// Negative for every parameter value of the context
    Minus,
    /// Identically zero
    Zero,
    /// Undetermined, and no unknown can make it larger
    Critic,
    /// Undetermined
    Unknown,
}

impl RowStatus {
    /// Sign of an integer as a status.
    pub fn of_sign(value: &BigInt) -> Self {
        if value.is_positive() {
            RowStatus::Plus
        } else if value.is_negative() {
            RowStatus::Minus
        } else {
            RowStatus::Zero
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            RowStatus::Unit => "U",
            RowStatus::Plus => "+",
            RowStatus::Minus => "-",
            RowStatus::Zero => "0",
            RowStatus::Critic => "*",
            RowStatus::Unknown => "?",
        }
    }
}

/// Storage of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    /// The row equals the variable of this unknown column
    Unit(usize),
    /// Integer numerators over the row denominator
    Dense(Vec<BigInt>),
}

/// One tableau row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Unit or dense storage
    pub kind: RowKind,
    /// Positive denominator of the row
    pub denom: BigInt,
    /// Known sign of the row
    pub status: RowStatus,
    /// Index of the input inequality this row was built from
    pub origin: Option<usize>,
}

impl Row {
    /// The row of a non-basic unknown.
    pub fn unit(column: usize) -> Self {
        Self {
            kind: RowKind::Unit(column),
            denom: BigInt::one(),
            status: RowStatus::Unit,
            origin: None,
        }
    }

    /// `entries / denom`, laid out like the tableau columns.
    pub fn dense(entries: Vec<BigInt>, denom: BigInt, status: RowStatus) -> Self {
        Self {
            kind: RowKind::Dense(entries),
            denom,
            status,
            origin: None,
        }
    }

    /// Tag the row with the input inequality it comes from.
    pub fn with_origin(mut self, origin: usize) -> Self {
        self.origin = Some(origin);
        self
    }

    /// The row names a non-basic unknown.
    pub fn is_unit(&self) -> bool {
        matches!(self.kind, RowKind::Unit(_))
    }

    /// Column of a unit row.
    pub fn unit_column(&self) -> Option<usize> {
        match self.kind {
            RowKind::Unit(c) => Some(c),
            RowKind::Dense(_) => None,
        }
    }

    /// Numerators of a dense row.
    pub fn entries(&self) -> Option<&[BigInt]> {
        match &self.kind {
            RowKind::Dense(e) => Some(e),
            RowKind::Unit(_) => None,
        }
    }

    /// Numerator of column `j`; a unit row holds its denominator in its own column.
    pub fn value(&self, j: usize) -> Cow<'_, BigInt> {
        match &self.kind {
            RowKind::Dense(e) => Cow::Borrowed(&e[j]),
            RowKind::Unit(c) if *c == j => Cow::Borrowed(&self.denom),
            RowKind::Unit(_) => Cow::Owned(BigInt::zero()),
        }
    }

    /// Largest integer part of an unknown coefficient, used to order rows.
    fn size(&self, nvar: usize) -> BigInt {
        match &self.kind {
            RowKind::Dense(e) => e[..nvar]
                .iter()
                .map(|a| (a / &self.denom).abs())
                .max()
                .unwrap_or_else(BigInt::zero),
            RowKind::Unit(_) => BigInt::zero(),
        }
    }
}

/// Divide a row and its denominator by their common gcd.
fn normalize(entries: &mut [BigInt], denom: &mut BigInt) {
    let g = vector_gcd(std::iter::once(&*denom).chain(entries.iter()));
    if g.is_zero() || g.is_one() {
        return;
    }
    for z in entries.iter_mut() {
        *z = &*z / &g;
    }
    *denom = &*denom / &g;
}

/// The working matrix of the parametric simplex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tableau {
    rows: Vec<Row>,
    nvar: usize,
    nparm: usize,
}

impl Tableau {
    /// A tableau with one unit row per unknown and no inequality yet.
    pub fn new(nvar: usize, nparm: usize) -> Self {
        Self {
            rows: (0..nvar).map(Row::unit).collect(),
            nvar,
            nparm,
        }
    }

    /// Number of unknown columns.
    pub fn nvar(&self) -> usize {
        self.nvar
    }

    /// Number of parameter columns.
    pub fn nparm(&self) -> usize {
        self.nparm
    }

    /// Number of columns: unknowns, constant, parameters.
    pub fn ncols(&self) -> usize {
        self.nvar + 1 + self.nparm
    }

    /// Number of rows, unknown rows included.
    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    /// Index of the constant column.
    pub fn const_col(&self) -> usize {
        self.nvar
    }

    /// Index of the column of parameter `p`.
    pub fn param_col(&self, p: usize) -> usize {
        self.nvar + 1 + p
    }

    /// Row `i`.
    pub fn row(&self, i: usize) -> &Row {
        &self.rows[i]
    }

    /// All rows.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Record what is known about the sign of row `i`.
    pub fn set_status(&mut self, i: usize, status: RowStatus) {
        self.rows[i].status = status;
    }

    /// Append an inequality row and return its index.
    pub fn push_row(&mut self, row: Row) -> PipResult<usize> {
        if let Some(e) = row.entries() {
            if e.len() != self.ncols() {
                return Err(PipError::Internal(format!(
                    "row of width {} pushed into a tableau of width {}",
                    e.len(),
                    self.ncols()
                )));
            }
        }
        self.rows.push(row);
        Ok(self.rows.len() - 1)
    }

    /// First row with the given status.
    pub fn find_status(&self, status: RowStatus) -> Option<usize> {
        self.rows.iter().position(|r| r.status == status)
    }

    /// Numerator of entry `(i, j)`.
    pub fn value(&self, i: usize, j: usize) -> Cow<'_, BigInt> {
        self.rows[i].value(j)
    }

    /// Compare column `j` scaled by `1/a` with column `k` scaled by `1/b`,
    /// reading the rows from the top.
    fn compare_columns(&self, j: usize, a: &BigInt, k: usize, b: &BigInt) -> Ordering {
        for row in &self.rows {
            let x = b * row.value(j).as_ref() - row.value(k).as_ref() * a;
            match x.sign() {
                num_bigint::Sign::Minus => return Ordering::Less,
                num_bigint::Sign::Plus => return Ordering::Greater,
                num_bigint::Sign::NoSign => {}
            }
        }
        Ordering::Equal
    }

    /// Pick the entering column for row `pivi`: among the unknown columns with
    /// a positive entry, the lexicographically smallest once scaled by that entry.
    pub fn choose_pivot_column(&self, pivi: usize) -> Option<usize> {
        let entries = self.rows[pivi].entries()?;
        let mut best: Option<(usize, &BigInt)> = None;
        for (j, entry) in entries[..self.nvar].iter().enumerate() {
            if !entry.is_positive() {
                continue;
            }
            match best {
                None => best = Some((j, entry)),
                Some((pivj, pivot)) => {
                    if self.compare_columns(j, entry, pivj, pivot) == Ordering::Less {
                        best = Some((j, entry));
                    }
                }
            }
        }
        best.map(|(j, _)| j)
    }

    /// Pivot on row `pivi` with the lexicographic column rule.
    ///
    /// Returns `false` when no unknown column has a positive entry: the row
    /// can never be made non-negative.
    pub fn pivot(&mut self, pivi: usize) -> PipResult<bool> {
        match self.choose_pivot_column(pivi) {
            Some(pivj) => {
                self.pivot_at(pivi, pivj)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Make `pivj` the unit column of row `pivi`.
    pub fn pivot_at(&mut self, pivi: usize, pivj: usize) -> PipResult<()> {
        let (pivot_row, dpiv) = match &self.rows[pivi].kind {
            RowKind::Dense(e) => (e.clone(), self.rows[pivi].denom.clone()),
            RowKind::Unit(_) => {
                return Err(PipError::Internal(format!("pivot row {} is a unit row", pivi)))
            }
        };
        let pivot = pivot_row[pivj].clone();
        if pivj >= self.nvar || !pivot.is_positive() {
            return Err(PipError::Internal(format!(
                "invalid pivot {} at ({}, {})",
                pivot, pivi, pivj
            )));
        }
        let entering = self
            .rows
            .iter()
            .position(|r| r.unit_column() == Some(pivj))
            .ok_or_else(|| PipError::Internal(format!("no unit row for column {}", pivj)))?;
        debug!("pivot {}/{} at ({}, {})", pivot, dpiv, pivi, pivj);

        // The variable leaving the basis, expressed through the pivot row
        let fresh: Vec<BigInt> = pivot_row
            .iter()
            .enumerate()
            .map(|(j, a)| if j == pivj { dpiv.clone() } else { -a })
            .collect();

        for (k, row) in self.rows.iter_mut().enumerate() {
            if k == pivi {
                continue;
            }
            let Row { kind, denom, .. } = row;
            let RowKind::Dense(entries) = kind else { continue };
            let entry = entries[pivj].clone();
            if entry.is_zero() {
                continue;
            }
            let d = pivot.gcd(&entry);
            let lpiv = &pivot / &d;
            let entry = &entry / &d;
            for (j, z) in entries.iter_mut().enumerate() {
                *z = if j == pivj {
                    &dpiv * &entry
                } else {
                    &*z * &lpiv - &pivot_row[j] * &entry
                };
            }
            *denom = &*denom * &lpiv;
            normalize(entries, denom);
        }

        let row = &mut self.rows[entering];
        row.kind = RowKind::Dense(fresh);
        row.denom = pivot;
        row.status = RowStatus::Plus;

        let row = &mut self.rows[pivi];
        row.kind = RowKind::Unit(pivj);
        row.denom = BigInt::one();
        row.status = RowStatus::Unit;

        for row in self.rows.iter_mut() {
            let Some(entries) = row.entries() else { continue };
            let sign = RowStatus::of_sign(&entries[pivj]);
            let status = row.status;
            if sign != RowStatus::Zero && sign != status {
                row.status = match (status, sign) {
                    (RowStatus::Zero, RowStatus::Minus) => RowStatus::Unknown,
                    (RowStatus::Zero, other) => other,
                    _ => RowStatus::Unknown,
                };
            }
        }
        trace!("after pivot:\n{}", self);
        Ok(())
    }

    /// Order the inequality rows by increasing largest unknown coefficient.
    ///
    /// Selection sort over the dense rows; unit rows keep their place and
    /// ties keep their relative order.
    pub fn sort_rows(&mut self) {
        let nvar = self.nvar;
        let mut sizes: Vec<Option<BigInt>> = self
            .rows
            .iter()
            .map(|r| if r.is_unit() { None } else { Some(r.size(nvar)) })
            .collect();
        for i in nvar..self.rows.len() {
            if sizes[i].is_none() {
                continue;
            }
            let mut best = i;
            for j in i + 1..self.rows.len() {
                if let (Some(sj), Some(sb)) = (&sizes[j], &sizes[best]) {
                    if sj < sb {
                        best = j;
                    }
                }
            }
            if best != i {
                self.rows.swap(i, best);
                sizes.swap(i, best);
            }
        }
    }

    /// Divide every dense row by the gcd of its non-constant entries and
    /// floor its constant. Only valid when all variables are integers.
    pub fn tighten_rows(&mut self) -> PipResult<()> {
        let cst = self.const_col();
        for row in self.rows.iter_mut() {
            let RowKind::Dense(entries) = &mut row.kind else { continue };
            let g = vector_gcd(
                entries
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != cst)
                    .map(|(_, v)| v),
            );
            if g.is_zero() || g.is_one() {
                continue;
            }
            for (j, v) in entries.iter_mut().enumerate() {
                *v = if j == cst { floor_div(v, &g)? } else { exact_div(v, &g)? };
            }
        }
        Ok(())
    }

    /// Append a zero column for a new parameter.
    pub fn add_parameter(&mut self) {
        for row in self.rows.iter_mut() {
            if let RowKind::Dense(entries) = &mut row.kind {
                entries.push(BigInt::zero());
            }
        }
        self.nparm += 1;
    }
}

impl fmt::Display for Tableau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "tableau {} x {} (nvar {}, nparm {})",
            self.rows.len(),
            self.ncols(),
            self.nvar,
            self.nparm
        )?;
        for (i, row) in self.rows.iter().enumerate() {
            write!(f, "{:>3} {} ", i, row.status.symbol())?;
            match &row.kind {
                RowKind::Unit(c) => writeln!(f, "unit {}", c)?,
                RowKind::Dense(e) => {
                    for v in e {
                        write!(f, "{} ", v)?;
                    }
                    writeln!(f, "/{}", row.denom)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(v: &[i64]) -> Vec<BigInt> {
        v.iter().map(|&x| BigInt::from(x)).collect()
    }

    #[test]
    fn test_pivot_on_parity_row() {
        // x unknown, N parameter: rows 2x - N >= 0 and -2x + N >= 0
        let mut tab = Tableau::new(1, 1);
        tab.push_row(Row::dense(ints(&[2, 0, -1]), BigInt::one(), RowStatus::Minus)).unwrap();
        tab.push_row(Row::dense(ints(&[-2, 0, 1]), BigInt::one(), RowStatus::Plus)).unwrap();

        assert_eq!(tab.choose_pivot_column(1), Some(0));
        assert!(tab.pivot(1).unwrap());

        // x = (s + N) / 2
        assert_eq!(tab.row(0).entries().unwrap(), &ints(&[1, 0, 1])[..]);
        assert_eq!(tab.row(0).denom, BigInt::from(2));
        assert_eq!(tab.row(0).status, RowStatus::Plus);
        assert_eq!(tab.row(1).unit_column(), Some(0));
        // the opposite row becomes -s >= 0
        assert_eq!(tab.row(2).entries().unwrap(), &ints(&[-1, 0, 0])[..]);
        assert_eq!(tab.row(2).status, RowStatus::Unknown);
    }

    #[test]
    fn test_pivot_fails_without_positive_entry() {
        let mut tab = Tableau::new(1, 0);
        tab.push_row(Row::dense(ints(&[-1, -1]), BigInt::one(), RowStatus::Minus)).unwrap();
        assert_eq!(tab.choose_pivot_column(1), None);
        assert!(!tab.pivot(1).unwrap());
    }

    #[test]
    fn test_lexicographic_column_choice() {
        // x + y - 3 >= 0: increasing y keeps x at zero
        let mut tab = Tableau::new(2, 0);
        tab.push_row(Row::dense(ints(&[1, 1, -3]), BigInt::one(), RowStatus::Minus)).unwrap();
        assert_eq!(tab.choose_pivot_column(2), Some(1));
        assert!(tab.pivot(2).unwrap());
        assert!(tab.row(0).is_unit());
        // y = s - x + 3
        assert_eq!(tab.row(1).entries().unwrap(), &ints(&[-1, 1, 3])[..]);
        assert_eq!(tab.row(2).unit_column(), Some(1));
    }

    #[test]
    fn test_sort_rows() {
        let mut tab = Tableau::new(1, 0);
        tab.push_row(Row::dense(ints(&[5, 0]), BigInt::one(), RowStatus::Unknown).with_origin(0)).unwrap();
        tab.push_row(Row::dense(ints(&[1, 0]), BigInt::one(), RowStatus::Unknown).with_origin(1)).unwrap();
        tab.push_row(Row::dense(ints(&[-3, 0]), BigInt::one(), RowStatus::Unknown).with_origin(2)).unwrap();
        tab.sort_rows();
        let origins: Vec<_> = tab.rows()[1..].iter().map(|r| r.origin).collect();
        assert_eq!(origins, vec![Some(1), Some(2), Some(0)]);
        assert!(tab.row(0).is_unit());
    }

    #[test]
    fn test_tighten_rows() {
        let mut tab = Tableau::new(1, 1);
        // 2x + 4N - 3 >= 0 tightens to x + 2N - 2 >= 0
        tab.push_row(Row::dense(ints(&[2, -3, 4]), BigInt::one(), RowStatus::Unknown)).unwrap();
        tab.tighten_rows().unwrap();
        assert_eq!(tab.row(1).entries().unwrap(), &ints(&[1, -2, 2])[..]);
    }

    #[test]
    fn test_add_parameter() {
        let mut tab = Tableau::new(1, 1);
        tab.push_row(Row::dense(ints(&[1, 0, 1]), BigInt::one(), RowStatus::Plus)).unwrap();
        tab.add_parameter();
        assert_eq!(tab.nparm(), 2);
        assert_eq!(tab.ncols(), 4);
        assert_eq!(tab.row(1).entries().unwrap().len(), 4);
        assert!(tab.push_row(Row::dense(ints(&[1, 0, 1]), BigInt::one(), RowStatus::Plus)).is_err());
    }
}
