//! Translation between the caller's parameters and the engine's.
//!
//! The engine works over `[user params][big parameter?][negative copies]
//! [new params]`. A big parameter is introduced when the unknowns are
//! shifted (maximisation or unrestricted unknowns) and none was given;
//! unrestricted parameters get a negated copy each, `p = p+ - p-`.
//! [`materialize`] turns an engine quast back into the caller's terms.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;

use crate::pip::quast::{AffineForm, NewParameter, Quast, QuastLeaf, QuastNode};
use crate::polyhedral::ConstraintKind;
use crate::utils::errors::{PipError, PipResult};

/// Change of unknowns applied before solving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shift {
    None,
    /// `x = M - x'`
    Maximize,
    /// `x = x' - M`
    Unrestricted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParameterLayout {
    /// Number of caller parameters
    pub user: usize,
    /// A big parameter was added after the caller's parameters
    pub introduced_big: bool,
    /// Engine index of the big parameter
    pub big: Option<usize>,
    /// Caller parameter negated by each copy
    pub copies: Vec<usize>,
    pub shift: Shift,
}

impl ParameterLayout {
    pub fn new(user: usize, big_param: Option<usize>, shift: Shift, unrestricted_params: bool) -> Self {
        let introduced_big = big_param.is_none() && shift != Shift::None;
        let big = if introduced_big { Some(user) } else { big_param };
        let copies = if unrestricted_params {
            (0..user).filter(|&p| Some(p) != big_param).collect()
        } else {
            Vec::new()
        };
        Self { user, introduced_big, big, copies, shift }
    }

    /// Engine parameters before any cut.
    pub fn internal_count(&self) -> usize {
        self.user + self.removed()
    }

    /// Engine parameters hidden from the caller.
    pub fn removed(&self) -> usize {
        usize::from(self.introduced_big) + self.copies.len()
    }

    /// Caller parameter coefficients in engine order.
    pub fn to_internal(&self, coefficients: &[BigInt]) -> Vec<BigInt> {
        let mut out = coefficients.to_vec();
        if self.introduced_big {
            out.push(BigInt::zero());
        }
        out.extend(self.copies.iter().map(|&p| -&coefficients[p]));
        out
    }

    fn is_kept(&self, index: usize) -> bool {
        index < self.user || index >= self.internal_count()
    }

    /// Drop the hidden parameters from `[params..., constant]`.
    fn strip(&self, row: &[BigInt]) -> Vec<BigInt> {
        let cst = row.len().saturating_sub(1);
        row.iter()
            .enumerate()
            .filter(|&(j, _)| j == cst || self.is_kept(j))
            .map(|(_, v)| v.clone())
            .collect()
    }

    fn rank(&self, rank: usize) -> PipResult<usize> {
        rank.checked_sub(self.removed())
            .filter(|&r| r >= self.user)
            .ok_or_else(|| PipError::Internal(format!("new parameter rank {} collides with input parameters", rank)))
    }

    fn value(&self, form: &AffineForm) -> AffineForm {
        let mut coefficients = form.coefficients.clone();
        let mut unbounded = false;
        if let (Some(bg), true) = (self.big, self.shift != Shift::None) {
            coefficients[bg] -= &form.denominator;
            unbounded = !coefficients[bg].is_zero();
        }
        let mut coefficients = self.strip(&coefficients);
        if self.shift == Shift::Maximize {
            for c in coefficients.iter_mut() {
                *c = -&*c;
            }
        }
        let mut value = AffineForm::new(coefficients, form.denominator.clone()).normalized();
        if unbounded {
            value.denominator = BigInt::zero();
        }
        value
    }
}

/// Rewrite an engine quast over the caller's parameters.
///
/// `kinds` lists the domain constraints; the dual values of the two
/// inequalities of an equality are merged into one.
pub(crate) fn materialize(quast: Quast, layout: &ParameterLayout, kinds: &[ConstraintKind]) -> PipResult<Quast> {
    let Quast { new_params, node } = quast;
    let new_params = new_params
        .into_iter()
        .map(|np| {
            Ok(NewParameter::new(
                layout.rank(np.rank)?,
                AffineForm::new(layout.strip(&np.form.coefficients), np.form.denominator),
            ))
        })
        .collect::<PipResult<Vec<_>>>()?;

    let node = match node {
        QuastNode::NoSolution => QuastNode::NoSolution,
        QuastNode::Leaf(leaf) => QuastNode::Leaf(QuastLeaf {
            values: leaf.values.iter().map(|v| layout.value(v)).collect(),
            dual: leaf.dual.map(|d| merge_dual(&d, kinds)),
        }),
        QuastNode::Branch { condition, then_branch, else_branch } => QuastNode::Branch {
            condition: layout.strip(&condition),
            then_branch: Box::new(materialize(*then_branch, layout, kinds)?),
            else_branch: Box::new(materialize(*else_branch, layout, kinds)?),
        },
    };
    Ok(Quast { new_params, node })
}

/// One dual value per input constraint. An equality keeps the value of its
/// `>=` half when that is non-zero, the opposite of the `<=` half otherwise.
fn merge_dual(values: &[BigRational], kinds: &[ConstraintKind]) -> Vec<BigRational> {
    let mut merged = Vec::with_capacity(kinds.len());
    let mut it = values.iter();
    for kind in kinds {
        let first = it.next().cloned().unwrap_or_else(BigRational::zero);
        if *kind == ConstraintKind::Equality {
            let second = it.next().cloned().unwrap_or_else(BigRational::zero);
            merged.push(if first.is_zero() { -second } else { first });
        } else {
            merged.push(first);
        }
    }
    merged
}
