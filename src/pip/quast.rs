//! Quasi-affine selection trees.
//!
//! A quast is the parametric answer of the solver. Walking it from the root
//! for concrete parameter values:
//! - new parameters are defined as `floor(form / divisor)` and appended to
//!   the parameter vector, in rank order
//! - a branch tests `condition . (params, 1) >= 0` and descends into its
//!   then or else subtree
//! - a leaf gives one affine form per unknown, `()` means no solution
//!
//! Printed layout:
//!
//! ```text
//! (newparm 1 (div #[1 0] 2))
//! (if #[-1 2 0]
//!  (list
//!   #[1 -1 0]/1
//!  )
//!  ()
//! )
//! ```

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::errors::{ArithmeticError, InputError, InputErrorKind, PipResult};
use crate::utils::integer::{floor_div, vector_gcd};
use crate::utils::pretty::{format_list, format_vector, IndentWriter};

/// An affine function of the parameters over a common denominator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AffineForm {
    /// Parameter coefficients followed by the constant
    pub coefficients: Vec<BigInt>,
    /// Positive denominator, or 0 for an unbounded component
    pub denominator: BigInt,
}

impl AffineForm {
    /// `coefficients . (params, 1) / denominator`
    pub fn new(coefficients: Vec<BigInt>, denominator: BigInt) -> Self {
        Self { coefficients, denominator }
    }

    /// Build a form from machine integers.
    pub fn from_i64(coefficients: &[i64], denominator: i64) -> Self {
        Self::new(
            coefficients.iter().map(|&c| BigInt::from(c)).collect(),
            BigInt::from(denominator),
        )
    }

    /// Divide numerators and denominator by their gcd.
    pub fn normalized(mut self) -> Self {
        let g = vector_gcd(std::iter::once(&self.denominator).chain(self.coefficients.iter()));
        if !g.is_zero() && !g.is_one() {
            for c in self.coefficients.iter_mut() {
                *c = &*c / &g;
            }
            self.denominator = &self.denominator / &g;
        }
        self
    }

    /// The component grows with the big parameter.
    pub fn is_unbounded(&self) -> bool {
        self.denominator.is_zero()
    }

    /// Every parameter value gives an integer.
    pub fn is_integral(&self) -> bool {
        self.denominator.is_one()
    }

    /// Number of parameters the form is written over.
    pub fn nparm(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// `coefficients . (params, 1)`, before division.
    pub fn numerator_at(&self, params: &[BigInt]) -> PipResult<BigInt> {
        dot(&self.coefficients, params)
    }

    /// Exact value at integer parameter values.
    pub fn evaluate(&self, params: &[BigInt]) -> PipResult<BigRational> {
        if self.is_unbounded() {
            return Err(ArithmeticError::division_by_zero("unbounded component").into());
        }
        let n = self.numerator_at(params)?;
        Ok(BigRational::new(n, self.denominator.clone()))
    }

    /// `floor(value)`, the definition of a new parameter.
    pub fn evaluate_floor(&self, params: &[BigInt]) -> PipResult<BigInt> {
        floor_div(&self.numerator_at(params)?, &self.denominator)
    }
}

impl fmt::Display for AffineForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", format_vector(&self.coefficients), self.denominator)
    }
}

fn dot(coefficients: &[BigInt], params: &[BigInt]) -> PipResult<BigInt> {
    if coefficients.len() != params.len() + 1 {
        return Err(InputError::new(
            InputErrorKind::ParameterCount,
            format!(
                "form over {} parameters evaluated with {} values",
                coefficients.len().saturating_sub(1),
                params.len()
            ),
        )
        .into());
    }
    let linear: BigInt = coefficients.iter().zip(params).map(|(c, p)| c * p).sum();
    Ok(linear + &coefficients[params.len()])
}

/// `p_rank = floor(form)`, introduced by a parametric cut.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NewParameter {
    /// Position of the parameter in the parameter vector
    pub rank: usize,
    /// Numerators over the parameters of lower rank; the denominator is the divisor
    pub form: AffineForm,
}

impl NewParameter {
    /// `p_rank = floor(form)`.
    pub fn new(rank: usize, form: AffineForm) -> Self {
        Self { rank, form }
    }

    /// Denominator of the floored division.
    pub fn divisor(&self) -> &BigInt {
        &self.form.denominator
    }
}

/// Solution of one region of the parameter space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuastLeaf {
    /// One value per unknown
    pub values: Vec<AffineForm>,
    /// One value per input constraint, rational mode only
    pub dual: Option<Vec<BigRational>>,
}

/// What a quast node decides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuastNode {
    /// The region has no (integer) point
    NoSolution,
    /// Values of the unknowns
    Leaf(QuastLeaf),
    /// `condition >= 0` selects the then subtree
    Branch {
        /// `[params..., constant]`
        condition: Vec<BigInt>,
        /// Taken when the condition holds
        then_branch: Box<Quast>,
        /// Taken when it does not
        else_branch: Box<Quast>,
    },
}

/// A quast node preceded by the new parameters it defines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quast {
    /// Parameters defined before the node, by increasing rank
    pub new_params: Vec<NewParameter>,
    /// The decision
    pub node: QuastNode,
}

impl Quast {
    /// The empty answer `()`.
    pub fn no_solution() -> Self {
        Self { new_params: Vec::new(), node: QuastNode::NoSolution }
    }

    /// One value per unknown.
    pub fn leaf(values: Vec<AffineForm>, dual: Option<Vec<BigRational>>) -> Self {
        Self {
            new_params: Vec::new(),
            node: QuastNode::Leaf(QuastLeaf { values, dual }),
        }
    }

    /// `condition >= 0` selects `then_branch`.
    pub fn branch(condition: Vec<BigInt>, then_branch: Quast, else_branch: Quast) -> Self {
        Self {
            new_params: Vec::new(),
            node: QuastNode::Branch {
                condition,
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
        }
    }

    /// Prepend a new parameter definition to this node.
    pub fn with_new_param(mut self, param: NewParameter) -> Self {
        self.new_params.insert(0, param);
        self
    }

    /// The node is `()`.
    pub fn is_no_solution(&self) -> bool {
        matches!(self.node, QuastNode::NoSolution)
    }

    /// The node gives values.
    pub fn is_leaf(&self) -> bool {
        matches!(self.node, QuastNode::Leaf(_))
    }

    /// The node tests a condition.
    pub fn is_branch(&self) -> bool {
        matches!(self.node, QuastNode::Branch { .. })
    }

    /// The leaf at the root, if the quast is a single leaf.
    pub fn as_leaf(&self) -> Option<&QuastLeaf> {
        match &self.node {
            QuastNode::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// Number of branch nodes.
    pub fn branch_count(&self) -> usize {
        match &self.node {
            QuastNode::Branch { then_branch, else_branch, .. } => {
                1 + then_branch.branch_count() + else_branch.branch_count()
            }
            _ => 0,
        }
    }

    /// Number of leaves and no-solution nodes.
    pub fn leaf_count(&self) -> usize {
        match &self.node {
            QuastNode::Branch { then_branch, else_branch, .. } => {
                then_branch.leaf_count() + else_branch.leaf_count()
            }
            _ => 1,
        }
    }

    /// Branches on the longest path.
    pub fn depth(&self) -> usize {
        match &self.node {
            QuastNode::Branch { then_branch, else_branch, .. } => {
                1 + then_branch.depth().max(else_branch.depth())
            }
            _ => 0,
        }
    }

    /// Total number of new parameters defined in the tree.
    pub fn new_param_count(&self) -> usize {
        let below = match &self.node {
            QuastNode::Branch { then_branch, else_branch, .. } => {
                then_branch.new_param_count() + else_branch.new_param_count()
            }
            _ => 0,
        };
        self.new_params.len() + below
    }

    /// Collapse branches whose two subtrees agree.
    ///
    /// Two `()` children give `()`; two identical children give that child,
    /// keeping the new parameters of both levels.
    pub fn simplify(self) -> Self {
        let Quast { new_params, node } = self;
        match node {
            QuastNode::Branch { condition, then_branch, else_branch } => {
                let then_branch = then_branch.simplify();
                let else_branch = else_branch.simplify();
                if then_branch.is_no_solution() && else_branch.is_no_solution() {
                    Quast::no_solution()
                } else if then_branch == else_branch {
                    let mut merged = new_params;
                    merged.extend(then_branch.new_params);
                    Quast { new_params: merged, node: then_branch.node }
                } else {
                    Quast {
                        new_params,
                        node: QuastNode::Branch {
                            condition,
                            then_branch: Box::new(then_branch),
                            else_branch: Box::new(else_branch),
                        },
                    }
                }
            }
            QuastNode::NoSolution => Quast::no_solution(),
            leaf => Quast { new_params, node: leaf },
        }
    }

    /// Value of the unknowns at integer parameter values, `None` when the
    /// region they fall in has no solution.
    pub fn evaluate(&self, params: &[BigInt]) -> PipResult<Option<Vec<BigRational>>> {
        let mut values = params.to_vec();
        let mut current = self;
        loop {
            for np in &current.new_params {
                if np.rank != values.len() {
                    return Err(InputError::new(
                        InputErrorKind::ParameterCount,
                        format!(
                            "new parameter of rank {} defined after {} parameters",
                            np.rank,
                            values.len()
                        ),
                    )
                    .into());
                }
                let q = np.form.evaluate_floor(&values)?;
                values.push(q);
            }
            match &current.node {
                QuastNode::NoSolution => return Ok(None),
                QuastNode::Leaf(leaf) => {
                    return leaf
                        .values
                        .iter()
                        .map(|v| v.evaluate(&values))
                        .collect::<PipResult<Vec<_>>>()
                        .map(Some)
                }
                QuastNode::Branch { condition, then_branch, else_branch } => {
                    current = if dot(condition, &values)?.is_negative() {
                        &**else_branch
                    } else {
                        &**then_branch
                    };
                }
            }
        }
    }

    /// Same as [`Quast::evaluate`] with machine integer parameters.
    pub fn evaluate_i64(&self, params: &[i64]) -> PipResult<Option<Vec<BigRational>>> {
        let params: Vec<BigInt> = params.iter().map(|&p| BigInt::from(p)).collect();
        self.evaluate(&params)
    }

    fn write_to(&self, w: &mut IndentWriter) {
        for np in &self.new_params {
            w.writeln(&format!(
                "(newparm {} (div {} {}))",
                np.rank,
                format_vector(&np.form.coefficients),
                np.form.denominator
            ));
        }
        match &self.node {
            QuastNode::NoSolution => w.writeln("()"),
            QuastNode::Leaf(leaf) => {
                w.parenthesized("list", |w| {
                    for v in &leaf.values {
                        w.writeln(&v.to_string());
                    }
                });
                if let Some(dual) = &leaf.dual {
                    w.writeln(&format!("(dual {})", format_list(dual, " ")));
                }
            }
            QuastNode::Branch { condition, then_branch, else_branch } => {
                w.parenthesized(&format!("if {}", format_vector(condition)), |w| {
                    then_branch.write_to(w);
                    else_branch.write_to(w);
                });
            }
        }
    }
}

impl fmt::Display for Quast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut w = IndentWriter::single_space();
        self.write_to(&mut w);
        f.write_str(&w.finish())
    }
}
