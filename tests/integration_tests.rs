//! Integration tests for the parametric solver.

use anyhow::Result;
use num_bigint::BigInt;
use num_rational::BigRational;
use polypip::prelude::*;
use std::time::Duration;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn rat(n: i64, d: i64) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::from(d))
}

fn int(n: i64) -> BigRational {
    rat(n, 1)
}

/// N >= 0
fn nonnegative_n() -> Result<ConstraintMatrix> {
    Ok(ConstraintMatrix::inequalities(2, vec![vec![1, 0]])?)
}

fn no_parameters() -> ConstraintMatrix {
    ConstraintMatrix::new(1)
}

#[test]
fn test_triangle_minimum() -> Result<()> {
    init_logging();
    // x, y >= 0, N - x - y >= 0
    let domain = ConstraintMatrix::inequalities(
        4,
        vec![vec![1, 0, 0, 0], vec![0, 1, 0, 0], vec![-1, -1, 1, 0]],
    )?;
    let quast = polypip::solve(&domain, &nonnegative_n()?, None, &PipOptions::default())?;

    let leaf = quast.as_leaf().expect("a single leaf");
    assert_eq!(leaf.values, vec![AffineForm::from_i64(&[0, 0], 1); 2]);
    assert_eq!(quast.to_string(), "(list\n #[0 0]/1\n #[0 0]/1\n)\n");
    Ok(())
}

#[test]
fn test_parity_needs_new_parameter() -> Result<()> {
    init_logging();
    // 2x = N
    let domain = ConstraintMatrix::from_vec(3, vec![(ConstraintKind::Equality, vec![2, -1, 0])])?;
    let quast = polypip::solve(&domain, &nonnegative_n()?, None, &PipOptions::default())?;

    assert!(quast.new_param_count() >= 1);
    assert!(quast.branch_count() >= 1);
    assert!(quast.to_string().contains("newparm"));
    for n in 0..12i64 {
        let expected = if n % 2 == 0 { Some(vec![int(n / 2)]) } else { None };
        assert_eq!(quast.evaluate_i64(&[n])?, expected, "N = {}", n);
    }
    Ok(())
}

#[test]
fn test_parametric_lower_bound() -> Result<()> {
    init_logging();
    // x >= N - 3
    let domain = ConstraintMatrix::inequalities(3, vec![vec![1, -1, 3]])?;
    let quast = polypip::solve(&domain, &nonnegative_n()?, None, &PipOptions::default())?;

    assert_eq!(quast.branch_count(), 1);
    for n in 0..10i64 {
        assert_eq!(quast.evaluate_i64(&[n])?, Some(vec![int((n - 3).max(0))]));
    }
    Ok(())
}

#[test]
fn test_infeasible_system() -> Result<()> {
    init_logging();
    // x >= 0 and x <= -1
    let domain = ConstraintMatrix::inequalities(2, vec![vec![1, 0], vec![-1, -1]])?;
    let quast = polypip::solve(&domain, &no_parameters(), None, &PipOptions::default())?;
    assert!(quast.is_no_solution());
    assert_eq!(quast.to_string(), "()\n");
    Ok(())
}

#[test]
fn test_integer_versus_rational() -> Result<()> {
    init_logging();
    // 2x = 1
    let domain = ConstraintMatrix::from_vec(2, vec![(ConstraintKind::Equality, vec![2, -1])])?;

    let integer = polypip::solve(&domain, &no_parameters(), None, &PipOptions::default())?;
    assert!(integer.is_no_solution());

    let rational = polypip::solve(&domain, &no_parameters(), None, &PipOptions::new().with_rational())?;
    assert_eq!(rational.evaluate_i64(&[])?, Some(vec![rat(1, 2)]));
    assert_eq!(rational.to_string(), "(list\n #[1]/2\n)\n");
    Ok(())
}

#[test]
fn test_unrestricted_minimum() -> Result<()> {
    init_logging();
    // x >= -7
    let domain = ConstraintMatrix::inequalities(2, vec![vec![1, 7]])?;
    let options = PipOptions::new().with_urs_unknowns(true);
    let quast = polypip::solve(&domain, &no_parameters(), None, &options)?;
    assert_eq!(quast.as_leaf().expect("leaf").values, vec![AffineForm::from_i64(&[-7], 1)]);
    Ok(())
}

#[test]
fn test_maximum() -> Result<()> {
    init_logging();
    // x <= 7
    let domain = ConstraintMatrix::inequalities(2, vec![vec![-1, 7]])?;
    let options = PipOptions::new().with_maximize(true);
    let quast = polypip::solve(&domain, &no_parameters(), None, &options)?;
    assert_eq!(quast.evaluate_i64(&[])?, Some(vec![int(7)]));

    // x <= N
    let domain = ConstraintMatrix::inequalities(3, vec![vec![-1, 1, 0]])?;
    let quast = polypip::solve(&domain, &nonnegative_n()?, None, &options)?;
    for n in 0..5i64 {
        assert_eq!(quast.evaluate_i64(&[n])?, Some(vec![int(n)]));
    }
    Ok(())
}

#[test]
fn test_unbounded_maximum() -> Result<()> {
    init_logging();
    // only x >= 0
    let domain = ConstraintMatrix::inequalities(2, vec![vec![1, 0]])?;
    let options = PipOptions::new().with_maximize(true);
    let quast = polypip::solve(&domain, &no_parameters(), None, &options)?;

    let leaf = quast.as_leaf().expect("leaf");
    assert!(leaf.values[0].is_unbounded());
    assert!(quast.evaluate_i64(&[]).is_err());
    Ok(())
}

#[test]
fn test_unrestricted_parameters_keep_user_width() -> Result<()> {
    init_logging();
    // x >= N, N of any sign
    let domain = ConstraintMatrix::inequalities(3, vec![vec![1, -1, 0]])?;
    let options = PipOptions::new().with_urs_params(true);
    let quast = polypip::solve(&domain, &ConstraintMatrix::new(2), None, &options)?;

    fn check(q: &Quast) {
        match &q.node {
            QuastNode::NoSolution => {}
            QuastNode::Leaf(leaf) => {
                for v in &leaf.values {
                    assert_eq!(v.coefficients.len(), 2);
                }
            }
            QuastNode::Branch { condition, then_branch, else_branch } => {
                assert_eq!(condition.len(), 2);
                check(then_branch);
                check(else_branch);
            }
        }
    }
    check(&quast);
    Ok(())
}

#[test]
fn test_dual_values() -> Result<()> {
    init_logging();
    // x - 2 >= 0, 4 - x >= 0
    let domain = ConstraintMatrix::inequalities(2, vec![vec![1, -2], vec![-1, 4]])?;
    let options = PipOptions::new().with_rational().with_dual(true);
    let quast = polypip::solve(&domain, &no_parameters(), None, &options)?;

    let leaf = quast.as_leaf().expect("leaf");
    assert_eq!(leaf.values, vec![AffineForm::from_i64(&[2], 1)]);
    assert_eq!(leaf.dual, Some(vec![int(1), int(0)]));
    assert_eq!(quast.to_string(), "(list\n #[2]/1\n)\n(dual 1 0)\n");

    // not computed in integer mode
    let quast = polypip::solve(&domain, &no_parameters(), None, &PipOptions::new().with_dual(true))?;
    assert_eq!(quast.as_leaf().expect("leaf").dual, None);
    Ok(())
}

#[test]
fn test_deepest_cut_agrees() -> Result<()> {
    init_logging();
    // 3x >= 4, 5y >= 2x + 1
    let domain = ConstraintMatrix::inequalities(3, vec![vec![3, 0, -4], vec![-2, 5, -1]])?;
    let plain = polypip::solve(&domain, &no_parameters(), None, &PipOptions::default())?;
    let deepest = polypip::solve(
        &domain,
        &no_parameters(),
        None,
        &PipOptions::new().with_deepest_cut(true),
    )?;
    assert_eq!(plain.evaluate_i64(&[])?, Some(vec![int(2), int(1)]));
    assert_eq!(deepest.evaluate_i64(&[])?, plain.evaluate_i64(&[])?);
    Ok(())
}

#[test]
fn test_solve_is_deterministic() -> Result<()> {
    init_logging();
    let domain = ConstraintMatrix::from_vec(
        4,
        vec![
            (ConstraintKind::Inequality, vec![1, 0, -1, 2]),
            (ConstraintKind::Equality, vec![3, -1, 0, 0]),
            (ConstraintKind::Inequality, vec![-1, -1, 2, 5]),
        ],
    )?;
    let first = polypip::solve(&domain, &nonnegative_n()?, None, &PipOptions::default())?;
    let second = polypip::solve(&domain, &nonnegative_n()?, None, &PipOptions::default())?;
    assert_eq!(first, second);
    assert_eq!(first.clone().simplify(), first);
    Ok(())
}

#[test]
fn test_verbose_solve() -> Result<()> {
    init_logging();
    let domain = ConstraintMatrix::from_vec(3, vec![(ConstraintKind::Equality, vec![2, -1, 0])])?;
    let options = PipOptions::new().with_verbosity(3);
    let quast = polypip::solve(&domain, &nonnegative_n()?, None, &options)?;
    assert_eq!(quast.evaluate_i64(&[6])?, Some(vec![int(3)]));
    Ok(())
}

#[test]
fn test_malformed_input() -> Result<()> {
    init_logging();
    let ragged = ConstraintMatrix::inequalities(3, vec![vec![1, 0]]);
    match ragged {
        Err(PipError::InfeasibleInput(e)) => assert_eq!(e.kind, InputErrorKind::RaggedRow),
        other => panic!("expected a ragged row error, got {:?}", other),
    }

    // the context names two parameters, the domain has room for one
    let domain = ConstraintMatrix::inequalities(2, vec![vec![1, 0]])?;
    let context = ConstraintMatrix::new(3);
    match polypip::solve(&domain, &context, None, &PipOptions::default()) {
        Err(PipError::InfeasibleInput(e)) => assert_eq!(e.kind, InputErrorKind::ColumnMismatch),
        other => panic!("expected a column mismatch, got {:?}", other),
    }

    let domain = ConstraintMatrix::inequalities(3, vec![vec![1, 0, 0]])?;
    match polypip::solve(&domain, &nonnegative_n()?, Some(3), &PipOptions::default()) {
        Err(PipError::InfeasibleInput(e)) => {
            assert_eq!(e.kind, InputErrorKind::BigParameterOutOfRange)
        }
        other => panic!("expected a big parameter error, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_iteration_cap() -> Result<()> {
    init_logging();
    let domain = ConstraintMatrix::inequalities(3, vec![vec![1, 0, -2], vec![-1, 1, -1]])?;
    let options = PipOptions::new().with_max_iterations(1);
    match polypip::solve(&domain, &no_parameters(), None, &options) {
        Err(PipError::ResourceExceeded(e)) => assert_eq!(e.kind, ResourceErrorKind::IterationLimit),
        other => panic!("expected the iteration cap, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_time_limit() -> Result<()> {
    init_logging();
    let domain = ConstraintMatrix::inequalities(3, vec![vec![1, 0, -2], vec![-1, 1, -1]])?;
    let options = PipOptions::new().with_time_limit(Duration::ZERO);
    match polypip::solve(&domain, &no_parameters(), None, &options) {
        Err(PipError::ResourceExceeded(e)) => assert_eq!(e.kind, ResourceErrorKind::TimeLimit),
        other => panic!("expected the time limit, got {:?}", other),
    }

    // an idle solver still gets its whole budget
    let options = PipOptions::new().with_time_limit(Duration::from_millis(500));
    let mut solver = Solver::new(options);
    std::thread::sleep(Duration::from_millis(600));
    let quast = solver.solve(&domain, &no_parameters(), None)?;
    assert_eq!(quast.evaluate_i64(&[])?, Some(vec![int(2), int(3)]));
    Ok(())
}

#[test]
fn test_simplify_option() -> Result<()> {
    init_logging();
    // x <= N - 3 and x <= 2 - N: each bound depends on N, together they are empty
    let domain = ConstraintMatrix::inequalities(3, vec![vec![-1, 1, -3], vec![-1, -1, 2]])?;

    let raw = polypip::solve(
        &domain,
        &nonnegative_n()?,
        None,
        &PipOptions::new().with_simplify(false),
    )?;
    match &raw.node {
        QuastNode::Branch { then_branch, else_branch, .. } => {
            assert!(then_branch.is_no_solution());
            assert!(else_branch.is_no_solution());
        }
        other => panic!("expected a branch, got {:?}", other),
    }
    for n in 0..8i64 {
        assert_eq!(raw.evaluate_i64(&[n])?, None);
    }

    let simplified = polypip::solve(&domain, &nonnegative_n()?, None, &PipOptions::default())?;
    assert!(simplified.is_no_solution());
    assert_eq!(raw.simplify(), simplified);
    Ok(())
}

#[test]
fn test_quast_json() -> Result<()> {
    let domain = ConstraintMatrix::inequalities(3, vec![vec![1, -1, 3]])?;
    let quast = polypip::solve(&domain, &nonnegative_n()?, None, &PipOptions::default())?;
    let json = serde_json::to_string(&quast)?;
    let back: Quast = serde_json::from_str(&json)?;
    assert_eq!(back, quast);
    Ok(())
}
