//! Exact integer arithmetic for the solver.
//!
//! Every tableau entry is a [`BigInt`], so additions and products never
//! overflow. The fallible operations (anything that divides) are wrapped
//! here and report division by zero as an [`ArithmeticError`] instead of
//! panicking.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::utils::errors::{ArithmeticError, ArithmeticErrorKind, PipResult};

/// Floor division with remainder: `a = q * b + r`, `q = floor(a / b)`.
///
/// The remainder carries the sign of the divisor.
pub fn floor_div_rem(a: &BigInt, b: &BigInt) -> PipResult<(BigInt, BigInt)> {
    if b.is_zero() {
        return Err(ArithmeticError::division_by_zero("floor division").into());
    }
    Ok(a.div_mod_floor(b))
}

/// `floor(a / b)`.
pub fn floor_div(a: &BigInt, b: &BigInt) -> PipResult<BigInt> {
    floor_div_rem(a, b).map(|(q, _)| q)
}

/// Non-negative residue of `a` modulo `|b|`.
pub fn modulo(a: &BigInt, b: &BigInt) -> PipResult<BigInt> {
    if b.is_zero() {
        return Err(ArithmeticError::division_by_zero("modulo").into());
    }
    Ok(a.mod_floor(&b.abs()))
}

/// Division that must leave no remainder.
pub fn exact_div(a: &BigInt, b: &BigInt) -> PipResult<BigInt> {
    let (q, r) = floor_div_rem(a, b)?;
    if !r.is_zero() {
        return Err(ArithmeticError {
            message: format!("{} is not divisible by {}", a, b),
            kind: ArithmeticErrorKind::InexactDivision,
        }
        .into());
    }
    Ok(q)
}

/// Compute the GCD of a sequence of integers (0 for an empty or all-zero sequence).
pub fn vector_gcd<'a, I>(values: I) -> BigInt
where
    I: IntoIterator<Item = &'a BigInt>,
{
    let mut acc = BigInt::zero();
    for v in values {
        if acc.is_one() {
            break;
        }
        acc = acc.gcd(v);
    }
    acc
}

/// Solve `z * y = x (mod modulus)` for `z` with the extended Euclidean algorithm.
///
/// Returns 0 when `y` is not invertible modulo `modulus`.
pub fn bezout(x: &BigInt, y: &BigInt, modulus: &BigInt) -> PipResult<BigInt> {
    // u = a*y + b*m and v = c*y + d*m throughout
    let (mut a, mut b) = (BigInt::one(), BigInt::zero());
    let (mut c, mut d) = (BigInt::zero(), BigInt::one());
    let mut u = y.clone();
    let mut v = modulus.clone();
    loop {
        let (q, r) = floor_div_rem(&u, &v)?;
        if r.is_zero() {
            break;
        }
        u = std::mem::replace(&mut v, r);
        let e = &a - &q * &c;
        let f = &b - &q * &d;
        a = std::mem::replace(&mut c, e);
        b = std::mem::replace(&mut d, f);
    }
    if !v.is_one() {
        return Ok(BigInt::zero());
    }
    modulo(&(c * x), modulus)
}
