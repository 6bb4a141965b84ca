//! Lagrange interpolation at x = 0

use crate::{Error, Result};
use k256::{elliptic_curve::Field, Scalar};

/// Lagrange coefficient of the point `x_i` within the set `xs`, evaluated
/// at x = 0
pub fn lagrange_coefficient_at_zero(x_i: u64, xs: &[u64]) -> Result<Scalar> {
    let mut numerator = Scalar::ONE;
    let mut denominator = Scalar::ONE;

    for &x_j in xs {
        if x_j == x_i {
            continue;
        }
        numerator *= Scalar::from(x_j);
        let diff = if x_j > x_i {
            Scalar::from(x_j - x_i)
        } else {
            -Scalar::from(x_i - x_j)
        };
        denominator *= diff;
    }

    let inverse = Option::<Scalar>::from(denominator.invert())
        .ok_or_else(|| Error::InvalidConfig("Evaluation points must be distinct".into()))?;

    Ok(numerator * inverse)
}

/// Reconstruct a polynomial's constant term from evaluation points
///
/// The points determine a unique polynomial of degree `points.len() - 1`;
/// callers are responsible for supplying at least threshold-many distinct
/// points.
pub fn interpolate_at_zero(points: &[(u64, Scalar)]) -> Result<Scalar> {
    if points.is_empty() {
        return Err(Error::InsufficientShares {
            required: 1,
            actual: 0,
        });
    }

    let xs: Vec<u64> = points.iter().map(|(x, _)| *x).collect();

    let mut result = Scalar::ZERO;
    for (x_i, y_i) in points {
        result += *y_i * lagrange_coefficient_at_zero(*x_i, &xs)?;
    }

    Ok(result)
}
