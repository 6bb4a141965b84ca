//! Secret polynomials, shares and Lagrange interpolation

mod lagrange;
mod polynomial;

pub use lagrange::{interpolate_at_zero, lagrange_coefficient_at_zero};
pub use polynomial::{SecretPolynomial, Share};
