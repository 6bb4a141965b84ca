//! Secret polynomial generation and evaluation

use crate::algebra::CommitmentScheme;
use crate::types::{opt_scalar_serde, scalar_serde};
use crate::{Error, Result};
use k256::{elliptic_curve::Field, ProjectivePoint, Scalar};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// One party's evaluation of a secret polynomial
///
/// `x` is the party's evaluation point (never 0, where the secret sits).
/// Hiding mode carries the blinding polynomial's evaluation alongside.
/// No `Debug` impl, so share values cannot leak through logging.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Share {
    /// Evaluation point
    pub x: u64,

    /// Evaluation of the secret polynomial
    #[zeroize(skip)]
    #[serde(with = "scalar_serde")]
    pub value: Scalar,

    /// Evaluation of the blinding polynomial (hiding mode only)
    #[zeroize(skip)]
    #[serde(with = "opt_scalar_serde")]
    pub blinding: Option<Scalar>,
}

/// A random degree-(t-1) polynomial with the secret as constant term
///
/// In hiding mode a second polynomial of the same degree blinds the
/// coefficient commitments.
pub struct SecretPolynomial {
    coefficients: Vec<Scalar>,
    blinding_coefficients: Option<Vec<Scalar>>,
}

impl SecretPolynomial {
    /// Generate a fresh polynomial for a secret
    ///
    /// Coefficients beyond the constant term are fresh uniform randomness on
    /// every call.
    pub fn generate(
        secret: Scalar,
        threshold: usize,
        scheme: &CommitmentScheme,
        rng: &mut (impl CryptoRng + RngCore),
    ) -> Result<Self> {
        if threshold < 1 {
            return Err(Error::InvalidConfig("Threshold must be at least 1".into()));
        }

        let mut coefficients = Vec::with_capacity(threshold);
        coefficients.push(secret);
        for _ in 1..threshold {
            coefficients.push(Scalar::random(&mut *rng));
        }

        let blinding_coefficients = if scheme.hiding {
            Some((0..threshold).map(|_| Scalar::random(&mut *rng)).collect())
        } else {
            None
        };

        Ok(Self {
            coefficients,
            blinding_coefficients,
        })
    }

    /// The threshold this polynomial was generated for
    pub fn threshold(&self) -> usize {
        self.coefficients.len()
    }

    /// The shared secret (constant term)
    pub fn secret(&self) -> &Scalar {
        &self.coefficients[0]
    }

    /// The blinding polynomial's constant term, if hiding
    pub fn blinding_secret(&self) -> Option<&Scalar> {
        self.blinding_coefficients.as_ref().map(|c| &c[0])
    }

    /// Evaluate the polynomial(s) at a party's evaluation point
    pub fn share_for(&self, x: u64) -> Share {
        Share {
            x,
            value: evaluate(&self.coefficients, x),
            blinding: self
                .blinding_coefficients
                .as_ref()
                .map(|coefficients| evaluate(coefficients, x)),
        }
    }

    /// Commit to every coefficient
    pub fn commitments(&self, scheme: &CommitmentScheme) -> Result<Vec<ProjectivePoint>> {
        (0..self.coefficients.len())
            .map(|j| {
                scheme.commit(
                    &self.coefficients[j],
                    self.blinding_coefficients.as_ref().map(|c| &c[j]),
                )
            })
            .collect()
    }
}

/// Evaluate a coefficient vector at a point (Horner would do, but the
/// power-accumulation form matches the verification equation)
fn evaluate(coefficients: &[Scalar], x: u64) -> Scalar {
    let x_scalar = Scalar::from(x);
    let mut result = Scalar::ZERO;
    let mut x_power = Scalar::ONE;

    for coefficient in coefficients {
        result += *coefficient * x_power;
        x_power *= x_scalar;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sharing::interpolate_at_zero;
    use rand::rngs::OsRng;

    #[test]
    fn evaluates_known_polynomial() {
        // f(x) = 3 + 2x + x^2
        let coefficients = vec![Scalar::from(3u64), Scalar::from(2u64), Scalar::from(1u64)];
        assert_eq!(evaluate(&coefficients, 0), Scalar::from(3u64));
        assert_eq!(evaluate(&coefficients, 2), Scalar::from(11u64));
        assert_eq!(evaluate(&coefficients, 5), Scalar::from(38u64));
    }

    #[test]
    fn constant_polynomial_when_threshold_one() {
        let scheme = CommitmentScheme::new(false).unwrap();
        let poly =
            SecretPolynomial::generate(Scalar::from(9u64), 1, &scheme, &mut OsRng).unwrap();
        for x in 1..=5u64 {
            assert_eq!(poly.share_for(x).value, Scalar::from(9u64));
        }
    }

    #[test]
    fn shares_verify_against_commitments() {
        let mut rng = OsRng;
        for hiding in [false, true] {
            let scheme = CommitmentScheme::new(hiding).unwrap();
            let secret = scheme.random_scalar(&mut rng);
            let poly = SecretPolynomial::generate(secret, 3, &scheme, &mut rng).unwrap();
            let commitments = poly.commitments(&scheme).unwrap();

            for x in 1..=5u64 {
                let share = poly.share_for(x);
                assert!(scheme
                    .verify_share(x, &share.value, share.blinding.as_ref(), &commitments)
                    .unwrap());
            }
        }
    }

    #[test]
    fn tampered_share_fails_verification() {
        let mut rng = OsRng;
        let scheme = CommitmentScheme::new(false).unwrap();
        let poly =
            SecretPolynomial::generate(Scalar::from(42u64), 3, &scheme, &mut rng).unwrap();
        let commitments = poly.commitments(&scheme).unwrap();

        let share = poly.share_for(2);
        let tampered = share.value + Scalar::ONE;
        assert!(!scheme.verify_share(2, &tampered, None, &commitments).unwrap());
    }

    #[test]
    fn any_threshold_subset_interpolates_the_secret() {
        let mut rng = OsRng;
        let scheme = CommitmentScheme::new(false).unwrap();
        let secret = Scalar::from(42u64);
        let poly = SecretPolynomial::generate(secret, 3, &scheme, &mut rng).unwrap();

        let shares: Vec<(u64, Scalar)> =
            (1..=5u64).map(|x| (x, poly.share_for(x).value)).collect();

        for subset in [[0usize, 1, 2], [0, 2, 4], [2, 3, 4], [1, 2, 4]] {
            let points: Vec<(u64, Scalar)> = subset.iter().map(|&i| shares[i]).collect();
            assert_eq!(interpolate_at_zero(&points).unwrap(), secret);
        }
    }

    #[test]
    fn full_threshold_needs_every_share() {
        let mut rng = OsRng;
        let scheme = CommitmentScheme::new(false).unwrap();
        let secret = Scalar::from(7u64);
        let poly = SecretPolynomial::generate(secret, 3, &scheme, &mut rng).unwrap();

        // t = k = 3: all three shares reconstruct, two interpolate garbage
        let all: Vec<(u64, Scalar)> = (1..=3u64).map(|x| (x, poly.share_for(x).value)).collect();
        assert_eq!(interpolate_at_zero(&all).unwrap(), secret);
        assert_ne!(interpolate_at_zero(&all[..2]).unwrap(), secret);
    }
}
