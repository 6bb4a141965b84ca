//! Commitment scheme over secp256k1
//!
//! Wraps the curve group and its scalar ring behind a single commitment
//! capability: Feldman mode commits as `g^x`, Pedersen (hiding) mode as
//! `g^x * h^r` with an independently derived second generator `h`.

use crate::{Error, Result};
use k256::{
    elliptic_curve::{
        point::DecompressPoint,
        sec1::{FromEncodedPoint, ToEncodedPoint},
        Field,
    },
    AffinePoint, FieldBytes, ProjectivePoint, Scalar,
};
use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use subtle::Choice;

/// Domain separator for deriving the auxiliary generator
const AUX_GENERATOR_LABEL: &[u8] = b"pvss-core/aux-generator/v1";

/// Commitment scheme with a selectable hiding mode
///
/// Constructed once per session; both modes share the curve generator `g`,
/// hiding mode additionally uses the derived generator `h` whose discrete
/// log relative to `g` is unknown.
#[derive(Debug, Clone)]
pub struct CommitmentScheme {
    /// Pedersen (information-theoretically hiding) mode when true,
    /// Feldman (binding only) mode when false
    pub hiding: bool,

    /// Auxiliary generator, used only in hiding mode
    aux_generator: ProjectivePoint,
}

impl CommitmentScheme {
    /// Create a commitment scheme
    ///
    /// Fails with a configuration error if generator derivation produces a
    /// degenerate point.
    pub fn new(hiding: bool) -> Result<Self> {
        let aux_generator = derive_aux_generator()?;

        if aux_generator == ProjectivePoint::IDENTITY {
            return Err(Error::InvalidConfig(
                "Auxiliary generator is the identity".into(),
            ));
        }
        if aux_generator == ProjectivePoint::GENERATOR {
            return Err(Error::InvalidConfig(
                "Auxiliary generator equals the curve generator".into(),
            ));
        }

        Ok(Self {
            hiding,
            aux_generator,
        })
    }

    /// The curve generator `g`
    pub fn generator(&self) -> ProjectivePoint {
        ProjectivePoint::GENERATOR
    }

    /// The auxiliary generator `h`
    pub fn aux_generator(&self) -> ProjectivePoint {
        self.aux_generator
    }

    /// Sample a uniformly random ring element
    pub fn random_scalar(&self, rng: &mut (impl CryptoRng + RngCore)) -> Scalar {
        Scalar::random(rng)
    }

    /// Commit to a ring element
    ///
    /// Hiding mode requires a blinding value; supplying one in Feldman mode
    /// (or omitting it in hiding mode) is a configuration error.
    pub fn commit(&self, value: &Scalar, blinding: Option<&Scalar>) -> Result<ProjectivePoint> {
        match (self.hiding, blinding) {
            (false, None) => Ok(ProjectivePoint::GENERATOR * value),
            (true, Some(blinding)) => {
                Ok(ProjectivePoint::GENERATOR * value + self.aux_generator * blinding)
            }
            (true, None) => Err(Error::InvalidConfig(
                "Hiding commitment requires a blinding value".into(),
            )),
            (false, Some(_)) => Err(Error::InvalidConfig(
                "Blinding value supplied to a non-hiding commitment".into(),
            )),
        }
    }

    /// Check a share against a coefficient commitment vector
    ///
    /// Verifies `com(value, blinding) = prod_j C_j^{x^j}` at the party's
    /// evaluation point `x`.
    pub fn verify_share(
        &self,
        x: u64,
        value: &Scalar,
        blinding: Option<&Scalar>,
        commitments: &[ProjectivePoint],
    ) -> Result<bool> {
        let expected = self.commit(value, blinding)?;

        let x_scalar = Scalar::from(x);
        let mut actual = ProjectivePoint::IDENTITY;
        let mut x_power = Scalar::ONE;
        for commitment in commitments {
            actual += *commitment * x_power;
            x_power *= x_scalar;
        }

        Ok(expected == actual)
    }
}

/// Derive the auxiliary generator by hashing a domain label to an
/// x-coordinate, incrementing a counter until decompression succeeds
fn derive_aux_generator() -> Result<ProjectivePoint> {
    for counter in 0u32..256 {
        let mut hasher = Sha256::new();
        hasher.update(AUX_GENERATOR_LABEL);
        hasher.update(counter.to_be_bytes());
        let candidate_x: FieldBytes = hasher.finalize();

        let affine_opt = AffinePoint::decompress(&candidate_x, Choice::from(0));
        if let Some(affine) = Option::<AffinePoint>::from(affine_opt) {
            return Ok(ProjectivePoint::from(affine));
        }
    }

    // Roughly half of all x-coordinates decompress; 256 misses in a row
    // means the hash input is broken, not bad luck.
    Err(Error::InvalidConfig(
        "Could not derive an auxiliary generator".into(),
    ))
}

/// Encode a group element as compressed SEC1 bytes
pub fn encode_point(point: &ProjectivePoint) -> Vec<u8> {
    point.to_affine().to_encoded_point(true).as_bytes().to_vec()
}

/// Decode a group element from compressed SEC1 bytes
pub fn decode_point(bytes: &[u8]) -> Result<ProjectivePoint> {
    let encoded = k256::EncodedPoint::from_bytes(bytes)
        .map_err(|e| Error::Deserialization(e.to_string()))?;
    let affine_opt = AffinePoint::from_encoded_point(&encoded);
    let affine: AffinePoint = Option::<AffinePoint>::from(affine_opt)
        .ok_or_else(|| Error::Deserialization("Invalid curve point".into()))?;
    Ok(ProjectivePoint::from(affine))
}
