//! Homomorphic collapse of verified instances
//!
//! A local, deterministic aggregation: no new interaction, any party can
//! compute it from the public commitments and its own shares. The collapsed
//! sharing's secret is the sum of the contributing dealers' secrets, which
//! no single party ever learns directly.

use super::instance::VssInstance;
use crate::sharing::Share;
use crate::{Error, PartyId, Result};
use k256::{elliptic_curve::Field, ProjectivePoint, Scalar};
use tracing::info;

/// One joint sharing of the sum of all verified dealers' secrets
#[derive(Clone)]
pub struct CollapsedSharing {
    /// Coordinate-wise sum of the contributing commitment vectors
    pub commitments: Vec<ProjectivePoint>,
    /// Sum of this party's shares across contributing instances
    pub share: Share,
    /// Dealers whose verified instances contributed
    pub dealers: Vec<PartyId>,
}

impl CollapsedSharing {
    /// Collapse the verified subset of a completed instance list
    ///
    /// Rejected instances are skipped; collapsing is an error only when no
    /// instance verified at all.
    pub fn collapse(instances: &[VssInstance]) -> Result<Self> {
        let verified: Vec<&VssInstance> = instances.iter().filter(|i| i.is_verified()).collect();

        let first = verified.first().ok_or_else(|| {
            Error::InvalidConfig("No verified instances to collapse".into())
        })?;

        let width = first.commitments.len();
        let x = first.share.x;
        let hiding = first.share.blinding.is_some();
        for instance in &verified {
            if instance.commitments.len() != width
                || instance.share.x != x
                || instance.share.blinding.is_some() != hiding
            {
                return Err(Error::InvalidConfig(
                    "Instances disagree on threshold, evaluation point or commitment mode".into(),
                ));
            }
        }

        let mut commitments = vec![ProjectivePoint::IDENTITY; width];
        let mut value = Scalar::ZERO;
        let mut blinding = hiding.then_some(Scalar::ZERO);
        let mut dealers = Vec::with_capacity(verified.len());

        for instance in &verified {
            for (sum, commitment) in commitments.iter_mut().zip(&instance.commitments) {
                *sum += commitment;
            }
            value += instance.share.value;
            if let (Some(total), Some(part)) = (blinding.as_mut(), instance.share.blinding) {
                *total += part;
            }
            dealers.push(instance.dealer);
        }

        info!(dealers = ?dealers, "Collapse completed");

        Ok(Self {
            commitments,
            share: Share { x, value, blinding },
            dealers,
        })
    }
}
