//! Secret recovery from revealed shares
//!
//! Interpolates the constant term from at least threshold-many distinct
//! shares and cross-checks it against the coefficient-0 commitment, so a
//! forged or corrupted reveal surfaces as an explicit failure instead of a
//! silently wrong secret.

use super::collapse::CollapsedSharing;
use super::instance::VssInstance;
use super::{collapsed_reveal_round, round_of, Phase, RevealMessage};
use crate::algebra::CommitmentScheme;
use crate::sharing::{interpolate_at_zero, Share};
use crate::transport::Relay;
use crate::types::SessionConfig;
use crate::{Error, Result};
use k256::{ProjectivePoint, Scalar};
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// Which sharing a recovery run targets
#[derive(Clone, Copy)]
pub enum RecoveryTarget<'a> {
    /// A single verified dealer instance
    Instance(&'a VssInstance),
    /// The collapsed joint sharing
    Collapsed(&'a CollapsedSharing),
}

/// Reconstruct a secret from revealed shares and verify it against the
/// public commitments
///
/// Needs `threshold` distinct evaluation points; fewer is an
/// `InsufficientShares` error, a commitment mismatch is `RecoveryFailed`.
/// Every call returns its own result; nothing is cached between calls.
pub fn recover(
    scheme: &CommitmentScheme,
    threshold: usize,
    commitments: &[ProjectivePoint],
    shares: &[Share],
) -> Result<Scalar> {
    // Dedupe by evaluation point; conflicting duplicates would make the
    // interpolation ill-defined.
    let mut by_x: BTreeMap<u64, &Share> = BTreeMap::new();
    for share in shares {
        by_x.entry(share.x).or_insert(share);
    }

    if by_x.len() < threshold {
        return Err(Error::InsufficientShares {
            required: threshold,
            actual: by_x.len(),
        });
    }

    let selected: Vec<&Share> = by_x.values().take(threshold).copied().collect();

    let value_points: Vec<(u64, Scalar)> =
        selected.iter().map(|s| (s.x, s.value)).collect();
    let secret = interpolate_at_zero(&value_points)?;

    let blinding = if scheme.hiding {
        let blinding_points: Vec<(u64, Scalar)> = selected
            .iter()
            .map(|s| {
                s.blinding.map(|b| (s.x, b)).ok_or_else(|| {
                    Error::VerificationFailed("Revealed share is missing its blinding".into())
                })
            })
            .collect::<Result<_>>()?;
        Some(interpolate_at_zero(&blinding_points)?)
    } else {
        None
    };

    let expected = commitments.first().ok_or_else(|| {
        Error::InvalidConfig("Cannot recover against an empty commitment vector".into())
    })?;
    let recomputed = scheme.commit(&secret, blinding.as_ref())?;
    if recomputed != *expected {
        return Err(Error::RecoveryFailed(
            "Interpolated secret does not match the commitment".into(),
        ));
    }

    info!(parties_used = threshold, "Recovery completed");
    Ok(secret)
}

/// Interactive recovery: reveal this party's share of the target and
/// recover once threshold-many reveals have arrived
#[instrument(skip(config, scheme, relay, target), fields(party_id = config.party_id))]
pub async fn run_recovery<R: Relay>(
    config: &SessionConfig,
    scheme: &CommitmentScheme,
    relay: &R,
    target: RecoveryTarget<'_>,
) -> Result<Scalar> {
    let (round, commitments, share) = match target {
        RecoveryTarget::Instance(instance) => {
            if !instance.is_verified() {
                return Err(Error::VerificationFailed(
                    "Cannot recover from a rejected dealer".into(),
                ));
            }
            (
                round_of(instance.dealer, Phase::Reveal),
                &instance.commitments,
                &instance.share,
            )
        }
        RecoveryTarget::Collapsed(collapsed) => (
            collapsed_reveal_round(config.n_parties),
            &collapsed.commitments,
            &collapsed.share,
        ),
    };

    let reveal = RevealMessage {
        party_id: config.party_id,
        share: share.clone(),
    };
    relay
        .broadcast(&config.session_id, round, &reveal)
        .await?;

    // The first `threshold` reveals in relay order are the same at every
    // party, so all honest parties recover from the same subset.
    let reveals: Vec<RevealMessage> = relay
        .collect_broadcasts(
            &config.session_id,
            round,
            config.threshold,
            config.round_timeout,
        )
        .await?;

    let shares: Vec<Share> = reveals.into_iter().map(|m| m.share).collect();
    recover(scheme, config.threshold, commitments, &shares)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sharing::SecretPolynomial;
    use k256::elliptic_curve::{bigint::U256, ops::Reduce};
    use rand::rngs::OsRng;

    fn deal_shares(
        secret: u64,
        threshold: usize,
        parties: u64,
        scheme: &CommitmentScheme,
    ) -> (Vec<ProjectivePoint>, Vec<Share>) {
        let poly =
            SecretPolynomial::generate(Scalar::from(secret), threshold, scheme, &mut OsRng)
                .unwrap();
        let shares = (1..=parties).map(|x| poly.share_for(x)).collect();
        (poly.commitments(scheme).unwrap(), shares)
    }

    #[test]
    fn threshold_subset_recovers_the_secret() {
        // k = 5, t = 3, s = 42: parties 1, 2, 3 suffice
        let scheme = CommitmentScheme::new(false).unwrap();
        let (commitments, shares) = deal_shares(42, 3, 5, &scheme);

        let recovered = recover(&scheme, 3, &commitments, &shares[..3]).unwrap();
        assert_eq!(recovered, Scalar::from(42u64));
    }

    #[test]
    fn disjoint_subsets_recover_identically() {
        let scheme = CommitmentScheme::new(false).unwrap();
        let (commitments, shares) = deal_shares(42, 3, 5, &scheme);

        let a = recover(&scheme, 3, &commitments, &shares[..3]).unwrap();
        let b = recover(&scheme, 3, &commitments, &shares[2..5]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn too_few_shares_is_insufficient() {
        // k = 5, t = 3: parties 1 and 2 alone learn nothing
        let scheme = CommitmentScheme::new(false).unwrap();
        let (commitments, shares) = deal_shares(42, 3, 5, &scheme);

        let result = recover(&scheme, 3, &commitments, &shares[..2]);
        assert!(matches!(
            result,
            Err(Error::InsufficientShares { required: 3, actual: 2 })
        ));
    }

    #[test]
    fn duplicate_reveals_do_not_count_twice() {
        let scheme = CommitmentScheme::new(false).unwrap();
        let (commitments, shares) = deal_shares(42, 3, 5, &scheme);

        let duplicated = vec![shares[0].clone(), shares[0].clone(), shares[1].clone()];
        let result = recover(&scheme, 3, &commitments, &duplicated);
        assert!(matches!(result, Err(Error::InsufficientShares { .. })));
    }

    #[test]
    fn tampered_share_fails_closed() {
        let scheme = CommitmentScheme::new(false).unwrap();
        let (commitments, mut shares) = deal_shares(42, 3, 5, &scheme);

        // Flip one bit of one revealed share's encoding
        let mut bytes = shares[1].value.to_bytes();
        bytes[31] ^= 0x01;
        shares[1].value = <Scalar as Reduce<U256>>::reduce_bytes(&bytes);

        let result = recover(&scheme, 3, &commitments, &shares[..3]);
        assert!(matches!(result, Err(Error::RecoveryFailed(_))));
    }

    #[test]
    fn pedersen_recovery_needs_blindings() {
        let scheme = CommitmentScheme::new(true).unwrap();
        let (commitments, shares) = deal_shares(42, 2, 3, &scheme);

        let recovered = recover(&scheme, 2, &commitments, &shares[..2]).unwrap();
        assert_eq!(recovered, Scalar::from(42u64));

        let mut stripped = shares[..2].to_vec();
        stripped[0].blinding = None;
        assert!(recover(&scheme, 2, &commitments, &stripped).is_err());
    }

    #[test]
    fn threshold_one_recovers_from_any_single_share() {
        let scheme = CommitmentScheme::new(false).unwrap();
        let (commitments, shares) = deal_shares(9, 1, 3, &scheme);

        for share in shares {
            let recovered = recover(&scheme, 1, &commitments, &[share]).unwrap();
            assert_eq!(recovered, Scalar::from(9u64));
        }
    }
}
