//! One dealer's run of the sharing protocol
//!
//! Every party executes [`run_instance`] for the same dealer: the dealer
//! broadcasts coefficient commitments and delivers shares point-to-point,
//! each party checks its share and broadcasts an ack or a complaint, and the
//! complaint count at the end of the bounded verdict window decides whether
//! the instance is `Verified` or `Rejected`.

use super::{round_of, CommitmentsMessage, Phase, ShareMessage, VerdictMessage};
use crate::algebra::{decode_point, encode_point, CommitmentScheme};
use crate::sharing::{SecretPolynomial, Share};
use crate::transport::Relay;
use crate::types::SessionConfig;
use crate::{Error, PartyId, Result};
use k256::{elliptic_curve::Field, ProjectivePoint, Scalar};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument, warn};

/// Terminal state of a dealer instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceStatus {
    /// Complaints stayed within the configured fault tolerance
    Verified,
    /// Complaints exceeded the fault tolerance; excluded from collapse
    Rejected {
        /// Distinct complaining parties observed in the verdict window
        complaints: usize,
    },
}

/// A completed dealer instance, immutable once dealing finishes
///
/// Each party holds its own view: the public commitment vector, its private
/// share, and the instance's terminal status.
#[derive(Clone)]
pub struct VssInstance {
    /// The dealer of this instance
    pub dealer: PartyId,
    /// Commitments to the dealer's polynomial coefficients, constant term
    /// first
    pub commitments: Vec<ProjectivePoint>,
    /// This party's share of the dealer's secret
    pub share: Share,
    /// Terminal status after the verdict window
    pub status: InstanceStatus,
}

impl VssInstance {
    /// Whether this instance survived the complaint window
    pub fn is_verified(&self) -> bool {
        self.status == InstanceStatus::Verified
    }
}

/// Run one dealer's instance to its terminal state
///
/// `secret` must be `Some` exactly when this party is the dealer.
#[instrument(skip(config, scheme, relay, secret), fields(party_id = config.party_id))]
pub async fn run_instance<R: Relay>(
    config: &SessionConfig,
    scheme: &CommitmentScheme,
    relay: &R,
    dealer: PartyId,
    secret: Option<Scalar>,
) -> Result<VssInstance> {
    info!(dealer, "Dealer started");

    let (commitments, share, complaint) = if config.party_id == dealer {
        let secret =
            secret.ok_or_else(|| Error::InvalidConfig("Dealer must supply a secret".into()))?;
        let (commitments, share) = deal(config, scheme, relay, secret).await?;
        (commitments, share, None)
    } else {
        if secret.is_some() {
            return Err(Error::InvalidConfig(
                "Only the dealer supplies a secret".into(),
            ));
        }
        receive_dealing(config, scheme, relay, dealer).await
    };

    if let Some(reason) = &complaint {
        debug!(dealer, reason = %reason, "Broadcasting complaint");
    }
    let verdict = VerdictMessage {
        party_id: config.party_id,
        dealer,
        complaint,
    };
    relay
        .broadcast(&config.session_id, round_of(dealer, Phase::Verdicts), &verdict)
        .await?;

    // Bounded wait: whatever verdicts arrived by the deadline are final.
    let verdicts: Vec<VerdictMessage> = relay
        .collect_broadcasts_until(
            &config.session_id,
            round_of(dealer, Phase::Verdicts),
            config.n_parties,
            config.round_timeout,
        )
        .await?;

    let mut complainers: Vec<PartyId> = verdicts
        .iter()
        .filter(|v| v.dealer == dealer && v.complaint.is_some())
        .map(|v| v.party_id)
        .collect();
    complainers.sort_unstable();
    complainers.dedup();
    let complaints = complainers.len();

    let status = if complaints > config.max_faults {
        warn!(dealer, complaints, "Dealer rejected");
        InstanceStatus::Rejected { complaints }
    } else {
        info!(dealer, "Dealer verified");
        InstanceStatus::Verified
    };

    if commitments.is_empty() && status == InstanceStatus::Verified {
        // The rest of the network accepted a dealing this party never saw;
        // without the commitments the instance is unusable locally.
        return Err(Error::Timeout(format!("dealing from party {dealer}")));
    }

    Ok(VssInstance {
        dealer,
        commitments,
        share,
        status,
    })
}

/// Dealer side: generate the polynomial, broadcast commitments, deliver
/// each party's share privately
async fn deal<R: Relay>(
    config: &SessionConfig,
    scheme: &CommitmentScheme,
    relay: &R,
    secret: Scalar,
) -> Result<(Vec<ProjectivePoint>, Share)> {
    let poly = SecretPolynomial::generate(secret, config.threshold, scheme, &mut OsRng)?;
    let commitments = poly.commitments(scheme)?;

    let commitments_msg = CommitmentsMessage {
        dealer: config.party_id,
        commitments: commitments.iter().map(encode_point).collect(),
    };
    relay
        .broadcast(
            &config.session_id,
            round_of(config.party_id, Phase::Commitments),
            &commitments_msg,
        )
        .await?;

    for &party in &config.parties {
        if party == config.party_id {
            continue;
        }
        let share_msg = ShareMessage {
            from: config.party_id,
            to: party,
            share: poly.share_for(SessionConfig::evaluation_point(party)),
        };
        relay
            .send_direct(
                &config.session_id,
                round_of(config.party_id, Phase::Shares),
                party,
                &share_msg,
            )
            .await?;
    }

    let own_share = poly.share_for(SessionConfig::evaluation_point(config.party_id));
    Ok((commitments, own_share))
}

/// Participant side: collect the dealing and check the received share,
/// turning every failure into a complaint rather than an error
async fn receive_dealing<R: Relay>(
    config: &SessionConfig,
    scheme: &CommitmentScheme,
    relay: &R,
    dealer: PartyId,
) -> (Vec<ProjectivePoint>, Share, Option<String>) {
    let my_x = SessionConfig::evaluation_point(config.party_id);
    let placeholder = || Share {
        x: my_x,
        value: Scalar::ZERO,
        blinding: scheme.hiding.then_some(Scalar::ZERO),
    };

    let commitments = match collect_commitments(config, relay, dealer).await {
        Ok(commitments) => commitments,
        Err(e) => return (Vec::new(), placeholder(), Some(e.to_string())),
    };

    if commitments.len() != config.threshold {
        return (
            commitments,
            placeholder(),
            Some("Commitment vector length does not match the threshold".into()),
        );
    }

    let share = match collect_share(config, relay, dealer, my_x).await {
        Ok(share) => share,
        Err(e) => return (commitments, placeholder(), Some(e.to_string())),
    };

    if share.blinding.is_some() != scheme.hiding {
        return (
            commitments,
            placeholder(),
            Some("Share blinding does not match the commitment mode".into()),
        );
    }

    let consistent = scheme
        .verify_share(my_x, &share.value, share.blinding.as_ref(), &commitments)
        .unwrap_or(false);
    if !consistent {
        return (
            commitments,
            share,
            Some("Share is inconsistent with the broadcast commitments".into()),
        );
    }

    (commitments, share, None)
}

async fn collect_commitments<R: Relay>(
    config: &SessionConfig,
    relay: &R,
    dealer: PartyId,
) -> Result<Vec<ProjectivePoint>> {
    let messages: Vec<CommitmentsMessage> = relay
        .collect_broadcasts(
            &config.session_id,
            round_of(dealer, Phase::Commitments),
            1,
            config.round_timeout,
        )
        .await?;
    let message = &messages[0];

    if message.dealer != dealer {
        return Err(Error::VerificationFailed(
            "Commitments attributed to the wrong dealer".into(),
        ));
    }

    message
        .commitments
        .iter()
        .map(|bytes| decode_point(bytes))
        .collect()
}

async fn collect_share<R: Relay>(
    config: &SessionConfig,
    relay: &R,
    dealer: PartyId,
    my_x: u64,
) -> Result<Share> {
    let messages: Vec<ShareMessage> = relay
        .collect_direct(
            &config.session_id,
            round_of(dealer, Phase::Shares),
            config.party_id,
            1,
            config.round_timeout,
        )
        .await?;
    let message = &messages[0];

    if message.from != dealer || message.to != config.party_id {
        return Err(Error::VerificationFailed(
            "Share message misaddressed".into(),
        ));
    }
    if message.share.x != my_x {
        return Err(Error::VerificationFailed(
            "Share evaluated at the wrong point".into(),
        ));
    }

    Ok(message.share.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryRelay;
    use std::time::Duration;

    fn config_for(session_id: [u8; 32], n: usize, t: usize, id: PartyId) -> SessionConfig {
        SessionConfig {
            session_id,
            n_parties: n,
            threshold: t,
            party_id: id,
            parties: (0..n).collect(),
            max_faults: 0,
            round_timeout: Duration::from_millis(500),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn honest_dealer_is_verified_by_all() {
        let relay = MemoryRelay::new();
        let scheme = CommitmentScheme::new(false).unwrap();
        let session_id = [7u8; 32];
        let secret = Scalar::from(42u64);

        let mut handles = Vec::new();
        for id in 0..3 {
            let relay = relay.clone();
            let scheme = scheme.clone();
            let config = config_for(session_id, 3, 2, id);
            handles.push(tokio::spawn(async move {
                let secret = (id == 0).then_some(secret);
                run_instance(&config, &scheme, &relay, 0, secret).await
            }));
        }

        for handle in handles {
            let instance = handle.await.unwrap().unwrap();
            assert_eq!(instance.dealer, 0);
            assert!(instance.is_verified());
            assert_eq!(instance.commitments.len(), 2);
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn equivocating_dealer_is_rejected() {
        let relay = MemoryRelay::new();
        let scheme = CommitmentScheme::new(false).unwrap();
        let session_id = [8u8; 32];

        // Parties 1 and 2 run the protocol honestly against dealer 0.
        let mut handles = Vec::new();
        for id in 1..3 {
            let relay = relay.clone();
            let scheme = scheme.clone();
            let config = config_for(session_id, 3, 2, id);
            handles.push(tokio::spawn(async move {
                run_instance(&config, &scheme, &relay, 0, None).await
            }));
        }

        // Dealer 0 equivocates: honest commitments and share for party 1,
        // a share off the committed polynomial for party 2.
        let poly =
            SecretPolynomial::generate(Scalar::from(5u64), 2, &scheme, &mut OsRng).unwrap();
        let commitments = poly.commitments(&scheme).unwrap();
        relay
            .broadcast(
                &session_id,
                round_of(0, Phase::Commitments),
                &CommitmentsMessage {
                    dealer: 0,
                    commitments: commitments.iter().map(encode_point).collect(),
                },
            )
            .await
            .unwrap();

        let good = poly.share_for(SessionConfig::evaluation_point(1));
        relay
            .send_direct(
                &session_id,
                round_of(0, Phase::Shares),
                1,
                &ShareMessage { from: 0, to: 1, share: good },
            )
            .await
            .unwrap();

        let mut bad = poly.share_for(SessionConfig::evaluation_point(2));
        bad.value += Scalar::ONE;
        relay
            .send_direct(
                &session_id,
                round_of(0, Phase::Shares),
                2,
                &ShareMessage { from: 0, to: 2, share: bad },
            )
            .await
            .unwrap();

        // The dealer acks its own instance.
        relay
            .broadcast(
                &session_id,
                round_of(0, Phase::Verdicts),
                &VerdictMessage { party_id: 0, dealer: 0, complaint: None },
            )
            .await
            .unwrap();

        for handle in handles {
            let instance = handle.await.unwrap().unwrap();
            assert_eq!(instance.status, InstanceStatus::Rejected { complaints: 1 });
            assert!(!instance.is_verified());
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn silent_dealer_times_out_into_rejection() {
        let relay = MemoryRelay::new();
        let scheme = CommitmentScheme::new(false).unwrap();
        let session_id = [9u8; 32];

        // Dealer 0 never shows up; parties 1 and 2 complain after the
        // bounded wait and reject the instance.
        let mut handles = Vec::new();
        for id in 1..3 {
            let relay = relay.clone();
            let scheme = scheme.clone();
            let mut config = config_for(session_id, 3, 2, id);
            config.round_timeout = Duration::from_millis(100);
            handles.push(tokio::spawn(async move {
                run_instance(&config, &scheme, &relay, 0, None).await
            }));
        }

        for handle in handles {
            let instance = handle.await.unwrap().unwrap();
            assert!(matches!(instance.status, InstanceStatus::Rejected { .. }));
        }
    }
}
