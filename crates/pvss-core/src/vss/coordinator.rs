//! Sequential coordination of dealer instances
//!
//! Dealers run strictly one after another: dealer d reaches a terminal state
//! at every party before dealer d+1 starts dealing, so no two instances'
//! messages are ever concurrently in flight.

use super::instance::{run_instance, VssInstance};
use super::InstanceStatus;
use crate::algebra::CommitmentScheme;
use crate::transport::Relay;
use crate::types::SessionConfig;
use crate::Result;
use k256::Scalar;
use tracing::{info, instrument};

/// Run one instance per dealer, in party-ID order, this party contributing
/// `secret` when its own turn to deal comes
///
/// Returns every completed instance in dealer order. Rejected instances are
/// protocol faults, not errors: they stay in the list (and out of any later
/// collapse) so callers can see which dealers misbehaved.
#[instrument(skip(config, scheme, relay, secret), fields(party_id = config.party_id))]
pub async fn run_sequential<R: Relay>(
    config: &SessionConfig,
    scheme: &CommitmentScheme,
    relay: &R,
    secret: Scalar,
) -> Result<Vec<VssInstance>> {
    info!(
        session = hex::encode(config.session_id),
        n_parties = config.n_parties,
        threshold = config.threshold,
        "Starting sequential VSS"
    );

    let mut instances = Vec::with_capacity(config.n_parties);
    for &dealer in &config.parties {
        let my_secret = (dealer == config.party_id).then_some(secret);
        let instance = run_instance(config, scheme, relay, dealer, my_secret).await?;
        instances.push(instance);
    }

    let verified = instances.iter().filter(|i| i.is_verified()).count();
    let rejected: Vec<_> = instances
        .iter()
        .filter_map(|i| match i.status {
            InstanceStatus::Rejected { .. } => Some(i.dealer),
            InstanceStatus::Verified => None,
        })
        .collect();
    info!(verified, rejected = ?rejected, "Sequential VSS completed");

    Ok(instances)
}
