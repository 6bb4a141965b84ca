//! Sequential verifiable secret sharing
//!
//! One dealer instance runs at a time: commitments are broadcast, shares are
//! delivered point-to-point, a bounded complaint window decides whether the
//! instance is verified or rejected. Verified instances collapse into one
//! joint sharing of the sum of the dealers' secrets.

mod collapse;
mod coordinator;
mod instance;
mod messages;
mod recovery;

pub use collapse::CollapsedSharing;
pub use coordinator::run_sequential;
pub use instance::{run_instance, InstanceStatus, VssInstance};
pub use messages::*;
pub use recovery::{recover, run_recovery, RecoveryTarget};

use crate::types::PartyId;

/// Relay rounds consumed per dealer instance
const ROUNDS_PER_DEALER: u32 = 4;

/// Per-dealer protocol phases, mapped onto disjoint relay rounds so that
/// sequential instances never share a round number
#[derive(Debug, Clone, Copy)]
pub(crate) enum Phase {
    Commitments = 0,
    Shares = 1,
    Verdicts = 2,
    Reveal = 3,
}

pub(crate) fn round_of(dealer: PartyId, phase: Phase) -> u32 {
    dealer as u32 * ROUNDS_PER_DEALER + phase as u32
}

/// The reveal round for the collapsed sharing, placed after every dealer's
/// round range
pub(crate) fn collapsed_reveal_round(n_parties: usize) -> u32 {
    n_parties as u32 * ROUNDS_PER_DEALER
}
