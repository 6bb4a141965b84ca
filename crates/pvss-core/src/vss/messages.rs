//! VSS wire message types

use crate::sharing::Share;
use crate::PartyId;
use serde::{Deserialize, Serialize};

/// Commitment phase: the dealer's commitments to its polynomial coefficients
/// (SEC1-compressed points, one per coefficient)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitmentsMessage {
    /// Dealer of this instance
    pub dealer: PartyId,
    /// Coefficient commitments, constant term first
    pub commitments: Vec<Vec<u8>>,
}

/// Share phase: one party's private share of the dealer's polynomial
#[derive(Clone, Serialize, Deserialize)]
pub struct ShareMessage {
    /// Sender (the dealer)
    pub from: PartyId,
    /// Receiver party ID
    pub to: PartyId,
    /// The receiver's share
    pub share: Share,
}

/// Verdict phase: each party's view of the dealer after checking its share
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictMessage {
    /// Sender party ID
    pub party_id: PartyId,
    /// Dealer being judged
    pub dealer: PartyId,
    /// `None` acknowledges consistency; `Some(reason)` is a complaint
    pub complaint: Option<String>,
}

/// Recovery phase: a party reveals its share of the target sharing
#[derive(Clone, Serialize, Deserialize)]
pub struct RevealMessage {
    /// Sender party ID
    pub party_id: PartyId,
    /// The revealed share
    pub share: Share,
}
