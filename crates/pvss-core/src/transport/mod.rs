//! Transport boundary for protocol messages
//!
//! The core assumes authenticated, ordered point-to-point channels are
//! already established per pair of parties; framing, retransmission and
//! transport security live behind this trait.

use crate::{PartyId, Result, SessionId};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

pub use ::async_trait::async_trait;

/// Message relay trait for protocol communication
///
/// Every collect call carries an explicit deadline so no protocol wait is
/// unbounded.
#[async_trait]
pub trait Relay: Send + Sync {
    /// Broadcast a message to all parties
    async fn broadcast<T: Serialize + Send + Sync>(
        &self,
        session_id: &SessionId,
        round: u32,
        message: &T,
    ) -> Result<()>;

    /// Send a direct message to a specific party
    async fn send_direct<T: Serialize + Send + Sync>(
        &self,
        session_id: &SessionId,
        round: u32,
        to: PartyId,
        message: &T,
    ) -> Result<()>;

    /// Collect exactly `count` broadcast messages; errors with `Timeout` if
    /// they do not all arrive before the deadline
    async fn collect_broadcasts<T: DeserializeOwned + Send>(
        &self,
        session_id: &SessionId,
        round: u32,
        count: usize,
        timeout: Duration,
    ) -> Result<Vec<T>>;

    /// Collect up to `count` broadcast messages, returning whatever has
    /// arrived when the deadline elapses (the complaint-window wait)
    async fn collect_broadcasts_until<T: DeserializeOwned + Send>(
        &self,
        session_id: &SessionId,
        round: u32,
        count: usize,
        timeout: Duration,
    ) -> Result<Vec<T>>;

    /// Collect exactly `count` direct messages sent to this party; errors
    /// with `Timeout` on deadline
    async fn collect_direct<T: DeserializeOwned + Send>(
        &self,
        session_id: &SessionId,
        round: u32,
        my_id: PartyId,
        count: usize,
        timeout: Duration,
    ) -> Result<Vec<T>>;
}

/// In-memory relay for testing and single-process demos
pub mod memory;

pub use memory::MemoryRelay;
