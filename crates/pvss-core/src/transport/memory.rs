//! In-memory relay implementation for testing and single-process demos

use super::{async_trait, Relay};
use crate::{Error, PartyId, Result, SessionId};
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

/// In-memory message relay shared by all parties of a process
///
/// Clone-cheap; clones share the same stores, so one relay instance models
/// the whole network.
#[derive(Clone)]
pub struct MemoryRelay {
    /// Broadcast messages: (session_id, round) -> Vec<message_bytes>
    broadcasts: Arc<DashMap<(SessionId, u32), Vec<Vec<u8>>>>,
    /// Direct messages: (session_id, round, to) -> Vec<message_bytes>
    directs: Arc<DashMap<(SessionId, u32, PartyId), Vec<Vec<u8>>>>,
    /// Notification channel
    notify: broadcast::Sender<()>,
}

impl MemoryRelay {
    /// Create a new in-memory relay
    pub fn new() -> Self {
        let (notify, _) = broadcast::channel(1024);
        Self {
            broadcasts: Arc::new(DashMap::new()),
            directs: Arc::new(DashMap::new()),
            notify,
        }
    }
}

impl Default for MemoryRelay {
    fn default() -> Self {
        Self::new()
    }
}

fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))
}

fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| Error::Deserialization(e.to_string()))
}

impl MemoryRelay {
    /// Wait until `count` messages are present under a broadcast key or the
    /// deadline elapses; returns what is present either way
    async fn wait_broadcasts<T: DeserializeOwned>(
        &self,
        key: (SessionId, u32),
        count: usize,
        deadline: Instant,
    ) -> Result<Vec<T>> {
        let mut rx = self.notify.subscribe();

        loop {
            let ready = self
                .broadcasts
                .get(&key)
                .map(|messages| messages.len() >= count)
                .unwrap_or(false);

            if ready || Instant::now() >= deadline {
                let messages = match self.broadcasts.get(&key) {
                    Some(messages) => messages
                        .iter()
                        .take(count)
                        .map(|bytes| deserialize(bytes))
                        .collect::<Result<Vec<T>>>()?,
                    None => Vec::new(),
                };
                return Ok(messages);
            }

            tokio::select! {
                _ = rx.recv() => continue,
                _ = tokio::time::sleep_until(deadline) => continue,
            }
        }
    }
}

#[async_trait]
impl Relay for MemoryRelay {
    async fn broadcast<T: Serialize + Send + Sync>(
        &self,
        session_id: &SessionId,
        round: u32,
        message: &T,
    ) -> Result<()> {
        let bytes = serialize(message)?;

        self.broadcasts
            .entry((*session_id, round))
            .or_default()
            .push(bytes);

        let _ = self.notify.send(());
        Ok(())
    }

    async fn send_direct<T: Serialize + Send + Sync>(
        &self,
        session_id: &SessionId,
        round: u32,
        to: PartyId,
        message: &T,
    ) -> Result<()> {
        let bytes = serialize(message)?;

        self.directs
            .entry((*session_id, round, to))
            .or_default()
            .push(bytes);

        let _ = self.notify.send(());
        Ok(())
    }

    async fn collect_broadcasts<T: DeserializeOwned + Send>(
        &self,
        session_id: &SessionId,
        round: u32,
        count: usize,
        timeout: Duration,
    ) -> Result<Vec<T>> {
        let deadline = Instant::now() + timeout;
        let messages = self
            .wait_broadcasts((*session_id, round), count, deadline)
            .await?;

        if messages.len() < count {
            return Err(Error::Timeout(format!(
                "broadcasts in round {round}: got {}, wanted {count}",
                messages.len()
            )));
        }
        Ok(messages)
    }

    async fn collect_broadcasts_until<T: DeserializeOwned + Send>(
        &self,
        session_id: &SessionId,
        round: u32,
        count: usize,
        timeout: Duration,
    ) -> Result<Vec<T>> {
        let deadline = Instant::now() + timeout;
        self.wait_broadcasts((*session_id, round), count, deadline)
            .await
    }

    async fn collect_direct<T: DeserializeOwned + Send>(
        &self,
        session_id: &SessionId,
        round: u32,
        my_id: PartyId,
        count: usize,
        timeout: Duration,
    ) -> Result<Vec<T>> {
        let deadline = Instant::now() + timeout;
        let key = (*session_id, round, my_id);
        let mut rx = self.notify.subscribe();

        loop {
            if let Some(messages) = self.directs.get(&key) {
                if messages.len() >= count {
                    return messages
                        .iter()
                        .take(count)
                        .map(|bytes| deserialize(bytes))
                        .collect();
                }
            }

            if Instant::now() >= deadline {
                let present = self.directs.get(&key).map(|m| m.len()).unwrap_or(0);
                return Err(Error::Timeout(format!(
                    "direct messages in round {round}: got {present}, wanted {count}"
                )));
            }

            tokio::select! {
                _ = rx.recv() => continue,
                _ = tokio::time::sleep_until(deadline) => continue,
            }
        }
    }
}
