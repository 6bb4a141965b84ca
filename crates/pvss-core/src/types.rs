//! Core types for the VSS protocol

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Unique identifier for a party in the protocol (0-indexed)
pub type PartyId = usize;

/// Unique identifier for a session
pub type SessionId = [u8; 32];

/// Serde helpers for `k256::Scalar` fields
pub(crate) mod scalar_serde {
    use k256::{
        elliptic_curve::{bigint::U256, ops::Reduce},
        Scalar,
    };
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(scalar: &Scalar, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let bytes = scalar.to_bytes();
        serializer.serialize_bytes(bytes.as_slice())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Scalar, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes: Vec<u8> = Vec::deserialize(deserializer)?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("Invalid scalar length"))?;
        Ok(<Scalar as Reduce<U256>>::reduce_bytes(&array.into()))
    }
}

/// Same as [`scalar_serde`] but for `Option<Scalar>` (blinding values)
pub(crate) mod opt_scalar_serde {
    use k256::{
        elliptic_curve::{bigint::U256, ops::Reduce},
        Scalar,
    };
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(scalar: &Option<Scalar>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let bytes = scalar.as_ref().map(|s| s.to_bytes().as_slice().to_vec());
        <Option<Vec<u8>> as serde::Serialize>::serialize(&bytes, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Scalar>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes: Option<Vec<u8>> = Option::deserialize(deserializer)?;
        match bytes {
            None => Ok(None),
            Some(bytes) => {
                let array: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| serde::de::Error::custom("Invalid scalar length"))?;
                Ok(Some(<Scalar as Reduce<U256>>::reduce_bytes(&array.into())))
            }
        }
    }
}

/// Configuration for a sequential VSS session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session identifier
    pub session_id: SessionId,

    /// Number of parties
    pub n_parties: usize,

    /// Threshold (shares required to recover)
    pub threshold: usize,

    /// This party's ID
    pub party_id: PartyId,

    /// List of participating party IDs
    pub parties: Vec<PartyId>,

    /// Complaints tolerated against a dealer before its instance is rejected
    pub max_faults: usize,

    /// Bound on every blocking wait for protocol messages
    pub round_timeout: Duration,
}

impl SessionConfig {
    /// Create a new session configuration
    pub fn new(n_parties: usize, threshold: usize, party_id: PartyId) -> crate::Result<Self> {
        if threshold > n_parties {
            return Err(crate::Error::InvalidConfig(
                "Threshold cannot exceed number of parties".into(),
            ));
        }
        if threshold < 1 {
            return Err(crate::Error::InvalidConfig(
                "Threshold must be at least 1".into(),
            ));
        }
        if party_id >= n_parties {
            return Err(crate::Error::InvalidPartyId(party_id));
        }

        let session_id = rand::random();
        let parties = (0..n_parties).collect();

        Ok(Self {
            session_id,
            n_parties,
            threshold,
            party_id,
            parties,
            max_faults: 0,
            round_timeout: crate::DEFAULT_ROUND_TIMEOUT,
        })
    }

    /// Set the complaint tolerance before a dealer is rejected
    pub fn with_max_faults(mut self, max_faults: usize) -> crate::Result<Self> {
        if max_faults >= self.n_parties {
            return Err(crate::Error::InvalidConfig(
                "Fault tolerance must be below the party count".into(),
            ));
        }
        self.max_faults = max_faults;
        Ok(self)
    }

    /// Set the bound on every blocking message wait
    pub fn with_round_timeout(mut self, round_timeout: Duration) -> Self {
        self.round_timeout = round_timeout;
        self
    }

    /// The evaluation point assigned to a party (shares live at x = id + 1,
    /// never at x = 0 where the secret sits)
    pub fn evaluation_point(party_id: PartyId) -> u64 {
        party_id as u64 + 1
    }
}
