//! # PVSS Core
//!
//! Threshold Pedersen verifiable secret sharing over authenticated
//! point-to-point channels.
//!
//! This crate provides the building blocks for:
//! - Sequential per-dealer VSS (one dealer instance in flight at a time)
//! - Homomorphic collapse of all verified sharings into one joint sharing
//!   of the sum of the dealers' secrets
//! - Threshold recovery with commitment cross-checking
//!
//! ## Protocol Overview
//!
//! Each dealer commits to a random degree-(t-1) polynomial and delivers one
//! evaluation to each party. Parties verify their shares against the public
//! commitments and vote in a bounded complaint window; dealers with too many
//! complaints are rejected. Verified sharings collapse by summing shares and
//! commitments coordinate-wise, and any t parties can recover a sharing's
//! secret, with forged reveals detected against the commitments.
//!
//! ## Example
//!
//! ```rust,ignore
//! use pvss_core::{algebra::CommitmentScheme, vss, SessionConfig};
//!
//! let scheme = CommitmentScheme::new(true)?;
//! let instances = vss::run_sequential(&config, &scheme, &relay, secret).await?;
//! let collapsed = vss::CollapsedSharing::collapse(&instances)?;
//! let sum = vss::run_recovery(&config, &scheme, &relay,
//!     vss::RecoveryTarget::Collapsed(&collapsed)).await?;
//! ```

pub mod algebra;
pub mod error;
pub mod sharing;
pub mod transport;
pub mod types;
pub mod vss;

pub use error::{Error, Result};
pub use types::{PartyId, SessionConfig, SessionId};

use std::time::Duration;

/// Protocol version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bound on every blocking wait for protocol messages
pub const DEFAULT_ROUND_TIMEOUT: Duration = Duration::from_secs(10);

/// Default threshold for a 3-party setup
pub const DEFAULT_THRESHOLD: usize = 2;

/// Default number of parties
pub const DEFAULT_PARTIES: usize = 3;
