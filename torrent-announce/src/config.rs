//! Announce tunables.
//!
//! Every field has a default, so a partial JSON document (or `{}`) is a valid config.

use std::time::Duration;

use serde::Deserialize;

use crate::error::AnnounceResult;

/// Interval used until a tracker supplies its own.
pub const DEFAULT_ANNOUNCE_INTERVAL: u64 = 1800;

/// Peers requested per announce while the pool is below its target.
pub const DEFAULT_NUMWANT: u32 = 50;

/// Which tiers may carry the `stopped` and `completed` events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierEligibility {
    #[default]
    FirstTier,
    AllTiers,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnnounceConfig {
    /// Send `requirecrypto=1` instead of `supportcrypto=1`.
    pub require_crypto: bool,
    pub numwant: u32,
    pub default_interval_secs: u64,
    pub tier_eligibility: TierEligibility,
    /// Shuffle URLs within each tier before the first announce.
    pub shuffle_tiers: bool,
    pub poll_interval_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for AnnounceConfig {
    fn default() -> Self {
        AnnounceConfig {
            require_crypto: false,
            numwant: DEFAULT_NUMWANT,
            default_interval_secs: DEFAULT_ANNOUNCE_INTERVAL,
            tier_eligibility: TierEligibility::default(),
            shuffle_tiers: true,
            poll_interval_ms: 1000,
            request_timeout_secs: 60,
        }
    }
}

impl AnnounceConfig {
    pub fn from_json(json: &str) -> AnnounceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn default_interval(&self) -> Duration {
        Duration::from_secs(self.default_interval_secs.max(1))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
