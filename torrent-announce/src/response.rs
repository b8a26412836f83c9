//! Tracker reply interpretation.
//!
//! Replies are loosely typed. A key that is present with the expected type is
//! used, anything else is treated as absent. Only a non-dictionary reply and an
//! explicit `failure reason` are errors.

use std::time::Duration;

use torrent_parser::Field;

use crate::{
    error::{AnnounceError, AnnounceResult},
    peer::Peer,
};

pub const FAILURE_REASON: &str = "failure reason";
pub const WARNING_MESSAGE: &str = "warning message";
pub const TRACKER_ID: &str = "tracker id";
pub const INTERVAL: &str = "interval";
pub const MIN_INTERVAL: &str = "min interval";
pub const COMPLETE: &str = "complete";
pub const INCOMPLETE: &str = "incomplete";
pub const PEERS: &str = "peers";

/// One decoded tracker reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnounceResponse {
    pub warning: Option<String>,
    /// Raw bytes, echoed back verbatim.
    pub tracker_id: Option<Vec<u8>>,
    /// Only positive values are kept.
    pub interval: Option<Duration>,
    /// Only positive values are kept.
    pub min_interval: Option<Duration>,
    pub complete: Option<u64>,
    pub incomplete: Option<u64>,
    /// `None` when the reply has no `peers` key at all.
    pub peers: Option<Vec<Peer>>,
}

/// What applying a reply did, for the caller's benefit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnounceOutcome {
    pub warning: Option<String>,
    pub peers_added: usize,
}

fn positive_seconds(field: Option<&Field>) -> Option<Duration> {
    field
        .and_then(Field::as_integer)
        .filter(|secs| *secs > 0)
        .map(|secs| Duration::from_secs(secs as u64))
}

fn counter(field: Option<&Field>) -> Option<u64> {
    field
        .and_then(Field::as_integer)
        .and_then(|count| u64::try_from(count).ok())
}

impl AnnounceResponse {
    pub fn from_field(field: &Field) -> AnnounceResult<Self> {
        let dict = field
            .as_dict()
            .ok_or_else(|| AnnounceError::MalformedResponse(field.field_type()))?;

        if let Some(reason) = dict.get(FAILURE_REASON).and_then(Field::as_str_lossy) {
            return Err(AnnounceError::TrackerRejected(reason));
        }

        Ok(AnnounceResponse {
            warning: dict.get(WARNING_MESSAGE).and_then(Field::as_str_lossy),
            tracker_id: dict
                .get(TRACKER_ID)
                .and_then(Field::as_bytes)
                .map(<[u8]>::to_vec),
            interval: positive_seconds(dict.get(INTERVAL)),
            min_interval: positive_seconds(dict.get(MIN_INTERVAL)),
            complete: counter(dict.get(COMPLETE)),
            incomplete: counter(dict.get(INCOMPLETE)),
            peers: dict.get(PEERS).map(Peer::extract),
        })
    }

    pub fn from_bytes(bencoded: &[u8]) -> AnnounceResult<Self> {
        let field = torrent_parser::decode(bencoded)?;
        AnnounceResponse::from_field(&field)
    }
}
