use std::time::{Duration, Instant};

use rand::{distr::Alphanumeric, Rng};
use tracing::debug;

use crate::response::AnnounceResponse;

const KEY_LENGTH: usize = 8;

/// Per-torrent state carried from one announce to the next.
pub struct TrackerState {
    /// Random token sent with every request so trackers can recognize us across IP changes.
    pub key: String,
    pub tracker_id: Option<Vec<u8>>,
    pub interval: Duration,
    pub min_interval: Duration,
    /// Seeders reported by the last tracker reply.
    pub complete: u64,
    /// Leechers reported by the last tracker reply.
    pub incomplete: u64,
    pub prev_announce_time: Option<Instant>,
    pub in_flight: u32,
}

impl TrackerState {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, default_interval: Duration) -> Self {
        TrackerState {
            key: generate_key(rng),
            tracker_id: None,
            interval: default_interval,
            min_interval: default_interval,
            complete: 0,
            incomplete: 0,
            prev_announce_time: None,
            in_flight: 0,
        }
    }

    /// `true` when no announce happened yet or at least `min_interval` passed since the last one.
    pub fn min_interval_elapsed(&self, now: Instant) -> bool {
        match self.prev_announce_time {
            Some(prev) => now.saturating_duration_since(prev) >= self.min_interval,
            None => true,
        }
    }

    pub fn update(&mut self, resp: &AnnounceResponse) {
        if let Some(id) = &resp.tracker_id {
            self.tracker_id = Some(id.clone());
            debug!("Tracker ID: {}", String::from_utf8_lossy(id));
        }
        if let Some(interval) = resp.interval {
            self.interval = interval;
            debug!("Interval: {}s", interval.as_secs());
        }
        // without a min interval the tracker's interval is the floor as well
        self.min_interval = match resp.min_interval {
            Some(min_interval) => min_interval.min(self.interval),
            None => self.interval,
        };
        debug!("Min interval: {}s", self.min_interval.as_secs());
        if let Some(complete) = resp.complete {
            self.complete = complete;
            debug!("Complete: {}", complete);
        }
        if let Some(incomplete) = resp.incomplete {
            self.incomplete = incomplete;
            debug!("Incomplete: {}", incomplete);
        }
    }
}

fn generate_key<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..KEY_LENGTH)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}
