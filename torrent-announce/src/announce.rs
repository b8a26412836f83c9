//! Decides when to announce, to which tracker, and commits the outcome.
//!
//! The [`Announcer`] has no scheduler of its own and never blocks. A driver asks
//! [`Announcer::announce_url`], performs the request, then reports back through
//! [`Announcer::start`], [`Announcer::success`] or [`Announcer::failure`].
//! Calls for one torrent must be serialized by the caller.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use rand::RngCore;
use torrent_parser::Field;
use tracing::{debug, info, warn};

use crate::{
    config::AnnounceConfig,
    error::AnnounceResult,
    event::AnnounceEvent,
    request::AnnounceQuery,
    response::{AnnounceOutcome, AnnounceResponse},
    runtime::{AnnounceContext, BtRuntime, PeerStorage, PieceStorage},
    tier::AnnounceList,
    tracker::TrackerState,
};

/// Which kind of announce is due, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Stopped,
    Completed,
    Default,
}

pub struct Announcer {
    context: AnnounceContext,
    config: AnnounceConfig,
    state: TrackerState,
    announce_list: AnnounceList,
    runtime: Arc<dyn BtRuntime>,
    piece_storage: Arc<dyn PieceStorage>,
    peer_storage: Arc<dyn PeerStorage>,
    rng: Box<dyn RngCore + Send>,
}

impl Announcer {
    pub fn new(
        context: AnnounceContext,
        config: AnnounceConfig,
        runtime: Arc<dyn BtRuntime>,
        piece_storage: Arc<dyn PieceStorage>,
        peer_storage: Arc<dyn PeerStorage>,
        mut rng: impl RngCore + Send + 'static,
    ) -> Self {
        let state = TrackerState::new(&mut rng, config.default_interval());
        let announce_list = AnnounceList::new(context.tiers.clone(), config.tier_eligibility);
        Announcer {
            context,
            config,
            state,
            announce_list,
            runtime,
            piece_storage,
            peer_storage,
            rng: Box::new(rng),
        }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn announce_list(&self) -> &AnnounceList {
        &self.announce_list
    }

    pub fn config(&self) -> &AnnounceConfig {
        &self.config
    }

    pub fn is_stopped_announce_ready(&self) -> bool {
        self.state.in_flight == 0
            && self.runtime.is_halt()
            && self.announce_list.count_stopped_allowed_tier() > 0
    }

    pub fn is_completed_announce_ready(&self) -> bool {
        self.state.in_flight == 0
            && self.piece_storage.all_download_finished()
            && self.announce_list.count_completed_allowed_tier() > 0
    }

    pub fn is_default_announce_ready(&self) -> bool {
        self.state.in_flight == 0
            && self.state.min_interval_elapsed(Instant::now())
            && !self.announce_list.all_tiers_failed()
    }

    pub fn readiness(&self) -> Option<Readiness> {
        if self.is_stopped_announce_ready() {
            Some(Readiness::Stopped)
        } else if self.is_completed_announce_ready() {
            Some(Readiness::Completed)
        } else if self.is_default_announce_ready() {
            Some(Readiness::Default)
        } else {
            None
        }
    }

    pub fn is_announce_ready(&self) -> bool {
        self.readiness().is_some()
    }

    /// Nothing in flight, halting, and no tier left to tell: stop scheduling.
    pub fn no_more_announce(&self) -> bool {
        self.state.in_flight == 0
            && self.runtime.is_halt()
            && self.announce_list.count_stopped_allowed_tier() == 0
    }

    pub fn is_all_announce_failed(&self) -> bool {
        self.announce_list.all_tiers_failed()
    }

    /// Selects the event and tracker for the next announce and renders its URL.
    /// `None` when no announce is due.
    pub fn announce_url(&mut self) -> Option<String> {
        match self.readiness()? {
            Readiness::Stopped => {
                if !self.announce_list.current_tier_accepts_stopped_event() {
                    self.announce_list.move_to_stopped_allowed_tier();
                }
                self.announce_list.set_event(AnnounceEvent::Stopped);
            }
            Readiness::Completed => {
                if !self.announce_list.current_tier_accepts_completed_event() {
                    self.announce_list.move_to_completed_allowed_tier();
                }
                self.announce_list.set_event(AnnounceEvent::Completed);
            }
            Readiness::Default => {
                // a tracker must not hear `completed` for a session it never saw start
                if self.piece_storage.all_download_finished() {
                    let event = self.announce_list.event().completed_before_start();
                    self.announce_list.set_event(event);
                }
            }
        }

        let announce = self.announce_list.announce_url()?;
        let stat = self.peer_storage.transfer_stat();
        let left = self
            .piece_storage
            .total_length()
            .saturating_sub(self.piece_storage.completed_length());
        let query = AnnounceQuery {
            info_hash: &self.context.info_hash,
            peer_id: &self.context.peer_id,
            uploaded: stat.session_uploaded,
            downloaded: stat.session_downloaded,
            left,
            key: &self.state.key,
            numwant: self.numwant(),
            port: self.runtime.listen_port(),
            event: self.announce_list.event(),
            tracker_id: self.state.tracker_id.as_deref(),
            require_crypto: self.config.require_crypto,
        };
        Some(query.to_url(announce))
    }

    fn numwant(&self) -> u32 {
        if !self.runtime.less_than_min_peers() || self.runtime.is_halt() {
            0
        } else {
            self.config.numwant
        }
    }

    pub fn start(&mut self) {
        self.state.in_flight += 1;
    }

    pub fn success(&mut self) {
        self.state.in_flight = 0;
        self.state.prev_announce_time = Some(Instant::now());
        self.announce_list.announce_success();
    }

    pub fn failure(&mut self) {
        self.state.in_flight = 0;
        self.announce_list.announce_failure();
        if self.announce_list.all_tiers_failed() {
            warn!("All trackers failed");
        }
    }

    /// Restarts the interval clock and sends the cursor back to the first tracker.
    pub fn reset(&mut self) {
        self.state.prev_announce_time = Some(Instant::now());
        self.announce_list.reset_tier();
    }

    pub fn shuffle_announce(&mut self) {
        self.announce_list.shuffle(&mut *self.rng);
    }

    pub fn override_min_interval(&mut self, min_interval: Duration) {
        self.state.min_interval = min_interval.min(self.state.interval);
    }

    /// Applies a decoded tracker reply. A returned error means the announce failed.
    pub fn process_announce_response(&mut self, reply: &Field) -> AnnounceResult<AnnounceOutcome> {
        debug!("Now processing tracker response.");
        let resp = AnnounceResponse::from_field(reply)?;

        if let Some(warning) = &resp.warning {
            warn!("Tracker returned warning message: {}", warning);
        }
        self.state.update(&resp);

        let mut peers_added = 0;
        match resp.peers {
            Some(peers) => {
                if !self.runtime.is_halt() && self.runtime.less_than_min_peers() {
                    peers_added = peers.len();
                    debug!("Adding {} peers from tracker", peers_added);
                    self.peer_storage.add_peers(peers);
                }
            }
            None => info!("No peer list received."),
        }

        Ok(AnnounceOutcome {
            warning: resp.warning,
            peers_added,
        })
    }

    pub fn process_announce_response_bytes(
        &mut self,
        bencoded: &[u8],
    ) -> AnnounceResult<AnnounceOutcome> {
        let reply = torrent_parser::decode(bencoded)?;
        self.process_announce_response(&reply)
    }
}
