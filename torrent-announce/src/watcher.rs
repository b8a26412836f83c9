use std::time::Duration;

use tokio::{task::JoinHandle, time::sleep};
use tracing::{debug, info, warn};

use crate::{announce::Announcer, error::AnnounceResult, transport::AnnounceTransport};

/// Drives one torrent's [`Announcer`] against a transport until it has nothing left to say.
///
/// The watcher is the only writer of its announcer. When every tracker failed it
/// resets the list, which also restarts the interval clock, so trackers are
/// retried once per min interval.
pub struct TrackerWatcher<T> {
    announcer: Announcer,
    transport: T,
    poll_interval: Duration,
}

impl<T: AnnounceTransport + 'static> TrackerWatcher<T> {
    pub fn new(mut announcer: Announcer, transport: T) -> Self {
        if announcer.config().shuffle_tiers {
            announcer.shuffle_announce();
        }
        let poll_interval = announcer.config().poll_interval();
        TrackerWatcher {
            announcer,
            transport,
            poll_interval,
        }
    }

    pub fn spawn(self) -> JoinHandle<Announcer> {
        tokio::spawn(self.run())
    }

    pub async fn run(mut self) -> Announcer {
        loop {
            if self.announcer.no_more_announce() {
                info!("No more announce is required.");
                break;
            }
            if let Some(url) = self.announcer.announce_url() {
                self.announcer.start();
                match self.exchange(&url).await {
                    Ok(()) => self.announcer.success(),
                    Err(e) => {
                        warn!("Announce to {} failed: {}", url, e);
                        self.announcer.failure();
                        if self.announcer.is_all_announce_failed() {
                            self.announcer.reset();
                        }
                    }
                }
            }
            sleep(self.poll_interval).await;
        }
        self.announcer
    }

    async fn exchange(&mut self, url: &str) -> AnnounceResult<()> {
        debug!("Announcing to {}", url);
        let body = self.transport.get(url).await?;
        let outcome = self.announcer.process_announce_response_bytes(&body)?;
        debug!("Tracker added {} peers", outcome.peers_added);
        Ok(())
    }
}
