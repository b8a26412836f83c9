pub mod announce;
pub mod config;
pub mod error;
pub mod event;
pub mod peer;
pub mod request;
pub mod response;
pub mod runtime;
pub mod tier;
pub mod tracker;
pub mod transport;
pub mod watcher;

pub use announce::{Announcer, Readiness};
pub use config::{AnnounceConfig, TierEligibility};
pub use error::{AnnounceError, AnnounceResult};
pub use event::AnnounceEvent;
pub use peer::Peer;
pub use response::{AnnounceOutcome, AnnounceResponse};
pub use runtime::{AnnounceContext, BtRuntime, PeerStorage, PieceStorage, TransferStat};
pub use tier::AnnounceList;
pub use tracker::TrackerState;
pub use transport::{AnnounceTransport, HttpTransport};
pub use watcher::TrackerWatcher;
