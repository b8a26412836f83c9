#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex,
};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use torrent_announce::{
    AnnounceConfig, AnnounceContext, Announcer, BtRuntime, Peer, PeerStorage, PieceStorage,
    TransferStat,
};

pub const INFO_HASH: [u8; 20] = [0x11; 20];
pub const PEER_ID: &[u8; 20] = b"-TA0000-012345678901";

pub struct MockRuntime {
    pub halt: AtomicBool,
    pub port: u16,
    pub less_than_min_peers: AtomicBool,
}

impl BtRuntime for MockRuntime {
    fn is_halt(&self) -> bool {
        self.halt.load(Ordering::SeqCst)
    }

    fn listen_port(&self) -> u16 {
        self.port
    }

    fn less_than_min_peers(&self) -> bool {
        self.less_than_min_peers.load(Ordering::SeqCst)
    }
}

pub struct MockPieceStorage {
    pub total: u64,
    pub completed: AtomicU64,
}

impl MockPieceStorage {
    pub fn finish(&self) {
        self.completed.store(self.total, Ordering::SeqCst);
    }
}

impl PieceStorage for MockPieceStorage {
    fn total_length(&self) -> u64 {
        self.total
    }

    fn completed_length(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }

    fn all_download_finished(&self) -> bool {
        self.completed_length() >= self.total
    }
}

#[derive(Default)]
pub struct MockPeerStorage {
    pub stat: Mutex<TransferStat>,
    pub peers: Mutex<Vec<Peer>>,
}

impl PeerStorage for MockPeerStorage {
    fn transfer_stat(&self) -> TransferStat {
        *self.stat.lock().unwrap()
    }

    fn add_peers(&self, peers: Vec<Peer>) {
        self.peers.lock().unwrap().extend(peers);
    }
}

pub struct Harness {
    pub runtime: Arc<MockRuntime>,
    pub pieces: Arc<MockPieceStorage>,
    pub peers: Arc<MockPeerStorage>,
}

impl Harness {
    pub fn new() -> Self {
        Harness {
            runtime: Arc::new(MockRuntime {
                halt: AtomicBool::new(false),
                port: 6881,
                less_than_min_peers: AtomicBool::new(true),
            }),
            pieces: Arc::new(MockPieceStorage {
                total: 1000,
                completed: AtomicU64::new(250),
            }),
            peers: Arc::new(MockPeerStorage::default()),
        }
    }

    pub fn halt(&self) {
        self.runtime.halt.store(true, Ordering::SeqCst);
    }

    pub fn set_less_than_min_peers(&self, value: bool) {
        self.runtime
            .less_than_min_peers
            .store(value, Ordering::SeqCst);
    }

    pub fn announcer(&self, tiers: &[&[&str]], config: AnnounceConfig) -> Announcer {
        let context = AnnounceContext {
            info_hash: INFO_HASH,
            peer_id: *PEER_ID,
            tiers: tiers
                .iter()
                .map(|tier| tier.iter().map(|url| url.to_string()).collect())
                .collect(),
        };
        Announcer::new(
            context,
            config,
            self.runtime.clone(),
            self.pieces.clone(),
            self.peers.clone(),
            ChaCha8Rng::seed_from_u64(42),
        )
    }
}

/// Query parameter names of an announce URL, in order.
pub fn query_names(url: &str) -> Vec<String> {
    let (_, query) = url.split_once('?').unwrap();
    query
        .split('&')
        .map(|pair| pair.split_once('=').unwrap().0.to_string())
        .collect()
}

pub fn query_value(url: &str, name: &str) -> Option<String> {
    let (_, query) = url.split_once('?').unwrap();
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}
