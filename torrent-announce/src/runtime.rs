//! Collaborators the announce logic reads from and reports to.
//!
//! Implementations are shared with the rest of the client, so every method takes
//! `&self` and implementors handle their own synchronization.

use torrent_parser::model::TorrentMetadata;

use crate::peer::Peer;

pub trait BtRuntime: Send + Sync {
    /// The torrent is shutting down.
    fn is_halt(&self) -> bool;

    /// Zero when no listener is bound.
    fn listen_port(&self) -> u16;

    fn less_than_min_peers(&self) -> bool;
}

pub trait PieceStorage: Send + Sync {
    fn total_length(&self) -> u64;

    fn completed_length(&self) -> u64;

    fn all_download_finished(&self) -> bool;
}

/// Bytes moved since this session started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStat {
    pub session_uploaded: u64,
    pub session_downloaded: u64,
}

pub trait PeerStorage: Send + Sync {
    fn transfer_stat(&self) -> TransferStat;

    fn add_peers(&self, peers: Vec<Peer>);
}

/// Read-only torrent identity and tracker list.
#[derive(Debug, Clone)]
pub struct AnnounceContext {
    pub info_hash: [u8; 20],
    pub peer_id: [u8; 20],
    pub tiers: Vec<Vec<String>>,
}

impl AnnounceContext {
    pub fn from_metadata(metadata: &TorrentMetadata, peer_id: [u8; 20]) -> Self {
        AnnounceContext {
            info_hash: metadata.info_hash,
            peer_id,
            tiers: metadata.announce_tiers(),
        }
    }
}

#[cfg(test)]
mod tests {
    use torrent_parser::model::Info;

    use super::*;

    #[test]
    fn test_context_from_metadata() {
        let metadata = TorrentMetadata {
            announce: Some("http://fallback.example/announce".to_string()),
            announce_list: Some(vec![
                vec![],
                vec!["http://tier1.example/announce".to_string()],
            ]),
            comment: None,
            created_by: None,
            creation_date: None,
            encoding: None,
            info: Info {
                piece_length: 16384,
                pieces: vec![],
                private: None,
                name: "file".to_string(),
                files: None,
                length: Some(16384),
                md5sum: None,
            },
            info_hash: [7; 20],
        };

        let context = AnnounceContext::from_metadata(&metadata, [1; 20]);

        assert_eq!(context.info_hash, [7; 20]);
        assert_eq!(
            context.tiers,
            vec![vec!["http://tier1.example/announce".to_string()]]
        );
    }
}
