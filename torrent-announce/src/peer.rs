use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use byteorder::{BigEndian, ByteOrder};
use torrent_parser::Field;
use tracing::debug;

const COMPACT_PEER_LENGTH: usize = 6;

/// A peer address handed out by a tracker.
#[derive(Debug, Clone)]
pub struct Peer {
    pub addr: SocketAddr,
    /// Only present in the list-of-dicts reply form.
    pub id: Option<Vec<u8>>,
}

impl PartialEq for Peer {
    // we consider two peers equal if they share an address
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl Eq for Peer {}

impl Peer {
    pub fn new(addr: SocketAddr) -> Self {
        Peer { addr, id: None }
    }

    /// Decodes either reply form of the `peers` key. Anything else yields no peers.
    pub fn extract(peers: &Field) -> Vec<Peer> {
        if let Some(compact) = peers.as_bytes() {
            Peer::from_compact(compact)
        } else if let Some(entries) = peers.as_list() {
            entries.iter().filter_map(Peer::from_dict).collect()
        } else {
            debug!("Ignoring peers of type {}", peers.field_type());
            Vec::new()
        }
    }

    /// 4 bytes of IPv4 address followed by a big-endian port, per peer.
    /// A trailing partial record is ignored.
    pub fn from_compact(compact: &[u8]) -> Vec<Peer> {
        compact
            .chunks_exact(COMPACT_PEER_LENGTH)
            .map(|chunk| {
                let ip = Ipv4Addr::new(chunk[0], chunk[1], chunk[2], chunk[3]);
                let port = BigEndian::read_u16(&chunk[4..6]);
                Peer::new(SocketAddr::new(IpAddr::V4(ip), port))
            })
            .collect()
    }

    fn from_dict(entry: &Field) -> Option<Peer> {
        let ip = entry.get("ip").and_then(Field::as_str_lossy)?;
        let ip = match ip.parse::<IpAddr>() {
            Ok(ip) => ip,
            Err(_) => {
                debug!("Skipping peer with unusable address {}", ip);
                return None;
            }
        };
        let port = entry
            .get("port")
            .and_then(Field::as_integer)
            .and_then(|port| u16::try_from(port).ok())
            .filter(|port| *port != 0)?;
        let id = entry
            .get("peer id")
            .and_then(Field::as_bytes)
            .map(<[u8]>::to_vec);

        Some(Peer {
            addr: SocketAddr::new(ip, port),
            id,
        })
    }
}
