use percent_encoding::{percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::event::AnnounceEvent;

/// Everything outside the RFC 3986 unreserved set is escaped, byte for byte.
const TORRENT_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub fn torrent_urlencode(bytes: &[u8]) -> String {
    percent_encode(bytes, TORRENT_ESCAPE).to_string()
}

/// The query an announce appends to a tracker URL.
#[derive(Debug, Clone)]
pub struct AnnounceQuery<'a> {
    pub info_hash: &'a [u8; 20],
    pub peer_id: &'a [u8; 20],
    pub uploaded: u64,
    pub downloaded: u64,
    pub left: u64,
    pub key: &'a str,
    pub numwant: u32,
    pub port: u16,
    pub event: AnnounceEvent,
    pub tracker_id: Option<&'a [u8]>,
    pub require_crypto: bool,
}

impl AnnounceQuery<'_> {
    pub fn to_query_string(&self) -> String {
        let mut query = format!(
            "info_hash={}&peer_id={}&uploaded={}&downloaded={}&left={}&compact=1&key={}&numwant={}&no_peer_id=1",
            torrent_urlencode(self.info_hash),
            torrent_urlencode(self.peer_id),
            self.uploaded,
            self.downloaded,
            self.left,
            self.key,
            self.numwant,
        );
        if self.port > 0 {
            query.push_str(&format!("&port={}", self.port));
        }
        if let Some(event) = self.event.query_value() {
            query.push_str(&format!("&event={}", event));
        }
        if let Some(tracker_id) = self.tracker_id {
            query.push_str(&format!("&trackerid={}", torrent_urlencode(tracker_id)));
        }
        query.push_str(if self.require_crypto {
            "&requirecrypto=1"
        } else {
            "&supportcrypto=1"
        });
        query
    }

    pub fn to_url(&self, announce: &str) -> String {
        let separator = if announce.ends_with('?') || announce.ends_with('&') {
            ""
        } else if url_has_query(announce) {
            "&"
        } else {
            "?"
        };
        format!("{}{}{}", announce, separator, self.to_query_string())
    }
}

fn url_has_query(announce: &str) -> bool {
    match Url::parse(announce) {
        Ok(url) => url.query().is_some_and(|query| !query.is_empty()),
        Err(_) => announce.contains('?'),
    }
}
