use thiserror::Error;
use torrent_parser::error::TorrentParserError;

#[derive(Error, Debug)]
pub enum AnnounceError {
    #[error("Malformed Tracker Response: expected Dict, found {0}")]
    MalformedResponse(String),

    #[error("Tracker Rejected Announce: {0}")]
    TrackerRejected(String),

    #[error("Torrent Parser Error: {0}")]
    TorrentParserError(#[from] TorrentParserError),

    #[error("HTTP Error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid Config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type AnnounceResult<T> = Result<T, AnnounceError>;
