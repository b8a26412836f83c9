pub struct InfoFile {
    pub length: i64,
    pub md5sum: Option<String>,
    pub path: Vec<String>,
}

pub struct Info {
    pub piece_length: i64,
    pub pieces: Vec<Vec<u8>>,
    pub private: Option<bool>,
    pub name: String,
    pub files: Option<Vec<InfoFile>>,
    pub length: Option<i64>,
    pub md5sum: Option<String>,
}

pub struct TorrentMetadata {
    pub announce: Option<String>,
    pub announce_list: Option<Vec<Vec<String>>>,
    pub comment: Option<String>,
    pub created_by: Option<String>,
    pub creation_date: Option<i64>,
    pub encoding: Option<String>,
    pub info: Info,
    pub info_hash: [u8; 20],
}

impl TorrentMetadata {
    pub fn is_single_file(&self) -> bool {
        self.info.files.is_none()
    }

    pub fn total_length(&self) -> u64 {
        match &self.info.files {
            Some(files) => files.iter().map(|file| file.length.max(0) as u64).sum(),
            None => self.info.length.unwrap_or_default().max(0) as u64,
        }
    }

    /// Tracker tiers in preference order.
    ///
    /// A non-empty `announce-list` (BEP 12) wins over the single `announce` URL.
    pub fn announce_tiers(&self) -> Vec<Vec<String>> {
        let tiers: Vec<Vec<String>> = self
            .announce_list
            .iter()
            .flatten()
            .map(|tier| {
                tier.iter()
                    .filter(|url| !url.is_empty())
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .filter(|tier| !tier.is_empty())
            .collect();
        if !tiers.is_empty() {
            return tiers;
        }
        self.announce
            .iter()
            .filter(|url| !url.is_empty())
            .map(|url| vec![url.clone()])
            .collect()
    }
}
