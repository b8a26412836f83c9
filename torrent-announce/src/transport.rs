use async_trait::async_trait;
use reqwest::Client;

use crate::{config::AnnounceConfig, error::AnnounceResult};

/// Performs the GET for one announce URL and hands back the raw reply body.
#[async_trait]
pub trait AnnounceTransport: Send + Sync {
    async fn get(&self, url: &str) -> AnnounceResult<Vec<u8>>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &AnnounceConfig) -> AnnounceResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(HttpTransport { client })
    }
}

#[async_trait]
impl AnnounceTransport for HttpTransport {
    async fn get(&self, url: &str) -> AnnounceResult<Vec<u8>> {
        let resp = self.client.get(url).send().await?.error_for_status()?;
        Ok(resp.bytes().await?.to_vec())
    }
}
