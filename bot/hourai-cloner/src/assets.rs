use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

pub type BoxedAssetSource = std::sync::Arc<dyn AssetSource + Send + Sync + 'static>;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Fetches remote images and packs them into data URIs for re-upload.
#[async_trait]
pub trait AssetSource {
    async fn fetch_data_uri(&self, url: &str) -> Result<String>;
}

pub struct HttpAssetFetcher {
    client: reqwest::Client,
}

impl HttpAssetFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AssetSource for HttpAssetFetcher {
    async fn fetch_data_uri(&self, url: &str) -> Result<String> {
        tracing::debug!("Fetching asset: {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_owned();
        let body = response.bytes().await?;
        Ok(encode_data_uri(&content_type, &body))
    }
}

pub fn encode_data_uri(content_type: &str, payload: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, base64::encode(payload))
}
