use crate::error::{FetchError, ValidatorError};
use crate::sources::{ImageResponse, ImageTransport, PageSource};
use async_trait::async_trait;

/// Plain HTTP page source and image transport backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Build a client that identifies itself with `user_agent`
    pub fn new(user_agent: &str) -> Result<Self, ValidatorError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| ValidatorError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpClient {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl ImageTransport for HttpClient {
    async fn get(&self, url: &str) -> Result<Box<dyn ImageResponse>, FetchError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(Box::new(StreamingResponse(response)))
    }
}

struct StreamingResponse(reqwest::Response);

#[async_trait]
impl ImageResponse for StreamingResponse {
    fn header(&self, name: &str) -> Option<String> {
        self.0
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    async fn chunk(&mut self) -> Result<Option<Vec<u8>>, FetchError> {
        let chunk = self.0.chunk().await?;
        Ok(chunk.map(|bytes| bytes.to_vec()))
    }
}
