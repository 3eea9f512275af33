pub mod http;
pub mod webdriver;

use crate::error::FetchError;
use async_trait::async_trait;

/// Something that can hand back the HTML of a page
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the page and return its markup
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;

    /// Release any session held by the source
    async fn close(&self) {}
}

/// Something that can issue a GET for an image
#[async_trait]
pub trait ImageTransport: Send + Sync {
    /// Send the request and return once status and headers are available.
    ///
    /// Error statuses are reported as [`FetchError::Status`].
    async fn get(&self, url: &str) -> Result<Box<dyn ImageResponse>, FetchError>;
}

/// An in-flight image response
#[async_trait]
pub trait ImageResponse: Send {
    /// Header value by lower-case name, if present and valid UTF-8
    fn header(&self, name: &str) -> Option<String>;

    /// Next chunk of the body, `None` once the body is exhausted
    async fn chunk(&mut self) -> Result<Option<Vec<u8>>, FetchError>;
}

pub use http::HttpClient;
pub use webdriver::WebDriverSource;
