use crate::error::FetchError;
use crate::sources::PageSource;
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use tokio::sync::Mutex;

/// Drivers tried when the configured WebDriver URL does not answer
const FALLBACK_WEBDRIVER_URLS: [&str; 4] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4723", // Appium default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444",
];

/// Page source that renders pages in a browser through WebDriver.
///
/// Images inserted by scripts are only visible this way. The session is opened
/// on first use and reused for every later page.
pub struct WebDriverSource {
    webdriver_url: String,
    client: Mutex<Option<Client>>,
}

impl WebDriverSource {
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            client: Mutex::new(None),
        }
    }

    async fn scrape(client: &Client, url: &str) -> Result<String, fantoccini::error::CmdError> {
        client.goto(url).await?;
        client.source().await
    }
}

#[async_trait]
impl PageSource for WebDriverSource {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let mut guard = self.client.lock().await;

        if guard.is_none() {
            ::log::debug!("Connecting to WebDriver");
            *guard = Some(connect_to_webdriver(&self.webdriver_url).await?);
        }

        for attempt in 0..2 {
            let Some(client) = guard.as_ref() else {
                break;
            };

            match Self::scrape(client, url).await {
                Ok(source) => return Ok(source),
                Err(e) if attempt == 0 && e.to_string().contains("Unable to find session") => {
                    ::log::warn!("Lost WebDriver session while accessing {}", url);
                    *guard = Some(connect_to_webdriver(&self.webdriver_url).await?);
                }
                Err(e) => return Err(FetchError::WebDriver(e.to_string())),
            }
        }

        Err(FetchError::WebDriver(format!("no WebDriver session for {}", url)))
    }

    async fn close(&self) {
        if let Some(client) = self.client.lock().await.take() {
            if let Err(e) = client.close().await {
                ::log::warn!("Failed to close WebDriver client: {}", e);
            }
        }
    }
}

/// Connects to the WebDriver instance, trying well-known local drivers if needed
async fn connect_to_webdriver(webdriver_url: &str) -> Result<Client, FetchError> {
    match ClientBuilder::native().connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
        }
    }

    for url in FALLBACK_WEBDRIVER_URLS {
        if url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = ClientBuilder::native().connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!("Make sure a WebDriver server is running or pass --webdriver");
    Err(FetchError::WebDriver(format!(
        "failed to connect to any WebDriver server (tried {})",
        webdriver_url
    )))
}
