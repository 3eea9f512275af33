use std::time::Duration;
use thiserror::Error;

/// Transport failure while fetching a page or an image
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("bad HTTP response, status code: {0}")]
    Status(u16),
    #[error("no response within {} seconds", .0.as_secs())]
    Timeout(Duration),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("webdriver error: {0}")]
    WebDriver(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) if err.is_status() => FetchError::Status(status.as_u16()),
            _ => FetchError::Transport(err.to_string()),
        }
    }
}

/// Errors that stop an invocation or a whole run
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("invalid URL provided: {0}")]
    InvalidSeed(String),
    #[error("no URLs provided")]
    NoSeeds,
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("OCR engine failed: {0}")]
    Ocr(String),
    #[error("dictionary unavailable: {0}")]
    Dictionary(String),
    #[error("report error: {0}")]
    Report(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Failure while running OCR over one image
#[derive(Debug, Error)]
pub enum RecognizeError {
    /// The pixels could not be handed to the engine; only this image is affected
    #[error("image could not be prepared for OCR: {0}")]
    Image(String),
    /// The engine itself is unusable
    #[error(transparent)]
    Engine(#[from] ValidatorError),
}

/// Why processing of a single page stopped early
#[derive(Debug, Error)]
pub enum PageError {
    /// The page itself could not be fetched; the run moves on to the next seed
    #[error("page abandoned: {0}")]
    Abandoned(#[from] FetchError),
    /// Unrecoverable; no further seeds are attempted
    #[error(transparent)]
    Fatal(#[from] ValidatorError),
}
