use crate::error::FetchError;
use crate::results::Issue;
use crate::sources::ImageTransport;
use image::DynamicImage;
use std::time::{Duration, Instant};

/// Pixel formats that get decoded and OCR'd
pub const RASTER_CONTENT_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/gif", "image/tiff"];

/// Vector formats that are acceptable but never decoded
pub const VECTOR_CONTENT_TYPES: [&str; 2] = ["image/svg", "image/svg+xml"];

/// How a normalized content type is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentClass {
    Raster,
    Vector,
    Invalid,
}

/// Lower-cases a content type and strips any parameters after `;`
pub fn normalize_content_type(raw: &str) -> String {
    raw.split(';').next().unwrap_or_default().trim().to_lowercase()
}

pub fn classify_content_type(content_type: &str) -> ContentClass {
    if RASTER_CONTENT_TYPES.contains(&content_type) {
        ContentClass::Raster
    } else if VECTOR_CONTENT_TYPES.contains(&content_type) {
        ContentClass::Vector
    } else {
        ContentClass::Invalid
    }
}

/// What was learned about an image from its response
#[derive(Debug, Default)]
pub struct Classified {
    pub content_type: Option<String>,
    /// `None` when no content type was sent at all
    pub rasterized: Option<bool>,
    /// Whole body, only buffered for raster images with a declared length
    pub bytes: Option<Vec<u8>>,
    /// Seconds until the response headers arrived
    pub download_time: f64,
    pub issues: Vec<Issue>,
}

/// Fetch an image, classify its content type and buffer it when it can be decoded.
///
/// The whole exchange, body included, must finish within `timeout`.
pub async fn fetch_and_classify(
    transport: &dyn ImageTransport,
    url: &str,
    timeout: Duration,
) -> Result<Classified, FetchError> {
    match tokio::time::timeout(timeout, fetch_inner(transport, url)).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout(timeout)),
    }
}

async fn fetch_inner(transport: &dyn ImageTransport, url: &str) -> Result<Classified, FetchError> {
    let start = Instant::now();
    let mut response = transport.get(url).await?;
    let mut classified = Classified {
        download_time: start.elapsed().as_secs_f64(),
        ..Classified::default()
    };

    let Some(raw_type) = response.header("content-type") else {
        ::log::info!("Header 'content-type' is not set for {}", url);
        classified
            .issues
            .push(Issue::error("Header 'content-type' not set. Broken image?"));
        return Ok(classified);
    };

    let content_type = normalize_content_type(&raw_type);
    let class = classify_content_type(&content_type);
    ::log::debug!("Classified {} as {:?} ({})", url, class, content_type);

    if class == ContentClass::Invalid {
        ::log::info!("Invalid content-type {} for {}", content_type, url);
        classified.issues.push(Issue::warn(format!(
            "Invalid headers 'content-type': {}.",
            content_type
        )));
    }
    classified.rasterized = Some(class == ContentClass::Raster);
    classified.content_type = Some(content_type);

    let Some(length) = response.header("content-length") else {
        ::log::info!("Missing content-length for {}", url);
        classified
            .issues
            .push(Issue::warn("Null header 'content-length'."));
        return Ok(classified);
    };

    if class == ContentClass::Raster {
        let declared = length.trim().parse::<usize>().unwrap_or(0);
        let mut buffer = Vec::with_capacity(declared.min(1 << 26));
        while let Some(chunk) = response.chunk().await? {
            buffer.extend_from_slice(&chunk);
        }
        classified.bytes = Some(buffer);
    }

    Ok(classified)
}

/// Decode raw bytes into pixels; a failure means the image is corrupt
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, image::ImageError> {
    image::load_from_memory(bytes)
}

/// Issue recorded on an image whose fetch failed
pub fn fetch_issue(error: &FetchError) -> Issue {
    match error {
        FetchError::Status(code) => {
            Issue::error(format!("Bad HTTP response, status code: {}.", code))
        }
        FetchError::Timeout(limit) => Issue::error(format!(
            "Took longer than {} seconds to get the image.",
            limit.as_secs()
        )),
        FetchError::Transport(msg) | FetchError::WebDriver(msg) => {
            Issue::error(format!("Failed to fetch the image: {}.", msg))
        }
    }
}

/// Issue recorded on an image whose bytes could not be decoded
pub fn decode_issue(error: &image::ImageError) -> Issue {
    Issue::error(format!("Image could not be decoded: {}.", error))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::severity::Severity;
    use crate::sources::ImageResponse;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Canned image response for tests
    #[derive(Debug, Clone, Default)]
    pub struct FakeImage {
        pub status: u16,
        pub headers: Vec<(&'static str, String)>,
        pub body: Vec<u8>,
        pub delay: Option<Duration>,
    }

    impl FakeImage {
        pub fn ok(content_type: &str, body: Vec<u8>) -> Self {
            Self {
                status: 200,
                headers: vec![
                    ("content-type", content_type.to_string()),
                    ("content-length", body.len().to_string()),
                ],
                body,
                delay: None,
            }
        }

        pub fn without_header(mut self, name: &str) -> Self {
            self.headers.retain(|(n, _)| *n != name);
            self
        }
    }

    /// In-memory transport keyed by URL
    #[derive(Debug, Default)]
    pub struct FakeTransport {
        pub images: HashMap<String, FakeImage>,
        pub requests: std::sync::Mutex<Vec<String>>,
    }

    impl FakeTransport {
        pub fn with(mut self, url: &str, image: FakeImage) -> Self {
            self.images.insert(url.to_string(), image);
            self
        }

        pub fn requested(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    struct FakeResponse {
        headers: Vec<(&'static str, String)>,
        chunks: Vec<Vec<u8>>,
    }

    #[async_trait]
    impl ImageResponse for FakeResponse {
        fn header(&self, name: &str) -> Option<String> {
            self.headers.iter().find(|(n, _)| *n == name).map(|(_, v)| v.clone())
        }

        async fn chunk(&mut self) -> Result<Option<Vec<u8>>, FetchError> {
            if self.chunks.is_empty() {
                Ok(None)
            } else {
                Ok(Some(self.chunks.remove(0)))
            }
        }
    }

    #[async_trait]
    impl ImageTransport for FakeTransport {
        async fn get(&self, url: &str) -> Result<Box<dyn ImageResponse>, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            let image = self
                .images
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Transport(format!("connection refused: {}", url)))?;

            if let Some(delay) = image.delay {
                tokio::time::sleep(delay).await;
            }
            if image.status >= 400 {
                return Err(FetchError::Status(image.status));
            }

            Ok(Box::new(FakeResponse {
                headers: image.headers,
                chunks: image.body.chunks(1024).map(<[u8]>::to_vec).collect(),
            }))
        }
    }

    /// Black PNG of the given size
    pub fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::new_rgb8(width, height);
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    const TIMEOUT: Duration = Duration::from_secs(30);

    async fn classify_url(transport: &FakeTransport, url: &str) -> Result<Classified, FetchError> {
        fetch_and_classify(transport, url, TIMEOUT).await
    }

    #[test]
    fn test_normalize_content_type() {
        assert_eq!(normalize_content_type("Image/PNG; charset=binary"), "image/png");
        assert_eq!(normalize_content_type("image/svg+xml"), "image/svg+xml");
    }

    #[test]
    fn test_classify_content_type() {
        assert_eq!(classify_content_type("image/png"), ContentClass::Raster);
        assert_eq!(classify_content_type("image/tiff"), ContentClass::Raster);
        assert_eq!(classify_content_type("image/svg+xml"), ContentClass::Vector);
        assert_eq!(classify_content_type("text/html"), ContentClass::Invalid);
        assert_eq!(classify_content_type("image/webp"), ContentClass::Invalid);
    }

    #[tokio::test]
    async fn test_png_is_rasterized_and_buffered() {
        let body = png(4, 3);
        let transport = FakeTransport::default()
            .with("https://x/a.png", FakeImage::ok("image/png", body.clone()));
        let classified = classify_url(&transport, "https://x/a.png").await.unwrap();

        assert_eq!(classified.rasterized, Some(true));
        assert_eq!(classified.content_type.as_deref(), Some("image/png"));
        assert!(classified.issues.is_empty());
        assert_eq!(classified.bytes.as_deref(), Some(body.as_slice()));

        let img = decode(&body).unwrap();
        assert_eq!((img.width(), img.height()), (4, 3));
    }

    #[tokio::test]
    async fn test_html_is_invalid_content_type() {
        let transport = FakeTransport::default()
            .with("https://x/a", FakeImage::ok("text/html; charset=utf-8", b"<html>".to_vec()));
        let classified = classify_url(&transport, "https://x/a").await.unwrap();

        assert_eq!(classified.rasterized, Some(false));
        assert_eq!(classified.issues.len(), 1);
        assert_eq!(classified.issues[0].severity, Severity::Warn);
        assert_eq!(classified.issues[0].text, "Invalid headers 'content-type': text/html.");
        assert!(classified.bytes.is_none());
    }

    #[tokio::test]
    async fn test_svg_is_acceptable() {
        let transport = FakeTransport::default()
            .with("https://x/a.svg", FakeImage::ok("image/svg+xml", b"<svg/>".to_vec()));
        let classified = classify_url(&transport, "https://x/a.svg").await.unwrap();

        assert_eq!(classified.rasterized, Some(false));
        assert!(classified.issues.is_empty());
        assert!(classified.bytes.is_none());
    }

    #[tokio::test]
    async fn test_missing_content_type_is_error() {
        let image = FakeImage::ok("image/png", png(1, 1)).without_header("content-type");
        let transport = FakeTransport::default().with("https://x/a.png", image);
        let classified = classify_url(&transport, "https://x/a.png").await.unwrap();

        assert_eq!(classified.content_type, None);
        assert_eq!(classified.rasterized, None);
        assert_eq!(classified.issues.len(), 1);
        assert_eq!(classified.issues[0].severity, Severity::Error);
    }

    #[tokio::test]
    async fn test_missing_content_length_skips_body() {
        let image = FakeImage::ok("image/png", png(1, 1)).without_header("content-length");
        let transport = FakeTransport::default().with("https://x/a.png", image);
        let classified = classify_url(&transport, "https://x/a.png").await.unwrap();

        assert_eq!(classified.rasterized, Some(true));
        assert_eq!(classified.issues, vec![Issue::warn("Null header 'content-length'.")]);
        assert!(classified.bytes.is_none());
    }

    #[tokio::test]
    async fn test_error_status() {
        let image = FakeImage {
            status: 404,
            ..FakeImage::default()
        };
        let transport = FakeTransport::default().with("https://x/gone.png", image);
        let err = classify_url(&transport, "https://x/gone.png").await.unwrap_err();

        assert_eq!(err, FetchError::Status(404));
        assert_eq!(fetch_issue(&err).text, "Bad HTTP response, status code: 404.");
    }

    #[tokio::test]
    async fn test_timeout() {
        let mut image = FakeImage::ok("image/png", png(1, 1));
        image.delay = Some(Duration::from_secs(5));
        let transport = FakeTransport::default().with("https://x/slow.png", image);
        let limit = Duration::from_millis(20);
        let err = fetch_and_classify(&transport, "https://x/slow.png", limit)
            .await
            .unwrap_err();

        assert_eq!(err, FetchError::Timeout(limit));
        assert_eq!(fetch_issue(&err).severity, Severity::Error);
    }

    #[test]
    fn test_decode_failure() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert_eq!(decode_issue(&err).severity, Severity::Error);
    }
}
