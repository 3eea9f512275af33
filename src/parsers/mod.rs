pub mod html;


/// An `<img>` element as found in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTag {
    /// Raw `src` attribute, untouched
    pub src: Option<String>,
    /// Raw `alt` attribute; `None` when the attribute is missing
    pub alt: Option<String>,
    /// `tag:nth-child(n)` chain from below `<body>` down to the image
    pub css_path: String,
}

/// Result of parsing a page for images
#[derive(Debug, Default)]
pub struct ParseResult {
    /// Images that survived exclusion, in document order
    pub images: Vec<ImageTag>,
}

impl ParseResult {
    pub fn new(images: Vec<ImageTag>) -> Self {
        Self { images }
    }

    /// Number of `<img>` tags counted for the page metrics
    pub fn total_images(&self) -> usize {
        self.images.len()
    }
}
