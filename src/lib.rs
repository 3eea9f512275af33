pub mod classify;
pub mod config;
pub mod dimensions;
pub mod error;
pub mod filter;
pub mod hash;
pub mod ocr;
pub mod parsers;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod results;
pub mod severity;
pub mod sources;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::ValidatorConfig;
pub use error::{FetchError, PageError, RecognizeError, ValidatorError};
pub use pipeline::{Pipeline, RunOutcome};
pub use results::{ImageResource, Issue, PageMetrics, PageResult, Report};
pub use severity::Severity;

use filter::ExclusionFilter;
use ocr::{Dictionary, TesseractCli, TextRecognizer, WordList};
use sources::{HttpClient, ImageTransport, PageSource, WebDriverSource};
use std::path::Path;

/// Check every seed up front; one malformed URL rejects the whole invocation
pub fn validate_seeds(seeds: &[String]) -> Result<(), ValidatorError> {
    if seeds.is_empty() {
        return Err(ValidatorError::NoSeeds);
    }
    match seeds.iter().find(|url| !resolver::is_valid_url(url)) {
        Some(bad) => Err(ValidatorError::InvalidSeed(bad.clone())),
        None => Ok(()),
    }
}

/// Builder for a validation [`Pipeline`].
///
/// Any collaborator that is not supplied is created from the configuration
/// when [`Validator::build`] is called.
pub struct Validator {
    config: ValidatorConfig,
    page_source: Option<Box<dyn PageSource>>,
    transport: Option<Box<dyn ImageTransport>>,
    recognizer: Option<Box<dyn TextRecognizer>>,
    dictionary: Option<Box<dyn Dictionary>>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

impl Validator {
    /// Create a new builder from a configuration
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            config,
            page_source: None,
            transport: None,
            recognizer: None,
            dictionary: None,
        }
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(self, path: impl AsRef<Path>) -> Result<Self, ValidatorError> {
        let config = ValidatorConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Keep repeated images instead of the first occurrence per page
    pub fn with_allow_duplicates(mut self, allow: bool) -> Self {
        self.config.allow_duplicates = allow;
        self
    }

    /// Add CSS selectors whose subtrees are ignored
    pub fn with_exclusions(mut self, selectors: impl IntoIterator<Item = String>) -> Self {
        self.config.exclude.extend(selectors);
        self
    }

    pub fn with_min_severity(mut self, severity: Option<Severity>) -> Self {
        if severity.is_some() {
            self.config.min_severity = severity;
        }
        self
    }

    /// Fetch pages through a WebDriver server
    pub fn with_webdriver(mut self, webdriver_url: impl Into<String>) -> Self {
        self.config.webdriver_url = Some(webdriver_url.into());
        self
    }

    pub fn with_page_source(mut self, source: impl PageSource + 'static) -> Self {
        self.page_source = Some(Box::new(source));
        self
    }

    pub fn with_transport(mut self, transport: impl ImageTransport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn with_recognizer(mut self, recognizer: impl TextRecognizer + 'static) -> Self {
        self.recognizer = Some(Box::new(recognizer));
        self
    }

    pub fn with_dictionary(mut self, dictionary: impl Dictionary + 'static) -> Self {
        self.dictionary = Some(Box::new(dictionary));
        self
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Assemble the pipeline, creating default collaborators where needed
    pub fn build(self) -> Result<Pipeline, ValidatorError> {
        let config = self.config;
        let exclusions = ExclusionFilter::new(&config.exclude)?;

        let pages: Box<dyn PageSource> = match self.page_source {
            Some(source) => source,
            None => match &config.webdriver_url {
                Some(webdriver_url) => Box::new(WebDriverSource::new(webdriver_url.clone())),
                None => Box::new(HttpClient::new(&config.user_agent)?),
            },
        };

        let transport: Box<dyn ImageTransport> = match self.transport {
            Some(transport) => transport,
            None => Box::new(HttpClient::new(&config.user_agent)?),
        };

        let recognizer: Box<dyn TextRecognizer> = match self.recognizer {
            Some(recognizer) => recognizer,
            None => Box::new(TesseractCli::new(
                config.tesseract_bin.clone(),
                config.ocr_language.clone(),
            )),
        };

        let dictionary: Box<dyn Dictionary> = match self.dictionary {
            Some(dictionary) => dictionary,
            None => Box::new(WordList::from_file(&config.dictionary_path)?),
        };

        Ok(Pipeline {
            allow_duplicates: config.allow_duplicates,
            image_timeout: config.image_timeout(),
            exclusions,
            pages,
            transport,
            recognizer,
            dictionary,
        })
    }
}
