use crate::error::ValidatorError;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a validation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// User-Agent sent with every page and image request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Limit for fetching a single image, body included
    #[serde(default = "default_image_timeout_secs")]
    pub image_timeout_secs: u64,

    /// Keep every occurrence of an image instead of the first one per page
    #[serde(default)]
    pub allow_duplicates: bool,

    /// CSS selectors whose subtrees are ignored
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Lowest severity shown in generated reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_severity: Option<Severity>,

    /// Newline-delimited word list used to keep only real OCR words
    #[serde(default = "default_dictionary_path")]
    pub dictionary_path: PathBuf,

    /// OCR command line tool
    #[serde(default = "default_tesseract_bin")]
    pub tesseract_bin: String,

    /// OCR language code
    #[serde(default = "default_ocr_language")]
    pub ocr_language: String,

    /// Fetch pages through this WebDriver instead of plain HTTP
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webdriver_url: Option<String>,

    /// Where the JSON report is written and re-read
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,

    /// Directory for generated per-page reports
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,
}

/// Default value for user_agent
fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; ImgOcrValidatorBot/1.0)".to_string()
}

fn default_image_timeout_secs() -> u64 {
    30
}

fn default_dictionary_path() -> PathBuf {
    PathBuf::from("/usr/share/dict/words")
}

fn default_tesseract_bin() -> String {
    "tesseract".to_string()
}

fn default_ocr_language() -> String {
    "eng".to_string()
}

fn default_report_path() -> PathBuf {
    PathBuf::from("report.json")
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            image_timeout_secs: default_image_timeout_secs(),
            allow_duplicates: false,
            exclude: Vec::new(),
            min_severity: None,
            dictionary_path: default_dictionary_path(),
            tesseract_bin: default_tesseract_bin(),
            ocr_language: default_ocr_language(),
            webdriver_url: None,
            report_path: default_report_path(),
            reports_dir: default_reports_dir(),
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ValidatorError> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| {
            ValidatorError::Config(format!("cannot open {}: {}", path.display(), e))
        })?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ValidatorError> {
        serde_json::from_str(json).map_err(|e| ValidatorError::Config(e.to_string()))
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }
}
