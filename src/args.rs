use clap::Parser;
use img_ocr_validator::ValidatorConfig;
use img_ocr_validator::error::ValidatorError;
use img_ocr_validator::filter::split_selector_list;
use img_ocr_validator::severity::{ParseSeverityError, Severity};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "img-ocr-validator")]
#[command(about = "Checks that text inside web page images is present in their alt attributes")]
#[command(version)]
pub struct Args {
    /// URLs to analyze
    #[arg(value_name = "URL")]
    pub urls: Vec<String>,

    /// Generate per-page reports
    #[arg(short, long)]
    pub generate_report: bool,

    /// Generate reports from an existing report.json without fetching anything
    #[arg(short, long)]
    pub parse_only: bool,

    /// Only include <SEVERITY> or greater in the reports (NONE, INFO, WARN, ERROR)
    #[arg(short, long)]
    pub severity: Option<String>,

    /// Exclude the given CSS selectors, separated by commas
    #[arg(long)]
    pub exclude: Option<String>,

    /// Keep duplicate resource ids (may cause unexpected results!)
    #[arg(long)]
    pub allow_duplicates: bool,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Fetch pages through this WebDriver server (e.g. http://localhost:4444)
    #[arg(long)]
    pub webdriver: Option<String>,

    /// Word list used to recognise real words in OCR output
    #[arg(long)]
    pub dictionary: Option<PathBuf>,

    /// Path of the JSON report
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Directory for generated reports
    #[arg(long)]
    pub reports_dir: Option<PathBuf>,
}

impl Args {
    /// Parsed `--severity`, if given
    pub fn min_severity(&self) -> Result<Option<Severity>, ParseSeverityError> {
        self.severity.as_deref().map(str::parse).transpose()
    }

    /// Selectors from `--exclude`
    pub fn exclusions(&self) -> Vec<String> {
        self.exclude
            .as_deref()
            .map(split_selector_list)
            .unwrap_or_default()
    }

    /// Configuration file (or defaults) with path overrides from the command line applied
    pub fn base_config(&self) -> Result<ValidatorConfig, ValidatorError> {
        let mut config = match &self.config {
            Some(path) => ValidatorConfig::from_file(path)?,
            None => ValidatorConfig::default(),
        };

        if let Some(path) = &self.dictionary {
            config.dictionary_path = path.clone();
        }
        if let Some(path) = &self.report {
            config.report_path = path.clone();
        }
        if let Some(dir) = &self.reports_dir {
            config.reports_dir = dir.clone();
        }
        Ok(config)
    }
}
