use crate::hash::resource_id;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single finding attached to an image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub text: String,
}

impl Issue {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(Severity::Info, text)
    }

    pub fn warn(text: impl Into<String>) -> Self {
        Self::new(Severity::Warn, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Severity::Error, text)
    }
}

/// One distinct image encountered on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageResource {
    /// Hash of the resolved source URL
    pub resource_id: String,

    /// Resolved absolute URL (the raw `src` for skipped data URIs)
    pub url: String,

    /// `None` when the attribute is missing, `Some("")` when present but empty
    pub alt: Option<String>,

    /// Location of the `<img>` below `<body>`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub css_path: String,

    /// Set for embedded data URIs, which are recorded but never fetched
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Present once the content type has been classified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rasterized: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    /// Seconds spent waiting for the image response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_time: Option<f64>,

    /// Dictionary-valid OCR words, space separated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzed_text: Option<String>,

    #[serde(default)]
    pub issues: Vec<Issue>,
}

impl ImageResource {
    pub fn new(resource_id: String, url: String, alt: Option<String>, css_path: String) -> Self {
        Self {
            resource_id,
            url,
            alt,
            css_path,
            skipped: false,
            content_type: None,
            rasterized: None,
            width: None,
            height: None,
            download_time: None,
            analyzed_text: None,
            issues: Vec::new(),
        }
    }

    /// Append an issue; issues are never removed from stored results
    pub fn push_issue(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn extend_issues(&mut self, issues: impl IntoIterator<Item = Issue>) {
        self.issues.extend(issues);
    }

    /// Issues at or above `min`, in recorded order
    pub fn issues_at_least(&self, min: Severity) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.severity >= min)
    }
}

/// Timings and counts for one page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_time: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_time: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_images: Option<usize>,
}

/// Everything recorded for one seed URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub url: String,

    #[serde(default)]
    pub metrics: PageMetrics,

    /// Document order; at most one entry per `resource_id` unless duplicates are allowed
    #[serde(default)]
    pub resources: Vec<ImageResource>,
}

impl PageResult {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            metrics: PageMetrics::default(),
            resources: Vec::new(),
        }
    }

    /// Report key for this page
    pub fn page_id(&self) -> String {
        resource_id(&self.url)
    }

    pub fn contains_resource(&self, resource_id: &str) -> bool {
        self.resources.iter().any(|r| r.resource_id == resource_id)
    }

    /// Copy of this page with every resource's issues below `min` hidden
    pub fn at_least(&self, min: Severity) -> PageResult {
        let mut view = self.clone();
        for resource in &mut view.resources {
            resource.issues.retain(|i| i.severity >= min);
        }
        view
    }

    /// Number of issues per severity across all resources
    pub fn issue_counts(&self) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for issue in self.resources.iter().flat_map(|r| r.issues.iter()) {
            *counts.entry(issue.severity).or_insert(0) += 1;
        }
        counts
    }
}

/// Results of a run, keyed by page id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report {
    pages: BTreeMap<String, PageResult>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a finished page into the report, replacing any earlier run of the same URL
    pub fn record(&mut self, page: PageResult) {
        self.pages.insert(page.page_id(), page);
    }

    pub fn get(&self, page_id: &str) -> Option<&PageResult> {
        self.pages.get(page_id)
    }

    pub fn pages(&self) -> impl Iterator<Item = (&String, &PageResult)> {
        self.pages.iter()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Read-time severity view; the stored report is left untouched
    pub fn filtered(&self, min: Option<Severity>) -> Report {
        match min {
            None => self.clone(),
            Some(min) => Report {
                pages: self
                    .pages
                    .iter()
                    .map(|(id, page)| (id.clone(), page.at_least(min)))
                    .collect(),
            },
        }
    }
}

impl FromIterator<PageResult> for Report {
    fn from_iter<I: IntoIterator<Item = PageResult>>(iter: I) -> Self {
        let mut report = Report::new();
        for page in iter {
            report.record(page);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_page() -> PageResult {
        let mut page = PageResult::new("https://example.com/");
        page.metrics.download_time = Some(0.25);
        page.metrics.parse_time = Some(0.01);
        page.metrics.total_images = Some(2);

        let mut first = ImageResource::new(
            resource_id("https://example.com/a.png"),
            "https://example.com/a.png".to_string(),
            Some("A banner".to_string()),
            "div > img".to_string(),
        );
        first.content_type = Some("image/png".to_string());
        first.rasterized = Some(true);
        first.width = Some(100);
        first.height = Some(50);
        first.download_time = Some(0.1);
        first.analyzed_text = Some("Sale today".to_string());
        first.push_issue(Issue::info("Word 'sale' does not exist in the alt attribute."));
        first.push_issue(Issue::warn("Alt attribute is empty."));

        let mut second = ImageResource::new(
            resource_id("data:image/png;base64,AAAA"),
            "data:image/png;base64,AAAA".to_string(),
            None,
            "img:nth-child(2)".to_string(),
        );
        second.skipped = true;

        page.resources.push(first);
        page.resources.push(second);
        page
    }

    #[test]
    fn test_report_keyed_by_page_hash() {
        let report: Report = vec![sample_page()].into_iter().collect();
        assert_eq!(report.len(), 1);
        let id = resource_id("https://example.com/");
        assert_eq!(report.get(&id).unwrap().url, "https://example.com/");
    }

    #[test]
    fn test_filtered_view_leaves_report_untouched() {
        let report: Report = vec![sample_page()].into_iter().collect();
        let view = report.filtered(Some(Severity::Warn));
        let id = resource_id("https://example.com/");

        let filtered = &view.get(&id).unwrap().resources[0].issues;
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].severity, Severity::Warn);

        assert_eq!(report.get(&id).unwrap().resources[0].issues.len(), 2);
        assert_eq!(report.filtered(None), report);
    }

    #[test]
    fn test_json_round_trip() {
        let report: Report = vec![sample_page()].into_iter().collect();
        let json = serde_json::to_string_pretty(&report).unwrap();
        let reloaded: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded, report);

        let page = reloaded.get(&resource_id("https://example.com/")).unwrap();
        assert_eq!(page.resources[0].url, "https://example.com/a.png");
        assert!(page.resources[1].skipped);
        assert_eq!(page.resources[1].alt, None);
    }

    #[test]
    fn test_missing_and_empty_alt_serialize_differently() {
        let missing = ImageResource::new("id".into(), "u".into(), None, String::new());
        let empty = ImageResource::new("id".into(), "u".into(), Some(String::new()), String::new());
        let missing_json = serde_json::to_value(&missing).unwrap();
        let empty_json = serde_json::to_value(&empty).unwrap();
        assert!(missing_json["alt"].is_null());
        assert_eq!(empty_json["alt"], "");
    }

    #[test]
    fn test_issue_counts() {
        let counts = sample_page().issue_counts();
        assert_eq!(counts.get(&Severity::Info), Some(&1));
        assert_eq!(counts.get(&Severity::Warn), Some(&1));
        assert_eq!(counts.get(&Severity::Error), None);
    }
}
