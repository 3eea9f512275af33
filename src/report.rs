use crate::error::ValidatorError;
use crate::results::Report;
use crate::severity::Severity;
use crate::utils::report_name;
use std::fs;
use std::path::{Path, PathBuf};

/// Persist the full, unfiltered report as JSON
pub fn save_report<P: AsRef<Path>>(report: &Report, path: P) -> Result<(), ValidatorError> {
    let path = path.as_ref();
    ::log::info!("Saving json report to {} ...", path.display());

    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)
        .map_err(|e| ValidatorError::Report(format!("cannot write {}: {}", path.display(), e)))
}

/// Re-read a report written by [`save_report`]
pub fn load_report<P: AsRef<Path>>(path: P) -> Result<Report, ValidatorError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .map_err(|e| ValidatorError::Report(format!("cannot read {}: {}", path.display(), e)))?;
    Ok(serde_json::from_str(&contents)?)
}

/// Write one JSON view per page into `dir`, hiding issues below `min_severity`.
///
/// Returns the written paths in report order.
pub fn generate_reports<P: AsRef<Path>>(
    report: &Report,
    dir: P,
    min_severity: Option<Severity>,
) -> Result<Vec<PathBuf>, ValidatorError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let view = report.filtered(min_severity);
    let mut written = Vec::with_capacity(view.len());

    for (page_id, page) in view.pages() {
        let path = dir.join(format!("{}.json", report_name(&page.url)));
        let body = serde_json::json!({
            "url": page.url,
            "url_resource_id": page_id,
            "min_severity": min_severity,
            "page": page,
        });
        fs::write(&path, serde_json::to_string_pretty(&body)?)?;

        let counts = page.issue_counts();
        ::log::info!(
            "[{}] {} images, {} errors, {} warnings, {} info -> {}",
            page.url,
            page.resources.len(),
            counts.get(&Severity::Error).copied().unwrap_or(0),
            counts.get(&Severity::Warn).copied().unwrap_or(0),
            counts.get(&Severity::Info).copied().unwrap_or(0),
            path.display()
        );
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::resource_id;
    use crate::results::{ImageResource, Issue, PageResult};

    fn report() -> Report {
        let mut page = PageResult::new("https://example.com/news/");
        page.metrics.download_time = Some(0.123_456_789);
        page.metrics.parse_time = Some(0.000_731);
        page.metrics.total_images = Some(1);

        let url = "https://example.com/a.png";
        let mut image = ImageResource::new(resource_id(url), url.to_string(), None, "img".into());
        image.rasterized = Some(true);
        image.content_type = Some("image/png".to_string());
        image.push_issue(Issue::warn("Alt attribute is empty."));
        image.push_issue(Issue::info("Word 'news' does not exist in the alt attribute."));
        image.push_issue(Issue::info("Word 'news' does not exist in the alt attribute."));
        page.resources.push(image);

        vec![page, PageResult::new("https://example.org/")].into_iter().collect()
    }

    #[test]
    fn test_save_and_reload_is_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let original = report();

        save_report(&original, &path).unwrap();
        let reloaded = load_report(&path).unwrap();
        assert_eq!(reloaded, original);
    }

    #[test]
    fn test_load_missing_report() {
        let result = load_report("/nonexistent/report.json");
        assert!(matches!(result, Err(ValidatorError::Report(_))));
    }

    #[test]
    fn test_generate_filtered_reports() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reports");
        let original = report();

        let written = generate_reports(&original, &out, Some(Severity::Warn)).unwrap();
        assert_eq!(written.len(), 2);
        assert!(out.join("example.com_news.json").exists());
        assert!(out.join("example.org.json").exists());

        let json = fs::read_to_string(out.join("example.com_news.json")).unwrap();
        let body: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(body["min_severity"], "warn");
        assert_eq!(body["page"]["resources"][0]["issues"].as_array().unwrap().len(), 1);

        // stored data is untouched by the view
        let stored = original.get(&resource_id("https://example.com/news/")).unwrap();
        assert_eq!(stored.resources[0].issues.len(), 3);
    }
}
