use crate::results::Issue;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Query parameters that carry a requested `<width>x<height>`
pub const SIZE_PARAMS: [&str; 4] = ["size", "dimensions", "dimension", "dim"];

static SIZE_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)x(\d+)$").expect("size pattern is valid")
});

/// Size requested through the URL's query string, if any.
///
/// Only the first parameter that is both a size name and a `<int>x<int>` value
/// is considered.
pub fn requested_size(url: &str) -> Option<(u64, u64)> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .filter(|(name, _)| SIZE_PARAMS.contains(&&**name))
        .find_map(|(_, value)| {
            let caps = SIZE_VALUE.captures(&value)?;
            Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
        })
}

/// Compare decoded dimensions with the size requested in the URL
pub fn reconcile(url: &str, width: u32, height: u32) -> Vec<Issue> {
    match requested_size(url) {
        Some((want_w, want_h)) if want_w != u64::from(width) || want_h != u64::from(height) => {
            ::log::info!(
                "Size mismatch for {}: expected {}x{}, got {}x{}",
                url,
                want_w,
                want_h,
                width,
                height
            );
            vec![Issue::warn(format!(
                "Image with query parameters does not match size requested. Expected {}x{} but instead got {}x{}.",
                want_w, want_h, width, height
            ))]
        }
        _ => Vec::new(),
    }
}
