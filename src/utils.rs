use regex::Regex;
use std::sync::LazyLock;

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\-_. ]").expect("filename pattern is valid"));

/// Convert a page URL into a report file stem
pub fn report_name(url: &str) -> String {
    let name = url
        .replace("https://", "")
        .replace("http://", "")
        .replace(['/', '+'], "_");
    let mut name = UNSAFE_FILENAME_CHARS.replace_all(&name, "").into_owned();

    if name.ends_with('_') {
        name.pop();
    }
    name
}

/// Seconds as whole milliseconds, for log lines
pub fn as_millis(seconds: f64) -> u64 {
    (seconds * 1000.0).round() as u64
}
