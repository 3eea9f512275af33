use crate::results::Issue;
use url::Url;

/// Outcome of resolving an `<img src>` against its page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSrc {
    /// Embedded data URI; recorded but never fetched
    DataUri,
    /// Absolute URL plus any issues found while normalizing it
    Url { url: String, issues: Vec<Issue> },
}

/// Resolve a raw `src` attribute against the page URL.
///
/// Protocol-relative sources take the page's scheme; path-relative sources are
/// joined to the page's scheme and host only, never to its path. A trailing
/// space (literal or `%20`) is reported and trimmed, and a result without
/// scheme or host is reported as an error without preventing a fetch attempt.
pub fn resolve(base_url: &str, raw_src: &str) -> ResolvedSrc {
    if is_data_uri(raw_src) {
        return ResolvedSrc::DataUri;
    }

    let mut issues = Vec::new();
    let mut url = absolutize(base_url, raw_src);

    let trimmed = trim_trailing_spaces(&url);
    if trimmed.len() != url.len() {
        ::log::info!("Url ends with a space {}", url);
        issues.push(Issue::warn("This image URL ends with a trailing space."));
        url = trimmed.to_string();
    }

    if !is_valid_url(&url) {
        ::log::info!("Invalid URL for {}", url);
        issues.push(Issue::error("Invalid URL provided in src attribute."));
    }

    ResolvedSrc::Url { url, issues }
}

/// True for `data:` URIs (scheme matching is case-insensitive)
pub fn is_data_uri(src: &str) -> bool {
    src.get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("data:"))
}

/// A URL is well formed when it parses and exposes both a scheme and a host
pub fn is_valid_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => {
            !parsed.scheme().is_empty() && parsed.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

fn absolutize(base_url: &str, src: &str) -> String {
    if src.starts_with("http://") || src.starts_with("https://") {
        return src.to_string();
    }

    let base = match Url::parse(base_url) {
        Ok(base) => base,
        Err(e) => {
            ::log::debug!("Cannot resolve {} against {}: {}", src, base_url, e);
            return src.to_string();
        }
    };

    if src.starts_with("//") {
        return format!("{}:{}", base.scheme(), src);
    }

    let authority = match (base.host_str(), base.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    };
    let separator = if src.starts_with('/') { "" } else { "/" };

    format!("{}://{}{}{}", base.scheme(), authority, separator, src)
}

fn trim_trailing_spaces(url: &str) -> &str {
    let mut trimmed = url;
    loop {
        let next = trimmed.trim_end();
        let next = next.strip_suffix("%20").unwrap_or(next);
        if next.len() == trimmed.len() {
            return trimmed;
        }
        trimmed = next;
    }
}
