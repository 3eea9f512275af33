use crate::error::ValidatorError;
use scraper::{ElementRef, Selector};

/// Split a `--exclude` value into individual selectors.
///
/// The whole value may be wrapped in single or double quotes. Entries are
/// comma separated, trimmed, and empty entries are dropped.
pub fn split_selector_list(raw: &str) -> Vec<String> {
    let mut value = raw.trim();
    for quote in ['\'', '"'] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            value = &value[1..value.len() - 1];
        }
    }

    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// CSS-selector based exclusion of parts of a document.
///
/// Anything matched by one of the selectors is treated as removed from the
/// page, together with its whole subtree.
#[derive(Debug, Default)]
pub struct ExclusionFilter {
    selectors: Vec<(String, Selector)>,
}

impl ExclusionFilter {
    /// Compile the given selectors; an unparsable selector is an input error
    pub fn new(patterns: &[String]) -> Result<Self, ValidatorError> {
        let mut selectors = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let selector = Selector::parse(pattern).map_err(|e| {
                ValidatorError::Config(format!("invalid exclusion selector '{}': {:?}", pattern, e))
            })?;
            selectors.push((pattern.clone(), selector));
        }
        Ok(Self { selectors })
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Selector strings in the order they were given
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.selectors.iter().map(|(pattern, _)| pattern.as_str())
    }

    /// True if the element or any of its ancestors matches an exclusion selector
    pub fn is_excluded(&self, element: &ElementRef) -> bool {
        if self.selectors.is_empty() {
            return false;
        }

        std::iter::once(*element)
            .chain(element.ancestors().filter_map(ElementRef::wrap))
            .any(|el| self.selectors.iter().any(|(_, sel)| sel.matches(&el)))
    }
}
