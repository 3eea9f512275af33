use crate::error::RecognizeError;
use crate::ocr::{Dictionary, TextRecognizer};
use crate::results::Issue;
use image::DynamicImage;

/// Outcome of comparing OCR text with an image's alt text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AltTextMatch {
    /// Dictionary-valid words in OCR order, space separated
    pub analyzed_text: String,
    /// One INFO issue per word missing from the alt text, duplicates included
    pub issues: Vec<Issue>,
}

/// Run OCR over decoded pixels and match the result against `alt`
pub async fn analyze(
    recognizer: &dyn TextRecognizer,
    dictionary: &dyn Dictionary,
    image: &DynamicImage,
    alt: Option<&str>,
) -> Result<AltTextMatch, RecognizeError> {
    let text = recognizer.recognize(image).await?;
    Ok(match_alt_text(&text, alt, dictionary))
}

/// Filter OCR text to real words and report the ones the alt text does not mention.
///
/// A word counts as mentioned when it is a case-insensitive substring of some
/// alt token, or some alt token starts with it. This is deliberately loose.
/// Alt tokens are split on whitespace only; punctuation stays attached.
pub fn match_alt_text(
    ocr_text: &str,
    alt: Option<&str>,
    dictionary: &dyn Dictionary,
) -> AltTextMatch {
    let alt_tokens: Vec<String> = alt
        .map(|a| a.split_whitespace().map(str::to_lowercase).collect())
        .unwrap_or_default();

    let mut words = Vec::new();
    let mut issues = Vec::new();

    for token in ocr_text.split_whitespace() {
        if !dictionary.check(token) {
            continue;
        }
        words.push(token);

        let lowered = token.to_lowercase();
        let represented = alt_tokens
            .iter()
            .any(|alt_token| alt_token.contains(&lowered) || alt_token.starts_with(&lowered));

        if !represented {
            issues.push(Issue::info(format!(
                "Word '{}' does not exist in the alt attribute.",
                lowered
            )));
        }
    }

    AltTextMatch {
        analyzed_text: words.join(" "),
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::WordList;
    use crate::severity::Severity;

    fn dict() -> WordList {
        WordList::from_words(["hello", "world", "sale", "today", "a"])
    }

    #[test]
    fn test_partial_representation() {
        let result = match_alt_text("Hello World", Some("A picture of a hello"), &dict());
        assert_eq!(result.analyzed_text, "Hello World");
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].severity, Severity::Info);
        assert_eq!(
            result.issues[0].text,
            "Word 'world' does not exist in the alt attribute."
        );
    }

    #[test]
    fn test_absent_alt_reports_every_word() {
        let result = match_alt_text("Hello World", None, &dict());
        assert_eq!(result.issues.len(), 2);
    }

    #[test]
    fn test_empty_alt_reports_every_word() {
        let result = match_alt_text("Sale today", Some("   "), &dict());
        assert_eq!(result.issues.len(), 2);
        assert_eq!(result.analyzed_text, "Sale today");
    }

    #[test]
    fn test_non_words_discarded() {
        let result = match_alt_text("x7#q Hello !! wrld", Some("hello"), &dict());
        assert_eq!(result.analyzed_text, "Hello");
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_duplicates_not_deduplicated() {
        let result = match_alt_text("sale SALE sale", Some("banner"), &dict());
        assert_eq!(result.analyzed_text, "sale SALE sale");
        assert_eq!(result.issues.len(), 3);
    }

    #[test]
    fn test_substring_counts_as_represented() {
        // "sale" sits inside "wholesale"
        let result = match_alt_text("sale", Some("Wholesale prices"), &dict());
        assert!(result.issues.is_empty());
    }

    struct CannedOcr(&'static str);

    #[async_trait::async_trait]
    impl TextRecognizer for CannedOcr {
        async fn recognize(&self, _image: &DynamicImage) -> Result<String, RecognizeError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_analyze_runs_recognizer() {
        let result = analyze(
            &CannedOcr("Hello\nWorld\n"),
            &dict(),
            &DynamicImage::new_rgb8(1, 1),
            Some("hello world"),
        )
        .await
        .unwrap();
        assert_eq!(result.analyzed_text, "Hello World");
        assert!(result.issues.is_empty());
    }
}
