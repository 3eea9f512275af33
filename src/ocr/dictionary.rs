use crate::error::ValidatorError;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Real-word membership for a fixed locale
pub trait Dictionary: Send + Sync {
    /// Case-insensitive check that `word` is a real word
    fn check(&self, word: &str) -> bool;
}

/// Dictionary backed by a newline-delimited word list such as `/usr/share/dict/words`
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: HashSet<String>,
}

impl WordList {
    /// Load a word list, one word per line; blank lines are ignored
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ValidatorError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            ValidatorError::Dictionary(format!("cannot read {}: {}", path.display(), e))
        })?;

        let list = Self::from_words(contents.lines());
        ::log::debug!("Loaded {} dictionary words from {}", list.len(), path.display());
        Ok(list)
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Dictionary for WordList {
    fn check(&self, word: &str) -> bool {
        !word.is_empty() && self.words.contains(&word.to_lowercase())
    }
}
