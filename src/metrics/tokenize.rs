//! ROUGE tokenization
//!
//! Text is lowercased, every run of characters outside `[a-z0-9]` becomes a
//! single separator, and the remaining words are optionally stemmed. Words of
//! three characters or fewer are never stemmed.

use crate::metrics::stemmer;

/// Words at or below this length skip the stemmer.
const MIN_STEM_LEN: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct Tokenizer {
    use_stemmer: bool,
}

impl Tokenizer {
    pub fn new(use_stemmer: bool) -> Self {
        Self { use_stemmer }
    }

    pub fn use_stemmer(&self) -> bool {
        self.use_stemmer
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized: String = text
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_lowercase() || c.is_ascii_digit() {
                    c
                } else {
                    ' '
                }
            })
            .collect();

        normalized
            .split_whitespace()
            .map(|word| {
                if self.use_stemmer && word.len() > MIN_STEM_LEN {
                    stemmer::stem(word)
                } else {
                    word.to_string()
                }
            })
            .collect()
    }

    /// Tokenize each non-empty line separately, for summary-level LCS.
    pub fn tokenize_sentences(&self, text: &str) -> Vec<Vec<String>> {
        text.split('\n')
            .filter(|line| !line.is_empty())
            .map(|line| self.tokenize(line))
            .collect()
    }
}
