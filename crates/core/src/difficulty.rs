//! Lexical readability heuristic for caption segments.

use crate::types::Difficulty;

/// Tokens longer than this count as complex words
pub const COMPLEX_WORD_LEN: usize = 8;

pub const ADVANCED_COMPLEXITY_RATIO: f64 = 0.25;
pub const ADVANCED_AVG_WORD_LEN: f64 = 6.0;
pub const INTERMEDIATE_COMPLEXITY_RATIO: f64 = 0.1;
pub const INTERMEDIATE_AVG_WORD_LEN: f64 = 4.5;

/// Discourse markers that push a segment straight to advanced.
/// Matched against whole tokens, punctuation included.
pub const ACADEMIC_WORDS: [&str; 10] = [
    "however",
    "therefore",
    "furthermore",
    "consequently",
    "nevertheless",
    "specifically",
    "particularly",
    "essentially",
    "significantly",
    "approximately",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStats {
    pub word_count: usize,
    pub avg_word_length: f64,
    pub complexity_ratio: f64,
    pub has_academic_word: bool,
}

impl TextStats {
    pub fn from_text(text: &str) -> Self {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered.split_whitespace().collect();

        if words.is_empty() {
            return Self {
                word_count: 0,
                avg_word_length: 0.0,
                complexity_ratio: 0.0,
                has_academic_word: false,
            };
        }

        let lengths: Vec<usize> = words.iter().map(|w| w.chars().count()).collect();
        let total: usize = lengths.iter().sum();
        let complex = lengths.iter().filter(|&&len| len > COMPLEX_WORD_LEN).count();
        let count = words.len() as f64;

        Self {
            word_count: words.len(),
            avg_word_length: total as f64 / count,
            complexity_ratio: complex as f64 / count,
            has_academic_word: words.iter().any(|w| ACADEMIC_WORDS.contains(w)),
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        if self.complexity_ratio > ADVANCED_COMPLEXITY_RATIO
            || self.avg_word_length > ADVANCED_AVG_WORD_LEN
            || self.has_academic_word
        {
            Difficulty::Advanced
        } else if self.complexity_ratio > INTERMEDIATE_COMPLEXITY_RATIO
            || self.avg_word_length > INTERMEDIATE_AVG_WORD_LEN
        {
            Difficulty::Intermediate
        } else {
            Difficulty::Beginner
        }
    }
}

/// Classify one segment of caption text
pub fn classify(text: &str) -> Difficulty {
    if text.is_empty() {
        return Difficulty::Beginner;
    }
    TextStats::from_text(text).difficulty()
}
