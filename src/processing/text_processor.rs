//! Free-text cleaning and keyword extraction

use crate::error::{MatchScorerError, Result};
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use unicode_segmentation::UnicodeSegmentation;

pub struct TextProcessor {
    stop_words: HashSet<&'static str>,
    email_regex: Regex,
    url_regex: Regex,
    whitespace_regex: Regex,
}

impl TextProcessor {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| {
                MatchScorerError::Configuration(format!("invalid text pattern '{}': {}", pattern, e))
            })
        };

        Ok(Self {
            stop_words: STOP_WORDS.iter().copied().collect(),
            email_regex: compile(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")?,
            url_regex: compile(r"https?://[^\s]+")?,
            whitespace_regex: compile(r"\s+")?,
        })
    }

    /// Drop URLs and emails, normalize typographic punctuation and collapse whitespace.
    pub fn clean_text(&self, text: &str) -> String {
        let without_urls = self.url_regex.replace_all(text, " ");
        let without_emails = self.email_regex.replace_all(&without_urls, " ");
        let normalized: String = without_emails
            .chars()
            .map(|c| match c {
                '\u{2018}' | '\u{2019}' => '\'',
                '\u{201C}' | '\u{201D}' => '"',
                '\u{2013}' | '\u{2014}' => '-',
                _ => c,
            })
            .collect();
        self.whitespace_regex
            .replace_all(&normalized, " ")
            .trim()
            .to_string()
    }

    /// Lowercased word tokens with stop words, numbers and short words removed.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let cleaned = self.clean_text(text);
        cleaned
            .unicode_words()
            .map(|w| w.to_lowercase())
            .filter(|w| w.chars().count() > 2)
            .filter(|w| w.chars().any(|c| c.is_alphabetic()))
            .filter(|w| !self.stop_words.contains(w.as_str()))
            .collect()
    }

    /// Distinct keywords in sorted order.
    pub fn keyword_set(&self, text: &str) -> BTreeSet<String> {
        self.tokenize(text).into_iter().collect()
    }

    /// Jaccard overlap of two keyword sets; 0 when either side is empty.
    pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        let intersection = a.intersection(b).count();
        let union = a.union(b).count();
        intersection as f64 / union as f64
    }

    pub fn text_similarity(&self, text1: &str, text2: &str) -> f64 {
        Self::jaccard(&self.keyword_set(text1), &self.keyword_set(text2))
    }
}

/// Function words plus the boilerplate every job ad and resume shares.
const STOP_WORDS: &[&str] = &[
    "about", "above", "across", "after", "again", "all", "also", "among", "and", "any",
    "are", "around", "because", "been", "before", "being", "between", "both", "but",
    "can", "could", "did", "does", "doing", "down", "during", "each", "either", "etc",
    "every", "few", "for", "from", "further", "had", "has", "have", "having", "her",
    "here", "hers", "him", "his", "how", "into", "its", "itself", "just", "may",
    "might", "more", "most", "must", "not", "now", "off", "once", "only", "other",
    "our", "ours", "out", "over", "own", "per", "same", "shall", "she", "should",
    "some", "such", "than", "that", "the", "their", "them", "then", "there", "these",
    "they", "this", "those", "through", "too", "under", "until", "upon", "very", "was",
    "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will",
    "with", "within", "without", "would", "you", "your", "yours",
    // Recruiting boilerplate
    "ability", "applicant", "candidate", "candidates", "company", "experience",
    "experienced", "ideal", "including", "job", "looking", "plus", "position",
    "preferred", "required", "requirements", "responsibilities", "responsible",
    "role", "seeking", "skills", "strong", "work", "working", "year", "years",
];
