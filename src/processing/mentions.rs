//! Locating skill mentions in free text

use crate::error::{MatchScorerError, Result};
use aho_corasick::{AhoCorasick, MatchKind};
use std::collections::BTreeSet;

/// Multi-pattern matcher over the alias keys of a fixed list of skills.
/// Matches are case-insensitive and must sit on word boundaries.
pub struct SkillMentionMatcher {
    matcher: Option<AhoCorasick>,
    /// Pattern index to skill index.
    owners: Vec<usize>,
    skill_count: usize,
}

impl SkillMentionMatcher {
    /// `keys[i]` holds the names under which skill `i` may appear.
    pub fn new(keys: &[Vec<String>]) -> Result<Self> {
        let mut patterns = Vec::new();
        let mut owners = Vec::new();
        for (skill_idx, names) in keys.iter().enumerate() {
            for name in names {
                let name = name.trim();
                if !name.is_empty() {
                    patterns.push(name.to_string());
                    owners.push(skill_idx);
                }
            }
        }

        let matcher = if patterns.is_empty() {
            None
        } else {
            Some(
                AhoCorasick::builder()
                    .ascii_case_insensitive(true)
                    .match_kind(MatchKind::LeftmostLongest)
                    .build(&patterns)
                    .map_err(|e| {
                        MatchScorerError::Processing(format!("Failed to build mention matcher: {}", e))
                    })?,
            )
        };

        Ok(Self {
            matcher,
            owners,
            skill_count: keys.len(),
        })
    }

    /// Byte offset of the first mention of each skill, if any.
    pub fn first_mentions(&self, text: &str) -> Vec<Option<usize>> {
        let mut first = vec![None; self.skill_count];
        for (skill_idx, start) in self.mentions(text) {
            if first[skill_idx].is_none() {
                first[skill_idx] = Some(start);
            }
        }
        first
    }

    /// Indices of every skill mentioned at least once.
    pub fn mentioned(&self, text: &str) -> BTreeSet<usize> {
        self.mentions(text).into_iter().map(|(idx, _)| idx).collect()
    }

    fn mentions(&self, text: &str) -> Vec<(usize, usize)> {
        let Some(matcher) = &self.matcher else {
            return Vec::new();
        };
        matcher
            .find_iter(text)
            .filter(|m| on_word_boundary(text, m.start(), m.end()))
            .map(|m| (self.owners[m.pattern().as_usize()], m.start()))
            .collect()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '+' || c == '#'
}

fn on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start].chars().next_back().map_or(true, |c| !is_word_char(c));
    let after_ok = text[end..].chars().next().map_or(true, |c| !is_word_char(c));
    before_ok && after_ok
}
