//! Match strategies: score a candidate phrase against a registered alias
//!
//! Each strategy is blind to the others; the extractor orchestrates priority.
//! Swapping the edit-distance heuristic or adding a new scorer never touches
//! the orchestration logic.

use serde::{Deserialize, Serialize};
use strsim::levenshtein;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    Exact,
    Alias,
    NGram,
    Fuzzy,
}

impl MatchType {
    /// Tie-break rank when confidences are equal: lower wins.
    pub fn rank(&self) -> u8 {
        match self {
            MatchType::Exact => 0,
            MatchType::Alias => 1,
            MatchType::NGram => 2,
            MatchType::Fuzzy => 3,
        }
    }
}

/// A candidate phrase as it appears in the document.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Raw source slice, separators and casing intact.
    pub raw: &'a str,
    /// Folded form from the normalizer.
    pub normalized: &'a str,
    /// Token count of the phrase.
    pub width: usize,
}

/// A registered alias: the catalog surface form and its normalized form.
#[derive(Debug, Clone, Copy)]
pub struct AliasForm<'a> {
    pub surface: &'a str,
    pub normalized: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored {
    pub confidence: f32,
    pub match_type: MatchType,
}

pub trait MatchStrategy {
    fn score(&self, candidate: &Candidate<'_>, alias: &AliasForm<'_>) -> Option<Scored>;
}

/// Raw surface equality: the text contains the alias exactly as registered.
#[derive(Debug, Clone, Copy)]
pub struct ExactStrategy {
    pub confidence: f32,
}

impl MatchStrategy for ExactStrategy {
    fn score(&self, candidate: &Candidate<'_>, alias: &AliasForm<'_>) -> Option<Scored> {
        (candidate.raw == alias.surface).then_some(Scored {
            confidence: self.confidence,
            match_type: MatchType::Exact,
        })
    }
}

/// Case/punctuation-insensitive equality on normalized forms. Single-token
/// phrases score as Alias, multi-token phrases as NGram.
#[derive(Debug, Clone, Copy)]
pub struct AliasStrategy {
    pub alias_confidence: f32,
    pub ngram_confidence: f32,
}

impl MatchStrategy for AliasStrategy {
    fn score(&self, candidate: &Candidate<'_>, alias: &AliasForm<'_>) -> Option<Scored> {
        if candidate.normalized != alias.normalized {
            return None;
        }
        Some(if candidate.width <= 1 {
            Scored {
                confidence: self.alias_confidence,
                match_type: MatchType::Alias,
            }
        } else {
            Scored {
                confidence: self.ngram_confidence,
                match_type: MatchType::NGram,
            }
        })
    }
}

/// Edit-distance scoring: `1 - distance / max(len_a, len_b)` over chars,
/// rejected below the configured floor.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyStrategy {
    pub floor: f32,
    pub min_chars: usize,
}

impl MatchStrategy for FuzzyStrategy {
    fn score(&self, candidate: &Candidate<'_>, alias: &AliasForm<'_>) -> Option<Scored> {
        let a = candidate.normalized;
        let b = alias.normalized;
        if a == b {
            // Normalized equality belongs to AliasStrategy.
            return None;
        }
        let a_chars = a.chars().count();
        if a_chars < self.min_chars {
            return None;
        }
        let max_chars = a_chars.max(b.chars().count());
        if max_chars == 0 {
            return None;
        }
        let distance = levenshtein(a, b);
        let confidence = 1.0 - distance as f32 / max_chars as f32;
        (confidence >= self.floor).then_some(Scored {
            confidence,
            match_type: MatchType::Fuzzy,
        })
    }
}
