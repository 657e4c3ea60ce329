//! Text normalization and offset-preserving n-gram generation
//!
//! Aliases and document text run through the same pipeline, so surface
//! variants like "Node.js" and "node js" agree by construction.

use serde::{Deserialize, Serialize};

/// Byte offsets into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub fn overlaps(&self, other: &SourceSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A single normalized token with its location in both the source text and
/// the folded document string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub span: SourceSpan,
    pub folded_start: usize,
    pub folded_end: usize,
}

/// The result of normalization: ordered tokens plus the folded document
/// (tokens joined by single spaces).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedText {
    pub tokens: Vec<Token>,
    pub folded: String,
}

impl NormalizedText {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Lazy, restartable iterator over sliding n-grams of the given width.
    pub fn ngrams(&self, width: usize) -> Ngrams<'_> {
        Ngrams {
            text: self,
            width,
            pos: 0,
        }
    }

    /// Map a byte range of the folded document back to a token index range,
    /// if the range aligns exactly with token boundaries. Hits that start or
    /// end inside a token (e.g. "java" inside "javascript") do not align.
    pub fn token_range_for_folded(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        let first = self
            .tokens
            .binary_search_by(|t| t.folded_start.cmp(&start))
            .ok()?;
        let mut last = first;
        loop {
            let token = &self.tokens[last];
            if token.folded_end == end {
                return Some((first, last));
            }
            if token.folded_end > end {
                return None;
            }
            last += 1;
            if last == self.tokens.len() {
                return None;
            }
        }
    }

    /// Source span covering the inclusive token range.
    pub fn source_span(&self, first: usize, last: usize) -> SourceSpan {
        SourceSpan {
            start: self.tokens[first].span.start,
            end: self.tokens[last].span.end,
        }
    }
}

/// An n-gram over the normalized token stream, with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct NgramSpan<'a> {
    pub phrase: &'a str,
    pub first_token: usize,
    pub width: usize,
    pub span: SourceSpan,
}

pub struct Ngrams<'a> {
    text: &'a NormalizedText,
    width: usize,
    pos: usize,
}

impl<'a> Iterator for Ngrams<'a> {
    type Item = NgramSpan<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.width == 0 {
            return None;
        }
        let last = self.pos + self.width - 1;
        if last >= self.text.tokens.len() {
            return None;
        }
        let first_token = &self.text.tokens[self.pos];
        let last_token = &self.text.tokens[last];
        let item = NgramSpan {
            phrase: &self.text.folded[first_token.folded_start..last_token.folded_end],
            first_token: self.pos,
            width: self.width,
            span: SourceSpan {
                start: first_token.span.start,
                end: last_token.span.end,
            },
        };
        self.pos += 1;
        Some(item)
    }
}

/// Normalize raw text: unicode-fold, lower-case, and collapse separator runs,
/// preserving source offsets per token. Empty or whitespace-only input yields
/// an empty result, not an error.
pub fn normalize(text: &str) -> NormalizedText {
    let mut tokens: Vec<Token> = Vec::new();
    let mut current = String::new();
    let mut start = 0;
    let mut end = 0;

    for (idx, raw) in text.char_indices() {
        let folded = fold_char(raw);
        if is_token_char(folded) {
            if current.is_empty() {
                start = idx;
            }
            for lower in folded.to_lowercase() {
                current.push(lower);
            }
            end = idx + raw.len_utf8();
        } else if !current.is_empty() {
            tokens.push(Token {
                text: std::mem::take(&mut current),
                span: SourceSpan { start, end },
                folded_start: 0,
                folded_end: 0,
            });
        }
    }
    if !current.is_empty() {
        tokens.push(Token {
            text: current,
            span: SourceSpan { start, end },
            folded_start: 0,
            folded_end: 0,
        });
    }

    let mut folded = String::new();
    for token in &mut tokens {
        if !folded.is_empty() {
            folded.push(' ');
        }
        token.folded_start = folded.len();
        folded.push_str(&token.text);
        token.folded_end = folded.len();
    }

    NormalizedText { tokens, folded }
}

/// Normalize a standalone phrase (e.g. a catalog alias) to its folded form.
pub fn normalize_phrase(phrase: &str) -> String {
    normalize(phrase).folded
}

/// `+` and `#` stay part of tokens so "c++" and "c#" survive normalization;
/// every other non-alphanumeric character separates.
fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || c == '+' || c == '#'
}

fn fold_char(c: char) -> char {
    match c {
        '\u{2018}' | '\u{2019}' => '\'', // Smart quotes to regular quotes
        '\u{201C}' | '\u{201D}' => '"',  // Smart double quotes
        '\u{2013}' | '\u{2014}' => '-',  // En dash, em dash to hyphen
        '\u{2026}' => '.',               // Ellipsis to period
        _ => c,
    }
}
