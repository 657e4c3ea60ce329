//! Skill extraction: taxonomy-driven matching over normalized text
//!
//! Two passes feed one candidate pool. The alias pass scans the folded
//! document with the store's automaton and classifies token-aligned hits as
//! Exact, Alias, or NGram. The fuzzy pass sweeps n-gram spans width by width
//! for edit-distance matches, checking the cancellation signal between
//! widths. Candidates then go through per-entity overlap resolution and
//! dedup into a `SkillSet`.
//!
//! Extraction never fails on arbitrary text; the worst case is an empty
//! result. The store is never mutated and no state is shared between calls,
//! so identical input and taxonomy version always produce an identical
//! `SkillSet`.

use crate::config::ExtractionConfig;
use crate::error::{Result, SkillGapError};
use crate::processing::normalizer::{self, NgramSpan, SourceSpan};
use crate::processing::strategy::{
    AliasForm, AliasStrategy, Candidate, ExactStrategy, FuzzyStrategy, MatchStrategy, MatchType,
    Scored,
};
use crate::taxonomy::store::TaxonomyRegistry;
use crate::taxonomy::TaxonomyStore;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

/// Best evidence for one skill in one document. Never mutated after
/// extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSkill {
    pub skill_id: String,
    pub confidence: f32,
    pub match_type: MatchType,
    /// Where the skill was found, ordered by start offset. At least one.
    pub spans: Vec<SourceSpan>,
}

/// Deduplicated extraction result for a single document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillSet {
    pub taxonomy_version: String,
    pub skills: BTreeMap<String, ExtractedSkill>,
    /// True when extraction returned early on a cancellation signal; the
    /// result is coherent but not every strategy pass ran.
    pub partial: bool,
}

impl SkillSet {
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn get(&self, skill_id: &str) -> Option<&ExtractedSkill> {
        self.skills.get(skill_id)
    }

    pub fn contains(&self, skill_id: &str) -> bool {
        self.skills.contains_key(skill_id)
    }
}

#[derive(Debug, Clone, Copy)]
struct RawCandidate {
    entity: usize,
    span: SourceSpan,
    confidence: f32,
    match_type: MatchType,
}

pub struct SkillExtractor {
    exact: ExactStrategy,
    alias: AliasStrategy,
    fuzzy: FuzzyStrategy,
    max_ngram_width: usize,
}

impl SkillExtractor {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        if config.max_ngram_width == 0 {
            return Err(SkillGapError::Configuration(
                "max_ngram_width must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("exact_confidence", config.exact_confidence),
            ("alias_confidence", config.alias_confidence),
            ("ngram_confidence", config.ngram_confidence),
            ("fuzzy_floor", config.fuzzy_floor),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(SkillGapError::Configuration(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        Ok(Self {
            exact: ExactStrategy {
                confidence: config.exact_confidence,
            },
            alias: AliasStrategy {
                alias_confidence: config.alias_confidence,
                ngram_confidence: config.ngram_confidence,
            },
            fuzzy: FuzzyStrategy {
                floor: config.fuzzy_floor,
                min_chars: config.min_fuzzy_chars,
            },
            max_ngram_width: config.max_ngram_width,
        })
    }

    /// Extract the skill set evidenced in `text` against the given taxonomy.
    pub fn extract(&self, text: &str, store: &TaxonomyStore) -> SkillSet {
        let never = AtomicBool::new(false);
        self.extract_with_cancel(text, store, &never)
    }

    /// Version-addressed extraction through a registry.
    pub fn extract_versioned(
        &self,
        text: &str,
        registry: &TaxonomyRegistry,
        version: &str,
    ) -> Result<SkillSet> {
        let store = registry
            .get(version)
            .ok_or_else(|| SkillGapError::UnknownTaxonomyVersion(version.to_string()))?;
        Ok(self.extract(text, &store))
    }

    /// Like [`extract`](Self::extract), but checks `cancel` between match
    /// passes. An early return yields a coherent result with `partial` set;
    /// a pass is never abandoned halfway through.
    pub fn extract_with_cancel(
        &self,
        text: &str,
        store: &TaxonomyStore,
        cancel: &AtomicBool,
    ) -> SkillSet {
        let norm = normalizer::normalize(text);
        if norm.is_empty() {
            return SkillSet {
                taxonomy_version: store.version().to_string(),
                skills: BTreeMap::new(),
                partial: false,
            };
        }

        let mut candidates: Vec<RawCandidate> = Vec::new();
        let mut matched_spans: HashSet<(usize, usize)> = HashSet::new();

        // Alias pass: overlapping automaton scan of the folded document.
        // Overlaps across distinct entities are kept on purpose; the
        // per-entity longest-wins rule is applied during resolution.
        for hit in store.automaton().find_overlapping_iter(&norm.folded) {
            let Some((first, last)) = norm.token_range_for_folded(hit.start(), hit.end()) else {
                continue;
            };
            let record = store.alias_record(hit.pattern().as_usize());
            let span = norm.source_span(first, last);
            let width = last - first + 1;
            let candidate = Candidate {
                raw: &text[span.start..span.end],
                normalized: &norm.folded[hit.start()..hit.end()],
                width,
            };
            let alias = AliasForm {
                surface: &record.surface,
                normalized: &record.normalized,
            };
            let scored = self
                .exact
                .score(&candidate, &alias)
                .or_else(|| self.alias.score(&candidate, &alias));
            if let Some(scored) = scored {
                matched_spans.insert((first, width));
                candidates.push(RawCandidate {
                    entity: record.entity,
                    span,
                    confidence: scored.confidence,
                    match_type: scored.match_type,
                });
            }
        }

        if cancel.load(Ordering::Relaxed) {
            debug!("extraction cancelled after alias pass");
            return self.resolve(store, candidates, true);
        }

        // Fuzzy pass, one n-gram width at a time. Spans already claimed by
        // the alias pass are skipped: per span, exact and alias matching
        // outrank fuzzy.
        for width in 1..=self.max_ngram_width {
            if width > 1 && cancel.load(Ordering::Relaxed) {
                debug!("extraction cancelled before width-{} pass", width);
                return self.resolve(store, candidates, true);
            }
            for gram in norm.ngrams(width) {
                if matched_spans.contains(&(gram.first_token, width)) {
                    continue;
                }
                if let Some((entity, scored)) = self.best_fuzzy(text, store, &gram) {
                    candidates.push(RawCandidate {
                        entity,
                        span: gram.span,
                        confidence: scored.confidence,
                        match_type: scored.match_type,
                    });
                }
            }
        }

        self.resolve(store, candidates, false)
    }

    /// Best fuzzy-scoring alias for one n-gram span, if any clears the floor.
    /// Aliases are visited longest-first in a fixed order, so equal scores
    /// resolve deterministically.
    fn best_fuzzy(
        &self,
        text: &str,
        store: &TaxonomyStore,
        gram: &NgramSpan<'_>,
    ) -> Option<(usize, Scored)> {
        let candidate_chars = gram.phrase.chars().count();
        if candidate_chars < self.fuzzy.min_chars {
            return None;
        }
        let candidate = Candidate {
            raw: &text[gram.span.start..gram.span.end],
            normalized: gram.phrase,
            width: gram.width,
        };

        let mut best: Option<(usize, Scored)> = None;
        for record in store.alias_records() {
            // Edit distance is at least the length gap; skip aliases the
            // floor already rules out.
            let max_chars = candidate_chars.max(record.norm_chars);
            let len_gap = candidate_chars.abs_diff(record.norm_chars);
            if len_gap as f32 > (1.0 - self.fuzzy.floor) * max_chars as f32 {
                continue;
            }
            let alias = AliasForm {
                surface: &record.surface,
                normalized: &record.normalized,
            };
            if let Some(scored) = self.fuzzy.score(&candidate, &alias) {
                let better = match &best {
                    None => true,
                    Some((_, current)) => scored.confidence > current.confidence,
                };
                if better {
                    best = Some((record.entity, scored));
                }
            }
        }
        best
    }

    /// Overlap resolution and dedup: longest span wins among overlapping
    /// candidates of the same entity, then the best surviving candidate
    /// decides confidence and match type (highest confidence, then
    /// Exact > Alias > NGram > Fuzzy, then earliest span).
    fn resolve(
        &self,
        store: &TaxonomyStore,
        candidates: Vec<RawCandidate>,
        partial: bool,
    ) -> SkillSet {
        let mut by_entity: BTreeMap<usize, Vec<RawCandidate>> = BTreeMap::new();
        for candidate in candidates {
            by_entity.entry(candidate.entity).or_default().push(candidate);
        }

        let mut skills = BTreeMap::new();
        for (entity_idx, mut group) in by_entity {
            // Alias-pass candidates claim their spans before fuzzy ones: a
            // weaker fuzzy span must not swallow an exact mention it overlaps.
            group.sort_by(|a, b| {
                let fuzzy_a = (a.match_type == MatchType::Fuzzy) as u8;
                let fuzzy_b = (b.match_type == MatchType::Fuzzy) as u8;
                fuzzy_a
                    .cmp(&fuzzy_b)
                    .then_with(|| b.span.len().cmp(&a.span.len()))
                    .then_with(|| a.span.start.cmp(&b.span.start))
                    .then_with(|| a.match_type.rank().cmp(&b.match_type.rank()))
            });

            let mut kept: Vec<RawCandidate> = Vec::new();
            for candidate in group {
                if kept.iter().all(|k| !k.span.overlaps(&candidate.span)) {
                    kept.push(candidate);
                }
            }

            let best = kept
                .iter()
                .max_by(|a, b| {
                    a.confidence
                        .total_cmp(&b.confidence)
                        .then_with(|| b.match_type.rank().cmp(&a.match_type.rank()))
                        .then_with(|| b.span.start.cmp(&a.span.start))
                        .then_with(|| b.span.end.cmp(&a.span.end))
                })
                .copied()
                .expect("kept is non-empty for every grouped entity");

            let mut spans: Vec<SourceSpan> = kept.iter().map(|c| c.span).collect();
            spans.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.end.cmp(&b.end)));

            let entity = store.entity(entity_idx);
            skills.insert(
                entity.id.clone(),
                ExtractedSkill {
                    skill_id: entity.id.clone(),
                    confidence: best.confidence,
                    match_type: best.match_type,
                    spans,
                },
            );
        }

        debug!(
            "extraction resolved {} skills (partial: {})",
            skills.len(),
            partial
        );
        SkillSet {
            taxonomy_version: store.version().to_string(),
            skills,
            partial,
        }
    }
}

impl Default for SkillExtractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default()).expect("default extraction config is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::catalog::{CatalogEntry, SkillCategory, TaxonomyCatalog};

    fn entry(name: &str, category: SkillCategory, aliases: &[&str]) -> CatalogEntry {
        CatalogEntry {
            name: name.to_string(),
            category,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            id: None,
        }
    }

    fn store(entries: Vec<CatalogEntry>) -> TaxonomyStore {
        TaxonomyStore::from_catalog(TaxonomyCatalog {
            version: "test-1".to_string(),
            skills: entries,
        })
        .unwrap()
    }

    fn python_store() -> TaxonomyStore {
        store(vec![entry(
            "Python",
            SkillCategory::Language,
            &["python", "py"],
        )])
    }

    #[test]
    fn test_alias_match_scenario() {
        // Resume mentions "Py"; the alias matches at 0.9.
        let store = python_store();
        let extractor = SkillExtractor::default();

        let skills = extractor.extract("3 years of Py development", &store);
        assert_eq!(skills.len(), 1);
        let python = skills.get("python").unwrap();
        assert_eq!(python.match_type, MatchType::Alias);
        assert_eq!(python.confidence, 0.9);
        assert_eq!(python.spans.len(), 1);
        assert!(!skills.partial);
    }

    #[test]
    fn test_exact_match_is_surface_equality() {
        let store = python_store();
        let extractor = SkillExtractor::default();

        let skills = extractor.extract("Requires Python and SQL", &store);
        let python = skills.get("python").unwrap();
        assert_eq!(python.match_type, MatchType::Exact);
        assert_eq!(python.confidence, 1.0);
        // "SQL" has no taxonomy entry; ignored, not an error.
        assert_eq!(skills.len(), 1);
    }

    #[test]
    fn test_bare_word_is_not_an_alias() {
        // "machine learning" is aliased; the bare word "learning" is not,
        // and fuzzy cannot bridge the distance.
        let store = store(vec![
            entry("Machine Learning", SkillCategory::Domain, &["ml"]),
            entry("Frameworks", SkillCategory::Other, &["framework"]),
        ]);
        let extractor = SkillExtractor::default();

        let skills = extractor.extract("Learning a new framework", &store);
        assert!(!skills.contains("machine-learning"));
        assert!(skills.contains("frameworks"));
    }

    #[test]
    fn test_multi_token_alias_matches_as_ngram() {
        let store = store(vec![entry("Machine Learning", SkillCategory::Domain, &["ml"])]);
        let extractor = SkillExtractor::default();

        let skills = extractor.extract("built machine  learning pipelines", &store);
        let ml = skills.get("machine-learning").unwrap();
        assert_eq!(ml.match_type, MatchType::NGram);
        assert_eq!(ml.confidence, 0.85);
    }

    #[test]
    fn test_overlap_same_entity_longest_wins() {
        // Both "machine" and "machine learning" alias the same entity; the
        // longer span must win and the shorter must not double-count.
        let store = store(vec![entry(
            "Machine Learning",
            SkillCategory::Domain,
            &["machine", "machine learning"],
        )]);
        let extractor = SkillExtractor::default();

        let text = "Machine Learning expert";
        let skills = extractor.extract(text, &store);
        let ml = skills.get("machine-learning").unwrap();
        assert_eq!(ml.spans.len(), 1);
        assert_eq!(
            &text[ml.spans[0].start..ml.spans[0].end],
            "Machine Learning"
        );
    }

    #[test]
    fn test_overlap_distinct_entities_both_kept() {
        let store = store(vec![
            entry("Machine Learning", SkillCategory::Domain, &[]),
            entry("Learning Agility", SkillCategory::SoftSkill, &["learning"]),
        ]);
        let extractor = SkillExtractor::default();

        let skills = extractor.extract("machine learning projects", &store);
        assert!(skills.contains("machine-learning"));
        assert!(skills.contains("learning-agility"));
    }

    #[test]
    fn test_repeated_mentions_collect_spans() {
        let store = python_store();
        let extractor = SkillExtractor::default();

        let skills = extractor.extract("Python here, python there, Py everywhere", &store);
        let python = skills.get("python").unwrap();
        assert_eq!(python.spans.len(), 3);
        // Best mention decides confidence: the exact "Python".
        assert_eq!(python.match_type, MatchType::Exact);
        assert_eq!(python.confidence, 1.0);
        let starts: Vec<usize> = python.spans.iter().map(|s| s.start).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
    }

    #[test]
    fn test_fuzzy_match_misspelling() {
        let store = python_store();
        let extractor = SkillExtractor::default();

        let skills = extractor.extract("I know Pythonn well", &store);
        let python = skills.get("python").unwrap();
        assert_eq!(python.match_type, MatchType::Fuzzy);
        assert!((python.confidence - (1.0 - 1.0 / 7.0)).abs() < 1e-6);
    }

    #[test]
    fn test_empty_input() {
        let store = python_store();
        let extractor = SkillExtractor::default();

        let skills = extractor.extract("", &store);
        assert!(skills.is_empty());
        assert!(!skills.partial);
        assert_eq!(skills.taxonomy_version, "test-1");
    }

    #[test]
    fn test_determinism() {
        let store = store(vec![
            entry("Python", SkillCategory::Language, &["py"]),
            entry("Machine Learning", SkillCategory::Domain, &["ml"]),
            entry("PostgreSQL", SkillCategory::Database, &["postgres"]),
        ]);
        let extractor = SkillExtractor::default();
        let text = "Py and postgres for machine learning; also Pythonn scripting";

        let first = extractor.extract(text, &store);
        let second = extractor.extract(text, &store);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_cancellation_marks_partial() {
        let store = python_store();
        let extractor = SkillExtractor::default();
        let cancel = AtomicBool::new(true);

        let skills = extractor.extract_with_cancel("Python and Pythonn", &store, &cancel);
        assert!(skills.partial);
        // Alias-pass results are intact; the fuzzy "Pythonn" span was never
        // swept but the exact mention survives.
        let python = skills.get("python").unwrap();
        assert_eq!(python.match_type, MatchType::Exact);
    }

    #[test]
    fn test_aliases_longer_than_ngram_width_still_match() {
        let store = store(vec![entry(
            "Continuous Integration and Delivery",
            SkillCategory::Methodology,
            &["continuous integration and continuous delivery"],
        )]);
        let extractor = SkillExtractor::default();

        let skills = extractor.extract(
            "pipelines for continuous integration and continuous delivery at scale",
            &store,
        );
        assert_eq!(skills.len(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ExtractionConfig::default();
        config.fuzzy_floor = 1.5;
        assert!(SkillExtractor::new(&config).is_err());

        let mut config = ExtractionConfig::default();
        config.max_ngram_width = 0;
        assert!(SkillExtractor::new(&config).is_err());
    }

    #[test]
    fn test_unknown_taxonomy_version() {
        let mut registry = TaxonomyRegistry::new();
        registry.insert(python_store());
        let extractor = SkillExtractor::default();

        assert!(extractor
            .extract_versioned("some text", &registry, "test-1")
            .is_ok());
        let err = extractor
            .extract_versioned("some text", &registry, "nope")
            .unwrap_err();
        assert!(matches!(err, SkillGapError::UnknownTaxonomyVersion(_)));
    }
}
