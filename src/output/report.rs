//! Immutable gap report model consumed by renderers
//!
//! Constructed once per (resume, job description) pair. Summary counts are
//! derived from the entries at construction, never set independently, so
//! counts and content cannot drift apart. Renderers present `status` values
//! as-is and never reinterpret them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GapStatus {
    Matched,
    Missing,
    PartialMatch,
}

impl fmt::Display for GapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GapStatus::Matched => "Matched",
            GapStatus::Missing => "Missing",
            GapStatus::PartialMatch => "Partial",
        };
        write!(f, "{}", label)
    }
}

/// One row of the comparison: a skill the job description requires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapEntry {
    pub skill_id: String,
    pub display_name: String,
    pub status: GapStatus,
    /// Absent when the resume showed no evidence for the skill.
    pub resume_confidence: Option<f32>,
    pub required_confidence: f32,
}

/// A skill evidenced in the resume but not required by the job description.
/// Informational only; extra skills never appear as gap entries and carry no
/// penalty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraSkill {
    pub skill_id: String,
    pub display_name: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapSummary {
    pub total_required: usize,
    pub matched_count: usize,
    pub missing_count: usize,
    pub partial_count: usize,
    /// `100 * (1 - (matched + 0.5 * partial) / total)`, one decimal.
    pub gap_score_percent: f32,
}

impl GapSummary {
    fn from_entries(entries: &[GapEntry]) -> Self {
        let total_required = entries.len();
        let matched_count = entries
            .iter()
            .filter(|e| e.status == GapStatus::Matched)
            .count();
        let missing_count = entries
            .iter()
            .filter(|e| e.status == GapStatus::Missing)
            .count();
        let partial_count = entries
            .iter()
            .filter(|e| e.status == GapStatus::PartialMatch)
            .count();

        let gap_score_percent = if total_required == 0 {
            0.0
        } else {
            let covered = matched_count as f32 + 0.5 * partial_count as f32;
            let raw = 100.0 * (1.0 - covered / total_required as f32);
            (raw * 10.0).round() / 10.0
        };

        Self {
            total_required,
            matched_count,
            missing_count,
            partial_count,
            gap_score_percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub taxonomy_version: String,
    pub match_threshold: f32,
    pub analyzer_version: String,
}

/// The ordered, deduplicated comparison of required vs. evidenced skills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapReport {
    entries: Vec<GapEntry>,
    summary: GapSummary,
    extra_skills: Vec<ExtraSkill>,
    metadata: ReportMetadata,
}

impl GapReport {
    pub fn new(
        entries: Vec<GapEntry>,
        extra_skills: Vec<ExtraSkill>,
        metadata: ReportMetadata,
    ) -> Self {
        let summary = GapSummary::from_entries(&entries);
        Self {
            entries,
            summary,
            extra_skills,
            metadata,
        }
    }

    pub fn entries(&self) -> &[GapEntry] {
        &self.entries
    }

    pub fn summary(&self) -> &GapSummary {
        &self.summary
    }

    pub fn extra_skills(&self) -> &[ExtraSkill] {
        &self.extra_skills
    }

    pub fn metadata(&self) -> &ReportMetadata {
        &self.metadata
    }
}
