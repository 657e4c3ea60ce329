//! Gap reconciliation between evidenced and required skill sets

use crate::error::{Result, SkillGapError};
use crate::output::report::{ExtraSkill, GapEntry, GapReport, GapStatus, ReportMetadata};
use crate::processing::extractor::SkillSet;
use crate::taxonomy::TaxonomyStore;
use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Classification policy for the comparison. Validated before use; a bad
/// threshold is surfaced to the caller, never silently corrected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconcilePolicy {
    /// Closed lower bound: a resume confidence exactly at the threshold
    /// classifies as matched.
    pub match_threshold: f32,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self {
            match_threshold: 0.7,
        }
    }
}

impl ReconcilePolicy {
    pub fn new(match_threshold: f32) -> Result<Self> {
        let policy = Self { match_threshold };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.match_threshold.is_finite() || !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(SkillGapError::InvalidPolicy(format!(
                "match_threshold must be within [0, 1], got {}",
                self.match_threshold
            )));
        }
        Ok(())
    }
}

/// Compare the resume's evidenced skills against the job description's
/// required skills. Every required skill yields exactly one entry; skills
/// present only in the resume are listed as extras, never as gaps.
///
/// Entries are ordered by required confidence descending, then display name
/// ascending, so identical inputs always render identically.
pub fn reconcile(
    resume: &SkillSet,
    required: &SkillSet,
    policy: &ReconcilePolicy,
    store: &TaxonomyStore,
) -> Result<GapReport> {
    policy.validate()?;

    if resume.taxonomy_version != required.taxonomy_version {
        warn!(
            "comparing skill sets from different taxonomy versions: {} vs {}",
            resume.taxonomy_version, required.taxonomy_version
        );
    }

    let mut entries: Vec<GapEntry> = Vec::with_capacity(required.skills.len());
    for (skill_id, required_skill) in &required.skills {
        let display_name = store
            .entity_by_id(skill_id)
            .map(|e| e.display_name.clone())
            .unwrap_or_else(|| skill_id.clone());

        let (status, resume_confidence) = match resume.get(skill_id) {
            None => (GapStatus::Missing, None),
            Some(evidence) if evidence.confidence >= policy.match_threshold => {
                (GapStatus::Matched, Some(evidence.confidence))
            }
            Some(evidence) => (GapStatus::PartialMatch, Some(evidence.confidence)),
        };

        entries.push(GapEntry {
            skill_id: skill_id.clone(),
            display_name,
            status,
            resume_confidence,
            required_confidence: required_skill.confidence,
        });
    }

    entries.sort_by(|a, b| {
        b.required_confidence
            .total_cmp(&a.required_confidence)
            .then_with(|| a.display_name.cmp(&b.display_name))
            .then_with(|| a.skill_id.cmp(&b.skill_id))
    });

    let extra_skills: Vec<ExtraSkill> = resume
        .skills
        .iter()
        .filter(|(skill_id, _)| !required.contains(skill_id))
        .map(|(skill_id, evidence)| ExtraSkill {
            skill_id: skill_id.clone(),
            display_name: store
                .entity_by_id(skill_id)
                .map(|e| e.display_name.clone())
                .unwrap_or_else(|| skill_id.clone()),
            confidence: evidence.confidence,
        })
        .collect();

    debug!(
        "reconciled {} required skills against {} evidenced",
        required.len(),
        resume.len()
    );

    Ok(GapReport::new(
        entries,
        extra_skills,
        ReportMetadata {
            generated_at: Utc::now(),
            taxonomy_version: required.taxonomy_version.clone(),
            match_threshold: policy.match_threshold,
            analyzer_version: env!("CARGO_PKG_VERSION").to_string(),
        },
    ))
}
