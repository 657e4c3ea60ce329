//! Integration tests for the skill gap analyzer

use skillgap::config::{ExtractionConfig, OutputFormat};
use skillgap::output::formatter::ReportFormatter;
use skillgap::output::report::{GapReport, GapStatus};
use skillgap::processing::extractor::SkillExtractor;
use skillgap::processing::reconciler::{reconcile, ReconcilePolicy};
use skillgap::processing::strategy::MatchType;
use skillgap::taxonomy::TaxonomyStore;
use skillgap::SkillGapError;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::AtomicBool;

fn fixture_store() -> TaxonomyStore {
    TaxonomyStore::load(Path::new("tests/fixtures/taxonomy.json")).unwrap()
}

fn fixture_text(name: &str) -> String {
    std::fs::read_to_string(Path::new("tests/fixtures").join(name)).unwrap()
}

#[test]
fn test_end_to_end_gap_analysis() {
    let store = fixture_store();
    let extractor = SkillExtractor::default();

    let resume_text = fixture_text("sample_resume.txt");
    let job_text = fixture_text("sample_job.txt");

    let resume_skills = extractor.extract(&resume_text, &store);
    let job_skills = extractor.extract(&job_text, &store);

    assert!(resume_skills.contains("python"));
    assert!(resume_skills.contains("react"));
    assert!(resume_skills.contains("docker"));
    assert!(!resume_skills.contains("kubernetes"));
    assert!(!resume_skills.contains("machine-learning"));

    assert!(job_skills.contains("python"));
    assert!(job_skills.contains("kubernetes"));
    assert!(job_skills.contains("machine-learning"));

    let policy = ReconcilePolicy::default();
    let report = reconcile(&resume_skills, &job_skills, &policy, &store).unwrap();

    // Every required skill appears exactly once, and nothing else does.
    assert_eq!(report.entries().len(), job_skills.len());
    let mut ids: Vec<&str> = report.entries().iter().map(|e| e.skill_id.as_str()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), job_skills.len());
    for id in &ids {
        assert!(job_skills.contains(id));
    }

    let status_of = |id: &str| {
        report
            .entries()
            .iter()
            .find(|e| e.skill_id == id)
            .map(|e| e.status)
            .unwrap()
    };
    assert_eq!(status_of("python"), GapStatus::Matched);
    assert_eq!(status_of("postgresql"), GapStatus::Matched);
    assert_eq!(status_of("docker"), GapStatus::Matched);
    assert_eq!(status_of("communication"), GapStatus::Matched);
    assert_eq!(status_of("kubernetes"), GapStatus::Missing);
    assert_eq!(status_of("machine-learning"), GapStatus::Missing);

    let summary = report.summary();
    assert_eq!(
        summary.matched_count + summary.missing_count + summary.partial_count,
        summary.total_required
    );
    assert_eq!(summary.missing_count, 2);

    // JavaScript and React are evidenced but not required.
    let extras: Vec<&str> = report
        .extra_skills()
        .iter()
        .map(|e| e.skill_id.as_str())
        .collect();
    assert!(extras.contains(&"javascript"));
    assert!(extras.contains(&"react"));
    assert!(!extras.contains(&"python"));
}

#[test]
fn test_extraction_is_deterministic() {
    let store = fixture_store();
    let extractor = SkillExtractor::default();
    let resume_text = fixture_text("sample_resume.txt");

    let first = extractor.extract(&resume_text, &store);
    let second = extractor.extract(&resume_text, &store);

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_python_alias_scenario() {
    // Taxonomy knows Python as {python, py}; "SQL" has no entry and is
    // ignored, not an error.
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{"version": "scenario",
            "skills": [{{"name": "Python", "category": "language",
                         "aliases": ["python", "py"]}}]}}"#
    )
    .unwrap();
    let store = TaxonomyStore::load(file.path()).unwrap();
    let extractor = SkillExtractor::default();

    let resume_skills = extractor.extract("3 years of Py development", &store);
    assert_eq!(resume_skills.len(), 1);
    let python = resume_skills.get("python").unwrap();
    assert_eq!(python.confidence, 0.9);
    assert_eq!(python.match_type, MatchType::Alias);

    let job_skills = extractor.extract("Requires Python and SQL", &store);
    assert_eq!(job_skills.len(), 1);
    assert_eq!(job_skills.get("python").unwrap().confidence, 1.0);

    let policy = ReconcilePolicy::new(0.7).unwrap();
    let report = reconcile(&resume_skills, &job_skills, &policy, &store).unwrap();
    assert_eq!(report.entries().len(), 1);
    assert_eq!(report.entries()[0].display_name, "Python");
    assert_eq!(report.entries()[0].status, GapStatus::Matched);
    assert_eq!(report.summary().missing_count, 0);
}

#[test]
fn test_empty_resume_reports_all_missing() {
    let store = fixture_store();
    let extractor = SkillExtractor::default();

    let resume_skills = extractor.extract("", &store);
    assert!(resume_skills.is_empty());

    let job_skills = extractor.extract(&fixture_text("sample_job.txt"), &store);
    let report = reconcile(
        &resume_skills,
        &job_skills,
        &ReconcilePolicy::default(),
        &store,
    )
    .unwrap();

    assert_eq!(report.summary().missing_count, report.summary().total_required);
    assert_eq!(report.summary().gap_score_percent, 100.0);
    assert!(report
        .entries()
        .iter()
        .all(|e| e.status == GapStatus::Missing && e.resume_confidence.is_none()));
}

#[test]
fn test_report_renders_in_all_formats() {
    let store = fixture_store();
    let extractor = SkillExtractor::default();
    let resume_text = fixture_text("sample_resume.txt");

    let resume_skills = extractor.extract(&resume_text, &store);
    let job_skills = extractor.extract(&fixture_text("sample_job.txt"), &store);
    let report = reconcile(
        &resume_skills,
        &job_skills,
        &ReconcilePolicy::default(),
        &store,
    )
    .unwrap();

    let formatter = ReportFormatter::new(false);

    let console = formatter.format(&report, &OutputFormat::Console).unwrap();
    assert!(console.contains("Skill Gap Report"));
    assert!(console.contains("Kubernetes"));

    let json = formatter.format(&report, &OutputFormat::Json).unwrap();
    let parsed: GapReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.summary(), report.summary());

    let markdown = formatter.format(&report, &OutputFormat::Markdown).unwrap();
    assert!(markdown.contains("| Skill | Status | Required | Resume |"));

    let detailed = formatter.format_console_with_evidence(&report, &resume_skills, &resume_text);
    assert!(detailed.contains("3 years of Py development"));
}

#[test]
fn test_duplicate_alias_catalog_rejected() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{"version": "dup",
            "skills": [
              {{"name": "JavaScript", "category": "language", "aliases": ["js"]}},
              {{"name": "Java", "category": "language", "aliases": ["js"]}}
            ]}}"#
    )
    .unwrap();

    let err = TaxonomyStore::load(file.path()).unwrap_err();
    assert!(matches!(err, SkillGapError::TaxonomyLoad(_)));
}

#[test]
fn test_cancelled_extraction_is_partial() {
    let store = fixture_store();
    let extractor = SkillExtractor::new(&ExtractionConfig::default()).unwrap();
    let cancel = AtomicBool::new(true);

    let skills =
        extractor.extract_with_cancel(&fixture_text("sample_resume.txt"), &store, &cancel);
    assert!(skills.partial);
    // Alias-pass matches survive a cancelled run.
    assert!(skills.contains("python"));
}
