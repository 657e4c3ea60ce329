//! Report rendering: console, JSON, and Markdown
//!
//! Renderers present the report model as-is; status values are displayed,
//! never reinterpreted.

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::report::{GapReport, GapStatus};
use crate::processing::extractor::SkillSet;
use crate::processing::normalizer::SourceSpan;
use colored::Colorize;
use std::fmt::Write as _;

const MAX_EVIDENCE_LINES: usize = 5;

pub struct ReportFormatter {
    color: bool,
}

impl ReportFormatter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn format(&self, report: &GapReport, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => Ok(self.format_console(report)),
            OutputFormat::Json => self.format_json(report),
            OutputFormat::Markdown => Ok(self.format_markdown(report)),
        }
    }

    pub fn format_console(&self, report: &GapReport) -> String {
        let mut out = String::new();
        self.write_console_header(&mut out, report);
        self.write_console_entries(&mut out, report);
        self.write_console_extras(&mut out, report);
        self.write_console_footer(&mut out, report);
        out
    }

    /// Console rendering with evidence excerpts: for matched and partial
    /// skills, quote the resume lines their spans fall on.
    pub fn format_console_with_evidence(
        &self,
        report: &GapReport,
        resume_skills: &SkillSet,
        resume_text: &str,
    ) -> String {
        let mut out = String::new();
        self.write_console_header(&mut out, report);

        for entry in report.entries() {
            let _ = writeln!(
                out,
                "  {:<24} {:<10} required {:.2}   resume {}",
                entry.display_name,
                self.status_label(entry.status),
                entry.required_confidence,
                match entry.resume_confidence {
                    Some(c) => format!("{:.2}", c),
                    None => "-".to_string(),
                },
            );
            if entry.status == GapStatus::Missing {
                continue;
            }
            if let Some(evidence) = resume_skills.get(&entry.skill_id) {
                for line in evidence_lines(resume_text, &evidence.spans, MAX_EVIDENCE_LINES) {
                    let quoted = format!("      > {}", line);
                    if self.color {
                        let _ = writeln!(out, "{}", quoted.dimmed());
                    } else {
                        let _ = writeln!(out, "{}", quoted);
                    }
                }
            }
        }

        self.write_console_extras(&mut out, report);
        self.write_console_footer(&mut out, report);
        out
    }

    pub fn format_json(&self, report: &GapReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    pub fn format_markdown(&self, report: &GapReport) -> String {
        let mut out = String::new();
        let summary = report.summary();

        let _ = writeln!(out, "# Skill Gap Report\n");
        let _ = writeln!(
            out,
            "- Taxonomy version: `{}`",
            report.metadata().taxonomy_version
        );
        let _ = writeln!(
            out,
            "- Match threshold: {:.2}",
            report.metadata().match_threshold
        );
        let _ = writeln!(
            out,
            "- Required: {} | Matched: {} | Partial: {} | Missing: {}",
            summary.total_required,
            summary.matched_count,
            summary.partial_count,
            summary.missing_count
        );
        let _ = writeln!(out, "- Gap score: {:.1}%\n", summary.gap_score_percent);

        let _ = writeln!(out, "| Skill | Status | Required | Resume |");
        let _ = writeln!(out, "|-------|--------|----------|--------|");
        for entry in report.entries() {
            let _ = writeln!(
                out,
                "| {} | {} | {:.2} | {} |",
                entry.display_name,
                entry.status,
                entry.required_confidence,
                match entry.resume_confidence {
                    Some(c) => format!("{:.2}", c),
                    None => "-".to_string(),
                },
            );
        }

        if !report.extra_skills().is_empty() {
            let _ = writeln!(out, "\n## Extra skills\n");
            let _ = writeln!(
                out,
                "Evidenced in the resume but not required by the job description:\n"
            );
            for extra in report.extra_skills() {
                let _ = writeln!(
                    out,
                    "- {} ({:.2})",
                    extra.display_name, extra.confidence
                );
            }
        }

        out
    }

    fn write_console_header(&self, out: &mut String, report: &GapReport) {
        let summary = report.summary();
        let title = "Skill Gap Report";
        if self.color {
            let _ = writeln!(out, "{}", title.bold());
        } else {
            let _ = writeln!(out, "{}", title);
        }
        let _ = writeln!(out, "{}", "=".repeat(title.len()));
        let _ = writeln!(
            out,
            "Taxonomy version: {}   Threshold: {:.2}",
            report.metadata().taxonomy_version,
            report.metadata().match_threshold
        );
        let _ = writeln!(
            out,
            "Required: {} | Matched: {} | Partial: {} | Missing: {}",
            summary.total_required,
            summary.matched_count,
            summary.partial_count,
            summary.missing_count
        );
        let _ = writeln!(out, "Gap score: {:.1}%\n", summary.gap_score_percent);
    }

    fn write_console_entries(&self, out: &mut String, report: &GapReport) {
        for entry in report.entries() {
            let _ = writeln!(
                out,
                "  {:<24} {:<10} required {:.2}   resume {}",
                entry.display_name,
                self.status_label(entry.status),
                entry.required_confidence,
                match entry.resume_confidence {
                    Some(c) => format!("{:.2}", c),
                    None => "-".to_string(),
                },
            );
        }
    }

    fn write_console_extras(&self, out: &mut String, report: &GapReport) {
        if report.extra_skills().is_empty() {
            return;
        }
        let _ = writeln!(out, "\nExtra skills (not required):");
        for extra in report.extra_skills() {
            let _ = writeln!(out, "  {} ({:.2})", extra.display_name, extra.confidence);
        }
    }

    fn write_console_footer(&self, out: &mut String, report: &GapReport) {
        let _ = writeln!(
            out,
            "\nGenerated at {} by skillgap v{}",
            report.metadata().generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.metadata().analyzer_version
        );
    }

    fn status_label(&self, status: GapStatus) -> String {
        let label = status.to_string();
        if !self.color {
            return label;
        }
        match status {
            GapStatus::Matched => label.green().to_string(),
            GapStatus::PartialMatch => label.yellow().to_string(),
            GapStatus::Missing => label.red().to_string(),
        }
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Source lines containing the given spans, first occurrence order, deduped.
fn evidence_lines<'t>(text: &'t str, spans: &[SourceSpan], limit: usize) -> Vec<&'t str> {
    let mut lines: Vec<&'t str> = Vec::new();
    for span in spans {
        if lines.len() >= limit {
            break;
        }
        if span.start > text.len() {
            continue;
        }
        let line_start = text[..span.start].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let line_end = text[span.start..]
            .find('\n')
            .map(|i| span.start + i)
            .unwrap_or(text.len());
        let line = text[line_start..line_end].trim();
        if !line.is_empty() && !lines.contains(&line) {
            lines.push(line);
        }
    }
    lines
}
