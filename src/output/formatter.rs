//! Output formatters for match reports

use crate::config::OutputFormat;
use crate::error::{MatchScorerError, Result};
use crate::output::report::{
    percent, ConfidenceLevel, MatchReport, MatchStrength, RankingDirection, ReportBody,
};
use crate::processing::analyzer::MatchResult;
use crate::processing::factors::Factor;
use crate::processing::skill_gap::ImportanceTier;
use colored::{Color, Colorize};
use std::path::Path;

/// Trait for formatting match reports
pub trait OutputFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String>;
}

/// Terminal formatter with optional colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

/// JSON formatter emitting the camelCase result contract
pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Report generator that coordinates the formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            3 => "▒",
            _ => "░",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            3 => Color::Yellow,
            _ => Color::White,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: f64) -> String {
        let strength = MatchStrength::from_score(score);
        let (badge, color) = match strength {
            MatchStrength::Excellent => ("EXCELLENT", Color::Green),
            MatchStrength::Strong => ("STRONG", Color::BrightGreen),
            MatchStrength::Moderate => ("MODERATE", Color::Yellow),
            MatchStrength::Weak => ("WEAK", Color::Red),
            MatchStrength::Poor => ("POOR", Color::BrightRed),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_tier(&self, tier: ImportanceTier) -> String {
        let color = match tier {
            ImportanceTier::High => Color::Red,
            ImportanceTier::Medium => Color::Yellow,
            ImportanceTier::Low => Color::White,
        };
        self.colorize(&format!("[{}]", tier), color)
    }

    fn format_bar(score: f64) -> String {
        let filled = (score.clamp(0.0, 1.0) * 20.0).round() as usize;
        format!("{}{}", "■".repeat(filled), "·".repeat(20 - filled))
    }

    fn format_result(&self, result: &MatchResult, output: &mut String) {
        let explanation = &result.explanation;
        output.push_str(&format!(
            "Match Score: {}% {}\n",
            percent(result.match_score),
            self.format_score_badge(result.match_score)
        ));
        output.push_str(&format!(
            "Verdict: {}\n",
            self.colorize(MatchStrength::from_score(result.match_score).verdict(), Color::Cyan)
        ));
        output.push_str(&format!(
            "Confidence: {}% ({})\n",
            percent(explanation.confidence),
            ConfidenceLevel::from_score(explanation.confidence)
        ));

        if let Some(detail) = &result.bidirectional_score {
            output.push_str(&format!(
                "Job → candidate: {}% | Candidate → job: {}% | {}{}\n",
                percent(detail.job_to_resume),
                percent(detail.resume_to_job),
                detail.match_quality,
                if detail.is_balanced { ", balanced" } else { ", one-sided" }
            ));
            if self.detailed {
                output.push_str(&format!("{}\n", detail.explanation));
            }
        }

        output.push_str(&self.format_header("Factor Breakdown", 3));
        for factor in Factor::ALL {
            let score = explanation.breakdown.get(factor);
            output.push_str(&format!(
                "{:<18} {} {:>3}%\n",
                factor.label(),
                Self::format_bar(score),
                percent(score)
            ));
        }

        if !explanation.key_reasons.is_empty() {
            output.push_str(&self.format_header("Key Reasons", 3));
            for reason in &explanation.key_reasons {
                output.push_str(&format!(
                    "• {} ({}%): {}\n",
                    reason.factor.label(),
                    percent(reason.score),
                    reason.evidence
                ));
            }
        }

        let gaps = &result.skill_gap_analysis;
        output.push_str(&self.format_header("Skills", 3));
        output.push_str(&format!(
            "Required coverage: {}/{} ({:.0}%)\n",
            gaps.matched_required_skills, gaps.total_required_skills, gaps.coverage_percentage
        ));
        if gaps.matched_skills.is_empty() {
            output.push_str("Matched: none\n");
        } else {
            output.push_str(&format!(
                "Matched: {}\n",
                self.colorize(&gaps.matched_skills.join(", "), Color::Green)
            ));
        }
        for missing in &gaps.missing_skills {
            let mut line = format!("Missing {} {}", self.format_tier(missing.importance), missing.skill_name);
            if let Some(sources) = &missing.transferable_from {
                line.push_str(&format!(" (builds on {})", sources.join(", ")));
            }
            output.push_str(&line);
            output.push('\n');
        }
        if self.detailed {
            if !gaps.bonus_skills.is_empty() {
                output.push_str(&format!("Bonus: {}\n", gaps.bonus_skills.join(", ")));
            }
            for pair in &gaps.transferable_skills {
                output.push_str(&format!(
                    "Transferable: {} → {} ({}%)\n",
                    pair.candidate_skill,
                    pair.job_skill,
                    percent(pair.transferability_score)
                ));
            }
        }

        if !gaps.recommended_learning_path.is_empty() {
            output.push_str(&self.format_header("Learning Path", 3));
            for (i, step) in gaps.recommended_learning_path.iter().enumerate() {
                let mut line = format!(
                    "{}. {} ({} week{})",
                    i + 1,
                    step.skill_name,
                    step.estimated_time_weeks,
                    if step.estimated_time_weeks == 1 { "" } else { "s" }
                );
                if !step.prerequisites.is_empty() {
                    line.push_str(&format!(" after {}", step.prerequisites.join(", ")));
                }
                output.push_str(&line);
                output.push('\n');
                if self.detailed {
                    for resource in &step.resources {
                        output.push_str(&format!("     - {}\n", resource));
                    }
                }
            }
            output.push_str(&format!(
                "Estimated total: about {} month{}\n",
                gaps.estimated_learning_time_months,
                if gaps.estimated_learning_time_months == 1 { "" } else { "s" }
            ));
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("MATCH ANALYSIS", 1));
        output.push_str(&format!(
            "Generated: {} | Reference date: {} | Processing time: {}ms\n",
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.metadata.reference_date,
            report.metadata.processing_time_ms
        ));

        match &report.body {
            ReportBody::Single { result } => {
                output.push_str(&self.format_header(
                    &format!("Resume {} vs Job {}", result.resume_id, result.job_id),
                    2,
                ));
                self.format_result(result, &mut output);
            }
            ReportBody::Ranking {
                anchor_id,
                direction,
                candidates_considered,
                results,
            } => {
                let title = match direction {
                    RankingDirection::JobsForResume => format!("Top jobs for resume {}", anchor_id),
                    RankingDirection::ResumesForJob => format!("Top candidates for job {}", anchor_id),
                };
                output.push_str(&self.format_header(&title, 2));
                output.push_str(&format!(
                    "Showing {} of {} scored\n",
                    results.len(),
                    candidates_considered
                ));

                for (rank, result) in results.iter().enumerate() {
                    let counterpart = match direction {
                        RankingDirection::JobsForResume => &result.job_id,
                        RankingDirection::ResumesForJob => &result.resume_id,
                    };
                    if self.detailed {
                        output.push_str(&self.format_header(&format!("#{} {}", rank + 1, counterpart), 2));
                        self.format_result(result, &mut output);
                    } else {
                        output.push_str(&format!(
                            "{:>3}. {:<24} {:>3}% {} missing: {}\n",
                            rank + 1,
                            counterpart,
                            percent(result.match_score),
                            self.format_score_badge(result.match_score),
                            result.skill_gap_analysis.missing_skills.len()
                        ));
                    }
                }
            }
        }

        Ok(output)
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(report)
        } else {
            serde_json::to_string(report)
        };
        rendered.map_err(|e| MatchScorerError::OutputFormatting(format!("JSON rendering failed: {}", e)))
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn format_result(result: &MatchResult, output: &mut String) {
        let explanation = &result.explanation;
        output.push_str(&format!(
            "**Match Score:** {}% ({})\n\n",
            percent(result.match_score),
            MatchStrength::from_score(result.match_score).verdict()
        ));
        output.push_str(&format!(
            "**Confidence:** {}% ({})\n\n",
            percent(explanation.confidence),
            ConfidenceLevel::from_score(explanation.confidence)
        ));
        if let Some(detail) = &result.bidirectional_score {
            output.push_str(&format!("> {}\n\n", detail.explanation));
        }

        output.push_str("| Factor | Score |\n");
        output.push_str("|--------|-------|\n");
        for factor in Factor::ALL {
            output.push_str(&format!(
                "| {} | {}% |\n",
                factor.label(),
                percent(explanation.breakdown.get(factor))
            ));
        }
        output.push('\n');

        if !explanation.key_reasons.is_empty() {
            output.push_str("#### Key Reasons\n\n");
            for reason in &explanation.key_reasons {
                output.push_str(&format!("- **{}**: {}\n", reason.factor.label(), reason.evidence));
            }
            output.push('\n');
        }

        let gaps = &result.skill_gap_analysis;
        output.push_str(&format!(
            "**Required coverage:** {}/{} ({:.0}%)\n\n",
            gaps.matched_required_skills, gaps.total_required_skills, gaps.coverage_percentage
        ));
        if !gaps.matched_skills.is_empty() {
            output.push_str(&format!("**Matched skills:** {}\n\n", gaps.matched_skills.join(", ")));
        }
        if !gaps.missing_skills.is_empty() {
            output.push_str("#### Missing Skills\n\n");
            for missing in &gaps.missing_skills {
                let sources = missing
                    .transferable_from
                    .as_ref()
                    .map(|s| format!(" (builds on {})", s.join(", ")))
                    .unwrap_or_default();
                output.push_str(&format!("- `{}` {}{}\n", missing.importance, missing.skill_name, sources));
            }
            output.push('\n');
        }
        if !gaps.recommended_learning_path.is_empty() {
            output.push_str("#### Learning Path\n\n");
            for (i, step) in gaps.recommended_learning_path.iter().enumerate() {
                output.push_str(&format!(
                    "{}. **{}** ({} weeks)",
                    i + 1,
                    step.skill_name,
                    step.estimated_time_weeks
                ));
                if !step.prerequisites.is_empty() {
                    output.push_str(&format!(" after {}", step.prerequisites.join(", ")));
                }
                output.push('\n');
                for resource in &step.resources {
                    output.push_str(&format!("   - {}\n", resource));
                }
            }
            output.push_str(&format!(
                "\nEstimated learning time: about {} months\n",
                gaps.estimated_learning_time_months
            ));
            output.push('\n');
        }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        let mut output = String::from("# Match Analysis Report\n\n");

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Reference date:** {} | **Processing time:** {}ms\n\n",
                report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.metadata.reference_date,
                report.metadata.processing_time_ms
            ));
        }

        match &report.body {
            ReportBody::Single { result } => {
                output.push_str(&format!("## Resume `{}` vs Job `{}`\n\n", result.resume_id, result.job_id));
                Self::format_result(result, &mut output);
            }
            ReportBody::Ranking {
                anchor_id,
                direction,
                candidates_considered,
                results,
            } => {
                let (title, column) = match direction {
                    RankingDirection::JobsForResume => (format!("Top jobs for resume `{}`", anchor_id), "Job"),
                    RankingDirection::ResumesForJob => (format!("Top candidates for job `{}`", anchor_id), "Resume"),
                };
                output.push_str(&format!("## {}\n\n", title));
                output.push_str(&format!("Showing {} of {} scored.\n\n", results.len(), candidates_considered));
                output.push_str(&format!("| Rank | {} | Match | Confidence | Missing |\n", column));
                output.push_str("|------|-----|-------|------------|---------|\n");
                for (rank, result) in results.iter().enumerate() {
                    let counterpart = match direction {
                        RankingDirection::JobsForResume => &result.job_id,
                        RankingDirection::ResumesForJob => &result.resume_id,
                    };
                    output.push_str(&format!(
                        "| {} | {} | {}% | {}% | {} |\n",
                        rank + 1,
                        counterpart,
                        percent(result.match_score),
                        percent(result.explanation.confidence),
                        result.skill_gap_analysis.missing_skills.len()
                    ));
                }
                output.push('\n');
            }
        }

        if self.include_metadata {
            output.push_str("---\n\n");
            output.push_str(&format!(
                "*Generated by match-scorer v{} with {} taxonomy skills*\n",
                report.metadata.tool_version, report.metadata.taxonomy_skills
            ));
        }

        Ok(output)
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(true, false),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
        }
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
        }
    }

    pub fn generate_report(&self, report: &MatchReport, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, stem: &str, timestamp: bool) -> String {
    let base_name = Path::new(stem)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("{}_match{}.txt", base_name, timestamp_suffix),
        OutputFormat::Json => format!("{}_match{}.json", base_name, timestamp_suffix),
        OutputFormat::Markdown => format!("{}_match{}.md", base_name, timestamp_suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::output::report::ReportMetadata;
    use crate::processing::analyzer::MatchEngine;
    use crate::processing::records::{Job, JobSkill, Resume, ResumeSkill};
    use crate::processing::taxonomy::SkillTaxonomy;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn sample_report() -> MatchReport {
        let as_of = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let engine = MatchEngine::new(Arc::new(SkillTaxonomy::builtin()), Config::default())
            .unwrap()
            .with_reference_date(as_of);
        let resume = Resume {
            id: "alice".to_string(),
            name: None,
            summary: None,
            skills: vec![ResumeSkill {
                name: "React".to_string(),
                proficiency: None,
                years_of_experience: None,
                last_used: None,
            }],
            experiences: vec![],
            education: vec![],
        };
        let job = Job {
            id: "frontend".to_string(),
            title: "Frontend Engineer".to_string(),
            description: None,
            skills: vec![
                JobSkill { name: "React".to_string(), required: true, importance: None },
                JobSkill { name: "Redux".to_string(), required: true, importance: None },
            ],
            domains: vec![],
            min_years_experience: None,
            max_years_experience: None,
            min_education: None,
            salary: None,
        };
        let result = engine.compute_match(&resume, &job).unwrap();
        MatchReport::single(result, ReportMetadata::new(as_of, engine.taxonomy().len(), 3))
    }

    #[test]
    fn test_console_output_without_colors() {
        let output = ConsoleFormatter::new(false, true).format_report(&sample_report()).unwrap();
        assert!(output.contains("MATCH ANALYSIS"));
        assert!(output.contains("Matched: React"));
        assert!(output.contains("Missing [HIGH] Redux (builds on React)"));
        assert!(output.contains("Learning Path"));
        assert!(output.contains("Required coverage: 1/2 (50%)"));
        assert!(output.contains("Estimated total: about "));
        assert!(!output.contains("\u{1b}["));
    }

    #[test]
    fn test_json_output_uses_contract_names() {
        let output = JsonFormatter::new(false).format_report(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        let result = &value["body"]["result"];
        assert!(result["matchScore"].is_number());
        assert!(result["explanation"]["breakdown"]["technical_skills"].is_number());
        assert_eq!(result["skillGapAnalysis"]["missingSkills"][0]["importance"], "HIGH");
        assert_eq!(value["body"]["kind"], "single");
        assert_eq!(result["skillGapAnalysis"]["totalRequiredSkills"], 2);
        assert_eq!(result["skillGapAnalysis"]["matchedRequiredSkills"], 1);
        assert_eq!(result["skillGapAnalysis"]["coveragePercentage"], 50.0);
        assert!(result["skillGapAnalysis"]["bonusSkills"].as_array().unwrap().is_empty());
        assert!(result["skillGapAnalysis"]["estimatedLearningTimeMonths"].as_u64().unwrap() >= 1);
        assert!(result["bidirectionalScore"]["isBalanced"].is_boolean());
        assert!(result["bidirectionalScore"]["matchQuality"].is_string());
    }

    #[test]
    fn test_markdown_output() {
        let output = MarkdownFormatter::new(true).format_report(&sample_report()).unwrap();
        assert!(output.starts_with("# Match Analysis Report"));
        assert!(output.contains("| Technical skills |"));
        assert!(output.contains("`HIGH` Redux"));
    }

    #[test]
    fn test_generator_dispatch_and_filenames() {
        let generator = ReportGenerator::with_options(false, false, true, false);
        for format in [OutputFormat::Console, OutputFormat::Json, OutputFormat::Markdown] {
            assert!(!generator.generate_report(&sample_report(), &format).unwrap().is_empty());
        }
        assert_eq!(suggest_filename(&OutputFormat::Json, "alice.json", false), "alice_match.json");
    }
}
