//! Human-readable key reasons behind a match score

use crate::processing::factors::{Factor, FactorBreakdown, FactorEvidence};
use crate::processing::skill_gap::TransferableSkill;
use serde::{Deserialize, Serialize};

const MAX_NAMES_LISTED: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyReason {
    pub factor: Factor,
    pub score: f64,
    pub evidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchExplanation {
    pub overall_score: f64,
    pub breakdown: FactorBreakdown,
    pub key_reasons: Vec<KeyReason>,
    pub confidence: f64,
}

pub struct ExplanationBuilder {
    max_reasons: usize,
}

impl ExplanationBuilder {
    pub fn new(max_reasons: usize) -> Self {
        Self { max_reasons }
    }

    pub fn build(
        &self,
        overall_score: f64,
        breakdown: &FactorBreakdown,
        evidence: &FactorEvidence,
        transferable: &[TransferableSkill],
        confidence: f64,
    ) -> MatchExplanation {
        let key_reasons = self
            .select_factors(breakdown)
            .into_iter()
            .map(|factor| KeyReason {
                factor,
                score: breakdown.get(factor),
                evidence: describe(factor, breakdown.get(factor), evidence, transferable),
            })
            .collect();

        MatchExplanation {
            overall_score,
            breakdown: *breakdown,
            key_reasons,
            confidence,
        }
    }

    /// Alternates strongest and weakest factors so both strengths and gaps surface.
    pub fn select_factors(&self, breakdown: &FactorBreakdown) -> Vec<Factor> {
        let mut ranked: Vec<(Factor, f64)> = breakdown.iter().collect();
        // Stable sort keeps the fixed factor order among equal scores.
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut selected = Vec::new();
        let (mut high, mut low) = (0usize, ranked.len());
        while selected.len() < self.max_reasons && high < low {
            selected.push(ranked[high].0);
            high += 1;
            if selected.len() < self.max_reasons && high < low {
                low -= 1;
                selected.push(ranked[low].0);
            }
        }
        selected
    }
}

fn list_names(names: &[String]) -> String {
    if names.len() <= MAX_NAMES_LISTED {
        names.join(", ")
    } else {
        format!(
            "{} and {} more",
            names[..MAX_NAMES_LISTED].join(", "),
            names.len() - MAX_NAMES_LISTED
        )
    }
}

fn format_years(years: f64) -> String {
    format!("{:.1}", years)
}

fn describe(
    factor: Factor,
    score: f64,
    evidence: &FactorEvidence,
    transferable: &[TransferableSkill],
) -> String {
    match factor {
        Factor::TechnicalSkills => describe_skills(evidence, transferable),
        Factor::ExperienceLevel => describe_experience(score, evidence),
        Factor::DomainExpertise => describe_domains(evidence),
        Factor::CulturalFit => {
            if evidence.shared_keywords.is_empty() {
                "No overlapping themes between the job description and the resume summary".to_string()
            } else {
                format!("Shared themes: {}", evidence.shared_keywords.join(", "))
            }
        }
        Factor::Education => match (evidence.required_degree, evidence.highest_degree) {
            (None, _) => "No minimum education level required".to_string(),
            (Some(required), None) => format!("Requires {}; no education listed", required),
            (Some(required), Some(highest)) if highest.rank() >= required.rank() => {
                format!("Holds {}, meeting the {} requirement", highest, required)
            }
            (Some(required), Some(highest)) => {
                format!("Holds {}, below the required {}", highest, required)
            }
        },
        Factor::Recency => {
            let mut parts = Vec::new();
            if !evidence.recent_skills.is_empty() {
                parts.push(format!("Recently used: {}", list_names(&evidence.recent_skills)));
            }
            if !evidence.stale_skills.is_empty() {
                parts.push(format!("Not used recently: {}", list_names(&evidence.stale_skills)));
            }
            if parts.is_empty() {
                if evidence.matched_required.is_empty() && evidence.matched_optional.is_empty() {
                    "No matched skills to date".to_string()
                } else {
                    "No usage dates for matched skills; assumed current".to_string()
                }
            } else {
                parts.join("; ")
            }
        }
    }
}

fn describe_skills(evidence: &FactorEvidence, transferable: &[TransferableSkill]) -> String {
    let required_total = evidence.matched_required.len() + evidence.missing_required.len();
    let optional_total = evidence.matched_optional.len() + evidence.missing_optional.len();
    if required_total + optional_total == 0 {
        return "Job lists no skills to compare".to_string();
    }

    let mut parts = Vec::new();
    if required_total > 0 {
        let mut text = format!(
            "Has {} of {} required skills",
            evidence.matched_required.len(),
            required_total
        );
        if !evidence.matched_required.is_empty() {
            text.push_str(&format!(" ({})", list_names(&evidence.matched_required)));
        }
        parts.push(text);
    }
    if !evidence.missing_required.is_empty() {
        parts.push(format!("missing {}", list_names(&evidence.missing_required)));
    }
    if !evidence.matched_optional.is_empty() {
        parts.push(format!("plus optional {}", list_names(&evidence.matched_optional)));
    }
    if let Some(pair) = transferable.first() {
        parts.push(format!(
            "{} transfers to {} ({:.0}%)",
            pair.candidate_skill,
            pair.job_skill,
            pair.transferability_score * 100.0
        ));
    }
    parts.join("; ")
}

fn describe_experience(score: f64, evidence: &FactorEvidence) -> String {
    if evidence.experience_count == 0 {
        return "No work history provided".to_string();
    }
    let years = format_years(evidence.relevant_years);
    let range = match (evidence.min_years, evidence.max_years) {
        (Some(min), Some(max)) => format!("the {}-{} years requested", format_years(min), format_years(max)),
        (Some(min), None) => format!("at least {} years requested", format_years(min)),
        (None, Some(max)) => format!("up to {} years requested", format_years(max)),
        (None, None) => return format!("{} years of relevant experience; no range requested", years),
    };
    let verdict = if score >= 1.0 {
        "within"
    } else if evidence.min_years.map_or(false, |min| evidence.relevant_years < min) {
        "short of"
    } else {
        "beyond"
    };
    format!("{} years of relevant experience, {} {}", years, verdict, range)
}

fn describe_domains(evidence: &FactorEvidence) -> String {
    if evidence.matched_domains.is_empty() && evidence.missing_domains.is_empty() {
        return "Job lists no domains".to_string();
    }
    let mut parts = Vec::new();
    if !evidence.matched_domains.is_empty() {
        parts.push(format!("Experience in {}", list_names(&evidence.matched_domains)));
    }
    if !evidence.missing_domains.is_empty() {
        parts.push(format!("no experience in {}", list_names(&evidence.missing_domains)));
    }
    parts.join("; ")
}
