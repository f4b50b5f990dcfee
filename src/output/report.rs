//! Report structures wrapping engine results for presentation

use crate::processing::analyzer::MatchResult;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    pub metadata: ReportMetadata,
    pub body: ReportBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ReportBody {
    /// One resume scored against one job.
    Single { result: Box<MatchResult> },
    /// One anchor record scored against many counterparts.
    #[serde(rename_all = "camelCase")]
    Ranking {
        anchor_id: String,
        direction: RankingDirection,
        candidates_considered: usize,
        results: Vec<MatchResult>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RankingDirection {
    /// Jobs ranked for one resume.
    JobsForResume,
    /// Resumes ranked for one job.
    ResumesForJob,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub reference_date: NaiveDate,
    pub tool_version: String,
    pub taxonomy_skills: usize,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStrength {
    Excellent,
    Strong,
    Moderate,
    Weak,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl MatchStrength {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 0.85 => MatchStrength::Excellent,
            s if s >= 0.7 => MatchStrength::Strong,
            s if s >= 0.5 => MatchStrength::Moderate,
            s if s >= 0.3 => MatchStrength::Weak,
            _ => MatchStrength::Poor,
        }
    }

    pub fn verdict(self) -> &'static str {
        match self {
            MatchStrength::Excellent => "Excellent match in both directions",
            MatchStrength::Strong => "Strong match with minor gaps",
            MatchStrength::Moderate => "Reasonable match; review the skill gaps",
            MatchStrength::Weak => "Weak match; significant gaps to close",
            MatchStrength::Poor => "Poor match",
        }
    }
}

impl ConfidenceLevel {
    pub fn from_score(confidence: f64) -> Self {
        if confidence >= 0.75 {
            ConfidenceLevel::High
        } else if confidence >= 0.4 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low (sparse input data)",
        };
        f.write_str(label)
    }
}

impl ReportMetadata {
    pub fn new(reference_date: NaiveDate, taxonomy_skills: usize, processing_time_ms: u64) -> Self {
        Self {
            generated_at: Utc::now(),
            reference_date,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            taxonomy_skills,
            processing_time_ms,
        }
    }
}

impl MatchReport {
    pub fn single(result: MatchResult, metadata: ReportMetadata) -> Self {
        Self {
            metadata,
            body: ReportBody::Single {
                result: Box::new(result),
            },
        }
    }

    pub fn ranking(
        anchor_id: impl Into<String>,
        direction: RankingDirection,
        candidates_considered: usize,
        results: Vec<MatchResult>,
        metadata: ReportMetadata,
    ) -> Self {
        Self {
            metadata,
            body: ReportBody::Ranking {
                anchor_id: anchor_id.into(),
                direction,
                candidates_considered,
                results,
            },
        }
    }

    pub fn results(&self) -> Vec<&MatchResult> {
        match &self.body {
            ReportBody::Single { result } => vec![result.as_ref()],
            ReportBody::Ranking { results, .. } => results.iter().collect(),
        }
    }
}

/// Whole-number percentage for display.
pub fn percent(score: f64) -> u8 {
    (score.clamp(0.0, 1.0) * 100.0).round() as u8
}
