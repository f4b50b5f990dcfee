//! Two-sided fit: the job's view of the candidate and the candidate's view of the job

use crate::processing::aggregator::ScoreAggregator;
use crate::processing::factors::FactorBreakdown;
use serde::{Deserialize, Serialize};

/// Qualitative band of the combined score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl MatchQuality {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.85 {
            MatchQuality::Excellent
        } else if score >= 0.70 {
            MatchQuality::Good
        } else if score >= 0.55 {
            MatchQuality::Fair
        } else {
            MatchQuality::Poor
        }
    }
}

impl std::fmt::Display for MatchQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MatchQuality::Excellent => "EXCELLENT",
            MatchQuality::Good => "GOOD",
            MatchQuality::Fair => "FAIR",
            MatchQuality::Poor => "POOR",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidirectionalScore {
    pub job_to_resume: f64,
    pub resume_to_job: f64,
    pub harmonic_mean: f64,
    /// Both directions within the configured balance tolerance of each other.
    pub is_balanced: bool,
    pub match_quality: MatchQuality,
    pub explanation: String,
}

/// Harmonic mean of two scores in [0, 1]; 0 when both are 0.
pub fn harmonic_mean(a: f64, b: f64) -> f64 {
    if a + b <= 0.0 {
        return 0.0;
    }
    (2.0 * a * b / (a + b)).clamp(0.0, 1.0)
}

pub struct BidirectionalCombiner {
    job_to_resume: ScoreAggregator,
    resume_to_job: ScoreAggregator,
    balance_tolerance: f64,
}

impl BidirectionalCombiner {
    pub fn new(job_to_resume: ScoreAggregator, resume_to_job: ScoreAggregator, balance_tolerance: f64) -> Self {
        Self {
            job_to_resume,
            resume_to_job,
            balance_tolerance,
        }
    }

    pub fn combine(&self, forward: &FactorBreakdown, reverse: &FactorBreakdown) -> BidirectionalScore {
        let job_to_resume = self.job_to_resume.aggregate(forward);
        let resume_to_job = self.resume_to_job.aggregate(reverse);
        let harmonic_mean = harmonic_mean(job_to_resume, resume_to_job);
        let gap = job_to_resume - resume_to_job;

        BidirectionalScore {
            job_to_resume,
            resume_to_job,
            harmonic_mean,
            is_balanced: gap.abs() <= self.balance_tolerance,
            match_quality: MatchQuality::from_score(harmonic_mean),
            explanation: self.describe(job_to_resume, resume_to_job, harmonic_mean),
        }
    }

    fn describe(&self, job_to_resume: f64, resume_to_job: f64, harmonic_mean: f64) -> String {
        let gap = job_to_resume - resume_to_job;
        let balance = if gap > self.balance_tolerance {
            "the candidate meets the job's needs better than the job suits the candidate's profile"
        } else if gap < -self.balance_tolerance {
            "the job suits the candidate's profile better than the candidate meets its needs"
        } else {
            "fit is balanced in both directions"
        };
        format!(
            "Job-to-candidate {:.0}%, candidate-to-job {:.0}%, combined {:.0}%: {}",
            job_to_resume * 100.0,
            resume_to_job * 100.0,
            harmonic_mean * 100.0,
            balance
        )
    }
}
