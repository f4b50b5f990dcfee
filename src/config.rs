//! Configuration management for the match scorer

use crate::error::{MatchScorerError, Result};
use crate::processing::aggregator::FactorWeights;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scoring: ScoringConfig,
    pub factors: FactorConfig,
    pub gaps: GapConfig,
    pub learning: LearningConfig,
    pub confidence: ConfidenceConfig,
    pub explanation: ExplanationConfig,
    pub output: OutputConfig,
}

/// Weight vectors for the two directional aggregations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub job_to_resume: FactorWeights,
    pub resume_to_job: FactorWeights,
    /// Largest directional gap for which a match still counts as balanced.
    pub balance_tolerance: f64,
}

/// Decay constants and penalties used by the six factor functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorConfig {
    /// Multiplier applied to an optional skill's importance.
    pub optional_skill_weight: f64,
    /// Importance given to a job skill never mentioned in the description.
    pub unmentioned_skill_importance: f64,
    /// How much importance a skill loses when first mentioned at the very end.
    pub mention_position_decay: f64,
    /// Years below the minimum over which experience decays linearly to 0.
    pub experience_tolerance_years: f64,
    pub overqualification_decay_per_year: f64,
    pub overqualification_floor: f64,
    pub domain_recency_half_life_years: f64,
    pub education_penalty_per_level: f64,
    pub education_surplus_penalty_per_level: f64,
    pub education_surplus_floor: f64,
    pub recency_half_life_years: f64,
    /// Jaro-Winkler similarity needed for a fuzzy alias match.
    pub fuzzy_match_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapConfig {
    /// Minimum taxonomy similarity for a transferable pair.
    pub transfer_threshold: f64,
    pub max_transferable_from: usize,
    /// Optional skills at or above this importance are part of the gap analysis.
    pub consider_optional_above: f64,
    /// Optional skills at or above this importance are MEDIUM, the rest LOW.
    pub medium_importance_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    pub weeks_per_difficulty_unit: f64,
    pub max_transfer_discount: f64,
    pub min_weeks: u32,
}

/// Completeness weights per record section. Each side sums to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub resume_skills_weight: f64,
    pub resume_experience_weight: f64,
    pub resume_education_weight: f64,
    pub job_skills_weight: f64,
    pub job_description_weight: f64,
    /// Credited when the job states an experience range or a salary.
    pub job_range_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplanationConfig {
    pub max_key_reasons: usize,
    pub include_bidirectional_detail: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            job_to_resume: FactorWeights::default(),
            resume_to_job: FactorWeights::default(),
            balance_tolerance: 0.15,
        }
    }
}

impl Default for FactorConfig {
    fn default() -> Self {
        Self {
            optional_skill_weight: 0.5,
            unmentioned_skill_importance: 0.5,
            mention_position_decay: 0.4,
            experience_tolerance_years: 2.0,
            overqualification_decay_per_year: 0.05,
            overqualification_floor: 0.5,
            domain_recency_half_life_years: 5.0,
            education_penalty_per_level: 0.25,
            education_surplus_penalty_per_level: 0.1,
            education_surplus_floor: 0.6,
            recency_half_life_years: 3.0,
            fuzzy_match_threshold: 0.94,
        }
    }
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            transfer_threshold: 0.4,
            max_transferable_from: 3,
            consider_optional_above: 0.25,
            medium_importance_threshold: 0.6,
        }
    }
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            weeks_per_difficulty_unit: 6.0,
            max_transfer_discount: 0.5,
            min_weeks: 1,
        }
    }
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            resume_skills_weight: 0.4,
            resume_experience_weight: 0.35,
            resume_education_weight: 0.25,
            job_skills_weight: 0.4,
            job_description_weight: 0.3,
            job_range_weight: 0.3,
        }
    }
}

impl Default for ExplanationConfig {
    fn default() -> Self {
        Self {
            max_key_reasons: 5,
            include_bidirectional_detail: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Console,
            detailed: false,
            color_output: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| MatchScorerError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| MatchScorerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("match-scorer")
            .join("config.toml")
    }

    /// Reject weight vectors that do not sum to 1, thresholds outside [0, 1]
    /// and negative penalties.
    pub fn validate(&self) -> Result<()> {
        self.scoring.job_to_resume.validate("scoring.job_to_resume")?;
        self.scoring.resume_to_job.validate("scoring.resume_to_job")?;
        self.confidence.validate()?;

        let unit_values = [
            ("factors.optional_skill_weight", self.factors.optional_skill_weight),
            ("factors.unmentioned_skill_importance", self.factors.unmentioned_skill_importance),
            ("factors.mention_position_decay", self.factors.mention_position_decay),
            ("factors.overqualification_floor", self.factors.overqualification_floor),
            ("factors.education_surplus_floor", self.factors.education_surplus_floor),
            ("factors.fuzzy_match_threshold", self.factors.fuzzy_match_threshold),
            ("gaps.transfer_threshold", self.gaps.transfer_threshold),
            ("gaps.consider_optional_above", self.gaps.consider_optional_above),
            ("gaps.medium_importance_threshold", self.gaps.medium_importance_threshold),
            ("learning.max_transfer_discount", self.learning.max_transfer_discount),
            ("scoring.balance_tolerance", self.scoring.balance_tolerance),
        ];
        for (key, value) in unit_values {
            if !(0.0..=1.0).contains(&value) {
                return Err(MatchScorerError::Configuration(format!(
                    "{} must lie in [0, 1], got {}",
                    key, value
                )));
            }
        }

        // A negative penalty would lift education and experience scores above 1.
        let non_negative_values = [
            ("factors.overqualification_decay_per_year", self.factors.overqualification_decay_per_year),
            ("factors.education_penalty_per_level", self.factors.education_penalty_per_level),
            ("factors.education_surplus_penalty_per_level", self.factors.education_surplus_penalty_per_level),
        ];
        for (key, value) in non_negative_values {
            if value < 0.0 || !value.is_finite() {
                return Err(MatchScorerError::Configuration(format!(
                    "{} must not be negative, got {}",
                    key, value
                )));
            }
        }

        let positive_values = [
            ("factors.experience_tolerance_years", self.factors.experience_tolerance_years),
            ("factors.domain_recency_half_life_years", self.factors.domain_recency_half_life_years),
            ("factors.recency_half_life_years", self.factors.recency_half_life_years),
            ("learning.weeks_per_difficulty_unit", self.learning.weeks_per_difficulty_unit),
        ];
        for (key, value) in positive_values {
            if value <= 0.0 || !value.is_finite() {
                return Err(MatchScorerError::Configuration(format!(
                    "{} must be positive, got {}",
                    key, value
                )));
            }
        }

        if self.learning.min_weeks == 0 {
            return Err(MatchScorerError::Configuration(
                "learning.min_weeks must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl ConfidenceConfig {
    pub fn validate(&self) -> Result<()> {
        let sides = [
            (
                "confidence.resume_*_weight",
                [self.resume_skills_weight, self.resume_experience_weight, self.resume_education_weight],
            ),
            (
                "confidence.job_*_weight",
                [self.job_skills_weight, self.job_description_weight, self.job_range_weight],
            ),
        ];
        for (key, weights) in sides {
            if weights.iter().any(|w| !(0.0..=1.0).contains(w)) {
                return Err(MatchScorerError::Configuration(format!(
                    "{} must each lie in [0, 1]",
                    key
                )));
            }
            let sum: f64 = weights.iter().sum();
            if (sum - 1.0).abs() > 1e-6 {
                return Err(MatchScorerError::Configuration(format!(
                    "{} must sum to 1, got {:.4}",
                    key, sum
                )));
            }
        }
        Ok(())
    }
}
