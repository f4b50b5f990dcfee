//! Weighted aggregation of factor scores into a single match score

use crate::error::{MatchScorerError, Result};
use crate::processing::factors::{Factor, FactorBreakdown};
use serde::{Deserialize, Serialize};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Per-factor weights. A valid vector is non-negative and sums to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorWeights {
    pub technical_skills: f64,
    pub experience_level: f64,
    pub domain_expertise: f64,
    pub cultural_fit: f64,
    pub education: f64,
    pub recency: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            technical_skills: 0.35,
            experience_level: 0.20,
            domain_expertise: 0.15,
            cultural_fit: 0.10,
            education: 0.10,
            recency: 0.10,
        }
    }
}

impl FactorWeights {
    pub fn get(&self, factor: Factor) -> f64 {
        match factor {
            Factor::TechnicalSkills => self.technical_skills,
            Factor::ExperienceLevel => self.experience_level,
            Factor::DomainExpertise => self.domain_expertise,
            Factor::CulturalFit => self.cultural_fit,
            Factor::Education => self.education,
            Factor::Recency => self.recency,
        }
    }

    pub fn sum(&self) -> f64 {
        Factor::ALL.iter().map(|f| self.get(*f)).sum()
    }

    pub fn validate(&self, key: &str) -> Result<()> {
        for factor in Factor::ALL {
            let weight = self.get(factor);
            if !weight.is_finite() || weight < 0.0 {
                return Err(MatchScorerError::Configuration(format!(
                    "{}.{} must be a non-negative number, got {}",
                    key,
                    factor.as_str(),
                    weight
                )));
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(MatchScorerError::Configuration(format!(
                "{} weights must sum to 1.0, got {:.6}",
                key, sum
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ScoreAggregator {
    weights: FactorWeights,
}

impl ScoreAggregator {
    pub fn new(weights: FactorWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &FactorWeights {
        &self.weights
    }

    /// Weighted sum of the breakdown, clamped to [0, 1].
    pub fn aggregate(&self, breakdown: &FactorBreakdown) -> f64 {
        let total: f64 = breakdown
            .iter()
            .map(|(factor, score)| self.weights.get(factor) * score)
            .sum();
        total.clamp(0.0, 1.0)
    }
}
