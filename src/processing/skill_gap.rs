//! Matched, missing and transferable skills for a (resume, job) pair

use crate::config::GapConfig;
use crate::processing::context::{MatchContext, WeightedJobSkill};
use crate::processing::normalizer::NormalizedSkill;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportanceTier {
    High,
    Medium,
    Low,
}

impl ImportanceTier {
    pub fn rank(self) -> u8 {
        match self {
            ImportanceTier::High => 3,
            ImportanceTier::Medium => 2,
            ImportanceTier::Low => 1,
        }
    }
}

impl std::fmt::Display for ImportanceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ImportanceTier::High => "HIGH",
            ImportanceTier::Medium => "MEDIUM",
            ImportanceTier::Low => "LOW",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingSkill {
    pub skill_name: String,
    pub importance: ImportanceTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transferable_from: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferableSkill {
    pub candidate_skill: String,
    pub job_skill: String,
    pub transferability_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPathStep {
    pub skill_name: String,
    pub estimated_time_weeks: u32,
    pub prerequisites: Vec<String>,
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGapAnalysis {
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<MissingSkill>,
    pub transferable_skills: Vec<TransferableSkill>,
    pub recommended_learning_path: Vec<LearningPathStep>,
    pub total_required_skills: usize,
    pub matched_required_skills: usize,
    /// Share of required skills the candidate holds, 0 to 100. A job that
    /// requires nothing reports 0, like its technical-skills factor.
    pub coverage_percentage: f64,
    /// Candidate skills the job does not ask for.
    pub bonus_skills: Vec<String>,
    /// Whole learning path, rounded up to months.
    pub estimated_learning_time_months: u32,
}

/// A job skill the candidate lacks, with what it could be learned from.
#[derive(Debug, Clone)]
pub struct SkillGap<'t> {
    pub skill: NormalizedSkill<'t>,
    pub tier: ImportanceTier,
    pub importance: f64,
    /// Candidate skills above the transfer threshold, most similar first.
    pub transferable_from: Vec<(NormalizedSkill<'t>, f64)>,
}

impl SkillGap<'_> {
    pub fn best_similarity(&self) -> f64 {
        self.transferable_from
            .iter()
            .map(|(_, similarity)| *similarity)
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GapReport<'t> {
    pub matched: Vec<NormalizedSkill<'t>>,
    pub missing: Vec<SkillGap<'t>>,
    pub transferable: Vec<TransferableSkill>,
    pub bonus: Vec<NormalizedSkill<'t>>,
    pub required_total: usize,
    pub required_matched: usize,
}

impl GapReport<'_> {
    pub fn coverage_percentage(&self) -> f64 {
        if self.required_total == 0 {
            return 0.0;
        }
        self.required_matched as f64 / self.required_total as f64 * 100.0
    }

    pub fn into_analysis(self, learning_path: Vec<LearningPathStep>) -> SkillGapAnalysis {
        let coverage_percentage = self.coverage_percentage();
        let total_weeks: u32 = learning_path.iter().map(|step| step.estimated_time_weeks).sum();

        SkillGapAnalysis {
            matched_skills: self
                .matched
                .iter()
                .map(|s| s.display_name().to_string())
                .collect(),
            missing_skills: self
                .missing
                .iter()
                .map(|gap| MissingSkill {
                    skill_name: gap.skill.display_name().to_string(),
                    importance: gap.tier,
                    transferable_from: if gap.transferable_from.is_empty() {
                        None
                    } else {
                        Some(
                            gap.transferable_from
                                .iter()
                                .map(|(s, _)| s.display_name().to_string())
                                .collect(),
                        )
                    },
                })
                .collect(),
            transferable_skills: self.transferable,
            recommended_learning_path: learning_path,
            total_required_skills: self.required_total,
            matched_required_skills: self.required_matched,
            coverage_percentage,
            bonus_skills: self
                .bonus
                .iter()
                .map(|s| s.display_name().to_string())
                .collect(),
            estimated_learning_time_months: weeks_to_months(total_weeks),
        }
    }
}

pub struct SkillGapAnalyzer<'c> {
    config: &'c GapConfig,
}

impl<'c> SkillGapAnalyzer<'c> {
    pub fn new(config: &'c GapConfig) -> Self {
        Self { config }
    }

    /// Tier for a job skill, or `None` when an optional skill is too minor
    /// to be part of the gap analysis.
    pub fn tier(&self, job_skill: &WeightedJobSkill) -> Option<ImportanceTier> {
        if job_skill.required {
            Some(ImportanceTier::High)
        } else if job_skill.importance >= self.config.medium_importance_threshold {
            Some(ImportanceTier::Medium)
        } else if job_skill.importance >= self.config.consider_optional_above {
            Some(ImportanceTier::Low)
        } else {
            None
        }
    }

    pub fn analyze<'t>(&self, ctx: &MatchContext<'_, 't>) -> GapReport<'t> {
        let mut report = GapReport::default();

        for job_skill in &ctx.job_skills {
            let held = ctx.candidate(job_skill.skill.id()).is_some();
            if job_skill.required {
                report.required_total += 1;
                if held {
                    report.required_matched += 1;
                }
            }

            let Some(tier) = self.tier(job_skill) else {
                continue;
            };
            if held {
                report.matched.push(job_skill.skill.clone());
                continue;
            }

            let mut sources: Vec<(NormalizedSkill<'t>, f64)> = ctx
                .candidate_skills
                .iter()
                .map(|c| {
                    let similarity = ctx.taxonomy.similarity(c.skill.id(), job_skill.skill.id());
                    (c.skill.clone(), similarity)
                })
                .filter(|(_, similarity)| *similarity > self.config.transfer_threshold)
                .collect();
            sources.sort_by(|a, b| {
                b.1.total_cmp(&a.1)
                    .then_with(|| a.0.display_name().cmp(b.0.display_name()))
            });
            sources.truncate(self.config.max_transferable_from);

            report.missing.push(SkillGap {
                skill: job_skill.skill.clone(),
                tier,
                importance: job_skill.importance,
                transferable_from: sources,
            });
        }

        report.bonus = ctx
            .candidate_skills
            .iter()
            .filter(|c| ctx.job_skill(c.skill.id()).is_none())
            .map(|c| c.skill.clone())
            .collect();
        report.transferable = self.transferable_pairs(ctx);
        report
    }

    /// Every (candidate, job) pair of distinct skills above the transfer
    /// threshold, across all job skills.
    fn transferable_pairs(&self, ctx: &MatchContext) -> Vec<TransferableSkill> {
        let mut pairs: Vec<TransferableSkill> = Vec::new();
        for job_skill in &ctx.job_skills {
            for candidate in &ctx.candidate_skills {
                if candidate.skill.id() == job_skill.skill.id() {
                    continue;
                }
                let similarity = ctx
                    .taxonomy
                    .similarity(candidate.skill.id(), job_skill.skill.id());
                if similarity > self.config.transfer_threshold {
                    pairs.push(TransferableSkill {
                        candidate_skill: candidate.skill.display_name().to_string(),
                        job_skill: job_skill.skill.display_name().to_string(),
                        transferability_score: similarity,
                    });
                }
            }
        }
        pairs.sort_by(|a, b| {
            b.transferability_score
                .total_cmp(&a.transferability_score)
                .then_with(|| a.job_skill.cmp(&b.job_skill))
                .then_with(|| a.candidate_skill.cmp(&b.candidate_skill))
        });
        pairs
    }
}

/// 52 weeks to 12 months, rounded up so any learning counts as a month.
fn weeks_to_months(weeks: u32) -> u32 {
    (weeks * 12).div_ceil(52)
}

/// Orders gaps by descending tier, then descending numeric importance.
pub fn compare_importance(a: &SkillGap, b: &SkillGap) -> Ordering {
    b.tier
        .rank()
        .cmp(&a.tier.rank())
        .then_with(|| b.importance.total_cmp(&a.importance))
}
