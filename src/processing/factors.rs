//! The six independent factor scores for a (resume, job) pair.
//!
//! Every score lies in [0, 1], every function is total, and a factor whose
//! input collection is empty scores exactly 0.

use crate::config::FactorConfig;
use crate::processing::context::MatchContext;
use crate::processing::records::DegreeLevel;
use crate::processing::text_processor::TextProcessor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    TechnicalSkills,
    ExperienceLevel,
    DomainExpertise,
    CulturalFit,
    Education,
    Recency,
}

impl Factor {
    pub const ALL: [Factor; 6] = [
        Factor::TechnicalSkills,
        Factor::ExperienceLevel,
        Factor::DomainExpertise,
        Factor::CulturalFit,
        Factor::Education,
        Factor::Recency,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Factor::TechnicalSkills => "technical_skills",
            Factor::ExperienceLevel => "experience_level",
            Factor::DomainExpertise => "domain_expertise",
            Factor::CulturalFit => "cultural_fit",
            Factor::Education => "education",
            Factor::Recency => "recency",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Factor::TechnicalSkills => "Technical skills",
            Factor::ExperienceLevel => "Experience level",
            Factor::DomainExpertise => "Domain expertise",
            Factor::CulturalFit => "Cultural fit",
            Factor::Education => "Education",
            Factor::Recency => "Skill recency",
        }
    }
}

impl std::fmt::Display for Factor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed six-field record, one score per factor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorBreakdown {
    pub technical_skills: f64,
    pub experience_level: f64,
    pub domain_expertise: f64,
    pub cultural_fit: f64,
    pub education: f64,
    pub recency: f64,
}

impl FactorBreakdown {
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

    pub fn iter(&self) -> impl Iterator<Item = (Factor, f64)> + '_ {
        Factor::ALL.into_iter().map(move |f| (f, self.get(f)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// How well the candidate satisfies the job.
    JobToResume,
    /// How well the job suits the candidate.
    ResumeToJob,
}

/// Concrete facts behind the forward scores, used to write key reasons.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactorEvidence {
    pub matched_required: Vec<String>,
    pub matched_optional: Vec<String>,
    pub missing_required: Vec<String>,
    pub missing_optional: Vec<String>,
    pub relevant_years: f64,
    pub experience_count: usize,
    pub min_years: Option<f64>,
    pub max_years: Option<f64>,
    pub matched_domains: Vec<String>,
    pub missing_domains: Vec<String>,
    pub shared_keywords: Vec<String>,
    pub highest_degree: Option<DegreeLevel>,
    pub required_degree: Option<DegreeLevel>,
    pub recent_skills: Vec<String>,
    pub stale_skills: Vec<String>,
}

const MAX_SHARED_KEYWORDS: usize = 5;

pub struct FactorScorer<'c> {
    config: &'c FactorConfig,
    text: &'c TextProcessor,
}

impl<'c> FactorScorer<'c> {
    pub fn new(config: &'c FactorConfig, text: &'c TextProcessor) -> Self {
        Self { config, text }
    }

    pub fn score(&self, ctx: &MatchContext, direction: Direction) -> FactorBreakdown {
        match direction {
            Direction::JobToResume => FactorBreakdown {
                technical_skills: self.technical_skills(ctx),
                experience_level: self.experience_level(ctx),
                domain_expertise: self.domain_expertise(ctx),
                cultural_fit: self.cultural_fit(ctx),
                education: self.education(ctx),
                recency: self.recency(ctx),
            },
            Direction::ResumeToJob => FactorBreakdown {
                technical_skills: self.skill_usage(ctx),
                experience_level: self.seniority_fit(ctx),
                domain_expertise: self.domain_continuity(ctx),
                cultural_fit: self.cultural_fit(ctx),
                education: self.education_fit(ctx),
                recency: self.current_skill_usage(ctx),
            },
        }
    }

    /// Importance-weighted share of the job's skills the candidate holds.
    pub fn technical_skills(&self, ctx: &MatchContext) -> f64 {
        let total: f64 = ctx.job_skills.iter().map(|j| j.weight).sum();
        if total <= 0.0 {
            return 0.0;
        }
        let matched: f64 = ctx
            .job_skills
            .iter()
            .filter(|j| ctx.candidate(j.skill.id()).is_some())
            .map(|j| j.weight)
            .sum();
        (matched / total).clamp(0.0, 1.0)
    }

    /// Years in roles whose domains overlap the job's. Untagged roles, or an
    /// untagged job, count in full.
    pub fn relevant_years(&self, ctx: &MatchContext) -> f64 {
        ctx.resume
            .experiences
            .iter()
            .filter(|exp| {
                ctx.job.domains.is_empty()
                    || exp.domains.is_empty()
                    || ctx.job.domains.iter().any(|d| exp.has_domain(d))
            })
            .map(|exp| exp.duration_years(ctx.as_of))
            .sum()
    }

    pub fn experience_level(&self, ctx: &MatchContext) -> f64 {
        if ctx.resume.experiences.is_empty() {
            return 0.0;
        }
        let years = self.relevant_years(ctx);
        let (min, max) = experience_range(ctx);

        let score = if years < min {
            1.0 - (min - years) / self.config.experience_tolerance_years
        } else if years > max {
            (1.0 - self.config.overqualification_decay_per_year * (years - max))
                .max(self.config.overqualification_floor)
        } else {
            1.0
        };
        score.clamp(0.0, 1.0)
    }

    /// Average over the job's domains of the best recency-weighted experience
    /// in that domain.
    pub fn domain_expertise(&self, ctx: &MatchContext) -> f64 {
        let domains = distinct_domains(&ctx.job.domains);
        if domains.is_empty() {
            return 0.0;
        }

        let total: f64 = domains
            .iter()
            .map(|domain| {
                ctx.resume
                    .experiences
                    .iter()
                    .filter(|exp| exp.has_domain(domain))
                    .map(|exp| {
                        let since = exp.years_since_end(ctx.as_of).unwrap_or(0.0);
                        half_life_decay(since, self.config.domain_recency_half_life_years)
                    })
                    .fold(0.0_f64, f64::max)
            })
            .sum();
        (total / domains.len() as f64).clamp(0.0, 1.0)
    }

    pub fn cultural_fit(&self, ctx: &MatchContext) -> f64 {
        let (job_words, resume_words) = self.keyword_sets(ctx);
        TextProcessor::jaccard(&job_words, &resume_words)
    }

    pub fn education(&self, ctx: &MatchContext) -> f64 {
        let Some(required) = ctx.job.min_education else {
            return 1.0;
        };
        let Some(highest) = ctx.resume.highest_degree() else {
            return 0.0;
        };
        let deficit = required.rank().saturating_sub(highest.rank());
        (1.0 - self.config.education_penalty_per_level * f64::from(deficit)).max(0.0)
    }

    /// Importance-weighted average freshness of the matched skills.
    pub fn recency(&self, ctx: &MatchContext) -> f64 {
        let mut matched_any = false;
        let mut weighted = 0.0;
        let mut weights = 0.0;

        for job_skill in &ctx.job_skills {
            let Some(candidate) = ctx.candidate(job_skill.skill.id()) else {
                continue;
            };
            matched_any = true;
            if let Some(since) = candidate.years_since_used {
                weighted += job_skill.importance
                    * half_life_decay(since, self.config.recency_half_life_years);
                weights += job_skill.importance;
            }
        }

        if !matched_any {
            0.0
        } else if weights <= 0.0 {
            1.0
        } else {
            (weighted / weights).clamp(0.0, 1.0)
        }
    }

    /// Proficiency-weighted share of the candidate's skills the job uses.
    fn skill_usage(&self, ctx: &MatchContext) -> f64 {
        let total: f64 = ctx
            .candidate_skills
            .iter()
            .map(|c| c.proficiency.weight())
            .sum();
        if total <= 0.0 {
            return 0.0;
        }
        let used: f64 = ctx
            .candidate_skills
            .iter()
            .filter(|c| ctx.job_skill(c.skill.id()).is_some())
            .map(|c| c.proficiency.weight())
            .sum();
        (used / total).clamp(0.0, 1.0)
    }

    /// Seniority fit from the candidate's side: a job well below their level
    /// falls off quickly, a stretch role only gently.
    fn seniority_fit(&self, ctx: &MatchContext) -> f64 {
        if ctx.resume.experiences.is_empty() {
            return 0.0;
        }
        let years = self.relevant_years(ctx);
        let (min, max) = experience_range(ctx);

        let score = if years > max {
            1.0 - (years - max) / self.config.experience_tolerance_years
        } else if years < min {
            (1.0 - self.config.overqualification_decay_per_year * (min - years))
                .max(self.config.overqualification_floor)
        } else {
            1.0
        };
        score.clamp(0.0, 1.0)
    }

    /// Share of the candidate's experience domains the job continues.
    fn domain_continuity(&self, ctx: &MatchContext) -> f64 {
        let candidate_domains = distinct_domains(
            ctx.resume
                .experiences
                .iter()
                .flat_map(|exp| exp.domains.iter()),
        );
        if candidate_domains.is_empty() {
            return 0.0;
        }
        let job_domains = distinct_domains(&ctx.job.domains);
        let shared = candidate_domains.intersection(&job_domains).count();
        shared as f64 / candidate_domains.len() as f64
    }

    /// Penalizes surplus qualifications mildly and deficits like the forward side.
    fn education_fit(&self, ctx: &MatchContext) -> f64 {
        let Some(required) = ctx.job.min_education else {
            return 1.0;
        };
        let Some(highest) = ctx.resume.highest_degree() else {
            return 0.0;
        };
        if highest.rank() >= required.rank() {
            let surplus = f64::from(highest.rank() - required.rank());
            (1.0 - self.config.education_surplus_penalty_per_level * surplus)
                .max(self.config.education_surplus_floor)
        } else {
            let deficit = f64::from(required.rank() - highest.rank());
            (1.0 - self.config.education_penalty_per_level * deficit).max(0.0)
        }
    }

    /// Freshness-weighted share of the candidate's skills the job uses.
    /// Undated skills count at full weight.
    fn current_skill_usage(&self, ctx: &MatchContext) -> f64 {
        let freshness = |since: Option<f64>| {
            since.map_or(1.0, |s| half_life_decay(s, self.config.recency_half_life_years))
        };
        let total: f64 = ctx
            .candidate_skills
            .iter()
            .map(|c| freshness(c.years_since_used))
            .sum();
        if total <= 0.0 {
            return 0.0;
        }
        let used: f64 = ctx
            .candidate_skills
            .iter()
            .filter(|c| ctx.job_skill(c.skill.id()).is_some())
            .map(|c| freshness(c.years_since_used))
            .sum();
        (used / total).clamp(0.0, 1.0)
    }

    fn keyword_sets(&self, ctx: &MatchContext) -> (BTreeSet<String>, BTreeSet<String>) {
        let job_text = ctx.job.description.as_deref().unwrap_or("");
        let resume_text = match ctx.resume.summary.as_deref() {
            Some(summary) if !summary.trim().is_empty() => summary.to_string(),
            _ => ctx
                .resume
                .experiences
                .iter()
                .filter_map(|exp| exp.description.as_deref())
                .collect::<Vec<_>>()
                .join(" "),
        };
        (
            self.text.keyword_set(job_text),
            self.text.keyword_set(&resume_text),
        )
    }

    pub fn evidence(&self, ctx: &MatchContext) -> FactorEvidence {
        let mut evidence = FactorEvidence::default();

        for job_skill in &ctx.job_skills {
            let name = job_skill.skill.display_name().to_string();
            let held = ctx.candidate(job_skill.skill.id()).is_some();
            match (held, job_skill.required) {
                (true, true) => evidence.matched_required.push(name),
                (true, false) => evidence.matched_optional.push(name),
                (false, true) => evidence.missing_required.push(name),
                (false, false) => evidence.missing_optional.push(name),
            }

            if let Some(since) = ctx
                .candidate(job_skill.skill.id())
                .and_then(|c| c.years_since_used)
            {
                if since > self.config.recency_half_life_years {
                    evidence.stale_skills.push(job_skill.skill.display_name().to_string());
                } else {
                    evidence.recent_skills.push(job_skill.skill.display_name().to_string());
                }
            }
        }

        evidence.relevant_years = self.relevant_years(ctx);
        evidence.experience_count = ctx.resume.experiences.len();
        evidence.min_years = ctx.job.min_years_experience;
        evidence.max_years = ctx.job.max_years_experience;

        let mut seen = BTreeSet::new();
        for domain in &ctx.job.domains {
            let trimmed = domain.trim();
            if trimmed.is_empty() || !seen.insert(trimmed.to_lowercase()) {
                continue;
            }
            if ctx.resume.experiences.iter().any(|exp| exp.has_domain(trimmed)) {
                evidence.matched_domains.push(trimmed.to_string());
            } else {
                evidence.missing_domains.push(trimmed.to_string());
            }
        }

        let (job_words, resume_words) = self.keyword_sets(ctx);
        evidence.shared_keywords = job_words
            .intersection(&resume_words)
            .take(MAX_SHARED_KEYWORDS)
            .cloned()
            .collect();

        evidence.highest_degree = ctx.resume.highest_degree();
        evidence.required_degree = ctx.job.min_education;
        evidence
    }
}

fn experience_range(ctx: &MatchContext) -> (f64, f64) {
    let min = ctx.job.min_years_experience.unwrap_or(0.0).max(0.0);
    let max = ctx
        .job
        .max_years_experience
        .unwrap_or(f64::INFINITY)
        .max(min);
    (min, max)
}

fn half_life_decay(years: f64, half_life: f64) -> f64 {
    0.5_f64.powf(years.max(0.0) / half_life)
}

fn distinct_domains<'a, I>(domains: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a String>,
{
    domains
        .into_iter()
        .map(|d| d.trim().to_lowercase())
        .filter(|d| !d.is_empty())
        .collect()
}
