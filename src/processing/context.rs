//! Per-pair working set: both records normalized once and shared by every
//! factor, the gap analyzer and the explanation builder.

use crate::config::FactorConfig;
use crate::error::Result;
use crate::processing::mentions::SkillMentionMatcher;
use crate::processing::normalizer::{NormalizedSkill, SkillNormalizer};
use crate::processing::records::{Job, Proficiency, Resume};
use crate::processing::taxonomy::{SkillId, SkillTaxonomy};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Proficiency assumed when a resume gives neither a level nor years.
const DEFAULT_PROFICIENCY: Proficiency = Proficiency::Intermediate;

#[derive(Debug, Clone)]
pub struct CandidateSkill<'t> {
    pub skill: NormalizedSkill<'t>,
    pub proficiency: Proficiency,
    /// Years since the skill was last exercised, when anything dates it.
    pub years_since_used: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct WeightedJobSkill<'t> {
    pub skill: NormalizedSkill<'t>,
    pub required: bool,
    /// Criticality in (0, 1], declared or inferred from the description.
    pub importance: f64,
    /// Contribution to the technical-skills denominator.
    pub weight: f64,
}

pub struct MatchContext<'a, 't> {
    pub resume: &'a Resume,
    pub job: &'a Job,
    pub taxonomy: &'t SkillTaxonomy,
    pub as_of: NaiveDate,
    pub candidate_skills: Vec<CandidateSkill<'t>>,
    pub job_skills: Vec<WeightedJobSkill<'t>>,
}

impl<'a, 't> MatchContext<'a, 't> {
    pub fn build(
        resume: &'a Resume,
        job: &'a Job,
        taxonomy: &'t SkillTaxonomy,
        config: &FactorConfig,
        as_of: NaiveDate,
    ) -> Result<Self> {
        let normalizer = SkillNormalizer::new(taxonomy, config.fuzzy_match_threshold);
        let candidate_skills = candidate_skills(resume, &normalizer, as_of)?;
        let job_skills = job_skills(job, &normalizer, config)?;

        Ok(Self {
            resume,
            job,
            taxonomy,
            as_of,
            candidate_skills,
            job_skills,
        })
    }

    pub fn candidate(&self, id: &SkillId) -> Option<&CandidateSkill<'t>> {
        self.candidate_skills.iter().find(|c| c.skill.id() == id)
    }

    pub fn job_skill(&self, id: &SkillId) -> Option<&WeightedJobSkill<'t>> {
        self.job_skills.iter().find(|j| j.skill.id() == id)
    }
}

fn years_between(from: NaiveDate, to: NaiveDate) -> f64 {
    (to - from).num_days().max(0) as f64 / 365.25
}

fn candidate_skills<'t>(
    resume: &Resume,
    normalizer: &SkillNormalizer<'t>,
    as_of: NaiveDate,
) -> Result<Vec<CandidateSkill<'t>>> {
    let mut skills: Vec<CandidateSkill<'t>> = Vec::new();
    let mut last_used: Vec<Option<NaiveDate>> = Vec::new();

    for entry in &resume.skills {
        let Some(skill) = normalizer.normalize_one(&entry.name) else {
            continue;
        };
        let proficiency = entry
            .proficiency
            .or_else(|| entry.years_of_experience.map(Proficiency::from_years))
            .unwrap_or(DEFAULT_PROFICIENCY);

        match skills.iter().position(|c| c.skill.id() == skill.id()) {
            Some(idx) => {
                // Repeated entries merge: strongest level, most recent use.
                skills[idx].proficiency = skills[idx].proficiency.max(proficiency);
                last_used[idx] = last_used[idx].max(entry.last_used);
            }
            None => {
                skills.push(CandidateSkill {
                    skill,
                    proficiency,
                    years_since_used: None,
                });
                last_used.push(entry.last_used);
            }
        }
    }

    let keys: Vec<Vec<String>> = skills.iter().map(|c| c.skill.mention_keys()).collect();
    let matcher = SkillMentionMatcher::new(&keys)?;

    // Skill indices each dated experience exercises.
    let mut dated_experiences: Vec<(f64, BTreeSet<usize>)> = Vec::new();
    for exp in &resume.experiences {
        if exp.start_date.is_none() && exp.end_date.is_none() {
            continue;
        }
        let Some(since) = exp.years_since_end(as_of) else {
            continue;
        };
        let technologies: BTreeSet<SkillId> = normalizer
            .normalize(&exp.technologies)
            .iter()
            .map(|s| s.id().clone())
            .collect();
        let mut used: BTreeSet<usize> = skills
            .iter()
            .enumerate()
            .filter(|(_, c)| technologies.contains(c.skill.id()))
            .map(|(i, _)| i)
            .collect();
        if let Some(description) = &exp.description {
            used.extend(matcher.mentioned(description));
        }
        used.extend(matcher.mentioned(&exp.title));
        dated_experiences.push((since, used));
    }

    for (idx, skill) in skills.iter_mut().enumerate() {
        skill.years_since_used = match last_used[idx] {
            Some(date) => Some(years_between(date, as_of)),
            None => dated_experiences
                .iter()
                .filter(|(_, used)| used.contains(&idx))
                .map(|(since, _)| *since)
                .reduce(f64::min),
        };
    }

    Ok(skills)
}

fn job_skills<'t>(
    job: &Job,
    normalizer: &SkillNormalizer<'t>,
    config: &FactorConfig,
) -> Result<Vec<WeightedJobSkill<'t>>> {
    let mut skills: Vec<WeightedJobSkill<'t>> = Vec::new();
    let mut declared: Vec<Option<u8>> = Vec::new();

    for entry in &job.skills {
        let Some(skill) = normalizer.normalize_one(&entry.name) else {
            continue;
        };
        match skills.iter().position(|j| j.skill.id() == skill.id()) {
            Some(idx) => {
                // A skill listed twice is required if either listing says so.
                skills[idx].required |= entry.required;
                declared[idx] = declared[idx].max(entry.importance);
            }
            None => {
                skills.push(WeightedJobSkill {
                    skill,
                    required: entry.required,
                    importance: 0.0,
                    weight: 0.0,
                });
                declared.push(entry.importance);
            }
        }
    }

    let description = job.description.as_deref().unwrap_or("");
    let keys: Vec<Vec<String>> = skills.iter().map(|j| j.skill.mention_keys()).collect();
    let first_mentions = SkillMentionMatcher::new(&keys)?.first_mentions(description);
    let length = description.len().max(1) as f64;

    for (idx, skill) in skills.iter_mut().enumerate() {
        skill.importance = match declared[idx] {
            Some(level) => f64::from(level.clamp(1, 10)) / 10.0,
            None => match first_mentions[idx] {
                Some(position) => 1.0 - config.mention_position_decay * (position as f64 / length),
                None => config.unmentioned_skill_importance,
            },
        };
        skill.weight = if skill.required {
            skill.importance
        } else {
            skill.importance * config.optional_skill_weight
        };
    }

    Ok(skills)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::records::{Experience, JobSkill, ResumeSkill};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn job(description: &str, skills: Vec<JobSkill>) -> Job {
        Job {
            id: "job-1".to_string(),
            title: "Engineer".to_string(),
            description: Some(description.to_string()),
            skills,
            domains: vec![],
            min_years_experience: None,
            max_years_experience: None,
            min_education: None,
            salary: None,
        }
    }

    fn job_skill(name: &str, required: bool, importance: Option<u8>) -> JobSkill {
        JobSkill {
            name: name.to_string(),
            required,
            importance,
        }
    }

    fn resume(skills: Vec<ResumeSkill>, experiences: Vec<Experience>) -> Resume {
        Resume {
            id: "resume-1".to_string(),
            name: None,
            summary: None,
            skills,
            experiences,
            education: vec![],
        }
    }

    fn resume_skill(name: &str, last_used: Option<NaiveDate>) -> ResumeSkill {
        ResumeSkill {
            name: name.to_string(),
            proficiency: None,
            years_of_experience: None,
            last_used,
        }
    }

    #[test]
    fn test_earlier_mentions_weigh_more() {
        let taxonomy = SkillTaxonomy::builtin();
        let config = FactorConfig::default();
        let job = job(
            "React developer needed. Some exposure to Docker is nice.",
            vec![job_skill("Docker", true, None), job_skill("React", true, None)],
        );
        let resume = resume(vec![], vec![]);
        let ctx = MatchContext::build(&resume, &job, &taxonomy, &config, date(2024, 1, 1)).unwrap();

        let react = ctx.job_skill(&SkillId::new("react")).unwrap();
        let docker = ctx.job_skill(&SkillId::new("docker")).unwrap();
        assert!((react.importance - 1.0).abs() < 1e-9);
        assert!(docker.importance < react.importance);
        assert!(docker.importance > 1.0 - config.mention_position_decay);
    }

    #[test]
    fn test_declared_importance_and_optional_weight() {
        let taxonomy = SkillTaxonomy::builtin();
        let config = FactorConfig::default();
        let job = job(
            "",
            vec![job_skill("Rust", true, Some(8)), job_skill("Kafka", false, None)],
        );
        let resume = resume(vec![], vec![]);
        let ctx = MatchContext::build(&resume, &job, &taxonomy, &config, date(2024, 1, 1)).unwrap();

        let rust = ctx.job_skill(&SkillId::new("rust")).unwrap();
        assert!((rust.importance - 0.8).abs() < 1e-9);
        assert!((rust.weight - 0.8).abs() < 1e-9);

        let kafka = ctx.job_skill(&SkillId::new("kafka")).unwrap();
        assert!((kafka.importance - config.unmentioned_skill_importance).abs() < 1e-9);
        assert!((kafka.weight - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_job_skills_merge() {
        let taxonomy = SkillTaxonomy::builtin();
        let config = FactorConfig::default();
        let job = job(
            "",
            vec![job_skill("Postgres", false, None), job_skill("PostgreSQL", true, None)],
        );
        let resume = resume(vec![], vec![]);
        let ctx = MatchContext::build(&resume, &job, &taxonomy, &config, date(2024, 1, 1)).unwrap();
        assert_eq!(ctx.job_skills.len(), 1);
        assert!(ctx.job_skills[0].required);
    }

    #[test]
    fn test_skill_recency_from_experience_mentions() {
        let taxonomy = SkillTaxonomy::builtin();
        let config = FactorConfig::default();
        let experiences = vec![Experience {
            title: "Backend Engineer".to_string(),
            company: None,
            domains: vec![],
            start_date: Some(date(2018, 1, 1)),
            end_date: Some(date(2021, 1, 1)),
            description: Some("Built services in Python and Postgres".to_string()),
            technologies: vec!["Docker".to_string()],
        }];
        let resume = resume(
            vec![
                resume_skill("Python", None),
                resume_skill("Docker", None),
                resume_skill("Rust", Some(date(2023, 1, 1))),
                resume_skill("Haskell", None),
            ],
            experiences,
        );
        let job = job("", vec![]);
        let ctx = MatchContext::build(&resume, &job, &taxonomy, &config, date(2024, 1, 1)).unwrap();

        let since = |id: &str| ctx.candidate(&SkillId::new(id)).unwrap().years_since_used;
        assert!((since("python").unwrap() - 3.0).abs() < 0.01);
        assert!((since("docker").unwrap() - 3.0).abs() < 0.01);
        assert!((since("rust").unwrap() - 1.0).abs() < 0.01);
        assert_eq!(since("haskell"), None);
    }

    #[test]
    fn test_everyday_words_are_not_skill_mentions() {
        let taxonomy = SkillTaxonomy::builtin();
        let config = FactorConfig::default();
        let job = job(
            "We go live next quarter. Strong Golang and shell scripting wanted.",
            vec![job_skill("Go", true, None), job_skill("Next.js", false, None), job_skill("Bash", true, None)],
        );
        let experiences = vec![Experience {
            title: "Support Engineer".to_string(),
            company: None,
            domains: vec![],
            start_date: Some(date(2015, 1, 1)),
            end_date: Some(date(2016, 1, 1)),
            description: Some("Helped customers go from shell accounts to the next platform".to_string()),
            technologies: vec![],
        }];
        let resume = resume(vec![resume_skill("Go", None), resume_skill("Bash", None)], experiences);
        let ctx = MatchContext::build(&resume, &job, &taxonomy, &config, date(2024, 1, 1)).unwrap();

        let description = job.description.as_deref().unwrap();
        let position = description.find("Golang").unwrap() as f64;
        let expected = 1.0 - config.mention_position_decay * position / description.len() as f64;
        let go = ctx.job_skill(&SkillId::new("golang")).unwrap();
        assert!((go.importance - expected).abs() < 1e-9);

        let next = ctx.job_skill(&SkillId::new("nextjs")).unwrap();
        assert!((next.importance - config.unmentioned_skill_importance).abs() < 1e-9);

        assert_eq!(ctx.candidate(&SkillId::new("golang")).unwrap().years_since_used, None);
        assert_eq!(ctx.candidate(&SkillId::new("bash")).unwrap().years_since_used, None);
    }
}
