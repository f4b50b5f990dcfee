//! Data-completeness confidence for a match

use crate::config::ConfidenceConfig;
use crate::processing::records::{Job, Resume};

/// Confidence is the product of the two records' completeness, so a score
/// resting on sparse data is flagged without being discarded.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceEstimator<'c> {
    weights: &'c ConfidenceConfig,
}

impl<'c> ConfidenceEstimator<'c> {
    pub fn new(weights: &'c ConfidenceConfig) -> Self {
        Self { weights }
    }

    pub fn resume_completeness(&self, resume: &Resume) -> f64 {
        let mut score = 0.0;
        if resume.skills.iter().any(|s| !s.name.trim().is_empty()) {
            score += self.weights.resume_skills_weight;
        }
        if !resume.experiences.is_empty() {
            score += self.weights.resume_experience_weight;
        }
        if !resume.education.is_empty() {
            score += self.weights.resume_education_weight;
        }
        score
    }

    pub fn job_completeness(&self, job: &Job) -> f64 {
        let mut score = 0.0;
        if job.skills.iter().any(|s| !s.name.trim().is_empty()) {
            score += self.weights.job_skills_weight;
        }
        if job.has_description() {
            score += self.weights.job_description_weight;
        }
        if job.has_experience_range() || job.has_salary() {
            score += self.weights.job_range_weight;
        }
        score
    }

    pub fn estimate(&self, resume: &Resume, job: &Job) -> f64 {
        (self.resume_completeness(resume) * self.job_completeness(job)).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::records::{DegreeLevel, Education, Experience, JobSkill, ResumeSkill, SalaryRange};

    fn empty_resume() -> Resume {
        Resume {
            id: "r".to_string(),
            name: None,
            summary: None,
            skills: vec![],
            experiences: vec![],
            education: vec![],
        }
    }

    fn empty_job() -> Job {
        Job {
            id: "j".to_string(),
            title: "Engineer".to_string(),
            description: None,
            skills: vec![],
            domains: vec![],
            min_years_experience: None,
            max_years_experience: None,
            min_education: None,
            salary: None,
        }
    }

    #[test]
    fn test_empty_records_have_zero_confidence() {
        let weights = ConfidenceConfig::default();
        let estimator = ConfidenceEstimator::new(&weights);
        assert_eq!(estimator.estimate(&empty_resume(), &empty_job()), 0.0);
    }

    #[test]
    fn test_complete_records_have_full_confidence() {
        let weights = ConfidenceConfig::default();
        let estimator = ConfidenceEstimator::new(&weights);
        let mut resume = empty_resume();
        resume.skills.push(ResumeSkill {
            name: "Rust".to_string(),
            proficiency: None,
            years_of_experience: None,
            last_used: None,
        });
        resume.experiences.push(Experience {
            title: "Engineer".to_string(),
            company: None,
            domains: vec![],
            start_date: None,
            end_date: None,
            description: None,
            technologies: vec![],
        });
        resume.education.push(Education {
            level: DegreeLevel::Bachelors,
            field: None,
            institution: None,
            start_date: None,
            end_date: None,
        });

        let mut job = empty_job();
        job.skills.push(JobSkill {
            name: "Rust".to_string(),
            required: true,
            importance: None,
        });
        job.description = Some("Systems work".to_string());
        job.salary = Some(SalaryRange {
            min: Some(100_000.0),
            max: None,
            currency: None,
        });

        assert!((estimator.estimate(&resume, &job) - 1.0).abs() < 1e-9);

        job.salary = None;
        assert!((estimator.estimate(&resume, &job) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_blank_description_does_not_count() {
        let weights = ConfidenceConfig::default();
        let estimator = ConfidenceEstimator::new(&weights);
        let mut job = empty_job();
        job.description = Some("   ".to_string());
        assert_eq!(estimator.job_completeness(&job), 0.0);
    }

    #[test]
    fn test_completeness_follows_configured_weights() {
        let weights = ConfidenceConfig {
            job_skills_weight: 0.2,
            job_description_weight: 0.8,
            job_range_weight: 0.0,
            ..ConfidenceConfig::default()
        };
        let estimator = ConfidenceEstimator::new(&weights);
        let mut job = empty_job();
        job.description = Some("Systems work".to_string());
        assert!((estimator.job_completeness(&job) - 0.8).abs() < 1e-9);
        job.min_years_experience = Some(3.0);
        assert!((estimator.job_completeness(&job) - 0.8).abs() < 1e-9);
    }
}
