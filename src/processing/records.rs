//! Structured resume and job records consumed by the engine.
//!
//! These arrive already parsed; the engine only reads them.

use crate::error::{MatchScorerError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub skills: Vec<ResumeSkill>,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSkill {
    pub name: String,
    #[serde(default)]
    pub proficiency: Option<Proficiency>,
    #[serde(default)]
    pub years_of_experience: Option<f64>,
    #[serde(default)]
    pub last_used: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub title: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// `None` marks the current role.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub level: DegreeLevel,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DegreeLevel {
    HighSchool,
    Associate,
    Bachelors,
    Masters,
    Phd,
    Certificate,
    Bootcamp,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub skills: Vec<JobSkill>,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub min_years_experience: Option<f64>,
    #[serde(default)]
    pub max_years_experience: Option<f64>,
    #[serde(default)]
    pub min_education: Option<DegreeLevel>,
    #[serde(default)]
    pub salary: Option<SalaryRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSkill {
    pub name: String,
    #[serde(default = "default_required")]
    pub required: bool,
    /// Declared criticality on a 1-10 scale.
    #[serde(default)]
    pub importance: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

fn default_required() -> bool {
    true
}

impl Proficiency {
    /// Relative weight of a skill held at this level.
    pub fn weight(self) -> f64 {
        match self {
            Proficiency::Beginner => 0.4,
            Proficiency::Intermediate => 0.7,
            Proficiency::Advanced => 0.9,
            Proficiency::Expert => 1.0,
        }
    }

    pub fn from_years(years: f64) -> Self {
        if years < 1.0 {
            Proficiency::Beginner
        } else if years < 3.0 {
            Proficiency::Intermediate
        } else if years < 5.0 {
            Proficiency::Advanced
        } else {
            Proficiency::Expert
        }
    }
}

impl DegreeLevel {
    /// Position on the ordinal education scale. Certificates and bootcamps
    /// rank alongside a high-school diploma.
    pub fn rank(self) -> u8 {
        match self {
            DegreeLevel::Other => 0,
            DegreeLevel::HighSchool | DegreeLevel::Certificate | DegreeLevel::Bootcamp => 1,
            DegreeLevel::Associate => 2,
            DegreeLevel::Bachelors => 3,
            DegreeLevel::Masters => 4,
            DegreeLevel::Phd => 5,
        }
    }

    /// Map a free-text degree name onto a level.
    pub fn from_degree_name(degree: &str) -> Self {
        let lower = degree.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let has_word = |w: &str| words.iter().any(|candidate| *candidate == w);

        if lower.contains("phd") || lower.contains("ph.d") || lower.contains("doctor") {
            DegreeLevel::Phd
        } else if lower.contains("master") || has_word("ms") || has_word("msc") || has_word("ma") || has_word("mba") {
            DegreeLevel::Masters
        } else if lower.contains("bachelor") || has_word("bs") || has_word("bsc") || has_word("ba") || has_word("beng") {
            DegreeLevel::Bachelors
        } else if lower.contains("associate") {
            DegreeLevel::Associate
        } else if lower.contains("high school") || lower.contains("diploma") || lower.contains("ged") {
            DegreeLevel::HighSchool
        } else if lower.contains("bootcamp") {
            DegreeLevel::Bootcamp
        } else if lower.contains("certificat") {
            DegreeLevel::Certificate
        } else {
            DegreeLevel::Other
        }
    }
}

impl std::fmt::Display for DegreeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DegreeLevel::HighSchool => "High School",
            DegreeLevel::Associate => "Associate",
            DegreeLevel::Bachelors => "Bachelor's",
            DegreeLevel::Masters => "Master's",
            DegreeLevel::Phd => "PhD",
            DegreeLevel::Certificate => "Certificate",
            DegreeLevel::Bootcamp => "Bootcamp",
            DegreeLevel::Other => "Other",
        };
        write!(f, "{}", name)
    }
}

impl Resume {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(MatchScorerError::Validation(
                "resume is missing its identifier".to_string(),
            ));
        }
        Ok(())
    }

    pub fn highest_degree(&self) -> Option<DegreeLevel> {
        self.education.iter().map(|e| e.level).max_by_key(|level| level.rank())
    }
}

impl Job {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(MatchScorerError::Validation(
                "job is missing its identifier".to_string(),
            ));
        }
        Ok(())
    }

    pub fn has_description(&self) -> bool {
        self.description
            .as_deref()
            .map(|d| !d.trim().is_empty())
            .unwrap_or(false)
    }

    pub fn has_experience_range(&self) -> bool {
        self.min_years_experience.is_some() || self.max_years_experience.is_some()
    }

    pub fn has_salary(&self) -> bool {
        self.salary
            .as_ref()
            .map(|s| s.min.is_some() || s.max.is_some())
            .unwrap_or(false)
    }
}

impl Experience {
    /// Duration in years up to `as_of` for the current role. Entries without
    /// a start date, or with an end before the start, last zero years.
    pub fn duration_years(&self, as_of: NaiveDate) -> f64 {
        let Some(start) = self.start_date else {
            return 0.0;
        };
        let end = self.end_date.unwrap_or(as_of).min(as_of);
        let days = (end - start).num_days();
        if days <= 0 {
            0.0
        } else {
            days as f64 / 365.25
        }
    }

    /// Years elapsed since the role ended; zero for the current role.
    pub fn years_since_end(&self, as_of: NaiveDate) -> Option<f64> {
        match self.end_date {
            None => Some(0.0),
            Some(end) => {
                let days = (as_of - end).num_days().max(0);
                Some(days as f64 / 365.25)
            }
        }
    }

    pub fn has_domain(&self, domain: &str) -> bool {
        self.domains.iter().any(|d| d.trim().eq_ignore_ascii_case(domain.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_degree_name_mapping() {
        assert_eq!(DegreeLevel::from_degree_name("PhD in Physics"), DegreeLevel::Phd);
        assert_eq!(DegreeLevel::from_degree_name("Master of Science"), DegreeLevel::Masters);
        assert_eq!(DegreeLevel::from_degree_name("MBA"), DegreeLevel::Masters);
        assert_eq!(DegreeLevel::from_degree_name("B.S. Computer Science"), DegreeLevel::Bachelors);
        assert_eq!(DegreeLevel::from_degree_name("Associate of Arts"), DegreeLevel::Associate);
        assert_eq!(DegreeLevel::from_degree_name("Coding Bootcamp"), DegreeLevel::Bootcamp);
        assert_eq!(DegreeLevel::from_degree_name("Mathematics"), DegreeLevel::Other);
    }

    #[test]
    fn test_degree_rank_ordering() {
        assert!(DegreeLevel::Phd.rank() > DegreeLevel::Masters.rank());
        assert!(DegreeLevel::Masters.rank() > DegreeLevel::Bachelors.rank());
        assert_eq!(DegreeLevel::Bootcamp.rank(), DegreeLevel::HighSchool.rank());
    }

    #[test]
    fn test_experience_duration() {
        let exp = Experience {
            title: "Engineer".to_string(),
            company: None,
            domains: vec![],
            start_date: Some(date(2020, 1, 1)),
            end_date: Some(date(2022, 1, 1)),
            description: None,
            technologies: vec![],
        };
        let years = exp.duration_years(date(2024, 1, 1));
        assert!((years - 2.0).abs() < 0.01);
        assert!((exp.years_since_end(date(2024, 1, 1)).unwrap() - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_current_role_runs_to_reference_date() {
        let exp = Experience {
            title: "Engineer".to_string(),
            company: None,
            domains: vec![],
            start_date: Some(date(2023, 1, 1)),
            end_date: None,
            description: None,
            technologies: vec![],
        };
        assert!((exp.duration_years(date(2024, 1, 1)) - 1.0).abs() < 0.01);
        assert_eq!(exp.years_since_end(date(2024, 1, 1)), Some(0.0));
    }

    #[test]
    fn test_missing_start_date_has_no_duration() {
        let exp = Experience {
            title: "Engineer".to_string(),
            company: None,
            domains: vec![],
            start_date: None,
            end_date: None,
            description: None,
            technologies: vec![],
        };
        assert_eq!(exp.duration_years(date(2024, 1, 1)), 0.0);
    }

    #[test]
    fn test_validation_requires_identifiers() {
        let job = Job {
            id: "  ".to_string(),
            title: "Engineer".to_string(),
            description: None,
            skills: vec![],
            domains: vec![],
            min_years_experience: None,
            max_years_experience: None,
            min_education: None,
            salary: None,
        };
        assert!(job.validate().unwrap_err().is_validation());
    }

    #[test]
    fn test_job_skill_defaults_to_required() {
        let skill: JobSkill = serde_json::from_str(r#"{"name": "Rust"}"#).unwrap();
        assert!(skill.required);
        assert_eq!(skill.importance, None);
    }
}
