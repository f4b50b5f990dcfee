//! Integration tests for the match scorer

use chrono::NaiveDate;
use match_scorer::config::Config;
use match_scorer::input::InputManager;
use match_scorer::output::report::{MatchReport, RankingDirection, ReportMetadata};
use match_scorer::output::ReportGenerator;
use match_scorer::processing::aggregator::ScoreAggregator;
use match_scorer::processing::context::MatchContext;
use match_scorer::processing::factors::{Factor, FactorScorer};
use match_scorer::processing::records::{Experience, Job, JobSkill, Resume, ResumeSkill};
use match_scorer::processing::skill_gap::{ImportanceTier, SkillGapAnalyzer};
use match_scorer::processing::text_processor::TextProcessor;
use match_scorer::{BatchRequest, MatchEngine, MatchResult, OwnedBatchRequest, SkillTaxonomy};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn engine() -> MatchEngine {
    MatchEngine::new(Arc::new(SkillTaxonomy::builtin()), Config::default())
        .unwrap()
        .with_reference_date(reference_date())
}

fn skill(name: &str) -> ResumeSkill {
    ResumeSkill {
        name: name.to_string(),
        proficiency: None,
        years_of_experience: None,
        last_used: None,
    }
}

fn job_skill(name: &str, required: bool) -> JobSkill {
    JobSkill {
        name: name.to_string(),
        required,
        importance: None,
    }
}

fn bare_resume(id: &str, skills: &[&str]) -> Resume {
    Resume {
        id: id.to_string(),
        name: None,
        summary: None,
        skills: skills.iter().map(|s| skill(s)).collect(),
        experiences: vec![],
        education: vec![],
    }
}

fn bare_job(id: &str, skills: Vec<JobSkill>) -> Job {
    Job {
        id: id.to_string(),
        title: "Engineer".to_string(),
        description: None,
        skills,
        domains: vec![],
        min_years_experience: None,
        max_years_experience: None,
        min_education: None,
        salary: None,
    }
}

async fn load_fixtures() -> (Vec<Resume>, Vec<Job>) {
    let mut manager = InputManager::new();
    let resumes = manager.load_resumes(&fixture("resumes")).await.unwrap();
    let jobs = manager.load_jobs(&fixture("jobs.toml")).await.unwrap();
    (resumes, jobs)
}

fn assert_unit(value: f64, what: &str) {
    assert!((0.0..=1.0).contains(&value), "{} out of range: {}", what, value);
}

fn assert_invariants(engine: &MatchEngine, result: &MatchResult, resume: &Resume, job: &Job) {
    assert_unit(result.match_score, "matchScore");
    assert_unit(result.explanation.overall_score, "overallScore");
    assert_unit(result.explanation.confidence, "confidence");
    for (factor, score) in result.explanation.breakdown.iter() {
        assert_unit(score, factor.as_str());
    }
    for pair in &result.skill_gap_analysis.transferable_skills {
        assert_unit(pair.transferability_score, "transferabilityScore");
    }

    let aggregated = ScoreAggregator::new(engine.config().scoring.job_to_resume.clone())
        .aggregate(&result.explanation.breakdown);
    assert!((aggregated - result.explanation.overall_score).abs() < 1e-9);

    let detail = result.bidirectional_score.as_ref().unwrap();
    let arithmetic = (detail.job_to_resume + detail.resume_to_job) / 2.0;
    assert!(result.match_score <= arithmetic + 1e-12);
    let either_zero = detail.job_to_resume == 0.0 || detail.resume_to_job == 0.0;
    assert_eq!(result.match_score == 0.0, either_zero);

    let gaps = &result.skill_gap_analysis;
    let matched: BTreeSet<&str> = gaps.matched_skills.iter().map(String::as_str).collect();
    let missing: BTreeSet<&str> = gaps.missing_skills.iter().map(|m| m.skill_name.as_str()).collect();
    assert!(matched.is_disjoint(&missing), "{} vs {}", result.resume_id, job.id);

    // Matched and missing together cover exactly the job skills that reach a tier.
    let config = engine.config();
    let ctx = MatchContext::build(resume, job, engine.taxonomy(), &config.factors, reference_date()).unwrap();
    let analyzer = SkillGapAnalyzer::new(&config.gaps);
    let considered: BTreeSet<&str> = ctx
        .job_skills
        .iter()
        .filter(|j| analyzer.tier(j).is_some())
        .map(|j| j.skill.display_name())
        .collect();
    let covered: BTreeSet<&str> = matched.union(&missing).copied().collect();
    assert_eq!(covered, considered, "{} vs {}", result.resume_id, job.id);

    let required = ctx.job_skills.iter().filter(|j| j.required).count();
    assert_eq!(gaps.total_required_skills, required);
    assert!(gaps.matched_required_skills <= gaps.total_required_skills);
    assert!((0.0..=100.0).contains(&gaps.coverage_percentage));
    for bonus in &gaps.bonus_skills {
        assert!(!matched.contains(bonus.as_str()) && !missing.contains(bonus.as_str()));
    }

    let mut placed = BTreeSet::new();
    for step in &gaps.recommended_learning_path {
        for prerequisite in &step.prerequisites {
            assert!(placed.contains(prerequisite.as_str()), "{} before {}", step.skill_name, prerequisite);
        }
        placed.insert(step.skill_name.as_str());
    }
}

#[tokio::test]
async fn test_fixture_loading() {
    let (resumes, jobs) = load_fixtures().await;
    let ids: Vec<&str> = resumes.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["alice", "bruno"]);
    assert_eq!(jobs.len(), 3);
    assert_eq!(jobs[1].skills.len(), 3);
    assert!(!jobs[1].skills[2].required);
}

#[tokio::test]
async fn test_every_fixture_pair_respects_invariants() {
    let engine = engine();
    let (resumes, jobs) = load_fixtures().await;
    for resume in &resumes {
        for job in &jobs {
            let result = engine.compute_match(resume, job).unwrap();
            assert_invariants(&engine, &result, resume, job);
        }
    }
}

#[test]
fn test_scenario_a_frontend_gap() {
    let engine = engine();
    let resume = bare_resume("r-a", &["React", "Node.js"]);
    let job = bare_job(
        "j-a",
        vec![
            job_skill("React", true),
            job_skill("TypeScript", true),
            job_skill("Redux", false),
        ],
    );

    let result = engine.compute_match(&resume, &job).unwrap();
    let gaps = &result.skill_gap_analysis;
    assert_eq!(gaps.matched_skills, vec!["React"]);

    let typescript = gaps.missing_skills.iter().find(|m| m.skill_name == "TypeScript").unwrap();
    assert_eq!(typescript.importance, ImportanceTier::High);
    assert_eq!(typescript.transferable_from.as_deref(), Some(&["Node.js".to_string()][..]));

    let redux = gaps.missing_skills.iter().find(|m| m.skill_name == "Redux").unwrap();
    assert!(matches!(redux.importance, ImportanceTier::Medium | ImportanceTier::Low));
    assert_eq!(gaps.missing_skills[0].skill_name, "TypeScript");

    let path: Vec<&str> = gaps
        .recommended_learning_path
        .iter()
        .map(|s| s.skill_name.as_str())
        .collect();
    assert_eq!(path, vec!["TypeScript", "Redux"]);
    assert_invariants(&engine, &result, &resume, &job);
}

#[test]
fn test_minor_optional_skill_is_outside_gap_analysis() {
    let engine = engine();
    let resume = bare_resume("r-minor", &["Rust", "Kafka"]);
    let mut job = bare_job("j-minor", vec![job_skill("Rust", true), job_skill("Docker", true)]);
    job.skills.push(JobSkill {
        name: "Kafka".to_string(),
        required: false,
        importance: Some(2),
    });
    job.skills.push(JobSkill {
        name: "Terraform".to_string(),
        required: false,
        importance: Some(2),
    });

    let result = engine.compute_match(&resume, &job).unwrap();
    let gaps = &result.skill_gap_analysis;
    assert_eq!(gaps.matched_skills, vec!["Rust"]);
    let missing: Vec<&str> = gaps.missing_skills.iter().map(|m| m.skill_name.as_str()).collect();
    assert_eq!(missing, vec!["Docker"]);
    for minor in ["Kafka", "Terraform"] {
        assert!(!gaps.matched_skills.iter().any(|s| s == minor));
        assert!(!missing.contains(&minor));
    }
    assert_eq!(gaps.total_required_skills, 2);
    assert_eq!(gaps.matched_required_skills, 1);
    assert!(gaps.bonus_skills.is_empty());
    assert_invariants(&engine, &result, &resume, &job);
}

#[test]
fn test_scenario_b_job_without_skills() {
    let engine = engine();
    let resume = bare_resume("r-b", &["Rust", "Go"]);
    let job = bare_job("j-b", vec![]);

    let result = engine.compute_match(&resume, &job).unwrap();
    assert_eq!(result.explanation.breakdown.get(Factor::TechnicalSkills), 0.0);
    assert!(result.skill_gap_analysis.matched_skills.is_empty());
    assert!(result.skill_gap_analysis.missing_skills.is_empty());
    assert!(result.skill_gap_analysis.recommended_learning_path.is_empty());
}

#[test]
fn test_scenario_c_experience_band() {
    let taxonomy = SkillTaxonomy::builtin();
    let config = Config::default();
    let text = TextProcessor::new().unwrap();
    let scorer = FactorScorer::new(&config.factors, &text);

    let mut job = bare_job("j-c", vec![job_skill("Rust", true)]);
    job.min_years_experience = Some(3.0);
    job.max_years_experience = Some(5.0);

    let experience = |start: Option<NaiveDate>| Experience {
        title: "Engineer".to_string(),
        company: None,
        domains: vec![],
        start_date: start,
        end_date: None,
        description: None,
        technologies: vec![],
    };

    let mut junior = bare_resume("junior", &["Rust"]);
    junior.experiences = vec![experience(None)];
    let ctx = MatchContext::build(&junior, &job, &taxonomy, &config.factors, reference_date()).unwrap();
    assert!(scorer.experience_level(&ctx) < 0.05);

    let mut mid = bare_resume("mid", &["Rust"]);
    mid.experiences = vec![experience(NaiveDate::from_ymd_opt(2020, 6, 1))];
    let ctx = MatchContext::build(&mid, &job, &taxonomy, &config.factors, reference_date()).unwrap();
    assert_eq!(scorer.experience_level(&ctx), 1.0);
}

#[tokio::test]
async fn test_scenario_d_aligned_records() {
    let engine = engine();
    let (resumes, jobs) = load_fixtures().await;
    let alice = resumes.iter().find(|r| r.id == "alice").unwrap();
    let backend = jobs.iter().find(|j| j.id == "payments-backend").unwrap();

    let result = engine.compute_match(alice, backend).unwrap();
    assert!(result.match_score > 0.95, "match score {}", result.match_score);
    assert!(result.explanation.confidence > 0.9);
    assert!(result.skill_gap_analysis.missing_skills.is_empty());
    assert_eq!(
        result.skill_gap_analysis.matched_skills,
        vec!["Rust", "PostgreSQL", "Kubernetes", "Docker"]
    );
}

#[tokio::test]
async fn test_learning_path_follows_prerequisites() {
    let engine = engine();
    let (resumes, jobs) = load_fixtures().await;
    let alice = resumes.iter().find(|r| r.id == "alice").unwrap();
    let research = jobs.iter().find(|j| j.id == "ml-research").unwrap();

    let result = engine.compute_match(alice, research).unwrap();
    let path: Vec<&str> = result
        .skill_gap_analysis
        .recommended_learning_path
        .iter()
        .map(|s| s.skill_name.as_str())
        .collect();
    assert_eq!(path, vec!["Python", "Machine Learning", "PyTorch"]);
    let pytorch = &result.skill_gap_analysis.recommended_learning_path[2];
    assert_eq!(pytorch.prerequisites, vec!["Machine Learning"]);
    assert!(pytorch.estimated_time_weeks >= 1);
}

#[tokio::test]
async fn test_custom_taxonomy_replaces_builtin() {
    let taxonomy = InputManager::new().load_taxonomy(&fixture("taxonomy.toml")).await.unwrap();
    assert_eq!(taxonomy.len(), 4);
    assert!(taxonomy.prerequisite_cycles().is_empty());

    let engine = MatchEngine::new(Arc::new(taxonomy), Config::default())
        .unwrap()
        .with_reference_date(reference_date());
    let resume = bare_resume("designer", &["CSS"]);
    let job = bare_job("ui", vec![job_skill("SCSS", true), job_skill("Tailwind", true)]);

    let result = engine.compute_match(&resume, &job).unwrap();
    let gaps = &result.skill_gap_analysis;
    let missing: Vec<&str> = gaps.missing_skills.iter().map(|m| m.skill_name.as_str()).collect();
    assert_eq!(missing, vec!["Sass", "Tailwind CSS"]);
    assert_eq!(gaps.missing_skills[0].transferable_from.as_deref(), Some(&["CSS".to_string()][..]));
    assert_eq!(gaps.recommended_learning_path[0].resources, vec!["Sass guide: sass-lang.com/guide"]);
}

#[test]
fn test_compute_match_is_idempotent() {
    let engine = engine();
    let resume = bare_resume("r", &["Python", "Django", "PostgreSQL", "Go"]);
    let job = bare_job(
        "j",
        vec![
            job_skill("Python", true),
            job_skill("FastAPI", true),
            job_skill("MySQL", false),
            job_skill("Quantum Basket Weaving", true),
        ],
    );
    let first = serde_json::to_string(&engine.compute_match(&resume, &job).unwrap()).unwrap();
    let second = serde_json::to_string(&engine.compute_match(&resume, &job).unwrap()).unwrap();
    assert_eq!(first, second);
    assert!(first.contains("Quantum Basket Weaving"));
}

#[tokio::test]
async fn test_batch_ranking_is_deterministic() {
    let engine = Arc::new(engine());
    let (resumes, jobs) = load_fixtures().await;

    for resume in &resumes {
        let sequential = engine
            .compute_batch(BatchRequest::JobsForResume { resume, jobs: &jobs }, 2)
            .unwrap();
        let parallel = engine
            .compute_batch_parallel(
                OwnedBatchRequest::JobsForResume {
                    resume: resume.clone(),
                    jobs: jobs.clone(),
                },
                2,
            )
            .await
            .unwrap();
        assert_eq!(sequential, parallel);
        assert_eq!(sequential.len(), 2);
        assert!(sequential[0].match_score >= sequential[1].match_score);
    }

    let top = engine
        .compute_batch(BatchRequest::ResumesForJob { job: &jobs[0], resumes: &resumes }, 10)
        .unwrap();
    assert_eq!(top[0].resume_id, "alice");
}

#[tokio::test]
async fn test_json_report_contract() {
    let engine = engine();
    let (resumes, jobs) = load_fixtures().await;
    let results = engine
        .compute_batch(BatchRequest::ResumesForJob { job: &jobs[1], resumes: &resumes }, 10)
        .unwrap();
    let report = MatchReport::ranking(
        jobs[1].id.clone(),
        RankingDirection::ResumesForJob,
        resumes.len(),
        results,
        ReportMetadata::new(engine.reference_date(), engine.taxonomy().len(), 0),
    );

    let rendered = ReportGenerator::with_options(false, false, true, true)
        .generate_report(&report, &match_scorer::config::OutputFormat::Json)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(value["body"]["kind"], "ranking");
    assert_eq!(value["body"]["direction"], "RESUMES_FOR_JOB");

    let first = &value["body"]["results"][0];
    for key in ["jobId", "resumeId", "matchScore", "explanation", "skillGapAnalysis"] {
        assert!(first.get(key).is_some(), "missing {}", key);
    }
    let breakdown = first["explanation"]["breakdown"].as_object().unwrap();
    let keys: BTreeSet<&str> = breakdown.keys().map(String::as_str).collect();
    let expected: BTreeSet<&str> = Factor::ALL.iter().map(|f| f.as_str()).collect();
    assert_eq!(keys, expected);
    assert!(first["skillGapAnalysis"]["recommendedLearningPath"].is_array());
}
