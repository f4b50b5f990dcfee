//! Match engine coordinating normalization, factor scoring, gap analysis and explanations

use crate::config::Config;
use crate::error::Result;
use crate::processing::aggregator::ScoreAggregator;
use crate::processing::bidirectional::{BidirectionalCombiner, BidirectionalScore};
use crate::processing::confidence::ConfidenceEstimator;
use crate::processing::context::MatchContext;
use crate::processing::explanation::{ExplanationBuilder, MatchExplanation};
use crate::processing::factors::{Direction, FactorScorer};
use crate::processing::learning_path::LearningPathPlanner;
use crate::processing::records::{Job, Resume};
use crate::processing::skill_gap::{SkillGapAnalysis, SkillGapAnalyzer};
use crate::processing::taxonomy::SkillTaxonomy;
use crate::processing::text_processor::TextProcessor;
use chrono::{Local, NaiveDate};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub job_id: String,
    pub resume_id: String,
    /// Harmonic mean of both directional scores.
    pub match_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bidirectional_score: Option<BidirectionalScore>,
    pub explanation: MatchExplanation,
    pub skill_gap_analysis: SkillGapAnalysis,
}

/// One anchor record scored against many counterparts.
#[derive(Debug, Clone, Copy)]
pub enum BatchRequest<'a> {
    JobsForResume { resume: &'a Resume, jobs: &'a [Job] },
    ResumesForJob { job: &'a Job, resumes: &'a [Resume] },
}

/// Owned form of [`BatchRequest`] for work handed to blocking workers.
#[derive(Debug, Clone)]
pub enum OwnedBatchRequest {
    JobsForResume { resume: Resume, jobs: Vec<Job> },
    ResumesForJob { job: Job, resumes: Vec<Resume> },
}

impl BatchRequest<'_> {
    /// Check the anchor and every counterpart, so nothing is scored when any
    /// record is malformed.
    pub fn validate(&self) -> Result<()> {
        match self {
            BatchRequest::JobsForResume { resume, jobs } => {
                resume.validate()?;
                jobs.iter().try_for_each(Job::validate)
            }
            BatchRequest::ResumesForJob { job, resumes } => {
                job.validate()?;
                resumes.iter().try_for_each(Resume::validate)
            }
        }
    }
}

impl OwnedBatchRequest {
    pub fn as_request(&self) -> BatchRequest<'_> {
        match self {
            OwnedBatchRequest::JobsForResume { resume, jobs } => {
                BatchRequest::JobsForResume { resume, jobs }
            }
            OwnedBatchRequest::ResumesForJob { job, resumes } => {
                BatchRequest::ResumesForJob { job, resumes }
            }
        }
    }

    fn len(&self) -> usize {
        match self {
            OwnedBatchRequest::JobsForResume { jobs, .. } => jobs.len(),
            OwnedBatchRequest::ResumesForJob { resumes, .. } => resumes.len(),
        }
    }
}

/// Stateless scorer. Holds only immutable configuration and the shared
/// taxonomy, so one instance serves concurrent callers without locking.
pub struct MatchEngine {
    taxonomy: Arc<SkillTaxonomy>,
    config: Config,
    text_processor: TextProcessor,
    as_of: NaiveDate,
}

impl MatchEngine {
    /// Validates the configuration. Elapsed-time factors are measured from today.
    pub fn new(taxonomy: Arc<SkillTaxonomy>, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            taxonomy,
            config,
            text_processor: TextProcessor::new()?,
            as_of: Local::now().date_naive(),
        })
    }

    /// Pin the date elapsed-time factors are measured from.
    pub fn with_reference_date(mut self, as_of: NaiveDate) -> Self {
        self.as_of = as_of;
        self
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.as_of
    }

    pub fn taxonomy(&self) -> &SkillTaxonomy {
        &self.taxonomy
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Score one resume against one job.
    pub fn compute_match(&self, resume: &Resume, job: &Job) -> Result<MatchResult> {
        resume.validate()?;
        job.validate()?;

        let ctx = MatchContext::build(
            resume,
            job,
            &self.taxonomy,
            &self.config.factors,
            self.as_of,
        )?;

        let scorer = FactorScorer::new(&self.config.factors, &self.text_processor);
        let forward = scorer.score(&ctx, Direction::JobToResume);
        let reverse = scorer.score(&ctx, Direction::ResumeToJob);

        let combiner = BidirectionalCombiner::new(
            ScoreAggregator::new(self.config.scoring.job_to_resume.clone()),
            ScoreAggregator::new(self.config.scoring.resume_to_job.clone()),
            self.config.scoring.balance_tolerance,
        );
        let bidirectional = combiner.combine(&forward, &reverse);
        let confidence = ConfidenceEstimator::new(&self.config.confidence).estimate(resume, job);

        let gap_report = SkillGapAnalyzer::new(&self.config.gaps).analyze(&ctx);
        let learning_path =
            LearningPathPlanner::new(&self.config.learning).plan(&gap_report.missing, &self.taxonomy);

        let evidence = scorer.evidence(&ctx);
        let explanation = ExplanationBuilder::new(self.config.explanation.max_key_reasons).build(
            bidirectional.job_to_resume,
            &forward,
            &evidence,
            &gap_report.transferable,
            confidence,
        );

        debug!(
            "Scored resume '{}' against job '{}': forward {:.3}, reverse {:.3}, match {:.3}",
            resume.id,
            job.id,
            bidirectional.job_to_resume,
            bidirectional.resume_to_job,
            bidirectional.harmonic_mean
        );

        Ok(MatchResult {
            job_id: job.id.clone(),
            resume_id: resume.id.clone(),
            match_score: bidirectional.harmonic_mean,
            bidirectional_score: if self.config.explanation.include_bidirectional_detail {
                Some(bidirectional)
            } else {
                None
            },
            explanation,
            skill_gap_analysis: gap_report.into_analysis(learning_path),
        })
    }

    /// Score every pair in the request and return the top `limit` by match
    /// score, ties broken by ascending id.
    pub fn compute_batch(&self, request: BatchRequest<'_>, limit: usize) -> Result<Vec<MatchResult>> {
        request.validate()?;

        let mut results = match request {
            BatchRequest::JobsForResume { resume, jobs } => jobs
                .iter()
                .map(|job| self.compute_match(resume, job))
                .collect::<Result<Vec<_>>>()?,
            BatchRequest::ResumesForJob { job, resumes } => resumes
                .iter()
                .map(|resume| self.compute_match(resume, job))
                .collect::<Result<Vec<_>>>()?,
        };

        rank_results(&mut results);
        results.truncate(limit);
        Ok(results)
    }

    /// Same result as [`MatchEngine::compute_batch`], with the pairs spread
    /// over blocking worker threads.
    pub async fn compute_batch_parallel(
        self: &Arc<Self>,
        request: OwnedBatchRequest,
        limit: usize,
    ) -> Result<Vec<MatchResult>> {
        request.as_request().validate()?;

        let total = request.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let chunk_size = total.div_ceil(workers).max(1);
        info!(
            "Scoring {} pairs across {} workers",
            total,
            total.div_ceil(chunk_size)
        );

        let chunks: Vec<OwnedBatchRequest> = match request {
            OwnedBatchRequest::JobsForResume { resume, jobs } => jobs
                .chunks(chunk_size)
                .map(|chunk| OwnedBatchRequest::JobsForResume {
                    resume: resume.clone(),
                    jobs: chunk.to_vec(),
                })
                .collect(),
            OwnedBatchRequest::ResumesForJob { job, resumes } => resumes
                .chunks(chunk_size)
                .map(|chunk| OwnedBatchRequest::ResumesForJob {
                    job: job.clone(),
                    resumes: chunk.to_vec(),
                })
                .collect(),
        };

        let handles: Vec<_> = chunks
            .into_iter()
            .map(|chunk| {
                let engine = Arc::clone(self);
                tokio::task::spawn_blocking(move || {
                    let size = chunk.len();
                    engine.compute_batch(chunk.as_request(), size)
                })
            })
            .collect();

        let mut results = Vec::with_capacity(total);
        for handle in handles {
            results.extend(handle.await??);
        }

        rank_results(&mut results);
        results.truncate(limit);
        Ok(results)
    }
}

/// Descending match score; ascending job id, then resume id, on ties.
pub fn rank_results(results: &mut [MatchResult]) {
    results.sort_by(compare_results);
}

fn compare_results(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.match_score
        .total_cmp(&a.match_score)
        .then_with(|| a.job_id.cmp(&b.job_id))
        .then_with(|| a.resume_id.cmp(&b.resume_id))
}

impl std::fmt::Debug for MatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchEngine")
            .field("skills", &self.taxonomy.len())
            .field("as_of", &self.as_of)
            .finish()
    }
}
