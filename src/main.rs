//! match-scorer: explainable, bidirectional resume and job matching

use clap::Parser;
use log::{error, info, warn};
use match_scorer::cli::{self, Cli, Commands, ConfigAction, ReportArgs, TaxonomyAction};
use match_scorer::config::{Config, OutputFormat};
use match_scorer::error::{MatchScorerError, Result};
use match_scorer::input::InputManager;
use match_scorer::output::formatter::{save_report_to_file, suggest_filename};
use match_scorer::output::report::{MatchReport, RankingDirection, ReportMetadata};
use match_scorer::output::ReportGenerator;
use match_scorer::processing::analyzer::{MatchEngine, OwnedBatchRequest};
use match_scorer::processing::taxonomy::SkillTaxonomy;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Instant;

const RECORD_EXTENSIONS: &[&str] = &["json", "toml"];

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, cli.taxonomy, config).await {
        error!("Command failed: {}", e);
        process::exit(if e.is_validation() { 2 } else { 1 });
    }
}

async fn run_command(command: Commands, taxonomy_path: Option<PathBuf>, config: Config) -> Result<()> {
    let mut input_manager = InputManager::new();

    match command {
        Commands::Match { resume, job, report } => {
            check_record_path(&resume, "Resume")?;
            check_record_path(&job, "Job")?;

            let engine = build_engine(&mut input_manager, taxonomy_path.as_deref(), config, &report).await?;
            let started = Instant::now();
            let resume_record = input_manager.load_resume(&resume).await?;
            let job_record = input_manager.load_job(&job).await?;

            info!("Scoring resume '{}' against job '{}'", resume_record.id, job_record.id);
            let result = engine.compute_match(&resume_record, &job_record)?;
            let metadata = metadata(&engine, started);

            emit(MatchReport::single(result, metadata), engine.config(), &report, &resume_record.id)?;
        }

        Commands::RankJobs { resume, jobs, limit, report } => {
            check_record_path(&resume, "Resume")?;
            check_record_path(&jobs, "Jobs")?;

            let engine = Arc::new(
                build_engine(&mut input_manager, taxonomy_path.as_deref(), config, &report).await?,
            );
            let started = Instant::now();
            let resume_record = input_manager.load_resume(&resume).await?;
            let job_records = input_manager.load_jobs(&jobs).await?;
            if job_records.is_empty() {
                warn!("No jobs found in {}", jobs.display());
            }

            let anchor = resume_record.id.clone();
            let considered = job_records.len();
            let results = engine
                .compute_batch_parallel(
                    OwnedBatchRequest::JobsForResume {
                        resume: resume_record,
                        jobs: job_records,
                    },
                    limit,
                )
                .await?;
            let metadata = metadata(&engine, started);
            let ranking = MatchReport::ranking(&anchor, RankingDirection::JobsForResume, considered, results, metadata);

            emit(ranking, engine.config(), &report, &anchor)?;
        }

        Commands::RankCandidates { job, resumes, limit, report } => {
            check_record_path(&job, "Job")?;
            check_record_path(&resumes, "Resumes")?;

            let engine = Arc::new(
                build_engine(&mut input_manager, taxonomy_path.as_deref(), config, &report).await?,
            );
            let started = Instant::now();
            let job_record = input_manager.load_job(&job).await?;
            let resume_records = input_manager.load_resumes(&resumes).await?;
            if resume_records.is_empty() {
                warn!("No resumes found in {}", resumes.display());
            }

            let anchor = job_record.id.clone();
            let considered = resume_records.len();
            let results = engine
                .compute_batch_parallel(
                    OwnedBatchRequest::ResumesForJob {
                        job: job_record,
                        resumes: resume_records,
                    },
                    limit,
                )
                .await?;
            let metadata = metadata(&engine, started);
            let ranking = MatchReport::ranking(&anchor, RankingDirection::ResumesForJob, considered, results, metadata);

            emit(ranking, engine.config(), &report, &anchor)?;
        }

        Commands::Taxonomy { action } => match action {
            TaxonomyAction::Show { filter } => {
                let taxonomy = load_taxonomy(&mut input_manager, taxonomy_path.as_deref()).await?;
                let needle = filter.map(|f| f.to_lowercase());
                println!("📚 Skill taxonomy ({} skills)\n", taxonomy.len());
                for skill in taxonomy.skills() {
                    if let Some(needle) = &needle {
                        if !skill.id.as_str().contains(needle.as_str())
                            && !skill.display_name.to_lowercase().contains(needle.as_str())
                        {
                            continue;
                        }
                    }
                    println!("{:<20} {:<22} {:?} (difficulty {:.1})", skill.id.as_str(), skill.display_name, skill.category, skill.difficulty);
                    if !skill.prerequisites.is_empty() {
                        let prerequisites: Vec<&str> = skill.prerequisites.iter().map(|p| p.as_str()).collect();
                        println!("    requires: {}", prerequisites.join(", "));
                    }
                }
            }

            TaxonomyAction::Validate { path } => {
                let path = path.or(taxonomy_path);
                let taxonomy = load_taxonomy(&mut input_manager, path.as_deref()).await?;
                let cycles = taxonomy.prerequisite_cycles();
                let source = path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "Built-in taxonomy".to_string());
                println!("✅ {} parsed: {} skills", source, taxonomy.len());
                if cycles.is_empty() {
                    println!("✅ No prerequisite cycles");
                } else {
                    println!("⚠️  {} prerequisite cycle(s); learning paths will break them:", cycles.len());
                    for cycle in &cycles {
                        let names: Vec<&str> = cycle.iter().map(|id| id.as_str()).collect();
                        println!("  • {} → {}", names.join(" → "), names.first().copied().unwrap_or_default());
                    }
                }
            }
        },

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("⚙️  Current Configuration ({})\n", Config::config_path().display());
                let content = toml::to_string_pretty(&config)
                    .map_err(|e| MatchScorerError::Configuration(format!("Failed to serialize config: {}", e)))?;
                println!("{}", content);
            }

            Some(ConfigAction::Reset) => {
                println!("🔄 Resetting configuration to defaults...");
                Config::default().save()?;
                println!("✅ Configuration reset successfully!");
            }
        },
    }

    Ok(())
}

fn check_record_path(path: &Path, label: &str) -> Result<()> {
    cli::validate_file_extension(path, RECORD_EXTENSIONS)
        .map_err(|e| MatchScorerError::InvalidInput(format!("{} file: {}", label, e)))
}

async fn load_taxonomy(input_manager: &mut InputManager, path: Option<&Path>) -> Result<SkillTaxonomy> {
    match path {
        Some(path) => input_manager.load_taxonomy(path).await,
        None => Ok(SkillTaxonomy::builtin()),
    }
}

async fn build_engine(
    input_manager: &mut InputManager,
    taxonomy_path: Option<&Path>,
    config: Config,
    report: &ReportArgs,
) -> Result<MatchEngine> {
    let taxonomy = Arc::new(load_taxonomy(input_manager, taxonomy_path).await?);
    let engine = MatchEngine::new(taxonomy, config)?;
    Ok(match report.as_of {
        Some(as_of) => engine.with_reference_date(as_of),
        None => engine,
    })
}

fn metadata(engine: &MatchEngine, started: Instant) -> ReportMetadata {
    ReportMetadata::new(
        engine.reference_date(),
        engine.taxonomy().len(),
        started.elapsed().as_millis() as u64,
    )
}

/// Render the report in the requested format, then print or save it.
fn emit(report: MatchReport, config: &Config, args: &ReportArgs, stem: &str) -> Result<()> {
    let format = match &args.output {
        Some(output) => cli::parse_output_format(output).map_err(MatchScorerError::InvalidInput)?,
        None => config.output.format,
    };
    let detailed = args.detailed || config.output.detailed;
    let use_colors = config.output.color_output && args.save.is_none();

    let generator = ReportGenerator::with_options(use_colors, detailed, true, true);
    let rendered = generator.generate_report(&report, &format)?;

    match &args.save {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(suggest_filename(&format, stem, true))
            } else {
                path.clone()
            };
            save_report_to_file(&rendered, &path)?;
            println!("💾 Report saved to {}", path.display());
        }
        None => {
            if format == OutputFormat::Console {
                println!("{}", rendered);
            } else {
                print!("{}", rendered);
                if !rendered.ends_with('\n') {
                    println!();
                }
            }
        }
    }

    Ok(())
}
