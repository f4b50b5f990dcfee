//! Match scorer library

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod processing;
pub mod output;

pub use config::Config;
pub use error::{MatchScorerError, Result};
pub use processing::analyzer::{BatchRequest, MatchEngine, MatchResult, OwnedBatchRequest};
pub use processing::records::{Job, Resume};
pub use processing::taxonomy::SkillTaxonomy;
