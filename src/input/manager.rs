//! Input manager for loading resumes, jobs and taxonomies from disk

use crate::error::{MatchScorerError, Result};
use crate::input::decoder::{JsonDecoder, RecordDecoder, TomlDecoder};
use crate::input::file_detector::FileType;
use crate::processing::records::{Job, Resume};
use crate::processing::taxonomy::{SkillTaxonomy, TaxonomyFile};
use log::{info, warn};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

pub struct InputManager {
    cache: HashMap<String, String>,
    enable_cache: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    /// Load exactly one resume from a file.
    pub async fn load_resume(&mut self, path: &Path) -> Result<Resume> {
        let mut resumes = self.load_resumes(path).await?;
        match resumes.len() {
            1 => Ok(resumes.remove(0)),
            n => Err(MatchScorerError::InvalidInput(format!(
                "Expected one resume in {}, found {}",
                path.display(),
                n
            ))),
        }
    }

    /// Load exactly one job from a file.
    pub async fn load_job(&mut self, path: &Path) -> Result<Job> {
        let mut jobs = self.load_jobs(path).await?;
        match jobs.len() {
            1 => Ok(jobs.remove(0)),
            n => Err(MatchScorerError::InvalidInput(format!(
                "Expected one job in {}, found {}",
                path.display(),
                n
            ))),
        }
    }

    /// Load resumes from a file or from every record file in a directory.
    pub async fn load_resumes(&mut self, path: &Path) -> Result<Vec<Resume>> {
        self.load_records(path, "resumes").await
    }

    /// Load jobs from a file or from every record file in a directory.
    pub async fn load_jobs(&mut self, path: &Path) -> Result<Vec<Job>> {
        self.load_records(path, "jobs").await
    }

    pub async fn load_taxonomy(&mut self, path: &Path) -> Result<SkillTaxonomy> {
        let content = self.read(path).await?;
        let file: TaxonomyFile = match FileType::from_path(path) {
            FileType::Json => JsonDecoder.decode_one(&content)?,
            FileType::Toml => TomlDecoder.decode_one(&content)?,
            FileType::Unknown => return Err(unsupported(path)),
        };
        info!("Loading taxonomy from {}", path.display());
        SkillTaxonomy::from_definitions(file.skills)
            .map_err(|e| MatchScorerError::Taxonomy(format!("{}: {}", path.display(), e)))
    }

    async fn load_records<T: DeserializeOwned>(&mut self, path: &Path, list_key: &str) -> Result<Vec<T>> {
        let mut records = Vec::new();
        for file in self.expand(path).await? {
            let content = self.read(&file).await?;
            let decoded: Vec<T> = match FileType::from_path(&file) {
                FileType::Json => JsonDecoder.decode_many(&content, list_key),
                FileType::Toml => TomlDecoder.decode_many(&content, list_key),
                FileType::Unknown => Err(unsupported(&file)),
            }
            .map_err(|e| MatchScorerError::InvalidInput(format!("{}: {}", file.display(), e)))?;
            info!("Loaded {} {} from {}", decoded.len(), list_key, file.display());
            records.extend(decoded);
        }
        Ok(records)
    }

    /// A directory expands to its JSON and TOML files in name order.
    async fn expand(&self, path: &Path) -> Result<Vec<PathBuf>> {
        if !path.exists() {
            return Err(MatchScorerError::InvalidInput(format!(
                "Path does not exist: {}",
                path.display()
            )));
        }
        if !path.is_dir() {
            return Ok(vec![path.to_path_buf()]);
        }

        let mut files = Vec::new();
        let mut entries = fs::read_dir(path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file = entry.path();
            if file.is_dir() {
                continue;
            }
            match FileType::from_path(&file) {
                FileType::Unknown => warn!("Skipping unsupported file: {}", file.display()),
                _ => files.push(file),
            }
        }
        files.sort();
        Ok(files)
    }

    async fn read(&mut self, path: &Path) -> Result<String> {
        let key = path.to_string_lossy().to_string();
        if self.enable_cache {
            if let Some(cached) = self.cache.get(&key) {
                info!("Using cached contents for: {}", path.display());
                return Ok(cached.clone());
            }
        }

        let content = fs::read_to_string(path).await?;
        if self.enable_cache {
            self.cache.insert(key, content.clone());
        }
        Ok(content)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

fn unsupported(path: &Path) -> MatchScorerError {
    MatchScorerError::UnsupportedFormat(format!(
        "{} (expected .json or .toml)",
        path.display()
    ))
}
