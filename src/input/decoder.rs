//! Decoding resume, job and taxonomy records from file contents

use crate::error::{MatchScorerError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// A file holds either one record or a list of them. TOML lists live
/// under a named array of tables, e.g. `[[jobs]]`.
pub trait RecordDecoder {
    fn decode_one<T: DeserializeOwned>(&self, content: &str) -> Result<T>;
    fn decode_many<T: DeserializeOwned>(&self, content: &str, list_key: &str) -> Result<Vec<T>>;
}

pub struct JsonDecoder;

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl RecordDecoder for JsonDecoder {
    fn decode_one<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        Ok(serde_json::from_str(content)?)
    }

    fn decode_many<T: DeserializeOwned>(&self, content: &str, list_key: &str) -> Result<Vec<T>> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        let value = match value {
            serde_json::Value::Object(mut map) if map.contains_key(list_key) => {
                map.remove(list_key).unwrap_or(serde_json::Value::Null)
            }
            other => other,
        };
        match serde_json::from_value::<OneOrMany<T>>(value) {
            Ok(OneOrMany::Many(records)) => Ok(records),
            Ok(OneOrMany::One(record)) => Ok(vec![record]),
            Err(e) => Err(MatchScorerError::InvalidInput(format!(
                "expected a record or a list of records: {}",
                e
            ))),
        }
    }
}

pub struct TomlDecoder;

impl RecordDecoder for TomlDecoder {
    fn decode_one<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        Ok(toml::from_str(content)?)
    }

    fn decode_many<T: DeserializeOwned>(&self, content: &str, list_key: &str) -> Result<Vec<T>> {
        let mut table: toml::Table = toml::from_str(content)?;
        match table.remove(list_key) {
            Some(list) => Ok(list.try_into()?),
            None => Ok(vec![toml::Value::Table(table).try_into()?]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::records::{Job, Resume};

    #[test]
    fn test_json_single_and_list() {
        let one: Vec<Resume> = JsonDecoder
            .decode_many(r#"{"id": "r1", "skills": [{"name": "Rust"}]}"#, "resumes")
            .unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].skills[0].name, "Rust");

        let many: Vec<Resume> = JsonDecoder
            .decode_many(r#"[{"id": "r1"}, {"id": "r2"}]"#, "resumes")
            .unwrap();
        assert_eq!(many.len(), 2);

        let keyed: Vec<Job> = JsonDecoder
            .decode_many(r#"{"jobs": [{"id": "j1", "title": "Dev"}]}"#, "jobs")
            .unwrap();
        assert_eq!(keyed[0].id, "j1");
    }

    #[test]
    fn test_toml_records() {
        let content = r#"
[[jobs]]
id = "j1"
title = "Backend Engineer"
minYearsExperience = 3.0
domains = ["fintech"]

[[jobs.skills]]
name = "Rust"

[[jobs.skills]]
name = "Kafka"
required = false
"#;
        let jobs: Vec<Job> = TomlDecoder.decode_many(content, "jobs").unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].skills.len(), 2);
        assert!(!jobs[0].skills[1].required);

        let single: Vec<Job> = TomlDecoder
            .decode_many("id = \"j2\"\ntitle = \"Data Engineer\"\n", "jobs")
            .unwrap();
        assert_eq!(single[0].id, "j2");
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let result: Result<Vec<Resume>> = JsonDecoder.decode_many("{not json", "resumes");
        assert!(result.is_err());
    }
}
