//! Flat-file record store.
//!
//! One pretty-printed JSON file per record under the outputs directory.
//! A revision of `<name>` lives in `<name>_revised.json`. Concurrent writers
//! of the same name race; the last write wins.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, SenseError};
use crate::interpretation::{ParsedOutput, RAW_OUTPUT_KEY, RAW_REVISED_OUTPUT_KEY};

/// Version written into every record
pub const SCHEMA_VERSION: u32 = 1;

/// Filename suffix of revised records
pub const REVISED_SUFFIX: &str = "_revised";

const MAX_NAME_LEN: usize = 128;

fn schema_v1() -> u32 {
    SCHEMA_VERSION
}

/// An equation and the interpretation generated for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    #[serde(default = "schema_v1")]
    pub schema_version: u32,
    pub summary_equation: String,
    /// Parsed interpretation object, or `{"raw_output": text}`
    pub reasoning: Value,
}

impl StoredRecord {
    pub fn new(summary_equation: &str, output: &ParsedOutput) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            summary_equation: summary_equation.to_string(),
            reasoning: output.to_value(RAW_OUTPUT_KEY),
        }
    }

    /// The interpretation, unwrapping the raw-text wrapper
    pub fn interpretation(&self) -> ParsedOutput {
        unwrap_raw(&self.reasoning, RAW_OUTPUT_KEY)
    }

    /// Interpretation as prompt text: raw text verbatim, objects as JSON
    pub fn interpretation_text(&self) -> String {
        match self.interpretation() {
            ParsedOutput::Raw(text) => text,
            ParsedOutput::Parsed(value) => value.to_string(),
        }
    }
}

/// A judge-revised interpretation of an existing record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisedRecord {
    #[serde(default = "schema_v1")]
    pub schema_version: u32,
    pub summary_equation: String,
    /// Parsed revision, or `{"raw_revised_output": text}`
    pub revised_reasoning: Value,
}

impl RevisedRecord {
    pub fn new(summary_equation: &str, revision: &ParsedOutput) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            summary_equation: summary_equation.to_string(),
            revised_reasoning: revision.to_value(RAW_REVISED_OUTPUT_KEY),
        }
    }

    pub fn revision(&self) -> ParsedOutput {
        unwrap_raw(&self.revised_reasoning, RAW_REVISED_OUTPUT_KEY)
    }
}

/// `{raw_key: "text"}` and nothing else means the text never parsed
fn unwrap_raw(value: &Value, raw_key: &str) -> ParsedOutput {
    match value {
        Value::Object(map) if map.len() == 1 => match map.get(raw_key) {
            Some(Value::String(text)) => ParsedOutput::Raw(text.clone()),
            _ => ParsedOutput::Parsed(value.clone()),
        },
        Value::String(text) => ParsedOutput::Raw(text.clone()),
        _ => ParsedOutput::Parsed(value.clone()),
    }
}

/// Check a record name and strip an optional `.json` suffix
pub fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    let base = trimmed.strip_suffix(".json").unwrap_or(trimmed);

    let valid = !base.is_empty()
        && base.len() <= MAX_NAME_LEN
        && !base.starts_with('.')
        && base
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(base.to_string())
    } else {
        Err(SenseError::InvalidRecordName(name.to_string()))
    }
}

/// Record files under one directory
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path of a record name (already validated)
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    /// Persist an interpretation record. Returns the written path.
    pub fn save(&self, name: &str, record: &StoredRecord) -> Result<PathBuf> {
        let name = validate_name(name)?;
        if name.ends_with(REVISED_SUFFIX) {
            return Err(SenseError::InvalidRecordName(format!(
                "{} (suffix {} is reserved for revisions)",
                name, REVISED_SUFFIX
            )));
        }
        self.write_json(&name, record)
    }

    /// Persist an interpretation with the equation it was generated from
    pub fn save_interpretation(
        &self,
        name: &str,
        summary_equation: &str,
        output: &ParsedOutput,
    ) -> Result<PathBuf> {
        self.save(name, &StoredRecord::new(summary_equation, output))
    }

    pub fn load(&self, name: &str) -> Result<StoredRecord> {
        let name = validate_name(name)?;
        self.read_json(&name)
    }

    /// Persist a revision as `<base>_revised`
    pub fn save_revised(
        &self,
        base: &str,
        summary_equation: &str,
        revision: &ParsedOutput,
    ) -> Result<PathBuf> {
        let base = validate_name(base)?;
        let name = format!("{}{}", base, REVISED_SUFFIX);
        self.write_json(&name, &RevisedRecord::new(summary_equation, revision))
    }

    pub fn load_revised(&self, base: &str) -> Result<RevisedRecord> {
        let base = validate_name(base)?;
        self.read_json(&format!("{}{}", base, REVISED_SUFFIX))
    }

    /// Names of evaluable records (revisions excluded), sorted
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !stem.ends_with(REVISED_SUFFIX) && validate_name(stem).is_ok() {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(name);
        let content = serde_json::to_string_pretty(value)?;
        fs::write(&path, content)?;
        info!("Saved record to {}", path.display());
        Ok(path)
    }

    fn read_json<T: for<'de> Deserialize<'de>>(&self, name: &str) -> Result<T> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(SenseError::RecordNotFound(name.to_string()));
        }
        debug!("Reading record {}", path.display());
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("day_2018-01-01").unwrap(), "day_2018-01-01");
        assert_eq!(validate_name("run.json").unwrap(), "run");
        assert!(validate_name("").is_err());
        assert!(validate_name(".json").is_err());
        assert!(validate_name("../etc/passwd").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name(".hidden").is_err());
        assert!(validate_name(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_unwrap_raw_wrapper() {
        let record = StoredRecord::new("eq", &ParsedOutput::Raw("plain words".to_string()));
        assert_eq!(record.reasoning, serde_json::json!({"raw_output": "plain words"}));
        assert_eq!(record.interpretation_text(), "plain words");
    }

    #[test]
    fn test_parsed_interpretation_text_is_json() {
        let value = serde_json::json!({"reasoning": "r"});
        let record = StoredRecord::new("eq", &ParsedOutput::Parsed(value));
        assert_eq!(record.interpretation_text(), r#"{"reasoning":"r"}"#);
    }

    #[test]
    fn test_missing_schema_version_defaults() {
        let record: StoredRecord =
            serde_json::from_str(r#"{"summary_equation": "eq", "reasoning": {"a": 1}}"#).unwrap();
        assert_eq!(record.schema_version, 1);
    }

    #[test]
    fn test_reserved_suffix_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path());
        let record = StoredRecord::new("eq", &ParsedOutput::Raw("x".to_string()));
        assert!(matches!(
            store.save("x_revised", &record),
            Err(SenseError::InvalidRecordName(_))
        ));
    }
}
