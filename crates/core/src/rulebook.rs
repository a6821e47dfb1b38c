//! Ordered risk rulebook.
//!
//! The rulebook is loaded once up front and handed to the classifier as an
//! immutable value. Document order is significant because classification is
//! first-match-wins.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::rule::Rule;
use crate::source::SourceFormat;

#[derive(Debug, Error)]
pub enum RulebookError {
    #[error("rulebook file was not found: `{0}`")]
    Missing(PathBuf),
    #[error("could not read rulebook `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not parse YAML rulebook: {0}")]
    ParseYaml(#[from] serde_yaml::Error),
    #[error("could not parse TOML rulebook: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("unsupported rulebook format for `{0}` (expected .yaml, .yml or .toml)")]
    UnsupportedFormat(PathBuf),
    #[error("rule #{position} is invalid: {reason}")]
    InvalidRule { position: usize, reason: String },
}

#[derive(Debug, Default, Deserialize)]
struct RulebookDocument {
    #[serde(default)]
    rules: Vec<Rule>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rulebook {
    rules: Vec<Rule>,
}

impl Rulebook {
    pub fn new(rules: Vec<Rule>) -> Result<Self, RulebookError> {
        validate_rules(&rules)?;
        if rules.is_empty() {
            warn!(
                event_name = "rulebook.empty",
                "rulebook contains no rules; every clause will classify as OK"
            );
        }
        Ok(Self { rules })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RulebookError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RulebookError::Missing(path.to_path_buf()));
        }

        let raw = fs::read_to_string(path)
            .map_err(|source| RulebookError::Read { path: path.to_path_buf(), source })?;

        let rulebook = match SourceFormat::from_path(path) {
            Some(SourceFormat::Yaml) => Self::from_yaml_str(&raw)?,
            Some(SourceFormat::Toml) => Self::from_toml_str(&raw)?,
            None => return Err(RulebookError::UnsupportedFormat(path.to_path_buf())),
        };

        info!(
            event_name = "rulebook.loaded",
            path = %path.display(),
            rule_count = rulebook.len(),
            "rulebook loaded"
        );
        Ok(rulebook)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, RulebookError> {
        if raw.trim().is_empty() {
            return Self::new(Vec::new());
        }
        let document: RulebookDocument = serde_yaml::from_str(raw)?;
        Self::new(document.rules)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, RulebookError> {
        let document: RulebookDocument = toml::from_str(raw)?;
        Self::new(document.rules)
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// An empty id, category or description is a substring of every clause and
// would shadow every rule after it.
fn validate_rules(rules: &[Rule]) -> Result<(), RulebookError> {
    for (index, rule) in rules.iter().enumerate() {
        let position = index + 1;
        let blank_field = [
            ("id", &rule.id),
            ("category", &rule.category),
            ("description", &rule.description),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());

        if let Some((field, _)) = blank_field {
            return Err(RulebookError::InvalidRule {
                position,
                reason: format!("`{field}` must not be empty"),
            });
        }
    }

    Ok(())
}
