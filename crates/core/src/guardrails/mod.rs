//! Post-processing of generated user-facing text.
//!
//! `GuardrailPipeline` applies configured rewrite rules in order; `qa`
//! layers rate limiting, PII redaction, disclaimers and an optional policy
//! review on top of a drafted response.

pub mod pii;
pub mod qa;

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::source::SourceFormat;

pub use qa::{NoopPolicyReviewer, PolicyReviewer, QaError, QaGuardrail, QaSettings, QaState};

#[derive(Debug, Error)]
pub enum GuardrailError {
    #[error("guardrail file was not found: `{0}`")]
    Missing(PathBuf),
    #[error("could not read guardrail file `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not parse YAML guardrails: {0}")]
    ParseYaml(#[from] serde_yaml::Error),
    #[error("could not parse TOML guardrails: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("unsupported guardrail format for `{0}` (expected .yaml, .yml or .toml)")]
    UnsupportedFormat(PathBuf),
    #[error("guardrail #{position} has an invalid pattern: {source}")]
    InvalidPattern { position: usize, source: regex::Error },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RawGuardrailRule {
    Regex {
        pattern: String,
        response: String,
    },
    Append {
        response: String,
    },
    Protect {
        #[serde(default)]
        pattern: Vec<String>,
        response: String,
    },
}

#[derive(Debug, Default, Deserialize)]
struct GuardrailDocument {
    #[serde(default)]
    rules: Vec<RawGuardrailRule>,
}

#[derive(Clone, Debug)]
pub enum GuardrailRule {
    /// Replaces every match; the response may reference groups as `$1`.
    Regex { regex: Regex, response: String },
    /// Appends the response as a new paragraph.
    Append { response: String },
    /// Replaces the whole text when any keyword occurs, ignoring case.
    Protect { keywords: Vec<String>, response: String },
}

impl GuardrailRule {
    pub fn apply(&self, text: String) -> String {
        match self {
            Self::Regex { regex, response } => regex.replace_all(&text, response.as_str()).into_owned(),
            Self::Append { response } => format!("{text}\n\n{response}"),
            Self::Protect { keywords, response } => {
                let lowered = text.to_lowercase();
                if keywords.iter().any(|keyword| lowered.contains(keyword.as_str())) {
                    response.clone()
                } else {
                    text
                }
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GuardrailPipeline {
    rules: Vec<GuardrailRule>,
}

impl GuardrailPipeline {
    pub fn new(rules: Vec<GuardrailRule>) -> Self {
        Self { rules }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GuardrailError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(GuardrailError::Missing(path.to_path_buf()));
        }

        let raw = fs::read_to_string(path)
            .map_err(|source| GuardrailError::Read { path: path.to_path_buf(), source })?;

        let pipeline = match SourceFormat::from_path(path) {
            Some(SourceFormat::Yaml) => Self::from_yaml_str(&raw)?,
            Some(SourceFormat::Toml) => Self::from_toml_str(&raw)?,
            None => return Err(GuardrailError::UnsupportedFormat(path.to_path_buf())),
        };

        info!(
            event_name = "guardrails.loaded",
            path = %path.display(),
            rule_count = pipeline.len(),
            "guardrail rules loaded"
        );
        Ok(pipeline)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, GuardrailError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let document: GuardrailDocument = serde_yaml::from_str(raw)?;
        Self::compile(document)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, GuardrailError> {
        let document: GuardrailDocument = toml::from_str(raw)?;
        Self::compile(document)
    }

    fn compile(document: GuardrailDocument) -> Result<Self, GuardrailError> {
        let mut rules = Vec::with_capacity(document.rules.len());
        for (index, raw) in document.rules.into_iter().enumerate() {
            let rule = match raw {
                RawGuardrailRule::Regex { pattern, response } => {
                    let regex = Regex::new(&pattern).map_err(|source| {
                        GuardrailError::InvalidPattern { position: index + 1, source }
                    })?;
                    GuardrailRule::Regex { regex, response }
                }
                RawGuardrailRule::Append { response } => GuardrailRule::Append { response },
                RawGuardrailRule::Protect { pattern, response } => GuardrailRule::Protect {
                    keywords: pattern.iter().map(|keyword| keyword.to_lowercase()).collect(),
                    response,
                },
            };
            rules.push(rule);
        }
        Ok(Self { rules })
    }

    pub fn process(&self, text: &str) -> String {
        self.rules.iter().fold(text.to_string(), |current, rule| rule.apply(current))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
