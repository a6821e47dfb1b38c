use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const UNKNOWN_TITLE: &str = "Unknown Agreement";

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("intake document must be a JSON object")]
    NotAnObject,
    #[error("intake document is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Structured output of the document-intake step: the normalized agreement
/// title, its agreement date as written in the document, and the clause list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeDocument {
    pub title: String,
    pub date: Option<String>,
    pub clauses: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct IntakePayload {
    title: Option<String>,
    #[serde(alias = "date_agreed")]
    date: Option<String>,
    #[serde(default)]
    clauses: Vec<Option<String>>,
}

impl IntakeDocument {
    pub fn new(title: impl Into<String>, clauses: Vec<String>) -> Self {
        Self { title: title.into(), date: None, clauses }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Accepts either the flat `{title, date, clauses}` object or the intake
    /// envelope that nests it under `summary.content` or `anchor.content`.
    pub fn from_json_value(value: Value) -> Result<Self, IntakeError> {
        if !value.is_object() {
            return Err(IntakeError::NotAnObject);
        }

        let content = ["summary", "anchor"]
            .iter()
            .find_map(|key| value.get(key).and_then(|wrapper| wrapper.get("content")).cloned())
            .unwrap_or(value);

        let payload: IntakePayload = serde_json::from_value(content)?;
        Ok(Self {
            title: payload
                .title
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            date: payload.date.filter(|date| !date.trim().is_empty()),
            clauses: payload.clauses.into_iter().map(Option::unwrap_or_default).collect(),
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, IntakeError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_json_value(value)
    }
}
