//! QA pass over a drafted answer before it reaches a tenant.
//!
//! Steps run in a fixed order: validation, per-user rate limiting, PII
//! redaction, disclaimer insertion, optional policy review and final
//! assembly. A rate-limited request short-circuits with a canned reply.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::guardrails::pii::PiiRedactor;

pub const DEFAULT_DISCLAIMER: &str = "⚠️ Not legal advice. General info for **Singapore** tenant \
rights only. Laws/policies change; verify with official sources or a qualified lawyer.";
pub const DEFAULT_MAX_PER_HOUR: u32 = 20;
pub const RATE_WINDOW_SECS: i64 = 3600;

const PII_NOTE: &str = "\n\n(We redacted detected personal data before processing.)";
const QA_NOTES_HEADER: &str = "\n\n⚠️ QA notes:\n- ";

#[derive(Debug, Error)]
pub enum QaError {
    #[error("user_id is required")]
    MissingUserId,
    #[error("invalid PII pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("policy review failed: {0}")]
pub struct PolicyReviewError(pub String);

/// Reviews a draft against policy and returns human-readable issues.
pub trait PolicyReviewer: Send + Sync {
    fn review(&self, draft: &str) -> Result<Vec<String>, PolicyReviewError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopPolicyReviewer;

impl PolicyReviewer for NoopPolicyReviewer {
    fn review(&self, _draft: &str) -> Result<Vec<String>, PolicyReviewError> {
        Ok(Vec::new())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaState {
    pub user_id: String,
    pub draft: String,
    #[serde(rename = "final", default, skip_serializing_if = "Option::is_none")]
    pub final_text: Option<String>,
    #[serde(default)]
    pub pii_hits: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub disclaimer_added: bool,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub rate_blocked: bool,
}

impl QaState {
    pub fn new(user_id: impl Into<String>, draft: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), draft: draft.into(), ..Self::default() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QaSettings {
    pub disclaimer: String,
    pub max_per_hour: u32,
    pub policy_review: bool,
}

impl Default for QaSettings {
    fn default() -> Self {
        Self {
            disclaimer: DEFAULT_DISCLAIMER.to_string(),
            max_per_hour: DEFAULT_MAX_PER_HOUR,
            policy_review: false,
        }
    }
}

pub struct QaGuardrail {
    settings: QaSettings,
    redactor: PiiRedactor,
    reviewer: Box<dyn PolicyReviewer>,
    windows: Mutex<HashMap<String, VecDeque<DateTime<Utc>>>>,
}

impl std::fmt::Debug for QaGuardrail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QaGuardrail").field("settings", &self.settings).finish_non_exhaustive()
    }
}

impl QaGuardrail {
    pub fn new(settings: QaSettings) -> Result<Self, QaError> {
        Ok(Self {
            settings,
            redactor: PiiRedactor::new()?,
            reviewer: Box::new(NoopPolicyReviewer),
            windows: Mutex::new(HashMap::new()),
        })
    }

    pub fn with_reviewer(mut self, reviewer: Box<dyn PolicyReviewer>) -> Self {
        self.reviewer = reviewer;
        self
    }

    pub fn settings(&self) -> &QaSettings {
        &self.settings
    }

    pub fn invoke(&self, mut state: QaState, now: DateTime<Utc>) -> Result<QaState, QaError> {
        if state.user_id.trim().is_empty() {
            return Err(QaError::MissingUserId);
        }

        if !self.admit(&state.user_id, now) {
            info!(
                event_name = "qa.rate_limited",
                user_id = %state.user_id,
                max_per_hour = self.settings.max_per_hour,
                "request blocked by rate limit"
            );
            state.rate_blocked = true;
            state.final_text = Some(format!(
                "{}\n\nRate limit reached ({}/hour). Please try later.",
                self.settings.disclaimer, self.settings.max_per_hour
            ));
            return Ok(state);
        }

        let redaction = self.redactor.redact(&state.draft);
        state.draft = redaction.text;
        state.pii_hits = redaction.hits;

        if !state.draft.to_lowercase().contains(&self.settings.disclaimer.to_lowercase()) {
            state.draft = format!("{}\n\n{}", self.settings.disclaimer, state.draft);
            state.disclaimer_added = true;
        }

        if self.settings.policy_review {
            state.issues = match self.reviewer.review(&state.draft) {
                Ok(issues) => issues,
                Err(error) => {
                    warn!(
                        event_name = "qa.policy_review_failed",
                        error = %error,
                        "continuing without policy review"
                    );
                    Vec::new()
                }
            };
        }

        let mut final_text = state.draft.clone();
        if !state.pii_hits.is_empty() {
            final_text.push_str(PII_NOTE);
        }
        if !state.issues.is_empty() {
            final_text.push_str(QA_NOTES_HEADER);
            final_text.push_str(&state.issues.join("\n- "));
        }
        state.final_text = Some(final_text);

        Ok(state)
    }

    // Blocked requests are not recorded, so they do not extend the window. A
    // request exactly one window old still counts.
    fn admit(&self, user_id: &str, now: DateTime<Utc>) -> bool {
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let window = windows.entry(user_id.to_string()).or_default();
        let horizon = now - Duration::seconds(RATE_WINDOW_SECS);
        while window.front().is_some_and(|seen| *seen < horizon) {
            window.pop_front();
        }

        if window.len() >= self.settings.max_per_hour as usize {
            return false;
        }
        window.push_back(now);
        true
    }
}
