use serde::{Deserialize, Serialize};

use crate::analysis::aggregate::aggregate;
use crate::domain::rule::Risk;

/// Display buckets the dashboard groups issues under.
pub const BUCKETS: [&str; 3] = ["Unfair Clauses", "Stamp Duty", "Your Rights"];

/// Per-clause classification verdict.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub clause: String,
    pub risk: Risk,
    pub category: String,
    pub rationale: String,
    pub recommendation: String,
    pub reference: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub high_risk: usize,
    pub medium_risk: usize,
    pub ok: usize,
    pub total: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: Summary,
    pub issues: Vec<Issue>,
    pub buckets: Vec<String>,
}

impl AnalysisResult {
    /// Tallies the issues and attaches the fixed display buckets.
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        Self {
            summary: aggregate(&issues),
            issues,
            buckets: BUCKETS.iter().map(|bucket| bucket.to_string()).collect(),
        }
    }

    pub fn high_risk_issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|issue| issue.risk == Risk::High)
    }
}
