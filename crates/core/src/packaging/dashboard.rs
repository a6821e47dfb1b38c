use serde::{Deserialize, Serialize};

use crate::domain::analysis::AnalysisResult;
use crate::domain::rule::Risk;

pub const TITLE_CHAR_LIMIT: usize = 50;
pub const FALLBACK_CATEGORY: &str = "Legal Issues";

const CATEGORY_MAP: [(&str, &str); 5] = [
    ("unfair", "Unfair Clauses"),
    ("rights", "Your Rights"),
    ("stamp duty", "Stamp Duty"),
    ("legal", "Legal Issues"),
    ("financial", "Financial Terms"),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCounts {
    pub high: usize,
    pub medium: usize,
    pub ok: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedClause {
    pub id: String,
    pub category: String,
    pub risk: Risk,
    pub title: String,
    pub description: String,
    pub anchor: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Ics,
    Email,
    Rider,
    Pdf,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactLink {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub risk_counts: RiskCounts,
    pub flagged_clauses: Vec<FlaggedClause>,
    pub artifacts: Vec<ArtifactLink>,
}

impl DashboardData {
    /// Reshapes an analysis into the dashboard view. Only HIGH and MEDIUM
    /// issues are flagged; ids and anchors follow the issue's 1-based position.
    pub fn from_analysis(analysis: &AnalysisResult) -> Self {
        let risk_counts = RiskCounts {
            high: analysis.summary.high_risk,
            medium: analysis.summary.medium_risk,
            ok: analysis.summary.ok,
        };

        let flagged_clauses = analysis
            .issues
            .iter()
            .enumerate()
            .filter(|(_, issue)| issue.risk.is_flagged())
            .map(|(index, issue)| {
                let id = (index + 1).to_string();
                FlaggedClause {
                    anchor: format!("clause-{id}"),
                    id,
                    category: map_category(&issue.category).to_string(),
                    risk: issue.risk,
                    title: issue.clause.chars().take(TITLE_CHAR_LIMIT).collect(),
                    description: issue.rationale.clone(),
                }
            })
            .collect();

        Self { risk_counts, flagged_clauses, artifacts: default_artifacts() }
    }
}

/// Maps a rulebook category onto one of the dashboard's fixed categories.
pub fn map_category(category: &str) -> &'static str {
    let lowered = category.to_lowercase();
    CATEGORY_MAP
        .iter()
        .find(|(needle, _)| lowered.contains(needle))
        .map(|(_, mapped)| *mapped)
        .unwrap_or(FALLBACK_CATEGORY)
}

pub fn default_artifacts() -> Vec<ArtifactLink> {
    [
        ("Task Schedule", ArtifactKind::Ics, "task-schedule"),
        ("Summary Email Draft", ArtifactKind::Email, "email-draft"),
        ("Amendment Rider", ArtifactKind::Rider, "amendment-rider"),
        ("Annotated Agreement", ArtifactKind::Pdf, "annotated-agreement"),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (name, kind, slug))| ArtifactLink {
        id: (index + 1).to_string(),
        name: name.to_string(),
        kind,
        url: format!("/download/{slug}"),
    })
    .collect()
}
