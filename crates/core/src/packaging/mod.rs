//! Frontend-facing reshaping of an analysis.

pub mod dashboard;
pub mod insights;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::analysis::AnalysisResult;
use crate::domain::intake::IntakeDocument;

pub use dashboard::{
    map_category, ArtifactKind, ArtifactLink, DashboardData, FlaggedClause, RiskCounts,
};
pub use insights::{CategoryCounts, DocumentInsights, RiskDistribution};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub title: String,
    pub date: Option<String>,
    pub generated_at: DateTime<Utc>,
}

/// Everything the dashboard needs for one document in a single payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrontendPackage {
    pub metadata: PackageMetadata,
    pub dashboard: DashboardData,
    pub insights: DocumentInsights,
    pub analysis: AnalysisResult,
}

impl FrontendPackage {
    pub fn build(
        document: &IntakeDocument,
        analysis: AnalysisResult,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let dashboard = DashboardData::from_analysis(&analysis);
        let insights =
            DocumentInsights::from_analysis(&document.title, document.date.as_deref(), &analysis);

        Self {
            metadata: PackageMetadata {
                title: document.title.clone(),
                date: document.date.clone(),
                generated_at,
            },
            dashboard,
            insights,
            analysis,
        }
    }
}
