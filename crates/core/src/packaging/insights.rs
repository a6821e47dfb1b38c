use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::analysis::AnalysisResult;
use crate::domain::rule::Risk;

pub const TOP_RECOMMENDATION_WINDOW: usize = 10;
const DOCUMENT_ID_LEN: usize = 12;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub high_risk_percentage: f64,
    pub medium_risk_percentage: f64,
    pub safe_percentage: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub ok: usize,
}

/// Derived views the frontend shows next to the raw analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentInsights {
    pub document_id: String,
    pub risk_distribution: RiskDistribution,
    pub category_breakdown: BTreeMap<String, CategoryCounts>,
    pub top_recommendations: Vec<String>,
}

impl DocumentInsights {
    pub fn from_analysis(title: &str, date: Option<&str>, analysis: &AnalysisResult) -> Self {
        Self {
            document_id: document_id(title, date),
            risk_distribution: risk_distribution(analysis),
            category_breakdown: category_breakdown(analysis),
            top_recommendations: top_recommendations(analysis),
        }
    }
}

/// Stable short id for a document, derived from its title and agreement date.
pub fn document_id(title: &str, date: Option<&str>) -> String {
    let digest = blake3::hash(format!("{title}_{}", date.unwrap_or_default()).as_bytes());
    digest.to_hex()[..DOCUMENT_ID_LEN].to_string()
}

pub fn risk_distribution(analysis: &AnalysisResult) -> RiskDistribution {
    let denominator = analysis.summary.total.max(1) as f64;
    let percentage = |count: usize| (count as f64 / denominator * 1000.0).round() / 10.0;

    RiskDistribution {
        high_risk_percentage: percentage(analysis.summary.high_risk),
        medium_risk_percentage: percentage(analysis.summary.medium_risk),
        safe_percentage: percentage(analysis.summary.ok),
    }
}

pub fn category_breakdown(analysis: &AnalysisResult) -> BTreeMap<String, CategoryCounts> {
    let mut breakdown: BTreeMap<String, CategoryCounts> = BTreeMap::new();
    for issue in &analysis.issues {
        let counts = breakdown.entry(issue.category.clone()).or_default();
        counts.total += 1;
        match issue.risk {
            Risk::High => counts.high += 1,
            Risk::Medium => counts.medium += 1,
            Risk::Ok => counts.ok += 1,
        }
    }
    breakdown
}

/// Distinct, non-empty recommendations from the leading issues, in order.
pub fn top_recommendations(analysis: &AnalysisResult) -> Vec<String> {
    let mut recommendations: Vec<String> = Vec::new();
    for issue in analysis.issues.iter().take(TOP_RECOMMENDATION_WINDOW) {
        let recommendation = issue.recommendation.trim();
        if recommendation.is_empty()
            || recommendations.iter().any(|existing| existing == recommendation)
        {
            continue;
        }
        recommendations.push(recommendation.to_string());
    }
    recommendations
}

#[cfg(test)]
mod tests {
    use crate::analysis::aggregate;
    use crate::domain::analysis::{AnalysisResult, Issue};
    use crate::domain::rule::Risk;

    use super::{document_id, DocumentInsights};

    fn issue(risk: Risk, category: &str, recommendation: &str) -> Issue {
        Issue {
            clause: "clause".to_string(),
            risk,
            category: category.to_string(),
            rationale: "rationale".to_string(),
            recommendation: recommendation.to_string(),
            reference: "reference".to_string(),
        }
    }

    fn analysis(issues: Vec<Issue>) -> AnalysisResult {
        AnalysisResult { summary: aggregate(&issues), issues, buckets: Vec::new() }
    }

    #[test]
    fn distribution_rounds_to_one_decimal() {
        let insights = DocumentInsights::from_analysis(
            "Lease",
            None,
            &analysis(vec![
                issue(Risk::High, "Unfair Clauses", "Negotiate"),
                issue(Risk::Ok, "Your Rights", "No action needed."),
                issue(Risk::Ok, "Your Rights", "No action needed."),
            ]),
        );

        assert_eq!(insights.risk_distribution.high_risk_percentage, 33.3);
        assert_eq!(insights.risk_distribution.medium_risk_percentage, 0.0);
        assert_eq!(insights.risk_distribution.safe_percentage, 66.7);
    }

    #[test]
    fn empty_analysis_does_not_divide_by_zero() {
        let insights = DocumentInsights::from_analysis("Lease", None, &analysis(Vec::new()));
        assert_eq!(insights.risk_distribution.safe_percentage, 0.0);
        assert!(insights.category_breakdown.is_empty());
    }

    #[test]
    fn breakdown_and_recommendations_are_grouped_and_deduplicated() {
        let insights = DocumentInsights::from_analysis(
            "Lease",
            Some("01/08/25"),
            &analysis(vec![
                issue(Risk::High, "Unfair Clauses", "Negotiate"),
                issue(Risk::Medium, "Unfair Clauses", "Negotiate"),
                issue(Risk::Ok, "Your Rights", ""),
                issue(Risk::Medium, "Stamp Duty", "Budget for stamp duty"),
            ]),
        );

        let unfair = insights.category_breakdown["Unfair Clauses"];
        assert_eq!((unfair.total, unfair.high, unfair.medium, unfair.ok), (2, 1, 1, 0));
        assert_eq!(
            insights.top_recommendations,
            vec!["Negotiate".to_string(), "Budget for stamp duty".to_string()]
        );
    }

    #[test]
    fn document_id_is_stable_and_short() {
        let first = document_id("Lease", Some("01/08/25"));
        assert_eq!(first, document_id("Lease", Some("01/08/25")));
        assert_ne!(first, document_id("Lease", Some("02/08/25")));
        assert_eq!(first.len(), 12);
    }
}
