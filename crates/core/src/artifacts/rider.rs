use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::analysis::AnalysisResult;

pub const RIDER_TITLE: &str = "Negotiation Rider - Proposed Changes";
pub const RIDER_PURPOSE: &str =
    "This document outlines proposed changes to address unfair clauses in the rental agreement";
pub const RIDER_LEGAL_BASIS: &str = "Based on Singapore rental law and industry standards";
pub const RIDER_CHANGE_LIMIT: usize = 15;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedChange {
    pub original_clause: String,
    pub proposed_change: String,
    pub rationale: String,
    pub category: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationRider {
    pub title: String,
    pub purpose: String,
    pub proposed_changes: Vec<ProposedChange>,
    pub legal_basis: String,
    pub generated_at: DateTime<Utc>,
}

impl NegotiationRider {
    /// One proposed change per HIGH issue, up to fifteen, in clause order.
    pub fn from_analysis(analysis: &AnalysisResult, generated_at: DateTime<Utc>) -> Self {
        let proposed_changes = analysis
            .high_risk_issues()
            .take(RIDER_CHANGE_LIMIT)
            .map(|issue| ProposedChange {
                original_clause: issue.clause.clone(),
                proposed_change: issue.recommendation.clone(),
                rationale: issue.rationale.clone(),
                category: issue.category.clone(),
            })
            .collect();

        Self {
            title: RIDER_TITLE.to_string(),
            purpose: RIDER_PURPOSE.to_string(),
            proposed_changes,
            legal_basis: RIDER_LEGAL_BASIS.to_string(),
            generated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::analysis::aggregate;
    use crate::domain::analysis::{AnalysisResult, Issue};
    use crate::domain::rule::Risk;

    use super::{NegotiationRider, RIDER_CHANGE_LIMIT};

    fn issue(n: usize, risk: Risk) -> Issue {
        Issue {
            clause: format!("clause {n}"),
            risk,
            category: "Unfair Clauses".to_string(),
            rationale: format!("rationale {n}"),
            recommendation: format!("change {n}"),
            reference: "reference".to_string(),
        }
    }

    #[test]
    fn rider_keeps_first_fifteen_high_risk_issues() {
        let mut issues: Vec<Issue> = (0..20).map(|n| issue(n, Risk::High)).collect();
        issues.insert(0, issue(99, Risk::Medium));
        let analysis = AnalysisResult { summary: aggregate(&issues), issues, buckets: Vec::new() };

        let rider = NegotiationRider::from_analysis(&analysis, Utc::now());

        assert_eq!(rider.proposed_changes.len(), RIDER_CHANGE_LIMIT);
        assert_eq!(rider.proposed_changes[0].original_clause, "clause 0");
        assert_eq!(rider.proposed_changes[0].proposed_change, "change 0");
        assert!(rider.proposed_changes.iter().all(|change| change.original_clause != "clause 99"));
    }
}
