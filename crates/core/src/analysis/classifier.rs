use std::sync::Arc;

use tracing::{debug, info};

use crate::analysis::matcher::{default_matcher, ClauseMatcher};
use crate::domain::analysis::{AnalysisResult, Issue};
use crate::domain::intake::IntakeDocument;
use crate::domain::rule::{Risk, Rule};
use crate::rulebook::Rulebook;

pub const MISSING_CLAUSE_PLACEHOLDER: &str = "[Missing clause]";
pub const JURISDICTION_SUFFIX: &str = " (Singapore context)";
pub const DEFAULT_CATEGORY: &str = "Your Rights";
pub const DEFAULT_RATIONALE: &str =
    "Clause does not match any known high-risk or unfair patterns. (Singapore context)";
pub const DEFAULT_RECOMMENDATION: &str = "No action needed.";
pub const DEFAULT_REFERENCE: &str = "CEA template";

/// Classifies clauses against a shared, read-only rulebook. First matching
/// rule in rulebook order wins; no match is an `OK` verdict, not an error.
pub struct ClauseClassifier {
    rulebook: Arc<Rulebook>,
    matcher: Box<dyn ClauseMatcher>,
}

impl ClauseClassifier {
    pub fn new(rulebook: Arc<Rulebook>) -> Self {
        Self::with_matcher(rulebook, Box::new(default_matcher()))
    }

    pub fn with_matcher(rulebook: Arc<Rulebook>, matcher: Box<dyn ClauseMatcher>) -> Self {
        Self { rulebook, matcher }
    }

    pub fn rulebook(&self) -> &Rulebook {
        &self.rulebook
    }

    pub fn classify(&self, clause: &str) -> Issue {
        let clause_lower = clause.to_lowercase();
        let matched = self.rulebook.iter().find(|rule| self.matcher.matches(rule, &clause_lower));

        let recorded_clause = if clause.is_empty() {
            MISSING_CLAUSE_PLACEHOLDER.to_string()
        } else {
            clause.to_string()
        };

        match matched {
            Some(rule) => {
                debug!(
                    event_name = "analysis.clause_matched",
                    rule_id = %rule.id,
                    matcher = self.matcher.name(),
                    "clause matched rule"
                );
                issue_from_rule(recorded_clause, rule)
            }
            None => Issue {
                clause: recorded_clause,
                risk: Risk::Ok,
                category: DEFAULT_CATEGORY.to_string(),
                rationale: DEFAULT_RATIONALE.to_string(),
                recommendation: DEFAULT_RECOMMENDATION.to_string(),
                reference: DEFAULT_REFERENCE.to_string(),
            },
        }
    }

    pub fn classify_all<S: AsRef<str>>(&self, clauses: &[S]) -> Vec<Issue> {
        clauses.iter().map(|clause| self.classify(clause.as_ref())).collect()
    }

    pub fn analyze(&self, document: &IntakeDocument) -> AnalysisResult {
        let result = AnalysisResult::from_issues(self.classify_all(&document.clauses));
        let summary = result.summary;

        info!(
            event_name = "analysis.completed",
            title = %document.title,
            total = summary.total,
            high_risk = summary.high_risk,
            medium_risk = summary.medium_risk,
            ok = summary.ok,
            "clause analysis completed"
        );

        result
    }
}

fn issue_from_rule(clause: String, rule: &Rule) -> Issue {
    Issue {
        clause,
        risk: rule.risk.into(),
        category: rule.category.clone(),
        rationale: format!("{}{JURISDICTION_SUFFIX}", rule.rationale),
        recommendation: rule.recommendation.clone(),
        reference: rule.reference.clone(),
    }
}
