use crate::domain::analysis::{Issue, Summary};
use crate::domain::rule::Risk;

/// Tallies issues by risk level. No weighting and no deduplication.
pub fn aggregate(issues: &[Issue]) -> Summary {
    let mut summary = Summary { total: issues.len(), ..Summary::default() };
    for issue in issues {
        match issue.risk {
            Risk::High => summary.high_risk += 1,
            Risk::Medium => summary.medium_risk += 1,
            Risk::Ok => summary.ok += 1,
        }
    }
    summary
}

impl Summary {
    pub fn from_issues(issues: &[Issue]) -> Self {
        aggregate(issues)
    }

    pub fn is_consistent(&self) -> bool {
        self.high_risk + self.medium_risk + self.ok == self.total
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::analysis::{Issue, Summary};
    use crate::domain::rule::Risk;

    use super::aggregate;

    fn issue(risk: Risk) -> Issue {
        Issue {
            clause: "clause".to_string(),
            risk,
            category: "category".to_string(),
            rationale: "rationale".to_string(),
            recommendation: "recommendation".to_string(),
            reference: "reference".to_string(),
        }
    }

    #[test]
    fn counts_each_risk_level_and_total() {
        let issues = vec![
            issue(Risk::High),
            issue(Risk::Ok),
            issue(Risk::High),
            issue(Risk::Medium),
            issue(Risk::Ok),
        ];
        let summary = aggregate(&issues);

        assert_eq!(summary, Summary { high_risk: 2, medium_risk: 1, ok: 2, total: 5 });
        assert!(summary.is_consistent());
    }

    #[test]
    fn duplicate_issues_are_counted_individually() {
        let issues = vec![issue(Risk::Medium), issue(Risk::Medium)];
        assert_eq!(Summary::from_issues(&issues).medium_risk, 2);
    }

    #[test]
    fn empty_issue_list_is_all_zero() {
        assert_eq!(aggregate(&[]), Summary::default());
    }
}
