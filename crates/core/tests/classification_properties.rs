use std::sync::Arc;

use leasecheck_core::analysis::classifier::MISSING_CLAUSE_PLACEHOLDER;
use leasecheck_core::{
    default_matcher, ClauseClassifier, ClauseMatcher, IntakeDocument, Risk, Rule, RuleRisk,
    Rulebook,
};
use proptest::prelude::*;

fn rule_strategy() -> impl Strategy<Value = Rule> {
    (
        "[a-z]{2,8}(_[a-z]{2,8})?",
        "[A-Za-z]{2,8}( [A-Za-z]{2,8})?",
        "[A-Za-z]{2,8}( [A-Za-z]{2,8}){0,4}",
        prop_oneof![Just(RuleRisk::High), Just(RuleRisk::Medium)],
    )
        .prop_map(|(id, category, description, risk)| Rule {
            rationale: format!("{id} rationale"),
            recommendation: format!("{id} recommendation"),
            reference: format!("{id} reference"),
            id,
            category,
            description,
            risk,
        })
}

fn clause_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-z ]{0,40}",
        "[A-Za-z0-9 ,.%$]{0,60}",
        "\\PC{0,40}",
        "(租约|押金|印花税|ß|İ|é)[a-z ]{0,20}",
    ]
}

fn classifier_for(rules: Vec<Rule>) -> ClauseClassifier {
    let rulebook = Rulebook::new(rules).expect("generated rules are valid");
    ClauseClassifier::new(Arc::new(rulebook))
}

proptest! {
    #[test]
    fn summary_counts_always_add_up(
        rules in prop::collection::vec(rule_strategy(), 0..6),
        clauses in prop::collection::vec(clause_strategy(), 0..12),
    ) {
        let classifier = classifier_for(rules);
        let document = IntakeDocument::new("Generated Lease", clauses.clone());
        let result = classifier.analyze(&document);

        prop_assert_eq!(result.issues.len(), clauses.len());
        prop_assert_eq!(result.summary.total, clauses.len());
        prop_assert_eq!(
            result.summary.high_risk + result.summary.medium_risk + result.summary.ok,
            result.summary.total
        );
    }

    #[test]
    fn one_issue_per_clause_in_input_order(
        rules in prop::collection::vec(rule_strategy(), 0..6),
        clauses in prop::collection::vec(clause_strategy(), 0..12),
    ) {
        let classifier = classifier_for(rules);
        let issues = classifier.classify_all(&clauses);

        prop_assert_eq!(issues.len(), clauses.len());
        for (clause, issue) in clauses.iter().zip(&issues) {
            if clause.is_empty() {
                prop_assert_eq!(issue.clause.as_str(), MISSING_CLAUSE_PLACEHOLDER);
            } else {
                prop_assert_eq!(&issue.clause, clause);
            }
        }
    }

    #[test]
    fn verdict_follows_first_matching_rule(
        rules in prop::collection::vec(rule_strategy(), 0..6),
        clause in clause_strategy(),
    ) {
        let matcher = default_matcher();
        let clause_lower = clause.to_lowercase();
        let expected = rules.iter().find(|rule| matcher.matches(rule, &clause_lower)).cloned();

        let issue = classifier_for(rules).classify(&clause);

        match expected {
            Some(rule) => {
                prop_assert_eq!(issue.risk, Risk::from(rule.risk));
                prop_assert_eq!(issue.category, rule.category);
                prop_assert_eq!(issue.recommendation, rule.recommendation);
            }
            None => prop_assert_eq!(issue.risk, Risk::Ok),
        }
    }

    #[test]
    fn classification_is_idempotent(
        rules in prop::collection::vec(rule_strategy(), 0..6),
        clauses in prop::collection::vec(clause_strategy(), 0..12),
    ) {
        let classifier = classifier_for(rules);
        let document = IntakeDocument::new("Generated Lease", clauses);

        prop_assert_eq!(classifier.analyze(&document), classifier.analyze(&document));
    }
}
