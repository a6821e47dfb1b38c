//! Clause-to-rule matching heuristics.
//!
//! Every matcher receives the clause already lower-cased so composite
//! matchers do not repeat the conversion per member.

use crate::domain::rule::Rule;

pub const DEFAULT_DESCRIPTION_TOKENS: usize = 3;

pub trait ClauseMatcher: Send + Sync {
    fn name(&self) -> &'static str;

    fn matches(&self, rule: &Rule, clause_lower: &str) -> bool;
}

/// Matches when the rule id, read as a phrase, appears in the clause
/// (`late_fee` matches "the late fee is...").
#[derive(Clone, Copy, Debug, Default)]
pub struct IdPhraseMatcher;

impl IdPhraseMatcher {
    pub fn phrase(id: &str) -> String {
        id.to_lowercase().replace(['_', '-'], " ")
    }
}

impl ClauseMatcher for IdPhraseMatcher {
    fn name(&self) -> &'static str {
        "id_phrase"
    }

    fn matches(&self, rule: &Rule, clause_lower: &str) -> bool {
        clause_lower.contains(&Self::phrase(&rule.id))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CategoryMatcher;

impl ClauseMatcher for CategoryMatcher {
    fn name(&self) -> &'static str {
        "category"
    }

    fn matches(&self, rule: &Rule, clause_lower: &str) -> bool {
        clause_lower.contains(&rule.category.to_lowercase())
    }
}

/// Matches when any of the leading description tokens appears in the clause.
#[derive(Clone, Copy, Debug)]
pub struct DescriptionPrefixMatcher {
    tokens: usize,
}

impl DescriptionPrefixMatcher {
    pub fn new(tokens: usize) -> Self {
        Self { tokens }
    }
}

impl Default for DescriptionPrefixMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_DESCRIPTION_TOKENS)
    }
}

impl ClauseMatcher for DescriptionPrefixMatcher {
    fn name(&self) -> &'static str {
        "description_prefix"
    }

    fn matches(&self, rule: &Rule, clause_lower: &str) -> bool {
        rule.description
            .to_lowercase()
            .split_whitespace()
            .take(self.tokens)
            .any(|token| clause_lower.contains(token))
    }
}

/// Succeeds if any member matcher succeeds, evaluated in order.
pub struct AnyOf {
    members: Vec<Box<dyn ClauseMatcher>>,
}

impl AnyOf {
    pub fn new(members: Vec<Box<dyn ClauseMatcher>>) -> Self {
        Self { members }
    }

    /// Name of the first member that accepts the rule, if any.
    pub fn matched_by(&self, rule: &Rule, clause_lower: &str) -> Option<&'static str> {
        self.members
            .iter()
            .find(|member| member.matches(rule, clause_lower))
            .map(|member| member.name())
    }
}

impl ClauseMatcher for AnyOf {
    fn name(&self) -> &'static str {
        "any_of"
    }

    fn matches(&self, rule: &Rule, clause_lower: &str) -> bool {
        self.matched_by(rule, clause_lower).is_some()
    }
}

/// Id phrase, then category, then the first three description tokens.
pub fn default_matcher() -> AnyOf {
    AnyOf::new(vec![
        Box::new(IdPhraseMatcher),
        Box::new(CategoryMatcher),
        Box::new(DescriptionPrefixMatcher::default()),
    ])
}
