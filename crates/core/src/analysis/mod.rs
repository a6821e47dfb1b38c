pub mod aggregate;
pub mod classifier;
pub mod matcher;

pub use aggregate::aggregate;
pub use classifier::ClauseClassifier;
pub use matcher::{
    default_matcher, AnyOf, CategoryMatcher, ClauseMatcher, DescriptionPrefixMatcher,
    IdPhraseMatcher,
};
