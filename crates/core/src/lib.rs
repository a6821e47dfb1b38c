pub mod analysis;
pub mod artifacts;
pub mod config;
pub mod domain;
pub mod errors;
pub mod guardrails;
pub mod packaging;
pub mod rulebook;

mod source;

pub use analysis::{aggregate, default_matcher, ClauseClassifier, ClauseMatcher};
pub use artifacts::{
    planner_event, ArtifactError, Calendar, CalendarEvent, EmailRenderer, NegotiationRider,
};
pub use domain::analysis::{AnalysisResult, Issue, Summary, BUCKETS};
pub use domain::intake::{IntakeDocument, IntakeError};
pub use domain::rule::{Risk, Rule, RuleRisk};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use guardrails::{GuardrailError, GuardrailPipeline, QaGuardrail, QaSettings, QaState};
pub use packaging::{DashboardData, DocumentInsights, FrontendPackage};
pub use rulebook::{Rulebook, RulebookError};
