//! Downloadable artifacts derived from an analysis: emails, the negotiation
//! rider and calendar invites.

pub mod calendar;
pub mod email;
pub mod rider;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub use calendar::{planner_event, review_event, signing_event, Calendar, CalendarEvent};
pub use email::{EmailDraft, EmailRenderer};
pub use rider::{NegotiationRider, ProposedChange};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
    #[error("event must start before it ends (begin {begin}, end {end})")]
    InvalidEventWindow { begin: DateTime<Utc>, end: DateTime<Utc> },
    #[error("unrecognized agreement date `{0}` (expected dd/mm/yy, dd/mm/yyyy or yyyy-mm-dd)")]
    InvalidDate(String),
}
