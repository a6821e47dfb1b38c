//! Minimal iCalendar (RFC 5545) writer for planner invites.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::artifacts::ArtifactError;

pub const DEFAULT_PROD_ID: &str = "-//leasecheck//planner//EN";
pub const SIGNING_EVENT_SUMMARY: &str = "Agreement Signing Meeting";
pub const REVIEW_EVENT_DESCRIPTION: &str =
    "Meeting to review rental agreement clauses and discuss negotiation points";

const ICS_TIMESTAMP: &str = "%Y%m%dT%H%M%SZ";
/// Content lines longer than this many octets are folded (RFC 5545 3.1).
pub const MAX_LINE_OCTETS: usize = 75;
const AGREEMENT_DATE_FORMATS: [&str; 3] = ["%d/%m/%y", "%d/%m/%Y", "%Y-%m-%d"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub uid: String,
    pub summary: String,
    pub description: String,
    pub location: Option<String>,
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub recurrence: Option<String>,
    pub reminder_secs: Option<i64>,
}

impl CalendarEvent {
    pub fn new(
        summary: impl Into<String>,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
        description: impl Into<String>,
    ) -> Result<Self, ArtifactError> {
        if begin >= end {
            return Err(ArtifactError::InvalidEventWindow { begin, end });
        }

        Ok(Self {
            uid: Uuid::new_v4().to_string(),
            summary: summary.into(),
            description: description.into(),
            location: None,
            begin,
            end,
            recurrence: None,
            reminder_secs: None,
        })
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Accepts either a bare rule (`FREQ=DAILY;COUNT=5`) or a full
    /// `RRULE:` property line.
    pub fn with_recurrence(mut self, rule: impl Into<String>) -> Self {
        let rule = rule.into();
        let rule = rule.strip_prefix("RRULE:").map(str::to_string).unwrap_or(rule);
        self.recurrence = Some(rule);
        self
    }

    pub fn with_reminder(mut self, before: Duration) -> Self {
        self.reminder_secs = Some(before.num_seconds().abs());
        self
    }

    fn render_into(&self, lines: &mut Vec<String>, stamped_at: DateTime<Utc>) {
        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!("UID:{}", self.uid));
        lines.push(format!("DTSTAMP:{}", stamped_at.format(ICS_TIMESTAMP)));
        lines.push(format!("DTSTART:{}", self.begin.format(ICS_TIMESTAMP)));
        lines.push(format!("DTEND:{}", self.end.format(ICS_TIMESTAMP)));
        lines.push(format!("SUMMARY:{}", escape_text(&self.summary)));
        lines.push(format!("DESCRIPTION:{}", escape_text(&self.description)));
        if let Some(location) = &self.location {
            lines.push(format!("LOCATION:{}", escape_text(location)));
        }
        if let Some(rule) = &self.recurrence {
            lines.push(format!("RRULE:{rule}"));
        }
        if let Some(seconds) = self.reminder_secs {
            lines.push("BEGIN:VALARM".to_string());
            lines.push(format!("TRIGGER:-PT{seconds}S"));
            lines.push("ACTION:DISPLAY".to_string());
            lines.push(format!("DESCRIPTION:{}", escape_text(&self.summary)));
            lines.push("END:VALARM".to_string());
        }
        lines.push("END:VEVENT".to_string());
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub prod_id: String,
    pub events: Vec<CalendarEvent>,
}

impl Default for Calendar {
    fn default() -> Self {
        Self { prod_id: DEFAULT_PROD_ID.to_string(), events: Vec::new() }
    }
}

impl Calendar {
    pub fn with_event(mut self, event: CalendarEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn add_event(&mut self, event: CalendarEvent) {
        self.events.push(event);
    }

    /// Renders the calendar with CRLF line endings.
    pub fn to_ics(&self, stamped_at: DateTime<Utc>) -> String {
        let mut lines = vec![
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            format!("PRODID:{}", self.prod_id),
        ];
        for event in &self.events {
            event.render_into(&mut lines, stamped_at);
        }
        lines.push("END:VCALENDAR".to_string());

        let mut output = String::new();
        for line in &lines {
            output.push_str(&fold_line(line));
            output.push_str("\r\n");
        }
        output
    }
}

/// Parses an agreement date as written by the intake step.
pub fn parse_agreement_date(raw: &str) -> Result<NaiveDate, ArtifactError> {
    let trimmed = raw.trim();
    AGREEMENT_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| ArtifactError::InvalidDate(raw.to_string()))
}

/// Signing meeting one week after the agreement date, 14:00-15:00 UTC.
pub fn signing_event(date_agreed: &str) -> Result<CalendarEvent, ArtifactError> {
    let signing_day = parse_agreement_date(date_agreed)? + Duration::weeks(1);
    let (begin, end) = afternoon_slot(signing_day);
    CalendarEvent::new(SIGNING_EVENT_SUMMARY, begin, end, "Sign the reviewed tenancy agreement")
}

/// Review meeting one week from `now`, used when no agreement date is known.
pub fn review_event(title: &str, now: DateTime<Utc>) -> Result<CalendarEvent, ArtifactError> {
    let (begin, end) = afternoon_slot(now.date_naive() + Duration::days(7));
    Ok(CalendarEvent::new(
        format!("Review Rental Agreement - {title}"),
        begin,
        end,
        REVIEW_EVENT_DESCRIPTION,
    )?
    .with_location("Virtual Meeting"))
}

/// Signing meeting when the agreement date is usable, otherwise a review
/// meeting one week out.
pub fn planner_event(
    title: &str,
    date_agreed: Option<&str>,
    now: DateTime<Utc>,
) -> Result<CalendarEvent, ArtifactError> {
    match date_agreed.map(signing_event) {
        Some(Ok(event)) => Ok(event),
        Some(Err(ArtifactError::InvalidDate(raw))) => {
            warn!(
                event_name = "artifacts.agreement_date_unparsed",
                date_agreed = %raw,
                "falling back to a review meeting"
            );
            review_event(title, now)
        }
        Some(Err(error)) => Err(error),
        None => review_event(title, now),
    }
}

fn afternoon_slot(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let two_pm = NaiveTime::from_hms_opt(14, 0, 0).unwrap_or_default();
    let begin = day.and_time(two_pm).and_utc();
    (begin, begin + Duration::hours(1))
}

/// Splits a content line into CRLF-space continuations of at most
/// `MAX_LINE_OCTETS` octets each, never inside a UTF-8 sequence.
fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut folded = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    // Continuation lines spend one octet on the leading space.
    let mut budget = MAX_LINE_OCTETS;
    let mut used = 0;
    for ch in line.chars() {
        let width = ch.len_utf8();
        if used + width > budget {
            folded.push_str("\r\n ");
            budget = MAX_LINE_OCTETS - 1;
            used = 0;
        }
        folded.push(ch);
        used += width;
    }
    folded
}

fn escape_text(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace("\r\n", "\\n")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use crate::artifacts::ArtifactError;

    use super::{
        fold_line, parse_agreement_date, planner_event, review_event, signing_event, Calendar,
        CalendarEvent, MAX_LINE_OCTETS, SIGNING_EVENT_SUMMARY,
    };

    #[test]
    fn event_window_must_be_ordered() {
        let at = Utc.with_ymd_and_hms(2025, 8, 18, 10, 0, 0).single().expect("valid timestamp");

        let error = CalendarEvent::new("Meeting", at, at, "Same instant").expect_err("empty window");
        assert!(matches!(error, ArtifactError::InvalidEventWindow { .. }));
        assert!(CalendarEvent::new("Meeting", at + Duration::hours(1), at, "Reversed").is_err());
    }

    #[test]
    fn signing_event_is_one_week_after_agreement_date() {
        let event = signing_event("01/08/25").expect("valid date");

        assert_eq!(event.begin.format("%Y%m%dT%H%M%SZ").to_string(), "20250808T140000Z");
        assert_eq!(event.end.format("%Y%m%dT%H%M%SZ").to_string(), "20250808T150000Z");
        assert_eq!(event.summary, "Agreement Signing Meeting");
    }

    #[test]
    fn agreement_date_accepts_long_year_and_iso_forms() {
        let short = parse_agreement_date("01/08/25").expect("short year");
        assert_eq!(parse_agreement_date("01/08/2025").expect("long year"), short);
        assert_eq!(parse_agreement_date("2025-08-01").expect("iso"), short);
        assert!(matches!(
            parse_agreement_date("first of August"),
            Err(ArtifactError::InvalidDate(_))
        ));
    }

    #[test]
    fn ics_output_contains_recurrence_and_reminder() {
        let begin = Utc.with_ymd_and_hms(2025, 8, 18, 10, 0, 0).single().expect("valid timestamp");
        let event = CalendarEvent::new(
            "Meeting",
            begin,
            begin + Duration::hours(1),
            "Discuss rider clauses, then sign; bring ID",
        )
        .expect("valid event")
        .with_recurrence("RRULE:FREQ=DAILY;COUNT=5")
        .with_reminder(Duration::minutes(30));

        let ics = Calendar::default().with_event(event).to_ics(begin);

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n"));
        assert!(ics.contains("DTSTART:20250818T100000Z\r\n"));
        assert!(ics.contains("RRULE:FREQ=DAILY;COUNT=5\r\n"));
        assert!(ics.contains("TRIGGER:-PT1800S\r\n"));
        assert!(ics.contains("DESCRIPTION:Discuss rider clauses\\, then sign\\; bring ID\r\n"));
        assert!(ics.ends_with("END:VEVENT\r\nEND:VCALENDAR\r\n"));
    }

    #[test]
    fn long_content_lines_are_folded_to_75_octets() {
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 9, 30, 0).single().expect("valid timestamp");
        let event = review_event(&"Blk 123 Tenancy Agreement 租约 ".repeat(4), now)
            .expect("review event");
        let ics = Calendar::default().with_event(event).to_ics(now);

        let lines: Vec<&str> = ics.trim_end_matches("\r\n").split("\r\n").collect();
        for line in &lines {
            assert!(line.len() <= MAX_LINE_OCTETS, "line exceeds 75 octets: {line}");
        }
        assert!(lines.iter().any(|line| line.starts_with(' ')));

        let unfolded = ics.replace("\r\n ", "");
        assert!(unfolded.contains(&format!("DESCRIPTION:{}\r\n", super::REVIEW_EVENT_DESCRIPTION)));
    }

    #[test]
    fn folding_keeps_multibyte_characters_whole() {
        let line = format!("SUMMARY:{}", "租".repeat(40));
        let folded = fold_line(&line);

        assert_eq!(folded.replace("\r\n ", ""), line);
        assert!(folded.split("\r\n").all(|part| part.len() <= MAX_LINE_OCTETS));
        assert_eq!(fold_line("SUMMARY:short"), "SUMMARY:short");
    }

    #[test]
    fn review_event_falls_one_week_after_now() {
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 9, 30, 0).single().expect("valid timestamp");
        let event = review_event("Blk 123 Lease", now).expect("review event");

        assert_eq!(event.begin.format("%Y-%m-%d %H:%M").to_string(), "2025-08-08 14:00");
        assert_eq!(event.summary, "Review Rental Agreement - Blk 123 Lease");
        assert_eq!(event.location.as_deref(), Some("Virtual Meeting"));
    }

    #[test]
    fn planner_event_prefers_signing_and_falls_back_to_review() {
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 9, 30, 0).single().expect("valid timestamp");

        let signing = planner_event("Lease", Some("10/08/25"), now).expect("signing event");
        assert_eq!(signing.summary, SIGNING_EVENT_SUMMARY);

        let unparsed = planner_event("Lease", Some("soon"), now).expect("review fallback");
        assert_eq!(unparsed.summary, "Review Rental Agreement - Lease");

        let undated = planner_event("Lease", None, now).expect("review event");
        assert_eq!(undated.begin, unparsed.begin);
    }
}
