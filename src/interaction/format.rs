//! Rendering of change events into chat notifications.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};
use tracing::warn;

use crate::base::{
    config::Config,
    templates,
    types::{ChangeEvent, Destination, Issue, Notification},
};

/// Accepted due date shapes that carry a time of day.
const DUE_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Pick the chat for an assignee: the team chat when the assignee contains the marker.
pub fn destination_for(assignee: &str, marker: &str) -> Destination {
    if !marker.is_empty() && assignee.contains(marker) {
        Destination::Team
    } else {
        Destination::General
    }
}

/// Parse a due date given either with a time of day or as a bare date (midnight).
pub fn parse_due_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    DUE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()))
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().map(|d| d.and_time(NaiveTime::MIN)))
}

/// Parse a tracker timestamp; values without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").ok().map(|naive| naive.and_utc()))
}

/// Render a tracker timestamp in the configured display offset.
fn display_timestamp(timestamp: DateTime<Utc>, offset_minutes: i32) -> String {
    let offset = FixedOffset::east_opt(offset_minutes * 60).unwrap_or_else(|| Utc.fix());
    timestamp.with_timezone(&offset).format(templates::DISPLAY_FORMAT).to_string()
}

fn created_line(issue: &Issue, config: &Config) -> String {
    let created = match issue.created_on.as_deref() {
        Some(raw) => match parse_timestamp(raw) {
            Some(created) => display_timestamp(created, config.display_utc_offset_minutes),
            None => {
                warn!(issue_id = issue.id, created_on = raw, "Unparsable creation time, rendering placeholder");
                templates::NO_CREATED.to_string()
            }
        },
        None => templates::NO_CREATED.to_string(),
    };

    format!("{}: {}", templates::CREATED_LABEL, created)
}

fn header_lines(title: &str, issue: &Issue, config: &Config) -> Vec<String> {
    let mut lines = vec![
        format!("{title} #{}", issue.id),
        format!("{}: {}", templates::SUBJECT_LABEL, issue.subject),
        format!("{}: {}", templates::PRIORITY_LABEL, issue.priority),
        format!("{}: {}", templates::ASSIGNEE_LABEL, issue.assignee),
        format!("{}: {}", templates::STATUS_LABEL, issue.status),
        created_line(issue, config),
    ];

    if let Some(raw) = issue.due_date.as_deref() {
        match parse_due_date(raw) {
            Some(due) => lines.push(format!("{}: {}", templates::DUE_LABEL, due.format(templates::DISPLAY_FORMAT))),
            None => warn!(issue_id = issue.id, due_date = raw, "Unparsable due date, omitting it"),
        }
    }

    lines
}

/// Render a change event and pick its destination.
///
/// Updates include the author and note of the most recent journal entry, if any.
/// Journal entries made between two polls other than the last are not reported.
pub fn format_event(event: &ChangeEvent, config: &Config) -> Notification {
    let issue = event.issue();

    let mut lines = match event {
        ChangeEvent::NewIssue(_) => header_lines(templates::NEW_ISSUE_TITLE, issue, config),
        ChangeEvent::UpdatedIssue(_) => {
            let mut lines = header_lines(templates::UPDATED_ISSUE_TITLE, issue, config);

            if let Some(journal) = issue.last_journal() {
                lines.push(format!("{}: {}", templates::AUTHOR_LABEL, journal.author));
                lines.push(format!("{}: {}", templates::NOTES_LABEL, journal.notes.as_deref().unwrap_or(templates::NO_NOTES)));
            }

            lines
        }
    };

    lines.push(format!("{}: {}", templates::LINK_LABEL, config.issue_url(issue.id)));

    Notification {
        destination: destination_for(&issue.assignee, &config.team_assignee_marker),
        text: lines.join("\n"),
    }
}
