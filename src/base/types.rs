use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// Identifier of an issue, unique within the tracked project.
pub type IssueId = u64;

/// A journal entry (comment or change record) attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journal {
    /// Display name of the user who wrote the entry.
    pub author: String,
    /// Note text, if the entry carries one.
    pub notes: Option<String>,
}

/// An issue as fetched from the tracker in a single cycle.
///
/// Issues are read-only and are discarded at the end of the cycle that fetched them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub id: IssueId,
    pub subject: String,
    pub priority: String,
    /// Assignee display name, or the unassigned sentinel.
    pub assignee: String,
    pub status: String,
    /// Raw creation timestamp as returned by the tracker; parsed only for display.
    pub created_on: Option<String>,
    pub updated_on: DateTime<Utc>,
    /// Raw due date as returned by the tracker; parsed only for display.
    pub due_date: Option<String>,
    /// Journal entries, oldest first.
    pub journals: Vec<Journal>,
}

impl Issue {
    /// The most recent journal entry, if any.
    pub fn last_journal(&self) -> Option<&Journal> {
        self.journals.last()
    }
}

/// A change observed between two consecutive snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    NewIssue(Issue),
    UpdatedIssue(Issue),
}

impl ChangeEvent {
    pub fn issue(&self) -> &Issue {
        match self {
            ChangeEvent::NewIssue(issue) | ChangeEvent::UpdatedIssue(issue) => issue,
        }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ChangeEvent::NewIssue(_) => "new",
            ChangeEvent::UpdatedIssue(_) => "updated",
        }
    }
}

/// The outbound chat a notification is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    /// The chat of the team identified by the assignee marker.
    Team,
    /// The chat for everything else.
    General,
}

/// A rendered notification, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub destination: Destination,
    pub text: String,
}

/// Last-seen modification timestamp per issue.
///
/// Owned by the poll loop and replaced wholesale after every successful cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueSnapshot {
    entries: BTreeMap<IssueId, DateTime<Utc>>,
}

impl IssueSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot that treats every given issue as already seen.
    pub fn from_issues<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Self {
        let entries = issues.into_iter().map(|issue| (issue.id, issue.updated_on)).collect();
        Self { entries }
    }

    pub fn get(&self, id: IssueId) -> Option<DateTime<Utc>> {
        self.entries.get(&id).copied()
    }

    pub fn insert(&mut self, id: IssueId, updated_on: DateTime<Utc>) {
        self.entries.insert(id, updated_on);
    }

    pub fn contains(&self, id: IssueId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tracked identifiers in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = IssueId> + '_ {
        self.entries.keys().copied()
    }
}

impl FromIterator<(IssueId, DateTime<Utc>)> for IssueSnapshot {
    fn from_iter<T: IntoIterator<Item = (IssueId, DateTime<Utc>)>>(iter: T) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}
