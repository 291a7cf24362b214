//! Change detection between two issue snapshots.

use crate::base::types::{ChangeEvent, Issue, IssueSnapshot};

/// Diff a freshly fetched issue list against the previous snapshot.
///
/// Events are emitted in the order of `current`. The returned snapshot holds
/// exactly the identifiers of `current`; issues that disappeared are dropped
/// without an event.
///
/// Only strictly newer modification times count as updates. Several edits
/// between two polls surface as a single update carrying the latest state.
pub fn detect(previous: &IssueSnapshot, current: Vec<Issue>) -> (Vec<ChangeEvent>, IssueSnapshot) {
    let mut next = IssueSnapshot::new();
    let mut events = Vec::new();

    for issue in current {
        // A repeated id within one list is compared against what this pass already recorded.
        let seen = next.get(issue.id).or_else(|| previous.get(issue.id));

        match seen {
            None => {
                next.insert(issue.id, issue.updated_on);
                events.push(ChangeEvent::NewIssue(issue));
            }
            Some(last) if issue.updated_on > last => {
                next.insert(issue.id, issue.updated_on);
                events.push(ChangeEvent::UpdatedIssue(issue));
            }
            Some(last) => {
                next.insert(issue.id, last);
            }
        }
    }

    (events, next)
}
