//! Labels and display formats used when rendering notifications.

/// Display format for timestamps and due dates.
pub const DISPLAY_FORMAT: &str = "%d.%m.%Y %H:%M";

pub const NEW_ISSUE_TITLE: &str = "🆕 New issue";
pub const UPDATED_ISSUE_TITLE: &str = "🔄 Issue updated";
pub const SUBJECT_LABEL: &str = "📝 Subject";
pub const PRIORITY_LABEL: &str = "🚩 Priority";
pub const ASSIGNEE_LABEL: &str = "👤 Assignee";
pub const STATUS_LABEL: &str = "📊 Status";
pub const CREATED_LABEL: &str = "📅 Created";
pub const DUE_LABEL: &str = "⏳ Due";
pub const AUTHOR_LABEL: &str = "✍️ Author";
pub const NOTES_LABEL: &str = "📄 Note";
pub const LINK_LABEL: &str = "🔗 Link";

/// Rendered in place of a journal entry without note text.
pub const NO_NOTES: &str = "No description";

// Placeholders for fields the tracker omits.

pub const NO_PRIORITY: &str = "Not set";
pub const UNASSIGNED: &str = "Unassigned";
pub const NO_STATUS: &str = "Unknown";
pub const UNKNOWN_AUTHOR: &str = "Unknown user";
pub const NO_CREATED: &str = "Unknown";
