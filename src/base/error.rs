//! Error types for the service seams.
//!
//! Plumbing code returns `anyhow` results; these enums exist where the caller
//! needs to decide how to recover (skip a cycle, skip an event, or exit).

use thiserror::Error;

/// Missing or invalid configuration. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// The tracker could not deliver a complete issue list this cycle.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("tracker request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("tracker responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("tracker payload could not be parsed: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("issue list changed while paging (total {expected} became {actual})")]
    Shifted { expected: u64, actual: u64 },
}

/// A notification could not be delivered.
#[derive(Debug, Error)]
pub enum DeliverError {
    #[error("chat request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("chat rejected the message (status {status}): {description}")]
    Rejected { status: u16, description: String },
}
