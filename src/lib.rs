//! Library root for `redmine-relay`.
//!
//! Redmine-relay watches the issue list of a Redmine project and relays every
//! new or updated issue to a Telegram chat:
//! - Polls the full issue list at a fixed interval
//! - Detects new and updated issues against an in-memory snapshot
//! - Routes each notification to a team chat or a general chat by assignee
//!
//! Snapshots live in memory only; issues changed while the relay is down are
//! not reported after a restart.

pub mod base;
pub mod interaction;
pub mod prelude;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use tracing::info;

/// Public async entry for the binary crate.
///
/// Builds the Redmine and Telegram clients and runs the poll loop until interrupted.
pub async fn start(config: Config) -> Void {
    info!("Starting redmine-relay ...");

    let runtime = runtime::Runtime::new(config)?;

    runtime.start().await?;

    Ok(())
}
