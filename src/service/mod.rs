//! Service integrations for external APIs and clients.
//!
//! This module contains the two I/O boundaries of the relay:
//! - Tracker services (e.g., Redmine), which provide issue snapshots
//! - Chat services (e.g., Telegram), which deliver notifications
//!
//! Each service module defines both a generic trait and a concrete implementation,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod tracker;
