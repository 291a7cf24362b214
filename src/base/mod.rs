//! Core components, types, and utilities for the relay.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Notification labels and display formats.
//! - Domain types, error types, and result handling.

pub mod config;
pub mod error;
pub mod templates;
pub mod types;
