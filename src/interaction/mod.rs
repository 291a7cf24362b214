//! Change handling for the relay.
//!
//! This module turns issue snapshots into chat notifications:
//! - Detecting new and updated issues between two snapshots
//! - Rendering change events and choosing their destination chat
//! - Dispatching the rendered notifications in order

pub mod detect;
pub mod format;
pub mod notify;
