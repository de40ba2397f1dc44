// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for diagnostic logging.
//!
//! Each message type implements `Display` for the human-readable form and
//! [`StructuredLog`] for emission with machine-readable fields:
//!
//! ```rust
//! use rowflow::observability::messages::{StructuredLog, engine::GraphComputed};
//!
//! GraphComputed { graph: "count_words_graph", rows: 42 }.log();
//! ```

pub mod engine;

/// Trait for messages that support structured logging.
///
/// `log` emits the human-readable message (via `Display`) together with
/// the message's fields at the level matching the event's meaning.
pub trait StructuredLog {
    fn log(&self);
}
