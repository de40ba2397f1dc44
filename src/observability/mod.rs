// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging of engine progress.
//!
//! Message types follow a struct-based pattern with a `Display`
//! implementation so the engine never formats diagnostic strings inline:
//! each event the verbose mode reports is one type in
//! `messages::engine`, emitted through `tracing`.

pub mod messages;
