// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while a run is executing.
//!
//! Every error here is fatal to the run: the engine aborts, partial output
//! already written to the sink is indeterminate, and the error surfaces to
//! the caller wrapped with the name of the graph that was executing.

use thiserror::Error;

/// Error type returned by user-supplied mappers, folders and reducers.
pub type CallableError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A failure during `run`.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The dependency graph contains a cycle; detected by the scheduler
    /// before any operator executes.
    #[error("cycle detected in the dependency graph at '{graph}'")]
    CycleDetected { graph: String },

    /// A graph names an external input that no handle was bound for.
    #[error("no input handle bound for source '{name}'")]
    UnknownInput { name: String },

    /// A row does not carry a field an operator needs.
    #[error("{operator} requires field '{field}' but the row does not carry it")]
    MissingField {
        operator: &'static str,
        field: String,
    },

    /// Sort or Join compared values of two different kinds.
    #[error("cannot compare a {left} value with a {right} value")]
    IncomparableValues {
        left: &'static str,
        right: &'static str,
    },

    /// An input line could not be decoded as a record.
    #[error("failed to decode input line {line}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A result row could not be serialized for the terminal write.
    #[error("failed to encode result record")]
    Encode {
        #[source]
        source: serde_json::Error,
    },

    /// Reading an input handle or writing the output handle failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A user-supplied mapper, folder or reducer failed.
    #[error("{operator} callable failed")]
    Callable {
        operator: &'static str,
        #[source]
        source: CallableError,
    },

    /// Wrapper attaching the owning graph's name to a chain failure.
    #[error("graph '{graph}' failed")]
    Graph {
        graph: String,
        #[source]
        source: Box<ExecutionError>,
    },

    /// A state the scheduler is supposed to make unreachable.
    #[error("internal error: {message}")]
    Internal { message: String },
}
