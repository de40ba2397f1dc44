// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while an operator is being configured, before any run.

use thiserror::Error;

/// Invalid operator configuration, rejected at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Sort was given an empty key list.
    #[error("Sort requires at least one key to compare rows by")]
    EmptySortKeys,

    /// Reduce was given an empty grouping key list.
    #[error("Reduce requires at least one key to group rows by")]
    EmptyReduceKeys,

    /// A Join key list must name exactly one key per side.
    #[error("Join key list must name exactly two keys (left, right), got {got}")]
    JoinKeyArity { got: usize },

    /// Left and right joins group on a key; only outer may omit it.
    #[error("Join strategy '{strategy}' requires a key")]
    JoinKeyRequired { strategy: String },

    /// The strategy string did not name a known join strategy.
    #[error("unknown Join strategy '{strategy}', expected one of: outer, left, right")]
    UnknownJoinStrategy { strategy: String },
}
