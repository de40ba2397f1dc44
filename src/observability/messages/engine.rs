// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for run lifecycle events: scheduling, compilation, chain
//! execution and the terminal write.

use std::fmt::{Display, Formatter};

use crate::observability::messages::StructuredLog;

/// Topological sorting of the reachable graphs has started.
pub struct TopologicalSortStarted;

impl Display for TopologicalSortStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Topological sorting started")
    }
}

impl StructuredLog for TopologicalSortStarted {
    fn log(&self) {
        tracing::info!("{}", self);
    }
}

/// Topological sorting finished; the run order is fixed.
pub struct TopologicalSortFinished {
    pub graph_count: usize,
}

impl Display for TopologicalSortFinished {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Topological sorting finished: {} graph(s) scheduled",
            self.graph_count
        )
    }
}

impl StructuredLog for TopologicalSortFinished {
    fn log(&self) {
        tracing::info!(graph_count = self.graph_count, "{}", self);
    }
}

/// One entry of the scheduled order.
pub struct ScheduledGraph<'a> {
    pub position: usize,
    pub graph: &'a str,
}

impl Display for ScheduledGraph<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "  {}. {}", self.position + 1, self.graph)
    }
}

impl StructuredLog for ScheduledGraph<'_> {
    fn log(&self) {
        tracing::info!(position = self.position, graph = self.graph, "{}", self);
    }
}

/// Some scheduled graphs have no diagnostic name.
pub struct UnnamedGraphs;

impl Display for UnnamedGraphs {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Give names to all graphs with set_name if you want to see them in the topological order"
        )
    }
}

impl StructuredLog for UnnamedGraphs {
    fn log(&self) {
        tracing::info!("{}", self);
    }
}

/// A chain is about to run; names the source its rows come from.
pub struct GraphStarted<'a> {
    pub graph: &'a str,
    pub source: &'a str,
}

impl Display for GraphStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Running {}, source is {}", self.graph, self.source)
    }
}

impl StructuredLog for GraphStarted<'_> {
    fn log(&self) {
        tracing::info!(graph = self.graph, source = self.source, "{}", self);
    }
}

/// Operator wiring for a chain has started; lists the operators in chain
/// order.
pub struct CompileStarted<'a> {
    pub graph: &'a str,
    pub operations: &'a [&'static str],
}

impl Display for CompileStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.operations.is_empty() {
            write!(f, "Compiling {} (no operations)", self.graph)
        } else {
            write!(f, "Compiling {}: {}", self.graph, self.operations.join(" -> "))
        }
    }
}

impl StructuredLog for CompileStarted<'_> {
    fn log(&self) {
        tracing::info!(
            graph = self.graph,
            operations = self.operations.join(" -> "),
            "{}",
            self
        );
    }
}

/// Operator wiring for a chain has finished.
pub struct CompileFinished<'a> {
    pub graph: &'a str,
}

impl Display for CompileFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} was successfully compiled", self.graph)
    }
}

impl StructuredLog for CompileFinished<'_> {
    fn log(&self) {
        tracing::info!(graph = self.graph, "{}", self);
    }
}

/// A chain drained its terminal operator into its result.
pub struct GraphComputed<'a> {
    pub graph: &'a str,
    pub rows: usize,
}

impl Display for GraphComputed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} was successfully computed: {} row(s)",
            self.graph, self.rows
        )
    }
}

impl StructuredLog for GraphComputed<'_> {
    fn log(&self) {
        tracing::info!(graph = self.graph, rows = self.rows, "{}", self);
    }
}

/// The final chain's result is being written to the output handle.
pub struct WritingFinalResult {
    pub rows: usize,
}

impl Display for WritingFinalResult {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Writing {} result row(s) from the final graph to the output",
            self.rows
        )
    }
}

impl StructuredLog for WritingFinalResult {
    fn log(&self) {
        tracing::info!(rows = self.rows, "{}", self);
    }
}
