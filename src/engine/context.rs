// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::io::BufRead;
use std::rc::Rc;

use crate::engine::graph::{Graph, GraphId};
use crate::errors::ExecutionError;
use crate::io;
use crate::model::Row;

/// Per-run mutable state shared by every chain of one `run` invocation.
///
/// Holds the unconsumed input handles, the parse cache that guarantees
/// each named input is read from its handle at most once, and the
/// materialized result of every executed chain. Built fresh per run and
/// dropped when the run ends, so graph definitions carry no run state.
pub(crate) struct RunContext {
    /// Handles not yet drained. A handle is removed, and thereby owned,
    /// by the first chain that needs its input name; it is dropped
    /// (closed) as soon as parsing completes.
    handles: HashMap<String, Box<dyn BufRead>>,
    /// Parsed rows per input name; first reader wins, later readers
    /// replay from here.
    inputs: HashMap<String, Rc<Vec<Row>>>,
    /// Materialized result of every executed chain, keyed by identity.
    results: HashMap<GraphId, Rc<Vec<Row>>>,
    pub(crate) verbose: bool,
}

impl RunContext {
    pub(crate) fn new(handles: HashMap<String, Box<dyn BufRead>>, verbose: bool) -> Self {
        Self {
            handles,
            inputs: HashMap::new(),
            results: HashMap::new(),
            verbose,
        }
    }

    /// Rows of the named external input, parsing the bound handle on
    /// first use and replaying from the cache afterwards.
    pub(crate) fn input_rows(&mut self, name: &str) -> Result<Rc<Vec<Row>>, ExecutionError> {
        if let Some(rows) = self.inputs.get(name) {
            return Ok(Rc::clone(rows));
        }
        let handle = self
            .handles
            .remove(name)
            .ok_or_else(|| ExecutionError::UnknownInput {
                name: name.to_string(),
            })?;
        let rows = Rc::new(io::read_records(handle)?);
        self.inputs.insert(name.to_string(), Rc::clone(&rows));
        Ok(rows)
    }

    /// The already-computed result of `graph`. The scheduler guarantees
    /// dependencies run first, so a miss is an engine bug.
    pub(crate) fn result_of(&self, graph: &Graph) -> Result<Rc<Vec<Row>>, ExecutionError> {
        self.results
            .get(&graph.id())
            .cloned()
            .ok_or_else(|| ExecutionError::Internal {
                message: format!(
                    "result of graph '{}' requested before it was computed",
                    graph.display_name()
                ),
            })
    }

    pub(crate) fn store_result(&mut self, graph: &Graph, rows: Vec<Row>) {
        self.results.insert(graph.id(), Rc::new(rows));
    }
}
