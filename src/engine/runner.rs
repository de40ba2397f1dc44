// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::rc::Rc;

use crate::engine::context::RunContext;
use crate::engine::graph::{Graph, Source};
use crate::engine::scheduler;
use crate::errors::ExecutionError;
use crate::io;
use crate::model::Row;
use crate::observability::messages::engine::{
    CompileFinished, CompileStarted, GraphComputed, GraphStarted, ScheduledGraph,
    TopologicalSortFinished, TopologicalSortStarted, UnnamedGraphs, WritingFinalResult,
};
use crate::observability::messages::StructuredLog;
use crate::operators::{Operation, RowStream};

/// Bindings for one `run` invocation: one input handle per external input
/// name used by any reachable chain, the output handle the final chain
/// writes to, and the verbose flag.
pub struct RunArgs {
    inputs: HashMap<String, Box<dyn BufRead>>,
    output: Box<dyn Write>,
    verbose: bool,
}

impl RunArgs {
    pub fn new(output: impl Write + 'static) -> Self {
        Self {
            inputs: HashMap::new(),
            output: Box::new(output),
            verbose: false,
        }
    }

    /// Bind the handle the named external input is parsed from.
    pub fn input(mut self, name: impl Into<String>, handle: impl BufRead + 'static) -> Self {
        self.inputs.insert(name.into(), Box::new(handle));
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Execute `final_graph` and everything it depends on.
///
/// Schedules the reachable graphs topologically, runs each chain in order
/// against a fresh [`RunContext`], and writes the final chain's result to
/// the output handle. Chain failures surface wrapped with the owning
/// graph's name.
pub(crate) fn run(final_graph: &Graph, args: RunArgs) -> Result<(), ExecutionError> {
    let RunArgs {
        inputs,
        output,
        verbose,
    } = args;
    let mut context = RunContext::new(inputs, verbose);

    if verbose {
        TopologicalSortStarted.log();
    }
    let order = scheduler::topological_order(final_graph)?;
    if verbose {
        TopologicalSortFinished {
            graph_count: order.len(),
        }
        .log();
        if order.iter().any(|graph| graph.name().is_none()) {
            UnnamedGraphs.log();
        }
        for (position, graph) in order.iter().enumerate() {
            ScheduledGraph {
                position,
                graph: &graph.display_name(),
            }
            .log();
        }
    }

    let mut output = Some(output);
    for graph in &order {
        let sink = if graph.id() == final_graph.id() {
            output.take()
        } else {
            None
        };
        run_graph(graph, &mut context, sink).map_err(|source| ExecutionError::Graph {
            graph: graph.display_name(),
            source: Box::new(source),
        })?;
    }
    Ok(())
}

/// Run one chain: resolve its source, compile the operator pipeline,
/// drain it into the chain's result, and, for the final chain, write the
/// result to `sink`.
fn run_graph(
    graph: &Graph,
    context: &mut RunContext,
    sink: Option<Box<dyn Write>>,
) -> Result<(), ExecutionError> {
    let verbose = context.verbose;
    let name = graph.display_name();
    let inner = graph.borrow_inner();

    if verbose {
        GraphStarted {
            graph: &name,
            source: &inner.source.describe(),
        }
        .log();
    }

    let source_rows = match &inner.source {
        Source::Input(input_name) => context.input_rows(input_name)?,
        Source::Graph(source) => context.result_of(source)?,
    };

    if verbose {
        let operations: Vec<&'static str> = inner.operations.iter().map(Operation::name).collect();
        CompileStarted {
            graph: &name,
            operations: &operations,
        }
        .log();
    }

    // Compile: an implicit input node feeds the first operator, and each
    // operator's upstream is the preceding operator's lazy output.
    let mut stream: RowStream<'_> = Box::new(SourceStream {
        rows: source_rows,
        index: 0,
    });
    for operation in &inner.operations {
        stream = match operation {
            Operation::Map(map) => map.stream(stream),
            Operation::Fold(fold) => fold.stream(stream),
            Operation::Sort(sort) => sort.stream(stream),
            Operation::Reduce(reduce) => reduce.stream(stream),
            Operation::Join(join) => {
                let right = context.result_of(join.on())?;
                join.stream(stream, right)
            }
        };
    }

    if verbose {
        CompileFinished { graph: &name }.log();
    }

    // Execute: fully drain the terminal operator.
    let mut result = Vec::new();
    for row in stream {
        result.push(row?);
    }

    if verbose {
        GraphComputed {
            graph: &name,
            rows: result.len(),
        }
        .log();
    }

    if let Some(mut output) = sink {
        if verbose {
            WritingFinalResult { rows: result.len() }.log();
        }
        io::write_records(&mut output, &result)?;
        // dropping the handle closes it
    }

    drop(inner);
    context.store_result(graph, result);
    Ok(())
}

/// The implicit input node: replays the resolved source rows in order.
struct SourceStream {
    rows: Rc<Vec<Row>>,
    index: usize,
}

impl Iterator for SourceStream {
    type Item = Result<Row, ExecutionError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.get(self.index)?.clone();
        self.index += 1;
        Some(Ok(row))
    }
}
