// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crate::engine::runner::{self, RunArgs};
use crate::errors::ExecutionError;
use crate::operators::Operation;

/// One linear chain of operators driven by a single source.
///
/// A `Graph` is a cheap shared handle: cloning it clones the handle, not
/// the chain, so the same graph can be the source of one chain and the
/// join target of another. Graphs are wired eagerly and stay inert until
/// [`Graph::run`] is invoked on the final one; all mutable run state (the
/// input cache, results, traversal colors) lives in a per-run context, so
/// repeated runs of the same definitions are independent.
///
/// Dependencies are recorded automatically: sourcing from a graph and
/// joining on a graph both append it to the dependency list the scheduler
/// traverses.
#[derive(Clone)]
pub struct Graph {
    inner: Rc<RefCell<GraphInner>>,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("name", &self.display_name())
            .finish()
    }
}

/// Where a chain's rows come from.
pub(crate) enum Source {
    /// Named external input, bound to a handle in [`RunArgs`].
    Input(String),
    /// Another chain, whose materialized result feeds this one.
    Graph(Graph),
}

impl Source {
    pub(crate) fn describe(&self) -> String {
        match self {
            Source::Input(name) => format!("input '{name}'"),
            Source::Graph(graph) => format!("graph '{}'", graph.display_name()),
        }
    }
}

pub(crate) struct GraphInner {
    pub(crate) name: Option<String>,
    pub(crate) source: Source,
    pub(crate) operations: Vec<Operation>,
    pub(crate) dependencies: Vec<Graph>,
}

/// Identity of a graph for the duration of a run, derived from its
/// handle's allocation. Used to key per-run colors and results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct GraphId(usize);

impl Graph {
    fn with_source(source: Source) -> Self {
        Self {
            inner: Rc::new(RefCell::new(GraphInner {
                name: None,
                source,
                operations: Vec::new(),
                dependencies: Vec::new(),
            })),
        }
    }

    /// New chain sourced from the named external input. The name is
    /// resolved to a handle when `run` is invoked.
    pub fn from_input(name: impl Into<String>) -> Self {
        Self::with_source(Source::Input(name.into()))
    }

    /// New chain sourced from another chain's result. Records `source` as
    /// a dependency.
    pub fn from_graph(source: &Graph) -> Self {
        let graph = Self::with_source(Source::Graph(source.clone()));
        graph.inner.borrow_mut().dependencies.push(source.clone());
        graph
    }

    /// Diagnostic name shown in verbose output and error messages.
    pub fn set_name(&self, name: impl Into<String>) {
        self.inner.borrow_mut().name = Some(name.into());
    }

    pub fn name(&self) -> Option<String> {
        self.inner.borrow().name.clone()
    }

    pub(crate) fn display_name(&self) -> String {
        self.name().unwrap_or_else(|| "<unnamed>".to_string())
    }

    /// Append an operator to the chain. Adding a Join also records the
    /// joined graph as a dependency.
    pub fn add_operation(&self, operation: impl Into<Operation>) {
        let operation = operation.into();
        let mut inner = self.inner.borrow_mut();
        if let Operation::Join(join) = &operation {
            inner.dependencies.push(join.on().clone());
        }
        inner.operations.push(operation);
    }

    /// Run this chain as the final one: schedule every reachable chain in
    /// dependency order, execute them, and write this chain's result to
    /// the output handle bound in `args`.
    pub fn run(&self, args: RunArgs) -> Result<(), ExecutionError> {
        runner::run(self, args)
    }

    pub(crate) fn id(&self) -> GraphId {
        GraphId(Rc::as_ptr(&self.inner) as usize)
    }

    pub(crate) fn dependencies(&self) -> Vec<Graph> {
        self.inner.borrow().dependencies.clone()
    }

    pub(crate) fn borrow_inner(&self) -> Ref<'_, GraphInner> {
        self.inner.borrow()
    }
}
