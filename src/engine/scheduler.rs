// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::engine::graph::{Graph, GraphId};
use crate::errors::ExecutionError;

/// Traversal state of one graph during the topological sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Not reached yet.
    White,
    /// On the current DFS path; reaching a grey graph again is a back
    /// edge, i.e. a cycle.
    Grey,
    /// Fully processed and appended to the order.
    Black,
}

/// Compute a topological order over every graph reachable from
/// `final_graph` through dependency edges (source-of and join-on).
///
/// Depth-first traversal with the three-color scheme, on an explicit work
/// stack so that dependency height is bounded by the heap rather than the
/// host's call stack. Dependencies are visited in list order, which makes
/// the result deterministic for a given wiring: every dependency precedes
/// its dependents and the final graph comes last.
///
/// A cycle fails with [`ExecutionError::CycleDetected`] naming the graph
/// the back edge points at.
pub(crate) fn topological_order(final_graph: &Graph) -> Result<Vec<Graph>, ExecutionError> {
    let mut colors: HashMap<GraphId, Color> = HashMap::new();
    let mut order: Vec<Graph> = Vec::new();
    // Each frame is a graph plus the index of its next unvisited dependency.
    let mut stack: Vec<(Graph, usize)> = Vec::new();

    colors.insert(final_graph.id(), Color::Grey);
    stack.push((final_graph.clone(), 0));

    while !stack.is_empty() {
        let top = stack.len() - 1;
        let (graph, next_dependency) = {
            let (graph, next_dependency) = &stack[top];
            (graph.clone(), *next_dependency)
        };
        let dependencies = graph.dependencies();

        if let Some(dependency) = dependencies.get(next_dependency) {
            stack[top].1 += 1;
            match colors.get(&dependency.id()).copied().unwrap_or(Color::White) {
                Color::Grey => {
                    return Err(ExecutionError::CycleDetected {
                        graph: dependency.display_name(),
                    })
                }
                Color::Black => {}
                Color::White => {
                    colors.insert(dependency.id(), Color::Grey);
                    stack.push((dependency.clone(), 0));
                }
            }
        } else {
            colors.insert(graph.id(), Color::Black);
            order.push(graph);
            stack.pop();
        }
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::{Join, JoinStrategy};

    fn position(order: &[Graph], graph: &Graph) -> usize {
        order
            .iter()
            .position(|candidate| candidate.id() == graph.id())
            .expect("graph should appear in the order")
    }

    #[test]
    fn test_linear_chain_order() {
        let first = Graph::from_input("main_input");
        let second = Graph::from_graph(&first);
        let third = Graph::from_graph(&second);

        let order = topological_order(&third).unwrap();

        assert_eq!(order.len(), 3);
        assert_eq!(order[0].id(), first.id());
        assert_eq!(order[1].id(), second.id());
        assert_eq!(order[2].id(), third.id());
    }

    #[test]
    fn test_diamond_appears_once_with_final_last() {
        // source feeds both arms; the sink joins one arm onto the other
        let source = Graph::from_input("main_input");
        let left = Graph::from_graph(&source);
        let right = Graph::from_graph(&source);
        let sink = Graph::from_graph(&left);
        sink.add_operation(Join::new(&right, JoinStrategy::Outer, None).unwrap());

        let order = topological_order(&sink).unwrap();

        assert_eq!(order.len(), 4);
        assert!(position(&order, &source) < position(&order, &left));
        assert!(position(&order, &source) < position(&order, &right));
        assert!(position(&order, &left) < position(&order, &sink));
        assert!(position(&order, &right) < position(&order, &sink));
        assert_eq!(order.last().unwrap().id(), sink.id());
    }

    #[test]
    fn test_dependencies_visited_in_list_order() {
        let a = Graph::from_input("main_input");
        let b = Graph::from_input("main_input");
        let sink = Graph::from_input("main_input");
        sink.add_operation(Join::new(&a, JoinStrategy::Outer, None).unwrap());
        sink.add_operation(Join::new(&b, JoinStrategy::Outer, None).unwrap());

        let order = topological_order(&sink).unwrap();

        assert_eq!(order[0].id(), a.id());
        assert_eq!(order[1].id(), b.id());
        assert_eq!(order[2].id(), sink.id());
    }

    #[test]
    fn test_cycle_is_detected() {
        let x = Graph::from_input("main_input");
        let y = Graph::from_graph(&x);
        y.set_name("y_graph");
        // close the loop: x also joins on y
        x.add_operation(Join::new(&y, JoinStrategy::Outer, None).unwrap());

        let error = topological_order(&y).unwrap_err();
        assert!(matches!(error, ExecutionError::CycleDetected { .. }));
    }

    #[test]
    fn test_self_join_is_a_cycle() {
        let graph = Graph::from_input("main_input");
        graph.add_operation(Join::new(&graph, JoinStrategy::Outer, None).unwrap());

        let error = topological_order(&graph).unwrap_err();
        assert!(matches!(error, ExecutionError::CycleDetected { .. }));
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let mut graph = Graph::from_input("main_input");
        for _ in 0..2_000 {
            graph = Graph::from_graph(&graph);
        }
        let order = topological_order(&graph).unwrap();
        assert_eq!(order.len(), 2_001);
    }
}
