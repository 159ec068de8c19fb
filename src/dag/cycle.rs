// src/dag/cycle.rs

//! Cycle detection over the dependency relation.
//!
//! Depth-first search runs on an explicit stack with `visiting`/`visited`
//! marks, so graph depth is bounded by heap rather than the call stack.
//! Edges are followed from a task to its dependencies; a reported cycle
//! `[A, C, B, A]` reads "A depends on C, which depends on B, which depends
//! on A".

use std::collections::HashMap;

use tracing::debug;

use crate::dag::DagGraph;
use crate::model::{TaskId, TaskList};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Visited,
}

/// Check whether replacing `task_id`'s dependencies with `proposed` would
/// make the list's graph cyclic.
///
/// Returns the offending cycle, starting and ending at the same task, or
/// `None` if the proposal keeps the graph acyclic. Pure query: the list is
/// not modified. The search starts at `task_id`, so a cycle introduced by
/// the proposal is reported from the edited task's point of view.
pub fn would_create_cycle(
    list: &TaskList,
    task_id: &str,
    proposed: &[TaskId],
) -> Option<Vec<TaskId>> {
    let graph = DagGraph::with_proposal(list, task_id, proposed);
    let cycle = search(&graph, std::iter::once(task_id).chain(graph.tasks()));
    if let Some(ref path) = cycle {
        debug!(task_id = %task_id, cycle = ?path, "proposed dependencies would close a cycle");
    }
    cycle
}

/// Find any cycle in the graph, searching from nodes in list order.
pub fn find_cycle(graph: &DagGraph) -> Option<Vec<TaskId>> {
    search(graph, graph.tasks())
}

fn search<'a>(graph: &'a DagGraph, starts: impl IntoIterator<Item = &'a str>) -> Option<Vec<TaskId>> {
    let mut marks: HashMap<&'a str, Mark> = HashMap::with_capacity(graph.len());
    // Each frame is a node on the current DFS path and the index of the
    // next dependency to explore.
    let mut stack: Vec<(&'a str, usize)> = Vec::new();

    for start in starts {
        if marks.contains_key(start) || !graph.contains(start) {
            continue;
        }
        marks.insert(start, Mark::Visiting);
        stack.push((start, 0));

        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            let deps = graph.dependencies_of(node);

            if next >= deps.len() {
                marks.insert(node, Mark::Visited);
                stack.pop();
                continue;
            }

            frame.1 += 1;
            let child = deps[next].as_str();
            match marks.get(child) {
                Some(Mark::Visiting) => {
                    let from = stack
                        .iter()
                        .position(|(n, _)| *n == child)
                        .unwrap_or(0);
                    let mut cycle: Vec<TaskId> =
                        stack[from..].iter().map(|(n, _)| n.to_string()).collect();
                    cycle.push(child.to_string());
                    return Some(cycle);
                }
                Some(Mark::Visited) => {}
                None => {
                    marks.insert(child, Mark::Visiting);
                    stack.push((child, 0));
                }
            }
        }
    }

    None
}
