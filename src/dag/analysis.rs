// src/dag/analysis.rs

//! Structural analysis of a list's dependency DAG.

use std::collections::HashMap;

use petgraph::algo::toposort;
use serde::Serialize;
use tracing::debug;

use crate::dag::cycle::find_cycle;
use crate::dag::readiness::{get_blocked_tasks, is_ready};
use crate::dag::render::render;
use crate::dag::DagGraph;
use crate::errors::{Result, TaskDagError};
use crate::model::{TaskId, TaskList};
use crate::types::VisualizationFormat;

pub const DEFAULT_BOTTLENECK_COUNT: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    pub format: VisualizationFormat,
    /// How many bottlenecks to report.
    pub bottleneck_count: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            format: VisualizationFormat::default(),
            bottleneck_count: DEFAULT_BOTTLENECK_COUNT,
        }
    }
}

/// Direct-edge counts for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDegree {
    pub task_id: TaskId,
    pub title: String,
    /// Number of direct dependencies.
    pub fan_in: usize,
    /// Number of tasks that directly depend on this one.
    pub fan_out: usize,
}

/// Longest duration-weighted chain through the DAG.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalPath {
    /// From the first prerequisite to the final task.
    pub tasks: Vec<TaskId>,
    /// Sum of `estimated_duration` (minutes) along `tasks`.
    pub total_duration: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyAnalysis {
    pub list_id: String,
    pub task_count: usize,
    pub edge_count: usize,
    /// Per task, in list order.
    pub degrees: Vec<TaskDegree>,
    /// Highest fan-out first; tasks nothing depends on are never listed.
    pub bottlenecks: Vec<TaskDegree>,
    pub critical_path: CriticalPath,
    pub topological_order: Vec<TaskId>,
    /// Tasks with no dependencies.
    pub roots: Vec<TaskId>,
    /// Tasks nothing depends on.
    pub leaves: Vec<TaskId>,
    pub ready_count: usize,
    pub blocked_count: usize,
    pub format: VisualizationFormat,
    pub visualization: String,
}

/// Run the full structural analysis and render the graph.
///
/// Fails only if the stored graph is cyclic, which the mutators never allow.
pub fn analyze_dependencies(list: &TaskList, options: &AnalysisOptions) -> Result<DependencyAnalysis> {
    let graph = DagGraph::from_list(list);
    let order = topological_order(&graph)?;

    let degrees = degrees(list, &graph);
    let bottlenecks = bottlenecks(&degrees, options.bottleneck_count);
    let critical_path = critical_path(list, &graph, &order);

    let roots = graph
        .tasks()
        .filter(|id| graph.dependencies_of(id).is_empty())
        .map(str::to_string)
        .collect();
    let leaves = graph
        .tasks()
        .filter(|id| graph.dependents_of(id).is_empty())
        .map(str::to_string)
        .collect();

    let ready_count = list.tasks().iter().filter(|t| is_ready(list, t)).count();
    let blocked_count = get_blocked_tasks(list).len();

    debug!(
        list_id = %list.id,
        tasks = graph.len(),
        edges = graph.edge_count(),
        critical = critical_path.total_duration,
        "dependency analysis complete"
    );

    Ok(DependencyAnalysis {
        list_id: list.id.clone(),
        task_count: graph.len(),
        edge_count: graph.edge_count(),
        degrees,
        bottlenecks,
        critical_path,
        topological_order: order,
        roots,
        leaves,
        ready_count,
        blocked_count,
        format: options.format,
        visualization: render(list, &graph, options.format),
    })
}

/// Order in which every dependency precedes its dependents.
pub fn topological_order(graph: &DagGraph) -> Result<Vec<TaskId>> {
    match toposort(&graph.to_graphmap(), None) {
        Ok(order) => Ok(order.into_iter().map(str::to_string).collect()),
        Err(_) => {
            let cycle = find_cycle(graph).unwrap_or_default();
            Err(TaskDagError::CircularDependency { cycle })
        }
    }
}

pub fn degrees(list: &TaskList, graph: &DagGraph) -> Vec<TaskDegree> {
    list.tasks()
        .iter()
        .map(|t| TaskDegree {
            task_id: t.id.clone(),
            title: t.title.clone(),
            fan_in: graph.dependencies_of(&t.id).len(),
            fan_out: graph.dependents_of(&t.id).len(),
        })
        .collect()
}

/// Top `n` tasks by fan-out; ties keep list order.
pub fn bottlenecks(degrees: &[TaskDegree], n: usize) -> Vec<TaskDegree> {
    let mut ranked: Vec<&TaskDegree> = degrees.iter().filter(|d| d.fan_out > 0).collect();
    ranked.sort_by(|a, b| b.fan_out.cmp(&a.fan_out));
    ranked.into_iter().take(n).cloned().collect()
}

/// Longest path by summed `estimated_duration`, computed over `order`.
///
/// `longest[n] = max(longest[dep]) + duration(n)`. At each node the first
/// dependency (insertion order) reaching the maximum is kept, and the path
/// ends at the node with the largest total; among equal totals the longer
/// chain wins, then list order.
pub fn critical_path(list: &TaskList, graph: &DagGraph, order: &[TaskId]) -> CriticalPath {
    let mut longest: HashMap<&str, u64> = HashMap::with_capacity(order.len());
    let mut depth: HashMap<&str, usize> = HashMap::with_capacity(order.len());
    let mut via: HashMap<&str, &str> = HashMap::with_capacity(order.len());

    for node in order {
        let mut best: Option<(&str, u64)> = None;
        for dep in graph.dependencies_of(node) {
            let Some(&len) = longest.get(dep.as_str()) else {
                continue;
            };
            if best.is_none_or(|(_, b)| len > b) {
                best = Some((dep.as_str(), len));
            }
        }

        let own = list.task(node).map(|t| t.duration_or_zero()).unwrap_or(0);
        match best {
            Some((dep, len)) => {
                longest.insert(node.as_str(), len + own);
                depth.insert(node.as_str(), depth.get(dep).copied().unwrap_or(0) + 1);
                via.insert(node.as_str(), dep);
            }
            None => {
                longest.insert(node.as_str(), own);
                depth.insert(node.as_str(), 1);
            }
        }
    }

    let mut end: Option<(&str, u64, usize)> = None;
    for id in graph.tasks() {
        let (Some(&len), Some(&d)) = (longest.get(id), depth.get(id)) else {
            continue;
        };
        let better = match end {
            None => true,
            Some((_, best_len, best_depth)) => len > best_len || (len == best_len && d > best_depth),
        };
        if better {
            end = Some((id, len, d));
        }
    }

    let Some((end_id, total, _)) = end else {
        return CriticalPath::default();
    };

    let mut tasks = vec![end_id.to_string()];
    let mut cursor = end_id;
    while let Some(&prev) = via.get(cursor) {
        tasks.push(prev.to_string());
        cursor = prev;
    }
    tasks.reverse();

    CriticalPath {
        tasks,
        total_duration: total,
    }
}
