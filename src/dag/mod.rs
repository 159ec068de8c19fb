// src/dag/mod.rs

//! Task dependency graph engine.
//!
//! - [`graph`] builds the adjacency view of one list, on demand.
//! - [`cycle`] checks proposed edges for cycles before they are committed.
//! - [`mutator`] is the only writer of a task's dependencies.
//! - [`readiness`] classifies non-terminal tasks as ready or blocked.
//! - [`analysis`] computes fan-in/out, bottlenecks and the critical path.
//! - [`render`] draws the graph as ASCII, Graphviz DOT or Mermaid.

pub mod analysis;
pub mod cycle;
pub mod graph;
pub mod mutator;
pub mod readiness;
pub mod render;

pub use analysis::{AnalysisOptions, CriticalPath, DependencyAnalysis, TaskDegree, analyze_dependencies};
pub use cycle::{find_cycle, would_create_cycle};
pub use graph::DagGraph;
pub use mutator::{
    DependencyRules, DependencyUpdate, DependencyWarning, MAX_DEPENDENCIES, add_dependency,
    remove_dependency, set_dependencies,
};
pub use readiness::{BlockedTask, get_blocked_tasks, get_ready_tasks};
