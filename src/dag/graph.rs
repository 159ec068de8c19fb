// src/dag/graph.rs

use std::collections::HashMap;

use petgraph::graphmap::DiGraphMap;

use crate::model::{TaskId, TaskList};

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone, Default)]
struct DagNode {
    /// Direct dependencies: tasks that must complete before this one.
    deps: Vec<TaskId>,
    /// Direct dependents: tasks that list this one as a dependency.
    dependents: Vec<TaskId>,
}

/// In-memory adjacency view of one list's dependency relation.
///
/// Rebuilt from the [`TaskList`] on demand and never stored. Node order is
/// the list's task order, and both adjacency lists keep insertion order, so
/// every traversal over this view is deterministic.
#[derive(Debug, Clone)]
pub struct DagGraph {
    order: Vec<TaskId>,
    nodes: HashMap<TaskId, DagNode>,
}

impl DagGraph {
    /// Build the view of the list as it currently is.
    pub fn from_list(list: &TaskList) -> Self {
        Self::build(list, None)
    }

    /// Build the view with `task_id`'s outgoing edges replaced by `proposed`.
    ///
    /// Used to test a mutation before committing it.
    pub fn with_proposal(list: &TaskList, task_id: &str, proposed: &[TaskId]) -> Self {
        Self::build(list, Some((task_id, proposed)))
    }

    fn build(list: &TaskList, proposal: Option<(&str, &[TaskId])>) -> Self {
        let mut order = Vec::with_capacity(list.tasks().len());
        let mut nodes: HashMap<TaskId, DagNode> = HashMap::with_capacity(list.tasks().len());

        // First pass: create nodes with their dependency lists.
        for task in list.tasks() {
            let deps = match proposal {
                Some((id, proposed)) if id == task.id => proposed.to_vec(),
                _ => task.dependencies().to_vec(),
            };
            order.push(task.id.clone());
            nodes.insert(
                task.id.clone(),
                DagNode {
                    deps,
                    dependents: Vec::new(),
                },
            );
        }

        // Second pass: populate dependents in list order.
        for task_id in &order {
            let deps = nodes
                .get(task_id)
                .map(|n| n.deps.clone())
                .unwrap_or_default();

            for dep in deps {
                if let Some(dep_node) = nodes.get_mut(&dep) {
                    dep_node.dependents.push(task_id.clone());
                }
            }
        }

        Self { order, nodes }
    }

    /// All task ids, in list order.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.deps.len()).sum()
    }

    /// Immediate dependencies of a task.
    pub fn dependencies_of(&self, id: &str) -> &[TaskId] {
        self.nodes
            .get(id)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task (tasks that list this one).
    pub fn dependents_of(&self, id: &str) -> &[TaskId] {
        self.nodes
            .get(id)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Edges as `(dependency, dependent)` pairs, grouped by dependent in
    /// list order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order.iter().flat_map(move |task| {
            self.dependencies_of(task)
                .iter()
                .map(move |dep| (dep.as_str(), task.as_str()))
        })
    }

    /// petgraph view with edge direction `dependency -> dependent`.
    pub fn to_graphmap(&self) -> DiGraphMap<&str, ()> {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::with_capacity(self.len(), self.edge_count());
        for id in self.tasks() {
            graph.add_node(id);
        }
        for (dep, task) in self.edges() {
            if self.contains(dep) {
                graph.add_edge(dep, task, ());
            }
        }
        graph
    }
}
