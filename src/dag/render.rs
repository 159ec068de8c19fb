// src/dag/render.rs

//! Plain-text renderings of the dependency graph.
//!
//! Every format lists each task once and each edge exactly once, with edges
//! drawn from a dependency to the task that waits on it.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use crate::dag::DagGraph;
use crate::model::{Task, TaskList};
use crate::types::{TaskStatus, VisualizationFormat};

pub fn render(list: &TaskList, graph: &DagGraph, format: VisualizationFormat) -> String {
    match format {
        VisualizationFormat::Ascii => render_ascii(list, graph),
        VisualizationFormat::Dot => render_dot(list, graph),
        VisualizationFormat::Mermaid => render_mermaid(list, graph),
    }
}

fn status_marker(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "[ ]",
        TaskStatus::InProgress => "[~]",
        TaskStatus::Blocked => "[!]",
        TaskStatus::Completed => "[x]",
        TaskStatus::Cancelled => "[-]",
    }
}

fn ascii_label(task: Option<&Task>, id: &str) -> String {
    match task {
        Some(t) => match t.estimated_duration {
            Some(mins) => format!("{} {} {} ({mins}m)", status_marker(t.status()), id, t.title),
            None => format!("{} {} {}", status_marker(t.status()), id, t.title),
        },
        None => format!("[?] {id}"),
    }
}

/// Tree rooted at tasks without dependencies, children being dependents.
///
/// A task reachable through several dependencies is expanded under the first
/// one only and marked `(*)` elsewhere, so output stays linear in the size
/// of the graph.
pub fn render_ascii(list: &TaskList, graph: &DagGraph) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} tasks, {} dependencies)",
        list.title,
        graph.len(),
        graph.edge_count()
    );
    if graph.is_empty() {
        out.push_str("(no tasks)\n");
        return out;
    }

    let mut expanded: HashSet<&str> = HashSet::new();
    let roots: Vec<&str> = graph
        .tasks()
        .filter(|id| graph.dependencies_of(id).is_empty())
        .collect();

    // (node, prefix for its children, connector for its own line)
    let mut stack: Vec<(&str, String, &str)> = Vec::new();
    for root in roots.iter().rev() {
        stack.push((*root, String::new(), ""));
    }

    while let Some((node, prefix, connector)) = stack.pop() {
        let first_visit = expanded.insert(node);
        let marker = if first_visit || graph.dependents_of(node).is_empty() {
            ""
        } else {
            " (*)"
        };
        let _ = writeln!(
            out,
            "{}{}{}{}",
            prefix,
            connector,
            ascii_label(list.task(node), node),
            marker
        );
        if !first_visit {
            continue;
        }

        let children = graph.dependents_of(node);
        let child_prefix = match connector {
            "" => String::new(),
            "└── " => format!("{prefix}    "),
            _ => format!("{prefix}│   "),
        };
        for (i, child) in children.iter().enumerate().rev() {
            let conn = if i + 1 == children.len() { "└── " } else { "├── " };
            stack.push((child.as_str(), child_prefix.clone(), conn));
        }
    }

    out
}

fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

pub fn render_dot(list: &TaskList, graph: &DagGraph) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "digraph \"{}\" {{", escape_dot(&list.title));
    out.push_str("  rankdir=LR;\n");
    out.push_str("  node [shape=box];\n");
    for id in graph.tasks() {
        let label = match list.task(id) {
            Some(t) => format!("{}\\n{} ({})", escape_dot(id), escape_dot(&t.title), t.status()),
            None => escape_dot(id),
        };
        let _ = writeln!(out, "  \"{}\" [label=\"{}\"];", escape_dot(id), label);
    }
    for (dep, task) in graph.edges() {
        let _ = writeln!(out, "  \"{}\" -> \"{}\";", escape_dot(dep), escape_dot(task));
    }
    out.push_str("}\n");
    out
}

fn escape_mermaid(s: &str) -> String {
    s.replace('"', "#quot;")
}

/// Mermaid flowchart. Task ids are arbitrary strings, so nodes get
/// positional ids (`n0`, `n1`, ...) and carry the real id in their label.
pub fn render_mermaid(list: &TaskList, graph: &DagGraph) -> String {
    let node_ids: HashMap<&str, String> = graph
        .tasks()
        .enumerate()
        .map(|(i, id)| (id, format!("n{i}")))
        .collect();

    let mut out = String::from("graph TD\n");
    for id in graph.tasks() {
        let label = match list.task(id) {
            Some(t) => format!("{}: {}", escape_mermaid(id), escape_mermaid(&t.title)),
            None => escape_mermaid(id),
        };
        let _ = writeln!(out, "  {}[\"{}\"]", node_ids[id], label);
    }
    for (dep, task) in graph.edges() {
        if let (Some(from), Some(to)) = (node_ids.get(dep), node_ids.get(task)) {
            let _ = writeln!(out, "  {from} --> {to}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTask;

    fn diamond() -> TaskList {
        let mut list = TaskList::with_id("l", "Release");
        for id in ["A", "B", "C", "D"] {
            list.add_task(NewTask::new(format!("do {id}")).with_id(id)).unwrap();
        }
        list.task_mut("B").unwrap().dependencies = vec!["A".into()];
        list.task_mut("C").unwrap().dependencies = vec!["A".into()];
        list.task_mut("D").unwrap().dependencies = vec!["B".into(), "C".into()];
        list
    }

    #[test]
    fn dot_has_every_node_and_edge_once() {
        let list = diamond();
        let dot = render_dot(&list, &DagGraph::from_list(&list));
        assert!(dot.starts_with("digraph \"Release\" {"));
        for edge in ["\"A\" -> \"B\";", "\"A\" -> \"C\";", "\"B\" -> \"D\";", "\"C\" -> \"D\";"] {
            assert_eq!(dot.matches(edge).count(), 1, "edge {edge}");
        }
        assert_eq!(dot.matches(" -> ").count(), 4);
        assert_eq!(dot.matches("[label=").count(), 4);
    }

    #[test]
    fn mermaid_uses_positional_ids() {
        let list = diamond();
        let mermaid = render_mermaid(&list, &DagGraph::from_list(&list));
        assert!(mermaid.starts_with("graph TD\n"));
        assert!(mermaid.contains("n0[\"A: do A\"]"));
        assert!(mermaid.contains("n0 --> n1"));
        assert!(mermaid.contains("n2 --> n3"));
        assert_eq!(mermaid.matches("-->").count(), 4);
    }

    #[test]
    fn ascii_tree_lists_every_edge() {
        let list = diamond();
        let ascii = render_ascii(&list, &DagGraph::from_list(&list));
        let lines: Vec<&str> = ascii.lines().collect();
        assert_eq!(lines[0], "Release (4 tasks, 4 dependencies)");
        assert_eq!(lines[1], "[ ] A do A");
        assert_eq!(lines[2], "├── [ ] B do B");
        assert_eq!(lines[3], "│   └── [ ] D do D");
        assert_eq!(lines[4], "└── [ ] C do C");
        assert_eq!(lines[5], "    └── [ ] D do D");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn ascii_marks_reused_subtrees() {
        let mut list = diamond();
        list.add_task(NewTask::new("do E").with_id("E")).unwrap();
        list.task_mut("E").unwrap().dependencies = vec!["D".into()];
        let ascii = render_ascii(&list, &DagGraph::from_list(&list));
        assert!(ascii.contains("[ ] D do D (*)"));
        assert_eq!(ascii.matches("E do E").count(), 1);
    }

    #[test]
    fn dot_escapes_quotes() {
        let mut list = TaskList::with_id("l", "say \"hi\"");
        list.add_task(NewTask::new("quote \"x\"").with_id("q")).unwrap();
        let dot = render_dot(&list, &DagGraph::from_list(&list));
        assert!(dot.contains("digraph \"say \\\"hi\\\"\""));
        assert!(dot.contains("quote \\\"x\\\""));
    }
}
