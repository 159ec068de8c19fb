// tests/property/main.rs

use std::collections::HashSet;

use proptest::prelude::*;
use taskdag::dag::{
    AnalysisOptions, DagGraph, DependencyRules, analyze_dependencies, find_cycle, get_blocked_tasks,
    get_ready_tasks, set_dependencies,
};
use taskdag::errors::TaskDagError;
use taskdag::lifecycle::{set_exit_criteria, set_task_status};
use taskdag::model::{NewTask, TaskList};
use taskdag::types::TaskStatus;

type Op = (usize, Vec<usize>);

fn tid(i: usize) -> String {
    format!("t{i}")
}

fn base_list(durations: &[u32]) -> TaskList {
    let mut list = TaskList::with_id("prop", "prop");
    for (i, d) in durations.iter().enumerate() {
        list.add_task(NewTask::new(format!("task {i}")).with_id(tid(i)).with_duration(*d))
            .unwrap();
    }
    list
}

// Random durations plus a random sequence of set_dependencies calls. Calls
// may be invalid (cycles, self-references); those must fail cleanly.
fn scenario_strategy(max_tasks: usize) -> impl Strategy<Value = (Vec<u32>, Vec<Op>, Vec<u8>)> {
    (1..=max_tasks).prop_flat_map(|n| {
        let durations = proptest::collection::vec(0u32..100, n);
        let ops = proptest::collection::vec(
            (0..n, proptest::collection::vec(0..n, 0..4)),
            0..25,
        );
        // 0 = leave pending, 1 = complete, 2 = cancel, 3 = start.
        let statuses = proptest::collection::vec(0u8..4, n);
        (durations, ops, statuses)
    })
}

fn apply_ops(list: &mut TaskList, ops: &[Op]) -> Result<(), TestCaseError> {
    let rules = DependencyRules::default();
    for (task, deps) in ops {
        let mut deps: Vec<usize> = deps.clone();
        deps.sort_unstable();
        deps.dedup();
        let deps: Vec<String> = deps.into_iter().map(tid).collect();

        let before = list.clone();
        if set_dependencies(list, &tid(*task), deps, &rules).is_err() {
            prop_assert_eq!(&*list, &before, "failed call must not mutate the list");
        }
    }
    Ok(())
}

fn apply_statuses(list: &mut TaskList, statuses: &[u8]) {
    for (i, s) in statuses.iter().enumerate() {
        let path: &[TaskStatus] = match s {
            1 => &[TaskStatus::InProgress, TaskStatus::Completed],
            2 => &[TaskStatus::Cancelled],
            3 => &[TaskStatus::InProgress],
            _ => &[],
        };
        for step in path {
            set_task_status(list, &tid(i), *step).unwrap();
        }
    }
}

fn status_of(list: &TaskList, id: &str) -> TaskStatus {
    list.task(id).unwrap().status()
}

// Longest duration-weighted path ending at `id`, by exhaustive recursion.
fn longest_ending_at(list: &TaskList, id: &str) -> u64 {
    let task = list.task(id).unwrap();
    let best_dep = task
        .dependencies()
        .iter()
        .map(|d| longest_ending_at(list, d))
        .max()
        .unwrap_or(0);
    best_dep + task.duration_or_zero()
}

proptest! {
    #[test]
    fn successful_mutations_keep_the_graph_acyclic(
        (durations, ops, _statuses) in scenario_strategy(10)
    ) {
        let mut list = base_list(&durations);
        apply_ops(&mut list, &ops)?;
        prop_assert!(find_cycle(&DagGraph::from_list(&list)).is_none());
        prop_assert!(list.validate_invariants(50).is_ok());
    }

    #[test]
    fn ready_tasks_only_depend_on_completed_tasks(
        (durations, ops, statuses) in scenario_strategy(10)
    ) {
        let mut list = base_list(&durations);
        apply_ops(&mut list, &ops)?;
        apply_statuses(&mut list, &statuses);

        for task in get_ready_tasks(&list, None) {
            prop_assert!(!task.is_terminal());
            for dep in task.dependencies() {
                prop_assert_eq!(status_of(&list, dep), TaskStatus::Completed);
            }
        }
    }

    #[test]
    fn ready_and_blocked_partition_non_terminal_tasks(
        (durations, ops, statuses) in scenario_strategy(10)
    ) {
        let mut list = base_list(&durations);
        apply_ops(&mut list, &ops)?;
        apply_statuses(&mut list, &statuses);

        let ready: HashSet<String> = get_ready_tasks(&list, None).into_iter().map(|t| t.id).collect();
        let blocked: HashSet<String> = get_blocked_tasks(&list).into_iter().map(|b| b.task.id).collect();
        let open: HashSet<String> = list
            .tasks()
            .iter()
            .filter(|t| !t.is_terminal())
            .map(|t| t.id.clone())
            .collect();

        prop_assert!(ready.is_disjoint(&blocked));
        let union: HashSet<String> = ready.union(&blocked).cloned().collect();
        prop_assert_eq!(union, open);

        for task in list.tasks().iter().filter(|t| !t.is_terminal() && t.dependencies().is_empty()) {
            prop_assert!(ready.contains(&task.id));
        }
    }

    #[test]
    fn clearing_dependencies_is_idempotent(
        (durations, ops, _statuses) in scenario_strategy(8),
        pick in any::<prop::sample::Index>()
    ) {
        let mut list = base_list(&durations);
        apply_ops(&mut list, &ops)?;
        let id = tid(pick.index(durations.len()));
        let rules = DependencyRules::default();

        let first = set_dependencies(&mut list, &id, vec![], &rules).unwrap();
        let second = set_dependencies(&mut list, &id, vec![], &rules).unwrap();
        prop_assert!(first.task.dependencies().is_empty());
        prop_assert_eq!(first.task.dependencies(), second.task.dependencies());
    }

    #[test]
    fn self_dependency_is_always_rejected(
        (durations, ops, statuses) in scenario_strategy(8),
        pick in any::<prop::sample::Index>()
    ) {
        let mut list = base_list(&durations);
        apply_ops(&mut list, &ops)?;
        apply_statuses(&mut list, &statuses);
        let id = tid(pick.index(durations.len()));
        let before = list.clone();

        let err = set_dependencies(&mut list, &id, vec![id.clone()], &DependencyRules::default()).unwrap_err();
        prop_assert!(matches!(err, TaskDagError::Validation(_)));
        prop_assert_eq!(list, before);
    }

    #[test]
    fn critical_path_is_a_real_path_of_maximal_weight(
        (durations, ops, _statuses) in scenario_strategy(8)
    ) {
        let mut list = base_list(&durations);
        apply_ops(&mut list, &ops)?;
        let analysis = analyze_dependencies(&list, &AnalysisOptions::default()).unwrap();
        let path = &analysis.critical_path;

        let sum: u64 = path.tasks.iter().map(|id| list.task(id).unwrap().duration_or_zero()).sum();
        prop_assert_eq!(sum, path.total_duration);

        for pair in path.tasks.windows(2) {
            let later = list.task(&pair[1]).unwrap();
            prop_assert!(later.dependencies().contains(&pair[0]), "{} -> {} is not an edge", pair[0], pair[1]);
        }

        let best = list.tasks().iter().map(|t| longest_ending_at(&list, &t.id)).max().unwrap_or(0);
        prop_assert_eq!(path.total_duration, best);
    }

    #[test]
    fn unmet_criteria_prevent_completion(
        steps in proptest::collection::vec(0usize..5, 1..12)
    ) {
        let mut list = base_list(&[5]);
        set_exit_criteria(&mut list, "t0", vec!["signed off".into()]).unwrap();

        for s in steps {
            let target = TaskStatus::ALL[s];
            let _ = set_task_status(&mut list, "t0", target);
            prop_assert_ne!(status_of(&list, "t0"), TaskStatus::Completed);
        }
    }
}
