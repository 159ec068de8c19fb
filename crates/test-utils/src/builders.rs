use taskdag::dag::{DependencyRules, set_dependencies};
use taskdag::lifecycle::{CriterionUpdate, set_exit_criteria, set_task_status, update_exit_criterion};
use taskdag::model::{NewTask, Priority, TaskList};
use taskdag::types::TaskStatus;

/// Builder for `TaskList` to simplify test setup.
///
/// Tasks are inserted in the order given. Dependencies, exit criteria and
/// statuses are applied afterwards through the normal validated operations,
/// so a built list always satisfies the engine's invariants.
pub struct TaskListBuilder {
    id: String,
    title: String,
    tasks: Vec<TaskBuilder>,
}

impl TaskListBuilder {
    pub fn new(title: &str) -> Self {
        Self {
            id: "list".to_string(),
            title: title.to_string(),
            tasks: Vec::new(),
        }
    }

    pub fn with_task(mut self, task: TaskBuilder) -> Self {
        self.tasks.push(task);
        self
    }

    /// Shorthand for a pending task with the given dependencies.
    pub fn task(self, id: &str, deps: &[&str]) -> Self {
        let task = deps.iter().fold(TaskBuilder::new(id), |t, d| t.after(d));
        self.with_task(task)
    }

    pub fn build(self) -> TaskList {
        let mut list = TaskList::with_id(self.id, self.title);

        for t in &self.tasks {
            let mut new = NewTask::new(t.title.clone()).with_id(t.id.clone());
            if let Some(p) = t.priority {
                new = new.with_priority(Priority::new(p).expect("priority out of range"));
            }
            if let Some(d) = t.duration {
                new = new.with_duration(d);
            }
            list.add_task(new).expect("failed to add task");
        }

        for t in &self.tasks {
            if !t.deps.is_empty() {
                set_dependencies(&mut list, &t.id, t.deps.clone(), &DependencyRules::default())
                    .expect("builder dependencies must be valid");
            }
        }

        for t in &self.tasks {
            if t.criteria.is_empty() {
                continue;
            }
            let descriptions = t.criteria.iter().map(|(d, _)| d.clone()).collect();
            let task = set_exit_criteria(&mut list, &t.id, descriptions).expect("failed to set criteria");
            let ids: Vec<String> = task.exit_criteria().iter().map(|c| c.id.clone()).collect();
            for (id, (_, met)) in ids.iter().zip(&t.criteria) {
                if *met {
                    let update = CriterionUpdate {
                        is_met: Some(true),
                        notes: None,
                    };
                    update_exit_criterion(&mut list, &t.id, id, update).expect("failed to meet criterion");
                }
            }
        }

        for t in &self.tasks {
            for step in path_to(t.status) {
                set_task_status(&mut list, &t.id, *step).expect("builder status path must be legal");
            }
        }

        list
    }
}

/// Legal transitions from `pending` to `target`.
fn path_to(target: TaskStatus) -> &'static [TaskStatus] {
    match target {
        TaskStatus::Pending => &[],
        TaskStatus::InProgress => &[TaskStatus::InProgress],
        TaskStatus::Blocked => &[TaskStatus::Blocked],
        TaskStatus::Cancelled => &[TaskStatus::Cancelled],
        TaskStatus::Completed => &[TaskStatus::InProgress, TaskStatus::Completed],
    }
}

/// Builder for one task inside a [`TaskListBuilder`].
pub struct TaskBuilder {
    id: String,
    title: String,
    priority: Option<u8>,
    duration: Option<u32>,
    deps: Vec<String>,
    status: TaskStatus,
    criteria: Vec<(String, bool)>,
}

impl TaskBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            title: id.to_string(),
            priority: None,
            duration: None,
            deps: Vec::new(),
            status: TaskStatus::Pending,
            criteria: Vec::new(),
        }
    }

    pub fn priority(mut self, p: u8) -> Self {
        self.priority = Some(p);
        self
    }

    pub fn duration(mut self, minutes: u32) -> Self {
        self.duration = Some(minutes);
        self
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.deps.push(dep.to_string());
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn completed(self) -> Self {
        self.status(TaskStatus::Completed)
    }

    pub fn criterion(mut self, description: &str, met: bool) -> Self {
        self.criteria.push((description.to_string(), met));
        self
    }
}
