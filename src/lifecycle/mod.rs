// src/lifecycle/mod.rs

//! Task lifecycle: the status state machine and the exit-criteria gate it
//! consults before allowing completion.

pub mod exit_criteria;
pub mod status;

pub use exit_criteria::{
    CriterionUpdate, are_all_criteria_met, mark_criterion_met, progress, set_exit_criteria,
    unmet_criteria, update_exit_criterion,
};
pub use status::{check_transition, set_task_status};
