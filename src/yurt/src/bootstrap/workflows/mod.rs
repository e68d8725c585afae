//! Step lists for each procedure. Planning is pure: everything a step needs
//! is resolved here, before the first step runs.
mod master_expand;
mod master_init;
mod worker_join;

pub use master_expand::{parse_restart_candidates, plan_master_expand, RestartCandidate};
pub use master_init::{cleanup_step, plan_master_init, ToolPresence};
pub use worker_join::{plan_worker_join, YURTHUB_SERVER};
