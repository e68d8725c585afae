/// Bootstrap: step model, procedure planning, templates and the fail-fast sequencer.
pub mod commands;
pub mod embedded_templates;
pub mod sequencer;
pub mod step;
pub mod template_renderer;
pub mod workflows;

use serde::Serialize;
use std::fmt;

pub use sequencer::{Plan, Sequencer};
pub use step::{FailurePolicy, Step, StepAction};
pub use template_renderer::TemplateRenderer;

/// Top-level orchestration operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Procedure {
    MasterInit,
    MasterExpand,
    WorkerJoin,
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Procedure::MasterInit => "master init",
            Procedure::MasterExpand => "master expand",
            Procedure::WorkerJoin => "worker join",
        };
        f.write_str(name)
    }
}
