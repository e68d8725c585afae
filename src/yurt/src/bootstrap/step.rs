/// Step: one ordered unit of work inside a procedure
use serde::Serialize;

/// Stands in for secrets in printed plans
pub const REDACTED: &str = "<redacted>";

/// What a step failure does to the procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the procedure
    #[default]
    Fatal,
    /// Warn and continue with the next step
    BestEffort,
}

/// Action performed by a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepAction {
    /// Run a command template with positional args
    Shell { template: String, args: Vec<String> },
    /// Write `content` to `path` on the host (with sudo)
    InstallFile { path: String, content: String },
    /// Poll until the workload's status reads `expected`
    WaitForWorkload {
        namespace: String,
        name: String,
        expected: String,
    },
    /// Poll until the node's status reads `expected`
    WaitForNode { node: String, expected: String },
    /// Delete every pod on `node` that must be recreated behind yurthub
    RestartWorkloads { node: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub name: String,
    pub description: String,
    /// Resolved before the step list is built; false skips the step
    pub run_if: bool,
    pub policy: FailurePolicy,
    pub action: StepAction,
}

impl Step {
    fn new(name: impl Into<String>, description: impl Into<String>, action: StepAction) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            run_if: true,
            policy: FailurePolicy::Fatal,
            action,
        }
    }

    pub fn shell(
        name: impl Into<String>,
        description: impl Into<String>,
        template: impl Into<String>,
        args: &[&str],
    ) -> Self {
        Self::new(
            name,
            description,
            StepAction::Shell {
                template: template.into(),
                args: args.iter().map(|a| a.to_string()).collect(),
            },
        )
    }

    pub fn install_file(
        name: impl Into<String>,
        description: impl Into<String>,
        path: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            description,
            StepAction::InstallFile {
                path: path.into(),
                content: content.into(),
            },
        )
    }

    pub fn wait_for_workload(
        name: impl Into<String>,
        description: impl Into<String>,
        namespace: impl Into<String>,
        workload: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            description,
            StepAction::WaitForWorkload {
                namespace: namespace.into(),
                name: workload.into(),
                expected: expected.into(),
            },
        )
    }

    pub fn wait_for_node(
        name: impl Into<String>,
        description: impl Into<String>,
        node: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            description,
            StepAction::WaitForNode {
                node: node.into(),
                expected: expected.into(),
            },
        )
    }

    pub fn restart_workloads(
        name: impl Into<String>,
        description: impl Into<String>,
        node: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            description,
            StepAction::RestartWorkloads { node: node.into() },
        )
    }

    pub fn best_effort(mut self) -> Self {
        self.policy = FailurePolicy::BestEffort;
        self
    }

    pub fn only_if(mut self, condition: bool) -> Self {
        self.run_if = condition;
        self
    }

    pub fn is_best_effort(&self) -> bool {
        self.policy == FailurePolicy::BestEffort
    }

    /// Replace every occurrence of `secret` in the command args or file content.
    pub fn redact(&mut self, secret: &str) {
        if secret.is_empty() {
            return;
        }
        match &mut self.action {
            StepAction::Shell { args, .. } => {
                for arg in args.iter_mut() {
                    *arg = arg.replace(secret, REDACTED);
                }
            }
            StepAction::InstallFile { content, .. } => {
                *content = content.replace(secret, REDACTED);
            }
            StepAction::WaitForWorkload { .. }
            | StepAction::WaitForNode { .. }
            | StepAction::RestartWorkloads { .. } => {}
        }
    }
}
