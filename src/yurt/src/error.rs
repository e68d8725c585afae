//! Error types for bootstrap procedures.

use std::time::Duration;

/// Error type for every bootstrap operation.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Invalid hostname: {0:?} is empty after trimming")]
    InvalidHostname(String),

    #[error("Hostname lookup failed: {0}")]
    HostnameLookupFailed(String),

    #[error("Probe error: {0}")]
    Probe(String),

    #[error("Step '{step}' failed: {cause}")]
    StepFailed {
        step: String,
        #[source]
        cause: Box<BootstrapError>,
    },

    #[error("Timed out after {after:?} waiting for {what}")]
    WaitTimeout { what: String, after: Duration },

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Unexpected command output: {0}")]
    UnexpectedOutput(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BootstrapError {
    /// Wrap `cause` as the failure of the named step.
    pub fn step(step: impl Into<String>, cause: BootstrapError) -> Self {
        BootstrapError::StepFailed {
            step: step.into(),
            cause: Box::new(cause),
        }
    }

    /// Name of the failed step, if this is a step failure.
    pub fn failed_step(&self) -> Option<&str> {
        match self {
            BootstrapError::StepFailed { step, .. } => Some(step),
            _ => None,
        }
    }

    /// Innermost error, unwrapping step failures.
    pub fn root_cause(&self) -> &BootstrapError {
        match self {
            BootstrapError::StepFailed { cause, .. } => cause.root_cause(),
            other => other,
        }
    }
}
