//! OpenYurt bootstrap orchestration
//!
//! Drives the three operator procedures of an OpenYurt rollout on top of an
//! existing kubeadm cluster: `master init`, `master expand` and `worker join`.
//! Each procedure is planned into an ordered list of steps and executed
//! fail-fast through a [`CommandExecutor`], with progress reported to a
//! [`Notifier`].

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod executor;
pub mod hostname;
pub mod notifier;
pub mod poller;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use bootstrap::{
    FailurePolicy, Plan, Procedure, Sequencer, Step, StepAction, TemplateRenderer,
};
pub use config::BootstrapConfig;
pub use error::BootstrapError;
pub use executor::{render_command, CommandExecutor, ShellExecutor};
pub use hostname::{resolve as resolve_hostname, NormalizedHostname};
pub use notifier::{ChannelNotifier, ConsoleNotifier, Notice, NoticeLevel, Notifier};
pub use poller::{poll_until, PollResult};
