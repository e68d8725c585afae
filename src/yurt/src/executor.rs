//! Command execution: positional placeholder substitution and the shell backend.

use crate::error::BootstrapError;
use async_trait::async_trait;
use std::time::Instant;
use tokio::process::Command;

/// Placeholder replaced positionally by [`render_command`].
pub const PLACEHOLDER: &str = "{}";

/// Runs command strings on behalf of the sequencer.
///
/// `template` may contain `{}` placeholders, filled in order from `args`.
/// On success the captured stdout is returned with trailing line breaks
/// removed, so callers can split it on `\n` directly.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, template: &str, args: &[&str]) -> Result<String, BootstrapError>;
}

/// Substitute each `{}` in `template` with the next element of `args`.
///
/// The number of placeholders must equal the number of args.
pub fn render_command(template: &str, args: &[&str]) -> Result<String, BootstrapError> {
    let expected = template.matches(PLACEHOLDER).count();
    if expected != args.len() {
        return Err(BootstrapError::CommandFailed(format!(
            "command template expects {} argument(s), got {}: {}",
            expected,
            args.len(),
            template
        )));
    }

    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;
    for arg in args {
        // count matched above, so every arg has a placeholder
        if let Some(pos) = rest.find(PLACEHOLDER) {
            rendered.push_str(&rest[..pos]);
            rendered.push_str(arg);
            rest = &rest[pos + PLACEHOLDER.len()..];
        }
    }
    rendered.push_str(rest);
    Ok(rendered)
}

/// Quote `value` for safe use as a single POSIX shell word.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Strip trailing line breaks from captured output.
pub fn trim_output(output: &str) -> &str {
    output.trim_end_matches(['\n', '\r'])
}

/// Production executor that spawns `bash -c <command>`.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: String,
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self {
            shell: "bash".to_string(),
        }
    }

    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn execute(&self, template: &str, args: &[&str]) -> Result<String, BootstrapError> {
        let command = render_command(template, args)?;
        tracing::debug!("[ShellExecutor] {} -c {}", self.shell, command);

        let started = Instant::now();
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(&command)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                BootstrapError::CommandFailed(format!("failed to spawn {}: {}", self.shell, e))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let last_line = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("No output available");
            tracing::error!(
                "[ShellExecutor] Command failed ({}) after {}ms: {}",
                output.status,
                started.elapsed().as_millis(),
                last_line
            );
            return Err(BootstrapError::CommandFailed(format!(
                "`{}` exited with {}: {}",
                command, output.status, last_line
            )));
        }

        tracing::debug!(
            "[ShellExecutor] Command completed in {}ms ({} bytes stdout)",
            started.elapsed().as_millis(),
            stdout.len()
        );
        Ok(trim_output(&stdout).to_string())
    }
}
