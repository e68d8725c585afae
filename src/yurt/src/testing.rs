//! Test doubles for the executor and notifier seams.

use crate::error::BootstrapError;
use crate::executor::{render_command, CommandExecutor};
use crate::notifier::{ChannelNotifier, Notice, NoticeLevel};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc;

struct Rule {
    pattern: String,
    responses: VecDeque<Result<String, String>>,
}

/// Executor that records every rendered command and answers from scripted rules.
///
/// A rule matches when its pattern is a substring of the rendered command;
/// the first matching rule wins. A rule's responses are consumed in order
/// and the last one repeats. Unmatched commands succeed with empty output.
#[derive(Default)]
pub struct MockExecutor {
    rules: Mutex<Vec<Rule>>,
    commands: Mutex<Vec<String>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands containing `pattern` with `response` every time.
    pub fn on(self, pattern: &str, response: Result<&str, &str>) -> Self {
        self.on_sequence(pattern, vec![response])
    }

    /// Answer commands containing `pattern` with `responses` in order.
    pub fn on_sequence(self, pattern: &str, responses: Vec<Result<&str, &str>>) -> Self {
        let responses = responses
            .into_iter()
            .map(|r| r.map(str::to_string).map_err(str::to_string))
            .collect();
        lock(&self.rules).push(Rule {
            pattern: pattern.to_string(),
            responses,
        });
        self
    }

    /// Every command executed so far, rendered.
    pub fn commands(&self) -> Vec<String> {
        lock(&self.commands).clone()
    }

    /// Executed commands containing `pattern`.
    pub fn commands_matching(&self, pattern: &str) -> Vec<String> {
        lock(&self.commands)
            .iter()
            .filter(|c| c.contains(pattern))
            .cloned()
            .collect()
    }

    fn respond(&self, command: &str) -> Result<String, String> {
        let mut rules = lock(&self.rules);
        let Some(rule) = rules.iter_mut().find(|r| command.contains(&r.pattern)) else {
            return Ok(String::new());
        };
        if rule.responses.len() > 1 {
            rule.responses.pop_front().unwrap_or(Ok(String::new()))
        } else {
            rule.responses.front().cloned().unwrap_or(Ok(String::new()))
        }
    }
}

#[async_trait]
impl CommandExecutor for MockExecutor {
    async fn execute(&self, template: &str, args: &[&str]) -> Result<String, BootstrapError> {
        let command = render_command(template, args)?;
        lock(&self.commands).push(command.clone());
        self.respond(&command).map_err(BootstrapError::CommandFailed)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Notifier paired with the receiver collecting its notices.
pub fn channel_notifier() -> (ChannelNotifier, mpsc::Receiver<Notice>) {
    let (sender, receiver) = mpsc::channel(4096);
    (ChannelNotifier::new(sender), receiver)
}

/// Drain everything currently buffered in `receiver`.
pub fn drain_notices(receiver: &mut mpsc::Receiver<Notice>) -> Vec<Notice> {
    let mut notices = Vec::new();
    while let Ok(notice) = receiver.try_recv() {
        notices.push(notice);
    }
    notices
}

/// Messages of the given level, in order.
pub fn messages_at(notices: &[Notice], level: NoticeLevel) -> Vec<String> {
    notices
        .iter()
        .filter(|n| n.level == level)
        .map(|n| n.message.clone())
        .collect()
}
