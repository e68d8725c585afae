/// Orchestration sequencer
///
/// Plans a procedure into an ordered step list, then runs the steps one at a
/// time. The first fatal failure stops the procedure; best-effort failures
/// are reported as warnings.
use crate::bootstrap::commands::{
    DELETE_POD, INSTALL_FILE, LOOKUP_TOOL, MAKE_RUN_DIR, NODE_STATUS, RESTART_CANDIDATES,
    RUN_DIR_PREFIX, WORKLOAD_STATUS,
};
use crate::bootstrap::step::{FailurePolicy, Step, StepAction};
use crate::bootstrap::template_renderer::TemplateRenderer;
use crate::bootstrap::workflows::{
    cleanup_step, parse_restart_candidates, plan_master_expand, plan_master_init,
    plan_worker_join, ToolPresence,
};
use crate::bootstrap::Procedure;
use crate::config::BootstrapConfig;
use crate::error::BootstrapError;
use crate::executor::{shell_quote, CommandExecutor};
use crate::hostname::{self, NormalizedHostname};
use crate::notifier::Notifier;
use crate::poller::{expect_status, poll_until, PollResult};
use serde::Serialize;
use std::path::Path;

/// Step name used when node identity cannot be resolved
pub const RESOLVE_NODE_STEP: &str = "resolve-node-identity";

/// Step name used when the per-run directory cannot be created
pub const CREATE_RUN_DIR_STEP: &str = "create-work-dir";

/// Resolved procedure, ready to run
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub procedure: Procedure,
    pub node: NormalizedHostname,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolPresence>,
    /// Per-run directory of `master init`, removed once the steps are done
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<String>,
    pub steps: Vec<Step>,
}

impl Plan {
    /// Mask `secret` wherever it appears in the step payloads.
    pub fn redact(mut self, secret: &str) -> Self {
        for step in &mut self.steps {
            step.redact(secret);
        }
        self
    }
}

type HostnameProvider = fn() -> Result<String, BootstrapError>;

pub struct Sequencer<'a, E: ?Sized, N: ?Sized> {
    executor: &'a E,
    notifier: &'a N,
    renderer: TemplateRenderer,
    hostname_provider: HostnameProvider,
}

impl<'a, E, N> Sequencer<'a, E, N>
where
    E: CommandExecutor + ?Sized,
    N: Notifier + ?Sized,
{
    pub fn new(executor: &'a E, notifier: &'a N) -> Result<Self, BootstrapError> {
        Ok(Self {
            executor,
            notifier,
            renderer: TemplateRenderer::from_embedded()?,
            hostname_provider: hostname::system_hostname,
        })
    }

    pub fn with_renderer(mut self, renderer: TemplateRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Replace the system hostname lookup used when no override is configured.
    pub fn with_hostname_provider(mut self, provider: HostnameProvider) -> Self {
        self.hostname_provider = provider;
        self
    }

    pub async fn run_master_init(&self, cfg: &BootstrapConfig) -> Result<(), BootstrapError> {
        self.run(Procedure::MasterInit, cfg).await
    }

    pub async fn run_master_expand(&self, cfg: &BootstrapConfig) -> Result<(), BootstrapError> {
        self.run(Procedure::MasterExpand, cfg).await
    }

    pub async fn run_worker_join(&self, cfg: &BootstrapConfig) -> Result<(), BootstrapError> {
        self.run(Procedure::WorkerJoin, cfg).await
    }

    /// Plan and run `procedure`, reporting the outcome to the notifier.
    pub async fn run(
        &self,
        procedure: Procedure,
        cfg: &BootstrapConfig,
    ) -> Result<(), BootstrapError> {
        tracing::info!("[Sequencer] Starting {}", procedure);
        let started = std::time::Instant::now();

        match self.plan_and_execute(procedure, cfg).await {
            Ok(plan) => {
                tracing::info!(
                    "[TIMING] {} completed in {}ms",
                    procedure,
                    started.elapsed().as_millis()
                );
                self.notifier.success(&success_message(&plan));
                Ok(())
            }
            Err(e) => {
                tracing::error!("[Sequencer] {} failed: {}", procedure, e);
                self.notifier.fatal(&failure_message(procedure, &e));
                Err(e)
            }
        }
    }

    async fn plan_and_execute(
        &self,
        procedure: Procedure,
        cfg: &BootstrapConfig,
    ) -> Result<Plan, BootstrapError> {
        let plan = self.build_plan(procedure, cfg, true).await?;
        let result = self.run_steps(&plan.steps, cfg).await;

        if let Some(run_dir) = &plan.work_dir {
            // cleanup is best-effort and never changes the outcome
            let _ = self
                .run_steps(std::slice::from_ref(&cleanup_step(run_dir)), cfg)
                .await;
        }

        result.map(|()| plan)
    }

    /// Resolve everything `procedure` needs and return its step list without
    /// running it. For `master init` this probes for helm and kustomize; the
    /// per-run directory is shown as a `mktemp` pattern and not created.
    pub async fn plan(
        &self,
        procedure: Procedure,
        cfg: &BootstrapConfig,
    ) -> Result<Plan, BootstrapError> {
        self.build_plan(procedure, cfg, false).await
    }

    async fn build_plan(
        &self,
        procedure: Procedure,
        cfg: &BootstrapConfig,
        create_run_dir: bool,
    ) -> Result<Plan, BootstrapError> {
        cfg.validate(procedure)?;
        let node = self.resolve_node(procedure, cfg)?;

        let plan = match procedure {
            Procedure::MasterInit => {
                let tools = self.detect_tools().await;
                if cfg.yurt.master_as_cloud {
                    self.notifier
                        .warn("Master node WILL also be treated as a cloud node!");
                }
                let run_dir = if create_run_dir {
                    self.create_run_dir(cfg)
                        .await
                        .map_err(|e| BootstrapError::step(CREATE_RUN_DIR_STEP, e))?
                } else {
                    format!("{}/{}XXXXXX", run_dir_parent(cfg), RUN_DIR_PREFIX)
                };
                let steps = plan_master_init(cfg, tools, &run_dir);
                Plan {
                    procedure,
                    node,
                    tools: Some(tools),
                    work_dir: Some(run_dir),
                    steps,
                }
            }
            Procedure::MasterExpand => {
                let steps = plan_master_expand(cfg, &node);
                Plan {
                    procedure,
                    node,
                    tools: None,
                    work_dir: None,
                    steps,
                }
            }
            Procedure::WorkerJoin => {
                let steps = plan_worker_join(cfg, &node, &self.renderer)?;
                Plan {
                    procedure,
                    node,
                    tools: None,
                    work_dir: None,
                    steps,
                }
            }
        };

        tracing::info!(
            "[Sequencer] Planned {} step(s) for {} on node {}",
            plan.steps.len(),
            procedure,
            plan.node
        );
        Ok(plan)
    }

    /// Run `steps` in order. Stops at the first fatal failure and returns it
    /// wrapped as [`BootstrapError::StepFailed`].
    pub async fn run_steps(
        &self,
        steps: &[Step],
        cfg: &BootstrapConfig,
    ) -> Result<(), BootstrapError> {
        let total = steps.len();

        for (index, step) in steps.iter().enumerate() {
            if !step.run_if {
                tracing::info!("[Sequencer] Skipping step {}", step.name);
                continue;
            }

            self.notifier
                .waiting(&format!("[{}/{}] {}", index + 1, total, step.description));
            tracing::info!("[Sequencer] Running step {}", step.name);

            let step_start = std::time::Instant::now();
            let result = self.execute_step(step, cfg).await;
            let step_duration = step_start.elapsed();

            match (result, step.policy) {
                (Ok(()), _) => {
                    tracing::info!(
                        "[TIMING] Step {} completed in {}ms",
                        step.name,
                        step_duration.as_millis()
                    );
                }
                (Err(e), FailurePolicy::BestEffort) => {
                    tracing::warn!("[Sequencer] Best-effort step {} failed: {}", step.name, e);
                    self.notifier
                        .warn(&format!("{} failed, continuing: {}", step.description, e));
                }
                (Err(e), FailurePolicy::Fatal) => {
                    tracing::warn!(
                        "[TIMING] Step {} failed after {}ms",
                        step.name,
                        step_duration.as_millis()
                    );
                    return Err(BootstrapError::step(&step.name, e));
                }
            }
        }

        Ok(())
    }

    async fn execute_step(&self, step: &Step, cfg: &BootstrapConfig) -> Result<(), BootstrapError> {
        match &step.action {
            StepAction::Shell { template, args } => {
                let refs: Vec<&str> = args.iter().map(String::as_str).collect();
                self.executor.execute(template, &refs).await.map(|_| ())
            }
            StepAction::InstallFile { path, content } => self.install_file(path, content).await,
            StepAction::WaitForWorkload {
                namespace,
                name,
                expected,
            } => self
                .wait_for(
                    name,
                    WORKLOAD_STATUS,
                    &[namespace.as_str(), name.as_str()],
                    expected,
                    cfg,
                )
                .await
                .map(|_| ()),
            StepAction::WaitForNode { node, expected } => self
                .wait_for("worker node", NODE_STATUS, &[node.as_str()], expected, cfg)
                .await
                .map(|_| ()),
            StepAction::RestartWorkloads { node } => self.restart_workloads(node).await,
        }
    }

    fn resolve_node(
        &self,
        procedure: Procedure,
        cfg: &BootstrapConfig,
    ) -> Result<NormalizedHostname, BootstrapError> {
        let override_name = match procedure {
            Procedure::MasterExpand => cfg.yurt.worker_node_name.as_str(),
            Procedure::MasterInit | Procedure::WorkerJoin => cfg.node.name.as_str(),
        };

        let node = hostname::resolve_with(override_name, self.hostname_provider)
            .map_err(|e| BootstrapError::step(RESOLVE_NODE_STEP, e))?;
        self.notifier.info(&format!("Node: {}", node));
        Ok(node)
    }

    async fn detect_tools(&self) -> ToolPresence {
        self.notifier.info("Checking system environment...");
        let tools = ToolPresence {
            helm: self.tool_present("helm", "Helm").await,
            kustomize: self.tool_present("kustomize", "Kustomize").await,
        };
        self.notifier.success("Finished checking system environment!");
        tools
    }

    async fn tool_present(&self, tool: &str, label: &str) -> bool {
        match self.executor.execute(LOOKUP_TOOL, &[tool]).await {
            Ok(path) => {
                tracing::debug!("[Sequencer] {} found at {}", tool, path);
                self.notifier.success(&format!("{} found!", label));
                true
            }
            Err(e) => {
                tracing::debug!("[Sequencer] {} lookup failed: {}", tool, e);
                self.notifier.warn(&format!(
                    "{} not found! {} will be automatically installed!",
                    label, label
                ));
                false
            }
        }
    }

    /// Create a fresh directory under `system.work_dir` for this run. Only
    /// this directory is ever removed afterwards.
    async fn create_run_dir(&self, cfg: &BootstrapConfig) -> Result<String, BootstrapError> {
        let parent = run_dir_parent(cfg);
        self.notifier.waiting("Creating working directory");

        let output = self.executor.execute(MAKE_RUN_DIR, &[&parent, &parent]).await?;
        let run_dir = output.trim();
        let prefix = format!("{}/{}", parent, RUN_DIR_PREFIX);
        if run_dir.len() <= prefix.len()
            || !run_dir.starts_with(&prefix)
            || run_dir.contains(char::is_whitespace)
        {
            return Err(BootstrapError::UnexpectedOutput(format!(
                "expected a new directory under {}, got {:?}",
                parent, run_dir
            )));
        }

        tracing::info!("[Sequencer] Working directory {}", run_dir);
        Ok(run_dir.to_string())
    }

    async fn install_file(&self, path: &str, content: &str) -> Result<(), BootstrapError> {
        let dir = Path::new(path)
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| "/".to_string());

        let mut content = content.to_string();
        if !content.ends_with('\n') {
            content.push('\n');
        }
        let quoted = shell_quote(&content);

        self.executor
            .execute(INSTALL_FILE, &[&dir, &quoted, path])
            .await
            .map(|_| ())
    }

    /// Poll `template` until its output equals `expected`. A failing status
    /// query aborts the wait; `wait.timeout_secs` adds a deadline.
    async fn wait_for(
        &self,
        subject: &str,
        template: &str,
        args: &[&str],
        expected: &str,
        cfg: &BootstrapConfig,
    ) -> Result<String, BootstrapError> {
        let executor = self.executor;
        let notifier = self.notifier;
        let interval = cfg.poll_interval();
        let timeout = cfg.wait_timeout();
        let started = tokio::time::Instant::now();

        let probe = move || async move {
            if let Some(limit) = timeout {
                if started.elapsed() >= limit {
                    return PollResult::Error(BootstrapError::WaitTimeout {
                        what: subject.to_string(),
                        after: limit,
                    });
                }
            }
            match executor.execute(template, args).await {
                Ok(output) => expect_status(&output, expected),
                Err(e) => PollResult::Error(BootstrapError::Probe(e.to_string())),
            }
        };

        let interval_secs = interval.as_secs();
        let on_waiting = |attempt: u32| {
            notifier.warn(&format!(
                "Waiting for {} to be ready [{}s]",
                subject,
                u64::from(attempt) * interval_secs
            ));
        };

        let status = poll_until(probe, on_waiting, interval).await?;
        self.notifier.success(&format!("{} is {}", subject, status));
        Ok(status)
    }

    async fn restart_workloads(&self, node: &str) -> Result<(), BootstrapError> {
        let output = self.executor.execute(RESTART_CANDIDATES, &[node]).await?;
        let candidates = parse_restart_candidates(&output)?;

        if candidates.is_empty() {
            self.notifier
                .info(&format!("No pods to restart on node {}", node));
            return Ok(());
        }

        tracing::info!(
            "[Sequencer] Restarting {} pod(s) on node {}",
            candidates.len(),
            node
        );

        for candidate in &candidates {
            self.notifier.waiting(&format!(
                "Restarting pod: {} => {}",
                candidate.namespace, candidate.name
            ));
            self.executor
                .execute(DELETE_POD, &[&candidate.namespace, &candidate.name])
                .await?;
        }

        Ok(())
    }
}

fn run_dir_parent(cfg: &BootstrapConfig) -> String {
    cfg.system
        .work_dir
        .to_string_lossy()
        .trim_end_matches('/')
        .to_string()
}

fn success_message(plan: &Plan) -> String {
    match plan.procedure {
        Procedure::MasterInit => "Successfully init OpenYurt cluster master node!".to_string(),
        Procedure::MasterExpand => format!("Successfully expand OpenYurt to node [{}]!", plan.node),
        Procedure::WorkerJoin => "Successfully joined OpenYurt cluster!".to_string(),
    }
}

fn failure_message(procedure: Procedure, error: &BootstrapError) -> String {
    match error {
        BootstrapError::StepFailed { step, cause } => {
            format!("{} failed at step '{}': {}", procedure, step, cause)
        }
        other => format!("{} failed: {}", procedure, other),
    }
}
