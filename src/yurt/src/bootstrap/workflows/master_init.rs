/// Master init workflow - turns a kubeadm control-plane node into an OpenYurt master
use crate::bootstrap::commands::*;
use crate::bootstrap::step::Step;
use crate::config::BootstrapConfig;
use serde::Serialize;

/// Optional tools found on the master before planning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ToolPresence {
    pub helm: bool,
    pub kustomize: bool,
}

/// Plan `master init` inside `run_dir`, the per-run directory created for
/// this invocation. Tool installs are skipped for tools already present.
pub fn plan_master_init(cfg: &BootstrapConfig, tools: ToolPresence, run_dir: &str) -> Vec<Step> {
    let yurt = &cfg.yurt;
    let packages = yurt.dependencies.join(" ");

    let helm_key = format!("{}/helm-signing.asc", run_dir);
    let kustomize_script = format!("{}/install_kustomize.sh", run_dir);
    let chart_dir = format!("{}/openyurt-helm", run_dir);
    let app_manager_chart = format!("{}/charts/yurt-app-manager", chart_dir);
    let openyurt_chart = format!("{}/charts/openyurt", chart_dir);
    let rcm_dir = format!("{}/raven-controller-manager", run_dir);
    let agent_dir = format!("{}/raven-agent", run_dir);
    let chart_tag = yurt.chart_tag();

    vec![
        Step::shell(
            "install-dependencies",
            "Installing dependencies",
            cfg.system.install_packages_command.as_str(),
            &[&packages],
        )
        .only_if(!yurt.dependencies.is_empty()),
        // `kubectl taint ... -` fails once the taint is gone
        Step::shell(
            "remove-master-taint",
            "Removing master NoSchedule taint",
            REMOVE_MASTER_TAINT,
            &[],
        )
        .only_if(yurt.master_as_cloud)
        .best_effort(),
        Step::shell(
            "remove-control-plane-taint",
            "Removing control-plane taint",
            REMOVE_CONTROL_PLANE_TAINT,
            &[],
        )
        .only_if(yurt.master_as_cloud)
        .best_effort(),
        Step::shell(
            "download-helm-key",
            "Downloading Helm public signing key",
            DOWNLOAD,
            &[&yurt.helm_signing_key_url, &helm_key],
        )
        .only_if(!tools.helm),
        Step::shell(
            "install-helm-keyring",
            "Installing Helm signing key",
            INSTALL_HELM_KEYRING,
            &[&helm_key],
        )
        .only_if(!tools.helm),
        Step::shell(
            "add-helm-apt-source",
            "Adding the Helm apt repository",
            ADD_HELM_APT_SOURCE,
            &[&yurt.helm_apt_source],
        )
        .only_if(!tools.helm),
        Step::shell(
            "install-helm",
            "Installing Helm",
            cfg.system.install_packages_command.as_str(),
            &["helm"],
        )
        .only_if(!tools.helm),
        Step::shell(
            "download-kustomize",
            "Downloading kustomize",
            DOWNLOAD,
            &[&yurt.kustomize_script_url, &kustomize_script],
        )
        .only_if(!tools.kustomize),
        Step::shell(
            "build-kustomize",
            "Fetching kustomize binary",
            RUN_KUSTOMIZE_INSTALLER,
            &[&kustomize_script, &kustomize_script, run_dir],
        )
        .only_if(!tools.kustomize),
        Step::shell(
            "install-kustomize",
            "Installing kustomize",
            INSTALL_KUSTOMIZE,
            &[run_dir],
        )
        .only_if(!tools.kustomize),
        Step::shell(
            "clone-openyurt-helm",
            format!("Adding OpenYurt repo (version {}) with helm", yurt.version),
            CLONE_AT_REF,
            &[&yurt.helm_chart_repo, &chart_dir, &chart_dir, &chart_tag],
        ),
        Step::shell(
            "deploy-yurt-app-manager",
            "Deploying yurt-app-manager",
            HELM_INSTALL,
            &["yurt-app-manager", &app_manager_chart],
        ),
        Step::wait_for_workload(
            "wait-yurt-app-manager",
            "Waiting for yurt-app-manager to be ready",
            "kube-system",
            "yurt-app-manager",
            "1/1 Running",
        ),
        Step::shell(
            "deploy-yurt-controller-manager",
            "Deploying yurt-controller-manager",
            HELM_INSTALL,
            &["openyurt", &openyurt_chart],
        ),
        Step::shell(
            "clone-raven-controller-manager",
            "Cloning repo: raven-controller-manager",
            CLONE_AT_REF,
            &[
                &yurt.raven_controller_manager_repo,
                &rcm_dir,
                &rcm_dir,
                &yurt.raven_version,
            ],
        ),
        Step::shell(
            "deploy-raven-controller-manager",
            "Deploying raven-controller-manager",
            DEPLOY_RAVEN_CONTROLLER_MANAGER,
            &[&rcm_dir],
        ),
        Step::shell(
            "clone-raven-agent",
            "Cloning repo: raven-agent",
            CLONE_AT_REF,
            &[
                &yurt.raven_agent_repo,
                &agent_dir,
                &agent_dir,
                &yurt.raven_version,
            ],
        ),
        Step::shell(
            "deploy-raven-agent",
            "Deploying raven-agent",
            DEPLOY_RAVEN_AGENT,
            &[&agent_dir],
        ),
    ]
}

/// Removes the per-run directory; runs after `master init` whatever its outcome.
pub fn cleanup_step(run_dir: &str) -> Step {
    Step::shell(
        "remove-work-dir",
        "Cleaning up working directory",
        REMOVE_RUN_DIR,
        &[run_dir],
    )
    .best_effort()
}
