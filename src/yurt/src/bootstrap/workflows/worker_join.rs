/// Worker join workflow - switches a kubeadm worker's kubelet over to yurthub
use crate::bootstrap::commands::*;
use crate::bootstrap::embedded_templates::{KUBELET_CONFIG_TEMPLATE, YURTHUB_MANIFEST_TEMPLATE};
use crate::bootstrap::step::Step;
use crate::bootstrap::template_renderer::TemplateRenderer;
use crate::config::BootstrapConfig;
use crate::error::BootstrapError;
use crate::hostname::NormalizedHostname;
use tera::Context;

/// Local yurthub proxy endpoint used by the kubelet after the join
pub const YURTHUB_SERVER: &str = "http://127.0.0.1:10261";

/// Plan `worker join`. Both config files are rendered here, so a template
/// error stops the join before anything touches the node.
pub fn plan_worker_join(
    cfg: &BootstrapConfig,
    node: &NormalizedHostname,
    renderer: &TemplateRenderer,
) -> Result<Vec<Step>, BootstrapError> {
    let context = build_join_context(cfg, node);
    let yurthub_manifest = renderer.render(YURTHUB_MANIFEST_TEMPLATE, &context)?;
    let kubelet_config = renderer.render(KUBELET_CONFIG_TEMPLATE, &context)?;

    Ok(vec![
        Step::install_file(
            "setup-yurthub",
            "Setting up Yurthub",
            YURTHUB_MANIFEST_PATH,
            yurthub_manifest,
        ),
        Step::install_file(
            "configure-kubelet",
            "Configuring kubelet",
            OPENYURT_KUBELET_CONFIG_PATH,
            kubelet_config,
        ),
        Step::shell(
            "rewrite-kubelet-args",
            "Pointing kubelet at the OpenYurt kubeconfig",
            REWRITE_KUBELET_ARGS,
            &[KUBELET_DROP_IN],
        ),
        Step::shell(
            "restart-kubelet",
            "Restarting kubelet",
            RESTART_KUBELET,
            &[],
        ),
    ])
}

fn build_join_context(cfg: &BootstrapConfig, node: &NormalizedHostname) -> Context {
    let mut context = Context::new();
    context.insert(
        "server_addr",
        &format!(
            "{}:{}",
            cfg.kube.apiserver_advertise_address, cfg.kube.apiserver_port
        ),
    );
    context.insert("bootstrap_token", &cfg.kube.apiserver_token);
    context.insert("node_name", node.as_str());
    context.insert("yurthub_image", &cfg.yurt.yurthub_image());
    context.insert(
        "working_mode",
        if cfg.yurt.worker_as_edge { "edge" } else { "cloud" },
    );
    context.insert("yurthub_server", YURTHUB_SERVER);
    context
}
