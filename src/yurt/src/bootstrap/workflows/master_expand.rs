/// Master expand workflow - converts a joined worker into an OpenYurt cloud/edge node
use crate::bootstrap::commands::*;
use crate::bootstrap::step::Step;
use crate::config::BootstrapConfig;
use crate::error::BootstrapError;
use crate::hostname::NormalizedHostname;
use serde::Serialize;

/// A pod that has to be recreated so its traffic goes through yurthub
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestartCandidate {
    pub namespace: String,
    pub name: String,
}

/// Plan `master expand` against `node`.
pub fn plan_master_expand(cfg: &BootstrapConfig, node: &NormalizedHostname) -> Vec<Step> {
    let is_edge = if cfg.yurt.worker_as_edge { "true" } else { "false" };

    vec![
        Step::shell(
            "label-node",
            format!("Labeling worker node: {}", node),
            LABEL_EDGE_WORKER,
            &[node.as_str(), is_edge],
        ),
        Step::shell(
            "annotate-autonomy",
            "Activating the node autonomous mode",
            ANNOTATE_AUTONOMY,
            &[node.as_str()],
        ),
        Step::wait_for_node(
            "wait-node-ready",
            "Waiting for worker node to be ready",
            node.as_str(),
            "Ready",
        ),
        Step::restart_workloads(
            "restart-pods",
            "Restarting pods in the worker node",
            node.as_str(),
        ),
    ]
}

/// Parse `<namespace> <name>` lines. Blank lines are ignored; any other
/// line without exactly two fields is an error.
pub fn parse_restart_candidates(output: &str) -> Result<Vec<RestartCandidate>, BootstrapError> {
    output
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [namespace, name] => Ok(RestartCandidate {
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                }),
                _ => Err(BootstrapError::UnexpectedOutput(format!(
                    "expected `<namespace> <pod>`, got {:?}",
                    line
                ))),
            }
        })
        .collect()
}
