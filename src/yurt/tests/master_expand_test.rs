//! Tests for the `master expand` procedure.

use yurt::bootstrap::workflows::{parse_restart_candidates, RestartCandidate};
use yurt::testing::{channel_notifier, drain_notices, messages_at, MockExecutor};
use yurt::{BootstrapConfig, BootstrapError, NoticeLevel, Sequencer};

const NODE_STATUS: &str = "kubectl get nodes";
const RESTART_QUERY: &str = "--field-selector spec.nodeName=edge-node-1";

fn expand_config() -> BootstrapConfig {
    let mut config = BootstrapConfig::default();
    config.yurt.worker_node_name = "Edge-Node-1".to_string();
    config
}

fn ready_worker(pods: &str) -> MockExecutor {
    MockExecutor::new()
        .on(NODE_STATUS, Ok("Ready"))
        .on(RESTART_QUERY, Ok(pods))
}

#[tokio::test(start_paused = true)]
async fn test_master_expand_runs_in_order() {
    let executor = ready_worker("kube-system coredns-abc\nkube-system coredns-def");
    let (notifier, mut rx) = channel_notifier();
    let sequencer = Sequencer::new(&executor, &notifier).unwrap();

    sequencer.run_master_expand(&expand_config()).await.unwrap();

    let commands = executor.commands();
    assert_eq!(commands.len(), 6);
    assert_eq!(
        commands[0],
        "kubectl label node edge-node-1 openyurt.io/is-edge-worker=true --overwrite"
    );
    assert_eq!(
        commands[1],
        "kubectl annotate node edge-node-1 node.beta.openyurt.io/autonomy=true --overwrite"
    );
    assert!(commands[2].contains("$1 == \"edge-node-1\""));
    assert!(commands[3].contains(RESTART_QUERY));
    assert_eq!(commands[4], "kubectl -n kube-system delete pod coredns-abc");
    assert_eq!(commands[5], "kubectl -n kube-system delete pod coredns-def");

    let notices = drain_notices(&mut rx);
    let waiting = messages_at(&notices, NoticeLevel::Waiting);
    assert!(waiting.contains(&"[1/4] Labeling worker node: edge-node-1".to_string()));
    assert!(waiting.contains(&"Restarting pod: kube-system => coredns-abc".to_string()));
    assert!(messages_at(&notices, NoticeLevel::Success)
        .contains(&"Successfully expand OpenYurt to node [edge-node-1]!".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_master_expand_cloud_worker() {
    let executor = ready_worker("");
    let (notifier, _rx) = channel_notifier();
    let sequencer = Sequencer::new(&executor, &notifier).unwrap();
    let mut config = expand_config();
    config.yurt.worker_as_edge = false;

    sequencer.run_master_expand(&config).await.unwrap();

    assert_eq!(
        executor.commands_matching("openyurt.io/is-edge-worker"),
        vec![
            "kubectl label node edge-node-1 openyurt.io/is-edge-worker=false --overwrite"
                .to_string()
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_master_expand_no_pods_to_restart() {
    let executor = ready_worker("");
    let (notifier, mut rx) = channel_notifier();
    let sequencer = Sequencer::new(&executor, &notifier).unwrap();

    sequencer.run_master_expand(&expand_config()).await.unwrap();

    assert!(executor.commands_matching("delete pod").is_empty());
    let info = messages_at(&drain_notices(&mut rx), NoticeLevel::Info);
    assert!(info.contains(&"No pods to restart on node edge-node-1".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_master_expand_waits_for_node_ready() {
    let executor = MockExecutor::new().on_sequence(
        NODE_STATUS,
        vec![Ok("NotReady"), Ok("NotReady"), Ok("Ready")],
    );
    let (notifier, mut rx) = channel_notifier();
    let sequencer = Sequencer::new(&executor, &notifier).unwrap();

    sequencer.run_master_expand(&expand_config()).await.unwrap();

    assert_eq!(executor.commands_matching(NODE_STATUS).len(), 3);
    let notices = drain_notices(&mut rx);
    let waits: Vec<String> = messages_at(&notices, NoticeLevel::Warn)
        .into_iter()
        .filter(|w| w.starts_with("Waiting for worker node"))
        .collect();
    assert_eq!(waits.len(), 2);
    assert!(messages_at(&notices, NoticeLevel::Success)
        .contains(&"worker node is Ready".to_string()));
    // pods are only restarted once the node is ready
    let commands = executor.commands();
    assert!(commands.last().unwrap().contains(RESTART_QUERY));
}

#[tokio::test(start_paused = true)]
async fn test_master_expand_stops_on_failed_delete() {
    let executor = ready_worker(
        "kube-system coredns-abc\nkube-system coredns-def\nkube-system kube-proxy-x",
    )
    .on("delete pod coredns-def", Err("pods \"coredns-def\" is forbidden"));
    let (notifier, mut rx) = channel_notifier();
    let sequencer = Sequencer::new(&executor, &notifier).unwrap();

    let err = sequencer.run_master_expand(&expand_config()).await.unwrap_err();

    assert_eq!(err.failed_step(), Some("restart-pods"));
    assert!(matches!(err.root_cause(), BootstrapError::CommandFailed(_)));
    // the first delete is not retried and the third is never attempted
    assert_eq!(
        executor.commands_matching("delete pod"),
        vec![
            "kubectl -n kube-system delete pod coredns-abc".to_string(),
            "kubectl -n kube-system delete pod coredns-def".to_string(),
        ]
    );

    let fatal = messages_at(&drain_notices(&mut rx), NoticeLevel::Fatal);
    assert_eq!(fatal.len(), 1);
    assert!(fatal[0].starts_with("master expand failed at step 'restart-pods'"));
}

#[tokio::test(start_paused = true)]
async fn test_master_expand_label_failure_is_fatal() {
    let executor =
        ready_worker("").on("kubectl label node", Err("nodes \"edge-node-1\" not found"));
    let (notifier, _rx) = channel_notifier();
    let sequencer = Sequencer::new(&executor, &notifier).unwrap();

    let err = sequencer.run_master_expand(&expand_config()).await.unwrap_err();

    assert_eq!(err.failed_step(), Some("label-node"));
    assert_eq!(executor.commands().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_master_expand_malformed_pod_listing() {
    let executor = ready_worker("kube-system coredns-abc\ngarbage");
    let (notifier, _rx) = channel_notifier();
    let sequencer = Sequencer::new(&executor, &notifier).unwrap();

    let err = sequencer.run_master_expand(&expand_config()).await.unwrap_err();

    assert_eq!(err.failed_step(), Some("restart-pods"));
    assert!(matches!(err.root_cause(), BootstrapError::UnexpectedOutput(_)));
    assert!(executor.commands_matching("delete pod").is_empty());
}

#[tokio::test]
async fn test_master_expand_requires_worker_name() {
    let executor = MockExecutor::new();
    let (notifier, mut rx) = channel_notifier();
    let sequencer = Sequencer::new(&executor, &notifier).unwrap();

    let err = sequencer
        .run_master_expand(&BootstrapConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, BootstrapError::Config(_)));
    assert!(executor.commands().is_empty());
    let fatal = messages_at(&drain_notices(&mut rx), NoticeLevel::Fatal);
    assert_eq!(
        fatal,
        vec![
            "master expand failed: Configuration error: Parameter --worker-node-name needed!"
                .to_string()
        ]
    );
}

#[tokio::test]
async fn test_master_expand_whitespace_worker_name() {
    let executor = MockExecutor::new();
    let (notifier, _rx) = channel_notifier();
    let sequencer = Sequencer::new(&executor, &notifier).unwrap();
    let mut config = expand_config();
    config.yurt.worker_node_name = "   ".to_string();

    let err = sequencer.run_master_expand(&config).await.unwrap_err();

    assert!(matches!(err.root_cause(), BootstrapError::InvalidHostname(_)));
    assert!(executor.commands().is_empty());
}

#[test]
fn test_parse_restart_candidates() {
    let parsed =
        parse_restart_candidates("kube-system coredns-abc\n\n  default   web-0  \n").unwrap();
    assert_eq!(
        parsed,
        vec![
            RestartCandidate {
                namespace: "kube-system".to_string(),
                name: "coredns-abc".to_string(),
            },
            RestartCandidate {
                namespace: "default".to_string(),
                name: "web-0".to_string(),
            },
        ]
    );
}

#[test]
fn test_parse_restart_candidates_empty() {
    assert!(parse_restart_candidates("").unwrap().is_empty());
    assert!(parse_restart_candidates("\n \n").unwrap().is_empty());
}

#[test]
fn test_parse_restart_candidates_rejects_extra_fields() {
    let err = parse_restart_candidates("kube-system coredns-abc extra").unwrap_err();
    assert!(matches!(err, BootstrapError::UnexpectedOutput(_)));
}
