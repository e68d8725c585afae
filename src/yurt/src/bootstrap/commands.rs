//! Command templates issued by the procedures. `{}` is filled positionally.

/// Succeeds when the tool is on PATH
pub const LOOKUP_TOOL: &str = "command -v {}";

/// Args: parent, parent. Prints the fresh per-run directory.
pub const MAKE_RUN_DIR: &str = "mkdir -p {} && mktemp -d {}/easy-yurt.XXXXXX";
pub const RUN_DIR_PREFIX: &str = "easy-yurt.";
pub const REMOVE_RUN_DIR: &str = "rm -rf {}";

pub const REMOVE_MASTER_TAINT: &str =
    "kubectl taint nodes --all node-role.kubernetes.io/master:NoSchedule-";
pub const REMOVE_CONTROL_PLANE_TAINT: &str =
    "kubectl taint nodes --all node-role.kubernetes.io/control-plane-";

pub const DOWNLOAD: &str = "curl -fsSL --retry 3 {} -o {}";
pub const INSTALL_HELM_KEYRING: &str =
    "sudo mkdir -p /usr/share/keyrings && cat {} | gpg --dearmor | sudo tee /usr/share/keyrings/helm.gpg > /dev/null";
pub const ADD_HELM_APT_SOURCE: &str =
    "echo \"{}\" | sudo tee /etc/apt/sources.list.d/helm-stable-debian.list > /dev/null";
pub const RUN_KUSTOMIZE_INSTALLER: &str = "chmod u+x {} && {} {}";
pub const INSTALL_KUSTOMIZE: &str = "sudo cp {}/kustomize /usr/local/bin";

pub const CLONE_AT_REF: &str = "git clone --quiet {} {} && git -C {} checkout --quiet {}";
pub const HELM_INSTALL: &str = "helm upgrade --install {} {} -n kube-system";
pub const DEPLOY_RAVEN_CONTROLLER_MANAGER: &str =
    "cd {} && make generate-deploy-yaml && kubectl apply -f _output/yamls/raven-controller-manager.yaml";
pub const DEPLOY_RAVEN_AGENT: &str = "cd {} && FORWARD_NODE_IP=true make deploy";

/// Prints `<ready> <status>` for pods whose name starts with the workload name
pub const WORKLOAD_STATUS: &str =
    "kubectl get pods -n {} --no-headers | awk '$1 ~ /^{}/ {print $2\" \"$3}'";
/// Prints the STATUS column of the named node
pub const NODE_STATUS: &str = "kubectl get nodes --no-headers | awk '$1 == \"{}\" {print $2}'";

pub const LABEL_EDGE_WORKER: &str =
    "kubectl label node {} openyurt.io/is-edge-worker={} --overwrite";
pub const ANNOTATE_AUTONOMY: &str =
    "kubectl annotate node {} node.beta.openyurt.io/autonomy=true --overwrite";

/// Prints `<namespace> <name>` per line for non-host-network pods on the node
pub const RESTART_CANDIDATES: &str = "kubectl get pods --all-namespaces --field-selector spec.nodeName={} -o jsonpath='{range .items[?(@.spec.hostNetwork!=true)]}{.metadata.namespace}{\" \"}{.metadata.name}{\"\\n\"}{end}'";
pub const DELETE_POD: &str = "kubectl -n {} delete pod {}";

/// Args: directory, quoted content, destination path
pub const INSTALL_FILE: &str = "sudo mkdir -p {} && printf '%s' {} | sudo tee {} > /dev/null";

pub const KUBELET_DROP_IN: &str = "/etc/systemd/system/kubelet.service.d/10-kubeadm.conf";
pub const REWRITE_KUBELET_ARGS: &str = "sudo sed -i \"s|KUBELET_KUBECONFIG_ARGS=--bootstrap-kubeconfig=\\/etc\\/kubernetes\\/bootstrap-kubelet.conf\\ --kubeconfig=\\/etc\\/kubernetes\\/kubelet.conf|KUBELET_KUBECONFIG_ARGS=--kubeconfig=\\/var\\/lib\\/openyurt\\/kubelet.conf|g\" {}";
pub const RESTART_KUBELET: &str = "sudo systemctl daemon-reload && sudo systemctl restart kubelet";

pub const YURTHUB_MANIFEST_PATH: &str = "/etc/kubernetes/manifests/yurthub-ack.yaml";
pub const OPENYURT_KUBELET_CONFIG_PATH: &str = "/var/lib/openyurt/kubelet.conf";
