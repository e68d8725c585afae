/// Bootstrap configuration
/// Loaded from easy-yurt.toml, then overridden from the command line
use crate::bootstrap::Procedure;
use crate::error::BootstrapError;
use crate::executor::PLACEHOLDER;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file name searched in the working directory
pub const CONFIG_FILE_NAME: &str = "easy-yurt.toml";

/// System-wide config location
pub const SYSTEM_CONFIG_PATH: &str = "/etc/easy-yurt/easy-yurt.toml";

/// Resolved settings for one procedure run. Read-only once built.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BootstrapConfig {
    /// Identity of the node the procedure runs on
    #[serde(default)]
    pub node: NodeConfig,

    /// Kubernetes API server the worker joins
    #[serde(default)]
    pub kube: KubeConfig,

    /// OpenYurt components and toggles
    #[serde(default)]
    pub yurt: YurtConfig,

    /// Local host settings
    #[serde(default)]
    pub system: SystemConfig,

    /// Convergence polling
    #[serde(default)]
    pub wait: WaitConfig,
}

impl BootstrapConfig {
    /// Load configuration from `path`, or from the default locations when
    /// `path` is `None`. Missing default files yield the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, BootstrapError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        let config_paths = [
            PathBuf::from(CONFIG_FILE_NAME),
            PathBuf::from(SYSTEM_CONFIG_PATH),
        ];

        for path in config_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        tracing::warn!("No {} found, using defaults", CONFIG_FILE_NAME);
        Ok(Self::default())
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, BootstrapError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BootstrapError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config: BootstrapConfig = toml::from_str(&content).map_err(|e| {
            BootstrapError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        tracing::info!("Loaded bootstrap config from {:?}", path);
        Ok(config)
    }

    /// Check the fields `procedure` cannot run without.
    pub fn validate(&self, procedure: Procedure) -> Result<(), BootstrapError> {
        if self.wait.poll_interval_secs == 0 {
            return Err(BootstrapError::Config(
                "wait.poll_interval_secs must be greater than zero".to_string(),
            ));
        }

        match procedure {
            Procedure::MasterInit => {
                if self.yurt.version.trim().is_empty() {
                    return Err(BootstrapError::Config("yurt.version is required".to_string()));
                }
                let work_dir = self.system.work_dir.to_string_lossy();
                if !self.system.work_dir.is_absolute()
                    || self.system.work_dir.as_path() == Path::new("/")
                    || work_dir.chars().any(char::is_whitespace)
                {
                    return Err(BootstrapError::Config(format!(
                        "system.work_dir must be an absolute, non-root path without spaces: {:?}",
                        self.system.work_dir
                    )));
                }
                if self.system.install_packages_command.matches(PLACEHOLDER).count() != 1 {
                    return Err(BootstrapError::Config(format!(
                        "system.install_packages_command needs exactly one {} for the package list",
                        PLACEHOLDER
                    )));
                }
            }
            Procedure::MasterExpand => {
                if self.yurt.worker_node_name.is_empty() {
                    return Err(BootstrapError::Config(
                        "Parameter --worker-node-name needed!".to_string(),
                    ));
                }
            }
            Procedure::WorkerJoin => {
                if self.kube.apiserver_advertise_address.is_empty() {
                    return Err(BootstrapError::Config(
                        "Parameter --apiserver-advertise-address needed!".to_string(),
                    ));
                }
                if self.kube.apiserver_token.is_empty() {
                    return Err(BootstrapError::Config(
                        "Parameter --apiserver-token needed!".to_string(),
                    ));
                }
                if self.kube.apiserver_port.parse::<u16>().is_err() {
                    return Err(BootstrapError::Config(format!(
                        "Invalid API server port: {}",
                        self.kube.apiserver_port
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.wait.poll_interval_secs)
    }

    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait.timeout_secs.map(Duration::from_secs)
    }
}

/// Node identity configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NodeConfig {
    /// Hostname override; empty means use the system hostname
    #[serde(default)]
    pub name: String,
}

/// API server endpoint for worker join
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KubeConfig {
    #[serde(default)]
    pub apiserver_advertise_address: String,

    #[serde(default = "default_apiserver_port")]
    pub apiserver_port: String,

    /// Bootstrap token
    #[serde(default)]
    pub apiserver_token: String,
}

fn default_apiserver_port() -> String {
    "6443".to_string()
}

impl Default for KubeConfig {
    fn default() -> Self {
        Self {
            apiserver_advertise_address: String::new(),
            apiserver_port: default_apiserver_port(),
            apiserver_token: String::new(),
        }
    }
}

/// OpenYurt configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YurtConfig {
    /// Master also schedules cloud workloads
    pub master_as_cloud: bool,

    /// Expanded worker is labelled as an edge node
    pub worker_as_edge: bool,

    /// Target of `master expand`
    pub worker_node_name: String,

    /// OpenYurt release, chart tag is `openyurt-<version>`
    pub version: String,

    /// Raven components tag
    pub raven_version: String,

    /// Overrides the yurthub image derived from `version`
    pub yurthub_image: Option<String>,

    pub helm_chart_repo: String,
    pub raven_controller_manager_repo: String,
    pub raven_agent_repo: String,
    pub helm_signing_key_url: String,
    pub helm_apt_source: String,
    pub kustomize_script_url: String,

    /// Base packages installed on the master
    pub dependencies: Vec<String>,
}

impl YurtConfig {
    pub fn yurthub_image(&self) -> String {
        self.yurthub_image
            .clone()
            .unwrap_or_else(|| format!("openyurt/yurthub:v{}", self.version))
    }

    pub fn chart_tag(&self) -> String {
        format!("openyurt-{}", self.version)
    }
}

impl Default for YurtConfig {
    fn default() -> Self {
        Self {
            master_as_cloud: true,
            worker_as_edge: true,
            worker_node_name: String::new(),
            version: "1.2.0".to_string(),
            raven_version: "v0.3.0".to_string(),
            yurthub_image: None,
            helm_chart_repo: "https://github.com/openyurtio/openyurt-helm.git".to_string(),
            raven_controller_manager_repo:
                "https://github.com/openyurtio/raven-controller-manager.git".to_string(),
            raven_agent_repo: "https://github.com/openyurtio/raven.git".to_string(),
            helm_signing_key_url: "https://baltocdn.com/helm/signing.asc".to_string(),
            helm_apt_source: concat!(
                "deb [arch=$(dpkg --print-architecture) signed-by=/usr/share/keyrings/helm.gpg] ",
                "https://baltocdn.com/helm/stable/debian/ all main"
            )
            .to_string(),
            kustomize_script_url: concat!(
                "https://raw.githubusercontent.com/kubernetes-sigs/kustomize/",
                "master/hack/install_kustomize.sh"
            )
            .to_string(),
            dependencies: default_dependencies(),
        }
    }
}

fn default_dependencies() -> Vec<String> {
    ["curl", "apt-transport-https", "ca-certificates", "build-essential", "git"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

/// Local host configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Parent of the per-run scratch directory. Each `master init` creates a
    /// fresh `easy-yurt.XXXXXX` directory here and removes only that.
    pub work_dir: PathBuf,

    /// Package install command; `{}` receives the space-separated package list
    pub install_packages_command: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("/tmp/easy-yurt"),
            install_packages_command:
                "sudo apt-get -qq update && sudo apt-get -qq install -y {}".to_string(),
        }
    }
}

/// Convergence polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    pub poll_interval_secs: u64,

    /// Give up waiting after this many seconds; unset waits forever
    pub timeout_secs: Option<u64>,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 1,
            timeout_secs: None,
        }
    }
}
