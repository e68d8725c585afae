//! easy-yurt: OpenYurt bootstrap CLI.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use yurt::{BootstrapConfig, ConsoleNotifier, Notifier, Procedure, Sequencer, ShellExecutor};

#[derive(Parser, Debug)]
#[command(name = "easy-yurt", version, about = "Bootstrap an OpenYurt cluster on top of kubeadm")]
struct Cli {
    /// Config file (default: ./easy-yurt.toml, then /etc/easy-yurt/easy-yurt.toml)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// Print the planned steps as JSON and exit without running them
    #[arg(long = "dry-run", global = true)]
    dry_run: bool,

    /// Emit operator notices as JSON lines
    #[arg(long = "json", global = true)]
    json: bool,

    #[command(subcommand)]
    command: Role,
}

#[derive(Subcommand, Debug)]
enum Role {
    /// Operations run on the master node
    Master {
        #[command(subcommand)]
        operation: MasterOperation,
    },
    /// Operations run on a worker node
    Worker {
        #[command(subcommand)]
        operation: WorkerOperation,
    },
}

#[derive(Subcommand, Debug)]
enum MasterOperation {
    /// Install OpenYurt components on the master
    Init {
        /// Treat master as cloud node
        #[arg(long = "master-as-cloud", value_name = "BOOL")]
        master_as_cloud: Option<bool>,

        /// Override the master's node name
        #[arg(long = "node-name")]
        node_name: Option<String>,
    },
    /// Convert a joined worker into an OpenYurt node
    Expand {
        /// Worker node name
        #[arg(long = "worker-node-name")]
        worker_node_name: Option<String>,

        /// Treat worker as edge node
        #[arg(long = "worker-as-edge", value_name = "BOOL")]
        worker_as_edge: Option<bool>,
    },
}

#[derive(Subcommand, Debug)]
enum WorkerOperation {
    /// Switch this worker's kubelet over to yurthub
    Join {
        /// Kubernetes API server advertise address
        #[arg(long = "apiserver-advertise-address")]
        apiserver_advertise_address: Option<String>,

        /// Kubernetes API server port
        #[arg(long = "apiserver-port")]
        apiserver_port: Option<String>,

        /// Kubernetes API server bootstrap token
        #[arg(long = "apiserver-token")]
        apiserver_token: Option<String>,

        /// Override this node's name
        #[arg(long = "node-name")]
        node_name: Option<String>,

        /// Run yurthub in edge mode
        #[arg(long = "worker-as-edge", value_name = "BOOL")]
        worker_as_edge: Option<bool>,
    },
}

/// Overlay command-line values on the loaded config.
fn apply_overrides(role: &Role, cfg: &mut BootstrapConfig) -> Procedure {
    match role {
        Role::Master {
            operation:
                MasterOperation::Init {
                    master_as_cloud,
                    node_name,
                },
        } => {
            if let Some(value) = master_as_cloud {
                cfg.yurt.master_as_cloud = *value;
            }
            if let Some(name) = node_name {
                cfg.node.name = name.clone();
            }
            Procedure::MasterInit
        }
        Role::Master {
            operation:
                MasterOperation::Expand {
                    worker_node_name,
                    worker_as_edge,
                },
        } => {
            if let Some(name) = worker_node_name {
                cfg.yurt.worker_node_name = name.clone();
            }
            if let Some(value) = worker_as_edge {
                cfg.yurt.worker_as_edge = *value;
            }
            Procedure::MasterExpand
        }
        Role::Worker {
            operation:
                WorkerOperation::Join {
                    apiserver_advertise_address,
                    apiserver_port,
                    apiserver_token,
                    node_name,
                    worker_as_edge,
                },
        } => {
            if let Some(address) = apiserver_advertise_address {
                cfg.kube.apiserver_advertise_address = address.clone();
            }
            if let Some(port) = apiserver_port {
                cfg.kube.apiserver_port = port.clone();
            }
            if let Some(token) = apiserver_token {
                cfg.kube.apiserver_token = token.clone();
            }
            if let Some(name) = node_name {
                cfg.node.name = name.clone();
            }
            if let Some(value) = worker_as_edge {
                cfg.yurt.worker_as_edge = *value;
            }
            Procedure::WorkerJoin
        }
    }
}

fn run(cli: Cli, notifier: &ConsoleNotifier) -> anyhow::Result<ExitCode> {
    let mut cfg = BootstrapConfig::load(cli.config.as_deref())?;
    let procedure = apply_overrides(&cli.command, &mut cfg);

    // one procedure, one flow of control
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(execute(procedure, &cfg, cli.dry_run, notifier))
}

async fn execute(
    procedure: Procedure,
    cfg: &BootstrapConfig,
    dry_run: bool,
    notifier: &ConsoleNotifier,
) -> anyhow::Result<ExitCode> {
    let executor = ShellExecutor::new();
    let sequencer = Sequencer::new(&executor, notifier)?;

    if dry_run {
        let plan = sequencer
            .plan(procedure, cfg)
            .await?
            .redact(&cfg.kube.apiserver_token);
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(ExitCode::SUCCESS);
    }

    // failures are already reported by the sequencer
    match sequencer.run(procedure, cfg).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(_) => Ok(ExitCode::FAILURE),
    }
}

fn main() -> ExitCode {
    // Default to info level if RUST_LOG not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let notifier = if cli.json {
        ConsoleNotifier::json()
    } else {
        ConsoleNotifier::new()
    };

    match run(cli, &notifier) {
        Ok(code) => code,
        Err(e) => {
            notifier.fatal(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
