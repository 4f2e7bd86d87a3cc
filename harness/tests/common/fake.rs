//! In-memory automation backend for end-to-end engine tests
//!
//! Simulates the cluster backend behind the typed command protocol:
//! launch/destroy flips an in-memory cluster record, endpoint queries
//! report one host per node, and downloads materialize pid files and node
//! logs on the local filesystem the way a real backend copy would. Every
//! command is recorded so tests can assert on the exact sequence issued.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use bridge::{BackendCommand, BridgeResult, CommandOutput, CommandRunner, NodeSelector};

#[derive(Default)]
struct ClusterRecord {
    exists: bool,
    size: usize,
}

pub struct FakeBackend {
    cluster_name: String,
    cluster: Mutex<ClusterRecord>,
    node_logs: HashMap<usize, String>,
    history: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            cluster_name: "CVH".to_string(),
            cluster: Mutex::new(ClusterRecord::default()),
            node_logs: HashMap::new(),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Pretend the cluster already exists at the given size.
    pub fn with_existing_cluster(self, size: usize) -> Self {
        *self.cluster.lock().unwrap() = ClusterRecord { exists: true, size };
        self
    }

    /// Content served for one node's system log (zero-based ordinal).
    pub fn with_node_log(mut self, ordinal: usize, content: &str) -> Self {
        self.node_logs.insert(ordinal, content.to_string());
        self
    }

    /// Rendered history of every command issued.
    pub fn history(&self) -> Vec<String> {
        self.history.lock().unwrap().clone()
    }

    pub fn issued(&self, fragment: &str) -> bool {
        self.history()
            .iter()
            .any(|command| command.contains(fragment))
    }

    fn dispatch(&self, command: &BackendCommand) -> BridgeResult<CommandOutput> {
        self.history.lock().unwrap().push(command.to_string());

        let stdout = match command {
            BackendCommand::ListClusters => {
                let cluster = self.cluster.lock().unwrap();
                if cluster.exists {
                    format!("{}\nunrelated_cluster\n", self.cluster_name)
                } else {
                    "unrelated_cluster\n".to_string()
                }
            }
            BackendCommand::Launch { nodes, .. } => {
                *self.cluster.lock().unwrap() = ClusterRecord {
                    exists: true,
                    size: *nodes,
                };
                String::new()
            }
            BackendCommand::Destroy { .. } => {
                self.cluster.lock().unwrap().exists = false;
                String::new()
            }
            BackendCommand::Endpoints { .. } => {
                let cluster = self.cluster.lock().unwrap();
                (0..cluster.size)
                    .map(|i| format!("10.0.0.{}", i + 1))
                    .collect::<Vec<_>>()
                    .join(" ")
            }
            BackendCommand::Download {
                node,
                remote,
                local,
                ..
            } => {
                let ordinal = match node {
                    NodeSelector::Ordinal(n) => *n,
                    NodeSelector::All => 0,
                };
                if let Some(parent) = local.parent() {
                    std::fs::create_dir_all(parent).unwrap();
                }
                if remote.ends_with("PID") {
                    std::fs::write(local, format!("{}\n", 1000 + ordinal)).unwrap();
                } else {
                    let content = self
                        .node_logs
                        .get(&ordinal)
                        .cloned()
                        .unwrap_or_else(|| "INFO node healthy\n".to_string());
                    std::fs::write(local, content).unwrap();
                }
                String::new()
            }
            BackendCommand::Reset { .. }
            | BackendCommand::Upload { .. }
            | BackendCommand::RunOn { .. }
            | BackendCommand::ChangeConfig { .. } => String::new(),
        };

        Ok(CommandOutput {
            exit_code: 0,
            stdout,
            stderr: String::new(),
        })
    }
}

#[async_trait]
impl CommandRunner for FakeBackend {
    async fn run(&self, command: &BackendCommand) -> BridgeResult<CommandOutput> {
        self.dispatch(command)
    }

    async fn run_checked(&self, command: &BackendCommand) -> BridgeResult<CommandOutput> {
        self.dispatch(command)
    }

    async fn run_streaming(&self, command: &BackendCommand) -> BridgeResult<CommandOutput> {
        self.dispatch(command)
    }
}
