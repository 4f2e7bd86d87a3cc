//! Cluster reconciliation and lifecycle
//!
//! `ClusterBridge` compares the observed state of a named cluster against
//! the target topology and repairs any mismatch before a test runs:
//!
//! | observed             | action                      |
//! |----------------------|-----------------------------|
//! | absent               | launch, install             |
//! | exists, wrong size   | destroy, launch, install    |
//! | exists, correct size | reset, install              |
//!
//! A size mismatch is always resolved by a full destroy and relaunch;
//! partial topology repair is intentionally not attempted. Reconciliation
//! is idempotent: a second pass over an already-correct cluster takes the
//! reset+install path and never launches twice.
//!
//! Commands against multiple nodes are issued sequentially by ordinal,
//! never concurrently.

use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;
use tracing::{debug, info, warn};

use shared::ClusterTarget;

use crate::archive::{LogArchiver, TarGzArchiver};
use crate::command::{CommandOutput, CommandRunner};
use crate::error::{BridgeError, BridgeResult};
use crate::layout::LogLayout;
use crate::protocol::{BackendCommand, NodeSelector};
use crate::settings::BridgeSettings;

/// Snapshot of a named cluster as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservedState {
    Absent,
    ExistsWrongSize(usize),
    ExistsCorrectSize,
}

/// Handle on a provisioned cluster, exclusively owned for one harness run.
pub struct ClusterBridge {
    target: ClusterTarget,
    runner: Arc<dyn CommandRunner>,
    settings: BridgeSettings,
    layout: LogLayout,
    archiver: Arc<dyn LogArchiver>,
}

impl std::fmt::Debug for ClusterBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterBridge")
            .field("target", &self.target)
            .field("settings", &self.settings)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl ClusterBridge {
    /// Reconcile the named cluster to the target topology and return a
    /// handle on it. Any failed step surfaces as a provisioning error.
    pub async fn provision(
        target: ClusterTarget,
        runner: Arc<dyn CommandRunner>,
        settings: BridgeSettings,
    ) -> BridgeResult<Self> {
        let layout = LogLayout::new(settings.log_root.clone());
        let bridge = Self {
            target,
            runner,
            settings,
            layout,
            archiver: Arc::new(TarGzArchiver),
        };
        bridge.reconcile().await?;
        Ok(bridge)
    }

    /// Swap the log archiver (fluent API)
    pub fn with_archiver(mut self, archiver: Arc<dyn LogArchiver>) -> Self {
        self.archiver = archiver;
        self
    }

    pub fn target(&self) -> &ClusterTarget {
        &self.target
    }

    pub fn layout(&self) -> &LogLayout {
        &self.layout
    }

    fn name(&self) -> String {
        self.target.cluster_name.clone()
    }

    async fn reconcile(&self) -> BridgeResult<()> {
        let state = self
            .observe()
            .await
            .map_err(BridgeError::during("observe"))?;
        debug!("Observed cluster state: {state:?}");

        match state {
            ObservedState::Absent => {
                info!(
                    "🚀 Launching cluster '{}' with {} nodes",
                    self.target.cluster_name, self.target.node_count
                );
                self.launch().await.map_err(BridgeError::during("launch"))?;
                self.install()
                    .await
                    .map_err(BridgeError::during("install"))?;
            }
            ObservedState::ExistsWrongSize(found) => {
                info!(
                    "🔄 Cluster '{}' has {} nodes, want {}; destroying and relaunching",
                    self.target.cluster_name, found, self.target.node_count
                );
                self.runner
                    .run_checked(&BackendCommand::Destroy { name: self.name() })
                    .await
                    .map_err(BridgeError::during("destroy"))?;
                self.launch().await.map_err(BridgeError::during("launch"))?;
                self.install()
                    .await
                    .map_err(BridgeError::during("install"))?;
            }
            ObservedState::ExistsCorrectSize => {
                info!(
                    "♻️ Reusing cluster '{}' at {} nodes",
                    self.target.cluster_name, self.target.node_count
                );
                self.runner
                    .run_checked(&BackendCommand::Reset { name: self.name() })
                    .await
                    .map_err(BridgeError::during("reset"))?;
                self.install()
                    .await
                    .map_err(BridgeError::during("install"))?;
            }
        }

        Ok(())
    }

    /// Determine whether the target cluster exists and at what size.
    pub async fn observe(&self) -> BridgeResult<ObservedState> {
        let listing = self.runner.run(&BackendCommand::ListClusters).await?;
        if !listing.stdout.contains(&self.target.cluster_name) {
            return Ok(ObservedState::Absent);
        }

        let endpoints = self.endpoints().await?;
        if endpoints.len() == self.target.node_count {
            Ok(ObservedState::ExistsCorrectSize)
        } else {
            Ok(ObservedState::ExistsWrongSize(endpoints.len()))
        }
    }

    async fn launch(&self) -> BridgeResult<()> {
        self.runner
            .run_checked(&BackendCommand::Launch {
                name: self.name(),
                nodes: self.target.node_count,
            })
            .await?;
        Ok(())
    }

    /// Propagate the local build tree to every node. Precondition for
    /// `start()`.
    async fn install(&self) -> BridgeResult<()> {
        self.runner
            .run_checked(&BackendCommand::Upload {
                name: self.name(),
                node: NodeSelector::All,
                local: self.settings.install_source.clone(),
                remote: self.settings.remote_install_path.clone(),
            })
            .await?;
        Ok(())
    }

    /// Launch the database process on every node and record each node's
    /// pid file locally under the well-known layout.
    pub async fn start(&self) -> BridgeResult<()> {
        info!("▶️ Starting database on all {} nodes", self.target.node_count);
        self.runner
            .run_streaming(&BackendCommand::RunOn {
                name: self.name(),
                target: NodeSelector::All,
                command: self.settings.server_start_command.clone(),
            })
            .await?;

        // Pre-check only; a failure here surfaces when the copies run.
        if let Err(e) = std::fs::create_dir_all(self.layout.pids_dir()) {
            warn!("Could not create pid directory: {e}");
        }

        for ordinal in 0..self.target.node_count {
            self.runner
                .run_checked(&BackendCommand::Download {
                    name: self.name(),
                    node: NodeSelector::Ordinal(ordinal),
                    remote: self.settings.remote_pid_path.clone(),
                    local: self.layout.pid_file(ordinal),
                })
                .await?;
        }
        Ok(())
    }

    /// Terminate the database process on every node, one terminate signal
    /// per recorded pid file, in ascending ordinal order.
    ///
    /// An unreadable pid file aborts the whole stop; there is no
    /// partial-success bookkeeping.
    pub async fn stop(&self) -> BridgeResult<()> {
        for ordinal in 0..self.target.node_count {
            let pid_file = self.layout.pid_file(ordinal);
            let pid = tokio::fs::read_to_string(&pid_file).await?;
            let pid = pid.trim();
            debug!("🛑 Stopping node {} (pid {pid})", ordinal + 1);
            self.runner
                .run_streaming(&BackendCommand::RunOn {
                    name: self.name(),
                    target: NodeSelector::Ordinal(ordinal),
                    command: format!("kill {pid}"),
                })
                .await?;
        }
        Ok(())
    }

    /// Apply server configuration overrides, one change-config command per
    /// entry in key order.
    pub async fn apply_config(&self, options: &BTreeMap<String, String>) -> BridgeResult<()> {
        for (key, value) in options {
            self.runner
                .run_checked(&BackendCommand::ChangeConfig {
                    name: self.name(),
                    key: key.clone(),
                    value: value.clone(),
                })
                .await?;
        }
        Ok(())
    }

    /// Copy every node's remote system log down into the capture folder
    /// for `test_name`. An existing capture folder is archived first,
    /// never overwritten in place. A copy failure for one node aborts the
    /// whole capture.
    pub async fn capture_logs(&self, test_name: &str) -> BridgeResult<()> {
        let capture_dir = self.layout.capture_dir(test_name);
        if capture_dir.is_dir() {
            self.archiver.archive(&capture_dir)?;
        }
        std::fs::create_dir_all(&capture_dir)?;

        info!("📦 Capturing logs for '{test_name}'");
        for ordinal in 0..self.target.node_count {
            self.runner
                .run_checked(&BackendCommand::Download {
                    name: self.name(),
                    node: NodeSelector::Ordinal(ordinal),
                    remote: self.settings.remote_log_path.clone(),
                    local: self.layout.node_log(test_name, ordinal),
                })
                .await?;
        }
        Ok(())
    }

    /// Scan the captured logs for `test_name` and return the concatenated
    /// error-matching lines across all nodes.
    ///
    /// Returns empty text when no capture folder exists or no line
    /// matches; the return value doubles as the log-based pass/fail
    /// oracle.
    pub async fn read_cluster_logs(&self, test_name: &str) -> BridgeResult<String> {
        let capture_dir = self.layout.capture_dir(test_name);
        if !capture_dir.is_dir() {
            return Ok(String::new());
        }

        let mut combined = String::new();
        for ordinal in 0..self.target.node_count {
            let path = self.layout.node_log(test_name, ordinal);
            let text = match tokio::fs::read_to_string(&path).await {
                Ok(text) => text,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            for line in crate::oracle::error_lines(&text) {
                combined.push_str(line);
                combined.push('\n');
            }
        }

        if crate::oracle::scan(&combined) {
            Ok(combined)
        } else {
            Ok(String::new())
        }
    }

    /// Query the live host list, ordered by node ordinal.
    pub async fn endpoints(&self) -> BridgeResult<Vec<String>> {
        let output = self
            .runner
            .run_checked(&BackendCommand::Endpoints { name: self.name() })
            .await?;
        let hosts: Vec<String> = output
            .stdout
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if hosts.is_empty() {
            return Err(BridgeError::MalformedEndpoints { raw: output.stdout });
        }
        Ok(hosts)
    }

    /// Stop the cluster and return it to an unallocated state.
    ///
    /// Safe to call from a teardown path even when `start()` never
    /// succeeded: a failed stop is logged and the reset still runs, so an
    /// earlier failure is never masked by cleanup.
    pub async fn destroy(&self) -> BridgeResult<()> {
        if let Err(e) = self.stop().await {
            warn!("Stop during destroy failed: {e}");
        }
        self.runner
            .run_checked(&BackendCommand::Reset { name: self.name() })
            .await?;
        Ok(())
    }

    /// Run the database admin tool on the selected node(s).
    pub async fn node_tool(
        &self,
        node: NodeSelector,
        command: &str,
        arguments: &str,
    ) -> BridgeResult<CommandOutput> {
        let full_command = if arguments.is_empty() {
            format!("{} {}", self.settings.remote_node_tool, command)
        } else {
            format!("{} {} {}", self.settings.remote_node_tool, command, arguments)
        };
        self.runner
            .run_streaming(&BackendCommand::RunOn {
                name: self.name(),
                target: node,
                command: full_command,
            })
            .await
    }
}
