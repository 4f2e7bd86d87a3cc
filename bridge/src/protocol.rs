//! Typed command protocol for the cluster automation backend
//!
//! Every interaction with the backend is expressed as a [`BackendCommand`]
//! value and rendered to argv form in one place. Callers never concatenate
//! shell strings, and tests can assert on exact command sequences.

use std::fmt;
use std::path::PathBuf;

/// Which node(s) of the cluster a command addresses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeSelector {
    /// Every node in the cluster.
    All,
    /// A single node by zero-based ordinal.
    Ordinal(usize),
}

impl NodeSelector {
    fn render(&self) -> String {
        match self {
            NodeSelector::All => "all".to_string(),
            NodeSelector::Ordinal(n) => n.to_string(),
        }
    }
}

/// The operations the core requires of any automation backend.
///
/// The concrete vocabulary follows the backend's CLI conventions; what the
/// bridge depends on is only the operation set itself: list, launch,
/// destroy, reset, endpoint query, bidirectional file copy, remote command
/// execution, and configuration change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendCommand {
    /// List the names of all known clusters.
    ListClusters,
    /// Allocate a new cluster with the given node count.
    Launch { name: String, nodes: usize },
    /// Deallocate a cluster entirely.
    Destroy { name: String },
    /// Return a cluster to a pristine, unallocated-software state.
    Reset { name: String },
    /// Query the live host list of a cluster.
    Endpoints { name: String },
    /// Copy a local path up to the selected node(s).
    Upload {
        name: String,
        node: NodeSelector,
        local: PathBuf,
        remote: String,
    },
    /// Copy a remote path down to a local destination.
    Download {
        name: String,
        node: NodeSelector,
        remote: String,
        local: PathBuf,
    },
    /// Run a shell command on the selected node(s).
    RunOn {
        name: String,
        target: NodeSelector,
        command: String,
    },
    /// Apply one server configuration change across the cluster.
    ChangeConfig {
        name: String,
        key: String,
        value: String,
    },
}

impl BackendCommand {
    /// Render to the argv passed to the backend executable.
    pub fn subcommand_args(&self) -> Vec<String> {
        match self {
            BackendCommand::ListClusters => vec!["list".to_string()],
            BackendCommand::Launch { name, nodes } => {
                vec!["launch".to_string(), name.clone(), nodes.to_string()]
            }
            BackendCommand::Destroy { name } => vec!["destroy".to_string(), name.clone()],
            BackendCommand::Reset { name } => vec!["reset".to_string(), name.clone()],
            BackendCommand::Endpoints { name } => {
                vec!["info".to_string(), name.clone(), "--hosts".to_string()]
            }
            BackendCommand::Upload {
                name,
                node,
                local,
                remote,
            } => vec![
                "scp".to_string(),
                name.clone(),
                node.render(),
                local.to_string_lossy().into_owned(),
                remote.clone(),
            ],
            BackendCommand::Download {
                name,
                node,
                remote,
                local,
            } => vec![
                "scp".to_string(),
                "-r".to_string(),
                name.clone(),
                node.render(),
                local.to_string_lossy().into_owned(),
                remote.clone(),
            ],
            BackendCommand::RunOn {
                name,
                target,
                command,
            } => vec![
                "run".to_string(),
                name.clone(),
                target.render(),
                command.clone(),
            ],
            BackendCommand::ChangeConfig { name, key, value } => vec![
                "change_config".to_string(),
                name.clone(),
                "all".to_string(),
                "--k".to_string(),
                key.clone(),
                "--value".to_string(),
                value.clone(),
            ],
        }
    }
}

impl fmt::Display for BackendCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.subcommand_args().join(" "))
    }
}
