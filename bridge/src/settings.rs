//! Bridge configuration
//!
//! Everything that used to be a hard-coded constant in older harnesses is
//! threaded through here instead: the backend executable, the local
//! working directory, the log root, and the remote paths the database
//! installation lives at.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct BridgeSettings {
    /// Automation backend executable.
    pub backend_program: String,
    /// Working directory every backend command runs from.
    pub working_dir: PathBuf,
    /// Root of the local log/artifact tree.
    pub log_root: PathBuf,
    /// Local build tree propagated to every node by `install`.
    pub install_source: PathBuf,
    /// Remote directory the build tree is installed to.
    pub remote_install_path: String,
    /// Command that launches the database process on a node and records
    /// its pid at `remote_pid_path`.
    pub server_start_command: String,
    /// Remote file each node records its server pid in.
    pub remote_pid_path: String,
    /// Remote system log captured per node.
    pub remote_log_path: String,
    /// Remote admin tool invoked by `node_tool`.
    pub remote_node_tool: String,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            backend_program: "ctool".to_string(),
            working_dir: PathBuf::from("."),
            log_root: PathBuf::from("build/test/logs/validation"),
            install_source: PathBuf::from("."),
            remote_install_path: "~/server".to_string(),
            server_start_command: "~/server/bin/server -p ~/PID".to_string(),
            remote_pid_path: "~/PID".to_string(),
            remote_log_path: "~/server/logs/system.log".to_string(),
            remote_node_tool: "~/server/bin/nodetool".to_string(),
        }
    }
}

impl BridgeSettings {
    /// Configure the backend executable (fluent API)
    pub fn with_backend_program(mut self, program: impl Into<String>) -> Self {
        self.backend_program = program.into();
        self
    }

    /// Configure the local working directory (fluent API)
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Configure the local log root (fluent API)
    pub fn with_log_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.log_root = root.into();
        self
    }

    /// Configure the local build tree to install (fluent API)
    pub fn with_install_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.install_source = source.into();
        self
    }

    /// Configure the remote server start command (fluent API)
    pub fn with_server_start_command(mut self, command: impl Into<String>) -> Self {
        self.server_start_command = command.into();
        self
    }
}
