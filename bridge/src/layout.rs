//! Local filesystem layout for captured artifacts
//!
//! The paths produced here are a wire contract shared by `start()`,
//! `stop()`, and `capture_logs()`, and by any tooling that consumes
//! previously archived artifacts:
//!
//! - `<log_root>/<test_name>/node<N>.log`   (captured logs, 1-indexed)
//! - `<log_root>/PIDs/node<N>_PID.txt`      (recorded process ids, 1-indexed)

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LogLayout {
    log_root: PathBuf,
}

impl LogLayout {
    pub fn new(log_root: impl Into<PathBuf>) -> Self {
        Self {
            log_root: log_root.into(),
        }
    }

    pub fn log_root(&self) -> &Path {
        &self.log_root
    }

    /// Directory holding one recorded pid file per node.
    pub fn pids_dir(&self) -> PathBuf {
        self.log_root.join("PIDs")
    }

    /// Recorded pid file for a node. Takes the zero-based ordinal; the
    /// file name is 1-indexed.
    pub fn pid_file(&self, ordinal: usize) -> PathBuf {
        self.pids_dir().join(format!("node{}_PID.txt", ordinal + 1))
    }

    /// Capture folder for one test name.
    pub fn capture_dir(&self, test_name: &str) -> PathBuf {
        self.log_root.join(test_name)
    }

    /// Captured system log for a node. Takes the zero-based ordinal; the
    /// file name is 1-indexed.
    pub fn node_log(&self, test_name: &str, ordinal: usize) -> PathBuf {
        self.capture_dir(test_name)
            .join(format!("node{}.log", ordinal + 1))
    }
}
