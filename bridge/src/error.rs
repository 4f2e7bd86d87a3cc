//! Bridge-specific error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Command failed: `{command}` exited with {exit_code}\nstdout: {stdout}\nstderr: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("Cluster provisioning failed during {stage}")]
    Provision {
        stage: &'static str,
        #[source]
        source: Box<BridgeError>,
    },

    #[error("Backend returned no endpoints for cluster: {raw:?}")]
    MalformedEndpoints { raw: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Wrap an error with the reconciliation stage it occurred in.
    pub fn during(stage: &'static str) -> impl FnOnce(BridgeError) -> BridgeError {
        move |source| BridgeError::Provision {
            stage,
            source: Box::new(source),
        }
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;
