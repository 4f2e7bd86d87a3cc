//! Harness-specific error types

use thiserror::Error;

use bridge::BridgeError;
use shared::SharedError;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("Invalid harness configuration")]
    Config(#[from] SharedError),

    #[error("Unknown validation module: {name}")]
    ModuleNotFound { name: String },

    #[error("Module {module} failed validation: {message}")]
    ModuleValidation { module: String, message: String },

    #[error("Validation task panicked: {detail}")]
    TaskPanic { detail: String },

    #[error("Cluster logs contain unexpected errors:\n{transcript}")]
    LogAssertion { transcript: String },

    #[error("Validation failures survived filtering:\n{summary}")]
    FailuresRecorded { summary: String },

    #[error("Required error signatures never observed: {patterns:?}")]
    RequiredErrorMissing { patterns: Vec<String> },
}

pub type HarnessResult<T> = Result<T, HarnessError>;
