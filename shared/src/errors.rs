//! Shared error types for the validation harness

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },

    #[error("Deserialization failed: {message}")]
    DeserializationError { message: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
