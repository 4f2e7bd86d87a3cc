//! Shared types for the cluster validation harness
//!
//! Contains only the types every subsystem agrees on: the loaded test
//! definition (cluster shape, module groups, error filter lists) and the
//! tracing bootstrap. Subsystem-internal types (bridge settings, verdicts)
//! are kept in their respective crates.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::{SharedError, SharedResult};
pub use types::{ClusterTarget, HarnessConfig};
