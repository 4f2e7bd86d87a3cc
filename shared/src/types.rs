//! Loaded test-definition types
//!
//! The discovery and parsing of test-definition files is an external
//! collaborator's concern; these types are the contract it must produce.
//! Absent filter lists deserialize to empty vectors, so downstream code
//! never sees a missing list.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{SharedError, SharedResult};

/// Desired shape of the cluster a test runs against.
///
/// `node_count` is fixed for the lifetime of one harness run; the bridge
/// reconciles whatever currently exists toward this target before any
/// module executes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterTarget {
    /// Name the automation backend knows the cluster by.
    pub cluster_name: String,
    /// Number of database nodes, >= 1.
    pub node_count: usize,
    /// Server configuration overrides applied before startup, one
    /// change-config command per entry in key order.
    #[serde(default)]
    pub config_overrides: BTreeMap<String, String>,
}

/// One complete test definition as handed to the harness engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Name of the test; also names the captured-log folder.
    pub test_name: String,
    /// Target cluster shape.
    pub cluster: ClusterTarget,
    /// Ordered groups of module names. Groups run strictly in sequence;
    /// modules within a group run concurrently.
    #[serde(default)]
    pub modules: Vec<Vec<String>>,
    /// Substrings that suppress matching failures and log lines.
    #[serde(default)]
    pub ignored_errors: Vec<String>,
    /// Substrings that must be observed at least once or the run fails.
    #[serde(default)]
    pub required_errors: Vec<String>,
}

impl HarnessConfig {
    /// Check structural validity of a loaded definition.
    pub fn validate(&self) -> SharedResult<()> {
        if self.test_name.is_empty() {
            return Err(SharedError::InvalidConfig {
                field: "test_name".to_string(),
                value: "<empty>".to_string(),
            });
        }
        if self.cluster.cluster_name.is_empty() {
            return Err(SharedError::InvalidConfig {
                field: "cluster.cluster_name".to_string(),
                value: "<empty>".to_string(),
            });
        }
        if self.cluster.node_count == 0 {
            return Err(SharedError::InvalidConfig {
                field: "cluster.node_count".to_string(),
                value: "0".to_string(),
            });
        }
        if self.modules.iter().any(|group| group.is_empty()) {
            return Err(SharedError::InvalidConfig {
                field: "modules".to_string(),
                value: "empty module group".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> HarnessConfig {
        HarnessConfig {
            test_name: "bootstrap_smoke".to_string(),
            cluster: ClusterTarget {
                cluster_name: "CVH".to_string(),
                node_count: 3,
                config_overrides: BTreeMap::new(),
            },
            modules: vec![vec!["Bootstrap".to_string()]],
            ignored_errors: vec![],
            required_errors: vec![],
        }
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn zero_node_count_is_rejected() {
        let mut config = valid_config();
        config.cluster.node_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_module_group_is_rejected() {
        let mut config = valid_config();
        config.modules.push(vec![]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_filter_lists_deserialize_to_empty() {
        let json = r#"{
            "test_name": "t",
            "cluster": { "cluster_name": "CVH", "node_count": 3 }
        }"#;
        let config: HarnessConfig = serde_json::from_str(json).unwrap();
        assert!(config.ignored_errors.is_empty());
        assert!(config.required_errors.is_empty());
        assert!(config.modules.is_empty());
        assert!(config.cluster.config_overrides.is_empty());
    }
}
