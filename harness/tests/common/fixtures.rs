//! Test modules and configuration builders

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bridge::{BridgeSettings, NodeSelector};
use harness::{HarnessContext, HarnessError, HarnessResult, Module, ModuleRegistry};
use shared::{ClusterTarget, HarnessConfig};

/// Ordered record of module lifecycle events across a run.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn position(events: &EventLog, entry: &str) -> Option<usize> {
    events.lock().unwrap().iter().position(|e| e.as_str() == entry)
}

/// Module that records start/end events around a short sleep.
pub struct RecordingModule {
    name: String,
    events: EventLog,
    delay: Duration,
}

impl RecordingModule {
    pub fn new(name: &str, events: EventLog, delay: Duration) -> Self {
        Self {
            name: name.to_string(),
            events,
            delay,
        }
    }
}

#[async_trait]
impl Module for RecordingModule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate(self: Arc<Self>) -> HarnessResult<()> {
        self.events
            .lock()
            .unwrap()
            .push(format!("{}:start", self.name));
        tokio::time::sleep(self.delay).await;
        self.events
            .lock()
            .unwrap()
            .push(format!("{}:end", self.name));
        Ok(())
    }
}

/// Module whose validate() returns immediately after scheduling a
/// background task that signals a failure later.
pub struct LateSignalModule {
    name: String,
    message: String,
    context: HarnessContext,
}

impl LateSignalModule {
    pub fn new(name: &str, message: &str, context: HarnessContext) -> Self {
        Self {
            name: name.to_string(),
            message: message.to_string(),
            context,
        }
    }
}

#[async_trait]
impl Module for LateSignalModule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate(self: Arc<Self>) -> HarnessResult<()> {
        let context = self.context.clone();
        let name = self.name.clone();
        let message = self.message.clone();
        let _ = self.context.spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            context.signal_failure(&name, &message);
        });
        Ok(())
    }
}

/// Module whose validate() raises, aborting the run.
pub struct FailingModule {
    name: String,
}

impl FailingModule {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl Module for FailingModule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate(self: Arc<Self>) -> HarnessResult<()> {
        Err(HarnessError::ModuleValidation {
            module: self.name.clone(),
            message: "assertion did not hold".to_string(),
        })
    }
}

/// Module that drives the cluster through the bridge handle.
pub struct NodeToolModule {
    name: String,
    context: HarnessContext,
}

impl NodeToolModule {
    pub fn new(name: &str, context: HarnessContext) -> Self {
        Self {
            name: name.to_string(),
            context,
        }
    }
}

#[async_trait]
impl Module for NodeToolModule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn validate(self: Arc<Self>) -> HarnessResult<()> {
        self.context
            .bridge()
            .node_tool(NodeSelector::Ordinal(0), "status", "")
            .await?;
        Ok(())
    }
}

/// Registry with the standard recording modules plus the specialty ones.
pub fn registry(events: &EventLog) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();

    for (name, delay_ms) in [("alpha", 50u64), ("beta", 10), ("gamma", 5)] {
        let events = events.clone();
        registry.register(name, move |_config: &HarnessConfig, _cx: HarnessContext| {
            Arc::new(RecordingModule::new(name, events.clone(), Duration::from_millis(delay_ms)))
                as Arc<dyn Module>
        });
    }

    registry.register("latecheck", |_config: &HarnessConfig, cx: HarnessContext| {
        Arc::new(LateSignalModule::new("latecheck", "late error", cx)) as Arc<dyn Module>
    });
    registry.register("doomed", |_config: &HarnessConfig, _cx: HarnessContext| {
        Arc::new(FailingModule::new("doomed")) as Arc<dyn Module>
    });
    registry.register("probe", |_config: &HarnessConfig, cx: HarnessContext| {
        Arc::new(NodeToolModule::new("probe", cx)) as Arc<dyn Module>
    });

    registry
}

pub fn config(test_name: &str, groups: &[&[&str]]) -> HarnessConfig {
    HarnessConfig {
        test_name: test_name.to_string(),
        cluster: ClusterTarget {
            cluster_name: "CVH".to_string(),
            node_count: 3,
            config_overrides: BTreeMap::new(),
        },
        modules: groups
            .iter()
            .map(|group| group.iter().map(|name| name.to_string()).collect())
            .collect(),
        ignored_errors: vec![],
        required_errors: vec![],
    }
}

pub fn settings(root: &Path) -> BridgeSettings {
    BridgeSettings::default().with_log_root(root.join("logs"))
}
