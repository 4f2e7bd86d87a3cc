//! Harness orchestration engine
//!
//! One engine drives one test invocation:
//! provision -> apply overrides -> start -> module groups -> teardown ->
//! verdict. Teardown always runs, including after an aborted group, and
//! is itself fail-fast: stop, capture, read-logs, destroy. The captured
//! transcript is asserted clean before the ignored/required filter is
//! applied to accumulated module failures.

use std::sync::Arc;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

use bridge::{BridgeSettings, ClusterBridge, CommandRunner};
use shared::HarnessConfig;

use crate::error::{HarnessError, HarnessResult};
use crate::failures::FailureLog;
use crate::filter::{ErrorFilter, Verdict};
use crate::module::HarnessContext;
use crate::registry::ModuleRegistry;

pub struct HarnessEngine {
    config: HarnessConfig,
    settings: BridgeSettings,
    runner: Arc<dyn CommandRunner>,
    registry: ModuleRegistry,
    failures: FailureLog,
}

impl HarnessEngine {
    pub fn new(
        config: HarnessConfig,
        settings: BridgeSettings,
        runner: Arc<dyn CommandRunner>,
        registry: ModuleRegistry,
    ) -> Self {
        Self {
            config,
            settings,
            runner,
            registry,
            failures: FailureLog::new(),
        }
    }

    /// Failures recorded so far. Mainly useful to inspect a finished run.
    pub fn failures(&self) -> &FailureLog {
        &self.failures
    }

    /// Execute the configured test from provisioning through verdict.
    ///
    /// Fatal conditions (command/provisioning failures, a module's
    /// validate() raising, a dirty log transcript) surface as errors;
    /// everything else is resolved into the returned [`Verdict`].
    pub async fn run(&self) -> HarnessResult<Verdict> {
        self.config.validate()?;

        info!(
            "🚀 Provisioning cluster '{}' ({} nodes) for test '{}'",
            self.config.cluster.cluster_name, self.config.cluster.node_count, self.config.test_name
        );
        let bridge = Arc::new(
            ClusterBridge::provision(
                self.config.cluster.clone(),
                self.runner.clone(),
                self.settings.clone(),
            )
            .await?,
        );

        let outcome = self.drive(&bridge).await;

        // Teardown runs regardless of the outcome above; when the run
        // body already failed, a teardown error must not mask it.
        let transcript = match self.teardown(&bridge).await {
            Ok(transcript) => transcript,
            Err(teardown_err) => {
                if let Err(run_err) = outcome {
                    error!("Teardown failed after run error: {teardown_err}");
                    return Err(run_err);
                }
                return Err(teardown_err);
            }
        };
        outcome?;

        let filter = ErrorFilter::from_config(&self.config);
        let violations = filter.transcript_violations(&transcript);
        if !violations.is_empty() {
            return Err(HarnessError::LogAssertion {
                transcript: violations.join("\n"),
            });
        }

        let failures = self.failures.snapshot().await;
        let verdict = filter.resolve(&failures, &transcript);
        if verdict.is_pass() {
            info!("✅ Test '{}' passed", self.config.test_name);
        }
        Ok(verdict)
    }

    async fn drive(&self, bridge: &Arc<ClusterBridge>) -> HarnessResult<()> {
        if !self.config.cluster.config_overrides.is_empty() {
            bridge
                .apply_config(&self.config.cluster.config_overrides)
                .await?;
        }
        bridge.start().await?;

        for (index, group) in self.config.modules.iter().enumerate() {
            debug!(
                "▶️ Running module group {}/{} ({} modules)",
                index + 1,
                self.config.modules.len(),
                group.len()
            );
            self.run_module_group(bridge, group).await?;
        }
        Ok(())
    }

    /// Run one group of modules concurrently to completion.
    ///
    /// Every validate() task and every failure-signal task is tracked in
    /// one group-scoped task set; the group is complete only when the
    /// whole set has resolved. A validate() error aborts the run
    /// immediately.
    async fn run_module_group(
        &self,
        bridge: &Arc<ClusterBridge>,
        group: &[String],
    ) -> HarnessResult<()> {
        let tracker = TaskTracker::new();
        let context = HarnessContext::new(self.failures.clone(), bridge.clone(), tracker.clone());

        let mut modules = Vec::with_capacity(group.len());
        for name in group {
            modules.push(self.registry.instantiate(name, &self.config, context.clone())?);
        }

        let mut handles = Vec::with_capacity(modules.len());
        for module in modules {
            handles.push(tracker.spawn(module.validate()));
        }

        for handle in handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => return Err(e),
                Err(join_err) => {
                    return Err(HarnessError::TaskPanic {
                        detail: join_err.to_string(),
                    })
                }
            }
        }

        tracker.close();
        tracker.wait().await;
        Ok(())
    }

    /// Stop, capture, scan, destroy. Returns the raw transcript of
    /// error-matching log lines for the assertion and filter passes.
    async fn teardown(&self, bridge: &Arc<ClusterBridge>) -> HarnessResult<String> {
        for messages in self.failures.snapshot().await.values() {
            for message in messages {
                error!("{message}");
            }
        }

        bridge.stop().await?;
        bridge.capture_logs(&self.config.test_name).await?;
        let transcript = bridge.read_cluster_logs(&self.config.test_name).await?;
        bridge.destroy().await?;
        Ok(transcript)
    }
}
