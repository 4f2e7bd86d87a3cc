//! Validation module capability and per-group context
//!
//! A module is one independent validation unit run against a provisioned
//! cluster. Its `validate()` entry point is spawned as an asynchronous
//! task; it must not block the engine beyond submission. Modules may
//! additionally signal failures out-of-band from any concurrent task they
//! spawn, and the engine will not consider a module group complete until
//! every such signal task has resolved.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

use bridge::ClusterBridge;

use crate::error::HarnessResult;
use crate::failures::FailureLog;

/// One validation unit. Constructed bound to the loaded configuration and
/// a [`HarnessContext`] for its group.
#[async_trait]
pub trait Module: Send + Sync {
    fn name(&self) -> &str;

    /// Run this module's validation work to completion.
    ///
    /// A returned error aborts the entire run; failures that should be
    /// resolved against the ignored/required filter at verdict time are
    /// reported through [`HarnessContext::signal_failure`] instead.
    async fn validate(self: Arc<Self>) -> HarnessResult<()>;
}

/// Capabilities handed to modules of one group.
///
/// Cloning is cheap; every clone signals into the same failure log and
/// tracks spawned work in the same group-scoped task set.
#[derive(Clone)]
pub struct HarnessContext {
    failures: FailureLog,
    bridge: Arc<ClusterBridge>,
    tracker: TaskTracker,
}

impl HarnessContext {
    pub(crate) fn new(failures: FailureLog, bridge: Arc<ClusterBridge>, tracker: TaskTracker) -> Self {
        Self {
            failures,
            bridge,
            tracker,
        }
    }

    /// Record a failure for `module` without aborting the run.
    ///
    /// The append is scheduled as an independent tracked task, so this is
    /// callable from any concurrently running task, not only the module's
    /// own `validate()` call chain. The engine waits for all such tasks
    /// before judging the group complete.
    pub fn signal_failure(&self, module: &str, message: &str) {
        let failures = self.failures.clone();
        let module = module.to_string();
        let message = message.to_string();
        let _ = self.tracker.spawn(async move {
            failures.append(&module, &message).await;
        });
    }

    /// Spawn background work tied to this module group. The engine waits
    /// for the task before the group is considered complete.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.tracker.spawn(future)
    }

    /// The provisioned cluster this run executes against.
    pub fn bridge(&self) -> &Arc<ClusterBridge> {
        &self.bridge
    }
}
