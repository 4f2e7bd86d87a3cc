//! Module name registry
//!
//! Maps the module names appearing in a test definition to factory
//! closures, populated by the embedding test runner at process start. An
//! unknown name resolves to a `ModuleNotFound` error rather than a
//! generic construction failure.

use std::collections::HashMap;
use std::sync::Arc;

use shared::HarnessConfig;

use crate::error::{HarnessError, HarnessResult};
use crate::module::{HarnessContext, Module};

pub type ModuleFactory =
    Arc<dyn Fn(&HarnessConfig, HarnessContext) -> Arc<dyn Module> + Send + Sync>;

#[derive(Clone, Default)]
pub struct ModuleRegistry {
    factories: HashMap<String, ModuleFactory>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&HarnessConfig, HarnessContext) -> Arc<dyn Module> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    pub fn instantiate(
        &self,
        name: &str,
        config: &HarnessConfig,
        context: HarnessContext,
    ) -> HarnessResult<Arc<dyn Module>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| HarnessError::ModuleNotFound {
                name: name.to_string(),
            })?;
        Ok(factory(config, context))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}
