//! Named scenarios a lecturer can start.
//!
//! The catalog is built once at startup and handed to the
//! [`GroupGameManager`](crate::domain::manager::GroupGameManager); there is
//! no process-wide registry.

use std::collections::BTreeMap;

use crate::domain::group::GameError;
use crate::domain::scenarios;
use crate::domain::script::Script;

/// Builds a fresh script each time it is called.
pub type ScenarioFactory = fn() -> Script;

#[derive(Debug, Clone, Default)]
pub struct ScriptCatalog {
    factories: BTreeMap<String, ScenarioFactory>,
}

impl ScriptCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog holding the `"test"` and `"demo"` scenarios.
    pub fn with_builtin_scenarios() -> Self {
        let mut catalog = Self::new();
        catalog.register("test", scenarios::test_scenario);
        catalog.register("demo", scenarios::demo_scenario);
        catalog
    }

    /// Adds or replaces a scenario.
    pub fn register(&mut self, id: impl Into<String>, factory: ScenarioFactory) {
        self.factories.insert(id.into(), factory);
    }

    pub fn build(&self, id: &str) -> Result<Script, GameError> {
        self.factories
            .get(id)
            .map(|factory| factory())
            .ok_or_else(|| GameError::InvalidScenario(id.to_owned()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Scenario ids in sorted order.
    pub fn scenario_ids(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}
