//! Registry of per-group game states.
//!
//! Groups are created lazily on first lookup and never evicted.  Each group
//! sits behind its own mutex so traffic for different classrooms never
//! contends.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::info;
use uuid::Uuid;

use crate::domain::board::CONNECTION_TIMEOUT;
use crate::domain::catalog::ScriptCatalog;
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::group::{GameError, GroupGameState};

/// Shared handle to one group's state.
pub type GroupHandle = Arc<Mutex<GroupGameState>>;

/// Locks a group, recovering the guard if a previous holder panicked.
pub fn lock_group(handle: &GroupHandle) -> MutexGuard<'_, GroupGameState> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct GroupGameManager {
    groups: Mutex<HashMap<String, GroupHandle>>,
    catalog: Arc<ScriptCatalog>,
    clock: Arc<dyn Clock>,
    connection_timeout: Duration,
}

impl GroupGameManager {
    pub fn new(catalog: Arc<ScriptCatalog>) -> Self {
        Self::with_clock(catalog, Arc::new(SystemClock), CONNECTION_TIMEOUT)
    }

    pub fn with_clock(
        catalog: Arc<ScriptCatalog>,
        clock: Arc<dyn Clock>,
        connection_timeout: Duration,
    ) -> Self {
        Self {
            groups: Mutex::new(HashMap::new()),
            catalog,
            clock,
            connection_timeout,
        }
    }

    pub fn catalog(&self) -> &ScriptCatalog {
        &self.catalog
    }

    /// Returns the group, creating an inactive one on first access.
    pub fn get_or_create(&self, group_id: &str) -> GroupHandle {
        let mut groups = self.groups.lock().unwrap_or_else(PoisonError::into_inner);
        groups
            .entry(group_id.to_owned())
            .or_insert_with(|| {
                info!(group = group_id, "group created");
                Arc::new(Mutex::new(GroupGameState::with_clock(
                    group_id,
                    Arc::clone(&self.clock),
                    self.connection_timeout,
                )))
            })
            .clone()
    }

    /// Returns the group only if it already exists.
    pub fn get(&self, group_id: &str) -> Option<GroupHandle> {
        self.groups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(group_id)
            .cloned()
    }

    pub fn group_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .groups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    /// Builds `scenario_id` from the catalog and starts it in `group_id`.
    pub fn start_game(&self, group_id: &str, scenario_id: &str) -> Result<Uuid, GameError> {
        let script = self.catalog.build(scenario_id)?;
        let handle = self.get_or_create(group_id);
        let mut group = lock_group(&handle);
        group.start_game(script)
    }
}
