//! Live and historical telemetry of one board.
//!
//! A board keeps its current readings plus three parallel history vectors
//! (`production_history`, `consumption_history`, `round_history`) that
//! always have the same length.  Only day and night rounds are ever written
//! to history, and each round at most once.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::domain::round::RoundType;
use crate::domain::scoring::{round_score, BoardStatistics};
use crate::domain::script::Script;
use crate::protocol::ConnectedBuilding;

/// A board is connected while its last report is at most this old.
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Stable identifier of a board.  Boards register with a numeric id; the
/// lecturer tools address them by string, so both convert here.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BoardId(String);

impl BoardId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable name derived from the id.  Identical across
    /// reconnects.
    pub fn display_name(&self) -> String {
        format!("Board {}", self.0)
    }
}

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u32> for BoardId {
    fn from(id: u32) -> Self {
        BoardId(id.to_string())
    }
}

impl From<&str> for BoardId {
    fn from(id: &str) -> Self {
        BoardId(id.to_owned())
    }
}

impl From<String> for BoardId {
    fn from(id: String) -> Self {
        BoardId(id)
    }
}

/// Per-source generation captured when a gameplay round is saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerplantSnapshot {
    pub round_index: usize,
    pub round_type: String,
    pub connected_production: Vec<u8>,
    pub generation_by_source: BTreeMap<u8, f64>,
    pub total_production: f64,
    pub recorded_at: SystemTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardState {
    pub id: BoardId,
    pub display_name: String,
    pub board_type: String,
    /// Name the board sent in its registration request, if any.
    pub reported_name: Option<String>,

    pub current_production: f64,
    pub current_consumption: f64,

    pub production_history: Vec<f64>,
    pub consumption_history: Vec<f64>,
    pub round_history: Vec<usize>,
    pub round_scores: Vec<u32>,

    pub connected_buildings: Vec<ConnectedBuilding>,
    /// Source ids of the power plants currently placed on the board.
    pub connected_production: Vec<u8>,
    /// source id → watts, as last reported.
    pub production_breakdown: BTreeMap<u8, f64>,
    pub powerplant_history: BTreeMap<usize, PowerplantSnapshot>,

    /// Script round index seen at the last telemetry update.
    pub current_round_index: Option<usize>,
    pub last_updated: Option<SystemTime>,
}

impl BoardState {
    pub fn new(id: BoardId) -> Self {
        let display_name = id.display_name();
        Self {
            id,
            display_name,
            board_type: "generic".to_owned(),
            reported_name: None,
            current_production: 0.0,
            current_consumption: 0.0,
            production_history: Vec::new(),
            consumption_history: Vec::new(),
            round_history: Vec::new(),
            round_scores: Vec::new(),
            connected_buildings: Vec::new(),
            connected_production: Vec::new(),
            production_breakdown: BTreeMap::new(),
            powerplant_history: BTreeMap::new(),
            current_round_index: None,
            last_updated: None,
        }
    }

    /// Records a full power sample.  See [`BoardState::record_sample`].
    pub fn update_power(
        &mut self,
        production: f64,
        consumption: f64,
        script: Option<&Script>,
        now: SystemTime,
    ) {
        self.record_sample(Some(production), Some(consumption), script, now);
    }

    /// Records the present values of a sample, stamps the board as seen at
    /// `now`, and remembers which script round the sample belongs to.
    ///
    /// This never writes history: the round-advance path saves the outgoing
    /// round for every board before it moves the cursor.
    pub fn record_sample(
        &mut self,
        production: Option<f64>,
        consumption: Option<f64>,
        script: Option<&Script>,
        now: SystemTime,
    ) {
        if let Some(p) = production {
            self.current_production = p;
        }
        if let Some(c) = consumption {
            self.current_consumption = c;
        }
        if let Some(index) = script.and_then(Script::current_round_index) {
            self.current_round_index = Some(index);
        }
        self.last_updated = Some(now);
    }

    /// Last full report wins: the previous list is discarded.
    pub fn replace_connected_buildings(&mut self, buildings: Vec<ConnectedBuilding>) {
        self.connected_buildings = buildings;
    }

    /// Last full report wins for the per-source breakdown too.  The
    /// connected-production list is derived from the reported source ids.
    pub fn replace_production(&mut self, breakdown: BTreeMap<u8, f64>) {
        self.connected_production = breakdown.keys().copied().collect();
        self.production_breakdown = breakdown;
    }

    /// Appends the current readings as the result of round `round_index`.
    ///
    /// Returns `false` without touching history when the round is not a
    /// gameplay round or when that round was already recorded.
    pub fn save_current_round_to_history(
        &mut self,
        round_index: usize,
        round_type: RoundType,
        now: SystemTime,
    ) -> bool {
        if !round_type.is_gameplay() {
            return false;
        }
        if self.round_history.last() == Some(&round_index) {
            return false;
        }

        self.production_history.push(self.current_production);
        self.consumption_history.push(self.current_consumption);
        self.round_history.push(round_index);
        self.round_scores.push(round_score(
            self.current_production,
            self.current_consumption,
            round_type,
        ));

        self.powerplant_history.insert(
            round_index,
            PowerplantSnapshot {
                round_index,
                round_type: round_type.name().to_owned(),
                connected_production: self.connected_production.clone(),
                generation_by_source: self.production_breakdown.clone(),
                total_production: self.production_breakdown.values().sum(),
                recorded_at: now,
            },
        );
        true
    }

    /// Clears everything scoped to a game while keeping identity and
    /// liveness, so a new game does not force boards to re-register.
    pub fn reset_for_new_game(&mut self) {
        self.current_production = 0.0;
        self.current_consumption = 0.0;
        self.production_history.clear();
        self.consumption_history.clear();
        self.round_history.clear();
        self.round_scores.clear();
        self.connected_buildings.clear();
        self.connected_production.clear();
        self.production_breakdown.clear();
        self.powerplant_history.clear();
        self.current_round_index = None;
    }

    /// Whether the board reported within `timeout` of `now`.  A timestamp in
    /// the future counts as connected.
    pub fn is_connected(&self, now: SystemTime, timeout: Duration) -> bool {
        match self.last_updated {
            None => false,
            Some(last) => match now.duration_since(last) {
                Ok(age) => age <= timeout,
                Err(_) => true,
            },
        }
    }

    pub fn mark_updated_at(&mut self, at: SystemTime) {
        self.last_updated = Some(at);
    }

    pub fn total_score(&self) -> u32 {
        self.round_scores.iter().sum()
    }

    pub fn statistics(&self) -> BoardStatistics {
        BoardStatistics::from_history(
            &self.production_history,
            &self.consumption_history,
            &self.round_scores,
        )
    }
}
