//! Per-round reward matrix and per-board statistics.

use serde::{Deserialize, Serialize};

use crate::domain::round::RoundType;

/// Points for landing within ±5% of consumption.
pub const PERFECT_REWARD: u32 = 10;
/// Points for producing more than 5% over consumption.
pub const OVER_REWARD: u32 = 4;
/// Points for a 5–10% shortfall during the day.  At night the same
/// shortfall earns nothing.
pub const SLIGHTLY_UNDER_DAY_REWARD: u32 = 1;

/// Score of one round given the board's production and consumption.
///
/// Presentation rounds and zero consumption score 0.
pub fn round_score(production: f64, consumption: f64, round_type: RoundType) -> u32 {
    if !round_type.is_gameplay() || consumption == 0.0 {
        return 0;
    }
    let ratio = production / consumption;
    if (0.95..=1.05).contains(&ratio) {
        PERFECT_REWARD
    } else if ratio > 1.05 {
        OVER_REWARD
    } else if ratio >= 0.9 {
        match round_type {
            RoundType::Day => SLIGHTLY_UNDER_DAY_REWARD,
            _ => 0,
        }
    } else {
        0
    }
}

/// Aggregates over a board's recorded rounds.  All zero for a board that
/// has not finished any gameplay round.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoardStatistics {
    pub rounds_played: usize,
    pub total_production: f64,
    pub total_consumption: f64,
    /// Mean of production − consumption over recorded rounds.
    pub average_balance: f64,
    pub total_score: u32,
}

impl BoardStatistics {
    pub fn from_history(production: &[f64], consumption: &[f64], scores: &[u32]) -> Self {
        let rounds_played = production.len().min(consumption.len());
        if rounds_played == 0 {
            return Self::default();
        }
        let total_production: f64 = production.iter().sum();
        let total_consumption: f64 = consumption.iter().sum();
        Self {
            rounds_played,
            total_production,
            total_consumption,
            average_balance: (total_production - total_consumption) / rounds_played as f64,
            total_score: scores.iter().sum(),
        }
    }
}
