//! End-of-game summary handed to the web front end as JSON.

use std::time::SystemTime;

use serde::Serialize;
use uuid::Uuid;

use grid_core::domain::board::PowerplantSnapshot;
use grid_core::domain::scoring::BoardStatistics;
use grid_core::{BoardState, GroupGameState};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundResult {
    pub round_index: usize,
    pub production: f64,
    pub consumption: f64,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardReport {
    pub board_id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_name: Option<String>,
    pub board_type: String,
    pub rounds: Vec<RoundResult>,
    pub statistics: BoardStatistics,
    pub powerplants: Vec<PowerplantSnapshot>,
}

impl From<&BoardState> for BoardReport {
    fn from(board: &BoardState) -> Self {
        let rounds = board
            .round_history
            .iter()
            .zip(&board.production_history)
            .zip(&board.consumption_history)
            .zip(&board.round_scores)
            .map(|(((round_index, production), consumption), score)| RoundResult {
                round_index: *round_index,
                production: *production,
                consumption: *consumption,
                score: *score,
            })
            .collect();
        Self {
            board_id: board.id.to_string(),
            display_name: board.display_name.clone(),
            reported_name: board.reported_name.clone(),
            board_type: board.board_type.clone(),
            rounds,
            statistics: board.statistics(),
            powerplants: board.powerplant_history.values().cloned().collect(),
        }
    }
}

/// Scores and histories of every board in a group, best score first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameReport {
    pub group_id: String,
    pub session_id: Option<Uuid>,
    pub generated_at: SystemTime,
    pub boards: Vec<BoardReport>,
}

impl GameReport {
    pub fn from_group(group: &GroupGameState) -> Self {
        let mut boards: Vec<BoardReport> = group.boards().map(BoardReport::from).collect();
        boards.sort_by(|a, b| {
            b.statistics
                .total_score
                .cmp(&a.statistics.total_score)
                .then_with(|| a.board_id.cmp(&b.board_id))
        });
        Self {
            group_id: group.group_id().to_owned(),
            session_id: group.session_id(),
            generated_at: group.now(),
            boards,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_core::{Round, Script};

    fn played_group() -> GroupGameState {
        let mut group = GroupGameState::new("class-a");
        group.register_board("1".into(), None, None);
        group.register_board("2".into(), Some("Team Two".into()), None);
        group
            .start_game(
                Script::builder()
                    .add_round(Round::day().build())
                    .add_round(Round::night().build())
                    .build(),
            )
            .unwrap();
        group.update_board_power(&"1".into(), Some(50.0), Some(100.0)).unwrap();
        group.update_board_power(&"2".into(), Some(100.0), Some(100.0)).unwrap();
        group.advance_round().unwrap();
        group
    }

    #[test]
    fn test_boards_sorted_by_score() {
        let report = GameReport::from_group(&played_group());
        let ids: Vec<&str> = report.boards.iter().map(|b| b.board_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(report.boards[0].rounds[0].score, 10);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = GameReport::from_group(&played_group());

        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["group_id"], "class-a");
        assert_eq!(value["boards"][0]["reported_name"], "Team Two");
        assert!(value["boards"][1].get("reported_name").is_none());
        assert_eq!(value["boards"][1]["rounds"][0]["production"], 50.0);
    }
}
