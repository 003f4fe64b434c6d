//! A game script: an ordered, immutable list of rounds plus a cursor.
//!
//! The cursor starts before the first round.  [`Script::step`] moves it
//! forward and reports `false` once the last round has been passed, after
//! which the script is finished and every "current" query returns nothing.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::energy::{Building, ProductionRange, Source};
use crate::domain::round::{Conditions, Round, RoundType};

/// Position of the script cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    NotStarted,
    At(usize),
    Finished,
}

/// Base consumption of a building card in watts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseConsumption {
    pub day: f64,
    pub night: f64,
}

#[derive(Debug, Clone)]
pub struct Script {
    rounds: Vec<Round>,
    cursor: Cursor,
    building_consumptions: BTreeMap<Building, BaseConsumption>,
    source_ranges: BTreeMap<Source, ProductionRange>,
    allowed_sources: BTreeSet<Source>,
}

impl Script {
    pub fn builder() -> ScriptBuilder {
        ScriptBuilder::default()
    }

    /// Advances the cursor by one round.
    ///
    /// Returns `false` when there is no next round; the script is then
    /// finished and stays finished on further calls.
    pub fn step(&mut self) -> bool {
        let next = match self.cursor {
            Cursor::NotStarted => 0,
            Cursor::At(i) => i + 1,
            Cursor::Finished => return false,
        };
        if next < self.rounds.len() {
            self.cursor = Cursor::At(next);
            true
        } else {
            self.cursor = Cursor::Finished;
            false
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.cursor == Cursor::Finished
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// Number of day and night rounds in the whole script.
    pub fn gameplay_round_count(&self) -> usize {
        self.rounds
            .iter()
            .filter(|r| r.round_type().is_gameplay())
            .count()
    }

    pub fn current_round_index(&self) -> Option<usize> {
        match self.cursor {
            Cursor::At(i) => Some(i),
            _ => None,
        }
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.current_round_index().and_then(|i| self.rounds.get(i))
    }

    pub fn current_round_type(&self) -> Option<RoundType> {
        self.current_round().map(Round::round_type)
    }

    pub fn allowed_sources(&self) -> &BTreeSet<Source> {
        &self.allowed_sources
    }

    pub fn base_consumption(&self, building: Building) -> Option<BaseConsumption> {
        self.building_consumptions.get(&building).copied()
    }

    fn current_conditions(&self) -> Option<(&Conditions, bool)> {
        let round = self.current_round()?;
        round.conditions().map(|c| (c, round.is_day()))
    }

    /// Coefficient of one source in the current round.
    ///
    /// `None` outside gameplay rounds or for a source the script does not
    /// allow.
    pub fn current_production_coefficient(&self, source: Source) -> Option<f64> {
        if !self.allowed_sources.contains(&source) {
            return None;
        }
        let (conditions, is_day) = self.current_conditions()?;
        Some(conditions.production_coefficient(source, is_day))
    }

    /// Coefficients of every allowed source; empty outside gameplay rounds.
    pub fn current_production_coefficients(&self) -> BTreeMap<Source, f64> {
        self.allowed_sources
            .iter()
            .filter_map(|s| self.current_production_coefficient(*s).map(|c| (*s, c)))
            .collect()
    }

    /// Base range of `source` scaled by its current coefficient.
    pub fn current_production_range(&self, source: Source) -> Option<ProductionRange> {
        let coefficient = self.current_production_coefficient(source)?;
        let base = self.source_ranges.get(&source)?;
        Some(base.scaled(coefficient))
    }

    pub fn current_production_ranges(&self) -> BTreeMap<Source, ProductionRange> {
        self.allowed_sources
            .iter()
            .filter_map(|s| self.current_production_range(*s).map(|r| (*s, r)))
            .collect()
    }

    /// Effective consumption of `building` in watts: base (day or night)
    /// times the round's consumption factor, plus its modifier.
    pub fn current_building_consumption(&self, building: Building) -> Option<f64> {
        let (conditions, is_day) = self.current_conditions()?;
        let base = self.building_consumptions.get(&building)?;
        let base = if is_day { base.day } else { base.night };
        Some(conditions.building_consumption(building, base))
    }

    pub fn current_building_consumptions(&self) -> BTreeMap<Building, f64> {
        self.building_consumptions
            .keys()
            .filter_map(|b| self.current_building_consumption(*b).map(|w| (*b, w)))
            .collect()
    }
}

/// Collects base tables and rounds, then freezes them into a [`Script`].
#[derive(Debug, Clone, Default)]
pub struct ScriptBuilder {
    rounds: Vec<Round>,
    building_consumptions: BTreeMap<Building, BaseConsumption>,
    source_ranges: BTreeMap<Source, ProductionRange>,
    allowed_sources: BTreeSet<Source>,
}

impl ScriptBuilder {
    pub fn building_consumption(mut self, building: Building, day: f64, night: f64) -> Self {
        self.building_consumptions
            .insert(building, BaseConsumption { day, night });
        self
    }

    pub fn source_range(mut self, source: Source, min: f64, max: f64) -> Self {
        self.source_ranges
            .insert(source, ProductionRange::new(min, max));
        self
    }

    pub fn allow_production(mut self, source: Source) -> Self {
        self.allowed_sources.insert(source);
        self
    }

    pub fn allow_all_production(self) -> Self {
        Source::ALL
            .into_iter()
            .fold(self, |builder, s| builder.allow_production(s))
    }

    pub fn add_round(mut self, round: Round) -> Self {
        self.rounds.push(round);
        self
    }

    pub fn build(self) -> Script {
        Script {
            rounds: self.rounds,
            cursor: Cursor::NotStarted,
            building_consumptions: self.building_consumptions,
            source_ranges: self.source_ranges,
            allowed_sources: self.allowed_sources,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_script() -> Script {
        Script::builder()
            .building_consumption(Building::Stadium, 250.0, 100.0)
            .source_range(Source::Photovoltaic, 0.0, 100.0)
            .source_range(Source::Coal, 250.0, 500.0)
            .allow_production(Source::Photovoltaic)
            .allow_production(Source::Coal)
            .add_round(Round::slide(1))
            .add_round(Round::day().sunny().build())
            .add_round(
                Round::night()
                    .consumption_factor(1.5)
                    .building_modifier(Building::Stadium, 50.0)
                    .build(),
            )
            .build()
    }

    #[test]
    fn test_step_walks_every_round_then_finishes() {
        let mut script = small_script();
        assert_eq!(script.current_round(), None);
        assert!(script.step());
        assert_eq!(script.current_round_type(), Some(RoundType::Slide));
        assert!(script.step());
        assert!(script.step());
        assert_eq!(script.current_round_index(), Some(2));
        assert!(!script.step());
        assert!(script.is_finished());
        assert!(!script.step());
        assert_eq!(script.current_round(), None);
    }

    #[test]
    fn test_empty_script_finishes_on_first_step() {
        let mut script = Script::builder().build();
        assert!(!script.step());
        assert!(script.is_finished());
    }

    #[test]
    fn test_slide_round_has_no_coefficients() {
        let mut script = small_script();
        script.step();
        assert!(script.current_production_coefficients().is_empty());
        assert_eq!(script.current_building_consumption(Building::Stadium), None);
    }

    #[test]
    fn test_day_round_coefficients_and_ranges() {
        let mut script = small_script();
        script.step();
        script.step();

        let coefficients = script.current_production_coefficients();
        assert_eq!(coefficients[&Source::Photovoltaic], 1.0);
        assert_eq!(coefficients[&Source::Coal], 1.0);
        assert!(!coefficients.contains_key(&Source::Wind));

        let range = script.current_production_range(Source::Coal).unwrap();
        assert_eq!(range, ProductionRange::new(250.0, 500.0));
    }

    #[test]
    fn test_night_consumption_uses_night_base() {
        let mut script = small_script();
        script.step();
        script.step();
        script.step();
        // 100 * 1.5 + 50
        assert_eq!(script.current_building_consumption(Building::Stadium), Some(200.0));
        assert_eq!(script.current_production_range(Source::Photovoltaic), Some(ProductionRange::new(0.0, 0.0)));
    }

    #[test]
    fn test_gameplay_round_count_skips_slides() {
        assert_eq!(small_script().gameplay_round_count(), 2);
    }
}
