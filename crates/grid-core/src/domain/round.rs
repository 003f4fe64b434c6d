//! Rounds: the discrete phases a game script is made of.
//!
//! Only day and night rounds are played and scored.  Slide, slide-range and
//! lecture rounds pause the boards while the lecturer presents material.
//!
//! Rounds are built with a small fluent builder:
//!
//! ```rust
//! use grid_core::domain::energy::{Building, Source};
//! use grid_core::domain::round::{Round, RoundType};
//!
//! let round = Round::day()
//!     .comment("Stadium event")
//!     .sunny()
//!     .windy()
//!     .outage(Source::Gas)
//!     .building_modifier(Building::Stadium, 200.0)
//!     .build();
//! assert_eq!(round.round_type(), RoundType::Day);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::energy::{Building, Source, Weather};

/// Type tag of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundType {
    Day,
    Night,
    Slide,
    SlideRange,
    Lecture,
}

impl RoundType {
    /// Day and night rounds are gameplay; everything else is presentation.
    pub fn is_gameplay(self) -> bool {
        matches!(self, RoundType::Day | RoundType::Night)
    }

    pub fn name(self) -> &'static str {
        match self {
            RoundType::Day => "DAY",
            RoundType::Night => "NIGHT",
            RoundType::Slide => "SLIDE",
            RoundType::SlideRange => "SLIDE_RANGE",
            RoundType::Lecture => "LECTURE",
        }
    }
}

/// Weather and modifiers of a gameplay round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    /// Applied in order; later entries win for the sources they affect.
    pub weather: Vec<Weather>,
    /// Plants that produce nothing this round.
    pub outages: BTreeSet<Source>,
    /// Additive consumption per building in watts, applied after
    /// `consumption_factor`.
    pub building_modifiers: BTreeMap<Building, f64>,
    /// Multiplier applied to every building's base consumption.
    pub consumption_factor: f64,
}

impl Default for Conditions {
    fn default() -> Self {
        Self {
            weather: Vec::new(),
            outages: BTreeSet::new(),
            building_modifiers: BTreeMap::new(),
            consumption_factor: 1.0,
        }
    }
}

impl Conditions {
    /// Coefficient of `source` under these conditions.
    ///
    /// Starts from the round-type baseline, lets each weather condition
    /// overwrite the sources it affects (last wins), then forces outages to
    /// zero.  Photovoltaic output stays zero at night whatever the weather.
    pub fn production_coefficient(&self, source: Source, is_day: bool) -> f64 {
        if self.outages.contains(&source) {
            return 0.0;
        }
        if source == Source::Photovoltaic && !is_day {
            return 0.0;
        }
        self.weather
            .iter()
            .flat_map(|w| w.effects().iter())
            .filter(|(affected, _)| *affected == source)
            .map(|(_, coefficient)| *coefficient)
            .last()
            .unwrap_or_else(|| source.baseline_coefficient(is_day))
    }

    /// Effective consumption of a building with base consumption `base`:
    /// multiply by the round factor, then add the round modifier.
    pub fn building_consumption(&self, building: Building, base: f64) -> f64 {
        let modifier = self.building_modifiers.get(&building).copied().unwrap_or(0.0);
        base * self.consumption_factor + modifier
    }
}

/// Round-specific payload, one variant per round type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoundKind {
    Day(Conditions),
    Night(Conditions),
    Slide { slide: u32 },
    SlideRange { first: u32, last: u32 },
    Lecture { title: String },
}

/// One entry of a script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub comment: String,
    pub kind: RoundKind,
}

impl Round {
    pub fn day() -> RoundBuilder {
        RoundBuilder::new(true)
    }

    pub fn night() -> RoundBuilder {
        RoundBuilder::new(false)
    }

    pub fn slide(slide: u32) -> Round {
        Round {
            comment: String::new(),
            kind: RoundKind::Slide { slide },
        }
    }

    pub fn slide_range(first: u32, last: u32) -> Round {
        Round {
            comment: String::new(),
            kind: RoundKind::SlideRange { first, last },
        }
    }

    pub fn lecture(title: impl Into<String>) -> Round {
        Round {
            comment: String::new(),
            kind: RoundKind::Lecture {
                title: title.into(),
            },
        }
    }

    pub fn round_type(&self) -> RoundType {
        match self.kind {
            RoundKind::Day(_) => RoundType::Day,
            RoundKind::Night(_) => RoundType::Night,
            RoundKind::Slide { .. } => RoundType::Slide,
            RoundKind::SlideRange { .. } => RoundType::SlideRange,
            RoundKind::Lecture { .. } => RoundType::Lecture,
        }
    }

    /// Conditions of a gameplay round; `None` for presentation rounds.
    pub fn conditions(&self) -> Option<&Conditions> {
        match &self.kind {
            RoundKind::Day(c) | RoundKind::Night(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_day(&self) -> bool {
        matches!(self.kind, RoundKind::Day(_))
    }
}

/// Fluent builder for day and night rounds.
#[derive(Debug, Clone)]
pub struct RoundBuilder {
    is_day: bool,
    comment: String,
    conditions: Conditions,
}

impl RoundBuilder {
    fn new(is_day: bool) -> Self {
        Self {
            is_day,
            comment: String::new(),
            conditions: Conditions::default(),
        }
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn weather(mut self, weather: Weather) -> Self {
        self.conditions.weather.push(weather);
        self
    }

    pub fn sunny(self) -> Self {
        self.weather(Weather::Sunny)
    }

    pub fn cloudy(self) -> Self {
        self.weather(Weather::Cloudy)
    }

    pub fn snowy(self) -> Self {
        self.weather(Weather::Snowy)
    }

    pub fn windy(self) -> Self {
        self.weather(Weather::Windy)
    }

    pub fn breezy(self) -> Self {
        self.weather(Weather::Breezy)
    }

    pub fn calm(self) -> Self {
        self.weather(Weather::Calm)
    }

    pub fn outage(mut self, source: Source) -> Self {
        self.conditions.outages.insert(source);
        self
    }

    /// Adds `watts` to the consumption of `building`; repeated calls add up.
    pub fn building_modifier(mut self, building: Building, watts: f64) -> Self {
        *self
            .conditions
            .building_modifiers
            .entry(building)
            .or_insert(0.0) += watts;
        self
    }

    pub fn building_modifiers(self, buildings: &[Building], watts: f64) -> Self {
        buildings
            .iter()
            .fold(self, |builder, b| builder.building_modifier(*b, watts))
    }

    pub fn consumption_factor(mut self, factor: f64) -> Self {
        self.conditions.consumption_factor = factor;
        self
    }

    pub fn build(self) -> Round {
        let kind = if self.is_day {
            RoundKind::Day(self.conditions)
        } else {
            RoundKind::Night(self.conditions)
        };
        Round {
            comment: self.comment,
            kind,
        }
    }
}
