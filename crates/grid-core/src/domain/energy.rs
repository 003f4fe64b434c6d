//! Energy vocabulary shared by scripts, boards and the wire: power sources,
//! buildings and weather.
//!
//! The numeric ids are part of the board protocol (they appear as
//! `source_id` / `building_type` bytes) and must never be renumbered.

use serde::{Deserialize, Serialize};

/// A kind of power plant a team can place on its board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Source {
    Coal = 1,
    Hydro = 2,
    HydroStorage = 3,
    Gas = 4,
    Nuclear = 5,
    Wind = 6,
    Photovoltaic = 7,
    Battery = 8,
}

impl Source {
    pub const ALL: [Source; 8] = [
        Source::Coal,
        Source::Hydro,
        Source::HydroStorage,
        Source::Gas,
        Source::Nuclear,
        Source::Wind,
        Source::Photovoltaic,
        Source::Battery,
    ];

    /// Wire id of this source.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Output multiplier before any weather is applied.
    ///
    /// Photovoltaic panels produce nothing at night and only half output on
    /// an unspecified day; wind is at half strength until weather says
    /// otherwise; dispatchable plants run at full range.
    pub fn baseline_coefficient(self, is_day: bool) -> f64 {
        match self {
            Source::Photovoltaic if is_day => 0.5,
            Source::Photovoltaic => 0.0,
            Source::Wind => 0.5,
            _ => 1.0,
        }
    }
}

impl TryFrom<u8> for Source {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Source::ALL.into_iter().find(|s| s.id() == value).ok_or(())
    }
}

/// A consumer card a team can place on its board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Building {
    CityCenterA = 1,
    CityCenterB = 2,
    CityCenterC = 3,
    CityCenterD = 4,
    CityCenterE = 5,
    CityCenterF = 6,
    Factory = 7,
    Stadium = 8,
    Hospital = 9,
    University = 10,
    Airport = 11,
    ShoppingMall = 12,
    TechnologyCenter = 13,
    Farm = 14,
    LivingQuarterSmall = 15,
    LivingQuarterLarge = 16,
    School = 17,
}

/// The six city-centre districts, commonly modified together.
pub const CITY_CENTERS: [Building; 6] = [
    Building::CityCenterA,
    Building::CityCenterB,
    Building::CityCenterC,
    Building::CityCenterD,
    Building::CityCenterE,
    Building::CityCenterF,
];

impl Building {
    pub const ALL: [Building; 17] = [
        Building::CityCenterA,
        Building::CityCenterB,
        Building::CityCenterC,
        Building::CityCenterD,
        Building::CityCenterE,
        Building::CityCenterF,
        Building::Factory,
        Building::Stadium,
        Building::Hospital,
        Building::University,
        Building::Airport,
        Building::ShoppingMall,
        Building::TechnologyCenter,
        Building::Farm,
        Building::LivingQuarterSmall,
        Building::LivingQuarterLarge,
        Building::School,
    ];

    /// Wire id of this building type.
    pub fn id(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Building {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Building::ALL.into_iter().find(|b| b.id() == value).ok_or(())
    }
}

/// Weather condition attached to a day or night round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weather {
    Sunny,
    Cloudy,
    Snowy,
    Windy,
    Breezy,
    Calm,
}

impl Weather {
    /// Coefficients this condition sets for the sources it affects.
    ///
    /// Conditions are applied in round order and a later one replaces the
    /// coefficient an earlier one set for the same source.
    pub fn effects(self) -> &'static [(Source, f64)] {
        match self {
            Weather::Sunny => &[(Source::Photovoltaic, 1.0)],
            Weather::Cloudy => &[(Source::Photovoltaic, 0.3)],
            Weather::Snowy => &[(Source::Photovoltaic, 0.1), (Source::Wind, 0.3)],
            Weather::Windy => &[(Source::Wind, 1.0)],
            Weather::Breezy => &[(Source::Wind, 0.6)],
            Weather::Calm => &[(Source::Wind, 0.1)],
        }
    }
}

/// Output range of a source in watts.  Storage may have a negative minimum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductionRange {
    pub min: f64,
    pub max: f64,
}

impl ProductionRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Scales both bounds by a non-negative coefficient.
    pub fn scaled(self, coefficient: f64) -> Self {
        Self {
            min: self.min * coefficient,
            max: self.max * coefficient,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_ids_round_trip() {
        for source in Source::ALL {
            assert_eq!(Source::try_from(source.id()), Ok(source));
        }
        assert_eq!(Source::try_from(0), Err(()));
        assert_eq!(Source::try_from(9), Err(()));
    }

    #[test]
    fn test_building_ids_round_trip() {
        for building in Building::ALL {
            assert_eq!(Building::try_from(building.id()), Ok(building));
        }
        assert_eq!(Building::try_from(18), Err(()));
    }

    #[test]
    fn test_photovoltaic_baseline_is_zero_at_night() {
        assert_eq!(Source::Photovoltaic.baseline_coefficient(false), 0.0);
        assert_eq!(Source::Coal.baseline_coefficient(false), 1.0);
    }

    #[test]
    fn test_scaled_range_keeps_negative_minimum() {
        let range = ProductionRange::new(-200.0, 200.0).scaled(0.5);
        assert_eq!(range, ProductionRange::new(-100.0, 100.0));
    }
}
