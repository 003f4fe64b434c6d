//! Built-in scenarios.
//!
//! Both share the same base tables; they differ only in their rounds.

use crate::domain::energy::{Building, Source, CITY_CENTERS};
use crate::domain::round::Round;
use crate::domain::script::{Script, ScriptBuilder};

/// Default building consumptions `(day, night)` in watts.
const BUILDING_CONSUMPTIONS: [(Building, f64, f64); 17] = [
    (Building::CityCenterA, 575.0, 200.0),
    (Building::CityCenterB, 600.0, 200.0),
    (Building::CityCenterC, 620.0, 200.0),
    (Building::CityCenterD, 550.0, 200.0),
    (Building::CityCenterE, 625.0, 200.0),
    (Building::CityCenterF, 550.0, 200.0),
    (Building::Factory, 400.0, 400.0),
    (Building::Stadium, 250.0, 400.0),
    (Building::Hospital, 350.0, 250.0),
    (Building::University, 400.0, 200.0),
    (Building::Airport, 500.0, 400.0),
    (Building::ShoppingMall, 350.0, 200.0),
    (Building::TechnologyCenter, 300.0, 250.0),
    (Building::Farm, 80.0, 40.0),
    (Building::LivingQuarterSmall, 70.0, 40.0),
    (Building::LivingQuarterLarge, 100.0, 60.0),
    (Building::School, 80.0, 30.0),
];

/// Default production ranges `(min, max)` in watts.
const SOURCE_RANGES: [(Source, f64, f64); 8] = [
    (Source::Coal, 250.0, 500.0),
    (Source::Hydro, 0.0, 100.0),
    (Source::HydroStorage, -200.0, 200.0),
    (Source::Gas, 0.0, 500.0),
    (Source::Nuclear, 900.0, 1000.0),
    (Source::Wind, 0.0, 100.0),
    (Source::Photovoltaic, 0.0, 100.0),
    (Source::Battery, -200.0, 200.0),
];

fn base_builder() -> ScriptBuilder {
    let builder = BUILDING_CONSUMPTIONS
        .into_iter()
        .fold(Script::builder(), |b, (building, day, night)| {
            b.building_consumption(building, day, night)
        });
    SOURCE_RANGES
        .into_iter()
        .fold(builder, |b, (source, min, max)| b.source_range(source, min, max))
}

/// Seven day/night pairs with every source unlocked and no slides.
pub fn test_scenario() -> Script {
    base_builder()
        .allow_all_production()
        .add_round(Round::day().comment("Day 1: sunny").sunny().build())
        .add_round(Round::night().comment("Night 1: calm").calm().build())
        .add_round(Round::day().comment("Day 2: windy and sunny").sunny().windy().build())
        .add_round(Round::night().comment("Night 2: windy").windy().build())
        .add_round(Round::day().comment("Day 3: cloudy and calm").cloudy().calm().build())
        .add_round(Round::night().comment("Night 3: cloudy and calm").cloudy().calm().build())
        .add_round(Round::day().comment("Day 4: snowy").snowy().calm().build())
        .add_round(Round::night().comment("Night 4: snowy").snowy().calm().build())
        .add_round(
            Round::day()
                .comment("Day 5: gas plant outage")
                .sunny()
                .breezy()
                .outage(Source::Gas)
                .build(),
        )
        .add_round(
            Round::night()
                .comment("Night 5: gas plant outage")
                .breezy()
                .outage(Source::Gas)
                .build(),
        )
        .add_round(
            Round::day()
                .comment("Day 6: stadium event")
                .sunny()
                .windy()
                .building_modifier(Building::Stadium, 200.0)
                .building_modifiers(&CITY_CENTERS, 100.0)
                .build(),
        )
        .add_round(
            Round::night()
                .comment("Night 6: stadium event")
                .windy()
                .building_modifier(Building::Stadium, 150.0)
                .building_modifiers(&CITY_CENTERS, 50.0)
                .build(),
        )
        .add_round(Round::day().comment("Day 7: perfect renewables").sunny().windy().build())
        .add_round(Round::night().comment("Night 7: good wind").windy().build())
        .build()
}

/// A short lecture: sources are unlocked step by step between slides.
pub fn demo_scenario() -> Script {
    base_builder()
        .allow_production(Source::Coal)
        .allow_production(Source::Gas)
        .allow_production(Source::Photovoltaic)
        .allow_production(Source::Wind)
        .add_round(Round::lecture("How a power grid stays balanced"))
        .add_round(Round::slide_range(1, 4))
        .add_round(Round::day().comment("Warm-up day").sunny().breezy().build())
        .add_round(Round::night().comment("Warm-up night").calm().build())
        .add_round(Round::slide(5))
        .add_round(
            Round::day()
                .comment("Heat wave")
                .sunny()
                .calm()
                .consumption_factor(1.2)
                .build(),
        )
        .add_round(
            Round::night()
                .comment("Storm with gas outage")
                .windy()
                .outage(Source::Gas)
                .build(),
        )
        .add_round(Round::slide_range(6, 8))
        .build()
}
