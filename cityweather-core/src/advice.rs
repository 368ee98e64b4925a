use std::fmt;

use crate::model::CurrentConditions;

/// Below this temperature (°C) a jacket is recommended.
const CHILLY_BELOW_C: f64 = 10.0;
/// Above this temperature (°C), with calm wind, it's walking weather.
const WARM_ABOVE_C: f64 = 25.0;
/// Wind speed under which the air counts as calm.
const CALM_BELOW: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advice {
    Chilly,
    WarmAndCalm,
    Moderate,
}

impl Advice {
    pub fn for_conditions(conditions: &CurrentConditions) -> Self {
        if conditions.temperature_c < CHILLY_BELOW_C {
            Advice::Chilly
        } else if conditions.temperature_c > WARM_ABOVE_C && conditions.wind_speed < CALM_BELOW {
            Advice::WarmAndCalm
        } else {
            Advice::Moderate
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Advice::Chilly => "It's chilly! Wear a warm jacket.",
            Advice::WarmAndCalm => "It's warm and calm. Perfect day for a walk!",
            Advice::Moderate => "Weather is moderate, dress comfortably.",
        }
    }
}

impl fmt::Display for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
