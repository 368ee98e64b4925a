use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::compass::{CompassError, CompassPoint};

/// Timestamp layout used by Open-Meteo for hourly and daily values.
pub const API_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub wind_speed: f64,
    pub wind_direction_deg: f64,
    pub observed_at: Option<NaiveDateTime>,
}

impl CurrentConditions {
    pub fn wind_direction(&self) -> Result<CompassPoint, CompassError> {
        CompassPoint::from_bearing(self.wind_direction_deg)
    }
}

/// Hourly series exactly as returned by the API; times are naive UTC strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    pub time: Vec<String>,
    pub temperature_2m: Vec<Option<f64>>,
    pub precipitation: Vec<Option<f64>>,
}

impl HourlySeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Raw first-day sunrise and sunset strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySun {
    pub sunrise: String,
    pub sunset: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunTimes {
    pub sunrise: NaiveDateTime,
    pub sunset: NaiveDateTime,
}

/// One row of a multi-city comparison; failed fetches keep their message.
#[derive(Debug, Clone, PartialEq)]
pub struct CityComparison {
    pub city: String,
    pub outcome: Result<CurrentConditions, String>,
}
