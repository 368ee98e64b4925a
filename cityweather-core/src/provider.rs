use crate::{
    Config,
    model::{Coordinates, CurrentConditions, DailySun, HourlySeries},
    provider::openmeteo::OpenMeteoProvider,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Debug;

pub mod openmeteo;

/// Source of weather data for a coordinate.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, at: Coordinates) -> anyhow::Result<CurrentConditions>;

    /// Hourly temperature and precipitation for the coming week, in UTC.
    async fn hourly_forecast(&self, at: Coordinates) -> anyhow::Result<HourlySeries>;

    /// Hourly temperature and precipitation for the UTC days `start..=end`, in UTC.
    async fn historical(
        &self,
        at: Coordinates,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<HourlySeries>;

    /// Sunrise and sunset of the first forecast day, in UTC.
    async fn sun_times(&self, at: Coordinates) -> anyhow::Result<DailySun>;

    /// IANA timezone name of the location, if the provider knows it.
    async fn timezone(&self, at: Coordinates) -> anyhow::Result<Option<String>>;
}

/// Construct the provider described by the config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let provider = OpenMeteoProvider::with_base_url(config.api_base_url())?;
    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_default_config() {
        let cfg = Config::default();
        assert!(provider_from_config(&cfg).is_ok());
    }

    #[test]
    fn provider_from_config_rejects_bad_base_url() {
        let cfg = Config {
            api_base_url: Some("not a url".into()),
            ..Config::default()
        };
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("Invalid Open-Meteo base URL"));
    }
}
