use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Url};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    forecast::parse_api_time,
    model::{Coordinates, CurrentConditions, DailySun, HourlySeries},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

const HOURLY_FIELDS: &str = "temperature_2m,precipitation";

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: Url,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid Open-Meteo base URL '{base_url}'"))?;

        Ok(Self {
            base_url,
            http: Client::new(),
        })
    }

    async fn fetch(&self, what: &str, at: Coordinates, extra: &[(&str, String)]) -> Result<String> {
        let mut query = vec![
            ("latitude", at.latitude.to_string()),
            ("longitude", at.longitude.to_string()),
        ];
        query.extend(extra.iter().map(|(k, v)| (*k, v.clone())));

        debug!(what, latitude = at.latitude, longitude = at.longitude, "requesting Open-Meteo");

        let res = self
            .http
            .get(self.base_url.clone())
            .query(&query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to Open-Meteo ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read Open-Meteo {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo {} request failed with status {}: {}",
                what,
                status,
                truncate_body(&body),
            ));
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrentWeather {
    temperature: f64,
    windspeed: f64,
    winddirection: f64,
    time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmCurrentResponse {
    current_weather: OmCurrentWeather,
}

#[derive(Debug, Deserialize)]
struct OmHourlyResponse {
    hourly: HourlySeries,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    sunrise: Vec<String>,
    sunset: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct OmDailyResponse {
    daily: OmDaily,
}

#[derive(Debug, Deserialize)]
struct OmTimezoneResponse {
    timezone: Option<String>,
}

fn parse_json<T: DeserializeOwned>(what: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).with_context(|| format!("Failed to parse Open-Meteo {what} JSON"))
}

fn parse_current(body: &str) -> Result<CurrentConditions> {
    let parsed: OmCurrentResponse = parse_json("current weather", body)?;
    let current = parsed.current_weather;

    Ok(CurrentConditions {
        temperature_c: current.temperature,
        wind_speed: current.windspeed,
        wind_direction_deg: current.winddirection,
        observed_at: current.time.as_deref().and_then(|t| parse_api_time(t).ok()),
    })
}

fn parse_hourly(what: &str, body: &str) -> Result<HourlySeries> {
    let parsed: OmHourlyResponse = parse_json(what, body)?;
    Ok(parsed.hourly)
}

fn parse_sun(body: &str) -> Result<DailySun> {
    let parsed: OmDailyResponse = parse_json("sun times", body)?;
    let mut days = parsed.daily.sunrise.into_iter().zip(parsed.daily.sunset);

    let (sunrise, sunset) = days
        .next()
        .ok_or_else(|| anyhow!("Open-Meteo sun times response contained no days"))?;

    Ok(DailySun { sunrise, sunset })
}

fn parse_timezone(body: &str) -> Result<Option<String>> {
    let parsed: OmTimezoneResponse = parse_json("timezone", body)?;
    Ok(parsed.timezone.filter(|tz| !tz.is_empty()))
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn current(&self, at: Coordinates) -> Result<CurrentConditions> {
        let body = self
            .fetch(
                "current weather",
                at,
                &[
                    ("current_weather", "true".into()),
                    ("windspeed_unit", "ms".into()),
                ],
            )
            .await?;

        parse_current(&body)
    }

    async fn hourly_forecast(&self, at: Coordinates) -> Result<HourlySeries> {
        let body = self
            .fetch("hourly forecast", at, &[("hourly", HOURLY_FIELDS.into())])
            .await?;

        parse_hourly("hourly forecast", &body)
    }

    async fn historical(
        &self,
        at: Coordinates,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HourlySeries> {
        let body = self
            .fetch(
                "historical weather",
                at,
                &[
                    ("start_date", start.format("%Y-%m-%d").to_string()),
                    ("end_date", end.format("%Y-%m-%d").to_string()),
                    ("hourly", HOURLY_FIELDS.into()),
                ],
            )
            .await?;

        parse_hourly("historical weather", &body)
    }

    async fn sun_times(&self, at: Coordinates) -> Result<DailySun> {
        let body = self
            .fetch("sun times", at, &[("daily", "sunrise,sunset".into())])
            .await?;

        parse_sun(&body)
    }

    async fn timezone(&self, at: Coordinates) -> Result<Option<String>> {
        let body = self
            .fetch(
                "timezone",
                at,
                &[("timezone", "auto".into()), ("forecast_days", "1".into())],
            )
            .await?;

        parse_timezone(&body)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
