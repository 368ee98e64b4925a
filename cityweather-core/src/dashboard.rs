//! Dashboard sections for a selected city.
//!
//! Each section is an independent function over a [`WeatherProvider`]; a failing
//! section yields its error without affecting the others.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::{
    advice::Advice,
    catalog::CityRecord,
    compass::CompassPoint,
    forecast::{ForecastTable, HISTORY_LABELS, WEEK_AHEAD_LABELS, parse_api_time, shape_hourly},
    map::{MapStyle, MapView},
    model::{CityComparison, Coordinates, CurrentConditions, SunTimes},
    provider::WeatherProvider,
    timezone::{CityTime, offset_at},
};

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentReport {
    pub conditions: CurrentConditions,
    pub direction: CompassPoint,
    pub advice: Advice,
}

#[derive(Debug, Clone)]
pub struct SunReport {
    pub local_time: DateTime<Tz>,
    pub sun: SunTimes,
}

/// What to include besides the always-present sections.
#[derive(Debug, Clone, Default)]
pub struct DashboardOptions {
    pub history_date: Option<NaiveDate>,
    pub compare: Vec<CityRecord>,
    pub map_style: MapStyle,
}

#[derive(Debug)]
pub struct Dashboard {
    pub city: CityRecord,
    pub time: CityTime,
    pub current: Result<CurrentReport>,
    pub week_ahead: Result<ForecastTable>,
    pub history: Option<Result<ForecastTable>>,
    pub comparison: Vec<CityComparison>,
    pub sun: Result<SunReport>,
    pub map: MapView,
}

pub async fn current_report(
    provider: &dyn WeatherProvider,
    at: Coordinates,
) -> Result<CurrentReport> {
    let conditions = provider
        .current(at)
        .await
        .context("Error fetching current weather data")?;

    let direction = conditions
        .wind_direction()
        .context("Current weather reported an invalid wind direction")?;
    let advice = Advice::for_conditions(&conditions);

    Ok(CurrentReport {
        conditions,
        direction,
        advice,
    })
}

/// Timezone of the location; any failure falls back to UTC.
pub async fn city_time(provider: &dyn WeatherProvider, at: Coordinates, now: DateTime<Utc>) -> CityTime {
    match provider.timezone(at).await {
        Ok(name) => CityTime::resolve(name.as_deref(), now),
        Err(err) => {
            warn!("timezone lookup failed, using UTC: {err:#}");
            CityTime::utc()
        }
    }
}

pub async fn week_ahead(
    provider: &dyn WeatherProvider,
    at: Coordinates,
    time: &CityTime,
    now: DateTime<Utc>,
) -> Result<ForecastTable> {
    let series = provider
        .hourly_forecast(at)
        .await
        .context("Error fetching hourly forecast data")?;

    let table = shape_hourly(&series, time.offset, WEEK_AHEAD_LABELS, now)
        .context("Hourly forecast data was malformed")?;
    debug!(rows = table.len(), "shaped week-ahead forecast");

    Ok(table)
}

/// Hourly weather for one calendar day at the city.
///
/// The archive is keyed by UTC day, so every UTC day overlapping the local day
/// is fetched and the shifted rows are cut back to `date`.
pub async fn historical_day(
    provider: &dyn WeatherProvider,
    at: Coordinates,
    date: NaiveDate,
    time: &CityTime,
    now: DateTime<Utc>,
) -> Result<ForecastTable> {
    // The offset in force on that day, not today.
    let offset = offset_at(time.timezone, date.and_time(NaiveTime::MIN).and_utc());
    let (start, end) = utc_days_covering(date, offset);

    let series = provider
        .historical(at, start, end)
        .await
        .context("Error fetching historical weather data")?;

    let mut table = shape_hourly(&series, offset, HISTORY_LABELS, now)
        .context("Historical weather data was malformed")?;
    table.rows.retain(|row| row.timestamp.date() == date);
    debug!(%start, %end, rows = table.len(), "shaped historical day");

    Ok(table)
}

/// First and last UTC date overlapping the local day `date` at `offset`.
pub fn utc_days_covering(date: NaiveDate, offset: Duration) -> (NaiveDate, NaiveDate) {
    let local_start = date.and_time(NaiveTime::MIN);
    let local_end = local_start + Duration::days(1) - Duration::seconds(1);

    ((local_start - offset).date(), (local_end - offset).date())
}

pub async fn sun_report(
    provider: &dyn WeatherProvider,
    at: Coordinates,
    time: &CityTime,
) -> Result<SunReport> {
    let daily = provider
        .sun_times(at)
        .await
        .context("Error fetching sun times")?;

    let sun = SunTimes {
        sunrise: parse_api_time(&daily.sunrise)? + time.offset,
        sunset: parse_api_time(&daily.sunset)? + time.offset,
    };

    Ok(SunReport {
        local_time: time.local_now(),
        sun,
    })
}

/// Current conditions for each city; one city's failure is kept in its row.
pub async fn compare_cities(
    provider: &dyn WeatherProvider,
    cities: &[CityRecord],
) -> Vec<CityComparison> {
    let mut rows = Vec::with_capacity(cities.len());

    for city in cities {
        let outcome = provider
            .current(city.coordinates())
            .await
            .map_err(|err| format!("{err:#}"));

        if let Err(err) = &outcome {
            warn!(city = %city.city, "comparison fetch failed: {err}");
        }

        rows.push(CityComparison {
            city: city.city.clone(),
            outcome,
        });
    }

    rows
}

pub fn map_view(city: &CityRecord, style: MapStyle) -> MapView {
    MapView::new(style, city.coordinates(), city.display_name())
}

/// Assemble every section for `city`.
pub async fn build(
    provider: &dyn WeatherProvider,
    city: &CityRecord,
    options: &DashboardOptions,
) -> Dashboard {
    let at = city.coordinates();
    let now = Utc::now();
    let time = city_time(provider, at, now).await;

    let current = current_report(provider, at).await;
    let week_ahead = week_ahead(provider, at, &time, now).await;
    let history = match options.history_date {
        Some(date) => Some(historical_day(provider, at, date, &time, now).await),
        None => None,
    };
    let comparison = compare_cities(provider, &options.compare).await;
    let sun = sun_report(provider, at, &time).await;

    Dashboard {
        city: city.clone(),
        time,
        current,
        week_ahead,
        history,
        comparison,
        sun,
        map: map_view(city, options.map_style),
    }
}
