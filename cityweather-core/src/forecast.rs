//! Reshaping of raw hourly series into display-ready tables.
//!
//! Open-Meteo reports hourly values in UTC. A table shifts every timestamp by the
//! city's UTC offset, renames columns for display and carries the padded axis
//! ranges the forecast chart is drawn with.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::{API_TIME_FORMAT, HourlySeries};

/// Padding below/above the temperature values on the chart axis.
pub const TEMPERATURE_PADDING: (f64, f64) = (10.0, 10.0);

/// Padding below/above the precipitation values on the chart axis.
pub const PRECIPITATION_PADDING: (f64, f64) = (2.0, 8.0);

/// Height of the "now" annotation above the warmest hour.
pub const NOW_ANNOTATION_LIFT: f64 = 5.0;

const NOW_LABEL_FORMAT: &str = "%d %b %y, %H:%M";

/// Display names of the three table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnLabels {
    pub time: &'static str,
    pub temperature: &'static str,
    pub precipitation: &'static str,
}

pub const WEEK_AHEAD_LABELS: ColumnLabels = ColumnLabels {
    time: "Week ahead",
    temperature: "Temperature °C",
    precipitation: "Precipitation mm",
};

pub const HISTORY_LABELS: ColumnLabels = ColumnLabels {
    time: "Time",
    temperature: "Temperature °C",
    precipitation: "Precipitation mm",
};

#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("hourly series has {times} timestamps but {field} has {values} values")]
    LengthMismatch {
        field: &'static str,
        times: usize,
        values: usize,
    },

    #[error("invalid timestamp '{value}'")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastRow {
    pub timestamp: NaiveDateTime,
    pub temperature_c: Option<f64>,
    pub precipitation_mm: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    fn padded(values: impl Iterator<Item = f64>, (below, above): (f64, f64)) -> Option<Self> {
        let (min, max) = values.fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;

        Some(Self {
            min: min - below,
            max: max + above,
        })
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastTable {
    pub labels: ColumnLabels,
    pub rows: Vec<ForecastRow>,
    /// Current time at the city, i.e. `now(UTC) + offset`.
    pub now: NaiveDateTime,
    pub offset: Duration,
}

impl ForecastTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn temperatures(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().filter_map(|r| r.temperature_c)
    }

    pub fn temperature_range(&self) -> Option<AxisRange> {
        AxisRange::padded(self.temperatures(), TEMPERATURE_PADDING)
    }

    pub fn precipitation_range(&self) -> Option<AxisRange> {
        AxisRange::padded(
            self.rows.iter().filter_map(|r| r.precipitation_mm),
            PRECIPITATION_PADDING,
        )
    }

    pub fn now_label(&self) -> String {
        self.now.format(NOW_LABEL_FORMAT).to_string()
    }

    /// Vertical position of the "now" annotation on the temperature axis.
    pub fn now_annotation_height(&self) -> Option<f64> {
        self.temperatures()
            .reduce(f64::max)
            .map(|max| max + NOW_ANNOTATION_LIFT)
    }

    /// Index of the row closest to the current local time, if the table covers it.
    pub fn now_index(&self) -> Option<usize> {
        let first = self.rows.first()?.timestamp;
        let last = self.rows.last()?.timestamp;
        if self.now < first || self.now > last {
            return None;
        }

        self.rows
            .iter()
            .enumerate()
            .min_by_key(|(_, r)| (r.timestamp - self.now).num_seconds().abs())
            .map(|(i, _)| i)
    }
}

/// Shift every timestamp by `offset` and attach display labels.
///
/// Row count and order are preserved; nothing is filtered.
pub fn shape_hourly(
    series: &HourlySeries,
    offset: Duration,
    labels: ColumnLabels,
    now_utc: DateTime<Utc>,
) -> Result<ForecastTable, ShapeError> {
    let times = series.time.len();
    for (field, values) in [
        ("temperature_2m", series.temperature_2m.len()),
        ("precipitation", series.precipitation.len()),
    ] {
        if values != times {
            return Err(ShapeError::LengthMismatch {
                field,
                times,
                values,
            });
        }
    }

    let rows = series
        .time
        .iter()
        .zip(&series.temperature_2m)
        .zip(&series.precipitation)
        .map(|((time, temperature), precipitation)| {
            Ok(ForecastRow {
                timestamp: parse_api_time(time)? + offset,
                temperature_c: *temperature,
                precipitation_mm: *precipitation,
            })
        })
        .collect::<Result<Vec<_>, ShapeError>>()?;

    Ok(ForecastTable {
        labels,
        rows,
        now: now_utc.naive_utc() + offset,
        offset,
    })
}

pub fn parse_api_time(value: &str) -> Result<NaiveDateTime, ShapeError> {
    NaiveDateTime::parse_from_str(value, API_TIME_FORMAT).map_err(|source| {
        ShapeError::InvalidTimestamp {
            value: value.to_string(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn series() -> HourlySeries {
        HourlySeries {
            time: vec![
                "2024-05-01T00:00".into(),
                "2024-05-01T01:00".into(),
                "2024-05-01T02:00".into(),
                "2024-05-01T03:00".into(),
            ],
            temperature_2m: vec![Some(14.2), Some(13.1), None, Some(18.5)],
            precipitation: vec![Some(0.0), Some(1.5), Some(0.2), None],
        }
    }

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 30, 0).unwrap()
    }

    #[test]
    fn preserves_row_count_and_order() {
        let input = series();
        let table = shape_hourly(&input, Duration::hours(3), WEEK_AHEAD_LABELS, now()).unwrap();

        assert_eq!(table.len(), input.len());
        assert!(table.rows.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(table.rows[2].temperature_c, None);
        assert_eq!(table.rows[1].precipitation_mm, Some(1.5));
    }

    #[test]
    fn every_timestamp_is_shifted_by_the_offset() {
        let input = series();
        let offset = Duration::minutes(5 * 60 + 45);
        let table = shape_hourly(&input, offset, WEEK_AHEAD_LABELS, now()).unwrap();

        for (raw, row) in input.time.iter().zip(&table.rows) {
            assert_eq!(row.timestamp, parse_api_time(raw).unwrap() + offset);
        }
        assert_eq!(table.rows[0].timestamp, at(5, 45));
    }

    #[test]
    fn negative_offset_crosses_midnight() {
        let table = shape_hourly(&series(), Duration::hours(-5), HISTORY_LABELS, now()).unwrap();
        assert_eq!(
            table.rows[0].timestamp,
            NaiveDate::from_ymd_opt(2024, 4, 30).unwrap().and_hms_opt(19, 0, 0).unwrap()
        );
        assert_eq!(table.labels.time, "Time");
    }

    #[test]
    fn now_marker_is_utc_plus_offset() {
        let table = shape_hourly(&series(), Duration::hours(3), WEEK_AHEAD_LABELS, now()).unwrap();
        assert_eq!(table.now, at(3, 30));
        assert_eq!(table.now_label(), "01 May 24, 03:30");
        // 03:30 is equidistant from the first two rows; the earlier one wins
        assert_eq!(table.now_index(), Some(0));
    }

    #[test]
    fn now_outside_the_table_has_no_index() {
        let next_day = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap();
        let table = shape_hourly(&series(), Duration::hours(2), WEEK_AHEAD_LABELS, next_day).unwrap();
        assert_eq!(table.now_index(), None);
    }

    #[test]
    fn axis_ranges_are_padded() {
        let table = shape_hourly(&series(), Duration::zero(), WEEK_AHEAD_LABELS, now()).unwrap();

        let temp = table.temperature_range().unwrap();
        assert!((temp.min - 3.1).abs() < 1e-9);
        assert!((temp.max - 28.5).abs() < 1e-9);

        let precip = table.precipitation_range().unwrap();
        assert!((precip.min + 2.0).abs() < 1e-9);
        assert!((precip.max - 9.5).abs() < 1e-9);

        assert_eq!(table.now_annotation_height(), Some(23.5));
    }

    #[test]
    fn empty_series_has_no_ranges() {
        let table = shape_hourly(
            &HourlySeries::default(),
            Duration::zero(),
            WEEK_AHEAD_LABELS,
            now(),
        )
        .unwrap();

        assert!(table.is_empty());
        assert_eq!(table.temperature_range(), None);
        assert_eq!(table.precipitation_range(), None);
        assert_eq!(table.now_index(), None);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let mut input = series();
        input.precipitation.pop();

        let err = shape_hourly(&input, Duration::zero(), WEEK_AHEAD_LABELS, now()).unwrap_err();
        assert!(matches!(
            err,
            ShapeError::LengthMismatch {
                field: "precipitation",
                times: 4,
                values: 3
            }
        ));
    }

    #[test]
    fn bad_timestamp_is_reported() {
        let mut input = series();
        input.time[1] = "yesterday".into();

        let err = shape_hourly(&input, Duration::zero(), WEEK_AHEAD_LABELS, now()).unwrap_err();
        assert!(err.to_string().contains("yesterday"));
    }
}
