//! Human-friendly output formatting. Every function returns the text so the
//! layout can be checked without a terminal.

use std::fmt::Write;

use cityweather_core::{
    CityTime, ForecastTable, MapView,
    dashboard::{CurrentReport, SunReport},
    forecast::AxisRange,
    model::CityComparison,
};

const BAR_WIDTH: usize = 24;
const TIME_FORMAT: &str = "%a %d %b %H:%M";

pub fn heading(title: &str) -> String {
    format!("\n{title}\n{}\n", "=".repeat(title.chars().count()))
}

pub fn section_error(err: &anyhow::Error) -> String {
    format!("Error: {err:#}")
}

pub fn current(report: &CurrentReport) -> String {
    let c = &report.conditions;
    let mut out = String::new();

    let _ = writeln!(out, "The current temperature is {} °C.", c.temperature_c);
    let _ = writeln!(out, "The wind speed is {} m/s.", c.wind_speed);
    let _ = writeln!(out, "The wind is coming from {}.", report.direction);
    if let Some(observed) = c.observed_at {
        let _ = writeln!(out, "(observed {} UTC)", observed.format("%H:%M"));
    }
    let _ = writeln!(out, "\nWhat to wear or do? {}", report.advice);

    out
}

/// Proportional bar for `value` within `range`.
fn bar(value: f64, range: AxisRange, glyph: char) -> String {
    if range.span() <= 0.0 {
        return String::new();
    }

    let fraction = ((value - range.min) / range.span()).clamp(0.0, 1.0);
    let len = (fraction * BAR_WIDTH as f64).round() as usize;
    std::iter::repeat_n(glyph, len).collect()
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}

pub fn forecast(table: &ForecastTable, time: &CityTime) -> String {
    let mut out = String::new();
    let labels = table.labels;

    let _ = writeln!(out, "Times in {} (UTC{})", time.name(), format_offset(time));
    if let (Some(t), Some(p)) = (table.temperature_range(), table.precipitation_range()) {
        let _ = writeln!(
            out,
            "Axis: {} {:.1}..{:.1}, {} {:.1}..{:.1}",
            labels.temperature, t.min, t.max, labels.precipitation, p.min, p.max
        );
    }

    let _ = writeln!(
        out,
        "{:<18} {:>15} {:>17}",
        labels.time, labels.temperature, labels.precipitation
    );

    let temp_range = table.temperature_range();
    let precip_range = table.precipitation_range();
    let now_index = table.now_index();

    for (i, row) in table.rows.iter().enumerate() {
        let temp_bar = match (row.temperature_c, temp_range) {
            (Some(v), Some(r)) => bar(v, r, '▇'),
            _ => String::new(),
        };
        let precip_bar = match (row.precipitation_mm, precip_range) {
            (Some(v), Some(r)) if v > 0.0 => bar(v, r, '░'),
            _ => String::new(),
        };
        let marker = if Some(i) == now_index {
            format!("  ◀ now {}", table.now_label())
        } else {
            String::new()
        };

        let _ = writeln!(
            out,
            "{:<18} {:>15} {:>17}  {temp_bar}{precip_bar}{marker}",
            row.timestamp.format(TIME_FORMAT).to_string(),
            cell(row.temperature_c),
            cell(row.precipitation_mm),
        );
    }

    out
}

pub fn comparison(rows: &[CityComparison]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20} {:>17} {:>17} {:>10}",
        "City", "Temperature (°C)", "Wind Speed (m/s)", "Direction"
    );

    for row in rows {
        match &row.outcome {
            Ok(c) => {
                let direction = c
                    .wind_direction()
                    .map(|d| d.to_string())
                    .unwrap_or_else(|_| "?".to_string());
                let _ = writeln!(
                    out,
                    "{:<20} {:>17.1} {:>17.1} {:>10}",
                    row.city, c.temperature_c, c.wind_speed, direction
                );
            }
            Err(err) => {
                let _ = writeln!(out, "{:<20} error: {err}", row.city);
            }
        }
    }

    let temps: Vec<(&str, f64)> = rows
        .iter()
        .filter_map(|r| r.outcome.as_ref().ok().map(|c| (r.city.as_str(), c.temperature_c)))
        .collect();
    let winds: Vec<(&str, f64)> = rows
        .iter()
        .filter_map(|r| r.outcome.as_ref().ok().map(|c| (r.city.as_str(), c.wind_speed)))
        .collect();

    out.push_str(&bar_chart("Temperature Comparison Between Cities", &temps));
    out.push_str(&bar_chart("Wind Speed Comparison Between Cities", &winds));

    out
}

fn bar_chart(title: &str, values: &[(&str, f64)]) -> String {
    let mut out = String::new();
    if values.is_empty() {
        return out;
    }

    let lo = values.iter().map(|(_, v)| *v).fold(0.0, f64::min);
    let hi = values.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    let range = AxisRange { min: lo, max: hi };

    let _ = writeln!(out, "\n{title}");
    for (city, value) in values {
        let _ = writeln!(out, "{city:<20} {} {value:.1}", bar(*value, range, '█'));
    }

    out
}

pub fn sun(report: &SunReport, time: &CityTime) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Local Time: {} ({})",
        report.local_time.format("%Y-%m-%d %H:%M:%S"),
        time.name()
    );
    let _ = writeln!(
        out,
        "Sunrise: {}, Sunset: {}",
        report.sun.sunrise.format("%H:%M"),
        report.sun.sunset.format("%H:%M")
    );
    out
}

pub fn map(view: &MapView) -> String {
    let mut out = String::new();
    let tile = view.tile();

    let _ = writeln!(out, "\nMap ({}): {}", view.style, view.label);
    let _ = writeln!(
        out,
        "Location: {:.4}, {:.4}",
        view.marker.latitude, view.marker.longitude
    );
    let _ = writeln!(out, "Tile z{}/{}/{}: {}", tile.zoom, tile.x, tile.y, view.tile_url());
    let _ = writeln!(out, "View: {}", view.viewer_url());
    let _ = writeln!(out, "{}", view.style.attribution());
    out
}

pub fn footer() -> String {
    "\n---\nData source: open-meteo.com (http://open-meteo.com)\n\
     City data source: simplemaps.com (https://simplemaps.com/data/world-cities)\n"
        .to_string()
}

fn format_offset(time: &CityTime) -> String {
    let minutes = time.offset.num_minutes();
    let sign = if minutes < 0 { '-' } else { '+' };
    format!("{sign}{:02}:{:02}", minutes.abs() / 60, minutes.abs() % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use chrono_tz::Tz;
    use cityweather_core::{
        CompassPoint, CurrentConditions, HourlySeries, advice::Advice,
        forecast::{WEEK_AHEAD_LABELS, shape_hourly},
    };

    fn conditions(temperature_c: f64) -> CurrentConditions {
        CurrentConditions {
            temperature_c,
            wind_speed: 3.5,
            wind_direction_deg: 200.0,
            observed_at: None,
        }
    }

    #[test]
    fn current_mentions_all_values() {
        let report = CurrentReport {
            conditions: conditions(17.3),
            direction: CompassPoint::SSW,
            advice: Advice::Moderate,
        };
        let text = current(&report);

        assert!(text.contains("The current temperature is 17.3 °C."));
        assert!(text.contains("The wind speed is 3.5 m/s."));
        assert!(text.contains("The wind is coming from S/SW."));
        assert!(text.contains("dress comfortably"));
    }

    #[test]
    fn forecast_marks_now_and_offset() {
        let series = HourlySeries {
            time: vec!["2024-05-01T00:00".into(), "2024-05-01T01:00".into()],
            temperature_2m: vec![Some(10.0), None],
            precipitation: vec![Some(0.0), Some(1.0)],
        };
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 1, 0, 0).unwrap();
        let time = CityTime::new(Tz::Asia__Kathmandu, now);
        let table = shape_hourly(&series, time.offset, WEEK_AHEAD_LABELS, now).unwrap();

        let text = forecast(&table, &time);
        assert!(text.contains("Asia/Kathmandu (UTC+05:45)"));
        assert!(text.contains("Week ahead"));
        assert!(text.contains("◀ now 01 May 24, 06:45"));
        assert!(text.lines().any(|l| l.starts_with("Wed 01 May 05:45")));
    }

    #[test]
    fn comparison_lists_errors_inline() {
        let rows = vec![
            CityComparison {
                city: "Nyeri".into(),
                outcome: Ok(conditions(18.0)),
            },
            CityComparison {
                city: "Garissa".into(),
                outcome: Err("HTTP 502".into()),
            },
        ];
        let text = comparison(&rows);

        assert!(text.contains("Garissa              error: HTTP 502"));
        assert!(text.contains("Temperature Comparison Between Cities"));
        assert!(text.contains("S/SW"));
    }

    #[test]
    fn bar_is_proportional_and_clamped() {
        let range = AxisRange { min: 0.0, max: 10.0 };
        assert_eq!(bar(5.0, range, '#').len(), BAR_WIDTH / 2);
        assert_eq!(bar(50.0, range, '#').len(), BAR_WIDTH);
        assert_eq!(bar(-5.0, range, '#'), "");
        assert_eq!(bar(1.0, AxisRange { min: 1.0, max: 1.0 }, '#'), "");
    }

    #[test]
    fn negative_offsets_are_formatted() {
        let time = CityTime::new(Tz::America__St_Johns, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(format_offset(&time), "-03:30");
    }

    #[test]
    fn section_error_shows_context_chain() {
        let err = anyhow::anyhow!("connection refused").context("Error fetching sun times");
        assert_eq!(section_error(&err), "Error: Error fetching sun times: connection refused");
    }
}
