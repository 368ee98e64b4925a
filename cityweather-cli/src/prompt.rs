//! Interactive selectors. Options always come from the catalog, so whatever the
//! user picks is guaranteed to resolve.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::NaiveDate;
use cityweather_core::{CityCatalog, MapStyle};
use inquire::{DateSelect, MultiSelect, Select, Text};

const PAGE_SIZE: usize = 15;

pub fn select_country(catalog: &CityCatalog, default: &str) -> Result<String> {
    let countries: Vec<String> = catalog.countries().map(str::to_owned).collect();
    let cursor = starting_cursor(&countries, default);

    let country = Select::new("Select a country", countries)
        .with_starting_cursor(cursor)
        .with_page_size(PAGE_SIZE)
        .prompt()?;

    Ok(country)
}

pub fn select_city(catalog: &CityCatalog, country: &str, default: &str) -> Result<String> {
    let cities = city_names(catalog, country)?;
    let cursor = starting_cursor(&cities, default);

    let city = Select::new("Select a city", cities)
        .with_starting_cursor(cursor)
        .with_page_size(PAGE_SIZE)
        .prompt()?;

    Ok(city)
}

pub fn select_cities(catalog: &CityCatalog, country: &str) -> Result<Vec<String>> {
    let cities = city_names(catalog, country)?;

    let picked = MultiSelect::new("Select cities", cities)
        .with_page_size(PAGE_SIZE)
        .prompt()?;

    Ok(picked)
}

pub fn select_date(default: NaiveDate) -> Result<NaiveDate> {
    Ok(DateSelect::new("Select a date").with_default(default).prompt()?)
}

pub fn select_map_style(default: MapStyle) -> Result<MapStyle> {
    let styles = MapStyle::all().to_vec();
    let cursor = styles.iter().position(|s| *s == default).unwrap_or(0);

    Ok(Select::new("Select map style", styles)
        .with_starting_cursor(cursor)
        .prompt()?)
}

/// Ask for a catalog CSV path; an empty answer means the bundled catalog.
pub fn catalog_path(current: Option<&Path>) -> Result<Option<PathBuf>> {
    let current = current.map(|p| p.display().to_string()).unwrap_or_default();

    let answer = Text::new("City catalog CSV (empty for the bundled catalog)")
        .with_initial_value(&current)
        .prompt()?;

    let answer = answer.trim();
    Ok((!answer.is_empty()).then(|| PathBuf::from(answer)))
}

fn city_names(catalog: &CityCatalog, country: &str) -> Result<Vec<String>> {
    Ok(catalog
        .cities(country)?
        .iter()
        .map(|c| c.city.clone())
        .collect())
}

fn starting_cursor(options: &[String], default: &str) -> usize {
    options.iter().position(|o| o == default).unwrap_or(0)
}
