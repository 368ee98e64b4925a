//! Core library for the `cityweather` CLI.
//!
//! This crate defines:
//! - The static city catalog and coordinate lookup
//! - Wind direction classification and forecast shaping
//! - Configuration handling
//! - Abstraction over weather providers, with an Open-Meteo implementation
//! - Dashboard sections built from the above
//!
//! It is used by `cityweather-cli`, but can also be reused by other binaries or services.

pub mod advice;
pub mod catalog;
pub mod compass;
pub mod config;
pub mod dashboard;
pub mod forecast;
pub mod map;
pub mod model;
pub mod provider;
pub mod timezone;

pub use catalog::{CatalogError, CityCatalog, CityRecord};
pub use compass::{CompassError, CompassPoint};
pub use config::Config;
pub use forecast::{ForecastTable, ShapeError};
pub use map::{MapStyle, MapView};
pub use model::{Coordinates, CurrentConditions, HourlySeries};
pub use provider::{WeatherProvider, provider_from_config};
pub use timezone::CityTime;
