use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use cityweather_core::{
    CityCatalog, CityRecord, CompassPoint, Config, MapStyle, WeatherProvider,
    dashboard::{self, DashboardOptions},
    provider_from_config,
};
use tracing::debug;

use crate::{prompt, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "Weather for 40,000+ cities, from open-meteo.com")]
pub struct Cli {
    /// City catalog CSV (simplemaps worldcities.csv layout); overrides the config file.
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// City selection; missing parts are asked for interactively.
#[derive(Debug, Clone, Args)]
pub struct CityArgs {
    /// Country name as listed by `cityweather countries`.
    #[arg(long)]
    pub country: Option<String>,

    /// City name as listed by `cityweather cities <country>`.
    #[arg(long)]
    pub city: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show every section for a city: current weather, week ahead, history, comparison, sun times and map.
    Dashboard {
        #[command(flatten)]
        city: CityArgs,

        /// Include historical weather for this date (YYYY-MM-DD).
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Compare with these cities of the same country (comma separated).
        #[arg(long, value_delimiter = ',')]
        compare: Vec<String>,

        /// Map style: OpenStreetMap, TopoMap or Satellite.
        #[arg(long)]
        style: Option<String>,
    },

    /// Current temperature, wind and what to wear.
    Current {
        #[command(flatten)]
        city: CityArgs,
    },

    /// Hourly temperature and precipitation for the week ahead, in local time.
    Forecast {
        #[command(flatten)]
        city: CityArgs,
    },

    /// Hourly weather for a single date.
    History {
        #[command(flatten)]
        city: CityArgs,

        /// Date to show (YYYY-MM-DD); asked for when absent.
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Compare current weather between cities of one country.
    Compare {
        /// Country the cities belong to.
        #[arg(long)]
        country: Option<String>,

        /// Cities to compare; picked interactively when empty.
        cities: Vec<String>,
    },

    /// Local time, sunrise and sunset.
    Sun {
        #[command(flatten)]
        city: CityArgs,
    },

    /// Map tile and viewer link for a city.
    Map {
        #[command(flatten)]
        city: CityArgs,

        /// Map style: OpenStreetMap, TopoMap or Satellite.
        #[arg(long)]
        style: Option<String>,
    },

    /// Classify a wind bearing in degrees into a compass direction.
    Wind {
        #[arg(allow_negative_numbers = true)]
        degrees: f64,

        /// Wrap the bearing into [0, 360) instead of rejecting it.
        #[arg(long)]
        wrap: bool,
    },

    /// List the countries of the catalog.
    Countries,

    /// List the cities of a country.
    Cities {
        country: String,
    },

    /// Interactively set the default city, map style and catalog.
    Configure,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Wind { degrees, wrap } => {
                let point = if wrap {
                    CompassPoint::from_bearing(degrees)?
                } else {
                    CompassPoint::try_from_degrees(degrees)?
                };
                println!("{point}");
            }
            Command::Countries => {
                let config = Config::load()?;
                let catalog = load_catalog(self.catalog.as_ref(), &config)?;
                for country in catalog.countries() {
                    println!("{country}");
                }
            }
            Command::Cities { country } => {
                let config = Config::load()?;
                let catalog = load_catalog(self.catalog.as_ref(), &config)?;
                for city in catalog.cities(&country)? {
                    println!("{}", city.city);
                }
            }
            Command::Configure => {
                let config = Config::load()?;
                let catalog = load_catalog(self.catalog.as_ref(), &config)?;
                configure(config, &catalog)?;
            }
            Command::Current { city } => {
                let config = Config::load()?;
                let catalog = load_catalog(self.catalog.as_ref(), &config)?;
                let city = resolve_city(&catalog, &config, &city)?;
                let provider = provider_from_config(&config)?;

                let report = dashboard::current_report(provider.as_ref(), city.coordinates()).await?;
                print!("{}", render::heading(&city.display_name()));
                print!("{}", render::current(&report));
            }
            Command::Forecast { city } => {
                let config = Config::load()?;
                let catalog = load_catalog(self.catalog.as_ref(), &config)?;
                let city = resolve_city(&catalog, &config, &city)?;
                let provider = provider_from_config(&config)?;

                let at = city.coordinates();
                let now = chrono::Utc::now();
                let time = dashboard::city_time(provider.as_ref(), at, now).await;
                let table = dashboard::week_ahead(provider.as_ref(), at, &time, now).await?;

                print!("{}", render::heading(&city.display_name()));
                print!("{}", render::forecast(&table, &time));
            }
            Command::History { city, date } => {
                let config = Config::load()?;
                let catalog = load_catalog(self.catalog.as_ref(), &config)?;
                let city = resolve_city(&catalog, &config, &city)?;
                let date = match date {
                    Some(date) => date,
                    None => prompt::select_date(Local::now().date_naive())?,
                };
                let provider = provider_from_config(&config)?;

                let at = city.coordinates();
                let now = chrono::Utc::now();
                let time = dashboard::city_time(provider.as_ref(), at, now).await;
                let table = dashboard::historical_day(provider.as_ref(), at, date, &time, now).await?;

                let heading = format!("{} on {date} (local time)", city.display_name());
                print!("{}", render::heading(&heading));
                print!("{}", render::forecast(&table, &time));
            }
            Command::Compare { country, cities } => {
                let config = Config::load()?;
                let catalog = load_catalog(self.catalog.as_ref(), &config)?;
                let country = match country {
                    Some(country) => country,
                    None => prompt::select_country(&catalog, config.default_country())?,
                };
                let cities = if cities.is_empty() {
                    prompt::select_cities(&catalog, &country)?
                } else {
                    cities
                };
                let records = lookup_all(&catalog, &country, &cities)?;
                let provider = provider_from_config(&config)?;

                let rows = dashboard::compare_cities(provider.as_ref(), &records).await;
                print!("{}", render::comparison(&rows));
            }
            Command::Sun { city } => {
                let config = Config::load()?;
                let catalog = load_catalog(self.catalog.as_ref(), &config)?;
                let city = resolve_city(&catalog, &config, &city)?;
                let provider = provider_from_config(&config)?;

                let at = city.coordinates();
                let time = dashboard::city_time(provider.as_ref(), at, chrono::Utc::now()).await;
                let report = dashboard::sun_report(provider.as_ref(), at, &time).await?;

                print!("{}", render::heading(&city.display_name()));
                print!("{}", render::sun(&report, &time));
            }
            Command::Map { city, style } => {
                let config = Config::load()?;
                let catalog = load_catalog(self.catalog.as_ref(), &config)?;
                let city = resolve_city(&catalog, &config, &city)?;
                let style = map_style(style.as_deref(), &config)?;

                print!("{}", render::map(&dashboard::map_view(&city, style)));
            }
            Command::Dashboard {
                city,
                date,
                compare,
                style,
            } => {
                let config = Config::load()?;
                let catalog = load_catalog(self.catalog.as_ref(), &config)?;
                let city = resolve_city(&catalog, &config, &city)?;
                let options = DashboardOptions {
                    history_date: date,
                    compare: lookup_all(&catalog, &city.country, &compare)?,
                    map_style: map_style(style.as_deref(), &config)?,
                };
                let provider = provider_from_config(&config)?;

                show_dashboard(provider.as_ref(), &city, &options).await;
            }
        }

        Ok(())
    }
}

async fn show_dashboard(provider: &dyn WeatherProvider, city: &CityRecord, options: &DashboardOptions) {
    let board = dashboard::build(provider, city, options).await;

    print!("{}", render::heading(&board.city.display_name()));
    match &board.current {
        Ok(report) => print!("{}", render::current(report)),
        Err(err) => eprintln!("{}", render::section_error(err)),
    }

    print!("{}", render::heading("Week ahead"));
    match &board.week_ahead {
        Ok(table) => print!("{}", render::forecast(table, &board.time)),
        Err(err) => eprintln!("{}", render::section_error(err)),
    }
    print!("{}", render::map(&board.map));

    if let Some(history) = &board.history {
        print!("{}", render::heading("Historical weather"));
        match history {
            Ok(table) => print!("{}", render::forecast(table, &board.time)),
            Err(err) => eprintln!("{}", render::section_error(err)),
        }
    }

    if !board.comparison.is_empty() {
        print!("{}", render::heading("Compare weather between cities"));
        print!("{}", render::comparison(&board.comparison));
    }

    print!("{}", render::heading("Local time and sun times"));
    match &board.sun {
        Ok(report) => print!("{}", render::sun(report, &board.time)),
        Err(err) => eprintln!("{}", render::section_error(err)),
    }

    print!("{}", render::footer());
}

fn load_catalog(flag: Option<&PathBuf>, config: &Config) -> Result<CityCatalog> {
    let path = flag.or(config.catalog_path.as_ref());
    debug!(?path, "loading city catalog");

    CityCatalog::load(path.map(PathBuf::as_path)).context("Could not load the city catalog")
}

/// Look up the city given on the command line, prompting for whatever is missing.
fn resolve_city(catalog: &CityCatalog, config: &Config, args: &CityArgs) -> Result<CityRecord> {
    let country = match &args.country {
        Some(country) => country.clone(),
        None => prompt::select_country(catalog, config.default_country())?,
    };
    let city = match &args.city {
        Some(city) => city.clone(),
        None => prompt::select_city(catalog, &country, config.default_city())?,
    };

    Ok(catalog.lookup(&country, &city)?.clone())
}

fn lookup_all(catalog: &CityCatalog, country: &str, cities: &[String]) -> Result<Vec<CityRecord>> {
    cities
        .iter()
        .map(|city| catalog.lookup(country, city).cloned().map_err(anyhow::Error::from))
        .collect()
}

/// Style from the command line, else from config.
///
/// A mistyped flag is an error; a stale config value falls back to the default.
fn map_style(flag: Option<&str>, config: &Config) -> Result<MapStyle> {
    match flag {
        Some(name) => name.parse(),
        None => Ok(config.map_style()),
    }
}

fn configure(mut config: Config, catalog: &CityCatalog) -> Result<()> {
    let country = prompt::select_country(catalog, config.default_country())?;
    let city = prompt::select_city(catalog, &country, config.default_city())?;
    config.set_default_city(&country, &city);

    let style = prompt::select_map_style(config.map_style())?;
    config.set_map_style(style);

    config.catalog_path = prompt::catalog_path(config.catalog_path.as_deref())?;

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}
