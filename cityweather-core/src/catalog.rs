//! Static city catalog.
//!
//! The catalog is read once from a CSV laid out like the simplemaps
//! `worldcities.csv` export: the `country`, `city_ascii`, `lat` and `lng` columns
//! are used, everything else is ignored. A small subset ships inside the binary;
//! the full dataset can be pointed at through the config file.

use std::{
    collections::{BTreeMap, HashSet},
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::Coordinates;

const BUNDLED_CSV: &str = include_str!("../data/worldcities.csv");

pub const DEFAULT_COUNTRY: &str = "Kenya";
pub const DEFAULT_CITY: &str = "Nyeri";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to open city catalog {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read city catalog: {0}")]
    Csv(#[from] csv::Error),

    #[error("city catalog contains no usable rows")]
    Empty,

    #[error("unknown country '{0}'")]
    UnknownCountry(String),

    #[error("unknown city '{city}' in {country}")]
    UnknownCity { country: String, city: String },
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    country: String,
    city_ascii: String,
    lat: f64,
    lng: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CityRecord {
    pub country: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl CityRecord {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// "City, Country", as used for map markers and headings.
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CityCatalog {
    by_country: BTreeMap<String, Vec<CityRecord>>,
}

impl CityCatalog {
    /// The catalog compiled into the binary.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_reader(BUNDLED_CSV.as_bytes())
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let file = File::open(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let catalog = Self::from_reader(file)?;
        debug!(path = %path.display(), cities = catalog.len(), "loaded city catalog");
        Ok(catalog)
    }

    /// Load from `path` when given, otherwise the bundled catalog.
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::bundled(),
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv = csv::Reader::from_reader(reader);
        let mut catalog = Self::default();
        let mut seen = HashSet::new();
        let mut skipped = 0usize;

        for row in csv.deserialize::<CsvRow>() {
            match row {
                Ok(row) => catalog.insert(row, &mut seen),
                Err(err) if err.is_io_error() => return Err(err.into()),
                Err(err) => {
                    skipped += 1;
                    debug!("skipping catalog row: {err}");
                }
            }
        }

        if skipped > 0 {
            warn!(skipped, "city catalog contained malformed rows");
        }
        if catalog.by_country.is_empty() {
            return Err(CatalogError::Empty);
        }

        Ok(catalog)
    }

    fn insert(&mut self, row: CsvRow, seen: &mut HashSet<(String, String)>) {
        // First occurrence of a (country, city) pair wins.
        if !seen.insert((row.country.clone(), row.city_ascii.clone())) {
            return;
        }

        let cities = self.by_country.entry(row.country.clone()).or_default();
        cities.push(CityRecord {
            country: row.country,
            city: row.city_ascii,
            latitude: row.lat,
            longitude: row.lng,
        });
    }

    /// Total number of cities.
    pub fn len(&self) -> usize {
        self.by_country.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_country.is_empty()
    }

    /// Country names in alphabetical order.
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.by_country.keys().map(String::as_str)
    }

    /// Cities of `country` in dataset order.
    pub fn cities(&self, country: &str) -> Result<&[CityRecord], CatalogError> {
        self.by_country
            .get(country)
            .map(Vec::as_slice)
            .ok_or_else(|| CatalogError::UnknownCountry(country.to_string()))
    }

    pub fn lookup(&self, country: &str, city: &str) -> Result<&CityRecord, CatalogError> {
        self.cities(country)?
            .iter()
            .find(|c| c.city == city)
            .ok_or_else(|| CatalogError::UnknownCity {
                country: country.to_string(),
                city: city.to_string(),
            })
    }

    pub fn coordinates(&self, country: &str, city: &str) -> Result<Coordinates, CatalogError> {
        self.lookup(country, city).map(CityRecord::coordinates)
    }
}
