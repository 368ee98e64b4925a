use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::{
    catalog::{DEFAULT_CITY, DEFAULT_COUNTRY},
    map::MapStyle,
    provider::openmeteo::DEFAULT_BASE_URL,
};

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// default_country = "Kenya"
/// default_city = "Nyeri"
/// map_style = "TopoMap"
/// catalog_path = "/home/me/data/worldcities.csv"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Country preselected in the city picker.
    pub default_country: Option<String>,

    /// City preselected in the city picker.
    pub default_city: Option<String>,

    /// One of "OpenStreetMap", "TopoMap" or "Satellite".
    pub map_style: Option<String>,

    /// Full simplemaps `worldcities.csv`; the bundled subset is used when unset.
    pub catalog_path: Option<PathBuf>,

    /// Override for the Open-Meteo forecast endpoint.
    pub api_base_url: Option<String>,
}

impl Config {
    pub fn default_country(&self) -> &str {
        self.default_country.as_deref().unwrap_or(DEFAULT_COUNTRY)
    }

    pub fn default_city(&self) -> &str {
        self.default_city.as_deref().unwrap_or(DEFAULT_CITY)
    }

    /// Configured map style; an unrecognised name falls back to OpenStreetMap.
    pub fn map_style(&self) -> MapStyle {
        self.map_style
            .as_deref()
            .map(MapStyle::or_default)
            .unwrap_or_default()
    }

    pub fn set_map_style(&mut self, style: MapStyle) {
        self.map_style = Some(style.as_str().to_string());
    }

    pub fn set_default_city(&mut self, country: &str, city: &str) {
        self.default_country = Some(country.to_string());
        self.default_city = Some(city.to_string());
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cityweather", "cityweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_nyeri() {
        let cfg = Config::default();

        assert_eq!(cfg.default_country(), "Kenya");
        assert_eq!(cfg.default_city(), "Nyeri");
        assert_eq!(cfg.map_style(), MapStyle::OpenStreetMap);
        assert_eq!(cfg.api_base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn unknown_map_style_falls_back_to_openstreetmap() {
        let cfg = Config {
            map_style: Some("watercolor".into()),
            ..Config::default()
        };
        assert_eq!(cfg.map_style(), MapStyle::OpenStreetMap);

        let cfg = Config {
            map_style: Some("topo".into()),
            ..Config::default()
        };
        assert_eq!(cfg.map_style(), MapStyle::TopoMap);
    }

    #[test]
    fn unknown_map_style_in_file_still_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "map_style = \"watercolor\"\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.map_style(), MapStyle::OpenStreetMap);
    }

    #[test]
    fn set_default_city_overrides_defaults() {
        let mut cfg = Config::default();
        cfg.set_default_city("Japan", "Sapporo");
        cfg.set_map_style(MapStyle::Satellite);

        assert_eq!(cfg.default_country(), "Japan");
        assert_eq!(cfg.default_city(), "Sapporo");
        assert_eq!(cfg.map_style(), MapStyle::Satellite);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_default_city("Iceland", "Reykjavik");
        cfg.catalog_path = Some(PathBuf::from("/data/worldcities.csv"));
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_city = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
