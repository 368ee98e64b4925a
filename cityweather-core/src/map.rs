//! Map tile providers and slippy-map tile addressing.

use std::{f64::consts::PI, fmt, str::FromStr};

use tracing::warn;

use crate::model::Coordinates;

pub const DEFAULT_ZOOM: u8 = 7;

/// Web-Mercator latitude limit; tiles do not exist beyond it.
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MapStyle {
    #[default]
    OpenStreetMap,
    TopoMap,
    Satellite,
}

impl MapStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            MapStyle::OpenStreetMap => "OpenStreetMap",
            MapStyle::TopoMap => "TopoMap",
            MapStyle::Satellite => "Satellite",
        }
    }

    pub const fn all() -> &'static [MapStyle] {
        &[MapStyle::OpenStreetMap, MapStyle::TopoMap, MapStyle::Satellite]
    }

    pub fn tile_template(&self) -> &'static str {
        match self {
            MapStyle::OpenStreetMap => "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            MapStyle::TopoMap => "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png",
            MapStyle::Satellite => "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}.png",
        }
    }

    pub fn attribution(&self) -> &'static str {
        match self {
            MapStyle::OpenStreetMap => "Map data © OpenStreetMap contributors",
            MapStyle::TopoMap => "Map tiles by OpenTopoMap, under ODbL.",
            MapStyle::Satellite => "Map tiles by CartoDB, under CC BY 3.0.",
        }
    }

    /// Parse a style name, using OpenStreetMap for anything unrecognised.
    pub fn or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|err| {
            warn!("{err} Using {}.", MapStyle::default());
            MapStyle::default()
        })
    }

    pub fn tile_url(&self, tile: Tile) -> String {
        self.tile_template()
            .replace("{s}", "a")
            .replace("{z}", &tile.zoom.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }
}

impl fmt::Display for MapStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MapStyle {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openstreetmap" | "osm" => Ok(MapStyle::OpenStreetMap),
            "topomap" | "topo" => Ok(MapStyle::TopoMap),
            "satellite" => Ok(MapStyle::Satellite),
            _ => Err(anyhow::anyhow!(
                "Unknown map style '{value}'. Supported styles: OpenStreetMap, TopoMap, Satellite."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl Tile {
    /// Tile containing `coords` at `zoom`.
    pub fn containing(coords: Coordinates, zoom: u8) -> Self {
        let n = f64::from(1u32 << zoom.min(30));
        let max_index = n - 1.0;

        let lat = coords.latitude.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
        let lon = coords.longitude.clamp(-180.0, 180.0);

        let x = ((lon + 180.0) / 360.0 * n).floor().clamp(0.0, max_index);
        let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * n)
            .floor()
            .clamp(0.0, max_index);

        Self {
            zoom: zoom.min(30),
            x: x as u32,
            y: y as u32,
        }
    }
}

/// A city pinned on a map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub style: MapStyle,
    pub marker: Coordinates,
    pub label: String,
    pub zoom: u8,
}

impl MapView {
    pub fn new(style: MapStyle, marker: Coordinates, label: impl Into<String>) -> Self {
        Self {
            style,
            marker,
            label: label.into(),
            zoom: DEFAULT_ZOOM,
        }
    }

    pub fn tile(&self) -> Tile {
        Tile::containing(self.marker, self.zoom)
    }

    pub fn tile_url(&self) -> String {
        self.style.tile_url(self.tile())
    }

    /// Browser link centred on the marker.
    pub fn viewer_url(&self) -> String {
        let Coordinates { latitude, longitude } = self.marker;
        format!(
            "https://www.openstreetmap.org/?mlat={latitude:.4}&mlon={longitude:.4}#map={}/{latitude:.4}/{longitude:.4}",
            self.zoom
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_names_roundtrip() {
        for style in MapStyle::all() {
            assert_eq!(style.as_str().parse::<MapStyle>().unwrap(), *style);
        }
    }

    #[test]
    fn unknown_style_falls_back_to_openstreetmap() {
        assert!("watercolor".parse::<MapStyle>().is_err());
        assert_eq!(MapStyle::or_default("watercolor"), MapStyle::OpenStreetMap);
        assert_eq!(
            MapStyle::or_default("watercolor").attribution(),
            "Map data © OpenStreetMap contributors"
        );
    }

    #[test]
    fn origin_tile() {
        let tile = Tile::containing(Coordinates::new(0.0, 0.0), 1);
        assert_eq!(tile, Tile { zoom: 1, x: 1, y: 1 });
    }

    #[test]
    fn nyeri_tile_at_default_zoom() {
        let tile = Tile::containing(Coordinates::new(-0.4167, 36.95), DEFAULT_ZOOM);
        assert_eq!(tile, Tile { zoom: 7, x: 77, y: 64 });
    }

    #[test]
    fn poles_and_antimeridian_stay_in_range() {
        let north = Tile::containing(Coordinates::new(90.0, 180.0), 3);
        assert_eq!(north, Tile { zoom: 3, x: 7, y: 0 });

        let south = Tile::containing(Coordinates::new(-90.0, -180.0), 3);
        assert_eq!(south, Tile { zoom: 3, x: 0, y: 7 });
    }

    #[test]
    fn tile_url_fills_template() {
        let view = MapView::new(MapStyle::TopoMap, Coordinates::new(-0.4167, 36.95), "Nyeri, Kenya");
        assert_eq!(view.tile_url(), "https://a.tile.opentopomap.org/7/77/64.png");
        assert_eq!(
            view.viewer_url(),
            "https://www.openstreetmap.org/?mlat=-0.4167&mlon=36.9500#map=7/-0.4167/36.9500"
        );
    }
}
