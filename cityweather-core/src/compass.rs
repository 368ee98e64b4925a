//! Wind direction classification.
//!
//! A bearing in degrees is mapped to one of the 16 points of the compass rose.
//! Each point owns a half-open sector `[centre - 11.25, centre + 11.25)`, so the
//! sectors tile the circle exactly and `N` spans the 0°/360° seam.

use std::fmt;

use thiserror::Error;

/// Width of one compass sector in degrees.
pub const SECTOR_WIDTH: f64 = 22.5;

/// Half of [`SECTOR_WIDTH`]; a bearing belongs to the sector whose centre is within this distance.
pub const HALF_SECTOR: f64 = SECTOR_WIDTH / 2.0;

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompassPoint {
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NNW,
}

/// Sector centres in clockwise order starting from north.
const ROSE: [(f64, CompassPoint); 16] = [
    (0.0, CompassPoint::N),
    (22.5, CompassPoint::NNE),
    (45.0, CompassPoint::NE),
    (67.5, CompassPoint::ENE),
    (90.0, CompassPoint::E),
    (112.5, CompassPoint::ESE),
    (135.0, CompassPoint::SE),
    (157.5, CompassPoint::SSE),
    (180.0, CompassPoint::S),
    (202.5, CompassPoint::SSW),
    (225.0, CompassPoint::SW),
    (247.5, CompassPoint::WSW),
    (270.0, CompassPoint::W),
    (292.5, CompassPoint::WNW),
    (315.0, CompassPoint::NW),
    (337.5, CompassPoint::NNW),
];

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CompassError {
    #[error("bearing {0} is not a finite number")]
    NotFinite(f64),

    #[error("bearing {0} is outside [0, 360)")]
    OutOfRange(f64),
}

impl CompassPoint {
    /// Classify a bearing that must already lie in `[0, 360)`.
    pub fn try_from_degrees(degrees: f64) -> Result<Self, CompassError> {
        if !degrees.is_finite() {
            return Err(CompassError::NotFinite(degrees));
        }
        if !(0.0..360.0).contains(&degrees) {
            return Err(CompassError::OutOfRange(degrees));
        }

        Ok(Self::classify(degrees))
    }

    /// Classify any finite bearing, wrapping it into `[0, 360)` first.
    ///
    /// Weather APIs report calm or northerly wind as either 0 or 360, so values
    /// coming off the wire go through this entry point.
    pub fn from_bearing(degrees: f64) -> Result<Self, CompassError> {
        if !degrees.is_finite() {
            return Err(CompassError::NotFinite(degrees));
        }

        // rem_euclid can round a tiny negative value up to exactly 360.0
        let wrapped = degrees.rem_euclid(360.0);
        let wrapped = if wrapped >= 360.0 { 0.0 } else { wrapped };

        Ok(Self::classify(wrapped))
    }

    fn classify(degrees: f64) -> Self {
        // Shifting by half a sector turns "nearest centre" into a floor division,
        // with ties on a boundary going to the clockwise neighbour.
        let mut index = ((degrees + HALF_SECTOR) / SECTOR_WIDTH).floor() as usize % ROSE.len();

        // The addition can round a bearing just under a boundary up onto it;
        // the exact lower bound of the sector decides.
        if !Self::sector_contains(index, degrees) {
            index = (index + ROSE.len() - 1) % ROSE.len();
        }

        ROSE[index].1
    }

    /// Whether `degrees` lies in the half-open sector of `ROSE[index]`.
    fn sector_contains(index: usize, degrees: f64) -> bool {
        let lower = ROSE[index].0 - HALF_SECTOR;
        let upper = ROSE[index].0 + HALF_SECTOR;

        if lower < 0.0 {
            degrees >= lower + 360.0 || degrees < upper
        } else {
            degrees >= lower && degrees < upper
        }
    }

    /// Centre of this point's sector in degrees.
    pub fn centre(self) -> f64 {
        ROSE.iter()
            .find(|(_, point)| *point == self)
            .map(|(centre, _)| *centre)
            .unwrap_or_default()
    }

    pub fn label(self) -> &'static str {
        match self {
            CompassPoint::N => "N",
            CompassPoint::NNE => "N/NE",
            CompassPoint::NE => "NE",
            CompassPoint::ENE => "E/NE",
            CompassPoint::E => "E",
            CompassPoint::ESE => "E/SE",
            CompassPoint::SE => "SE",
            CompassPoint::SSE => "S/SE",
            CompassPoint::S => "S",
            CompassPoint::SSW => "S/SW",
            CompassPoint::SW => "SW",
            CompassPoint::WSW => "W/SW",
            CompassPoint::W => "W",
            CompassPoint::WNW => "W/NW",
            CompassPoint::NW => "NW",
            CompassPoint::NNW => "N/NW",
        }
    }

    pub fn all() -> impl Iterator<Item = CompassPoint> {
        ROSE.iter().map(|(_, point)| *point)
    }
}

impl fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(degrees: f64) -> &'static str {
        CompassPoint::try_from_degrees(degrees).unwrap().label()
    }

    #[test]
    fn cardinal_points() {
        assert_eq!(label(0.0), "N");
        assert_eq!(label(90.0), "E");
        assert_eq!(label(180.0), "S");
        assert_eq!(label(270.0), "W");
        assert_eq!(label(45.0), "NE");
    }

    #[test]
    fn north_sector_wraps_the_seam() {
        assert_eq!(label(11.24), "N");
        assert_eq!(label(11.26), "N/NE");
        assert_eq!(label(348.76), "N");
        assert_eq!(label(348.74), "N/NW");
        assert_eq!(label(359.999), "N");
    }

    #[test]
    fn exact_boundaries_go_clockwise() {
        assert_eq!(label(11.25), "N/NE");
        assert_eq!(label(348.75), "N");
        assert_eq!(label(78.75), "E");
        assert_eq!(label(326.25), "N/NW");
    }

    #[test]
    fn bearing_just_below_a_boundary_stays_counter_clockwise() {
        let points: Vec<_> = CompassPoint::all().collect();

        for (i, point) in points.iter().enumerate() {
            let boundary = point.centre() + HALF_SECTOR;
            let below = f64::from_bits(boundary.to_bits() - 1);
            let next = points[(i + 1) % points.len()];

            assert_eq!(CompassPoint::try_from_degrees(below).unwrap(), *point, "{below}");
            assert_eq!(CompassPoint::from_bearing(below).unwrap(), *point, "{below}");
            if boundary < 360.0 {
                assert_eq!(CompassPoint::try_from_degrees(boundary).unwrap(), next, "{boundary}");
            }
        }

        assert_eq!(label(56.24999999999999), "NE");
        assert_eq!(label(f64::from_bits(11.25f64.to_bits() - 1)), "N");
    }

    #[test]
    fn every_centre_maps_to_its_own_point() {
        for point in CompassPoint::all() {
            assert_eq!(CompassPoint::try_from_degrees(point.centre()).unwrap(), point);
        }
    }

    #[test]
    fn classification_is_total_over_the_domain() {
        let mut degrees = 0.0;
        while degrees < 360.0 {
            let point = CompassPoint::try_from_degrees(degrees).unwrap();
            let distance = (degrees - point.centre()).abs();
            let circular = distance.min(360.0 - distance);
            assert!(circular <= HALF_SECTOR, "{degrees} classified as {point}");
            degrees += 0.25;
        }
    }

    #[test]
    fn strict_entry_rejects_out_of_range() {
        assert_eq!(
            CompassPoint::try_from_degrees(360.0),
            Err(CompassError::OutOfRange(360.0))
        );
        assert_eq!(
            CompassPoint::try_from_degrees(-0.5),
            Err(CompassError::OutOfRange(-0.5))
        );
        assert!(matches!(
            CompassPoint::try_from_degrees(f64::NAN),
            Err(CompassError::NotFinite(_))
        ));
    }

    #[test]
    fn normalising_entry_is_periodic() {
        for degrees in [0.0, 11.24, 11.26, 95.0, 200.0, 348.74, 348.76] {
            assert_eq!(
                CompassPoint::from_bearing(degrees).unwrap(),
                CompassPoint::from_bearing(degrees + 360.0).unwrap(),
            );
        }
        assert_eq!(CompassPoint::from_bearing(360.0).unwrap(), CompassPoint::N);
        assert_eq!(CompassPoint::from_bearing(-90.0).unwrap(), CompassPoint::W);
        assert!(CompassPoint::from_bearing(f64::INFINITY).is_err());
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(CompassPoint::WSW.to_string(), "W/SW");
    }
}
