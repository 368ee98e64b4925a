//! Local time of a city.

use chrono::{DateTime, Duration, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// A resolved IANA timezone together with its UTC offset at a given instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CityTime {
    pub timezone: Tz,
    pub offset: Duration,
}

impl CityTime {
    pub fn utc() -> Self {
        Self {
            timezone: Tz::UTC,
            offset: Duration::zero(),
        }
    }

    pub fn new(timezone: Tz, at: DateTime<Utc>) -> Self {
        Self {
            timezone,
            offset: offset_at(timezone, at),
        }
    }

    /// Resolve a timezone name, falling back to UTC when it is missing or unknown.
    pub fn resolve(name: Option<&str>, at: DateTime<Utc>) -> Self {
        let Some(name) = name else {
            warn!("no timezone for location, using UTC");
            return Self::utc();
        };

        match name.parse::<Tz>() {
            Ok(tz) => Self::new(tz, at),
            Err(_) => {
                warn!(timezone = name, "unknown timezone, using UTC");
                Self::utc()
            }
        }
    }

    pub fn local_now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone)
    }

    pub fn name(&self) -> &'static str {
        self.timezone.name()
    }
}

/// UTC offset of `tz` at the instant `at`, DST included.
pub fn offset_at(tz: Tz, at: DateTime<Utc>) -> Duration {
    let seconds = tz
        .offset_from_utc_datetime(&at.naive_utc())
        .fix()
        .local_minus_utc();
    Duration::seconds(i64::from(seconds))
}
