//! Landing coordinates as recorded in the `GPS` column of a flight log.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A WGS 84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Parse the free-text `"<lat> <lon>"` form used by flight logs.
    ///
    /// Returns `None` for anything that is not exactly two finite numbers, and
    /// for positions with a zero component (loggers write `0 0` before a fix).
    pub fn parse_gps(text: &str) -> Option<Self> {
        Self::from_parts(text.split_whitespace())
    }

    /// Parse the `"lat,lon"` form written to project property files.
    pub fn parse_persisted(text: &str) -> Option<Self> {
        let text = text.trim().trim_matches('"');
        if text.contains(',') {
            Self::from_parts(text.split(',').map(str::trim))
        } else {
            Self::parse_gps(text)
        }
    }

    fn from_parts<'a>(mut parts: impl Iterator<Item = &'a str>) -> Option<Self> {
        let latitude = parts.next()?.parse::<f64>().ok()?;
        let longitude = parts.next()?.parse::<f64>().ok()?;
        if parts.next().is_some() {
            return None;
        }

        let coordinate = Self::new(latitude, longitude);
        coordinate.is_valid().then_some(coordinate)
    }

    /// Both components are finite and non-zero.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude != 0.0
            && self.longitude != 0.0
    }

    /// `lat,lon` as stored in project properties.
    pub fn to_persisted(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }

    /// `lon, lat` ordering used by geometry libraries.
    pub fn to_xy(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

/// Renders the `GPS` column form, `lat lon`.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.latitude, self.longitude)
    }
}
