//! The data which can be extracted from the council website.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One advertised mega skip at one site on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipLocation {
    pub address: String,
    pub postcode: String,
    pub date: NaiveDate,
    /// The heading text exactly as the council wrote it.
    pub date_str: String,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
}

impl SkipLocation {
    /// A location straight from the page, not yet geocoded.
    pub fn new(address: String, postcode: String, date: NaiveDate, date_str: String) -> Self {
        Self {
            address,
            postcode,
            date,
            date_str,
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    /// The geocoded position, or `None` while the location still sits at (0, 0).
    pub fn coordinate(&self) -> Option<Coordinate> {
        if self.latitude == 0.0 && self.longitude == 0.0 {
            return None;
        }
        Some(Coordinate::new(self.latitude, self.longitude))
    }

    pub fn set_coordinate(&mut self, coordinate: Coordinate) {
        self.latitude = coordinate.latitude;
        self.longitude = coordinate.longitude;
    }
}

/// A point on the earth in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}
