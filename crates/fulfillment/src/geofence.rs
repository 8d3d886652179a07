//! Geofence delivery detection.
//!
//! Stateless: the only input is the destination and one telemetry sample.

use crate::model::{Company, IotProperty};

/// Mean earth radius used by the great-circle distance, in miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.0;

/// Default arrival radius.
pub const DEFAULT_RADIUS_MILES: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl From<&Company> for Coordinates {
    fn from(value: &Company) -> Self {
        Self::new(value.latitude, value.longitude)
    }
}

impl From<&IotProperty> for Coordinates {
    fn from(value: &IotProperty) -> Self {
        Self::new(value.latitude, value.longitude)
    }
}

/// Haversine great-circle distance in miles.
pub fn distance_miles(a: Coordinates, b: Coordinates) -> f64 {
    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_MILES * c
}

/// Arrival check against a fixed radius around the ship-to location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geofence {
    radius_miles: f64,
}

impl Geofence {
    pub fn new(radius_miles: f64) -> Self {
        Self { radius_miles }
    }

    pub fn radius_miles(&self) -> f64 {
        self.radius_miles
    }

    /// Strictly inside the radius counts as arrived.
    pub fn has_arrived(&self, destination: &Company, sample: &IotProperty) -> bool {
        let miles = distance_miles(destination.into(), sample.into());
        tracing::debug!(
            tracking_code = %sample.tracking_code,
            miles,
            radius = self.radius_miles,
            "geofence distance"
        );
        miles < self.radius_miles
    }
}

impl Default for Geofence {
    fn default() -> Self {
        Self::new(DEFAULT_RADIUS_MILES)
    }
}
