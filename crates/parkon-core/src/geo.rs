//! Great-circle distance and unit handling.
//!
//! Everything downstream of the search boundary works in kilometers; miles
//! only appear on input and are converted here.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Fixed statute-mile conversion factor.
pub const MILES_TO_KM: f64 = 1.60934;

/// A validated WGS84 position. Deserialization goes through [`Coordinate::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedCoordinate")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize)]
struct UncheckedCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<UncheckedCoordinate> for Coordinate {
    type Error = CoreError;

    fn try_from(raw: UncheckedCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    /// Builds a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LatitudeOutOfRange`] or
    /// [`CoreError::LongitudeOutOfRange`].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoreError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoreError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Miles,
    Kilometers,
}

impl DistanceUnit {
    #[must_use]
    pub fn to_km(self, value: f64) -> f64 {
        match self {
            DistanceUnit::Miles => value * MILES_TO_KM,
            DistanceUnit::Kilometers => value,
        }
    }
}

/// Haversine distance between two coordinates in kilometers.
#[must_use]
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let half_chord = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let angle = 2.0 * half_chord.sqrt().atan2((1.0 - half_chord).sqrt());

    EARTH_RADIUS_KM * angle
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;

    fn c(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).expect("valid coordinate")
    }

    #[test]
    fn distance_to_self_is_zero() {
        let trafalgar = c(51.5074, -0.1278);
        assert!(distance_km(trafalgar, trafalgar).abs() < f64::EPSILON);
        assert!(distance_km(c(0.0, 0.0), c(0.0, 0.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (c(51.5074, -0.1278), c(51.5308, -0.1238)),
            (c(-33.8688, 151.2093), c(40.7128, -74.0060)),
            (c(89.9, 179.9), c(-89.9, -179.9)),
        ];
        for (a, b) in pairs {
            assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-9);
        }
    }

    #[test]
    fn antipodal_points_are_half_circumference_apart() {
        let d = distance_km(c(0.0, 0.0), c(0.0, 180.0));
        assert!((d - PI * EARTH_RADIUS_KM).abs() < 1e-6, "got {d}");

        let poles = distance_km(c(90.0, 0.0), c(-90.0, 0.0));
        assert!((poles - PI * EARTH_RADIUS_KM).abs() < 1e-6, "got {poles}");
    }

    #[test]
    fn one_degree_of_longitude_on_equator() {
        let d = distance_km(c(0.0, 0.0), c(0.0, 1.0));
        let expected = EARTH_RADIUS_KM * 1.0_f64.to_radians();
        assert!((d - expected).abs() < 1e-9, "got {d}");
    }

    #[test]
    fn central_london_to_kings_cross() {
        // Trafalgar Square to King's Cross is roughly 2.6 km.
        let d = distance_km(c(51.5074, -0.1278), c(51.5308, -0.1238));
        assert!((d - 2.62).abs() < 0.05, "got {d}");
    }

    #[test]
    fn coordinate_rejects_out_of_range_values() {
        assert_eq!(
            Coordinate::new(90.5, 0.0),
            Err(CoreError::LatitudeOutOfRange(90.5))
        );
        assert_eq!(
            Coordinate::new(0.0, -180.5),
            Err(CoreError::LongitudeOutOfRange(-180.5))
        );
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn coordinate_accepts_boundaries() {
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(90.0, 180.0).is_ok());
    }

    #[test]
    fn deserialization_applies_range_checks() {
        let ok: Coordinate =
            serde_json::from_str(r#"{"latitude": 51.5074, "longitude": -0.1278}"#)
                .expect("valid coordinate");
        assert_eq!(ok, c(51.5074, -0.1278));

        let err = serde_json::from_str::<Coordinate>(r#"{"latitude": 91.0, "longitude": 0.0}"#)
            .expect_err("latitude out of range");
        assert!(err.to_string().contains("latitude 91"), "got {err}");
        assert!(
            serde_json::from_str::<Coordinate>(r#"{"latitude": 0.0, "longitude": 200.0}"#)
                .is_err()
        );
    }

    #[test]
    fn miles_convert_with_fixed_factor() {
        let km = DistanceUnit::Miles.to_km(1.2);
        assert!((km - 1.931_208).abs() < 1e-6, "got {km}");
        assert!((DistanceUnit::Kilometers.to_km(2.5) - 2.5).abs() < f64::EPSILON);
    }
}
