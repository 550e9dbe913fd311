//! Raw request parameters and their validation into a [`SearchQuery`].
//!
//! All unit normalization happens here: past this point every radius is in
//! kilometers.

use std::str::FromStr;

use parkon_core::{CallerPrivilege, Coordinate, DistanceUnit, SearchQuery, SpotCategory};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Radius used when the caller supplies neither `radius_miles` nor `radius_km`.
pub const DEFAULT_RADIUS_MILES: f64 = 1.2;

/// Tolerance on the upper radius bound so that e.g. `10` miles still passes a
/// `16.0934` km limit after floating-point conversion.
const RADIUS_TOLERANCE_KM: f64 = 1e-9;

/// Search parameters exactly as received. Blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSearchParams {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub radius_miles: Option<String>,
    pub radius_km: Option<String>,
    pub spot_type: Option<String>,
    pub max_price: Option<String>,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn parse_f64(param: &'static str, value: &str) -> Result<f64, ValidationError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ValidationError::InvalidNumber {
            param,
            value: value.to_string(),
        })
}

fn required_f64(param: &'static str, value: Option<&String>) -> Result<f64, ValidationError> {
    let raw = present(value).ok_or(ValidationError::MissingParam(param))?;
    parse_f64(param, raw)
}

/// Validates raw parameters into a query.
///
/// # Errors
///
/// Returns a [`ValidationError`] describing the first rejected parameter.
pub fn parse_query(
    raw: &RawSearchParams,
    privilege: CallerPrivilege,
    max_radius_km: f64,
) -> Result<SearchQuery, ValidationError> {
    let latitude = required_f64("latitude", raw.latitude.as_ref())?;
    let longitude = required_f64("longitude", raw.longitude.as_ref())?;
    let origin = Coordinate::new(latitude, longitude).map_err(ValidationError::Coordinate)?;

    let radius_km = match (
        present(raw.radius_miles.as_ref()),
        present(raw.radius_km.as_ref()),
    ) {
        (Some(_), Some(_)) => return Err(ValidationError::ConflictingRadius),
        (Some(miles), None) => DistanceUnit::Miles.to_km(parse_f64("radius_miles", miles)?),
        (None, Some(km)) => DistanceUnit::Kilometers.to_km(parse_f64("radius_km", km)?),
        (None, None) => DistanceUnit::Miles.to_km(DEFAULT_RADIUS_MILES),
    };
    if radius_km <= 0.0 || radius_km > max_radius_km + RADIUS_TOLERANCE_KM {
        return Err(ValidationError::RadiusOutOfRange {
            radius_km,
            max_km: max_radius_km,
        });
    }

    let category = present(raw.spot_type.as_ref())
        .map(|s| SpotCategory::from_str(s).map_err(|_| ValidationError::UnknownCategory(s.to_string())))
        .transpose()?;

    let max_price = present(raw.max_price.as_ref())
        .map(|s| {
            Decimal::from_str(s).map_err(|_| ValidationError::InvalidNumber {
                param: "max_price",
                value: s.to_string(),
            })
        })
        .transpose()?;
    if max_price.is_some_and(|p| p.is_sign_negative() && !p.is_zero()) {
        return Err(ValidationError::NegativePrice);
    }

    Ok(SearchQuery {
        origin,
        radius_km,
        category,
        max_price,
        privilege,
    })
}

#[cfg(test)]
#[path = "params_test.rs"]
mod tests;
