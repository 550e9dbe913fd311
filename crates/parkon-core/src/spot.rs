use std::collections::BTreeSet;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotCategory {
    Standard,
    Disabled,
    Electric,
    Motorcycle,
}

impl SpotCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SpotCategory::Standard => "standard",
            SpotCategory::Disabled => "disabled",
            SpotCategory::Electric => "electric",
            SpotCategory::Motorcycle => "motorcycle",
        }
    }
}

impl std::fmt::Display for SpotCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpotCategory {
    type Err = CoreError;

    /// Case-insensitive parse of the wire name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(SpotCategory::Standard),
            "disabled" => Ok(SpotCategory::Disabled),
            "electric" => Ok(SpotCategory::Electric),
            "motorcycle" => Ok(SpotCategory::Motorcycle),
            _ => Err(CoreError::UnknownCategory(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotStatus {
    Available,
    Occupied,
    Reserved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub hourly_rate: Decimal,
    pub daily_rate: Option<Decimal>,
    /// ISO 4217 currency code.
    pub currency: String,
}

impl Pricing {
    #[must_use]
    pub fn gbp(hourly_rate: Decimal, daily_rate: Option<Decimal>) -> Self {
        Self {
            hourly_rate,
            daily_rate,
            currency: "GBP".to_string(),
        }
    }
}

/// A provider-normalized parking spot, before any distance is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Provider-prefixed identifier, e.g. `"tfl_cp_001"` or `"inv_shoreditch_01"`.
    pub id: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub name: String,
    pub address: Option<String>,
    pub postcode: Option<String>,
    pub city: String,
    pub capacity: u32,
    pub pricing: Pricing,
    pub category: SpotCategory,
    pub amenities: BTreeSet<String>,
    /// Tag of the adapter that produced this record (`"tfl"`, `"inventory"`).
    pub provider: String,
    pub status: SpotStatus,
    /// `true` only when live occupancy is exposed to the caller.
    pub realtime: bool,
    /// Free spaces reported by the live feed; present only when `realtime`.
    pub live_free_spaces: Option<u32>,
}

/// A [`Candidate`] positioned relative to a search origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub distance_km: f64,
    pub walk_time_mins: u32,
}

impl RankedResult {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.candidate.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parse_is_case_insensitive() {
        assert_eq!("Electric".parse::<SpotCategory>(), Ok(SpotCategory::Electric));
        assert_eq!(" DISABLED ".parse::<SpotCategory>(), Ok(SpotCategory::Disabled));
        assert_eq!("motorcycle".parse::<SpotCategory>(), Ok(SpotCategory::Motorcycle));
    }

    #[test]
    fn category_parse_rejects_unknown() {
        assert_eq!(
            "truck".parse::<SpotCategory>(),
            Err(CoreError::UnknownCategory("truck".to_string()))
        );
    }

    #[test]
    fn ranked_result_serializes_flat() {
        let result = RankedResult {
            candidate: Candidate {
                id: "inv_test".to_string(),
                coordinate: Coordinate::new(51.5, -0.1).unwrap(),
                name: "Test".to_string(),
                address: None,
                postcode: None,
                city: "London".to_string(),
                capacity: 3,
                pricing: Pricing::gbp(Decimal::new(350, 2), None),
                category: SpotCategory::Standard,
                amenities: BTreeSet::from(["covered".to_string()]),
                provider: "inventory".to_string(),
                status: SpotStatus::Available,
                realtime: false,
                live_free_spaces: None,
            },
            distance_km: 1.25,
            walk_time_mins: 15,
        };
        let json = serde_json::to_value(&result).expect("serialize");
        assert_eq!(json["id"], "inv_test");
        assert_eq!(json["latitude"], 51.5);
        assert_eq!(json["category"], "standard");
        assert_eq!(json["walk_time_mins"], 15);
        assert_eq!(json["pricing"]["currency"], "GBP");

        let back: RankedResult = serde_json::from_value(json.clone()).expect("round trip");
        assert_eq!(back, result);

        let mut bad = json;
        bad["latitude"] = serde_json::json!(120.0);
        assert!(serde_json::from_value::<RankedResult>(bad).is_err());
    }
}
