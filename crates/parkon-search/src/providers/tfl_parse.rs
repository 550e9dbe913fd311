//! Normalization of TfL car park records.
//!
//! Both `/Occupancy/CarPark` and `/Place/Type/CarPark` payloads are arrays of
//! loosely typed objects. Fields that are missing or structurally invalid are
//! treated as absent; a record without a usable coordinate is skipped.

use std::collections::BTreeSet;

use parkon_core::{Candidate, Coordinate, Pricing, SpotCategory, SpotStatus};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::fetch::{count_field, number_field, text_field};

pub(super) const TFL_ID_PREFIX: &str = "tfl_";
pub(super) const TFL_PROVIDER: &str = "tfl";
const DEFAULT_NAME: &str = "TfL Car Park";

/// Flat tariff applied to every TfL car park.
fn tfl_pricing() -> Pricing {
    Pricing::gbp(Decimal::new(400, 2), Some(Decimal::new(3000, 2)))
}

fn tfl_amenities() -> BTreeSet<String> {
    ["monitored", "secure"].into_iter().map(String::from).collect()
}

/// Normalizes one raw record.
///
/// `expose_occupancy` controls whether the free-space count is passed
/// through; status is derived from it either way.
pub(super) fn normalize_record(record: &Value, expose_occupancy: bool) -> Option<Candidate> {
    let raw_id = record
        .get("id")
        .and_then(|v| v.as_str().map(str::to_string).or_else(|| v.as_u64().map(|n| n.to_string())))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())?;

    let latitude = number_field(record, "lat")?;
    let longitude = number_field(record, "lon")?;
    let coordinate = Coordinate::new(latitude, longitude).ok()?;

    let name = text_field(record, "name")
        .or_else(|| text_field(record, "commonName"))
        .unwrap_or(DEFAULT_NAME)
        .to_string();

    let free = free_spaces(record);
    let status = match free {
        Some(0) => SpotStatus::Occupied,
        Some(_) | None => SpotStatus::Available,
    };
    let live_free_spaces = if expose_occupancy { free } else { None };

    Some(Candidate {
        id: format!("{TFL_ID_PREFIX}{raw_id}"),
        coordinate,
        name,
        address: text_field(record, "address").map(str::to_string),
        postcode: text_field(record, "postcode").map(str::to_string),
        city: "London".to_string(),
        capacity: capacity(record),
        pricing: tfl_pricing(),
        category: SpotCategory::Standard,
        amenities: tfl_amenities(),
        provider: TFL_PROVIDER.to_string(),
        status,
        realtime: live_free_spaces.is_some(),
        live_free_spaces,
    })
}

/// `bayCount`, else the sum of per-bay counts, else the `NumberOfSpaces`
/// place property, else 1.
fn capacity(record: &Value) -> u32 {
    count_field(record, "bayCount")
        .filter(|n| *n > 0)
        .or_else(|| sum_bays(record, "bayCount").filter(|n| *n > 0))
        .or_else(|| additional_property(record, "NumberOfSpaces").filter(|n| *n > 0))
        .unwrap_or(1)
}

fn free_spaces(record: &Value) -> Option<u32> {
    count_field(record, "spacesAvailable").or_else(|| sum_bays(record, "free"))
}

fn sum_bays(record: &Value, key: &str) -> Option<u32> {
    let bays = record.get("bays")?.as_array()?;
    let counts: Vec<u32> = bays.iter().filter_map(|bay| count_field(bay, key)).collect();
    if counts.is_empty() {
        return None;
    }
    Some(counts.iter().fold(0u32, |acc, n| acc.saturating_add(*n)))
}

fn additional_property(record: &Value, key: &str) -> Option<u32> {
    record
        .get("additionalProperties")?
        .as_array()?
        .iter()
        .find(|prop| prop.get("key").and_then(Value::as_str) == Some(key))
        .and_then(|prop| count_field(prop, "value"))
}

/// Raw records served when the live feed is unusable.
pub(super) fn substitute_records() -> Vec<Value> {
    vec![
        json!({
            "id": "cp_001",
            "name": "Westminster Station Car Park",
            "lat": 51.4994,
            "lon": -0.1244,
            "bayCount": 100,
            "spacesAvailable": 25
        }),
        json!({
            "id": "cp_002",
            "name": "King's Cross Station Car Park",
            "lat": 51.5308,
            "lon": -0.1238,
            "bayCount": 150,
            "spacesAvailable": 80
        }),
        json!({
            "id": "cp_003",
            "name": "London Bridge Station Car Park",
            "lat": 51.5049,
            "lon": -0.0863,
            "bayCount": 75,
            "spacesAvailable": 12
        }),
    ]
}

/// Substitute data is never live, so occupancy is withheld.
pub(super) fn substitute_candidates() -> Vec<Candidate> {
    substitute_records()
        .iter()
        .filter_map(|record| normalize_record(record, false))
        .collect()
}
