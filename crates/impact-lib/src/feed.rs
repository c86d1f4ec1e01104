//! Boundary parsing of the daily snapshot feed
//!
//! The feed is a JSON array of per-day records (or an `{"items": [...]}`
//! envelope around one). Only the top-level shape and each record's
//! `timestamp` are validated here; every numeric field goes through
//! [`numeric_or_zero`](crate::numeric::numeric_or_zero) and can never fail.

use crate::models::{PricingSplit, ResourceLedger, Snapshot};
use crate::numeric::numeric_or_zero;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Rejections for malformed top-level input
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot feed must be a JSON array of records or an object with an `items` array")]
    NotAnArray,

    #[error("snapshot record {index} must be a JSON object")]
    NotAnObject { index: usize },

    #[error("snapshot record {index} is missing the required `timestamp` field")]
    MissingTimestamp { index: usize },

    #[error("snapshot record {index} has an invalid `timestamp` {value:?}; expected an ISO-8601 date or date-time")]
    InvalidTimestamp { index: usize, value: String },

    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a feed document from a JSON string
pub fn parse_snapshots_str(input: &str) -> Result<Vec<Snapshot>, SnapshotError> {
    let value: Value = serde_json::from_str(input)?;
    parse_snapshots(&value)
}

/// Parse a feed document that has already been decoded to JSON
pub fn parse_snapshots(value: &Value) -> Result<Vec<Snapshot>, SnapshotError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("items") {
            Some(Value::Array(items)) => items,
            _ => return Err(SnapshotError::NotAnArray),
        },
        _ => return Err(SnapshotError::NotAnArray),
    };

    let snapshots = items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_record(index, item))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        event = "snapshot_feed_parsed",
        records = snapshots.len(),
        "Parsed snapshot feed"
    );

    Ok(snapshots)
}

/// Parse an ISO-8601 instant.
///
/// Accepts RFC 3339, a date-time without offset (taken as UTC), or a bare
/// date (midnight UTC).
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let s = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_record(index: usize, item: &Value) -> Result<Snapshot, SnapshotError> {
    let object = item
        .as_object()
        .ok_or(SnapshotError::NotAnObject { index })?;

    let timestamp = match object.get("timestamp") {
        None | Some(Value::Null) => return Err(SnapshotError::MissingTimestamp { index }),
        Some(Value::String(raw)) => {
            parse_timestamp(raw).ok_or_else(|| SnapshotError::InvalidTimestamp {
                index,
                value: raw.clone(),
            })?
        }
        Some(other) => {
            return Err(SnapshotError::InvalidTimestamp {
                index,
                value: other.to_string(),
            })
        }
    };

    let record = FeedRecord::deserialize(item)?;
    Ok(record.into_snapshot(timestamp))
}

/// Wire shape of one feed record
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FeedRecord {
    #[serde(deserialize_with = "numeric_or_zero")]
    cpu_count_on_demand: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    cpu_count_spot: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    cpu_count_spot_fallback: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    cpu_used_on_demand: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    cpu_used_spot: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    cpu_used_spot_fallback: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    total_cpu_cost_on_demand: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    total_cpu_cost_spot: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    total_cpu_cost_spot_fallback: f64,

    #[serde(deserialize_with = "numeric_or_zero")]
    ram_gib_on_demand: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    ram_gib_spot: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    ram_gib_spot_fallback: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    ram_used_gib_on_demand: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    ram_used_gib_spot: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    ram_used_gib_spot_fallback: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    total_ram_cost_on_demand: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    total_ram_cost_spot: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    total_ram_cost_spot_fallback: f64,

    #[serde(deserialize_with = "numeric_or_zero")]
    gpu_count_on_demand: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    gpu_count_spot: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    gpu_count_spot_fallback: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    total_gpu_cost_on_demand: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    total_gpu_cost_spot: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    total_gpu_cost_spot_fallback: f64,

    #[serde(deserialize_with = "numeric_or_zero")]
    instance_count_on_demand: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    instance_count_spot: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    instance_count_spot_fallback: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    cost_on_demand: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    cost_spot: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    cost_spot_fallback: f64,

    #[serde(deserialize_with = "numeric_or_zero")]
    cpu_overprovisioning_on_demand_percent: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    cpu_overprovisioning_spot_percent: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    cpu_overprovisioning_spot_fallback_percent: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    ram_overprovisioning_on_demand_percent: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    ram_overprovisioning_spot_percent: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    ram_overprovisioning_spot_fallback_percent: f64,
    #[serde(deserialize_with = "numeric_or_zero")]
    storage_overprovisioning_percent: f64,
}

impl FeedRecord {
    fn into_snapshot(self, timestamp: DateTime<Utc>) -> Snapshot {
        Snapshot {
            timestamp,
            cpu: ResourceLedger {
                quantity: PricingSplit::new(
                    self.cpu_count_on_demand,
                    self.cpu_count_spot,
                    self.cpu_count_spot_fallback,
                ),
                total_cost: PricingSplit::new(
                    self.total_cpu_cost_on_demand,
                    self.total_cpu_cost_spot,
                    self.total_cpu_cost_spot_fallback,
                ),
            },
            memory: ResourceLedger {
                quantity: PricingSplit::new(
                    self.ram_gib_on_demand,
                    self.ram_gib_spot,
                    self.ram_gib_spot_fallback,
                ),
                total_cost: PricingSplit::new(
                    self.total_ram_cost_on_demand,
                    self.total_ram_cost_spot,
                    self.total_ram_cost_spot_fallback,
                ),
            },
            gpu: ResourceLedger {
                quantity: PricingSplit::new(
                    self.gpu_count_on_demand,
                    self.gpu_count_spot,
                    self.gpu_count_spot_fallback,
                ),
                total_cost: PricingSplit::new(
                    self.total_gpu_cost_on_demand,
                    self.total_gpu_cost_spot,
                    self.total_gpu_cost_spot_fallback,
                ),
            },
            instance: ResourceLedger {
                quantity: PricingSplit::new(
                    self.instance_count_on_demand,
                    self.instance_count_spot,
                    self.instance_count_spot_fallback,
                ),
                total_cost: PricingSplit::new(
                    self.cost_on_demand,
                    self.cost_spot,
                    self.cost_spot_fallback,
                ),
            },
            cpu_used: PricingSplit::new(
                self.cpu_used_on_demand,
                self.cpu_used_spot,
                self.cpu_used_spot_fallback,
            ),
            memory_used_gib: PricingSplit::new(
                self.ram_used_gib_on_demand,
                self.ram_used_gib_spot,
                self.ram_used_gib_spot_fallback,
            ),
            cpu_overprovisioning_percent: PricingSplit::new(
                self.cpu_overprovisioning_on_demand_percent,
                self.cpu_overprovisioning_spot_percent,
                self.cpu_overprovisioning_spot_fallback_percent,
            ),
            memory_overprovisioning_percent: PricingSplit::new(
                self.ram_overprovisioning_on_demand_percent,
                self.ram_overprovisioning_spot_percent,
                self.ram_overprovisioning_spot_fallback_percent,
            ),
            storage_overprovisioning_percent: self.storage_overprovisioning_percent,
        }
    }
}
