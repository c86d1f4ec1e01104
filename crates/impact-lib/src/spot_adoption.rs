//! Spot adoption: share of CPU capacity served by spot pricing

use crate::models::{PricingModel, PricingSplit, ResourceClass, Snapshot};
use crate::numeric::percent_or_zero;
use crate::partition::Partition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use tracing::debug;

/// Spot share before and after the cutoff
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotAdoption {
    /// Percent of baseline CPU capacity on spot
    pub baseline_rate: f64,
    /// Percent of current CPU capacity on spot
    pub current_rate: f64,
    /// `current_rate - baseline_rate`, in percentage points
    pub change: f64,
}

/// CPU capacity of one day per pricing model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuMix {
    pub timestamp: DateTime<Utc>,
    pub by_model: PricingSplit<f64>,
    pub total: f64,
    pub spot_percent: f64,
}

/// `Σ spot CPU / Σ total CPU × 100` over a period; 0 without capacity
///
/// Spot-with-fallback capacity counts toward the total only.
pub fn spot_rate<S: Borrow<Snapshot>>(snapshots: &[S]) -> f64 {
    let (spot, total) = snapshots.iter().fold((0.0, 0.0), |(spot, total), s| {
        let cpu = &s.borrow().cpu.quantity;
        (spot + cpu.spot, total + cpu.total())
    });
    percent_or_zero(spot, total)
}

/// Spot adoption across a partition; `None` when either period is empty
pub fn spot_adoption(partition: &Partition<'_>) -> Option<SpotAdoption> {
    if !partition.is_complete() {
        debug!(
            event = "metric_unavailable",
            reason = "empty_period",
            metric = "spot_adoption",
            baseline_days = partition.baseline.len(),
            current_days = partition.current.len(),
            "Spot adoption needs both periods"
        );
        return None;
    }

    let baseline_rate = spot_rate(&partition.baseline);
    let current_rate = spot_rate(&partition.current);
    Some(SpotAdoption {
        baseline_rate,
        current_rate,
        change: current_rate - baseline_rate,
    })
}

/// Per-day CPU capacity split, in input order
pub fn daily_cpu_mix<S: Borrow<Snapshot>>(snapshots: &[S]) -> Vec<CpuMix> {
    snapshots
        .iter()
        .map(|s| {
            let snapshot = s.borrow();
            let by_model =
                PricingSplit::from_fn(|model| snapshot.quantity(ResourceClass::Cpu, model));
            let total = by_model.total();
            CpuMix {
                timestamp: snapshot.timestamp,
                spot_percent: percent_or_zero(*by_model.get(PricingModel::Spot), total),
                by_model,
                total,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::AutomationBoundary;
    use chrono::{Duration, TimeZone};

    fn day(i: i64, on_demand: f64, spot: f64, fallback: f64) -> Snapshot {
        Snapshot::new(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::days(i))
            .with_quantity(ResourceClass::Cpu, PricingModel::OnDemand, on_demand)
            .with_quantity(ResourceClass::Cpu, PricingModel::Spot, spot)
            .with_quantity(ResourceClass::Cpu, PricingModel::SpotFallback, fallback)
    }

    #[test]
    fn test_rate_is_capacity_weighted() {
        let snapshots = vec![day(0, 10.0, 0.0, 0.0), day(1, 10.0, 20.0, 10.0)];
        // 20 / 50, not the mean of daily shares
        assert!((spot_rate(&snapshots) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_capacity_is_zero_rate() {
        let snapshots = vec![day(0, 0.0, 0.0, 0.0)];
        assert_eq!(spot_rate(&snapshots), 0.0);
    }

    #[test]
    fn test_identical_ratios_have_zero_change() {
        let snapshots = vec![
            day(0, 30.0, 10.0, 0.0),
            day(1, 60.0, 20.0, 0.0),
            day(2, 3.0, 1.0, 0.0),
        ];
        let cutoff = snapshots[1].timestamp;
        let split = AutomationBoundary::new(cutoff).split(&snapshots);

        let adoption = spot_adoption(&split).unwrap();
        assert!((adoption.baseline_rate - 25.0).abs() < 1e-9);
        assert!(adoption.change.abs() < 1e-9);
    }

    #[test]
    fn test_empty_period_is_unavailable() {
        let snapshots = vec![day(0, 1.0, 1.0, 0.0)];
        let before = AutomationBoundary::new(snapshots[0].timestamp - Duration::days(1));
        assert!(spot_adoption(&before.split(&snapshots)).is_none());

        let after = AutomationBoundary::new(snapshots[0].timestamp + Duration::days(1));
        assert!(spot_adoption(&after.split(&snapshots)).is_none());
    }

    #[test]
    fn test_zero_adoption_is_not_unavailable() {
        let snapshots = vec![day(0, 5.0, 0.0, 0.0), day(1, 5.0, 0.0, 0.0)];
        let split = AutomationBoundary::new(snapshots[1].timestamp).split(&snapshots);
        let adoption = spot_adoption(&split).unwrap();
        assert_eq!(adoption.baseline_rate, 0.0);
        assert_eq!(adoption.current_rate, 0.0);
    }

    #[test]
    fn test_daily_mix() {
        let mix = daily_cpu_mix(&[day(0, 6.0, 3.0, 1.0), day(1, 0.0, 0.0, 0.0)]);
        assert_eq!(mix[0].total, 10.0);
        assert!((mix[0].spot_percent - 30.0).abs() < 1e-9);
        assert_eq!(mix[1].spot_percent, 0.0);
    }
}
