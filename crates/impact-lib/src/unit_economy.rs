//! Unit economy: what one CPU, one GiB of memory or one GPU costs
//!
//! Three views are provided:
//! - [`daily_unit_costs`]: per-day unit cost per pricing model plus the
//!   blended `Σ cost / Σ quantity` across models
//! - [`unit_cost_summary`]: zero-exclusive period averages of the daily
//!   per-model unit costs, with a pooled `average`
//! - [`weighted_unit_costs`]: unit rates weighted by the quantities a period
//!   actually provisioned under each pricing model

use crate::efficiency::PricingAverage;
use crate::models::{PricingModel, PricingSplit, ResourceClass, Snapshot};
use crate::numeric::{percent_or_zero, ratio_or_zero};
use crate::partition::Partition;
use crate::unit_rate::{daily_unit_rate, estimate_unit_rates, UnitRateTable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use tracing::debug;

/// One value per billed component class
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSplit<T> {
    pub cpu: T,
    pub memory: T,
    pub gpu: T,
}

impl<T> ComponentSplit<T> {
    /// Build from a function over [`ResourceClass::COMPONENTS`]
    pub fn from_fn(mut f: impl FnMut(ResourceClass) -> T) -> Self {
        Self {
            cpu: f(ResourceClass::Cpu),
            memory: f(ResourceClass::Memory),
            gpu: f(ResourceClass::Gpu),
        }
    }

    /// `None` for the instance class
    pub fn get(&self, class: ResourceClass) -> Option<&T> {
        match class {
            ResourceClass::Cpu => Some(&self.cpu),
            ResourceClass::Memory => Some(&self.memory),
            ResourceClass::Gpu => Some(&self.gpu),
            ResourceClass::Instance => None,
        }
    }
}

/// Unit costs of a single day
///
/// Each class carries the per-model unit cost, and `average` holds the blended
/// unit cost of that day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUnitCost {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub by_class: ComponentSplit<PricingAverage>,
}

/// Period averages of the daily unit costs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitCostSummary {
    #[serde(flatten)]
    pub by_class: ComponentSplit<PricingAverage>,
    pub sample_days: usize,
}

/// Baseline against current unit costs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitEconomyComparison {
    pub baseline: UnitCostSummary,
    pub current: UnitCostSummary,
    /// `(baseline - current) / baseline × 100` of the pooled average;
    /// positive when a unit got cheaper
    pub impact_percent: ComponentSplit<f64>,
    /// The same impact for each pricing model on its own
    pub impact_by_model: ComponentSplit<PricingSplit<f64>>,
}

/// Everything the unit economy view shows for one partition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitEconomy {
    pub comparison: UnitEconomyComparison,
    /// Rates re-estimated on the current period
    pub current_rates: UnitRateTable,
    pub baseline_weighted: ComponentSplit<f64>,
    pub current_weighted: ComponentSplit<f64>,
}

/// Blended unit cost of one day: `Σ cost / Σ quantity` across pricing models
pub fn blended_unit_cost(snapshot: &Snapshot, class: ResourceClass) -> f64 {
    let ledger = snapshot.ledger(class);
    ratio_or_zero(ledger.total_cost.total(), ledger.quantity.total())
}

/// Per-day unit costs, in input order
pub fn daily_unit_costs<S: Borrow<Snapshot>>(snapshots: &[S]) -> Vec<DailyUnitCost> {
    snapshots
        .iter()
        .map(|s| {
            let snapshot = s.borrow();
            DailyUnitCost {
                timestamp: snapshot.timestamp,
                by_class: ComponentSplit::from_fn(|class| PricingAverage {
                    on_demand: daily_unit_rate(snapshot, class, PricingModel::OnDemand),
                    spot: daily_unit_rate(snapshot, class, PricingModel::Spot),
                    spot_fallback: daily_unit_rate(snapshot, class, PricingModel::SpotFallback),
                    average: blended_unit_cost(snapshot, class),
                }),
            }
        })
        .collect()
}

/// Zero-exclusive period averages of the per-model daily unit costs
pub fn unit_cost_summary<S: Borrow<Snapshot>>(snapshots: &[S]) -> UnitCostSummary {
    let by_class = ComponentSplit::from_fn(|class| {
        let series = |model: PricingModel| -> Vec<f64> {
            snapshots
                .iter()
                .map(|s| daily_unit_rate(s.borrow(), class, model))
                .collect()
        };
        PricingAverage::from_values(
            &series(PricingModel::OnDemand),
            &series(PricingModel::Spot),
            &series(PricingModel::SpotFallback),
        )
    });

    UnitCostSummary {
        by_class,
        sample_days: snapshots.len(),
    }
}

/// Quantity-weighted unit cost per class
///
/// `Σ_p rate(r,p) · Σqty(r,p) / Σ_p Σqty(r,p)`, 0 when nothing was provisioned.
pub fn weighted_unit_costs<S: Borrow<Snapshot>>(
    rates: &UnitRateTable,
    snapshots: &[S],
) -> ComponentSplit<f64> {
    ComponentSplit::from_fn(|class| {
        let (weighted, quantity) =
            PricingModel::ALL
                .iter()
                .fold((0.0, 0.0), |(weighted, quantity), model| {
                    let period_qty: f64 = snapshots
                        .iter()
                        .map(|s| s.borrow().quantity(class, *model))
                        .sum();
                    (
                        weighted + rates.rate(class, *model) * period_qty,
                        quantity + period_qty,
                    )
                });
        ratio_or_zero(weighted, quantity)
    })
}

/// Relative drop from `baseline` to `current`; 0 without a baseline
fn impact(baseline: f64, current: f64) -> f64 {
    percent_or_zero(baseline - current, baseline)
}

/// Compare unit costs across a partition; `None` when either side is empty
pub fn compare_unit_costs(partition: &Partition<'_>) -> Option<UnitEconomyComparison> {
    if !partition.is_complete() {
        return None;
    }

    let baseline = unit_cost_summary(&partition.baseline);
    let current = unit_cost_summary(&partition.current);
    let impact_percent = ComponentSplit::from_fn(|class| match (
        baseline.by_class.get(class),
        current.by_class.get(class),
    ) {
        (Some(b), Some(c)) => impact(b.average, c.average),
        _ => 0.0,
    });
    let impact_by_model = ComponentSplit::from_fn(|class| {
        match (baseline.by_class.get(class), current.by_class.get(class)) {
            (Some(b), Some(c)) => {
                PricingSplit::from_fn(|model| impact(b.get(model), c.get(model)))
            }
            _ => PricingSplit::default(),
        }
    });

    Some(UnitEconomyComparison {
        baseline,
        current,
        impact_percent,
        impact_by_model,
    })
}

/// Full unit economy view for a partition
///
/// `baseline_rates` are the rates the counterfactual uses; current rates are
/// re-estimated on the current period with the same estimator.
pub fn unit_economy(partition: &Partition<'_>, baseline_rates: &UnitRateTable) -> Option<UnitEconomy> {
    let Some(comparison) = compare_unit_costs(partition) else {
        debug!(
            event = "metric_unavailable",
            reason = "empty_period",
            metric = "unit_economy",
            baseline_days = partition.baseline.len(),
            current_days = partition.current.len(),
            "Unit economy needs both periods"
        );
        return None;
    };
    let current_rates = estimate_unit_rates(&partition.current)?;

    Some(UnitEconomy {
        comparison,
        baseline_weighted: weighted_unit_costs(baseline_rates, &partition.baseline),
        current_weighted: weighted_unit_costs(&current_rates, &partition.current),
        current_rates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::AutomationBoundary;
    use chrono::{Duration, TimeZone};

    fn day(i: i64) -> Snapshot {
        Snapshot::new(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::days(i))
    }

    fn cpu(snapshot: Snapshot, model: PricingModel, qty: f64, cost: f64) -> Snapshot {
        snapshot
            .with_quantity(ResourceClass::Cpu, model, qty)
            .with_total_cost(ResourceClass::Cpu, model, cost)
    }

    #[test]
    fn test_blended_is_total_over_total() {
        let snapshot = cpu(
            cpu(day(0), PricingModel::OnDemand, 10.0, 100.0),
            PricingModel::Spot,
            30.0,
            60.0,
        );
        let daily = daily_unit_costs(&[snapshot]);
        let cpu_cost = daily[0].by_class.cpu;

        assert_eq!(cpu_cost.on_demand, 10.0);
        assert_eq!(cpu_cost.spot, 2.0);
        assert_eq!(cpu_cost.spot_fallback, 0.0);
        // 160 / 40, not the mean of the per-model costs
        assert_eq!(cpu_cost.average, 4.0);
        assert_eq!(daily[0].by_class.gpu.average, 0.0);
    }

    #[test]
    fn test_summary_excludes_days_without_quantity() {
        let snapshots = vec![
            cpu(day(0), PricingModel::OnDemand, 10.0, 100.0),
            day(1),
            cpu(day(2), PricingModel::OnDemand, 10.0, 80.0),
        ];
        let summary = unit_cost_summary(&snapshots);
        assert_eq!(summary.by_class.cpu.on_demand, 9.0);
        assert_eq!(summary.by_class.cpu.average, 9.0);
        assert_eq!(summary.sample_days, 3);
    }

    #[test]
    fn test_weighted_by_period_quantity() {
        let baseline = vec![
            cpu(cpu(day(0), PricingModel::OnDemand, 10.0, 100.0), PricingModel::Spot, 10.0, 30.0),
        ];
        let rates = estimate_unit_rates(&baseline).unwrap();
        let current = vec![cpu(cpu(day(5), PricingModel::OnDemand, 5.0, 0.0), PricingModel::Spot, 15.0, 0.0)];

        let weighted = weighted_unit_costs(&rates, &current);
        // (10·5 + 3·15) / 20
        assert_eq!(weighted.cpu, 4.75);
        assert_eq!(weighted.memory, 0.0);
    }

    #[test]
    fn test_comparison_impact() {
        let snapshots = vec![
            cpu(day(0), PricingModel::OnDemand, 10.0, 100.0),
            cpu(day(1), PricingModel::OnDemand, 10.0, 80.0),
        ];
        let split = AutomationBoundary::new(snapshots[1].timestamp).split(&snapshots);
        let comparison = compare_unit_costs(&split).unwrap();

        assert!((comparison.impact_percent.cpu - 20.0).abs() < 1e-9);
        assert_eq!(comparison.impact_percent.gpu, 0.0);
    }

    #[test]
    fn test_impact_per_pricing_model() {
        let snapshots = vec![
            cpu(cpu(day(0), PricingModel::OnDemand, 10.0, 100.0), PricingModel::Spot, 10.0, 50.0),
            cpu(cpu(day(1), PricingModel::OnDemand, 10.0, 80.0), PricingModel::Spot, 10.0, 50.0),
        ];
        let split = AutomationBoundary::new(snapshots[1].timestamp).split(&snapshots);
        let comparison = compare_unit_costs(&split).unwrap();

        let cpu_impact = comparison.impact_by_model.cpu;
        assert!((cpu_impact.on_demand - 20.0).abs() < 1e-9);
        assert_eq!(cpu_impact.spot, 0.0);
        assert_eq!(cpu_impact.spot_fallback, 0.0);
        // Pooled 7.5 → 6.5
        assert!((comparison.impact_percent.cpu - 100.0 / 7.5).abs() < 1e-9);
        assert_eq!(comparison.impact_by_model.memory, PricingSplit::default());
    }

    #[test]
    fn test_unit_economy_unavailable_without_baseline() {
        let snapshots = vec![cpu(day(0), PricingModel::OnDemand, 10.0, 100.0)];
        let split = AutomationBoundary::new(snapshots[0].timestamp).split(&snapshots);
        let rates = estimate_unit_rates(&snapshots).unwrap();
        assert!(unit_economy(&split, &rates).is_none());
    }

    #[test]
    fn test_unit_economy_reestimates_current_rates() {
        let snapshots = vec![
            cpu(day(0), PricingModel::OnDemand, 10.0, 100.0),
            cpu(day(1), PricingModel::OnDemand, 10.0, 50.0),
        ];
        let split = AutomationBoundary::new(snapshots[1].timestamp).split(&snapshots);
        let baseline_rates = estimate_unit_rates(&split.baseline).unwrap();
        let view = unit_economy(&split, &baseline_rates).unwrap();

        assert_eq!(view.current_rates.rate(ResourceClass::Cpu, PricingModel::OnDemand), 5.0);
        assert_eq!(view.baseline_weighted.cpu, 10.0);
        assert_eq!(view.current_weighted.cpu, 5.0);
    }
}
