//! Overprovisioning and utilization aggregates
//!
//! Percentages are averaged zero-exclusively: a value of 0 (or anything
//! non-finite) means "no data for that pricing model on that day" and is
//! dropped before averaging. The combined `average` pools the surviving
//! values of all three pricing models rather than averaging the three means.
//!
//! Utilization is derived per day as `used / quantity × 100`; days without
//! quantity yield no value.

use crate::models::{PricingModel, ResourceClass, Snapshot};
use crate::numeric::{mean_nonzero, percent_or_zero};
use crate::partition::Partition;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use tracing::debug;

/// Which percentage an aggregate is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricFamily {
    /// Externally supplied overprovisioning percentages
    Overprovisioning,
    /// `used / quantity × 100`
    Utilization,
}

impl MetricFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricFamily::Overprovisioning => "overprovisioning",
            MetricFamily::Utilization => "utilization",
        }
    }

    /// Whether a rising average is an improvement
    pub fn higher_is_better(&self) -> bool {
        matches!(self, MetricFamily::Utilization)
    }
}

impl fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Zero-exclusive averages per pricing model plus the pooled average
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingAverage {
    pub on_demand: f64,
    pub spot: f64,
    pub spot_fallback: f64,
    pub average: f64,
}

impl PricingAverage {
    /// Average per-model value series
    pub fn from_values(on_demand: &[f64], spot: &[f64], spot_fallback: &[f64]) -> Self {
        Self {
            on_demand: mean_nonzero(on_demand.iter().copied()),
            spot: mean_nonzero(spot.iter().copied()),
            spot_fallback: mean_nonzero(spot_fallback.iter().copied()),
            average: mean_nonzero(
                on_demand
                    .iter()
                    .chain(spot.iter())
                    .chain(spot_fallback.iter())
                    .copied(),
            ),
        }
    }

    /// A scalar metric with no pricing split reports the same value everywhere
    pub fn uniform(value: f64) -> Self {
        Self {
            on_demand: value,
            spot: value,
            spot_fallback: value,
            average: value,
        }
    }

    pub fn get(&self, model: PricingModel) -> f64 {
        match model {
            PricingModel::OnDemand => self.on_demand,
            PricingModel::Spot => self.spot,
            PricingModel::SpotFallback => self.spot_fallback,
        }
    }
}

/// Aggregate of one metric family over one period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EfficiencyAggregate {
    pub family: MetricFamily,
    pub cpu: PricingAverage,
    pub memory: PricingAverage,
    /// Only overprovisioning carries a storage figure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<PricingAverage>,
    pub sample_days: usize,
}

impl EfficiencyAggregate {
    /// Pooled average for a resource; storage is addressed separately
    pub fn resource(&self, class: ResourceClass) -> Option<&PricingAverage> {
        match class {
            ResourceClass::Cpu => Some(&self.cpu),
            ResourceClass::Memory => Some(&self.memory),
            _ => None,
        }
    }
}

/// Per-day value of `family` for a class and pricing model
///
/// `None` when the snapshot carries no such value (utilization without
/// quantity, or a class without the metric).
pub fn daily_value(
    snapshot: &Snapshot,
    family: MetricFamily,
    class: ResourceClass,
    model: PricingModel,
) -> Option<f64> {
    match family {
        MetricFamily::Overprovisioning => snapshot.overprovisioning(class, model),
        MetricFamily::Utilization => {
            let used = snapshot.used(class, model)?;
            let quantity = snapshot.quantity(class, model);
            (quantity > 0.0).then(|| percent_or_zero(used, quantity))
        }
    }
}

/// Aggregate `family` over a collection
pub fn aggregate<S: Borrow<Snapshot>>(snapshots: &[S], family: MetricFamily) -> EfficiencyAggregate {
    let class_average = |class: ResourceClass| -> PricingAverage {
        let series = |model: PricingModel| -> Vec<f64> {
            snapshots
                .iter()
                .filter_map(|s| daily_value(s.borrow(), family, class, model))
                .collect()
        };
        PricingAverage::from_values(
            &series(PricingModel::OnDemand),
            &series(PricingModel::Spot),
            &series(PricingModel::SpotFallback),
        )
    };

    let storage = match family {
        MetricFamily::Overprovisioning => Some(PricingAverage::uniform(mean_nonzero(
            snapshots
                .iter()
                .map(|s| s.borrow().storage_overprovisioning_percent),
        ))),
        MetricFamily::Utilization => None,
    };

    EfficiencyAggregate {
        family,
        cpu: class_average(ResourceClass::Cpu),
        memory: class_average(ResourceClass::Memory),
        storage,
        sample_days: snapshots.len(),
    }
}

/// Movement of a pooled average between the two periods
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EfficiencyChange {
    pub baseline: f64,
    pub current: f64,
    /// `current - baseline`, in percentage points
    pub absolute: f64,
    /// `absolute / baseline × 100`, 0 when the baseline is 0
    pub relative_percent: f64,
    pub improved: bool,
}

/// Baseline and current aggregates of one metric family
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EfficiencyComparison {
    pub family: MetricFamily,
    pub baseline: EfficiencyAggregate,
    pub current: EfficiencyAggregate,
}

impl EfficiencyComparison {
    /// Change of the pooled CPU or memory average
    pub fn change(&self, class: ResourceClass) -> Option<EfficiencyChange> {
        let baseline = self.baseline.resource(class)?.average;
        let current = self.current.resource(class)?.average;
        Some(self.change_between(baseline, current))
    }

    /// Change of the storage average; `None` for utilization
    pub fn storage_change(&self) -> Option<EfficiencyChange> {
        let baseline = self.baseline.storage?.average;
        let current = self.current.storage?.average;
        Some(self.change_between(baseline, current))
    }

    fn change_between(&self, baseline: f64, current: f64) -> EfficiencyChange {
        let absolute = current - baseline;
        let relative_percent = if baseline != 0.0 {
            absolute / baseline * 100.0
        } else {
            0.0
        };
        let improved = if self.family.higher_is_better() {
            absolute > 0.0
        } else {
            absolute < 0.0
        };
        EfficiencyChange {
            baseline,
            current,
            absolute,
            relative_percent,
            improved,
        }
    }
}

/// Aggregate `family` for both sides of a partition
///
/// `None` when either side is empty.
pub fn compare(partition: &Partition<'_>, family: MetricFamily) -> Option<EfficiencyComparison> {
    if !partition.is_complete() {
        debug!(
            event = "metric_unavailable",
            reason = "empty_period",
            metric = %family,
            baseline_days = partition.baseline.len(),
            current_days = partition.current.len(),
            "Efficiency comparison needs both periods"
        );
        return None;
    }

    Some(EfficiencyComparison {
        family,
        baseline: aggregate(&partition.baseline, family),
        current: aggregate(&partition.current, family),
    })
}
