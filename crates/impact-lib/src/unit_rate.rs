//! Baseline unit-rate estimation
//!
//! Estimates the average price of one unit of each resource class under each
//! pricing model from a period of daily snapshots. The per-day ratio
//! `totalCost / quantity` is averaged over *every* day of the period, with
//! days that had no quantity contributing 0. A cell whose quantity is zero on
//! every day therefore gets rate 0 (priced as free), which under-estimates the
//! real unit price when a pricing model was simply unused.

use crate::models::{ClassSplit, PricingModel, PricingSplit, ResourceClass, Snapshot};
use crate::numeric::{mean_over, ratio_or_zero};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use tracing::debug;

/// Unit price of each resource class for one pricing model
pub type ResourceRates = ClassSplit<f64>;

/// Average unit price per (resource class, pricing model)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitRateTable {
    #[serde(flatten)]
    pub by_model: PricingSplit<ResourceRates>,
    /// Number of snapshots the rates were averaged over
    pub sample_days: usize,
}

impl UnitRateTable {
    /// Build a table from explicit rates
    pub fn from_rates(by_model: PricingSplit<ResourceRates>) -> Self {
        Self {
            by_model,
            sample_days: 0,
        }
    }

    pub fn rate(&self, class: ResourceClass, model: PricingModel) -> f64 {
        *self.by_model.get(model).get(class)
    }
}

/// Estimate unit rates over a period; `None` for an empty period
pub fn estimate_unit_rates<S: Borrow<Snapshot>>(snapshots: &[S]) -> Option<UnitRateTable> {
    if snapshots.is_empty() {
        debug!(
            event = "metric_unavailable",
            reason = "empty_period",
            metric = "unit_rates",
            "No snapshots to estimate unit rates from"
        );
        return None;
    }

    let mut by_model: PricingSplit<ResourceRates> = PricingSplit::default();
    for model in PricingModel::ALL {
        for class in ResourceClass::ALL {
            let sum: f64 = snapshots
                .iter()
                .map(|s| daily_unit_rate(s.borrow(), class, model))
                .sum();
            *by_model.get_mut(model).get_mut(class) = mean_over(sum, snapshots.len()).max(0.0);
        }
    }

    Some(UnitRateTable {
        by_model,
        sample_days: snapshots.len(),
    })
}

/// Per-day unit price, 0 when nothing of that class was provisioned
#[inline]
pub fn daily_unit_rate(snapshot: &Snapshot, class: ResourceClass, model: PricingModel) -> f64 {
    ratio_or_zero(
        snapshot.total_cost(class, model),
        snapshot.quantity(class, model),
    )
}
