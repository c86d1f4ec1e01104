//! Counterfactual cost projection
//!
//! Prices the quantities that were actually provisioned on a day at the
//! baseline unit rates: "what today would have cost without automation".

use crate::models::{ClassSplit, PricingModel, PricingSplit, ResourceClass, Snapshot};
use crate::unit_rate::UnitRateTable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// Counterfactual cost of one day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyProjection {
    pub timestamp: DateTime<Utc>,
    /// Per class, summed over pricing models. The instance entry prices whole
    /// instances and is reported alongside, not added to the total.
    pub by_class: ClassSplit<f64>,
    /// Per pricing model, CPU + memory + GPU
    pub by_model: PricingSplit<f64>,
    /// CPU + memory + GPU across all pricing models
    pub total: f64,
}

/// `quantity(class, model) × rate(class, model)` for one day
#[inline]
pub fn contribution(
    snapshot: &Snapshot,
    rates: &UnitRateTable,
    class: ResourceClass,
    model: PricingModel,
) -> f64 {
    snapshot.quantity(class, model) * rates.rate(class, model)
}

/// Project one day
pub fn project_day(snapshot: &Snapshot, rates: &UnitRateTable) -> DailyProjection {
    let class_total = |class: ResourceClass| -> f64 {
        PricingModel::ALL
            .iter()
            .map(|model| contribution(snapshot, rates, class, *model))
            .sum()
    };

    let by_class = ClassSplit::from_fn(class_total);

    let by_model = PricingSplit::from_fn(|model| {
        ResourceClass::COMPONENTS
            .iter()
            .map(|class| contribution(snapshot, rates, *class, model))
            .sum()
    });

    DailyProjection {
        timestamp: snapshot.timestamp,
        by_class,
        total: by_model.total(),
        by_model,
    }
}

/// Project every day of a collection, in input order
pub fn project<S: Borrow<Snapshot>>(snapshots: &[S], rates: &UnitRateTable) -> Vec<DailyProjection> {
    snapshots
        .iter()
        .map(|s| project_day(s.borrow(), rates))
        .collect()
}

/// Total counterfactual cost of a collection; 0 when empty
pub fn project_total<S: Borrow<Snapshot>>(snapshots: &[S], rates: &UnitRateTable) -> f64 {
    snapshots
        .iter()
        .fold(0.0, |sum, s| sum + project_day(s.borrow(), rates).total)
}
