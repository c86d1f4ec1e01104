//! Actual daily cost series

use crate::models::{PricingModel, PricingSplit, Snapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// Actual billed cost of one day, split by pricing model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCost {
    pub timestamp: DateTime<Utc>,
    /// CPU + memory + GPU cost per pricing model
    pub by_model: PricingSplit<f64>,
    pub total: f64,
}

impl DailyCost {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let by_model = PricingSplit::from_fn(|model: PricingModel| snapshot.actual_cost_for(model));
        Self {
            timestamp: snapshot.timestamp,
            total: by_model.total(),
            by_model,
        }
    }
}

/// Actual cost for every day of a collection, in input order
pub fn daily_costs<S: Borrow<Snapshot>>(snapshots: &[S]) -> Vec<DailyCost> {
    snapshots
        .iter()
        .map(|s| DailyCost::from_snapshot(s.borrow()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResourceClass;
    use chrono::TimeZone;

    #[test]
    fn test_daily_cost_split() {
        let snapshot = Snapshot::new(Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap())
            .with_total_cost(ResourceClass::Cpu, PricingModel::OnDemand, 40.0)
            .with_total_cost(ResourceClass::Memory, PricingModel::OnDemand, 10.0)
            .with_total_cost(ResourceClass::Cpu, PricingModel::Spot, 12.0)
            .with_total_cost(ResourceClass::Gpu, PricingModel::SpotFallback, 30.0)
            .with_total_cost(ResourceClass::Instance, PricingModel::Spot, 999.0);

        let costs = daily_costs(&[snapshot]);
        assert_eq!(costs.len(), 1);
        assert_eq!(costs[0].by_model, PricingSplit::new(50.0, 12.0, 30.0));
        assert_eq!(costs[0].total, 92.0);
    }
}
