//! One-shot impact analysis
//!
//! [`ImpactAnalyzer`] computes every derived structure for a pair of snapshot
//! collections (cost feed and efficiency feed) around one cutoff and bundles
//! them into an [`ImpactReport`]. Collections are sorted by timestamp first, so
//! callers may pass them in any order.
//!
//! Everything that needs a cutoff, a baseline or a current period is an
//! `Option`: `None` means "unavailable", never an error.

use crate::costs::{daily_costs, DailyCost};
use crate::counterfactual::{project, DailyProjection};
use crate::efficiency::{compare, EfficiencyComparison, MetricFamily};
use crate::models::Snapshot;
use crate::partition::{partition, Partition};
use crate::rollup::{build_monthly_rollups, MonthlyRollup};
use crate::savings::{daily_savings, summarize, DailySavings, SavingsSummary};
use crate::spot_adoption::{daily_cpu_mix, spot_adoption, CpuMix, SpotAdoption};
use crate::unit_economy::{daily_unit_costs, unit_economy, DailyUnitCost, UnitEconomy};
use crate::unit_rate::{estimate_unit_rates, UnitRateTable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sizes of the two periods around the cutoff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSizes {
    pub cutoff: DateTime<Utc>,
    pub baseline_days: usize,
    pub current_days: usize,
}

impl From<&Partition<'_>> for PeriodSizes {
    fn from(partition: &Partition<'_>) -> Self {
        Self {
            cutoff: partition.cutoff(),
            baseline_days: partition.baseline.len(),
            current_days: partition.current.len(),
        }
    }
}

/// Every derived structure for one `(collection, cutoff, now)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactReport {
    pub generated_at: DateTime<Utc>,
    pub snapshot_count: usize,
    pub periods: Option<PeriodSizes>,
    pub unit_rates: Option<UnitRateTable>,
    pub daily_costs: Vec<DailyCost>,
    pub daily_cpu_mix: Vec<CpuMix>,
    pub daily_unit_costs: Vec<DailyUnitCost>,
    pub daily_projections: Option<Vec<DailyProjection>>,
    pub daily_savings: Option<Vec<DailySavings>>,
    pub monthly_rollups: Option<Vec<MonthlyRollup>>,
    pub savings: Option<SavingsSummary>,
    pub overprovisioning: Option<EfficiencyComparison>,
    pub utilization: Option<EfficiencyComparison>,
    pub spot_adoption: Option<SpotAdoption>,
    pub unit_economy: Option<UnitEconomy>,
}

impl ImpactReport {
    /// Number of cutoff-dependent structures that came out unavailable
    pub fn unavailable_count(&self) -> usize {
        [
            self.periods.is_none(),
            self.unit_rates.is_none(),
            self.daily_projections.is_none(),
            self.daily_savings.is_none(),
            self.monthly_rollups.is_none(),
            self.savings.is_none(),
            self.overprovisioning.is_none(),
            self.utilization.is_none(),
            self.spot_adoption.is_none(),
            self.unit_economy.is_none(),
        ]
        .iter()
        .filter(|missing| **missing)
        .count()
    }
}

/// Computes [`ImpactReport`]s for a fixed cutoff and reference time
#[derive(Debug, Clone, Copy)]
pub struct ImpactAnalyzer {
    cutoff: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
}

impl ImpactAnalyzer {
    /// `now` decides which month is extrapolated
    pub fn new(cutoff: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        Self { cutoff, now }
    }

    /// Analyze a cost feed and an efficiency feed
    ///
    /// Both feeds share the snapshot shape; pass the same collection twice when
    /// one feed carries everything.
    pub fn analyze(&self, cost: &[Snapshot], efficiency: &[Snapshot]) -> ImpactReport {
        let cost = sorted(cost);
        let efficiency = sorted(efficiency);

        let cost_split = partition(&cost, self.cutoff);
        let efficiency_split = partition(&efficiency, self.cutoff);

        let unit_rates = cost_split
            .as_ref()
            .and_then(|split| estimate_unit_rates(&split.baseline));

        let (daily_projections, daily_savings_series, monthly_rollups, savings) =
            match (cost_split.as_ref(), unit_rates.as_ref()) {
                (Some(split), Some(rates)) if split.is_complete() => {
                    let projections = project(&split.current, rates);
                    let series = daily_savings(&daily_costs(&split.current), &projections);
                    let months =
                        build_monthly_rollups(&cost, &split.boundary, rates, self.now);
                    let summary = summarize(&series, &months);
                    (Some(projections), Some(series), Some(months), Some(summary))
                }
                _ => (None, None, None, None),
            };

        let report = ImpactReport {
            generated_at: self.now,
            snapshot_count: cost.len(),
            periods: cost_split.as_ref().map(PeriodSizes::from),
            daily_costs: daily_costs(&cost),
            daily_cpu_mix: daily_cpu_mix(&cost),
            daily_unit_costs: daily_unit_costs(&cost),
            daily_projections,
            daily_savings: daily_savings_series,
            monthly_rollups,
            savings,
            overprovisioning: efficiency_split
                .as_ref()
                .and_then(|split| compare(split, MetricFamily::Overprovisioning)),
            utilization: efficiency_split
                .as_ref()
                .and_then(|split| compare(split, MetricFamily::Utilization)),
            spot_adoption: cost_split.as_ref().and_then(spot_adoption),
            unit_economy: match (cost_split.as_ref(), unit_rates.as_ref()) {
                (Some(split), Some(rates)) => unit_economy(split, rates),
                _ => None,
            },
            unit_rates,
        };

        debug!(
            event = "impact_report_computed",
            snapshots = report.snapshot_count,
            efficiency_snapshots = efficiency.len(),
            unavailable = report.unavailable_count(),
            "Computed impact report"
        );

        report
    }
}

fn sorted(snapshots: &[Snapshot]) -> Vec<Snapshot> {
    let mut sorted = snapshots.to_vec();
    sorted.sort_by_key(|s| s.timestamp);
    sorted
}
