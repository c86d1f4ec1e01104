//! Automation impact analytics for cluster cost snapshots
//!
//! This crate provides the core functionality for:
//! - Parsing the daily snapshot feed with partial-data tolerance
//! - Splitting snapshots around the automation cutoff
//! - Baseline unit rates and counterfactual cost projection
//! - Daily, monthly and summary savings with current-month extrapolation
//! - Overprovisioning, utilization, spot adoption and unit economy
//! - Metrics and structured logging for analysis runs
//!
//! Every computation is a pure function of its inputs. Anything that needs a
//! cutoff or a non-empty period returns `Option`, with `None` meaning
//! "unavailable".

pub mod costs;
pub mod counterfactual;
pub mod efficiency;
pub mod feed;
pub mod models;
pub mod numeric;
pub mod observability;
pub mod partition;
pub mod report;
pub mod rollup;
pub mod savings;
pub mod spot_adoption;
pub mod unit_economy;
pub mod unit_rate;


pub use costs::{daily_costs, DailyCost};
pub use counterfactual::{project, project_day, project_total, DailyProjection};
pub use efficiency::{
    aggregate, compare, EfficiencyAggregate, EfficiencyChange, EfficiencyComparison,
    MetricFamily, PricingAverage,
};
pub use feed::{parse_snapshots, parse_snapshots_str, parse_timestamp, SnapshotError};
pub use models::*;
pub use numeric::parse_numeric_or_zero;
pub use observability::{ReportMetrics, StructuredLogger};
pub use partition::{partition, AutomationBoundary, Partition};
pub use report::{ImpactAnalyzer, ImpactReport, PeriodSizes};
pub use rollup::{build_monthly_rollups, MonthlyRollup};
pub use savings::{daily_savings, summarize, DailySavings, SavingsSummary};
pub use spot_adoption::{daily_cpu_mix, spot_adoption, CpuMix, SpotAdoption};
pub use unit_economy::{
    compare_unit_costs, daily_unit_costs, unit_cost_summary, unit_economy, weighted_unit_costs,
    ComponentSplit, DailyUnitCost, UnitCostSummary, UnitEconomy, UnitEconomyComparison,
};
pub use unit_rate::{estimate_unit_rates, ResourceRates, UnitRateTable};
