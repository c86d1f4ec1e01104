//! Calendar-month rollups of actual vs counterfactual cost
//!
//! Every month between the earliest and latest snapshot gets a rollup. Only
//! days at or after the automation cutoff feed the actual/counterfactual
//! comparison, even inside the cutoff's own month. The month containing `now`
//! is still in progress, so its sums are extrapolated from the daily average
//! of the days seen so far: `sum / days × dayOfMonth(now)`.
//!
//! Month boundaries are UTC calendar months.

use crate::counterfactual::project_day;
use crate::models::{PricingModel, PricingSplit, Snapshot};
use crate::numeric::{mean_over, percent_or_zero};
use crate::partition::AutomationBoundary;
use crate::unit_rate::UnitRateTable;
use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;

/// Cost comparison for one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRollup {
    /// First day of the month
    pub month: NaiveDate,
    /// Month contains `now` and is extrapolated
    pub is_current_month: bool,
    /// Raw actual cost per pricing model over every day of the month
    pub actual_by_model: PricingSplit<f64>,
    /// Days at or after the cutoff that fed the comparison sums
    pub days_contributing: u32,
    pub actual_sum: f64,
    pub counterfactual_sum: f64,
    pub estimated_actual: f64,
    pub estimated_counterfactual: f64,
    pub savings: f64,
    pub savings_percent: f64,
}

#[derive(Default)]
struct MonthAccumulator {
    actual_by_model: PricingSplit<f64>,
    days: u32,
    actual: f64,
    counterfactual: f64,
}

/// First day of the month containing `timestamp`
pub fn month_start(timestamp: DateTime<Utc>) -> NaiveDate {
    let date = timestamp.date_naive();
    date.with_day(1).unwrap_or(date)
}

/// Extrapolate a partial-month sum to `day_of_month` days
///
/// Returns 0 when no day contributed.
pub fn extrapolate(sum: f64, days_contributing: u32, day_of_month: u32) -> f64 {
    mean_over(sum, days_contributing as usize) * day_of_month as f64
}

/// Build one rollup per calendar month spanned by `snapshots`
pub fn build_monthly_rollups<S: Borrow<Snapshot>>(
    snapshots: &[S],
    boundary: &AutomationBoundary,
    rates: &UnitRateTable,
    now: DateTime<Utc>,
) -> Vec<MonthlyRollup> {
    let Some((first, last)) = timestamp_range(snapshots) else {
        return Vec::new();
    };

    let mut months: BTreeMap<NaiveDate, MonthAccumulator> = BTreeMap::new();
    let last_month = month_start(last);
    let mut cursor = month_start(first);
    while cursor <= last_month {
        months.insert(cursor, MonthAccumulator::default());
        match cursor.checked_add_months(Months::new(1)) {
            Some(next) => cursor = next,
            None => break,
        }
    }

    for snapshot in snapshots.iter().map(Borrow::borrow) {
        let Some(acc) = months.get_mut(&month_start(snapshot.timestamp)) else {
            continue;
        };

        for model in PricingModel::ALL {
            *acc.actual_by_model.get_mut(model) += snapshot.actual_cost_for(model);
        }

        if boundary.is_baseline(snapshot) {
            continue;
        }
        acc.days += 1;
        acc.actual += snapshot.actual_cost();
        acc.counterfactual += project_day(snapshot, rates).total;
    }

    let current_month = month_start(now);
    months
        .into_iter()
        .map(|(month, acc)| {
            let is_current_month = month == current_month;
            let (estimated_actual, estimated_counterfactual) = if is_current_month {
                (
                    extrapolate(acc.actual, acc.days, now.day()),
                    extrapolate(acc.counterfactual, acc.days, now.day()),
                )
            } else {
                (acc.actual, acc.counterfactual)
            };
            let savings = estimated_counterfactual - estimated_actual;

            MonthlyRollup {
                month,
                is_current_month,
                actual_by_model: acc.actual_by_model,
                days_contributing: acc.days,
                actual_sum: acc.actual,
                counterfactual_sum: acc.counterfactual,
                estimated_actual,
                estimated_counterfactual,
                savings,
                savings_percent: percent_or_zero(savings, estimated_counterfactual),
            }
        })
        .collect()
}

fn timestamp_range<S: Borrow<Snapshot>>(
    snapshots: &[S],
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let mut timestamps = snapshots.iter().map(|s| s.borrow().timestamp);
    let first = timestamps.next()?;
    Some(timestamps.fold((first, first), |(min, max), ts| (min.min(ts), max.max(ts))))
}
