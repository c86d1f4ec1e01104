//! Savings aggregation
//!
//! Combines the actual and counterfactual daily series into savings at three
//! granularities:
//! - per day: `counterfactual - actual` and its share of the counterfactual
//! - per month: taken from [`MonthlyRollup`]
//! - summary: totals and averages over the days/months that actually saved
//!
//! Days and months where automation cost *more* than the baseline would have
//! are excluded from totals and averages, not netted in.

use crate::costs::DailyCost;
use crate::counterfactual::DailyProjection;
use crate::numeric::{mean_over, percent_or_zero};
use crate::rollup::MonthlyRollup;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Savings of a single day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySavings {
    pub timestamp: DateTime<Utc>,
    pub actual: f64,
    pub counterfactual: f64,
    pub savings: f64,
    pub savings_percent: f64,
}

impl DailySavings {
    pub fn new(timestamp: DateTime<Utc>, actual: f64, counterfactual: f64) -> Self {
        let savings = counterfactual - actual;
        Self {
            timestamp,
            actual,
            counterfactual,
            savings,
            savings_percent: percent_or_zero(savings, counterfactual),
        }
    }

    pub fn is_positive(&self) -> bool {
        self.savings > 0.0
    }
}

/// Headline savings figures
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsSummary {
    /// Σ positive daily savings
    pub total_savings: f64,
    /// Mean of positive daily savings
    pub average_daily_savings: f64,
    /// Mean over completed months with positive savings, else the current
    /// month's estimate, else 0
    pub average_monthly_savings: f64,
    pub average_monthly_savings_percent: f64,
    /// Σ positive monthly savings, current month extrapolated
    pub estimated_total_savings: f64,
    pub days_with_savings: usize,
    pub completed_months_with_savings: usize,
}

/// Pair actual and counterfactual series by index
///
/// Both series must describe the same days in the same order; extra entries
/// on either side are ignored.
pub fn daily_savings(actual: &[DailyCost], counterfactual: &[DailyProjection]) -> Vec<DailySavings> {
    actual
        .iter()
        .zip(counterfactual.iter())
        .map(|(a, c)| DailySavings::new(a.timestamp, a.total, c.total))
        .collect()
}

/// Summarize daily and monthly savings
pub fn summarize(daily: &[DailySavings], months: &[MonthlyRollup]) -> SavingsSummary {
    let (daily_sum, days_with_savings) = daily
        .iter()
        .filter(|d| d.is_positive())
        .fold((0.0, 0usize), |(sum, n), d| (sum + d.savings, n + 1));

    let estimated_total_savings = months
        .iter()
        .filter(|m| m.savings > 0.0)
        .fold(0.0, |sum, m| sum + m.savings);

    let completed: Vec<&MonthlyRollup> = months
        .iter()
        .filter(|m| !m.is_current_month && m.savings > 0.0)
        .collect();

    let (average_monthly_savings, average_monthly_savings_percent) = if completed.is_empty() {
        months
            .iter()
            .find(|m| m.is_current_month)
            .map(|m| (m.savings, m.savings_percent))
            .unwrap_or_default()
    } else {
        let savings: f64 = completed.iter().map(|m| m.savings).sum();
        let percent: f64 = completed.iter().map(|m| m.savings_percent).sum();
        (
            mean_over(savings, completed.len()),
            mean_over(percent, completed.len()),
        )
    };

    SavingsSummary {
        total_savings: daily_sum,
        average_daily_savings: mean_over(daily_sum, days_with_savings),
        average_monthly_savings,
        average_monthly_savings_percent,
        estimated_total_savings,
        days_with_savings,
        completed_months_with_savings: completed.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassSplit, PricingSplit};
    use chrono::{NaiveDate, TimeZone};

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, day, 0, 0, 0).unwrap()
    }

    fn cost(day: u32, total: f64) -> DailyCost {
        DailyCost {
            timestamp: ts(day),
            by_model: PricingSplit::new(total, 0.0, 0.0),
            total,
        }
    }

    fn projection(day: u32, total: f64) -> DailyProjection {
        DailyProjection {
            timestamp: ts(day),
            by_class: ClassSplit::default(),
            by_model: PricingSplit::new(total, 0.0, 0.0),
            total,
        }
    }

    fn month(m: u32, savings: f64, percent: f64, current: bool) -> MonthlyRollup {
        MonthlyRollup {
            month: NaiveDate::from_ymd_opt(2025, m, 1).unwrap(),
            is_current_month: current,
            actual_by_model: PricingSplit::default(),
            days_contributing: 1,
            actual_sum: 0.0,
            counterfactual_sum: savings,
            estimated_actual: 0.0,
            estimated_counterfactual: savings,
            savings,
            savings_percent: percent,
        }
    }

    #[test]
    fn test_single_day_savings() {
        let day = DailySavings::new(ts(1), 150.0, 200.0);
        assert_eq!(day.savings, 50.0);
        assert_eq!(day.savings_percent, 25.0);
    }

    #[test]
    fn test_zero_counterfactual_percent() {
        let day = DailySavings::new(ts(1), 30.0, 0.0);
        assert_eq!(day.savings, -30.0);
        assert_eq!(day.savings_percent, 0.0);
    }

    #[test]
    fn test_daily_series_pairs_by_index() {
        let actual = vec![cost(1, 100.0), cost(2, 90.0), cost(3, 80.0)];
        let counterfactual = vec![projection(1, 120.0), projection(2, 80.0)];
        let series = daily_savings(&actual, &counterfactual);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].savings, 20.0);
        assert_eq!(series[1].savings, -10.0);
    }

    #[test]
    fn test_negative_days_are_excluded_not_netted() {
        let daily = vec![
            DailySavings::new(ts(1), 80.0, 100.0),
            DailySavings::new(ts(2), 150.0, 100.0),
            DailySavings::new(ts(3), 60.0, 100.0),
        ];
        let summary = summarize(&daily, &[]);

        assert_eq!(summary.total_savings, 60.0);
        assert_eq!(summary.average_daily_savings, 30.0);
        assert_eq!(summary.days_with_savings, 2);
    }

    #[test]
    fn test_monthly_average_uses_completed_months() {
        let months = vec![
            month(1, 100.0, 10.0, false),
            month(2, -50.0, -5.0, false),
            month(3, 300.0, 30.0, false),
            month(4, 1000.0, 50.0, true),
        ];
        let summary = summarize(&[], &months);

        assert_eq!(summary.completed_months_with_savings, 2);
        assert_eq!(summary.average_monthly_savings, 200.0);
        assert_eq!(summary.average_monthly_savings_percent, 20.0);
        assert_eq!(summary.estimated_total_savings, 1400.0);
    }

    #[test]
    fn test_monthly_average_falls_back_to_current_month() {
        let months = vec![month(1, -20.0, -2.0, false), month(2, 75.0, 15.0, true)];
        let summary = summarize(&[], &months);

        assert_eq!(summary.completed_months_with_savings, 0);
        assert_eq!(summary.average_monthly_savings, 75.0);
        assert_eq!(summary.average_monthly_savings_percent, 15.0);
    }

    #[test]
    fn test_nothing_to_average() {
        let summary = summarize(&[], &[month(1, -20.0, -2.0, false)]);
        assert_eq!(summary, SavingsSummary::default());
    }

    #[test]
    fn test_empty_inputs_serialize_positive_zero() {
        let summary = summarize(&[], &[]);
        assert!(!summary.total_savings.is_sign_negative());
        assert!(!summary.estimated_total_savings.is_sign_negative());

        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("-0.0"), "{json}");
    }
}
