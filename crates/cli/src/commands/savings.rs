//! Monthly rollups and savings summary

use anyhow::Result;
use colored::Colorize;
use impact_lib::{ImpactAnalyzer, MonthlyRollup, SavingsSummary, StructuredLogger};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tabled::Tabled;

use super::{load_feed, Session};
use crate::output::{
    color_savings, format_currency, format_percent, print_heading, print_json, print_table,
    print_unavailable, OutputFormat,
};

/// Row for the monthly costs table
#[derive(Tabled)]
struct MonthRow {
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "On-Demand")]
    on_demand: String,
    #[tabled(rename = "Spot")]
    spot: String,
    #[tabled(rename = "Spot Fallback")]
    spot_fallback: String,
    #[tabled(rename = "Days")]
    days: u32,
    #[tabled(rename = "Actual")]
    actual: String,
    #[tabled(rename = "Without Automation")]
    counterfactual: String,
    #[tabled(rename = "Savings")]
    savings: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SavingsOutput<'a> {
    monthly_rollups: Option<&'a [MonthlyRollup]>,
    summary: Option<&'a SavingsSummary>,
}

/// Show monthly cost rollups and the savings summary
pub fn show_savings(session: &Session, costs: &Path) -> Result<()> {
    let snapshots = load_feed(costs, "cost")?;
    let logger = StructuredLogger::new(costs.display().to_string());

    let started = Instant::now();
    let report = ImpactAnalyzer::new(session.settings.cutoff, session.settings.now)
        .analyze(&snapshots, &[]);
    session
        .metrics
        .observe_computation(started.elapsed().as_secs_f64());

    let months = report.monthly_rollups.as_deref();
    let summary = report.savings.as_ref();
    if summary.is_none() {
        session.note_unavailable(&logger, "savings");
    }

    match session.settings.format {
        OutputFormat::Json => print_json(&SavingsOutput {
            monthly_rollups: months,
            summary,
        })?,
        OutputFormat::Table => match (months, summary) {
            (Some(months), Some(summary)) => {
                print_monthly(months, session.currency());
                print_summary(summary, session.currency());
            }
            _ => print_unavailable("Savings"),
        },
    }

    Ok(())
}

/// Print the monthly rollup table
pub fn print_monthly(months: &[MonthlyRollup], currency: &str) {
    print_heading("Monthly Costs");
    let rows = months
        .iter()
        .map(|m| MonthRow {
            month: if m.is_current_month {
                format!("{} (est.)", m.month.format("%Y-%m"))
            } else {
                m.month.format("%Y-%m").to_string()
            },
            on_demand: format_currency(m.actual_by_model.on_demand, currency),
            spot: format_currency(m.actual_by_model.spot, currency),
            spot_fallback: format_currency(m.actual_by_model.spot_fallback, currency),
            days: m.days_contributing,
            actual: format_currency(m.estimated_actual, currency),
            counterfactual: format_currency(m.estimated_counterfactual, currency),
            savings: format!(
                "{} ({})",
                color_savings(m.savings, currency),
                format_percent(m.savings_percent)
            ),
        })
        .collect();
    print_table(rows);
    println!();
}

/// Print the headline savings figures
pub fn print_summary(summary: &SavingsSummary, currency: &str) {
    print_heading("Savings Summary");
    println!(
        "{}  {}",
        "Total Savings:".bold(),
        format_currency(summary.total_savings, currency).green().bold()
    );
    println!(
        "Estimated (monthly):    {}",
        format_currency(summary.estimated_total_savings, currency)
    );
    println!(
        "Average Monthly:        {} ({})",
        format_currency(summary.average_monthly_savings, currency),
        format_percent(summary.average_monthly_savings_percent)
    );
    println!(
        "Average Daily:          {}",
        format_currency(summary.average_daily_savings, currency)
    );
    println!(
        "Days with savings:      {}",
        summary.days_with_savings
    );
    println!();
}
