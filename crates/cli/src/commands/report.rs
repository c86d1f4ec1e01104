//! Full impact report

use anyhow::Result;
use colored::Colorize;
use impact_lib::{
    ImpactAnalyzer, ImpactReport, MetricFamily, ResourceClass, StructuredLogger, UnitEconomy,
};
use std::path::Path;
use std::time::Instant;
use tabled::Tabled;

use super::{efficiency, load_feed, rates, savings, spot, Session};
use crate::output::{
    color_change, format_rate, print_heading, print_info, print_json, print_table,
    print_unavailable, OutputFormat,
};

/// Row for the unit economy table
#[derive(Tabled)]
struct UnitCostRow {
    #[tabled(rename = "Resource")]
    resource: &'static str,
    #[tabled(rename = "Before")]
    baseline: String,
    #[tabled(rename = "After")]
    current: String,
    #[tabled(rename = "Impact")]
    impact: String,
    #[tabled(rename = "Weighted Before")]
    baseline_weighted: String,
    #[tabled(rename = "Weighted After")]
    current_weighted: String,
}

/// Row for the per-pricing-model unit cost impact
#[derive(Tabled)]
struct ModelImpactRow {
    #[tabled(rename = "Resource")]
    resource: &'static str,
    #[tabled(rename = "On-Demand")]
    on_demand: String,
    #[tabled(rename = "Spot")]
    spot: String,
    #[tabled(rename = "Spot Fallback")]
    spot_fallback: String,
}

/// Compute and print the full report
///
/// Without an efficiency feed, the cost feed is used for efficiency metrics.
pub fn show_report(session: &Session, costs: &Path, efficiency: Option<&Path>) -> Result<()> {
    let cost_snapshots = load_feed(costs, "cost")?;
    let efficiency_snapshots = match efficiency {
        Some(path) => Some(load_feed(path, "efficiency")?),
        None => None,
    };
    let logger = StructuredLogger::new(costs.display().to_string());

    let started = Instant::now();
    let report = ImpactAnalyzer::new(session.settings.cutoff, session.settings.now).analyze(
        &cost_snapshots,
        efficiency_snapshots.as_deref().unwrap_or(&cost_snapshots),
    );
    let elapsed = started.elapsed().as_secs_f64();

    session.metrics.observe_computation(elapsed);
    session.metrics.record_report(&report);
    logger.log_report(&report, elapsed);

    match session.settings.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => print_report(&report, session.currency()),
    }

    Ok(())
}

fn print_report(report: &ImpactReport, currency: &str) {
    print_heading("Automation Impact Report");
    match &report.periods {
        Some(periods) => {
            println!(
                "Cutoff:                 {}",
                periods.cutoff.format("%Y-%m-%d %H:%M:%S").to_string().cyan()
            );
            println!("Baseline days:          {}", periods.baseline_days);
            println!("Automated days:         {}", periods.current_days);
        }
        None => print_unavailable("Automation cutoff"),
    }
    println!("Snapshots:              {}", report.snapshot_count);
    println!();

    match &report.unit_rates {
        Some(table) => rates::print_rates(table, currency),
        None => print_unavailable("Baseline unit rates"),
    }

    match (&report.monthly_rollups, &report.savings) {
        (Some(months), Some(summary)) => {
            savings::print_monthly(months, currency);
            savings::print_summary(summary, currency);
        }
        _ => print_unavailable("Savings"),
    }

    efficiency::print_comparison(
        MetricFamily::Overprovisioning,
        report.overprovisioning.as_ref(),
    );
    efficiency::print_comparison(
        MetricFamily::Utilization,
        report.utilization.as_ref(),
    );
    spot::print_adoption(report.spot_adoption.as_ref());

    match &report.unit_economy {
        Some(view) => print_unit_economy(view, currency),
        None => print_unavailable("Unit economy"),
    }

    if report.unavailable_count() > 0 {
        print_info(&format!(
            "{} report sections unavailable",
            report.unavailable_count()
        ));
    }
}

fn print_unit_economy(view: &UnitEconomy, currency: &str) {
    print_heading("Unit Economy");
    let comparison = &view.comparison;
    let rows = ResourceClass::COMPONENTS
        .iter()
        .filter_map(|class| {
            let before = comparison.baseline.by_class.get(*class)?.average;
            let after = comparison.current.by_class.get(*class)?.average;
            let impact = *comparison.impact_percent.get(*class)?;
            Some(UnitCostRow {
                resource: class.as_str(),
                baseline: format_rate(before, currency),
                current: format_rate(after, currency),
                impact: color_change(format!("{:+.1}%", impact), impact > 0.0),
                baseline_weighted: format_rate(*view.baseline_weighted.get(*class)?, currency),
                current_weighted: format_rate(*view.current_weighted.get(*class)?, currency),
            })
        })
        .collect();
    print_table(rows);

    println!("{}", "By pricing model".bold());
    let by_model = ResourceClass::COMPONENTS
        .iter()
        .filter_map(|class| {
            let split = comparison.impact_by_model.get(*class)?;
            let cell = |impact: f64| color_change(format!("{:+.1}%", impact), impact > 0.0);
            Some(ModelImpactRow {
                resource: class.as_str(),
                on_demand: cell(split.on_demand),
                spot: cell(split.spot),
                spot_fallback: cell(split.spot_fallback),
            })
        })
        .collect();
    print_table(by_model);
    println!();
}
