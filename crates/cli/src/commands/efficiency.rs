//! Overprovisioning and utilization comparison

use anyhow::Result;
use impact_lib::{
    compare, partition, EfficiencyChange, EfficiencyComparison, MetricFamily, PricingAverage,
    ResourceClass, StructuredLogger,
};
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

use super::{load_feed, Session};
use crate::output::{
    color_change, format_percent, print_heading, print_json, print_table, print_unavailable,
    OutputFormat,
};

/// Row for the efficiency table
#[derive(Tabled)]
struct EfficiencyRow {
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Pricing")]
    pricing: String,
    #[tabled(rename = "Before")]
    baseline: String,
    #[tabled(rename = "After")]
    current: String,
    #[tabled(rename = "Change")]
    change: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EfficiencyOutput {
    overprovisioning: Option<EfficiencyComparison>,
    utilization: Option<EfficiencyComparison>,
}

/// Show overprovisioning and utilization before and after the cutoff
pub fn show_efficiency(session: &Session, efficiency: &Path) -> Result<()> {
    let snapshots = load_feed(efficiency, "efficiency")?;
    let logger = StructuredLogger::new(efficiency.display().to_string());

    let split = partition(&snapshots, session.settings.cutoff);
    let output = EfficiencyOutput {
        overprovisioning: split
            .as_ref()
            .and_then(|s| compare(s, MetricFamily::Overprovisioning)),
        utilization: split
            .as_ref()
            .and_then(|s| compare(s, MetricFamily::Utilization)),
    };
    if output.overprovisioning.is_none() {
        session.note_unavailable(&logger, "overprovisioning");
    }
    if output.utilization.is_none() {
        session.note_unavailable(&logger, "utilization");
    }

    match session.settings.format {
        OutputFormat::Json => print_json(&output)?,
        OutputFormat::Table => {
            print_comparison(MetricFamily::Overprovisioning, output.overprovisioning.as_ref());
            print_comparison(MetricFamily::Utilization, output.utilization.as_ref());
        }
    }

    Ok(())
}

/// Print one metric family, or a warning when it is unavailable
pub fn print_comparison(family: MetricFamily, comparison: Option<&EfficiencyComparison>) {
    let title = match family {
        MetricFamily::Overprovisioning => "Overprovisioning",
        MetricFamily::Utilization => "Utilization",
    };
    let Some(comparison) = comparison else {
        print_unavailable(title);
        return;
    };

    print_heading(title);
    let mut rows = Vec::new();
    for class in [ResourceClass::Cpu, ResourceClass::Memory] {
        if let (Some(baseline), Some(current), Some(change)) = (
            comparison.baseline.resource(class),
            comparison.current.resource(class),
            comparison.change(class),
        ) {
            push_rows(&mut rows, &class.to_string(), baseline, current, change);
        }
    }
    if let (Some(baseline), Some(current), Some(change)) = (
        comparison.baseline.storage.as_ref(),
        comparison.current.storage.as_ref(),
        comparison.storage_change(),
    ) {
        rows.push(EfficiencyRow {
            resource: "storage".to_string(),
            pricing: "all".to_string(),
            baseline: format_percent(baseline.average),
            current: format_percent(current.average),
            change: format_change(change),
        });
    }
    print_table(rows);
    println!();
}

fn push_rows(
    rows: &mut Vec<EfficiencyRow>,
    resource: &str,
    baseline: &PricingAverage,
    current: &PricingAverage,
    change: EfficiencyChange,
) {
    for (pricing, before, after) in [
        ("on-demand", baseline.on_demand, current.on_demand),
        ("spot", baseline.spot, current.spot),
        ("spot-fallback", baseline.spot_fallback, current.spot_fallback),
    ] {
        rows.push(EfficiencyRow {
            resource: resource.to_string(),
            pricing: pricing.to_string(),
            baseline: format_percent(before),
            current: format_percent(after),
            change: String::new(),
        });
    }
    rows.push(EfficiencyRow {
        resource: resource.to_string(),
        pricing: "average".to_string(),
        baseline: format_percent(baseline.average),
        current: format_percent(current.average),
        change: format_change(change),
    });
}

fn format_change(change: EfficiencyChange) -> String {
    color_change(
        format!(
            "{:+.1} pts ({:+.1}%)",
            change.absolute, change.relative_percent
        ),
        change.improved,
    )
}
