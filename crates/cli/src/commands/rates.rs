//! Baseline unit-rate table

use anyhow::Result;
use impact_lib::{
    estimate_unit_rates, partition, PricingModel, ResourceClass, StructuredLogger, UnitRateTable,
};
use std::path::Path;
use tabled::Tabled;

use super::{load_feed, Session};
use crate::output::{
    format_rate, print_heading, print_info, print_json, print_table, print_unavailable,
    OutputFormat,
};

/// Row for the unit-rate table
#[derive(Tabled)]
struct RateRow {
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "On-Demand")]
    on_demand: String,
    #[tabled(rename = "Spot")]
    spot: String,
    #[tabled(rename = "Spot Fallback")]
    spot_fallback: String,
}

/// Show the unit rates estimated over the baseline period
pub fn show_rates(session: &Session, costs: &Path) -> Result<()> {
    let snapshots = load_feed(costs, "cost")?;
    let logger = StructuredLogger::new(costs.display().to_string());

    let rates = partition(&snapshots, session.settings.cutoff)
        .and_then(|split| estimate_unit_rates(&split.baseline));
    if rates.is_none() {
        session.note_unavailable(&logger, "unit_rates");
    }

    match session.settings.format {
        OutputFormat::Json => print_json(&rates)?,
        OutputFormat::Table => match &rates {
            Some(rates) => print_rates(rates, session.currency()),
            None => print_unavailable("Baseline unit rates"),
        },
    }

    Ok(())
}

/// Print a unit-rate table
pub fn print_rates(rates: &UnitRateTable, currency: &str) {
    print_heading("Baseline Unit Rates");
    print_info(&format!(
        "Averaged over {} baseline days; days without quantity count as 0",
        rates.sample_days
    ));

    let rows = ResourceClass::ALL
        .iter()
        .map(|class| {
            let cell = |model| format_rate(rates.rate(*class, model), currency);
            RateRow {
                resource: class.to_string(),
                on_demand: cell(PricingModel::OnDemand),
                spot: cell(PricingModel::Spot),
                spot_fallback: cell(PricingModel::SpotFallback),
            }
        })
        .collect();
    print_table(rows);
    println!();
}
