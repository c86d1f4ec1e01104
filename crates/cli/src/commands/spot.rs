//! Spot adoption before and after the cutoff

use anyhow::Result;
use colored::Colorize;
use impact_lib::{partition, spot_adoption, SpotAdoption, StructuredLogger};
use std::path::Path;

use super::{load_feed, Session};
use crate::output::{
    color_change, format_percent, print_heading, print_json, print_unavailable, OutputFormat,
};

/// Show the spot share of CPU capacity
pub fn show_spot(session: &Session, costs: &Path) -> Result<()> {
    let snapshots = load_feed(costs, "cost")?;
    let logger = StructuredLogger::new(costs.display().to_string());

    let adoption = partition(&snapshots, session.settings.cutoff)
        .as_ref()
        .and_then(spot_adoption);
    if adoption.is_none() {
        session.note_unavailable(&logger, "spot_adoption");
    }

    match session.settings.format {
        OutputFormat::Json => print_json(&adoption)?,
        OutputFormat::Table => print_adoption(adoption.as_ref()),
    }

    Ok(())
}

/// Print spot adoption, or a warning when it is unavailable
pub fn print_adoption(adoption: Option<&SpotAdoption>) {
    let Some(adoption) = adoption else {
        print_unavailable("Spot adoption");
        return;
    };

    print_heading("Spot Adoption (CPU)");
    println!("Before automation:      {}", format_percent(adoption.baseline_rate));
    println!("After automation:       {}", format_percent(adoption.current_rate));
    println!(
        "{}                {}",
        "Change:".bold(),
        color_change(
            format!("{:+.1} pts", adoption.change),
            adoption.change > 0.0
        )
    );
    println!();
}
