//! Output formatting utilities

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print rows as a rounded table
pub fn print_table<T: Tabled>(rows: Vec<T>) {
    if rows.is_empty() {
        println!("{}", "No data".yellow());
        return;
    }
    println!("{}", Table::new(rows).with(Style::rounded()));
}

/// Print a section heading
pub fn print_heading(title: &str) {
    println!("{}", title.bold());
    println!("{}", "=".repeat(50));
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Warn that a structure could not be computed
pub fn print_unavailable(what: &str) {
    print_warning(&format!("{what} unavailable (no cutoff or an empty period)"));
}

/// Format currency
pub fn format_currency(amount: f64, currency: &str) -> String {
    match currency {
        "USD" => format!("${:.2}", amount),
        "EUR" => format!("€{:.2}", amount),
        "GBP" => format!("£{:.2}", amount),
        _ => format!("{:.2} {}", amount, currency),
    }
}

/// Format a unit price, which is often well below one currency unit
pub fn format_rate(amount: f64, currency: &str) -> String {
    match currency {
        "USD" => format!("${:.4}", amount),
        "EUR" => format!("€{:.4}", amount),
        "GBP" => format!("£{:.4}", amount),
        _ => format!("{:.4} {}", amount, currency),
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Color a signed change green when it is an improvement
pub fn color_change(text: String, improved: bool) -> String {
    if improved {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

/// Color an amount of savings: green when positive, red when negative
pub fn color_savings(amount: f64, currency: &str) -> String {
    let formatted = format_currency(amount, currency);
    if amount > 0.0 {
        formatted.green().to_string()
    } else if amount < 0.0 {
        formatted.red().to_string()
    } else {
        formatted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(12.346, "USD"), "$12.35");
        assert_eq!(format_currency(3.0, "EUR"), "€3.00");
        assert_eq!(format_currency(1.5, "CHF"), "1.50 CHF");
    }

    #[test]
    fn test_format_rate_keeps_precision() {
        assert_eq!(format_rate(0.03126, "USD"), "$0.0313");
        assert_eq!(format_percent(25.04), "25.0%");
    }
}
