//! Automation impact CLI
//!
//! Reads daily cluster snapshot feeds from disk and reports how costs and
//! efficiency changed after automation was switched on.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{efficiency, rates, report, savings, spot, Session};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Automation impact CLI
#[derive(Parser)]
#[command(name = "impact")]
#[command(author, version, about = "Cost and efficiency impact of cluster automation", long_about = None)]
pub struct Cli {
    /// Config file (TOML or JSON)
    #[arg(long, env = "IMPACT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    /// Log as JSON lines on stderr
    #[arg(long)]
    pub log_json: bool,

    /// Print Prometheus metrics to stderr when done
    #[arg(long)]
    pub emit_metrics: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Full impact report
    Report {
        /// Cost snapshot feed
        #[arg(long)]
        costs: PathBuf,

        /// Efficiency snapshot feed (defaults to the cost feed)
        #[arg(long)]
        efficiency: Option<PathBuf>,

        /// Automation cutoff (ISO-8601)
        #[arg(long)]
        cutoff: Option<String>,

        /// Reference time for current-month extrapolation
        #[arg(long)]
        now: Option<String>,
    },

    /// Baseline unit rates
    Rates {
        /// Cost snapshot feed
        #[arg(long)]
        costs: PathBuf,

        /// Automation cutoff (ISO-8601)
        #[arg(long)]
        cutoff: Option<String>,
    },

    /// Monthly costs and savings
    Savings {
        /// Cost snapshot feed
        #[arg(long)]
        costs: PathBuf,

        /// Automation cutoff (ISO-8601)
        #[arg(long)]
        cutoff: Option<String>,

        /// Reference time for current-month extrapolation
        #[arg(long)]
        now: Option<String>,
    },

    /// Overprovisioning and utilization
    Efficiency {
        /// Efficiency snapshot feed
        #[arg(long)]
        efficiency: PathBuf,

        /// Automation cutoff (ISO-8601)
        #[arg(long)]
        cutoff: Option<String>,
    },

    /// Spot adoption
    Spot {
        /// Cost snapshot feed
        #[arg(long)]
        costs: PathBuf,

        /// Automation cutoff (ISO-8601)
        #[arg(long)]
        cutoff: Option<String>,
    },
}

impl Commands {
    fn overrides(&self, format: Option<output::OutputFormat>) -> config::Overrides {
        let (cutoff, now) = match self {
            Commands::Report { cutoff, now, .. } | Commands::Savings { cutoff, now, .. } => {
                (cutoff.clone(), now.clone())
            }
            Commands::Rates { cutoff, .. }
            | Commands::Efficiency { cutoff, .. }
            | Commands::Spot { cutoff, .. } => (cutoff.clone(), None),
        };
        config::Overrides {
            cutoff,
            now,
            format,
        }
    }
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let settings = config::CliConfig::load(cli.config.as_deref())?
        .resolve(cli.command.overrides(cli.format))?;
    let session = Session::new(settings);

    match &cli.command {
        Commands::Report {
            costs,
            efficiency: feed,
            ..
        } => report::show_report(&session, costs, feed.as_deref())?,
        Commands::Rates { costs, .. } => rates::show_rates(&session, costs)?,
        Commands::Savings { costs, .. } => savings::show_savings(&session, costs)?,
        Commands::Efficiency {
            efficiency: feed, ..
        } => efficiency::show_efficiency(&session, feed)?,
        Commands::Spot { costs, .. } => spot::show_spot(&session, costs)?,
    }

    if cli.emit_metrics {
        eprintln!("{}", session.metrics.render()?);
    }

    Ok(())
}
