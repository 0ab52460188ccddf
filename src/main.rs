use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{AppCommands, QuoteOptions, Session, StepCommands, Toggle};
use costctl::config::{self, Config};
use costctl::exit_codes::exit_code_for_anyhow;
use costctl::schedule::SchedulePreset;

#[derive(Parser)]
#[command(name = "costctl")]
#[command(
    about = "Cost estimator for container apps",
    long_about = "costctl projects weekly, monthly and yearly costs for container apps billed per vCPU-second and GiB-second.\n\nEach app has a CPU/memory tier and an hour-by-hour weekly schedule of instance counts.\nSchedules can be edited cell by cell, from presets, or from time-range steps.\n\nThe estimate is saved between runs and can be exported as CSV or printable HTML."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, global = true, default_value = "text")]
    output: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a config file
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = ".costctl.toml")]
        output: PathBuf,
    },
    /// List the CPU/memory tiers
    Tiers,
    /// List pricing regions
    Regions,
    /// List supported currencies
    Currencies,
    /// Show costs for every app in the estimate
    Estimate,
    /// One-off estimate without touching the saved estimate
    ///
    /// Examples:
    ///   costctl quote --tier m --preset business
    ///   costctl quote --tier 7 --uniform 3 --region eastus --free-tier
    Quote {
        /// Tier index 0-15 or xs, s, m, l, xl
        #[arg(long, default_value = "m")]
        tier: String,
        /// Schedule preset (business when neither this nor --uniform is given)
        #[arg(long, value_enum)]
        preset: Option<SchedulePreset>,
        /// Run this many instances every hour of the week
        #[arg(long, conflicts_with = "preset")]
        uniform: Option<u32>,
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        /// Deduct the monthly free allowance
        #[arg(long)]
        free_tier: bool,
    },
    /// Manage apps in the estimate
    App {
        #[command(subcommand)]
        subcommand: AppCommands,
    },
    /// Manage schedule steps (time-range rules) of an app
    Step {
        #[command(subcommand)]
        subcommand: StepCommands,
    },
    /// Show or set the pricing region
    Region { region: Option<String> },
    /// Show or set the billing currency
    Currency {
        currency: Option<String>,
        /// Go back to the region's own currency
        #[arg(long, conflicts_with = "currency")]
        auto: bool,
    },
    /// Show or toggle the monthly free allowance
    FreeTier {
        #[arg(value_enum)]
        state: Option<Toggle>,
    },
    /// Show or set the estimate name
    Name { name: Option<String> },
    /// Export the estimate as CSV or printable HTML
    Export {
        /// csv or html
        #[arg(short, long, default_value = "csv")]
        format: String,
        /// Output file (defaults to <estimate-name>-<date>.<ext>)
        #[arg(long)]
        file: Option<PathBuf>,
        /// Output directory when no file is given
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Discard the saved estimate
    Reset,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("ERROR: {:#}", e);
        std::process::exit(exit_code_for_anyhow(&e));
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Only warnings and errors unless --verbose
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Init { output } = &cli.command {
        config::init_config(output)?;
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;
    let session = Session::new(config, &cli.output)?;

    match cli.command {
        Commands::Init { .. } => {}
        Commands::Tiers => commands::list_tiers(&session)?,
        Commands::Regions => commands::list_regions(&session)?,
        Commands::Currencies => commands::list_currencies(&session)?,
        Commands::Estimate => commands::show_estimate(&session)?,
        Commands::Quote {
            tier,
            preset,
            uniform,
            region,
            currency,
            free_tier,
        } => {
            let options = QuoteOptions {
                tier,
                preset,
                uniform,
                region,
                currency,
                free_tier,
            };
            commands::handle_quote(options, &session)?;
        }
        Commands::App { subcommand } => commands::handle_app_command(subcommand, &session)?,
        Commands::Step { subcommand } => commands::handle_step_command(subcommand, &session)?,
        Commands::Region { region } => commands::handle_region(region, &session)?,
        Commands::Currency { currency, auto } => {
            commands::handle_currency(currency, auto, &session)?
        }
        Commands::FreeTier { state } => commands::handle_free_tier(state, &session)?,
        Commands::Name { name } => commands::handle_name(name, &session)?,
        Commands::Export { format, file, dir } => {
            commands::handle_export(&format, file.as_deref(), dir, &session)?
        }
        Commands::Reset => commands::handle_reset(&session)?,
    }

    Ok(())
}
