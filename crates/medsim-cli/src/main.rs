//! medsim CLI: run benchmark scenarios, inspect partitioning, manage
//! solver configuration.

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "medsim")]
#[command(version, about = "medsim — position-based soft-body simulation toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run benchmark scenarios and report metrics.
    Run {
        /// Scenario to run (hanging_strand, hanging_sheet, tet_block, all).
        #[arg(short, long, default_value = "all")]
        scenario: String,

        /// Model configuration (JSON). Defaults are used when omitted.
        #[arg(short, long)]
        config: Option<String>,

        /// Override the scenario's timestep count.
        #[arg(short = 'n', long)]
        steps: Option<u32>,

        /// Output CSV file path. Printed to stdout when omitted.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Partition a scenario's constraints and report the buckets.
    Partition {
        #[arg(short, long, default_value = "tet_block")]
        scenario: String,

        /// Minimum bucket size; smaller buckets are solved sequentially.
        #[arg(short, long)]
        threshold: Option<usize>,
    },

    /// Print the default configuration, or validate a configuration file.
    Config {
        /// Configuration file (JSON) to validate.
        #[arg(long)]
        validate: Option<String>,

        /// Preset to print (default, debug, high_quality).
        #[arg(long, default_value = "default")]
        preset: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            scenario,
            config,
            steps,
            output,
        } => commands::run(&scenario, config.as_deref(), steps, output.as_deref()),
        Commands::Partition {
            scenario,
            threshold,
        } => commands::partition(&scenario, threshold),
        Commands::Config { validate, preset } => match validate {
            Some(path) => commands::validate_config(&path),
            None => commands::print_config(&preset),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
