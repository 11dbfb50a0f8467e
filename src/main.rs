//! # Main: CLI Entry Point
//!
//! Routes the `generate` and `check` subcommands to the library. Handles the
//! shared concerns: `.env` loading, TOML config, structured logging, and the
//! Rayon thread pool used when several primes are requested at once.
//!
//! ## Global Options
//!
//! - `--config` / `PRIMEFORGE_CONFIG`: TOML file with generation limits,
//!   default check rounds, and log format. Missing file means defaults.
//! - `--threads`: Rayon thread pool size (defaults to all logical cores).
//! - `LOG_FORMAT=json` overrides the configured log format.
//!
//! ## Exit Status
//!
//! `0` on success (and for `check`, a prime), `1` when `check` finds a
//! composite, `2` for any error: bad arguments, bad config, malformed input,
//! or a failed generation.

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(
    name = "primeforge",
    about = "Generate random primes and check primality"
)]
struct Cli {
    /// Path to a TOML config file (or set PRIMEFORGE_CONFIG)
    #[arg(long, env = "PRIMEFORGE_CONFIG", default_value = "primeforge.toml")]
    config: PathBuf,

    /// Number of rayon worker threads (defaults to all logical cores)
    #[arg(long)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate random primes of an exact bit length
    Generate {
        /// Bit length of the prime (top two bits are always set)
        #[arg(long)]
        bits: u32,
        /// Require (p-1)/2 to be prime as well
        #[arg(long)]
        safe: bool,
        /// Constraint modulus, big-endian hex; requires --rem
        #[arg(long, requires = "rem")]
        add: Option<String>,
        /// Constraint remainder, big-endian hex; requires --add
        #[arg(long, requires = "add")]
        rem: Option<String>,
        /// Number of independent primes to generate
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        count: u64,
        /// Output encoding
        #[arg(long, value_enum, default_value_t = cli::OutputFormat::Hex)]
        format: cli::OutputFormat,
    },
    /// Check whether a number is prime (exit status 1 if composite, 2 on error)
    Check {
        /// The number to check
        value: String,
        /// Miller-Rabin rounds (0 = automatic; defaults to the config value)
        #[arg(long)]
        rounds: Option<u32>,
        /// Encoding of VALUE
        #[arg(long, value_enum, default_value_t = cli::InputFormat::Decimal)]
        input: cli::InputFormat,
    },
}

/// Distinct from a composite verdict so scripts can tell the two apart.
const ERROR_EXIT: u8 = 2;

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(ERROR_EXIT)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config = primeforge::config::load(&cli.config)?;
    cli::init_logging(config.logging.format);
    cli::configure_rayon(cli.threads);

    match &cli.command {
        Commands::Generate {
            bits,
            safe,
            add,
            rem,
            count,
            format,
        } => {
            let request = cli::build_request(*bits, *safe, add.as_deref(), rem.as_deref())?;
            let count = usize::try_from(*count)?;
            cli::run_generate(&config, &request, count, *format)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check {
            value,
            rounds,
            input,
        } => {
            let rounds = rounds.unwrap_or(config.check.rounds);
            let prime = cli::run_check(value, *input, rounds)?;
            Ok(if prime {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
