//! # CLI Execution Functions
//!
//! Extracted from `main.rs` to keep the entry point slim. Contains input
//! parsing, output encoding, generate/check execution, logging setup, and
//! rayon configuration.

use anyhow::{anyhow, Context, Result};
use base64::Engine;
use clap::ValueEnum;
use primeforge::config::{Config, LogFormat};
use primeforge::{codec, GenerateRequest, PrimeBuilder};
use rand::rngs::OsRng;
use rayon::prelude::*;
use rug::Integer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// How generated primes are printed, one per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Big-endian bytes as hex, including the sign guard byte
    Hex,
    /// Big-endian bytes as standard base64
    Base64,
    /// Decimal digits
    Decimal,
    /// One JSON object per prime
    Json,
}

/// How the `check` argument is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// Big-endian hex, `0x` prefix optional
    Hex,
    /// Big-endian bytes as standard base64
    Base64,
    /// Decimal digits
    Decimal,
}

// ── Logging ─────────────────────────────────────────────────────

/// Initialize structured logging: LOG_FORMAT=json (or the config) for
/// machine consumption, human-readable on stderr otherwise.
pub fn init_logging(configured: LogFormat) {
    let json = match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => true,
        Ok("text") => false,
        _ => configured == LogFormat::Json,
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

// ── Input Parsing ───────────────────────────────────────────────

/// Parse a non-negative big-endian hex magnitude, `0x` prefix optional.
pub fn parse_hex(s: &str) -> Result<Integer> {
    let digits = s
        .trim()
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(anyhow!("not a hex magnitude: {:?}", s));
    }
    Integer::from_str_radix(digits, 16).with_context(|| format!("invalid hex: {s}"))
}

/// Decode the `check` argument into big-endian bytes.
pub fn parse_value(s: &str, input: InputFormat) -> Result<Vec<u8>> {
    let value = match input {
        InputFormat::Hex => parse_hex(s)?,
        InputFormat::Base64 => {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(s.trim())
                .with_context(|| format!("invalid base64: {s}"))?;
            return Ok(bytes);
        }
        InputFormat::Decimal => {
            let s = s.trim();
            if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
                return Err(anyhow!("not a non-negative decimal integer: {:?}", s));
            }
            Integer::from_str_radix(s, 10).with_context(|| format!("invalid decimal: {s}"))?
        }
    };
    Ok(codec::encode(&value, 0))
}

/// Build a generation request from CLI hex constraint arguments.
pub fn build_request(
    bits: u32,
    safe: bool,
    add: Option<&str>,
    rem: Option<&str>,
) -> Result<GenerateRequest> {
    let request = match (add, rem) {
        (Some(add), Some(rem)) => GenerateRequest::new(bits, safe)
            .with_constraint(parse_hex(add).context("--add")?, parse_hex(rem).context("--rem")?),
        (None, None) => GenerateRequest::new(bits, safe),
        _ => return Err(anyhow!("--add and --rem must be given together")),
    };
    request.validate()?;
    Ok(request)
}

// ── Output ──────────────────────────────────────────────────────

/// Render one encoded prime in the requested format.
pub fn format_prime(buf: &[u8], request: &GenerateRequest, format: OutputFormat) -> String {
    match format {
        OutputFormat::Hex => buf.iter().map(|b| format!("{b:02x}")).collect(),
        OutputFormat::Base64 => base64::engine::general_purpose::STANDARD.encode(buf),
        OutputFormat::Decimal => codec::decode(buf).to_string(),
        OutputFormat::Json => serde_json::json!({
            "bits": request.bits,
            "safe": request.safe,
            "hex": format_prime(buf, request, OutputFormat::Hex),
            "decimal": codec::decode(buf).to_string(),
        })
        .to_string(),
    }
}

// ── Execution ───────────────────────────────────────────────────

/// Generate `count` independent primes (in parallel when more than one) and
/// print them to stdout in order. A count of zero prints nothing.
pub fn run_generate(
    config: &Config,
    request: &GenerateRequest,
    count: usize,
    format: OutputFormat,
) -> Result<()> {
    let builder = PrimeBuilder::from_config(&config.generation);
    info!(
        bits = request.bits,
        safe = request.safe,
        count,
        threads = rayon::current_num_threads(),
        "primeforge generate"
    );

    let primes: Vec<Vec<u8>> = if count == 1 {
        vec![builder.generate(&mut OsRng, request)?]
    } else {
        (0..count)
            .into_par_iter()
            .map(|_| builder.generate(&mut OsRng, request))
            .collect::<primeforge::Result<_>>()?
    };

    for buf in &primes {
        println!("{}", format_prime(buf, request, format));
    }
    Ok(())
}

/// Check the value and print `prime` or `composite`.
pub fn run_check(value: &str, input: InputFormat, rounds: u32) -> Result<bool> {
    let buf = parse_value(value, input)?;
    let prime = primeforge::check_prime(&buf, rounds)?;
    println!("{}", if prime { "prime" } else { "composite" });
    Ok(prime)
}

// ── Rayon Configuration ─────────────────────────────────────────

/// Configure the global rayon thread pool. `None` keeps rayon's default of
/// one thread per logical core.
pub fn configure_rayon(threads: Option<usize>) {
    let num_threads = threads.unwrap_or(0);
    if num_threads > 0 {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
        {
            warn!(error = %e, "Could not configure rayon thread pool");
        }
    }
}
