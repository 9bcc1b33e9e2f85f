use anyhow::{bail, Context, Result};
use clap::Parser;
use flexi_logger::Logger;
use log::info;

use gaussian_pdf::config::{DEFAULT_SAMPLE_COUNT, DEFAULT_TOLERANCE};
use gaussian_pdf::simd::DEFAULT_LANE_WIDTH;
use gaussian_pdf::{run_benchmark, BenchConfig, RemainderPolicy};

/// Times SIMD, fast approximate and naive Gaussian density evaluation over
/// the same random samples.
#[derive(Debug, Parser)]
#[command(name = "gaussian-pdf-bench", version)]
struct Args {
    /// Number of samples
    #[arg(long = "samples", default_value_t = DEFAULT_SAMPLE_COUNT)]
    sample_count: usize,

    /// Samples per SIMD lane group
    #[arg(long, default_value_t = DEFAULT_LANE_WIDTH)]
    lane_width: usize,

    /// Final partial lane group: "pad" or "reject"
    #[arg(long, default_value_t = RemainderPolicy::Pad)]
    remainder: RemainderPolicy,

    /// RNG seed; drawn at random (and logged) when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Largest relative difference from the naive result that passes
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Skip comparing the approximate results with the naive ones
    #[arg(long)]
    no_verify: bool,

    /// Log specification, e.g. "info" or "gaussian_pdf=debug"
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn config(&self) -> BenchConfig {
        BenchConfig {
            sample_count: self.sample_count,
            lane_width: self.lane_width,
            remainder: self.remainder,
            seed: self.seed,
            tolerance: self.tolerance,
            verify: !self.no_verify,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // log lines go to stderr, the report to stdout
    let _logger = Logger::try_with_str(&args.log_level)
        .with_context(|| format!("invalid log specification '{}'", args.log_level))?
        .log_to_stderr()
        .start()
        .context("logger initialization failed")?;

    let config = args.config();
    let summary = run_benchmark(&config).context("benchmark run failed")?;

    print!("{}", summary);
    match summary.backend {
        Some(backend) => info!("seed {} on {} backend", summary.seed, backend),
        None => info!("seed {}", summary.seed),
    }

    if !summary.passed() {
        let failed: Vec<_> = summary
            .verifications
            .iter()
            .filter(|v| !v.passed())
            .map(|v| v.evaluator)
            .collect();
        bail!("verification failed for: {}", failed.join(", "));
    }
    Ok(())
}
