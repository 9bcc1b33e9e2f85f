use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::BenchConfig;
use crate::error::Result;
use crate::pdf::Evaluator;
use crate::samples::SampleSet;
use crate::scalar::{FastApproxEvaluator, NaiveEvaluator};
use crate::simd::{SimdBackend, SimdEvaluator};
use crate::verify::{verify_report, Verification};

/// ctime(3) layout, e.g. `Thu Oct 19 12:42:07 2026`.
pub const CTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// One evaluator's run: when it finished, how long it took, what it produced.
#[derive(Debug, Clone)]
pub struct Timing {
    pub name: &'static str,
    pub reference: bool,
    pub finished_at: DateTime<Local>,
    /// From `Instant`, so monotonic and never negative.
    pub elapsed: Duration,
    pub result: Vec<f64>,
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Finished {} computation at {}",
            self.name,
            self.finished_at.format(CTIME_FORMAT)
        )?;
        write!(f, "Elapsed Time : {}s", self.elapsed.as_secs_f64())
    }
}

#[derive(Debug, Clone, Default)]
pub struct BenchReport {
    pub timings: Vec<Timing>,
}

impl BenchReport {
    pub fn timing(&self, name: &str) -> Option<&Timing> {
        self.timings.iter().find(|t| t.name == name)
    }

    pub fn reference(&self) -> Option<&Timing> {
        self.timings.iter().find(|t| t.reference)
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for timing in &self.timings {
            writeln!(f, "{}", timing)?;
        }
        Ok(())
    }
}

/// Runs a fixed list of evaluators over the same samples, one after another.
pub struct Harness {
    evaluators: Vec<Box<dyn Evaluator>>,
    simd_backend: Option<SimdBackend>,
}

impl Harness {
    pub fn new(evaluators: Vec<Box<dyn Evaluator>>) -> Self {
        Self {
            evaluators,
            simd_backend: None,
        }
    }

    /// SIMD, naive scalar, fast approximate scalar; in that order.
    pub fn from_config(config: &BenchConfig) -> Result<Self> {
        let simd = SimdEvaluator::new(config.lane_width, config.remainder)?;
        info!(
            "simd backend {} ({} doubles per register), lane width {}, remainder {}",
            simd.backend(),
            simd.backend().doubles_per_register(),
            simd.lane_width(),
            simd.remainder()
        );
        let simd_backend = Some(simd.backend());
        Ok(Self {
            evaluators: vec![Box::new(simd), Box::new(NaiveEvaluator), Box::new(FastApproxEvaluator)],
            simd_backend,
        })
    }

    /// Backend of the SIMD evaluator built by `from_config`; `None` for a
    /// harness assembled from arbitrary evaluators.
    pub fn simd_backend(&self) -> Option<SimdBackend> {
        self.simd_backend
    }

    pub fn run(&self, samples: &SampleSet) -> Result<BenchReport> {
        let mut report = BenchReport::default();
        for evaluator in &self.evaluators {
            let mut result = samples.result_buffer();

            let start = Instant::now();
            evaluator.evaluate(samples, &mut result)?;
            let elapsed = start.elapsed();
            let finished_at = Local::now();

            debug!("{} finished {} samples in {:?}", evaluator.name(), samples.len(), elapsed);
            report.timings.push(Timing {
                name: evaluator.name(),
                reference: evaluator.is_reference(),
                finished_at,
                elapsed,
                result,
            });
        }
        Ok(report)
    }
}

/// Everything one call of `run_benchmark` produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub seed: u64,
    /// The backend the SIMD evaluator actually ran on.
    pub backend: Option<SimdBackend>,
    pub report: BenchReport,
    /// Empty when verification was disabled.
    pub verifications: Vec<Verification>,
}

impl RunSummary {
    pub fn passed(&self) -> bool {
        self.verifications.iter().all(Verification::passed)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.report)?;
        for v in &self.verifications {
            writeln!(f, "{}", v)?;
        }
        Ok(())
    }
}

/// Generates the samples, times every evaluator and, if enabled, verifies
/// the approximate outputs against the naive one.
pub fn run_benchmark(config: &BenchConfig) -> Result<RunSummary> {
    config.validate()?;

    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!("generating {} samples with seed {}", config.sample_count, seed);
    let mut rng = StdRng::seed_from_u64(seed);
    let samples = SampleSet::generate(&mut rng, config.sample_count);

    let harness = Harness::from_config(config)?;
    let report = harness.run(&samples)?;

    let verifications = if config.verify {
        verify_report(&report, config.tolerance)?
    } else {
        Vec::new()
    };

    Ok(RunSummary {
        seed,
        backend: harness.simd_backend(),
        report,
        verifications,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::{PdfError, RemainderPolicy};

    struct Counting {
        calls: Cell<usize>,
    }

    impl Evaluator for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn evaluate(&self, _samples: &SampleSet, result: &mut [f64]) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            result.iter_mut().for_each(|r| *r = 1.0);
            Ok(())
        }
    }

    struct Failing;

    impl Evaluator for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn evaluate(&self, samples: &SampleSet, _result: &mut [f64]) -> Result<()> {
            Err(PdfError::PartialLaneGroup {
                len: samples.len(),
                lane_width: 3,
            })
        }
    }

    fn samples(n: usize) -> SampleSet {
        SampleSet::generate(&mut StdRng::seed_from_u64(11), n)
    }

    #[test]
    fn runs_in_order() {
        let harness = Harness::from_config(&BenchConfig::default()).unwrap();
        let report = harness.run(&samples(64)).unwrap();

        let names: Vec<_> = report.timings.iter().map(|t| t.name).collect();
        assert_eq!(names, ["SIMD", "naive scalar", "fast approximate scalar"]);
        assert_eq!(report.reference().map(|t| t.name), Some("naive scalar"));
        assert!(report.timings.iter().all(|t| t.result.len() == 64));
    }

    #[test]
    fn reports_simd_backend_in_use() {
        let config = BenchConfig::default();
        let harness = Harness::from_config(&config).unwrap();
        let simd = SimdEvaluator::new(config.lane_width, config.remainder).unwrap();
        assert_eq!(harness.simd_backend(), Some(simd.backend()));

        let summary = run_benchmark(&BenchConfig {
            sample_count: 64,
            seed: Some(3),
            ..config
        })
        .unwrap();
        assert_eq!(summary.backend, harness.simd_backend());

        let custom = Harness::new(vec![Box::new(NaiveEvaluator)]);
        assert_eq!(custom.simd_backend(), None);
    }

    #[test]
    fn custom_evaluators() {
        let harness = Harness::new(vec![Box::new(Counting { calls: Cell::new(0) })]);
        let report = harness.run(&samples(5)).unwrap();
        let timing = report.timing("counting").unwrap();
        assert_eq!(timing.result, vec![1.0; 5]);
        assert!(!timing.reference);
        assert!(report.timing("missing").is_none());
    }

    #[test]
    fn evaluator_error_stops_run() {
        let harness = Harness::new(vec![Box::new(Failing)]);
        assert!(harness.run(&samples(5)).is_err());
    }

    #[test]
    fn report_lines() {
        let harness = Harness::new(vec![Box::new(NaiveEvaluator)]);
        let report = harness.run(&samples(8)).unwrap();
        let text = report.to_string();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Finished naive scalar computation at "));
        assert!(lines[1].starts_with("Elapsed Time : "));
        assert!(lines[1].ends_with('s'));
    }

    #[test]
    fn run_benchmark_seeded() {
        let config = BenchConfig {
            sample_count: 1000,
            seed: Some(5),
            ..Default::default()
        };
        let a = run_benchmark(&config).unwrap();
        let b = run_benchmark(&config).unwrap();

        assert_eq!(a.seed, 5);
        assert!(a.passed());
        assert_eq!(a.verifications.len(), 2);
        // same seed, same data, same numbers
        for (ta, tb) in a.report.timings.iter().zip(&b.report.timings) {
            assert_eq!(ta.result, tb.result);
        }
    }

    #[test]
    fn run_benchmark_without_verify() {
        let config = BenchConfig {
            sample_count: 100,
            verify: false,
            ..Default::default()
        };
        let summary = run_benchmark(&config).unwrap();
        assert!(summary.verifications.is_empty());
        assert!(summary.passed());
    }

    #[test]
    fn run_benchmark_rejects_partial_groups() {
        let config = BenchConfig {
            sample_count: 100,
            remainder: RemainderPolicy::Reject,
            ..Default::default()
        };
        assert!(run_benchmark(&config).is_err());
    }
}
