//
// exponential approximation
//
pub mod exp_approx;

#[cfg(target_arch = "x86_64")]
pub mod exp_approx_avx;

#[cfg(target_arch = "aarch64")]
pub mod exp_approx_arm;

//
// gaussian density evaluators
//
pub mod pdf;
pub mod scalar;
pub mod simd;

#[cfg(target_arch = "x86_64")]
pub mod pdf_avx;

#[cfg(target_arch = "aarch64")]
pub mod pdf_arm;


//
// benchmark driver
//
pub mod config;
pub mod error;
pub mod harness;
pub mod samples;
pub mod verify;

pub use config::BenchConfig;
pub use error::PdfError;
pub use harness::{run_benchmark, BenchReport, Harness, RunSummary, Timing};
pub use pdf::Evaluator;
pub use samples::SampleSet;
pub use scalar::{FastApproxEvaluator, NaiveEvaluator};
pub use simd::{RemainderPolicy, SimdBackend, SimdEvaluator};
pub use verify::Verification;
