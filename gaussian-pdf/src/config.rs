use crate::error::{PdfError, Result};
use crate::simd::{RemainderPolicy, DEFAULT_LANE_WIDTH};

pub const DEFAULT_SAMPLE_COUNT: usize = 10_000;

/// Largest relative difference from the naive evaluator that still passes.
pub const DEFAULT_TOLERANCE: f64 = 1e-3;

/// Parameters of one benchmark run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    pub sample_count: usize,
    pub lane_width: usize,
    pub remainder: RemainderPolicy,
    /// `None` draws a fresh seed; it is logged so the run can be repeated.
    pub seed: Option<u64>,
    pub tolerance: f64,
    pub verify: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            lane_width: DEFAULT_LANE_WIDTH,
            remainder: RemainderPolicy::default(),
            seed: None,
            tolerance: DEFAULT_TOLERANCE,
            verify: true,
        }
    }
}

impl BenchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sample_count == 0 {
            return Err(PdfError::InvalidConfig("sample count must be non-zero".into()));
        }
        if self.lane_width == 0 {
            return Err(PdfError::InvalidConfig("lane width must be non-zero".into()));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(PdfError::InvalidConfig(format!(
                "tolerance must be finite and positive, got {}",
                self.tolerance
            )));
        }
        // catch this up front instead of after two evaluators have run
        if self.remainder == RemainderPolicy::Reject && self.sample_count % self.lane_width != 0 {
            return Err(PdfError::PartialLaneGroup {
                len: self.sample_count,
                lane_width: self.lane_width,
            });
        }
        Ok(())
    }
}
