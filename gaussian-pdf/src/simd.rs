use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::error::{PdfError, Result};
use crate::exp_approx::exp_approx_f64;
use crate::pdf::{check_lengths, gaussian_pdf_with, Evaluator};
use crate::samples::SampleSet;

pub const SIMD_NAME: &str = "SIMD";

/// Number of samples handed to one lane-group kernel call.
pub const DEFAULT_LANE_WIDTH: usize = 16;

/// Which instruction set the lane-group kernel runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimdBackend {
    Avx2,
    Neon,
    Portable,
}

impl SimdBackend {
    #[cfg(target_arch = "x86_64")]
    pub fn detect() -> Self {
        if is_x86_feature_detected!("avx2") {
            SimdBackend::Avx2
        } else {
            SimdBackend::Portable
        }
    }

    #[cfg(target_arch = "aarch64")]
    pub fn detect() -> Self {
        SimdBackend::Neon
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    pub fn detect() -> Self {
        SimdBackend::Portable
    }

    pub fn doubles_per_register(self) -> usize {
        match self {
            SimdBackend::Avx2 => 4,
            SimdBackend::Neon => 2,
            SimdBackend::Portable => 1,
        }
    }
}

impl fmt::Display for SimdBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SimdBackend::Avx2 => "avx2",
            SimdBackend::Neon => "neon",
            SimdBackend::Portable => "portable",
        };
        f.write_str(name)
    }
}

/// What to do with a trailing group shorter than the lane width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemainderPolicy {
    /// Copy the tail into a zero-padded buffer rounded up to whole registers
    /// (never longer than one lane group), evaluate, copy back.
    #[default]
    Pad,
    /// Fail with `PdfError::PartialLaneGroup` before writing anything.
    Reject,
}

impl FromStr for RemainderPolicy {
    type Err = PdfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pad" => Ok(RemainderPolicy::Pad),
            "reject" => Ok(RemainderPolicy::Reject),
            other => Err(PdfError::InvalidConfig(format!(
                "unknown remainder policy '{}', expected 'pad' or 'reject'",
                other
            ))),
        }
    }
}

impl fmt::Display for RemainderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemainderPolicy::Pad => f.write_str("pad"),
            RemainderPolicy::Reject => f.write_str("reject"),
        }
    }
}

/// Evaluates the density a lane group at a time with the vectorised
/// exponential approximation.
#[derive(Debug, Clone)]
pub struct SimdEvaluator {
    lane_width: usize,
    remainder: RemainderPolicy,
    backend: SimdBackend,
}

impl SimdEvaluator {
    pub fn new(lane_width: usize, remainder: RemainderPolicy) -> Result<Self> {
        Self::with_backend(lane_width, remainder, SimdBackend::detect())
    }

    /// Pins the backend; a backend the CPU cannot run falls back to portable.
    pub fn with_backend(lane_width: usize, remainder: RemainderPolicy, backend: SimdBackend) -> Result<Self> {
        if lane_width == 0 {
            return Err(PdfError::InvalidConfig("lane width must be non-zero".into()));
        }
        let backend = match backend {
            SimdBackend::Avx2 | SimdBackend::Neon if backend != SimdBackend::detect() => SimdBackend::Portable,
            b => b,
        };
        Ok(Self {
            lane_width,
            remainder,
            backend,
        })
    }

    pub fn lane_width(&self) -> usize {
        self.lane_width
    }

    pub fn remainder(&self) -> RemainderPolicy {
        self.remainder
    }

    pub fn backend(&self) -> SimdBackend {
        self.backend
    }

    /// Kernel for one lane group: four equal-length slices, output written in
    /// place.
    pub fn evaluate_lane_group(&self, x: &[f64], mean: &[f64], stddev: &[f64], result: &mut [f64]) -> Result<()> {
        check_lengths(x, mean, stddev, result)?;
        self.run_lane_group(x, mean, stddev, result);
        Ok(())
    }

    // callers have checked the lengths
    fn run_lane_group(&self, x: &[f64], mean: &[f64], stddev: &[f64], result: &mut [f64]) {
        match self.backend {
            #[cfg(target_arch = "x86_64")]
            SimdBackend::Avx2 => {
                // Safety: only selected when AVX2 was detected at runtime
                unsafe { crate::pdf_avx::evaluate_slices_avx(x, mean, stddev, result) }
            }
            #[cfg(target_arch = "aarch64")]
            SimdBackend::Neon => crate::pdf_arm::evaluate_slices_arm(x, mean, stddev, result),
            _ => {
                for (((r, &x), &m), &s) in result.iter_mut().zip(x).zip(mean).zip(stddev) {
                    *r = gaussian_pdf_with(x, m, s, exp_approx_f64);
                }
            }
        }
    }

    /// Runs every lane group of the given slices; the tail is handled per the
    /// remainder policy.
    pub fn evaluate_slices(&self, x: &[f64], mean: &[f64], stddev: &[f64], result: &mut [f64]) -> Result<()> {
        check_lengths(x, mean, stddev, result)?;

        let width = self.lane_width;
        let len = x.len();
        let full = len - len % width;
        if full != len && self.remainder == RemainderPolicy::Reject {
            return Err(PdfError::PartialLaneGroup {
                len,
                lane_width: width,
            });
        }

        let groups = x[..full]
            .chunks_exact(width)
            .zip(mean[..full].chunks_exact(width))
            .zip(stddev[..full].chunks_exact(width));
        for (r, ((x, m), s)) in result[..full].chunks_exact_mut(width).zip(groups) {
            self.run_lane_group(x, m, s, r);
        }

        if full != len {
            let tail = len - full;
            let reg = self.backend.doubles_per_register();
            let padded = ((tail + reg - 1) / reg * reg).min(width);
            debug!(
                "padding final lane group: {} of {} lanes used, {} evaluated",
                tail, width, padded
            );

            // stddev = 1 keeps the unused lanes finite
            let mut px = vec![0f64; padded];
            let mut pm = vec![0f64; padded];
            let mut ps = vec![1f64; padded];
            let mut pr = vec![0f64; padded];
            px[..tail].copy_from_slice(&x[full..]);
            pm[..tail].copy_from_slice(&mean[full..]);
            ps[..tail].copy_from_slice(&stddev[full..]);

            self.run_lane_group(&px, &pm, &ps, &mut pr);
            result[full..].copy_from_slice(&pr[..tail]);
        }

        Ok(())
    }
}

impl Evaluator for SimdEvaluator {
    fn name(&self) -> &'static str {
        SIMD_NAME
    }

    fn evaluate(&self, samples: &SampleSet, result: &mut [f64]) -> Result<()> {
        self.evaluate_slices(samples.x(), samples.mean(), samples.stddev(), result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(n: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let x = (0..n).map(|i| 10.0 + (i % 50) as f64 * 0.1).collect();
        let mean = (0..n).map(|i| 3.0 + (i % 30) as f64 * 0.1).collect();
        let stddev = (0..n).map(|i| 2.0 + (i % 40) as f64 * 0.1).collect();
        (x, mean, stddev)
    }

    fn expected(x: &[f64], mean: &[f64], stddev: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(mean)
            .zip(stddev)
            .map(|((&x, &m), &s)| gaussian_pdf_with(x, m, s, exp_approx_f64))
            .collect()
    }

    #[test]
    fn lane_group_matches_scalar_approx() {
        let (x, mean, stddev) = inputs(16);
        let eval = SimdEvaluator::new(16, RemainderPolicy::Pad).unwrap();
        let mut res = vec![0f64; 16];
        eval.evaluate_lane_group(&x, &mean, &stddev, &mut res).unwrap();
        assert_eq!(res, expected(&x, &mean, &stddev));
    }

    #[test]
    fn lane_group_length_mismatch() {
        let (x, mean, stddev) = inputs(16);
        let eval = SimdEvaluator::new(16, RemainderPolicy::Pad).unwrap();
        let mut res = vec![0f64; 16];
        assert_eq!(
            eval.evaluate_lane_group(&x, &mean[..8], &stddev, &mut res),
            Err(PdfError::LengthMismatch {
                expected: 16,
                actual: 8
            })
        );
        assert_eq!(
            eval.evaluate_lane_group(&x, &mean, &stddev, &mut res[..12]),
            Err(PdfError::LengthMismatch {
                expected: 16,
                actual: 12
            })
        );
        assert!(res.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn every_backend_agrees() {
        let (x, mean, stddev) = inputs(160);
        let expect = expected(&x, &mean, &stddev);
        for backend in [SimdBackend::Avx2, SimdBackend::Neon, SimdBackend::Portable] {
            let eval = SimdEvaluator::with_backend(16, RemainderPolicy::Pad, backend).unwrap();
            let mut res = vec![0f64; 160];
            eval.evaluate_slices(&x, &mean, &stddev, &mut res).unwrap();
            assert_eq!(res, expect, "backend {}", eval.backend());
        }
    }

    #[test]
    fn reject_partial_lane_group() {
        let (x, mean, stddev) = inputs(20);
        let eval = SimdEvaluator::new(16, RemainderPolicy::Reject).unwrap();
        let mut res = vec![0f64; 20];
        assert_eq!(
            eval.evaluate_slices(&x, &mean, &stddev, &mut res),
            Err(PdfError::PartialLaneGroup {
                len: 20,
                lane_width: 16
            })
        );
        // nothing written
        assert!(res.iter().all(|&v| v == 0.0));

        // exact multiples are fine
        let (x, mean, stddev) = inputs(32);
        let mut res = vec![0f64; 32];
        assert!(eval.evaluate_slices(&x, &mean, &stddev, &mut res).is_ok());
    }

    #[test]
    fn pad_partial_lane_group() {
        for n in [1, 15, 17, 20, 33] {
            let (x, mean, stddev) = inputs(n);
            let eval = SimdEvaluator::new(16, RemainderPolicy::Pad).unwrap();
            let mut res = vec![0f64; n];
            eval.evaluate_slices(&x, &mean, &stddev, &mut res).unwrap();
            assert_eq!(res, expected(&x, &mean, &stddev), "n = {}", n);
        }
    }

    #[test]
    fn pad_with_huge_lane_width() {
        // the padded tail is sized by the samples present, not the lane width
        let (x, mean, stddev) = inputs(3);
        for width in [1usize << 61, usize::MAX] {
            let eval = SimdEvaluator::new(width, RemainderPolicy::Pad).unwrap();
            let mut res = vec![0f64; 3];
            eval.evaluate_slices(&x, &mean, &stddev, &mut res).unwrap();
            assert_eq!(res, expected(&x, &mean, &stddev));
        }
    }

    #[test]
    fn odd_lane_width() {
        // lane width need not be a multiple of the register width
        let (x, mean, stddev) = inputs(21);
        let eval = SimdEvaluator::new(7, RemainderPolicy::Reject).unwrap();
        let mut res = vec![0f64; 21];
        eval.evaluate_slices(&x, &mean, &stddev, &mut res).unwrap();
        assert_eq!(res, expected(&x, &mean, &stddev));
    }

    #[test]
    fn zero_lane_width() {
        assert!(SimdEvaluator::new(0, RemainderPolicy::Pad).is_err());
    }

    #[test]
    fn remainder_policy_from_str() {
        assert_eq!("pad".parse::<RemainderPolicy>(), Ok(RemainderPolicy::Pad));
        assert_eq!("Reject".parse::<RemainderPolicy>(), Ok(RemainderPolicy::Reject));
        assert!("truncate".parse::<RemainderPolicy>().is_err());
    }
}
