use crate::error::{PdfError, Result};
use crate::samples::SampleSet;

/// 1/sqrt(2π) at single precision, widened; every evaluator uses this same
/// value so their outputs are comparable.
pub const INV_SQRT_2PI: f64 = 0.398_942_28_f32 as f64;

pub const NEG_HALF: f64 = -0.5;

/// Gaussian density with a pluggable exponential.
///
/// The operation order here (`((d * d) * inv) * inv`, then `(inv * c) * e`) is
/// mirrored by the vector kernels; keep them in step.
#[inline(always)]
pub fn gaussian_pdf_with<F>(x: f64, mean: f64, stddev: f64, exp: F) -> f64
where
    F: Fn(f64) -> f64,
{
    let inv = 1.0 / stddev;
    let d = x - mean;
    let err = NEG_HALF * (d * d * inv * inv);
    inv * INV_SQRT_2PI * exp(err)
}

/// A benchmarked way of filling `result[i] = pdf(x[i], mean[i], stddev[i])`.
pub trait Evaluator {
    fn name(&self) -> &'static str;

    /// The evaluator others are verified against.
    fn is_reference(&self) -> bool {
        false
    }

    fn evaluate(&self, samples: &SampleSet, result: &mut [f64]) -> Result<()>;
}

pub(crate) fn check_lengths(x: &[f64], mean: &[f64], stddev: &[f64], result: &[f64]) -> Result<()> {
    let expected = x.len();
    for actual in [mean.len(), stddev.len(), result.len()] {
        if actual != expected {
            return Err(PdfError::LengthMismatch { expected, actual });
        }
    }
    Ok(())
}
