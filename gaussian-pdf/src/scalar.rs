use crate::error::Result;
use crate::exp_approx::exp_approx_f64;
use crate::pdf::{check_lengths, gaussian_pdf_with, Evaluator};
use crate::samples::SampleSet;

pub const NAIVE_NAME: &str = "naive scalar";
pub const FAST_APPROX_NAME: &str = "fast approximate scalar";

/// One element at a time with the standard library `exp`.
pub fn evaluate_naive(x: &[f64], mean: &[f64], stddev: &[f64], result: &mut [f64]) -> Result<()> {
    check_lengths(x, mean, stddev, result)?;
    for (((r, &x), &m), &s) in result.iter_mut().zip(x).zip(mean).zip(stddev) {
        *r = gaussian_pdf_with(x, m, s, f64::exp);
    }
    Ok(())
}

/// One element at a time with `exp_approx_f64`.
pub fn evaluate_fast_approx(
    x: &[f64],
    mean: &[f64],
    stddev: &[f64],
    result: &mut [f64],
) -> Result<()> {
    check_lengths(x, mean, stddev, result)?;
    for (((r, &x), &m), &s) in result.iter_mut().zip(x).zip(mean).zip(stddev) {
        *r = gaussian_pdf_with(x, m, s, exp_approx_f64);
    }
    Ok(())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NaiveEvaluator;

impl Evaluator for NaiveEvaluator {
    fn name(&self) -> &'static str {
        NAIVE_NAME
    }

    fn is_reference(&self) -> bool {
        true
    }

    fn evaluate(&self, samples: &SampleSet, result: &mut [f64]) -> Result<()> {
        evaluate_naive(samples.x(), samples.mean(), samples.stddev(), result)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FastApproxEvaluator;

impl Evaluator for FastApproxEvaluator {
    fn name(&self) -> &'static str {
        FAST_APPROX_NAME
    }

    fn evaluate(&self, samples: &SampleSet, result: &mut [f64]) -> Result<()> {
        evaluate_fast_approx(samples.x(), samples.mean(), samples.stddev(), result)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::PdfError;

    // computed independently: 0.25 * c * exp(-0.5 * (8.5 / 4)^2)
    const FIXTURE: f64 = 0.010430246610439843;

    #[test]
    fn naive_fixture() {
        let mut res = [0f64; 1];
        super::evaluate_naive(&[13.0], &[4.5], &[4.0], &mut res).unwrap();
        assert_relative_eq!(res[0], FIXTURE, max_relative = 1e-12);
    }

    #[test]
    fn fast_approx_fixture() {
        let mut res = [0f64; 1];
        super::evaluate_fast_approx(&[13.0], &[4.5], &[4.0], &mut res).unwrap();
        assert_relative_eq!(res[0], FIXTURE, max_relative = 1e-3);
        assert_ne!(res[0], FIXTURE);
    }

    #[test]
    fn zero_stddev_is_not_finite() {
        let mut res = [0f64; 2];
        // x != mean and x == mean
        super::evaluate_naive(&[13.0, 4.5], &[4.5, 4.5], &[0.0, 0.0], &mut res).unwrap();
        assert!(res.iter().all(|v| !v.is_finite()));

        let mut res = [0f64; 2];
        super::evaluate_fast_approx(&[13.0, 4.5], &[4.5, 4.5], &[0.0, 0.0], &mut res).unwrap();
        assert!(res.iter().all(|v| !v.is_finite()));
    }

    #[test]
    fn length_mismatch() {
        let mut res = [0f64; 1];
        assert_eq!(
            super::evaluate_naive(&[1.0, 2.0], &[1.0, 2.0], &[1.0, 2.0], &mut res),
            Err(PdfError::LengthMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert!(super::evaluate_fast_approx(&[1.0], &[1.0, 2.0], &[1.0], &mut res).is_err());
    }
}
