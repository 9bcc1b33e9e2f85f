use std::fmt;

use approx::relative_eq;
use log::{debug, warn};

use crate::error::{PdfError, Result};
use crate::harness::BenchReport;

/// Outcome of comparing one evaluator's output with the reference output.
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub evaluator: &'static str,
    pub reference: &'static str,
    pub tolerance: f64,
    pub max_relative_error: f64,
    pub worst_index: Option<usize>,
    pub mismatches: usize,
    pub compared: usize,
}

impl Verification {
    pub fn passed(&self) -> bool {
        self.mismatches == 0
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Verified {} against {} : max relative error {:e}",
            self.evaluator, self.reference, self.max_relative_error
        )?;
        if let Some(i) = self.worst_index {
            write!(f, " at index {}", i)?;
        }
        write!(
            f,
            ", {} of {} outside {:e} => {}",
            self.mismatches,
            self.compared,
            self.tolerance,
            if self.passed() { "ok" } else { "FAILED" }
        )
    }
}

/// Differences no larger than the smallest normal double count as agreement.
/// Below it results are subnormal and carry too few bits for a relative
/// comparison.
pub const ABSOLUTE_FLOOR: f64 = f64::MIN_POSITIVE;

/// `|a - b| / max(|a|, |b|)`. Identical values (matching infinities
/// included), NaN on both sides and pairs within `ABSOLUTE_FLOOR` count as
/// zero; any other non-finite pairing is infinitely far apart.
pub fn relative_error(a: f64, b: f64) -> f64 {
    if a == b || (a.is_nan() && b.is_nan()) || (a - b).abs() <= ABSOLUTE_FLOOR {
        return 0.0;
    }
    if !a.is_finite() || !b.is_finite() {
        return f64::INFINITY;
    }
    (a - b).abs() / a.abs().max(b.abs())
}

fn agrees(a: f64, b: f64, tolerance: f64) -> bool {
    (a.is_nan() && b.is_nan()) || relative_eq!(a, b, epsilon = ABSOLUTE_FLOOR, max_relative = tolerance)
}

pub fn verify(
    evaluator: &'static str,
    reference_name: &'static str,
    reference: &[f64],
    candidate: &[f64],
    tolerance: f64,
) -> Result<Verification> {
    if candidate.len() != reference.len() {
        return Err(PdfError::LengthMismatch {
            expected: reference.len(),
            actual: candidate.len(),
        });
    }

    let mut max_relative_error = 0f64;
    let mut worst_index = None;
    let mut mismatches = 0;
    for (i, (&r, &c)) in reference.iter().zip(candidate).enumerate() {
        let err = relative_error(r, c);
        if worst_index.is_none() || err > max_relative_error {
            max_relative_error = err;
            worst_index = Some(i);
        }
        if !agrees(r, c, tolerance) {
            mismatches += 1;
        }
    }

    Ok(Verification {
        evaluator,
        reference: reference_name,
        tolerance,
        max_relative_error,
        worst_index,
        mismatches,
        compared: reference.len(),
    })
}

/// Checks every non-reference timing in the report against the reference
/// one. Empty if the report has no reference evaluator.
pub fn verify_report(report: &BenchReport, tolerance: f64) -> Result<Vec<Verification>> {
    let reference = match report.reference() {
        Some(r) => r,
        None => {
            warn!("no reference evaluator in report, skipping verification");
            return Ok(Vec::new());
        }
    };

    let mut out = Vec::new();
    for timing in report.timings.iter().filter(|t| !t.reference) {
        let v = verify(timing.name, reference.name, &reference.result, &timing.result, tolerance)?;
        if v.passed() {
            debug!("{}", v);
        } else {
            warn!("{}", v);
        }
        out.push(v);
    }
    Ok(out)
}
