use std::arch::aarch64::*;

use crate::exp_approx::exp_approx_f64;
use crate::exp_approx_arm::{exp_approx_armf64, DOUBLES_PER_NEON};
use crate::pdf::{gaussian_pdf_with, INV_SQRT_2PI, NEG_HALF};

#[inline(always)]
pub unsafe fn gaussian_pdf_armf64(
    x: float64x2_t,
    mean: float64x2_t,
    stddev: float64x2_t,
) -> float64x2_t {
    let inv = vdivq_f64(vdupq_n_f64(1.0), stddev);
    let d = vsubq_f64(x, mean);

    // ((d * d) * inv) * inv
    let mut sq = vmulq_f64(d, d);
    sq = vmulq_f64(sq, inv);
    sq = vmulq_f64(sq, inv);
    let err = vmulq_f64(vdupq_n_f64(NEG_HALF), sq);

    let scale = vmulq_f64(inv, vdupq_n_f64(INV_SQRT_2PI));
    vmulq_f64(scale, exp_approx_armf64(err))
}

pub fn evaluate_slices_arm(x: &[f64], mean: &[f64], stddev: &[f64], result: &mut [f64]) {
    debug_assert!(x.len() == result.len() && mean.len() == result.len() && stddev.len() == result.len());
    let done = result.len() - result.len() % DOUBLES_PER_NEON;

    let src = x
        .chunks_exact(DOUBLES_PER_NEON)
        .zip(mean.chunks_exact(DOUBLES_PER_NEON))
        .zip(stddev.chunks_exact(DOUBLES_PER_NEON));

    for (r, ((x, m), s)) in result.chunks_exact_mut(DOUBLES_PER_NEON).zip(src) {
        unsafe {
            let v = gaussian_pdf_armf64(
                vld1q_f64(x.as_ptr()),
                vld1q_f64(m.as_ptr()),
                vld1q_f64(s.as_ptr()),
            );
            vst1q_f64(r.as_mut_ptr(), v);
        }
    }

    let tail = result[done..]
        .iter_mut()
        .zip(&x[done..])
        .zip(&mean[done..])
        .zip(&stddev[done..]);
    for (((r, &x), &m), &s) in tail {
        *r = gaussian_pdf_with(x, m, s, exp_approx_f64);
    }
}
