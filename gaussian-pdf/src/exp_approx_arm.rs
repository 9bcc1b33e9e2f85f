use std::arch::aarch64::*;

use crate::exp_approx::exp_f64_const;

pub const DOUBLES_PER_NEON: usize = 2;

/// Two-lane version of `exp_approx::exp_approx_f64`.
#[inline(always)]
pub unsafe fn exp_approx_armf64(x_in: float64x2_t) -> float64x2_t {
    // multiply, clamp and calculate the fractional part;
    // fmin/fmax propagate NaN
    let mut x = x_in;
    x = vminq_f64(x, vdupq_n_f64(exp_f64_const::EXP_HI));
    x = vmaxq_f64(x, vdupq_n_f64(exp_f64_const::EXP_LO));
    x = vmulq_f64(x, vdupq_n_f64(std::f64::consts::LOG2_E));
    let fl = vrndmq_f64(x); // floor
    let xf = vsubq_f64(x, fl);

    // calculate the approximation; separate fmul/fadd, no fused ops
    let mut kn = vdupq_n_f64(exp_f64_const::C3);
    kn = vaddq_f64(vmulq_f64(xf, kn), vdupq_n_f64(exp_f64_const::C2));
    kn = vaddq_f64(vmulq_f64(xf, kn), vdupq_n_f64(exp_f64_const::C1));
    kn = vaddq_f64(vmulq_f64(xf, kn), vdupq_n_f64(exp_f64_const::C0));
    let p = vaddq_f64(vdupq_n_f64(1.0), vsubq_f64(xf, kn));

    // p * 2^h * 2^(fl - h), as in the scalar version
    let h = vrndmq_f64(vmulq_f64(fl, vdupq_n_f64(0.5)));
    let res = vmulq_f64(vmulq_f64(p, pow2i_arm(h)), pow2i_arm(vsubq_f64(fl, h)));

    // replace the clamped lanes; compares are false for NaN
    let under = vcltq_f64(x_in, vdupq_n_f64(exp_f64_const::EXP_LO));
    let over = vcgtq_f64(x_in, vdupq_n_f64(exp_f64_const::EXP_HI));
    let res = vbslq_f64(under, vdupq_n_f64(0.0), res);
    vbslq_f64(over, vdupq_n_f64(f64::INFINITY), res)
}

/// 2^n by placing the biased integer in the exponent field.
#[inline(always)]
unsafe fn pow2i_arm(n: float64x2_t) -> float64x2_t {
    let n_i = vcvtq_s64_f64(n); // exact, n is already integral
    let biased = vaddq_s64(n_i, vdupq_n_s64(exp_f64_const::EXP_BIAS));
    vreinterpretq_f64_s64(vshlq_n_s64::<{ exp_f64_const::MANTISSA_BITS }>(biased))
}
