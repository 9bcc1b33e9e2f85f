use std::arch::x86_64::*;

use crate::exp_approx::exp_f64_const;

pub const DOUBLES_PER_AVX: usize = 4;

/// Four-lane version of `exp_approx::exp_approx_f64`.
///
/// AVX2 has no double to 64-bit integer conversion, so the integer part goes
/// through 32-bit lanes (`cvtpd_epi32`) and is widened before shifting into
/// the exponent field.
#[inline]
#[target_feature(enable = "avx2")]
pub unsafe fn exp_approx_avxf64(x_in: __m256d) -> __m256d {
    let mut x = x_in;

    // clamp x; constant first so a NaN in x is the operand that survives
    x = _mm256_min_pd(_mm256_set1_pd(exp_f64_const::EXP_HI), x);
    x = _mm256_max_pd(_mm256_set1_pd(exp_f64_const::EXP_LO), x);

    // apply approximation
    x = _mm256_mul_pd(x, _mm256_set1_pd(std::f64::consts::LOG2_E));
    let fl = _mm256_floor_pd(x);
    let xf = _mm256_sub_pd(x, fl);

    let mut kn = _mm256_set1_pd(exp_f64_const::C3);
    // multiply add kept separate so lanes match the scalar version exactly
    kn = _mm256_add_pd(_mm256_mul_pd(xf, kn), _mm256_set1_pd(exp_f64_const::C2));
    kn = _mm256_add_pd(_mm256_mul_pd(xf, kn), _mm256_set1_pd(exp_f64_const::C1));
    kn = _mm256_add_pd(_mm256_mul_pd(xf, kn), _mm256_set1_pd(exp_f64_const::C0));
    let p = _mm256_add_pd(_mm256_set1_pd(1.0), _mm256_sub_pd(xf, kn));

    // p * 2^h * 2^(fl - h), as in the scalar version
    let h = _mm256_floor_pd(_mm256_mul_pd(fl, _mm256_set1_pd(0.5)));
    let res = _mm256_mul_pd(_mm256_mul_pd(p, pow2i_avx(h)), pow2i_avx(_mm256_sub_pd(fl, h)));

    // out of range lanes were clamped above; select 0 and inf for them now.
    // ordered compares, so NaN lanes keep the NaN from p
    let under = _mm256_cmp_pd::<{ _CMP_LT_OQ }>(x_in, _mm256_set1_pd(exp_f64_const::EXP_LO));
    let over = _mm256_cmp_pd::<{ _CMP_GT_OQ }>(x_in, _mm256_set1_pd(exp_f64_const::EXP_HI));
    let res = _mm256_blendv_pd(res, _mm256_setzero_pd(), under);
    _mm256_blendv_pd(res, _mm256_set1_pd(f64::INFINITY), over)
}

/// 2^n from exponent bits: (n + bias) << 52. `n` must be integral and within
/// the normal exponent range.
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn pow2i_avx(n: __m256d) -> __m256d {
    let n_i32 = _mm256_cvtpd_epi32(n); // exact, n is already integral
    let n_i64 = _mm256_cvtepi32_epi64(n_i32);
    let biased = _mm256_add_epi64(n_i64, _mm256_set1_epi64x(exp_f64_const::EXP_BIAS));
    _mm256_castsi256_pd(_mm256_slli_epi64::<{ exp_f64_const::MANTISSA_BITS }>(biased))
}
