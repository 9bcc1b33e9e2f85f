use std::arch::x86_64::*;

use crate::exp_approx::exp_approx_f64;
use crate::exp_approx_avx::{exp_approx_avxf64, DOUBLES_PER_AVX};
use crate::pdf::{gaussian_pdf_with, INV_SQRT_2PI, NEG_HALF};

/// Density for four lanes at once; same operation order as
/// `pdf::gaussian_pdf_with`.
#[inline]
#[target_feature(enable = "avx2")]
pub unsafe fn gaussian_pdf_avxf64(x: __m256d, mean: __m256d, stddev: __m256d) -> __m256d {
    let inv = _mm256_div_pd(_mm256_set1_pd(1.0), stddev);
    let d = _mm256_sub_pd(x, mean);

    // ((d * d) * inv) * inv
    let mut sq = _mm256_mul_pd(d, d);
    sq = _mm256_mul_pd(sq, inv);
    sq = _mm256_mul_pd(sq, inv);
    let err = _mm256_mul_pd(_mm256_set1_pd(NEG_HALF), sq);

    let scale = _mm256_mul_pd(inv, _mm256_set1_pd(INV_SQRT_2PI));
    _mm256_mul_pd(scale, exp_approx_avxf64(err))
}

/// Walks equal-length slices a register at a time. Slices whose length is not
/// a multiple of the register width finish on the scalar formula, which gives
/// the same bits.
#[target_feature(enable = "avx2")]
pub unsafe fn evaluate_slices_avx(x: &[f64], mean: &[f64], stddev: &[f64], result: &mut [f64]) {
    debug_assert!(x.len() == result.len() && mean.len() == result.len() && stddev.len() == result.len());
    let done = result.len() - result.len() % DOUBLES_PER_AVX;

    let src = x
        .chunks_exact(DOUBLES_PER_AVX)
        .zip(mean.chunks_exact(DOUBLES_PER_AVX))
        .zip(stddev.chunks_exact(DOUBLES_PER_AVX));

    for (r, ((x, m), s)) in result.chunks_exact_mut(DOUBLES_PER_AVX).zip(src) {
        let v = gaussian_pdf_avxf64(
            _mm256_loadu_pd(x.as_ptr()),
            _mm256_loadu_pd(m.as_ptr()),
            _mm256_loadu_pd(s.as_ptr()),
        );
        _mm256_storeu_pd(r.as_mut_ptr(), v);
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
