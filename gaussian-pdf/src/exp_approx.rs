pub mod exp_f64_const {
    pub const EXP_BIAS: i64 = 1023; // zero point for exponent

    // ln(f64::MAX) and ln(2^-1075); beyond these exp is inf and 0
    pub const EXP_HI: f64 = 709.782712893384;
    pub const EXP_LO: f64 = -745.1332191019412;

    // taken from inavec
    pub const C0: f64 = 1.06906116358144185133e-04;
    pub const C1: f64 = 3.03543677780836240743e-01;
    pub const C2: f64 = -2.24339532327269441936e-01;
    pub const C3: f64 = -7.92041454535668681958e-02;

    // position of the exponent field
    pub const MANTISSA_BITS: i32 = 52;
}

/// 2^n for an integral `n` in [-1022, 1023], built directly from the exponent
/// bits.
#[inline(always)]
pub fn pow2i(n: f64) -> f64 {
    let bits = ((n as i64) + exp_f64_const::EXP_BIAS) << exp_f64_const::MANTISSA_BITS;
    f64::from_bits(bits as u64)
}

/// Approximate exponential; relative error stays below 1.1e-4 wherever the
/// result is a normal double. Subnormal results are reached by scaling in two
/// steps, below `EXP_LO` the result is 0, above `EXP_HI` it is inf, and NaN
/// passes through.
///
/// The vectorised versions in `exp_approx_avx` and `exp_approx_arm` perform
/// exactly the same sequence of operations, so their lanes match this
/// function bit for bit.
#[inline(always)]
pub fn exp_approx_f64(x_in: f64) -> f64 {
    // comparisons are false for NaN, so it carries through to p
    if x_in < exp_f64_const::EXP_LO {
        return 0.0;
    }
    if x_in > exp_f64_const::EXP_HI {
        return f64::INFINITY;
    }

    // apply approximation: split into integer and fractional power of two
    let x = x_in * std::f64::consts::LOG2_E;
    let fl = x.floor();
    let xf = x - fl;

    // 2^xf ~= 1 + xf - kn(xf)
    let mut kn = exp_f64_const::C3;
    kn = xf * kn + exp_f64_const::C2;
    kn = xf * kn + exp_f64_const::C1;
    kn = xf * kn + exp_f64_const::C0;
    let p = 1.0 + (xf - kn);

    // fl is in [-1076, 1024]; both halves stay normal powers of two and the
    // first product is exact, so only the last multiply can round
    let h = (fl * 0.5).floor();
    p * pow2i(h) * pow2i(fl - h)
}

/// Applies the approximation to every element, using the widest backend
/// available on this machine.
pub fn exp_approx_slice_in_place(vals: &mut [f64]) {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            // Safety: AVX2 confirmed available by runtime check.
            unsafe { exp_approx_slice_in_place_avx(vals) };
            return;
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        exp_approx_slice_in_place_arm(vals);
    }

    #[cfg(not(target_arch = "aarch64"))]
    {
        vals.iter_mut().for_each(|v| *v = exp_approx_f64(*v));
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn exp_approx_slice_in_place_avx(vals: &mut [f64]) {
    use crate::exp_approx_avx::{exp_approx_avxf64, DOUBLES_PER_AVX};
    use std::arch::x86_64::{_mm256_loadu_pd, _mm256_storeu_pd};

    let mut chunks = vals.chunks_exact_mut(DOUBLES_PER_AVX);
    for ch in &mut chunks {
        let v = _mm256_loadu_pd(ch.as_ptr());
        _mm256_storeu_pd(ch.as_mut_ptr(), exp_approx_avxf64(v));
    }

    // final short chunk goes through a zero-filled register
    let rem = chunks.into_remainder();
    if !rem.is_empty() {
        let mut padded = [0f64; DOUBLES_PER_AVX];
        padded[..rem.len()].copy_from_slice(rem);

        let res = exp_approx_avxf64(_mm256_loadu_pd(padded.as_ptr()));
        _mm256_storeu_pd(padded.as_mut_ptr(), res);

        rem.copy_from_slice(&padded[..rem.len()]);
    }
}

#[cfg(target_arch = "aarch64")]
fn exp_approx_slice_in_place_arm(vals: &mut [f64]) {
    use crate::exp_approx_arm::{exp_approx_armf64, DOUBLES_PER_NEON};
    use std::arch::aarch64::{vld1q_f64, vst1q_f64};

    let mut chunks = vals.chunks_exact_mut(DOUBLES_PER_NEON);
    for ch in &mut chunks {
        unsafe {
            let v = vld1q_f64(ch.as_ptr());
            vst1q_f64(ch.as_mut_ptr(), exp_approx_armf64(v));
        }
    }

    chunks
        .into_remainder()
        .iter_mut()
        .for_each(|v| *v = exp_approx_f64(*v));
}
