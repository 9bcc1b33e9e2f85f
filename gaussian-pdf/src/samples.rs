use std::ops::Range;

use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use crate::error::{PdfError, Result};

/// Half-open ranges the three input arrays are drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRanges {
    pub x: Range<f64>,
    pub mean: Range<f64>,
    pub stddev: Range<f64>,
}

impl Default for SampleRanges {
    fn default() -> Self {
        Self {
            x: 10.0..15.0,
            mean: 3.0..6.0,
            // strictly positive, so the formula never divides by zero
            stddev: 2.0..6.0,
        }
    }
}

impl SampleRanges {
    pub fn validate(&self) -> Result<()> {
        for (name, r) in [("x", &self.x), ("mean", &self.mean), ("stddev", &self.stddev)] {
            if !(r.start.is_finite() && r.end.is_finite() && r.start < r.end) {
                return Err(PdfError::InvalidConfig(format!(
                    "{} range {:?} must be finite and non-empty",
                    name, r
                )));
            }
        }
        Ok(())
    }
}

/// Input arrays for one benchmark run; `x`, `mean` and `stddev` always have
/// the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    x: Vec<f64>,
    mean: Vec<f64>,
    stddev: Vec<f64>,
}

impl SampleSet {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Self {
        Self::draw(rng, n, &SampleRanges::default())
    }

    pub fn generate_with_ranges<R: Rng + ?Sized>(
        rng: &mut R,
        n: usize,
        ranges: &SampleRanges,
    ) -> Result<Self> {
        ranges.validate()?;
        Ok(Self::draw(rng, n, ranges))
    }

    fn draw<R: Rng + ?Sized>(rng: &mut R, n: usize, ranges: &SampleRanges) -> Self {
        let dist_x = Uniform::new(ranges.x.start, ranges.x.end);
        let dist_mean = Uniform::new(ranges.mean.start, ranges.mean.end);
        let dist_stddev = Uniform::new(ranges.stddev.start, ranges.stddev.end);

        let mut set = Self {
            x: Vec::with_capacity(n),
            mean: Vec::with_capacity(n),
            stddev: Vec::with_capacity(n),
        };
        // interleaved, one triple per sample
        for _ in 0..n {
            set.x.push(dist_x.sample(rng));
            set.mean.push(dist_mean.sample(rng));
            set.stddev.push(dist_stddev.sample(rng));
        }
        set
    }

    pub fn from_vecs(x: Vec<f64>, mean: Vec<f64>, stddev: Vec<f64>) -> Result<Self> {
        for actual in [mean.len(), stddev.len()] {
            if actual != x.len() {
                return Err(PdfError::LengthMismatch {
                    expected: x.len(),
                    actual,
                });
            }
        }
        Ok(Self { x, mean, stddev })
    }

    /// Extends the set to a multiple of `lane_width` with harmless samples
    /// (`x = mean = 0`, `stddev = 1`). Returns how many were added.
    pub fn pad_to_multiple(&mut self, lane_width: usize) -> Result<usize> {
        if lane_width == 0 {
            return Err(PdfError::InvalidConfig("lane width must be non-zero".into()));
        }
        let extra = match self.len() % lane_width {
            0 => 0,
            r => lane_width - r,
        };
        let len = self.len() + extra;
        self.x.resize(len, 0.0);
        self.mean.resize(len, 0.0);
        self.stddev.resize(len, 1.0);
        Ok(extra)
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn stddev(&self) -> &[f64] {
        &self.stddev
    }

    /// Zero-filled output buffer of matching length.
    pub fn result_buffer(&self) -> Vec<f64> {
        vec![0.0; self.len()]
    }
}
