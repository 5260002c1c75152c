// Copyright 2025 the Specview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spectrum capability and a calibrated in-memory histogram.

use core::fmt;

use smallvec::SmallVec;

/// Read-only view of a histogrammed spectrum.
///
/// Bin indices run over `0..n_bins()`. The calibration must be monotonically
/// increasing over that range; fractional bin indices address positions
/// between bin centres.
pub trait Spectrum: fmt::Debug {
    /// Number of bins.
    fn n_bins(&self) -> usize;

    /// Energy of a (fractional) bin index.
    fn bin_to_energy(&self, bin: f64) -> f64;

    /// Fractional bin index of an energy; the inverse of [`Spectrum::bin_to_energy`].
    fn energy_to_bin(&self, energy: f64) -> f64;

    /// Count of bin `bin`; zero outside `0..n_bins()`.
    fn count(&self, bin: usize) -> f64;

    /// Energy of the first bin centre.
    fn min_energy(&self) -> f64 {
        self.bin_to_energy(0.0)
    }

    /// Energy of the last bin centre.
    fn max_energy(&self) -> f64 {
        let last = self.n_bins().saturating_sub(1);
        self.bin_to_energy(last as f64)
    }
}

/// Polynomial energy calibration `E(i) = a₀ + a₁·i + a₂·i² + …`.
#[derive(Clone, Debug, PartialEq)]
pub struct Calibration {
    coeffs: SmallVec<[f64; 4]>,
}

impl Calibration {
    const NEWTON_ITERATIONS: usize = 32;

    /// Creates a calibration from its coefficients, lowest order first.
    ///
    /// Trailing zero coefficients are dropped. An empty list yields the identity.
    #[must_use]
    pub fn new(coeffs: impl IntoIterator<Item = f64>) -> Self {
        let mut coeffs: SmallVec<[f64; 4]> = coeffs.into_iter().collect();
        while coeffs.len() > 2 && coeffs.last() == Some(&0.0) {
            coeffs.pop();
        }
        if coeffs.is_empty() {
            return Self::identity();
        }
        Self { coeffs }
    }

    /// `E(i) = i`.
    #[must_use]
    pub fn identity() -> Self {
        Self::linear(0.0, 1.0)
    }

    /// `E(i) = a0 + a1·i`.
    #[must_use]
    pub fn linear(a0: f64, a1: f64) -> Self {
        Self {
            coeffs: SmallVec::from_slice(&[a0, a1]),
        }
    }

    /// Coefficients, lowest order first.
    #[must_use]
    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    /// Evaluates the calibration at a fractional bin index.
    #[must_use]
    pub fn energy(&self, bin: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, a| acc * bin + a)
    }

    fn slope(&self, bin: f64) -> f64 {
        self.coeffs
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .fold(0.0, |acc, (k, a)| acc * bin + k as f64 * a)
    }

    /// Inverts the calibration.
    ///
    /// Linear calibrations are inverted exactly; higher orders use Newton
    /// iteration started from the linear part.
    #[must_use]
    pub fn bin(&self, energy: f64) -> f64 {
        let a0 = self.coeffs[0];
        let a1 = self.coeffs.get(1).copied().unwrap_or(0.0);
        if self.coeffs.len() <= 2 {
            return if a1 == 0.0 { 0.0 } else { (energy - a0) / a1 };
        }

        let mut x = if a1 == 0.0 { 0.0 } else { (energy - a0) / a1 };
        for _ in 0..Self::NEWTON_ITERATIONS {
            let slope = self.slope(x);
            if slope == 0.0 || !slope.is_finite() {
                break;
            }
            let step = (self.energy(x) - energy) / slope;
            x -= step;
            if step.abs() <= 1e-12 * (1.0 + x.abs()) {
                break;
            }
        }
        x
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::identity()
    }
}

/// Owned histogram with a polynomial calibration.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    counts: Vec<f64>,
    calibration: Calibration,
}

impl Histogram {
    /// Creates a histogram. Negative and non-finite counts are stored as zero.
    #[must_use]
    pub fn new(counts: impl IntoIterator<Item = f64>, calibration: Calibration) -> Self {
        let counts = counts
            .into_iter()
            .map(|c| if c.is_finite() && c > 0.0 { c } else { 0.0 })
            .collect();
        Self {
            counts,
            calibration,
        }
    }

    /// Creates a histogram with the identity calibration.
    #[must_use]
    pub fn from_counts(counts: impl IntoIterator<Item = f64>) -> Self {
        Self::new(counts, Calibration::identity())
    }

    /// Raw counts.
    #[must_use]
    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    /// The energy calibration.
    #[must_use]
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }
}

impl Spectrum for Histogram {
    fn n_bins(&self) -> usize {
        self.counts.len()
    }

    fn bin_to_energy(&self, bin: f64) -> f64 {
        self.calibration.energy(bin)
    }

    fn energy_to_bin(&self, energy: f64) -> f64 {
        self.calibration.bin(energy)
    }

    fn count(&self, bin: usize) -> f64 {
        self.counts.get(bin).copied().unwrap_or(0.0)
    }
}
