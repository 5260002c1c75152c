// Copyright 2025 the Specview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Peak-preserving, pixel-column view of a spectrum.

use std::sync::Arc;

use crate::coord::CoordinateMap;
use crate::spectrum::Spectrum;

/// Map parameters a column cache was built for.
#[derive(Clone, Copy, Debug, PartialEq)]
struct CacheKey {
    offset: f64,
    x_visible: f64,
    width: f64,
}

impl CacheKey {
    fn of(map: &CoordinateMap) -> Self {
        Self {
            offset: map.offset(),
            x_visible: map.x_visible(),
            width: map.size().width,
        }
    }
}

/// A spectrum together with its per-pixel-column aggregate.
///
/// Column `x` (relative to the plot's base point, `0..=width`) holds the
/// maximum count of every bin whose extent `[i − ½, i + ½)` overlaps the
/// column's energy span. Several bins falling into one column collapse onto
/// their maximum; a bin spanning several columns fills each of them, giving
/// a staircase at deep zoom. Columns beyond the first or last bin are zero.
///
/// The aggregate is built lazily for one [`CoordinateMap`] and dropped by
/// [`DisplaySpectrum::invalidate`] or when queried with a map whose offset,
/// visible X region or width differ.
#[derive(Debug)]
pub struct DisplaySpectrum {
    source: Arc<dyn Spectrum>,
    columns: Vec<f64>,
    key: Option<CacheKey>,
}

impl DisplaySpectrum {
    /// Wraps a spectrum. No columns are computed until first queried.
    #[must_use]
    pub fn new(source: Arc<dyn Spectrum>) -> Self {
        Self {
            source,
            columns: Vec::new(),
            key: None,
        }
    }

    /// The underlying spectrum.
    #[must_use]
    pub fn spectrum(&self) -> &Arc<dyn Spectrum> {
        &self.source
    }

    /// Drops the column cache.
    pub fn invalidate(&mut self) {
        self.key = None;
    }

    /// Returns `true` if a column cache is present.
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.key.is_some()
    }

    /// Aggregate value of plot column `x`.
    ///
    /// Columns inside the plot are served from the cache, which is rebuilt
    /// first if it does not match `map`; columns outside are computed directly.
    pub fn pixel_value(&mut self, map: &CoordinateMap, x: i32) -> f64 {
        self.ensure(map);
        match usize::try_from(x).ok().and_then(|i| self.columns.get(i)) {
            Some(v) => *v,
            None => column_max(self.source.as_ref(), map, x),
        }
    }

    /// Maximum aggregate over the visible columns, or zero for an empty view.
    pub fn y_auto_zoom(&mut self, map: &CoordinateMap) -> f64 {
        self.ensure(map);
        self.columns.iter().copied().fold(0.0, f64::max)
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "the plot width is an integral pixel count"
    )]
    fn ensure(&mut self, map: &CoordinateMap) {
        let key = CacheKey::of(map);
        if self.key == Some(key) {
            return;
        }
        let n = map.size().width as usize + 1;
        self.columns.clear();
        self.columns.extend(
            (0..n).map(|x| column_max(self.source.as_ref(), map, x as i32)),
        );
        self.key = Some(key);
    }
}

/// Maximum count over the bins overlapping plot column `x`.
#[expect(
    clippy::cast_possible_truncation,
    reason = "bin bounds are clamped to 0..n_bins before casting"
)]
fn column_max(source: &dyn Spectrum, map: &CoordinateMap, x: i32) -> f64 {
    let n_bins = source.n_bins();
    if n_bins == 0 {
        return 0.0;
    }
    let e1 = map.offset() + map.dx_to_de(f64::from(x));
    let e2 = map.offset() + map.dx_to_de(f64::from(x) + 1.0);
    let (mut f1, mut f2) = (source.energy_to_bin(e1), source.energy_to_bin(e2));
    if f1 > f2 {
        core::mem::swap(&mut f1, &mut f2);
    }
    // Bin i overlaps [f1, f2) iff f1 - 1/2 < i < f2 + 1/2.
    let lo = ((f1 - 0.5).floor() + 1.0).max(0.0);
    let hi = ((f2 + 0.5).ceil() - 1.0).min((n_bins - 1) as f64);
    if lo.is_nan() || hi.is_nan() || lo > hi {
        return 0.0;
    }
    (lo as usize..=hi as usize)
        .map(|i| source.count(i))
        .fold(0.0, f64::max)
}
