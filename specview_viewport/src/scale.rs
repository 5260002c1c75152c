// Copyright 2025 the Specview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis tick selection on a 1‑2‑5 ladder.

use smallvec::SmallVec;

/// Desired distance between labelled X ticks, in pixels.
pub const X_TICK_SPACING_PX: f64 = 80.0;

/// Desired distance between labelled Y ticks, in pixels.
pub const Y_TICK_SPACING_PX: f64 = 40.0;

const MAX_TICKS: usize = 1024;

/// Tick positions in data space.
pub type Ticks = SmallVec<[f64; 16]>;

/// Number of ticks that fit into `pixels` at the given spacing, at least one.
#[must_use]
pub fn target_ticks(pixels: f64, spacing_px: f64) -> f64 {
    (pixels / spacing_px).floor().max(1.0)
}

/// Chooses a step `k · 10ⁿ`, `k ∈ {1, 2, 5}`, for a data span.
///
/// The decade is `⌊log₁₀(span / target)⌋`; among the three candidates the one
/// whose tick count is closest to `target` wins, ties going to the finer step.
#[must_use]
pub fn nice_step(span: f64, target: f64) -> f64 {
    let span = span.abs();
    let target = target.max(1.0);
    if !span.is_finite() || span <= 0.0 {
        return 1.0;
    }
    let unit = 10_f64.powf((span / target).log10().floor());
    let mut best = unit;
    let mut best_err = f64::INFINITY;
    for k in [1.0, 2.0, 5.0] {
        let step = k * unit;
        let err = (span / step - target).abs();
        if err < best_err {
            best = step;
            best_err = err;
        }
    }
    best
}

/// Multiples of `step` inside `lo..=hi`.
#[must_use]
pub fn ticks(lo: f64, hi: f64, step: f64) -> Ticks {
    let mut out = Ticks::new();
    if !(step > 0.0 && lo.is_finite() && hi.is_finite()) {
        return out;
    }
    let first = (lo / step).ceil();
    let slack = step * 1e-9;
    for i in 0..MAX_TICKS {
        let v = (first + i as f64) * step;
        if v > hi + slack {
            break;
        }
        out.push(v);
    }
    out
}

/// Ticks of a logarithmic count axis up to `hi`.
///
/// Yields `(count, major)` pairs: decades `1, 10, 100, …` are major, the
/// multiples `2..=9` of each decade are minor.
#[must_use]
pub fn log_ticks(hi: f64) -> SmallVec<[(f64, bool); 32]> {
    let mut out = SmallVec::new();
    if !(hi >= 1.0 && hi.is_finite()) {
        return out;
    }
    let mut decade = 1.0;
    while decade <= hi && out.len() < MAX_TICKS {
        out.push((decade, true));
        for k in 2..10 {
            let v = decade * f64::from(k);
            if v > hi {
                break;
            }
            out.push((v, false));
        }
        decade *= 10.0;
    }
    out
}

/// Formats a tick value with the decimals implied by its step.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "decimal count of a finite positive step is small"
)]
pub fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 || step <= 0.0 {
        0
    } else {
        (-step.log10().floor()) as usize
    };
    // Avoid printing "-0".
    let value = if value.abs() < step.abs() * 1e-9 {
        0.0
    } else {
        value
    };
    format!("{value:.decimals$}")
}
