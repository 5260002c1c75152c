// Copyright 2025 the Specview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixtures shared by the viewport integration tests.

#![allow(dead_code, reason = "not every test binary uses every fixture")]

use std::sync::Arc;

use specview_surface_ref::{RasterSurface, pack_color};
use specview_viewport::{Histogram, Palette, Scrollbar, Spectrum, Viewport, ViewportConfig};

/// Widget width giving a plot exactly `plot_width` pixels wide with the default borders.
pub fn widget_width(plot_width: u32) -> u32 {
    plot_width + 60 + 3 + 4
}

/// Creates a viewport on a fresh raster surface and lays it out.
pub fn viewport(width: u32, height: u32, config: ViewportConfig) -> Viewport<RasterSurface> {
    let mut vp = Viewport::new(RasterSurface::new(width, height), config);
    vp.on_layout(width, height).expect("layout");
    vp
}

/// Delivers pending redraw requests, as a toolkit would at the end of an event cycle.
pub fn flush(vp: &mut Viewport<RasterSurface>) {
    while vp.surface_mut().take_redraw_request() {
        vp.on_expose().expect("expose");
    }
}

/// Histogram with counts `f(i)` and the identity calibration.
pub fn spectrum(n: usize, f: impl Fn(usize) -> f64) -> Arc<dyn Spectrum> {
    Arc::new(Histogram::from_counts((0..n).map(f)))
}

/// Packed crosshair colour of the default palette.
pub fn cursor_mask() -> u32 {
    pack_color(Palette::default().cursor)
}

/// Packed spectrum colour of the default palette.
pub fn spectrum_color() -> u32 {
    pack_color(Palette::default().spectrum)
}

/// Packed background colour of the default palette.
pub fn background() -> u32 {
    pack_color(Palette::default().background)
}

/// `clean` with an XOR crosshair through `cursor`; the crossing pixel is XORed twice.
pub fn with_crosshair(clean: &[u32], width: u32, cursor: (i32, i32), mask: u32) -> Vec<u32> {
    let width = width as usize;
    clean
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let x = i32::try_from(i % width).unwrap();
            let y = i32::try_from(i / width).unwrap();
            if (x == cursor.0) != (y == cursor.1) {
                p ^ mask
            } else {
                p
            }
        })
        .collect()
}

/// Scrollbar that remembers the last values it was given.
#[derive(Debug, Default)]
pub struct RecordingScrollbar {
    pub range: Option<(u32, u32)>,
    pub position: Option<u32>,
    pub updates: usize,
}

impl Scrollbar for RecordingScrollbar {
    fn set_range(&mut self, total: u32, visible: u32) {
        self.range = Some((total, visible));
        self.updates += 1;
    }

    fn set_position(&mut self, position: u32) {
        self.position = Some(position);
    }
}

/// Small deterministic generator for test inputs.
#[derive(Debug)]
pub struct Lcg(pub u64);

impl Lcg {
    pub fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 32) as u32
    }

    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / f64::from(u32::MAX)
    }

    /// Uniform integer in `lo..hi`.
    pub fn range(&mut self, lo: i32, hi: i32) -> i32 {
        let span = u32::try_from(hi - lo).unwrap();
        lo + i32::try_from(self.next_u32() % span).unwrap()
    }
}
