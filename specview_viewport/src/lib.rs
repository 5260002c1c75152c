// Copyright 2025 the Specview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=specview_viewport --heading-base-level=0

//! Specview Viewport: an incremental view of a histogrammed spectrum.
//!
//! This crate maps a one‑dimensional spectrum (counts per energy bin) onto a
//! raster [`DrawingSurface`] and keeps the picture up to date while the user
//! pans, zooms and moves a crosshair. It focuses on:
//! - A floating‑point [`CoordinateMap`] between energy/count space and device
//!   pixels, with linear or logarithmic counts.
//! - A peak‑preserving [`DisplaySpectrum`]: each pixel column shows the
//!   maximum of the bins falling into it, so narrow peaks survive any zoom.
//! - A [`SpectrumPainter`] that draws pixel strips of the spectrum and the
//!   axes, with tick steps on a 1‑2‑5 ladder.
//! - The [`Viewport`] state machine, which turns whole‑pixel pans into a
//!   block copy plus a repaint of the exposed strip and schedules full
//!   redraws only when the scale changes.
//!
//! It does **not** own a window or an event loop. Callers are expected to:
//! - Provide a [`DrawingSurface`] for their toolkit.
//! - Forward pointer, layout, expose and scrollbar events to the `on_*`
//!   handlers and deliver redraw requests back as [`Viewport::on_expose`].
//! - Load spectra as [`Arc<dyn Spectrum>`](Spectrum); [`Histogram`] is a
//!   ready‑made calibrated implementation.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use specview_surface_ref::RasterSurface;
//! use specview_viewport::{Histogram, Viewport, ViewportConfig};
//!
//! let mut vp = Viewport::new(RasterSurface::new(567, 300), ViewportConfig::default());
//! vp.on_layout(567, 300)?;
//!
//! let counts: Vec<f64> = (0..1000).map(|i| f64::from(i % 97)).collect();
//! vp.load_spectrum(Arc::new(Histogram::from_counts(counts)))?;
//! vp.show_all()?;
//!
//! // The toolkit delivers the coalesced redraw request as an expose.
//! if vp.surface_mut().take_redraw_request() {
//!     vp.on_expose()?;
//! }
//! assert_eq!(vp.state().offset, 0.0);
//! assert_eq!(vp.state().x_visible, 999.0);
//! # Ok::<(), specview_viewport::ViewportError>(())
//! ```
//!
//! ## Design notes
//!
//! - The viewport is single-threaded and every handler runs to completion.
//!   Within one handler the order is: erase cursor, mutate state, draw,
//!   redraw cursor.
//! - The crosshair is drawn with an XOR graphics context, so drawing it twice
//!   restores the pixels underneath.
//! - Only drawing-surface failures are returned as errors. Other problems
//!   are reported through [`Conditions`] and logged with the `log` facade.

mod config;
mod coord;
mod display;
mod error;
mod markers;
mod modes;
mod painter;
mod scale;
mod scrollbar;
mod spectrum;
mod viewport;

pub use config::{Borders, Palette, ViewportConfig};
pub use coord::{CoordinateMap, LOG_FLOOR};
pub use display::DisplaySpectrum;
pub use error::{Conditions, ViewportError};
pub use markers::{MarkerId, Markers};
pub use modes::{ButtonState, Crossing, ViewMode};
pub use painter::{PainterGcs, SpectrumPainter};
pub use scale::{
    Ticks, X_TICK_SPACING_PX, Y_TICK_SPACING_PX, format_tick, log_ticks, nice_step,
    target_ticks, ticks,
};
pub use scrollbar::Scrollbar;
pub use specview_surface::DrawingSurface;
pub use spectrum::{Calibration, Histogram, Spectrum};
pub use viewport::{Viewport, ViewportState};
