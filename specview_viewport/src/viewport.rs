// Copyright 2025 the Specview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The viewport state machine.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use kurbo::Point;
use specview_surface::{DrawingSurface, GcDesc, GcId, PixelRect, RasterOp, SurfaceError};

use crate::config::{Borders, ViewportConfig, is_positive};
use crate::coord::CoordinateMap;
use crate::display::DisplaySpectrum;
use crate::error::{Conditions, ViewportError};
use crate::markers::{MarkerId, Markers};
use crate::modes::{ButtonState, Crossing, ViewMode};
use crate::painter::{PainterGcs, SpectrumPainter};
use crate::scrollbar::Scrollbar;
use crate::spectrum::Spectrum;

/// Visible regions closer than this are treated as equal.
const REGION_EPSILON: f64 = 1e-7;
/// Offset changes smaller than this are not pushed to the painter.
const OFFSET_EPSILON: f64 = 1e-5;
/// Pixel shifts within this distance of an integer are scrolled, not redrawn.
const SUBPIXEL_EPSILON: f64 = 1e-7;
/// Zoom factors are clamped to `[MIN_ZOOM_FACTOR, 1 / MIN_ZOOM_FACTOR]`.
const MIN_ZOOM_FACTOR: f64 = 1e-6;
/// Smallest energy span; narrower spans fall below the update gate's resolution.
const MIN_X_VISIBLE: f64 = 1e-2;
/// Largest energy or count span.
const MAX_VISIBLE: f64 = 1e12;
/// Gap between the frame outline and the plot area, on each side.
const FRAME_GAP: i64 = 2;

/// User-visible state of a [`Viewport`].
///
/// This is what the user asked for. The painter keeps its own copy of the
/// regions describing what is on screen; [`Viewport::update`] reconciles the
/// two.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewportState {
    /// Energy at the left edge of the plot.
    pub offset: f64,
    /// Energy span of the plot width.
    pub x_visible: f64,
    /// Count span of the plot height.
    pub y_visible: f64,
    /// Lower bound on `y_visible`.
    pub y_min_visible: f64,
    /// Recompute `y_visible` from the visible data on every update.
    pub y_auto_scale: bool,
    /// Map counts logarithmically.
    pub log_scale: bool,
    /// Spectrum rendering style.
    pub view_mode: ViewMode,
    /// Last pointer position, in widget pixels.
    pub cursor: (i32, i32),
    /// Whether the crosshair is currently drawn.
    pub cursor_visible: bool,
    /// Whether the pointer is inside the widget.
    pub pointer_inside: bool,
    /// Whether pointer motion pans the view.
    pub dragging: bool,
    /// The next expose repaints the whole widget with the background first.
    pub need_clear: bool,
    /// Borders around the plot frame.
    pub borders: Borders,
}

/// Interactive view of a spectrum on a [`DrawingSurface`].
///
/// The viewport owns the surface, the painter and the display spectra. User
/// commands and toolkit events mutate [`ViewportState`] and end in
/// [`update`](Self::update), which decides between doing nothing, scrolling
/// the plot with a block copy and repainting the exposed strip, or scheduling
/// a full redraw that the toolkit delivers as [`on_expose`](Self::on_expose).
///
/// Problems other than surface failures never become errors: the call is
/// ignored or its argument clamped, and a flag is raised in
/// [`conditions`](Self::conditions).
pub struct Viewport<S: DrawingSurface> {
    surface: S,
    painter: SpectrumPainter,
    state: ViewportState,
    cursor_gc: GcId,
    spectrum: Option<DisplaySpectrum>,
    reference: Option<DisplaySpectrum>,
    markers: Markers,
    scrollbar: Option<Weak<RefCell<dyn Scrollbar>>>,
    width: u32,
    height: u32,
    layout_usable: bool,
    conditions: Conditions,
}

impl<S: DrawingSurface> core::fmt::Debug for Viewport<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Viewport")
            .field("painter", &self.painter)
            .field("state", &self.state)
            .field("cursor_gc", &self.cursor_gc)
            .field("spectrum", &self.spectrum)
            .field("reference", &self.reference)
            .field("markers", &self.markers)
            .field("has_scrollbar", &self.scrollbar.is_some())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("layout_usable", &self.layout_usable)
            .field("conditions", &self.conditions)
            .finish_non_exhaustive()
    }
}

impl<S: DrawingSurface> Drop for Viewport<S> {
    fn drop(&mut self) {
        let gcs = self.painter.gcs();
        for gc in [
            gcs.clear,
            gcs.axis,
            gcs.spectrum,
            gcs.reference,
            gcs.marker,
            self.cursor_gc,
        ] {
            self.surface.release_gc(gc);
        }
    }
}

impl<S: DrawingSurface> Viewport<S> {
    /// Creates a viewport drawing on `surface`.
    ///
    /// Graphics contexts are acquired here and released on drop. Nothing is
    /// drawn until the first [`on_layout`](Self::on_layout) yields a usable
    /// plot area.
    pub fn new(mut surface: S, config: ViewportConfig) -> Self {
        let config = config.sanitized();
        let palette = config.palette;
        let gcs = PainterGcs {
            clear: surface.create_gc(GcDesc::new(palette.background)),
            axis: surface.create_gc(GcDesc::new(palette.axis)),
            spectrum: surface.create_gc(GcDesc::new(palette.spectrum)),
            reference: surface.create_gc(GcDesc::new(palette.reference)),
            marker: surface.create_gc(GcDesc::new(palette.marker)),
        };
        let cursor_gc =
            surface.create_gc(GcDesc::new(palette.cursor).with_raster_op(RasterOp::Xor));

        let mut map = CoordinateMap::new(config.offset, config.x_visible, config.y_visible);
        map.set_log_scale(config.log_scale);
        let mut painter = SpectrumPainter::new(gcs, map);
        painter.set_view_mode(config.view_mode);

        Self {
            surface,
            painter,
            state: ViewportState {
                offset: config.offset,
                x_visible: config.x_visible,
                y_visible: config.y_visible,
                y_min_visible: config.y_min_visible,
                y_auto_scale: config.y_auto_scale,
                log_scale: config.log_scale,
                view_mode: config.view_mode,
                cursor: (0, 0),
                cursor_visible: false,
                pointer_inside: false,
                dragging: false,
                need_clear: true,
                borders: config.borders,
            },
            cursor_gc,
            spectrum: None,
            reference: None,
            markers: Markers::default(),
            scrollbar: None,
            width: 0,
            height: 0,
            layout_usable: false,
            conditions: Conditions::empty(),
        }
    }

    /// The drawing surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the drawing surface, e.g. to resize it before
    /// [`on_layout`](Self::on_layout).
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Current user-visible state.
    #[must_use]
    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    /// Mapping of what is currently on screen.
    #[must_use]
    pub fn coordinate_map(&self) -> &CoordinateMap {
        self.painter.map()
    }

    /// The painter, for plot geometry queries.
    #[must_use]
    pub fn painter(&self) -> &SpectrumPainter {
        &self.painter
    }

    /// Recoverable conditions raised since the last full redraw.
    #[must_use]
    pub fn conditions(&self) -> Conditions {
        self.conditions
    }

    /// The loaded foreground spectrum.
    #[must_use]
    pub fn spectrum(&self) -> Option<&Arc<dyn Spectrum>> {
        self.spectrum.as_ref().map(DisplaySpectrum::spectrum)
    }

    /// The loaded reference spectrum.
    #[must_use]
    pub fn reference(&self) -> Option<&Arc<dyn Spectrum>> {
        self.reference.as_ref().map(DisplaySpectrum::spectrum)
    }

    /// Placed X markers.
    #[must_use]
    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    /// Couples a horizontal scrollbar.
    ///
    /// Only a weak reference is kept; once the scrollbar is dropped the
    /// viewport stops updating it.
    pub fn set_scrollbar<B: Scrollbar + 'static>(&mut self, scrollbar: &Rc<RefCell<B>>) {
        let scrollbar: Rc<RefCell<dyn Scrollbar>> = scrollbar.clone();
        self.scrollbar = Some(Rc::downgrade(&scrollbar));
        self.update_scrollbar();
    }

    // --- Commands ---

    /// Replaces the foreground spectrum and schedules a full redraw.
    pub fn load_spectrum(&mut self, spectrum: Arc<dyn Spectrum>) -> Result<(), ViewportError> {
        log::debug!(
            "loading spectrum with {} bins, energy {}..{}",
            spectrum.n_bins(),
            spectrum.min_energy(),
            spectrum.max_energy()
        );
        self.spectrum = Some(DisplaySpectrum::new(spectrum));
        self.update(true)
    }

    /// Removes the foreground spectrum.
    pub fn unload_spectrum(&mut self) -> Result<(), ViewportError> {
        if self.spectrum.take().is_some() {
            log::debug!("unloaded spectrum");
        }
        self.update(true)
    }

    /// Shows `spectrum` beneath the foreground in the reference colour.
    pub fn load_reference(&mut self, spectrum: Arc<dyn Spectrum>) -> Result<(), ViewportError> {
        log::debug!("loading reference with {} bins", spectrum.n_bins());
        self.reference = Some(DisplaySpectrum::new(spectrum));
        self.update(true)
    }

    /// Removes the reference spectrum.
    pub fn clear_reference(&mut self) -> Result<(), ViewportError> {
        self.reference = None;
        self.update(true)
    }

    /// Fits the whole spectrum into the plot width.
    pub fn show_all(&mut self) -> Result<(), ViewportError> {
        let Some((min_e, max_e)) = self.energy_bounds() else {
            return self.no_spectrum("show_all");
        };
        let span = max_e - min_e;
        self.state.offset = min_e;
        if is_positive(span) {
            self.state.x_visible = self.bounded("x visible region", span, MIN_X_VISIBLE);
        } else {
            log::warn!("spectrum spans no energy, keeping the visible region");
            self.conditions |= Conditions::NUMERIC_DEGENERATE;
        }
        self.update(false)
    }

    /// Pans to the lowest energy.
    pub fn to_begin(&mut self) -> Result<(), ViewportError> {
        let Some((min_e, _)) = self.energy_bounds() else {
            return self.no_spectrum("to_begin");
        };
        self.state.offset = min_e;
        self.update(false)
    }

    /// Pans so that the highest energy sits at the right edge.
    pub fn to_end(&mut self) -> Result<(), ViewportError> {
        let Some((_, max_e)) = self.energy_bounds() else {
            return self.no_spectrum("to_end");
        };
        self.state.offset = max_e - self.state.x_visible;
        self.update(false)
    }

    /// Zooms X by `factor`, keeping the energy under the cursor in place.
    ///
    /// Factors above one zoom in. Non-positive factors are clamped, and so is
    /// a resulting span outside the range the view can resolve.
    pub fn x_zoom_around_cursor(&mut self, factor: f64) -> Result<(), ViewportError> {
        if self.spectrum.is_none() {
            return self.no_spectrum("x_zoom_around_cursor");
        }
        let Some(factor) = self.zoom_factor(factor) else {
            return Ok(());
        };
        let old = self.state.x_visible;
        let x_visible = self.bounded("x visible region", old / factor, MIN_X_VISIBLE);
        let dx = f64::from(self.state.cursor.0 - self.painter.base_x());
        let offset = self.state.offset + self.painter.dx_to_de(dx) * (1.0 - x_visible / old);
        if !offset.is_finite() {
            return self.degenerate("zoomed offset", offset);
        }
        self.state.offset = offset;
        self.state.x_visible = x_visible;
        self.update(false)
    }

    /// Zooms Y by `factor` around the baseline and switches auto-scale off.
    pub fn y_zoom_around_cursor(&mut self, factor: f64) -> Result<(), ViewportError> {
        if self.spectrum.is_none() {
            return self.no_spectrum("y_zoom_around_cursor");
        }
        let Some(factor) = self.zoom_factor(factor) else {
            return Ok(());
        };
        self.state.y_auto_scale = false;
        let y_visible = (self.state.y_visible / factor).max(self.state.y_min_visible);
        self.state.y_visible = self.bounded("y visible region", y_visible, 0.0);
        self.update(false)
    }

    /// Switches Y auto-scaling on or off.
    pub fn set_y_auto_scale(&mut self, auto_scale: bool) -> Result<(), ViewportError> {
        self.state.y_auto_scale = auto_scale;
        self.update(false)
    }

    /// Switches logarithmic counts on or off and redraws.
    pub fn set_log_scale(&mut self, log_scale: bool) -> Result<(), ViewportError> {
        self.state.log_scale = log_scale;
        self.update(true)
    }

    /// Changes the rendering style. A different style clears and redraws.
    pub fn set_view_mode(&mut self, view_mode: ViewMode) -> Result<(), ViewportError> {
        self.state.view_mode = view_mode;
        self.update(false)
    }

    /// Pans so that `offset` is at the left edge of the plot.
    pub fn set_offset(&mut self, offset: f64) -> Result<(), ViewportError> {
        if !offset.is_finite() {
            return self.degenerate("offset", offset);
        }
        self.state.offset = offset;
        self.update(false)
    }

    /// Sets the energy span of the plot width.
    pub fn set_x_visible_region(&mut self, x_visible: f64) -> Result<(), ViewportError> {
        if !is_positive(x_visible) {
            return self.degenerate("x visible region", x_visible);
        }
        self.state.x_visible = self.bounded("x visible region", x_visible, MIN_X_VISIBLE);
        self.update(false)
    }

    /// Sets the count span of the plot height and switches auto-scale off.
    pub fn set_y_visible_region(&mut self, y_visible: f64) -> Result<(), ViewportError> {
        if !is_positive(y_visible) {
            return self.degenerate("y visible region", y_visible);
        }
        self.state.y_auto_scale = false;
        let y_visible = y_visible.max(self.state.y_min_visible);
        self.state.y_visible = self.bounded("y visible region", y_visible, 0.0);
        self.update(false)
    }

    /// Sets the lower bound of the count span.
    pub fn set_y_min_visible_region(&mut self, y_min_visible: f64) -> Result<(), ViewportError> {
        if !is_positive(y_min_visible) {
            return self.degenerate("y minimum visible region", y_min_visible);
        }
        let y_min_visible = self.bounded("y minimum visible region", y_min_visible, 0.0);
        self.state.y_min_visible = y_min_visible;
        self.state.y_visible = self.state.y_visible.max(y_min_visible);
        self.update(false)
    }

    /// Places a vertical marker at `energy`, drawing only its column.
    pub fn add_marker(&mut self, energy: f64) -> Result<MarkerId, ViewportError> {
        if !energy.is_finite() {
            log::warn!("marker energy {energy} is not finite and will not be drawn");
            self.conditions |= Conditions::NUMERIC_DEGENERATE;
        }
        let id = self.markers.insert(energy);
        if let Some(x) = self.damage_column(energy) {
            self.with_cursor_hidden(|vp| {
                vp.painter.draw_markers(&mut vp.surface, [energy], x, x)
            })?;
        }
        Ok(id)
    }

    /// Removes a marker and repaints its column. Returns `false` for unknown ids.
    pub fn remove_marker(&mut self, id: MarkerId) -> Result<bool, ViewportError> {
        let Some(energy) = self.markers.remove(id) else {
            return Ok(false);
        };
        if let Some(x) = self.damage_column(energy) {
            self.with_cursor_hidden(|vp| {
                let plot = vp.painter.plot_rect();
                let clear = vp.painter.gcs().clear;
                vp.surface.fill_rect(clear, PixelRect::new(x, plot.y, 1, plot.height))?;
                vp.draw_region(x, x)
            })?;
        }
        Ok(true)
    }

    /// Energy under the crosshair.
    #[must_use]
    pub fn cursor_energy(&self) -> f64 {
        self.painter
            .map()
            .pixel_x_to_energy(f64::from(self.state.cursor.0))
    }

    /// Data-space point `(energy, count)` under the crosshair.
    #[must_use]
    pub fn cursor_data(&self) -> Point {
        let (x, y) = self.state.cursor;
        self.painter
            .map()
            .pixel_to_data(Point::new(f64::from(x), f64::from(y)))
    }

    // --- Update ---

    /// Reconciles the user-visible state with what is on screen.
    ///
    /// With `redraw` set, or whenever the regions changed or a pan is not a
    /// whole number of pixels, a full redraw is scheduled. Otherwise a pan is
    /// carried out as a block copy plus a repaint of the exposed strip.
    pub fn update(&mut self, redraw: bool) -> Result<(), ViewportError> {
        let mut redraw = redraw;

        if self.painter.log_scale() != self.state.log_scale {
            self.painter.set_log_scale(self.state.log_scale);
            redraw = true;
        }
        if self.painter.view_mode() != self.state.view_mode {
            self.painter.set_view_mode(self.state.view_mode);
            redraw = true;
        }

        if (self.state.x_visible - self.painter.x_visible()).abs() > REGION_EPSILON {
            log::trace!(
                "x region {} -> {}",
                self.painter.x_visible(),
                self.state.x_visible
            );
            if self.painter.set_x_visible(self.state.x_visible) {
                self.invalidate_displays();
                redraw = true;
            } else {
                self.reject("x visible region", self.state.x_visible);
                self.state.x_visible = self.painter.x_visible();
            }
        }

        let de = self.state.offset - self.painter.offset();
        let mut dpx = 0.0;
        if de.abs() > OFFSET_EPSILON {
            if self.painter.set_offset(self.state.offset) {
                self.invalidate_displays();
                dpx = self.painter.de_to_dx(de);
            } else {
                self.reject("offset", self.state.offset);
                self.state.offset = self.painter.offset();
            }
        }

        if self.state.y_auto_scale {
            self.state.y_visible = self.y_auto_zoom().max(self.state.y_min_visible);
        }

        if (self.state.y_visible - self.painter.y_visible()).abs() > REGION_EPSILON {
            log::trace!(
                "y region {} -> {}",
                self.painter.y_visible(),
                self.state.y_visible
            );
            if self.painter.set_y_visible(self.state.y_visible) {
                redraw = true;
            } else {
                self.reject("y visible region", self.state.y_visible);
                self.state.y_visible = self.painter.y_visible();
            }
        }

        let shift = (dpx - 0.5).ceil();
        if (dpx - shift).abs() > SUBPIXEL_EPSILON {
            log::trace!("pan of {dpx} px is not whole, redrawing");
            redraw = true;
        }

        if redraw {
            self.state.need_clear = true;
            self.surface.request_redraw();
        } else if dpx.abs() > 0.5 && self.layout_usable {
            self.shift_offset(whole_pixels(shift))?;
        }

        self.update_scrollbar();
        Ok(())
    }

    /// Scrolls the plot by `d` pixels: positive moves the content left.
    fn shift_offset(&mut self, d: i32) -> Result<(), ViewportError> {
        log::debug!("shifting plot by {d} px");
        self.with_cursor_hidden(|vp| vp.shift_plot(d))
    }

    fn shift_plot(&mut self, d: i32) -> Result<(), SurfaceError> {
        let plot = self.painter.plot_rect();
        let (x, y, w) = (plot.x, plot.y, self.painter.width());
        let clear = self.painter.gcs().clear;

        let n = d.unsigned_abs();
        if n > w.unsigned_abs() {
            self.surface.fill_rect(clear, plot)?;
            self.draw_region(x, x + w)?;
        } else if d < 0 {
            let kept = PixelRect::new(x, y, plot.width - n, plot.height);
            self.surface.copy_area(clear, kept, x - d, y)?;
            self.surface
                .fill_rect(clear, PixelRect::new(x, y, n, plot.height))?;
            self.draw_region(x, x - d - 1)?;
        } else {
            let kept = PixelRect::new(x + d, y, plot.width - n, plot.height);
            self.surface.copy_area(clear, kept, x, y)?;
            self.surface
                .fill_rect(clear, PixelRect::new(x + w - d + 1, y, n, plot.height))?;
            self.draw_region(x + w - d + 1, x + w)?;
        }

        self.painter.clear_x_scale(&mut self.surface)?;
        self.painter.draw_x_scale(&mut self.surface, x, x + w)
    }

    fn draw_region(&mut self, x1: i32, x2: i32) -> Result<(), SurfaceError> {
        if let Some(reference) = &mut self.reference {
            self.painter
                .draw_reference(&mut self.surface, reference, x1, x2)?;
        }
        if let Some(spectrum) = &mut self.spectrum {
            self.painter
                .draw_spectrum(&mut self.surface, spectrum, x1, x2)?;
        }
        self.painter.draw_markers(
            &mut self.surface,
            self.markers.iter().map(|(_, energy)| energy),
            x1,
            x2,
        )
    }

    fn redraw_all(&mut self) -> Result<(), SurfaceError> {
        let clear = self.painter.gcs().clear;
        if self.state.need_clear {
            self.surface
                .fill_rect(clear, PixelRect::new(0, 0, self.width, self.height))?;
            self.state.need_clear = false;
        } else {
            self.painter.clear_x_scale(&mut self.surface)?;
            self.painter.clear_y_scale(&mut self.surface)?;
        }

        let b = self.state.borders;
        let frame = PixelRect::new(
            saturate_i32(b.left.into()),
            saturate_i32(b.top.into()),
            self.width.saturating_sub(b.left + b.right),
            self.height.saturating_sub(b.top + b.bottom),
        );
        self.surface.draw_rect(self.painter.gcs().axis, frame)?;

        if self.spectrum.is_some() || self.reference.is_some() {
            let x = self.painter.base_x();
            let w = self.painter.width();
            self.draw_region(x, x + w)?;
            self.painter.draw_x_scale(&mut self.surface, x, x + w)?;
            self.painter.draw_y_scale(&mut self.surface)?;
        }
        Ok(())
    }

    fn y_auto_zoom(&mut self) -> f64 {
        let map = self.painter.map();
        [&mut self.spectrum, &mut self.reference]
            .into_iter()
            .flatten()
            .map(|disp| disp.y_auto_zoom(map))
            .fold(0.0, f64::max)
    }

    fn invalidate_displays(&mut self) {
        for disp in [&mut self.spectrum, &mut self.reference].into_iter().flatten() {
            disp.invalidate();
        }
    }

    fn energy_bounds(&self) -> Option<(f64, f64)> {
        let spectrum = self.spectrum.as_ref()?.spectrum();
        Some((spectrum.min_energy(), spectrum.max_energy()))
    }

    /// Column to repaint for a change at `energy`, if it is on screen.
    fn damage_column(&self, energy: f64) -> Option<i32> {
        if !self.layout_usable {
            return None;
        }
        self.painter.energy_to_column(energy)
    }

    // --- Scrollbar ---

    fn update_scrollbar(&mut self) {
        let Some(scrollbar) = self.scrollbar.as_ref().and_then(Weak::upgrade) else {
            return;
        };
        let Ok(mut scrollbar) = scrollbar.try_borrow_mut() else {
            log::trace!("scrollbar is busy, skipping update");
            return;
        };
        let (min_e, max_e) = self.energy_bounds().unwrap_or((0.0, 0.0));
        let visible = self.painter.map().visible_energy_range();
        let offset = visible.start;
        let min_e = min_e.min(offset);
        let max_e = max_e.max(visible.end);

        let total = self.painter.de_to_dx(max_e - min_e).ceil();
        let position = (self.painter.de_to_dx(offset - min_e) - 0.5).ceil();
        scrollbar.set_range(
            saturate_u32(total),
            self.painter.width().unsigned_abs(),
        );
        scrollbar.set_position(saturate_u32(position));
    }

    // --- Cursor ---

    /// XORs the crosshair across the whole widget and flips its parity.
    fn draw_cursor(&mut self) -> Result<(), SurfaceError> {
        let (cx, cy) = self.state.cursor;
        let right = saturate_i32(i64::from(self.width) - 1);
        let bottom = saturate_i32(i64::from(self.height) - 1);
        self.surface.draw_line(self.cursor_gc, 0, cy, right, cy)?;
        if let Err(err) = self.surface.draw_line(self.cursor_gc, cx, 0, cx, bottom) {
            // Take the horizontal line back so the parity stays unchanged.
            let _ = self.surface.draw_line(self.cursor_gc, 0, cy, right, cy);
            return Err(err);
        }
        self.state.cursor_visible = !self.state.cursor_visible;
        Ok(())
    }

    fn hide_cursor(&mut self) -> Result<(), ViewportError> {
        if self.state.cursor_visible {
            self.draw_cursor().map_err(|err| self.fail(err))?;
        }
        Ok(())
    }

    fn show_cursor(&mut self) -> Result<(), ViewportError> {
        if !self.state.cursor_visible && self.layout_usable {
            self.draw_cursor().map_err(|err| self.fail(err))?;
        }
        Ok(())
    }

    /// Runs `f` with the crosshair erased and draws it again afterwards.
    fn with_cursor_hidden<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, SurfaceError>,
    ) -> Result<T, ViewportError> {
        let shown = self.state.cursor_visible;
        self.hide_cursor()?;
        let out = f(self).map_err(|err| self.fail(err))?;
        if shown {
            self.show_cursor()?;
        }
        Ok(out)
    }

    // --- Toolkit events ---

    /// Pointer moved to `(x, y)`. While dragging, the view pans with it.
    pub fn on_motion(&mut self, x: i32, y: i32) -> Result<(), ViewportError> {
        self.hide_cursor()?;
        self.state.pointer_inside = true;
        if self.state.dragging {
            let de = self.painter.dx_to_de(f64::from(self.state.cursor.0 - x));
            self.state.offset += de;
            self.update(false)?;
        }
        self.state.cursor = (x, y);
        self.show_cursor()
    }

    /// A pointer button changed state.
    pub fn on_button(&mut self, button: ButtonState) {
        self.state.dragging = button == ButtonState::Press;
    }

    /// The pointer entered or left the widget.
    pub fn on_crossing(&mut self, crossing: Crossing) -> Result<(), ViewportError> {
        match crossing {
            Crossing::Enter { x, y } => {
                self.hide_cursor()?;
                self.state.pointer_inside = true;
                self.state.cursor = (x, y);
                self.show_cursor()
            }
            Crossing::Leave => {
                self.state.pointer_inside = false;
                self.hide_cursor()
            }
        }
    }

    /// The scrollbar was moved to `position` pixels from its start.
    pub fn on_scrollbar(&mut self, position: u32) -> Result<(), ViewportError> {
        let Some((min_e, max_e)) = self.energy_bounds() else {
            return self.no_spectrum("on_scrollbar");
        };
        let hi = (max_e - self.state.x_visible).max(min_e);
        let offset = (min_e + self.painter.dx_to_de(f64::from(position))).clamp(min_e, hi);
        self.set_offset(offset)
    }

    /// The widget was resized to `width × height` pixels.
    ///
    /// The surface must already have the new size.
    pub fn on_layout(&mut self, width: u32, height: u32) -> Result<(), ViewportError> {
        self.hide_cursor()?;
        self.width = width;
        self.height = height;

        let b = self.state.borders;
        let plot_w = i64::from(width) - i64::from(b.left) - i64::from(b.right) - 2 * FRAME_GAP;
        let plot_h = i64::from(height) - i64::from(b.top) - i64::from(b.bottom) - 2 * FRAME_GAP;
        let size = u32::try_from(plot_w)
            .ok()
            .zip(u32::try_from(plot_h).ok())
            .filter(|&(w, h)| self.painter.set_size(w, h));
        let Some((plot_w, plot_h)) = size else {
            log::warn!("layout {width}x{height} leaves no plot area, drawing suppressed");
            self.layout_usable = false;
            self.conditions |= Conditions::LAYOUT_DEGENERATE;
            return Ok(());
        };
        log::debug!("layout {width}x{height}, plot {plot_w}x{plot_h}");
        self.layout_usable = true;
        self.conditions.remove(Conditions::LAYOUT_DEGENERATE);

        let x0 = saturate_i32(i64::from(b.left) + FRAME_GAP);
        let y0 = saturate_i32(i64::from(height) - i64::from(b.bottom) - FRAME_GAP);
        self.painter.set_base_point(x0, y0);
        let scale_top = y0 + 3;
        self.painter.set_scale_areas(
            PixelRect::new(0, scale_top, width, b.bottom.saturating_sub(1)),
            PixelRect::new(0, 0, b.left, scale_top.unsigned_abs()),
        );

        self.invalidate_displays();
        self.update(true)?;
        if self.state.pointer_inside {
            self.show_cursor()?;
        }
        Ok(())
    }

    /// Repaints the whole widget, clearing it first if a clear is pending.
    pub fn on_expose(&mut self) -> Result<(), ViewportError> {
        if !self.layout_usable {
            return Ok(());
        }
        self.hide_cursor()?;
        self.redraw_all().map_err(|err| self.fail(err))?;
        self.conditions &= Conditions::LAYOUT_DEGENERATE;
        if self.state.pointer_inside {
            self.show_cursor()?;
        }
        Ok(())
    }

    // --- Conditions ---

    fn no_spectrum(&mut self, command: &str) -> Result<(), ViewportError> {
        log::debug!("{command} ignored, no spectrum loaded");
        self.conditions |= Conditions::NO_SPECTRUM;
        Ok(())
    }

    fn degenerate(&mut self, what: &str, value: f64) -> Result<(), ViewportError> {
        log::warn!("ignoring {what} {value}");
        self.conditions |= Conditions::NUMERIC_DEGENERATE;
        Ok(())
    }

    /// State value the painter refused; the on-screen value is kept.
    fn reject(&mut self, what: &str, value: f64) {
        log::warn!("{what} {value} is unusable, keeping the current view");
        self.conditions |= Conditions::NUMERIC_DEGENERATE;
    }

    /// Clamps a visible region to `[min, MAX_VISIBLE]`, flagging any change.
    fn bounded(&mut self, what: &str, value: f64, min: f64) -> f64 {
        let bounded = value.clamp(min, MAX_VISIBLE);
        if bounded != value {
            log::warn!("{what} {value} clamped to {bounded}");
            self.conditions |= Conditions::NUMERIC_DEGENERATE;
        }
        bounded
    }

    fn zoom_factor(&mut self, factor: f64) -> Option<f64> {
        if factor.is_nan() {
            log::warn!("ignoring zoom factor NaN");
            self.conditions |= Conditions::NUMERIC_DEGENERATE;
            return None;
        }
        let clamped = factor.clamp(MIN_ZOOM_FACTOR, 1.0 / MIN_ZOOM_FACTOR);
        if clamped != factor {
            log::warn!("zoom factor {factor} clamped to {clamped}");
            self.conditions |= Conditions::NUMERIC_DEGENERATE;
        }
        Some(clamped)
    }

    /// Records a surface failure and schedules a full repaint.
    fn fail(&mut self, err: SurfaceError) -> ViewportError {
        log::error!("{err}, scheduling a full redraw");
        self.state.need_clear = true;
        self.surface.request_redraw();
        err.into()
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "value is clamped to the i32 range first"
)]
fn saturate_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "float to int casts saturate and the value is already integral"
)]
fn whole_pixels(v: f64) -> i32 {
    v as i32
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "value is clamped to the u32 range first"
)]
fn saturate_u32(v: f64) -> u32 {
    if v.is_nan() {
        return 0;
    }
    v.clamp(0.0, f64::from(u32::MAX)) as u32
}
