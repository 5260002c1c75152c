// Copyright 2025 the Specview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rendering of display spectra, markers and axes onto a drawing surface.

use kurbo::{Point, Size};
use specview_surface::{DrawingSurface, GcId, PixelRect, SurfaceError, TextAlign};

use crate::coord::CoordinateMap;
use crate::display::DisplaySpectrum;
use crate::modes::ViewMode;
use crate::scale;

/// Length of a major tick mark, in pixels.
const TICK_MAJOR: i32 = 5;
/// Length of a minor tick mark, in pixels.
const TICK_MINOR: i32 = 3;
/// Distance from the end of a major tick to the label baseline on the X scale.
const X_LABEL_BASELINE: i32 = 12;
/// Half the label height; Y labels are shifted down by this to centre them on their tick.
const Y_LABEL_DROP: i32 = 4;
/// Slack for energies that land on a column edge up to rounding.
const COLUMN_EPSILON: f64 = 1e-9;

/// Graphics contexts the painter draws with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PainterGcs {
    /// Background fill for clearing.
    pub clear: GcId,
    /// Tick marks and labels.
    pub axis: GcId,
    /// Foreground spectrum.
    pub spectrum: GcId,
    /// Reference spectrum.
    pub reference: GcId,
    /// X markers.
    pub marker: GcId,
}

/// Draws pixel strips of a spectrum and the axes around it.
///
/// The painter keeps its own [`CoordinateMap`]; it is the record of what is
/// currently on screen. Apart from that map, the view mode and the two scale
/// strips, it carries no state between calls.
///
/// The plot area spans the inclusive pixel columns `x₀ ..= x₀ + w` and rows
/// `y₀ − h ..= y₀`, where `(x₀, y₀)` is the base point and `(w, h)` the size.
#[derive(Clone, Debug)]
pub struct SpectrumPainter {
    map: CoordinateMap,
    view_mode: ViewMode,
    gcs: PainterGcs,
    x_scale_area: PixelRect,
    y_scale_area: PixelRect,
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "plot geometry is set from integral pixel values well inside i32"
)]
impl SpectrumPainter {
    /// Creates a painter drawing with `gcs` under `map`.
    #[must_use]
    pub fn new(gcs: PainterGcs, map: CoordinateMap) -> Self {
        Self {
            map,
            view_mode: ViewMode::default(),
            gcs,
            x_scale_area: PixelRect::default(),
            y_scale_area: PixelRect::default(),
        }
    }

    /// The coordinate map of what is on screen.
    #[must_use]
    pub fn map(&self) -> &CoordinateMap {
        &self.map
    }

    /// Graphics contexts in use.
    #[must_use]
    pub fn gcs(&self) -> PainterGcs {
        self.gcs
    }

    /// Energy at the left edge of the plot.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.map.offset()
    }

    /// Sets the energy at the left edge of the plot.
    pub fn set_offset(&mut self, offset: f64) -> bool {
        self.map.set_offset(offset)
    }

    /// Energy span of the plot width.
    #[must_use]
    pub fn x_visible(&self) -> f64 {
        self.map.x_visible()
    }

    /// Sets the energy span of the plot width.
    pub fn set_x_visible(&mut self, x_visible: f64) -> bool {
        self.map.set_x_visible(x_visible)
    }

    /// Count span of the plot height.
    #[must_use]
    pub fn y_visible(&self) -> f64 {
        self.map.y_visible()
    }

    /// Sets the count span of the plot height.
    pub fn set_y_visible(&mut self, y_visible: f64) -> bool {
        self.map.set_y_visible(y_visible)
    }

    /// Whether counts are mapped logarithmically.
    #[must_use]
    pub fn log_scale(&self) -> bool {
        self.map.log_scale()
    }

    /// Switches logarithmic counts on or off.
    pub fn set_log_scale(&mut self, log_scale: bool) {
        self.map.set_log_scale(log_scale);
    }

    /// Current spectrum rendering style.
    #[must_use]
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Sets the spectrum rendering style.
    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.view_mode = view_mode;
    }

    /// Sets the pixel of the data origin, the lower-left plot corner.
    pub fn set_base_point(&mut self, x: i32, y: i32) {
        self.map.set_base_point(Point::new(f64::from(x), f64::from(y)));
    }

    /// Sets the plot extent. Returns `false` unless both sides are positive.
    pub fn set_size(&mut self, width: u32, height: u32) -> bool {
        self.map.set_size(Size::new(f64::from(width), f64::from(height)))
    }

    /// Sets the strips cleared and drawn by the X and Y scale routines.
    pub fn set_scale_areas(&mut self, x_scale: PixelRect, y_scale: PixelRect) {
        self.x_scale_area = x_scale;
        self.y_scale_area = y_scale;
    }

    /// Converts an energy difference into a pixel difference.
    #[must_use]
    pub fn de_to_dx(&self, de: f64) -> f64 {
        self.map.de_to_dx(de)
    }

    /// Converts a pixel difference into an energy difference.
    #[must_use]
    pub fn dx_to_de(&self, dx: f64) -> f64 {
        self.map.dx_to_de(dx)
    }

    /// Leftmost plot column, `x₀`.
    #[must_use]
    pub fn base_x(&self) -> i32 {
        self.map.base_point().x as i32
    }

    /// Baseline row, `y₀`.
    #[must_use]
    pub fn baseline(&self) -> i32 {
        self.map.base_point().y as i32
    }

    /// Plot width `w`; the plot has `w + 1` columns.
    #[must_use]
    pub fn width(&self) -> i32 {
        self.map.size().width as i32
    }

    /// Plot height `h`; the plot has `h + 1` rows.
    #[must_use]
    pub fn height(&self) -> i32 {
        self.map.size().height as i32
    }

    /// Every pixel of the plot area.
    #[must_use]
    pub fn plot_rect(&self) -> PixelRect {
        PixelRect::from_inclusive(
            self.base_x(),
            self.baseline() - self.height(),
            self.base_x() + self.width(),
            self.baseline(),
        )
    }

    /// Row at which `count` is drawn, clamped into the plot area.
    #[must_use]
    pub fn count_to_row(&self, count: f64) -> i32 {
        let count = if count.is_nan() { 0.0 } else { count };
        let y = self.map.count_to_pixel_y(count).round();
        let top = f64::from(self.baseline() - self.height());
        y.clamp(top, f64::from(self.baseline())) as i32
    }

    /// Column of an energy, or `None` if it falls outside the plot.
    ///
    /// Column `x` covers the energies from its left edge up to, but not
    /// including, the left edge of `x + 1`, the same span the display
    /// spectrum aggregates into `x`.
    #[must_use]
    pub fn energy_to_column(&self, energy: f64) -> Option<i32> {
        let x = (self.map.energy_to_pixel_x(energy) + COLUMN_EPSILON).floor();
        let (x1, x2) = (self.base_x(), self.base_x() + self.width());
        (x >= f64::from(x1) && x <= f64::from(x2)).then_some(x as i32)
    }

    /// Draws columns `x1..=x2` of the foreground spectrum.
    pub fn draw_spectrum<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
        disp: &mut DisplaySpectrum,
        x1: i32,
        x2: i32,
    ) -> Result<(), SurfaceError> {
        self.draw_columns(surface, disp, self.gcs.spectrum, x1, x2)
    }

    /// Draws columns `x1..=x2` of the reference spectrum.
    pub fn draw_reference<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
        disp: &mut DisplaySpectrum,
        x1: i32,
        x2: i32,
    ) -> Result<(), SurfaceError> {
        self.draw_columns(surface, disp, self.gcs.reference, x1, x2)
    }

    /// Draws the markers whose column lies in `x1..=x2`.
    pub fn draw_markers<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
        energies: impl IntoIterator<Item = f64>,
        x1: i32,
        x2: i32,
    ) -> Result<(), SurfaceError> {
        let top = self.baseline() - self.height();
        for energy in energies {
            match self.energy_to_column(energy) {
                Some(x) if x >= x1 && x <= x2 => {
                    surface.draw_line(self.gcs.marker, x, top, x, self.baseline())?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn strip(&self, x1: i32, x2: i32) -> Option<(i32, i32)> {
        let x1 = x1.max(self.base_x());
        let x2 = x2.min(self.base_x() + self.width());
        (x1 <= x2).then_some((x1, x2))
    }

    fn draw_columns<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
        disp: &mut DisplaySpectrum,
        gc: GcId,
        x1: i32,
        x2: i32,
    ) -> Result<(), SurfaceError> {
        let Some((x1, x2)) = self.strip(x1, x2) else {
            return Ok(());
        };
        let base = self.baseline();
        for px in x1..=x2 {
            let col = px - self.base_x();
            let y = self.count_to_row(disp.pixel_value(&self.map, col));
            match self.view_mode {
                ViewMode::Filled => surface.draw_line(gc, px, base, px, y)?,
                ViewMode::Line => {
                    // The leftmost column also joins from its off-plot neighbour,
                    // so a strip looks the same wherever it starts.
                    let prev = self.count_to_row(disp.pixel_value(&self.map, col - 1));
                    surface.draw_line(gc, px, prev, px, y)?;
                }
                ViewMode::Dots => surface.draw_line(gc, px, y, px, y)?,
            }
        }
        Ok(())
    }

    /// Repaints the X scale strip with the background.
    pub fn clear_x_scale<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
    ) -> Result<(), SurfaceError> {
        if self.x_scale_area.is_empty() {
            return Ok(());
        }
        surface.fill_rect(self.gcs.clear, self.x_scale_area)
    }

    /// Repaints the Y scale strip with the background.
    pub fn clear_y_scale<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
    ) -> Result<(), SurfaceError> {
        if self.y_scale_area.is_empty() {
            return Ok(());
        }
        surface.fill_rect(self.gcs.clear, self.y_scale_area)
    }

    /// Draws X ticks and labels for the columns `x1..=x2`.
    ///
    /// The step depends only on the visible region and the plot width, so
    /// partial redraws line up with full ones.
    pub fn draw_x_scale<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
        x1: i32,
        x2: i32,
    ) -> Result<(), SurfaceError> {
        let Some((x1, x2)) = self.strip(x1, x2) else {
            return Ok(());
        };
        let target = scale::target_ticks(self.map.size().width, scale::X_TICK_SPACING_PX);
        let step = scale::nice_step(self.map.x_visible(), target);
        let lo = self.map.pixel_x_to_energy(f64::from(x1));
        let hi = self.map.pixel_x_to_energy(f64::from(x2) + 1.0);
        let top = self.x_scale_area.y;

        for energy in scale::ticks(lo, hi, step) {
            let Some(x) = self.energy_to_column(energy) else {
                continue;
            };
            if x < x1 || x > x2 {
                continue;
            }
            surface.draw_line(self.gcs.axis, x, top, x, top + TICK_MAJOR - 1)?;
            surface.draw_text(
                self.gcs.axis,
                x,
                top + TICK_MAJOR + X_LABEL_BASELINE,
                &scale::format_tick(energy, step),
                TextAlign::Center,
            )?;
        }
        Ok(())
    }

    /// Draws Y ticks and labels for the whole plot height.
    pub fn draw_y_scale<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
    ) -> Result<(), SurfaceError> {
        if self.y_scale_area.is_empty() {
            return Ok(());
        }
        let right = (self.y_scale_area.right() - 1) as i32;

        if self.map.log_scale() {
            for (count, major) in scale::log_ticks(self.map.y_visible()) {
                let len = if major { TICK_MAJOR } else { TICK_MINOR };
                self.y_tick(surface, right, count, len, major.then_some(1.0))?;
            }
        } else {
            let target = scale::target_ticks(self.map.size().height, scale::Y_TICK_SPACING_PX);
            let step = scale::nice_step(self.map.y_visible(), target);
            for count in scale::ticks(0.0, self.map.y_visible(), step) {
                self.y_tick(surface, right, count, TICK_MAJOR, Some(step))?;
            }
        }
        Ok(())
    }

    fn y_tick<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
        right: i32,
        count: f64,
        len: i32,
        label_step: Option<f64>,
    ) -> Result<(), SurfaceError> {
        let y = self.count_to_row(count);
        surface.draw_line(self.gcs.axis, right - len + 1, y, right, y)?;
        if let Some(step) = label_step {
            surface.draw_text(
                self.gcs.axis,
                right - TICK_MAJOR - 2,
                y + Y_LABEL_DROP,
                &scale::format_tick(count, step),
                TextAlign::Right,
            )?;
        }
        Ok(())
    }
}
