// Copyright 2025 the Specview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use kurbo::{Point, Size};

/// Lowest count represented on a logarithmic Y axis.
///
/// Counts at or below the floor, including empty bins, map to the baseline.
pub const LOG_FLOOR: f64 = 0.1;

/// Affine mapping between data space (energy, count) and device pixels.
///
/// The map is anchored at the plot's base point: energy [`offset`](Self::offset)
/// and count zero land on [`base_point`](Self::base_point), which is the
/// lower-left corner of the plot area. X grows to the right, counts grow
/// upwards (towards smaller pixel rows).
///
/// The visible regions and the plot size are kept strictly positive; setters
/// reject values that would break that and report it through their return
/// value.
#[derive(Clone, Debug, PartialEq)]
pub struct CoordinateMap {
    offset: f64,
    x_visible: f64,
    y_visible: f64,
    base: Point,
    size: Size,
    log_scale: bool,
}

impl Default for CoordinateMap {
    fn default() -> Self {
        Self {
            offset: 0.0,
            x_visible: 100.0,
            y_visible: 100.0,
            base: Point::ZERO,
            size: Size::new(1.0, 1.0),
            log_scale: false,
        }
    }
}

impl CoordinateMap {
    /// Creates a map with the given visible regions and the default geometry.
    #[must_use]
    pub fn new(offset: f64, x_visible: f64, y_visible: f64) -> Self {
        let mut map = Self::default();
        map.set_offset(offset);
        map.set_x_visible(x_visible);
        map.set_y_visible(y_visible);
        map
    }

    /// Energy at the left edge of the plot.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Sets the energy at the left edge of the plot. Non-finite values are ignored.
    pub fn set_offset(&mut self, offset: f64) -> bool {
        if !offset.is_finite() {
            return false;
        }
        self.offset = offset;
        true
    }

    /// Energy span of the plot width.
    #[must_use]
    pub fn x_visible(&self) -> f64 {
        self.x_visible
    }

    /// Sets the energy span of the plot width.
    ///
    /// Returns `false` and keeps the previous value unless `x_visible` is
    /// finite and strictly positive.
    pub fn set_x_visible(&mut self, x_visible: f64) -> bool {
        if !(x_visible.is_finite() && x_visible > 0.0) {
            return false;
        }
        self.x_visible = x_visible;
        true
    }

    /// Count span of the plot height.
    #[must_use]
    pub fn y_visible(&self) -> f64 {
        self.y_visible
    }

    /// Sets the count span of the plot height.
    ///
    /// Returns `false` and keeps the previous value unless `y_visible` is
    /// finite and strictly positive.
    pub fn set_y_visible(&mut self, y_visible: f64) -> bool {
        if !(y_visible.is_finite() && y_visible > 0.0) {
            return false;
        }
        self.y_visible = y_visible;
        true
    }

    /// Pixel of the data origin (energy `offset`, count zero).
    #[must_use]
    pub fn base_point(&self) -> Point {
        self.base
    }

    /// Sets the pixel of the data origin.
    pub fn set_base_point(&mut self, base: Point) {
        self.base = base;
    }

    /// Plot area extent in pixels.
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Sets the plot area extent. Returns `false` unless both sides are positive.
    pub fn set_size(&mut self, size: Size) -> bool {
        if !(size.width > 0.0 && size.height > 0.0 && size.is_finite()) {
            return false;
        }
        self.size = size;
        true
    }

    /// Whether counts are mapped logarithmically.
    #[must_use]
    pub fn log_scale(&self) -> bool {
        self.log_scale
    }

    /// Switches between linear and logarithmic count mapping.
    pub fn set_log_scale(&mut self, log_scale: bool) {
        self.log_scale = log_scale;
    }

    /// Energy range covered by the plot width.
    #[must_use]
    pub fn visible_energy_range(&self) -> Range<f64> {
        self.offset..self.offset + self.x_visible
    }

    /// Converts an energy difference into a pixel difference.
    #[must_use]
    pub fn de_to_dx(&self, de: f64) -> f64 {
        de * self.size.width / self.x_visible
    }

    /// Converts a pixel difference into an energy difference.
    #[must_use]
    pub fn dx_to_de(&self, dx: f64) -> f64 {
        dx * self.x_visible / self.size.width
    }

    /// Converts an energy into a pixel column.
    #[must_use]
    pub fn energy_to_pixel_x(&self, energy: f64) -> f64 {
        self.base.x + self.de_to_dx(energy - self.offset)
    }

    /// Converts a pixel column into an energy.
    #[must_use]
    pub fn pixel_x_to_energy(&self, x: f64) -> f64 {
        self.offset + self.dx_to_de(x - self.base.x)
    }

    /// Converts a count difference into a pixel difference on a linear axis.
    ///
    /// Pixel differences are positive upwards, i.e. towards smaller rows.
    #[must_use]
    pub fn dc_to_dy(&self, dc: f64) -> f64 {
        dc * self.size.height / self.y_visible
    }

    /// Converts a pixel difference into a count difference on a linear axis.
    #[must_use]
    pub fn dy_to_dc(&self, dy: f64) -> f64 {
        dy * self.y_visible / self.size.height
    }

    /// Height above the baseline, in pixels, at which `count` is drawn.
    #[must_use]
    pub fn count_to_height(&self, count: f64) -> f64 {
        if self.log_scale {
            let decades = log_decades(self.y_visible).max(1e-12);
            log_decades(count) / decades * self.size.height
        } else {
            self.dc_to_dy(count)
        }
    }

    /// Converts a count into a pixel row.
    #[must_use]
    pub fn count_to_pixel_y(&self, count: f64) -> f64 {
        self.base.y - self.count_to_height(count)
    }

    /// Converts a pixel row into a count.
    ///
    /// On a logarithmic axis the baseline maps to [`LOG_FLOOR`].
    #[must_use]
    pub fn pixel_y_to_count(&self, y: f64) -> f64 {
        let height = self.base.y - y;
        if self.log_scale {
            let decades = log_decades(self.y_visible);
            LOG_FLOOR * 10_f64.powf(height / self.size.height * decades)
        } else {
            self.dy_to_dc(height)
        }
    }

    /// Converts a data-space point `(energy, count)` into a pixel position.
    #[must_use]
    pub fn data_to_pixel(&self, pt: Point) -> Point {
        Point::new(self.energy_to_pixel_x(pt.x), self.count_to_pixel_y(pt.y))
    }

    /// Converts a pixel position into a data-space point `(energy, count)`.
    #[must_use]
    pub fn pixel_to_data(&self, pt: Point) -> Point {
        Point::new(self.pixel_x_to_energy(pt.x), self.pixel_y_to_count(pt.y))
    }
}

/// Decades between the log floor and `count`, never negative.
fn log_decades(count: f64) -> f64 {
    (count.max(LOG_FLOOR) / LOG_FLOOR).log10()
}
