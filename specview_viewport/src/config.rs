// Copyright 2025 the Specview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::Color;

use crate::modes::ViewMode;

/// Space between the widget edge and the plot frame, in pixels.
///
/// The left and bottom borders hold the Y and X scales respectively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Borders {
    /// Left border, holding the Y scale.
    pub left: u32,
    /// Right border.
    pub right: u32,
    /// Top border.
    pub top: u32,
    /// Bottom border, holding the X scale.
    pub bottom: u32,
}

impl Default for Borders {
    fn default() -> Self {
        Self {
            left: 60,
            right: 3,
            top: 4,
            bottom: 30,
        }
    }
}

/// Colours used by the viewport's graphics contexts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Widget and plot background.
    pub background: Color,
    /// Plot frame, tick marks and labels.
    pub axis: Color,
    /// Foreground spectrum.
    pub spectrum: Color,
    /// Reference spectrum.
    pub reference: Color,
    /// X markers.
    pub marker: Color,
    /// XOR mask of the crosshair cursor.
    pub cursor: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::BLACK,
            axis: Color::from_rgba8(0xd0, 0xd0, 0xd0, 0xff),
            spectrum: Color::from_rgba8(0x40, 0xe0, 0x40, 0xff),
            reference: Color::from_rgba8(0x40, 0x80, 0xff, 0xff),
            marker: Color::from_rgba8(0xff, 0xd0, 0x20, 0xff),
            cursor: Color::WHITE,
        }
    }
}

/// Initial state and appearance of a [`crate::Viewport`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportConfig {
    /// Borders around the plot frame.
    pub borders: Borders,
    /// Graphics context colours.
    pub palette: Palette,
    /// Energy at the left edge of the plot.
    pub offset: f64,
    /// Energy span of the plot width.
    pub x_visible: f64,
    /// Count span of the plot height.
    pub y_visible: f64,
    /// Lower bound on the count span, also used when auto-scaling.
    pub y_min_visible: f64,
    /// Recompute the count span from the visible data on every update.
    pub y_auto_scale: bool,
    /// Map counts logarithmically.
    pub log_scale: bool,
    /// Spectrum rendering style.
    pub view_mode: ViewMode,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            borders: Borders::default(),
            palette: Palette::default(),
            offset: 0.0,
            x_visible: 100.0,
            y_visible: 100.0,
            y_min_visible: 20.0,
            y_auto_scale: true,
            log_scale: false,
            view_mode: ViewMode::default(),
        }
    }
}

impl ViewportConfig {
    /// Returns this configuration with different borders.
    #[must_use]
    pub fn with_borders(mut self, borders: Borders) -> Self {
        self.borders = borders;
        self
    }

    /// Returns this configuration with a different palette.
    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Returns this configuration with a different initial X region.
    #[must_use]
    pub fn with_x_region(mut self, offset: f64, x_visible: f64) -> Self {
        self.offset = offset;
        self.x_visible = x_visible;
        self
    }

    /// Returns this configuration with a different initial and minimum Y region.
    #[must_use]
    pub fn with_y_region(mut self, y_visible: f64, y_min_visible: f64) -> Self {
        self.y_visible = y_visible;
        self.y_min_visible = y_min_visible;
        self
    }

    /// Returns this configuration with auto-scaling switched on or off.
    #[must_use]
    pub fn with_y_auto_scale(mut self, y_auto_scale: bool) -> Self {
        self.y_auto_scale = y_auto_scale;
        self
    }

    /// Returns this configuration with logarithmic counts switched on or off.
    #[must_use]
    pub fn with_log_scale(mut self, log_scale: bool) -> Self {
        self.log_scale = log_scale;
        self
    }

    /// Returns this configuration with a different view mode.
    #[must_use]
    pub fn with_view_mode(mut self, view_mode: ViewMode) -> Self {
        self.view_mode = view_mode;
        self
    }

    /// Replaces unusable values by their defaults.
    ///
    /// Visible regions must be finite and strictly positive and the offset
    /// finite. The initial Y region is raised to the minimum.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.offset.is_finite() {
            log::warn!("config offset {} is not finite, using {}", self.offset, defaults.offset);
            self.offset = defaults.offset;
        }
        if !is_positive(self.x_visible) {
            log::warn!("config x_visible {} is not positive, using default", self.x_visible);
            self.x_visible = defaults.x_visible;
        }
        if !is_positive(self.y_min_visible) {
            log::warn!(
                "config y_min_visible {} is not positive, using default",
                self.y_min_visible
            );
            self.y_min_visible = defaults.y_min_visible;
        }
        if !is_positive(self.y_visible) {
            self.y_visible = defaults.y_visible;
        }
        self.y_visible = self.y_visible.max(self.y_min_visible);
        self
    }
}

pub(crate) fn is_positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}
