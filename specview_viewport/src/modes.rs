// Copyright 2025 the Specview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// How the display spectrum is rendered into its pixel columns.
///
/// This mode is interpreted by [`crate::SpectrumPainter::draw_spectrum`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    /// Histogram outline: each column joins the previous column's level to its own.
    Line,
    /// Each column is filled from the baseline up to its value.
    #[default]
    Filled,
    /// A single pixel per column at its value.
    Dots,
}

/// Pointer button transition delivered to [`crate::Viewport::on_button`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ButtonState {
    /// A button went down; dragging pans the view until release.
    Press,
    /// The button was released.
    Release,
}

/// Pointer crossing delivered to [`crate::Viewport::on_crossing`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Crossing {
    /// The pointer entered the widget at the given pixel.
    Enter {
        /// Pointer column.
        x: i32,
        /// Pointer row.
        y: i32,
    },
    /// The pointer left the widget.
    Leave,
}
