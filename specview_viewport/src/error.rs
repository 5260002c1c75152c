// Copyright 2025 the Specview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error and condition reporting.
//!
//! Only drawing-surface failures cross the event boundary as errors. Every
//! other problem is recoverable: the offending call becomes a no-op (or is
//! clamped) and a [`Conditions`] flag records what happened until the next
//! full redraw.

use core::fmt;

use specview_surface::SurfaceError;

/// Error returned by viewport operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewportError {
    /// A drawing primitive failed. The viewport has scheduled a full redraw.
    Surface(SurfaceError),
}

impl fmt::Display for ViewportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Surface(err) => write!(f, "drawing surface failure: {err}"),
        }
    }
}

impl core::error::Error for ViewportError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Surface(err) => Some(err),
        }
    }
}

impl From<SurfaceError> for ViewportError {
    fn from(err: SurfaceError) -> Self {
        Self::Surface(err)
    }
}

bitflags::bitflags! {
    /// Recoverable conditions observed since the last full redraw.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Conditions: u8 {
        /// A command needed a loaded spectrum and there was none.
        const NO_SPECTRUM = 1 << 0;
        /// A zoom factor or region was zero, negative or not finite and was clamped or ignored.
        const NUMERIC_DEGENERATE = 1 << 1;
        /// The plot area has no pixels; drawing is suppressed until the next usable layout.
        const LAYOUT_DEGENERATE = 1 << 2;
    }
}
