// Copyright 2025 the Specview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Specview Surface: the drawing-surface capability consumed by the spectrum viewport.
//!
//! This crate defines the narrow set of raster primitives a windowing toolkit
//! has to provide so that a viewport can paint a histogrammed spectrum and
//! keep it up to date incrementally:
//!
//! - **Graphics contexts**: small, opaque handles ([`GcId`]) created from a
//!   [`GcDesc`] (foreground colour, line width, [`RasterOp`]) and released
//!   when no longer needed.
//! - **Primitives**: solid fills, one-pixel outlines, lines, block copies
//!   within the same surface, and text labels, all addressed in integer
//!   device pixels ([`PixelRect`]).
//! - **Redraw requests**: [`DrawingSurface::request_redraw`] schedules a
//!   deferred expose; toolkits coalesce multiple requests into one.
//!
//! Every primitive can be captured as a [`SurfaceOp`], which lets backends
//! and tests keep a log of what was drawn.
//!
//! # Pixel conventions
//!
//! Coordinates follow the X11 conventions the viewport was designed around:
//!
//! - [`DrawingSurface::fill_rect`] covers exactly `width × height` pixels.
//! - [`DrawingSurface::draw_rect`] outlines `width + 1 × height + 1` pixels,
//!   so a filled rectangle of the same size never covers the right and
//!   bottom edges of its outline.
//! - [`DrawingSurface::draw_line`] includes both endpoints.
//! - [`DrawingSurface::copy_area`] behaves as if the source were read in full
//!   before any destination pixel is written.
//!
//! # Example
//!
//! ```ignore
//! # use specview_surface::*;
//! # use peniko::Color;
//! # struct MySurface;
//! # impl DrawingSurface for MySurface { /* ... */ }
//! let mut surface = MySurface;
//! let cursor = surface.create_gc(GcDesc::new(Color::WHITE).with_raster_op(RasterOp::Xor));
//! surface.draw_line(cursor, 0, 10, 99, 10)?;
//! // Drawing the same line again restores the pixels underneath.
//! surface.draw_line(cursor, 0, 10, 99, 10)?;
//! surface.release_gc(cursor);
//! ```

#![no_std]

extern crate alloc;

use alloc::string::String;
use core::fmt;

pub use peniko::Color;

/// Identifier for a graphics context.
///
/// This is a small, opaque handle that is stable until the context is
/// released with [`DrawingSurface::release_gc`].
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GcId(pub u32);

/// Raster operation applied when a primitive writes a pixel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum RasterOp {
    /// Destination pixels are replaced by the foreground colour.
    #[default]
    Copy,
    /// Destination pixels are combined with the foreground colour by bitwise XOR.
    ///
    /// Applying the same primitive twice restores the original pixels.
    Xor,
}

/// Description of a graphics context.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GcDesc {
    /// Foreground colour used by every primitive.
    pub foreground: Color,
    /// Width in pixels of outlines and lines; zero draws as one.
    pub line_width: u32,
    /// How written pixels combine with the destination.
    pub raster_op: RasterOp,
}

impl GcDesc {
    /// Creates a one-pixel, copy-mode context with the given foreground.
    #[must_use]
    pub fn new(foreground: Color) -> Self {
        Self {
            foreground,
            line_width: 1,
            raster_op: RasterOp::Copy,
        }
    }

    /// Returns this description with a different raster op.
    #[must_use]
    pub fn with_raster_op(mut self, raster_op: RasterOp) -> Self {
        self.raster_op = raster_op;
        self
    }

    /// Returns this description with a different line width.
    #[must_use]
    pub fn with_line_width(mut self, line_width: u32) -> Self {
        self.line_width = line_width;
        self
    }
}

/// Axis-aligned rectangle in integer device pixels.
///
/// `x`/`y` address the top-left pixel; `width`/`height` count pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct PixelRect {
    /// Left column.
    pub x: i32,
    /// Top row.
    pub y: i32,
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
}

impl PixelRect {
    /// Creates a rectangle from its top-left pixel and extent.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle spanning the inclusive pixel ranges `x1..=x2`, `y1..=y2`.
    ///
    /// Returns an empty rectangle if either range is empty.
    #[must_use]
    pub fn from_inclusive(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        let width = u32::try_from(i64::from(x2) - i64::from(x1) + 1).unwrap_or(0);
        let height = u32::try_from(i64::from(y2) - i64::from(y1) + 1).unwrap_or(0);
        Self::new(x1, y1, width, height)
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Column just past the right edge.
    #[must_use]
    pub fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    /// Row just past the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    /// Returns `true` if the pixel `(x, y)` lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        i64::from(x) >= i64::from(self.x)
            && i64::from(x) < self.right()
            && i64::from(y) >= i64::from(self.y)
            && i64::from(y) < self.bottom()
    }

    /// Returns the overlap of two rectangles, which may be empty.
    #[must_use]
    pub fn intersect(&self, other: Self) -> Self {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        let width = u32::try_from((x1 - i64::from(x0)).max(0)).unwrap_or(0);
        let height = u32::try_from((y1 - i64::from(y0)).max(0)).unwrap_or(0);
        Self::new(x0, y0, width, height)
    }
}

/// Horizontal alignment of a text label relative to its anchor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum TextAlign {
    /// The anchor is the left edge of the text.
    #[default]
    Left,
    /// The anchor is the horizontal centre of the text.
    Center,
    /// The anchor is the right edge of the text.
    Right,
}

/// The primitive a [`SurfaceError`] or a [`SurfaceOp`] refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// [`DrawingSurface::fill_rect`].
    FillRect,
    /// [`DrawingSurface::draw_rect`].
    DrawRect,
    /// [`DrawingSurface::draw_line`].
    DrawLine,
    /// [`DrawingSurface::copy_area`].
    CopyArea,
    /// [`DrawingSurface::draw_text`].
    DrawText,
}

/// Error reported by a drawing primitive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceError {
    /// The graphics context was never created or has already been released.
    UnknownGc(GcId),
    /// The backend failed to carry out the primitive.
    Failed(Primitive),
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownGc(gc) => write!(f, "graphics context {} is not live", gc.0),
            Self::Failed(primitive) => write!(f, "drawing primitive {primitive:?} failed"),
        }
    }
}

impl core::error::Error for SurfaceError {}

/// A drawing primitive captured for logging or replay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceOp {
    /// Solid fill.
    FillRect {
        /// Context used for the fill.
        gc: GcId,
        /// Filled pixels.
        rect: PixelRect,
    },
    /// One-pixel outline.
    DrawRect {
        /// Context used for the outline.
        gc: GcId,
        /// Outlined rectangle; the outline covers `width + 1 × height + 1` pixels.
        rect: PixelRect,
    },
    /// Line including both endpoints.
    DrawLine {
        /// Context used for the line.
        gc: GcId,
        /// First endpoint.
        from: (i32, i32),
        /// Second endpoint.
        to: (i32, i32),
    },
    /// Block copy within the surface.
    CopyArea {
        /// Context used for the copy.
        gc: GcId,
        /// Source pixels.
        src: PixelRect,
        /// Destination of the source's top-left pixel.
        dst: (i32, i32),
    },
    /// Text label.
    DrawText {
        /// Context used for the text.
        gc: GcId,
        /// Anchor point; `y` is the text baseline.
        at: (i32, i32),
        /// Label contents.
        text: String,
        /// Alignment relative to the anchor.
        align: TextAlign,
    },
    /// Deferred redraw request.
    RequestRedraw,
}

impl SurfaceOp {
    /// Returns the primitive this op invokes, or `None` for redraw requests.
    #[must_use]
    pub fn primitive(&self) -> Option<Primitive> {
        match self {
            Self::FillRect { .. } => Some(Primitive::FillRect),
            Self::DrawRect { .. } => Some(Primitive::DrawRect),
            Self::DrawLine { .. } => Some(Primitive::DrawLine),
            Self::CopyArea { .. } => Some(Primitive::CopyArea),
            Self::DrawText { .. } => Some(Primitive::DrawText),
            Self::RequestRedraw => None,
        }
    }
}

/// Raster surface provided by the windowing toolkit.
///
/// All primitives are synchronous and side-effect only. Implementations
/// clip to the surface bounds; drawing entirely outside is not an error.
pub trait DrawingSurface {
    /// Creates a graphics context and returns its handle.
    fn create_gc(&mut self, desc: GcDesc) -> GcId;

    /// Releases a graphics context. Releasing an unknown handle is a no-op.
    fn release_gc(&mut self, gc: GcId);

    /// Fills `rect` with the context's foreground.
    fn fill_rect(&mut self, gc: GcId, rect: PixelRect) -> Result<(), SurfaceError>;

    /// Draws a one-pixel outline whose corners are `(x, y)` and `(x + width, y + height)`.
    fn draw_rect(&mut self, gc: GcId, rect: PixelRect) -> Result<(), SurfaceError>;

    /// Draws a line from `(x1, y1)` to `(x2, y2)`, both endpoints included.
    fn draw_line(&mut self, gc: GcId, x1: i32, y1: i32, x2: i32, y2: i32)
    -> Result<(), SurfaceError>;

    /// Copies the pixels of `src` so that its top-left pixel lands on `(dst_x, dst_y)`.
    fn copy_area(
        &mut self,
        gc: GcId,
        src: PixelRect,
        dst_x: i32,
        dst_y: i32,
    ) -> Result<(), SurfaceError>;

    /// Draws a text label anchored at `(x, y)`, where `y` is the baseline.
    fn draw_text(
        &mut self,
        gc: GcId,
        x: i32,
        y: i32,
        text: &str,
        align: TextAlign,
    ) -> Result<(), SurfaceError>;

    /// Schedules a deferred full redraw.
    ///
    /// Toolkits coalesce requests made during one event cycle into a single expose.
    fn request_redraw(&mut self);
}

impl<S: DrawingSurface + ?Sized> DrawingSurface for &mut S {
    fn create_gc(&mut self, desc: GcDesc) -> GcId {
        (**self).create_gc(desc)
    }

    fn release_gc(&mut self, gc: GcId) {
        (**self).release_gc(gc);
    }

    fn fill_rect(&mut self, gc: GcId, rect: PixelRect) -> Result<(), SurfaceError> {
        (**self).fill_rect(gc, rect)
    }

    fn draw_rect(&mut self, gc: GcId, rect: PixelRect) -> Result<(), SurfaceError> {
        (**self).draw_rect(gc, rect)
    }

    fn draw_line(
        &mut self,
        gc: GcId,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    ) -> Result<(), SurfaceError> {
        (**self).draw_line(gc, x1, y1, x2, y2)
    }

    fn copy_area(
        &mut self,
        gc: GcId,
        src: PixelRect,
        dst_x: i32,
        dst_y: i32,
    ) -> Result<(), SurfaceError> {
        (**self).copy_area(gc, src, dst_x, dst_y)
    }

    fn draw_text(
        &mut self,
        gc: GcId,
        x: i32,
        y: i32,
        text: &str,
        align: TextAlign,
    ) -> Result<(), SurfaceError> {
        (**self).draw_text(gc, x, y, text, align)
    }

    fn request_redraw(&mut self) {
        (**self).request_redraw();
    }
}
