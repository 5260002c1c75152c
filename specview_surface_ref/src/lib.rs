// Copyright 2025 the Specview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Specview Surface Reference Raster.
//!
//! This crate provides a small, in-memory implementation of
//! [`DrawingSurface`] for **pixel-exact testing** of the spectrum viewport.
//!
//! It rasterizes into a packed `0xAARRGGBB` buffer and:
//! - Honours [`RasterOp::Xor`] for fills, outlines, lines and block copies,
//! - Records every successful primitive as a [`SurfaceOp`],
//! - Coalesces redraw requests into a single pending flag,
//! - Can be told to fail the next call of a given [`Primitive`].
//!
//! It is intentionally *not* a text renderer: [`DrawingSurface::draw_text`]
//! records a [`Label`] but touches no pixels. A fill that covers a label's
//! anchor removes the label, which is enough to observe axis repaints.
//! Lines are always one pixel wide regardless of the context's line width.

#![no_std]

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

use specview_surface::{
    Color, DrawingSurface, GcDesc, GcId, PixelRect, Primitive, RasterOp, SurfaceError, SurfaceOp,
    TextAlign,
};

/// Packs a colour into the `0xAARRGGBB` layout used by [`RasterSurface`].
#[must_use]
pub fn pack_color(color: Color) -> u32 {
    let rgba = color.to_rgba8();
    u32::from_be_bytes([rgba.a, rgba.r, rgba.g, rgba.b])
}

/// Text label recorded by [`RasterSurface::draw_text`](DrawingSurface::draw_text).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
    /// Anchor; `y` is the baseline.
    pub at: (i32, i32),
    /// Label contents.
    pub text: String,
    /// Alignment relative to the anchor.
    pub align: TextAlign,
    /// Packed foreground colour.
    pub color: u32,
}

/// In-memory raster implementation of [`DrawingSurface`].
#[derive(Debug, Default)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    gcs: Vec<Option<GcDesc>>,

    /// Log of successful primitives in the order they were applied.
    ops: Vec<SurfaceOp>,
    labels: Vec<Label>,
    redraw_pending: bool,
    redraw_requests: u32,
    fail_next: Option<Primitive>,
}

impl RasterSurface {
    /// Creates a surface of the given size with every pixel set to zero.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
            ..Self::default()
        }
    }

    /// Resizes the surface. All pixels and labels are reset; contexts and the op log survive.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize, 0);
        self.labels.clear();
    }

    /// Surface width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Surface height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the packed pixel at `(x, y)`, or `None` outside the surface.
    #[must_use]
    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.index(i64::from(x), i64::from(y)).map(|i| self.pixels[i])
    }

    /// Returns the whole buffer in row-major order.
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Copies the pixels of `rect`, clipped to the surface, in row-major order.
    #[must_use]
    pub fn region(&self, rect: PixelRect) -> Vec<u32> {
        let clip = rect.intersect(self.bounds());
        let mut out = Vec::with_capacity(clip.width as usize * clip.height as usize);
        for y in clip.y..clip.y + clip.height as i32 {
            for x in clip.x..clip.x + clip.width as i32 {
                if let Some(p) = self.pixel(x, y) {
                    out.push(p);
                }
            }
        }
        out
    }

    /// Returns the recorded primitives.
    #[must_use]
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Clears the op log but keeps pixels, labels and contexts.
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Counts recorded ops that invoke `primitive`.
    #[must_use]
    pub fn count(&self, primitive: Primitive) -> usize {
        self.ops
            .iter()
            .filter(|op| op.primitive() == Some(primitive))
            .count()
    }

    /// Returns the labels currently on the surface.
    #[must_use]
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Returns and clears the pending redraw flag.
    ///
    /// Callers drive the expose handler of their viewport when this returns `true`.
    pub fn take_redraw_request(&mut self) -> bool {
        core::mem::take(&mut self.redraw_pending)
    }

    /// Returns `true` if a redraw has been requested and not yet taken.
    #[must_use]
    pub fn redraw_pending(&self) -> bool {
        self.redraw_pending
    }

    /// Total number of redraw requests received, before coalescing.
    #[must_use]
    pub fn redraw_requests(&self) -> u32 {
        self.redraw_requests
    }

    /// Makes the next call of `primitive` fail with [`SurfaceError::Failed`].
    pub fn fail_next(&mut self, primitive: Primitive) {
        self.fail_next = Some(primitive);
    }

    /// Number of graphics contexts that are currently live.
    #[must_use]
    pub fn live_gcs(&self) -> usize {
        self.gcs.iter().filter(|gc| gc.is_some()).count()
    }

    fn bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, self.width, self.height)
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "coordinates are bounds-checked against the u32 surface size"
    )]
    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    fn resolve(&self, gc: GcId) -> Result<GcDesc, SurfaceError> {
        self.gcs
            .get(gc.0 as usize)
            .copied()
            .flatten()
            .ok_or(SurfaceError::UnknownGc(gc))
    }

    fn check(&mut self, primitive: Primitive) -> Result<(), SurfaceError> {
        if self.fail_next == Some(primitive) {
            self.fail_next = None;
            return Err(SurfaceError::Failed(primitive));
        }
        Ok(())
    }

    fn put(&mut self, x: i64, y: i64, color: u32, op: RasterOp) {
        if let Some(i) = self.index(x, y) {
            match op {
                RasterOp::Copy => self.pixels[i] = color,
                RasterOp::Xor => self.pixels[i] ^= color,
            }
        }
    }

    fn fill(&mut self, rect: PixelRect, color: u32, op: RasterOp) {
        let clip = rect.intersect(self.bounds());
        for y in i64::from(clip.y)..clip.bottom() {
            for x in i64::from(clip.x)..clip.right() {
                self.put(x, y, color, op);
            }
        }
    }

    /// Writes each pixel once, however often it appears in `pixels`.
    fn plot(&mut self, mut pixels: Vec<(i64, i64)>, color: u32, op: RasterOp) {
        pixels.sort_unstable();
        pixels.dedup();
        for (x, y) in pixels {
            self.put(x, y, color, op);
        }
    }
}

/// Appends the pixels of a Bresenham line stroked with a square pen `width` pixels wide.
fn stroke(from: (i64, i64), to: (i64, i64), width: u32, out: &mut Vec<(i64, i64)>) {
    let width = i64::from(width.max(1));
    let (lo, hi) = (-(width - 1) / 2, width / 2);
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        for py in y + lo..=y + hi {
            for px in x + lo..=x + hi {
                out.push((px, py));
            }
        }
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

impl DrawingSurface for RasterSurface {
    fn create_gc(&mut self, desc: GcDesc) -> GcId {
        let id = u32::try_from(self.gcs.len())
            .expect("RasterSurface: too many graphics contexts for u32 GcId");
        self.gcs.push(Some(desc));
        GcId(id)
    }

    fn release_gc(&mut self, gc: GcId) {
        if let Some(slot) = self.gcs.get_mut(gc.0 as usize) {
            *slot = None;
        }
    }

    fn fill_rect(&mut self, gc: GcId, rect: PixelRect) -> Result<(), SurfaceError> {
        let desc = self.resolve(gc)?;
        self.check(Primitive::FillRect)?;
        self.fill(rect, pack_color(desc.foreground), desc.raster_op);
        self.labels.retain(|label| !rect.contains(label.at.0, label.at.1));
        self.ops.push(SurfaceOp::FillRect { gc, rect });
        Ok(())
    }

    fn draw_rect(&mut self, gc: GcId, rect: PixelRect) -> Result<(), SurfaceError> {
        let desc = self.resolve(gc)?;
        self.check(Primitive::DrawRect)?;
        let (x0, y0) = (i64::from(rect.x), i64::from(rect.y));
        let (x1, y1) = (rect.right(), rect.bottom());
        // Corners are shared by two edges; `plot` writes them once so XOR outlines stay reversible.
        let mut pixels = Vec::new();
        for (from, to) in [
            ((x0, y0), (x1, y0)),
            ((x1, y0), (x1, y1)),
            ((x1, y1), (x0, y1)),
            ((x0, y1), (x0, y0)),
        ] {
            stroke(from, to, desc.line_width, &mut pixels);
        }
        self.plot(pixels, pack_color(desc.foreground), desc.raster_op);
        self.ops.push(SurfaceOp::DrawRect { gc, rect });
        Ok(())
    }

    fn draw_line(
        &mut self,
        gc: GcId,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    ) -> Result<(), SurfaceError> {
        let desc = self.resolve(gc)?;
        self.check(Primitive::DrawLine)?;
        let mut pixels = Vec::new();
        stroke(
            (i64::from(x1), i64::from(y1)),
            (i64::from(x2), i64::from(y2)),
            desc.line_width,
            &mut pixels,
        );
        self.plot(pixels, pack_color(desc.foreground), desc.raster_op);
        self.ops.push(SurfaceOp::DrawLine {
            gc,
            from: (x1, y1),
            to: (x2, y2),
        });
        Ok(())
    }

    fn copy_area(
        &mut self,
        gc: GcId,
        src: PixelRect,
        dst_x: i32,
        dst_y: i32,
    ) -> Result<(), SurfaceError> {
        let desc = self.resolve(gc)?;
        self.check(Primitive::CopyArea)?;
        let clip = src.intersect(self.bounds());
        let dx = i64::from(dst_x) - i64::from(src.x);
        let dy = i64::from(dst_y) - i64::from(src.y);

        // Read the whole source first so overlapping copies behave atomically.
        let mut staged = Vec::with_capacity(clip.width as usize * clip.height as usize);
        for y in i64::from(clip.y)..clip.bottom() {
            for x in i64::from(clip.x)..clip.right() {
                if let Some(i) = self.index(x, y) {
                    staged.push((x + dx, y + dy, self.pixels[i]));
                }
            }
        }
        for (x, y, color) in staged {
            self.put(x, y, color, desc.raster_op);
        }
        self.ops.push(SurfaceOp::CopyArea {
            gc,
            src,
            dst: (dst_x, dst_y),
        });
        Ok(())
    }

    fn draw_text(
        &mut self,
        gc: GcId,
        x: i32,
        y: i32,
        text: &str,
        align: TextAlign,
    ) -> Result<(), SurfaceError> {
        let desc = self.resolve(gc)?;
        self.check(Primitive::DrawText)?;
        self.labels.push(Label {
            at: (x, y),
            text: text.to_string(),
            align,
            color: pack_color(desc.foreground),
        });
        self.ops.push(SurfaceOp::DrawText {
            gc,
            at: (x, y),
            text: text.to_string(),
            align,
        });
        Ok(())
    }

    fn request_redraw(&mut self) {
        self.redraw_pending = true;
        self.redraw_requests += 1;
        self.ops.push(SurfaceOp::RequestRedraw);
    }
}
