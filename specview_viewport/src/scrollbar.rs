// Copyright 2025 the Specview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Horizontal scrollbar coupled to a [`crate::Viewport`].
///
/// The viewport holds only a weak reference and keeps working when the
/// scrollbar goes away. User motion of the scrollbar is delivered back
/// through [`crate::Viewport::on_scrollbar`] as a pixel position.
pub trait Scrollbar {
    /// Sets the total scrollable extent and the extent of the visible part, in pixels.
    fn set_range(&mut self, total: u32, visible: u32);

    /// Sets the thumb position, in pixels from the start.
    fn set_position(&mut self, position: u32);
}
