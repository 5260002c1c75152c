// Copyright 2025 the Specview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use smallvec::SmallVec;

/// Handle of an X marker placed with [`crate::Viewport::add_marker`].
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u32);

/// Vertical markers at fixed energies, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct Markers {
    next: u32,
    items: SmallVec<[(MarkerId, f64); 8]>,
}

impl Markers {
    /// Adds a marker and returns its handle.
    ///
    /// Handles count up from zero and wrap after `u32::MAX`; a handle still
    /// held by a live marker is skipped, so live handles are always distinct.
    pub fn insert(&mut self, energy: f64) -> MarkerId {
        let mut id = MarkerId(self.next);
        while self.items.iter().any(|(m, _)| *m == id) {
            id = MarkerId(id.0.wrapping_add(1));
        }
        self.next = id.0.wrapping_add(1);
        self.items.push((id, energy));
        id
    }

    /// Removes a marker, returning its energy if it existed.
    pub fn remove(&mut self, id: MarkerId) -> Option<f64> {
        let pos = self.items.iter().position(|(m, _)| *m == id)?;
        Some(self.items.remove(pos).1)
    }

    /// Energy of a marker.
    #[must_use]
    pub fn get(&self, id: MarkerId) -> Option<f64> {
        self.items.iter().find(|(m, _)| *m == id).map(|(_, e)| *e)
    }

    /// Iterates over all markers.
    pub fn iter(&self) -> impl Iterator<Item = (MarkerId, f64)> + '_ {
        self.items.iter().copied()
    }

    /// Number of markers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no markers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
