// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based drawing tree.
//!
//! The [`Scene`] owns every drawing in a slot map with stable, generational
//! keys. Parent/child links are stored on the drawings themselves; cap
//! drawings additionally carry a marker naming the drawing they seal, and the
//! owner keeps a plane-name → cap map. Neither link is an owning pointer, so
//! removing an owner simply discards its caps wherever they live.
//!
//! Two kinds of change are tracked:
//!
//! - `shape_changed`: set by host-facing edits that can alter what is visible
//!   (geometry, placements, display, masks, capping attributes). Cleared by the
//!   host once a frame has been drawn.
//! - `mutation_count`: bumped by every actual mutation, including those the
//!   capping pass makes. It never decreases.

use clipcap_geometry::{Mesh, Place};
use rustc_hash::FxHashSet;
use slotmap::SlotMap;

use crate::drawing::{ClipCapMode, Drawing, Rgba};
use crate::error::{Error, Result};
use crate::keys::DrawingKey;

/// Drawing tree with a fixed root
#[derive(Debug)]
pub struct Scene {
    pub(crate) drawings: SlotMap<DrawingKey, Drawing>,
    root: DrawingKey,
    shape_changed: bool,
    mutation_count: u64,
}

impl Scene {
    /// Creates a scene holding only an empty root drawing.
    pub fn new() -> Self {
        let mut drawings = SlotMap::with_key();
        let root = drawings.insert(Drawing::new("root"));
        Self {
            drawings,
            root,
            shape_changed: true,
            mutation_count: 0,
        }
    }

    /// Returns the root drawing key.
    pub fn root(&self) -> DrawingKey {
        self.root
    }

    /// Returns the number of drawings, root and caps included.
    pub fn len(&self) -> usize {
        self.drawings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawings.len() <= 1
    }

    /// Returns `true` if the key references a live drawing.
    pub fn contains(&self, key: DrawingKey) -> bool {
        self.drawings.contains_key(key)
    }

    /// Returns the drawing for the given key, or `None` if not found.
    pub fn get(&self, key: DrawingKey) -> Option<&Drawing> {
        self.drawings.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: DrawingKey) -> Result<&mut Drawing> {
        self.drawings
            .get_mut(key)
            .ok_or(Error::DrawingNotFound(key))
    }

    /// Returns the children of a drawing (empty if the key is stale).
    pub fn children(&self, key: DrawingKey) -> &[DrawingKey] {
        self.drawings
            .get(key)
            .map(|d| d.children.as_slice())
            .unwrap_or(&[])
    }

    /// Returns the structural parent of a drawing.
    pub fn parent(&self, key: DrawingKey) -> Option<DrawingKey> {
        self.drawings.get(key).and_then(|d| d.parent)
    }

    // --- Change tracking ---

    /// Returns `true` if visible geometry may have changed since the last frame.
    pub fn shape_changed(&self) -> bool {
        self.shape_changed
    }

    /// Forgets pending shape changes; called once the frame has been drawn.
    pub fn clear_changes(&mut self) {
        self.shape_changed = false;
    }

    /// Returns the number of mutations applied to the scene so far.
    pub fn mutation_count(&self) -> u64 {
        self.mutation_count
    }

    #[inline]
    pub(crate) fn record_mutation(&mut self) {
        self.mutation_count += 1;
    }

    #[inline]
    fn record_shape_change(&mut self) {
        self.shape_changed = true;
        self.record_mutation();
    }

    // --- Structure ---

    /// Adds a drawing under `parent` and returns its key.
    ///
    /// The drawing's mesh, positions and masks are validated first; a
    /// rejected drawing leaves the scene untouched.
    pub fn add_drawing(&mut self, parent: DrawingKey, drawing: Drawing) -> Result<DrawingKey> {
        validate_drawing(&drawing)?;
        let key = self.insert_child(parent, drawing)?;
        self.shape_changed = true;
        Ok(key)
    }

    /// Link a drawing under `parent` without flagging a shape change
    pub(crate) fn insert_child(&mut self, parent: DrawingKey, mut drawing: Drawing) -> Result<DrawingKey> {
        if !self.drawings.contains_key(parent) {
            return Err(Error::DrawingNotFound(parent));
        }
        drawing.parent = Some(parent);
        drawing.children.clear();
        drawing.clip_cap_drawings.clear();
        let key = self.drawings.insert(drawing);
        self.get_mut(parent)?.children.push(key);
        self.record_mutation();
        Ok(key)
    }

    /// Removes a drawing and its whole subtree.
    ///
    /// Caps owned by any removed drawing go too, including instance caps that
    /// live beside their owner rather than under it.
    pub fn remove_drawing(&mut self, key: DrawingKey) -> Result<()> {
        if key == self.root {
            return Err(Error::RootRemoval);
        }
        if !self.drawings.contains_key(key) {
            return Err(Error::DrawingNotFound(key));
        }
        self.remove_subtree(key);
        self.shape_changed = true;
        Ok(())
    }

    /// Remove a subtree plus every cap it owns, returning the number removed
    pub(crate) fn remove_subtree(&mut self, key: DrawingKey) -> usize {
        let mut doomed: FxHashSet<DrawingKey> = FxHashSet::default();
        let mut pending = vec![key];
        while let Some(k) = pending.pop() {
            let Some(drawing) = self.drawings.get(k) else {
                continue;
            };
            if !doomed.insert(k) {
                continue;
            }
            pending.extend(drawing.children.iter().copied());
            pending.extend(drawing.clip_cap_drawings.values().copied());
        }

        for &k in &doomed {
            let (parent, owner, plane_name) = {
                let d = &self.drawings[k];
                let marker = d.cap_marker.as_ref();
                (
                    d.parent,
                    marker.map(|m| m.owner),
                    marker.map(|m| m.plane_name.clone()),
                )
            };
            if let Some(parent) = parent.filter(|p| !doomed.contains(p)) {
                if let Some(p) = self.drawings.get_mut(parent) {
                    p.children.retain(|&c| c != k);
                }
            }
            if let (Some(owner), Some(name)) = (owner.filter(|o| !doomed.contains(o)), plane_name) {
                if let Some(o) = self.drawings.get_mut(owner) {
                    if o.clip_cap_drawings.get(&name) == Some(&k) {
                        o.clip_cap_drawings.remove(&name);
                    }
                }
            }
        }

        for &k in &doomed {
            self.drawings.remove(k);
        }
        if !doomed.is_empty() {
            self.record_mutation();
        }
        doomed.len()
    }

    /// Returns every drawing in depth-first pre-order from the root.
    pub fn all_drawings(&self) -> Vec<DrawingKey> {
        let mut order = Vec::with_capacity(self.drawings.len());
        let mut stack = vec![self.root];
        while let Some(k) = stack.pop() {
            if let Some(d) = self.drawings.get(k) {
                order.push(k);
                stack.extend(d.children.iter().rev().copied());
            }
        }
        order
    }

    /// Returns the placement of a drawing's local frame in scene coordinates.
    ///
    /// This composes the first position of the drawing and of each ancestor,
    /// so it is exact only for drawings shown at a single scene placement.
    pub fn scene_position(&self, key: DrawingKey) -> Result<Place> {
        let mut place = self.drawings.get(key).ok_or(Error::DrawingNotFound(key))?.positions[0];
        let mut cursor = self.parent(key);
        while let Some(k) = cursor {
            let d = self.drawings.get(k).ok_or(Error::DrawingNotFound(k))?;
            place = d.positions[0] * place;
            cursor = d.parent;
        }
        Ok(place)
    }

    /// Returns the placement of a drawing's parent frame in scene coordinates.
    pub fn parent_scene_position(&self, key: DrawingKey) -> Result<Place> {
        match self.parent(key) {
            Some(parent) => self.scene_position(parent),
            None if self.contains(key) => Ok(Place::identity()),
            None => Err(Error::DrawingNotFound(key)),
        }
    }

    // --- Attribute setters ---

    /// Replaces a drawing's mesh. Any triangle mask is dropped.
    pub fn set_geometry(&mut self, key: DrawingKey, mesh: Mesh) -> Result<()> {
        mesh.validate()?;
        let d = self.get_mut(key)?;
        if d.mesh == mesh {
            return Ok(());
        }
        d.mesh = mesh;
        d.triangle_mask = None;
        self.record_shape_change();
        Ok(())
    }

    /// Replaces a drawing's instance placements.
    ///
    /// A per-instance display mask that no longer matches is dropped.
    pub fn set_positions(&mut self, key: DrawingKey, positions: Vec<Place>) -> Result<()> {
        if positions.is_empty() {
            return Err(Error::EmptyPositions);
        }
        let d = self.get_mut(key)?;
        if d.positions == positions {
            return Ok(());
        }
        if d
            .display_positions
            .as_ref()
            .map_or(false, |m| m.len() != positions.len())
        {
            d.display_positions = None;
        }
        d.positions = positions;
        self.record_shape_change();
        Ok(())
    }

    /// Shows or hides individual instances; `None` shows all of them.
    pub fn set_display_positions(&mut self, key: DrawingKey, mask: Option<Vec<bool>>) -> Result<()> {
        let d = self.get_mut(key)?;
        if let Some(m) = &mask {
            check_mask_length("display positions", m.len(), d.positions.len())?;
        }
        if d.display_positions == mask {
            return Ok(());
        }
        d.display_positions = mask;
        self.record_shape_change();
        Ok(())
    }

    pub fn set_display(&mut self, key: DrawingKey, display: bool) -> Result<()> {
        let d = self.get_mut(key)?;
        if d.display == display {
            return Ok(());
        }
        d.display = display;
        self.record_shape_change();
        Ok(())
    }

    /// Sets which triangles are shown; `None` shows all of them.
    pub fn set_triangle_mask(&mut self, key: DrawingKey, mask: Option<Vec<bool>>) -> Result<()> {
        let d = self.get_mut(key)?;
        if let Some(m) = &mask {
            check_mask_length("triangle mask", m.len(), d.mesh.triangle_count())?;
        }
        if d.triangle_mask == mask {
            return Ok(());
        }
        d.triangle_mask = mask;
        self.record_shape_change();
        Ok(())
    }

    /// Sets a drawing's color. Its caps follow immediately.
    pub fn set_color(&mut self, key: DrawingKey, color: Rgba) -> Result<()> {
        let d = self.get_mut(key)?;
        if d.color == color {
            return Ok(());
        }
        d.color = color;
        let caps: Vec<DrawingKey> = d.clip_cap_drawings.values().copied().collect();
        for cap in caps {
            if let Some(c) = self.drawings.get_mut(cap) {
                c.color = color;
            }
        }
        self.record_mutation();
        Ok(())
    }

    /// Opts a drawing in or out of capping. Turning capping off removes its caps.
    pub fn set_clip_cap(&mut self, key: DrawingKey, mode: ClipCapMode) -> Result<()> {
        let d = self.get_mut(key)?;
        if d.clip_cap == mode {
            return Ok(());
        }
        d.clip_cap = mode;
        let caps: Vec<DrawingKey> = if mode.is_on() {
            Vec::new()
        } else {
            d.clip_cap_drawings.values().copied().collect()
        };
        for cap in caps {
            self.remove_subtree(cap);
        }
        self.record_shape_change();
        Ok(())
    }

    /// Sets the extra distance a drawing's caps are pushed along the plane normal.
    pub fn set_clip_offset(&mut self, key: DrawingKey, clip_offset: f64) -> Result<()> {
        let d = self.get_mut(key)?;
        if d.clip_offset == clip_offset {
            return Ok(());
        }
        d.clip_offset = clip_offset;
        self.record_shape_change();
        Ok(())
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

fn check_mask_length(what: &'static str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(Error::MaskLength { what, got, expected });
    }
    Ok(())
}

fn validate_drawing(drawing: &Drawing) -> Result<()> {
    drawing.mesh.validate()?;
    if drawing.positions.is_empty() {
        return Err(Error::EmptyPositions);
    }
    if let Some(m) = &drawing.display_positions {
        check_mask_length("display positions", m.len(), drawing.positions.len())?;
    }
    if let Some(m) = &drawing.triangle_mask {
        check_mask_length("triangle mask", m.len(), drawing.mesh.triangle_count())?;
    }
    Ok(())
}
