// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Drawings: the nodes of the scene graph.
//!
//! A drawing owns a triangle mesh, one or more placements (instances) and its
//! children. Cap drawings are ordinary drawings tagged with a [`CapMarker`];
//! the marker is the non-owning link back to the drawing being capped and is
//! what keeps caps out of the set of drawings that get capped themselves.

use clipcap_geometry::{Mesh, Place};
use rustc_hash::FxHashMap;

use crate::keys::DrawingKey;

/// RGBA color, 8 bits per channel
pub type Rgba = [u8; 4];

/// Default color for new drawings (light gray, opaque)
pub const DEFAULT_COLOR: Rgba = [178, 178, 178, 255];

/// Whether and how a drawing is capped where clip planes cut it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClipCapMode {
    /// No caps
    #[default]
    Off,
    /// Cap using the triangle connectivity as given
    On,
    /// Merge coincident vertices before tracing the cap boundary.
    /// Needed for surfaces that split vertices along sharp edges.
    WeldDuplicates,
}

impl ClipCapMode {
    #[inline]
    pub fn is_on(self) -> bool {
        self != ClipCapMode::Off
    }
}

/// Tag carried by cap drawings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapMarker {
    /// Drawing this cap seals (not owned)
    pub owner: DrawingKey,
    /// Name of the clip plane that produced the cap
    pub plane_name: String,
}

/// A node in the scene graph
#[derive(Debug, Clone)]
pub struct Drawing {
    pub(crate) name: String,
    pub(crate) mesh: Mesh,
    pub(crate) color: Rgba,
    pub(crate) positions: Vec<Place>,
    pub(crate) display_positions: Option<Vec<bool>>,
    pub(crate) display: bool,
    pub(crate) triangle_mask: Option<Vec<bool>>,
    pub(crate) clip_cap: ClipCapMode,
    pub(crate) clip_offset: f64,
    pub(crate) pickable: bool,
    pub(crate) parent: Option<DrawingKey>,
    pub(crate) children: Vec<DrawingKey>,
    pub(crate) cap_marker: Option<CapMarker>,
    pub(crate) clip_cap_drawings: FxHashMap<String, DrawingKey>,
}

impl Drawing {
    /// Empty, displayed drawing at the identity placement
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mesh: Mesh::new(),
            color: DEFAULT_COLOR,
            positions: vec![Place::identity()],
            display_positions: None,
            display: true,
            triangle_mask: None,
            clip_cap: ClipCapMode::Off,
            clip_offset: 0.0,
            pickable: true,
            parent: None,
            children: Vec::new(),
            cap_marker: None,
            clip_cap_drawings: FxHashMap::default(),
        }
    }

    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.mesh = mesh;
        self
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    pub fn with_positions(mut self, positions: Vec<Place>) -> Self {
        self.positions = positions;
        self
    }

    pub fn with_clip_cap(mut self, mode: ClipCapMode) -> Self {
        self.clip_cap = mode;
        self
    }

    pub fn with_clip_offset(mut self, clip_offset: f64) -> Self {
        self.clip_offset = clip_offset;
        self
    }

    /// New cap drawing for `owner` and plane `plane_name`
    pub(crate) fn cap(owner_name: &str, owner: DrawingKey, plane_name: &str, pickable: bool) -> Self {
        let mut cap = Drawing::new(format!("{} {} cap", owner_name, plane_name));
        cap.pickable = pickable;
        cap.cap_marker = Some(CapMarker {
            owner,
            plane_name: plane_name.to_string(),
        });
        cap
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn positions(&self) -> &[Place] {
        &self.positions
    }

    pub fn display_positions(&self) -> Option<&[bool]> {
        self.display_positions.as_deref()
    }

    /// Positions whose instances are shown
    pub fn displayed_positions(&self) -> impl Iterator<Item = &Place> + '_ {
        let mask = self.display_positions.as_deref();
        self.positions
            .iter()
            .enumerate()
            .filter(move |(i, _)| mask.map_or(true, |m| m[*i]))
            .map(|(_, p)| p)
    }

    pub fn display(&self) -> bool {
        self.display
    }

    pub fn triangle_mask(&self) -> Option<&[bool]> {
        self.triangle_mask.as_deref()
    }

    /// True when a triangle mask hides at least one triangle
    pub fn has_hidden_triangles(&self) -> bool {
        self.triangle_mask
            .as_ref()
            .map_or(false, |m| m.iter().any(|shown| !shown))
    }

    pub fn clip_cap(&self) -> ClipCapMode {
        self.clip_cap
    }

    pub fn clip_offset(&self) -> f64 {
        self.clip_offset
    }

    pub fn pickable(&self) -> bool {
        self.pickable
    }

    pub fn parent(&self) -> Option<DrawingKey> {
        self.parent
    }

    pub fn children(&self) -> &[DrawingKey] {
        &self.children
    }

    /// Set on cap drawings only
    pub fn cap_marker(&self) -> Option<&CapMarker> {
        self.cap_marker.as_ref()
    }

    pub fn is_cap(&self) -> bool {
        self.cap_marker.is_some()
    }

    /// Drawing a cap drawing seals
    pub fn clip_cap_owner(&self) -> Option<DrawingKey> {
        self.cap_marker.as_ref().map(|m| m.owner)
    }

    /// Cap drawing for a plane, if one has been made
    pub fn cap_drawing(&self, plane_name: &str) -> Option<DrawingKey> {
        self.clip_cap_drawings.get(plane_name).copied()
    }

    /// Number of cap drawings this drawing owns
    pub fn cap_drawing_count(&self) -> usize {
        self.clip_cap_drawings.len()
    }

    /// Opted in to capping and has triangles to cap
    pub fn wants_caps(&self) -> bool {
        self.clip_cap.is_on() && !self.is_cap() && self.mesh.triangle_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_drawing_defaults() {
        let d = Drawing::new("surface");
        assert_eq!(d.name(), "surface");
        assert!(d.display());
        assert_eq!(d.positions().len(), 1);
        assert_eq!(d.clip_cap(), ClipCapMode::Off);
        assert!(!d.wants_caps());
        assert!(!d.is_cap());
    }

    #[test]
    fn test_displayed_positions_mask() {
        let mut d = Drawing::new("copies").with_positions(vec![
            Place::translation(0.0, 0.0, 0.0),
            Place::translation(1.0, 0.0, 0.0),
            Place::translation(2.0, 0.0, 0.0),
        ]);
        assert_eq!(d.displayed_positions().count(), 3);
        d.display_positions = Some(vec![true, false, true]);
        let shown: Vec<_> = d.displayed_positions().map(|p| p.origin().x).collect();
        assert_eq!(shown, vec![0.0, 2.0]);
    }

    #[test]
    fn test_hidden_triangles() {
        let mut d = Drawing::new("masked");
        assert!(!d.has_hidden_triangles());
        d.triangle_mask = Some(vec![true, true]);
        assert!(!d.has_hidden_triangles());
        d.triangle_mask = Some(vec![true, false]);
        assert!(d.has_hidden_triangles());
    }

    #[test]
    fn test_cap_drawing_is_never_capped() {
        let mut keys = slotmap::SlotMap::<DrawingKey, ()>::with_key();
        let owner = keys.insert(());
        let mut cap = Drawing::cap("surface", owner, "front", true);
        cap.clip_cap = ClipCapMode::On;
        cap.mesh = Mesh::from_arrays(vec![0.0; 9], vec![0, 1, 2]);
        assert!(cap.is_cap());
        assert_eq!(cap.clip_cap_owner(), Some(owner));
        assert!(!cap.wants_caps());
        assert_eq!(cap.name(), "surface front cap");
    }
}
