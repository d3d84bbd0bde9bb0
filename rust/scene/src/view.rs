// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The view ties a scene to the clip planes and camera it is drawn with.

use clipcap_geometry::{Bounds, Place};

use crate::camera::Camera;
use crate::cap;
use crate::clip_plane::ClipPlanes;
use crate::keys::DrawingKey;
use crate::scene::Scene;
use crate::settings::CapSettings;

/// Scene plus per-view drawing state
#[derive(Debug, Default)]
pub struct View {
    pub scene: Scene,
    pub clip_planes: ClipPlanes,
    pub camera: Camera,
    settings: CapSettings,
    /// Set when the next frame has to be drawn
    pub redraw_needed: bool,
}

impl View {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            ..Self::default()
        }
    }

    pub fn with_settings(mut self, settings: CapSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &CapSettings {
        &self.settings
    }

    /// Replace the capping settings. Caps catch up on the next frame.
    pub fn set_settings(&mut self, settings: CapSettings) {
        if settings != self.settings {
            self.settings = settings;
            self.clip_planes.mark_changed();
        }
    }

    pub fn shape_changed(&self) -> bool {
        self.scene.shape_changed()
    }

    /// Bring clip caps up to date with the planes and the scene
    pub fn update_clip_caps(&mut self) {
        cap::update_clip_caps(self);
    }

    /// Called by the host after drawing a frame
    pub fn end_frame(&mut self) {
        self.scene.clear_changes();
        self.redraw_needed = false;
    }

    /// Scene-space bounds of displayed geometry, caps excluded.
    ///
    /// Every displayed instance of every displayed drawing counts, with
    /// instance placements composed down the tree.
    pub fn drawing_bounds(&self) -> Option<Bounds> {
        let mut bounds = None;
        self.accumulate_bounds(self.scene.root(), &[Place::identity()], &mut bounds);
        bounds
    }

    fn accumulate_bounds(&self, key: DrawingKey, parent_places: &[Place], bounds: &mut Option<Bounds>) {
        let Some(d) = self.scene.get(key) else {
            return;
        };
        if !d.display() || d.is_cap() {
            return;
        }
        let mut places = Vec::with_capacity(parent_places.len() * d.positions().len());
        for pp in parent_places {
            places.extend(d.displayed_positions().map(|p| pp * p));
        }
        if places.is_empty() {
            return;
        }
        if let Some(local) = d.mesh().bounds() {
            for place in &places {
                let b = local.transformed(place);
                *bounds = Some(match bounds.take() {
                    Some(acc) => acc.union(&b),
                    None => b,
                });
            }
        }
        for &child in d.children() {
            self.accumulate_bounds(child, &places, bounds);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::Drawing;
    use approx::assert_relative_eq;
    use clipcap_geometry::{Mesh, Point3};

    fn unit_triangle() -> Mesh {
        Mesh::from_arrays(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], vec![0, 1, 2])
    }

    #[test]
    fn empty_view_has_no_bounds() {
        let view = View::default();
        assert!(view.drawing_bounds().is_none());
    }

    #[test]
    fn bounds_cover_displayed_instances() {
        let mut view = View::default();
        let root = view.scene.root();
        let group = view
            .scene
            .add_drawing(root, Drawing::new("group").with_positions(vec![Place::translation(0.0, 0.0, 5.0)]))
            .unwrap();
        let copies = view
            .scene
            .add_drawing(
                group,
                Drawing::new("copies").with_mesh(unit_triangle()).with_positions(vec![
                    Place::identity(),
                    Place::translation(10.0, 0.0, 0.0),
                    Place::translation(-10.0, 0.0, 0.0),
                ]),
            )
            .unwrap();

        let b = view.drawing_bounds().unwrap();
        assert_relative_eq!(b.min, Point3::new(-10.0, 0.0, 5.0));
        assert_relative_eq!(b.max, Point3::new(11.0, 1.0, 5.0));

        view.scene
            .set_display_positions(copies, Some(vec![true, true, false]))
            .unwrap();
        let b = view.drawing_bounds().unwrap();
        assert_relative_eq!(b.min, Point3::new(0.0, 0.0, 5.0));

        view.scene.set_display(group, false).unwrap();
        assert!(view.drawing_bounds().is_none());
    }

    #[test]
    fn set_settings_forces_update() {
        let mut view = View::default();
        assert!(!view.clip_planes.changed());
        view.set_settings(CapSettings::default());
        assert!(!view.clip_planes.changed());
        view.set_settings(CapSettings {
            enabled: false,
            ..CapSettings::default()
        });
        assert!(view.clip_planes.changed());
    }
}
