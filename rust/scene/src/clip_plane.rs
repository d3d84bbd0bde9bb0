// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Clip planes and the ordered set of planes active in a view.
//!
//! A clip plane is either fixed in scene coordinates or fixed relative to the
//! camera (near/far planes). Normals point toward the half-space that stays
//! visible. Every pose edit marks the plane changed; the capping pass clears
//! the flags once it has caught up.

use clipcap_geometry::{Place, Plane, Point3, Vector3};

use crate::camera::Camera;

/// Name of the camera-relative plane that clips geometry close to the viewer
pub const NEAR: &str = "near";
/// Name of the camera-relative plane that clips distant geometry
pub const FAR: &str = "far";
pub const FRONT: &str = "front";
pub const BACK: &str = "back";

/// A named clipping plane
#[derive(Debug, Clone, PartialEq)]
pub struct ClipPlane {
    name: String,
    normal: Vector3<f64>,
    plane_point: Point3<f64>,
    camera_normal: Option<Vector3<f64>>,
    last_distance: Option<f64>,
    changed: bool,
}

impl ClipPlane {
    /// Plane fixed in scene coordinates
    pub fn new(name: impl Into<String>, normal: Vector3<f64>, plane_point: Point3<f64>) -> Self {
        Self {
            name: name.into(),
            normal,
            plane_point,
            camera_normal: None,
            last_distance: None,
            changed: false,
        }
    }

    /// Plane whose normal stays fixed in camera coordinates
    pub fn camera_relative(
        name: impl Into<String>,
        normal: Vector3<f64>,
        plane_point: Point3<f64>,
        camera_normal: Vector3<f64>,
    ) -> Self {
        Self {
            camera_normal: Some(camera_normal),
            ..Self::new(name, normal, plane_point)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    pub fn plane_point(&self) -> Point3<f64> {
        self.plane_point
    }

    pub fn camera_normal(&self) -> Option<Vector3<f64>> {
        self.camera_normal
    }

    /// True if the pose changed since the last [`ClipPlanes::clear_changes`]
    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn set_normal(&mut self, normal: Vector3<f64>) {
        self.normal = normal;
        self.changed = true;
    }

    pub fn set_plane_point(&mut self, plane_point: Point3<f64>) {
        self.plane_point = plane_point;
        self.changed = true;
    }

    pub fn set_camera_normal(&mut self, camera_normal: Option<Vector3<f64>>) {
        self.camera_normal = camera_normal;
        self.changed = true;
    }

    /// Re-aim a camera-relative plane after the camera moved.
    ///
    /// When the scene-space direction changes the plane point is moved to keep
    /// the plane at the distance from the camera it had last time.
    pub fn update_direction(&mut self, camera_position: &Place) {
        let Some(camera_normal) = self.camera_normal else {
            return;
        };
        let direction = camera_position.transform_vector(&camera_normal);
        let camera_origin = camera_position.origin();
        if direction != self.normal {
            if let Some(distance) = self.last_distance {
                self.set_plane_point(camera_origin + direction * distance);
            }
            self.set_normal(direction);
        }
        self.last_distance = Some((self.plane_point - camera_origin).dot(&direction));
    }

    /// Signed distance of the plane from `origin` along the normal
    pub fn offset(&self, origin: &Point3<f64>) -> f64 {
        (self.plane_point - origin).dot(&self.normal)
    }

    /// Plane equation `(nx, ny, nz, -n·p)`; points with a positive value are kept
    pub fn equation(&self) -> [f64; 4] {
        let n = self.normal;
        [n.x, n.y, n.z, -n.dot(&self.plane_point.coords)]
    }

    /// Geometric plane with a unit normal
    pub fn plane(&self) -> clipcap_geometry::Result<Plane> {
        Plane::new(self.plane_point, self.normal)
    }
}

/// Ordered set of clip planes with unique names
#[derive(Debug, Clone, Default)]
pub struct ClipPlanes {
    planes: Vec<ClipPlane>,
    changed: bool,
}

impl ClipPlanes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn planes(&self) -> &[ClipPlane] {
        &self.planes
    }

    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.planes.iter().map(|p| p.name()).collect()
    }

    /// Adds a plane at the end, or replaces a plane of the same name in place
    pub fn add_plane(&mut self, plane: ClipPlane) {
        match self.planes.iter_mut().find(|p| p.name == plane.name) {
            Some(existing) => *existing = plane,
            None => self.planes.push(plane),
        }
        self.changed = true;
    }

    pub fn find_plane(&self, name: &str) -> Option<&ClipPlane> {
        self.planes.iter().find(|p| p.name == name)
    }

    pub fn find_plane_mut(&mut self, name: &str) -> Option<&mut ClipPlane> {
        self.planes.iter_mut().find(|p| p.name == name)
    }

    /// Removes and returns the named plane
    pub fn remove_plane(&mut self, name: &str) -> Option<ClipPlane> {
        let index = self.planes.iter().position(|p| p.name == name)?;
        self.changed = true;
        Some(self.planes.remove(index))
    }

    /// Replaces the whole set; later planes win on duplicate names
    pub fn replace_planes(&mut self, planes: impl IntoIterator<Item = ClipPlane>) {
        self.planes.clear();
        for plane in planes {
            self.add_plane(plane);
        }
        self.changed = true;
    }

    pub fn clear(&mut self) {
        self.planes.clear();
        self.changed = true;
    }

    /// Force the next capping pass to run even though no plane moved
    pub(crate) fn mark_changed(&mut self) {
        self.changed = true;
    }

    /// True if any plane follows the camera
    pub fn have_camera_plane(&self) -> bool {
        self.planes.iter().any(|p| p.camera_normal.is_some())
    }

    /// True if the set or any member plane changed
    pub fn changed(&self) -> bool {
        self.changed || self.planes.iter().any(|p| p.changed)
    }

    pub fn clear_changes(&mut self) {
        self.changed = false;
        for p in &mut self.planes {
            p.changed = false;
        }
    }

    /// Re-aim every camera-relative plane
    pub fn update_directions(&mut self, camera_position: &Place) {
        for p in &mut self.planes {
            p.update_direction(camera_position);
        }
    }

    /// Moves the named plane through `point`, creating it if needed.
    ///
    /// New `near`/`far` planes follow the camera; any other new plane faces
    /// along the current view direction.
    pub fn set_clip_position(&mut self, name: &str, point: Point3<f64>, camera: &Camera) {
        if let Some(p) = self.find_plane_mut(name) {
            p.set_plane_point(point);
            return;
        }
        let plane = match name {
            NEAR | FAR => {
                let camera_normal = if name == NEAR { -Vector3::z() } else { Vector3::z() };
                let normal = camera.position.transform_vector(&camera_normal);
                ClipPlane::camera_relative(name, normal, point, camera_normal)
            }
            _ => ClipPlane::new(name, camera.view_direction(), point),
        };
        self.add_plane(plane);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn x_plane(name: &str, x: f64) -> ClipPlane {
        ClipPlane::new(name, Vector3::x(), Point3::new(x, 0.0, 0.0))
    }

    #[test]
    fn setters_mark_changed() {
        let mut p = x_plane("front", 0.0);
        assert!(!p.changed());
        p.set_plane_point(Point3::new(1.0, 0.0, 0.0));
        assert!(p.changed());
    }

    #[test]
    fn offset_and_equation() {
        let p = x_plane("front", 2.0);
        assert_relative_eq!(p.offset(&Point3::new(0.5, 7.0, 1.0)), 1.5);
        assert_eq!(p.equation(), [1.0, 0.0, 0.0, -2.0]);
    }

    #[test]
    fn add_replaces_same_name() {
        let mut planes = ClipPlanes::new();
        planes.add_plane(x_plane("front", 0.0));
        planes.add_plane(x_plane("back", 1.0));
        planes.add_plane(x_plane("front", 3.0));
        assert_eq!(planes.names(), vec!["front", "back"]);
        assert_relative_eq!(planes.find_plane("front").unwrap().plane_point().x, 3.0);
    }

    #[test]
    fn change_tracking() {
        let mut planes = ClipPlanes::new();
        assert!(!planes.changed());
        planes.add_plane(x_plane("front", 0.0));
        assert!(planes.changed());
        planes.clear_changes();
        assert!(!planes.changed());

        planes.find_plane_mut("front").unwrap().set_normal(Vector3::y());
        assert!(planes.changed());
        planes.clear_changes();

        assert!(planes.remove_plane("missing").is_none());
        assert!(!planes.changed());
        assert!(planes.remove_plane("front").is_some());
        assert!(planes.changed());
    }

    #[test]
    fn camera_plane_follows_camera_at_same_distance() {
        let mut near = ClipPlane::camera_relative("near", -Vector3::z(), Point3::new(0.0, 0.0, -5.0), -Vector3::z());
        near.update_direction(&Place::identity());
        assert!(!near.changed());

        let turned = Place::rotation(&Vector3::y(), FRAC_PI_2);
        near.update_direction(&turned);
        assert!(near.changed());
        assert_relative_eq!(near.normal(), -Vector3::x(), epsilon = 1e-12);
        assert_relative_eq!(near.plane_point(), Point3::new(-5.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn scene_plane_ignores_camera() {
        let mut p = x_plane("front", 1.0);
        p.update_direction(&Place::rotation(&Vector3::y(), 1.0));
        assert!(!p.changed());
        assert_eq!(p.normal(), Vector3::x());
    }

    #[test]
    fn set_clip_position_creates_and_moves() {
        let camera = Camera::default();
        let mut planes = ClipPlanes::new();
        planes.set_clip_position("near", Point3::new(0.0, 0.0, -1.0), &camera);
        planes.set_clip_position("far", Point3::new(0.0, 0.0, -9.0), &camera);
        planes.set_clip_position("slice", Point3::origin(), &camera);

        assert!(planes.have_camera_plane());
        assert_relative_eq!(planes.find_plane("near").unwrap().normal(), -Vector3::z());
        assert_relative_eq!(planes.find_plane("far").unwrap().normal(), Vector3::z());
        assert!(planes.find_plane("slice").unwrap().camera_normal().is_none());

        planes.set_clip_position("slice", Point3::new(0.0, 0.0, 3.0), &camera);
        assert_eq!(planes.len(), 3);
        assert_relative_eq!(planes.find_plane("slice").unwrap().plane_point().z, 3.0);
    }
}
