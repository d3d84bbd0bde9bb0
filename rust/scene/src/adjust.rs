// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Positioning near/far/front/back clip planes relative to displayed models.
//!
//! Offsets are distances along the plane normal. A plane that does not exist
//! yet is placed relative to `origin`, or to the center of the displayed
//! models when no origin is given. An existing plane is shifted from its own
//! position unless an origin is given.

use std::ops::Neg;

use clipcap_geometry::{Point3, Vector3};

use crate::clip_plane::{ClipPlane, BACK, FRONT};
use crate::error::{Error, Result};
use crate::view::View;

/// Plane offset, or a request to remove the plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaneOffset {
    Off,
    Distance(f64),
}

impl Neg for PlaneOffset {
    type Output = PlaneOffset;

    fn neg(self) -> PlaneOffset {
        match self {
            PlaneOffset::Off => PlaneOffset::Off,
            PlaneOffset::Distance(d) => PlaneOffset::Distance(-d),
        }
    }
}

impl From<f64> for PlaneOffset {
    fn from(distance: f64) -> Self {
        PlaneOffset::Distance(distance)
    }
}

fn partner(name: &str) -> Option<&'static str> {
    match name {
        FRONT => Some(BACK),
        BACK => Some(FRONT),
        _ => None,
    }
}

impl View {
    /// Center of the displayed models
    pub fn plane_origin(&self) -> Result<Point3<f64>> {
        self.drawing_bounds()
            .map(|b| b.center())
            .ok_or(Error::NothingDisplayed)
    }

    /// Create, move or remove one clip plane.
    ///
    /// A `camera_normal` pins the plane's direction to the camera and takes
    /// precedence over `normal`.
    pub fn adjust_plane(
        &mut self,
        name: &str,
        offset: PlaneOffset,
        origin: Option<Point3<f64>>,
        normal: Option<Vector3<f64>>,
        camera_normal: Option<Vector3<f64>>,
    ) -> Result<()> {
        let offset = match offset {
            PlaneOffset::Off => {
                self.clip_planes.remove_plane(name);
                return Ok(());
            }
            PlaneOffset::Distance(d) => d,
        };

        let normal = match camera_normal {
            Some(cn) => Some(self.camera.position.transform_vector(&cn)),
            None => normal,
        };

        if let Some(plane) = self.clip_planes.find_plane_mut(name) {
            let n = normal.unwrap_or_else(|| plane.normal());
            let from = origin.unwrap_or_else(|| plane.plane_point());
            plane.set_plane_point(from + n * offset);
            if let Some(n) = normal {
                plane.set_normal(n);
            }
            return Ok(());
        }

        let n = match normal {
            Some(n) => n,
            None => {
                let partner_normal = partner(name)
                    .and_then(|p| self.clip_planes.find_plane(p))
                    .map(|p| -p.normal());
                match partner_normal {
                    Some(n) => n,
                    None if name == BACK => -self.camera.view_direction(),
                    None => self.camera.view_direction(),
                }
            }
        };
        let origin = match origin {
            Some(o) => o,
            None => self.plane_origin()?,
        };
        let point = origin + n * offset;
        let plane = match camera_normal {
            Some(cn) => ClipPlane::camera_relative(name, n, point, cn),
            None => ClipPlane::new(name, n, point),
        };
        self.clip_planes.add_plane(plane);
        Ok(())
    }

    /// Position a pair of facing planes (near/far or front/back).
    ///
    /// The second plane faces the first, so its offset is measured along the
    /// opposite normal. Without a normal the pair keeps the direction of
    /// whichever plane already exists, else faces along the view direction.
    #[allow(clippy::too_many_arguments)]
    pub fn adjust_slab(
        &mut self,
        name1: &str,
        offset1: PlaneOffset,
        name2: &str,
        offset2: PlaneOffset,
        origin: Option<Point3<f64>>,
        normal: Option<Vector3<f64>>,
        camera_normal: Option<Vector3<f64>>,
    ) -> Result<()> {
        let mut normal = normal;
        if normal.is_none() && camera_normal.is_none() {
            normal = Some(
                match (self.clip_planes.find_plane(name1), self.clip_planes.find_plane(name2)) {
                    (Some(first), _) => first.normal(),
                    (None, Some(second)) => -second.normal(),
                    (None, None) => self.camera.view_direction(),
                },
            );
        }

        self.adjust_plane(name1, offset1, origin, normal, camera_normal)?;
        self.adjust_plane(
            name2,
            -offset2,
            origin,
            normal.map(|n| -n),
            camera_normal.map(|cn| -cn),
        )
    }

    /// One-line summary of the active clip planes
    pub fn clip_info(&self) -> String {
        let planes = self.clip_planes.planes();
        if planes.is_empty() {
            return "Clipping is off".to_string();
        }
        let center = self
            .drawing_bounds()
            .map(|b| b.center())
            .unwrap_or_else(Point3::origin);
        let info: Vec<String> = planes
            .iter()
            .map(|p| format!("{} {}", p.name(), format_significant(p.offset(&center), 5)))
            .collect();
        format!("Using {} clip planes: {}", planes.len(), info.join(", "))
    }
}

/// Round to `digits` significant digits and print without trailing zeros
fn format_significant(value: f64, digits: i32) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{}", if value == 0.0 { 0.0 } else { value });
    }
    let magnitude = value.abs().log10().floor() as i32;
    let shift = digits - 1 - magnitude;
    let rounded = if shift >= 0 {
        let scale = 10f64.powi(shift);
        (value * scale).round() / scale
    } else {
        let scale = 10f64.powi(-shift);
        (value / scale).round() * scale
    };
    format!("{}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::Drawing;
    use approx::assert_relative_eq;
    use clipcap_geometry::{Mesh, Place};

    fn view_with_box() -> View {
        let mut view = View::default();
        let root = view.scene.root();
        // Two points span the bounds [0, 2] x [0, 2] x [0, 2]
        let mesh = Mesh::from_arrays(vec![0.0, 0.0, 0.0, 2.0, 2.0, 2.0, 0.0, 2.0, 0.0], vec![0, 1, 2]);
        view.scene.add_drawing(root, Drawing::new("box").with_mesh(mesh)).unwrap();
        view
    }

    #[test]
    fn nothing_displayed_is_an_error() {
        let mut view = View::default();
        assert!(matches!(view.plane_origin(), Err(Error::NothingDisplayed)));
        assert!(view
            .adjust_plane(FRONT, PlaneOffset::Distance(0.0), None, None, None)
            .is_err());
        assert!(view.clip_planes.is_empty());
    }

    #[test]
    fn new_front_plane_faces_view_direction() {
        let mut view = view_with_box();
        view.adjust_plane(FRONT, 0.5.into(), None, None, None).unwrap();
        let front = view.clip_planes.find_plane(FRONT).unwrap();
        assert_relative_eq!(front.normal(), -Vector3::z());
        assert_relative_eq!(front.plane_point(), Point3::new(1.0, 1.0, 0.5));
    }

    #[test]
    fn back_plane_opposes_front() {
        let mut view = view_with_box();
        view.adjust_plane(FRONT, 0.0.into(), None, Some(Vector3::x()), None).unwrap();
        view.adjust_plane(BACK, 0.0.into(), None, None, None).unwrap();
        assert_relative_eq!(view.clip_planes.find_plane(BACK).unwrap().normal(), -Vector3::x());
    }

    #[test]
    fn existing_plane_moves_from_its_point() {
        let mut view = view_with_box();
        view.adjust_plane(FRONT, 0.0.into(), None, Some(Vector3::x()), None).unwrap();
        view.clip_planes.clear_changes();
        view.adjust_plane(FRONT, 0.25.into(), None, None, None).unwrap();
        let front = view.clip_planes.find_plane(FRONT).unwrap();
        assert!(front.changed());
        assert_relative_eq!(front.plane_point(), Point3::new(1.25, 1.0, 1.0));

        view.adjust_plane(FRONT, PlaneOffset::Off, None, None, None).unwrap();
        assert!(view.clip_planes.find_plane(FRONT).is_none());
    }

    #[test]
    fn slab_places_facing_pair() {
        let mut view = view_with_box();
        view.adjust_slab(
            FRONT,
            (-0.5).into(),
            BACK,
            0.5.into(),
            Some(Point3::origin()),
            Some(Vector3::z()),
            None,
        )
        .unwrap();
        let front = view.clip_planes.find_plane(FRONT).unwrap();
        let back = view.clip_planes.find_plane(BACK).unwrap();
        assert_relative_eq!(front.plane_point(), Point3::new(0.0, 0.0, -0.5));
        assert_relative_eq!(back.plane_point(), Point3::new(0.0, 0.0, 0.5));
        assert_relative_eq!(back.normal(), -Vector3::z());
    }

    #[test]
    fn near_far_slab_follows_camera() {
        let mut view = view_with_box();
        view.camera.position = Place::translation(1.0, 1.0, 10.0);
        let z = Vector3::z();
        view.adjust_slab("near", 1.0.into(), "far", 3.0.into(), None, None, Some(-z))
            .unwrap();
        let near = view.clip_planes.find_plane("near").unwrap();
        let far = view.clip_planes.find_plane("far").unwrap();
        assert_eq!(near.camera_normal(), Some(-z));
        assert_eq!(far.camera_normal(), Some(z));
        assert_relative_eq!(near.plane_point(), Point3::new(1.0, 1.0, 0.0));
        assert_relative_eq!(far.plane_point(), Point3::new(1.0, 1.0, -2.0));
    }

    #[test]
    fn info_lists_offsets() {
        let mut view = view_with_box();
        assert_eq!(view.clip_info(), "Clipping is off");
        view.adjust_plane(FRONT, 0.5.into(), None, Some(Vector3::x()), None).unwrap();
        assert_eq!(view.clip_info(), "Using 1 clip planes: front 0.5");
    }

    #[test]
    fn significant_digits() {
        assert_eq!(format_significant(2.123456, 5), "2.1235");
        assert_eq!(format_significant(123456.0, 5), "123460");
        assert_eq!(format_significant(-0.0, 5), "0");
        assert_eq!(format_significant(1.0, 5), "1");
    }
}
