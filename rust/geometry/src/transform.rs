// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement transforms for drawings and drawing instances
//!
//! A [`Place`] maps coordinates from a local frame into its parent frame.
//! Points pick up the translation, vectors do not, and plane normals use the
//! inverse-transpose of the linear part so that they stay perpendicular to
//! transformed planes.

use crate::error::{Error, Result};
use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, Unit, Vector3};
use std::ops::Mul;

/// Rigid (or general affine) placement stored as a homogeneous 4x4 matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Place {
    matrix: Matrix4<f64>,
}

impl Place {
    /// Identity placement
    #[inline]
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Wrap an existing homogeneous matrix
    #[inline]
    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// Pure translation
    #[inline]
    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            matrix: Matrix4::new_translation(&Vector3::new(x, y, z)),
        }
    }

    /// Rotation about an axis through the origin, angle in radians.
    /// A degenerate axis yields the identity.
    pub fn rotation(axis: &Vector3<f64>, angle: f64) -> Self {
        let unit_axis = match Unit::try_new(*axis, 1e-15) {
            Some(a) => a,
            None => return Self::identity(),
        };
        Self {
            matrix: Rotation3::from_axis_angle(&unit_axis, angle).to_homogeneous(),
        }
    }

    /// Underlying homogeneous matrix
    #[inline]
    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        self.matrix == Matrix4::identity()
    }

    /// Inverse placement
    pub fn inverse(&self) -> Result<Place> {
        self.matrix
            .try_inverse()
            .map(Place::from_matrix)
            .ok_or(Error::SingularTransform)
    }

    #[inline]
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.matrix.transform_point(point)
    }

    /// Transform a direction, ignoring translation
    #[inline]
    pub fn transform_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.matrix.transform_vector(vector)
    }

    /// Transform a surface or plane normal and renormalize it
    pub fn transform_normal(&self, normal: &Vector3<f64>) -> Result<Vector3<f64>> {
        let inverse = self.linear().try_inverse().ok_or(Error::SingularTransform)?;
        (inverse.transpose() * normal)
            .try_normalize(1e-15)
            .ok_or(Error::DegeneratePlane)
    }

    /// Image of the local origin in the parent frame
    #[inline]
    pub fn origin(&self) -> Point3<f64> {
        Point3::new(self.matrix[(0, 3)], self.matrix[(1, 3)], self.matrix[(2, 3)])
    }

    /// Largest factor by which this placement stretches a length
    pub fn max_scale(&self) -> f64 {
        let linear = self.linear();
        linear
            .column_iter()
            .map(|c| c.norm())
            .fold(0.0, f64::max)
    }

    /// Transform packed xyz positions in place
    pub fn transform_points_in_place(&self, positions: &mut [f32]) {
        if self.is_identity() {
            return;
        }
        positions.chunks_exact_mut(3).for_each(|chunk| {
            let point = Point3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
            let t = self.matrix.transform_point(&point);
            chunk[0] = t.x as f32;
            chunk[1] = t.y as f32;
            chunk[2] = t.z as f32;
        });
    }

    #[inline]
    fn linear(&self) -> Matrix3<f64> {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }
}

impl Default for Place {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Place {
    type Output = Place;

    #[inline]
    fn mul(self, rhs: Place) -> Place {
        Place::from_matrix(self.matrix * rhs.matrix)
    }
}

impl Mul<&Place> for &Place {
    type Output = Place;

    #[inline]
    fn mul(self, rhs: &Place) -> Place {
        Place::from_matrix(self.matrix * rhs.matrix)
    }
}
