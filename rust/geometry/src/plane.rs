// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Oriented planes

use crate::error::{Error, Result};
use crate::transform::Place;
use nalgebra::{Point3, Vector3};

/// Plane through `point` with unit `normal`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Point on the plane
    pub point: Point3<f64>,
    /// Normal vector (normalized)
    pub normal: Vector3<f64>,
}

impl Plane {
    /// Create a new plane, normalizing the normal
    pub fn new(point: Point3<f64>, normal: Vector3<f64>) -> Result<Self> {
        let normal = normal.try_normalize(1e-15).ok_or(Error::DegeneratePlane)?;
        Ok(Self { point, normal })
    }

    /// Signed distance of the plane from the origin along its normal
    #[inline]
    pub fn offset(&self) -> f64 {
        self.normal.dot(&self.point.coords)
    }

    /// Calculate signed distance from point to plane
    /// Positive = in front, Negative = behind
    #[inline]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        (point - self.point).dot(&self.normal)
    }

    /// Express this plane in the frame that `place` maps into
    pub fn transformed(&self, place: &Place) -> Result<Plane> {
        Ok(Plane {
            point: place.transform_point(&self.point),
            normal: place.transform_normal(&self.normal)?,
        })
    }
}
