// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewing camera

use clipcap_geometry::{Place, Point3, Vector3};

/// Camera placed in scene coordinates, looking down its local -z axis
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Camera {
    pub position: Place,
}

impl Camera {
    pub fn new(position: Place) -> Self {
        Self { position }
    }

    /// Unit view direction in scene coordinates
    pub fn view_direction(&self) -> Vector3<f64> {
        self.camera_to_scene_vector(&-Vector3::z())
    }

    /// Direction given in camera coordinates, expressed in scene coordinates
    pub fn camera_to_scene_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.position
            .transform_vector(v)
            .try_normalize(1e-15)
            .unwrap_or_else(Vector3::zeros)
    }

    pub fn origin(&self) -> Point3<f64> {
        self.position.origin()
    }
}
