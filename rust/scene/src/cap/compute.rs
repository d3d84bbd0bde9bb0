// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::borrow::Cow;

use clipcap_geometry::{compute_cap, welded_indices, Mesh, Plane};

use crate::drawing::ClipCapMode;
use crate::error::{Error, Result};
use crate::keys::DrawingKey;
use crate::scene::Scene;

use super::instances::{cap_frame, compute_instances_cap};

/// Cap geometry for one drawing cut by a scene-space plane.
///
/// `None` means nothing should be shown: the drawing is hidden, some of its
/// triangles are masked out, or the plane misses it. Caps of drawings shown at
/// one scene placement are in the drawing's own frame, all others in the frame
/// of their holder (see [`cap_frame`]).
pub fn cap_geometry(scene: &Scene, key: DrawingKey, plane: &Plane, offset: f64) -> Result<Option<Mesh>> {
    let drawing = scene.get(key).ok_or(Error::DrawingNotFound(key))?;
    if !drawing.display() {
        tracing::trace!(drawing = ?key, "Not capping hidden drawing");
        return Ok(None);
    }
    if drawing.has_hidden_triangles() {
        tracing::trace!(drawing = ?key, "Not capping partially masked drawing");
        return Ok(None);
    }

    let mesh = drawing.mesh();
    let indices: Cow<'_, [u32]> = match drawing.clip_cap() {
        ClipCapMode::WeldDuplicates => Cow::Owned(welded_indices(&mesh.positions, &mesh.indices)),
        _ => Cow::Borrowed(&mesh.indices),
    };
    let offset = offset + drawing.clip_offset();

    let frame = cap_frame(scene, key)?;
    let cap = if !frame.is_single(key) {
        compute_instances_cap(scene, key, &frame, &indices, plane, offset)?
    } else {
        let to_local = scene.scene_position(key)?.inverse()?;
        let local = plane.transformed(&to_local)?;
        compute_cap(&local.normal, local.offset() + offset, &mesh.positions, &indices)?
    };

    Ok((!cap.is_empty()).then_some(cap))
}
