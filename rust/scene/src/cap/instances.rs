// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Caps for drawings shown at several placements.
//!
//! A drawing is shown once for every combination of its own displayed
//! positions and those of its ancestors. When that is more than one placement
//! the cap cannot live under the drawing, so it is attached to the nearest
//! ancestor shown exactly once (the holder) and built in the holder's frame.
//!
//! Each placement is cut separately in the drawing's own frame and the pieces
//! are moved into the holder frame and concatenated into one mesh. Placements
//! whose bounding sphere does not reach the plane are skipped before any exact
//! intersection work. All pieces lie on the same holder-frame plane, so the
//! combined cap uses that plane's normal throughout.

use clipcap_geometry::{compute_cap, Mesh, Place, Plane};

use crate::error::{Error, Result};
use crate::keys::DrawingKey;
use crate::scene::Scene;

/// Where a drawing's caps are attached and where the drawing appears there
#[derive(Debug, Clone, PartialEq)]
pub struct CapFrame {
    /// Nearest drawing, starting from the owner itself, that is shown at a
    /// single scene placement
    pub holder: DrawingKey,
    /// Displayed placements of the owner's frame in the holder's frame
    pub placements: Vec<Place>,
}

impl CapFrame {
    /// True when the cap can be a plain child of its owner
    pub fn is_single(&self, owner: DrawingKey) -> bool {
        self.holder == owner
    }
}

/// Find the holder of `key`'s caps and the placements of `key` below it.
pub fn cap_frame(scene: &Scene, key: DrawingKey) -> Result<CapFrame> {
    let mut chain = Vec::new();
    let mut cursor = Some(key);
    while let Some(k) = cursor {
        let d = scene.get(k).ok_or(Error::DrawingNotFound(k))?;
        chain.push(k);
        cursor = d.parent();
    }

    // The holder and everything above it must have exactly one position
    let mut holder_index = chain.len();
    for (i, &k) in chain.iter().enumerate().rev() {
        if scene.get(k).map_or(0, |d| d.positions().len()) != 1 {
            break;
        }
        holder_index = i;
    }
    if holder_index == chain.len() {
        return Err(Error::NoCapParent(key));
    }

    let mut placements = vec![Place::identity()];
    for &k in chain[..holder_index].iter().rev() {
        let d = scene.get(k).ok_or(Error::DrawingNotFound(k))?;
        let mut next = Vec::with_capacity(placements.len() * d.positions().len());
        for outer in &placements {
            next.extend(d.displayed_positions().map(|p| outer * p));
        }
        placements = next;
    }

    Ok(CapFrame {
        holder: chain[holder_index],
        placements,
    })
}

/// Combined cap of every placement of `key` cut by a scene-space plane,
/// expressed in the frame of `frame.holder`.
///
/// `offset` shifts the cut along the plane normal, in the drawing's units.
pub fn compute_instances_cap(
    scene: &Scene,
    key: DrawingKey,
    frame: &CapFrame,
    indices: &[u32],
    plane: &Plane,
    offset: f64,
) -> Result<Mesh> {
    let drawing = scene.get(key).ok_or(Error::DrawingNotFound(key))?;
    let Some(bounds) = drawing.mesh().bounds() else {
        return Ok(Mesh::new());
    };
    let (center, radius) = (bounds.center(), bounds.radius());

    let to_holder = scene.scene_position(frame.holder)?.inverse()?;
    let holder_plane = plane.transformed(&to_holder)?;

    let positions = &drawing.mesh().positions;
    let mut cap = Mesh::new();
    let mut candidates = 0usize;
    let mut pieces = 0usize;
    for place in &frame.placements {
        // The cut is shifted by `offset`, so the sphere must reach that far
        let c = place.transform_point(&center);
        let reach = (radius + offset.abs()) * place.max_scale();
        if holder_plane.signed_distance(&c).abs() > reach {
            continue;
        }
        candidates += 1;

        let local = holder_plane.transformed(&place.inverse()?)?;
        let mut piece = compute_cap(&local.normal, local.offset() + offset, positions, indices)?;
        if piece.is_empty() {
            continue;
        }
        place.transform_points_in_place(&mut piece.positions);
        cap.merge(&piece);
        pieces += 1;
    }
    cap.fill_normals(&holder_plane.normal);

    tracing::trace!(
        drawing = ?key,
        holder = ?frame.holder,
        placements = frame.placements.len(),
        candidates,
        pieces,
        "Computed instance caps"
    );
    Ok(cap)
}
