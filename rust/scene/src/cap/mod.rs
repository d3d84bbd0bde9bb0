// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-frame clip cap maintenance.
//!
//! [`update_clip_caps`] runs once per frame. It costs nothing unless a clip
//! plane changed or visible geometry changed while planes are active; in that
//! case every drawing that opted in to capping is cut by every plane and the
//! resulting cap drawings are brought up to date.
//!
//! A failure while capping one drawing is logged and leaves that drawing's
//! cap as it was; the remaining drawings and planes are still processed.

mod cache;
mod compute;
mod instances;

use rustc_hash::FxHashSet;

use crate::clip_plane::ClipPlane;
use crate::drawing::Drawing;
use crate::keys::DrawingKey;
use crate::scene::Scene;
use crate::view::View;

pub use cache::{remove_all_caps, remove_obsolete_caps, set_cap_drawing_geometry};
pub use compute::cap_geometry;
pub use instances::{cap_frame, compute_instances_cap, CapFrame};

/// Bring cap drawings in line with the view's clip planes
pub fn update_clip_caps(view: &mut View) {
    let settings = *view.settings();
    let planes = &mut view.clip_planes;
    planes.update_directions(&view.camera.position);

    let update = planes.changed() || (view.scene.shape_changed() && !planes.is_empty());
    if !update {
        return;
    }

    if settings.enabled {
        show_surface_clip_caps(&mut view.scene, planes.planes(), settings.offset);
    } else {
        let removed = remove_all_caps(&mut view.scene);
        tracing::debug!(removed, "Capping disabled, removed clip caps");
    }

    planes.clear_changes();
    view.redraw_needed = true;
}

/// Recompute the caps of every capped drawing for every plane
pub fn show_surface_clip_caps(scene: &mut Scene, planes: &[ClipPlane], offset: f64) {
    let drawings: Vec<DrawingKey> = scene
        .all_drawings()
        .into_iter()
        .filter(|&k| scene.get(k).map_or(false, Drawing::wants_caps))
        .collect();

    tracing::debug!(
        planes = planes.len(),
        drawings = drawings.len(),
        "Updating clip caps"
    );

    for clip_plane in planes {
        let plane = match clip_plane.plane() {
            Ok(plane) => plane,
            Err(e) => {
                tracing::warn!(plane = clip_plane.name(), error = %e, "Skipping clip plane");
                continue;
            }
        };
        for &key in &drawings {
            let result = cap_geometry(scene, key, &plane, offset)
                .and_then(|mesh| set_cap_drawing_geometry(scene, key, clip_plane.name(), mesh));
            if let Err(e) = result {
                tracing::warn!(
                    drawing = ?key,
                    plane = clip_plane.name(),
                    error = %e,
                    "Failed to compute clip cap"
                );
            }
        }
    }

    let active: FxHashSet<&str> = planes.iter().map(ClipPlane::name).collect();
    let removed = remove_obsolete_caps(scene, &active);
    if removed > 0 {
        tracing::debug!(removed, "Removed obsolete clip caps");
    }
}
