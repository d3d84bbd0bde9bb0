// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cap drawings, one per (owner drawing, plane name).
//!
//! Caps are created the first time a plane cuts their owner, hidden while it
//! does not, and removed only once their plane (or owner) is gone.
//! Caps of drawings shown at a single scene placement are children of their
//! owner. Any other cap holds geometry in the frame of the owner's holder (the
//! nearest ancestor shown once), so it lives under the holder and is not
//! pickable.

use clipcap_geometry::Mesh;
use rustc_hash::FxHashSet;

use crate::drawing::Drawing;
use crate::error::{Error, Result};
use crate::keys::DrawingKey;
use crate::scene::Scene;

use super::instances::cap_frame;

/// Show `geometry` as the cap of `owner` for `plane_name`, or hide the cap
/// when there is nothing to show.
pub fn set_cap_drawing_geometry(
    scene: &mut Scene,
    owner: DrawingKey,
    plane_name: &str,
    geometry: Option<Mesh>,
) -> Result<()> {
    let d = scene.get(owner).ok_or(Error::DrawingNotFound(owner))?;
    let existing = d.cap_drawing(plane_name);

    let Some(mesh) = geometry else {
        if let Some(cap) = existing {
            let c = scene.get_mut(cap)?;
            if c.display {
                c.display = false;
                scene.record_mutation();
            }
        }
        return Ok(());
    };

    let color = d.color();
    let cap_parent = cap_frame(scene, owner)?.holder;
    let single = cap_parent == owner;

    let cap = match existing {
        Some(cap) if scene.parent(cap) == Some(cap_parent) => cap,
        stale => {
            let owner_name = d.name().to_string();
            if let Some(stale) = stale {
                tracing::trace!(drawing = ?owner, plane = plane_name, "Re-parenting clip cap");
                scene.remove_subtree(stale);
            }
            let cap = scene.insert_child(
                cap_parent,
                Drawing::cap(&owner_name, owner, plane_name, single),
            )?;
            scene
                .get_mut(owner)?
                .clip_cap_drawings
                .insert(plane_name.to_string(), cap);
            cap
        }
    };

    let c = scene.get_mut(cap)?;
    if c.mesh != mesh || c.color != color || !c.display {
        c.mesh = mesh;
        c.color = color;
        c.display = true;
        scene.record_mutation();
    }
    Ok(())
}

/// Remove caps whose plane is no longer active or whose owner is gone.
/// Returns the number of cap drawings removed.
pub fn remove_obsolete_caps(scene: &mut Scene, active_planes: &FxHashSet<&str>) -> usize {
    let obsolete: Vec<DrawingKey> = scene
        .drawings
        .iter()
        .filter_map(|(key, d)| {
            let marker = d.cap_marker()?;
            let owned = scene
                .get(marker.owner)
                .map_or(false, |o| o.cap_drawing(&marker.plane_name) == Some(key));
            (!owned || !active_planes.contains(marker.plane_name.as_str())).then_some(key)
        })
        .collect();
    remove_caps(scene, obsolete)
}

/// Remove every cap drawing in the scene
pub fn remove_all_caps(scene: &mut Scene) -> usize {
    let caps: Vec<DrawingKey> = scene
        .drawings
        .iter()
        .filter(|(_, d)| d.is_cap())
        .map(|(key, _)| key)
        .collect();
    remove_caps(scene, caps)
}

fn remove_caps(scene: &mut Scene, caps: Vec<DrawingKey>) -> usize {
    let mut removed = 0;
    for cap in caps {
        if scene.contains(cap) {
            removed += scene.remove_subtree(cap);
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::ClipCapMode;
    use clipcap_geometry::Place;

    fn patch() -> Mesh {
        let mut m = Mesh::from_arrays(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], vec![0, 1, 2]);
        m.fill_normals(&clipcap_geometry::Vector3::z());
        m
    }

    fn setup(positions: Vec<Place>) -> (Scene, DrawingKey, DrawingKey) {
        let mut scene = Scene::new();
        let root = scene.root();
        let group = scene.add_drawing(root, Drawing::new("group")).unwrap();
        let owner = scene
            .add_drawing(
                group,
                Drawing::new("surface")
                    .with_clip_cap(ClipCapMode::On)
                    .with_color([10, 20, 30, 255])
                    .with_positions(positions),
            )
            .unwrap();
        (scene, group, owner)
    }

    #[test]
    fn single_instance_cap_is_child_of_owner() {
        let (mut scene, _, owner) = setup(vec![Place::identity()]);
        set_cap_drawing_geometry(&mut scene, owner, "front", Some(patch())).unwrap();

        let cap = scene.get(owner).unwrap().cap_drawing("front").unwrap();
        assert_eq!(scene.parent(cap), Some(owner));
        let c = scene.get(cap).unwrap();
        assert!(c.display());
        assert!(c.pickable());
        assert_eq!(c.color(), [10, 20, 30, 255]);
        assert_eq!(c.clip_cap_owner(), Some(owner));
        assert_eq!(c.mesh(), &patch());
    }

    #[test]
    fn instance_cap_is_unpickable_sibling() {
        let (mut scene, group, owner) = setup(vec![Place::identity(), Place::translation(3.0, 0.0, 0.0)]);
        set_cap_drawing_geometry(&mut scene, owner, "front", Some(patch())).unwrap();

        let cap = scene.get(owner).unwrap().cap_drawing("front").unwrap();
        assert_eq!(scene.parent(cap), Some(group));
        assert!(!scene.get(cap).unwrap().pickable());
    }

    #[test]
    fn empty_geometry_hides_without_deleting() {
        let (mut scene, _, owner) = setup(vec![Place::identity()]);
        set_cap_drawing_geometry(&mut scene, owner, "front", None).unwrap();
        assert!(scene.get(owner).unwrap().cap_drawing("front").is_none());

        set_cap_drawing_geometry(&mut scene, owner, "front", Some(patch())).unwrap();
        let cap = scene.get(owner).unwrap().cap_drawing("front").unwrap();
        set_cap_drawing_geometry(&mut scene, owner, "front", None).unwrap();
        assert!(!scene.get(cap).unwrap().display());

        set_cap_drawing_geometry(&mut scene, owner, "front", Some(patch())).unwrap();
        assert_eq!(scene.get(owner).unwrap().cap_drawing("front"), Some(cap));
        assert!(scene.get(cap).unwrap().display());
    }

    #[test]
    fn unchanged_geometry_is_not_a_mutation() {
        let (mut scene, _, owner) = setup(vec![Place::identity()]);
        set_cap_drawing_geometry(&mut scene, owner, "front", Some(patch())).unwrap();
        let count = scene.mutation_count();
        set_cap_drawing_geometry(&mut scene, owner, "front", Some(patch())).unwrap();
        assert_eq!(scene.mutation_count(), count);
    }

    #[test]
    fn switching_to_instances_moves_cap() {
        let (mut scene, group, owner) = setup(vec![Place::identity()]);
        set_cap_drawing_geometry(&mut scene, owner, "front", Some(patch())).unwrap();
        let old = scene.get(owner).unwrap().cap_drawing("front").unwrap();

        scene
            .set_positions(owner, vec![Place::identity(), Place::translation(0.0, 2.0, 0.0)])
            .unwrap();
        set_cap_drawing_geometry(&mut scene, owner, "front", Some(patch())).unwrap();
        let new = scene.get(owner).unwrap().cap_drawing("front").unwrap();

        assert!(!scene.contains(old));
        assert_eq!(scene.parent(new), Some(group));
        assert_eq!(scene.get(owner).unwrap().cap_drawing_count(), 1);
    }

    #[test]
    fn obsolete_caps_are_removed() {
        let (mut scene, _, owner) = setup(vec![Place::identity()]);
        set_cap_drawing_geometry(&mut scene, owner, "front", Some(patch())).unwrap();
        set_cap_drawing_geometry(&mut scene, owner, "back", Some(patch())).unwrap();

        let active: FxHashSet<&str> = ["back"].into_iter().collect();
        assert_eq!(remove_obsolete_caps(&mut scene, &active), 1);
        let o = scene.get(owner).unwrap();
        assert!(o.cap_drawing("front").is_none());
        assert!(o.cap_drawing("back").is_some());

        assert_eq!(remove_all_caps(&mut scene), 1);
        assert_eq!(scene.get(owner).unwrap().cap_drawing_count(), 0);
    }

    #[test]
    fn removing_owner_removes_sibling_caps() {
        let (mut scene, group, owner) = setup(vec![Place::identity(), Place::translation(3.0, 0.0, 0.0)]);
        set_cap_drawing_geometry(&mut scene, owner, "front", Some(patch())).unwrap();
        let cap = scene.get(owner).unwrap().cap_drawing("front").unwrap();

        scene.remove_drawing(owner).unwrap();
        assert!(!scene.contains(cap));
        assert!(scene.children(group).is_empty());
    }

    #[test]
    fn instanced_ancestor_moves_cap_above_it() {
        let (mut scene, group, owner) = setup(vec![Place::identity()]);
        set_cap_drawing_geometry(&mut scene, owner, "front", Some(patch())).unwrap();
        let old = scene.get(owner).unwrap().cap_drawing("front").unwrap();
        assert_eq!(scene.parent(old), Some(owner));

        scene
            .set_positions(group, vec![Place::identity(), Place::translation(0.0, 2.0, 0.0)])
            .unwrap();
        set_cap_drawing_geometry(&mut scene, owner, "front", Some(patch())).unwrap();
        let new = scene.get(owner).unwrap().cap_drawing("front").unwrap();

        assert!(!scene.contains(old));
        assert_eq!(scene.parent(new), Some(scene.root()));
        assert!(!scene.get(new).unwrap().pickable());
    }
}
