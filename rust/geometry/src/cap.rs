// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Clip caps: the part of a plane enclosed by a triangulated surface
//!
//! The plane is `normal · p = offset` in the mesh's own frame. Every triangle
//! that straddles the plane contributes one directed segment; segments share
//! endpoints through the mesh edge they were cut from, so a closed surface
//! yields closed loops. Loops are nested by containment: a loop inside an even
//! number of others bounds the section and one inside an odd number is a hole
//! in the innermost loop around it. Loop direction is not used for this, so
//! surfaces with inward-facing triangles are capped the same way.
//!
//! Vertices lying exactly on the plane count as being in front of it, so every
//! cut edge has one endpoint strictly behind the plane and no segment
//! degenerates into a single vertex.

use crate::error::{Error, Result};
use crate::mesh::{validate_arrays, Mesh};
use crate::triangulation::{
    plane_basis, point_in_polygon, project_to_2d_with_basis, signed_area,
    triangulate_polygon_with_holes,
};
use crate::{Point2, Point3, Vector3};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Loops shorter than this are treated as a single point
const POINT_EPSILON: f64 = 1e-12;

/// Loops enclosing less area than this are dropped
const AREA_EPSILON: f64 = 1e-14;

/// Relative tolerance for removing straight-through loop points
const COLLINEAR_EPSILON: f64 = 1e-9;

/// Boundary of a plane section
#[derive(Debug, Clone, Default)]
pub struct CapLoops {
    /// Closed loops in mesh coordinates, first point not repeated at the end
    pub loops: Vec<Vec<Point3<f64>>>,
    /// Chains that did not close (open surfaces, unwelded seams)
    pub open_chains: usize,
}

impl CapLoops {
    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }
}

/// Trace the loops in which the plane `normal · p = offset` cuts a mesh
pub fn boundary_loops(
    normal: &Vector3<f64>,
    offset: f64,
    positions: &[f32],
    indices: &[u32],
) -> Result<CapLoops> {
    validate_arrays(positions, indices)?;
    let normal = normal.try_normalize(1e-15).ok_or(Error::DegeneratePlane)?;

    let distances: Vec<f64> = positions
        .chunks_exact(3)
        .map(|c| normal.x * c[0] as f64 + normal.y * c[1] as f64 + normal.z * c[2] as f64 - offset)
        .collect();
    let behind = |i: u32| distances[i as usize] < 0.0;

    // One point per cut mesh edge, keyed by its sorted vertex pair.
    let mut edge_points: FxHashMap<(u32, u32), usize> = FxHashMap::default();
    let mut points: Vec<Point3<f64>> = Vec::new();
    let mut edge_point = |a: u32, b: u32| -> usize {
        let (i, j) = if a < b { (a, b) } else { (b, a) };
        *edge_points.entry((i, j)).or_insert_with(|| {
            let (di, dj) = (distances[i as usize], distances[j as usize]);
            let t = di / (di - dj);
            let pi = vertex(positions, i);
            let pj = vertex(positions, j);
            points.push(pi + (pj - pi) * t);
            points.len() - 1
        })
    };

    let mut segments: Vec<(usize, usize)> = Vec::new();
    for tri in indices.chunks_exact(3) {
        let sides = [behind(tri[0]), behind(tri[1]), behind(tri[2])];
        if sides[0] == sides[1] && sides[1] == sides[2] {
            continue;
        }
        // The lone vertex is the one whose side differs from the other two.
        let lone = if sides[1] == sides[2] {
            0
        } else if sides[0] == sides[2] {
            1
        } else {
            2
        };
        let l = tri[lone];
        let n1 = tri[(lone + 1) % 3];
        let n2 = tri[(lone + 2) % 3];
        let p = edge_point(l, n1);
        let q = edge_point(n2, l);
        if sides[lone] {
            segments.push((q, p));
        } else {
            segments.push((p, q));
        }
    }

    if segments.is_empty() {
        return Ok(CapLoops::default());
    }

    let mut next: FxHashMap<usize, usize> = FxHashMap::default();
    for &(start, end) in &segments {
        if next.insert(start, end).is_some() {
            tracing::trace!(point = start, "cap boundary point has several outgoing segments");
        }
    }

    let mut result = CapLoops::default();
    let mut visited: FxHashSet<usize> = FxHashSet::default();

    // Open chains start at points nothing leads into.
    let incoming: FxHashSet<usize> = segments.iter().map(|&(_, end)| end).collect();
    for &(start, _) in &segments {
        if incoming.contains(&start) || !visited.insert(start) {
            continue;
        }
        let mut current = start;
        while let Some(&n) = next.get(&current) {
            if !visited.insert(n) {
                break;
            }
            current = n;
        }
        result.open_chains += 1;
    }

    for &(start, _) in &segments {
        if visited.contains(&start) {
            continue;
        }
        let mut chain = vec![start];
        visited.insert(start);
        let mut current = start;
        let closed = loop {
            match next.get(&current) {
                Some(&n) if n == start => break true,
                Some(&n) if !visited.contains(&n) => {
                    visited.insert(n);
                    chain.push(n);
                    current = n;
                }
                _ => break false,
            }
        };

        if !closed {
            result.open_chains += 1;
            continue;
        }

        let mut ring: Vec<Point3<f64>> = Vec::with_capacity(chain.len());
        for &i in &chain {
            let p = points[i];
            if ring.last().map_or(true, |last| (p - last).norm() > POINT_EPSILON) {
                ring.push(p);
            }
        }
        while ring.len() > 1 && (ring[0] - ring[ring.len() - 1]).norm() <= POINT_EPSILON {
            ring.pop();
        }
        if ring.len() >= 3 {
            result.loops.push(ring);
        }
    }

    if result.open_chains > 0 {
        tracing::trace!(open_chains = result.open_chains, "discarded open cap boundary chains");
    }

    Ok(result)
}

/// Compute the cap where the plane `normal · p = offset` cuts a mesh
///
/// The returned mesh has its vertices on the plane, triangles wound so that
/// their normal is `normal`, and every vertex normal set to `normal`. It is
/// empty when the plane misses the mesh or the section has no area.
pub fn compute_cap(
    normal: &Vector3<f64>,
    offset: f64,
    positions: &[f32],
    indices: &[u32],
) -> Result<Mesh> {
    let normal = normal.try_normalize(1e-15).ok_or(Error::DegeneratePlane)?;
    let boundary = boundary_loops(&normal, offset, positions, indices)?;
    if boundary.is_empty() {
        return Ok(Mesh::new());
    }
    triangulate_loops(&normal, offset, &boundary.loops)
}

/// Triangulate closed section loops lying in the plane `normal · p = offset`
fn triangulate_loops(
    normal: &Vector3<f64>,
    offset: f64,
    loops: &[Vec<Point3<f64>>],
) -> Result<Mesh> {
    let (u_axis, v_axis) = plane_basis(normal);
    let origin = Point3::from(normal * offset);

    let flat: Vec<Vec<Point2<f64>>> = loops
        .iter()
        .map(|l| drop_collinear(project_to_2d_with_basis(l, &u_axis, &v_axis, &origin)))
        .collect();
    let areas: Vec<f64> = flat.iter().map(|l| signed_area(l).abs()).collect();
    let kept: Vec<usize> = (0..flat.len()).filter(|&i| areas[i] > AREA_EPSILON).collect();

    let mut containers: Vec<SmallVec<[usize; 2]>> = vec![SmallVec::new(); flat.len()];
    for &i in &kept {
        for &j in &kept {
            if j != i && areas[j] > areas[i] && point_in_polygon(&flat[i][0], &flat[j]) {
                containers[i].push(j);
            }
        }
    }

    let outers: Vec<usize> = kept
        .iter()
        .copied()
        .filter(|&i| containers[i].len() % 2 == 0)
        .collect();
    let mut holes_of: Vec<SmallVec<[usize; 2]>> = vec![SmallVec::new(); flat.len()];
    for &hole in kept.iter().filter(|&&i| containers[i].len() % 2 == 1) {
        let innermost = containers[hole]
            .iter()
            .copied()
            .min_by(|&a, &b| areas[a].total_cmp(&areas[b]));
        if let Some(outer) = innermost {
            holes_of[outer].push(hole);
        }
    }

    let mut cap = Mesh::new();
    for &outer in &outers {
        let holes: Vec<Vec<Point2<f64>>> =
            holes_of[outer].iter().map(|&h| flat[h].clone()).collect();
        let triangles = triangulate_polygon_with_holes(&flat[outer], &holes)?;

        let polygon_2d: Vec<Point2<f64>> = flat[outer]
            .iter()
            .chain(holes.iter().flatten())
            .cloned()
            .collect();

        let base = cap.vertex_count() as u32;
        for p in &polygon_2d {
            let on_plane = origin + u_axis * p.x + v_axis * p.y;
            cap.add_vertex(on_plane, *normal);
        }

        for t in triangles.chunks_exact(3) {
            let (a, b, c) = (&polygon_2d[t[0]], &polygon_2d[t[1]], &polygon_2d[t[2]]);
            let winding = (b - a).perp(&(c - a));
            if winding >= 0.0 {
                cap.add_triangle(base + t[0] as u32, base + t[1] as u32, base + t[2] as u32);
            } else {
                cap.add_triangle(base + t[0] as u32, base + t[2] as u32, base + t[1] as u32);
            }
        }
    }

    if cap.triangle_count() == 0 {
        return Ok(Mesh::new());
    }
    Ok(cap)
}

/// Remove loop points where the boundary continues straight on.
/// Face diagonals cut by the plane leave such points along every section edge.
fn drop_collinear(mut ring: Vec<Point2<f64>>) -> Vec<Point2<f64>> {
    let mut i = 0;
    while ring.len() > 3 && i < ring.len() {
        let n = ring.len();
        let e1 = ring[i] - ring[(i + n - 1) % n];
        let e2 = ring[(i + 1) % n] - ring[i];
        let straight = e1.perp(&e2).abs() <= COLLINEAR_EPSILON * e1.norm() * e2.norm()
            && e1.dot(&e2) >= 0.0;
        if straight {
            ring.remove(i);
            i = i.saturating_sub(1);
        } else {
            i += 1;
        }
    }
    ring
}

#[inline]
fn vertex(positions: &[f32], index: u32) -> Point3<f64> {
    let i = index as usize * 3;
    Point3::new(
        positions[i] as f64,
        positions[i + 1] as f64,
        positions[i + 2] as f64,
    )
}
