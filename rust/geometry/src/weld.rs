// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vertex welding
//!
//! Surfaces with sharp edges often repeat a vertex once per adjoining patch so
//! that each patch can carry its own normal. Those seams break boundary-loop
//! tracing, so vertices at identical positions are mapped to one canonical
//! index before edges are matched.

use rustc_hash::FxHashMap;

/// Position key: exact bits with -0.0 folded into 0.0
#[inline]
fn position_key(chunk: &[f32]) -> [u32; 3] {
    let bits = |v: f32| if v == 0.0 { 0u32 } else { v.to_bits() };
    [bits(chunk[0]), bits(chunk[1]), bits(chunk[2])]
}

/// Map each vertex to the index of the first vertex at the same position
///
/// Positions must match exactly; there is no distance tolerance.
pub fn unique_vertex_map(positions: &[f32]) -> Vec<u32> {
    let vertex_count = positions.len() / 3;
    let mut first_seen: FxHashMap<[u32; 3], u32> = FxHashMap::default();
    first_seen.reserve(vertex_count);

    positions
        .chunks_exact(3)
        .enumerate()
        .map(|(i, chunk)| *first_seen.entry(position_key(chunk)).or_insert(i as u32))
        .collect()
}

/// Rewrite triangle indices through a vertex map
pub fn remap_indices(indices: &[u32], vertex_map: &[u32]) -> Vec<u32> {
    indices.iter().map(|&i| vertex_map[i as usize]).collect()
}

/// Triangle indices with coincident vertices merged
pub fn welded_indices(positions: &[f32], indices: &[u32]) -> Vec<u32> {
    remap_indices(indices, &unique_vertex_map(positions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_vertex_map() {
        let positions = [
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            2.0, 0.0, 0.0,
        ];
        assert_eq!(unique_vertex_map(&positions), vec![0, 1, 0, 1, 4]);
    }

    #[test]
    fn test_negative_zero_welds() {
        let positions = [0.0, 1.0, 0.0, -0.0, 1.0, 0.0];
        assert_eq!(unique_vertex_map(&positions), vec![0, 0]);
    }

    #[test]
    fn test_welded_indices() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        assert_eq!(welded_indices(&positions, &[0, 2, 1]), vec![0, 1, 1]);
    }
}
