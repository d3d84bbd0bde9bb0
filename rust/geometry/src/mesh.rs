// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use crate::bounds::Bounds;
use crate::error::{Error, Result};
use nalgebra::{Point3, Vector3};

/// Triangle mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Build a mesh from packed arrays without normals
    pub fn from_arrays(positions: Vec<f32>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            normals: Vec::new(),
            indices,
        }
    }

    /// Add a vertex with normal
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>, normal: Vector3<f64>) {
        self.positions.push(position.x as f32);
        self.positions.push(position.y as f32);
        self.positions.push(position.z as f32);

        self.normals.push(normal.x as f32);
        self.normals.push(normal.y as f32);
        self.normals.push(normal.z as f32);
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Vertex position in f64
    #[inline]
    pub fn vertex(&self, index: usize) -> Point3<f64> {
        let i = index * 3;
        Point3::new(
            self.positions[i] as f64,
            self.positions[i + 1] as f64,
            self.positions[i + 2] as f64,
        )
    }

    /// Iterate triangles as index triples
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Merge another mesh into this one
    #[inline]
    pub fn merge(&mut self, other: &Mesh) {
        if other.is_empty() {
            return;
        }

        let vertex_offset = (self.positions.len() / 3) as u32;

        self.positions.reserve(other.positions.len());
        self.normals.reserve(other.normals.len());
        self.indices.reserve(other.indices.len());

        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);

        self.indices
            .extend(other.indices.iter().map(|&i| i + vertex_offset));
    }

    /// Replace all normals with a single direction
    pub fn fill_normals(&mut self, normal: &Vector3<f64>) {
        let n = [normal.x as f32, normal.y as f32, normal.z as f32];
        self.normals.clear();
        self.normals.reserve(self.positions.len());
        for _ in 0..self.vertex_count() {
            self.normals.extend_from_slice(&n);
        }
    }

    /// Check array lengths and index range
    pub fn validate(&self) -> Result<()> {
        if !self.normals.is_empty() && self.normals.len() != self.positions.len() {
            return Err(Error::malformed(format!(
                "{} normal components for {} position components",
                self.normals.len(),
                self.positions.len()
            )));
        }
        validate_arrays(&self.positions, &self.indices)
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Calculate bounds, `None` for an empty mesh
    #[inline]
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_positions(&self.positions)
    }

    /// Total triangle area
    pub fn area(&self) -> f64 {
        self.triangles()
            .map(|[a, b, c]| {
                let (p0, p1, p2) = (
                    self.vertex(a as usize),
                    self.vertex(b as usize),
                    self.vertex(c as usize),
                );
                (p1 - p0).cross(&(p2 - p0)).norm() * 0.5
            })
            .sum()
    }

    /// Clear the mesh
    #[inline]
    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.indices.clear();
    }
}

/// Check packed position and index arrays for ragged lengths and bad indices
pub fn validate_arrays(positions: &[f32], indices: &[u32]) -> Result<()> {
    if positions.len() % 3 != 0 {
        return Err(Error::malformed(format!(
            "position array length {} is not a multiple of 3",
            positions.len()
        )));
    }
    if indices.len() % 3 != 0 {
        return Err(Error::malformed(format!(
            "index array length {} is not a multiple of 3",
            indices.len()
        )));
    }
    let vertex_count = positions.len() / 3;
    if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(Error::IndexOutOfRange {
            index,
            vertex_count,
        });
    }
    Ok(())
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}
