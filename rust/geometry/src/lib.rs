//! Clipcap Geometry
//!
//! Plane-mesh intersection for capping clipped surfaces, using earcutr
//! triangulation and nalgebra for transformations.

pub mod bounds;
pub mod cap;
pub mod error;
pub mod mesh;
pub mod plane;
pub mod transform;
pub mod triangulation;
pub mod weld;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use bounds::Bounds;
pub use cap::{boundary_loops, compute_cap, CapLoops};
pub use error::{Error, Result};
pub use mesh::Mesh;
pub use plane::Plane;
pub use transform::Place;
pub use triangulation::{triangulate_polygon, triangulate_polygon_with_holes};
pub use weld::{remap_indices, unique_vertex_map, welded_indices};
