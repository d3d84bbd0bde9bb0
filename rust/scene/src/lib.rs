// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Clipcap Scene
//!
//! Drawing tree, clip planes and per-frame clip cap maintenance.
//!
//! A [`View`] holds a [`Scene`] of drawings, the active [`ClipPlanes`] and a
//! [`Camera`]. Drawings opt in to capping through [`ClipCapMode`]; once per
//! frame the host calls [`View::update_clip_caps`], which seals every cut
//! surface with a cap drawing lying on the clip plane, and [`View::end_frame`]
//! after drawing.
//!
//! ```
//! use clipcap_geometry::{Mesh, Point3, Vector3};
//! use clipcap_scene::{ClipCapMode, ClipPlane, Drawing, View};
//!
//! let mut view = View::default();
//! let root = view.scene.root();
//! let tet = Mesh::from_arrays(
//!     vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
//!     vec![0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3],
//! );
//! let key = view
//!     .scene
//!     .add_drawing(root, Drawing::new("tet").with_mesh(tet).with_clip_cap(ClipCapMode::On))
//!     .unwrap();
//! view.clip_planes
//!     .add_plane(ClipPlane::new("front", Vector3::z(), Point3::new(0.0, 0.0, 0.25)));
//!
//! view.update_clip_caps();
//! assert!(view.scene.get(key).unwrap().cap_drawing("front").is_some());
//! ```

pub mod adjust;
pub mod camera;
pub mod cap;
pub mod clip_plane;
pub mod drawing;
pub mod error;
pub mod keys;
pub mod scene;
pub mod settings;
pub mod view;

pub use adjust::PlaneOffset;
pub use camera::Camera;
pub use cap::update_clip_caps;
pub use clip_plane::{ClipPlane, ClipPlanes};
pub use drawing::{CapMarker, ClipCapMode, Drawing, Rgba};
pub use error::{Error, Result};
pub use keys::DrawingKey;
pub use scene::Scene;
pub use settings::CapSettings;
pub use view::View;
