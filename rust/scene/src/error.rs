// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for scene and clip cap operations.

use crate::keys::DrawingKey;

/// Result type alias for scene operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while editing the scene or computing caps.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced drawing was not found in the scene.
    #[error("drawing not found: {0:?}")]
    DrawingNotFound(DrawingKey),

    /// The root drawing owns the whole tree and cannot be removed.
    #[error("the root drawing cannot be removed")]
    RootRemoval,

    /// A drawing is always rendered at one or more positions.
    #[error("drawing must have at least one position")]
    EmptyPositions,

    /// A per-triangle or per-instance mask does not match what it masks.
    #[error("{what} has {got} entries, expected {expected}")]
    MaskLength {
        what: &'static str,
        got: usize,
        expected: usize,
    },

    /// Caps of a drawing shown at several placements are held by an ancestor
    /// shown only once.
    #[error("drawing {0:?} is shown at several placements with no single-placement ancestor to hold its caps")]
    NoCapParent(DrawingKey),

    /// Clip planes are positioned relative to displayed geometry.
    #[error("can't position clip planes relative to displayed models since nothing is displayed")]
    NothingDisplayed,

    /// Geometry failure (malformed mesh, singular transform, triangulation).
    #[error("geometry error: {0}")]
    Geometry(#[from] clipcap_geometry::Error),
}
