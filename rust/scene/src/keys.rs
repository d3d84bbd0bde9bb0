// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Drawing keys for arena-based storage.
//!
//! Keys are created by `slotmap::SlotMap` and remain valid even after other
//! drawings are removed (generational indices), so a stale key held by a cap
//! simply fails to resolve once its owner is gone.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a drawing in a [`Scene`](crate::Scene).
    pub struct DrawingKey;
}
