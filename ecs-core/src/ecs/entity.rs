// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Entity management
//!
//! Entities are opaque identity handles. They carry no data of their own;
//! every component lives in a pool keyed by the entity.

use std::fmt;
use std::num::NonZeroU32;

/// Lightweight entity handle
///
/// Wraps a non-zero 32-bit identifier. The value `0` is reserved as the
/// invalid sentinel and cannot be represented, so `Option<Entity>` is the
/// same size as `Entity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity(NonZeroU32);

impl Entity {
    /// Build a handle from a raw identifier, or `None` for the reserved id `0`
    pub fn from_raw(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(Entity)
    }

    pub(crate) fn from_non_zero(id: NonZeroU32) -> Self {
        Entity(id)
    }

    /// Get the raw identifier
    pub fn id(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}
