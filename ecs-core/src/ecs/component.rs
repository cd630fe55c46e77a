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
//! Component trait and type tags
//!
//! Components are plain data records attached to entities through a
//! [`Pool`](crate::ecs::Pool). They have no identity of their own: changing a
//! component replaces its value.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Trait that all components must implement
///
/// Components should be plain data without behavior. Values are cloned out
/// of pools by the convenience accessors, so keep them small.
///
/// ```
/// use ecs_core::ecs::Component;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// struct Health(u32);
///
/// impl Component for Health {}
/// ```
pub trait Component: Clone + 'static {}

/// Runtime tag identifying a component type
///
/// Equality and hashing use the [`TypeId`] only; the name is carried for
/// diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct ComponentTag {
    type_id: TypeId,
    name: &'static str,
}

impl ComponentTag {
    /// Tag for the component type `T`
    pub fn of<T: Component>() -> Self {
        ComponentTag {
            type_id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// The [`TypeId`] of the tagged type
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.name)
    }
}

impl PartialEq for ComponentTag {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ComponentTag {}

impl Hash for ComponentTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Display for ComponentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Strip the module path from a type name, keeping generic arguments intact
///
/// `app::systems::Move` becomes `Move`, `app::Wrapper<app::Inner>` becomes
/// `Wrapper<app::Inner>`.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let head = match full.find('<') {
        Some(generic_start) => &full[..generic_start],
        None => full,
    };
    match head.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}
