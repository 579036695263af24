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
//! Entity lifecycle management
//!
//! This module provides the foundational entity model:
//! - [`Entity`] handles with update and destroy hook lists
//! - Parent links that cascade destruction
//! - [`EntitySystem`], the owner of the live set and the per-frame
//!   update broadcast

mod object;
mod system;

pub use object::{Entity, EntityId};
pub use system::EntitySystem;
