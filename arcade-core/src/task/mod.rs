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
//! Cooperative task scheduling
//!
//! This module lets entity behaviors span multiple frames without manual
//! callback chains:
//! - [`Coroutine`]: a resumable computation stepped once per frame
//! - [`Task`]: binds a coroutine to an entity's update hook
//! - [`GameClock`]: frame-driven time source with delayed callbacks
//! - [`resume_after`]: suspends a coroutine until a delay elapses

mod clock;
mod coroutine;

pub use clock::{resume_after, GameClock};
pub use coroutine::{Coroutine, FnCoroutine, ResumeHandle, Sequence, Step, Task, WaitInstruction};
