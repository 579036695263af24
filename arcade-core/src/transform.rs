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
//! Hierarchical 2D transforms
//!
//! A [`Transform`] stores a local translation and rotation, optionally
//! relative to a parent transform. Global values are recomputed on every read
//! by composing through the parent chain; nothing is cached. Coordinates are
//! screen-style (y grows downward) and angles are counterclockwise radians.

use glam::DVec2;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

struct TransformInner {
    x: Cell<f64>,
    y: Cell<f64>,
    angle: Cell<f64>,
    parent: RefCell<Option<Weak<TransformInner>>>,
}

impl TransformInner {
    fn parent(&self) -> Option<Rc<TransformInner>> {
        self.parent.borrow().as_ref().and_then(Weak::upgrade)
    }

    /// Global (x, y, angle) composed through the parent chain.
    ///
    /// The local offset is rotated by the parent's global angle before being
    /// added to the parent's global position.
    fn global(&self) -> (f64, f64, f64) {
        match self.parent() {
            Some(parent) => {
                let (px, py, pa) = parent.global();
                let (sin, cos) = pa.sin_cos();
                let x = self.x.get();
                let y = self.y.get();
                (
                    px + x * cos + y * sin,
                    py - x * sin + y * cos,
                    pa + self.angle.get(),
                )
            }
            None => (self.x.get(), self.y.get(), self.angle.get()),
        }
    }
}

/// A mutable 2D translation and rotation, optionally parented to another
/// transform.
///
/// `Transform` is a cheap clonable handle; clones refer to the same
/// underlying transform. The parent link is weak: a transform does not keep
/// its parent alive, and a transform whose parent has been dropped behaves as
/// if it had no parent.
///
/// Parent chains must not contain cycles; this is the caller's
/// responsibility and is not checked.
///
/// # Examples
///
/// ```
/// use arcade_core::Transform;
///
/// let ship = Transform::new();
/// ship.set_local_x(100.0);
///
/// let turret = Transform::with_parent(&ship);
/// turret.set_local_x(10.0);
///
/// assert_eq!(turret.x(), 110.0);
/// ```
#[derive(Clone)]
pub struct Transform {
    inner: Rc<TransformInner>,
}

impl Transform {
    /// Create a transform at the origin with no parent
    pub fn new() -> Self {
        Transform {
            inner: Rc::new(TransformInner {
                x: Cell::new(0.0),
                y: Cell::new(0.0),
                angle: Cell::new(0.0),
                parent: RefCell::new(None),
            }),
        }
    }

    /// Create a transform at the parent's origin, parented to `parent`
    pub fn with_parent(parent: &Transform) -> Self {
        let transform = Transform::new();
        transform.set_parent(Some(parent));
        transform
    }

    /// Set or clear this transform's parent
    pub fn set_parent(&self, parent: Option<&Transform>) {
        *self.inner.parent.borrow_mut() = parent.map(|p| Rc::downgrade(&p.inner));
    }

    /// This transform's global X translation
    pub fn x(&self) -> f64 {
        self.inner.global().0
    }

    /// This transform's global Y translation
    pub fn y(&self) -> f64 {
        self.inner.global().1
    }

    /// This transform's global counterclockwise rotation in radians
    pub fn angle(&self) -> f64 {
        self.inner.global().2
    }

    /// This transform's global position as a vector
    pub fn position(&self) -> DVec2 {
        let (x, y, _) = self.inner.global();
        DVec2::new(x, y)
    }

    /// This transform's X translation relative to its parent
    pub fn local_x(&self) -> f64 {
        self.inner.x.get()
    }

    /// This transform's Y translation relative to its parent
    pub fn local_y(&self) -> f64 {
        self.inner.y.get()
    }

    /// This transform's rotation relative to its parent
    pub fn local_angle(&self) -> f64 {
        self.inner.angle.get()
    }

    /// Add to this transform's X translation
    pub fn add_x(&self, dx: f64) {
        self.inner.x.set(self.inner.x.get() + dx);
    }

    /// Add to this transform's Y translation
    pub fn add_y(&self, dy: f64) {
        self.inner.y.set(self.inner.y.get() + dy);
    }

    /// Add to this transform's local translation
    pub fn translate(&self, delta: DVec2) {
        self.add_x(delta.x);
        self.add_y(delta.y);
    }

    /// Rotate this transform counterclockwise
    pub fn rotate(&self, radians: f64) {
        self.inner.angle.set(self.inner.angle.get() + radians);
    }

    /// Set this transform's X translation relative to its parent
    pub fn set_local_x(&self, x: f64) {
        self.inner.x.set(x);
    }

    /// Set this transform's Y translation relative to its parent
    pub fn set_local_y(&self, y: f64) {
        self.inner.y.set(y);
    }

    /// Set this transform's rotation relative to its parent
    pub fn set_local_angle(&self, radians: f64) {
        self.inner.angle.set(radians);
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
