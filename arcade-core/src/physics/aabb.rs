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
//! Axis-aligned bounding boxes

use std::fmt;

/// An immutable axis-aligned bounding box.
///
/// Intersection is inclusive on both axes: boxes that merely touch count as
/// intersecting. This matters for the quadtree, where quadrant boundaries
/// are shared between neighboring quadrants.
///
/// # Examples
///
/// ```
/// use arcade_core::Aabb;
///
/// let a = Aabb::new(0.0, 10.0, 0.0, 10.0);
/// let b = Aabb::new(10.0, 20.0, 5.0, 15.0);
/// assert!(a.intersects(&b)); // touching along x = 10
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Aabb {
    /// Create a bounding box from its axis extents
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        debug_assert!(x_min <= x_max && y_min <= y_max, "inverted extents");
        Aabb {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Get the minimum x extent
    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    /// Get the maximum x extent
    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    /// Get the minimum y extent
    pub fn y_min(&self) -> f64 {
        self.y_min
    }

    /// Get the maximum y extent
    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    /// Get the box width
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Get the box height
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Check whether the boxes overlap, inclusively on both axes
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.x_max >= other.x_min
            && self.x_min <= other.x_max
            && self.y_max >= other.y_min
            && self.y_min <= other.y_max
    }

    /// The smallest box covering both boxes
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            x_min: self.x_min.min(other.x_min),
            x_max: self.x_max.max(other.x_max),
            y_min: self.y_min.min(other.y_min),
            y_max: self.y_max.max(other.y_max),
        }
    }
}

impl fmt::Display for Aabb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Aabb(({}, {}) to ({}, {}))",
            self.x_min, self.y_min, self.x_max, self.y_max
        )
    }
}
