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
//! Quadtree broad phase
//!
//! The quadtree is ephemeral: the physics system rebuilds it from scratch
//! every step from the live set of circle colliders and asks it for the
//! candidate collision pairs. It is a broad-phase filter only — pairs are
//! re-checked with the exact circle-circle test before any collision is
//! resolved.

use std::collections::BTreeSet;

use super::aabb::Aabb;

/// One entry in a [`Quadtree`]: a bounding box and a caller-chosen payload.
///
/// The payload identifies the collider the box came from; it must order
/// consistently (`Ord`) so duplicate pairs from boundary-straddling items
/// can be deduplicated with an order-independent key.
#[derive(Debug, Clone, Copy)]
pub struct QuadtreeItem<T> {
    /// The item's bounding box
    pub aabb: Aabb,
    /// The caller's identifier for the item
    pub payload: T,
}

enum NodeKind<T> {
    Leaf(Vec<QuadtreeItem<T>>),
    Branch(Box<[Node<T>; 4]>),
}

struct Node<T> {
    bounds: Aabb,
    depth: usize,
    kind: NodeKind<T>,
}

impl<T: Copy + Ord> Node<T> {
    fn leaf(bounds: Aabb, depth: usize) -> Self {
        Node {
            bounds,
            depth,
            kind: NodeKind::Leaf(Vec::new()),
        }
    }

    fn insert(&mut self, item: QuadtreeItem<T>) {
        match &mut self.kind {
            NodeKind::Branch(children) => {
                // Quadrant boundaries are inclusive: an item whose box
                // straddles the split line lands in every overlapping child.
                for child in children.iter_mut() {
                    if child.bounds.intersects(&item.aabb) {
                        child.insert(item);
                    }
                }
            }
            NodeKind::Leaf(items) => {
                if items.len() < Quadtree::<T>::MAX_LEAF_ITEMS
                    || self.depth >= Quadtree::<T>::MAX_DEPTH
                {
                    items.push(item);
                } else {
                    self.subdivide();
                    self.insert(item);
                }
            }
        }
    }

    fn subdivide(&mut self) {
        let mid_x = (self.bounds.x_min() + self.bounds.x_max()) / 2.0;
        let mid_y = (self.bounds.y_min() + self.bounds.y_max()) / 2.0;
        let depth = self.depth + 1;

        let children = Box::new([
            Node::leaf(
                Aabb::new(self.bounds.x_min(), mid_x, self.bounds.y_min(), mid_y),
                depth,
            ),
            Node::leaf(
                Aabb::new(mid_x, self.bounds.x_max(), self.bounds.y_min(), mid_y),
                depth,
            ),
            Node::leaf(
                Aabb::new(self.bounds.x_min(), mid_x, mid_y, self.bounds.y_max()),
                depth,
            ),
            Node::leaf(
                Aabb::new(mid_x, self.bounds.x_max(), mid_y, self.bounds.y_max()),
                depth,
            ),
        ]);

        let items = match std::mem::replace(&mut self.kind, NodeKind::Branch(children)) {
            NodeKind::Leaf(items) => items,
            NodeKind::Branch(_) => unreachable!("subdivide called on a branch node"),
        };

        for item in items {
            self.insert(item);
        }
    }

    fn collect_pairs(&self, pairs: &mut BTreeSet<(T, T)>) {
        match &self.kind {
            NodeKind::Branch(children) => {
                for child in children.iter() {
                    child.collect_pairs(pairs);
                }
            }
            NodeKind::Leaf(items) => {
                for (i, a) in items.iter().enumerate() {
                    for b in &items[i + 1..] {
                        if a.aabb.intersects(&b.aabb) {
                            let key = if a.payload <= b.payload {
                                (a.payload, b.payload)
                            } else {
                                (b.payload, a.payload)
                            };
                            pairs.insert(key);
                        }
                    }
                }
            }
        }
    }

    fn collect_bounds(&self, out: &mut Vec<Aabb>) {
        out.push(self.bounds);
        if let NodeKind::Branch(children) = &self.kind {
            for child in children.iter() {
                child.collect_bounds(out);
            }
        }
    }
}

/// An adaptive quadtree over bounding boxes, producing candidate collision
/// pairs in better than quadratic time for spread-out scenes.
///
/// A leaf holds up to [`Quadtree::MAX_LEAF_ITEMS`] items; inserting beyond
/// that splits the leaf at its midpoint into four quadrants (until
/// [`Quadtree::MAX_DEPTH`]) and redistributes. The root covers the union of
/// all input boxes.
///
/// # Examples
///
/// ```
/// use arcade_core::{Aabb, Quadtree, QuadtreeItem};
///
/// let tree = Quadtree::build(vec![
///     QuadtreeItem { aabb: Aabb::new(0.0, 2.0, 0.0, 2.0), payload: 0u32 },
///     QuadtreeItem { aabb: Aabb::new(1.0, 3.0, 1.0, 3.0), payload: 1 },
///     QuadtreeItem { aabb: Aabb::new(50.0, 52.0, 50.0, 52.0), payload: 2 },
/// ]);
///
/// assert_eq!(tree.nearby_pairs(), vec![(0, 1)]);
/// ```
pub struct Quadtree<T> {
    root: Option<Node<T>>,
    item_count: usize,
}

impl<T: Copy + Ord> Quadtree<T> {
    /// Maximum number of items in a leaf before it subdivides
    pub const MAX_LEAF_ITEMS: usize = 5;

    /// Maximum subdivision depth; leaves at this depth grow without splitting
    pub const MAX_DEPTH: usize = 10;

    /// Build a quadtree over the given items
    ///
    /// The root bounding box is the union of all item boxes.
    pub fn build(items: Vec<QuadtreeItem<T>>) -> Self {
        let item_count = items.len();

        let mut bounds: Option<Aabb> = None;
        for item in &items {
            bounds = Some(match bounds {
                Some(acc) => acc.union(&item.aabb),
                None => item.aabb,
            });
        }

        let root = bounds.map(|bounds| {
            let mut root = Node::leaf(bounds, 0);
            for item in items {
                root.insert(item);
            }
            root
        });

        Quadtree { root, item_count }
    }

    /// Get the candidate pairs: all same-leaf combinations whose boxes
    /// intersect
    ///
    /// Pairs are deduplicated (an item stored in several leaves because it
    /// straddles quadrant boundaries contributes each partner once) and
    /// returned with the lower payload first, in sorted order.
    pub fn nearby_pairs(&self) -> Vec<(T, T)> {
        let mut pairs = BTreeSet::new();
        if let Some(root) = &self.root {
            root.collect_pairs(&mut pairs);
        }
        pairs.into_iter().collect()
    }

    /// Get the number of items the tree was built from
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Get the bounding boxes of every node, root first
    ///
    /// Debug introspection for visualizing the broad phase.
    pub fn node_bounds(&self) -> Vec<Aabb> {
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            root.collect_bounds(&mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, half: f64, payload: u32) -> QuadtreeItem<u32> {
        QuadtreeItem {
            aabb: Aabb::new(x - half, x + half, y - half, y + half),
            payload,
        }
    }

    fn brute_force_pairs(items: &[QuadtreeItem<u32>]) -> Vec<(u32, u32)> {
        let mut pairs = BTreeSet::new();
        for (i, a) in items.iter().enumerate() {
            for b in &items[i + 1..] {
                if a.aabb.intersects(&b.aabb) {
                    let key = if a.payload <= b.payload {
                        (a.payload, b.payload)
                    } else {
                        (b.payload, a.payload)
                    };
                    pairs.insert(key);
                }
            }
        }
        pairs.into_iter().collect()
    }

    #[test]
    fn test_empty_tree_has_no_pairs() {
        let tree: Quadtree<u32> = Quadtree::build(Vec::new());
        assert!(tree.nearby_pairs().is_empty());
        assert_eq!(tree.item_count(), 0);
        assert!(tree.node_bounds().is_empty());
    }

    #[test]
    fn test_single_item_has_no_pairs() {
        let tree = Quadtree::build(vec![square(0.0, 0.0, 1.0, 0)]);
        assert!(tree.nearby_pairs().is_empty());
    }

    #[test]
    fn test_two_overlapping_items_pair_once() {
        let tree = Quadtree::build(vec![square(0.0, 0.0, 1.0, 0), square(0.5, 0.5, 1.0, 1)]);
        assert_eq!(tree.nearby_pairs(), vec![(0, 1)]);
    }

    #[test]
    fn test_pair_key_is_order_independent() {
        let tree = Quadtree::build(vec![square(0.5, 0.5, 1.0, 7), square(0.0, 0.0, 1.0, 3)]);
        assert_eq!(tree.nearby_pairs(), vec![(3, 7)]);
    }

    #[test]
    fn test_distant_items_do_not_pair() {
        let tree = Quadtree::build(vec![square(0.0, 0.0, 1.0, 0), square(100.0, 100.0, 1.0, 1)]);
        assert!(tree.nearby_pairs().is_empty());
    }

    #[test]
    fn test_subdivision_keeps_all_intersecting_pairs() {
        // More items than a leaf holds, overlapping neighbor-to-neighbor:
        // the tree must subdivide yet still report every intersecting pair.
        let items: Vec<_> = (0..8)
            .map(|i| square(i as f64 * 3.0, 0.0, 2.0, i))
            .collect();
        let tree = Quadtree::build(items.clone());
        assert_eq!(tree.nearby_pairs(), brute_force_pairs(&items));
    }

    #[test]
    fn test_straddling_items_are_deduplicated() {
        // A big box across the middle overlaps every quadrant; the cluster
        // around it forces subdivision. Each pair must appear exactly once.
        let mut items = vec![square(0.0, 0.0, 50.0, 99)];
        for i in 0..6 {
            items.push(square(-30.0 + i as f64 * 12.0, -20.0, 3.0, i));
        }
        let tree = Quadtree::build(items.clone());

        let pairs = tree.nearby_pairs();
        let expected = brute_force_pairs(&items);
        assert_eq!(pairs, expected);

        // Pairwise dedup sanity: no pair occurs twice.
        let unique: BTreeSet<_> = pairs.iter().copied().collect();
        assert_eq!(unique.len(), pairs.len());
    }

    #[test]
    fn test_matches_brute_force_on_grid_with_straddlers() {
        // A 6x6 grid sized so neighbors touch exactly, plus boxes centered
        // on grid lines.
        let mut items = Vec::new();
        let mut payload = 0;
        for gx in 0..6 {
            for gy in 0..6 {
                items.push(square(gx as f64 * 10.0, gy as f64 * 10.0, 5.0, payload));
                payload += 1;
            }
        }
        items.push(square(15.0, 15.0, 4.0, payload));
        items.push(square(25.0, 5.0, 4.0, payload + 1));

        let tree = Quadtree::build(items.clone());
        assert_eq!(tree.nearby_pairs(), brute_force_pairs(&items));
    }

    #[test]
    fn test_matches_brute_force_on_pseudorandom_layout() {
        // Deterministic LCG scatter; no external RNG needed.
        let mut state: u64 = 0x2545_F491_4F6C_DD1D;
        let mut next = move || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) % 1000) as f64
        };

        let items: Vec<_> = (0..120)
            .map(|i| square(next(), next(), 1.0 + (i % 7) as f64 * 3.0, i))
            .collect();

        let tree = Quadtree::build(items.clone());
        assert_eq!(tree.nearby_pairs(), brute_force_pairs(&items));
    }

    #[test]
    fn test_node_bounds_starts_with_union_root() {
        let tree = Quadtree::build(vec![square(0.0, 0.0, 1.0, 0), square(10.0, 4.0, 1.0, 1)]);
        let bounds = tree.node_bounds();
        assert_eq!(bounds[0], Aabb::new(-1.0, 11.0, -1.0, 5.0));
    }
}
