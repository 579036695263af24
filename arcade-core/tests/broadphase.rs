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
//! Broad-phase completeness tests: the quadtree's candidate pairs must equal
//! the brute-force pairwise AABB intersection set for arbitrary layouts.

use arcade_core::{Aabb, Quadtree, QuadtreeItem};
use std::collections::BTreeSet;

fn circle_box(x: f64, y: f64, radius: f64, payload: u32) -> QuadtreeItem<u32> {
    QuadtreeItem {
        aabb: Aabb::new(x - radius, x + radius, y - radius, y + radius),
        payload,
    }
}

fn brute_force(items: &[QuadtreeItem<u32>]) -> Vec<(u32, u32)> {
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

fn assert_matches_brute_force(items: Vec<QuadtreeItem<u32>>) {
    let expected = brute_force(&items);
    let tree = Quadtree::build(items);
    assert_eq!(tree.nearby_pairs(), expected);
}

/// Deterministic xorshift-style generator, good enough for scatter layouts.
struct Rng(u64);

impl Rng {
    fn next_f64(&mut self, range: f64) -> f64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        ((self.0 >> 11) % 1_000_000) as f64 / 1_000_000.0 * range
    }
}

#[test]
fn test_sparse_scatter_matches_brute_force() {
    let mut rng = Rng(0x9E37_79B9_7F4A_7C15);
    let items: Vec<_> = (0..200)
        .map(|i| {
            circle_box(
                rng.next_f64(2000.0),
                rng.next_f64(2000.0),
                1.0 + rng.next_f64(10.0),
                i,
            )
        })
        .collect();
    assert_matches_brute_force(items);
}

#[test]
fn test_dense_cluster_matches_brute_force() {
    // Packed tighter than the sparse case, with plenty of mutual overlap.
    let mut rng = Rng(0xDEAD_BEEF_CAFE_F00D);
    let items: Vec<_> = (0..50)
        .map(|i| {
            circle_box(
                rng.next_f64(300.0),
                rng.next_f64(300.0),
                2.0 + rng.next_f64(6.0),
                i,
            )
        })
        .collect();
    assert_matches_brute_force(items);
}

#[test]
fn test_collinear_row_matches_brute_force() {
    // A single row degenerates the y-axis split; neighbors overlap in chains.
    let items: Vec<_> = (0..40)
        .map(|i| circle_box(i as f64 * 8.0, 0.0, 6.0, i))
        .collect();
    assert_matches_brute_force(items);
}

#[test]
fn test_quadrant_boundary_straddlers_match_brute_force() {
    // A cluster big enough to force subdivision, then items sitting exactly
    // on the resulting quadrant boundaries.
    let mut items: Vec<_> = (0..6)
        .map(|i| circle_box(10.0 + i as f64 * 3.0, 10.0, 2.0, i))
        .collect();
    let mid_x = (items[0].aabb.x_min() + items[5].aabb.x_max()) / 2.0;
    items.push(circle_box(mid_x, 10.0, 3.0, 100));
    items.push(circle_box(mid_x, 12.0, 3.0, 101));
    assert_matches_brute_force(items);
}

#[test]
fn test_overlapping_diagonal_chain_matches_brute_force() {
    // Each box overlaps several predecessors along the diagonal.
    let items: Vec<_> = (0..30)
        .map(|i| circle_box(i as f64 * 5.0, i as f64 * 5.0, 10.0, i))
        .collect();
    let expected = brute_force(&items);
    let tree = Quadtree::build(items);
    let pairs = tree.nearby_pairs();
    assert!(!pairs.is_empty());
    assert_eq!(pairs, expected);
}
