//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Nodes live in one flat arena and leaves reference a contiguous range of
//! an object index array, so the tree never owns the objects it indexes.
//! Construction is a median split on the longest centroid axis; traversal
//! is an explicit stack that visits the nearer child first and skips any
//! node entered beyond the closest hit found so far.

use crate::object::{HitRecord, Object};
use raylite_math::{Aabb, Interval, Ray, Vec3};
use std::ops::ControlFlow;

/// Maximum objects per leaf node before splitting.
pub const DEFAULT_MAX_LEAF_SIZE: usize = 4;

/// BVH node - either a branch with two children or a leaf with objects.
#[derive(Debug, Clone, Copy)]
pub enum BvhNode {
    /// Internal node; children are arena indices.
    Branch { bbox: Aabb, left: u32, right: u32 },
    /// Leaf covering `indices[start..start + count]`.
    Leaf { bbox: Aabb, start: u32, count: u32 },
}

impl BvhNode {
    pub fn bbox(&self) -> &Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => bbox,
        }
    }
}

/// Hierarchy over a slice of objects. Must be queried with the same slice
/// it was built from.
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    indices: Vec<u32>,
}

impl Bvh {
    /// Build over `objects`. Leaves hold at most `max_leaf_size` objects
    /// unless their centroids coincide and cannot be separated.
    pub fn build(objects: &[Object], max_leaf_size: usize) -> Self {
        let mut bvh = Bvh {
            nodes: Vec::with_capacity(objects.len().max(1) * 2 / max_leaf_size.max(1) + 1),
            indices: (0..objects.len() as u32).collect(),
        };
        if objects.is_empty() {
            return bvh;
        }

        let bounds: Vec<Aabb> = objects.iter().map(Object::bounding_box).collect();
        let centroids: Vec<Vec3> = bounds.iter().map(Aabb::centroid).collect();
        bvh.build_range(&bounds, &centroids, 0, objects.len(), max_leaf_size.max(1));

        log::debug!(
            "Built BVH: {} objects, {} nodes, depth {}",
            objects.len(),
            bvh.nodes.len(),
            bvh.depth()
        );
        bvh
    }

    /// Recursive construction over `indices[start..end]`. Returns the arena
    /// index of the subtree root; the root of the whole tree is node 0.
    fn build_range(
        &mut self,
        bounds: &[Aabb],
        centroids: &[Vec3],
        start: usize,
        end: usize,
        max_leaf_size: usize,
    ) -> u32 {
        let bbox = self.indices[start..end]
            .iter()
            .fold(Aabb::EMPTY, |acc, &i| Aabb::surrounding(&acc, &bounds[i as usize]));
        let count = end - start;
        let node_index = self.nodes.len() as u32;
        let leaf = BvhNode::Leaf {
            bbox,
            start: start as u32,
            count: count as u32,
        };

        // Create leaf for small sets
        if count <= max_leaf_size {
            self.nodes.push(leaf);
            return node_index;
        }

        // Choose split axis based on centroid spread
        let (cmin, cmax) = self.indices[start..end].iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(lo, hi), &i| {
                let c = centroids[i as usize];
                (lo.min(c), hi.max(c))
            },
        );
        let extent = cmax - cmin;
        let axis = Aabb::from_points(cmin, cmax).longest_axis();

        // Coincident centroids: no split can separate them
        if !(extent[axis] > 0.0) {
            self.nodes.push(leaf);
            return node_index;
        }

        self.indices[start..end].sort_unstable_by(|&a, &b| {
            centroids[a as usize][axis].total_cmp(&centroids[b as usize][axis])
        });

        // Reserve the slot so the parent precedes its children
        self.nodes.push(leaf);
        let mid = start + count / 2;
        let left = self.build_range(bounds, centroids, start, mid, max_leaf_size);
        let right = self.build_range(bounds, centroids, mid, end, max_leaf_size);
        self.nodes[node_index as usize] = BvhNode::Branch { bbox, left, right };
        node_index
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Bounds of everything in the tree.
    pub fn bounding_box(&self) -> Aabb {
        self.nodes.first().map_or(Aabb::EMPTY, |node| *node.bbox())
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, BvhNode::Leaf { .. }))
            .count()
    }

    /// Number of levels from the root to the deepest leaf.
    pub fn depth(&self) -> usize {
        fn depth_of(nodes: &[BvhNode], index: u32) -> usize {
            match nodes[index as usize] {
                BvhNode::Leaf { .. } => 1,
                BvhNode::Branch { left, right, .. } => {
                    1 + depth_of(nodes, left).max(depth_of(nodes, right))
                }
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            depth_of(&self.nodes, 0)
        }
    }

    /// Nearest-first walk. `visit_leaf` receives the leaf's object indices
    /// and the current search interval, and either continues with a
    /// (possibly shrunk) upper bound or stops the walk.
    fn walk<F>(&self, ray: &Ray, ray_t: Interval, mut visit_leaf: F)
    where
        F: FnMut(&[u32], Interval) -> ControlFlow<(), f32>,
    {
        if self.nodes.is_empty() {
            return;
        }

        let mut closest = ray_t.max;
        let mut stack: Vec<u32> = Vec::with_capacity(64);
        stack.push(0);

        while let Some(node_index) = stack.pop() {
            let node = &self.nodes[node_index as usize];
            let interval = ray_t.with_max(closest);
            if node.bbox().hit_distance(ray, interval).is_none() {
                continue;
            }

            match *node {
                BvhNode::Leaf { start, count, .. } => {
                    let range = start as usize..(start + count) as usize;
                    match visit_leaf(&self.indices[range], interval) {
                        ControlFlow::Continue(max) => closest = closest.min(max),
                        ControlFlow::Break(()) => return,
                    }
                }
                BvhNode::Branch { left, right, .. } => {
                    let near_l = self.nodes[left as usize].bbox().hit_distance(ray, interval);
                    let near_r = self.nodes[right as usize].bbox().hit_distance(ray, interval);
                    // Push the farther child first so the nearer pops next
                    match (near_l, near_r) {
                        (Some(l), Some(r)) => {
                            if l <= r {
                                stack.push(right);
                                stack.push(left);
                            } else {
                                stack.push(left);
                                stack.push(right);
                            }
                        }
                        (Some(_), None) => stack.push(left),
                        (None, Some(_)) => stack.push(right),
                        (None, None) => {}
                    }
                }
            }
        }
    }

    /// Closest hit inside `ray_t`.
    pub fn intersect<'a>(
        &self,
        objects: &'a [Object],
        ray: &Ray,
        ray_t: Interval,
    ) -> Option<HitRecord<'a>> {
        let mut best: Option<(usize, f32)> = None;
        self.walk(ray, ray_t, |leaf, interval| {
            let mut closest = interval.max;
            for &i in leaf {
                if let Some(t) = objects[i as usize].intersect_within(ray, ray_t.with_max(closest)) {
                    closest = t;
                    best = Some((i as usize, t));
                }
            }
            ControlFlow::Continue(closest)
        });

        best.map(|(i, t)| HitRecord::new(ray, t, &objects[i]))
    }

    /// True when anything blocks the ray inside `ray_t`. Stops at the first
    /// hit found, which need not be the nearest.
    pub fn occluded(&self, objects: &[Object], ray: &Ray, ray_t: Interval) -> bool {
        let mut blocked = false;
        self.walk(ray, ray_t, |leaf, interval| {
            if leaf
                .iter()
                .any(|&i| objects[i as usize].intersect_within(ray, interval).is_some())
            {
                blocked = true;
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(interval.max)
            }
        });
        blocked
    }
}
