//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Binary tree over shared primitives. Construction splits each subtree at
//! the median centroid along one axis using selection rather than a full
//! sort, giving a count-balanced tree in O(N log N). Traversal prunes any
//! subtree whose box the ray misses and narrows the search range to the
//! closest hit found so far.

use crate::error::{Error, Result};
use crate::hittable::{HitRecord, Hittable};
use crate::Primitive;
use halo_math::{Aabb, Axis, Interval, Ray, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// How the split axis is chosen at each level of the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitPolicy {
    /// X, Y, Z, X, ... by tree depth.
    #[default]
    RoundRobin,
    /// Uniformly random axis per node, reproducible from `seed`.
    Random { seed: u64 },
    /// Axis of greatest centroid spread.
    Longest,
}

/// Options for [`BvhNode::with_options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BvhBuildOptions {
    pub split: SplitPolicy,
}

/// Shape statistics of a built tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BvhStats {
    pub branches: usize,
    pub leaves: usize,
    pub max_depth: usize,
}

/// BVH node - either a branch with two children or a leaf with one primitive.
///
/// A subtree of two primitives is a branch over two leaves, so every leaf
/// sits below a node covering at most two primitives.
pub enum BvhNode {
    /// Internal node; `bbox` is the union of both children's boxes.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// A single primitive.
    Leaf { primitive: Arc<Primitive>, bbox: Aabb },
}

/// Primitive plus its cached box and centroid during construction.
struct BuildItem {
    primitive: Arc<Primitive>,
    bbox: Aabb,
    centroid: Vec3,
}

impl BvhNode {
    /// Build a BVH with the default (round-robin) split policy.
    pub fn new(objects: Vec<Arc<Primitive>>) -> Result<Self> {
        Self::with_options(objects, &BvhBuildOptions::default())
    }

    /// Build a BVH from a list of primitives.
    ///
    /// A single primitive becomes a lone [`BvhNode::Leaf`] rather than a
    /// branch whose two children share it.
    ///
    /// Fails with [`Error::InvalidInput`] if the list is empty or any
    /// primitive has no bounding box (an empty group).
    pub fn with_options(objects: Vec<Arc<Primitive>>, options: &BvhBuildOptions) -> Result<Self> {
        if objects.is_empty() {
            return Err(Error::InvalidInput(
                "cannot build a BVH over an empty primitive list".into(),
            ));
        }

        let start = Instant::now();
        let count = objects.len();
        let mut items = objects
            .into_iter()
            .map(|primitive| {
                let bbox = primitive.bounding_box().ok_or_else(|| {
                    Error::InvalidInput(format!("{} has no bounding box", primitive.kind()))
                })?;
                Ok(BuildItem {
                    centroid: bbox.centroid(),
                    bbox,
                    primitive,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut rng = match options.split {
            SplitPolicy::Random { seed } => Some(StdRng::seed_from_u64(seed)),
            _ => None,
        };
        let root = Self::build(&mut items, 0, options.split, &mut rng);

        let stats = root.stats();
        log::debug!(
            "Built BVH over {} primitives in {:?}: {} branches, {} leaves, depth {}",
            count,
            start.elapsed(),
            stats.branches,
            stats.leaves,
            stats.max_depth
        );
        Ok(root)
    }

    /// Recursive BVH construction over a non-empty slice.
    fn build(items: &mut [BuildItem], depth: usize, split: SplitPolicy, rng: &mut Option<StdRng>) -> Self {
        if let [item] = items {
            return BvhNode::Leaf {
                primitive: Arc::clone(&item.primitive),
                bbox: item.bbox,
            };
        }

        let axis = Self::split_axis(items, depth, split, rng).index();
        let mid = items.len() / 2;
        // Only the median boundary matters, not the order within each half
        items.select_nth_unstable_by(mid, |a, b| a.centroid[axis].total_cmp(&b.centroid[axis]));

        let (left_items, right_items) = items.split_at_mut(mid);
        let left = Self::build(left_items, depth + 1, split, rng);
        let right = Self::build(right_items, depth + 1, split, rng);
        let bbox = left.bbox().union(&right.bbox());

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox,
        }
    }

    fn split_axis(items: &[BuildItem], depth: usize, split: SplitPolicy, rng: &mut Option<StdRng>) -> Axis {
        match (split, rng) {
            (SplitPolicy::Random { .. }, Some(rng)) => Axis::from_index(rng.gen_range(0..3)),
            (SplitPolicy::Longest, _) => items
                .iter()
                .fold(Aabb::EMPTY, |acc, item| {
                    acc.union(&Aabb::from_points(item.centroid, item.centroid))
                })
                .longest_axis(),
            _ => Axis::from_index(depth),
        }
    }

    /// Bounding box of this node.
    pub fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => *bbox,
        }
    }

    /// Count branches and leaves and measure depth.
    pub fn stats(&self) -> BvhStats {
        match self {
            BvhNode::Leaf { .. } => BvhStats {
                branches: 0,
                leaves: 1,
                max_depth: 0,
            },
            BvhNode::Branch { left, right, .. } => {
                let l = left.stats();
                let r = right.stats();
                BvhStats {
                    branches: 1 + l.branches + r.branches,
                    leaves: l.leaves + r.leaves,
                    max_depth: 1 + l.max_depth.max(r.max_depth),
                }
            }
        }
    }
}

impl Hittable for BvhNode {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        match self {
            BvhNode::Leaf { primitive, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }
                primitive.hit(ray, ray_t)
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let hit_left = left.hit(ray, ray_t);

                // Only look for something closer than the left hit
                let right_max = hit_left.map_or(ray_t.max, |rec| rec.t);
                let hit_right = right.hit(ray, ray_t.with_max(right_max));

                hit_right.or(hit_left)
            }
        }
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox())
    }
}
