// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding Volume Hierarchy (BVH) over a triangle soup
//! Used to test two scans for contact under a relative transform

use super::{BoundingBox, TriangleSoup};
use crate::error::{ContourError, Result};
use nalgebra::{Matrix4, Point3};
use parry3d::math::{Isometry, Point as ParryPoint};
use parry3d::query;
use parry3d::shape::Triangle as ParryTriangle;

/// BVH node
#[derive(Debug, Clone)]
pub struct BvhNode {
    /// Bounding box of this node
    pub bbox: BoundingBox,
    /// Left child (None for leaf)
    pub left: Option<Box<BvhNode>>,
    /// Right child (None for leaf)
    pub right: Option<Box<BvhNode>>,
    /// Triangle indices (only for leaf nodes)
    pub triangle_indices: Vec<usize>,
}

impl BvhNode {
    /// Create a leaf node
    fn leaf(bbox: BoundingBox, triangle_indices: Vec<usize>) -> Self {
        Self {
            bbox,
            left: None,
            right: None,
            triangle_indices,
        }
    }

    /// Create an internal node
    fn internal(bbox: BoundingBox, left: Box<BvhNode>, right: Box<BvhNode>) -> Self {
        Self {
            bbox,
            left: Some(left),
            right: Some(right),
            triangle_indices: Vec::new(),
        }
    }

    /// Check if this is a leaf node
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Bounding Volume Hierarchy for one scan
#[derive(Debug, Clone)]
pub struct Bvh {
    root: BvhNode,
    triangles: Vec<[Point3<f32>; 3]>,
}

impl Bvh {
    const MAX_DEPTH: usize = 32;
    const MAX_LEAF_TRIANGLES: usize = 4;

    /// Build a BVH over every whole triangle of `soup`
    pub fn build(soup: &TriangleSoup) -> Self {
        let triangles: Vec<[Point3<f32>; 3]> = soup.triangles().collect();
        if triangles.is_empty() {
            return Self {
                root: BvhNode::leaf(BoundingBox::empty(), Vec::new()),
                triangles,
            };
        }

        let entries: Vec<(usize, BoundingBox)> = triangles
            .iter()
            .enumerate()
            .map(|(idx, tri)| (idx, BoundingBox::from_points(tri.iter())))
            .collect();

        let root = Self::build_recursive(entries, 0);
        tracing::debug!(triangles = triangles.len(), "built BVH");
        Self { root, triangles }
    }

    /// Recursively build BVH node
    fn build_recursive(mut entries: Vec<(usize, BoundingBox)>, depth: usize) -> BvhNode {
        let bbox = Self::compute_union_bbox(&entries);

        if entries.len() <= Self::MAX_LEAF_TRIANGLES || depth >= Self::MAX_DEPTH {
            let indices = entries.iter().map(|(idx, _)| *idx).collect();
            return BvhNode::leaf(bbox, indices);
        }

        // Split at the median along the longest axis
        let axis = Self::longest_axis(&bbox);
        entries.sort_by(|(_, a), (_, b)| a.center()[axis].total_cmp(&b.center()[axis]));

        let right_entries = entries.split_off(entries.len() / 2);
        let left = Box::new(Self::build_recursive(entries, depth + 1));
        let right = Box::new(Self::build_recursive(right_entries, depth + 1));

        BvhNode::internal(bbox, left, right)
    }

    fn longest_axis(bbox: &BoundingBox) -> usize {
        let size = bbox.size();
        if size.x >= size.y && size.x >= size.z {
            0
        } else if size.y >= size.z {
            1
        } else {
            2
        }
    }

    fn compute_union_bbox(entries: &[(usize, BoundingBox)]) -> BoundingBox {
        entries
            .iter()
            .fold(BoundingBox::empty(), |acc, (_, bbox)| acc.union(bbox))
    }

    pub fn root(&self) -> &BvhNode {
        &self.root
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Test whether this hierarchy touches `other` once `other` is moved into
    /// this hierarchy's frame by `relative`.
    pub fn intersects(&self, other: &Bvh, relative: &Matrix4<f32>) -> Result<bool> {
        if self.is_empty() || other.is_empty() {
            return Ok(false);
        }
        self.intersects_recursive(&self.root, other, &other.root, relative)
    }

    fn intersects_recursive(
        &self,
        node: &BvhNode,
        other: &Bvh,
        other_node: &BvhNode,
        relative: &Matrix4<f32>,
    ) -> Result<bool> {
        let other_bbox = other_node.bbox.transformed(relative);
        if !node.bbox.intersects(&other_bbox) {
            return Ok(false);
        }

        match (node.is_leaf(), other_node.is_leaf()) {
            (true, true) => self.leaves_intersect(node, other, other_node, relative),
            // Descend the larger side first so both trees shrink evenly
            (false, true) => self.descend_self(node, other, other_node, relative),
            (true, false) => self.descend_other(node, other, other_node, relative),
            (false, false) => {
                if node.bbox.radius() >= other_bbox.radius() {
                    self.descend_self(node, other, other_node, relative)
                } else {
                    self.descend_other(node, other, other_node, relative)
                }
            }
        }
    }

    fn descend_self(
        &self,
        node: &BvhNode,
        other: &Bvh,
        other_node: &BvhNode,
        relative: &Matrix4<f32>,
    ) -> Result<bool> {
        for child in [&node.left, &node.right].into_iter().flatten() {
            if self.intersects_recursive(child, other, other_node, relative)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn descend_other(
        &self,
        node: &BvhNode,
        other: &Bvh,
        other_node: &BvhNode,
        relative: &Matrix4<f32>,
    ) -> Result<bool> {
        for child in [&other_node.left, &other_node.right].into_iter().flatten() {
            if self.intersects_recursive(node, other, child, relative)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn leaves_intersect(
        &self,
        node: &BvhNode,
        other: &Bvh,
        other_node: &BvhNode,
        relative: &Matrix4<f32>,
    ) -> Result<bool> {
        for &j in &other_node.triangle_indices {
            let moved = other.triangles[j].map(|p| relative.transform_point(&p));
            let moved_bbox = BoundingBox::from_points(moved.iter());

            for &i in &node.triangle_indices {
                let tri = &self.triangles[i];
                if !BoundingBox::from_points(tri.iter()).intersects(&moved_bbox) {
                    continue;
                }
                if triangles_intersect(tri, &moved)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

fn to_parry_triangle(tri: &[Point3<f32>; 3]) -> ParryTriangle {
    let [a, b, c] = tri.map(|p| ParryPoint::new(p.x, p.y, p.z));
    ParryTriangle::new(a, b, c)
}

/// Exact triangle-triangle contact test, both triangles in the same frame
fn triangles_intersect(a: &[Point3<f32>; 3], b: &[Point3<f32>; 3]) -> Result<bool> {
    let identity = Isometry::identity();
    query::intersection_test(
        &identity,
        &to_parry_triangle(a),
        &identity,
        &to_parry_triangle(b),
    )
    .map_err(|err| ContourError::UnsupportedQuery(format!("{err:?}")))
}
