// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Non-indexed triangle buffers as handed over by mesh loaders

use super::BoundingBox;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Floats per vertex attribute (x, y, z)
pub const FLOATS_PER_VERTEX: usize = 3;
/// Floats per triangle in a position or normal buffer
pub const FLOATS_PER_TRIANGLE: usize = 3 * FLOATS_PER_VERTEX;

/// Vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// Flat position and normal arrays, three vertices per triangle.
///
/// This is the exact shape an STL loader produces: vertex `v` lives at floats
/// `3v..3v + 3` of both buffers, and triangle `t` owns vertices `3t..3t + 3`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleSoup {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
}

impl TriangleSoup {
    pub fn new(positions: Vec<f32>, normals: Vec<f32>) -> Self {
        Self { positions, normals }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_capacity(triangle_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(triangle_count * FLOATS_PER_TRIANGLE),
            normals: Vec::with_capacity(triangle_count * FLOATS_PER_TRIANGLE),
        }
    }

    /// Append one vertex
    pub fn push_vertex(&mut self, vertex: Vertex) {
        self.positions
            .extend_from_slice(&[vertex.position.x, vertex.position.y, vertex.position.z]);
        self.normals
            .extend_from_slice(&[vertex.normal.x, vertex.normal.y, vertex.normal.z]);
    }

    /// Append a flat-shaded triangle
    pub fn push_triangle(&mut self, corners: [Point3<f32>; 3], normal: Vector3<f32>) {
        for corner in corners {
            self.push_vertex(Vertex::new(corner, normal));
        }
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / FLOATS_PER_VERTEX
    }

    /// Get triangle count (partial trailing triangles are ignored)
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / FLOATS_PER_TRIANGLE
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// True when the buffers describe whole triangles with a normal per vertex
    pub fn is_well_formed(&self) -> bool {
        !self.positions.is_empty()
            && self.positions.len() % FLOATS_PER_TRIANGLE == 0
            && self.normals.len() == self.positions.len()
    }

    /// Position of vertex `index`
    pub fn position(&self, index: usize) -> Point3<f32> {
        let base = index * FLOATS_PER_VERTEX;
        Point3::new(
            self.positions[base],
            self.positions[base + 1],
            self.positions[base + 2],
        )
    }

    /// Normal of vertex `index`, zero when the normal buffer is short
    pub fn normal(&self, index: usize) -> Vector3<f32> {
        let base = index * FLOATS_PER_VERTEX;
        match self.normals.get(base..base + FLOATS_PER_VERTEX) {
            Some(n) => Vector3::new(n[0], n[1], n[2]),
            None => Vector3::zeros(),
        }
    }

    /// Corner positions of triangle `index`
    pub fn triangle(&self, index: usize) -> [Point3<f32>; 3] {
        let first = index * 3;
        [
            self.position(first),
            self.position(first + 1),
            self.position(first + 2),
        ]
    }

    /// Iterate over triangle corner positions
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f32>; 3]> + '_ {
        (0..self.triangle_count()).map(move |t| self.triangle(t))
    }

    /// Overwrite the normal buffer with per-face normals.
    ///
    /// Degenerate triangles get a zero normal.
    pub fn compute_flat_normals(&mut self) {
        let triangle_count = self.triangle_count();
        self.positions.truncate(triangle_count * FLOATS_PER_TRIANGLE);

        let mut normals = Vec::with_capacity(self.positions.len());
        for [a, b, c] in self.triangles() {
            let normal = (b - a)
                .cross(&(c - a))
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(Vector3::zeros);
            for _ in 0..3 {
                normals.extend_from_slice(&[normal.x, normal.y, normal.z]);
            }
        }
        self.normals = normals;
    }

    /// Compute bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::empty();
        for index in 0..self.vertex_count() {
            bbox.expand_to_include(&self.position(index));
        }
        bbox
    }
}
