// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Procedural triangle soups for demos, tests and benchmarks

use super::{TriangleSoup, Vertex};
use nalgebra::{Point3, Vector3};
use std::f32::consts::PI;

/// Geometric primitives
pub enum Primitive {
    Cube { size: Vector3<f32>, center: bool },
    Quad { width: f32, height: f32 },
    Sphere { r: f32, segments: u32 },
}

impl Primitive {
    pub fn cube(size: Vector3<f32>, center: bool) -> Self {
        Self::Cube { size, center }
    }

    /// Two coplanar triangles in the XY plane facing +Z
    pub fn quad(width: f32, height: f32) -> Self {
        Self::Quad { width, height }
    }

    pub fn sphere(r: f32, segments: u32) -> Self {
        let segments = if segments > 2 { segments } else { 32 };
        Self::Sphere { r, segments }
    }

    pub fn to_soup(&self) -> TriangleSoup {
        match self {
            Self::Cube { size, center } => generate_cube(*size, *center),
            Self::Quad { width, height } => generate_quad(*width, *height),
            Self::Sphere { r, segments } => generate_sphere(*r, *segments),
        }
    }
}

fn generate_cube(size: Vector3<f32>, center: bool) -> TriangleSoup {
    let offset = if center { size * 0.5 } else { Vector3::zeros() };
    let (min_x, max_x) = (-offset.x, size.x - offset.x);
    let (min_y, max_y) = (-offset.y, size.y - offset.y);
    let (min_z, max_z) = (-offset.z, size.z - offset.z);

    // 8 vertices of the cube
    let positions = [
        Point3::new(min_x, min_y, min_z),
        Point3::new(max_x, min_y, min_z),
        Point3::new(max_x, max_y, min_z),
        Point3::new(min_x, max_y, min_z),
        Point3::new(min_x, min_y, max_z),
        Point3::new(max_x, min_y, max_z),
        Point3::new(max_x, max_y, max_z),
        Point3::new(min_x, max_y, max_z),
    ];

    // 6 faces, two triangles each, with the face normal
    let faces = [
        // Front (z+)
        ([4, 5, 6], Vector3::new(0.0, 0.0, 1.0)),
        ([4, 6, 7], Vector3::new(0.0, 0.0, 1.0)),
        // Back (z-)
        ([1, 0, 3], Vector3::new(0.0, 0.0, -1.0)),
        ([1, 3, 2], Vector3::new(0.0, 0.0, -1.0)),
        // Right (x+)
        ([5, 1, 2], Vector3::new(1.0, 0.0, 0.0)),
        ([5, 2, 6], Vector3::new(1.0, 0.0, 0.0)),
        // Left (x-)
        ([0, 4, 7], Vector3::new(-1.0, 0.0, 0.0)),
        ([0, 7, 3], Vector3::new(-1.0, 0.0, 0.0)),
        // Top (y+)
        ([7, 6, 2], Vector3::new(0.0, 1.0, 0.0)),
        ([7, 2, 3], Vector3::new(0.0, 1.0, 0.0)),
        // Bottom (y-)
        ([0, 1, 5], Vector3::new(0.0, -1.0, 0.0)),
        ([0, 5, 4], Vector3::new(0.0, -1.0, 0.0)),
    ];

    let mut soup = TriangleSoup::with_capacity(faces.len());
    for (indices, normal) in faces {
        soup.push_triangle(indices.map(|i| positions[i]), normal);
    }
    soup
}

fn generate_quad(width: f32, height: f32) -> TriangleSoup {
    let (hw, hh) = (width * 0.5, height * 0.5);
    let a = Point3::new(-hw, -hh, 0.0);
    let b = Point3::new(hw, -hh, 0.0);
    let c = Point3::new(hw, hh, 0.0);
    let d = Point3::new(-hw, hh, 0.0);

    let mut soup = TriangleSoup::with_capacity(2);
    soup.push_triangle([a, b, c], Vector3::z());
    soup.push_triangle([a, c, d], Vector3::z());
    soup
}

fn generate_sphere(radius: f32, segments: u32) -> TriangleSoup {
    let stacks = segments;
    let slices = segments;

    let vertex = |i: u32, j: u32| {
        let phi = PI * i as f32 / stacks as f32;
        let theta = 2.0 * PI * j as f32 / slices as f32;
        let direction = Vector3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
        Vertex::new(Point3::from(direction * radius), direction)
    };

    let mut soup = TriangleSoup::with_capacity((2 * stacks * slices) as usize);
    for i in 0..stacks {
        for j in 0..slices {
            let first = vertex(i, j);
            let second = vertex(i + 1, j);
            let first_next = vertex(i, j + 1);
            let second_next = vertex(i + 1, j + 1);

            for v in [first, second, first_next, second, second_next, first_next] {
                soup.push_vertex(v);
            }
        }
    }
    soup
}
