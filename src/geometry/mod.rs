// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - triangle buffers, bounds and spatial acceleration

mod bbox;
mod bvh;
mod mesh;
mod primitives;
mod transform;

pub use bbox::BoundingBox;
pub use bvh::{Bvh, BvhNode};
pub use mesh::{TriangleSoup, Vertex, FLOATS_PER_TRIANGLE, FLOATS_PER_VERTEX};
pub use primitives::Primitive;
pub use transform::Transform;
