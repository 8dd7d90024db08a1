// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Flat scalar attribute buffers for the overlay pass

use super::classify::Classification;
use super::flags::Category;

/// Three parallel 0.0/1.0 buffers, one slot per feature point.
///
/// Each buffer is `3 * points` long so it can be bound with the same length
/// as a per-vertex attribute. Slot `p` holds point `p`'s value and the tail is
/// zero.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeBuffers {
    contour: Vec<f32>,
    border: Vec<f32>,
    border1: Vec<f32>,
    points: usize,
}

impl AttributeBuffers {
    fn with_points(points: usize) -> Self {
        let len = 3 * points;
        Self {
            contour: vec![0.0; len],
            border: vec![0.0; len],
            border1: vec![0.0; len],
            points,
        }
    }

    pub fn get(&self, category: Category) -> &[f32] {
        match category {
            Category::Contour => &self.contour,
            Category::Border => &self.border,
            Category::Border1 => &self.border1,
        }
    }

    fn get_mut(&mut self, category: Category) -> &mut Vec<f32> {
        match category {
            Category::Contour => &mut self.contour,
            Category::Border => &mut self.border,
            Category::Border1 => &mut self.border1,
        }
    }

    /// Number of feature points encoded
    pub fn points(&self) -> usize {
        self.points
    }

    /// Value of `category` for feature point `point` (0.0 when out of range)
    pub fn point_value(&self, category: Category, point: usize) -> f32 {
        if point < self.points {
            self.get(category)[point]
        } else {
            0.0
        }
    }

    /// Value fetched by vertex `vertex` of a triangle soup.
    ///
    /// Feature point `t` stands for triangle `t`, so all three corners of a
    /// triangle read that triangle's point.
    pub fn vertex_value(&self, category: Category, vertex: usize) -> f32 {
        self.point_value(category, vertex / 3)
    }
}

/// Converts classifications into [`AttributeBuffers`].
///
/// Buffers are allocated on the first encode and rewritten in place after
/// that, unless the point count changes.
#[derive(Debug, Clone, Default)]
pub struct AttributeEncoder {
    buffers: Option<AttributeBuffers>,
}

impl AttributeEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encode(&mut self, classification: &Classification) -> &AttributeBuffers {
        let points = classification.len();
        let buffers = match self.buffers.take() {
            Some(existing) if existing.points == points => existing,
            _ => AttributeBuffers::with_points(points),
        };
        let buffers = self.buffers.insert(buffers);

        for category in Category::ALL {
            let values = buffers.get_mut(category);
            values.fill(0.0);
            for (slot, flags) in values.iter_mut().zip(classification.flags()) {
                *slot = flags.value(category);
            }
        }

        buffers
    }

    /// Buffers from the last encode, if any
    pub fn buffers(&self) -> Option<&AttributeBuffers> {
        self.buffers.as_ref()
    }
}

/// Constant per-vertex shape tag buffer
pub fn shape_attribute(vertex_count: usize, tag: f32) -> Vec<f32> {
    vec![tag; vertex_count]
}
