// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Fragment stages of the two passes
//!
//! Both stages are pure functions of their inputs so they can be tested
//! without rasterizing anything.

use super::target::{Color, Texture};
use nalgebra::{Vector2, Vector3, Vector4};
use serde::{Deserialize, Serialize};

/// Interpolated attributes above this count as set
pub const FLAG_THRESHOLD: f32 = 0.98;

/// Shape tags in `(SHAPE_TAG_MIN, SHAPE_TAG_MAX)` select the classified mesh
pub const SHAPE_TAG_MIN: f32 = 0.98;
pub const SHAPE_TAG_MAX: f32 = 1.98;

/// Ambient floor of the headlight term
const AMBIENT: f32 = 0.35;

/// Per-fragment inputs of the overlay stage
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Varyings {
    pub is_contour: f32,
    pub is_border: f32,
    pub is_border1: f32,
    pub shape: f32,
}

impl Varyings {
    pub fn is_classified_shape(&self) -> bool {
        self.shape > SHAPE_TAG_MIN && self.shape < SHAPE_TAG_MAX
    }
}

/// Map a clip-space position to the `[0, 1]` texture coordinate of its pixel
pub fn screen_uv(clip: &Vector4<f32>) -> Vector2<f32> {
    Vector2::new(
        (clip.x / clip.w + 1.0) * 0.5,
        (clip.y / clip.w + 1.0) * 0.5,
    )
}

/// Ordinary mesh material: flat color lit by a headlight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseMaterial {
    pub color: Color,
}

impl BaseMaterial {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    /// Both faces are lit, so winding does not matter
    pub fn shade(&self, normal: &Vector3<f32>, to_light: &Vector3<f32>) -> Color {
        let lambert = match normal.try_normalize(f32::EPSILON) {
            Some(n) => n.dot(to_light).abs(),
            None => 1.0,
        };
        let intensity = AMBIENT + (1.0 - AMBIENT) * lambert;
        [
            self.color[0] * intensity,
            self.color[1] * intensity,
            self.color[2] * intensity,
            self.color[3],
        ]
    }
}

/// Classification material shared by every mesh in the overlay pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayMaterial {
    pub contour_color: [f32; 3],
    pub border_color: [f32; 3],
    pub border1_color: [f32; 3],
    /// Alpha of fragments that show the base pass through
    pub passthrough_alpha: f32,
}

impl Default for OverlayMaterial {
    fn default() -> Self {
        Self {
            contour_color: [1.0, 1.0, 1.0],
            border_color: [1.0, 0.0, 0.0],
            border1_color: [0.0, 1.0, 0.0],
            passthrough_alpha: 0.9,
        }
    }
}

impl OverlayMaterial {
    /// Color of a fragment at `uv` given its interpolated attributes.
    ///
    /// Active categories are averaged at full opacity. Everything else shows
    /// the base sample at [`OverlayMaterial::passthrough_alpha`].
    pub fn shade(&self, varyings: &Varyings, base: &Texture, uv: &Vector2<f32>) -> Color {
        let sample = base.sample(uv);
        let passthrough = [sample[0], sample[1], sample[2], self.passthrough_alpha];

        if !varyings.is_classified_shape() {
            return passthrough;
        }

        let mut sum = [0.0f32; 3];
        let mut active = 0u32;
        for (value, color) in [
            (varyings.is_contour, self.contour_color),
            (varyings.is_border, self.border_color),
            (varyings.is_border1, self.border1_color),
        ] {
            if value > FLAG_THRESHOLD {
                active += 1;
                for (s, c) in sum.iter_mut().zip(color) {
                    *s += c;
                }
            }
        }

        if active == 0 {
            return passthrough;
        }

        let n = active as f32;
        [sum[0] / n, sum[1] / n, sum[2] / n, 1.0]
    }
}
