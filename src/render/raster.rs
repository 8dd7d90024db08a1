// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scanline-free triangle rasterization over clip-space input

use super::camera::Viewport;
use nalgebra::{Vector2, Vector4};

/// Triangles with a corner at or behind the eye plane are dropped
const MIN_CLIP_W: f32 = 1e-6;

/// One covered pixel of a triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub x: u32,
    pub y: u32,
    /// NDC depth in `[-1, 1]`
    pub depth: f32,
    /// Perspective-correct barycentric weights of the three corners
    pub weights: [f32; 3],
    /// Interpolated clip-space position
    pub clip: Vector4<f32>,
}

impl Fragment {
    /// Interpolate a per-corner value with the fragment's weights
    pub fn interpolate(&self, values: [f32; 3]) -> f32 {
        self.weights[0] * values[0] + self.weights[1] * values[1] + self.weights[2] * values[2]
    }
}

/// Screen-space position of a clip-space vertex, y pointing down
pub fn to_screen(clip: &Vector4<f32>, viewport: &Viewport) -> Vector2<f32> {
    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    Vector2::new(
        (ndc_x + 1.0) * 0.5 * viewport.width as f32,
        (1.0 - ndc_y) * 0.5 * viewport.height as f32,
    )
}

/// Emit a fragment for every pixel center covered by the triangle.
///
/// Both windings are drawn. Fragments outside the depth range are discarded.
pub fn rasterize_triangle<F>(viewport: &Viewport, clip: [Vector4<f32>; 3], mut emit: F)
where
    F: FnMut(Fragment),
{
    if clip.iter().any(|c| c.w <= MIN_CLIP_W) {
        return;
    }

    let points = clip.map(|c| to_screen(&c, viewport));
    let depths = clip.map(|c| c.z / c.w);
    let inv_w = clip.map(|c| 1.0 / c.w);

    let width = viewport.width as i32;
    let height = viewport.height as i32;

    let min_x = points
        .iter()
        .fold(f32::INFINITY, |acc, p| acc.min(p.x))
        .floor()
        .max(0.0) as i32;
    let max_x = points
        .iter()
        .fold(f32::NEG_INFINITY, |acc, p| acc.max(p.x))
        .ceil()
        .min((width - 1) as f32) as i32;
    let min_y = points
        .iter()
        .fold(f32::INFINITY, |acc, p| acc.min(p.y))
        .floor()
        .max(0.0) as i32;
    let max_y = points
        .iter()
        .fold(f32::NEG_INFINITY, |acc, p| acc.max(p.y))
        .ceil()
        .min((height - 1) as f32) as i32;

    if min_x > max_x || min_y > max_y {
        return;
    }

    let area = edge(points[0], points[1], points[2]);
    if area.abs() < 1e-8 {
        return;
    }
    let inv_area = 1.0 / area;

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = Vector2::new(x as f32 + 0.5, y as f32 + 0.5);
            let w0 = edge(points[1], points[2], p);
            let w1 = edge(points[2], points[0], p);
            let w2 = edge(points[0], points[1], p);

            let same_sign = (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0)
                || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0);

            if !same_sign {
                continue;
            }

            let screen = [w0 * inv_area, w1 * inv_area, w2 * inv_area];
            let depth = screen[0] * depths[0] + screen[1] * depths[1] + screen[2] * depths[2];
            if !(-1.0..=1.0).contains(&depth) {
                continue;
            }

            let corrected = [
                screen[0] * inv_w[0],
                screen[1] * inv_w[1],
                screen[2] * inv_w[2],
            ];
            let sum = corrected[0] + corrected[1] + corrected[2];
            if sum.abs() <= f32::EPSILON {
                continue;
            }
            let weights = corrected.map(|c| c / sum);
            let clip_position = clip[0] * weights[0] + clip[1] * weights[1] + clip[2] * weights[2];

            emit(Fragment {
                x: x as u32,
                y: y as u32,
                depth,
                weights,
                clip: clip_position,
            });
        }
    }
}

fn edge(a: Vector2<f32>, b: Vector2<f32>, p: Vector2<f32>) -> f32 {
    (p.x - a.x) * (b.y - a.y) - (p.y - a.y) * (b.x - a.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn viewport() -> Viewport {
        Viewport::new(8, 8).unwrap()
    }

    fn full_screen() -> [[Vector4<f32>; 3]; 2] {
        let a = Vector4::new(-1.0, -1.0, 0.0, 1.0);
        let b = Vector4::new(1.0, -1.0, 0.0, 1.0);
        let c = Vector4::new(1.0, 1.0, 0.0, 1.0);
        let d = Vector4::new(-1.0, 1.0, 0.0, 1.0);
        [[a, b, c], [a, c, d]]
    }

    #[test]
    fn test_full_screen_quad_covers_every_pixel() {
        let mut covered = vec![false; 64];
        for triangle in full_screen() {
            rasterize_triangle(&viewport(), triangle, |fragment| {
                covered[(fragment.y * 8 + fragment.x) as usize] = true;
            });
        }
        assert!(covered.iter().all(|&c| c));
    }

    #[test]
    fn test_both_windings_are_drawn() {
        let [a, b, c] = full_screen()[0];
        let mut forward = 0;
        let mut backward = 0;
        rasterize_triangle(&viewport(), [a, b, c], |_| forward += 1);
        rasterize_triangle(&viewport(), [a, c, b], |_| backward += 1);
        assert!(forward > 0);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_weights_sum_to_one() {
        let triangle = [
            Vector4::new(-2.0, -2.0, 0.0, 2.0),
            Vector4::new(1.0, -1.0, 0.5, 1.0),
            Vector4::new(0.0, 3.0, 1.0, 3.0),
        ];
        let mut count = 0;
        rasterize_triangle(&viewport(), triangle, |fragment| {
            count += 1;
            assert_relative_eq!(fragment.weights.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
            assert_relative_eq!(fragment.interpolate([1.0, 1.0, 1.0]), 1.0, epsilon = 1e-5);
        });
        assert!(count > 0);
    }

    #[test]
    fn test_vertex_behind_eye_is_skipped() {
        let mut triangle = full_screen()[0];
        triangle[1].w = -1.0;
        let mut count = 0;
        rasterize_triangle(&viewport(), triangle, |_| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_top_row_is_positive_ndc_y() {
        let clip = Vector4::new(0.0, 1.0, 0.0, 1.0);
        let screen = to_screen(&clip, &viewport());
        assert_relative_eq!(screen.x, 4.0);
        assert_relative_eq!(screen.y, 0.0);
    }
}
