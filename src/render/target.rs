// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Offscreen color/depth targets and resolved textures
//!
//! A [`RenderTarget`] can only be written. Calling [`RenderTarget::resolve`]
//! consumes it and yields a read-only [`Texture`], so nothing can sample a
//! target that a pass is still drawing into. [`Texture::recycle`] hands the
//! storage back for the next frame.

use super::camera::Viewport;
use image::{Rgba, RgbaImage};
use nalgebra::Vector2;

/// Linear RGBA color, components in `[0, 1]`
pub type Color = [f32; 4];

/// Writable color + depth buffer; row 0 is the top of the image
#[derive(Debug, Clone)]
pub struct RenderTarget {
    viewport: Viewport,
    color: Vec<Color>,
    depth: Vec<f32>,
}

impl RenderTarget {
    pub fn new(viewport: Viewport) -> Self {
        let pixels = viewport.pixel_count();
        Self {
            viewport,
            color: vec![[0.0; 4]; pixels],
            depth: vec![f32::INFINITY; pixels],
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Fill with `color` and reset depth
    pub fn clear(&mut self, color: Color) {
        self.color.fill(color);
        self.depth.fill(f32::INFINITY);
    }

    /// Depth test: true when `depth` is nearer than what is stored at (x, y)
    pub fn passes_depth(&self, x: u32, y: u32, depth: f32) -> bool {
        depth < self.depth[self.index(x, y)]
    }

    /// Store a fragment that passed the depth test
    pub fn write(&mut self, x: u32, y: u32, depth: f32, color: Color) {
        let index = self.index(x, y);
        self.depth[index] = depth;
        self.color[index] = color;
    }

    /// Finish drawing and expose the contents for sampling
    pub fn resolve(self) -> Texture {
        Texture {
            viewport: self.viewport,
            texels: self.color,
            depth: self.depth,
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.viewport.width as usize + x as usize
    }
}

/// Read-only resolved color buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    viewport: Viewport,
    texels: Vec<Color>,
    depth: Vec<f32>,
}

impl Texture {
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn width(&self) -> u32 {
        self.viewport.width
    }

    pub fn height(&self) -> u32 {
        self.viewport.height
    }

    /// Texel at column `x`, row `y` (row 0 on top)
    pub fn texel(&self, x: u32, y: u32) -> Color {
        self.texels[y as usize * self.viewport.width as usize + x as usize]
    }

    /// Nearest-texel lookup; `uv` has its origin at the bottom-left corner
    pub fn sample(&self, uv: &Vector2<f32>) -> Color {
        let pixel = Vector2::new(uv.x, 1.0 - uv.y).component_mul(&self.viewport.resolution());
        let x = (pixel.x.floor().max(0.0) as u32).min(self.viewport.width - 1);
        let y = (pixel.y.floor().max(0.0) as u32).min(self.viewport.height - 1);
        self.texel(x, y)
    }

    /// Reuse the storage as a writable target
    pub fn recycle(self) -> RenderTarget {
        RenderTarget {
            viewport: self.viewport,
            color: self.texels,
            depth: self.depth,
        }
    }

    /// Convert to an 8-bit image
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.viewport.width, self.viewport.height, |x, y| {
            Rgba(self.texel(x, y).map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
        })
    }
}
