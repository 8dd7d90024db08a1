// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Two-pass compositor
//!
//! The base pass draws every mesh with its own material into an offscreen
//! target. The target is resolved into a texture, and the overlay pass
//! redraws every mesh with [`OverlayMaterial`], sampling that texture at the
//! fragment's own pixel.

use super::camera::{Camera, Viewport};
use super::raster::rasterize_triangle;
use super::shader::{screen_uv, BaseMaterial, OverlayMaterial, Varyings};
use super::target::{Color, RenderTarget, Texture};
use crate::analysis::{AttributeBuffers, Category};
use crate::geometry::TriangleSoup;
use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};

/// One mesh submitted to a frame
#[derive(Debug, Clone, Copy)]
pub struct DrawItem<'a> {
    pub soup: &'a TriangleSoup,
    pub model: Matrix4<f32>,
    pub material: BaseMaterial,
    /// Per-vertex shape tag
    pub shape: &'a [f32],
    /// Classification attributes; `None` reads as all zero
    pub attributes: Option<&'a AttributeBuffers>,
}

impl DrawItem<'_> {
    fn shape_at(&self, vertex: usize) -> f32 {
        self.shape.get(vertex).copied().unwrap_or(0.0)
    }

    fn attribute_at(&self, category: Category, vertex: usize) -> f32 {
        self.attributes
            .map_or(0.0, |buffers| buffers.vertex_value(category, vertex))
    }
}

/// Owns the reusable base target and runs both passes
#[derive(Debug)]
pub struct CompositeRenderer {
    viewport: Viewport,
    background: Color,
    overlay: OverlayMaterial,
    base: Option<Texture>,
}

impl CompositeRenderer {
    pub fn new(viewport: Viewport, background: Color, overlay: OverlayMaterial) -> Self {
        Self {
            viewport,
            background,
            overlay,
            base: None,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Change the output size; the base target is reallocated on the next frame
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            self.viewport = viewport;
            self.base = None;
        }
    }

    /// Base texture of the most recent frame
    pub fn last_base(&self) -> Option<&Texture> {
        self.base.as_ref()
    }

    /// Render one composited frame
    pub fn render(&mut self, camera: &Camera, items: &[DrawItem<'_>]) -> Texture {
        let _span = tracing::trace_span!("frame", meshes = items.len()).entered();

        let mut target = match self.base.take() {
            Some(previous) if previous.viewport() == self.viewport => previous.recycle(),
            _ => RenderTarget::new(self.viewport),
        };
        target.clear(self.background);
        let view_projection = camera.view_projection();
        let to_light = camera.to_eye();
        for item in items {
            base_pass(&mut target, &view_projection, &to_light, item);
        }
        let base = target.resolve();

        let mut output = RenderTarget::new(self.viewport);
        output.clear(self.background);
        for item in items {
            overlay_pass(&mut output, &base, &view_projection, &self.overlay, item);
        }

        self.base = Some(base);
        output.resolve()
    }
}

fn clip_corners(
    soup: &TriangleSoup,
    model_view_projection: &Matrix4<f32>,
    triangle: usize,
) -> [Vector4<f32>; 3] {
    std::array::from_fn(|k| {
        let position = soup.position(3 * triangle + k);
        model_view_projection * position.to_homogeneous()
    })
}

fn normal_matrix(model: &Matrix4<f32>) -> Matrix3<f32> {
    let linear = model.fixed_view::<3, 3>(0, 0).into_owned();
    linear
        .try_inverse()
        .map(|inverse| inverse.transpose())
        .unwrap_or(linear)
}

fn base_pass(
    target: &mut RenderTarget,
    view_projection: &Matrix4<f32>,
    to_light: &Vector3<f32>,
    item: &DrawItem<'_>,
) {
    let viewport = target.viewport();
    let mvp = view_projection * item.model;
    let normals = normal_matrix(&item.model);

    for t in 0..item.soup.triangle_count() {
        let corners = clip_corners(item.soup, &mvp, t);
        let corner_normals: [Vector3<f32>; 3] =
            std::array::from_fn(|k| normals * item.soup.normal(3 * t + k));

        rasterize_triangle(&viewport, corners, |fragment| {
            if !target.passes_depth(fragment.x, fragment.y, fragment.depth) {
                return;
            }
            let w = fragment.weights;
            let normal = corner_normals[0] * w[0] + corner_normals[1] * w[1] + corner_normals[2] * w[2];
            let color = item.material.shade(&normal, to_light);
            target.write(fragment.x, fragment.y, fragment.depth, color);
        });
    }
}

fn overlay_pass(
    target: &mut RenderTarget,
    base: &Texture,
    view_projection: &Matrix4<f32>,
    material: &OverlayMaterial,
    item: &DrawItem<'_>,
) {
    let viewport = target.viewport();
    let mvp = view_projection * item.model;

    for t in 0..item.soup.triangle_count() {
        let corners = clip_corners(item.soup, &mvp, t);
        let vertices = [3 * t, 3 * t + 1, 3 * t + 2];
        let shape = vertices.map(|v| item.shape_at(v));
        let contour = vertices.map(|v| item.attribute_at(Category::Contour, v));
        let border = vertices.map(|v| item.attribute_at(Category::Border, v));
        let border1 = vertices.map(|v| item.attribute_at(Category::Border1, v));

        rasterize_triangle(&viewport, corners, |fragment| {
            if !target.passes_depth(fragment.x, fragment.y, fragment.depth) {
                return;
            }
            let varyings = Varyings {
                is_contour: fragment.interpolate(contour),
                is_border: fragment.interpolate(border),
                is_border1: fragment.interpolate(border1),
                shape: fragment.interpolate(shape),
            };
            let uv = screen_uv(&fragment.clip);
            let color = material.shade(&varyings, base, &uv);
            target.write(fragment.x, fragment.y, fragment.depth, color);
        });
    }
}
