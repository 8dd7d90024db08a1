// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Viewport and camera

use crate::error::{ContourError, Result};
use crate::geometry::BoundingBox;
use nalgebra::{Isometry3, Matrix4, Perspective3, Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Pixel dimensions of a render target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ContourError::InvalidViewport { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn resolution(&self) -> Vector2<f32> {
        Vector2::new(self.width as f32, self.height as f32)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Perspective camera looking at a fixed target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    eye: Point3<f32>,
    target: Point3<f32>,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
}

impl Camera {
    /// Vertical field of view used when framing scans
    pub const FOV_Y_DEGREES: f32 = 35.0;

    pub fn look_at(
        eye: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fov_y_degrees: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let view = Isometry3::look_at_rh(&eye, &target, &up).to_homogeneous();
        let projection =
            Perspective3::new(aspect, fov_y_degrees.to_radians(), near, far).to_homogeneous();

        Self {
            eye,
            target,
            view,
            projection,
        }
    }

    /// Camera on the (1, 1, 1) diagonal of `bounds` that keeps the whole box
    /// in view.
    pub fn framing(bounds: &BoundingBox, viewport: &Viewport) -> Self {
        let (center, radius) = if bounds.is_empty() {
            (Point3::origin(), 1.0)
        } else {
            (bounds.center(), bounds.radius().max(1e-3))
        };

        let half_fov = (Self::FOV_Y_DEGREES.to_radians() * 0.5).min(
            // Narrow viewports are limited by the horizontal extent
            (viewport.aspect() * (Self::FOV_Y_DEGREES.to_radians() * 0.5).tan()).atan(),
        );
        let distance = radius / half_fov.sin() * 1.1;
        let direction = Vector3::new(1.0, 1.0, 1.0).normalize();
        let eye = center + direction * distance;

        Self::look_at(
            eye,
            center,
            Vector3::y(),
            Self::FOV_Y_DEGREES,
            viewport.aspect(),
            (distance - radius * 1.5).max(distance * 1e-3),
            distance + radius * 1.5,
        )
    }

    pub fn eye(&self) -> &Point3<f32> {
        &self.eye
    }

    /// Unit vector from the target towards the eye
    pub fn to_eye(&self) -> Vector3<f32> {
        (self.eye - self.target)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::z)
    }

    pub fn view(&self) -> &Matrix4<f32> {
        &self.view
    }

    pub fn projection(&self) -> &Matrix4<f32> {
        &self.projection
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection * self.view
    }
}
