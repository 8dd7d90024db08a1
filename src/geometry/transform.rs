// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Rigid placement of a scan in its parent frame

use nalgebra::{Matrix4, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Euler rotation (degrees) followed by a translation.
///
/// Rotations compose in Y, Z, X order: the X rotation is applied to the
/// geometry first, then Z, then Y.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub rotation_degrees: [f32; 3],
    pub translation: [f32; 3],
}

impl Transform {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn from_translation(x: f32, y: f32, z: f32) -> Self {
        Self {
            rotation_degrees: [0.0; 3],
            translation: [x, y, z],
        }
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        let [rx, ry, rz] = self.rotation_degrees.map(f32::to_radians);
        let rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), ry)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), rz)
            * Rotation3::from_axis_angle(&Vector3::x_axis(), rx);
        let [tx, ty, tz] = self.translation;

        Matrix4::new_translation(&Vector3::new(tx, ty, tz)) * rotation.to_homogeneous()
    }
}
