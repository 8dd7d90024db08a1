// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Intersection test between the two loaded scans

use crate::geometry::{Bvh, TriangleSoup};
use nalgebra::Matrix4;

/// Holds one hierarchy per scan and answers "do they touch?"
#[derive(Debug, Clone, Default)]
pub struct CollisionProbe {
    primary: Option<Bvh>,
    opposing: Option<Bvh>,
}

impl CollisionProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_primary(&mut self, soup: &TriangleSoup) {
        self.primary = Some(Bvh::build(soup));
    }

    pub fn set_opposing(&mut self, soup: &TriangleSoup) {
        self.opposing = Some(Bvh::build(soup));
    }

    /// Both hierarchies are built
    pub fn is_ready(&self) -> bool {
        self.primary.is_some() && self.opposing.is_some()
    }

    /// True when the scans intersect under their world transforms.
    ///
    /// A missing hierarchy, a singular primary transform or a failed
    /// triangle query all count as no collision.
    pub fn test(&self, world_primary: &Matrix4<f32>, world_opposing: &Matrix4<f32>) -> bool {
        let (Some(primary), Some(opposing)) = (&self.primary, &self.opposing) else {
            tracing::debug!("collision test skipped, a scan is missing");
            return false;
        };

        let Some(inverse_primary) = world_primary.try_inverse() else {
            tracing::warn!("primary world transform is not invertible");
            return false;
        };
        let relative = inverse_primary * world_opposing;

        match primary.intersects(opposing, &relative) {
            Ok(hit) => {
                tracing::debug!(hit, "collision test finished");
                hit
            }
            Err(e) => {
                tracing::warn!(error = %e, "collision test failed");
                false
            }
        }
    }
}
