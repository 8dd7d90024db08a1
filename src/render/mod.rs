// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Software rendering of composited frames

mod camera;
mod composite;
mod raster;
mod shader;
mod target;

pub use camera::{Camera, Viewport};
pub use composite::{CompositeRenderer, DrawItem};
pub use raster::{rasterize_triangle, to_screen, Fragment};
pub use shader::{
    screen_uv, BaseMaterial, OverlayMaterial, Varyings, FLAG_THRESHOLD, SHAPE_TAG_MAX,
    SHAPE_TAG_MIN,
};
pub use target::{Color, RenderTarget, Texture};
