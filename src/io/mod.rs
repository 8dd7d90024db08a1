// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh loading and frame export

mod stl;

pub use stl::{load_stl, save_stl};

use crate::error::Result;
use crate::render::Texture;
use std::path::Path;

/// Write a rendered frame as PNG
pub fn save_png(frame: &Texture, path: impl AsRef<Path>) -> Result<()> {
    frame.to_rgba_image().save(path.as_ref())?;
    tracing::info!(path = %path.as_ref().display(), "frame written");
    Ok(())
}
