// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! archcontour
//!
//! Feature-boundary highlighting and collision checks for pairs of opposing
//! surface scans. Triangles of the primary scan are classified into contour
//! and border categories, the result is composited over a base render, and
//! the opposing scan is tinted while the two intersect.

pub mod analysis;
pub mod cli;
pub mod collision;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod render;
pub mod view;

pub use analysis::{
    analyze_scan, Category, Classification, FeatureClassifier, FeatureFlags, ScanAnalysis,
    Strategy, Topology, TopologyBuilder,
};
pub use collision::CollisionProbe;
pub use config::ViewConfig;
pub use error::{ContourError, Result};
pub use geometry::{Primitive, TriangleSoup};
pub use render::{CompositeRenderer, Texture};
pub use view::ContourView;

use config::AnalysisConfig;
use std::path::Path;

/// Load an STL file and analyze it with `settings`
pub fn analyze_file(path: impl AsRef<Path>, settings: &AnalysisConfig) -> Result<ScanAnalysis> {
    let soup = io::load_stl(path)?;
    Ok(analyze_scan(
        &soup,
        &settings.topology_builder(),
        &settings.classifier(),
    ))
}
