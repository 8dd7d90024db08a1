// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! View configuration
//!
//! Loaded from `archcontour.toml` when present, then overridden by
//! `ARCHCONTOUR_*` environment variables.

use crate::analysis::{
    Adjacency, AreaMatch, ClassifierSettings, FeatureClassifier, Sampling, Strategy,
    ThresholdTable, TopologyBuilder,
};
use crate::error::{ContourError, Result};
use crate::geometry::Transform;
use crate::render::{Color, OverlayMaterial, Viewport};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File picked up by [`ViewConfig::load`]
pub const DEFAULT_CONFIG_FILE: &str = "archcontour.toml";

/// Complete configuration of a [`crate::ContourView`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Alpha of overlay fragments that show the base pass through
    pub overlay_alpha: f32,
    /// Swap the opposing scan's color while the scans intersect
    pub highlight_collisions: bool,
    pub colors: ColorConfig,
    pub primary_transform: Transform,
    pub opposing_transform: Transform,
    pub classification: AnalysisConfig,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            overlay_alpha: 0.9,
            highlight_collisions: true,
            colors: ColorConfig::default(),
            primary_transform: Transform {
                rotation_degrees: [-90.0, 45.0, 0.0],
                translation: [0.0; 3],
            },
            opposing_transform: Transform::identity(),
            classification: AnalysisConfig::default(),
        }
    }
}

/// Topology and classifier settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub strategy: Strategy,
    pub area_match: AreaMatch,
    pub adjacency: Adjacency,
    /// Vertex each feature point is read from
    pub sampling: Sampling,
    /// Corner distance treated as one vertex by shared-edge adjacency
    pub weld_tolerance: f32,
    pub table: ThresholdTable,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            area_match: AreaMatch::default(),
            adjacency: Adjacency::default(),
            sampling: Sampling::default(),
            weld_tolerance: TopologyBuilder::DEFAULT_WELD_TOLERANCE,
            table: ThresholdTable::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn topology_builder(&self) -> TopologyBuilder {
        TopologyBuilder::new(self.adjacency)
            .with_sampling(self.sampling)
            .with_weld_tolerance(self.weld_tolerance)
    }

    pub fn classifier(&self) -> FeatureClassifier {
        FeatureClassifier::from_settings(&ClassifierSettings {
            strategy: self.strategy,
            table: self.table.clone(),
            area_match: self.area_match,
        })
    }
}

/// Colors as `#rrggbb` strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub contour: String,
    pub border: String,
    pub border1: String,
    pub base: String,
    pub background: String,
    /// Opposing scan color while a collision is highlighted
    pub collision: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            contour: "#ffffff".to_string(),
            border: "#ff0000".to_string(),
            border1: "#00ff00".to_string(),
            base: "#ffffff".to_string(),
            background: "#ffffff".to_string(),
            collision: "#e91e63".to_string(),
        }
    }
}

impl ViewConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ViewConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load [`DEFAULT_CONFIG_FILE`] if it exists, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if Path::new(DEFAULT_CONFIG_FILE).exists() {
            Self::from_file(DEFAULT_CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `ARCHCONTOUR_*` environment variables; unparsable values are ignored
    pub fn apply_env_overrides(&mut self) {
        if let Some(width) = env_parse("ARCHCONTOUR_WIDTH") {
            self.width = width;
        }
        if let Some(height) = env_parse("ARCHCONTOUR_HEIGHT") {
            self.height = height;
        }
        if let Some(alpha) = env_parse("ARCHCONTOUR_OVERLAY_ALPHA") {
            self.overlay_alpha = alpha;
        }
        if let Some(highlight) = env_parse("ARCHCONTOUR_HIGHLIGHT_COLLISIONS") {
            self.highlight_collisions = highlight;
        }
        if let Ok(strategy) = std::env::var("ARCHCONTOUR_STRATEGY") {
            match strategy.as_str() {
                "edge-angle" | "a" | "A" => self.classification.strategy = Strategy::EdgeAngle,
                "area-statistics" | "b" | "B" => {
                    self.classification.strategy = Strategy::AreaStatistics
                }
                other => tracing::warn!(value = other, "ignoring unknown ARCHCONTOUR_STRATEGY"),
            }
        }
        if let Ok(table) = std::env::var("ARCHCONTOUR_TABLE") {
            match table.as_str() {
                "one" | "1" => self.classification.table = ThresholdTable::One,
                "two" | "2" => self.classification.table = ThresholdTable::Two,
                other => tracing::warn!(value = other, "ignoring unknown ARCHCONTOUR_TABLE"),
            }
        }
        if let Ok(sampling) = std::env::var("ARCHCONTOUR_SAMPLING") {
            match sampling.as_str() {
                "triangle-first-vertex" => {
                    self.classification.sampling = Sampling::TriangleFirstVertex
                }
                "vertex-stride" => self.classification.sampling = Sampling::VertexStride,
                other => tracing::warn!(value = other, "ignoring unknown ARCHCONTOUR_SAMPLING"),
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        self.viewport()?;
        if !(0.0..=1.0).contains(&self.overlay_alpha) {
            return Err(ContourError::InvalidConfig(format!(
                "overlay_alpha must be within [0, 1], got {}",
                self.overlay_alpha
            )));
        }
        let tolerance = self.classification.weld_tolerance;
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(ContourError::InvalidConfig(format!(
                "weld_tolerance must be positive, got {tolerance}"
            )));
        }
        if let ThresholdTable::Custom(bands) = &self.classification.table {
            if let Some(band) = bands.iter().find(|band| band.min > band.max) {
                return Err(ContourError::InvalidConfig(format!(
                    "band {} has min {} above max {}",
                    band.category, band.min, band.max
                )));
            }
        }
        self.overlay_material()?;
        self.base_color()?;
        self.background_color()?;
        self.collision_color()?;
        Ok(())
    }

    pub fn viewport(&self) -> Result<Viewport> {
        Viewport::new(self.width, self.height)
    }

    pub fn overlay_material(&self) -> Result<OverlayMaterial> {
        Ok(OverlayMaterial {
            contour_color: parse_hex_color(&self.colors.contour)?,
            border_color: parse_hex_color(&self.colors.border)?,
            border1_color: parse_hex_color(&self.colors.border1)?,
            passthrough_alpha: self.overlay_alpha,
        })
    }

    pub fn base_color(&self) -> Result<Color> {
        opaque(&self.colors.base)
    }

    pub fn background_color(&self) -> Result<Color> {
        opaque(&self.colors.background)
    }

    pub fn collision_color(&self) -> Result<Color> {
        opaque(&self.colors.collision)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.parse().ok()
}

fn opaque(hex: &str) -> Result<Color> {
    let [r, g, b] = parse_hex_color(hex)?;
    Ok([r, g, b, 1.0])
}

/// Parse `#rrggbb` (the `#` is optional) into linear `[0, 1]` components
pub fn parse_hex_color(hex: &str) -> Result<[f32; 3]> {
    let digits = hex.trim().trim_start_matches('#');
    let value = (digits.len() == 6 && digits.bytes().all(|b| b.is_ascii_hexdigit()))
        .then(|| u32::from_str_radix(digits, 16).ok())
        .flatten()
        .ok_or_else(|| ContourError::InvalidConfig(format!("invalid color {hex:?}")))?;

    Ok([
        ((value >> 16) & 0xff) as f32 / 255.0,
        ((value >> 8) & 0xff) as f32 / 255.0,
        (value & 0xff) as f32 / 255.0,
    ])
}
