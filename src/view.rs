// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! The owned pipeline: two scan slots, analysis, collision and rendering

use crate::analysis::{
    shape_attribute, AttributeEncoder, Classification, FeatureClassifier, Topology,
    TopologyBuilder,
};
use crate::collision::CollisionProbe;
use crate::config::{AnalysisConfig, ViewConfig};
use crate::error::Result;
use crate::geometry::{BoundingBox, TriangleSoup};
use crate::render::{BaseMaterial, Camera, Color, CompositeRenderer, DrawItem, Texture};
use nalgebra::Matrix4;

/// Shape tag of the classified scan
pub const PRIMARY_SHAPE_TAG: f32 = 1.0;
/// Shape tag of the opposing scan
pub const OPPOSING_SHAPE_TAG: f32 = 0.0;

struct PrimaryScan {
    soup: TriangleSoup,
    world: Matrix4<f32>,
    shape: Vec<f32>,
    topology: Topology,
    classification: Classification,
    encoder: AttributeEncoder,
}

struct OpposingScan {
    soup: TriangleSoup,
    world: Matrix4<f32>,
    shape: Vec<f32>,
}

/// Viewer state for one primary and one opposing scan.
///
/// Either scan may arrive first. Collision is probed whenever a load leaves
/// both slots filled, and frames render whatever is loaded.
pub struct ContourView {
    config: ViewConfig,
    builder: TopologyBuilder,
    classifier: FeatureClassifier,
    renderer: CompositeRenderer,
    base_color: Color,
    collision_color: Color,
    primary: Option<PrimaryScan>,
    opposing: Option<OpposingScan>,
    probe: CollisionProbe,
    collision: bool,
    frames: u64,
}

impl ContourView {
    pub fn new(config: ViewConfig) -> Result<Self> {
        config.validate()?;
        let renderer = CompositeRenderer::new(
            config.viewport()?,
            config.background_color()?,
            config.overlay_material()?,
        );

        Ok(Self {
            builder: config.classification.topology_builder(),
            classifier: config.classification.classifier(),
            renderer,
            base_color: config.base_color()?,
            collision_color: config.collision_color()?,
            config,
            primary: None,
            opposing: None,
            probe: CollisionProbe::new(),
            collision: false,
            frames: 0,
        })
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Install the classified scan, replacing any previous one
    pub fn load_primary(&mut self, soup: TriangleSoup) {
        let _span = tracing::info_span!("load_primary", triangles = soup.triangle_count()).entered();

        let topology = self.builder.build(&soup);
        let classification = self.classifier.classify(&topology);
        let mut encoder = AttributeEncoder::new();
        encoder.encode(&classification);

        let summary = classification.summary();
        tracing::info!(
            points = summary.points,
            contour = summary.contour,
            border = summary.border,
            border1 = summary.border1,
            "primary scan classified"
        );

        self.probe.set_primary(&soup);
        self.primary = Some(PrimaryScan {
            shape: shape_attribute(soup.vertex_count(), PRIMARY_SHAPE_TAG),
            world: self.config.primary_transform.matrix(),
            soup,
            topology,
            classification,
            encoder,
        });
        self.update_collision();
    }

    /// Install the opposing scan, replacing any previous one
    pub fn load_opposing(&mut self, soup: TriangleSoup) {
        let _span =
            tracing::info_span!("load_opposing", triangles = soup.triangle_count()).entered();

        self.probe.set_opposing(&soup);
        self.opposing = Some(OpposingScan {
            shape: shape_attribute(soup.vertex_count(), OPPOSING_SHAPE_TAG),
            // The opposing scan is placed relative to the primary one
            world: self.config.primary_transform.matrix() * self.config.opposing_transform.matrix(),
            soup,
        });
        self.update_collision();
    }

    /// Re-run classification of the loaded primary scan with new settings.
    ///
    /// The topology is rebuilt only when the sampling or adjacency settings
    /// changed; the attribute buffers are rewritten in place.
    pub fn reclassify(&mut self, analysis: AnalysisConfig) {
        let rebuild = analysis.adjacency != self.config.classification.adjacency
            || analysis.sampling != self.config.classification.sampling
            || analysis.weld_tolerance != self.config.classification.weld_tolerance;

        self.builder = analysis.topology_builder();
        self.classifier = analysis.classifier();
        self.config.classification = analysis;

        if let Some(primary) = self.primary.as_mut() {
            if rebuild {
                primary.topology = self.builder.build(&primary.soup);
            }
            primary.classification = self.classifier.classify(&primary.topology);
            primary.encoder.encode(&primary.classification);
            tracing::debug!(rebuild, "primary scan reclassified");
        }
    }

    /// Toggle the collision color swap
    pub fn set_highlight_collisions(&mut self, enabled: bool) {
        self.config.highlight_collisions = enabled;
    }

    fn update_collision(&mut self) {
        self.collision = match (&self.primary, &self.opposing) {
            (Some(primary), Some(opposing)) => self.probe.test(&primary.world, &opposing.world),
            _ => false,
        };
        if self.collision {
            tracing::info!("scans intersect");
        }
    }

    /// Result of the last collision probe
    pub fn collision(&self) -> bool {
        self.collision
    }

    /// Material color the opposing scan is drawn with
    pub fn opposing_color(&self) -> Color {
        if self.collision && self.config.highlight_collisions {
            self.collision_color
        } else {
            self.base_color
        }
    }

    pub fn topology(&self) -> Option<&Topology> {
        self.primary.as_ref().map(|p| &p.topology)
    }

    pub fn classification(&self) -> Option<&Classification> {
        self.primary.as_ref().map(|p| &p.classification)
    }

    /// Frames rendered so far
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Base pass output of the most recent frame
    pub fn last_base(&self) -> Option<&Texture> {
        self.renderer.last_base()
    }

    /// World-space bounds of everything loaded
    pub fn world_bounds(&self) -> BoundingBox {
        let primary = self
            .primary
            .as_ref()
            .map(|p| p.soup.bounding_box().transformed(&p.world));
        let opposing = self
            .opposing
            .as_ref()
            .map(|o| o.soup.bounding_box().transformed(&o.world));

        [primary, opposing]
            .into_iter()
            .flatten()
            .fold(BoundingBox::empty(), |acc, b| acc.union(&b))
    }

    /// Render one composited frame of whatever is loaded
    pub fn frame(&mut self) -> Texture {
        let camera = Camera::framing(&self.world_bounds(), &self.renderer.viewport());
        let opposing_color = self.opposing_color();

        let mut items = Vec::with_capacity(2);
        if let Some(primary) = &self.primary {
            items.push(DrawItem {
                soup: &primary.soup,
                model: primary.world,
                material: BaseMaterial::new(self.base_color),
                shape: &primary.shape,
                attributes: primary.encoder.buffers(),
            });
        }
        if let Some(opposing) = &self.opposing {
            items.push(DrawItem {
                soup: &opposing.soup,
                model: opposing.world,
                material: BaseMaterial::new(opposing_color),
                shape: &opposing.shape,
                attributes: None,
            });
        }

        let frame = self.renderer.render(&camera, &items);
        self.frames += 1;
        frame
    }

    /// Release both scans and the render targets, returning the number of
    /// frames rendered over the view's lifetime
    pub fn teardown(self) -> u64 {
        tracing::debug!(frames = self.frames, "view torn down");
        self.frames
    }
}
