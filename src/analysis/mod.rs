// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh feature analysis: topology synthesis, classification and encoding

mod classify;
mod encode;
mod flags;
mod topology;

pub use classify::{
    cross_length, AreaMatch, AreaStatistics, Band, BandTable, Classification,
    ClassificationSummary, ClassifierSettings, FeatureClassifier, RefinedBand, Strategy,
    ThresholdTable,
};
pub use encode::{shape_attribute, AttributeBuffers, AttributeEncoder};
pub use flags::{Category, FeatureFlags};
pub use topology::{
    Adjacency, FeaturePoint, Sampling, SyntheticFace, Topology, TopologyBuilder,
};

use crate::geometry::TriangleSoup;

/// Topology and classification of one scan
#[derive(Debug, Clone)]
pub struct ScanAnalysis {
    pub topology: Topology,
    pub classification: Classification,
}

/// Build the topology of `soup` and classify it in one step
pub fn analyze_scan(
    soup: &TriangleSoup,
    builder: &TopologyBuilder,
    classifier: &FeatureClassifier,
) -> ScanAnalysis {
    let topology = builder.build(soup);
    let classification = classifier.classify(&topology);
    ScanAnalysis {
        topology,
        classification,
    }
}
