// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Feature classification over a built topology
//!
//! Strategy A compares the normals of every pair of faces registered on a
//! point: `L = |nA x nB|` is the sine of the angle between them and is mapped
//! to categories through a band table. Strategy B additionally marks points
//! whose faces are unusually small relative to the mesh's own area
//! distribution.

use super::flags::{Category, FeatureFlags};
use super::topology::{SyntheticFace, Topology};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Classification strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Strategy A: edge-angle banding
    #[default]
    EdgeAngle,
    /// Strategy B: edge-angle banding plus the area-statistics rule
    AreaStatistics,
}

/// Which faces the area rule of strategy B inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AreaMatch {
    /// Any registered face, area in `(refined_min, refined_average]`
    #[default]
    AnyRegisteredFace,
    /// Only the point's own face, area in `[refined_min, refined_average]`
    OwnedFace,
}

/// Closed interval of cross-product length mapped to a category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f32,
    pub max: f32,
    pub category: Category,
}

impl Band {
    pub const fn new(min: f32, max: f32, category: Category) -> Self {
        Self { min, max, category }
    }

    pub fn contains(&self, length: f32) -> bool {
        self.min <= length && length <= self.max
    }
}

/// Threshold table selection as it appears in configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThresholdTable {
    #[default]
    One,
    Two,
    Custom(Vec<Band>),
}

impl ThresholdTable {
    pub fn bands(&self) -> BandTable {
        match self {
            ThresholdTable::One => BandTable::table_one(),
            ThresholdTable::Two => BandTable::table_two(),
            ThresholdTable::Custom(bands) => BandTable::new(bands.clone()),
        }
    }
}

/// Ordered band list; every matching band sets its category
#[derive(Debug, Clone, PartialEq)]
pub struct BandTable {
    bands: Vec<Band>,
}

impl BandTable {
    pub fn new(bands: Vec<Band>) -> Self {
        Self { bands }
    }

    /// border `[0.04, 0.5]`, contour `[0.5, 0.7]`, border1 `[0.7, 0.99]`
    pub fn table_one() -> Self {
        Self::new(vec![
            Band::new(0.04, 0.5, Category::Border),
            Band::new(0.5, 0.7, Category::Contour),
            Band::new(0.7, 0.99, Category::Border1),
        ])
    }

    /// border `[0.1, 0.8]`, border1 `[0.8, 1.0]`
    pub fn table_two() -> Self {
        Self::new(vec![
            Band::new(0.1, 0.8, Category::Border),
            Band::new(0.8, 1.0, Category::Border1),
        ])
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// Flags for one cross-product length
    pub fn flags_for(&self, length: f32) -> FeatureFlags {
        self.bands
            .iter()
            .filter(|band| band.contains(length))
            .fold(FeatureFlags::EMPTY, |acc, band| acc | band.category.flag())
    }
}

/// Length of the cross product of two face normals
pub fn cross_length(a: &Vector3<f32>, b: &Vector3<f32>) -> f32 {
    a.cross(b).norm()
}

/// Area band over faces no larger than the mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RefinedBand {
    pub min_area: f32,
    pub average_area: f32,
    pub face_count: usize,
}

/// Per-mesh face area distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaStatistics {
    pub min_area: f32,
    pub max_area: f32,
    pub average_area: f32,
    /// `None` when no face has area in `(0, average_area]`
    pub refined: Option<RefinedBand>,
}

impl AreaStatistics {
    /// Returns `None` for an empty face list
    pub fn compute(faces: &[SyntheticFace]) -> Option<Self> {
        if faces.is_empty() {
            return None;
        }

        let (mut min_area, mut max_area, mut total) = (f32::INFINITY, f32::NEG_INFINITY, 0.0f64);
        for face in faces {
            min_area = min_area.min(face.area());
            max_area = max_area.max(face.area());
            total += f64::from(face.area());
        }
        let average_area = (total / faces.len() as f64) as f32;

        let mut refined_min = f32::INFINITY;
        let mut refined_total = 0.0f64;
        let mut face_count = 0usize;
        for face in faces {
            let area = face.area();
            if area > 0.0 && area <= average_area {
                refined_min = refined_min.min(area);
                refined_total += f64::from(area);
                face_count += 1;
            }
        }

        let refined = (face_count > 0).then(|| RefinedBand {
            min_area: refined_min,
            average_area: ((refined_total / face_count as f64) as f32).max(refined_min),
            face_count,
        });

        Some(Self {
            min_area,
            max_area,
            average_area,
            refined,
        })
    }
}

/// Settings needed to construct a [`FeatureClassifier`]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    pub strategy: Strategy,
    pub table: ThresholdTable,
    pub area_match: AreaMatch,
}

/// Per-point flags produced by one classification pass
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    flags: Vec<FeatureFlags>,
    area_statistics: Option<AreaStatistics>,
}

impl Classification {
    pub fn flags(&self) -> &[FeatureFlags] {
        &self.flags
    }

    pub fn flag(&self, point: usize) -> FeatureFlags {
        self.flags[point]
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Present only for the area-statistics strategy on a non-empty mesh
    pub fn area_statistics(&self) -> Option<&AreaStatistics> {
        self.area_statistics.as_ref()
    }

    pub fn summary(&self) -> ClassificationSummary {
        let count = |category: Category| self.flags.iter().filter(|f| f.has(category)).count();
        let flagged = self.flags.iter().filter(|f| !f.is_empty()).count();

        ClassificationSummary {
            points: self.flags.len(),
            contour: count(Category::Contour),
            border: count(Category::Border),
            border1: count(Category::Border1),
            flagged,
            unflagged: self.flags.len() - flagged,
        }
    }
}

/// Category counts for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassificationSummary {
    pub points: usize,
    pub contour: usize,
    pub border: usize,
    pub border1: usize,
    pub flagged: usize,
    pub unflagged: usize,
}

/// Classifies feature points of a [`Topology`]
#[derive(Debug, Clone)]
pub struct FeatureClassifier {
    strategy: Strategy,
    bands: BandTable,
    area_match: AreaMatch,
}

impl Default for FeatureClassifier {
    fn default() -> Self {
        Self::new(Strategy::EdgeAngle, BandTable::table_one())
    }
}

impl FeatureClassifier {
    pub fn new(strategy: Strategy, bands: BandTable) -> Self {
        Self {
            strategy,
            bands,
            area_match: AreaMatch::default(),
        }
    }

    pub fn from_settings(settings: &ClassifierSettings) -> Self {
        Self::new(settings.strategy, settings.table.bands()).with_area_match(settings.area_match)
    }

    pub fn with_area_match(mut self, area_match: AreaMatch) -> Self {
        self.area_match = area_match;
        self
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Run one classification pass; the topology is not modified
    pub fn classify(&self, topology: &Topology) -> Classification {
        let mut flags = vec![FeatureFlags::EMPTY; topology.len()];

        for (point, flags) in flags.iter_mut().enumerate() {
            self.apply_edge_angle(topology, point, flags);
        }

        let area_statistics = match self.strategy {
            Strategy::EdgeAngle => None,
            Strategy::AreaStatistics => AreaStatistics::compute(topology.faces()),
        };

        if let Some(refined) = area_statistics.as_ref().and_then(|stats| stats.refined) {
            for (point, flags) in flags.iter_mut().enumerate() {
                if self.matches_area_band(topology, point, &refined) {
                    flags.insert(FeatureFlags::CONTOUR);
                }
            }
        }

        let classification = Classification {
            flags,
            area_statistics,
        };

        let summary = classification.summary();
        tracing::debug!(
            strategy = ?self.strategy,
            points = summary.points,
            contour = summary.contour,
            border = summary.border,
            border1 = summary.border1,
            "classified feature points"
        );

        classification
    }

    fn apply_edge_angle(&self, topology: &Topology, point: usize, flags: &mut FeatureFlags) {
        let faces = topology.point(point).faces();
        for (i, &a) in faces.iter().enumerate() {
            for &b in &faces[i + 1..] {
                let length = cross_length(topology.face(a).normal(), topology.face(b).normal());
                flags.insert(self.bands.flags_for(length));
            }
        }
    }

    fn matches_area_band(&self, topology: &Topology, point: usize, refined: &RefinedBand) -> bool {
        match self.area_match {
            AreaMatch::AnyRegisteredFace => topology.faces_of(point).any(|face| {
                face.area() > refined.min_area && face.area() <= refined.average_area
            }),
            AreaMatch::OwnedFace => {
                let area = topology.owned_face(point).area();
                area >= refined.min_area && area <= refined.average_area
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::topology::{Sampling, TopologyBuilder};
    use crate::geometry::{Primitive, TriangleSoup};
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    /// Size-10 cube with one triangle scaled about its centroid
    fn cube_with_shrunken_triangle(triangle: usize, factor: f32) -> TriangleSoup {
        let mut soup = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), true).to_soup();
        let corners = soup.triangle(triangle);
        let centroid = Point3::from((corners[0].coords + corners[1].coords + corners[2].coords) / 3.0);
        for (k, corner) in corners.iter().enumerate() {
            let shrunk = centroid + (*corner - centroid) * factor;
            let start = 9 * triangle + 3 * k;
            soup.positions[start..start + 3].copy_from_slice(&[shrunk.x, shrunk.y, shrunk.z]);
        }
        soup
    }

    fn area_flagged(edge_only: &Classification, with_area: &Classification) -> Vec<usize> {
        (0..edge_only.len())
            .filter(|&p| edge_only.flag(p) != with_area.flag(p))
            .collect()
    }

    #[test]
    fn test_table_one_bands() {
        let table = BandTable::table_one();
        assert!(table.flags_for(0.0).is_empty());
        assert!(table.flags_for(0.039).is_empty());
        assert_eq!(table.flags_for(0.04), FeatureFlags::BORDER);
        assert_eq!(table.flags_for(0.6), FeatureFlags::CONTOUR);
        assert_eq!(table.flags_for(0.8), FeatureFlags::BORDER1);
        assert!(table.flags_for(1.0).is_empty());
    }

    #[test]
    fn test_shared_boundary_sets_both_flags() {
        let table = BandTable::table_one();
        assert_eq!(
            table.flags_for(0.5),
            FeatureFlags::BORDER | FeatureFlags::CONTOUR
        );
        assert_eq!(
            table.flags_for(0.7),
            FeatureFlags::CONTOUR | FeatureFlags::BORDER1
        );
        assert_eq!(
            BandTable::table_two().flags_for(0.8),
            FeatureFlags::BORDER | FeatureFlags::BORDER1
        );
    }

    #[test]
    fn test_cross_length_limits() {
        let x = Vector3::x();
        assert_eq!(cross_length(&x, &x), 0.0);
        assert_relative_eq!(cross_length(&x, &Vector3::y()), 1.0);

        // Perpendicular normals land in the top band of table two
        assert_eq!(BandTable::table_two().flags_for(1.0), FeatureFlags::BORDER1);
        assert!(BandTable::table_two().flags_for(0.0).is_empty());
    }

    #[test]
    fn test_area_statistics_refined_band() {
        let soup = Primitive::sphere(4.0, 10).to_soup();
        let topology = TopologyBuilder::default().build(&soup);
        let stats = AreaStatistics::compute(topology.faces()).unwrap();

        assert!(stats.min_area <= stats.average_area);
        assert!(stats.average_area <= stats.max_area);
        let refined = stats.refined.unwrap();
        assert!(refined.min_area <= refined.average_area);
        assert!(refined.average_area <= stats.average_area);
    }

    #[test]
    fn test_all_zero_area_has_no_refined_band() {
        let soup = crate::geometry::TriangleSoup::new(vec![2.0; 27], vec![0.0; 27]);
        let topology = TopologyBuilder::default().build(&soup);
        let stats = AreaStatistics::compute(topology.faces()).unwrap();

        assert_eq!(stats.average_area, 0.0);
        assert!(stats.refined.is_none());

        let classification =
            FeatureClassifier::new(Strategy::AreaStatistics, BandTable::table_one()).classify(&topology);
        assert!(classification.flags().iter().all(|f| f.is_empty()));
    }

    #[test]
    fn test_outlier_face_flags_only_its_owner() {
        let soup = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), true).to_soup();
        let mut topology = TopologyBuilder::default().build(&soup);
        assert_eq!(topology.len(), 12);

        for face in 0..topology.len() {
            topology.set_face_area(face, 50.0);
        }
        topology.set_face_area(7, 0.01);

        let edge_only = FeatureClassifier::new(Strategy::EdgeAngle, BandTable::table_one())
            .classify(&topology);
        let with_area = FeatureClassifier::new(Strategy::AreaStatistics, BandTable::table_one())
            .with_area_match(AreaMatch::OwnedFace)
            .classify(&topology);

        let refined = with_area.area_statistics().unwrap().refined.unwrap();
        assert_eq!(refined.face_count, 1);
        assert_relative_eq!(refined.min_area, 0.01);

        assert!(with_area.flag(7).has(Category::Contour));
        for point in (0..topology.len()).filter(|&p| p != 7) {
            assert_eq!(with_area.flag(point), edge_only.flag(point), "point {point}");
        }
    }

    #[test]
    fn test_any_registered_face_excludes_refined_minimum() {
        let soup = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), true).to_soup();
        let mut topology = TopologyBuilder::default().build(&soup);
        for face in 0..topology.len() {
            topology.set_face_area(face, 50.0);
        }
        topology.set_face_area(7, 0.01);

        let edge_only = FeatureClassifier::new(Strategy::EdgeAngle, BandTable::table_one())
            .classify(&topology);
        let with_area = FeatureClassifier::new(Strategy::AreaStatistics, BandTable::table_one())
            .classify(&topology);

        // The only restricted face sits on the open end of the band
        assert_eq!(edge_only.flags(), with_area.flags());
    }

    #[test]
    fn test_shrunken_triangle_is_flagged_from_geometry() {
        let soup = cube_with_shrunken_triangle(2, 0.01);
        let topology = TopologyBuilder::default()
            .with_sampling(Sampling::VertexStride)
            .build(&soup);
        assert_eq!(topology.len(), 12);
        // Points 6, 7 and 8 are the shrunken corners, so face 7 is that triangle
        assert_relative_eq!(topology.face(7).area(), 0.005, epsilon = 1e-5);

        let edge_only = FeatureClassifier::new(Strategy::EdgeAngle, BandTable::table_one())
            .classify(&topology);
        let owned = FeatureClassifier::new(Strategy::AreaStatistics, BandTable::table_one())
            .with_area_match(AreaMatch::OwnedFace)
            .classify(&topology);

        let refined = owned.area_statistics().unwrap().refined.unwrap();
        assert_eq!(refined.face_count, 4);
        assert_eq!(refined.min_area, topology.face(7).area());
        assert!(owned.flag(7).has(Category::Contour));
        assert_eq!(area_flagged(&edge_only, &owned), vec![6, 7, 8]);

        let any = FeatureClassifier::new(Strategy::AreaStatistics, BandTable::table_one())
            .classify(&topology);
        assert_eq!(area_flagged(&edge_only, &any), vec![5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_shrunken_triangle_is_invisible_to_first_vertex_sampling() {
        let soup = cube_with_shrunken_triangle(2, 0.01);
        let topology = TopologyBuilder::default().build(&soup);

        let edge_only = FeatureClassifier::new(Strategy::EdgeAngle, BandTable::table_one())
            .classify(&topology);
        let owned = FeatureClassifier::new(Strategy::AreaStatistics, BandTable::table_one())
            .with_area_match(AreaMatch::OwnedFace)
            .classify(&topology);

        // Only the faces touching the moved corner have area, and both exceed the mean
        assert!(owned.area_statistics().unwrap().refined.is_none());
        assert!(area_flagged(&edge_only, &owned).is_empty());
    }

    #[test]
    fn test_summary_counts() {
        let soup = Primitive::sphere(4.0, 8).to_soup();
        let topology = TopologyBuilder::default().build(&soup);
        let classification = FeatureClassifier::default().classify(&topology);
        let summary = classification.summary();

        assert_eq!(summary.points, topology.len());
        assert_eq!(summary.flagged + summary.unflagged, summary.points);
        assert!(summary.contour <= summary.flagged);
    }
}
