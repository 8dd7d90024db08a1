// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Feature-point ring and synthetic faces
//!
//! Every input triangle becomes one feature point. [`Sampling`] picks the vertex
//! it is read from: the triangle's own first vertex, or vertex `k` for point `k`
//! as when the buffer is walked three floats at a time. Points are linked into
//! a closed ring in buffer order. With [`Adjacency::RingOrder`] each point then
//! owns the face spanned by itself and its two ring neighbours, and that face
//! is registered on all three points.
//! Adjacency therefore follows the order triangles appear in the buffer, not
//! shared edges; [`Adjacency::SharedEdge`] is the geometric alternative.

use crate::geometry::{TriangleSoup, FLOATS_PER_TRIANGLE};
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// How faces are associated with feature points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Adjacency {
    /// Faces from ring neighbours (buffer order)
    #[default]
    RingOrder,
    /// Faces are the real triangles, shared with edge-adjacent triangles
    SharedEdge,
}

/// Which vertex feature point `k` is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sampling {
    /// First vertex of triangle `k` (vertex `3k`)
    #[default]
    TriangleFirstVertex,
    /// Vertex `k`; only the first third of the buffer is read
    VertexStride,
}

impl Sampling {
    fn vertex(self, point: usize) -> usize {
        match self {
            Sampling::TriangleFirstVertex => 3 * point,
            Sampling::VertexStride => point,
        }
    }
}

/// One analysis unit per input triangle
#[derive(Debug, Clone, PartialEq)]
pub struct FeaturePoint {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub prev: usize,
    pub next: usize,
    faces: Vec<usize>,
}

impl FeaturePoint {
    /// Indices of the faces registered on this point
    pub fn faces(&self) -> &[usize] {
        &self.faces
    }
}

/// Face used only for classification; immutable once built
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticFace {
    owner: usize,
    normal: Vector3<f32>,
    area: f32,
}

impl SyntheticFace {
    /// Face spanned by `apex` and the edges towards `b` and `c`.
    ///
    /// The normal is `(b - apex) x (c - apex)` normalized, or zero for a
    /// degenerate face.
    pub fn from_corners(owner: usize, apex: &Point3<f32>, b: &Point3<f32>, c: &Point3<f32>) -> Self {
        let cross = (b - apex).cross(&(c - apex));
        let length = cross.norm();
        let normal = if length > f32::EPSILON {
            cross / length
        } else {
            Vector3::zeros()
        };

        Self {
            owner,
            normal,
            area: length * 0.5,
        }
    }

    /// Feature point this face is the primary face of
    pub fn owner(&self) -> usize {
        self.owner
    }

    pub fn normal(&self) -> &Vector3<f32> {
        &self.normal
    }

    pub fn area(&self) -> f32 {
        self.area
    }
}

/// Ring of feature points plus their synthetic faces.
///
/// Face `i` is always owned by point `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    points: Vec<FeaturePoint>,
    faces: Vec<SyntheticFace>,
    adjacency: Adjacency,
}

impl Topology {
    pub fn empty(adjacency: Adjacency) -> Self {
        Self {
            points: Vec::new(),
            faces: Vec::new(),
            adjacency,
        }
    }

    pub fn points(&self) -> &[FeaturePoint] {
        &self.points
    }

    pub fn faces(&self) -> &[SyntheticFace] {
        &self.faces
    }

    pub fn point(&self, index: usize) -> &FeaturePoint {
        &self.points[index]
    }

    pub fn face(&self, index: usize) -> &SyntheticFace {
        &self.faces[index]
    }

    /// The face point `index` is the primary vertex of
    pub fn owned_face(&self, index: usize) -> &SyntheticFace {
        &self.faces[index]
    }

    /// Faces registered on point `index`
    pub fn faces_of(&self, index: usize) -> impl Iterator<Item = &SyntheticFace> + '_ {
        self.points[index].faces.iter().map(move |&f| &self.faces[f])
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn adjacency(&self) -> Adjacency {
        self.adjacency
    }

    /// Check that `prev`/`next` form one closed cycle in index order
    pub fn is_closed_ring(&self) -> bool {
        let n = self.points.len();
        self.points
            .iter()
            .enumerate()
            .all(|(i, p)| p.next == (i + 1) % n && p.prev == (i + n - 1) % n)
    }

    #[cfg(test)]
    pub(crate) fn set_face_area(&mut self, face: usize, area: f32) {
        self.faces[face].area = area;
    }
}

/// Builds a [`Topology`] from a triangle soup
#[derive(Debug, Clone, Copy)]
pub struct TopologyBuilder {
    adjacency: Adjacency,
    sampling: Sampling,
    weld_tolerance: f32,
}

impl Default for TopologyBuilder {
    fn default() -> Self {
        Self::new(Adjacency::RingOrder)
    }
}

impl TopologyBuilder {
    pub const DEFAULT_WELD_TOLERANCE: f32 = 1e-4;

    pub fn new(adjacency: Adjacency) -> Self {
        Self {
            adjacency,
            sampling: Sampling::default(),
            weld_tolerance: Self::DEFAULT_WELD_TOLERANCE,
        }
    }

    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }

    /// Distance under which corners count as the same vertex (shared-edge only)
    pub fn with_weld_tolerance(mut self, tolerance: f32) -> Self {
        self.weld_tolerance = tolerance.max(f32::EPSILON);
        self
    }

    /// Build the ring and faces.
    ///
    /// Empty input and position buffers that are not a whole number of
    /// triangles produce an empty topology.
    pub fn build(&self, soup: &TriangleSoup) -> Topology {
        if soup.positions.is_empty() || soup.positions.len() % FLOATS_PER_TRIANGLE != 0 {
            if !soup.positions.is_empty() {
                tracing::warn!(
                    floats = soup.positions.len(),
                    "position buffer is not a whole number of triangles, skipping analysis"
                );
            }
            return Topology::empty(self.adjacency);
        }

        let mut points = build_ring(soup, self.sampling);
        let faces = match self.adjacency {
            Adjacency::RingOrder => ring_faces(&mut points),
            Adjacency::SharedEdge => shared_edge_faces(soup, &mut points, self.weld_tolerance),
        };

        tracing::debug!(
            points = points.len(),
            faces = faces.len(),
            adjacency = ?self.adjacency,
            sampling = ?self.sampling,
            "built feature topology"
        );

        Topology {
            points,
            faces,
            adjacency: self.adjacency,
        }
    }
}

fn build_ring(soup: &TriangleSoup, sampling: Sampling) -> Vec<FeaturePoint> {
    let n = soup.triangle_count();
    (0..n)
        .map(|i| FeaturePoint {
            position: soup.position(sampling.vertex(i)),
            normal: soup.normal(sampling.vertex(i)),
            prev: if i == 0 { n - 1 } else { i - 1 },
            next: if i + 1 == n { 0 } else { i + 1 },
            faces: Vec::with_capacity(3),
        })
        .collect()
}

fn ring_faces(points: &mut [FeaturePoint]) -> Vec<SyntheticFace> {
    let mut faces = Vec::with_capacity(points.len());

    for i in 0..points.len() {
        let (prev, next) = (points[i].prev, points[i].next);
        let face = SyntheticFace::from_corners(
            i,
            &points[i].position,
            &points[prev].position,
            &points[next].position,
        );

        let index = faces.len();
        faces.push(face);
        points[i].faces.push(index);
        points[prev].faces.push(index);
        points[next].faces.push(index);
    }

    faces
}

type CornerKey = [i64; 3];

fn shared_edge_faces(
    soup: &TriangleSoup,
    points: &mut [FeaturePoint],
    tolerance: f32,
) -> Vec<SyntheticFace> {
    let quantize = |p: Point3<f32>| -> CornerKey {
        [p.x, p.y, p.z].map(|c| (c / tolerance).round() as i64)
    };

    let mut faces = Vec::with_capacity(points.len());
    let mut edges: AHashMap<(CornerKey, CornerKey), Vec<usize>> = AHashMap::new();

    for (t, point) in points.iter_mut().enumerate() {
        let [a, b, c] = soup.triangle(t);
        faces.push(SyntheticFace::from_corners(t, &a, &b, &c));
        point.faces.push(t);

        let keys = [a, b, c].map(quantize);
        for k in 0..3 {
            let (from, to) = (keys[k], keys[(k + 1) % 3]);
            if from == to {
                continue;
            }
            let key = if from < to { (from, to) } else { (to, from) };
            edges.entry(key).or_default().push(t);
        }
    }

    let mut neighbours: Vec<Vec<usize>> = vec![Vec::new(); points.len()];
    for triangles in edges.values() {
        for &a in triangles {
            for &b in triangles {
                if a != b {
                    neighbours[a].push(b);
                }
            }
        }
    }

    for (point, mut adjacent) in points.iter_mut().zip(neighbours) {
        adjacent.sort_unstable();
        adjacent.dedup();
        point.faces.extend(adjacent);
    }

    faces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_and_partial_input_give_empty_ring() {
        let builder = TopologyBuilder::default();
        assert!(builder.build(&TriangleSoup::empty()).is_empty());

        let partial = TriangleSoup::new(vec![0.0; 12], vec![0.0; 12]);
        assert!(builder.build(&partial).is_empty());
    }

    #[test]
    fn test_single_triangle_closes_on_itself() {
        let soup = TriangleSoup::new(vec![1.0; 9], vec![0.0; 9]);
        let topology = TopologyBuilder::default().build(&soup);

        assert_eq!(topology.len(), 1);
        let point = topology.point(0);
        assert_eq!(point.prev, 0);
        assert_eq!(point.next, 0);
        assert_eq!(point.faces(), &[0, 0, 0]);
        assert_eq!(topology.face(0).area(), 0.0);
        assert_eq!(*topology.face(0).normal(), Vector3::zeros());
    }

    #[test]
    fn test_points_sample_first_vertex_of_each_triangle() {
        let soup = Primitive::cube(Vector3::new(2.0, 2.0, 2.0), false).to_soup();
        let topology = TopologyBuilder::default().build(&soup);

        for (t, point) in topology.points().iter().enumerate() {
            assert_eq!(point.position, soup.triangle(t)[0]);
            assert_eq!(point.normal, soup.normal(3 * t));
        }
    }

    #[test]
    fn test_vertex_stride_sampling_reads_consecutive_vertices() {
        let soup = Primitive::cube(Vector3::new(2.0, 2.0, 2.0), true).to_soup();
        let topology = TopologyBuilder::default()
            .with_sampling(Sampling::VertexStride)
            .build(&soup);

        assert_eq!(topology.len(), soup.triangle_count());
        assert!(topology.is_closed_ring());
        for (k, point) in topology.points().iter().enumerate() {
            assert_eq!(point.position, soup.position(k));
            assert_eq!(point.normal, soup.normal(k));
        }
    }

    #[test]
    fn test_cube_ring_faces_depend_on_sampling() {
        let soup = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), true).to_soup();

        // Paired cube triangles share their first corner
        let per_triangle = TopologyBuilder::default().build(&soup);
        assert!(per_triangle.faces().iter().all(|face| face.area() == 0.0));

        let stride = TopologyBuilder::default()
            .with_sampling(Sampling::VertexStride)
            .build(&soup);
        assert_relative_eq!(stride.face(1).area(), 50.0, epsilon = 1e-3);
        assert_relative_eq!(stride.face(0).area(), 50.0 * 2f32.sqrt(), epsilon = 1e-3);
        assert_eq!(stride.face(3).area(), 0.0);
    }

    #[test]
    fn test_ring_face_registration() {
        let soup = Primitive::sphere(3.0, 6).to_soup();
        let topology = TopologyBuilder::default().build(&soup);
        let n = topology.len();

        assert_eq!(topology.faces().len(), n);
        assert!(topology.is_closed_ring());
        for (i, point) in topology.points().iter().enumerate() {
            let mut registered = point.faces().to_vec();
            registered.sort_unstable();
            let mut expected = vec![(i + n - 1) % n, i, (i + 1) % n];
            expected.sort_unstable();

            assert_eq!(registered, expected);
            assert_eq!(topology.owned_face(i).owner(), i);
        }
    }

    #[test]
    fn test_face_normal_and_area() {
        let apex = Point3::new(0.0, 0.0, 0.0);
        let face = SyntheticFace::from_corners(
            0,
            &apex,
            &Point3::new(2.0, 0.0, 0.0),
            &Point3::new(0.0, 2.0, 0.0),
        );

        assert_relative_eq!(face.area(), 2.0);
        assert_relative_eq!(*face.normal(), Vector3::z());
    }

    #[test]
    fn test_shared_edge_neighbours_on_quad() {
        let soup = Primitive::quad(2.0, 2.0).to_soup();
        let topology = TopologyBuilder::new(Adjacency::SharedEdge).build(&soup);

        assert_eq!(topology.len(), 2);
        assert!(topology.is_closed_ring());
        assert_eq!(topology.point(0).faces(), &[0, 1]);
        assert_eq!(topology.point(1).faces(), &[1, 0]);
        assert_relative_eq!(topology.face(0).area(), 2.0);
    }

    #[test]
    fn test_shared_edge_cube_has_three_neighbours() {
        let soup = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), true).to_soup();
        let topology = TopologyBuilder::new(Adjacency::SharedEdge).build(&soup);

        for point in topology.points() {
            assert_eq!(point.faces().len(), 4);
        }
    }
}
