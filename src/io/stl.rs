// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL import and export

use crate::error::{ContourError, Result};
use crate::geometry::TriangleSoup;
use nalgebra::{Point3, Vector3};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use stl_io::{read_stl, Normal, Triangle as StlTriangle, Vertex as StlVertex};

/// Read an ASCII or binary STL file into flat buffers.
///
/// Triangles keep the order of the file. Faces stored without a usable
/// normal get one computed from their corners.
pub fn load_stl(path: impl AsRef<Path>) -> Result<TriangleSoup> {
    let path = path.as_ref();
    let stl_error = |source| ContourError::Stl {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(stl_error)?;
    let stl = read_stl(&mut file).map_err(stl_error)?;

    let mut soup = TriangleSoup::with_capacity(stl.faces.len());
    let mut missing_normals = false;
    for face in &stl.faces {
        let corners = face.vertices.map(|index| {
            let v = &stl.vertices[index];
            Point3::new(v[0], v[1], v[2])
        });
        let normal = Vector3::new(face.normal[0], face.normal[1], face.normal[2]);
        missing_normals |= normal.norm_squared() <= f32::EPSILON;
        soup.push_triangle(corners, normal);
    }

    if missing_normals {
        soup.compute_flat_normals();
    }

    tracing::info!(
        path = %path.display(),
        triangles = soup.triangle_count(),
        "loaded STL"
    );
    Ok(soup)
}

/// Write `soup` as a binary STL file with one flat normal per face
pub fn save_stl(soup: &TriangleSoup, path: impl AsRef<Path>) -> Result<()> {
    let mut flat = soup.clone();
    flat.compute_flat_normals();

    let triangles: Vec<StlTriangle> = (0..flat.triangle_count())
        .map(|t| {
            let [a, b, c] = flat.triangle(t);
            let normal = flat.normal(3 * t);
            StlTriangle {
                normal: Normal::new([normal.x, normal.y, normal.z]),
                vertices: [
                    StlVertex::new([a.x, a.y, a.z]),
                    StlVertex::new([b.x, b.y, b.z]),
                    StlVertex::new([c.x, c.y, c.z]),
                ],
            }
        })
        .collect();

    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    stl_io::write_stl(&mut writer, triangles.iter())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_ascii_stl() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            "solid tri
  facet normal 0 0 0
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid tri"
        )?;

        let soup = load_stl(file.path())?;
        assert_eq!(soup.triangle_count(), 1);
        assert_eq!(soup.position(1), Point3::new(1.0, 0.0, 0.0));
        // Zero normal in the file is recomputed
        assert_eq!(soup.normal(0), Vector3::new(0.0, 0.0, 1.0));
        Ok(())
    }

    #[test]
    fn test_binary_round_trip_keeps_triangle_order() -> Result<()> {
        let cube = Primitive::cube(Vector3::new(2.0, 2.0, 2.0), true).to_soup();
        let file = NamedTempFile::new()?;
        save_stl(&cube, file.path())?;

        let loaded = load_stl(file.path())?;
        assert_eq!(loaded.triangle_count(), cube.triangle_count());
        for t in 0..cube.triangle_count() {
            assert_eq!(loaded.triangle(t), cube.triangle(t));
        }
        Ok(())
    }

    #[test]
    fn test_missing_file_is_stl_error() {
        let err = load_stl("/nonexistent/scan.stl").unwrap_err();
        assert!(matches!(err, ContourError::Stl { .. }));
    }
}
