// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! End-to-end checks of loading, collision, compositing and configuration

use anyhow::Result;
use archcontour::analysis::{Band, Category, Sampling, ThresholdTable};
use archcontour::config::ViewConfig;
use archcontour::geometry::{Primitive, Transform, TriangleSoup};
use archcontour::render::Texture;
use archcontour::{io, CollisionProbe, ContourView};
use nalgebra::Vector3;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn config() -> ViewConfig {
    ViewConfig {
        width: 96,
        height: 64,
        ..ViewConfig::default()
    }
}

fn cube(size: f32) -> TriangleSoup {
    Primitive::cube(Vector3::new(size, size, size), true).to_soup()
}

fn assert_rgb_matches_base(frame: &Texture, base: &Texture) -> usize {
    let mut covered = 0;
    for y in 0..frame.height() {
        for x in 0..frame.width() {
            let out = frame.texel(x, y);
            let under = base.texel(x, y);
            assert_eq!(&out[..3], &under[..3], "pixel ({x}, {y})");
            if out[3] != 1.0 {
                covered += 1;
            }
        }
    }
    covered
}

#[test]
fn test_collision_of_overlapping_and_separated_cubes() {
    let mut probe = CollisionProbe::new();
    probe.set_primary(&cube(10.0));
    probe.set_opposing(&cube(10.0));

    let primary = Transform {
        rotation_degrees: [-90.0, 45.0, 0.0],
        translation: [1.0, 2.0, 3.0],
    }
    .matrix();
    let overlapping = primary * Transform::from_translation(4.0, 3.0, 0.0).matrix();
    let separated = primary * Transform::from_translation(0.0, 0.0, 30.0).matrix();

    assert!(probe.test(&primary, &overlapping));
    assert!(!probe.test(&primary, &separated));
}

#[test]
fn test_partial_load_renders() {
    let mut only_opposing = ContourView::new(config()).unwrap();
    only_opposing.load_opposing(cube(4.0));
    only_opposing.frame();
    assert!(!only_opposing.collision());
    assert!(only_opposing.classification().is_none());

    let mut only_primary = ContourView::new(config()).unwrap();
    only_primary.load_primary(cube(4.0));
    only_primary.frame();
    assert!(!only_primary.collision());
    assert_eq!(only_primary.classification().unwrap().len(), 12);
}

#[test]
fn test_unclassified_scan_shows_base_pass() {
    let mut view = ContourView::new(config()).unwrap();
    view.load_opposing(Primitive::sphere(3.0, 16).to_soup());

    let frame = view.frame();
    let base = view.last_base().unwrap();
    let covered = assert_rgb_matches_base(&frame, base);
    assert!(covered > 0);
}

#[test]
fn test_planar_quad_end_to_end() {
    let mut config = config();
    config.overlay_alpha = 1.0;
    let mut view = ContourView::new(config).unwrap();
    view.load_primary(Primitive::quad(10.0, 6.0).to_soup());

    let classification = view.classification().unwrap();
    assert_eq!(classification.len(), 2);
    assert_eq!(classification.summary().flagged, 0);

    let frame = view.frame();
    let base = view.last_base().unwrap();
    for y in 0..frame.height() {
        for x in 0..frame.width() {
            assert_eq!(frame.texel(x, y), base.texel(x, y));
        }
    }
}

#[test]
fn test_frames_are_repeatable() {
    let mut view = ContourView::new(config()).unwrap();
    view.load_primary(Primitive::sphere(5.0, 12).to_soup());
    view.load_opposing(cube(3.0));

    let first = view.frame();
    let second = view.frame();
    assert_eq!(first, second);
    assert_eq!(view.frame_count(), 2);
}

#[test]
fn test_config_round_trip() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("archcontour.toml");

    let mut config = config();
    config.highlight_collisions = false;
    config.colors.collision = "#123456".to_string();
    config.opposing_transform = Transform::from_translation(0.0, -2.5, 0.0);
    config.classification.sampling = Sampling::VertexStride;
    config.classification.table = ThresholdTable::Custom(vec![
        Band::new(0.2, 0.6, Category::Border),
        Band::new(0.6, 1.0, Category::Contour),
    ]);
    config.save(&path)?;

    let loaded = ViewConfig::from_file(&path)?;
    assert_eq!(loaded, config);
    Ok(())
}

#[test]
fn test_ascii_stl_into_view() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(
        file,
        "solid strip
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
  facet normal 0 0 1
    outer loop
      vertex 1 0 0
      vertex 1 1 0
      vertex 0 1 0
    endloop
  endfacet
  facet normal 1 0 0
    outer loop
      vertex 1 0 0
      vertex 1 0 1
      vertex 1 1 0
    endloop
  endfacet
endsolid strip"
    )?;

    let soup = io::load_stl(file.path())?;
    assert_eq!(soup.triangle_count(), 3);
    assert_eq!(soup.normal(6), Vector3::new(1.0, 0.0, 0.0));

    let mut view = ContourView::new(config())?;
    view.load_primary(soup);
    assert!(view.topology().unwrap().is_closed_ring());

    let out = TempDir::new()?;
    let png = out.path().join("frame.png");
    io::save_png(&view.frame(), &png)?;
    assert!(png.exists());
    Ok(())
}
