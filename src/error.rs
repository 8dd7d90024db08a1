// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for the outer surfaces of the pipeline
//!
//! The analysis core itself is total: malformed topology, empty statistics and
//! missing meshes all degrade to defined defaults. Only loading, configuration
//! and output can fail.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for archcontour.
#[derive(Debug, Error)]
pub enum ContourError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read STL {path}: {source}")]
    Stl {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("viewport {width}x{height} has no pixels")]
    InvalidViewport { width: u32, height: u32 },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("unsupported intersection query: {0}")]
    UnsupportedQuery(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ContourError>;
