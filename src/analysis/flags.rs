// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Per-point classification categories

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// One of the three highlight categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Contour,
    Border,
    Border1,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Contour, Category::Border, Category::Border1];

    pub fn flag(self) -> FeatureFlags {
        match self {
            Category::Contour => FeatureFlags::CONTOUR,
            Category::Border => FeatureFlags::BORDER,
            Category::Border1 => FeatureFlags::BORDER1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Contour => "contour",
            Category::Border => "border",
            Category::Border1 => "border1",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Independent category bits of one feature point.
///
/// Bits are only ever added during a classification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureFlags(u8);

impl FeatureFlags {
    pub const EMPTY: FeatureFlags = FeatureFlags(0);
    pub const CONTOUR: FeatureFlags = FeatureFlags(1 << 0);
    pub const BORDER: FeatureFlags = FeatureFlags(1 << 1);
    pub const BORDER1: FeatureFlags = FeatureFlags(1 << 2);

    pub fn insert(&mut self, other: FeatureFlags) {
        self.0 |= other.0;
    }

    pub fn contains(self, other: FeatureFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn has(self, category: Category) -> bool {
        self.contains(category.flag())
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of active categories (0..=3)
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Attribute value for `category`: 1.0 when set, 0.0 otherwise
    pub fn value(self, category: Category) -> f32 {
        if self.has(category) {
            1.0
        } else {
            0.0
        }
    }
}

impl BitOr for FeatureFlags {
    type Output = FeatureFlags;

    fn bitor(self, rhs: FeatureFlags) -> FeatureFlags {
        FeatureFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for FeatureFlags {
    fn bitor_assign(&mut self, rhs: FeatureFlags) {
        self.insert(rhs);
    }
}
