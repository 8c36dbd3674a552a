//! Mixing ratios and the ratio resolver.
//!
//! A [`MixingRatio`] says how many parts of oxidant a number of parts of colouring
//! material needs (e.g. `1:1.5`). Both parts are strictly positive and finite;
//! the constructor is the only way to build one.

use crate::{
    core::catalog::CatalogMaterial,
    errors::{Error, Result},
};
use serde::Serialize;
use std::fmt;

/// A `material : oxidant` mixing ratio with positive, finite parts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MixingRatio {
    material_parts: f64,
    oxidant_parts: f64,
}

impl MixingRatio {
    /// The `1:1` ratio.
    pub const ONE_TO_ONE: Self = Self {
        material_parts: 1.0,
        oxidant_parts: 1.0,
    };

    /// Builds a ratio, rejecting zero, negative and non-finite parts.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRatio`] if either part is not a positive finite number.
    pub fn new(material_parts: f64, oxidant_parts: f64) -> Result<Self> {
        let valid = |p: f64| p.is_finite() && p > 0.0;
        if !valid(material_parts) || !valid(oxidant_parts) {
            return Err(Error::InvalidRatio {
                material_parts,
                oxidant_parts,
            });
        }
        Ok(Self {
            material_parts,
            oxidant_parts,
        })
    }

    /// Material side of the ratio.
    #[must_use]
    pub const fn material_parts(self) -> f64 {
        self.material_parts
    }

    /// Oxidant side of the ratio.
    #[must_use]
    pub const fn oxidant_parts(self) -> f64 {
        self.oxidant_parts
    }

    /// Unrounded grams of oxidant required for `material_grams` of material.
    #[must_use]
    pub fn oxidant_for(self, material_grams: f64) -> f64 {
        material_grams * self.oxidant_parts / self.material_parts
    }
}

impl fmt::Display for MixingRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.material_parts, self.oxidant_parts)
    }
}

/// An alternate ratio offered by a material, e.g. "high lift 1:2".
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NamedRatio {
    /// Label shown next to the ratio
    pub label: String,
    /// The ratio itself
    pub ratio: MixingRatio,
}

/// Resolves the effective ratio for a material.
///
/// A requested ratio is returned verbatim when it is the material's default or
/// one of its alternates; anything else falls back to the default.
#[must_use]
pub fn resolve(material: &CatalogMaterial, requested: Option<MixingRatio>) -> MixingRatio {
    match requested {
        Some(ratio) if material.offers(ratio) => ratio,
        _ => material.default_ratio,
    }
}
