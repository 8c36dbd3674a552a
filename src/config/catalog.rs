//! Catalog configuration loading from catalog.toml
//!
//! This module loads the initial catalog of a salon from a TOML file: colouring
//! materials with their mixing ratios, oxidants, retail products and service
//! templates. The entries are used to seed the database on first run; entries
//! that already exist (by name) are left alone.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default location of the catalog file
pub const DEFAULT_CATALOG_PATH: &str = "catalog.toml";

/// Configuration structure representing the entire catalog.toml file
#[derive(Debug, Default, Deserialize)]
pub struct CatalogConfig {
    /// Colouring materials
    #[serde(default)]
    pub materials: Vec<MaterialConfig>,
    /// Oxidants
    #[serde(default)]
    pub oxidants: Vec<OxidantConfig>,
    /// Retail products
    #[serde(default)]
    pub products: Vec<ProductConfig>,
    /// Service templates
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
}

fn default_input_mode() -> String {
    "shade".to_string()
}

/// Configuration for a single material
#[derive(Debug, Deserialize, Clone)]
pub struct MaterialConfig {
    /// Name of the material
    pub name: String,
    /// `"shade"` (free text) or `"code"` (numeric); defaults to `"shade"`
    #[serde(default = "default_input_mode")]
    pub input_mode: String,
    /// Material side of the default ratio
    pub ratio_material: f64,
    /// Oxidant side of the default ratio
    pub ratio_oxidant: f64,
    /// Other ratios the material may be mixed at
    #[serde(default)]
    pub alternate_ratios: Vec<RatioConfig>,
}

/// A named alternate ratio
#[derive(Debug, Deserialize, Clone)]
pub struct RatioConfig {
    /// Label shown in the ratio picker
    pub label: String,
    /// Material parts
    pub material: f64,
    /// Oxidant parts
    pub oxidant: f64,
}

/// Configuration for a single oxidant
#[derive(Debug, Deserialize, Clone)]
pub struct OxidantConfig {
    /// Name of the oxidant (e.g. "6%")
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

/// Configuration for a single retail product
#[derive(Debug, Deserialize, Clone)]
pub struct ProductConfig {
    /// Name of the product
    pub name: String,
    /// Unit price
    pub price: f64,
}

/// Configuration for a single service template
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    /// Name of the service
    pub name: String,
    /// Bowls a new service starts with; 0 for services without a recipe
    #[serde(default)]
    pub bowls: u32,
}

/// Loads catalog configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read catalog file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse catalog file: {e}"),
    })
}

/// Path of the catalog file: `SALON_CATALOG`, or `./catalog.toml`.
#[must_use]
pub fn get_catalog_path() -> String {
    std::env::var("SALON_CATALOG").unwrap_or_else(|_| DEFAULT_CATALOG_PATH.to_string())
}

/// Loads catalog configuration from the configured location
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_default_config() -> Result<CatalogConfig> {
    load_config(get_catalog_path())
}
