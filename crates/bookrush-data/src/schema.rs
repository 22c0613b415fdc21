//! Serde data file structs for shop content definitions.
//!
//! These structs define the on-disk format for shelves. They are
//! deserialized from RON, JSON, or TOML data files and then resolved into
//! engine types by the loader.

use serde::Deserialize;

/// Top-level shop definition: one entry per shelf.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreData {
    pub shelves: Vec<ShelfData>,
}

/// A shelf definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ShelfData {
    pub genre: String,
    /// Defaults to "<genre> Shelf" when omitted.
    #[serde(default)]
    pub display_name: Option<String>,
    pub covers: Vec<CoverData>,
    /// Spawn weight. Only takes effect when exactly two orderable shelves
    /// exist and both carry a weight.
    #[serde(default)]
    pub weight: Option<f64>,
}

/// A cover on a shelf.
#[derive(Debug, Clone, Deserialize)]
pub struct CoverData {
    pub name: String,
    /// RGB in [0, 1]. White when omitted.
    #[serde(default = "default_color")]
    pub color: (f32, f32, f32),
}

fn default_color() -> (f32, f32, f32) {
    (1.0, 1.0, 1.0)
}
