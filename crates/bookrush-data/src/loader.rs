//! Resolution pipeline: reads shelf data files and builds engine types.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and the
//! resolution step that turns [`StoreData`] into a validated
//! [`Catalog`] plus a weighted [`Spawner`].

use crate::schema::StoreData;
use bookrush_core::catalog::{Catalog, CatalogBuilder, CatalogError, Color, CoverDef};
use bookrush_core::fixed::f64_to_fixed64;
use bookrush_core::id::GenreId;
use bookrush_core::spawner::{SpawnError, Spawner};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while loading shop data.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {origin}: {detail}")]
    Parse { origin: String, detail: String },

    /// The shelf content failed catalog validation.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The weight table failed spawner validation.
    #[error(transparent)]
    Spawner(#[from] SpawnError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (no extension).
///
/// Looks for `{base_name}.ron`, `{base_name}.toml`, and `{base_name}.json`.
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// multiple formats exist for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let extensions = ["ron", "toml", "json"];
    let mut found: Option<PathBuf> = None;

    for ext in &extensions {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(ref existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing.clone(),
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but errors when no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Deserialize a string according to an explicit format. `origin` labels the
/// source in error messages (a path, "embedded", ...).
pub fn deserialize_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    origin: &str,
) -> Result<T, DataLoadError> {
    let parse_error = |detail: String| DataLoadError::Parse {
        origin: origin.to_string(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
    }
}

/// Read a file and deserialize it according to its extension.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    deserialize_str(&content, format, &path.display().to_string())
}

/// Load a store definition from a data file.
pub fn load_store(path: &Path) -> Result<StoreData, DataLoadError> {
    deserialize_file(path)
}

/// Load a store definition from in-memory content (embedded defaults).
pub fn load_store_str(content: &str, format: Format) -> Result<StoreData, DataLoadError> {
    deserialize_str(content, format, "embedded store data")
}

// ===========================================================================
// Resolution
// ===========================================================================

/// Resolve a store definition into a validated catalog and spawner.
pub fn resolve(data: &StoreData) -> Result<(Catalog, Spawner), DataLoadError> {
    let mut builder = CatalogBuilder::new();
    let mut weights: Vec<(GenreId, f64)> = Vec::new();

    for shelf in &data.shelves {
        let display_name = shelf
            .display_name
            .clone()
            .unwrap_or_else(|| format!("{} Shelf", shelf.genre));
        let covers: Vec<CoverDef> = shelf
            .covers
            .iter()
            .map(|cover| {
                let (r, g, b) = cover.color;
                CoverDef::new(&cover.name, Color::rgb(r, g, b))
            })
            .collect();
        let genre = builder.register_shelf(&shelf.genre, &display_name, covers);
        if let Some(weight) = shelf.weight {
            weights.push((genre, weight));
        }
    }

    let catalog = builder.build()?;
    let spawner = Spawner::with_weights(
        weights
            .into_iter()
            .map(|(genre, weight)| (genre, f64_to_fixed64(weight)))
            .collect(),
    )?;

    Ok((catalog, spawner))
}

/// Convenience: load and resolve in one call.
pub fn load_shop(path: &Path) -> Result<(Catalog, Spawner), DataLoadError> {
    let store = load_store(path)?;
    resolve(&store)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bookrush_core::catalog::RESERVED_GENRE;
    use bookrush_core::rng::SimRng;

    const STORE_RON: &str = r#"
        (
            shelves: [
                (
                    genre: "Fantasy",
                    covers: [
                        (name: "Dragon", color: (0.2, 0.4, 0.8)),
                        (name: "Sword", color: (0.6, 0.6, 0.6)),
                    ],
                    weight: Some(0.5),
                ),
                (
                    genre: "Romance",
                    covers: [(name: "Rose", color: (0.9, 0.1, 0.4))],
                    weight: Some(0.5),
                ),
                (
                    genre: "General",
                    covers: [(name: "Plain")],
                ),
            ],
        )
    "#;

    #[test]
    fn resolve_builds_catalog_and_spawner() {
        let store = load_store_str(STORE_RON, Format::Ron).unwrap();
        let (catalog, spawner) = resolve(&store).unwrap();

        assert_eq!(catalog.shelf_count(), 3);
        assert_eq!(catalog.orderable_shelves().len(), 2);
        assert!(catalog.genre_id(RESERVED_GENRE).is_some());

        // The weighted spawner draws from both orderable shelves.
        let mut rng = SimRng::new(5);
        let mut genres = std::collections::HashSet::new();
        for _ in 0..200 {
            genres.insert(spawner.draw_order(&catalog, &mut rng).unwrap().genre);
        }
        assert_eq!(genres.len(), 2);
    }

    #[test]
    fn duplicate_genres_fail_resolution() {
        let content = r#"
            (shelves: [
                (genre: "Fantasy", covers: [(name: "Dragon")]),
                (genre: "Fantasy", covers: [(name: "Sword")]),
            ])
        "#;
        let store = load_store_str(content, Format::Ron).unwrap();
        assert!(matches!(
            resolve(&store),
            Err(DataLoadError::Catalog(CatalogError::DuplicateGenre(_)))
        ));
    }

    #[test]
    fn coverless_shelf_fails_resolution() {
        let content = r#"(shelves: [(genre: "Fantasy", covers: [])])"#;
        let store = load_store_str(content, Format::Ron).unwrap();
        assert!(matches!(
            resolve(&store),
            Err(DataLoadError::Catalog(CatalogError::NoCovers(_)))
        ));
    }

    #[test]
    fn negative_weight_fails_resolution() {
        let content = r#"
            (shelves: [
                (genre: "Fantasy", covers: [(name: "Dragon")], weight: Some(-1.0)),
            ])
        "#;
        let store = load_store_str(content, Format::Ron).unwrap();
        assert!(matches!(
            resolve(&store),
            Err(DataLoadError::Spawner(SpawnError::InvalidWeight(_)))
        ));
    }

    #[test]
    fn parse_errors_name_their_origin() {
        let err = load_store_str("not ron at all", Format::Ron).unwrap_err();
        match err {
            DataLoadError::Parse { origin, .. } => assert_eq!(origin, "embedded store data"),
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("shop.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("shop.json")).unwrap(), Format::Json);
        assert_eq!(detect_format(Path::new("shop.toml")).unwrap(), Format::Toml);
        assert!(detect_format(Path::new("shop.yaml")).is_err());
        assert!(detect_format(Path::new("shop")).is_err());
    }

    #[test]
    fn find_data_file_discovers_and_conflicts() {
        let dir = std::env::temp_dir().join("bookrush-data-test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        assert!(find_data_file(&dir, "store").unwrap().is_none());
        assert!(matches!(
            require_data_file(&dir, "store"),
            Err(DataLoadError::MissingRequired { .. })
        ));

        std::fs::write(dir.join("store.ron"), STORE_RON).unwrap();
        let found = find_data_file(&dir, "store").unwrap().unwrap();
        assert_eq!(found, dir.join("store.ron"));

        let (catalog, _) = load_shop(&found).unwrap();
        assert_eq!(catalog.shelf_count(), 3);

        std::fs::write(dir.join("store.json"), "{}").unwrap();
        assert!(matches!(
            find_data_file(&dir, "store"),
            Err(DataLoadError::ConflictingFormats { .. })
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
