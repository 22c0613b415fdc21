//! The shelf catalog: every (genre, cover, color) combination customers can
//! order and players can pick up.
//!
//! Built once at startup via [`CatalogBuilder`] and frozen. The builder runs
//! the configuration-validation pass: structural problems (blank or duplicate
//! genres, shelves with no covers) fail loudly with a typed error instead of
//! being papered over with fallback data at runtime.

use crate::id::{CoverId, GenreId};
use crate::rng::SimRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The reserved genre. Its shelf holds plain stock: players can pick books up
/// from it, but customers never order from it and the sorting table skips it.
pub const RESERVED_GENRE: &str = "General";

/// An RGB color in [0, 1] channels. Purely descriptive; the renderer decides
/// what to do with it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// A cover available on a shelf, with its display color.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverDef {
    pub name: String,
    pub color: Color,
}

impl CoverDef {
    pub fn new(name: &str, color: Color) -> Self {
        Self {
            name: name.to_string(),
            color,
        }
    }
}

/// One registered shelf: a genre and its ordered cover list.
#[derive(Debug, Clone)]
pub struct ShelfDef {
    pub genre: String,
    pub display_name: String,
    pub covers: Vec<CoverDef>,
    /// False for the reserved genre: valid for pickup, never for orders.
    pub orderable: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("shelf {0} has a blank genre name")]
    BlankGenre(usize),
    #[error("duplicate genre '{0}'")]
    DuplicateGenre(String),
    #[error("shelf '{0}' has no covers")]
    NoCovers(String),
    #[error("shelf '{0}' has a blank cover name")]
    BlankCover(String),
}

/// Builder for constructing an immutable [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    shelves: Vec<ShelfDef>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a shelf. Returns the id it will have in the built catalog.
    pub fn register_shelf(
        &mut self,
        genre: &str,
        display_name: &str,
        covers: Vec<CoverDef>,
    ) -> GenreId {
        let id = GenreId(self.shelves.len() as u32);
        self.shelves.push(ShelfDef {
            genre: genre.to_string(),
            display_name: display_name.to_string(),
            covers,
            orderable: genre != RESERVED_GENRE,
        });
        id
    }

    /// Validate and freeze the catalog.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        let mut genre_name_to_id = HashMap::new();
        for (index, shelf) in self.shelves.iter().enumerate() {
            if shelf.genre.trim().is_empty() {
                return Err(CatalogError::BlankGenre(index));
            }
            if shelf.covers.is_empty() {
                return Err(CatalogError::NoCovers(shelf.genre.clone()));
            }
            if shelf.covers.iter().any(|c| c.name.trim().is_empty()) {
                return Err(CatalogError::BlankCover(shelf.genre.clone()));
            }
            let previous =
                genre_name_to_id.insert(shelf.genre.clone(), GenreId(index as u32));
            if previous.is_some() {
                return Err(CatalogError::DuplicateGenre(shelf.genre.clone()));
            }
        }

        Ok(Catalog {
            shelves: self.shelves,
            genre_name_to_id,
        })
    }
}

/// Immutable shelf catalog. Frozen after build.
#[derive(Debug)]
pub struct Catalog {
    shelves: Vec<ShelfDef>,
    genre_name_to_id: HashMap<String, GenreId>,
}

impl Catalog {
    pub fn genre_id(&self, name: &str) -> Option<GenreId> {
        self.genre_name_to_id.get(name).copied()
    }

    pub fn shelf(&self, genre: GenreId) -> Option<&ShelfDef> {
        self.shelves.get(genre.0 as usize)
    }

    pub fn genre_name(&self, genre: GenreId) -> Option<&str> {
        self.shelf(genre).map(|s| s.genre.as_str())
    }

    /// The ordered cover list for a genre. Empty for unknown ids.
    pub fn covers_for(&self, genre: GenreId) -> &[CoverDef] {
        self.shelf(genre).map(|s| s.covers.as_slice()).unwrap_or(&[])
    }

    pub fn cover(&self, genre: GenreId, cover: CoverId) -> Option<&CoverDef> {
        self.covers_for(genre).get(cover.0 as usize)
    }

    pub fn shelf_count(&self) -> usize {
        self.shelves.len()
    }

    /// Genres customers may order from, in registration order.
    pub fn orderable_shelves(&self) -> Vec<GenreId> {
        self.shelves
            .iter()
            .enumerate()
            .filter(|(_, s)| s.orderable)
            .map(|(i, _)| GenreId(i as u32))
            .collect()
    }

    /// Total number of orderable (genre, cover) combinations.
    pub fn option_count(&self) -> usize {
        self.shelves
            .iter()
            .filter(|s| s.orderable)
            .map(|s| s.covers.len())
            .sum()
    }

    /// Draw a uniformly random orderable (genre, cover, color) combination.
    ///
    /// Returns `None` when no orderable shelves exist. Callers treat this as
    /// a recoverable configuration problem, not a crash.
    pub fn random_option(&self, rng: &mut SimRng) -> Option<(GenreId, CoverId, Color)> {
        let total = self.option_count();
        if total == 0 {
            log::warn!("catalog has no orderable shelves; cannot draw an option");
            return None;
        }
        let mut pick = rng.index(total);
        for (index, shelf) in self.shelves.iter().enumerate() {
            if !shelf.orderable {
                continue;
            }
            if pick < shelf.covers.len() {
                let cover = &shelf.covers[pick];
                return Some((
                    GenreId(index as u32),
                    CoverId(pick as u16),
                    cover.color,
                ));
            }
            pick -= shelf.covers.len();
        }
        None
    }

    /// The next cover in a genre's rotation, wrapping around. Out-of-range
    /// covers restart the rotation from the front.
    pub fn next_cover(&self, genre: GenreId, cover: CoverId) -> Option<CoverId> {
        let covers = self.covers_for(genre);
        if covers.is_empty() {
            return None;
        }
        let index = (cover.0 as usize).min(covers.len() - 1);
        Some(CoverId(((index + 1) % covers.len()) as u16))
    }

    /// The next orderable genre in the sorting rotation, wrapping around.
    /// Returns `None` when fewer than two genres are available to rotate.
    pub fn next_genre(&self, genre: GenreId) -> Option<GenreId> {
        let rotation = self.orderable_shelves();
        if rotation.len() < 2 {
            return None;
        }
        let next = match rotation.iter().position(|&g| g == genre) {
            Some(position) => (position + 1) % rotation.len(),
            None => 0,
        };
        Some(rotation[next])
    }
}
