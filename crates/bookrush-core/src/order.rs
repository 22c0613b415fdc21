use crate::catalog::Catalog;
use crate::id::{CoverId, GenreId};
use serde::{Deserialize, Serialize};

/// The (genre, cover) pair a customer wants. Immutable once created; owned by
/// a customer and destroyed with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    pub genre: GenreId,
    pub cover: CoverId,
}

impl Order {
    pub fn new(genre: GenreId, cover: CoverId) -> Self {
        Self { genre, cover }
    }

    /// Human-readable form, e.g. "Fantasy book with Dragon cover".
    pub fn describe(&self, catalog: &Catalog) -> String {
        let genre = catalog.genre_name(self.genre).unwrap_or("?");
        let cover = catalog
            .cover(self.genre, self.cover)
            .map(|c| c.name.as_str())
            .unwrap_or("?");
        format!("{genre} book with {cover} cover")
    }
}
