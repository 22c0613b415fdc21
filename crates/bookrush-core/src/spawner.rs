//! The customer order generator.
//!
//! Picks a shelf, then a cover from that shelf. With exactly two orderable
//! shelves the configured per-genre weights apply (normalized); any other
//! shelf count falls back to a uniform draw. Covers are always uniform
//! within the chosen shelf.

use crate::catalog::Catalog;
use crate::fixed::Fixed64;
use crate::id::{CoverId, GenreId};
use crate::order::Order;
use crate::rng::SimRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SpawnError {
    /// No orderable shelves are registered. Recoverable: the engine logs and
    /// skips the spawn.
    #[error("no orderable shelves registered")]
    NoShelves,
    /// A shelf with an empty cover list slipped past validation.
    #[error("shelf {0:?} has no covers")]
    NoCovers(GenreId),
    /// A configured weight is negative.
    #[error("negative spawn weight for {0:?}")]
    InvalidWeight(GenreId),
}

/// Draws fresh orders for arriving customers.
#[derive(Debug, Clone, Default)]
pub struct Spawner {
    weights: Vec<(GenreId, Fixed64)>,
}

impl Spawner {
    /// A spawner with no configured weights: every draw is uniform.
    pub fn new() -> Self {
        Self::default()
    }

    /// A spawner with per-genre weights. Weights only take effect when
    /// exactly two orderable shelves exist and both are weighted.
    pub fn with_weights(weights: Vec<(GenreId, Fixed64)>) -> Result<Self, SpawnError> {
        for &(genre, weight) in &weights {
            if weight < Fixed64::ZERO {
                return Err(SpawnError::InvalidWeight(genre));
            }
        }
        Ok(Self { weights })
    }

    fn weight_for(&self, genre: GenreId) -> Option<Fixed64> {
        self.weights
            .iter()
            .find(|(g, _)| *g == genre)
            .map(|&(_, w)| w)
    }

    /// Draw a new order: shelf first, then a uniform cover from it.
    pub fn draw_order(&self, catalog: &Catalog, rng: &mut SimRng) -> Result<Order, SpawnError> {
        let shelves = catalog.orderable_shelves();
        if shelves.is_empty() {
            return Err(SpawnError::NoShelves);
        }

        let genre = self.select_shelf(&shelves, rng);

        let covers = catalog.covers_for(genre);
        if covers.is_empty() {
            // The catalog builder rejects this; kept as a guard.
            return Err(SpawnError::NoCovers(genre));
        }
        let cover = CoverId(rng.index(covers.len()) as u16);

        Ok(Order::new(genre, cover))
    }

    fn select_shelf(&self, shelves: &[GenreId], rng: &mut SimRng) -> GenreId {
        if shelves.len() == 2 {
            if let (Some(first), Some(second)) =
                (self.weight_for(shelves[0]), self.weight_for(shelves[1]))
            {
                let total = first + second;
                if total > Fixed64::ZERO {
                    return if rng.chance(first / total) {
                        shelves[0]
                    } else {
                        shelves[1]
                    };
                }
            }
        }
        shelves[rng.index(shelves.len())]
    }
}
