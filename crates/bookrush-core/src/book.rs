//! The book entity: a physical item with a genre, cover, and checkout stamp.
//!
//! Books are created on shelf pickup, re-sorted (cover/genre changed) only
//! while unstamped, and consumed on delivery whether or not the delivery
//! matched. A book can satisfy an order only once it carries the stamp.

use crate::catalog::Color;
use crate::id::{CoverId, GenreId};
use crate::order::Order;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BookError {
    /// Content is frozen once the checkout stamp is applied.
    #[error("book is already stamped; its content can no longer change")]
    AlreadyStamped,
}

/// A single book instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    genre: GenreId,
    cover: CoverId,
    color: Color,
    source_shelf: GenreId,
    stamped: bool,
}

impl Book {
    /// A fresh, unstamped book as it comes off a shelf.
    pub fn new(genre: GenreId, cover: CoverId, color: Color, source_shelf: GenreId) -> Self {
        Self {
            genre,
            cover,
            color,
            source_shelf,
            stamped: false,
        }
    }

    pub fn genre(&self) -> GenreId {
        self.genre
    }

    pub fn cover(&self) -> CoverId {
        self.cover
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// The shelf this book originally came from (unchanged by re-sorting).
    pub fn source_shelf(&self) -> GenreId {
        self.source_shelf
    }

    pub fn is_stamped(&self) -> bool {
        self.stamped
    }

    /// Apply the checkout stamp. Idempotent.
    pub fn stamp(&mut self) {
        self.stamped = true;
    }

    /// Whether this book satisfies the given order. Unstamped books never
    /// match, regardless of genre and cover.
    pub fn matches(&self, order: &Order) -> bool {
        self.stamped && self.genre == order.genre && self.cover == order.cover
    }

    /// Swap the cover within the current genre (sorting table).
    pub fn set_cover(&mut self, cover: CoverId, color: Color) -> Result<(), BookError> {
        if self.stamped {
            return Err(BookError::AlreadyStamped);
        }
        self.cover = cover;
        self.color = color;
        Ok(())
    }

    /// Move the book to another genre entirely (sorting table, genre swap).
    pub fn set_genre_and_cover(
        &mut self,
        genre: GenreId,
        cover: CoverId,
        color: Color,
    ) -> Result<(), BookError> {
        if self.stamped {
            return Err(BookError::AlreadyStamped);
        }
        self.genre = genre;
        self.cover = cover;
        self.color = color;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dragon_book() -> Book {
        Book::new(GenreId(0), CoverId(0), Color::rgb(0.2, 0.4, 0.8), GenreId(0))
    }

    #[test]
    fn unstamped_book_never_matches() {
        let book = dragon_book();
        let order = Order::new(GenreId(0), CoverId(0));
        assert!(!book.matches(&order));
    }

    #[test]
    fn stamped_match_requires_genre_and_cover() {
        let mut book = dragon_book();
        book.stamp();

        assert!(book.matches(&Order::new(GenreId(0), CoverId(0))));
        assert!(!book.matches(&Order::new(GenreId(0), CoverId(1))));
        assert!(!book.matches(&Order::new(GenreId(1), CoverId(0))));
    }

    #[test]
    fn stamp_is_idempotent() {
        let mut book = dragon_book();
        book.stamp();
        book.stamp();
        assert!(book.is_stamped());
    }

    #[test]
    fn resort_while_unstamped() {
        let mut book = dragon_book();
        book.set_cover(CoverId(1), Color::WHITE).unwrap();
        assert_eq!(book.cover(), CoverId(1));

        book.set_genre_and_cover(GenreId(1), CoverId(0), Color::WHITE)
            .unwrap();
        assert_eq!(book.genre(), GenreId(1));
        assert_eq!(book.cover(), CoverId(0));
        // Provenance is not rewritten by sorting.
        assert_eq!(book.source_shelf(), GenreId(0));
    }

    #[test]
    fn stamped_book_rejects_resorting() {
        let mut book = dragon_book();
        book.stamp();

        assert_eq!(
            book.set_cover(CoverId(1), Color::WHITE),
            Err(BookError::AlreadyStamped)
        );
        assert_eq!(
            book.set_genre_and_cover(GenreId(1), CoverId(0), Color::WHITE),
            Err(BookError::AlreadyStamped)
        );
        // Content unchanged after the rejected mutations.
        assert_eq!(book.genre(), GenreId(0));
        assert_eq!(book.cover(), CoverId(0));
    }
}
