use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a live customer entity.
    pub struct CustomerId;

    /// Identifies a live book entity.
    pub struct BookId;
}

/// Identifies a genre (and its shelf -- one shelf per genre) in the catalog.
/// Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenreId(pub u32);

/// Identifies a cover within its genre's ordered cover list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoverId(pub u16);
