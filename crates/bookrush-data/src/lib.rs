//! Data files for the bookshop: shelf definitions with covers, colors, and
//! spawn weights.
//!
//! Shop content lives in RON, JSON, or TOML files (detected by extension),
//! is deserialized into the [`schema`] structs, and then resolved into the
//! engine's frozen [`Catalog`](bookrush_core::catalog::Catalog) and
//! [`Spawner`](bookrush_core::spawner::Spawner). Resolution is loud: bad
//! content is a typed [`DataLoadError`] at load time, never a silent
//! fallback at play time.

pub mod loader;
pub mod schema;

pub use loader::{
    deserialize_file, detect_format, find_data_file, load_store, load_store_str, resolve,
    DataLoadError, Format,
};
pub use schema::{CoverData, ShelfData, StoreData};
