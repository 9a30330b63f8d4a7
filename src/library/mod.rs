//! The track catalog the player is fed from.

pub mod catalog;

pub use catalog::{Catalog, CatalogSection};
