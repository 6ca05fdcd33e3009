//! Domain logic and core data structures
//!
//! This module contains pure data types that are independent
//! of the window system and the rasterizer.

pub mod blob;
pub mod catalog;
pub mod core;

pub use blob::{Blob, BlobField};
pub use catalog::{Catalog, CatalogEntry, IconRef};
pub use core::{Rect, Vec2};
