//! Launchable catalog
//!
//! The catalog is fetched from the backend once when the session is built
//! and is read-only for the rest of the process lifetime.

use std::fmt;

/// Reference to an icon image known to the rasterizer's icon atlas
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IconRef(String);

impl IconRef {
    /// Icon used for the login screen logo
    pub const LOGO: &'static str = "logo";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn logo() -> Self {
        Self::new(Self::LOGO)
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IconRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One launchable item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub icon: IconRef,
    pub id: i32,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, icon: IconRef, id: i32) -> Self {
        Self {
            name: name.into(),
            icon,
            id,
        }
    }
}

/// Immutable list of launchable items
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
