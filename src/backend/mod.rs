//! License and launch backend
//!
//! The session consumes the backend as a record of three capabilities
//! injected at construction. Each capability is a blocking call; the
//! session runs the validation and launch calls on worker threads through
//! `TaskHandle`s. Faults inside a capability are folded into `false` here
//! so nothing but a plain boolean ever reaches the render thread.

pub mod local;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::domain::catalog::Catalog;

pub use local::LocalBackend;

pub type ValidateFn = dyn Fn(&str) -> bool + Send + Sync;
pub type CatalogFn = dyn Fn() -> Catalog + Send + Sync;
pub type LaunchFn = dyn Fn(i32) -> bool + Send + Sync;

/// Capability record for the external backend
#[derive(Clone)]
pub struct Backend {
    validate: Arc<ValidateFn>,
    catalog: Arc<CatalogFn>,
    launch: Arc<LaunchFn>,
}

impl Backend {
    pub fn new<V, C, L>(validate: V, catalog: C, launch: L) -> Self
    where
        V: Fn(&str) -> bool + Send + Sync + 'static,
        C: Fn() -> Catalog + Send + Sync + 'static,
        L: Fn(i32) -> bool + Send + Sync + 'static,
    {
        Self {
            validate: Arc::new(validate),
            catalog: Arc::new(catalog),
            launch: Arc::new(launch),
        }
    }

    /// Checks a license key; a panicking validator counts as rejection
    pub fn validate_user(&self, key: &str) -> bool {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.validate)(key))) {
            Ok(accepted) => accepted,
            Err(_) => {
                tracing::error!("license validator panicked, treating key as rejected");
                false
            }
        }
    }

    /// Fetches the launchable catalog; a panicking provider yields an empty one
    pub fn catalog(&self) -> Catalog {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.catalog)())) {
            Ok(catalog) => catalog,
            Err(_) => {
                tracing::error!("catalog provider panicked, using an empty catalog");
                Catalog::default()
            }
        }
    }

    /// Starts the item with the given id; a panicking launcher counts as failure
    pub fn launch_item(&self, id: i32) -> bool {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.launch)(id))) {
            Ok(launched) => launched,
            Err(_) => {
                tracing::error!(id, "launcher panicked, treating launch as failed");
                false
            }
        }
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{CatalogEntry, IconRef};

    fn fixed_backend() -> Backend {
        Backend::new(
            |key| key == "ABC123",
            || Catalog::new(vec![CatalogEntry::new("Tool", IconRef::new("tool"), 0)]),
            |id| id == 0,
        )
    }

    #[test]
    fn capabilities_are_forwarded() {
        let backend = fixed_backend();
        assert!(backend.validate_user("ABC123"));
        assert!(!backend.validate_user("nope"));
        assert_eq!(backend.catalog().len(), 1);
        assert!(backend.launch_item(0));
        assert!(!backend.launch_item(3));
    }

    #[test]
    fn panics_become_false() {
        let backend = Backend::new(
            |_| panic!("network down"),
            || panic!("no catalog"),
            |_| panic!("spawn failed"),
        );
        assert!(!backend.validate_user("ABC123"));
        assert!(backend.catalog().is_empty());
        assert!(!backend.launch_item(0));
    }

    #[test]
    fn clones_share_capabilities() {
        let backend = fixed_backend();
        let clone = backend.clone();
        assert!(clone.validate_user("ABC123"));
    }
}
