//! Local backend: allow-list key validation and process launch

use std::process::Command;
use std::thread;

use crate::backend::Backend;
use crate::config::BackendSettings;
use crate::domain::catalog::{Catalog, CatalogEntry, IconRef};

/// Id of the single launchable entry
pub const PRIMARY_ITEM_ID: i32 = 0;

/// Icon reference for the primary catalog entry
pub const PRIMARY_ICON: &str = "software";

#[derive(Debug, Clone)]
pub struct LocalBackend {
    settings: BackendSettings,
}

impl LocalBackend {
    pub fn new(settings: BackendSettings) -> Self {
        if settings.accepted_keys.is_empty() {
            tracing::warn!("no accepted license keys configured, every key will be rejected");
        }
        Self { settings }
    }

    pub fn validate(&self, key: &str) -> bool {
        if !self.settings.validation_delay.is_zero() {
            thread::sleep(self.settings.validation_delay);
        }
        let key = key.trim();
        let accepted = self.settings.accepted_keys.iter().any(|k| k == key);
        tracing::info!(accepted, "license key checked");
        accepted
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::new(vec![CatalogEntry::new(
            self.settings.product_name.clone(),
            IconRef::new(PRIMARY_ICON),
            PRIMARY_ITEM_ID,
        )])
    }

    /// Spawns the configured program for `id`; unknown ids fail
    pub fn launch(&self, id: i32) -> bool {
        if id != PRIMARY_ITEM_ID {
            tracing::warn!(id, "launch requested for unknown catalog id");
            return false;
        }

        let Some((program, args)) = self.settings.program.split_first() else {
            tracing::error!("no launch program configured");
            return false;
        };

        match Command::new(program).args(args).spawn() {
            Ok(child) => {
                tracing::info!(program = %program, pid = child.id(), "launched catalog item");
                true
            }
            Err(err) => {
                tracing::error!(program = %program, error = %err, "failed to launch catalog item");
                false
            }
        }
    }

    /// Wraps this backend into the capability record used by the session
    pub fn into_backend(self) -> Backend {
        let validator = self.clone();
        let provider = self.clone();
        let launcher = self;
        Backend::new(
            move |key| validator.validate(key),
            move || provider.catalog(),
            move |id| launcher.launch(id),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settings(keys: &[&str], program: &[&str]) -> BackendSettings {
        BackendSettings {
            accepted_keys: keys.iter().map(|k| k.to_string()).collect(),
            product_name: "Test Product".to_owned(),
            program: program.iter().map(|p| p.to_string()).collect(),
            validation_delay: Duration::ZERO,
        }
    }

    #[test]
    fn validates_against_allow_list() {
        let backend = LocalBackend::new(settings(&["ABC123"], &["true"]));
        assert!(backend.validate("ABC123"));
        assert!(backend.validate("  ABC123 "));
        assert!(!backend.validate("abc123"));
        assert!(!backend.validate(""));
    }

    #[test]
    fn catalog_has_single_primary_entry() {
        let backend = LocalBackend::new(settings(&[], &["true"]));
        let catalog = backend.catalog();
        assert_eq!(catalog.len(), 1);
        let entry = catalog.get(0).unwrap();
        assert_eq!(entry.id, PRIMARY_ITEM_ID);
        assert_eq!(entry.name, "Test Product");
        assert_eq!(entry.icon.name(), PRIMARY_ICON);
    }

    #[test]
    fn unknown_id_fails_to_launch() {
        let backend = LocalBackend::new(settings(&[], &["true"]));
        assert!(!backend.launch(42));
    }

    #[test]
    fn missing_program_fails_to_launch() {
        let backend = LocalBackend::new(settings(&[], &["ember-gate-definitely-missing-binary"]));
        assert!(!backend.launch(PRIMARY_ITEM_ID));

        let empty = LocalBackend::new(settings(&[], &[]));
        assert!(!empty.launch(PRIMARY_ITEM_ID));
    }

    #[test]
    fn capability_record_routes_to_local_backend() {
        let backend = LocalBackend::new(settings(&["K"], &["true"])).into_backend();
        assert!(backend.validate_user("K"));
        assert_eq!(backend.catalog().len(), 1);
    }
}
