use std::path::PathBuf;
use std::time::Duration;

use crate::config::ConfigError;

pub const ENV_KEYS: &str = "EMBER_GATE_KEYS";
pub const ENV_PROGRAM: &str = "EMBER_GATE_PROGRAM";
pub const ENV_PRODUCT: &str = "EMBER_GATE_PRODUCT";
pub const ENV_VALIDATION_DELAY_MS: &str = "EMBER_GATE_VALIDATION_DELAY_MS";
pub const ENV_FONT: &str = "EMBER_GATE_FONT";
pub const ENV_ICON_DIR: &str = "EMBER_GATE_ICON_DIR";

/// Parameters for the local license/launch backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSettings {
    /// Keys accepted by the allow-list validator
    pub accepted_keys: Vec<String>,
    pub product_name: String,
    /// Program and arguments started for the single catalog entry
    pub program: Vec<String>,
    /// Artificial latency added to every validation call
    pub validation_delay: Duration,
}

impl BackendSettings {
    pub const DEFAULT_PRODUCT: &'static str = "FPS Boost System";
    pub const DEFAULT_DELAY_MS: u64 = 800;

    /// Reads settings through `lookup`, falling back to defaults
    ///
    /// `lookup` is usually `std::env::var(..).ok()`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(keys) = lookup(ENV_KEYS) {
            settings.accepted_keys = keys
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_owned)
                .collect();
        }

        if let Some(product) = lookup(ENV_PRODUCT).filter(|p| !p.trim().is_empty()) {
            settings.product_name = product.trim().to_owned();
        }

        if let Some(program) = lookup(ENV_PROGRAM) {
            let parts: Vec<String> = program.split_whitespace().map(str::to_owned).collect();
            if parts.is_empty() {
                return Err(ConfigError::InvalidEnv {
                    name: ENV_PROGRAM,
                    value: program,
                });
            }
            settings.program = parts;
        }

        if let Some(raw) = lookup(ENV_VALIDATION_DELAY_MS) {
            let millis = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_VALIDATION_DELAY_MS,
                value: raw.clone(),
            })?;
            settings.validation_delay = Duration::from_millis(millis);
        }

        Ok(settings)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            accepted_keys: Vec::new(),
            product_name: Self::DEFAULT_PRODUCT.to_owned(),
            program: default_program(),
            validation_delay: Duration::from_millis(Self::DEFAULT_DELAY_MS),
        }
    }
}

#[cfg(windows)]
fn default_program() -> Vec<String> {
    vec!["cmd.exe".to_owned()]
}

#[cfg(not(windows))]
fn default_program() -> Vec<String> {
    vec!["true".to_owned()]
}

/// Locations of the font and icon images used by the rasterizer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetSettings {
    pub font_path: Option<PathBuf>,
    pub icon_dir: Option<PathBuf>,
}

impl AssetSettings {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            font_path: lookup(ENV_FONT).map(PathBuf::from),
            icon_dir: lookup(ENV_ICON_DIR).map(PathBuf::from),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let settings = BackendSettings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings, BackendSettings::default());
        assert!(settings.accepted_keys.is_empty());
    }

    #[test]
    fn keys_are_split_and_trimmed() {
        let settings =
            BackendSettings::from_lookup(lookup_from(&[(ENV_KEYS, " ABC123, ,XYZ ")])).unwrap();
        assert_eq!(settings.accepted_keys, vec!["ABC123", "XYZ"]);
    }

    #[test]
    fn program_is_split_into_arguments() {
        let settings =
            BackendSettings::from_lookup(lookup_from(&[(ENV_PROGRAM, "notepad.exe readme.txt")]))
                .unwrap();
        assert_eq!(settings.program, vec!["notepad.exe", "readme.txt"]);
    }

    #[test]
    fn blank_program_rejected() {
        let result = BackendSettings::from_lookup(lookup_from(&[(ENV_PROGRAM, "   ")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnv {
                name: ENV_PROGRAM,
                ..
            })
        ));
    }

    #[test]
    fn bad_delay_rejected() {
        let result =
            BackendSettings::from_lookup(lookup_from(&[(ENV_VALIDATION_DELAY_MS, "soon")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnv { .. })));

        let settings =
            BackendSettings::from_lookup(lookup_from(&[(ENV_VALIDATION_DELAY_MS, "0")])).unwrap();
        assert_eq!(settings.validation_delay, Duration::ZERO);
    }

    #[test]
    fn asset_paths_from_lookup() {
        let assets = AssetSettings::from_lookup(lookup_from(&[(ENV_FONT, "/tmp/font.ttf")]));
        assert_eq!(assets.font_path, Some(PathBuf::from("/tmp/font.ttf")));
        assert!(assets.icon_dir.is_none());
    }
}
