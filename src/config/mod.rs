//! Configuration module for ember-gate
//!
//! Named, validated parameters for the phase timeline, the panel geometry
//! and the backend. Defaults reproduce the shipped look and pacing; the
//! backend and asset locations can be overridden from the environment.

pub mod backend;
pub mod motion;
pub mod panel;

pub use backend::{AssetSettings, BackendSettings};
pub use motion::MotionConfig;
pub use panel::PanelConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a positive finite number, got {value}")]
    NonPositive { name: &'static str, value: f32 },

    #[error("success dwell ({success}) must be positive and shorter than failure dwell ({failure})")]
    DwellOrder { success: f32, failure: f32 },

    #[error("launch poll threshold ({poll}s) must not precede launch start ({start}s)")]
    LaunchOrder { start: f32, poll: f32 },

    #[error("invalid window size {width}x{height}")]
    InvalidWindow { width: f32, height: f32 },

    #[error("glass panel does not fit inside the window")]
    PanelOutsideWindow,

    #[error("shadow layer count {layers} outside 1..={max}")]
    ShadowLayers { layers: u32, max: u32 },

    #[error("environment variable {name} has invalid value {value:?}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Everything the session and the rasterizer are configured with
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub motion: MotionConfig,
    pub panel: PanelConfig,
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.motion.validate()?;
        self.panel.validate()
    }

    /// Validated defaults
    pub fn validated(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }
}
