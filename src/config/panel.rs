use crate::config::ConfigError;
use crate::domain::core::{Rect, Vec2};

/// Window and glass panel geometry plus the layered shadow parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelConfig {
    pub window_size: Vec2,
    pub panel_origin: Vec2,
    pub panel_size: Vec2,
    pub rounding: f32,
    pub shadow_size: f32,
    pub shadow_layers: u32,
    /// Peak alpha (0-255 scale) of the innermost shadow layer
    pub blur_strength: f32,
    /// Exponent applied to the per-layer opacity falloff
    pub shadow_falloff: f32,
}

impl PanelConfig {
    pub const MAX_SHADOW_LAYERS: u32 = 64;

    pub fn panel_rect(&self) -> Rect {
        Rect::from_origin_size(self.panel_origin, self.panel_size)
    }

    pub fn window_rect(&self) -> Rect {
        Rect::from_origin_size(Vec2::ZERO, self.window_size)
    }

    /// Window size in whole pixels, as used for the backing pixmap
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.window_size.x.round().max(1.0) as u32,
            self.window_size.y.round().max(1.0) as u32,
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size.x <= 0.0 || self.window_size.y <= 0.0 {
            return Err(ConfigError::InvalidWindow {
                width: self.window_size.x,
                height: self.window_size.y,
            });
        }

        if !self.window_rect().contains_rect(&self.panel_rect()) || self.panel_rect().is_empty() {
            return Err(ConfigError::PanelOutsideWindow);
        }

        if self.shadow_layers == 0 || self.shadow_layers > Self::MAX_SHADOW_LAYERS {
            return Err(ConfigError::ShadowLayers {
                layers: self.shadow_layers,
                max: Self::MAX_SHADOW_LAYERS,
            });
        }

        if self.shadow_falloff <= 0.0 {
            return Err(ConfigError::NonPositive {
                name: "shadow_falloff",
                value: self.shadow_falloff,
            });
        }

        Ok(())
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            window_size: Vec2::new(380.0, 520.0),
            panel_origin: Vec2::new(20.0, 20.0),
            panel_size: Vec2::new(340.0, 480.0),
            rounding: 12.0,
            shadow_size: 15.0,
            shadow_layers: 15,
            blur_strength: 20.0,
            shadow_falloff: 2.0,
        }
    }
}
