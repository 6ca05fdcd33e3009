//! Color palette for the glass panel look
//!
//! Colors are straight (non-premultiplied) RGBA in [0, 1]. Every draw call
//! fades its color by the frame's effective alpha before emitting it.

use tiny_skia::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with alpha multiplied by `alpha_mul`
    pub fn fade(self, alpha_mul: f32) -> Rgba {
        Rgba::new(self.r, self.g, self.b, self.a * alpha_mul)
    }

    /// Component-wise interpolation, `t` clamped to [0, 1]
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        Rgba::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    pub fn is_invisible(&self) -> bool {
        self.a <= 0.0
    }

    pub fn to_skia(self) -> Color {
        Color::from_rgba8(
            channel_to_u8(self.r),
            channel_to_u8(self.g),
            channel_to_u8(self.b),
            channel_to_u8(self.a),
        )
    }
}

fn channel_to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

// Red dragon palette
pub const GLASS_BG: Rgba = Rgba::new(0.12, 0.05, 0.05, 0.90);
pub const GLASS_BORDER: Rgba = Rgba::new(0.95, 0.35, 0.25, 0.60);
pub const ACCENT: Rgba = Rgba::new(1.0, 0.40, 0.30, 0.9);
pub const TEXT_PRIMARY: Rgba = Rgba::new(1.0, 0.95, 0.92, 0.95);
pub const TEXT_SECONDARY: Rgba = Rgba::new(0.95, 0.95, 0.95, 0.7);
pub const INPUT_BG: Rgba = Rgba::new(0.08, 0.03, 0.03, 0.4);
pub const INPUT_BORDER: Rgba = Rgba::new(0.80, 0.30, 0.25, 0.15);
pub const BUTTON_TOP: Rgba = Rgba::new(1.0, 0.50, 0.35, 0.9);
pub const BUTTON_BOTTOM: Rgba = Rgba::new(0.70, 0.15, 0.10, 0.9);
pub const ERROR: Rgba = Rgba::new(1.0, 0.25, 0.20, 0.8);
pub const SUCCESS: Rgba = Rgba::new(1.0, 0.65, 0.35, 1.0);
pub const TRACK: Rgba = Rgba::new(1.0, 1.0, 1.0, 0.1);

pub const BLOB_1: Rgba = Rgba::new(1.0, 0.40, 0.30, 0.10);
pub const BLOB_2: Rgba = Rgba::new(0.90, 0.25, 0.20, 0.10);
pub const BLOB_3: Rgba = Rgba::new(0.95, 0.50, 0.25, 0.10);
