//! Draw command list
//!
//! Screen renderers never touch pixels. They emit primitive commands into
//! a `DrawList`, which the rasterizer later turns into a pixmap. Keeping
//! the two apart lets the layout be tested without rendering anything.

use crate::domain::catalog::IconRef;
use crate::domain::core::{Rect, Vec2};
use crate::ui::theme::{self, Rgba};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    /// `pos` is the top-left corner of the text
    Left,
    /// `pos` is the top-center of the text
    Center,
}

/// A single primitive drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        color: Rgba,
        rounding: f32,
    },
    StrokeRect {
        rect: Rect,
        color: Rgba,
        rounding: f32,
        width: f32,
    },
    /// Vertical multi-stop gradient, stops ordered top to bottom in [0, 1]
    GradientRect {
        rect: Rect,
        stops: Vec<(f32, Rgba)>,
        rounding: f32,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Rgba,
    },
    StrokeCircle {
        center: Vec2,
        radius: f32,
        color: Rgba,
        width: f32,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Rgba,
        width: f32,
    },
    Image {
        icon: IconRef,
        rect: Rect,
        opacity: f32,
    },
    Text {
        pos: Vec2,
        text: String,
        size: f32,
        color: Rgba,
        align: TextAlign,
    },
    PushClip(Rect),
    PopClip,
}

/// Ordered list of draw commands for one frame
///
/// Commands whose color is fully transparent are dropped on insertion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Rgba, rounding: f32) {
        if color.is_invisible() {
            return;
        }
        self.commands.push(DrawCommand::FillRect {
            rect,
            color,
            rounding,
        });
    }

    pub fn stroke_rect(&mut self, rect: Rect, color: Rgba, rounding: f32, width: f32) {
        if color.is_invisible() || width <= 0.0 {
            return;
        }
        self.commands.push(DrawCommand::StrokeRect {
            rect,
            color,
            rounding,
            width,
        });
    }

    pub fn gradient_rect(&mut self, rect: Rect, top: Rgba, bottom: Rgba, rounding: f32) {
        if top.is_invisible() && bottom.is_invisible() {
            return;
        }
        self.commands.push(DrawCommand::GradientRect {
            rect,
            stops: vec![(0.0, top), (1.0, bottom)],
            rounding,
        });
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        if color.is_invisible() || radius <= 0.0 {
            return;
        }
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    pub fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Rgba, width: f32) {
        if color.is_invisible() || radius <= 0.0 {
            return;
        }
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            color,
            width,
        });
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32) {
        if color.is_invisible() {
            return;
        }
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
    }

    pub fn image(&mut self, icon: IconRef, rect: Rect, opacity: f32) {
        if opacity <= 0.0 {
            return;
        }
        self.commands.push(DrawCommand::Image {
            icon,
            rect,
            opacity: opacity.min(1.0),
        });
    }

    pub fn text(&mut self, pos: Vec2, text: impl Into<String>, size: f32, color: Rgba, align: TextAlign) {
        if color.is_invisible() {
            return;
        }
        self.commands.push(DrawCommand::Text {
            pos,
            text: text.into(),
            size,
            color,
            align,
        });
    }

    pub fn push_clip(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::PushClip(rect));
    }

    pub fn pop_clip(&mut self) {
        self.commands.push(DrawCommand::PopClip);
    }

    /// Iterates over every text string in the list
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Parameters of a layered soft shadow
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowStyle {
    pub size: f32,
    pub layers: u32,
    pub rounding: f32,
    /// Peak alpha on a 0-255 scale
    pub strength: f32,
    pub falloff: f32,
}

/// Fakes a blurred drop shadow by stacking growing translucent rectangles
///
/// Layer `i` of `n` is expanded by `size * i / n` and its opacity falls
/// off as `(1 - i / n) ^ falloff`. The shadow is offset slightly downward.
pub fn blur_shadow(list: &mut DrawList, rect: Rect, style: ShadowStyle, alpha: f32) {
    if style.layers == 0 {
        return;
    }
    for i in 0..style.layers {
        let factor = i as f32 / style.layers as f32;
        let expansion = style.size * factor;
        let opacity = (1.0 - factor).powf(style.falloff);
        let layer_alpha = (style.strength * opacity * alpha).floor() / 255.0;

        let layer = Rect::new(
            rect.x - expansion,
            rect.y + 4.0 - expansion,
            rect.w + expansion * 2.0,
            rect.h + 4.0 + expansion * 2.0,
        );
        list.fill_rect(layer, theme::BLACK.fade(layer_alpha), style.rounding + expansion);
    }
}

/// Three concentric outlines giving a glow around `rect`
pub fn neon_rect(list: &mut DrawList, rect: Rect, color: Rgba, thickness: f32, intensity: f32, rounding: f32) {
    let base = Rgba::new(color.r, color.g, color.b, 1.0);
    list.stroke_rect(rect, base.fade(40.0 / 255.0 * intensity), rounding, thickness + 6.0);
    list.stroke_rect(rect, base.fade(80.0 / 255.0 * intensity), rounding, thickness + 2.0);
    list.stroke_rect(rect, base.fade(200.0 / 255.0 * intensity), rounding, thickness);
}
