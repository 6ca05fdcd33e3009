//! Immediate-mode widget drawing
//!
//! `Ui` wraps a `DrawList` together with the alpha every primitive is
//! faded by. Widgets here only draw; hit testing happens in the session
//! against the same layout rectangles so interaction and drawing agree.

use crate::config::PanelConfig;
use crate::domain::blob::BlobField;
use crate::domain::core::{Rect, Vec2};
use crate::ui::draw::{self, DrawList, ShadowStyle, TextAlign};
use crate::ui::theme::{self, Rgba};

pub const BODY_TEXT: f32 = 16.0;
pub const LABEL_TEXT: f32 = 18.0;

const INPUT_ROUNDING: f32 = 8.0;
const BUTTON_ROUNDING: f32 = 8.0;
const BLOB_SHADOW_LAYERS: u32 = 20;
const BLOB_CORE_LAYERS: u32 = 24;

/// Scalars a key input field is drawn from
#[derive(Debug, Clone, Copy)]
pub struct KeyField<'a> {
    pub text: &'a str,
    pub placeholder: &'a str,
    pub masked: bool,
    pub focused: bool,
    pub focus: f32,
}

/// Scalars a button is drawn from
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ButtonState {
    pub hover: f32,
    pub click: f32,
}

impl ButtonState {
    /// Hover grows the button slightly, pressing squashes it back
    pub fn scale(&self) -> f32 {
        1.0 + self.hover * 0.02 - self.click * 0.02
    }
}

/// Minimize and close hit boxes at the panel's top-right corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChromeLayout {
    pub minimize: Rect,
    pub close: Rect,
}

impl ChromeLayout {
    pub const BUTTON_SIZE: f32 = 30.0;

    pub fn new(panel: Rect) -> Self {
        Self {
            minimize: Rect::new(panel.right() - 70.0, panel.y + 5.0, Self::BUTTON_SIZE, Self::BUTTON_SIZE),
            close: Rect::new(panel.right() - 35.0, panel.y + 5.0, Self::BUTTON_SIZE, Self::BUTTON_SIZE),
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.minimize.contains(point) || self.close.contains(point)
    }
}

/// Layered shadow used behind the glass panel
pub fn panel_shadow(config: &PanelConfig) -> ShadowStyle {
    ShadowStyle {
        size: config.shadow_size,
        layers: config.shadow_layers,
        rounding: config.rounding,
        strength: config.blur_strength,
        falloff: config.shadow_falloff,
    }
}

/// Drawing context for one frame
pub struct Ui<'a> {
    list: &'a mut DrawList,
    alpha: f32,
}

impl<'a> Ui<'a> {
    pub fn new(list: &'a mut DrawList, alpha: f32) -> Self {
        Self {
            list,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn list(&mut self) -> &mut DrawList {
        &mut *self.list
    }

    /// Shadow and translucent fill of the glass panel
    pub fn glass_background(&mut self, panel: Rect, config: &PanelConfig) {
        draw::blur_shadow(self.list, panel, panel_shadow(config), self.alpha);
        self.list
            .fill_rect(panel, theme::GLASS_BG.fade(self.alpha), config.rounding);
    }

    pub fn glass_border(&mut self, panel: Rect, config: &PanelConfig) {
        self.list.stroke_rect(
            panel,
            theme::GLASS_BORDER.fade(self.alpha),
            config.rounding,
            1.5,
        );
    }

    /// Soft colored blobs clipped to the panel
    pub fn blobs(&mut self, panel: Rect, field: &BlobField, config: &PanelConfig) {
        if self.alpha <= 0.01 {
            return;
        }

        self.list.push_clip(panel);
        for blob in field.blobs() {
            let center = panel.origin().add(blob.pos);
            let style = ShadowStyle {
                size: blob.radius,
                layers: BLOB_SHADOW_LAYERS,
                rounding: blob.radius,
                strength: config.blur_strength,
                falloff: config.shadow_falloff,
            };
            draw::blur_shadow(
                self.list,
                Rect::from_origin_size(center, Vec2::ZERO),
                style,
                self.alpha * 0.3,
            );

            for i in 0..BLOB_CORE_LAYERS {
                let f = i as f32 / BLOB_CORE_LAYERS as f32;
                let radius = blob.radius * (1.0 - f * 0.5);
                let alpha = (1.0 - f) * 0.1 * self.alpha;
                self.list.fill_circle(center, radius, blob.color.fade(alpha));
            }
        }
        self.list.pop_clip();
    }

    pub fn text(&mut self, pos: Vec2, text: impl Into<String>, size: f32, color: Rgba, align: TextAlign) {
        self.list
            .text(pos, text, size, color.fade(self.alpha), align);
    }

    pub fn centered_text(&mut self, center_x: f32, top: f32, text: impl Into<String>, color: Rgba) {
        self.text(Vec2::new(center_x, top), text, LABEL_TEXT, color, TextAlign::Center);
    }

    /// License key field with key icon, reveal toggle and focus glow
    pub fn key_input(&mut self, rect: Rect, eye: Rect, field: KeyField<'_>) {
        let alpha = self.alpha;
        self.list
            .fill_rect(rect, theme::INPUT_BG.fade(alpha), INPUT_ROUNDING);

        let text_pos = Vec2::new(rect.x + 40.0, rect.y + 10.0);
        if field.text.is_empty() {
            if !field.focused {
                self.list.text(
                    text_pos,
                    field.placeholder,
                    BODY_TEXT,
                    theme::TEXT_SECONDARY.fade(alpha * 0.7),
                    TextAlign::Left,
                );
            }
        } else {
            let shown = if field.masked {
                "*".repeat(field.text.chars().count())
            } else {
                field.text.to_owned()
            };
            self.list.text(
                text_pos,
                shown,
                BODY_TEXT,
                theme::TEXT_PRIMARY.fade(alpha),
                TextAlign::Left,
            );
        }

        let icon_color = if field.focused {
            theme::ACCENT
        } else {
            theme::TEXT_SECONDARY
        };
        self.key_icon(Vec2::new(rect.x + 20.0, rect.y + rect.h * 0.5), icon_color.fade(alpha));
        self.eye_icon(eye, !field.masked);

        if field.focus > 0.01 {
            draw::neon_rect(
                self.list,
                rect,
                theme::ACCENT,
                1.0,
                alpha * field.focus,
                INPUT_ROUNDING,
            );
        } else {
            let border = theme::INPUT_BORDER.lerp(theme::ACCENT, field.focus);
            self.list
                .stroke_rect(rect, border.fade(alpha), INPUT_ROUNDING, 1.0);
        }
    }

    fn key_icon(&mut self, center: Vec2, color: Rgba) {
        let ring = Vec2::new(center.x - 3.0, center.y);
        self.list.stroke_circle(ring, 4.0, color, 2.0);
        self.list.line(
            Vec2::new(ring.x + 4.0, ring.y),
            Vec2::new(ring.x + 12.0, ring.y),
            color,
            2.0,
        );
        self.list.line(
            Vec2::new(ring.x + 10.0, ring.y),
            Vec2::new(ring.x + 10.0, ring.y + 4.0),
            color,
            2.0,
        );
    }

    fn eye_icon(&mut self, rect: Rect, revealed: bool) {
        let color = theme::TEXT_SECONDARY.fade(self.alpha);
        let center = rect.center();
        self.list.stroke_circle(center, 6.0, color, 1.5);
        self.list.fill_circle(center, 2.5, color);
        if revealed {
            self.list.line(
                Vec2::new(center.x - 8.0, center.y - 8.0),
                Vec2::new(center.x + 8.0, center.y + 8.0),
                color,
                1.5,
            );
        }
    }

    /// Gradient button with hover glow and press squash
    pub fn button(&mut self, rect: Rect, label: &str, state: ButtonState) {
        let alpha = self.alpha;
        let body = rect.scale_about_center(state.scale());

        if state.hover > 0.01 {
            draw::neon_rect(
                self.list,
                body,
                theme::ACCENT,
                1.0,
                alpha * state.hover,
                BUTTON_ROUNDING,
            );
        }

        let shadow = ShadowStyle {
            size: 8.0,
            layers: 10,
            rounding: BUTTON_ROUNDING,
            strength: 20.0,
            falloff: 2.0,
        };
        draw::blur_shadow(self.list, body, shadow, alpha * 0.6);

        self.list.gradient_rect(
            body,
            theme::BUTTON_TOP.fade(alpha),
            theme::BUTTON_BOTTOM.fade(alpha),
            BUTTON_ROUNDING,
        );

        let center = body.center();
        self.list.text(
            Vec2::new(center.x, center.y - LABEL_TEXT * 0.5),
            label,
            LABEL_TEXT,
            theme::TEXT_PRIMARY.fade(alpha),
            TextAlign::Center,
        );
    }

    /// Minimize and close glyphs; hovered glyphs brighten to white
    pub fn chrome(&mut self, layout: &ChromeLayout, minimize_hover: f32, close_hover: f32) {
        let alpha = self.alpha;

        let color = theme::TEXT_SECONDARY.lerp(theme::WHITE, minimize_hover).fade(alpha);
        let c = layout.minimize.center();
        self.list
            .line(Vec2::new(c.x - 6.0, c.y), Vec2::new(c.x + 6.0, c.y), color, 2.0);

        let color = theme::TEXT_SECONDARY.lerp(theme::WHITE, close_hover).fade(alpha);
        let c = layout.close.center();
        self.list.line(
            Vec2::new(c.x - 5.0, c.y - 5.0),
            Vec2::new(c.x + 5.0, c.y + 5.0),
            color,
            2.0,
        );
        self.list.line(
            Vec2::new(c.x + 5.0, c.y - 5.0),
            Vec2::new(c.x - 5.0, c.y + 5.0),
            color,
            2.0,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::draw::DrawCommand;

    fn panel() -> Rect {
        Rect::new(20.0, 20.0, 340.0, 480.0)
    }

    #[test]
    fn chrome_sits_at_panel_top_right() {
        let layout = ChromeLayout::new(panel());
        assert_eq!(layout.minimize, Rect::new(290.0, 25.0, 30.0, 30.0));
        assert_eq!(layout.close, Rect::new(325.0, 25.0, 30.0, 30.0));
        assert!(layout.contains(Vec2::new(340.0, 40.0)));
        assert!(!layout.contains(Vec2::new(100.0, 40.0)));
    }

    #[test]
    fn button_scale_follows_hover_and_click() {
        assert_eq!(ButtonState::default().scale(), 1.0);
        let hovered = ButtonState { hover: 1.0, click: 0.0 };
        assert!((hovered.scale() - 1.02).abs() < 1e-6);
        let pressed = ButtonState { hover: 1.0, click: 1.0 };
        assert!((pressed.scale() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn masked_key_hides_characters() {
        let mut list = DrawList::new();
        let mut ui = Ui::new(&mut list, 1.0);
        let input = Rect::new(40.0, 340.0, 300.0, 40.0);
        ui.key_input(
            input,
            Rect::new(305.0, 346.0, 24.0, 28.0),
            KeyField {
                text: "ABC",
                placeholder: "Enter your key...",
                masked: true,
                focused: true,
                focus: 1.0,
            },
        );
        let texts: Vec<_> = list.texts().collect();
        assert_eq!(texts, vec!["***"]);
    }

    #[test]
    fn empty_unfocused_key_shows_placeholder() {
        let mut list = DrawList::new();
        let mut ui = Ui::new(&mut list, 1.0);
        ui.key_input(
            Rect::new(40.0, 340.0, 300.0, 40.0),
            Rect::new(305.0, 346.0, 24.0, 28.0),
            KeyField {
                text: "",
                placeholder: "Enter your key...",
                masked: true,
                focused: false,
                focus: 0.0,
            },
        );
        assert_eq!(list.texts().collect::<Vec<_>>(), vec!["Enter your key..."]);
    }

    #[test]
    fn zero_alpha_draws_nothing() {
        let mut list = DrawList::new();
        let mut ui = Ui::new(&mut list, 0.0);
        ui.button(Rect::new(0.0, 0.0, 300.0, 45.0), "Confirm", ButtonState::default());
        ui.glass_background(panel(), &PanelConfig::default());
        ui.blobs(panel(), &BlobField::default(), &PanelConfig::default());
        assert!(list.is_empty());
    }

    #[test]
    fn blobs_are_clipped_to_panel() {
        let mut list = DrawList::new();
        let mut ui = Ui::new(&mut list, 1.0);
        ui.blobs(panel(), &BlobField::default(), &PanelConfig::default());

        let commands = list.commands();
        assert_eq!(commands.first(), Some(&DrawCommand::PushClip(panel())));
        assert_eq!(commands.last(), Some(&DrawCommand::PopClip));
    }
}
