//! Screen renderers
//!
//! One drawing routine per screen. Each is a pure function of the panel
//! rectangle, the effective alpha carried by the `Ui` and a small view of
//! the session scalars it needs. Interactive screens expose their layout
//! so the session can hit test exactly what gets drawn.

use std::f32::consts::{PI, TAU};

use crate::domain::catalog::{CatalogEntry, IconRef};
use crate::domain::core::{Rect, Vec2};
use crate::ui::draw::TextAlign;
use crate::ui::theme;
use crate::ui::widgets::{ButtonState, KeyField, LABEL_TEXT, Ui};

pub const LOGIN_TITLE: &str = "Please sign in";
pub const KEY_PLACEHOLDER: &str = "Enter your key...";
pub const CONFIRM_LABEL: &str = "Confirm";
pub const LOADING_TEXT: &str = "Signing in...";
pub const SUCCESS_TEXT: &str = "Signed in successfully";
pub const FAILURE_TEXT: &str = "Unable to sign in";
pub const PRODUCT_TITLE: &str = "Product";
pub const LAUNCH_LABEL: &str = "Launch";
pub const EMPTY_CATALOG_TEXT: &str = "No software found.";

const SPINNER_SEGMENTS: u32 = 10;
const SPINNER_RADIUS: f32 = 30.0;
const RESULT_RING_RADIUS: f32 = 40.0;
const LAUNCH_BAR_WIDTH: f32 = 200.0;
const LAUNCH_BAR_HEIGHT: f32 = 4.0;
const LAUNCH_SEGMENT_SHARE: f32 = 0.3;

fn panel_center_x(panel: Rect) -> f32 {
    panel.x + panel.w * 0.5
}

fn panel_middle_y(panel: Rect) -> f32 {
    panel.y + panel.h * 0.5
}

/// Login screen geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoginLayout {
    pub logo: Rect,
    pub title_top: f32,
    pub input: Rect,
    pub eye: Rect,
    pub button: Rect,
}

impl LoginLayout {
    pub const LOGO_SIZE: f32 = 200.0;

    pub fn new(panel: Rect) -> Self {
        let cx = panel_center_x(panel);
        let input = Rect::new(cx - 150.0, panel.y + 320.0, 300.0, 40.0);
        Self {
            logo: Rect::new(
                cx - Self::LOGO_SIZE * 0.5,
                panel.y + 55.0,
                Self::LOGO_SIZE,
                Self::LOGO_SIZE,
            ),
            title_top: panel.y + 290.0,
            input,
            eye: Rect::new(input.right() - 35.0, input.y + 6.0, 24.0, 28.0),
            button: Rect::new(input.x, input.bottom() + 16.0, 300.0, 45.0),
        }
    }

    /// True when `point` is over something that reacts to the pointer
    pub fn is_interactive(&self, point: Vec2) -> bool {
        self.input.contains(point) || self.button.contains(point)
    }
}

/// Main menu geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuLayout {
    pub title_top: f32,
    pub image: Rect,
    pub name_top: f32,
    pub button: Rect,
    pub empty_text: Vec2,
}

impl MenuLayout {
    pub const IMAGE_SIZE: f32 = 140.0;

    pub fn new(panel: Rect) -> Self {
        let cx = panel_center_x(panel);
        let middle = panel_middle_y(panel);
        let image = Rect::new(
            cx - Self::IMAGE_SIZE * 0.5,
            middle - Self::IMAGE_SIZE * 0.5 - 40.0,
            Self::IMAGE_SIZE,
            Self::IMAGE_SIZE,
        );
        Self {
            title_top: panel.y + 76.0,
            image,
            name_top: image.bottom() + 20.0,
            button: Rect::new(cx - 150.0, panel.bottom() - 105.0, 300.0, 45.0),
            empty_text: Vec2::new(panel.x + 20.0, panel.y + 40.0),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LoginView<'a> {
    pub key: &'a str,
    pub show_key: bool,
    pub key_focused: bool,
    pub key_focus: f32,
    pub button: ButtonState,
}

pub fn draw_login(ui: &mut Ui<'_>, panel: Rect, view: &LoginView<'_>) {
    let layout = LoginLayout::new(panel);
    let cx = panel_center_x(panel);

    let alpha = ui.alpha();
    ui.list().image(IconRef::logo(), layout.logo, alpha);
    ui.centered_text(cx, layout.title_top, LOGIN_TITLE, theme::TEXT_PRIMARY);

    ui.key_input(
        layout.input,
        layout.eye,
        KeyField {
            text: view.key,
            placeholder: KEY_PLACEHOLDER,
            masked: !view.show_key,
            focused: view.key_focused,
            focus: view.key_focus,
        },
    );
    ui.button(layout.button, CONFIRM_LABEL, view.button);
}

/// Spinner of fading spokes rotating with global time
pub fn draw_loading(ui: &mut Ui<'_>, panel: Rect, time: f32, spinner_speed: f32) {
    let cx = panel_center_x(panel);
    let middle = panel_middle_y(panel);
    let center = Vec2::new(cx, middle - 30.0);
    let spin = time * spinner_speed;
    let alpha = ui.alpha();

    for i in 0..SPINNER_SEGMENTS {
        let f = i as f32 / SPINNER_SEGMENTS as f32;
        let angle = f * TAU + spin;
        let pulse = (f * PI).sin().max(0.0);
        let direction = Vec2::new(angle.cos(), angle.sin());
        ui.list().line(
            center.add(direction.scale(SPINNER_RADIUS)),
            center.add(direction.scale(SPINNER_RADIUS - 10.0)),
            theme::ACCENT.fade(alpha * pulse),
            4.0,
        );
    }

    ui.centered_text(cx, middle + 40.0, LOADING_TEXT, theme::TEXT_PRIMARY);
}

/// Ring with an animated checkmark or cross
///
/// `reveal` is the result reveal scalar; the mark is complete at 1.0.
pub fn draw_result(ui: &mut Ui<'_>, panel: Rect, success: bool, reveal: f32) {
    let cx = panel_center_x(panel);
    let middle = panel_middle_y(panel);
    let center = Vec2::new(cx, middle - 30.0);
    let anim = reveal.clamp(0.0, 1.0);
    let alpha = ui.alpha();

    let color = if success { theme::SUCCESS } else { theme::ERROR }.fade(alpha);
    ui.list().stroke_circle(center, RESULT_RING_RADIUS, color, 4.0);

    if success {
        let p1 = center.add(Vec2::new(-20.0, 5.0));
        let p2 = center.add(Vec2::new(-5.0, 20.0));
        let p3 = center.add(Vec2::new(20.0, -15.0));

        if anim > 0.01 {
            let t1 = (anim * 2.0).min(1.0);
            ui.list().line(p1, p1.lerp(p2, t1), color, 5.0);
        }
        if anim > 0.5 {
            let t2 = ((anim - 0.5) * 2.0).min(1.0);
            ui.list().line(p2, p2.lerp(p3, t2), color, 5.0);
        }
        ui.centered_text(cx, middle + 40.0, SUCCESS_TEXT, theme::TEXT_PRIMARY);
    } else {
        let size = 20.0 * anim;
        if size > 0.0 {
            ui.list().line(
                Vec2::new(center.x - size, center.y - size),
                Vec2::new(center.x + size, center.y + size),
                color,
                5.0,
            );
            ui.list().line(
                Vec2::new(center.x + size, center.y - size),
                Vec2::new(center.x - size, center.y + size),
                color,
                5.0,
            );
        }
        ui.centered_text(cx, middle + 40.0, FAILURE_TEXT, theme::TEXT_PRIMARY);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MenuView<'a> {
    pub entry: Option<&'a CatalogEntry>,
    pub button: ButtonState,
}

/// Product tile for the first catalog entry plus the launch button
pub fn draw_main_menu(ui: &mut Ui<'_>, panel: Rect, view: &MenuView<'_>) {
    let layout = MenuLayout::new(panel);

    let Some(entry) = view.entry else {
        ui.text(
            layout.empty_text,
            EMPTY_CATALOG_TEXT,
            LABEL_TEXT,
            theme::TEXT_PRIMARY,
            TextAlign::Left,
        );
        return;
    };

    let cx = panel_center_x(panel);
    let alpha = ui.alpha();
    ui.centered_text(cx, layout.title_top, PRODUCT_TITLE, theme::TEXT_PRIMARY);
    ui.list().image(entry.icon.clone(), layout.image, alpha);
    ui.centered_text(
        cx,
        layout.name_top,
        format!("Program {}", entry.name),
        theme::TEXT_PRIMARY,
    );
    ui.button(layout.button, LAUNCH_LABEL, view.button);
}

#[derive(Debug, Clone, Copy)]
pub struct LaunchView<'a> {
    pub entry: Option<&'a CatalogEntry>,
    /// Seconds since the launching screen was entered
    pub progress: f32,
    pub bar_cycle: f32,
}

/// Horizontal extent of the looping bar segment, relative to the bar start
///
/// Returns `None` while the segment is entirely outside the bar.
pub fn launch_bar_fill(progress: f32, cycle: f32, width: f32) -> Option<(f32, f32)> {
    if cycle <= 0.0 {
        return None;
    }
    let segment = width * LAUNCH_SEGMENT_SHARE;
    let t = progress.rem_euclid(cycle) / cycle;
    let start = (width + segment) * t - segment;
    let fill_start = start.max(0.0);
    let fill_end = (start + segment).min(width);
    (fill_end > fill_start).then_some((fill_start, fill_end))
}

pub fn draw_launching(ui: &mut Ui<'_>, panel: Rect, view: &LaunchView<'_>) {
    let Some(entry) = view.entry else {
        return;
    };

    let cx = panel_center_x(panel);
    let middle = panel_middle_y(panel);
    let icon = Rect::from_center(Vec2::new(cx, middle - 20.0), Vec2::new(120.0, 120.0));
    let alpha = ui.alpha();

    ui.list().image(entry.icon.clone(), icon, alpha);
    ui.centered_text(
        cx,
        icon.bottom() + 20.0,
        format!("Starting {}...", entry.name),
        theme::TEXT_PRIMARY,
    );

    let bar = Rect::new(
        cx - LAUNCH_BAR_WIDTH * 0.5,
        icon.bottom() + 50.0,
        LAUNCH_BAR_WIDTH,
        LAUNCH_BAR_HEIGHT,
    );
    ui.list().fill_rect(bar, theme::TRACK.fade(alpha), 2.0);

    if let Some((start, end)) = launch_bar_fill(view.progress, view.bar_cycle, bar.w) {
        ui.list().fill_rect(
            Rect::new(bar.x + start, bar.y, end - start, bar.h),
            theme::ACCENT.fade(alpha),
            2.0,
        );
    }
}
