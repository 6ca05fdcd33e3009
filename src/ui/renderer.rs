//! Draw list rasterization
//!
//! Turns a finished `DrawList` into a `tiny_skia::Pixmap`. Screens and
//! widgets only produce commands; this is the one place that touches pixels,
//! so the layout side stays testable without a canvas.
//!
//! Text is rasterized with `ab_glyph` into a coverage mask and filled through
//! it. Icons come from an atlas of PNG files with generated placeholders for
//! anything missing.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontArc, GlyphId, PxScale, PxScaleFont, ScaleFont, point};
use tiny_skia::{
    Color, FillRule, FilterQuality, GradientStop, LineCap, LinearGradient, Mask, Paint, Path as SkiaPath,
    PathBuilder, Pattern, Pixmap, Point, Rect as SkiaRect, SpreadMode, Stroke, Transform,
};

use crate::config::AssetSettings;
use crate::domain::catalog::IconRef;
use crate::domain::core::{Rect, Vec2};
use crate::ui::draw::{DrawCommand, DrawList, TextAlign};
use crate::ui::theme::{self, Rgba};

/// Rendering errors
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("Failed to create {width}x{height} pixmap for rendering")]
    PixmapCreationFailed { width: u32, height: u32 },

    #[error("Failed to create {width}x{height} mask")]
    MaskCreationFailed { width: u32, height: u32 },

    #[error("Failed to read font {}: {source}", path.display())]
    FontRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Font {} is not a valid TrueType/OpenType font", path.display())]
    InvalidFont { path: PathBuf },

    #[error("Failed to encode PNG {}: {reason}", path.display())]
    PngEncode { path: PathBuf, reason: String },
}

/// Fonts tried when no font path is configured
#[cfg(windows)]
const SYSTEM_FONTS: &[&str] = &[
    r"C:\Windows\Fonts\segoeui.ttf",
    r"C:\Windows\Fonts\arial.ttf",
];

#[cfg(not(windows))]
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

const PLACEHOLDER_ICON_SIZE: u32 = 64;

/// Loads a TrueType/OpenType font from disk
pub fn load_font(path: &Path) -> Result<FontArc, RendererError> {
    let data = fs::read(path).map_err(|source| RendererError::FontRead {
        path: path.to_path_buf(),
        source,
    })?;
    FontArc::try_from_vec(data).map_err(|_| RendererError::InvalidFont {
        path: path.to_path_buf(),
    })
}

/// First system font that loads, if any
fn system_font() -> Option<FontArc> {
    SYSTEM_FONTS
        .iter()
        .map(Path::new)
        .filter(|path| path.exists())
        .find_map(|path| match load_font(path) {
            Ok(font) => {
                tracing::debug!(path = %path.display(), "using system font");
                Some(font)
            }
            Err(err) => {
                tracing::warn!(error = %err, "skipping unusable system font");
                None
            }
        })
}

/// Lazily loaded icon images keyed by icon name
#[derive(Debug, Default)]
pub struct IconAtlas {
    dir: Option<PathBuf>,
    icons: HashMap<String, Pixmap>,
}

impl IconAtlas {
    /// Icons are looked up as `<dir>/<name>.png`
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir,
            icons: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, pixmap: Pixmap) {
        self.icons.insert(name.into(), pixmap);
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    /// Returns the image for `icon`, loading or generating it on first use
    pub fn get(&mut self, icon: &IconRef) -> Result<&Pixmap, RendererError> {
        match self.icons.entry(icon.name().to_owned()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let pixmap = match load_icon(self.dir.as_deref(), icon) {
                    Some(pixmap) => pixmap,
                    None => placeholder_icon(icon)?,
                };
                Ok(entry.insert(pixmap))
            }
        }
    }
}

fn load_icon(dir: Option<&Path>, icon: &IconRef) -> Option<Pixmap> {
    let path = dir?.join(format!("{}.png", icon.name()));
    if !path.exists() {
        tracing::debug!(icon = %icon, "no icon image, using placeholder");
        return None;
    }
    match Pixmap::load_png(&path) {
        Ok(pixmap) => Some(pixmap),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to decode icon");
            None
        }
    }
}

/// Accent tile with a ring (logo) or a dot (anything else)
fn placeholder_icon(icon: &IconRef) -> Result<Pixmap, RendererError> {
    let size = PLACEHOLDER_ICON_SIZE;
    let mut pixmap = Pixmap::new(size, size).ok_or(RendererError::PixmapCreationFailed {
        width: size,
        height: size,
    })?;

    let extent = size as f32;
    let tile = Rect::new(0.0, 0.0, extent, extent);
    if let Some(path) = rounded_rect_path(tile, extent * 0.2) {
        if let Some(paint) = gradient_paint(tile, &[(0.0, theme::BUTTON_TOP), (1.0, theme::BUTTON_BOTTOM)]) {
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }

    let center = extent * 0.5;
    if let Some(circle) = PathBuilder::from_circle(center, center, extent * 0.25) {
        if icon.name() == IconRef::LOGO {
            let stroke = Stroke {
                width: extent * 0.08,
                ..Stroke::default()
            };
            pixmap.stroke_path(&circle, &solid(theme::WHITE), &stroke, Transform::identity(), None);
        } else {
            pixmap.fill_path(
                &circle,
                &solid(theme::WHITE.fade(0.85)),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    Ok(pixmap)
}

fn skia_rect(rect: Rect) -> Option<SkiaRect> {
    SkiaRect::from_xywh(rect.x, rect.y, rect.w, rect.h)
}

/// Rectangle path with circular corners; `None` for an empty rectangle
fn rounded_rect_path(rect: Rect, radius: f32) -> Option<SkiaPath> {
    if rect.w <= 0.0 || rect.h <= 0.0 {
        return None;
    }
    let radius = radius.max(0.0).min(rect.w * 0.5).min(rect.h * 0.5);
    if radius <= 0.0 {
        return skia_rect(rect).map(PathBuilder::from_rect);
    }

    // Cubic approximation of a quarter circle
    const KAPPA: f32 = 0.552_284_8;
    let k = radius * KAPPA;
    let (l, t, r, b) = (rect.x, rect.y, rect.right(), rect.bottom());

    let mut pb = PathBuilder::new();
    pb.move_to(l + radius, t);
    pb.line_to(r - radius, t);
    pb.cubic_to(r - radius + k, t, r, t + radius - k, r, t + radius);
    pb.line_to(r, b - radius);
    pb.cubic_to(r, b - radius + k, r - radius + k, b, r - radius, b);
    pb.line_to(l + radius, b);
    pb.cubic_to(l + radius - k, b, l, b - radius + k, l, b - radius);
    pb.line_to(l, t + radius);
    pb.cubic_to(l, t + radius - k, l + radius - k, t, l + radius, t);
    pb.close();
    pb.finish()
}

fn solid(color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.to_skia());
    paint.anti_alias = true;
    paint
}

fn gradient_paint(rect: Rect, stops: &[(f32, Rgba)]) -> Option<Paint<'static>> {
    let stops = stops
        .iter()
        .map(|(position, color)| GradientStop::new(*position, color.to_skia()))
        .collect();
    let shader = LinearGradient::new(
        Point::from_xy(rect.x, rect.y),
        Point::from_xy(rect.x, rect.bottom()),
        stops,
        SpreadMode::Pad,
        Transform::identity(),
    )?;
    Some(Paint {
        shader,
        anti_alias: true,
        ..Paint::default()
    })
}

fn text_width(scaled: &PxScaleFont<&FontArc>, text: &str) -> f32 {
    let mut width = 0.0;
    let mut previous: Option<GlyphId> = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = previous {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        previous = Some(id);
    }
    width
}

/// Writes glyph coverage for `text` into `mask`; `origin` is the top-left
fn rasterize_text(font: &FontArc, mask: &mut Mask, origin: Vec2, text: &str, size: f32) {
    let scaled = font.as_scaled(PxScale::from(size));
    let baseline = origin.y + scaled.ascent();
    let width = mask.width() as i32;
    let height = mask.height() as i32;
    let data = mask.data_mut();

    let mut caret = origin.x;
    let mut previous: Option<GlyphId> = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scaled.scale(), point(caret, baseline));
        caret += scaled.h_advance(id);
        previous = Some(id);

        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let x = bounds.min.x as i32 + gx as i32;
            let y = bounds.min.y as i32 + gy as i32;
            if x < 0 || y < 0 || x >= width || y >= height {
                return;
            }
            let index = (y * width + x) as usize;
            let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
            data[index] = data[index].max(value);
        });
    }
}

/// Multiplies `mask` by `clip` in place
fn intersect_masks(mask: &mut Mask, clip: &Mask) {
    for (value, limit) in mask.data_mut().iter_mut().zip(clip.data()) {
        *value = ((*value as u16 * *limit as u16) / 255) as u8;
    }
}

/// Software rasterizer for draw lists
pub struct Rasterizer {
    canvas: Pixmap,
    font: Option<FontArc>,
    icons: IconAtlas,
    clips: Vec<Mask>,
}

impl Rasterizer {
    /// A rasterizer without a font; text commands are skipped
    pub fn new(width: u32, height: u32) -> Result<Self, RendererError> {
        let canvas = Pixmap::new(width, height)
            .ok_or(RendererError::PixmapCreationFailed { width, height })?;
        Ok(Self {
            canvas,
            font: None,
            icons: IconAtlas::default(),
            clips: Vec::new(),
        })
    }

    /// A rasterizer using the configured font and icon directory
    ///
    /// A configured font that fails to load is an error. Without one, the
    /// first usable system font is taken, and text is skipped if none is.
    pub fn with_assets(width: u32, height: u32, assets: &AssetSettings) -> Result<Self, RendererError> {
        let mut rasterizer = Self::new(width, height)?;
        rasterizer.icons = IconAtlas::new(assets.icon_dir.clone());

        rasterizer.font = match &assets.font_path {
            Some(path) => Some(load_font(path)?),
            None => system_font(),
        };
        if rasterizer.font.is_none() {
            tracing::warn!("no font available, text will not be rendered");
        }

        Ok(rasterizer)
    }

    pub fn set_font(&mut self, font: FontArc) {
        self.font = Some(font);
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn icons_mut(&mut self) -> &mut IconAtlas {
        &mut self.icons
    }

    pub fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    /// The most recently rendered frame
    pub fn pixmap(&self) -> &Pixmap {
        &self.canvas
    }

    /// Clears the canvas and draws every command in order
    pub fn render(&mut self, list: &DrawList) -> Result<&Pixmap, RendererError> {
        self.canvas.fill(Color::TRANSPARENT);
        self.clips.clear();

        for command in list.commands() {
            self.draw(command)?;
        }

        if !self.clips.is_empty() {
            tracing::warn!(depth = self.clips.len(), "draw list left clips pushed");
            self.clips.clear();
        }

        Ok(&self.canvas)
    }

    pub fn save_png(&self, path: &Path) -> Result<(), RendererError> {
        self.canvas
            .save_png(path)
            .map_err(|err| RendererError::PngEncode {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })
    }

    fn draw(&mut self, command: &DrawCommand) -> Result<(), RendererError> {
        match command {
            DrawCommand::PushClip(rect) => return self.push_clip(*rect),
            DrawCommand::PopClip => {
                if self.clips.pop().is_none() {
                    tracing::warn!("clip pop without matching push");
                }
                return Ok(());
            }
            _ => {}
        }

        let clip = self.clips.last();
        let identity = Transform::identity();

        match command {
            DrawCommand::FillRect {
                rect,
                color,
                rounding,
            } => {
                if let Some(path) = rounded_rect_path(*rect, *rounding) {
                    self.canvas
                        .fill_path(&path, &solid(*color), FillRule::Winding, identity, clip);
                }
            }
            DrawCommand::StrokeRect {
                rect,
                color,
                rounding,
                width,
            } => {
                if let Some(path) = rounded_rect_path(*rect, *rounding) {
                    let stroke = Stroke {
                        width: *width,
                        ..Stroke::default()
                    };
                    self.canvas
                        .stroke_path(&path, &solid(*color), &stroke, identity, clip);
                }
            }
            DrawCommand::GradientRect {
                rect,
                stops,
                rounding,
            } => {
                if let (Some(path), Some(paint)) =
                    (rounded_rect_path(*rect, *rounding), gradient_paint(*rect, stops))
                {
                    self.canvas
                        .fill_path(&path, &paint, FillRule::Winding, identity, clip);
                }
            }
            DrawCommand::FillCircle {
                center,
                radius,
                color,
            } => {
                if let Some(path) = PathBuilder::from_circle(center.x, center.y, *radius) {
                    self.canvas
                        .fill_path(&path, &solid(*color), FillRule::Winding, identity, clip);
                }
            }
            DrawCommand::StrokeCircle {
                center,
                radius,
                color,
                width,
            } => {
                if let Some(path) = PathBuilder::from_circle(center.x, center.y, *radius) {
                    let stroke = Stroke {
                        width: *width,
                        ..Stroke::default()
                    };
                    self.canvas
                        .stroke_path(&path, &solid(*color), &stroke, identity, clip);
                }
            }
            DrawCommand::Line {
                from,
                to,
                color,
                width,
            } => {
                let mut pb = PathBuilder::new();
                pb.move_to(from.x, from.y);
                pb.line_to(to.x, to.y);
                if let Some(path) = pb.finish() {
                    let stroke = Stroke {
                        width: *width,
                        line_cap: LineCap::Round,
                        ..Stroke::default()
                    };
                    self.canvas
                        .stroke_path(&path, &solid(*color), &stroke, identity, clip);
                }
            }
            DrawCommand::Image {
                icon,
                rect,
                opacity,
            } => {
                let Some(dest) = skia_rect(*rect) else {
                    return Ok(());
                };
                let image = self.icons.get(icon)?;
                let scale_x = rect.w / image.width() as f32;
                let scale_y = rect.h / image.height() as f32;
                let shader = Pattern::new(
                    image.as_ref(),
                    SpreadMode::Pad,
                    FilterQuality::Bilinear,
                    *opacity,
                    Transform::from_row(scale_x, 0.0, 0.0, scale_y, rect.x, rect.y),
                );
                let paint = Paint {
                    shader,
                    anti_alias: true,
                    ..Paint::default()
                };
                self.canvas.fill_rect(dest, &paint, identity, clip);
            }
            DrawCommand::Text {
                pos,
                text,
                size,
                color,
                align,
            } => {
                let Some(font) = &self.font else {
                    return Ok(());
                };
                let (width, height) = (self.canvas.width(), self.canvas.height());
                let mut mask = Mask::new(width, height)
                    .ok_or(RendererError::MaskCreationFailed { width, height })?;

                let origin = match align {
                    TextAlign::Left => *pos,
                    TextAlign::Center => {
                        let scaled = font.as_scaled(PxScale::from(*size));
                        Vec2::new(pos.x - text_width(&scaled, text) * 0.5, pos.y)
                    }
                };
                rasterize_text(font, &mut mask, origin, text, *size);
                if let Some(clip) = clip {
                    intersect_masks(&mut mask, clip);
                }

                if let Some(full) = SkiaRect::from_xywh(0.0, 0.0, width as f32, height as f32) {
                    self.canvas
                        .fill_rect(full, &solid(*color), identity, Some(&mask));
                }
            }
            DrawCommand::PushClip(_) | DrawCommand::PopClip => {}
        }

        Ok(())
    }

    fn push_clip(&mut self, rect: Rect) -> Result<(), RendererError> {
        let (width, height) = self.size();
        let mut mask = match self.clips.last() {
            Some(parent) => parent.clone(),
            None => {
                let mut mask = Mask::new(width, height)
                    .ok_or(RendererError::MaskCreationFailed { width, height })?;
                mask.data_mut().fill(255);
                mask
            }
        };

        match skia_rect(rect) {
            Some(area) => mask.intersect_path(
                &PathBuilder::from_rect(area),
                FillRule::Winding,
                true,
                Transform::identity(),
            ),
            None => mask.data_mut().fill(0),
        }

        self.clips.push(mask);
        Ok(())
    }
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer")
            .field("size", &self.size())
            .field("font", &self.font.is_some())
            .field("icons", &self.icons.len())
            .field("clips", &self.clips.len())
            .finish()
    }
}
