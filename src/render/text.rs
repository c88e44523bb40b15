//! Text shaping, measurement, and glyph rasterization.
//!
//! Shapes a run with cosmic-text, rasterizes glyphs through the swash cache,
//! and blends them straight onto the surface. Glyph bitmaps arrive as alpha
//! masks (tinted with the text color), full-color images, or subpixel masks
//! (flattened to alpha).

use std::sync::{Arc, Mutex};

use cosmic_text::{Buffer, Shaping, SwashContent};

use crate::color::Rgba;
use crate::font::{ChatFontSystem, FontKind};
use crate::geom::Point;
use crate::render::Surface;
use crate::size_cache::MeasureText;

/// Shape one unwrapped run of text. Line breaking is the layout engine's
/// job; the compositor only ever draws pre-split segments.
fn shape_run(fonts: &mut ChatFontSystem, font: FontKind, text: &str) -> Buffer {
    let metrics = fonts.metrics(font);
    let attrs = fonts.attrs_owned(font);
    let mut buffer = Buffer::new(&mut fonts.font_system, metrics);
    buffer.set_size(&mut fonts.font_system, None, None);
    buffer.set_text(&mut fonts.font_system, text, &attrs.as_attrs(), Shaping::Advanced, None);
    buffer.shape_until_scroll(&mut fonts.font_system, true);
    buffer
}

/// Draws and measures text against a shared font system.
///
/// The font system sits behind a mutex so the measurement seam
/// ([`MeasureText`]) can be called from layout threads while the renderer
/// draws on the UI thread.
#[derive(Clone)]
pub struct TextRenderer {
    fonts: Arc<Mutex<ChatFontSystem>>,
}

impl TextRenderer {
    pub fn new(fonts: Arc<Mutex<ChatFontSystem>>) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &Arc<Mutex<ChatFontSystem>> {
        &self.fonts
    }

    /// Current font-config generation, for buffer invalidation checks.
    pub fn font_generation(&self) -> u64 {
        self.fonts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .config()
            .generation()
    }

    /// Draw one run of text with its top-left corner at `pos`.
    pub fn draw_text(&self, surface: &mut Surface, text: &str, font: FontKind, pos: Point, color: Rgba) {
        if text.is_empty() {
            return;
        }
        let mut guard = self.fonts.lock().unwrap_or_else(|e| e.into_inner());
        let fonts = &mut *guard;
        let buffer = shape_run(fonts, font, text);

        for run in buffer.layout_runs() {
            for glyph in run.glyphs.iter() {
                let pg = glyph.physical((0.0, 0.0), 1.0);
                let Some(image) = fonts
                    .swash_cache
                    .get_image(&mut fonts.font_system, pg.cache_key)
                    .as_ref()
                else {
                    continue;
                };
                let gx = pos.x + pg.x + image.placement.left;
                let gy = pos.y + run.line_y as i32 + pg.y - image.placement.top;
                blend_glyph(surface, gx, gy, image, color);
            }
        }
    }
}

/// Blend one rasterized glyph at `(gx, gy)`.
fn blend_glyph(
    surface: &mut Surface,
    gx: i32,
    gy: i32,
    image: &cosmic_text::SwashImage,
    color: Rgba,
) {
    let width = image.placement.width;
    let height = image.placement.height;
    if width == 0 || height == 0 {
        return;
    }
    match image.content {
        SwashContent::Mask => {
            for y in 0..height {
                for x in 0..width {
                    let alpha = image.data.get((y * width + x) as usize).copied().unwrap_or(0);
                    let a = (alpha as u16 * color.a as u16 / 255) as u8;
                    surface.blend_pixel(gx + x as i32, gy + y as i32, color.with_alpha(a));
                }
            }
        }
        SwashContent::Color => {
            for y in 0..height {
                for x in 0..width {
                    let i = ((y * width + x) * 4) as usize;
                    let px = Rgba::rgba(
                        image.data.get(i).copied().unwrap_or(0),
                        image.data.get(i + 1).copied().unwrap_or(0),
                        image.data.get(i + 2).copied().unwrap_or(0),
                        image.data.get(i + 3).copied().unwrap_or(0),
                    );
                    surface.blend_pixel(gx + x as i32, gy + y as i32, px);
                }
            }
        }
        SwashContent::SubpixelMask => {
            for y in 0..height {
                for x in 0..width {
                    let i = ((y * width + x) * 3) as usize;
                    let alpha = image.data.get(i).copied().unwrap_or(0);
                    let a = (alpha as u16 * color.a as u16 / 255) as u8;
                    surface.blend_pixel(gx + x as i32, gy + y as i32, color.with_alpha(a));
                }
            }
        }
    }
}

impl MeasureText for TextRenderer {
    fn width(&self, font: FontKind, text: &str) -> u32 {
        if text.is_empty() {
            return 0;
        }
        let mut fonts = self.fonts.lock().unwrap_or_else(|e| e.into_inner());
        let buffer = shape_run(&mut fonts, font, text);
        buffer
            .layout_runs()
            .map(|run| run.line_w.ceil() as u32)
            .max()
            .unwrap_or(0)
    }

    fn line_height(&self, font: FontKind) -> u32 {
        let fonts = self.fonts.lock().unwrap_or_else(|e| e.into_inner());
        fonts.metrics(font).line_height as u32
    }
}
