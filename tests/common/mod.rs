//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use image::RgbaImage;

use chat_render::color::ColorScheme;
use chat_render::emote::Emote;
use chat_render::font::{ChatFontSystem, FontConfig, FontKind};
use chat_render::render::{MessageCompositor, RenderMode, TextRenderer};
use chat_render::size_cache::{MeasureText, SizeCaches};

/// Deterministic measurer: width = 7 px per byte, line height 16. Counts
/// calls so cache-hit behavior is observable.
#[derive(Default)]
pub struct FakeMeasurer {
    pub width_calls: AtomicUsize,
    pub height_calls: AtomicUsize,
}

impl MeasureText for FakeMeasurer {
    fn width(&self, _font: FontKind, text: &str) -> u32 {
        self.width_calls.fetch_add(1, Ordering::SeqCst);
        text.len() as u32 * 7
    }

    fn line_height(&self, _font: FontKind) -> u32 {
        self.height_calls.fetch_add(1, Ordering::SeqCst);
        16
    }
}

pub fn solid(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(w, h, image::Rgba(px))
}

/// An animated emote with the given durations, one solid frame per entry.
pub fn animated_emote(name: &str, durations: &[u32]) -> Emote {
    let frames = durations
        .iter()
        .enumerate()
        .map(|(i, _)| solid(4, 4, [i as u8 * 40, 0, 255, 255]))
        .collect();
    Emote::from_frames(name, frames, durations.to_vec()).unwrap()
}

/// Compositor wired to the fake measurer, so the selection pad (one space
/// width) is a known 7 px.
pub fn compositor(scheme: ColorScheme, mode: RenderMode) -> MessageCompositor {
    let fonts = Arc::new(Mutex::new(ChatFontSystem::new(FontConfig::default())));
    MessageCompositor::new(scheme, TextRenderer::new(fonts), SizeCaches::default(), mode)
        .with_measurer(Arc::new(FakeMeasurer::default()))
}

/// The selection pad produced by [`FakeMeasurer`]: width of " ".
pub const PAD: u32 = 7;
