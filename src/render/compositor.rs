//! Message compositing.
//!
//! Draws a message's pre-positioned words plus highlight, disabled, and
//! selection overlays. Static content is drawn once (directly, or into a
//! message-owned off-screen buffer that is blitted per frame); animated
//! emotes are excluded from the static selection pass and re-composited
//! every scheduler tick by [`MessageCompositor::draw_animated`], restricted
//! to each emote's rectangle.

use crate::color::{ColorScheme, Rgba};
use crate::font::FontKind;
use crate::geom::{Point, Rect};
use crate::message::{Message, MessageBuffer, Selection, Word, WordKind};
use crate::render::{Surface, TextRenderer};
use crate::size_cache::{MeasureText, SizeCaches};

/// Custom text colors with HSL lightness below this are lightened before
/// drawing on dark themes.
const DARK_COLOR_THRESHOLD: f32 = 0.5;

/// Outline color marking an emote whose image failed to decode.
const FALLBACK_OUTLINE: Rgba = Rgba::rgb(255, 0, 0);

/// How static message content reaches the visible surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Every call draws straight to the visible surface.
    Direct,
    /// Static content is rendered once into a message-owned buffer and
    /// blitted each call; animated emotes are composited on top.
    Buffered,
}

pub struct MessageCompositor {
    scheme: ColorScheme,
    text: TextRenderer,
    /// Measurement primitive feeding the size caches. Defaults to the text
    /// renderer itself; tests inject a deterministic fake.
    measurer: std::sync::Arc<dyn MeasureText + Send + Sync>,
    caches: SizeCaches,
    mode: RenderMode,
}

impl MessageCompositor {
    pub fn new(scheme: ColorScheme, text: TextRenderer, caches: SizeCaches, mode: RenderMode) -> Self {
        let measurer = std::sync::Arc::new(text.clone());
        Self { scheme, text, measurer, caches, mode }
    }

    /// Replace the measurement primitive behind the size caches.
    pub fn with_measurer(mut self, measurer: std::sync::Arc<dyn MeasureText + Send + Sync>) -> Self {
        self.measurer = measurer;
        self
    }

    pub fn scheme(&self) -> &ColorScheme {
        &self.scheme
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Swap the color scheme. Buffered messages must be re-rendered; the
    /// host releases their buffers (theme changes invalidate static
    /// content the same way font changes do).
    pub fn set_scheme(&mut self, scheme: ColorScheme) {
        self.scheme = scheme;
    }

    /// Measure text through the per-font size caches.
    pub fn measure(&self, font: FontKind, text: &str) -> crate::geom::Size {
        self.caches.measure(&*self.measurer, font, text)
    }

    /// Change the global font settings: bumps the generation (invalidating
    /// buffered messages) and clears every size cache.
    pub fn set_font_config(&mut self, family: Option<String>, base_size: f32) {
        self.text
            .fonts()
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .set_config(family, base_size);
        self.caches.clear_all();
    }

    /// Draw `message` with its top-left at `origin`.
    ///
    /// `line` is this message's index in the message list, used to resolve
    /// the selection interval.
    pub fn draw(
        &self,
        surface: &mut Surface,
        message: &mut Message,
        origin: Point,
        selection: Selection,
        line: usize,
    ) {
        message.x = origin.x;
        message.y = origin.y;

        match self.mode {
            RenderMode::Direct => {
                let band_width = surface.width();
                self.draw_static(surface, message, origin, band_width);
            }
            RenderMode::Buffered => {
                let generation = self.text.font_generation();
                // A buffer rendered under an older font generation is stale:
                // discard without reading it.
                if message
                    .buffer
                    .as_ref()
                    .is_some_and(|b| b.font_generation != generation)
                {
                    message.release_buffer();
                }
                if message.buffer.is_none() {
                    let mut buffer = Surface::new(
                        message.width.max(1),
                        message.height.max(1),
                        self.background(message),
                    );
                    let width = buffer.width();
                    self.draw_static(&mut buffer, message, Point::ZERO, width);
                    message.buffer = Some(MessageBuffer { surface: buffer, font_generation: generation });
                }
                if let Some(buffer) = &message.buffer {
                    surface.blit(origin.x, origin.y, &buffer.surface);
                }
                self.draw_animated(surface, message, selection, line);
            }
        }

        self.draw_selection(surface, message, origin, selection, line);
    }

    /// Steps 1–3: highlight band, words, disabled overlay. `band_width` is
    /// how far the highlight/disabled fills extend to the right.
    fn draw_static(&self, surface: &mut Surface, message: &Message, origin: Point, band_width: u32) {
        if message.highlighted {
            surface.fill_rect(
                Rect::new(origin.x, origin.y, band_width, message.height),
                self.scheme.background_highlighted,
            );
        }

        for word in &message.words {
            self.draw_word(surface, word, origin);
        }

        if message.disabled {
            surface.fill_rect(
                Rect::new(origin.x, origin.y, band_width, message.height),
                self.scheme.disabled_overlay(),
            );
        }
    }

    fn draw_word(&self, surface: &mut Surface, word: &Word, origin: Point) {
        let rect = word.rect.translate(origin.x, origin.y);
        match &word.kind {
            WordKind::Text { text, font, color, segments } => {
                let color = self.text_color(*color);
                match segments {
                    None => {
                        self.text
                            .draw_text(surface, text, *font, Point::new(rect.x, rect.y), color);
                    }
                    Some(segments) => {
                        for segment in segments {
                            let pos = Point::new(
                                origin.x + segment.offset.x,
                                origin.y + segment.offset.y,
                            );
                            self.text.draw_text(surface, &segment.text, *font, pos, color);
                        }
                    }
                }
            }
            WordKind::Emote(emote) => match emote.image.as_ref() {
                Some(data) => surface.draw_bitmap(rect, &data.current_frame()),
                // Failed decode: keep the slot visible instead of collapsing
                // the layout.
                None => surface.draw_rect_outline(rect, FALLBACK_OUTLINE),
            },
            WordKind::Image(bitmap) => surface.draw_bitmap(rect, bitmap),
        }
    }

    /// Resolve a word's draw color, lightening dark custom colors so they
    /// stay readable on dark backgrounds.
    fn text_color(&self, custom: Option<Rgba>) -> Rgba {
        match custom {
            None => self.scheme.text,
            Some(color) if color.brightness() < DARK_COLOR_THRESHOLD => color.lighten(),
            Some(color) => color,
        }
    }

    /// Step 4 (static half): selection overlay over covered words, skipping
    /// animated emotes — those get theirs in [`Self::draw_animated`].
    fn draw_selection(
        &self,
        surface: &mut Surface,
        message: &Message,
        origin: Point,
        selection: Selection,
        line: usize,
    ) {
        if !selection.intersects_line(line) {
            return;
        }
        let pad = self.space_width();
        for (i, word) in message.words.iter().enumerate() {
            if !selection.covers(line, i) || word.is_animated_emote() {
                continue;
            }
            let rect = word.rect.translate(origin.x, origin.y).widen(pad);
            surface.fill_rect(rect, self.scheme.selection);
        }
    }

    /// Per-tick pass: re-composite every animated emote word, with its own
    /// background, selection, and disabled overlays, clipped to the word
    /// rectangle. Called on the visible surface after each scheduler tick
    /// (and after the buffer blit in buffered mode).
    pub fn draw_animated(
        &self,
        surface: &mut Surface,
        message: &Message,
        selection: Selection,
        line: usize,
    ) {
        let origin = Point::new(message.x, message.y);
        let pad = self.space_width();

        for (i, word) in message.words.iter().enumerate() {
            let WordKind::Emote(emote) = &word.kind else {
                continue;
            };
            let Some(data) = emote.image.as_ref() else {
                continue;
            };
            if !data.animated() {
                continue;
            }

            let rect = word.rect.translate(origin.x, origin.y);
            surface.fill_rect(rect.widen(pad), self.background(message));
            surface.draw_bitmap(rect, &data.current_frame());

            if selection.covers(line, i) {
                surface.fill_rect(rect, self.scheme.selection);
            }
            if message.disabled {
                surface.fill_rect(rect.widen(pad), self.scheme.disabled_overlay());
            }
        }
    }

    fn background(&self, message: &Message) -> Rgba {
        if message.highlighted {
            self.scheme.background_highlighted
        } else {
            self.scheme.background
        }
    }

    /// Measured width of a single space in the medium font; selection fills
    /// extend this far past each word so adjacent selections join up.
    fn space_width(&self) -> u32 {
        self.caches.measure(&*self.measurer, FontKind::Medium, " ").width
    }
}
