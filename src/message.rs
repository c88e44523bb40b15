//! Message, word, and selection data. Word positions come pre-assigned from
//! the layout engine; everything here is message-relative until the
//! compositor applies the draw origin.

use std::sync::Arc;

use image::RgbaImage;

use crate::color::Rgba;
use crate::emote::Emote;
use crate::font::FontKind;
use crate::geom::{Point, Rect};
use crate::render::Surface;

/// One wrapped-line piece of a text word: the substring and its offset
/// relative to the message origin.
#[derive(Debug, Clone)]
pub struct Segment {
    pub text: String,
    pub offset: Point,
}

/// Payload of a word.
#[derive(Debug, Clone)]
pub enum WordKind {
    Text {
        text: String,
        font: FontKind,
        /// Override color (user-name colors). `None` draws in the scheme's
        /// text color.
        color: Option<Rgba>,
        /// Present when the layout engine wrapped this word across lines.
        segments: Option<Vec<Segment>>,
    },
    Emote(Arc<Emote>),
    Image(Arc<RgbaImage>),
}

/// An atomic drawable unit with its layout rectangle (message-relative).
#[derive(Debug, Clone)]
pub struct Word {
    pub rect: Rect,
    pub kind: WordKind,
}

impl Word {
    pub fn text(rect: Rect, text: impl Into<String>, font: FontKind, color: Option<Rgba>) -> Self {
        Self {
            rect,
            kind: WordKind::Text { text: text.into(), font, color, segments: None },
        }
    }

    pub fn emote(rect: Rect, emote: Arc<Emote>) -> Self {
        Self { rect, kind: WordKind::Emote(emote) }
    }

    pub fn image(rect: Rect, image: Arc<RgbaImage>) -> Self {
        Self { rect, kind: WordKind::Image(image) }
    }

    pub fn is_animated_emote(&self) -> bool {
        matches!(&self.kind, WordKind::Emote(emote) if emote.is_animated())
    }
}

/// Off-screen static render of a message, stamped with the font generation
/// it was drawn under. Stale buffers are discarded, never read.
pub struct MessageBuffer {
    pub surface: Surface,
    pub font_generation: u64,
}

/// A laid-out chat message.
pub struct Message {
    pub words: Vec<Word>,
    /// Last draw position on the visible surface, kept for the per-tick
    /// animated-emote pass.
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub highlighted: bool,
    pub disabled: bool,
    pub buffer: Option<MessageBuffer>,
}

impl Message {
    pub fn new(words: Vec<Word>, width: u32, height: u32) -> Self {
        Self {
            words,
            x: 0,
            y: 0,
            width,
            height,
            highlighted: false,
            disabled: false,
            buffer: None,
        }
    }

    /// Release the off-screen buffer. Must be called when the message is
    /// discarded; the compositor also drops stale buffers on its own when
    /// the font generation moved.
    pub fn release_buffer(&mut self) {
        self.buffer = None;
    }
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Message")
            .field("words", &self.words.len())
            .field("highlighted", &self.highlighted)
            .field("disabled", &self.disabled)
            .field("buffered", &self.buffer.is_some())
            .finish()
    }
}

/// A (line index, word index) position in the message list.
pub type SelectionPos = (usize, usize);

/// Selected interval over (line, word) positions, start ≤ end
/// lexicographically. The word interval is half-open: on the end line, words
/// strictly before `end.1` are covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: SelectionPos,
    pub end: SelectionPos,
    empty: bool,
}

impl Selection {
    pub const EMPTY: Selection = Selection { start: (0, 0), end: (0, 0), empty: true };

    pub fn new(start: SelectionPos, end: SelectionPos) -> Self {
        debug_assert!(start <= end);
        Self { start, end, empty: false }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Whether the selection touches `line` at all.
    pub fn intersects_line(&self, line: usize) -> bool {
        !self.empty && self.start.0 <= line && self.end.0 >= line
    }

    /// Whether word `word` of `line` falls inside the selection.
    pub fn covers(&self, line: usize, word: usize) -> bool {
        self.intersects_line(line)
            && (line != self.start.0 || word >= self.start.1)
            && (line != self.end.0 || word < self.end.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_covers_nothing() {
        let sel = Selection::EMPTY;
        assert!(!sel.intersects_line(0));
        assert!(!sel.covers(0, 0));
    }

    #[test]
    fn single_line_selection_is_half_open() {
        let sel = Selection::new((3, 1), (3, 4));
        assert!(!sel.covers(3, 0));
        assert!(sel.covers(3, 1));
        assert!(sel.covers(3, 3));
        assert!(!sel.covers(3, 4));
        assert!(!sel.covers(2, 2));
    }

    #[test]
    fn interior_line_is_fully_covered() {
        let sel = Selection::new((1, 5), (3, 0));
        assert!(sel.covers(2, 0));
        assert!(sel.covers(2, 999));
        assert!(!sel.covers(3, 0));
        assert!(!sel.covers(1, 4));
        assert!(sel.covers(1, 5));
    }
}
