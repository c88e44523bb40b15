//! Emote resources: decoded bitmaps, animation frame state, and the
//! process-wide registry decode results merge into.
//!
//! An [`Emote`] is shared by every word referencing the same visual asset.
//! Its animation state (current frame index, sub-frame tick offset, active
//! frame handle) lives behind a per-resource mutex: the frame scheduler is
//! the only writer, the compositor the only reader, and unrelated emotes
//! never contend on a common lock.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex, RwLock};

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, RgbaImage};

use crate::error::{Error, Result};

/// Frame durations are in 10 ms tick units. Streams that declare a zero or
/// missing duration get this floor at decode time so the scheduler's carry
/// loop always terminates.
pub const MIN_FRAME_DURATION: u32 = 2;

/// Animation position of one emote. Guarded by the emote's own mutex.
#[derive(Debug)]
pub struct FrameState {
    /// Index into the frame list. Always `< frames.len()`.
    pub current: usize,
    /// Ticks accumulated inside the current frame. After normalization,
    /// `offset <= durations[current]` between scheduler calls.
    pub offset: u32,
    /// Handle to the currently selected frame bitmap. Reassigned only when
    /// `current` actually moves.
    pub active: Arc<RgbaImage>,
}

/// Decoded pixel data of an emote.
pub struct EmoteData {
    frames: Vec<Arc<RgbaImage>>,
    durations: Vec<u32>,
    animated: bool,
    state: Mutex<FrameState>,
}

impl std::fmt::Debug for EmoteData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmoteData")
            .field("frames", &self.frames.len())
            .field("animated", &self.animated)
            .finish()
    }
}

impl EmoteData {
    /// Build from decoded frames and raw durations (10 ms units), applying
    /// the [`MIN_FRAME_DURATION`] floor.
    fn new(frames: Vec<RgbaImage>, durations: Vec<u32>) -> Result<Self> {
        if frames.is_empty() {
            return Err(Error::EmptyAnimation);
        }
        let animated = frames.len() > 1;
        let frames: Vec<Arc<RgbaImage>> = frames.into_iter().map(Arc::new).collect();
        let durations: Vec<u32> = (0..frames.len())
            .map(|i| durations.get(i).copied().unwrap_or(0).max(MIN_FRAME_DURATION))
            .collect();
        let active = frames[0].clone();
        Ok(Self {
            frames,
            durations,
            animated,
            state: Mutex::new(FrameState { current: 0, offset: 0, active }),
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn animated(&self) -> bool {
        self.animated
    }

    /// Normalized per-frame durations in tick units.
    pub fn durations(&self) -> &[u32] {
        &self.durations
    }

    pub fn width(&self) -> u32 {
        self.frames[0].width()
    }

    pub fn height(&self) -> u32 {
        self.frames[0].height()
    }

    /// Snapshot of the currently active frame bitmap.
    pub fn current_frame(&self) -> Arc<RgbaImage> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .active
            .clone()
    }

    /// Current (frame index, tick offset). Mainly for tests and diagnostics.
    pub fn frame_position(&self) -> (usize, u32) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        (state.current, state.offset)
    }

    /// Run `f` with the frame state locked. The scheduler uses this to
    /// advance; holding the lock excludes the compositor's frame reads.
    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut FrameState, &[Arc<RgbaImage>], &[u32]) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state, &self.frames, &self.durations)
    }
}

/// A shared emote resource. `image` is `None` when the source bytes failed
/// to decode; the compositor draws a fallback outline for such emotes
/// instead of crashing or skipping layout.
#[derive(Debug)]
pub struct Emote {
    pub name: String,
    pub image: Option<EmoteData>,
}

impl Emote {
    /// Decode an emote from an opaque byte stream.
    ///
    /// GIF streams yield every frame with its delay (converted to 10 ms
    /// units); any other format supported by the `image` crate yields a
    /// single static frame. Decode failure is returned to the caller, which
    /// typically records the emote as [`Emote::missing`].
    pub fn decode(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let name = name.into();
        let data = if bytes.starts_with(b"GIF8") {
            decode_gif(bytes)?
        } else {
            let img = image::load_from_memory(bytes)?.to_rgba8();
            EmoteData::new(vec![img], vec![])?
        };
        Ok(Self { name, image: Some(data) })
    }

    /// An emote whose image could not be decoded.
    pub fn missing(name: impl Into<String>) -> Self {
        Self { name: name.into(), image: None }
    }

    /// Build from pre-decoded frames. Used by tests and by hosts that decode
    /// elsewhere.
    pub fn from_frames(
        name: impl Into<String>,
        frames: Vec<RgbaImage>,
        durations: Vec<u32>,
    ) -> Result<Self> {
        Ok(Self { name: name.into(), image: Some(EmoteData::new(frames, durations)?) })
    }

    pub fn is_animated(&self) -> bool {
        self.image.as_ref().is_some_and(|d| d.animated())
    }
}

fn decode_gif(bytes: &[u8]) -> Result<EmoteData> {
    let decoder = GifDecoder::new(Cursor::new(bytes))?;
    let mut frames = Vec::new();
    let mut durations = Vec::new();
    for frame in decoder.into_frames() {
        let frame = frame?;
        let (numer_ms, denom) = frame.delay().numer_denom_ms();
        let ms = if denom == 0 { 0 } else { numer_ms / denom };
        durations.push(ms / 10);
        frames.push(frame.into_buffer());
    }
    EmoteData::new(frames, durations)
}

/// Process-wide emote map. Decode results (including failures recorded as
/// [`Emote::missing`]) merge in as they arrive from background loads.
#[derive(Default)]
pub struct EmoteRegistry {
    emotes: RwLock<HashMap<String, Arc<Emote>>>,
}

impl EmoteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an emote under its name.
    pub fn insert(&self, emote: Emote) -> Arc<Emote> {
        let emote = Arc::new(emote);
        self.emotes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(emote.name.clone(), emote.clone());
        emote
    }

    /// Decode `bytes` and merge the result; a decode failure is logged and
    /// recorded as a missing emote so rendering still completes.
    pub fn insert_bytes(&self, name: &str, bytes: &[u8]) -> Arc<Emote> {
        match Emote::decode(name, bytes) {
            Ok(emote) => self.insert(emote),
            Err(err) => {
                tracing::warn!(name, %err, "emote decode failed");
                self.insert(Emote::missing(name))
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<Emote>> {
        self.emotes
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    /// Snapshot of every animated emote, for the scheduler's tick pass.
    pub fn animated(&self) -> Vec<Arc<Emote>> {
        self.emotes
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|e| e.is_animated())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.emotes.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, image::Rgba(px))
    }

    #[test]
    fn zero_durations_are_floored() {
        let emote =
            Emote::from_frames("x", vec![solid(2, 2, [1, 2, 3, 255]); 3], vec![0, 5, 0]).unwrap();
        let data = emote.image.unwrap();
        assert_eq!(data.durations(), &[MIN_FRAME_DURATION, 5, MIN_FRAME_DURATION]);
    }

    #[test]
    fn missing_durations_are_floored() {
        let emote =
            Emote::from_frames("x", vec![solid(2, 2, [0; 4]); 2], vec![]).unwrap();
        let data = emote.image.unwrap();
        assert_eq!(data.durations(), &[MIN_FRAME_DURATION; 2]);
    }

    #[test]
    fn single_frame_is_not_animated() {
        let emote = Emote::from_frames("x", vec![solid(2, 2, [0; 4])], vec![10]).unwrap();
        assert!(!emote.is_animated());
    }

    #[test]
    fn empty_frame_list_is_an_error() {
        assert!(Emote::from_frames("x", vec![], vec![]).is_err());
    }

    #[test]
    fn registry_merges_and_lists_animated() {
        let registry = EmoteRegistry::new();
        registry
            .insert(Emote::from_frames("anim", vec![solid(2, 2, [0; 4]); 2], vec![3, 3]).unwrap());
        registry.insert(Emote::from_frames("still", vec![solid(2, 2, [0; 4])], vec![]).unwrap());
        registry.insert(Emote::missing("broken"));
        assert_eq!(registry.len(), 3);
        let animated = registry.animated();
        assert_eq!(animated.len(), 1);
        assert_eq!(animated[0].name, "anim");
    }

    #[test]
    fn bad_bytes_become_missing_emote() {
        let registry = EmoteRegistry::new();
        let emote = registry.insert_bytes("broken", b"not an image");
        assert!(emote.image.is_none());
        assert!(registry.get("broken").is_some());
    }
}
