//! Chat message rendering pipeline.
//!
//! Measures text through bounded per-font caches, schedules animated emote
//! frames on a background tick, and composites text/emote/image words plus
//! highlight, disabled, and selection overlays onto an RGBA surface, in
//! direct or buffered mode. Layout (word positioning) and network fetch are
//! external; this crate starts from positioned words and opaque byte
//! streams.

pub mod badge;
pub mod color;
pub mod emote;
pub mod error;
pub mod font;
pub mod geom;
pub mod message;
pub mod render;
pub mod scheduler;
pub mod size_cache;

pub use error::{Error, Result};
